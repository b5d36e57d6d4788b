//! Store modules: one per owned collection.
//!
//! Each store exclusively owns its collection, funnels every mutation
//! through its own methods, and mirrors the durable store after each one.

pub mod blueprint;
pub mod contract;
