//! Core modules: entity model, lifecycle engine, and shared primitives.

pub mod db;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod time;
pub mod workspace;
