//! Contract lifecycle state machine.
//!
//! A pure transition-table lookup with no side effects and no hidden state.
//! Stores consult this module before applying a status change; the UI layer
//! queries [`available_actions`] to decide which actions to offer and must
//! never hardcode the table.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a contract.
///
/// `Created` is the only initial state and is never reachable again.
/// `Locked` and `Revoked` are terminal: no outgoing transitions.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContractStatus {
    Created,
    Approved,
    Sent,
    Signed,
    Locked,
    Revoked,
}

impl ContractStatus {
    pub const ALL: [ContractStatus; 6] = [
        ContractStatus::Created,
        ContractStatus::Approved,
        ContractStatus::Sent,
        ContractStatus::Signed,
        ContractStatus::Locked,
        ContractStatus::Revoked,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContractStatus::Created => "CREATED",
            ContractStatus::Approved => "APPROVED",
            ContractStatus::Sent => "SENT",
            ContractStatus::Signed => "SIGNED",
            ContractStatus::Locked => "LOCKED",
            ContractStatus::Revoked => "REVOKED",
        }
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The allowed-successor set of `from`. Empty slice means terminal.
pub fn available_actions(from: ContractStatus) -> &'static [ContractStatus] {
    match from {
        ContractStatus::Created => &[ContractStatus::Approved, ContractStatus::Revoked],
        ContractStatus::Approved => &[ContractStatus::Sent],
        ContractStatus::Sent => &[ContractStatus::Signed, ContractStatus::Revoked],
        ContractStatus::Signed => &[ContractStatus::Locked],
        ContractStatus::Locked | ContractStatus::Revoked => &[],
    }
}

/// True iff `to` is in the allowed-successor set of `from`.
/// Self-transitions are not in the table and are therefore illegal.
pub fn can_transition(from: ContractStatus, to: ContractStatus) -> bool {
    available_actions(from).contains(&to)
}

/// A terminal status has no legal outgoing transition.
pub fn is_terminal(status: ContractStatus) -> bool {
    available_actions(status).is_empty()
}
