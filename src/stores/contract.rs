//! Contract store: owns the contract collection.
//!
//! Status changes MUST pass the lifecycle engine's `can_transition` check
//! before being applied; an illegal transition leaves state untouched and
//! surfaces as an error. There is deliberately no shortcut path around the
//! engine (no hardcoded "revoke" special case).

use crate::core::db;
use crate::core::error::CountersignError;
use crate::core::lifecycle::{self, ContractStatus};
use crate::core::model::{instantiate_contract, Blueprint, Contract, FieldType, FieldValue};
use crate::core::workspace::Workspace;
use crate::stores::blueprint::{BlueprintStore, OutputFormat};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const COLLECTION_KEY: &str = "contracts";

/// Sentinel shown when a contract's blueprint no longer exists.
pub const UNKNOWN_BLUEPRINT: &str = "Unknown";

#[derive(Parser, Debug)]
#[clap(name = "contract", about = "Instantiate contracts and drive their lifecycle.")]
pub struct ContractCli {
    /// Output format for this command group.
    #[clap(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,
    #[clap(subcommand)]
    command: ContractCommand,
}

#[derive(Subcommand, Debug)]
pub enum ContractCommand {
    /// Create a contract from a blueprint.
    Create {
        /// Contract name (positional argument)
        #[clap(value_name = "NAME")]
        name: String,
        /// ID of the blueprint to instantiate.
        #[clap(long)]
        blueprint: String,
    },
    /// List contracts.
    List {
        /// Filter by lifecycle status.
        #[clap(long, value_enum)]
        status: Option<ContractStatus>,
    },
    /// Show a contract by ID.
    Show {
        #[clap(long)]
        id: String,
    },
    /// List the legal next statuses for a contract.
    Actions {
        #[clap(long)]
        id: String,
    },
    /// Move a contract to the next lifecycle status.
    SetStatus {
        #[clap(long)]
        id: String,
        #[clap(long, value_enum)]
        to: ContractStatus,
    },
    /// Set a field value on a non-terminal contract.
    SetField {
        #[clap(long)]
        id: String,
        /// Field ID within the contract.
        #[clap(long)]
        field: String,
        /// New value ("true"/"false" for checkbox fields).
        #[clap(long)]
        value: String,
    },
    /// Per-status contract counts.
    Stats,
    /// Delete a contract.
    Delete {
        #[clap(long)]
        id: String,
    },
}

pub struct ContractStore {
    root: PathBuf,
    contracts: Vec<Contract>,
}

impl ContractStore {
    /// Open the store, seeding in-memory state from the durable medium.
    pub fn open(workspace: &Workspace) -> Result<Self, CountersignError> {
        let contracts = db::load_collection(&workspace.root, COLLECTION_KEY)?;
        Ok(ContractStore {
            root: workspace.root.clone(),
            contracts,
        })
    }

    pub fn list(&self) -> &[Contract] {
        &self.contracts
    }

    pub fn get(&self, id: &str) -> Option<&Contract> {
        self.contracts.iter().find(|c| c.id == id)
    }

    /// Instantiate `blueprint` under `name` with status CREATED. Nothing is
    /// committed on refusal.
    pub fn create(
        &mut self,
        name: &str,
        blueprint: &Blueprint,
    ) -> Result<&Contract, CountersignError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CountersignError::ValidationError(
                "contract name must not be empty".to_string(),
            ));
        }

        let contract = instantiate_contract(blueprint, name);
        self.contracts.push(contract);
        if let Err(e) = self.persist() {
            self.contracts.pop();
            return Err(e);
        }
        Ok(self.contracts.last().expect("just pushed"))
    }

    /// Apply a lifecycle transition. `Ok(false)` if the contract is absent;
    /// an illegal transition is refused with no state change. Replaces
    /// `status` and nothing else.
    pub fn update_status(
        &mut self,
        id: &str,
        next: ContractStatus,
    ) -> Result<bool, CountersignError> {
        let Some(idx) = self.contracts.iter().position(|c| c.id == id) else {
            return Ok(false);
        };

        let current = self.contracts[idx].status;
        if !lifecycle::can_transition(current, next) {
            return Err(CountersignError::IllegalTransition {
                from: current,
                to: next,
            });
        }

        self.contracts[idx].status = next;
        if let Err(e) = self.persist() {
            self.contracts[idx].status = current;
            return Err(e);
        }
        Ok(true)
    }

    /// Replace one field's value. `Ok(false)` if the contract or field is
    /// unresolved; refused outright when the contract is terminal.
    pub fn update_field_value(
        &mut self,
        contract_id: &str,
        field_id: &str,
        value: FieldValue,
    ) -> Result<bool, CountersignError> {
        let Some(idx) = self.contracts.iter().position(|c| c.id == contract_id) else {
            return Ok(false);
        };

        let status = self.contracts[idx].status;
        if lifecycle::is_terminal(status) {
            return Err(CountersignError::ValidationError(format!(
                "contract '{}' is {} and can no longer be modified",
                contract_id, status
            )));
        }

        let Some(field_idx) = self.contracts[idx]
            .fields
            .iter()
            .position(|f| f.field.id == field_id)
        else {
            return Ok(false);
        };

        let previous = self.contracts[idx].fields[field_idx].value.clone();
        self.contracts[idx].fields[field_idx].value = value;
        if let Err(e) = self.persist() {
            self.contracts[idx].fields[field_idx].value = previous;
            return Err(e);
        }
        Ok(true)
    }

    /// Remove the contract with this ID. Idempotent: `Ok(false)` if absent.
    pub fn delete(&mut self, id: &str) -> Result<bool, CountersignError> {
        let Some(idx) = self.contracts.iter().position(|c| c.id == id) else {
            return Ok(false);
        };
        let removed = self.contracts.remove(idx);
        if let Err(e) = self.persist() {
            self.contracts.insert(idx, removed);
            return Err(e);
        }
        Ok(true)
    }

    /// Contract counts per lifecycle status (statuses with zero contracts
    /// are omitted).
    pub fn stats(&self) -> BTreeMap<ContractStatus, usize> {
        let mut counts = BTreeMap::new();
        for contract in &self.contracts {
            *counts.entry(contract.status).or_insert(0) += 1;
        }
        counts
    }

    fn persist(&self) -> Result<(), CountersignError> {
        db::save_collection(&self.root, COLLECTION_KEY, &self.contracts)
    }
}

/// Resolve a contract's blueprint name for display. A dangling reference is
/// not an error: the sentinel is returned and the contract stays usable.
pub fn blueprint_label(blueprints: &BlueprintStore, contract: &Contract) -> String {
    blueprints
        .get(&contract.blueprint_id)
        .map(|b| b.name.clone())
        .unwrap_or_else(|| UNKNOWN_BLUEPRINT.to_string())
}

fn status_badge(status: ContractStatus) -> colored::ColoredString {
    match status {
        ContractStatus::Created => status.as_str().bright_cyan(),
        ContractStatus::Approved => status.as_str().bright_blue(),
        ContractStatus::Sent => status.as_str().bright_yellow(),
        ContractStatus::Signed => status.as_str().bright_green(),
        ContractStatus::Locked => status.as_str().bright_white().bold(),
        ContractStatus::Revoked => status.as_str().bright_red(),
    }
}

fn coerce_value(contract: &Contract, field_id: &str, raw: &str) -> FieldValue {
    let field_type = contract
        .fields
        .iter()
        .find(|f| f.field.id == field_id)
        .map(|f| f.field.field_type);
    match field_type {
        Some(FieldType::Checkbox) => match raw {
            "true" => FieldValue::Checked(true),
            "false" => FieldValue::Checked(false),
            other => FieldValue::Text(other.to_string()),
        },
        _ => FieldValue::Text(raw.to_string()),
    }
}

pub fn run_contract_cli(workspace: &Workspace, cli: ContractCli) -> Result<(), CountersignError> {
    let blueprints = BlueprintStore::open(workspace)?;
    let mut store = ContractStore::open(workspace)?;

    match cli.command {
        ContractCommand::Create { name, blueprint } => {
            let blueprint = blueprints
                .get(&blueprint)
                .ok_or_else(|| CountersignError::NotFound(format!("blueprint '{}'", blueprint)))?;
            let contract = store.create(&name, blueprint)?;
            match cli.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(contract)?);
                }
                OutputFormat::Text => {
                    println!(
                        "Contract created: {} [{}]  status={}",
                        contract.name,
                        contract.id,
                        status_badge(contract.status)
                    );
                }
            }
        }
        ContractCommand::List { status } => {
            let filtered: Vec<&Contract> = store
                .list()
                .iter()
                .filter(|c| status.is_none_or(|s| c.status == s))
                .collect();
            match cli.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&filtered)?);
                }
                OutputFormat::Text => {
                    if filtered.is_empty() {
                        println!("No contracts yet. Create one with `countersign contract create`.");
                    }
                    for contract in &filtered {
                        println!(
                            "{}  {}  blueprint={}  status={}  created={}",
                            contract.id,
                            contract.name,
                            blueprint_label(&blueprints, contract),
                            status_badge(contract.status),
                            contract.created_at
                        );
                    }
                }
            }
        }
        ContractCommand::Show { id } => {
            let contract = store
                .get(&id)
                .ok_or_else(|| CountersignError::NotFound(format!("contract '{}'", id)))?;
            println!("{}", serde_json::to_string_pretty(contract)?);
        }
        ContractCommand::Actions { id } => {
            let contract = store
                .get(&id)
                .ok_or_else(|| CountersignError::NotFound(format!("contract '{}'", id)))?;
            let actions = lifecycle::available_actions(contract.status);
            match cli.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&actions)?);
                }
                OutputFormat::Text => {
                    if actions.is_empty() {
                        println!("{} is terminal; no actions available.", contract.status);
                    } else {
                        for action in actions {
                            println!("{}", action);
                        }
                    }
                }
            }
        }
        ContractCommand::SetStatus { id, to } => {
            if store.update_status(&id, to)? {
                println!("Contract {} marked as {}", id, status_badge(to));
            } else {
                println!("Contract not found: {} (no-op)", id);
            }
        }
        ContractCommand::SetField { id, field, value } => {
            let coerced = match store.get(&id) {
                Some(contract) => coerce_value(contract, &field, &value),
                None => FieldValue::Text(value.clone()),
            };
            if store.update_field_value(&id, &field, coerced)? {
                println!("Field {} updated on contract {}", field, id);
            } else {
                println!("Contract or field not found (no-op)");
            }
        }
        ContractCommand::Stats => {
            let counts = store.stats();
            match cli.format {
                OutputFormat::Json => {
                    let obj: BTreeMap<&str, usize> =
                        counts.iter().map(|(s, n)| (s.as_str(), *n)).collect();
                    println!("{}", serde_json::to_string_pretty(&obj)?);
                }
                OutputFormat::Text => {
                    println!("{} contracts total", store.list().len());
                    for (status, count) in &counts {
                        println!("  {}: {}", status_badge(*status), count);
                    }
                }
            }
        }
        ContractCommand::Delete { id } => {
            if store.delete(&id)? {
                println!("Contract deleted: {}", id);
            } else {
                println!("Contract not found: {} (no-op)", id);
            }
        }
    }
    Ok(())
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "contract",
        "version": "0.1.0",
        "description": "Blueprint instantiations with enforced lifecycle transitions",
        "commands": [
            { "name": "create", "parameters": ["name", "blueprint"] },
            { "name": "list", "parameters": ["status"] },
            { "name": "show", "parameters": ["id"] },
            { "name": "actions", "parameters": ["id"] },
            { "name": "set-status", "parameters": ["id", "to"] },
            { "name": "set-field", "parameters": ["id", "field", "value"] },
            { "name": "stats", "parameters": [] },
            { "name": "delete", "parameters": ["id"] }
        ],
        "storage": { "db": db::PLATFORM_DB_NAME, "key": COLLECTION_KEY }
    })
}
