//! Blueprint store: owns the blueprint collection.
//!
//! All blueprint mutation funnels through [`BlueprintStore`]; every
//! mutating method persists the full collection before returning, and a
//! failed persist rolls the in-memory change back so memory always mirrors
//! the last durable state.

use crate::core::db;
use crate::core::error::CountersignError;
use crate::core::model::{Blueprint, Field, FieldType, Position};
use crate::core::workspace::Workspace;
use clap::{Parser, Subcommand, ValueEnum};
use std::collections::HashSet;
use std::path::PathBuf;
use ulid::Ulid;

pub const COLLECTION_KEY: &str = "blueprints";

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[clap(name = "blueprint", about = "Design and manage reusable contract blueprints.")]
pub struct BlueprintCli {
    /// Output format for this command group.
    #[clap(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,
    #[clap(subcommand)]
    command: BlueprintCommand,
}

#[derive(Subcommand, Debug)]
pub enum BlueprintCommand {
    /// Save a new blueprint.
    Add {
        /// Blueprint name (positional argument)
        #[clap(value_name = "NAME")]
        name: String,
        /// Field spec: "Label:type[:x,y][:opt|opt|...]" (repeatable).
        #[clap(long = "field")]
        fields: Vec<String>,
        /// Full field list as a JSON array (alternative to --field).
        #[clap(long)]
        fields_json: Option<String>,
    },
    /// List blueprints in insertion order.
    List,
    /// Show a blueprint by ID.
    Show {
        #[clap(long)]
        id: String,
    },
    /// Update a blueprint's name and/or fields.
    Update {
        #[clap(long)]
        id: String,
        #[clap(long)]
        name: Option<String>,
        /// Replacement field list as a JSON array.
        #[clap(long)]
        fields_json: Option<String>,
    },
    /// Delete a blueprint (contracts keep their snapshot and dangle safely).
    Delete {
        #[clap(long)]
        id: String,
    },
}

/// Partial update applied by [`BlueprintStore::update`]. Absent parts are
/// left untouched.
#[derive(Debug, Default, Clone)]
pub struct BlueprintPatch {
    pub name: Option<String>,
    pub fields: Option<Vec<Field>>,
}

pub struct BlueprintStore {
    root: PathBuf,
    blueprints: Vec<Blueprint>,
}

impl BlueprintStore {
    /// Open the store, seeding in-memory state from the durable medium.
    pub fn open(workspace: &Workspace) -> Result<Self, CountersignError> {
        let blueprints = db::load_collection(&workspace.root, COLLECTION_KEY)?;
        Ok(BlueprintStore {
            root: workspace.root.clone(),
            blueprints,
        })
    }

    pub fn list(&self) -> &[Blueprint] {
        &self.blueprints
    }

    pub fn get(&self, id: &str) -> Option<&Blueprint> {
        self.blueprints.iter().find(|b| b.id == id)
    }

    /// Validate, assign a fresh ID, append, persist. Nothing is committed
    /// on refusal.
    pub fn create(
        &mut self,
        name: &str,
        mut fields: Vec<Field>,
    ) -> Result<&Blueprint, CountersignError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CountersignError::ValidationError(
                "blueprint name must not be empty".to_string(),
            ));
        }
        if fields.is_empty() {
            return Err(CountersignError::ValidationError(
                "blueprint must have at least one field".to_string(),
            ));
        }
        normalize_field_ids(&mut fields);
        validate_fields(&fields)?;

        let blueprint = Blueprint {
            id: Ulid::new().to_string(),
            name: name.to_string(),
            fields,
        };
        self.blueprints.push(blueprint);
        if let Err(e) = self.persist() {
            self.blueprints.pop();
            return Err(e);
        }
        Ok(self.blueprints.last().expect("just pushed"))
    }

    /// Merge `patch` into the blueprint with this ID. `Ok(false)` if absent.
    pub fn update(&mut self, id: &str, patch: BlueprintPatch) -> Result<bool, CountersignError> {
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                return Err(CountersignError::ValidationError(
                    "blueprint name must not be empty".to_string(),
                ));
            }
        }
        let mut patch = patch;
        if let Some(fields) = &mut patch.fields {
            if fields.is_empty() {
                return Err(CountersignError::ValidationError(
                    "blueprint must have at least one field".to_string(),
                ));
            }
            normalize_field_ids(fields);
            validate_fields(fields)?;
        }

        let Some(idx) = self.blueprints.iter().position(|b| b.id == id) else {
            return Ok(false);
        };

        let previous = self.blueprints[idx].clone();
        if let Some(name) = patch.name {
            self.blueprints[idx].name = name.trim().to_string();
        }
        if let Some(fields) = patch.fields {
            self.blueprints[idx].fields = fields;
        }
        if let Err(e) = self.persist() {
            self.blueprints[idx] = previous;
            return Err(e);
        }
        Ok(true)
    }

    /// Remove the blueprint with this ID. Idempotent: `Ok(false)` if absent.
    pub fn delete(&mut self, id: &str) -> Result<bool, CountersignError> {
        let Some(idx) = self.blueprints.iter().position(|b| b.id == id) else {
            return Ok(false);
        };
        let removed = self.blueprints.remove(idx);
        if let Err(e) = self.persist() {
            self.blueprints.insert(idx, removed);
            return Err(e);
        }
        Ok(true)
    }

    fn persist(&self) -> Result<(), CountersignError> {
        db::save_collection(&self.root, COLLECTION_KEY, &self.blueprints)
    }
}

fn normalize_field_ids(fields: &mut [Field]) {
    for field in fields {
        if field.id.is_empty() {
            field.id = Ulid::new().to_string();
        }
    }
}

fn validate_fields(fields: &[Field]) -> Result<(), CountersignError> {
    let mut seen = HashSet::new();
    for field in fields {
        if field.label.trim().is_empty() {
            return Err(CountersignError::ValidationError(
                "field label must not be empty".to_string(),
            ));
        }
        if !seen.insert(field.id.as_str()) {
            return Err(CountersignError::ValidationError(format!(
                "duplicate field id '{}'",
                field.id
            )));
        }
    }
    Ok(())
}

/// Parse a CLI field spec: `Label:type`, `Label:type:x,y`, or
/// `Label:dropdown:x,y:Yes|No|Maybe`.
pub fn parse_field_spec(spec: &str) -> Result<Field, CountersignError> {
    let segments: Vec<&str> = spec.split(':').collect();
    if segments.len() < 2 || segments.len() > 4 {
        return Err(CountersignError::ValidationError(format!(
            "invalid field spec '{}' (expected Label:type[:x,y][:opt|opt])",
            spec
        )));
    }

    let label = segments[0].trim();
    if label.is_empty() {
        return Err(CountersignError::ValidationError(format!(
            "field spec '{}' has an empty label",
            spec
        )));
    }
    let field_type: FieldType = segments[1]
        .trim()
        .parse()
        .map_err(CountersignError::ValidationError)?;

    let position = if segments.len() >= 3 {
        parse_position(segments[2]).ok_or_else(|| {
            CountersignError::ValidationError(format!(
                "invalid position '{}' in field spec '{}' (expected x,y)",
                segments[2], spec
            ))
        })?
    } else {
        Position::default()
    };

    let mut field = Field::new(label, field_type, position);
    if segments.len() == 4 {
        if field_type != FieldType::Dropdown {
            return Err(CountersignError::ValidationError(format!(
                "options are only valid for dropdown fields: '{}'",
                spec
            )));
        }
        field.options = Some(segments[3].split('|').map(|o| o.trim().to_string()).collect());
    }
    Ok(field)
}

fn parse_position(raw: &str) -> Option<Position> {
    let (x, y) = raw.split_once(',')?;
    Some(Position {
        x: x.trim().parse().ok()?,
        y: y.trim().parse().ok()?,
    })
}

fn fields_from_args(
    specs: &[String],
    fields_json: Option<&str>,
) -> Result<Vec<Field>, CountersignError> {
    match fields_json {
        Some(json) => {
            if !specs.is_empty() {
                return Err(CountersignError::ValidationError(
                    "use either --field or --fields-json, not both".to_string(),
                ));
            }
            Ok(serde_json::from_str(json)?)
        }
        None => specs.iter().map(|s| parse_field_spec(s)).collect(),
    }
}

pub fn run_blueprint_cli(
    workspace: &Workspace,
    cli: BlueprintCli,
) -> Result<(), CountersignError> {
    let mut store = BlueprintStore::open(workspace)?;
    match cli.command {
        BlueprintCommand::Add {
            name,
            fields,
            fields_json,
        } => {
            let fields = fields_from_args(&fields, fields_json.as_deref())?;
            let blueprint = store.create(&name, fields)?;
            match cli.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(blueprint)?);
                }
                OutputFormat::Text => {
                    println!(
                        "Blueprint saved: {} ({} field{})  [{}]",
                        blueprint.name,
                        blueprint.fields.len(),
                        if blueprint.fields.len() == 1 { "" } else { "s" },
                        blueprint.id
                    );
                }
            }
        }
        BlueprintCommand::List => match cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(store.list())?);
            }
            OutputFormat::Text => {
                if store.list().is_empty() {
                    println!("No blueprints yet. Save one with `countersign blueprint add`.");
                }
                for blueprint in store.list() {
                    println!(
                        "{}  {}  ({} field{})",
                        blueprint.id,
                        blueprint.name,
                        blueprint.fields.len(),
                        if blueprint.fields.len() == 1 { "" } else { "s" }
                    );
                }
            }
        },
        BlueprintCommand::Show { id } => {
            let blueprint = store
                .get(&id)
                .ok_or_else(|| CountersignError::NotFound(format!("blueprint '{}'", id)))?;
            println!("{}", serde_json::to_string_pretty(blueprint)?);
        }
        BlueprintCommand::Update {
            id,
            name,
            fields_json,
        } => {
            let fields = match fields_json {
                Some(json) => Some(serde_json::from_str(&json)?),
                None => None,
            };
            if store.update(&id, BlueprintPatch { name, fields })? {
                println!("Blueprint updated: {}", id);
            } else {
                println!("Blueprint not found: {} (no-op)", id);
            }
        }
        BlueprintCommand::Delete { id } => {
            if store.delete(&id)? {
                println!("Blueprint deleted: {}", id);
            } else {
                println!("Blueprint not found: {} (no-op)", id);
            }
        }
    }
    Ok(())
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "blueprint",
        "version": "0.1.0",
        "description": "Reusable contract templates (named field layouts)",
        "commands": [
            { "name": "add", "parameters": ["name", "field", "fields_json"] },
            { "name": "list", "parameters": [] },
            { "name": "show", "parameters": ["id"] },
            { "name": "update", "parameters": ["id", "name", "fields_json"] },
            { "name": "delete", "parameters": ["id"] }
        ],
        "storage": { "db": db::PLATFORM_DB_NAME, "key": COLLECTION_KEY }
    })
}
