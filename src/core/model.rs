//! Entity model: fields, blueprints, contracts.
//!
//! Blueprints are reusable named field layouts; a contract is a blueprint
//! instantiation carrying per-field values and a lifecycle status. Contracts
//! snapshot the blueprint's fields by deep copy at creation time, so later
//! blueprint edits never affect already-created contracts.

use crate::core::lifecycle::ContractStatus;
use crate::core::time;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Closed enumeration of field input types.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Date,
    Signature,
    Checkbox,
    Dropdown,
    Textarea,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Signature => "signature",
            FieldType::Checkbox => "checkbox",
            FieldType::Dropdown => "dropdown",
            FieldType::Textarea => "textarea",
        }
    }

    /// Default value a contract field of this type starts with.
    pub fn default_value(&self) -> FieldValue {
        match self {
            FieldType::Checkbox => FieldValue::Checked(false),
            _ => FieldValue::Text(String::new()),
        }
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(FieldType::Text),
            "number" => Ok(FieldType::Number),
            "date" => Ok(FieldType::Date),
            "signature" => Ok(FieldType::Signature),
            "checkbox" => Ok(FieldType::Checkbox),
            "dropdown" => Ok(FieldType::Dropdown),
            "textarea" => Ok(FieldType::Textarea),
            other => Err(format!(
                "unknown field type '{}' (expected one of: text, number, date, signature, checkbox, dropdown, textarea)",
                other
            )),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canvas placement of a field. The model imposes no bound.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub x: i64,
    pub y: i64,
}

/// Optional configuration for number fields.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct NumberConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
}

/// Optional configuration for date fields.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct DateConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_date: Option<String>,
}

/// One input slot on a blueprint. `id` is unique within the owning
/// blueprint's field list and immutable once assigned.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Field {
    /// Assigned at creation when omitted (stores fill empty ids in).
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<NumberConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl Field {
    pub fn new(label: &str, field_type: FieldType, position: Position) -> Self {
        Field {
            id: Ulid::new().to_string(),
            field_type,
            label: label.to_string(),
            position,
            number: None,
            date: None,
            options: None,
        }
    }
}

/// A reusable named template: an ordered, non-empty set of fields.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Blueprint {
    pub id: String,
    pub name: String,
    pub fields: Vec<Field>,
}

/// Value carried by a contract field: a string for most field types, a
/// boolean for checkboxes. Serializes untagged so persisted values are
/// plain JSON strings/booleans.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    Checked(bool),
    Text(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Checked(b) => write!(f, "{}", b),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

/// A field snapshot on a contract: the blueprint field plus a live value.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ContractField {
    #[serde(flatten)]
    pub field: Field,
    pub value: FieldValue,
}

/// One instantiation of a blueprint with live data.
///
/// `blueprint_id` is a weak reference: the contract keeps it even if the
/// blueprint is later deleted, and display lookups then report "Unknown".
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Contract {
    pub id: String,
    pub name: String,
    pub blueprint_id: String,
    pub fields: Vec<ContractField>,
    pub status: ContractStatus,
    pub created_at: String,
}

/// Produce a new contract from a blueprint: a structural deep copy of the
/// blueprint's fields, each augmented with its default value. Never mutates
/// the source blueprint.
pub fn instantiate_contract(blueprint: &Blueprint, name: &str) -> Contract {
    let fields = blueprint
        .fields
        .iter()
        .map(|f| ContractField {
            field: f.clone(),
            value: f.field_type.default_value(),
        })
        .collect();

    Contract {
        id: Ulid::new().to_string(),
        name: name.to_string(),
        blueprint_id: blueprint.id.clone(),
        fields,
        status: ContractStatus::Created,
        created_at: time::now_iso(),
    }
}
