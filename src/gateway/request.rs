use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::GatewayError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    #[default]
    Query,
    Mutation,
}

/// A request graph: the root fields to resolve and, per field, its arguments
/// and nested selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub operation: Operation,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub args: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
}

impl Request {
    pub fn query(fields: Vec<Field>) -> Self {
        Self {
            operation: Operation::Query,
            fields,
        }
    }

    pub fn mutation(fields: Vec<Field>) -> Self {
        Self {
            operation: Operation::Mutation,
            fields,
        }
    }

    pub fn from_json(value: Value) -> Result<Self, GatewayError> {
        serde_json::from_value(value).map_err(|e| GatewayError::InvalidQuery(e.to_string()))
    }
}

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            args: Map::new(),
            fields: Vec::new(),
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(name.into(), value.into());
        self
    }

    pub fn select(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    /// Key under which the field appears in the response.
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// Leaf fields by name.
pub fn leaves(names: &[&str]) -> Vec<Field> {
    names.iter().map(|name| Field::new(*name)).collect()
}
