//! Tool parameter schemas and argument validation
//!
//! A schema is the JSON-Schema-like `{properties, required}` record from the
//! tool configuration document. Validation runs before any binding is
//! invoked: required keys must be present and supplied values must be
//! coercible to the declared types.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Declared type of a single tool parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl ParameterType {
    fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    /// Whether `value` is acceptable for this type
    ///
    /// Numbers accept integers; integers accept whole-valued floats; the
    /// rest match their JSON type exactly.
    fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Integer => {
                value.is_i64()
                    || value.is_u64()
                    || value.as_f64().map(|f| f.fract() == 0.0).unwrap_or(false)
            }
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }
}

/// Declaration of a single tool parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Declared type
    #[serde(rename = "type")]
    pub kind: ParameterType,

    /// Human description shown to the model
    #[serde(default)]
    pub description: String,
}

/// Parameter schema for one tool
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Parameter name to declaration
    #[serde(default)]
    pub properties: BTreeMap<String, ParameterSpec>,

    /// Names of parameters that must be present
    #[serde(default)]
    pub required: Vec<String>,
}

impl ToolSchema {
    /// Check the schema itself for consistency (required names must exist)
    pub fn check(&self) -> Result<(), String> {
        for name in &self.required {
            if !self.properties.contains_key(name) {
                return Err(format!(
                    "required parameter '{}' is not declared in properties",
                    name
                ));
            }
        }
        Ok(())
    }

    /// Validate arguments against this schema
    ///
    /// Returns every violation found rather than stopping at the first, so
    /// the model sees the full picture in one tool-result turn.
    pub fn validate(&self, arguments: &Value) -> Result<(), Vec<String>> {
        let mut violations = Vec::new();

        let object = match arguments.as_object() {
            Some(object) => object,
            None => {
                return Err(vec![format!(
                    "arguments must be a JSON object, got {}",
                    json_type_name(arguments)
                )]);
            }
        };

        for name in &self.required {
            if !object.contains_key(name) {
                violations.push(format!("missing required parameter '{}'", name));
            }
        }

        for (name, value) in object {
            if let Some(spec) = self.properties.get(name) {
                if !spec.kind.accepts(value) {
                    violations.push(format!(
                        "parameter '{}' expects {}, got {}",
                        name,
                        spec.kind.name(),
                        json_type_name(value)
                    ));
                }
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    /// Render the JSON-Schema object sent to providers
    pub fn to_json_schema(&self) -> Value {
        let properties: serde_json::Map<String, Value> = self
            .properties
            .iter()
            .map(|(name, spec)| {
                (
                    name.clone(),
                    json!({
                        "type": spec.kind.name(),
                        "description": spec.description,
                    }),
                )
            })
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": self.required,
        })
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
