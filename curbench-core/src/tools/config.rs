//! Tool configuration document
//!
//! Tools are declared in a YAML or JSON document with a `tools` list. A
//! `function` entry binds to a native handler registered in a
//! [`HandlerTable`] under its `function_path`/`function_name` pair; an `api`
//! entry binds to a remote HTTP endpoint.
//!
//! ```yaml
//! tools:
//!   - type: function
//!     name: fuzzy_match
//!     description: Match a value against candidate terms
//!     schema:
//!       properties:
//!         value: {type: string, description: value to match}
//!       required: [value]
//!     function_path: tools.fuzzy_match
//!     function_name: execute
//!   - type: api
//!     name: ols_search
//!     description: Search the ontology lookup service
//!     schema:
//!       properties:
//!         term: {type: string, description: search term}
//!       required: [term]
//!     api_url: https://www.ebi.ac.uk/ols4/api/search
//!     api_method: GET
//! ```

use super::registry::{ApiMethod, ToolBinding, ToolDefinition, ToolHandler, ToolRegistry};
use super::schema::ToolSchema;
use crate::config::{interpolate_env_vars, ConfigError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use url::Url;

/// Kind of execution binding an entry declares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    Function,
    Api,
}

/// One entry in the tools document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolEntry {
    #[serde(rename = "type")]
    pub kind: ToolKind,

    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub schema: ToolSchema,

    // function bindings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,

    // api bindings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_method: Option<String>,
}

/// The parsed tools document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsDocument {
    pub tools: Vec<ToolEntry>,
}

/// Native handlers available to `function` entries
///
/// Keys are the `function_path`/`function_name` pair from the document, so
/// the same handler name can exist under different paths.
#[derive(Default)]
pub struct HandlerTable {
    handlers: HashMap<(String, String), Arc<dyn ToolHandler>>,
}

impl HandlerTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under a path/name pair
    pub fn register(
        &mut self,
        path: impl Into<String>,
        name: impl Into<String>,
        handler: Arc<dyn ToolHandler>,
    ) {
        self.handlers.insert((path.into(), name.into()), handler);
    }

    fn resolve(&self, path: &str, name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.handlers
            .get(&(path.to_string(), name.to_string()))
            .cloned()
    }
}

impl ToolsDocument {
    /// Parse a YAML document, interpolating `${VAR}` references first
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let interpolated = interpolate_env_vars(content)?;
        serde_yaml::from_str(&interpolated).map_err(|e| ConfigError::Parse {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })
    }

    /// Parse a JSON document, interpolating `${VAR}` references first
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let interpolated = interpolate_env_vars(content)?;
        serde_json::from_str(&interpolated).map_err(|e| ConfigError::Parse {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })
    }

    /// Load a document from a file, choosing the parser by extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;

        let interpolated = interpolate_env_vars(&content)?;

        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            serde_json::from_str(&interpolated).map_err(|e| ConfigError::Parse {
                path: path.to_string_lossy().to_string(),
                message: e.to_string(),
            })
        } else {
            serde_yaml::from_str(&interpolated).map_err(|e| ConfigError::Parse {
                path: path.to_string_lossy().to_string(),
                message: e.to_string(),
            })
        }
    }

    /// Resolve every entry into a definition and build the registry
    pub fn into_registry(self, handlers: &HandlerTable) -> Result<ToolRegistry, ConfigError> {
        let mut definitions = Vec::with_capacity(self.tools.len());

        for (position, entry) in self.tools.into_iter().enumerate() {
            let binding = match entry.kind {
                ToolKind::Function => {
                    let path = entry.function_path.as_deref().ok_or_else(|| {
                        ConfigError::validation(
                            format!("tools[{}].function_path", position),
                            "function tools require function_path",
                        )
                    })?;
                    let name = entry.function_name.as_deref().ok_or_else(|| {
                        ConfigError::validation(
                            format!("tools[{}].function_name", position),
                            "function tools require function_name",
                        )
                    })?;
                    let handler = handlers.resolve(path, name).ok_or_else(|| {
                        ConfigError::validation(
                            format!("tools[{}]", position),
                            format!("no registered handler for '{}::{}'", path, name),
                        )
                    })?;
                    ToolBinding::Function { handler }
                }
                ToolKind::Api => {
                    let raw_url = entry.api_url.as_deref().ok_or_else(|| {
                        ConfigError::validation(
                            format!("tools[{}].api_url", position),
                            "api tools require api_url",
                        )
                    })?;
                    let url = Url::parse(raw_url).map_err(|e| {
                        ConfigError::validation(
                            format!("tools[{}].api_url", position),
                            format!("invalid URL '{}': {}", raw_url, e),
                        )
                    })?;
                    let method = entry
                        .api_method
                        .as_deref()
                        .unwrap_or("POST")
                        .parse::<ApiMethod>()
                        .map_err(|message| {
                            ConfigError::validation(
                                format!("tools[{}].api_method", position),
                                message,
                            )
                        })?;
                    ToolBinding::Api { url, method }
                }
            };

            definitions.push(ToolDefinition {
                name: entry.name,
                description: entry.description,
                schema: entry.schema,
                binding,
            });
        }

        ToolRegistry::new(definitions)
    }
}
