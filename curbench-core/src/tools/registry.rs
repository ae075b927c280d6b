//! Tool registry: name-to-binding dispatch behind one invoke interface
//!
//! A binding is either a local callable or a remote HTTP endpoint; the
//! registry is built once at load time and never mutated during a run.

use super::error::ToolError;
use super::schema::ToolSchema;
use crate::config::ConfigError;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// A local callable backing a function tool
pub trait ToolHandler: Send + Sync {
    /// Invoke the tool with validated arguments
    fn call(&self, arguments: &Value) -> Result<Value, String>;
}

impl<F> ToolHandler for F
where
    F: Fn(&Value) -> Result<Value, String> + Send + Sync,
{
    fn call(&self, arguments: &Value) -> Result<Value, String> {
        self(arguments)
    }
}

/// HTTP method for a remote tool binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl ApiMethod {
    fn as_reqwest(&self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Delete => reqwest::Method::DELETE,
            Self::Patch => reqwest::Method::PATCH,
        }
    }
}

impl FromStr for ApiMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            "PATCH" => Ok(Self::Patch),
            other => Err(format!("unsupported HTTP method '{}'", other)),
        }
    }
}

impl fmt::Display for ApiMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Delete => write!(f, "DELETE"),
            Self::Patch => write!(f, "PATCH"),
        }
    }
}

/// Execution binding of a tool
#[derive(Clone)]
pub enum ToolBinding {
    /// Local callable
    Function { handler: Arc<dyn ToolHandler> },
    /// Remote HTTP endpoint
    Api { url: Url, method: ApiMethod },
}

impl fmt::Debug for ToolBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function { .. } => write!(f, "Function"),
            Self::Api { url, method } => write!(f, "Api({} {})", method, url),
        }
    }
}

/// A tool made available to the model
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    /// Unique name within one registry
    pub name: String,

    /// Human description shown to the model
    pub description: String,

    /// Parameter schema
    pub schema: ToolSchema,

    /// Execution binding
    pub binding: ToolBinding,
}

impl ToolDefinition {
    /// Define a function-backed tool
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: ToolSchema,
        handler: Arc<dyn ToolHandler>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            schema,
            binding: ToolBinding::Function { handler },
        }
    }

    /// Define an HTTP-API-backed tool
    pub fn api(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: ToolSchema,
        url: Url,
        method: ApiMethod,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            schema,
            binding: ToolBinding::Api { url, method },
        }
    }
}

/// Mapping from tool name to binding, built once, read-only afterwards
pub struct ToolRegistry {
    tools: Vec<ToolDefinition>,
    index: HashMap<String, usize>,
    client: reqwest::Client,
}

impl ToolRegistry {
    /// Build a registry from ordered definitions
    ///
    /// Rejects duplicate names and schemas whose `required` list names
    /// undeclared parameters.
    pub fn new(tools: Vec<ToolDefinition>) -> Result<Self, ConfigError> {
        Self::with_timeout(tools, Duration::from_secs(300))
    }

    /// Build a registry with a custom remote-call timeout
    pub fn with_timeout(
        tools: Vec<ToolDefinition>,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let mut index = HashMap::new();
        for (position, tool) in tools.iter().enumerate() {
            if tool.name.is_empty() {
                return Err(ConfigError::validation(
                    format!("tools[{}].name", position),
                    "tool name must not be empty",
                ));
            }
            if index.insert(tool.name.clone(), position).is_some() {
                return Err(ConfigError::validation(
                    format!("tools[{}].name", position),
                    format!("duplicate tool name '{}'", tool.name),
                ));
            }
            tool.schema.check().map_err(|message| {
                ConfigError::validation(format!("tools[{}].schema", position), message)
            })?;
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ConfigError::validation("tools", format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            tools,
            index,
            client,
        })
    }

    /// Ordered tool definitions, for inclusion in the model-facing schema
    pub fn describe(&self) -> &[ToolDefinition] {
        &self.tools
    }

    /// Whether the registry holds no tools
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Invoke a tool by name with the model-supplied arguments
    ///
    /// Arguments are validated against the declared schema before any
    /// binding runs.
    pub async fn invoke(&self, name: &str, arguments: &Value) -> Result<Value, ToolError> {
        let tool = match self.index.get(name) {
            Some(&position) => &self.tools[position],
            None => {
                warn!(tool = name, "tool not found in registry");
                return Err(ToolError::NotFound {
                    name: name.to_string(),
                });
            }
        };

        if let Err(violations) = tool.schema.validate(arguments) {
            return Err(ToolError::InvalidArguments {
                name: name.to_string(),
                violations,
            });
        }

        debug!(tool = name, binding = ?tool.binding, "invoking tool");

        match &tool.binding {
            ToolBinding::Function { handler } => {
                handler.call(arguments).map_err(|message| ToolError::Handler {
                    name: name.to_string(),
                    message,
                })
            }
            ToolBinding::Api { url, method } => {
                self.invoke_remote(name, url, *method, arguments).await
            }
        }
    }

    async fn invoke_remote(
        &self,
        name: &str,
        url: &Url,
        method: ApiMethod,
        arguments: &Value,
    ) -> Result<Value, ToolError> {
        let request = self.client.request(method.as_reqwest(), url.clone());

        // GET carries arguments as query parameters, everything else as a
        // JSON body
        let request = if method == ApiMethod::Get {
            let pairs: Vec<(String, String)> = arguments
                .as_object()
                .map(|object| {
                    object
                        .iter()
                        .map(|(key, value)| {
                            let rendered = match value {
                                Value::String(s) => s.clone(),
                                other => other.to_string(),
                            };
                            (key.clone(), rendered)
                        })
                        .collect()
                })
                .unwrap_or_default();
            request.query(&pairs)
        } else {
            request.json(arguments)
        };

        let response = request.send().await.map_err(|e| ToolError::Network {
            name: name.to_string(),
            detail: e.to_string(),
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| ToolError::Network {
            name: name.to_string(),
            detail: format!("failed to read response body: {}", e),
        })?;

        if !status.is_success() {
            return Err(ToolError::Execution {
                name: name.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        // Endpoints that answer with plain text are passed through as a
        // JSON string
        Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.iter().map(|t| &t.name).collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn echo_tool() -> ToolDefinition {
        let schema: ToolSchema = serde_json::from_value(json!({
            "properties": {"text": {"type": "string", "description": "text to echo"}},
            "required": ["text"]
        }))
        .unwrap();

        ToolDefinition::function(
            "echo",
            "Echo the input back",
            schema,
            Arc::new(|args: &Value| -> Result<Value, String> {
                Ok(json!({"echo": args["text"]}))
            }),
        )
    }

    #[tokio::test]
    async fn test_invoke_function_tool() {
        let registry = ToolRegistry::new(vec![echo_tool()]).unwrap();
        let result = registry
            .invoke("echo", &json!({"text": "hello"}))
            .await
            .unwrap();
        assert_eq!(result, json!({"echo": "hello"}));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let registry = ToolRegistry::new(vec![echo_tool()]).unwrap();
        let err = registry.invoke("missing", &json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::NotFound { ref name } if name == "missing"));
    }

    #[tokio::test]
    async fn test_invalid_arguments_skip_handler() {
        let schema: ToolSchema = serde_json::from_value(json!({
            "properties": {"text": {"type": "string"}},
            "required": ["text"]
        }))
        .unwrap();
        let tool = ToolDefinition::function(
            "strict",
            "Never reached on bad arguments",
            schema,
            Arc::new(|_: &Value| -> Result<Value, String> {
                panic!("handler must not run on invalid arguments")
            }),
        );

        let registry = ToolRegistry::new(vec![tool]).unwrap();
        let err = registry.invoke("strict", &json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = ToolRegistry::new(vec![echo_tool(), echo_tool()]);
        assert!(result.is_err());
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("get".parse::<ApiMethod>().unwrap(), ApiMethod::Get);
        assert_eq!("POST".parse::<ApiMethod>().unwrap(), ApiMethod::Post);
        assert!("TRACE".parse::<ApiMethod>().is_err());
    }
}
