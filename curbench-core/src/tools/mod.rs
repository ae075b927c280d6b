//! Pluggable tools: registry, schemas, bindings and configuration
//!
//! Tools are declared once in a configuration document (or built in code),
//! described to the model through the backend adapters, and invoked by name
//! when the model requests them. Execution bindings are a tagged union of
//! local callables and remote HTTP endpoints behind one `invoke` interface.

pub mod config;
pub mod error;
pub mod registry;
pub mod schema;

pub use config::{HandlerTable, ToolEntry, ToolKind, ToolsDocument};
pub use error::{ToolError, ToolResult};
pub use registry::{ApiMethod, ToolBinding, ToolDefinition, ToolHandler, ToolRegistry};
pub use schema::{ParameterSpec, ParameterType, ToolSchema};
