//! Model identifier classification and adapter construction
//!
//! Routing is a pure function of the identifier's lexical shape:
//!
//! - `provider/model-name` - exactly one `/`, two non-empty segments, no
//!   `:` anywhere - selects OpenRouter.
//! - `prefix.segment[.segment...][:version]` - no `/`, at least two
//!   non-empty dot segments, optional single trailing `:version` - selects
//!   Bedrock.
//!
//! Anything else is a configuration error raised before any network call.

use crate::config::{Credentials, EngineConfig};
use crate::error::EngineError;
use crate::providers::adapter::{BackendAdapter, BackendKind};
use crate::providers::bedrock::BedrockAdapter;
use crate::providers::openrouter::OpenRouterAdapter;

/// Classify a model identifier into its backend family
///
/// Pure and total: same input, same answer, no side effects.
pub fn classify(model_id: &str) -> Result<BackendKind, EngineError> {
    let unrecognized = || EngineError::UnrecognizedModelFormat {
        model: model_id.to_string(),
    };

    if model_id.contains('/') {
        // OpenRouter shape: exactly one slash, both segments non-empty,
        // no colon anywhere
        let mut segments = model_id.split('/');
        let provider = segments.next().unwrap_or_default();
        let model = segments.next().unwrap_or_default();

        if segments.next().is_none()
            && !provider.is_empty()
            && !model.is_empty()
            && !model_id.contains(':')
        {
            return Ok(BackendKind::OpenRouter);
        }
        return Err(unrecognized());
    }

    // Bedrock shape: dot-delimited with an optional trailing colon-version
    let mut parts = model_id.split(':');
    let base = parts.next().unwrap_or_default();
    let version = parts.next();
    if parts.next().is_some() {
        return Err(unrecognized());
    }
    if let Some(version) = version {
        if version.is_empty() {
            return Err(unrecognized());
        }
    }

    let mut dotted = base.split('.');
    let first = dotted.next().unwrap_or_default();
    if first.is_empty() {
        return Err(unrecognized());
    }
    let mut rest = 0usize;
    for segment in dotted {
        if segment.is_empty() {
            return Err(unrecognized());
        }
        rest += 1;
    }
    if rest == 0 {
        // A bare name with no dots matches neither shape
        return Err(unrecognized());
    }

    Ok(BackendKind::Bedrock)
}

/// Construct the adapter for a classified backend
pub fn build_adapter(
    kind: BackendKind,
    model_id: &str,
    config: &EngineConfig,
    credentials: &Credentials,
) -> Box<dyn BackendAdapter> {
    match kind {
        BackendKind::Bedrock => Box::new(BedrockAdapter::new(model_id, config, credentials)),
        BackendKind::OpenRouter => Box::new(OpenRouterAdapter::new(model_id, config, credentials)),
    }
}
