//! Tests for model identifier classification

use curbench_core::providers::adapter::BackendKind;
use curbench_core::providers::router::classify;
use curbench_core::EngineError;
use proptest::prelude::*;
use test_case::test_case;

#[test_case("openai/gpt-4-turbo" ; "openai slash model")]
#[test_case("anthropic/claude-3-opus" ; "anthropic via openrouter")]
#[test_case("google/gemini-pro" ; "google via openrouter")]
#[test_case("mistralai/mixtral-8x7b-instruct" ; "mistral via openrouter")]
#[test_case("deepseek/deepseek-chat-v3-0324" ; "dots inside model segment")]
fn classifies_as_openrouter(id: &str) {
    assert_eq!(classify(id).unwrap(), BackendKind::OpenRouter);
}

#[test_case("anthropic.claude-v2" ; "two dot segments")]
#[test_case("anthropic.claude-3-sonnet-20240229-v1:0" ; "dotted with version")]
#[test_case("us.anthropic.claude-3-5-sonnet-20241022-v2:0" ; "regional prefix")]
#[test_case("global.anthropic.claude-sonnet-4-5-20250929-v1:0" ; "global prefix")]
#[test_case("amazon.titan-text-express-v1" ; "amazon titan")]
#[test_case("meta.llama3-70b-instruct-v1:0" ; "meta llama")]
fn classifies_as_bedrock(id: &str) {
    assert_eq!(classify(id).unwrap(), BackendKind::Bedrock);
}

#[test_case("" ; "empty string")]
#[test_case("gpt-4" ; "bare name")]
#[test_case("a/b/c" ; "two slashes")]
#[test_case("/gpt-4" ; "empty provider segment")]
#[test_case("openai/" ; "empty model segment")]
#[test_case("openai/gpt-4:free" ; "colon in slash form")]
#[test_case("anthropic.claude:" ; "empty version")]
#[test_case("anthropic.claude:0:1" ; "two colons")]
#[test_case(".claude-v2" ; "leading dot")]
#[test_case("claude." ; "trailing dot")]
#[test_case("anthropic..claude" ; "empty dot segment")]
#[test_case("claude:1" ; "version without dots")]
fn rejects_unrecognized(id: &str) {
    assert!(matches!(
        classify(id),
        Err(EngineError::UnrecognizedModelFormat { .. })
    ));
}

#[test]
fn classification_is_idempotent() {
    for id in [
        "openai/gpt-4-turbo",
        "anthropic.claude-v2:1",
        "not a model id",
    ] {
        let first = classify(id).map_err(|e| e.to_string());
        for _ in 0..10 {
            assert_eq!(classify(id).map_err(|e| e.to_string()), first);
        }
    }
}

proptest! {
    /// Classification is total: no input panics, and repeated calls agree
    #[test]
    fn classification_is_total_and_stable(id in "\\PC{0,40}") {
        let first = classify(&id).map_err(|e| e.to_string());
        let second = classify(&id).map_err(|e| e.to_string());
        prop_assert_eq!(first, second);
    }

    /// Every well-formed slash identifier routes to OpenRouter
    #[test]
    fn well_formed_slash_ids_route_to_openrouter(
        provider in "[a-z][a-z0-9-]{0,12}",
        model in "[a-z0-9][a-z0-9.-]{0,20}",
    ) {
        let id = format!("{}/{}", provider, model);
        prop_assert_eq!(classify(&id).unwrap(), BackendKind::OpenRouter);
    }

    /// Every well-formed dotted identifier routes to Bedrock
    #[test]
    fn well_formed_dotted_ids_route_to_bedrock(
        segments in prop::collection::vec("[a-z0-9-]{1,10}", 2..5),
        version in prop::option::of("[0-9]{1,3}"),
    ) {
        let mut id = segments.join(".");
        if let Some(version) = version {
            id.push(':');
            id.push_str(&version);
        }
        prop_assert_eq!(classify(&id).unwrap(), BackendKind::Bedrock);
    }
}
