//! Completions module tests

use std::sync::mpsc;

use crate::completions::{
    parse_completions, CompletionClient, CompletionSettings, Engine,
};
use crate::error::Error;

fn test_client() -> CompletionClient {
    // Unroutable base URL: any accidental network call would surface as a
    // transport error instead of the asserted validation message.
    CompletionClient::builder()
        .api_key("test-api-key")
        .base_url("http://127.0.0.1:1")
        .build()
        .unwrap()
}

#[test]
fn test_client_builder_missing_key() {
    let result = CompletionClient::builder().build();
    assert!(matches!(result, Err(Error::ApiKeyMissing)));
}

#[test]
fn test_client_debug_hides_key() {
    let client = test_client();
    let debug = format!("{:?}", client);
    assert!(debug.contains("CompletionClient"));
    assert!(!debug.contains("test-api-key"));
}

#[test]
fn test_client_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<CompletionClient>();
}

#[test]
fn test_endpoint_selection() {
    let client = test_client();
    assert!(client.endpoint_url(Engine::Curie).contains("curie"));
    assert!(client.endpoint_url(Engine::Ada).contains("ada"));
    assert_eq!(
        client.endpoint_url(Engine::Davinci),
        "http://127.0.0.1:1/engines/davinci/completions"
    );
}

#[tokio::test]
async fn test_empty_api_key_rejected() {
    let client = CompletionClient::builder()
        .api_key("")
        .base_url("http://127.0.0.1:1")
        .build()
        .unwrap();

    let result = client
        .complete(Engine::Davinci, "hi", &CompletionSettings::default())
        .await;
    assert!(matches!(result, Err(Error::ApiKeyMissing)));
}

#[tokio::test]
async fn test_empty_prompt_rejected() {
    let result = test_client()
        .complete(Engine::Davinci, "", &CompletionSettings::default())
        .await;

    match result {
        Err(Error::InvalidParameters(msg)) => assert_eq!(msg, "Prompt is empty"),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_best_of_below_num_completions_rejected() {
    let settings = CompletionSettings {
        num_completions: 3,
        best_of: 2,
        ..Default::default()
    };

    let result = test_client().complete(Engine::Davinci, "hi", &settings).await;

    match result {
        Err(Error::InvalidParameters(msg)) => {
            assert_eq!(msg, "BestOf must be greater than numCompletions")
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_max_tokens_out_of_range_rejected() {
    for max_tokens in [0, 2048, 4096] {
        let settings = CompletionSettings {
            max_tokens,
            ..Default::default()
        };

        let result = test_client().complete(Engine::Davinci, "hi", &settings).await;

        match result {
            Err(Error::InvalidParameters(msg)) => {
                assert_eq!(msg, "maxTokens must be within 0 and 2048")
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_max_tokens_2047_passes_validation() {
    let settings = CompletionSettings {
        max_tokens: 2047,
        ..Default::default()
    };

    // Passes the gate, then fails in transit against the unroutable URL
    let result = test_client().complete(Engine::Davinci, "hi", &settings).await;
    assert!(matches!(result, Err(Error::Transport(_))));
}

#[tokio::test]
async fn test_submit_invokes_callback_exactly_once() {
    let (tx, rx) = mpsc::channel();

    let settings = CompletionSettings {
        best_of: 0,
        num_completions: 1,
        ..Default::default()
    };

    let handle = test_client().submit(
        Engine::Curie,
        "hi",
        settings,
        Box::new(move |outcome| {
            tx.send(outcome).unwrap();
        }),
    );
    handle.await.unwrap();

    let outcome = rx.try_recv().unwrap();
    assert!(!outcome.success);
    assert!(outcome.completions.is_empty());
    assert_eq!(outcome.error, "BestOf must be greater than numCompletions");

    // No second delivery
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_submit_transport_failure_outcome() {
    let (tx, rx) = mpsc::channel();

    let handle = test_client().submit(
        Engine::Ada,
        "hi",
        CompletionSettings::default(),
        Box::new(move |outcome| {
            tx.send(outcome).unwrap();
        }),
    );
    handle.await.unwrap();

    let outcome = rx.try_recv().unwrap();
    assert!(!outcome.success);
    assert!(outcome.completions.is_empty());
    assert!(outcome.error.starts_with("Error sending request"));
}

#[test]
fn test_parse_completions_success() {
    let completions = parse_completions(r#"{"choices":[{"text":"hello"}]}"#).unwrap();
    assert_eq!(completions.len(), 1);
    assert_eq!(completions[0].text, "hello");
}

#[test]
fn test_parse_completions_preserves_order() {
    let body = r#"{"choices":[
        {"text":"first","index":0},
        {"text":"second","index":1},
        {"text":"third","index":2}
    ]}"#;

    let completions = parse_completions(body).unwrap();
    let texts: Vec<&str> = completions.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, ["first", "second", "third"]);
}

#[test]
fn test_parse_completions_api_error() {
    let result = parse_completions(r#"{"error":{"message":"bad request"}}"#);
    match result {
        Err(Error::Api) => assert_eq!(Error::Api.to_string(), "Api error"),
        other => panic!("expected api error, got {:?}", other),
    }
}

#[test]
fn test_parse_completions_malformed_json() {
    let result = parse_completions("not json at all");
    assert!(matches!(result, Err(Error::Parse(_))));
}

#[test]
fn test_outcome_from_parse_result() {
    let outcome: crate::completions::CompletionOutcome =
        parse_completions(r#"{"choices":[{"text":"hello"}]}"#).into();
    assert!(outcome.success);
    assert!(outcome.error.is_empty());
    assert_eq!(outcome.completions.len(), 1);
    assert_eq!(outcome.completions[0].text, "hello");

    let outcome: crate::completions::CompletionOutcome =
        parse_completions(r#"{"error":{"message":"bad request"}}"#).into();
    assert!(!outcome.success);
    assert!(outcome.completions.is_empty());
    assert_eq!(outcome.error, "Api error");
}

#[test]
fn test_parse_completions_empty_choices() {
    let completions = parse_completions(r#"{"choices":[]}"#).unwrap();
    assert!(completions.is_empty());
}
