// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use scrapeai::engines::traits::EngineError;
use scrapeai::utils::errors::{ConfigError, InvokeError, ParseError, SchemaError};
use scrapeai::{ScrapeError, Stage};
use std::time::Duration;

#[test]
fn test_stage_names() {
    let cases = [
        (Stage::FetchingPage, "fetching page"),
        (Stage::NormalizingPage, "normalizing page"),
        (Stage::ValidatingSchema, "validating schema"),
        (Stage::InvokingModel, "invoking model"),
        (Stage::ValidatingResponse, "validating response"),
    ];
    for (stage, name) in cases {
        assert_eq!(stage.to_string(), name);
    }
}

#[test]
fn test_errors_carry_stage_prefix() {
    let err = ScrapeError::Fetch(EngineError::Timeout);
    assert!(err.to_string().starts_with("fetching page:"));

    let err = ScrapeError::Schema(SchemaError::MissingItems {
        path: "$.properties.data".to_string(),
    });
    assert_eq!(
        err.to_string(),
        "validating schema: $.properties.data: an array must contain an items schema"
    );

    let err = ScrapeError::Timeout {
        stage: Stage::InvokingModel,
        timeout: Duration::from_secs(3),
    };
    assert!(err.to_string().starts_with("invoking model:"));
    assert_eq!(err.stage(), Some(Stage::InvokingModel));
}

#[test]
fn test_invalid_request_has_no_stage() {
    let err = ScrapeError::InvalidRequest(ConfigError::MissingCredential("OPENAI_API_KEY"));
    assert_eq!(err.stage(), None);
    assert!(err.to_string().contains("OPENAI_API_KEY is not set"));
}

#[test]
fn test_retryable_provider_statuses() {
    let provider = |status| InvokeError::Provider {
        status,
        body: String::new(),
    };
    assert!(provider(429).is_retryable());
    assert!(provider(503).is_retryable());
    assert!(!provider(400).is_retryable());
    assert!(!provider(401).is_retryable());
    assert!(!InvokeError::EmptyResponse.is_retryable());
    assert!(!InvokeError::Refused("no".to_string()).is_retryable());
}

#[test]
fn test_error_chain_reports_cause_once() {
    let err = ScrapeError::Invoke(InvokeError::Provider {
        status: 500,
        body: "upstream exploded".to_string(),
    });
    assert!(std::error::Error::source(&err).is_none());

    let report = format!("{:#}", anyhow::Error::from(err));
    assert_eq!(report.matches("upstream exploded").count(), 1);
    assert!(report.starts_with("invoking model:"));
}

#[test]
fn test_json_cause_reported_once() {
    let cause = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
    let detail = cause.to_string();
    let err = ScrapeError::Response(ParseError::InvalidJson(cause));

    let report = format!("{:#}", anyhow::Error::from(err));
    assert_eq!(report.matches(detail.as_str()).count(), 1);
}
