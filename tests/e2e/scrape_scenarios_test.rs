// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::integration::helpers::{settings_for, start_fake_provider, EXAMPLE_PAGE};
use async_trait::async_trait;
use axum::http::StatusCode;
use scrapeai::config::settings::Settings;
use scrapeai::engines::reqwest_engine::ReqwestEngine;
use scrapeai::engines::traits::{EngineError, PageFetcher};
use scrapeai::utils::errors::{InvokeError, SchemaError};
use scrapeai::{ScrapeAiRequest, ScrapeError, ScrapeOptions, ScrapeService, Stage};
use serde::Deserialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// 返回固定页面的获取器
struct FixedPageFetcher {
    markup: &'static str,
    calls: AtomicUsize,
}

impl FixedPageFetcher {
    fn example() -> Self {
        Self {
            markup: EXAMPLE_PAGE,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PageFetcher for FixedPageFetcher {
    async fn fetch(&self, _url: &str) -> Result<String, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.markup.to_string())
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// 永远不返回的获取器
struct HangingFetcher;

#[async_trait]
impl PageFetcher for HangingFetcher {
    async fn fetch(&self, _url: &str) -> Result<String, EngineError> {
        std::future::pending::<()>().await;
        Ok(String::new())
    }

    fn name(&self) -> &'static str {
        "hanging"
    }
}

#[derive(Debug, Deserialize)]
struct Article {
    headline: String,
    body: String,
}

#[tokio::test]
async fn scenario_default_schema_extracts_headline() {
    let provider =
        start_fake_provider(StatusCode::OK, r#"{"data":["Example Domain","illustrative examples"]}"#)
            .await;
    let service = ScrapeService::from_settings(&settings_for(&provider).llm).unwrap();
    let fetcher = FixedPageFetcher::example();

    let result = service
        .scrape_url(&fetcher, "https://example.com", "Extract the main headline", None)
        .await
        .unwrap();

    let value: serde_json::Value = result.parse().unwrap();
    let data = value["data"].as_array().unwrap();
    assert!(!data.is_empty());
    assert_eq!(data[0], "Example Domain");
    assert_eq!(result.url, "https://example.com");
}

#[tokio::test]
async fn scenario_custom_schema_round_trip() {
    let schema = r#"{"type":"object","properties":{"headline":{"type":"string"},"body":{"type":"string"}},"additionalProperties":false,"required":["headline","body"]}"#;
    let provider = start_fake_provider(
        StatusCode::OK,
        r#"{"headline":"Example Domain","body":"This domain is for use in illustrative examples in documents."}"#,
    )
    .await;
    let service = ScrapeService::from_settings(&settings_for(&provider).llm).unwrap();
    let fetcher = FixedPageFetcher::example();

    let result = service
        .scrape_url(&fetcher, "https://example.com", "Extract the article", Some(schema))
        .await
        .unwrap();

    let article: Article = result.parse().unwrap();
    assert_eq!(article.headline, "Example Domain");
    assert!(article.body.starts_with("This domain"));
    assert_eq!(
        provider.bodies()[0]["response_format"]["json_schema"]["schema"].to_string(),
        schema
    );
}

#[tokio::test]
async fn scenario_nested_object_without_additional_properties_is_rejected() {
    let schema = r#"{
        "type": "object",
        "properties": {
            "articles": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "headline": { "type": "string" },
                        "body": { "type": "string" }
                    },
                    "required": ["headline", "body"]
                }
            }
        },
        "additionalProperties": false,
        "required": ["articles"]
    }"#;
    let provider = start_fake_provider(StatusCode::OK, "{}").await;
    let service = ScrapeService::from_settings(&settings_for(&provider).llm).unwrap();
    let fetcher = FixedPageFetcher::example();

    let err = service
        .scrape_url(&fetcher, "https://example.com", "Extract the articles", Some(schema))
        .await
        .unwrap_err();

    match &err {
        ScrapeError::Schema(schema_err @ SchemaError::MissingAdditionalProperties { .. }) => {
            assert_eq!(schema_err.path(), Some("$.properties.articles.items"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(err.stage(), Some(Stage::ValidatingSchema));
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    assert_eq!(provider.hits(), 0);
}

#[tokio::test]
async fn scenario_unreachable_host_skips_model() {
    let provider = start_fake_provider(StatusCode::OK, "{}").await;
    let settings = settings_for(&provider);
    let service = ScrapeService::from_settings(&settings.llm).unwrap();
    let fetcher = ReqwestEngine::new(&settings.fetch).unwrap();

    let err = service
        .scrape_url(&fetcher, "http://127.0.0.1:1/", "Extract the main headline", None)
        .await
        .unwrap_err();

    assert!(matches!(err, ScrapeError::Fetch(_)));
    assert!(err.to_string().starts_with("fetching page:"));
    assert_eq!(provider.hits(), 0);
}

#[tokio::test]
async fn scenario_provider_failure_is_surfaced() {
    let provider = start_fake_provider(StatusCode::INTERNAL_SERVER_ERROR, "unused").await;
    let service = ScrapeService::from_settings(&settings_for(&provider).llm).unwrap();
    let fetcher = FixedPageFetcher::example();

    let err = service
        .scrape_url(&fetcher, "https://example.com", "Extract the main headline", None)
        .await
        .unwrap_err();

    match &err {
        ScrapeError::Invoke(invoke) => {
            assert!(matches!(invoke, InvokeError::Provider { status: 500, .. }));
            assert!(invoke.is_retryable());
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(provider.hits(), 1);
}

#[tokio::test]
async fn scenario_caller_cancels_hanging_fetch() {
    let provider = start_fake_provider(StatusCode::OK, "{}").await;
    let service = ScrapeService::from_settings(&settings_for(&provider).llm).unwrap();
    let token = CancellationToken::new();

    let request = ScrapeAiRequest::new(
        "https://example.com",
        "Extract the main headline",
        ScrapeOptions::default().with_cancellation(token.clone()),
    )
    .unwrap();

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(25)).await;
        token.cancel();
    });
    let err = service.scrape(&HangingFetcher, &request).await.unwrap_err();
    canceller.await.unwrap();

    assert!(matches!(err, ScrapeError::Cancelled { stage: Stage::FetchingPage }));
    assert_eq!(provider.hits(), 0);
}

#[tokio::test]
async fn scenario_deadline_bounds_hanging_fetch() {
    let settings = Settings::with_provider_env(|key| {
        (key == "OPENAI_API_KEY").then(|| "test-key".to_string())
    })
    .unwrap();
    let service = ScrapeService::from_settings(&settings.llm).unwrap();

    let request = ScrapeAiRequest::new(
        "https://example.com",
        "Extract the main headline",
        ScrapeOptions::default().with_timeout(Duration::from_millis(50)),
    )
    .unwrap();
    let err = service.scrape(&HangingFetcher, &request).await.unwrap_err();

    match err {
        ScrapeError::Timeout { stage, timeout } => {
            assert_eq!(stage, Stage::FetchingPage);
            assert_eq!(timeout, Duration::from_millis(50));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}
