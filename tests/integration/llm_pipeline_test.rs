// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{settings_for, start_fake_provider, start_page_server};
use axum::http::StatusCode;
use scrapeai::config::settings::Settings;
use scrapeai::domain::models::schema_contract::DEFAULT_SCHEMA;
use scrapeai::utils::errors::{ConfigError, InvokeError, ParseError};
use scrapeai::{FetchStrategy, ScrapeError, ScrapeService, Stage};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Headlines {
    data: Vec<String>,
}

#[tokio::test]
async fn test_http_pipeline_against_fake_provider() {
    let provider = start_fake_provider(StatusCode::OK, r#"{"data":["Example Domain"]}"#).await;
    let page_url = start_page_server().await;
    let settings = settings_for(&provider);

    let service = ScrapeService::from_settings(&settings.llm).unwrap();
    let fetcher = FetchStrategy::Http.build(&settings).unwrap();

    let result = service
        .scrape_url(fetcher.as_ref(), &page_url, "Extract the main headline", None)
        .await
        .unwrap();

    let headlines: Headlines = result.parse().unwrap();
    assert_eq!(headlines.data, vec!["Example Domain".to_string()]);
    assert_eq!(provider.hits(), 1);

    let body = &provider.bodies()[0];
    assert_eq!(body["model"], "gpt-4o-mini");
    assert_eq!(body["temperature"], 0.0);
    assert_eq!(body["seed"], 42);
    assert_eq!(body["response_format"]["json_schema"]["name"], "scrape_result");
    assert_eq!(body["response_format"]["json_schema"]["strict"], true);
    assert_eq!(body["response_format"]["json_schema"]["schema"].to_string(), DEFAULT_SCHEMA);

    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["role"], "user");
    let content = messages[0]["content"].as_str().unwrap();
    assert!(content.starts_with("Extract the main headline\n\n"));
    assert!(content.contains("<h1>Example Domain</h1>"));
    assert!(!content.contains("console.log"));
    assert!(!content.contains("background"));
}

#[tokio::test]
async fn test_identical_inputs_send_identical_requests() {
    let provider = start_fake_provider(StatusCode::OK, r#"{"data":[]}"#).await;
    let page_url = start_page_server().await;
    let settings = settings_for(&provider);

    let service = ScrapeService::from_settings(&settings.llm).unwrap();
    let fetcher = FetchStrategy::Http.build(&settings).unwrap();

    for _ in 0..2 {
        service
            .scrape_url(fetcher.as_ref(), &page_url, "Extract the main headline", None)
            .await
            .unwrap();
    }

    let bodies = provider.bodies();
    assert_eq!(bodies.len(), 2);
    assert_eq!(bodies[0], bodies[1]);
}

#[tokio::test]
async fn test_provider_error_skips_response_validation() {
    let provider = start_fake_provider(StatusCode::INTERNAL_SERVER_ERROR, "unused").await;
    let page_url = start_page_server().await;
    let settings = settings_for(&provider);

    let service = ScrapeService::from_settings(&settings.llm).unwrap();
    let fetcher = FetchStrategy::Http.build(&settings).unwrap();

    let err = service
        .scrape_url(fetcher.as_ref(), &page_url, "Extract", None)
        .await
        .unwrap_err();

    match &err {
        ScrapeError::Invoke(InvokeError::Provider { status, body }) => {
            assert_eq!(*status, 500);
            assert!(body.contains("internal error"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(err.stage(), Some(Stage::InvokingModel));
    assert!(err.to_string().contains("status code: 500"));
}

#[tokio::test]
async fn test_non_json_model_output() {
    let provider = start_fake_provider(StatusCode::OK, "The headline is Example Domain").await;
    let page_url = start_page_server().await;
    let settings = settings_for(&provider);

    let service = ScrapeService::from_settings(&settings.llm).unwrap();
    let fetcher = FetchStrategy::Http.build(&settings).unwrap();

    let err = service
        .scrape_url(fetcher.as_ref(), &page_url, "Extract", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ScrapeError::Response(ParseError::InvalidJson(_))));
}

#[test]
fn test_missing_openai_key() {
    let settings = Settings::with_provider_env(|_| None).unwrap();
    let err = ScrapeService::from_settings(&settings.llm).err().unwrap();
    assert!(matches!(err, ConfigError::MissingCredential("OPENAI_API_KEY")));
}
