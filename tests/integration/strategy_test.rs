// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::start_page_server;
use clap::ValueEnum;
use scrapeai::config::settings::Settings;
use scrapeai::FetchStrategy;

#[test]
fn test_strategy_names() {
    assert_eq!(FetchStrategy::from_str("http", true), Ok(FetchStrategy::Http));
    assert_eq!(FetchStrategy::from_str("browser", true), Ok(FetchStrategy::Browser));
    assert_eq!(FetchStrategy::from_str("ZYTE", true), Ok(FetchStrategy::Zyte));
    assert!(FetchStrategy::from_str("curl", true).is_err());
}

#[tokio::test]
async fn test_http_strategy_fetches_raw_markup() {
    let page_url = start_page_server().await;
    let settings = Settings::with_provider_env(|_| None).unwrap();

    let fetcher = FetchStrategy::Http.build(&settings).unwrap();
    let markup = fetcher.fetch(&page_url).await.unwrap();

    assert!(markup.contains("<h1>Example Domain</h1>"));
    assert!(markup.contains("console.log"));
}
