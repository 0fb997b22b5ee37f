// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::Context;
use clap::Parser;
use scrapeai::config::settings::Settings;
use scrapeai::utils::telemetry;
use scrapeai::{FetchStrategy, ScrapeAiRequest, ScrapeOptions, ScrapeService};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// 使用大语言模型从网页中抽取结构化数据
#[derive(Debug, Parser)]
#[command(name = "scrapeai", version, about)]
struct Cli {
    /// 目标页面URL
    url: String,

    /// 描述需要抽取内容的提示词
    prompt: String,

    /// JSON Schema 文件，缺省时输出 `data` 字段下的字符串数组
    #[arg(long)]
    schema_file: Option<PathBuf>,

    /// 页面获取方式
    #[arg(long, value_enum, default_value_t = FetchStrategy::Browser)]
    fetcher: FetchStrategy,

    /// 整个抓取过程的时限（秒）
    #[arg(long)]
    timeout: Option<u64>,

    /// 以 JSON 格式输出日志
    #[arg(long)]
    json_logs: bool,
}

/// 主函数
///
/// 读取命令行参数，执行一次抓取并把模型返回的 JSON 打印到标准输出
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    telemetry::init_telemetry(cli.json_logs);

    let settings = Settings::new().context("failed to load configuration")?;
    info!("Configuration loaded: {:?}", settings.llm);

    let schema = match &cli.schema_file {
        Some(path) => Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read schema file {}", path.display()))?,
        ),
        None => None,
    };

    let cancellation = CancellationToken::new();
    let mut options = ScrapeOptions {
        schema,
        cancellation: cancellation.clone(),
        ..ScrapeOptions::default()
    };
    if let Some(secs) = cli.timeout {
        options = options.with_timeout(Duration::from_secs(secs));
    }

    let request = ScrapeAiRequest::new(cli.url, cli.prompt, options)?;
    let service = ScrapeService::from_settings(&settings.llm)?;
    let fetcher = cli.fetcher.build(&settings)?;

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling scrape");
            cancellation.cancel();
        }
    });

    let result = service.scrape(fetcher.as_ref(), &request).await?;
    println!("{}", result.content);
    Ok(())
}
