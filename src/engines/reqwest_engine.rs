// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::FetchSettings;
use crate::engines::traits::{EngineError, PageFetcher};
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// HTTP 获取引擎
///
/// 基于reqwest实现的基本HTTP GET，适用于不依赖JavaScript的静态页面
#[derive(Debug, Clone)]
pub struct ReqwestEngine {
    client: reqwest::Client,
}

impl ReqwestEngine {
    pub fn new(settings: &FetchSettings) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for ReqwestEngine {
    /// 执行HTTP获取
    ///
    /// # 参数
    ///
    /// * `url` - 目标URL
    ///
    /// # 返回值
    ///
    /// * `Ok(String)` - 响应体，不论状态码
    /// * `Err(EngineError)` - 网络或读取失败
    async fn fetch(&self, url: &str) -> Result<String, EngineError> {
        let start = Instant::now();
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            // Error pages still carry text the caller may want extracted
            warn!("GET {} returned status {}", url, status);
        }

        let content = response.text().await?;
        debug!(
            "Fetched {} bytes from {} in {}ms",
            content.len(),
            url,
            start.elapsed().as_millis()
        );
        Ok(content)
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}

#[cfg(test)]
#[path = "reqwest_engine_test.rs"]
mod tests;
