// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::{FetchSettings, ZyteSettings, ZYTE_API_KEY_VAR};
use crate::engines::traits::{EngineError, PageFetcher};
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::debug;

/// 请求代理返回渲染后 HTML 的请求头
pub const ZYTE_BROWSER_HTML_HEADER: &str = "Zyte-Browser-Html";

/// Zyte 代理引擎
///
/// 通过 Zyte 静态代理获取页面，用于对抗反爬虫。
/// API密钥作为代理认证的用户名，密码为空。
///
/// 代理自己终止 TLS 并出示自己的证书，因此对目标站点的 TLS 校验被关闭。
#[derive(Debug, Clone)]
pub struct ZyteEngine {
    client: reqwest::Client,
    proxy_endpoint: String,
}

impl ZyteEngine {
    /// 根据配置创建代理引擎
    ///
    /// # 错误
    ///
    /// * API密钥缺失时返回 `EngineError::Config`
    /// * 代理端点非法时返回 `EngineError::Config`
    pub fn new(zyte: &ZyteSettings, fetch: &FetchSettings) -> Result<Self, EngineError> {
        let api_key = zyte
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                EngineError::Config(format!("{} is not set in the environment", ZYTE_API_KEY_VAR))
            })?;

        let proxy = reqwest::Proxy::all(zyte.proxy_endpoint.as_str())
            .map_err(|e| EngineError::Config(format!("invalid proxy endpoint: {}", e)))?
            .basic_auth(api_key, "");

        let client = reqwest::Client::builder()
            .proxy(proxy)
            .danger_accept_invalid_certs(true)
            .timeout(Duration::from_secs(fetch.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            proxy_endpoint: zyte.proxy_endpoint.clone(),
        })
    }

    pub fn proxy_endpoint(&self) -> &str {
        &self.proxy_endpoint
    }
}

#[async_trait]
impl PageFetcher for ZyteEngine {
    async fn fetch(&self, url: &str) -> Result<String, EngineError> {
        let start = Instant::now();
        let response = self
            .client
            .get(url)
            .header(ZYTE_BROWSER_HTML_HEADER, "true")
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let content = response.text().await?;
        debug!(
            "Fetched {} bytes from {} through {} in {}ms",
            content.len(),
            url,
            self.proxy_endpoint,
            start.elapsed().as_millis()
        );
        Ok(content)
    }

    fn name(&self) -> &'static str {
        "zyte"
    }
}

#[cfg(test)]
#[path = "zyte_engine_test.rs"]
mod tests;
