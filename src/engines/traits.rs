// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use thiserror::Error;

/// 引擎错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// 请求失败
    #[error("Request failed: {0}")]
    RequestFailed(reqwest::Error),
    /// 非成功状态码
    #[error("Request failed with status {status}: {body}")]
    Status { status: u16, body: String },
    /// 配置错误
    #[error("Configuration error: {0}")]
    Config(String),
    /// 浏览器错误
    #[error("Browser error: {0}")]
    Browser(String),
    /// 超时
    #[error("Timeout")]
    Timeout,
}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        EngineError::RequestFailed(err)
    }
}

impl EngineError {
    /// 判断错误是否可重试
    ///
    /// # 返回值
    ///
    /// 如果错误是可重试的则返回true，否则返回false
    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::RequestFailed(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            EngineError::Status { status, .. } => *status == 429 || *status >= 500,
            EngineError::Timeout => true,
            EngineError::Config(_) | EngineError::Browser(_) => false,
        }
    }
}

/// 页面获取特质
///
/// 编排器只依赖该特质，不关心具体的获取策略
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// 获取页面原始标记
    async fn fetch(&self, url: &str) -> Result<String, EngineError>;

    /// 引擎名称
    fn name(&self) -> &'static str;
}
