// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::EngineError;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// 配置错误类型
///
/// 凭据缺失或请求参数非法，属于致命错误，不会重试
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} is not set in the environment")]
    MissingCredential(&'static str),

    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },

    #[error("failed to load settings: {0}")]
    Load(config::ConfigError),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::Load(err)
    }
}

/// Schema 校验错误类型
///
/// 每个变体都携带出错节点的 JSON 路径（例如 `$.properties.data.items`）
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("schema is not valid json: {0}")]
    Malformed(serde_json::Error),

    #[error("{path}: an object must contain the additionalProperties field and it must be false")]
    MissingAdditionalProperties { path: String },

    #[error("{path}: an object must contain a properties object")]
    MissingProperties { path: String },

    #[error("{path}: each value in properties must be in the required array and vice versa ({detail})")]
    RequiredMismatch { path: String, detail: String },

    #[error("{path}: an array must contain an items schema")]
    MissingItems { path: String },

    #[error("{path}: unsupported type {type_tag}, expected object, array or string")]
    InvalidTypeTag { path: String, type_tag: String },

    #[error("{path}: nested schema must be a json object")]
    MalformedNestedSchema { path: String },
}

impl SchemaError {
    /// 出错节点的路径，格式错误的 JSON 没有路径
    pub fn path(&self) -> Option<&str> {
        match self {
            SchemaError::Malformed(_) => None,
            SchemaError::MissingAdditionalProperties { path }
            | SchemaError::MissingProperties { path }
            | SchemaError::RequiredMismatch { path, .. }
            | SchemaError::MissingItems { path }
            | SchemaError::InvalidTypeTag { path, .. }
            | SchemaError::MalformedNestedSchema { path } => Some(path),
        }
    }
}

/// 页面规范化错误类型
#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("page markup contains no readable text")]
    EmptyMarkup,
}

/// 模型调用错误类型
#[derive(Error, Debug)]
pub enum InvokeError {
    /// 服务端返回非成功状态码
    #[error("provider request failed with status code: {status} and message {body}")]
    Provider { status: u16, body: String },

    /// 网络传输失败
    #[error("error sending request: {0}")]
    Transport(reqwest::Error),

    /// 响应包体无法解析
    #[error("error decoding response: {0}")]
    Decode(String),

    /// 响应中没有可用的消息内容
    #[error("provider returned no message content")]
    EmptyResponse,

    /// 模型拒绝了请求
    #[error("model refused the request: {0}")]
    Refused(String),
}

impl From<reqwest::Error> for InvokeError {
    fn from(err: reqwest::Error) -> Self {
        InvokeError::Transport(err)
    }
}

impl InvokeError {
    /// 判断错误是否可重试
    ///
    /// 核心流程从不重试，该方法供调用方实现自己的重试策略
    pub fn is_retryable(&self) -> bool {
        match self {
            InvokeError::Provider { status, .. } => *status == 429 || *status >= 500,
            InvokeError::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

/// 响应解析错误类型
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("model returned invalid json: {0}")]
    InvalidJson(serde_json::Error),
}

/// 抓取流水线的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    FetchingPage,
    NormalizingPage,
    ValidatingSchema,
    InvokingModel,
    ValidatingResponse,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::FetchingPage => "fetching page",
            Stage::NormalizingPage => "normalizing page",
            Stage::ValidatingSchema => "validating schema",
            Stage::InvokingModel => "invoking model",
            Stage::ValidatingResponse => "validating response",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 抓取错误类型
///
/// 每个阶段的错误都带上阶段名称，调用方可以据此判断失败发生在哪一步。
/// 底层错误的描述拼接在消息中，不通过 `source` 暴露
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("invalid request: {0}")]
    InvalidRequest(ConfigError),

    #[error("fetching page: {0}")]
    Fetch(EngineError),

    #[error("normalizing page: {0}")]
    Normalize(NormalizeError),

    #[error("validating schema: {0}")]
    Schema(SchemaError),

    #[error("invoking model: {0}")]
    Invoke(InvokeError),

    #[error("validating response: {0}")]
    Response(ParseError),

    #[error("{stage}: operation cancelled")]
    Cancelled { stage: Stage },

    #[error("{stage}: deadline of {timeout:?} exceeded")]
    Timeout { stage: Stage, timeout: Duration },
}

impl ScrapeError {
    /// 失败发生的阶段，请求参数错误发生在任何阶段之前
    pub fn stage(&self) -> Option<Stage> {
        match self {
            ScrapeError::InvalidRequest(_) => None,
            ScrapeError::Fetch(_) => Some(Stage::FetchingPage),
            ScrapeError::Normalize(_) => Some(Stage::NormalizingPage),
            ScrapeError::Schema(_) => Some(Stage::ValidatingSchema),
            ScrapeError::Invoke(_) => Some(Stage::InvokingModel),
            ScrapeError::Response(_) => Some(Stage::ValidatingResponse),
            ScrapeError::Cancelled { stage } | ScrapeError::Timeout { stage, .. } => Some(*stage),
        }
    }
}
