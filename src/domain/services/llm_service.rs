// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::{LlmSettings, OPENAI_API_KEY_VAR};
use crate::domain::models::extraction_request::ExtractionRequest;
use crate::utils::errors::{ConfigError, InvokeError};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// 补全接口返回的包体
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

/// 模型调用特质
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    /// 发送抽取请求，返回第一个候选消息的原始内容
    async fn invoke(&self, request: &ExtractionRequest) -> Result<String, InvokeError>;
}

/// LLM服务 - 处理与LLM提供商的交互
///
/// # 功能
///
/// 向补全接口发送一次同步请求，不做任何重试，也不解释返回内容
///
/// # 配置
///
/// 凭据在构造时显式传入：
/// - `api_key` - API密钥（来自 `OPENAI_API_KEY`），缺失时构造失败
/// - `api_base_url` - API基础URL
/// - `timeout_secs` - 单次请求超时时间
#[derive(Clone)]
pub struct LLMService {
    client: reqwest::Client,
    api_key: String,
    api_base_url: String,
}

impl std::fmt::Debug for LLMService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LLMService")
            .field("api_base_url", &self.api_base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ModelInvoker for LLMService {
    async fn invoke(&self, request: &ExtractionRequest) -> Result<String, InvokeError> {
        LLMService::invoke(self, request).await
    }
}

impl LLMService {
    /// 根据配置创建服务
    ///
    /// # 错误
    /// * 当API密钥未配置或为空时返回 `ConfigError::MissingCredential`
    pub fn new(settings: &LlmSettings) -> Result<Self, ConfigError> {
        let api_key = settings
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingCredential(OPENAI_API_KEY_VAR))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                key: "llm",
                reason: e.to_string(),
            })?;

        Ok(Self::new_with_client(
            client,
            api_key.to_string(),
            settings.api_base_url.clone(),
        ))
    }

    pub fn new_with_client(client: reqwest::Client, api_key: String, api_base_url: String) -> Self {
        Self {
            client,
            api_key,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// 调用补全接口
    ///
    /// # 参数
    /// * `request` - 抽取请求
    ///
    /// # 返回值
    /// * `Ok(String)` - 第一个候选消息的内容，原样返回
    ///
    /// # 错误
    /// * 非成功状态码返回 `InvokeError::Provider`，包含状态码和响应体
    /// * 网络失败返回 `InvokeError::Transport`
    pub async fn invoke(&self, request: &ExtractionRequest) -> Result<String, InvokeError> {
        let body = request
            .to_json_bytes()
            .map_err(|e| InvokeError::Decode(format!("error marshaling request: {}", e)))?;

        let url = format!("{}/chat/completions", self.api_base_url);
        info!("Invoking model {} at {}", request.model, url);

        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(InvokeError::Provider {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let envelope: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| InvokeError::Decode(e.to_string()))?;

        if let Some(usage) = &envelope.usage {
            debug!(
                model = envelope.model.as_deref().unwrap_or(&request.model),
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "Model usage"
            );
        }

        let choice = envelope
            .choices
            .into_iter()
            .next()
            .ok_or(InvokeError::EmptyResponse)?;

        if let Some(refusal) = choice.message.refusal {
            return Err(InvokeError::Refused(refusal));
        }

        debug!(
            "Model finished with reason {:?}",
            choice.finish_reason.as_deref().unwrap_or("unknown")
        );
        choice.message.content.ok_or(InvokeError::EmptyResponse)
    }
}

#[cfg(test)]
#[path = "llm_service_test.rs"]
mod tests;
