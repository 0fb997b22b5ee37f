// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::LlmSettings;
use crate::domain::models::extraction_request::{ChatMessage, ExtractionRequest, ResponseFormat};
use crate::domain::models::schema_contract::SchemaContract;

/// 固定温度，保证相同输入得到相同输出
pub const TEMPERATURE: f64 = 0.0;

/// 默认模型
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// 默认随机种子
pub const DEFAULT_SEED: i64 = 42;

/// 抽取请求构造器
///
/// 温度和种子固定不变：同一页面和提示词重复抽取时得到相同结果，
/// 以牺牲采样多样性换取可复现性
#[derive(Debug, Clone)]
pub struct ExtractionRequestBuilder {
    model: String,
    seed: i64,
}

impl Default for ExtractionRequestBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL, DEFAULT_SEED)
    }
}

impl ExtractionRequestBuilder {
    pub fn new(model: impl Into<String>, seed: i64) -> Self {
        Self {
            model: model.into(),
            seed,
        }
    }

    pub fn from_settings(settings: &LlmSettings) -> Self {
        Self::new(settings.model.clone(), settings.seed)
    }

    /// 构造抽取请求
    ///
    /// # 参数
    ///
    /// * `prompt` - 调用方的自然语言提示词
    /// * `page_text` - 规范化后的页面内容
    /// * `contract` - 已校验的 schema 契约
    ///
    /// # 返回值
    ///
    /// 只包含一条用户消息的请求，消息内容为提示词、空行、页面内容
    pub fn build(&self, prompt: &str, page_text: &str, contract: &SchemaContract) -> ExtractionRequest {
        ExtractionRequest {
            model: self.model.clone(),
            temperature: TEMPERATURE,
            seed: self.seed,
            messages: vec![ChatMessage::user(format!("{}\n\n{}", prompt, page_text))],
            response_format: ResponseFormat::strict(contract.clone()),
        }
    }
}
