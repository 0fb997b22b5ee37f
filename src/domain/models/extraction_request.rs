// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::schema_contract::SchemaContract;
use serde::Serialize;

/// 结构化输出的 schema 名称
pub const SCHEMA_NAME: &str = "scrape_result";

/// 聊天消息
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// 响应格式指令
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
    pub json_schema: JsonSchemaFormat,
}

/// `json_schema` 响应格式的内容
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonSchemaFormat {
    pub name: String,
    pub strict: bool,
    pub schema: SchemaContract,
}

impl ResponseFormat {
    /// 严格模式的结构化输出指令
    pub fn strict(schema: SchemaContract) -> Self {
        Self {
            format_type: "json_schema".to_string(),
            json_schema: JsonSchemaFormat {
                name: SCHEMA_NAME.to_string(),
                strict: true,
                schema,
            },
        }
    }
}

/// 抽取请求
///
/// 每次抓取构造一次，不可变，也不会在多次抓取之间复用
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionRequest {
    pub model: String,
    pub temperature: f64,
    pub seed: i64,
    pub messages: Vec<ChatMessage>,
    pub response_format: ResponseFormat,
}

impl ExtractionRequest {
    /// 序列化为发送给服务端的请求体
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
