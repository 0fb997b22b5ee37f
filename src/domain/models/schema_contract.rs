// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::schema_validator::SchemaValidator;
use crate::utils::errors::SchemaError;
use serde::Serialize;
use serde_json::{json, Value};

/// 默认数据项的 schema：字符串数组
pub const DEFAULT_ITEMS_SCHEMA: &str = r#"{"type":"array","items":{"type":"string"}}"#;

/// 默认 schema 的完整字面量（包装在 `data` 字段下）
pub const DEFAULT_SCHEMA: &str = r#"{"type":"object","properties":{"data":{"type":"array","items":{"type":"string"}}},"additionalProperties":false,"required":["data"]}"#;

/// 默认 schema 中包装字段的名称
pub const DATA_FIELD: &str = "data";

/// Schema 契约
///
/// 约束模型结构化输出形状的 JSON Schema 文档。构造后不可变，
/// 生命周期限于单次抽取请求。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SchemaContract {
    document: Value,
    #[serde(skip)]
    is_default: bool,
}

impl SchemaContract {
    /// 解析并校验调用方提供的 schema 文本
    ///
    /// # 参数
    ///
    /// * `schema_text` - JSON Schema 文本
    ///
    /// # 返回值
    ///
    /// * `Ok(SchemaContract)` - 满足严格模式规则的契约
    /// * `Err(SchemaError)` - 第一个违反的规则
    pub fn parse(schema_text: &str) -> Result<Self, SchemaError> {
        let document: Value = serde_json::from_str(schema_text).map_err(SchemaError::Malformed)?;
        SchemaValidator::validate_value(&document)?;
        Ok(Self {
            document,
            is_default: false,
        })
    }

    /// 内置默认契约：`data` 字段下的字符串数组
    pub fn default_contract() -> Self {
        let items = json!({ "type": "array", "items": { "type": "string" } });
        Self {
            document: Self::wrap_in_data(items),
            is_default: true,
        }
    }

    /// 将一个 schema 包装到 `data` 字段下的对象中
    pub fn wrap_in_data(inner: Value) -> Value {
        json!({
            "type": "object",
            "properties": { DATA_FIELD: inner },
            "additionalProperties": false,
            "required": [DATA_FIELD],
        })
    }

    /// 解析可选的 schema 文本，缺省时使用默认契约
    pub fn resolve(schema_text: Option<&str>) -> Result<Self, SchemaError> {
        match schema_text {
            Some(text) => Self::parse(text),
            None => Ok(Self::default_contract()),
        }
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }
}

impl Default for SchemaContract {
    fn default() -> Self {
        Self::default_contract()
    }
}
