// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::ParseError;
use serde_json::Value;

/// 响应校验器
///
/// 只证明模型返回内容是语法合法的 JSON，不检查其是否符合 schema。
/// 内容原样返回，由知道目标结构的调用方完成最终解码。
pub struct ResponseValidator;

impl ResponseValidator {
    pub fn validate(content: &str) -> Result<String, ParseError> {
        serde_json::from_str::<Value>(content).map_err(ParseError::InvalidJson)?;
        Ok(content.to_string())
    }
}
