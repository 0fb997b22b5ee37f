// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// 抽取结果
///
/// `content` 是模型返回的 JSON 文本，按构造符合 schema 契约但未经实例校验，
/// 解析成具体结构由调用方负责
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    /// 来源URL
    pub url: String,
    /// 模型返回的原始内容
    pub content: String,
}

impl ExtractionResult {
    /// 将内容解析为调用方的目标类型
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.content)
    }
}
