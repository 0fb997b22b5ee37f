// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// - schema 契约（schema_contract）：约束模型输出形状的 JSON Schema
/// - 抽取请求（extraction_request）：发送给模型的确定性请求
/// - 抽取结果（extraction_result）：返回给调用方的来源URL和原始内容
pub mod extraction_request;
pub mod extraction_result;
pub mod schema_contract;
