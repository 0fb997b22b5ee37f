// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - Schema校验（schema_validator）：检查 schema 是否满足严格模式规则
/// - 请求构造（request_builder）：生成确定性的抽取请求
/// - LLM服务（llm_service）：调用 OpenAI 兼容的补全接口
/// - 响应校验（response_validator）：确认模型输出是合法的 JSON
/// - 抓取服务（scrape_service）：串联获取、规范化、抽取的完整流程
pub mod llm_service;
pub mod request_builder;
pub mod response_validator;
pub mod schema_validator;
pub mod scrape_service;
