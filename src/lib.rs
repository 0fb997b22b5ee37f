// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含 schema 契约、抽取请求和抓取流程
pub mod domain;

/// 引擎模块
///
/// 实现 HTTP、无头浏览器和 Zyte 代理三种页面获取方式
pub mod engines;

/// 工具模块
///
/// 提供错误类型、HTML 规范化和日志初始化
pub mod utils;

pub use domain::models::extraction_result::ExtractionResult;
pub use domain::services::scrape_service::{ScrapeAiRequest, ScrapeOptions, ScrapeService};
pub use engines::strategy::FetchStrategy;
pub use utils::errors::{ScrapeError, Stage};
