// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::Settings;
use crate::engines::chromium_engine::ChromiumEngine;
use crate::engines::reqwest_engine::ReqwestEngine;
use crate::engines::traits::{EngineError, PageFetcher};
use crate::engines::zyte_engine::ZyteEngine;
use std::fmt;
use std::sync::Arc;

/// 页面获取策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum FetchStrategy {
    /// 普通 HTTP GET
    Http,
    /// 无头浏览器渲染
    #[default]
    Browser,
    /// Zyte 代理
    Zyte,
}

impl FetchStrategy {
    /// 根据配置构建对应的获取引擎
    pub fn build(self, settings: &Settings) -> Result<Arc<dyn PageFetcher>, EngineError> {
        let fetcher: Arc<dyn PageFetcher> = match self {
            FetchStrategy::Http => Arc::new(ReqwestEngine::new(&settings.fetch)?),
            FetchStrategy::Browser => Arc::new(ChromiumEngine::new(&settings.browser, &settings.fetch)),
            FetchStrategy::Zyte => Arc::new(ZyteEngine::new(&settings.zyte, &settings.fetch)?),
        };
        Ok(fetcher)
    }
}

impl fmt::Display for FetchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FetchStrategy::Http => "http",
            FetchStrategy::Browser => "browser",
            FetchStrategy::Zyte => "zyte",
        };
        f.write_str(name)
    }
}
