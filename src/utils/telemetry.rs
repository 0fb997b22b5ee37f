// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 默认日志过滤规则，可通过 `RUST_LOG` 覆盖
pub const DEFAULT_LOG_FILTER: &str = "info,scrapeai=debug";

/// 构造日志过滤器，`RUST_LOG` 未设置或非法时使用默认规则
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into())
}

/// 初始化日志
///
/// # 参数
///
/// * `json` - 为 true 时输出 JSON 格式日志，便于日志采集
pub fn init_telemetry(json: bool) {
    let registry = tracing_subscriber::registry().with(env_filter());
    // Logs go to stderr so stdout carries only the extracted json.
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
