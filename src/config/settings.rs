// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use config::{Config, Environment, File};
use serde::Deserialize;

/// OpenAI API 密钥的环境变量名
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
/// Zyte API 密钥的环境变量名
pub const ZYTE_API_KEY_VAR: &str = "ZYTE_API_KEY";
/// Zyte 代理端点的环境变量名
pub const ZYTE_PROXY_ENDPOINT_VAR: &str = "ZYTE_PROXY_ENDPOINT";

/// 默认的 Zyte 代理端点
pub const DEFAULT_ZYTE_PROXY_ENDPOINT: &str = "http://api.zyte.com:8011";

/// 应用程序配置设置
///
/// 包含模型、页面获取、浏览器渲染和代理等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 模型配置
    pub llm: LlmSettings,
    /// 页面获取配置
    pub fetch: FetchSettings,
    /// 浏览器配置
    pub browser: BrowserSettings,
    /// Zyte 代理配置
    pub zyte: ZyteSettings,
}

/// 模型配置设置
#[derive(Clone, Deserialize)]
pub struct LlmSettings {
    /// API 密钥
    pub api_key: Option<String>,
    /// 模型名称
    pub model: String,
    /// API 基础URL
    pub api_base_url: String,
    /// 固定随机种子
    pub seed: i64,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

// API key stays out of logs.
impl std::fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "[SET]"))
            .field("model", &self.model)
            .field("api_base_url", &self.api_base_url)
            .field("seed", &self.seed)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// 页面获取配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct FetchSettings {
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
    /// User-Agent
    pub user_agent: String,
}

/// 浏览器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserSettings {
    /// 导航后等待页面稳定的时间（毫秒）
    pub settle_delay_ms: u64,
    /// 远程 Chrome 调试地址，未设置时在本地启动浏览器
    pub remote_debugging_url: Option<String>,
    /// 浏览器启动及 CDP 请求超时时间（秒）
    pub launch_timeout_secs: u64,
}

/// Zyte 代理配置设置
#[derive(Clone, Deserialize)]
pub struct ZyteSettings {
    /// API 密钥
    pub api_key: Option<String>,
    /// 代理端点
    pub proxy_endpoint: String,
}

impl std::fmt::Debug for ZyteSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZyteSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "[SET]"))
            .field("proxy_endpoint", &self.proxy_endpoint)
            .finish()
    }
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从配置文件和环境变量加载配置，支持默认值
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, config::ConfigError> {
        Self::with_provider_env(|key| std::env::var(key).ok())
    }

    /// 使用自定义的环境变量查找函数加载配置
    ///
    /// `OPENAI_API_KEY`、`ZYTE_API_KEY` 和 `ZYTE_PROXY_ENDPOINT` 通过 `lookup`
    /// 读取并覆盖其它来源，便于测试时注入假的凭据
    pub fn with_provider_env<F>(lookup: F) -> Result<Self, config::ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let builder = Config::builder()
            // Model defaults
            .set_default("llm.model", "gpt-4o-mini")?
            .set_default("llm.api_base_url", "https://api.openai.com/v1")?
            .set_default("llm.seed", 42)?
            .set_default("llm.timeout_secs", 60)?
            // Fetch defaults
            .set_default("fetch.timeout_secs", 30)?
            .set_default(
                "fetch.user_agent",
                "Mozilla/5.0 (compatible; scrapeai/0.1; +https://github.com/Kirky-X/scrapeai)",
            )?
            // Browser defaults
            .set_default("browser.settle_delay_ms", 2000)?
            .set_default("browser.launch_timeout_secs", 30)?
            // Proxy defaults
            .set_default("zyte.proxy_endpoint", DEFAULT_ZYTE_PROXY_ENDPOINT)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("SCRAPEAI").separator("__"))
            .set_override_option("llm.api_key", non_empty(OPENAI_API_KEY_VAR))?
            .set_override_option("zyte.api_key", non_empty(ZYTE_API_KEY_VAR))?
            .set_override_option("zyte.proxy_endpoint", non_empty(ZYTE_PROXY_ENDPOINT_VAR))?;

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
