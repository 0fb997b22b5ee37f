// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::LlmSettings;
use crate::domain::models::extraction_result::ExtractionResult;
use crate::domain::models::schema_contract::SchemaContract;
use crate::domain::services::llm_service::{LLMService, ModelInvoker};
use crate::domain::services::request_builder::ExtractionRequestBuilder;
use crate::domain::services::response_validator::ResponseValidator;
use crate::engines::traits::PageFetcher;
use crate::utils::errors::{ConfigError, ScrapeError, Stage};
use crate::utils::html_normalizer::{HtmlTextNormalizer, PageNormalizer};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

/// 抓取选项
#[derive(Debug, Clone, Default)]
pub struct ScrapeOptions {
    /// 调用方提供的 JSON Schema 文本，缺省时使用默认契约
    pub schema: Option<String>,
    /// 整个抓取过程的总时限
    pub timeout: Option<Duration>,
    /// 取消令牌
    pub cancellation: CancellationToken,
}

impl ScrapeOptions {
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }
}

/// 抓取请求
///
/// 构造时完成全部参数校验，包括 schema 的严格模式校验，
/// 因此非法请求不会触发任何网络调用
#[derive(Debug, Clone)]
pub struct ScrapeAiRequest {
    url: String,
    prompt: String,
    contract: SchemaContract,
    timeout: Option<Duration>,
    cancellation: CancellationToken,
}

impl ScrapeAiRequest {
    /// 创建并校验抓取请求
    ///
    /// # 参数
    ///
    /// * `url` - 目标页面，必须是 http 或 https 地址
    /// * `prompt` - 自然语言提示词，不能为空
    /// * `options` - schema、时限和取消令牌
    ///
    /// # 返回值
    ///
    /// * `Ok(ScrapeAiRequest)` - 校验通过的请求
    /// * `Err(ScrapeError::InvalidRequest)` - URL 或提示词非法
    /// * `Err(ScrapeError::Schema)` - schema 不满足严格模式规则
    pub fn new(
        url: impl Into<String>,
        prompt: impl Into<String>,
        options: ScrapeOptions,
    ) -> Result<Self, ScrapeError> {
        let url = url.into();
        let prompt = prompt.into();

        let parsed = Url::parse(&url).map_err(|e| {
            ScrapeError::InvalidRequest(ConfigError::InvalidValue {
                key: "url",
                reason: e.to_string(),
            })
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ScrapeError::InvalidRequest(ConfigError::InvalidValue {
                key: "url",
                reason: format!("unsupported scheme {}", parsed.scheme()),
            }));
        }

        if prompt.trim().is_empty() {
            return Err(ScrapeError::InvalidRequest(ConfigError::InvalidValue {
                key: "prompt",
                reason: "prompt must not be empty".to_string(),
            }));
        }

        let contract =
            SchemaContract::resolve(options.schema.as_deref()).map_err(ScrapeError::Schema)?;

        Ok(Self {
            url,
            prompt,
            contract,
            timeout: options.timeout,
            cancellation: options.cancellation,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn contract(&self) -> &SchemaContract {
        &self.contract
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }
}

/// 单次抓取的取消和时限守卫
struct StageGuard<'a> {
    token: &'a CancellationToken,
    deadline: Option<(Instant, Duration)>,
}

impl<'a> StageGuard<'a> {
    fn new(request: &'a ScrapeAiRequest) -> Self {
        Self {
            token: &request.cancellation,
            deadline: request.timeout.map(|t| (Instant::now() + t, t)),
        }
    }

    /// 同步阶段开始前检查取消和时限
    fn checkpoint(&self, stage: Stage) -> Result<(), ScrapeError> {
        if self.token.is_cancelled() {
            return Err(ScrapeError::Cancelled { stage });
        }
        if let Some((deadline, timeout)) = self.deadline {
            if Instant::now() >= deadline {
                return Err(ScrapeError::Timeout { stage, timeout });
            }
        }
        Ok(())
    }

    /// 在取消令牌和总时限的约束下执行异步阶段
    async fn run<T, E, F>(
        &self,
        stage: Stage,
        fut: F,
        wrap: impl FnOnce(E) -> ScrapeError,
    ) -> Result<T, ScrapeError>
    where
        F: Future<Output = Result<T, E>>,
    {
        self.checkpoint(stage)?;

        let bounded = async {
            match self.deadline {
                Some((deadline, timeout)) => match tokio::time::timeout_at(deadline, fut).await {
                    Ok(outcome) => outcome.map_err(wrap),
                    Err(_) => Err(ScrapeError::Timeout { stage, timeout }),
                },
                None => fut.await.map_err(wrap),
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(ScrapeError::Cancelled { stage }),
            outcome = bounded => outcome,
        }
    }
}

/// 抓取服务
///
/// 依次执行获取页面、规范化、构造请求、调用模型、校验响应，
/// 任何阶段失败都立即终止并返回带阶段标记的错误。服务本身不重试。
pub struct ScrapeService {
    invoker: Arc<dyn ModelInvoker>,
    normalizer: Arc<dyn PageNormalizer>,
    builder: ExtractionRequestBuilder,
}

impl ScrapeService {
    pub fn new(
        invoker: Arc<dyn ModelInvoker>,
        normalizer: Arc<dyn PageNormalizer>,
        builder: ExtractionRequestBuilder,
    ) -> Self {
        Self {
            invoker,
            normalizer,
            builder,
        }
    }

    /// 使用 OpenAI 兼容接口和 HTML 文本规范化器创建服务
    ///
    /// # 错误
    /// * API密钥未配置时返回 `ConfigError::MissingCredential`
    pub fn from_settings(settings: &LlmSettings) -> Result<Self, ConfigError> {
        let invoker = LLMService::new(settings)?;
        Ok(Self::new(
            Arc::new(invoker),
            Arc::new(HtmlTextNormalizer),
            ExtractionRequestBuilder::from_settings(settings),
        ))
    }

    /// 执行一次抓取
    ///
    /// # 参数
    ///
    /// * `fetcher` - 页面获取引擎
    /// * `request` - 已校验的抓取请求
    ///
    /// # 返回值
    ///
    /// * `Ok(ExtractionResult)` - 来源URL和模型返回的 JSON 文本
    /// * `Err(ScrapeError)` - 带阶段标记的错误
    pub async fn scrape(
        &self,
        fetcher: &dyn PageFetcher,
        request: &ScrapeAiRequest,
    ) -> Result<ExtractionResult, ScrapeError> {
        let outcome = self.run_stages(fetcher, request).await;
        if let Err(e) = &outcome {
            warn!("Scrape of {} failed: {}", request.url, e);
        }
        outcome
    }

    async fn run_stages(
        &self,
        fetcher: &dyn PageFetcher,
        request: &ScrapeAiRequest,
    ) -> Result<ExtractionResult, ScrapeError> {
        let guard = StageGuard::new(request);
        info!("Scraping {} with {} fetcher", request.url, fetcher.name());

        let markup = guard
            .run(Stage::FetchingPage, fetcher.fetch(&request.url), ScrapeError::Fetch)
            .await?;
        debug!("Fetched {} bytes of markup", markup.len());

        guard.checkpoint(Stage::NormalizingPage)?;
        let page_text = self
            .normalizer
            .normalize(&markup)
            .map_err(ScrapeError::Normalize)?;
        debug!("Normalized page down to {} bytes", page_text.len());

        let extraction = self
            .builder
            .build(&request.prompt, &page_text, &request.contract);

        let content = guard
            .run(
                Stage::InvokingModel,
                self.invoker.invoke(&extraction),
                ScrapeError::Invoke,
            )
            .await?;

        guard.checkpoint(Stage::ValidatingResponse)?;
        let content = ResponseValidator::validate(&content).map_err(ScrapeError::Response)?;

        info!("Extracted {} bytes of json from {}", content.len(), request.url);
        Ok(ExtractionResult {
            url: request.url.clone(),
            content,
        })
    }

    /// 便捷入口：校验参数后立即抓取，不设时限
    pub async fn scrape_url(
        &self,
        fetcher: &dyn PageFetcher,
        url: &str,
        prompt: &str,
        schema: Option<&str>,
    ) -> Result<ExtractionResult, ScrapeError> {
        let options = ScrapeOptions {
            schema: schema.map(str::to_string),
            ..ScrapeOptions::default()
        };
        let request = ScrapeAiRequest::new(url, prompt, options)?;
        self.scrape(fetcher, &request).await
    }
}

#[cfg(test)]
#[path = "scrape_service_test.rs"]
mod tests;
