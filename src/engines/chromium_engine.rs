// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::{BrowserSettings, FetchSettings};
use crate::engines::traits::{EngineError, PageFetcher};
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::time::{Duration, Instant};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Chromium 引擎
///
/// 基于chromiumoxide的无头浏览器渲染，适用于依赖JavaScript生成内容的页面。
/// 导航完成后固定等待一段时间，再抓取完整渲染后的文档。
pub struct ChromiumEngine {
    // Launched lazily on first fetch and reused by this engine only.
    browser: OnceCell<Browser>,
    remote_debugging_url: Option<String>,
    settle_delay: Duration,
    launch_timeout: Duration,
    page_timeout: Duration,
}

impl ChromiumEngine {
    pub fn new(browser: &BrowserSettings, fetch: &FetchSettings) -> Self {
        Self {
            browser: OnceCell::new(),
            remote_debugging_url: browser.remote_debugging_url.clone(),
            settle_delay: Duration::from_millis(browser.settle_delay_ms),
            launch_timeout: Duration::from_secs(browser.launch_timeout_secs),
            page_timeout: Duration::from_secs(fetch.timeout_secs),
        }
    }

    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    async fn browser(&self) -> Result<&Browser, EngineError> {
        self.browser
            .get_or_try_init(|| async {
                let (browser, mut handler) = if let Some(url) = &self.remote_debugging_url {
                    info!("Connecting to remote Chrome instance at: {}", url);
                    Browser::connect(url.as_str()).await.map_err(|e| {
                        EngineError::Browser(format!("Failed to connect to remote Chrome: {}", e))
                    })?
                } else {
                    let config = BrowserConfig::builder()
                        .no_sandbox()
                        .request_timeout(self.launch_timeout)
                        .arg("--disable-gpu")
                        .arg("--disable-dev-shm-usage")
                        .build()
                        .map_err(EngineError::Browser)?;

                    info!("Launching headless Chrome");
                    Browser::launch(config)
                        .await
                        .map_err(|e| EngineError::Browser(e.to_string()))?
                };

                // Drive CDP events until the connection drops
                tokio::spawn(async move {
                    while let Some(event) = handler.next().await {
                        if event.is_err() {
                            break;
                        }
                    }
                });

                Ok(browser)
            })
            .await
    }

    async fn render(&self, url: &str) -> Result<String, EngineError> {
        let browser = self.browser().await?;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| EngineError::Browser(e.to_string()))?;

        let tab = TabGuard::new(page.clone());
        let outcome = self.capture(&page, url).await;
        tab.close().await;
        outcome
    }

    async fn capture(&self, page: &Page, url: &str) -> Result<String, EngineError> {
        page.goto(url)
            .await
            .map_err(|e| EngineError::Browser(format!("Navigation failed: {}", e)))?;

        tokio::time::sleep(self.settle_delay).await;

        page.content()
            .await
            .map_err(|e| EngineError::Browser(e.to_string()))
    }
}

/// 可关闭的浏览器标签页
#[async_trait]
trait BrowserTab: Send + Sized + 'static {
    async fn close_tab(self);
}

#[async_trait]
impl BrowserTab for Page {
    async fn close_tab(self) {
        if let Err(e) = self.close().await {
            warn!("Failed to close page: {}", e);
        }
    }
}

/// 标签页守卫
///
/// 正常结束时显式关闭标签页；渲染失败或被超时、取消中途丢弃时，
/// 在 `Drop` 中把关闭操作交给运行时执行，浏览器不会残留标签页
struct TabGuard<T: BrowserTab> {
    tab: Option<T>,
}

impl<T: BrowserTab> TabGuard<T> {
    fn new(tab: T) -> Self {
        Self { tab: Some(tab) }
    }

    async fn close(mut self) {
        if let Some(tab) = self.tab.take() {
            tab.close_tab().await;
        }
    }
}

impl<T: BrowserTab> Drop for TabGuard<T> {
    fn drop(&mut self) {
        if let Some(tab) = self.tab.take() {
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    handle.spawn(tab.close_tab());
                }
                Err(_) => warn!("No runtime available to close an abandoned page"),
            }
        }
    }
}

#[async_trait]
impl PageFetcher for ChromiumEngine {
    /// 执行浏览器渲染获取
    ///
    /// # 参数
    ///
    /// * `url` - 目标URL
    ///
    /// # 返回值
    ///
    /// * `Ok(String)` - 渲染完成后的完整文档
    /// * `Err(EngineError)` - 浏览器启动、导航或超时错误
    async fn fetch(&self, url: &str) -> Result<String, EngineError> {
        let start = Instant::now();
        let budget = self.page_timeout + self.settle_delay;

        let content = tokio::time::timeout(budget, self.render(url))
            .await
            .map_err(|_| EngineError::Timeout)??;

        debug!(
            "Rendered {} bytes from {} in {}ms",
            content.len(),
            url,
            start.elapsed().as_millis()
        );
        Ok(content)
    }

    fn name(&self) -> &'static str {
        "chromium"
    }
}
