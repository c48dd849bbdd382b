use std::time::{Duration, Instant};

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use url::Url;

use crate::{CrawlerError, PageDriver, PageFetcher};

const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);
const SCROLL_JS: &str = "window.scrollTo(0, document.body.scrollHeight);";

#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub headless: bool,
    pub window_size: (u32, u32),
    pub user_agent: Option<String>,
    pub ready_timeout: Duration,
}

/// One Chrome process with a single tab. Implements both fetch flavors: the
/// ranking crawl drives it step by step, the browser-backed news crawl only
/// needs navigate-and-snapshot.
pub struct ChromeDriver {
    browser: Browser,
    page: Page,
    ready_timeout: Duration,
    handler_task: JoinHandle<()>,
}

impl ChromeDriver {
    pub async fn launch(options: &BrowserOptions) -> Result<Self, CrawlerError> {
        let mut builder = BrowserConfig::builder()
            .window_size(options.window_size.0, options.window_size.1)
            .args(vec![
                "--disable-gpu",
                "--no-sandbox",
                "--disable-dev-shm-usage",
                "--lang=ko-KR",
            ]);
        if !options.headless {
            builder = builder.with_head();
        }
        if let Some(ua) = &options.user_agent {
            builder = builder.arg(format!("--user-agent={}", ua));
        }
        let config = builder.build().map_err(CrawlerError::BrowserLaunch)?;

        let (browser, mut handler) = Browser::launch(config).await?;
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    debug!("cdp handler: {}", err);
                }
            }
        });

        let page = browser.new_page("about:blank").await?;
        Ok(Self {
            browser,
            page,
            ready_timeout: options.ready_timeout,
            handler_task,
        })
    }

    /// Closes the tab and the browser process. Best effort; a browser that
    /// already died is not worth an error at this point.
    pub async fn shutdown(mut self) {
        if let Err(err) = self.browser.close().await {
            warn!("browser close failed: {}", err);
        }
        let _ = self.browser.wait().await;
        self.handler_task.abort();
    }
}

async fn await_ready(page: &Page, timeout: Duration) -> Result<(), CrawlerError> {
    let deadline = Instant::now() + timeout;
    loop {
        let state: String = page.evaluate("document.readyState").await?.into_value()?;
        if state == "complete" {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(CrawlerError::PageLoadTimeout(timeout));
        }
        tokio::time::sleep(READY_POLL_INTERVAL).await;
    }
}

#[async_trait::async_trait]
impl PageDriver for ChromeDriver {
    async fn navigate(&mut self, url: &Url) -> Result<(), CrawlerError> {
        self.page.goto(url.as_str()).await?;
        Ok(())
    }

    async fn wait_ready(&mut self, timeout: Duration) -> Result<(), CrawlerError> {
        await_ready(&self.page, timeout).await
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), CrawlerError> {
        self.page.evaluate(SCROLL_JS).await?;
        Ok(())
    }

    async fn html(&mut self) -> Result<String, CrawlerError> {
        Ok(self.page.content().await?)
    }
}

#[async_trait::async_trait]
impl PageFetcher for ChromeDriver {
    async fn fetch_html(&self, url: &Url) -> Result<String, CrawlerError> {
        self.page.goto(url.as_str()).await?;
        await_ready(&self.page, self.ready_timeout).await?;
        Ok(self.page.content().await?)
    }
}
