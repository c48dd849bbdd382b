use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, REFERER};
use tracing::debug;
use url::Url;

use crate::{CrawlerError, PageFetcher};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/121.0.0.0 Safari/537.36";

const RETRY_ATTEMPTS: u32 = 3;
const RETRY_BASE_DELAY: Duration = Duration::from_millis(600);
const RETRY_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Plain HTTP client for pages that render their list server side. Sends
/// browser-like headers so Naver serves the full markup, and retries the
/// usual transient statuses with exponential backoff before giving up.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, CrawlerError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("ko-KR,ko;q=0.9,en;q=0.8"),
        );
        headers.insert(REFERER, HeaderValue::from_static("https://news.naver.com/"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    async fn get(&self, url: &Url) -> Result<reqwest::Response, CrawlerError> {
        for attempt in 1..=RETRY_ATTEMPTS {
            match self.client.get(url.clone()).send().await {
                Ok(resp) if !RETRY_STATUSES.contains(&resp.status().as_u16()) => {
                    return Ok(resp.error_for_status()?);
                }
                Ok(resp) => {
                    debug!("attempt {}: retryable status {} from {}", attempt, resp.status(), url);
                }
                Err(err) => {
                    debug!("attempt {}: request to {} failed: {}", attempt, url, err);
                }
            }
            tokio::time::sleep(RETRY_BASE_DELAY * 2u32.pow(attempt - 1)).await;
        }
        Ok(self.client.get(url.clone()).send().await?.error_for_status()?)
    }
}

#[async_trait::async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_html(&self, url: &Url) -> Result<String, CrawlerError> {
        let resp = self.get(url).await?;
        Ok(resp.text().await?)
    }
}
