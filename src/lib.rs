use std::time::Duration;
use url::Url;

pub mod browser;
pub mod dom;
pub mod export;
pub mod fetch;
pub mod news;
pub mod ranking;
pub mod render;
pub mod server;

mod error;

pub use error::CrawlerError;

/// Anything that can turn a URL into an HTML snapshot. The plain HTTP client
/// and the browser driver both implement this, so the section crawl runs
/// unchanged over either.
#[async_trait::async_trait]
pub trait PageFetcher {
    async fn fetch_html(&self, url: &Url) -> Result<String, CrawlerError>;
}

/// A live page that can be navigated, scrolled and snapshotted. Owned
/// exclusively by one crawl at a time.
#[async_trait::async_trait]
pub trait PageDriver {
    async fn navigate(&mut self, url: &Url) -> Result<(), CrawlerError>;
    async fn wait_ready(&mut self, timeout: Duration) -> Result<(), CrawlerError>;
    async fn scroll_to_bottom(&mut self) -> Result<(), CrawlerError>;
    async fn html(&mut self) -> Result<String, CrawlerError>;
}
