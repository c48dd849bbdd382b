use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum CrawlerError {
    #[error("list container not found: id \"{primary_id}\", prefix \"{id_prefix}\"")]
    ContainerNotFound {
        primary_id: String,
        id_prefix: String,
    },

    #[error("invalid selector: {0}")]
    InvalidSelector(String),

    #[error("page not ready after {0:?}")]
    PageLoadTimeout(Duration),

    #[error("browser launch failed: {0}")]
    BrowserLaunch(String),

    #[error("browser error")]
    Browser(#[from] chromiumoxide::error::CdpError),

    #[error("request error")]
    Http(#[from] reqwest::Error),

    #[error("server error")]
    Server(#[from] hyper::Error),

    #[error("io error")]
    Io(#[from] std::io::Error),

    #[error("json error")]
    Json(#[from] serde_json::Error),

    #[error("csv error")]
    Csv(#[from] csv::Error),
}
