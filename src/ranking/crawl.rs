use std::time::{Duration, Instant};

use scraper::Html;
use tracing::{debug, info};
use url::Url;

use super::ListItemRecord;
use crate::dom::{self, ContainerSpec};
use crate::{CrawlerError, PageDriver};

const MIN_SETTLE_WAIT: Duration = Duration::from_millis(100);
const GROWTH_POLL_INTERVAL: Duration = Duration::from_millis(200);
const CONTAINER_POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, Clone)]
pub struct RankingConfig {
    pub url: Url,
    pub container: ContainerSpec,
    pub scrolls: u32,
    pub settle_wait: Duration,
    pub timeout: Duration,
}

/// Scrolls the ranking page to the bottom `scrolls` times, waiting for the
/// list to grow after each pass, then extracts every `li` from the final
/// snapshot. A list that stops growing is normal (the page ran out of
/// entries); a list container that disappears is not.
pub async fn crawl_ranking<D>(
    driver: &mut D,
    config: &RankingConfig,
) -> Result<Vec<ListItemRecord>, CrawlerError>
where
    D: PageDriver + Send,
{
    driver.navigate(&config.url).await?;
    driver.wait_ready(config.timeout).await?;

    let html = await_container(driver, &config.container, config.timeout).await?;
    let mut known = item_count(&html, &config.container);
    info!("list found with {} items", known);

    let settle = config.settle_wait.max(MIN_SETTLE_WAIT);
    for round in 1..=config.scrolls {
        driver.scroll_to_bottom().await?;
        tokio::time::sleep(settle).await;

        await_container(driver, &config.container, config.timeout).await?;
        known = wait_for_growth(driver, &config.container, known, config.timeout).await?;
        debug!("scroll {}/{}: {} items", round, config.scrolls, known);
    }

    let html = await_container(driver, &config.container, config.timeout).await?;
    let records = {
        let doc = Html::parse_document(&html);
        let container = dom::locate_container(&doc, &config.container)?;
        dom::list_items(container)
            .enumerate()
            .map(|(i, li)| ListItemRecord {
                idx: i as u32 + 1,
                text: dom::normalized_text(li),
                raw_markup: li.html(),
            })
            .collect()
    };
    Ok(records)
}

/// Polls snapshots until the container turns up, returning the snapshot it
/// was found in. Timing out here means the page replaced or dropped the
/// list, which kills the run.
async fn await_container<D>(
    driver: &mut D,
    spec: &ContainerSpec,
    timeout: Duration,
) -> Result<String, CrawlerError>
where
    D: PageDriver + Send,
{
    let deadline = Instant::now() + timeout;
    loop {
        let html = driver.html().await?;
        let found = {
            let doc = Html::parse_document(&html);
            dom::locate_container(&doc, spec).is_ok()
        };
        if found {
            return Ok(html);
        }
        if Instant::now() >= deadline {
            return Err(CrawlerError::ContainerNotFound {
                primary_id: spec.primary_id.clone(),
                id_prefix: spec.id_prefix.clone(),
            });
        }
        tokio::time::sleep(CONTAINER_POLL_INTERVAL).await;
    }
}

/// Waits for the list to grow past `previous`. Returns the last observed
/// count either way; no growth by the deadline is not an error.
async fn wait_for_growth<D>(
    driver: &mut D,
    spec: &ContainerSpec,
    previous: usize,
    timeout: Duration,
) -> Result<usize, CrawlerError>
where
    D: PageDriver + Send,
{
    let deadline = Instant::now() + timeout;
    loop {
        let html = driver.html().await?;
        let count = item_count(&html, spec);
        if count > previous {
            return Ok(count);
        }
        if Instant::now() >= deadline {
            debug!("list stayed at {} items", count);
            return Ok(count);
        }
        tokio::time::sleep(GROWTH_POLL_INTERVAL).await;
    }
}

fn item_count(html: &str, spec: &ContainerSpec) -> usize {
    let doc = Html::parse_document(html);
    match dom::locate_container(&doc, spec) {
        Ok(container) => dom::count_list_items(container),
        Err(_) => 0,
    }
}
