use std::time::Duration;

use scraper::Html;
use tracing::{debug, info};
use url::Url;

use super::{HeadlineRecord, SectionScraper};
use crate::{CrawlerError, PageFetcher};

#[derive(Debug, Clone)]
pub struct SectionConfig {
    pub url: Url,
    pub pages: u32,
    pub page_delay: Duration,
}

/// Walks consecutive pages of one section and returns every accepted
/// headline, ranked globally in encounter order. A page whose headline
/// container cannot be found aborts the whole run.
pub async fn crawl_section<F>(
    fetcher: &F,
    scraper: &SectionScraper,
    config: &SectionConfig,
) -> Result<Vec<HeadlineRecord>, CrawlerError>
where
    F: PageFetcher + Sync,
{
    let mut records: Vec<HeadlineRecord> = Vec::new();

    for page in 1..=config.pages {
        let page_url = with_page(&config.url, page);
        let html = fetcher.fetch_html(&page_url).await?;

        let page_records = {
            let doc = Html::parse_document(&html);
            scraper.scrape_page(&doc, &config.url, records.len() as u32 + 1)?
        };
        info!("page {}/{}: {} headlines", page, config.pages, page_records.len());
        for record in &page_records {
            debug!("\n{}", record);
        }
        records.extend(page_records);

        if page < config.pages && !config.page_delay.is_zero() {
            tokio::time::sleep(config.page_delay).await;
        }
    }

    Ok(records)
}

/// Sets or replaces the `page` query parameter. Page 1 is the section URL
/// itself, untouched.
pub fn with_page(url: &Url, page: u32) -> Url {
    if page <= 1 {
        return url.clone();
    }

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "page")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut out = url.clone();
    {
        let mut pairs = out.query_pairs_mut();
        pairs.clear();
        pairs.extend_pairs(kept);
        pairs.append_pair("page", &page.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ContainerSpec;
    use pretty_assertions::assert_eq;

    fn section_url() -> Url {
        Url::parse("https://news.naver.com/section/101").unwrap()
    }

    #[test]
    fn page_one_leaves_the_url_alone() {
        let url = Url::parse("https://news.naver.com/section/101?sid=101").unwrap();
        assert_eq!(with_page(&url, 1), url);
    }

    #[test]
    fn later_pages_get_a_page_parameter() {
        let url = section_url();
        assert_eq!(
            with_page(&url, 2).as_str(),
            "https://news.naver.com/section/101?page=2"
        );
    }

    #[test]
    fn an_existing_page_parameter_is_replaced() {
        let url = Url::parse("https://news.naver.com/section/101?page=9&sid=101").unwrap();
        assert_eq!(
            with_page(&url, 3).as_str(),
            "https://news.naver.com/section/101?sid=101&page=3"
        );
    }

    struct FixtureFetcher {
        pages: Vec<(String, String)>,
    }

    #[async_trait::async_trait]
    impl PageFetcher for FixtureFetcher {
        async fn fetch_html(&self, url: &Url) -> Result<String, CrawlerError> {
            let html = self
                .pages
                .iter()
                .find(|(u, _)| u == url.as_str())
                .map(|(_, html)| html.clone());
            match html {
                Some(html) => Ok(html),
                None => panic!("unexpected fetch: {}", url),
            }
        }
    }

    fn list_page(items: &str) -> String {
        format!(
            r#"<html><body><ul id="_SECTION_HEADLINE_LIST_test">{}</ul></body></html>"#,
            items
        )
    }

    fn item(href: &str, title: &str) -> String {
        format!(
            r#"<li class="sa_item _SECTION_HEADLINE"><a class="sa_text_title" href="{}">{}</a></li>"#,
            href, title
        )
    }

    fn test_scraper() -> SectionScraper {
        SectionScraper::new(ContainerSpec::new(
            "_SECTION_HEADLINE_LIST_test",
            "_SECTION_HEADLINE_LIST_",
        ))
    }

    #[tokio::test]
    async fn ranks_keep_counting_across_pages() {
        let fetcher = FixtureFetcher {
            pages: vec![
                (
                    "https://news.naver.com/section/101".to_string(),
                    list_page(&(item("/a/1", "하나") + &item("/a/2", "둘"))),
                ),
                (
                    "https://news.naver.com/section/101?page=2".to_string(),
                    list_page(&(item("/a/3", "셋") + &item("/a/4", "넷"))),
                ),
            ],
        };
        let config = SectionConfig {
            url: section_url(),
            pages: 2,
            page_delay: Duration::ZERO,
        };

        let records = crawl_section(&fetcher, &test_scraper(), &config)
            .await
            .unwrap();

        let ranks: Vec<u32> = records.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
        assert_eq!(records[2].title, "셋");
        assert_eq!(records[2].url, "https://news.naver.com/a/3");
    }

    #[tokio::test]
    async fn a_page_without_the_container_fails_the_run() {
        let fetcher = FixtureFetcher {
            pages: vec![
                (
                    "https://news.naver.com/section/101".to_string(),
                    list_page(&item("/a/1", "하나")),
                ),
                (
                    "https://news.naver.com/section/101?page=2".to_string(),
                    "<html><body><p>redesigned</p></body></html>".to_string(),
                ),
            ],
        };
        let config = SectionConfig {
            url: section_url(),
            pages: 2,
            page_delay: Duration::ZERO,
        };

        let err = crawl_section(&fetcher, &test_scraper(), &config)
            .await
            .unwrap_err();
        assert!(matches!(err, CrawlerError::ContainerNotFound { .. }));
    }
}
