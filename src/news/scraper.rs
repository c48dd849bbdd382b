use lazy_static::lazy_static;
use scraper::{ElementRef, Html};
use tracing::debug;
use url::Url;

use crate::dom::{self, ContainerSpec, SelectorChain};
use crate::CrawlerError;

use super::HeadlineRecord;

pub const BASE_ITEM_CLASS: &str = "sa_item";
pub const HEADLINE_MARKER_CLASS: &str = "_SECTION_HEADLINE";
pub const BLIND_CLASS: &str = "is_blind";

const E: &str = "Invalid selector";
lazy_static! {
    static ref LINK: SelectorChain =
        SelectorChain::parse(["a.sa_text_title[href]", "a[href]"]).expect(E);
    static ref PRESS: SelectorChain =
        SelectorChain::parse([".sa_text_press", ".sa_text_press em", ".sa_text_press span"])
            .expect(E);
    static ref DATETIME: SelectorChain =
        SelectorChain::parse([".sa_text_datetime", "._SECTION_HEADLINE_LIST_TIME", "time"])
            .expect(E);
    static ref LEDE: SelectorChain =
        SelectorChain::parse([".sa_text_lede", ".sa_text_lede_text"]).expect(E);
}

/// Extracts headline records from one section page snapshot. Selector
/// candidates are ordered from the markup Naver currently serves to older
/// fallbacks, so a partial DOM change degrades fields instead of the run.
pub struct SectionScraper {
    container: ContainerSpec,
}

impl SectionScraper {
    pub fn new(container: ContainerSpec) -> Self {
        Self { container }
    }

    /// `next_rank` is the global rank the first accepted item receives.
    /// Items without a usable link or a non-empty title are skipped and do
    /// not consume a rank.
    pub fn scrape_page(
        &self,
        doc: &Html,
        base: &Url,
        next_rank: u32,
    ) -> Result<Vec<HeadlineRecord>, CrawlerError> {
        let container = dom::locate_container(doc, &self.container)?;
        let mut records = Vec::new();
        for item in dom::filter_items(container, BASE_ITEM_CLASS, HEADLINE_MARKER_CLASS) {
            let rank = next_rank + records.len() as u32;
            match parse_headline(item, base, rank) {
                Some(record) => records.push(record),
                None => debug!("skipped a headline item without link or title"),
            }
        }
        Ok(records)
    }
}

fn parse_headline(item: ElementRef<'_>, base: &Url, rank: u32) -> Option<HeadlineRecord> {
    let anchor = LINK.first_element(item)?;
    let href = anchor.value().attr("href")?;
    let url = base.join(href).ok()?;

    let title = dom::normalized_text(anchor);
    if title.is_empty() {
        return None;
    }

    Some(HeadlineRecord {
        title,
        url: url.to_string(),
        press: PRESS.first_text(item),
        datetime: DATETIME.first_text(item),
        lede: LEDE.first_text(item),
        is_blind: item.value().classes().any(|c| c == BLIND_CLASS),
        rank,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scrape(body: &str) -> Vec<HeadlineRecord> {
        let html = format!(
            r#"<html><body><ul id="_SECTION_HEADLINE_LIST_test">{}</ul></body></html>"#,
            body
        );
        let doc = Html::parse_document(&html);
        let base = Url::parse("https://news.naver.com/section/101").unwrap();
        let scraper = SectionScraper::new(ContainerSpec::new(
            "_SECTION_HEADLINE_LIST_test",
            "_SECTION_HEADLINE_LIST_",
        ));
        scraper.scrape_page(&doc, &base, 1).unwrap()
    }

    #[test]
    fn items_without_a_link_consume_no_rank() {
        let records = scrape(concat!(
            r#"<li class="sa_item _SECTION_HEADLINE"><div class="sa_text">no anchor here</div></li>"#,
            r#"<li class="sa_item _SECTION_HEADLINE"><a class="sa_text_title" href="/article/1">첫 기사</a></li>"#,
        ));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "첫 기사");
        assert_eq!(records[0].rank, 1);
    }

    #[test]
    fn empty_title_drops_the_item() {
        let records = scrape(concat!(
            r#"<li class="sa_item _SECTION_HEADLINE"><a class="sa_text_title" href="/article/1">  </a></li>"#,
            r#"<li class="sa_item _SECTION_HEADLINE"><a class="sa_text_title" href="/article/2">살아남은 기사</a></li>"#,
        ));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].url, "https://news.naver.com/article/2");
        assert_eq!(records[0].rank, 1);
    }

    #[test]
    fn relative_hrefs_resolve_against_the_page_url() {
        let records = scrape(
            r#"<li class="sa_item _SECTION_HEADLINE"><a class="sa_text_title" href="/mnews/article/001/0001">기사</a></li>"#,
        );
        assert_eq!(
            records[0].url,
            "https://news.naver.com/mnews/article/001/0001"
        );
    }

    #[test]
    fn titled_anchor_beats_an_earlier_plain_anchor() {
        let records = scrape(concat!(
            r#"<li class="sa_item _SECTION_HEADLINE">"#,
            r#"<a href="/thumbnail/1"><img alt=""></a>"#,
            r#"<a class="sa_text_title" href="/article/1"><strong class="sa_text_strong">본문 제목</strong></a>"#,
            r#"</li>"#,
        ));
        assert_eq!(records[0].title, "본문 제목");
        assert_eq!(records[0].url, "https://news.naver.com/article/1");
    }

    #[test]
    fn blind_class_sets_the_flag_without_dropping() {
        let records = scrape(
            r#"<li class="sa_item _SECTION_HEADLINE is_blind"><a class="sa_text_title" href="/article/9">숨김 처리 기사</a></li>"#,
        );
        assert_eq!(records.len(), 1);
        assert!(records[0].is_blind);
    }

    #[test]
    fn missing_side_fields_stay_none() {
        let records = scrape(
            r#"<li class="sa_item _SECTION_HEADLINE"><a class="sa_text_title" href="/article/1">제목만</a></li>"#,
        );
        assert_eq!(records[0].press, None);
        assert_eq!(records[0].datetime, None);
        assert_eq!(records[0].lede, None);
    }

    #[test]
    fn datetime_falls_back_to_a_time_element() {
        let records = scrape(concat!(
            r#"<li class="sa_item _SECTION_HEADLINE">"#,
            r#"<a class="sa_text_title" href="/article/1">제목</a>"#,
            r#"<time>2024-05-02 09:30</time>"#,
            r#"</li>"#,
        ));
        assert_eq!(records[0].datetime, Some("2024-05-02 09:30".to_string()));
    }
}
