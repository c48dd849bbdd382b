mod crawl;
mod scraper;

pub use crawl::{crawl_section, with_page, SectionConfig};
pub use scraper::SectionScraper;

use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub const DEFAULT_SECTION_URL: &str = "https://news.naver.com/section/101";
pub const DEFAULT_LIST_ID: &str = "_SECTION_HEADLINE_LIST_4aiik";
pub const LIST_ID_PREFIX: &str = "_SECTION_HEADLINE_LIST_";

/// One headline as it appears on the section page. Field order is the
/// column order of the CSV export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadlineRecord {
    pub title: String,
    pub url: String,
    pub press: Option<String>,
    pub datetime: Option<String>,
    pub lede: Option<String>,
    pub is_blind: bool,
    pub rank: u32,
}

impl Display for HeadlineRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Rank     : {}", self.rank)?;
        writeln!(f, "Title    : {}", self.title)?;
        writeln!(f, "Url      : {}", self.url)?;
        writeln!(f, "Press    : {}", self.press.as_deref().unwrap_or("-"))?;
        writeln!(f, "Datetime : {}", self.datetime.as_deref().unwrap_or("-"))?;
        writeln!(f, "Lede     : {}", self.lede.as_deref().unwrap_or("-"))?;
        write!(f, "Blind    : {}", self.is_blind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ContainerSpec;
    use pretty_assertions::assert_eq;
    use ::scraper::Html;
    use std::fs;
    use url::Url;

    fn section_scraper() -> SectionScraper {
        SectionScraper::new(ContainerSpec::new(DEFAULT_LIST_ID, LIST_ID_PREFIX))
    }

    fn fixture(name: &str) -> Html {
        let html = fs::read_to_string(format!("tests/htmls/{}", name)).expect("Invalid file url");
        Html::parse_document(&html)
    }

    #[test]
    fn parses_the_headline_fixture_in_order() {
        let scraper = section_scraper();
        let doc = fixture("section_page1.html");
        let base = Url::parse(DEFAULT_SECTION_URL).expect("Invalid url");

        // The fixture carries twelve marked items. Two have no usable
        // link or title and must not consume a rank.
        let records = scraper.scrape_page(&doc, &base, 1).unwrap();
        assert_eq!(records.len(), 10);
        let ranks: Vec<u32> = records.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, (1..=10).collect::<Vec<u32>>());

        assert_eq!(
            records[0],
            HeadlineRecord {
                title: "반도체 수출 넉 달 연속 증가, 경상수지 흑자 폭 확대".to_string(),
                url: "https://n.news.naver.com/mnews/article/001/0014900001".to_string(),
                press: Some("연합뉴스".to_string()),
                datetime: Some("32분전".to_string()),
                lede: Some(
                    "한국은행이 발표한 7월 국제수지 잠정치에서 상품수지 흑자가 석 달 만에 최대를 기록했다."
                        .to_string()
                ),
                is_blind: false,
                rank: 1,
            }
        );

        // Relative href joined against the section url.
        assert_eq!(records[1].title, "코스피 2,700선 회복 눈앞");
        assert_eq!(
            records[1].url,
            "https://news.naver.com/mnews/article/015/0005101234"
        );

        assert!(records[2].is_blind);
        assert_eq!(records[2].title, "가계대출 증가세 둔화, 금융당국 추가 대책 검토");

        assert_eq!(
            records[3],
            HeadlineRecord {
                title: "제목만 있는 단신".to_string(),
                url: "https://n.news.naver.com/mnews/article/025/0003400005".to_string(),
                press: None,
                datetime: None,
                lede: None,
                is_blind: false,
                rank: 4,
            }
        );

        // Empty datetime div on this item, the time element fills in.
        assert_eq!(records[4].title, "전세 사기 피해 지원 특별법 연장 합의");
        assert_eq!(records[4].datetime, Some("오전 9:30".to_string()));

        // Items outside the exact-id list never show up, even though a
        // prefix-matching list comes first in the document.
        assert!(records.iter().all(|r| r.title != "추천 목록에만 있는 기사"));
        assert!(records.iter().all(|r| r.title != "헤드라인 마커가 없는 일반 기사"));
        assert!(records.iter().all(|r| r.title != "최신 기사 목록의 기사"));
    }

    #[test]
    fn prefix_fallback_finds_the_renamed_list() {
        let scraper = section_scraper();
        let doc = fixture("section_page2.html");
        let base = Url::parse(DEFAULT_SECTION_URL).expect("Invalid url");

        // The fixture renames the list suffix, so only the id prefix matches.
        let records = scraper.scrape_page(&doc, &base, 1).unwrap();
        assert_eq!(records.len(), 7);
        assert_eq!(records[0].title, "추경 편성 논의 본격화, 내수 회복에 초점");
        assert!(records.iter().all(|r| r.title != "뒤쪽 추천 목록에만 있는 기사"));
    }

    #[test]
    fn ranks_span_both_fixture_pages_without_gaps() {
        let scraper = section_scraper();
        let base = Url::parse(DEFAULT_SECTION_URL).expect("Invalid url");

        let mut records = scraper
            .scrape_page(&fixture("section_page1.html"), &base, 1)
            .unwrap();
        let more = scraper
            .scrape_page(
                &fixture("section_page2.html"),
                &base,
                records.len() as u32 + 1,
            )
            .unwrap();
        records.extend(more);

        let ranks: Vec<u32> = records.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, (1..=17).collect::<Vec<u32>>());
    }
}
