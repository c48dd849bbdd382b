use chrono::Local;

use crate::news::HeadlineRecord;

/// Renders the collected headlines as a self-contained Bootstrap card grid.
/// Everything that came from the page goes through `escape` first.
pub fn render_dashboard(records: &[HeadlineRecord]) -> String {
    let cards: String = records.iter().map(render_card).collect();
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    page(&timestamp, records.len(), &cards)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn render_card(record: &HeadlineRecord) -> String {
    let press = record
        .press
        .as_deref()
        .filter(|p| !p.is_empty())
        .unwrap_or("언론사");
    let datetime = record.datetime.as_deref().unwrap_or("");
    let lede = record
        .lede
        .as_deref()
        .filter(|l| !l.is_empty())
        .unwrap_or("내용 요약 없음");

    format!(
        r#"
        <div class="col">
            <div class="news-card">
                <div class="card-body">
                    <div class="news-meta">
                        <span class="badge-press">{press}</span>
                        <span>{rank}위</span>
                    </div>
                    <h5 class="news-title">
                        <a href="{url}" target="_blank">{title}</a>
                    </h5>
                    <p class="news-meta">{datetime}</p>
                    <p class="news-lede">{lede}</p>
                    <a href="{url}" target="_blank" class="btn btn-sm btn-outline-primary w-100 mt-2">기사 원문 보기</a>
                </div>
            </div>
        </div>
"#,
        press = escape(press),
        rank = record.rank,
        url = escape(&record.url),
        title = escape(&record.title),
        datetime = escape(datetime),
        lede = escape(lede),
    )
}

fn page(timestamp: &str, total: usize, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="ko">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>네이버 경제 뉴스 크롤링 결과</title>
    <link href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.0/dist/css/bootstrap.min.css" rel="stylesheet">
    <style>
        body {{ background-color: #f8f9fa; padding: 20px; }}
        .news-card {{
            background: white;
            border-radius: 12px;
            box-shadow: 0 4px 6px rgba(0,0,0,0.05);
            margin-bottom: 20px;
            transition: transform 0.2s;
            height: 100%;
        }}
        .news-card:hover {{ transform: translateY(-3px); box-shadow: 0 8px 12px rgba(0,0,0,0.1); }}
        .card-body {{ padding: 1.5rem; }}
        .news-title {{ font-size: 1.1rem; font-weight: 700; margin-bottom: 0.5rem; color: #333; }}
        .news-title a {{ text-decoration: none; color: inherit; }}
        .news-meta {{ font-size: 0.85rem; color: #6c757d; margin-bottom: 1rem; }}
        .news-lede {{ font-size: 0.95rem; color: #555; line-height: 1.5; display: -webkit-box; -webkit-line-clamp: 3; -webkit-box-orient: vertical; overflow: hidden; }}
        .badge-press {{ background-color: #03c75a; color: white; padding: 4px 8px; border-radius: 4px; font-size: 0.75rem; margin-right: 5px; }}
        .header {{ text-align: center; margin-bottom: 40px; }}
        .updated-time {{ font-size: 0.9rem; color: #888; margin-top: 10px; }}
    </style>
</head>
<body>

<div class="container">
    <div class="header">
        <h1 class="display-6 fw-bold">📉 네이버 경제 뉴스 모니터링</h1>
        <p class="updated-time">생성 시간: {timestamp}</p>
        <p class="lead">총 {total}개의 기사가 수집되었습니다.</p>
    </div>

    <div class="row row-cols-1 row-cols-md-2 row-cols-lg-3 g-4">
        {content}
    </div>
</div>

<script src="https://cdn.jsdelivr.net/npm/bootstrap@5.3.0/dist/js/bootstrap.bundle.min.js"></script>
</body>
</html>
"#,
        timestamp = timestamp,
        total = total,
        content = content,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(rank: u32) -> HeadlineRecord {
        HeadlineRecord {
            title: format!("{}번째 기사", rank),
            url: format!("https://n.news.naver.com/a/{}", rank),
            press: Some("연합뉴스".to_string()),
            datetime: Some("1시간전".to_string()),
            lede: Some("요약문".to_string()),
            is_blind: false,
            rank,
        }
    }

    #[test]
    fn renders_a_card_per_record_with_rank_labels() {
        let html = render_dashboard(&[record(1), record(2)]);
        assert!(html.contains("총 2개의 기사가 수집되었습니다."));
        assert!(html.contains("1위"));
        assert!(html.contains("2위"));
        assert!(html.contains("연합뉴스"));
        assert!(html.contains(r#"href="https://n.news.naver.com/a/1""#));
    }

    #[test]
    fn missing_fields_fall_back_to_placeholders() {
        let mut r = record(1);
        r.press = None;
        r.lede = None;
        let html = render_dashboard(&[r]);
        assert!(html.contains("언론사"));
        assert!(html.contains("내용 요약 없음"));
    }

    #[test]
    fn page_text_is_escaped() {
        let mut r = record(1);
        r.title = r#"<script>alert("x")</script> & co"#.to_string();
        let html = render_dashboard(&[r]);
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; co"));
    }

    #[test]
    fn an_empty_run_still_renders_a_page() {
        let html = render_dashboard(&[]);
        assert!(html.contains("총 0개의 기사가 수집되었습니다."));
        assert!(html.contains("네이버 경제 뉴스 모니터링"));
    }
}
