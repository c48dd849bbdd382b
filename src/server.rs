use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    response::{Html, IntoResponse, Json},
    routing::{get, post},
    Extension, Router,
};
use hyper::Server;
use tracing::{error, info};

use crate::export;
use crate::news::HeadlineRecord;
use crate::CrawlerError;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_DATA_FILE: &str = "naver_section_101_visual.jsonl";

#[derive(Debug, Clone)]
pub struct ServerState {
    pub data_file: PathBuf,
}

/// Serves the live dashboard. The page polls `/api/data` for whatever the
/// last crawl wrote; `/api/crawl` reruns the one-page browser crawl as a
/// subprocess of this binary and reports its exit status.
pub async fn serve(state: ServerState, port: u16) -> Result<(), CrawlerError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("dashboard on http://localhost:{}", port);

    Server::bind(&addr)
        .serve(app(state).into_make_service())
        .await?;
    Ok(())
}

pub fn app(state: ServerState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/data", get(data))
        .route("/api/crawl", post(crawl))
        .layer(Extension(Arc::new(state)))
}

async fn index() -> impl IntoResponse {
    Html(INDEX_HTML)
}

async fn data(Extension(state): Extension<Arc<ServerState>>) -> Json<Vec<HeadlineRecord>> {
    if !state.data_file.exists() {
        return Json(Vec::new());
    }
    match export::read_jsonl(&state.data_file) {
        Ok(records) => Json(records),
        Err(err) => {
            error!("reading {} failed: {}", state.data_file.display(), err);
            Json(Vec::new())
        }
    }
}

async fn crawl(Extension(state): Extension<Arc<ServerState>>) -> Json<serde_json::Value> {
    let exe = match std::env::current_exe() {
        Ok(exe) => exe,
        Err(err) => {
            return Json(serde_json::json!({ "success": false, "error": err.to_string() }))
        }
    };

    let output = tokio::process::Command::new(exe)
        .args(["news", "--browser", "--pages", "1", "--sleep", "1", "--out"])
        .arg(&state.data_file)
        .output()
        .await;

    match output {
        Ok(output) if output.status.success() => {
            Json(serde_json::json!({ "success": true, "message": "Crawling finished" }))
        }
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            error!("crawl subprocess failed: {}", output.status);
            Json(serde_json::json!({ "success": false, "error": stderr }))
        }
        Err(err) => Json(serde_json::json!({ "success": false, "error": err.to_string() })),
    }
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="ko">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>네이버 경제 뉴스 라이브 모니터링</title>
    <link href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.0/dist/css/bootstrap.min.css" rel="stylesheet">
    <style>
        body { background-color: #f8f9fa; padding: 20px; }
        .news-card {
            background: white;
            border-radius: 12px;
            box-shadow: 0 4px 6px rgba(0,0,0,0.05);
            margin-bottom: 20px;
            transition: transform 0.2s;
            height: 100%;
        }
        .news-card:hover { transform: translateY(-3px); box-shadow: 0 8px 12px rgba(0,0,0,0.1); }
        .card-body { padding: 1.5rem; }
        .news-title { font-size: 1.1rem; font-weight: 700; margin-bottom: 0.5rem; color: #333; }
        .news-title a { text-decoration: none; color: inherit; }
        .news-meta { font-size: 0.85rem; color: #6c757d; margin-bottom: 1rem; }
        .news-lede { font-size: 0.95rem; color: #555; line-height: 1.5; display: -webkit-box; -webkit-line-clamp: 3; -webkit-box-orient: vertical; overflow: hidden; }
        .badge-press { background-color: #03c75a; color: white; padding: 4px 8px; border-radius: 4px; font-size: 0.75rem; margin-right: 5px; }
        .header { text-align: center; margin-bottom: 40px; }
        .btn-crawl { font-size: 1.2rem; padding: 10px 30px; border-radius: 50px; }
        #loading { display: none; margin-top: 20px; }
    </style>
</head>
<body>

<div class="container">
    <div class="header">
        <h1 class="display-6 fw-bold">📉 네이버 경제 뉴스 라이브</h1>
        <p class="lead">실시간으로 뉴스를 크롤링하고 확인하세요.</p>
        <button id="btn-run" class="btn btn-primary btn-crawl" onclick="runCrawling()">
            🚀 최신 뉴스 가져오기 (크롤링 시작)
        </button>
        <div id="loading" class="alert alert-info">
            <span class="spinner-border spinner-border-sm" role="status" aria-hidden="true"></span>
            크롤링 중입니다... 브라우저가 열리면 잠시만 기다려주세요! (약 5~10초)
        </div>
    </div>

    <div id="news-container" class="row row-cols-1 row-cols-md-2 row-cols-lg-3 g-4">
    </div>
</div>

<script src="https://cdn.jsdelivr.net/npm/bootstrap@5.3.0/dist/js/bootstrap.bundle.min.js"></script>
<script>
    async function loadData() {
        try {
            const response = await fetch('/api/data');
            const data = await response.json();
            const container = document.getElementById('news-container');
            container.innerHTML = '';

            if (data.length === 0) {
                container.innerHTML = '<p class="text-center w-100">데이터가 없습니다. 크롤링을 실행해주세요!</p>';
                return;
            }

            data.forEach((item, index) => {
                const card = `
                    <div class="col">
                        <div class="news-card">
                            <div class="card-body">
                                <div class="news-meta">
                                    <span class="badge-press">${item.press || '언론사'}</span>
                                    <span>${index + 1}위</span>
                                </div>
                                <h5 class="news-title">
                                    <a href="${item.url}" target="_blank">${item.title}</a>
                                </h5>
                                <p class="news-meta">${item.datetime || ''}</p>
                                <p class="news-lede">${item.lede || '내용 요약 없음'}</p>
                                <a href="${item.url}" target="_blank" class="btn btn-sm btn-outline-primary w-100 mt-2">기사 원문 보기</a>
                            </div>
                        </div>
                    </div>
                `;
                container.innerHTML += card;
            });
        } catch (error) {
            console.error('Error loading data:', error);
        }
    }

    async function runCrawling() {
        const btn = document.getElementById('btn-run');
        const loading = document.getElementById('loading');

        btn.disabled = true;
        loading.style.display = 'block';

        try {
            const response = await fetch('/api/crawl', { method: 'POST' });
            const result = await response.json();

            if (result.success) {
                alert('크롤링 완료! 최신 데이터를 불러옵니다.');
                loadData();
            } else {
                alert('크롤링 실패: ' + result.error);
            }
        } catch (error) {
            alert('서버 오류 발생');
        } finally {
            btn.disabled = false;
            loading.style.display = 'none';
        }
    }

    window.onload = loadData;
</script>
</body>
</html>
"#;
