use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_error::ErrorLayer;
use tracing_subscriber::prelude::*;
use url::Url;

use naver_portal_crawler::browser::{BrowserOptions, ChromeDriver};
use naver_portal_crawler::dom::ContainerSpec;
use naver_portal_crawler::export;
use naver_portal_crawler::fetch::HttpFetcher;
use naver_portal_crawler::news::{self, HeadlineRecord, SectionConfig, SectionScraper};
use naver_portal_crawler::ranking::{self, RankingConfig};
use naver_portal_crawler::render;
use naver_portal_crawler::server::{self, ServerState};
use naver_portal_crawler::CrawlerError;

#[derive(Parser)]
#[command(name = "naver-portal-crawler")]
#[command(about = "Crawls Naver section headlines and shopping rankings", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Crawl section headlines over plain HTTP, or through a browser
    News(NewsArgs),
    /// Crawl the shopping ranking list by scrolling a browser page
    Ranking(RankingArgs),
    /// Render a crawled JSONL file into a static HTML dashboard
    Render(RenderArgs),
    /// Serve the live dashboard with an on-demand crawl endpoint
    Serve(ServeArgs),
}

#[derive(clap::Args)]
struct NewsArgs {
    /// Section URL
    #[arg(long, default_value = news::DEFAULT_SECTION_URL)]
    url: Url,

    /// Exact id of the headline list container
    #[arg(long, default_value = news::DEFAULT_LIST_ID)]
    list_id: String,

    /// Fallback id prefix used when the exact id is gone
    #[arg(long, default_value = news::LIST_ID_PREFIX)]
    id_prefix: String,

    /// Number of pages to crawl
    #[arg(long, default_value_t = 1)]
    pages: u32,

    /// Delay between pages in seconds
    #[arg(long, default_value_t = 0.8)]
    sleep: f64,

    /// Request and page-load timeout in seconds
    #[arg(long, default_value_t = 10.0)]
    timeout: f64,

    #[arg(long, value_enum, default_value_t = OutputFormat::Jsonl)]
    format: OutputFormat,

    /// Output path, derived from the format when omitted
    #[arg(long)]
    out: Option<PathBuf>,

    /// Crawl through a browser instead of plain HTTP
    #[arg(long)]
    browser: bool,

    /// Run the browser variant without a window
    #[arg(long)]
    headless: bool,

    #[arg(long)]
    debug: bool,
}

#[derive(clap::Args)]
struct RankingArgs {
    /// Ranking page URL
    #[arg(long, default_value = ranking::DEFAULT_RANKING_URL)]
    url: Url,

    /// Exact id of the ranking list container
    #[arg(long, default_value = ranking::DEFAULT_CONTAINER_ID)]
    container_id: String,

    /// Fallback id prefix used when the exact id is gone
    #[arg(long, default_value = ranking::CONTAINER_ID_PREFIX)]
    id_prefix: String,

    /// Number of scroll-to-bottom passes
    #[arg(long, default_value_t = 5)]
    scrolls: u32,

    /// Settle wait after each scroll in seconds
    #[arg(long, default_value_t = 0.9)]
    wait_sec: f64,

    /// Page-load and growth-wait timeout in seconds
    #[arg(long, default_value_t = 12.0)]
    timeout: f64,

    #[arg(long, value_enum, default_value_t = OutputFormat::Jsonl)]
    format: OutputFormat,

    /// Output path, derived from the format when omitted
    #[arg(long)]
    out: Option<PathBuf>,

    /// Run the browser without a window
    #[arg(long)]
    headless: bool,

    /// Browser window size as WIDTH,HEIGHT
    #[arg(long, default_value = "1400,900", value_parser = parse_window_size)]
    window_size: (u32, u32),

    #[arg(long)]
    user_agent: Option<String>,

    #[arg(long)]
    debug: bool,
}

#[derive(clap::Args)]
struct RenderArgs {
    /// JSONL file produced by the news crawl
    #[arg(long, default_value = "naver_section_101_headlines.jsonl")]
    input: PathBuf,

    /// Output HTML path
    #[arg(long, default_value = "naver_section_101_headlines.html")]
    out: PathBuf,

    #[arg(long)]
    debug: bool,
}

#[derive(clap::Args)]
struct ServeArgs {
    /// JSONL file the dashboard reads and the crawl endpoint rewrites
    #[arg(long, default_value = server::DEFAULT_DATA_FILE)]
    data_file: PathBuf,

    #[arg(long, default_value_t = server::DEFAULT_PORT)]
    port: u16,

    #[arg(long)]
    debug: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Jsonl,
    Csv,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Jsonl => write!(f, "jsonl"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

fn parse_window_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(',')
        .ok_or_else(|| "expected WIDTH,HEIGHT".to_string())?;
    let w = w.trim().parse().map_err(|_| format!("bad width: {}", w))?;
    let h = h.trim().parse().map_err(|_| format!("bad height: {}", h))?;
    Ok((w, h))
}

fn write_records<T: Serialize>(
    path: &Path,
    records: &[T],
    format: OutputFormat,
) -> Result<(), CrawlerError> {
    match format {
        OutputFormat::Jsonl => export::write_jsonl(path, records),
        OutputFormat::Csv => export::write_csv(path, records),
    }
}

async fn run_news(args: NewsArgs) -> Result<(), CrawlerError> {
    let timeout = Duration::from_secs_f64(args.timeout.max(1.0));
    let scraper = SectionScraper::new(ContainerSpec::new(&args.list_id, &args.id_prefix));
    let config = SectionConfig {
        url: args.url.clone(),
        pages: args.pages.max(1),
        page_delay: Duration::from_secs_f64(args.sleep.max(0.0)),
    };

    let records = if args.browser {
        let driver = ChromeDriver::launch(&BrowserOptions {
            headless: args.headless,
            window_size: (1200, 800),
            user_agent: None,
            ready_timeout: timeout,
        })
        .await?;
        let result = news::crawl_section(&driver, &scraper, &config).await;
        driver.shutdown().await;
        result?
    } else {
        let fetcher = HttpFetcher::new(timeout)?;
        news::crawl_section(&fetcher, &scraper, &config).await?
    };

    let out = args
        .out
        .unwrap_or_else(|| PathBuf::from(format!("naver_section_101_headlines.{}", args.format)));
    write_records(&out, &records, args.format)?;
    println!("OK: {} items -> {}", records.len(), out.display());
    Ok(())
}

async fn run_ranking(args: RankingArgs) -> Result<(), CrawlerError> {
    let timeout = Duration::from_secs_f64(args.timeout.max(1.0));
    let config = RankingConfig {
        url: args.url.clone(),
        container: ContainerSpec::new(&args.container_id, &args.id_prefix),
        scrolls: args.scrolls,
        settle_wait: Duration::from_secs_f64(args.wait_sec.max(0.0)),
        timeout,
    };

    let mut driver = ChromeDriver::launch(&BrowserOptions {
        headless: args.headless,
        window_size: args.window_size,
        user_agent: args.user_agent.clone(),
        ready_timeout: timeout,
    })
    .await?;
    let result = ranking::crawl_ranking(&mut driver, &config).await;
    driver.shutdown().await;
    let records = result?;

    let out = args.out.unwrap_or_else(|| {
        PathBuf::from(format!(
            "naver_shopping_ranking_{}scroll.{}",
            args.scrolls, args.format
        ))
    });
    write_records(&out, &records, args.format)?;
    println!("OK: {} li items -> {}", records.len(), out.display());
    Ok(())
}

fn run_render(args: RenderArgs) -> Result<(), CrawlerError> {
    let records: Vec<HeadlineRecord> = export::read_jsonl(&args.input)?;
    if records.is_empty() {
        println!("데이터가 없습니다. 크롤링을 먼저 실행해주세요!");
        return Ok(());
    }

    let html = render::render_dashboard(&records);
    fs::write(&args.out, html)?;

    let shown = fs::canonicalize(&args.out).unwrap_or_else(|_| args.out.clone());
    println!("변환 완료! 아래 파일을 브라우저에서 여세요:\n{}", shown.display());
    Ok(())
}

async fn run_serve(args: ServeArgs) -> Result<(), CrawlerError> {
    server::serve(
        ServerState {
            data_file: args.data_file,
        },
        args.port,
    )
    .await
}

fn init_tracing(debug: bool) {
    let default_directives = if debug {
        "debug,html5ever=error,selectors=error,hyper=warn,reqwest=info"
    } else {
        "info,html5ever=error,selectors=error,hyper=warn,reqwest=info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_env("LOG_LEVEL")
                .unwrap_or_else(|_| default_directives.into()),
        )
        .with(ErrorLayer::default())
        .init();
}

fn debug_requested(command: &Command) -> bool {
    match command {
        Command::News(a) => a.debug,
        Command::Ranking(a) => a.debug,
        Command::Render(a) => a.debug,
        Command::Serve(a) => a.debug,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(debug_requested(&cli.command));

    match cli.command {
        Command::News(args) => run_news(args).await?,
        Command::Ranking(args) => run_ranking(args).await?,
        Command::Render(args) => run_render(args)?,
        Command::Serve(args) => run_serve(args).await?,
    }
    Ok(())
}
