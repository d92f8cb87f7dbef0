#[cfg(all(target_os = "linux", target_env = "musl"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::{env, sync::Arc};

use anyhow::Result;
use tokio_cron_scheduler::JobScheduler;

use crate::{
    config::SETTINGS,
    crawler::{
        google::finance::{GoogleFinance, MarketSummaryExtractor},
        Scraper,
    },
    database::SQLite,
    event::market_summary::{MarketSummaryTask, Writer},
};

pub mod config;
pub mod crawler;
pub mod database;
pub mod declare;
pub mod event;
pub mod logging;
pub mod scheduler;
pub mod util;
pub mod web;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    util::ensure_rustls_crypto_provider();

    logging::info_file_async(format!(
        "NasdaqCrawler 啟動中 Rust OS/Arch: {}/{}",
        env::consts::OS,
        env::consts::ARCH
    ));

    let db = SQLite::new(&SETTINGS.sqlite.path);

    // 建表失敗只記錄，服務照常啟動
    if let Err(why) = db.initialize().await {
        logging::error_file_async(format!("Failed to initialize database because {:?}", why));
        logging::error_console(format!("Failed to initialize database because {:?}", why));
    }

    let market_summary = MarketSummaryTask::new(
        Scraper::new(
            Arc::new(GoogleFinance::new(SETTINGS.crawler.url.clone())),
            Arc::new(MarketSummaryExtractor::default()),
        ),
        Writer::new(db.clone()),
    );

    let mut sched = JobScheduler::new().await?;
    scheduler::start(&sched, &SETTINGS.crawler.cron, market_summary).await?;

    let shutdown = async {
        if let Err(why) = tokio::signal::ctrl_c().await {
            logging::error_file_async(format!("Failed to listen for ctrl_c because {:?}", why));
        }
    };

    web::start(&SETTINGS.web_addr(), db.clone(), shutdown).await?;

    sched.shutdown().await?;
    db.pool().close().await;
    logging::info_file_async("NasdaqCrawler 已停止");

    Ok(())
}
