use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::{anyhow, Result};
use scopeguard::defer;

use crate::{
    crawler::Scraper,
    database::{
        table::{stock::Stock, stock_exchange_master::StockExchangeMaster},
        SQLite,
    },
    declare::MarketSummary,
    logging,
    util::text,
};

/// 將擷取到的大盤摘要寫入 `stock`
#[derive(Clone)]
pub struct Writer {
    db: SQLite,
}

impl Writer {
    pub fn new(db: SQLite) -> Self {
        Writer { db }
    }

    /// 以名稱找出交易所後寫入一筆觀測值，回傳新資料的 id。
    ///
    /// 指數與漲跌幅原樣保存；無法解析成數字時只記錄警告。
    ///
    /// # Errors
    /// 查無交易所或寫入失敗時回傳錯誤，不會重試。
    pub async fn write(&self, summary: &MarketSummary) -> Result<i64> {
        for (field, raw) in [("value", &summary.value), ("change", &summary.change)] {
            if let Err(why) = text::parse_decimal(raw, None) {
                logging::warn_file_async(format!(
                    "The {} '{}' of {} is not numeric, stored as is. {:?}",
                    field, raw, summary.name, why
                ));
            }
        }

        let stock_exchange_master_id =
            StockExchangeMaster::fetch_id_by_name(&self.db, &summary.name)
                .await?
                .ok_or_else(|| {
                    anyhow!(
                        "Failed to insert into stock because the stock exchange '{}' does not exist",
                        summary.name
                    )
                })?;

        let id = Stock::new(
            summary.value.clone(),
            summary.change.clone(),
            stock_exchange_master_id,
        )
        .insert(&self.db)
        .await?;

        logging::debug_file_async(format!("stock({}) {:?}", id, summary));

        Ok(id)
    }
}

/// 一次排程執行的結果
#[derive(Debug, Clone, PartialEq)]
pub enum Tick {
    /// 上一次執行尚未結束
    Skipped,
    /// 取回頁面失敗
    FetchFailed,
    /// 寫入資料庫失敗
    WriteFailed,
    /// 寫入成功，帶新資料的 id
    Written(i64),
}

/// 抓取大盤摘要並寫入資料庫的排程工作。
///
/// 同一時間只會有一次執行，前一次還沒結束時新的觸發會被略過。
#[derive(Clone)]
pub struct MarketSummaryTask {
    scraper: Scraper,
    writer: Writer,
    in_flight: Arc<AtomicBool>,
}

impl MarketSummaryTask {
    pub fn new(scraper: Scraper, writer: Writer) -> Self {
        MarketSummaryTask {
            scraper,
            writer,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 所有錯誤都在這裡記錄後吞掉，不往上拋
    pub async fn execute(&self) -> Tick {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            logging::warn_file_async(format!(
                "The previous scrape of {} is still running, skip this tick",
                self.scraper.url()
            ));
            return Tick::Skipped;
        }

        defer! {
            self.in_flight.store(false, Ordering::Release);
        }

        let summary = match self.scraper.scrape_once().await {
            Ok(summary) => summary,
            Err(why) => {
                logging::error_file_async(format!(
                    "run time error when scraping data from {} because {:?}",
                    self.scraper.url(),
                    why
                ));
                return Tick::FetchFailed;
            }
        };

        match self.writer.write(&summary).await {
            Ok(id) => Tick::Written(id),
            Err(why) => {
                logging::error_file_async(format!("{:?} {:?}", summary, why));
                Tick::WriteFailed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::crawler::{
        google::finance::MarketSummaryExtractor,
        tests::{FixedSource, MARKET_SUMMARY_HTML},
        PageSource,
    };

    async fn prepare() -> SQLite {
        let db = SQLite::memory().await.unwrap();
        db.initialize().await.unwrap();
        db
    }

    fn task(db: &SQLite, source: impl PageSource + 'static) -> MarketSummaryTask {
        MarketSummaryTask::new(
            Scraper::new(
                Arc::new(source),
                Arc::new(MarketSummaryExtractor::default()),
            ),
            Writer::new(db.clone()),
        )
    }

    /// 收到通知才回傳頁面的來源
    struct GatedSource {
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl PageSource for GatedSource {
        fn url(&self) -> &str {
            "fixture://gated"
        }

        async fn fetch(&self) -> Result<String> {
            self.gate.notified().await;
            Ok(MARKET_SUMMARY_HTML.to_string())
        }
    }

    #[tokio::test]
    async fn test_write() {
        let db = prepare().await;
        let writer = Writer::new(db.clone());

        let id = writer
            .write(&MarketSummary::new("nasdaq", "5,865.95", "+0.35%"))
            .await
            .unwrap();

        let rows = Stock::fetch_latest(&db, 1, 1).await.unwrap();
        assert_eq!(rows[0].id, id);
        assert_eq!(rows[0].value, "5,865.95");
        assert_eq!(rows[0].change_percentage, "+0.35%");
    }

    #[tokio::test]
    async fn test_write_unknown_exchange() {
        let db = prepare().await;
        let writer = Writer::new(db.clone());

        assert!(writer
            .write(&MarketSummary::new("", "", ""))
            .await
            .is_err());
        assert_eq!(Stock::count_by_exchange(&db, 1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_execute() {
        let db = prepare().await;
        let task = task(&db, FixedSource::page(MARKET_SUMMARY_HTML));

        assert_eq!(task.execute().await, Tick::Written(1));
        assert_eq!(task.execute().await, Tick::Written(2));
        assert!(!task.in_flight.load(Ordering::Acquire));
    }

    #[tokio::test]
    async fn test_execute_fetch_failed() {
        let db = prepare().await;
        let task = task(&db, FixedSource::unreachable());

        assert_eq!(task.execute().await, Tick::FetchFailed);
        assert_eq!(Stock::count_by_exchange(&db, 1).await.unwrap(), 0);
        assert!(!task.in_flight.load(Ordering::Acquire));
    }

    #[tokio::test]
    async fn test_execute_changed_layout() {
        let db = prepare().await;
        let task = task(&db, FixedSource::page("<html><body></body></html>"));

        assert_eq!(task.execute().await, Tick::WriteFailed);
        assert_eq!(Stock::count_by_exchange(&db, 1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_execute_skips_overlapping_tick() {
        let db = prepare().await;
        let gate = Arc::new(Notify::new());
        let task = task(&db, GatedSource { gate: gate.clone() });

        let first = tokio::spawn({
            let task = task.clone();
            async move { task.execute().await }
        });

        while !task.in_flight.load(Ordering::Acquire) {
            tokio::task::yield_now().await;
        }

        assert_eq!(task.execute().await, Tick::Skipped);

        gate.notify_one();
        assert_eq!(first.await.unwrap(), Tick::Written(1));
        assert!(!task.in_flight.load(Ordering::Acquire));
    }
}
