use std::time::Duration;

use anyhow::Result;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Sqlite, SqlitePool, Transaction,
};
use strum::IntoEnumIterator;

use crate::{
    database::table::{stock, stock_exchange_master},
    declare::StockExchange,
    logging,
};

pub mod table;

/// SQLite 連線池封裝。
///
/// 由 `main` 建立後以 clone 的方式交給爬蟲與 web 服務使用，
/// 內部的 `SqlitePool` 本身就是共享的 handle。
#[derive(Clone, Debug)]
pub struct SQLite {
    /// SQLx SQLite 連線池實例。
    pub pool: SqlitePool,
}

impl SQLite {
    /// 建立指向資料庫檔案的連線池，檔案不存在時於第一次連線建立。
    ///
    /// 連線是延遲建立的，路徑無法開啟時要到第一次查詢才會回傳錯誤。
    pub fn new(path: &str) -> SQLite {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));
        let pool = SqlitePoolOptions::new()
            .max_lifetime(Some(Duration::from_secs(1800))) // 30 分鐘
            .max_connections(5)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Some(Duration::from_secs(600))) // 10 分鐘
            .connect_lazy_with(options);

        Self { pool }
    }

    /// 建立記憶體資料庫，只有一條連線且永不回收，關閉後資料即消失。
    #[cfg(test)]
    pub async fn memory() -> Result<SQLite> {
        use std::str::FromStr;

        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .max_lifetime(None)
            .idle_timeout(None)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// 取得連線池參考。
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// 從目前連線池建立一筆 transaction。
    ///
    /// # Errors
    /// 當 `BEGIN` 失敗時回傳錯誤。
    pub async fn tx(&self) -> Result<Transaction<'_, Sqlite>> {
        Ok(self.pool().begin().await?)
    }

    /// 建立資料表並寫入預設的交易所。
    ///
    /// 交易所只有在查無同名資料時才會新增，重複呼叫不會產生重複的資料列。
    ///
    /// # Errors
    /// 任一 DDL 或 SQL 執行失敗時回傳錯誤，呼叫端決定是否中止。
    pub async fn initialize(&self) -> Result<()> {
        stock_exchange_master::StockExchangeMaster::create_table(self).await?;
        stock::Stock::create_table(self).await?;

        for exchange in StockExchange::iter() {
            let name = exchange.to_string();
            if stock_exchange_master::StockExchangeMaster::fetch_id_by_name(self, &name)
                .await?
                .is_none()
            {
                let id = stock_exchange_master::StockExchangeMaster::new(name.clone())
                    .insert(self)
                    .await?;
                logging::info_file_async(format!("新增交易所 {}({})", name, id));
            }
        }

        Ok(())
    }
}
