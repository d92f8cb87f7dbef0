use anyhow::{anyhow, Result};
use chrono::{DateTime, Local, SubsecRound};

use crate::database::SQLite;

/// 大盤觀測值資料列（`stock`）。
///
/// `value` 與 `change_percentage` 保留網頁上的原始文字，
/// 欄位宣告為 DECIMAL，因此 SQLite 會把像數字的文字轉存為數值，
/// 讀取時一律轉回文字。
#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct Stock {
    pub id: i64,
    pub value: String,
    pub change_percentage: String,
    /// 寫入時的伺服器時間，精確到毫秒。
    #[sqlx(rename = "createddate")]
    pub created_date: DateTime<Local>,
    pub stock_exchange_master_id: i64,
}

impl Stock {
    pub fn new(value: String, change_percentage: String, stock_exchange_master_id: i64) -> Self {
        Stock {
            id: Default::default(),
            value,
            change_percentage,
            created_date: Local::now().trunc_subsecs(3),
            stock_exchange_master_id,
        }
    }

    pub async fn create_table(db: &SQLite) -> Result<()> {
        sqlx::query(
            r#"
CREATE TABLE IF NOT EXISTS stock (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    value DECIMAL(8, 2),
    change_percentage DECIMAL(8, 2),
    createddate DATETIME,
    stock_exchange_master_id INTEGER REFERENCES stock_exchange_master (id)
);
"#,
        )
        .execute(db.pool())
        .await
        .map_err(|why| anyhow!("Failed to create table stock because: {:?}", why))?;

        Ok(())
    }

    /// 寫入一筆觀測值並回傳新的 id。
    ///
    /// # Errors
    /// `stock_exchange_master_id` 不存在時會因外鍵限制而失敗。
    pub async fn insert(&self, db: &SQLite) -> Result<i64> {
        let mut transaction = db.tx().await?;
        match sqlx::query(
            "
INSERT INTO
    stock (
        value,
        change_percentage,
        createddate,
        stock_exchange_master_id
    )
VALUES
    (?, ?, ?, ?);
",
        )
        .bind(&self.value)
        .bind(&self.change_percentage)
        .bind(self.created_date)
        .bind(self.stock_exchange_master_id)
        .execute(&mut *transaction)
        .await
        {
            Ok(r) => {
                transaction.commit().await?;
                Ok(r.last_insert_rowid())
            }
            Err(why) => {
                transaction.rollback().await?;
                Err(anyhow!("Failed to insert into stock because: {:?}", why))
            }
        }
    }

    /// 指定交易所目前的觀測值筆數。
    pub async fn count_by_exchange(db: &SQLite, stock_exchange_master_id: i64) -> Result<i64> {
        let (row_count,) = sqlx::query_as::<_, (i64,)>(
            "SELECT COUNT(*) FROM stock WHERE stock_exchange_master_id = ?;",
        )
        .bind(stock_exchange_master_id)
        .fetch_one(db.pool())
        .await
        .map_err(|why| {
            anyhow!(
                "Failed to Stock::count_by_exchange({}) because: {:?}",
                stock_exchange_master_id,
                why
            )
        })?;

        Ok(row_count)
    }

    /// 依 id 由新到舊取出指定交易所最近的 `limit` 筆觀測值。
    pub async fn fetch_latest(
        db: &SQLite,
        stock_exchange_master_id: i64,
        limit: i64,
    ) -> Result<Vec<Stock>> {
        sqlx::query_as::<_, Stock>(
            r#"
SELECT
    id,
    CAST(value AS TEXT) AS value,
    CAST(change_percentage AS TEXT) AS change_percentage,
    createddate,
    stock_exchange_master_id
FROM
    stock
WHERE
    stock_exchange_master_id = ?
ORDER BY
    id DESC
LIMIT ?;
"#,
        )
        .bind(stock_exchange_master_id)
        .bind(limit)
        .fetch_all(db.pool())
        .await
        .map_err(|why| {
            anyhow!(
                "Failed to Stock::fetch_latest({}, {}) because: {:?}",
                stock_exchange_master_id,
                limit,
                why
            )
        })
    }
}
