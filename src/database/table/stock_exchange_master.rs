use anyhow::{anyhow, Result};

use crate::database::SQLite;

/// 交易所主檔 (`stock_exchange_master`)。
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct StockExchangeMaster {
    pub id: i64,
    /// 交易所名稱，一律小寫。
    pub name: String,
}

impl StockExchangeMaster {
    pub fn new(name: String) -> Self {
        StockExchangeMaster {
            id: Default::default(),
            name: name.to_lowercase(),
        }
    }

    pub async fn create_table(db: &SQLite) -> Result<()> {
        sqlx::query(
            r#"
CREATE TABLE IF NOT EXISTS stock_exchange_master (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name VARCHAR(255)
);
"#,
        )
        .execute(db.pool())
        .await
        .map_err(|why| {
            anyhow!(
                "Failed to create table stock_exchange_master because: {:?}",
                why
            )
        })?;

        Ok(())
    }

    /// 以名稱(不分大小寫)取得交易所的 id，查無資料時回傳 `None`。
    pub async fn fetch_id_by_name(db: &SQLite, name: &str) -> Result<Option<i64>> {
        let row = sqlx::query_as::<_, (i64,)>(
            "SELECT id FROM stock_exchange_master WHERE name = ? ORDER BY id LIMIT 1;",
        )
        .bind(name.to_lowercase())
        .fetch_optional(db.pool())
        .await
        .map_err(|why| {
            anyhow!(
                "Failed to StockExchangeMaster::fetch_id_by_name({}) because: {:?}",
                name,
                why
            )
        })?;

        Ok(row.map(|(id,)| id))
    }

    /// 新增一筆交易所並回傳其 id。
    pub async fn insert(&self, db: &SQLite) -> Result<i64> {
        let mut transaction = db.tx().await?;
        match sqlx::query("INSERT INTO stock_exchange_master (name) VALUES (?);")
            .bind(&self.name)
            .execute(&mut *transaction)
            .await
        {
            Ok(r) => {
                transaction.commit().await?;
                Ok(r.last_insert_rowid())
            }
            Err(why) => {
                transaction.rollback().await?;
                Err(anyhow!(
                    "Failed to insert into stock_exchange_master because: {:?}",
                    why
                ))
            }
        }
    }
}
