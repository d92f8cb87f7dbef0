use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

use crate::{
    database::{
        table::{stock::Stock, stock_exchange_master::StockExchangeMaster},
        SQLite,
    },
    declare::StockExchange,
};

pub const INVALID_EXCHANGE_NAME: &str = "StockExchange name should be NASDAQ";
pub const LIMIT_EXCEEDS_RECORDS: &str =
    "Request failed. The limit entered is exceeds available records in system";
pub const INVALID_LIMIT: &str = "Request failed. The limit entered is not a valid number";
pub const ZERO_RESULT: &str = "zero result";
pub const INTERNAL_ERROR: &str = "Internal server error";

/// 回應的最外層 `{"StockBrokerInc": ...}`
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Envelope {
    #[serde(rename = "StockBrokerInc")]
    pub stock_broker_inc: Body,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Body {
    Nasdaq {
        #[serde(rename = "Nasdaq")]
        nasdaq: StockItems,
    },
    Message {
        #[serde(rename = "Message")]
        message: String,
    },
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct StockItems {
    #[serde(rename = "StockItems")]
    pub items: Vec<StockItem>,
    #[serde(rename = "Message", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct StockItem {
    pub id: i64,
    pub value: String,
    pub change_percentage: String,
    /// 寫入時間，輸出為 ISO 8601 (UTC, 毫秒)
    #[serde(rename = "DateTime", serialize_with = "serialize_iso8601")]
    pub date_time: DateTime<Utc>,
}

impl From<Stock> for StockItem {
    fn from(stock: Stock) -> Self {
        StockItem {
            id: stock.id,
            value: stock.value,
            change_percentage: stock.change_percentage,
            date_time: stock.created_date.with_timezone(&Utc),
        }
    }
}

fn serialize_iso8601<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

impl Envelope {
    pub fn message(message: impl Into<String>) -> Self {
        Envelope {
            stock_broker_inc: Body::Message {
                message: message.into(),
            },
        }
    }

    pub fn items(items: Vec<StockItem>, message: Option<String>) -> Self {
        Envelope {
            stock_broker_inc: Body::Nasdaq {
                nasdaq: StockItems { items, message },
            },
        }
    }
}

/// 查詢的結果，驗證失敗也是一種結果而不是錯誤
#[derive(Debug, Clone, PartialEq)]
pub enum Latest {
    /// 由新到舊的觀測值
    Items(Vec<StockItem>),
    /// 要求 0 筆
    Empty,
    /// 參數驗證失敗的訊息
    Rejected(&'static str),
}

impl From<Latest> for Envelope {
    fn from(latest: Latest) -> Self {
        match latest {
            Latest::Items(items) => Envelope::items(items, None),
            Latest::Empty => Envelope::items(vec![], Some(ZERO_RESULT.to_string())),
            Latest::Rejected(message) => Envelope::message(message),
        }
    }
}

#[derive(Clone)]
pub struct StockService {
    db: SQLite,
}

impl StockService {
    pub fn new(db: SQLite) -> Self {
        StockService { db }
    }

    /// 取得指定交易所最近 `limit` 筆觀測值。
    ///
    /// 驗證順序：交易所名稱 → `limit` 是否為非負整數 → 是否超過該交易所的資料筆數 → 是否為 0。
    /// 筆數與資料分兩次查詢，中間若有新資料寫入，兩者看到的狀態可能不同。
    ///
    /// # Errors
    /// 只有資料庫查詢失敗時回傳錯誤。
    pub async fn get_latest(&self, exchange_name: &str, limit: Option<i64>) -> Result<Latest> {
        let name = exchange_name.to_lowercase();
        if name != StockExchange::Nasdaq.as_ref() {
            return Ok(Latest::Rejected(INVALID_EXCHANGE_NAME));
        }

        let limit = match limit {
            Some(limit) if limit >= 0 => limit,
            _ => return Ok(Latest::Rejected(INVALID_LIMIT)),
        };

        let stock_exchange_master_id = StockExchangeMaster::fetch_id_by_name(&self.db, &name).await?;
        let available = match stock_exchange_master_id {
            Some(id) => Stock::count_by_exchange(&self.db, id).await?,
            None => 0,
        };

        if limit > available {
            return Ok(Latest::Rejected(LIMIT_EXCEEDS_RECORDS));
        }

        let Some(stock_exchange_master_id) = stock_exchange_master_id.filter(|_| limit > 0) else {
            return Ok(Latest::Empty);
        };

        let items = Stock::fetch_latest(&self.db, stock_exchange_master_id, limit)
            .await?
            .into_iter()
            .map(StockItem::from)
            .collect();

        Ok(Latest::Items(items))
    }
}
