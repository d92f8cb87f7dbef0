use strum::{AsRefStr, Display, EnumIter, EnumString};

/// 交易所
///
/// 字串形式一律為小寫，與 `stock_exchange_master.name` 相同。
#[derive(Debug, Copy, Clone, PartialEq, Eq, Display, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StockExchange {
    /// 那斯達克
    Nasdaq,
}

/// 從網頁上擷取到的一筆大盤摘要
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MarketSummary {
    /// 交易所名稱 (已轉小寫)
    pub name: String,
    /// 指數
    pub value: String,
    /// 漲跌幅
    pub change: String,
}

impl MarketSummary {
    pub fn new(name: impl Into<String>, value: impl Into<String>, change: impl Into<String>) -> Self {
        MarketSummary {
            name: name.into(),
            value: value.into(),
            change: change.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_stock_exchange_name() {
        assert_eq!(StockExchange::Nasdaq.to_string(), "nasdaq");
        assert_eq!(StockExchange::Nasdaq.as_ref(), "nasdaq");
        assert_eq!(StockExchange::from_str("NASDAQ").unwrap(), StockExchange::Nasdaq);
        assert_eq!(StockExchange::from_str("NasDaq").unwrap(), StockExchange::Nasdaq);
        assert!(StockExchange::from_str("nyse").is_err());
        assert_eq!(StockExchange::iter().count(), 1);
    }
}
