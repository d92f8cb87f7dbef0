use anyhow::Result;
use async_trait::async_trait;
use scraper::Html;

use crate::{
    crawler::{Extractor, PageSource},
    declare::MarketSummary,
    util::{self, http::element},
};

/// 市場摘要表格
const TABLE_SELECTOR: &str = "table#sfe-mktsumm";
/// 那斯達克位於表格的第三列
const NASDAQ_ROW_INDEX: usize = 2;

/// 以 HTTP GET 取得 Google 財經首頁
pub struct GoogleFinance {
    url: String,
}

impl GoogleFinance {
    pub fn new(url: impl Into<String>) -> Self {
        GoogleFinance { url: url.into() }
    }
}

#[async_trait]
impl PageSource for GoogleFinance {
    fn url(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> Result<String> {
        util::http::get(&self.url, None).await
    }
}

/// 依固定位置取出市場摘要表格中的一列。
///
/// 第 1 欄的 `div` 是名稱，第 2、3 欄的 `span` 分別是指數與漲跌幅。
/// 完全依賴版面位置，版面改變時只會得到空白或錯誤的欄位。
#[derive(Debug, Clone)]
pub struct MarketSummaryExtractor {
    table_selector: String,
    row_index: usize,
}

impl MarketSummaryExtractor {
    pub fn new(table_selector: impl Into<String>, row_index: usize) -> Self {
        MarketSummaryExtractor {
            table_selector: table_selector.into(),
            row_index,
        }
    }
}

impl Default for MarketSummaryExtractor {
    fn default() -> Self {
        Self::new(TABLE_SELECTOR, NASDAQ_ROW_INDEX)
    }
}

impl Extractor for MarketSummaryExtractor {
    fn extract(&self, document: &Html) -> MarketSummary {
        let row = element::nth_element(document.root_element(), &self.table_selector, 0)
            .and_then(|table| element::nth_element(table, "tr", self.row_index));

        let Some(row) = row else {
            return MarketSummary::default();
        };

        let cell = |index: usize, css_selector: &str| -> String {
            element::nth_element(row, "td", index)
                .map(|td| element::collect_text(&td, css_selector))
                .unwrap_or_default()
        };

        MarketSummary {
            name: cell(1, "div").to_lowercase(),
            value: cell(2, "span"),
            change: cell(3, "span"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::tests::MARKET_SUMMARY_HTML;

    #[test]
    fn test_extract() {
        let document = Html::parse_document(MARKET_SUMMARY_HTML);
        let summary = MarketSummaryExtractor::default().extract(&document);

        assert_eq!(summary.name, "nasdaq");
        assert_eq!(summary.value, "5,865.95");
        assert_eq!(summary.change, "+0.35%");
    }

    #[test]
    fn test_extract_other_row() {
        let document = Html::parse_document(MARKET_SUMMARY_HTML);
        let summary = MarketSummaryExtractor::new(TABLE_SELECTOR, 0).extract(&document);

        assert_eq!(summary, MarketSummary::new("dow jones", "21,006.94", "+0.56%"));
    }

    #[test]
    fn test_extract_missing_cells() {
        let html = r#"
<table id="sfe-mktsumm">
  <tr><td></td></tr>
  <tr><td></td></tr>
  <tr><td></td><td><div>Nasdaq</div></td></tr>
</table>"#;
        let document = Html::parse_document(html);
        let summary = MarketSummaryExtractor::default().extract(&document);

        assert_eq!(summary, MarketSummary::new("nasdaq", "", ""));
    }

    #[test]
    fn test_extract_missing_table() {
        let document = Html::parse_document(r#"<table id="other"><tr><td>1</td></tr></table>"#);
        let summary = MarketSummaryExtractor::default().extract(&document);

        assert_eq!(summary, MarketSummary::default());
    }

    #[test]
    fn test_google_finance_url() {
        let source = GoogleFinance::new("https://www.google.com/finance");
        assert_eq!(source.url(), "https://www.google.com/finance");
    }
}
