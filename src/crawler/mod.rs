use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use scraper::Html;

use crate::declare::MarketSummary;

/// Google 財經
pub mod google;

/// 提供要解析的 HTML 文件
#[async_trait]
pub trait PageSource: Send + Sync {
    /// 來源網址，僅用於 log
    fn url(&self) -> &str;

    /// 取回整頁 HTML，連線失敗或狀態碼不是 200 時回傳錯誤
    async fn fetch(&self) -> Result<String>;
}

/// 從 HTML 文件取出大盤摘要
///
/// 取不到的欄位以空字串表示，不回傳錯誤。
pub trait Extractor: Send + Sync {
    fn extract(&self, document: &Html) -> MarketSummary;
}

/// 將抓取與解析組合在一起，兩者都可以替換
#[derive(Clone)]
pub struct Scraper {
    source: Arc<dyn PageSource>,
    extractor: Arc<dyn Extractor>,
}

impl Scraper {
    pub fn new(source: Arc<dyn PageSource>, extractor: Arc<dyn Extractor>) -> Self {
        Scraper { source, extractor }
    }

    pub fn url(&self) -> &str {
        self.source.url()
    }

    /// 抓取一次頁面並取出大盤摘要
    ///
    /// # Errors
    /// 只有在取回頁面失敗時回傳錯誤；頁面結構不符只會得到空白欄位。
    pub async fn scrape_once(&self) -> Result<MarketSummary> {
        let text = self.source.fetch().await?;
        let document = Html::parse_document(&text);

        Ok(self.extractor.extract(&document))
    }
}
