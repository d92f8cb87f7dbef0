//! # Google 財經採集模組
//!
//! 從 Google 財經首頁的「市場摘要」表格取得大盤指數。
//!
//! - 來源網址：由設定檔 `crawler.url` 決定，預設 `https://www.google.com/finance`
//! - 抓取技術：HTTP GET 搭配 CSS Selector，依表格中的固定位置取值。

/// 市場摘要表格
pub mod finance;
