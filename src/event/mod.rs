/// 大盤摘要
pub mod market_summary;
