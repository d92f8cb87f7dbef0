/// 大盤觀測值
pub mod stock;
/// 交易所主檔
pub mod stock_exchange_master;
