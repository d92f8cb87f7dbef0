use std::future::Future;

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tokio::net::TcpListener;

use crate::{
    database::SQLite,
    logging,
    web::stock_service::{Envelope, StockService, INTERNAL_ERROR},
};

pub mod stock_service;

pub fn router(db: SQLite) -> Router {
    Router::new()
        .route(
            "/getAllStocksByName/{exchange_name}/{limit}",
            get(get_all_stocks_by_name),
        )
        .with_state(StockService::new(db))
}

/// 邏輯上的失敗一律回 200，錯誤訊息放在 `Message`
async fn get_all_stocks_by_name(
    State(service): State<StockService>,
    Path((exchange_name, limit)): Path<(String, String)>,
) -> (StatusCode, Json<Envelope>) {
    let limit = limit.trim().parse::<i64>().ok();

    match service.get_latest(&exchange_name, limit).await {
        Ok(latest) => (StatusCode::OK, Json(Envelope::from(latest))),
        Err(why) => {
            logging::error_file_async(format!(
                "Failed to get_all_stocks_by_name({}, {:?}) because {:?}",
                exchange_name, limit, why
            ));
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(Envelope::message(INTERNAL_ERROR)),
            )
        }
    }
}

/// 啟動 web 服務，直到 `shutdown` 完成為止
pub async fn start(
    addr: &str,
    db: SQLite,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;
    logging::info_file_async(format!(
        "app listening at http://{}:{}",
        local_addr.ip(),
        local_addr.port()
    ));
    logging::info_console(format!("app listening at http://{}", local_addr));

    axum::serve(listener, router(db))
        .with_graceful_shutdown(shutdown)
        .await?;

    logging::info_file_async(format!("web 服務 {} 已停止", local_addr));

    Ok(())
}
