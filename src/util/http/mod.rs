use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use once_cell::sync::{Lazy, OnceCell};
use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode};
use tokio::sync::Semaphore;

use crate::{logging::Logger, util};

pub mod element;
pub mod user_agent;

/// A semaphore for limiting concurrent requests.
///
/// 限制最多 5 個並發請求，避免被目標網站封禁。
static SEMAPHORE: Lazy<Semaphore> = Lazy::new(|| Semaphore::new(5));

/// A singleton instance of the reqwest client.
static CLIENT: OnceCell<Client> = OnceCell::new();

static LOGGER: Lazy<Logger> = Lazy::new(|| Logger::new("http"));

/// HTTP 請求失敗時的最大重試次數。
const MAX_RETRIES: usize = 2;

/// Returns the reqwest client singleton instance or creates one if it doesn't exist.
fn get_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        util::ensure_rustls_crypto_provider();

        Client::builder()
            // ===== 壓縮 =====
            .brotli(true)
            .gzip(true)
            .zstd(true)
            // ===== 超時設置 =====
            .connect_timeout(Duration::from_secs(8))
            .timeout(Duration::from_secs(15))
            // ===== TCP 優化 =====
            .tcp_nodelay(true)
            .tcp_keepalive(Duration::from_secs(60))
            // ===== 連接池 =====
            .pool_max_idle_per_host(20)
            .pool_idle_timeout(Duration::from_secs(90))
            // ===== Cookie 和重定向 =====
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::limited(5))
            // ===== Headers =====
            .referer(true)
            .user_agent(user_agent::gen_random_ua())
            .build()
            .map_err(|e| anyhow!("Failed to create reqwest client: {:?}", e))
    })
}

pub async fn get_response(url: &str, headers: Option<header::HeaderMap>) -> Result<Response> {
    send(Method::GET, url, headers).await
}

/// Performs an HTTP GET request and returns the response as text.
///
/// Any status other than `200 OK` is treated as an error, the body is not read.
///
/// # Arguments
///
/// * `url`: The URL to send the GET request to.
/// * `headers`: An optional set of headers to include with the request.
pub async fn get(url: &str, headers: Option<header::HeaderMap>) -> Result<String> {
    let response = get_response(url, headers).await?;
    ensure_ok(url, response.status())?;

    response
        .text()
        .await
        .map_err(|e| anyhow!("Error parsing response text: {:?}", e))
}

fn ensure_ok(url: &str, status: StatusCode) -> Result<()> {
    if status != StatusCode::OK {
        return Err(anyhow!("Unexpected status {} from {}", status, url));
    }

    Ok(())
}

/// Sends an HTTP request with retries on transport failure.
///
/// A request that reaches the server is returned as is, whatever its status;
/// only connection level errors are retried, with an exponential delay
/// between attempts.
///
/// # Errors
///
/// Returns an `Err` carrying the last underlying error when all `MAX_RETRIES`
/// attempts fail.
async fn send(method: Method, url: &str, headers: Option<header::HeaderMap>) -> Result<Response> {
    let visit_log = format!("{method}:{url}");
    let client = get_client()?;
    let mut rb: RequestBuilder = client.request(method, url);
    let mut last_error = String::new();

    if let Some(h) = headers {
        rb = rb.headers(h);
    }

    for attempt in 1..=MAX_RETRIES {
        let msg = format!("Attempt {} to send {}", attempt, visit_log);
        let rb_clone = rb
            .try_clone()
            .ok_or_else(|| anyhow!("Failed to clone RequestBuilder"))?;
        let permit = SEMAPHORE.acquire().await;
        let start = Instant::now();
        let res = rb_clone.send().await;
        let elapsed = start.elapsed().as_millis();
        drop(permit);

        match res {
            Ok(response) => {
                LOGGER.info(format!("{} {} {} ms", msg, response.status(), elapsed));
                return Ok(response);
            }
            Err(why) => {
                last_error = format!("{:?}", why);
                LOGGER.error(format!("{} failed because {:?}. {} ms", msg, why, elapsed));
                if attempt < MAX_RETRIES {
                    tokio::time::sleep(Duration::from_secs(2u64.pow(attempt as u32))).await;
                }
            }
        }
    }

    Err(anyhow!(
        "Failed to send request to {} after {} attempts; last error: {}",
        url,
        MAX_RETRIES,
        last_error
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_ok() {
        assert!(ensure_ok("http://localhost", StatusCode::OK).is_ok());
        assert!(ensure_ok("http://localhost", StatusCode::NOT_FOUND).is_err());
        assert!(ensure_ok("http://localhost", StatusCode::NO_CONTENT).is_err());
    }

    #[tokio::test]
    async fn test_get_unreachable() {
        // 保留給本機測試的埠號，連線必定被拒
        let result = get("http://127.0.0.1:9/finance", None).await;
        assert!(result.is_err());
    }
}
