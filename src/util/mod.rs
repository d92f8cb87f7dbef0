use std::sync::Once;

pub mod http;
pub mod text;

static RUSTLS_PROVIDER: Once = Once::new();

/// reqwest 使用 `rustls-no-provider`，第一次發出 https 請求前必須安裝 crypto provider。
pub fn ensure_rustls_crypto_provider() {
    RUSTLS_PROVIDER.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}
