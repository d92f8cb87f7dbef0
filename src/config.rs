use std::{env, path::PathBuf, str::FromStr};

use anyhow::Result;
use config::{Config as config_config, File as config_file};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

const CONFIG_PATH: &str = "app.json";

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct App {
    #[serde(default)]
    pub sqlite: SQLite,
    #[serde(default)]
    pub web: Web,
    #[serde(default)]
    pub crawler: Crawler,
}

const SQLITE_PATH: &str = "SQLITE_PATH";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SQLite {
    /// 資料庫檔案路徑
    #[serde(default = "default_sqlite_path")]
    pub path: String,
}

impl Default for SQLite {
    fn default() -> Self {
        SQLite {
            path: default_sqlite_path(),
        }
    }
}

fn default_sqlite_path() -> String {
    "data.db".to_string()
}

const WEB_HOST: &str = "WEB_HOST";
const WEB_PORT: &str = "WEB_PORT";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Web {
    #[serde(default = "default_web_host")]
    pub host: String,
    #[serde(default = "default_web_port")]
    pub port: u16,
}

impl Default for Web {
    fn default() -> Self {
        Web {
            host: default_web_host(),
            port: default_web_port(),
        }
    }
}

fn default_web_host() -> String {
    "0.0.0.0".to_string()
}

fn default_web_port() -> u16 {
    8081
}

const CRAWLER_URL: &str = "CRAWLER_URL";
const CRAWLER_CRON: &str = "CRAWLER_CRON";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Crawler {
    /// 抓取大盤摘要的網址
    #[serde(default = "default_crawler_url")]
    pub url: String,
    /// 排程的 cron 表達式（含秒）
    #[serde(default = "default_crawler_cron")]
    pub cron: String,
}

impl Default for Crawler {
    fn default() -> Self {
        Crawler {
            url: default_crawler_url(),
            cron: default_crawler_cron(),
        }
    }
}

fn default_crawler_url() -> String {
    "https://www.google.com/finance".to_string()
}

fn default_crawler_cron() -> String {
    "* * * * * *".to_string()
}

pub static SETTINGS: Lazy<App> = Lazy::new(|| App::get().expect("Config error"));

impl App {
    fn get() -> Result<Self> {
        let config_path = config_path();
        if config_path.exists() {
            let config: App = config_config::builder()
                .add_source(config_file::from(config_path))
                .build()?
                .try_deserialize()?;
            return Ok(config.override_with_env());
        }

        Ok(App::default().override_with_env())
    }

    /// 將來至於 env 的設定值覆蓋掉 json 上的設定值
    fn override_with_env(mut self) -> Self {
        if let Ok(path) = env::var(SQLITE_PATH) {
            self.sqlite.path = path;
        }

        if let Ok(host) = env::var(WEB_HOST) {
            self.web.host = host;
        }

        if let Ok(port) = env::var(WEB_PORT) {
            self.web.port = u16::from_str(&port).unwrap_or_else(|_| default_web_port());
        }

        if let Ok(url) = env::var(CRAWLER_URL) {
            self.crawler.url = url;
        }

        if let Ok(cron) = env::var(CRAWLER_CRON) {
            self.crawler.cron = cron;
        }

        self
    }

    /// 回傳 web 服務要綁定的位址
    pub fn web_addr(&self) -> String {
        format!("{}:{}", self.web.host, self.web.port)
    }
}

/// 回傳設定檔的路徑
fn config_path() -> PathBuf {
    PathBuf::from(CONFIG_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let app = App::default();
        assert_eq!(app.sqlite.path, "data.db");
        assert_eq!(app.web.port, 8081);
        assert_eq!(app.web_addr(), "0.0.0.0:8081");
        assert_eq!(app.crawler.url, "https://www.google.com/finance");
        assert_eq!(app.crawler.cron, "* * * * * *");
    }

    #[test]
    fn test_deserialize_partial_json() {
        let json = r#"{ "web": { "port": 9090 }, "crawler": { "cron": "*/5 * * * * *" } }"#;
        let app: App = serde_json::from_str(json).unwrap();
        assert_eq!(app.web.host, "0.0.0.0");
        assert_eq!(app.web.port, 9090);
        assert_eq!(app.crawler.cron, "*/5 * * * * *");
        assert_eq!(app.crawler.url, "https://www.google.com/finance");
        assert_eq!(app.sqlite.path, "data.db");
    }

    #[test]
    fn test_override_with_env() {
        let keys = [SQLITE_PATH, WEB_HOST, WEB_PORT, CRAWLER_URL, CRAWLER_CRON];
        let saved: Vec<Option<String>> = keys.iter().map(|key| env::var(key).ok()).collect();

        env::set_var(SQLITE_PATH, "/tmp/nasdaq_crawler_env.db");
        env::set_var(WEB_HOST, "127.0.0.1");
        env::set_var(WEB_PORT, "18081");
        env::set_var(CRAWLER_URL, "http://127.0.0.1:18082/finance");
        env::set_var(CRAWLER_CRON, "*/10 * * * * *");

        let app = App::default().override_with_env();
        assert_eq!(app.sqlite.path, "/tmp/nasdaq_crawler_env.db");
        assert_eq!(app.web_addr(), "127.0.0.1:18081");
        assert_eq!(app.crawler.url, "http://127.0.0.1:18082/finance");
        assert_eq!(app.crawler.cron, "*/10 * * * * *");

        // 無法解析的埠號退回預設值
        env::set_var(WEB_PORT, "not a port");
        assert_eq!(App::default().override_with_env().web.port, 8081);

        for (key, value) in keys.iter().zip(saved) {
            match value {
                Some(value) => env::set_var(key, value),
                None => env::remove_var(key),
            }
        }
    }
}
