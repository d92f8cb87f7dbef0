use std::thread;

use chrono::{DateTime, Local};
use concat_string::concat_string;
use once_cell::sync::Lazy;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

use crate::logging::rotate::Rotate;

pub mod rotate;

static LOGGER: Lazy<Logger> = Lazy::new(|| Logger::new("default"));

/// 累積到這個大小就先寫出
const FLUSH_SIZE: usize = 4096;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "Debug",
            Level::Info => "Info",
            Level::Warn => "Warn",
            Level::Error => "Error",
        }
    }
}

pub struct Logger {
    writer: UnboundedSender<LogMessage>,
}

impl Logger {
    pub fn new(log_name: &str) -> Self {
        let (tx, mut rx) = unbounded_channel::<LogMessage>();
        let mut rotate = Rotate::new(format!("log/%Y-%m-%d-{}.log", log_name));

        //寫入檔案的操作使用另一個線程處理
        thread::spawn(move || {
            let mut together = String::with_capacity(FLUSH_SIZE);

            while let Some(received) = rx.blocking_recv() {
                together.push_str(
                    concat_string!(
                        received.created_at.format("%F %X%.6f").to_string(),
                        " ",
                        received.level.as_str(),
                        " ",
                        received.msg,
                        "\r\n"
                    )
                    .as_str(),
                );

                if rx.is_empty() || together.len() >= FLUSH_SIZE {
                    if let Err(why) = rotate.write_msg(received.created_at, together.as_bytes()) {
                        error_console(format!("Failed to write log because {:?}", why));
                        info_console(together.clone());
                    }
                    rotate.flush();
                    together.clear();
                }
            }
        });

        Logger { writer: tx }
    }

    pub fn debug(&self, log: impl Into<String>) {
        self.send(Level::Debug, log.into());
    }

    pub fn info(&self, log: impl Into<String>) {
        self.send(Level::Info, log.into());
    }

    pub fn warn(&self, log: impl Into<String>) {
        self.send(Level::Warn, log.into());
    }

    pub fn error(&self, log: impl Into<String>) {
        self.send(Level::Error, log.into());
    }

    fn send(&self, level: Level, msg: String) {
        if let Err(why) = self.writer.send(LogMessage::new(level, msg)) {
            error_console(why.to_string());
        }
    }
}

pub struct LogMessage {
    pub level: Level,
    pub msg: String,
    pub created_at: DateTime<Local>,
}

impl LogMessage {
    pub fn new(level: Level, msg: String) -> Self {
        LogMessage {
            level,
            msg,
            created_at: Local::now(),
        }
    }
}

pub fn debug_file_async(log: impl Into<String>) {
    LOGGER.debug(log);
}

pub fn info_file_async(log: impl Into<String>) {
    LOGGER.info(log);
}

pub fn warn_file_async(log: impl Into<String>) {
    LOGGER.warn(log);
}

pub fn error_file_async(log: impl Into<String>) {
    LOGGER.error(log);
}

pub fn info_console(log: String) {
    println!(
        "{} Info {}",
        Local::now().format("%Y-%m-%d %H:%M:%S.%3f"),
        log
    );
}

pub fn error_console(log: String) {
    println!(
        "{} Error {}",
        Local::now().format("%Y-%m-%d %H:%M:%S.%3f"),
        log
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_as_str() {
        assert_eq!(Level::Debug.as_str(), "Debug");
        assert_eq!(Level::Warn.as_str(), "Warn");
    }

    #[tokio::test]
    async fn test_file_async() {
        debug_file_async("開始 test_file_async");
        info_file_async(format!("info {}", 1));
        warn_file_async("warn");
        error_file_async(String::from("error"));
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    }
}
