//! simplelog setup: terminal logger, optionally mirrored into a file
use chrono::Local;
use log::LevelFilter;
use simplelog::{ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger};
use std::fs::File;
use std::io;
use std::path::PathBuf;

/// "debug", "info", "warn", "error" or "off", case insensitive
pub fn parse_level(level: &str) -> Option<LevelFilter> {
    match level.trim().to_lowercase().as_str() {
        "debug" => Some(LevelFilter::Debug),
        "info" => Some(LevelFilter::Info),
        "warn" => Some(LevelFilter::Warn),
        "error" => Some(LevelFilter::Error),
        "off" => Some(LevelFilter::Off),
        _ => None,
    }
}

/// log_YYYY-MM-DD_HH-MM-SS.txt
pub fn timestamped_log_name() -> String {
    let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
    format!("log_{}.txt", date_and_time)
}

/// Installs the global logger.
///
/// Returns `Ok(false)` when a logger was already installed; that call changes nothing.
/// Only creating the log file can fail.
pub fn init_logging(level: LevelFilter, log_file: Option<PathBuf>) -> io::Result<bool> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(path) = log_file {
        loggers.push(WriteLogger::new(level, Config::default(), File::create(path)?));
    }
    Ok(CombinedLogger::init(loggers).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Some(LevelFilter::Debug));
        assert_eq!(parse_level(" Info "), Some(LevelFilter::Info));
        assert_eq!(parse_level("WARN"), Some(LevelFilter::Warn));
        assert_eq!(parse_level("error"), Some(LevelFilter::Error));
        assert_eq!(parse_level("off"), Some(LevelFilter::Off));
        assert_eq!(parse_level("verbose"), None);
    }

    #[test]
    fn test_timestamped_name() {
        let name = timestamped_log_name();
        assert!(name.starts_with("log_"));
        assert!(name.ends_with(".txt"));
    }

    #[test]
    fn test_second_init_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calculus.log");
        let _ = init_logging(LevelFilter::Off, Some(path.clone())).unwrap();
        assert!(path.exists());
        assert!(!init_logging(LevelFilter::Off, None).unwrap());
    }
}
