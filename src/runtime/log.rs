// This software is released under the MIT license.
// See file LICENSE for full license details.
use log::LevelFilter;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogLevel(pub LevelFilter);
impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level = match s.to_lowercase().as_str() {
            "trace" => LevelFilter::Trace,
            "debug" => LevelFilter::Debug,
            "info" => LevelFilter::Info,
            "warn" | "warning" => LevelFilter::Warn,
            "error" => LevelFilter::Error,
            "off" | "none" => LevelFilter::Off,
            _ => return Err(format!("Invalid log level: {}", s)),
        };
        Ok(LogLevel(level))
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        level.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogMode {
    Terminal,
    Discard,
}
impl std::str::FromStr for LogMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mode = match s.to_lowercase().as_str() {
            "terminal" | "term" | "cli" => LogMode::Terminal,
            "discard" | "none" => LogMode::Discard,
            _ => return Err(format!("Invalid log mode: {}", s)),
        };
        Ok(mode)
    }
}

///////////////////////////////
/// Install env_logger as the global logger. RUST_LOG, if set, takes precedence over the level given here
pub fn setup_global_logger(log_level: LogLevel, log_mode: LogMode) {
    let level = match log_mode {
        LogMode::Discard => LevelFilter::Off,
        LogMode::Terminal => log_level.into(),
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    if log_mode == LogMode::Terminal {
        builder.parse_env("RUST_LOG");
    }

    // A second initialization (e.g. from tests) is harmless
    let _ = builder.try_init();
}
