// This software is released under the MIT license.
// See file LICENSE for full license details.
use clap::Args;

use crate::runtime::{LogLevel, LogMode};

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_MODE: &str = "terminal";

///////////////////////////////
/// Process-level options shared by every run
#[derive(Args, Clone, Debug)]
pub struct Config {
    /// Log level: trace, debug, info, warn, error or off
    #[arg(long = "log-level", value_parser = clap::value_parser!(LogLevel), default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: LogLevel,

    /// Where log output goes: terminal or discard
    #[arg(long = "log-mode", value_parser = clap::value_parser!(LogMode), default_value = DEFAULT_LOG_MODE)]
    pub log_mode: LogMode,
}

impl Config {
    pub fn init_logging(&self) {
        crate::runtime::setup_global_logger(self.log_level, self.log_mode);
    }
}
