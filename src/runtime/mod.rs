mod error;
mod config;
mod log;

pub use self::error::Error;
pub use self::config::*;
pub use self::log::*;
