use std::env;
use std::str::FromStr;
use std::sync::Mutex;

use slog::Drain;
use slog::{Fuse, LevelFilter};
use slog_async::Async;
use slog_json::Json;

pub use slog::{debug, error, info, o, trace, warn, Discard, Level, Logger};

/// The environment variable holding the minimum level to log.
pub const LEVEL_VARIABLE: &str = "LISTINGS_LOG_LEVEL";

pub fn initialize_logger() -> slog::Logger {
    let drain = Mutex::new(Json::default(std::io::stderr())).map(Fuse);
    let drain = Async::new(drain).build().fuse();
    let drain = LevelFilter::new(drain, configured_level()).fuse();

    Logger::root(
        drain,
        o!("version" => info::VERSION, "revision" => info::REVISION, "build_timestamp" => info::BUILD_TIMESTAMP),
    )
}

/// Returns a logger that drops everything, for tests and helpers.
pub fn discard() -> slog::Logger {
    Logger::root(Discard, o!())
}

fn configured_level() -> Level {
    env::var(LEVEL_VARIABLE)
        .ok()
        .and_then(|level| Level::from_str(&level).ok())
        .unwrap_or(Level::Info)
}
