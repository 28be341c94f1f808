/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

static INIT: Once = Once::new();

/// Installs a global `tracing` subscriber.
///
/// The level is read from the `LOGLEVEL` environment variable (`TRACE`,
/// `DEBUG`, `INFO`, `WARN`, `ERROR`) and defaults to `INFO`. Only the first
/// call has an effect.
pub fn setup_logger() {
    let level = env::var("LOGLEVEL")
        .ok()
        .and_then(|value| parse_level(&value))
        .unwrap_or(Level::INFO);
    setup_logger_with_level(level);
}

/// Installs a global `tracing` subscriber at the given level.
pub fn setup_logger_with_level(level: Level) {
    INIT.call_once(|| {
        let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
        if tracing::subscriber::set_global_default(subscriber).is_ok() {
            tracing::debug!("Log level set to {}", level);
        }
    });
}

fn parse_level(value: &str) -> Option<Level> {
    match value.trim().to_uppercase().as_str() {
        "TRACE" => Some(Level::TRACE),
        "DEBUG" => Some(Level::DEBUG),
        "INFO" => Some(Level::INFO),
        "WARN" => Some(Level::WARN),
        "ERROR" => Some(Level::ERROR),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Some(Level::DEBUG));
        assert_eq!(parse_level(" WARN "), Some(Level::WARN));
        assert_eq!(parse_level("verbose"), None);
    }

    #[test]
    fn test_setup_logger_is_idempotent() {
        setup_logger();
        setup_logger_with_level(Level::TRACE);
    }
}
