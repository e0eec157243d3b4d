//! Logger bootstrap for the desktop binary. The library only uses the `log`
//! facade.

use flexi_logger::{Logger, LoggerHandle};

/// Start logging to stderr. `RUST_LOG` wins over `fallback_level`.
///
/// The returned handle must be kept alive for the logger to keep running.
pub fn init(fallback_level: &str) -> Result<LoggerHandle, String> {
    let logger = Logger::try_with_env_or_str(fallback_level)
        .or_else(|_| Logger::try_with_str("info"))
        .map_err(|e| format!("invalid log level `{fallback_level}`: {e}"))?;
    logger
        .log_to_stderr()
        .format(flexi_logger::colored_default_format)
        .start()
        .map_err(|e| format!("failed to start logger: {e}"))
}
