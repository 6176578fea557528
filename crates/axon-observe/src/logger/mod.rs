mod config;
mod error;
mod log;
mod object;

pub use config::LoggerConfig;
pub use error::LoggerError;
pub use object::LoggerFormat;
pub use object::LoggerLevel;

/// Initializes the global tracing subscriber with the given configuration.
///
/// Configures and installs a tracing subscriber based on the provided
/// [`LoggerConfig`]. Once initialized, all `tracing` macros (`info!`,
/// `debug!`, etc.) — including the allocation decision lines mirrored by
/// the build log stream — use this configuration.
///
/// # Examples
/// ```rust
/// use axon_observe::{LoggerConfig, init_logger};
///
/// fn main() {
///     let config = LoggerConfig::default();
///     init_logger(&config).expect("Failed to initialize logger");
///
///     tracing::info!("logger initialized");
/// }
/// ```
pub fn init_logger(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    match cfg.format {
        LoggerFormat::Text => log::logger_text(cfg),
        LoggerFormat::Json => log::logger_json(cfg),
        LoggerFormat::Journald => log::logger_journald(cfg),
    }
}
