//! Tracing subscriber setup.

use super::file_writer::FileWriter;
use crate::Config;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log file name inside the data directory.
pub const LOG_FILE: &str = "snippetvault.log";

/// Installs the global subscriber.
///
/// Level resolution: `RUST_LOG` first, then `config.trace_level`, then
/// `"info"`. Events go to `<data_dir>/snippetvault.log` with size-based
/// rotation, or to stderr when the directory cannot be created.
///
/// Idempotent: only the first call in a process takes effect.
///
/// # Example
///
/// ```rust
/// use snippetvault::observability::init_tracing;
/// use snippetvault::Config;
///
/// let config = Config {
///     trace_level: Some("debug".to_string()),
///     data_dir: std::env::temp_dir().join("snippetvault-doc"),
///     ..Default::default()
/// };
///
/// init_tracing(&config);
/// tracing::debug!("tracing is now active");
/// ```
pub fn init_tracing(config: &Config) {
    let level = config.trace_level.as_deref().unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    if std::fs::create_dir_all(&config.data_dir).is_ok() {
        let writer = FileWriter::new(config.data_dir.join(LOG_FILE));
        let _ = registry
            .with(fmt::layer().with_writer(writer).with_ansi(false))
            .try_init();
    } else {
        let _ = registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init();
    }
}
