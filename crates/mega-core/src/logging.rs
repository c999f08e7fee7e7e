//! tracing-subscriber bootstrap for binaries and test harnesses embedding the core

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogConfig, LogFormat};
use crate::error::{MegaError, MegaResult};

/// Install the global subscriber described by `config`.
///
/// `RUST_LOG` takes precedence over the configured level. Fails if a global
/// subscriber is already installed.
pub fn init(config: &LogConfig) -> MegaResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| MegaError::Config(format!("invalid log level '{}': {e}", config.level)))?;

    let result = match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init(),
    };

    result.map_err(|e| MegaError::Other(anyhow::anyhow!("installing log subscriber: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        let config = LogConfig::default();
        // Another test in this binary may have won the race; either way the
        // second call must report an error rather than panic.
        let _ = init(&config);
        assert!(init(&config).is_err());
    }
}
