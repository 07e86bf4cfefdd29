pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod ids;
pub mod storage;

pub use config::Config;
pub use db::Store;
pub use error::{StoreError, StoreResult};

use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber using the configured log level,
/// with `RUST_LOG` taking precedence.
pub fn init_tracing(config: &Config) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
