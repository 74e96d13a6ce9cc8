use thiserror::Error;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber. `RUST_LOG` wins over `level` when set.
pub fn init(level: &str) -> Result<(), TracingInitError> {
    let filter = build_filter(std::env::var("RUST_LOG").ok().as_deref(), level)?;

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_target(false));

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

fn build_filter(from_env: Option<&str>, level: &str) -> Result<EnvFilter, TracingInitError> {
    let directives = from_env
        .filter(|directives| !directives.trim().is_empty())
        .unwrap_or(level);

    EnvFilter::try_new(directives).map_err(|source| TracingInitError::InvalidFilter { source })
}

#[derive(Debug, Error)]
pub enum TracingInitError {
    #[error("Invalid filter config: {source}")]
    InvalidFilter {
        #[from]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("Failed to set global default subscriber")]
    SetGlobalDefault {
        #[from]
        source: tracing::subscriber::SetGlobalDefaultError,
    },
}
