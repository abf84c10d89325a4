//! Common error types

use thiserror::Error;

/// Failures of the shared setup code; discovery failures stay
/// `topology::DiscoveryError`
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
