use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the external geocoding and semantic oracles
///
/// A contract violation is distinct from a transport failure: the oracle
/// answered, but with a payload the caller must not coerce into a score.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Oracle returned error: {0}")]
    Api(String),

    #[error("Oracle call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Oracle contract violation: {0}")]
    Contract(String),
}
