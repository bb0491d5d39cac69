use crate::core::error::OracleError;
use async_trait::async_trait;

/// Worst (and highest) rating the comparison oracle may return
pub const MAX_RATING: u8 = 10;

/// External natural-language comparison oracle
///
/// Rates how well a provider's service description covers the seeker's
/// free-text needs: an integer from 0 (best fit) to 10 (worst fit).
/// Injected as a capability so the engine is testable with a deterministic
/// stub instead of a live completion call. Stateless, one request per call.
#[async_trait]
pub trait SemanticOracle: Send + Sync {
    async fn compare(&self, needs: &str, services: &str) -> Result<u8, OracleError>;
}

/// Normalize an oracle rating into the [0,1] scoring convention
///
/// A rating outside 0..=10 is a contract violation, never coerced.
pub fn normalize_rating(rating: u8) -> Result<f64, OracleError> {
    if rating > MAX_RATING {
        return Err(OracleError::Contract(format!(
            "rating {} outside 0-{}",
            rating, MAX_RATING
        )));
    }

    Ok(f64::from(rating) / f64::from(MAX_RATING))
}
