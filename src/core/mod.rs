// Core algorithm exports
pub mod distance;
pub mod error;
pub mod filters;
pub mod matcher;
pub mod scoring;
pub mod semantic;

pub use distance::{haversine_distance, normalize_distances, Geocoder};
pub use error::OracleError;
pub use filters::{filter_catalog, matches_eligibility};
pub use matcher::{MatchResult, Matcher, MatcherConfig};
pub use scoring::{
    aggregate_scores, availability_score, availability_weight, duration_score, urgency_score,
};
pub use semantic::{normalize_rating, SemanticOracle};
