// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Coordinates, Criterion, DayWindow, DurationNeed, DurationTier, ScoredShelter, SeekerProfile,
    Sex, SexServed, ShelterRecord, UrgencyNeed, UrgencyTier, WeekSchedule,
};
pub use requests::FindSheltersRequest;
pub use responses::{ErrorResponse, FindSheltersResponse, HealthResponse, SessionShelterResponse};
