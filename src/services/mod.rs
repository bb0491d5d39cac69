// Service exports
pub mod catalog;
pub mod geocoding;
pub mod notify;
pub mod semantic;
pub mod session;

pub use catalog::{load_catalog, parse_catalog, CatalogError};
pub use geocoding::OpenWeatherGeocoder;
pub use notify::{format_phone, format_shortlist_message, NotifyError, SmsSender};
pub use semantic::ChatCompletionOracle;
pub use session::{MatchSession, SessionStore};
