use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Seeker sex as reported on the intake form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
    Other,
}

/// Sex a shelter serves; `All` admits every seeker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SexServed {
    Male,
    Female,
    Other,
    All,
}

impl SexServed {
    /// Whether a seeker of the given sex is admitted
    pub fn admits(self, sex: Sex) -> bool {
        match self {
            SexServed::All => true,
            SexServed::Male => sex == Sex::Male,
            SexServed::Female => sex == Sex::Female,
            SexServed::Other => sex == Sex::Other,
        }
    }
}

/// How quickly the seeker needs help
///
/// Variant order matches the rows of `core::scoring::URGENCY_SCORES`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyNeed {
    #[serde(alias = "Today")]
    Today,
    #[serde(alias = "In the next few days")]
    FewDays,
    #[serde(alias = "In a week or more")]
    WeekOrMore,
}

/// Urgency tier a shelter serves
///
/// Variant order matches the columns of `core::scoring::URGENCY_SCORES`.
/// The catalog spells the first tier "Immidiate"; both spellings parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UrgencyTier {
    #[serde(alias = "Immidiate")]
    Immediate,
    High,
    Moderate,
}

/// How long the seeker needs a place to stay
///
/// Variant order matches the rows of `core::scoring::DURATION_SCORES`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationNeed {
    #[serde(alias = "Overnight")]
    Overnight,
    #[serde(alias = "A month or less")]
    UpToMonth,
    #[serde(alias = "A couple of months")]
    CoupleMonths,
    #[serde(alias = "A year or more")]
    YearOrMore,
}

/// Stay-duration tier a shelter serves
///
/// Variant order matches the columns of `core::scoring::DURATION_SCORES`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DurationTier {
    Overnight,
    Temporary,
    Transitional,
    #[serde(rename = "Long-Term")]
    LongTerm,
}

/// One day's operating window; `end < start` spans midnight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// Weekly operating schedule, Monday-first; `None` means closed that day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeekSchedule {
    pub windows: [Option<DayWindow>; 7],
}

impl WeekSchedule {
    pub fn window_for(&self, weekday: Weekday) -> Option<DayWindow> {
        self.windows[weekday.num_days_from_monday() as usize]
    }
}

/// Seeker intake profile, created once per session from the form
#[derive(Debug, Clone, PartialEq)]
pub struct SeekerProfile {
    pub city: String,
    /// `None` when the seeker does not know their zip code
    pub postal_code: Option<String>,
    pub sex: Sex,
    pub lgbtq: bool,
    pub domestic_violence: bool,
    pub urgency: UrgencyNeed,
    pub duration: DurationNeed,
    /// Free-text needs; blank text means the criterion is absent
    pub needs: String,
}

impl SeekerProfile {
    /// Needs text, `None` when blank
    pub fn needs(&self) -> Option<&str> {
        let trimmed = self.needs.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }
}

/// Shelter catalog record, read-only during scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelterRecord {
    #[serde(rename = "organizationName")]
    pub organization_name: String,
    #[serde(rename = "programName")]
    pub program_name: String,
    #[serde(rename = "shelterType")]
    pub shelter_type: String,
    pub city: String,
    #[serde(rename = "postalCode")]
    pub postal_code: String,
    pub address: String,
    #[serde(rename = "sexServed")]
    pub sex_served: SexServed,
    #[serde(rename = "lgbtqSpecific")]
    pub lgbtq_specific: bool,
    #[serde(rename = "dvSpecific")]
    pub dv_specific: bool,
    pub urgency: UrgencyTier,
    pub duration: DurationTier,
    #[serde(default)]
    pub schedule: WeekSchedule,
    pub services: String,
    #[serde(rename = "openHours", default)]
    pub open_hours: String,
    #[serde(default)]
    pub summary: String,
    #[serde(rename = "applicationDetails", default)]
    pub application_details: String,
    #[serde(rename = "programAbout", default)]
    pub program_about: String,
    #[serde(rename = "organizationAbout", default)]
    pub organization_about: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub webpage: String,
}

/// Resolved geographic coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// One axis of fit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Distance,
    Urgency,
    Duration,
    Services,
    Availability,
}

/// A shelter with its per-criterion scores and aggregate total
///
/// Scores are normalized to [0,1] with 0 the best fit; `scores` holds only
/// the criteria actually computed for this query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredShelter {
    pub record: ShelterRecord,
    pub scores: BTreeMap<Criterion, f64>,
    pub total: f64,
}
