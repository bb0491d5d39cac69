use crate::models::{
    DayWindow, DurationTier, SexServed, ShelterRecord, UrgencyTier, WeekSchedule,
};
use chrono::NaiveTime;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading the shelter catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid record for {organization}: {reason}")]
    InvalidRecord {
        organization: String,
        reason: String,
    },
}

const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Raw catalog row with the source's column headers
///
/// Schedule columns hold comma-separated 7-entry lists indexed
/// Monday-first, gated by the day names appearing in `Days`.
#[derive(Debug, Deserialize)]
struct CatalogRow {
    #[serde(rename = "Organization Name")]
    organization_name: String,
    #[serde(rename = "Program Name")]
    program_name: String,
    #[serde(rename = "Type")]
    shelter_type: String,
    #[serde(rename = "City")]
    city: String,
    #[serde(rename = "Zip Code")]
    postal_code: String,
    #[serde(rename = "Address")]
    address: String,
    #[serde(rename = "Sex")]
    sex_served: SexServed,
    #[serde(rename = "LGBTQ")]
    lgbtq: String,
    #[serde(rename = "Domestic Violence")]
    domestic_violence: String,
    #[serde(rename = "Urgency")]
    urgency: UrgencyTier,
    #[serde(rename = "Duration")]
    duration: DurationTier,
    #[serde(rename = "Days", default)]
    days: String,
    #[serde(rename = "Hour Start", default)]
    hour_start: String,
    #[serde(rename = "Minute Start", default)]
    minute_start: String,
    #[serde(rename = "Hour End", default)]
    hour_end: String,
    #[serde(rename = "Minute End", default)]
    minute_end: String,
    #[serde(rename = "Open Hours", default)]
    open_hours: String,
    #[serde(rename = "Summary", default)]
    summary: String,
    #[serde(rename = "Application Details", default)]
    application_details: String,
    #[serde(rename = "Services", default)]
    services: String,
    #[serde(rename = "Program About", default)]
    program_about: String,
    #[serde(rename = "Organization About", default)]
    organization_about: String,
    #[serde(rename = "Phone", default)]
    phone: String,
    #[serde(rename = "Webpage", default)]
    webpage: String,
}

impl CatalogRow {
    fn into_record(self) -> Result<ShelterRecord, CatalogError> {
        let schedule = parse_schedule(
            &self.days,
            &self.hour_start,
            &self.minute_start,
            &self.hour_end,
            &self.minute_end,
        )
        .map_err(|reason| CatalogError::InvalidRecord {
            organization: self.organization_name.clone(),
            reason,
        })?;

        Ok(ShelterRecord {
            organization_name: self.organization_name,
            program_name: self.program_name,
            shelter_type: self.shelter_type,
            city: self.city,
            postal_code: self.postal_code,
            address: self.address,
            sex_served: self.sex_served,
            lgbtq_specific: parse_yes_no(&self.lgbtq),
            dv_specific: parse_yes_no(&self.domestic_violence),
            urgency: self.urgency,
            duration: self.duration,
            schedule,
            services: self.services,
            open_hours: self.open_hours,
            summary: self.summary,
            application_details: self.application_details,
            program_about: self.program_about,
            organization_about: self.organization_about,
            phone: self.phone,
            webpage: self.webpage,
        })
    }
}

fn parse_yes_no(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("yes")
}

fn parse_clock_list(value: &str) -> Result<Vec<u32>, String> {
    value
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<u32>()
                .map_err(|_| format!("invalid clock value {:?}", part.trim()))
        })
        .collect()
}

/// Build the weekly schedule from the catalog's split columns
///
/// A weekday is open only when its name appears in `days`; the four clock
/// lists are then indexed Monday-first to build that day's window.
fn parse_schedule(
    days: &str,
    hour_start: &str,
    minute_start: &str,
    hour_end: &str,
    minute_end: &str,
) -> Result<WeekSchedule, String> {
    let mut windows: [Option<DayWindow>; 7] = Default::default();

    if days.trim().is_empty() {
        return Ok(WeekSchedule { windows });
    }

    let hours_start = parse_clock_list(hour_start)?;
    let minutes_start = parse_clock_list(minute_start)?;
    let hours_end = parse_clock_list(hour_end)?;
    let minutes_end = parse_clock_list(minute_end)?;

    for (index, name) in WEEKDAY_NAMES.iter().enumerate() {
        if !days.contains(name) {
            continue;
        }

        let entry = |list: &[u32]| {
            list.get(index)
                .copied()
                .ok_or_else(|| format!("missing schedule entry for {}", name))
        };

        let start = NaiveTime::from_hms_opt(entry(&hours_start)?, entry(&minutes_start)?, 0)
            .ok_or_else(|| format!("invalid start time for {}", name))?;
        let end = NaiveTime::from_hms_opt(entry(&hours_end)?, entry(&minutes_end)?, 0)
            .ok_or_else(|| format!("invalid end time for {}", name))?;

        windows[index] = Some(DayWindow { start, end });
    }

    Ok(WeekSchedule { windows })
}

/// Parse catalog rows from any CSV source
pub fn parse_catalog<R: Read>(reader: R) -> Result<Vec<ShelterRecord>, CatalogError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut records = Vec::new();

    for row in csv_reader.deserialize::<CatalogRow>() {
        records.push(row?.into_record()?);
    }

    Ok(records)
}

/// Load the shelter catalog from a CSV file
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Vec<ShelterRecord>, CatalogError> {
    let file = std::fs::File::open(path.as_ref()).map_err(csv::Error::from)?;
    let records = parse_catalog(file)?;

    tracing::info!(
        "Loaded {} shelter records from {}",
        records.len(),
        path.as_ref().display()
    );

    Ok(records)
}
