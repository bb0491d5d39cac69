use crate::models::{DurationNeed, SeekerProfile, Sex, UrgencyNeed};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to find shelters for a seeker
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FindSheltersRequest {
    #[validate(length(min = 1))]
    pub city: String,
    /// Omitted, blank, or "Unsure" when the seeker does not know it
    #[serde(alias = "postal_code", rename = "postalCode", default)]
    pub postal_code: Option<String>,
    pub sex: Sex,
    #[serde(default)]
    pub lgbtq: bool,
    #[serde(alias = "domestic_violence", rename = "domesticViolence", default)]
    pub domestic_violence: bool,
    pub urgency: UrgencyNeed,
    pub duration: DurationNeed,
    #[serde(default)]
    pub needs: String,
    /// E.164 US number ("+1" plus ten digits) for the one-time text
    #[serde(alias = "phone_number", rename = "phoneNumber", default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub consent: bool,
}

impl FindSheltersRequest {
    /// Build the immutable seeker profile this session scores against
    pub fn to_profile(&self) -> SeekerProfile {
        let postal_code = self
            .postal_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty() && !code.eq_ignore_ascii_case("unsure"))
            .map(str::to_string);

        SeekerProfile {
            city: self.city.trim().to_string(),
            postal_code,
            sex: self.sex,
            lgbtq: self.lgbtq,
            domestic_violence: self.domestic_violence,
            urgency: self.urgency,
            duration: self.duration,
            needs: self.needs.clone(),
        }
    }

    /// Destination number for the one-time SMS, when consented and plausible
    pub fn sms_destination(&self) -> Option<&str> {
        if !self.consent {
            return None;
        }

        self.phone_number
            .as_deref()
            .filter(|number| number.len() == 12 && number.starts_with("+1"))
    }
}
