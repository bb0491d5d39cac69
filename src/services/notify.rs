use crate::models::ScoredShelter;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when sending the one-time SMS
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("SMS API returned error: {0}")]
    Api(String),
}

/// Twilio-style SMS client
///
/// Best-effort: the caller fires the send after ranking and logs failures
/// without letting them affect the match result.
pub struct SmsSender {
    base_url: String,
    account_sid: String,
    auth_token: String,
    from_number: String,
    client: Client,
}

impl SmsSender {
    pub fn new(
        base_url: String,
        account_sid: String,
        auth_token: String,
        from_number: String,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            account_sid,
            auth_token,
            from_number,
            client,
        }
    }

    /// Send one message to one destination number
    pub async fn send(&self, to: &str, body: &str) -> Result<(), NotifyError> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url.trim_end_matches('/'),
            self.account_sid
        );

        let params = [("To", to), ("From", self.from_number.as_str()), ("Body", body)];

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NotifyError::Api(format!(
                "Failed to send SMS: {}",
                response.status()
            )));
        }

        tracing::debug!("Sent shortlist SMS to {}", to);

        Ok(())
    }
}

/// Format a catalog phone number for display
///
/// Catalog numbers are eleven digits with a leading country code
/// ("14155550123", sometimes prefixed "+"); anything else passes through
/// untouched.
pub fn format_phone(phone: &str) -> String {
    let digits = phone.trim().trim_start_matches('+');

    if digits.len() == 11 && digits.starts_with('1') && digits.chars().all(|c| c.is_ascii_digit())
    {
        format!("({}) {}-{}", &digits[1..4], &digits[4..7], &digits[7..])
    } else {
        phone.to_string()
    }
}

/// Build the one-time SMS body for a ranked shortlist
pub fn format_shortlist_message(shelters: &[ScoredShelter]) -> String {
    let mut body =
        String::from("Here's some key shelter information from using ShelterSearch today:\n\n");

    for scored in shelters {
        let record = &scored.record;
        body.push_str(&format!(
            "{}: {}\n",
            record.organization_name, record.program_name
        ));
        body.push_str(&format!("Open Hours: {}\n", record.open_hours));
        body.push_str(&format!("Address: {}\n", record.address));
        body.push_str(&format!("Phone Number: {}\n\n", format_phone(&record.phone)));
    }

    body
}
