use crate::core::{Geocoder, OracleError};
use crate::models::Coordinates;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Geocoding client backed by the OpenWeather zip endpoint
///
/// Resolves a US postal code to coordinates. Failure is surfaced as an
/// `OracleError` so the matcher can decide whether to omit the distance
/// criterion rather than score with bad coordinates.
pub struct OpenWeatherGeocoder {
    base_url: String,
    api_key: String,
    client: Client,
}

impl OpenWeatherGeocoder {
    pub fn new(base_url: String, api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            client,
        }
    }
}

#[async_trait]
impl Geocoder for OpenWeatherGeocoder {
    async fn resolve(&self, postal_code: &str) -> Result<Coordinates, OracleError> {
        let zip = format!("{},US", postal_code);
        let url = format!(
            "{}/geo/1.0/zip?zip={}&appid={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&zip),
            self.api_key
        );

        tracing::debug!("Geocoding postal code {}", postal_code);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(OracleError::Api(format!(
                "Geocoding failed for {}: {}",
                postal_code,
                response.status()
            )));
        }

        let json: Value = response.json().await?;

        let lat = json
            .get("lat")
            .and_then(|v| v.as_f64())
            .ok_or_else(|| OracleError::Contract("missing lat in geocoding response".into()))?;
        let lon = json
            .get("lon")
            .and_then(|v| v.as_f64())
            .ok_or_else(|| OracleError::Contract("missing lon in geocoding response".into()))?;

        Ok(Coordinates { lat, lon })
    }
}
