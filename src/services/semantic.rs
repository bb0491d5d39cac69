use crate::core::semantic::MAX_RATING;
use crate::core::{OracleError, SemanticOracle};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

/// Instruction pinning the oracle to a bare-integer reply
const SYSTEM_PROMPT: &str = "Given two variables 'user needs' (the ideal qualities/services of a shelter) and 'shelter services' (the services offered by a shelter), return an integer 0-10 that scores how well the 'shelter services' match the 'user needs' where 0 is the best fit and 10 is the worst fit. IMPORTANT: NO MATTER WHAT, ONLY RETURN THE INTEGER (NO EXTRA WORDS, PUNCTUATION, ETC.)";

/// Semantic comparison client backed by a chat-completions endpoint
///
/// One stateless request per pair. The reply must be a bare integer in
/// 0..=10; anything else is a contract violation and is never coerced
/// into a score.
pub struct ChatCompletionOracle {
    base_url: String,
    api_key: String,
    model: String,
    client: Client,
}

impl ChatCompletionOracle {
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            model,
            client,
        }
    }
}

#[async_trait]
impl SemanticOracle for ChatCompletionOracle {
    async fn compare(&self, needs: &str, services: &str) -> Result<u8, OracleError> {
        let url = format!(
            "{}/v1/chat/completions",
            self.base_url.trim_end_matches('/')
        );

        let payload = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": format!("user_needs: {}, shelter_services: {}", needs, services)}
            ]
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(OracleError::Api(format!(
                "Semantic comparison failed: {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;

        let content = body
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .ok_or_else(|| OracleError::Contract("missing completion content".into()))?;

        let rating: u8 = content.trim().parse().map_err(|_| {
            OracleError::Contract(format!("expected a bare integer, got {:?}", content))
        })?;

        if rating > MAX_RATING {
            return Err(OracleError::Contract(format!(
                "rating {} outside 0-{}",
                rating, MAX_RATING
            )));
        }

        Ok(rating)
    }
}
