use crate::config::Config;
use crate::errors::AppError;
use crate::models::{LeadSubmission, UpstreamResult};
use std::time::Duration;

/// Path appended to the configured base URL for lead submission.
pub const SUBMIT_PATH: &str = "/lead/submit";

pub const API_KEY_HEADER: &str = "X-API-KEY";
pub const API_SECRET_HEADER: &str = "X-API-SECRET";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the partner lead-buying API.
#[derive(Clone)]
pub struct LeadApiClient {
    client: reqwest::Client,
    submit_url: String,
    api_key: String,
    api_secret: String,
}

impl LeadApiClient {
    /// Creates a new `LeadApiClient`.
    ///
    /// # Arguments
    ///
    /// * `config` - Supplies the base URL, credentials and request timeout.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(Duration::from_secs(config.lead_api_timeout_secs))
            .build()
            .map_err(|e| {
                AppError::Internal(format!("Failed to create lead API client: {}", e))
            })?;

        Ok(Self {
            client,
            submit_url: format!("{}{}", config.lead_api_base_url, SUBMIT_PATH),
            api_key: config.lead_api_key.clone(),
            api_secret: config.lead_api_secret.clone(),
        })
    }

    pub fn submit_url(&self) -> &str {
        &self.submit_url
    }

    /// Posts a normalized lead to the partner.
    ///
    /// Any HTTP answer, success or not, comes back as an [`UpstreamResult`]; only
    /// transport failures (connect, timeout, unreadable body) are errors.
    ///
    /// # Arguments
    ///
    /// * `lead` - The validated, normalized submission.
    ///
    /// # Returns
    ///
    /// * `Result<UpstreamResult, AppError>` - Upstream status and body.
    pub async fn submit(&self, lead: &LeadSubmission) -> Result<UpstreamResult, AppError> {
        tracing::info!(
            "Submitting lead to partner: campaign={:?}",
            lead.campaign_id()
        );

        let start = std::time::Instant::now();

        let response = self
            .client
            .post(&self.submit_url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(API_SECRET_HEADER, &self.api_secret)
            .json(lead)
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;

        tracing::info!(
            "Partner answered {} in {}ms",
            status,
            start.elapsed().as_millis()
        );
        if !(200..300).contains(&status) {
            tracing::warn!("Partner returned non-success status {}", status);
        }

        Ok(UpstreamResult::from_text(status, &text))
    }
}
