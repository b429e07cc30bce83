use serde::Deserialize;

/// Upstream host used when `LEAD_API_BASE_URL` is not set.
pub const DEFAULT_LEAD_API_BASE_URL: &str = "https://api.leadexchange.example";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub lead_api_base_url: String,
    pub lead_api_key: String,
    pub lead_api_secret: String,
    /// Total request timeout for the upstream lead call, in seconds.
    pub lead_api_timeout_secs: u64,
    /// Optional pause before the relay answers, in milliseconds. Zero disables it.
    pub response_delay_ms: u64,
    pub token_secret: String,
    /// Public endpoint that receives `?token=...` and performs the redirect.
    pub redirect_endpoint_url: String,
    /// Literal destination sealed into every issued token.
    pub redirect_destination_url: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self::from_lookup(|key| std::env::var(key).ok())?;

        // Never log secrets, only where traffic goes
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Lead API Base URL: {}", config.lead_api_base_url);
        tracing::debug!("Lead API timeout: {}s", config.lead_api_timeout_secs);
        tracing::debug!("Redirect endpoint: {}", config.redirect_endpoint_url);
        if config.response_delay_ms > 0 {
            tracing::info!("Lead responses delayed by {}ms", config.response_delay_ms);
        }
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            port: lookup("PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            lead_api_base_url: match lookup("LEAD_API_BASE_URL").filter(|s| !s.trim().is_empty())
            {
                Some(url) => http_url("LEAD_API_BASE_URL", url)?,
                None => DEFAULT_LEAD_API_BASE_URL.to_string(),
            }
            .trim_end_matches('/')
            .to_string(),
            lead_api_key: required(&lookup, "LEAD_API_KEY")?,
            lead_api_secret: required(&lookup, "LEAD_API_SECRET")?,
            lead_api_timeout_secs: lookup("LEAD_API_TIMEOUT_SECS")
                .unwrap_or_else(|| "30".to_string())
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    anyhow::anyhow!("LEAD_API_TIMEOUT_SECS must be a positive number of seconds")
                })?,
            response_delay_ms: lookup("LEAD_RESPONSE_DELAY_MS")
                .unwrap_or_else(|| "0".to_string())
                .parse()
                .map_err(|_| {
                    anyhow::anyhow!("LEAD_RESPONSE_DELAY_MS must be a number of milliseconds")
                })?,
            token_secret: required(&lookup, "TOKEN_SECRET")?,
            redirect_endpoint_url: required(&lookup, "REDIRECT_ENDPOINT_URL")
                .and_then(|url| http_url("REDIRECT_ENDPOINT_URL", url))?,
            redirect_destination_url: required(&lookup, "REDIRECT_DESTINATION_URL")
                .and_then(|url| http_url("REDIRECT_DESTINATION_URL", url))?,
        })
    }
}

fn required<F>(lookup: &F, key: &str) -> anyhow::Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let value =
        lookup(key).ok_or_else(|| anyhow::anyhow!("{} environment variable required", key))?;
    if value.trim().is_empty() {
        anyhow::bail!("{} cannot be empty", key);
    }
    Ok(value)
}

fn http_url(key: &str, url: String) -> anyhow::Result<String> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("{} must start with http:// or https://", key);
    }
    Ok(url)
}
