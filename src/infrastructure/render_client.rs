//! Client for the remote browser rendering API
//!
//! Some shops only fill their product pages through client-side scripts.
//! For those the page is rendered by a hosted headless browser and the
//! resulting HTML is returned in the `browserHtml` field.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::parsing_error::{ScrapeError, ScrapeResult};

pub use super::config::RenderApiConfig;

const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Debug, Serialize)]
struct RenderRequest<'a> {
    url: &'a str,
    #[serde(rename = "browserHtml")]
    browser_html: bool,
}

#[derive(Debug, Deserialize)]
struct RenderResponse {
    #[serde(rename = "browserHtml")]
    browser_html: Option<String>,
}

pub struct RenderClient {
    client: Client,
    config: RenderApiConfig,
}

impl RenderClient {
    pub fn new(config: RenderApiConfig) -> ScrapeResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .build()
            .map_err(|e| ScrapeError::configuration(format!("Failed to create render client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Fetch the browser-rendered HTML of `url`.
    ///
    /// Failures are returned as-is; there are no retries.
    pub async fn render(&self, url: &str) -> ScrapeResult<String> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(ScrapeError::MissingApiKey)?;

        info!("Rendering {} through {}", url, self.config.endpoint);

        let response = self
            .client
            .post(&self.config.endpoint)
            .basic_auth(api_key, Some(""))
            .json(&RenderRequest {
                url,
                browser_html: true,
            })
            .send()
            .await
            .map_err(|e| ScrapeError::http(url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ScrapeError::RenderApi {
                url: url.to_string(),
                status: status.as_u16(),
                message: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let payload: RenderResponse = response.json().await.map_err(|e| ScrapeError::RenderResponse {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let html = payload.browser_html.ok_or_else(|| ScrapeError::RenderResponse {
            url: url.to_string(),
            reason: "response has no browserHtml field".to_string(),
        })?;

        debug!("Rendered {} ({} chars)", url, html.len());
        Ok(html)
    }
}
