//! Configuration infrastructure
//!
//! Settings are layered: built-in defaults, then an optional config file,
//! then environment variables prefixed with `QUOTE_SCRAPER` (nested keys are
//! separated by `__`, e.g. `QUOTE_SCRAPER__RENDER__API_KEY`).

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment prefix for all settings
pub const ENV_PREFIX: &str = "QUOTE_SCRAPER";

/// Bare environment variable accepted for the render API key
pub const RENDER_API_KEY_ENV: &str = "ZYTE_API_KEY";

pub mod defaults {
    pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;
    pub const MAX_REQUESTS_PER_SECOND: u32 = 5;
    pub const RENDER_ENDPOINT: &str = "https://api.zyte.com/v1/extract";
    pub const RENDER_TIMEOUT_SECONDS: u64 = 120;
    pub const BACKGROUND_TOLERANCE: u8 = 24;
    pub const ALPHA_THRESHOLD: u8 = 0;
    pub const SEGMENTATION_INPUT_SIZE: u32 = 320;
    pub const LOG_FILE_NAME: &str = "quote-scraper.log";
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpClientConfig,
    pub render: RenderApiConfig,
    pub images: ImageProcessingConfig,
    pub logging: LoggingConfig,
}

/// Plain HTTP client settings used for product pages and images
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_requests_per_second: u32,
    pub follow_redirects: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::USER_AGENT.to_string(),
            timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            max_requests_per_second: defaults::MAX_REQUESTS_PER_SECOND,
            follow_redirects: true,
        }
    }
}

/// Remote browser rendering service
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderApiConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for RenderApiConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::RENDER_ENDPOINT.to_string(),
            api_key: None,
            timeout_seconds: defaults::RENDER_TIMEOUT_SECONDS,
        }
    }
}

// Keeps the API key out of debug logs
impl std::fmt::Debug for RenderApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderApiConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Product image post-processing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageProcessingConfig {
    /// Download and crop product images at all
    pub enabled: bool,
    /// Max per-channel distance from the border color still counted as background
    pub background_tolerance: u8,
    /// Pixels with alpha at or below this value are outside the crop box
    pub alpha_threshold: u8,
    /// Salient-object segmentation model (u2net family, `.rten` or `.onnx`).
    /// Without one the border flood fill is used.
    pub model_path: Option<PathBuf>,
    /// Square input edge the model expects
    pub model_input_size: u32,
}

impl Default for ImageProcessingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            background_tolerance: defaults::BACKGROUND_TOLERANCE,
            alpha_threshold: defaults::ALPHA_THRESHOLD,
            model_path: None,
            model_input_size: defaults::SEGMENTATION_INPUT_SIZE,
        }
    }
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs in the log file
    pub json_format: bool,

    /// Enable console output
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Directory for log files, defaults to the platform data dir
    pub log_dir: Option<PathBuf>,

    pub file_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            console_output: true,
            file_output: false,
            log_dir: None,
            file_name: defaults::LOG_FILE_NAME.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, an optional file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let mut app_config: Self = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        if app_config.render.api_key.is_none() {
            app_config.render.api_key = std::env::var(RENDER_API_KEY_ENV)
                .ok()
                .filter(|key| !key.trim().is_empty());
        }

        app_config.validate()?;
        info!(
            "Configuration loaded (render API key configured: {})",
            app_config.render.api_key.is_some()
        );
        Ok(app_config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.http.max_requests_per_second == 0 {
            bail!("http.max_requests_per_second must be greater than 0");
        }
        if self.http.timeout_seconds == 0 || self.render.timeout_seconds == 0 {
            bail!("timeouts must be greater than 0 seconds");
        }
        url::Url::parse(&self.render.endpoint)
            .with_context(|| format!("render.endpoint is not a valid URL: {}", self.render.endpoint))?;
        if self.images.model_input_size == 0 {
            bail!("images.model_input_size must be greater than 0");
        }
        if let Some(model_path) = &self.images.model_path {
            if !model_path.is_file() {
                bail!("images.model_path does not point to a file: {}", model_path.display());
            }
        }
        if !self.logging.console_output && !self.logging.file_output {
            bail!("logging needs console_output or file_output enabled");
        }
        Ok(())
    }
}
