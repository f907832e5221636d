//! Infrastructure layer: configuration, logging, network clients, HTML
//! parsing and image post-processing

pub mod config;
pub mod http_client;
pub mod image_processing;
pub mod logging;
pub mod parsing;
pub mod parsing_error;
pub mod render_client;

pub use config::AppConfig;
pub use http_client::HttpClient;
pub use image_processing::{BackgroundRemover, BorderFloodRemover, ImagePostProcessor, SegmentationRemover};
pub use logging::{get_log_directory, init_logging, init_logging_with_config};
pub use parsing::{GastroHeroParser, GgmParser, SiteParser, extract_urls, normalize_price};
pub use parsing_error::{ScrapeError, ScrapeResult};
pub use render_client::RenderClient;
