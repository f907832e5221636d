//! Quote pipeline: pasted text in, rows and images appended to the session
//!
//! URLs are processed one at a time in paste order. A failing URL is recorded
//! in the batch report and the batch moves on.

use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::{QuoteSession, SourceKind};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::http_client::HttpClient;
use crate::infrastructure::image_processing::ImagePostProcessor;
use crate::infrastructure::parsing::{GastroHeroParser, GgmParser, SiteParser, extract_urls};
use crate::infrastructure::parsing_error::{ScrapeError, ScrapeResult};
use crate::infrastructure::render_client::RenderClient;

/// A URL that was dispatched but could not be turned into a row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedUrl {
    pub url: String,
    pub position: u32,
    pub error: String,
    pub recoverable: bool,
}

/// Outcome of one `add_products` call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub added: Vec<u32>,
    pub unsupported: Vec<String>,
    pub failed: Vec<FailedUrl>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.unsupported.is_empty() && self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.added.len() + self.unsupported.len() + self.failed.len()
    }
}

pub struct QuotePipeline {
    ggm: GgmParser,
    gastro_hero: GastroHeroParser,
    images: ImagePostProcessor,
}

impl QuotePipeline {
    pub fn new(ggm: GgmParser, gastro_hero: GastroHeroParser, images: ImagePostProcessor) -> Self {
        Self {
            ggm,
            gastro_hero,
            images,
        }
    }

    /// Wire up clients and parsers from loaded configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let http = Arc::new(HttpClient::new(&config.http).context("Failed to build HTTP client")?);
        let renderer =
            Arc::new(RenderClient::new(config.render.clone()).context("Failed to build render API client")?);

        let ggm = GgmParser::new(Arc::clone(&http)).context("Failed to create GGM parser")?;
        let gastro_hero = GastroHeroParser::new(renderer).context("Failed to create Gastro-Hero parser")?;
        let images = ImagePostProcessor::from_config(http, config.images.clone())
            .context("Failed to set up image post-processing")?;

        Ok(Self::new(ggm, gastro_hero, images))
    }

    pub fn parser_for(&self, source: SourceKind) -> &dyn SiteParser {
        match source {
            SourceKind::GgmGastro => &self.ggm,
            SourceKind::GastroHero => &self.gastro_hero,
        }
    }

    /// Scrape one product page into the row at `position`.
    ///
    /// Image problems never fail the row; the row just ends up without a
    /// registry entry.
    pub async fn add_product(&self, url: &str, position: u32, session: &mut QuoteSession) -> ScrapeResult<()> {
        let source = SourceKind::from_url(url).ok_or_else(|| ScrapeError::UnsupportedSource {
            url: url.to_string(),
        })?;

        let extraction = self.parser_for(source).extract(url, position).await?;

        let image = match (extraction.row.image_key(), extraction.image_url.as_deref()) {
            (Some(_), Some(image_url)) => self.images.process(image_url).await,
            (None, Some(_)) => {
                debug!("Skipping image for {} without article number", url);
                None
            }
            (_, None) => {
                debug!("No product image found on {}", url);
                None
            }
        };

        info!(
            "Added position {} ({}): {:?}",
            position,
            source.manufacturer_tag(),
            extraction.row.article_number
        );
        session.add_product(extraction.row, image);
        Ok(())
    }

    /// Extract every URL from `text` and add one row per supported URL.
    ///
    /// Positions follow URL order starting at the current table length + 1;
    /// URLs that do not produce a row still consume their position.
    pub async fn add_products(&self, text: &str, session: &mut QuoteSession) -> BatchReport {
        let urls = extract_urls(text);
        let mut report = BatchReport::default();

        if urls.is_empty() {
            info!("No product URLs found in input");
            return report;
        }

        let start = session.table.next_position();
        info!("Processing {} product URLs starting at position {}", urls.len(), start);

        for (offset, url) in urls.into_iter().enumerate() {
            let position = start + offset as u32;

            match self.add_product(&url, position, session).await {
                Ok(()) => report.added.push(position),
                Err(ScrapeError::UnsupportedSource { url }) => {
                    warn!("Skipping unsupported URL: {}", url);
                    report.unsupported.push(url);
                }
                Err(e) => {
                    warn!("Failed to add product from {}: {}", url, e);
                    report.failed.push(FailedUrl {
                        recoverable: e.is_recoverable(),
                        error: e.to_string(),
                        url,
                        position,
                    });
                }
            }
        }

        info!(
            "Batch finished: {} added, {} unsupported, {} failed",
            report.added.len(),
            report.unsupported.len(),
            report.failed.len()
        );
        report
    }
}
