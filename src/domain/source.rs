//! Supported product sources and URL dispatch

use serde::{Deserialize, Serialize};

use super::product::ManufacturerTag;

/// Site a product URL belongs to, resolved once per URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// ggmgastro.com, served as plain HTML
    GgmGastro,
    /// gastro-hero.de, needs client-side rendering
    GastroHero,
}

impl SourceKind {
    pub const ALL: [Self; 2] = [Self::GastroHero, Self::GgmGastro];

    /// Token that identifies the site inside a product URL
    pub const fn url_token(self) -> &'static str {
        match self {
            Self::GgmGastro => "ggmgastro",
            Self::GastroHero => "gastro-hero",
        }
    }

    /// Resolve the source for a URL, `None` when no parser supports it
    pub fn from_url(url: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| url.contains(kind.url_token()))
    }

    pub const fn manufacturer_tag(self) -> ManufacturerTag {
        match self {
            Self::GgmGastro => ManufacturerTag::Ggm,
            Self::GastroHero => ManufacturerTag::GastroHero,
        }
    }

    /// Whether pages must go through the remote browser renderer
    pub const fn requires_rendering(self) -> bool {
        matches!(self, Self::GastroHero)
    }
}
