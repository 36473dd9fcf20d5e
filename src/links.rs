//! Image and player URLs
//!
//! Both are plain string templates over externally configured base URLs.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::MediaKind;

/// Shown when a title has no artwork
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.jpg";

/// Image rendition sizes used by cards, detail pages and hero banners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSize {
    W300,
    #[default]
    W500,
    Original,
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSize::W300 => write!(f, "w300"),
            ImageSize::W500 => write!(f, "w500"),
            ImageSize::Original => write!(f, "original"),
        }
    }
}

/// Full URL for a poster/backdrop path, or the placeholder when there is none
pub fn image_url(base: &str, path: Option<&str>, size: ImageSize) -> String {
    match path.filter(|p| !p.is_empty()) {
        Some(path) => format!("{}/{}{}", base.trim_end_matches('/'), size, path),
        None => PLACEHOLDER_IMAGE.to_string(),
    }
}

/// Base URLs of the two embedded player templates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedTemplates {
    pub movie: String,
    pub tv: String,
}

impl EmbedTemplates {
    /// Player URL for a movie, or for a show episode (season/episode default to 1)
    pub fn url(&self, kind: MediaKind, id: u64, season: Option<u16>, episode: Option<u16>) -> String {
        match kind {
            MediaKind::Movie => format!("{}{}", self.movie, id),
            MediaKind::Tv => format!(
                "{}{}&season={}&episode={}",
                self.tv,
                id,
                season.unwrap_or(1),
                episode.unwrap_or(1)
            ),
        }
    }
}
