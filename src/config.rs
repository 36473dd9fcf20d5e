//! Configuration management for cinegrid
//!
//! Handles config file loading/saving and environment overrides.
//! Config is stored at ~/.config/cinegrid/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::api::tmdb::DEFAULT_BASE_URL;
use crate::links::EmbedTemplates;

/// Default base URL for poster/backdrop images
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// TMDB v4 read access token (sent as a bearer credential)
    pub api_token: Option<String>,
    /// TMDB API base URL
    pub api_base_url: Option<String>,
    /// Image CDN base URL
    pub image_base_url: Option<String>,
    /// Movie player template; the TMDB id is appended
    pub movie_embed_url: Option<String>,
    /// TV player template; id, season and episode are appended
    pub tv_embed_url: Option<String>,
}

impl Config {
    /// Get config file path (~/.config/cinegrid/config.toml)
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("cinegrid").join("config.toml"))
    }

    /// Load config from the default path plus environment overrides
    pub fn load() -> Self {
        let file = Self::path()
            .and_then(|p| Self::read_file(&p).ok())
            .unwrap_or_default();
        Self::with_env_overrides(file, |key| std::env::var(key).ok())
    }

    /// Load config from an explicit file; unlike `load`, a broken file is an error
    pub fn load_from(path: &Path) -> Result<Self> {
        let file = Self::read_file(path)?;
        Ok(Self::with_env_overrides(file, |key| std::env::var(key).ok()))
    }

    /// File contents only, no environment overrides. A missing file is empty config.
    pub fn read_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Save config to file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml = toml::to_string_pretty(self)?;
        std::fs::write(path, toml)
            .with_context(|| format!("failed to write config file {}", path.display()))?;
        Ok(())
    }

    /// Environment variables win over file values
    fn with_env_overrides(mut self, env: impl Fn(&str) -> Option<String>) -> Self {
        let pick = |key: &str, current: Option<String>| {
            env(key).filter(|v| !v.trim().is_empty()).or(current)
        };
        self.api_token = pick("TMDB_API_TOKEN", self.api_token);
        self.api_base_url = pick("TMDB_BASE_URL", self.api_base_url);
        self.image_base_url = pick("TMDB_IMAGE_BASE_URL", self.image_base_url);
        self.movie_embed_url = pick("MOVIE_EMBED_URL", self.movie_embed_url);
        self.tv_embed_url = pick("TV_EMBED_URL", self.tv_embed_url);
        self
    }

    pub fn api_base_url(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn image_base_url(&self) -> &str {
        self.image_base_url
            .as_deref()
            .unwrap_or(DEFAULT_IMAGE_BASE_URL)
    }

    /// Player templates; both must be configured
    pub fn embed_templates(&self) -> Option<EmbedTemplates> {
        Some(EmbedTemplates {
            movie: self.movie_embed_url.clone()?,
            tv: self.tv_embed_url.clone()?,
        })
    }
}
