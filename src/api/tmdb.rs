//! TMDB (The Movie Database) API client
//!
//! Provides search, discover, curated lists and metadata for movies and TV shows.
//! API docs: https://developer.themoviedb.org/docs

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::instrument;

use super::provider::MetadataProvider;
use crate::config::Config;
use crate::models::{
    Catalog, Credits, Episode, FilterSet, Genre, Item, MediaKind, Movie, MovieDetail,
    ResultPage, SeasonSummary, Show, SortOrder, TvDetail,
};

/// Default base URL for TMDB API v3
pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Client-side request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// TMDB API error types
#[derive(Error, Debug)]
pub enum TmdbError {
    #[error("Provider error ({status}): {message}")]
    Provider { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
}

/// Coarse error class, for callers that branch on failure kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    /// Non-2xx response or malformed payload
    Provider,
    /// No response at all
    Network,
}

impl TmdbError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TmdbError::Provider { .. } | TmdbError::InvalidResponse(_) => ErrorCategory::Provider,
            TmdbError::Network(_) => ErrorCategory::Network,
        }
    }

    /// HTTP status reported by the provider, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            TmdbError::Provider { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND.as_u16())
    }

    fn from_status(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .map(|e| e.status_message)
            .unwrap_or_else(|_| {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            });
        TmdbError::Provider {
            status: status.as_u16(),
            message,
        }
    }
}

pub type Result<T> = std::result::Result<T, TmdbError>;

/// Trending time window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    #[default]
    Day,
    Week,
}

impl TimeWindow {
    fn path_segment(&self) -> &'static str {
        match self {
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
        }
    }
}

/// TMDB API client
#[derive(Debug, Clone)]
pub struct TmdbClient {
    api_token: String,
    base_url: String,
    client: reqwest::Client,
}

impl TmdbClient {
    /// Create a new TMDB client with the given bearer token
    pub fn new(api_token: impl Into<String>) -> Self {
        Self::with_base_url(api_token, DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing)
    pub fn with_base_url(api_token: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            api_token: api_token.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }

    /// Create a client from loaded configuration
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let token = config
            .api_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("TMDB API token is not configured"))?;
        Ok(Self::with_base_url(token, config.api_base_url()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Make an authenticated GET request and decode the JSON body
    #[instrument(skip(self), level = "debug")]
    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        tracing::debug!(%url, "TMDB API request");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_token)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // An unreadable body still yields the provider status
            let body = response.text().await.unwrap_or_default();
            let err = TmdbError::from_status(status, &body);
            tracing::debug!(status = status.as_u16(), error = %err, "TMDB API error response");
            return Err(err);
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| TmdbError::InvalidResponse(format!("JSON parse error: {}", e)))
    }

    async fn get_page(&self, endpoint: &str, default_kind: MediaKind) -> Result<ResultPage<Item>> {
        let response: PageResponse = self.get(endpoint).await?;
        Ok(response.into_page(default_kind))
    }

    // -------------------------------------------------------------------------
    // Search
    // -------------------------------------------------------------------------

    /// Search movies by title
    pub async fn search_movies(&self, query: &str, page: u32) -> Result<ResultPage<Item>> {
        let endpoint = format!("/search/movie?{}", search_params(query, page));
        self.get_page(&endpoint, Catalog::Movies.default_kind()).await
    }

    /// Search TV shows by name
    pub async fn search_tv(&self, query: &str, page: u32) -> Result<ResultPage<Item>> {
        let endpoint = format!("/search/tv?{}", search_params(query, page));
        self.get_page(&endpoint, Catalog::Tv.default_kind()).await
    }

    /// Search movies and TV shows together (people are dropped)
    pub async fn search_multi(&self, query: &str, page: u32) -> Result<ResultPage<Item>> {
        let endpoint = format!("/search/multi?{}", search_params(query, page));
        self.get_page(&endpoint, Catalog::Multi.default_kind()).await
    }

    // -------------------------------------------------------------------------
    // Discover
    // -------------------------------------------------------------------------

    /// Discover movies matching a filter set
    pub async fn discover_movies(&self, filters: &FilterSet, page: u32) -> Result<ResultPage<Item>> {
        let endpoint = format!(
            "/discover/movie?{}",
            discover_params(filters, page, "primary_release_year")
        );
        self.get_page(&endpoint, MediaKind::Movie).await
    }

    /// Discover TV shows matching a filter set
    pub async fn discover_tv(&self, filters: &FilterSet, page: u32) -> Result<ResultPage<Item>> {
        let endpoint = format!(
            "/discover/tv?{}",
            discover_params(filters, page, "first_air_date_year")
        );
        self.get_page(&endpoint, MediaKind::Tv).await
    }

    // -------------------------------------------------------------------------
    // Curated lists
    // -------------------------------------------------------------------------

    /// Trending movies or shows for a time window
    pub async fn trending(
        &self,
        kind: MediaKind,
        window: TimeWindow,
        page: u32,
    ) -> Result<ResultPage<Item>> {
        let endpoint = format!(
            "/trending/{}/{}?page={}",
            kind.path_segment(),
            window.path_segment(),
            page
        );
        self.get_page(&endpoint, kind).await
    }

    /// Most popular movies or shows
    pub async fn popular(&self, kind: MediaKind, page: u32) -> Result<ResultPage<Item>> {
        let endpoint = format!("/{}/popular?page={}", kind.path_segment(), page);
        self.get_page(&endpoint, kind).await
    }

    /// Highest rated movies or shows
    pub async fn top_rated(&self, kind: MediaKind, page: u32) -> Result<ResultPage<Item>> {
        let endpoint = format!("/{}/top_rated?page={}", kind.path_segment(), page);
        self.get_page(&endpoint, kind).await
    }

    /// Upcoming movie releases
    pub async fn upcoming_movies(&self, page: u32) -> Result<ResultPage<Item>> {
        let endpoint = format!("/movie/upcoming?page={}", page);
        self.get_page(&endpoint, MediaKind::Movie).await
    }

    // -------------------------------------------------------------------------
    // Metadata
    // -------------------------------------------------------------------------

    /// Get movie details by ID
    pub async fn movie_detail(&self, id: u64) -> Result<MovieDetail> {
        let response: MovieResponse = self.get(&format!("/movie/{}", id)).await?;
        Ok(response.into_detail())
    }

    /// Get TV show details by ID
    pub async fn tv_detail(&self, id: u64) -> Result<TvDetail> {
        let response: TvResponse = self.get(&format!("/tv/{}", id)).await?;
        Ok(response.into_detail())
    }

    /// Cast and crew
    pub async fn credits(&self, kind: MediaKind, id: u64) -> Result<Credits> {
        self.get(&format!("/{}/{}/credits", kind.path_segment(), id))
            .await
    }

    /// First page of recommendations for a title
    pub async fn recommendations(&self, kind: MediaKind, id: u64) -> Result<Vec<Item>> {
        let endpoint = format!("/{}/{}/recommendations", kind.path_segment(), id);
        Ok(self.get_page(&endpoint, kind).await?.items)
    }

    /// Get episodes for a TV season
    pub async fn season_episodes(&self, show_id: u64, season: u16) -> Result<Vec<Episode>> {
        let endpoint = format!("/tv/{}/season/{}", show_id, season);
        let response: SeasonResponse = self.get(&endpoint).await?;
        Ok(response.into_episodes(season))
    }

    /// Genre list for movies or shows
    pub async fn genres(&self, kind: MediaKind) -> Result<Vec<Genre>> {
        let endpoint = format!("/genre/{}/list", kind.path_segment());
        let response: GenreListResponse = self.get(&endpoint).await?;
        Ok(response.genres)
    }
}

impl MetadataProvider for TmdbClient {
    async fn search(&self, catalog: Catalog, term: &str, page: u32) -> Result<ResultPage<Item>> {
        match catalog {
            Catalog::Movies => self.search_movies(term, page).await,
            Catalog::Tv => self.search_tv(term, page).await,
            Catalog::Multi => self.search_multi(term, page).await,
        }
    }

    async fn discover(
        &self,
        kind: MediaKind,
        filters: &FilterSet,
        page: u32,
    ) -> Result<ResultPage<Item>> {
        match kind {
            MediaKind::Movie => self.discover_movies(filters, page).await,
            MediaKind::Tv => self.discover_tv(filters, page).await,
        }
    }
}

// =============================================================================
// Query Strings
// =============================================================================

fn search_params(query: &str, page: u32) -> String {
    encode_params(&[("query", query.to_string()), ("page", page.to_string())])
}

/// Discover parameters; absent filter fields are omitted, sort defaults to popularity
fn discover_params(filters: &FilterSet, page: u32, year_param: &'static str) -> String {
    let mut params = vec![
        ("page", page.to_string()),
        (
            "sort_by",
            filters
                .sort_by
                .unwrap_or(SortOrder::PopularityDesc)
                .as_param()
                .to_string(),
        ),
    ];
    if let Some(genre) = filters.genre_param() {
        params.push(("with_genres", genre.to_string()));
    }
    if let Some(year) = filters.year {
        params.push((year_param, year.to_string()));
    }
    if let Some(country) = filters.origin_country_param() {
        params.push(("with_origin_country", country.to_string()));
    }
    encode_params(&params)
}

fn encode_params(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

// =============================================================================
// Response Structures (internal deserialization)
// =============================================================================

#[derive(Debug, Deserialize)]
struct ErrorBody {
    status_message: String,
}

#[derive(Debug, Deserialize)]
struct PageResponse {
    #[serde(default = "first_page")]
    page: u32,
    results: Vec<ItemRaw>,
    #[serde(default)]
    total_pages: u32,
    #[serde(default)]
    total_results: u32,
}

fn first_page() -> u32 {
    1
}

impl PageResponse {
    fn into_page(self, default_kind: MediaKind) -> ResultPage<Item> {
        ResultPage {
            items: self
                .results
                .into_iter()
                .filter_map(|r| r.into_item(default_kind))
                .collect(),
            page: self.page,
            total_pages: self.total_pages,
            total_results: self.total_results,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ItemRaw {
    id: u64,
    media_type: Option<String>,
    // Movies use "title", TV uses "name"
    title: Option<String>,
    name: Option<String>,
    // Movies use "release_date", TV uses "first_air_date"
    release_date: Option<String>,
    first_air_date: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    vote_average: Option<f32>,
    #[serde(default)]
    genre_ids: Vec<u32>,
    #[serde(default)]
    origin_country: Vec<String>,
}

impl ItemRaw {
    fn into_item(self, default_kind: MediaKind) -> Option<Item> {
        let kind = match self.media_type.as_deref() {
            Some("movie") => MediaKind::Movie,
            Some("tv") => MediaKind::Tv,
            Some(_) => return None, // Filter out "person" and other types
            None => default_kind,
        };

        let vote_average = self.vote_average.unwrap_or(0.0);
        let overview = self.overview.unwrap_or_default();

        Some(match kind {
            MediaKind::Movie => Item::Movie(Movie {
                id: self.id,
                title: self.title.or(self.name).unwrap_or_default(),
                release_date: non_empty(self.release_date),
                overview,
                poster_path: self.poster_path,
                backdrop_path: self.backdrop_path,
                vote_average,
                genre_ids: self.genre_ids,
            }),
            MediaKind::Tv => Item::Show(Show {
                id: self.id,
                name: self.name.or(self.title).unwrap_or_default(),
                first_air_date: non_empty(self.first_air_date),
                overview,
                poster_path: self.poster_path,
                backdrop_path: self.backdrop_path,
                vote_average,
                genre_ids: self.genre_ids,
                origin_country: self.origin_country,
            }),
        })
    }
}

#[derive(Debug, Deserialize)]
struct GenreListResponse {
    genres: Vec<Genre>,
}

#[derive(Debug, Deserialize)]
struct MovieResponse {
    id: u64,
    imdb_id: Option<String>,
    title: String,
    tagline: Option<String>,
    release_date: Option<String>,
    runtime: Option<u32>,
    #[serde(default)]
    genres: Vec<Genre>,
    overview: Option<String>,
    vote_average: Option<f32>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
}

impl MovieResponse {
    fn into_detail(self) -> MovieDetail {
        MovieDetail {
            id: self.id,
            imdb_id: non_empty(self.imdb_id),
            title: self.title,
            tagline: non_empty(self.tagline),
            release_date: non_empty(self.release_date),
            runtime: self.runtime,
            genres: self.genres,
            overview: self.overview.unwrap_or_default(),
            vote_average: self.vote_average.unwrap_or(0.0),
            poster_path: self.poster_path,
            backdrop_path: self.backdrop_path,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TvResponse {
    id: u64,
    name: String,
    tagline: Option<String>,
    first_air_date: Option<String>,
    number_of_seasons: Option<u16>,
    number_of_episodes: Option<u32>,
    #[serde(default)]
    seasons: Vec<SeasonRaw>,
    #[serde(default)]
    genres: Vec<Genre>,
    overview: Option<String>,
    vote_average: Option<f32>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
}

impl TvResponse {
    fn into_detail(self) -> TvDetail {
        let seasons: Vec<SeasonSummary> = self.seasons.into_iter().map(|s| s.into_summary()).collect();
        let regular = seasons.iter().filter(|s| !s.is_specials()).count() as u16;

        TvDetail {
            id: self.id,
            name: self.name,
            tagline: non_empty(self.tagline),
            first_air_date: non_empty(self.first_air_date),
            number_of_seasons: self.number_of_seasons.unwrap_or(regular),
            number_of_episodes: self.number_of_episodes.unwrap_or(0),
            seasons,
            genres: self.genres,
            overview: self.overview.unwrap_or_default(),
            vote_average: self.vote_average.unwrap_or(0.0),
            poster_path: self.poster_path,
            backdrop_path: self.backdrop_path,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SeasonRaw {
    season_number: u16,
    #[serde(default)]
    episode_count: u16,
    name: Option<String>,
    air_date: Option<String>,
}

impl SeasonRaw {
    fn into_summary(self) -> SeasonSummary {
        SeasonSummary {
            season_number: self.season_number,
            episode_count: self.episode_count,
            name: self.name,
            air_date: non_empty(self.air_date),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SeasonResponse {
    #[serde(default)]
    episodes: Vec<EpisodeRaw>,
}

impl SeasonResponse {
    fn into_episodes(self, season: u16) -> Vec<Episode> {
        self.episodes
            .into_iter()
            .map(|e| e.into_episode(season))
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct EpisodeRaw {
    episode_number: u16,
    season_number: Option<u16>,
    name: String,
    overview: Option<String>,
    air_date: Option<String>,
    runtime: Option<u32>,
    still_path: Option<String>,
    vote_average: Option<f32>,
}

impl EpisodeRaw {
    fn into_episode(self, season: u16) -> Episode {
        Episode {
            season_number: self.season_number.unwrap_or(season),
            episode_number: self.episode_number,
            name: self.name,
            overview: self.overview.unwrap_or_default(),
            air_date: non_empty(self.air_date),
            runtime: self.runtime,
            still_path: self.still_path,
            vote_average: self.vote_average.unwrap_or(0.0),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
