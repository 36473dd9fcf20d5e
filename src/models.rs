//! Data structures and types for cinegrid
//!
//! Contains the shared models used across the crate, organized by domain:
//! - **Items**: movie and show records as they appear in list endpoints
//! - **Pages**: one batch of items plus pagination metadata
//! - **Queries**: search terms, filter sets and the catalog being browsed
//! - **Details**: full movie/show records, credits, seasons and episodes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Media Kind
// =============================================================================

/// Media type discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    /// Path segment used by the provider (`movie` / `tv`)
    pub fn path_segment(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "tv",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Movie => write!(f, "Movie"),
            MediaKind::Tv => write!(f, "TV Show"),
        }
    }
}

// =============================================================================
// List Items
// =============================================================================

/// Movie record from a list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: u64,
    pub title: String,
    pub release_date: Option<String>,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub vote_average: f32,
    pub genre_ids: Vec<u32>,
}

/// TV show record from a list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Show {
    pub id: u64,
    pub name: String,
    pub first_air_date: Option<String>,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub vote_average: f32,
    pub genre_ids: Vec<u32>,
    pub origin_country: Vec<String>,
}

/// A movie or a show, as rendered in grids and carousels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "media_type", rename_all = "lowercase")]
pub enum Item {
    Movie(Movie),
    #[serde(rename = "tv")]
    Show(Show),
}

impl Item {
    pub fn id(&self) -> u64 {
        match self {
            Item::Movie(m) => m.id,
            Item::Show(s) => s.id,
        }
    }

    pub fn kind(&self) -> MediaKind {
        match self {
            Item::Movie(_) => MediaKind::Movie,
            Item::Show(_) => MediaKind::Tv,
        }
    }

    /// Movie title or show name
    pub fn title(&self) -> &str {
        match self {
            Item::Movie(m) => &m.title,
            Item::Show(s) => &s.name,
        }
    }

    /// Release date for movies, first air date for shows
    pub fn date(&self) -> Option<&str> {
        match self {
            Item::Movie(m) => m.release_date.as_deref(),
            Item::Show(s) => s.first_air_date.as_deref(),
        }
    }

    pub fn year(&self) -> Option<u16> {
        self.date().and_then(extract_year)
    }

    pub fn poster_path(&self) -> Option<&str> {
        match self {
            Item::Movie(m) => m.poster_path.as_deref(),
            Item::Show(s) => s.poster_path.as_deref(),
        }
    }

    /// Vote average on the provider's 0-10 scale
    pub fn rating(&self) -> f32 {
        match self {
            Item::Movie(m) => m.vote_average,
            Item::Show(s) => s.vote_average,
        }
    }

    /// Rating as a whole percentage, the way cards display it
    pub fn rating_percent(&self) -> u8 {
        (self.rating().clamp(0.0, 10.0) * 10.0).round() as u8
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let year_str = self.year().map(|y| format!(" ({})", y)).unwrap_or_default();
        write!(
            f,
            "{}{} [{}] {}%",
            self.title(),
            year_str,
            self.kind(),
            self.rating_percent()
        )
    }
}

// =============================================================================
// Result Pages
// =============================================================================

/// One page of results plus pagination metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultPage<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub total_pages: u32,
    pub total_results: u32,
}

impl<T> ResultPage<T> {
    /// Whether the provider reports pages after this one
    pub fn has_more(&self) -> bool {
        self.page < self.total_pages
    }
}

// =============================================================================
// Queries
// =============================================================================

/// Sort keys offered by the filter bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "popularity.desc")]
    PopularityDesc,
    #[serde(rename = "popularity.asc")]
    PopularityAsc,
    #[serde(rename = "vote_average.desc")]
    RatingDesc,
    #[serde(rename = "vote_average.asc")]
    RatingAsc,
    #[serde(rename = "release_date.desc")]
    ReleaseDateDesc,
    #[serde(rename = "release_date.asc")]
    ReleaseDateAsc,
}

impl SortOrder {
    pub const ALL: [SortOrder; 6] = [
        SortOrder::PopularityDesc,
        SortOrder::PopularityAsc,
        SortOrder::RatingDesc,
        SortOrder::RatingAsc,
        SortOrder::ReleaseDateDesc,
        SortOrder::ReleaseDateAsc,
    ];

    /// Value sent as `sort_by`
    pub fn as_param(&self) -> &'static str {
        match self {
            SortOrder::PopularityDesc => "popularity.desc",
            SortOrder::PopularityAsc => "popularity.asc",
            SortOrder::RatingDesc => "vote_average.desc",
            SortOrder::RatingAsc => "vote_average.asc",
            SortOrder::ReleaseDateDesc => "release_date.desc",
            SortOrder::ReleaseDateAsc => "release_date.asc",
        }
    }

    /// Human label
    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::PopularityDesc => "Popularity Descending",
            SortOrder::PopularityAsc => "Popularity Ascending",
            SortOrder::RatingDesc => "Rating Descending",
            SortOrder::RatingAsc => "Rating Ascending",
            SortOrder::ReleaseDateDesc => "Release Date Descending",
            SortOrder::ReleaseDateAsc => "Release Date Ascending",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortOrder::ALL
            .into_iter()
            .find(|order| order.as_param() == s.trim())
            .ok_or_else(|| format!("unknown sort order: {}", s))
    }
}

/// Structured filter set for the discover endpoints.
///
/// Every field is optional; an absent field leaves that dimension
/// unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterSet {
    /// Provider genre id (e.g. "16" for Animation)
    pub genre: Option<String>,
    pub sort_by: Option<SortOrder>,
    pub year: Option<u16>,
    /// ISO 3166-1 country code the title originates from
    pub origin_country: Option<String>,
}

impl FilterSet {
    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn sort_by(mut self, order: SortOrder) -> Self {
        self.sort_by = Some(order);
        self
    }

    pub fn year(mut self, year: u16) -> Self {
        self.year = Some(year);
        self
    }

    pub fn origin_country(mut self, country: impl Into<String>) -> Self {
        self.origin_country = Some(country.into());
        self
    }

    /// Japanese animation, most popular first
    pub fn anime() -> Self {
        FilterSet::default()
            .genre(ANIMATION_GENRE_ID)
            .sort_by(SortOrder::PopularityDesc)
            .origin_country("JP")
    }

    /// Genre with blank values treated as absent
    pub fn genre_param(&self) -> Option<&str> {
        non_blank(self.genre.as_deref())
    }

    /// Origin country with blank values treated as absent
    pub fn origin_country_param(&self) -> Option<&str> {
        non_blank(self.origin_country.as_deref())
    }
}

/// Provider genre id for Animation
pub const ANIMATION_GENRE_ID: &str = "16";

/// What the user asked for: a free-text term or a filter set
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryDescriptor {
    Search(String),
    Filters(FilterSet),
}

impl QueryDescriptor {
    /// Trimmed search term, if the descriptor carries a non-empty one
    pub fn search_term(&self) -> Option<&str> {
        match self {
            QueryDescriptor::Search(term) => non_blank(Some(term.as_str())),
            QueryDescriptor::Filters(_) => None,
        }
    }
}

impl Default for QueryDescriptor {
    fn default() -> Self {
        QueryDescriptor::Filters(FilterSet::default())
    }
}

impl From<FilterSet> for QueryDescriptor {
    fn from(filters: FilterSet) -> Self {
        QueryDescriptor::Filters(filters)
    }
}

impl From<&str> for QueryDescriptor {
    fn from(term: &str) -> Self {
        QueryDescriptor::Search(term.to_string())
    }
}

impl From<String> for QueryDescriptor {
    fn from(term: String) -> Self {
        QueryDescriptor::Search(term)
    }
}

/// Which list a view browses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Catalog {
    Movies,
    Tv,
    /// Mixed movie/show search results; has no discover counterpart
    Multi,
}

impl Catalog {
    /// Media kind items default to when the payload carries no discriminator
    pub fn default_kind(&self) -> MediaKind {
        match self {
            Catalog::Movies | Catalog::Multi => MediaKind::Movie,
            Catalog::Tv => MediaKind::Tv,
        }
    }
}

impl From<MediaKind> for Catalog {
    fn from(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Movie => Catalog::Movies,
            MediaKind::Tv => Catalog::Tv,
        }
    }
}

// =============================================================================
// Details
// =============================================================================

/// Genre id/name pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

/// Detailed movie information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieDetail {
    pub id: u64,
    pub imdb_id: Option<String>,
    pub title: String,
    pub tagline: Option<String>,
    pub release_date: Option<String>,
    pub runtime: Option<u32>,
    pub genres: Vec<Genre>,
    pub overview: String,
    pub vote_average: f32,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
}

impl fmt::Display for MovieDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let year = self.release_date.as_deref().and_then(extract_year);
        let runtime = self.runtime.unwrap_or(0);
        write!(
            f,
            "{} ({}) - {}h {}m - {:.1}/10",
            self.title,
            year.map(|y| y.to_string()).unwrap_or_else(|| "?".to_string()),
            runtime / 60,
            runtime % 60,
            self.vote_average
        )
    }
}

/// Summary of a TV season (used in TvDetail)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonSummary {
    pub season_number: u16,
    pub episode_count: u16,
    pub name: Option<String>,
    pub air_date: Option<String>,
}

impl SeasonSummary {
    /// Season 0 holds specials
    pub fn is_specials(&self) -> bool {
        self.season_number == 0
    }
}

impl fmt::Display for SeasonSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name.as_deref().unwrap_or("Season");
        write!(
            f,
            "{} {} ({} episodes)",
            name, self.season_number, self.episode_count
        )
    }
}

/// Detailed TV show information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TvDetail {
    pub id: u64,
    pub name: String,
    pub tagline: Option<String>,
    pub first_air_date: Option<String>,
    pub number_of_seasons: u16,
    pub number_of_episodes: u32,
    pub seasons: Vec<SeasonSummary>,
    pub genres: Vec<Genre>,
    pub overview: String,
    pub vote_average: f32,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
}

impl TvDetail {
    /// Seasons excluding specials
    pub fn regular_seasons(&self) -> impl Iterator<Item = &SeasonSummary> {
        self.seasons.iter().filter(|s| !s.is_specials())
    }
}

impl fmt::Display for TvDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let year = self.first_air_date.as_deref().and_then(extract_year);
        write!(
            f,
            "{} ({}) - {} seasons - {:.1}/10",
            self.name,
            year.map(|y| y.to_string()).unwrap_or_else(|| "?".to_string()),
            self.number_of_seasons,
            self.vote_average
        )
    }
}

/// Cast credit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
    #[serde(default)]
    pub order: Option<u32>,
}

/// Crew credit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub job: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
}

/// Cast and crew of a movie or show
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

impl Credits {
    /// Crew members credited with the given job (e.g. "Director")
    pub fn with_job<'a>(&'a self, job: &'a str) -> impl Iterator<Item = &'a CrewMember> + 'a {
        self.crew
            .iter()
            .filter(move |c| c.job.as_deref() == Some(job))
    }
}

/// TV episode information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    pub season_number: u16,
    pub episode_number: u16,
    pub name: String,
    pub overview: String,
    pub air_date: Option<String>,
    pub runtime: Option<u32>,
    pub still_path: Option<String>,
    pub vote_average: f32,
}

impl fmt::Display for Episode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "S{:02}E{:02} - {}",
            self.season_number, self.episode_number, self.name
        )
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Extract year from a date string like "2022-03-04"
pub fn extract_year(date: &str) -> Option<u16> {
    date.get(..4).and_then(|y| y.parse().ok())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
