//! CLI - Command Line Interface for cinegrid
//!
//! Every browsing screen is a subcommand. All output is JSON-parseable.
//!
//! # Examples
//!
//! ```bash
//! # Search movies and shows, two pages deep
//! cinegrid search "batman" --pages 2
//!
//! # Browse animation sorted by rating
//! cinegrid discover -t movie --genre 16 --sort vote_average.desc
//!
//! # Details and episodes
//! cinegrid info 1396 -t tv
//! cinegrid episodes 1396 --season 2
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::api::{ErrorCategory, TimeWindow};
use crate::links::ImageSize;
use crate::models::{Catalog, MediaKind, SortOrder};

// =============================================================================
// Exit Codes
// =============================================================================

/// Exit codes for CLI operations (semantic for scripting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General error
    Error = 1,
    /// Invalid arguments
    InvalidArgs = 2,
    /// Network error (no response)
    NetworkError = 3,
    /// Provider rejected the request or sent a malformed payload
    ProviderError = 4,
    /// Missing credential or player templates
    NotConfigured = 5,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> std::process::ExitCode {
        std::process::ExitCode::from(code as u8)
    }
}

impl From<ErrorCategory> for ExitCode {
    fn from(category: ErrorCategory) -> ExitCode {
        match category {
            ErrorCategory::Network => ExitCode::NetworkError,
            ErrorCategory::Provider => ExitCode::ProviderError,
        }
    }
}

// =============================================================================
// Main CLI Structure
// =============================================================================

/// cinegrid - browse movies and TV shows from TMDB
#[derive(Parser, Debug)]
#[command(
    name = "cinegrid",
    version,
    about = "Browse movies and TV shows from TMDB",
    long_about = "Search, discover and page through movie and TV listings from TMDB.\n\n\
                  Listing commands accept --pages to keep loading more results.\n\
                  Set TMDB_API_TOKEN or run `cinegrid config --token <TOKEN>` first.",
    after_help = "EXAMPLES:\n\
                  cinegrid search \"blade runner\"           Search movies and shows\n\
                  cinegrid discover -t tv --genre 18       Browse TV dramas\n\
                  cinegrid anime --pages 3                 Japanese animation, 3 pages\n\
                  cinegrid info 603 -t movie --json        Movie details as JSON"
)]
pub struct Cli {
    /// Output format as JSON (default for non-TTY)
    #[arg(long, short = 'j', global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Check if JSON output should be used
    pub fn should_json(&self) -> bool {
        self.json || !std::io::stdout().is_terminal()
    }

    /// Default log filter when RUST_LOG is unset
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

// =============================================================================
// Subcommands
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search for movies and TV shows
    #[command(visible_alias = "s")]
    Search(SearchCmd),

    /// Browse titles by genre, year and sort order
    #[command(visible_alias = "d")]
    Discover(DiscoverCmd),

    /// Browse Japanese animated series
    Anime(AnimeCmd),

    /// Get trending content
    #[command(visible_alias = "tr")]
    Trending(TrendingCmd),

    /// Most popular titles
    Popular(ListCmd),

    /// Highest rated titles
    TopRated(ListCmd),

    /// Upcoming movie releases
    Upcoming(UpcomingCmd),

    /// Get details for a movie or show
    #[command(visible_alias = "i")]
    Info(InfoCmd),

    /// Cast and crew of a movie or show
    Credits(CreditsCmd),

    /// Titles similar to a movie or show
    #[command(visible_alias = "recs")]
    Recommendations(InfoCmd),

    /// Episodes of one season of a show
    #[command(visible_alias = "ep")]
    Episodes(EpisodesCmd),

    /// List genre ids and names
    Genres(GenresCmd),

    /// Print the embedded player URL for a movie or episode
    WatchUrl(WatchUrlCmd),

    /// Print the full URL of a poster or backdrop path
    ImageUrl(ImageUrlCmd),

    /// Show or update the config file
    Config(ConfigCmd),
}

/// Media type filter
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaTypeFilter {
    /// Movies only
    #[default]
    Movie,
    /// TV shows only
    Tv,
}

impl From<MediaTypeFilter> for MediaKind {
    fn from(filter: MediaTypeFilter) -> MediaKind {
        match filter {
            MediaTypeFilter::Movie => MediaKind::Movie,
            MediaTypeFilter::Tv => MediaKind::Tv,
        }
    }
}

/// What a search runs against
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchScope {
    /// Movies and TV shows together
    #[default]
    Multi,
    /// Movies only
    Movie,
    /// TV shows only
    Tv,
}

impl From<SearchScope> for Catalog {
    fn from(scope: SearchScope) -> Catalog {
        match scope {
            SearchScope::Multi => Catalog::Multi,
            SearchScope::Movie => Catalog::Movies,
            SearchScope::Tv => Catalog::Tv,
        }
    }
}

// =============================================================================
// Listing Commands
// =============================================================================

/// Search for movies and TV shows by query
#[derive(Args, Debug)]
pub struct SearchCmd {
    /// Search query (title, keywords)
    #[arg(required = true)]
    pub query: String,

    /// Restrict to movies or TV shows
    #[arg(long, short = 't', value_enum, default_value = "multi")]
    pub media_type: SearchScope,

    /// Number of pages to load
    #[arg(long, short = 'p', default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub pages: u32,

    /// Maximum number of results to print
    #[arg(long, short = 'l')]
    pub limit: Option<usize>,
}

/// Browse titles with structured filters
#[derive(Args, Debug)]
pub struct DiscoverCmd {
    /// Movies or TV shows
    #[arg(long, short = 't', value_enum, default_value = "movie")]
    pub media_type: MediaTypeFilter,

    /// Genre id (see `cinegrid genres`)
    #[arg(long, short = 'g')]
    pub genre: Option<String>,

    /// Sort order, e.g. popularity.desc, vote_average.desc, release_date.asc
    #[arg(long, short = 's')]
    pub sort: Option<SortOrder>,

    /// Release year (first air year for shows)
    #[arg(long, short = 'y')]
    pub year: Option<u16>,

    /// Origin country code, e.g. JP
    #[arg(long)]
    pub country: Option<String>,

    /// Number of pages to load
    #[arg(long, short = 'p', default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub pages: u32,

    /// Maximum number of results to print
    #[arg(long, short = 'l')]
    pub limit: Option<usize>,
}

/// Japanese animated series, most popular first
#[derive(Args, Debug)]
pub struct AnimeCmd {
    /// Number of pages to load
    #[arg(long, short = 'p', default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub pages: u32,

    /// Maximum number of results to print
    #[arg(long, short = 'l')]
    pub limit: Option<usize>,
}

/// Get trending movies or TV shows
#[derive(Args, Debug)]
pub struct TrendingCmd {
    /// Movies or TV shows
    #[arg(long, short = 't', value_enum, default_value = "movie")]
    pub media_type: MediaTypeFilter,

    /// Time window for trending
    #[arg(long, short = 'w', value_enum, default_value = "day")]
    pub window: TrendingWindow,

    /// Page number
    #[arg(long, short = 'p', default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,
}

/// Time window for trending content
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrendingWindow {
    /// Today's trending
    #[default]
    Day,
    /// This week's trending
    Week,
}

impl From<TrendingWindow> for TimeWindow {
    fn from(window: TrendingWindow) -> TimeWindow {
        match window {
            TrendingWindow::Day => TimeWindow::Day,
            TrendingWindow::Week => TimeWindow::Week,
        }
    }
}

/// One page of a curated list
#[derive(Args, Debug)]
pub struct ListCmd {
    /// Movies or TV shows
    #[arg(long, short = 't', value_enum, default_value = "movie")]
    pub media_type: MediaTypeFilter,

    /// Page number
    #[arg(long, short = 'p', default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,
}

/// Upcoming movie releases
#[derive(Args, Debug)]
pub struct UpcomingCmd {
    /// Page number
    #[arg(long, short = 'p', default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,
}

// =============================================================================
// Detail Commands
// =============================================================================

/// Look up a movie or show by TMDB id
#[derive(Args, Debug)]
pub struct InfoCmd {
    /// TMDB ID
    #[arg(required = true)]
    pub id: u64,

    /// Movies or TV shows
    #[arg(long, short = 't', value_enum, default_value = "movie")]
    pub media_type: MediaTypeFilter,
}

/// Cast and crew lookup
#[derive(Args, Debug)]
pub struct CreditsCmd {
    /// TMDB ID
    #[arg(required = true)]
    pub id: u64,

    /// Movies or TV shows
    #[arg(long, short = 't', value_enum, default_value = "movie")]
    pub media_type: MediaTypeFilter,

    /// Maximum number of cast members to print
    #[arg(long, short = 'l', default_value = "10")]
    pub limit: usize,
}

/// Episodes of a TV season
#[derive(Args, Debug)]
pub struct EpisodesCmd {
    /// TMDB show ID
    #[arg(required = true)]
    pub show_id: u64,

    /// Season number
    #[arg(long, short = 's', default_value = "1")]
    pub season: u16,
}

/// Genre list
#[derive(Args, Debug)]
pub struct GenresCmd {
    /// Movies or TV shows
    #[arg(long, short = 't', value_enum, default_value = "movie")]
    pub media_type: MediaTypeFilter,
}

// =============================================================================
// Link Commands
// =============================================================================

/// Embedded player URL
#[derive(Args, Debug)]
pub struct WatchUrlCmd {
    /// TMDB ID
    #[arg(required = true)]
    pub id: u64,

    /// Movies or TV shows
    #[arg(long, short = 't', value_enum, default_value = "movie")]
    pub media_type: MediaTypeFilter,

    /// Season number (TV only, default 1)
    #[arg(long, short = 's')]
    pub season: Option<u16>,

    /// Episode number (TV only, default 1)
    #[arg(long, short = 'e')]
    pub episode: Option<u16>,
}

/// Image URL for a poster/backdrop path
#[derive(Args, Debug)]
pub struct ImageUrlCmd {
    /// Path as returned by the API, e.g. /74xTEgt7R36Fpooo50r9T25onhq.jpg
    #[arg(required = true)]
    pub path: String,

    /// Rendition size
    #[arg(long, short = 's', value_enum, default_value = "w500")]
    pub size: SizeArg,
}

/// Image rendition size
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeArg {
    W300,
    #[default]
    W500,
    Original,
}

impl From<SizeArg> for ImageSize {
    fn from(size: SizeArg) -> ImageSize {
        match size {
            SizeArg::W300 => ImageSize::W300,
            SizeArg::W500 => ImageSize::W500,
            SizeArg::Original => ImageSize::Original,
        }
    }
}

/// Config file maintenance
#[derive(Args, Debug, Default)]
pub struct ConfigCmd {
    /// TMDB API read access token
    #[arg(long)]
    pub token: Option<String>,

    /// TMDB API base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Image CDN base URL
    #[arg(long)]
    pub image_base_url: Option<String>,

    /// Movie player URL template (id is appended)
    #[arg(long)]
    pub movie_embed_url: Option<String>,

    /// TV player URL template (id, season and episode are appended)
    #[arg(long)]
    pub tv_embed_url: Option<String>,
}

impl ConfigCmd {
    /// True when no field is being changed
    pub fn is_show(&self) -> bool {
        self.token.is_none()
            && self.base_url.is_none()
            && self.image_base_url.is_none()
            && self.movie_embed_url.is_none()
            && self.tv_embed_url.is_none()
    }
}

// =============================================================================
// JSON Output Types
// =============================================================================

/// Generic JSON output wrapper with status
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "is_zero")]
    pub exit_code: i32,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

impl<T: Serialize> JsonOutput<T> {
    /// Create success output with data
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            exit_code: 0,
        }
    }

    /// Create error output (no data)
    pub fn error_msg(msg: impl Into<String>, code: ExitCode) -> JsonOutput<()> {
        JsonOutput::<()> {
            data: None,
            error: Some(msg.into()),
            exit_code: code.into(),
        }
    }
}

// =============================================================================
// Output Helpers
// =============================================================================

/// Output handler for consistent formatting
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

impl Output {
    pub fn new(cli: &Cli) -> Self {
        Self {
            json: cli.should_json(),
            quiet: cli.quiet,
        }
    }

    /// Print success data
    pub fn print<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        if self.json {
            let output = JsonOutput::success(data);
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Ok(())
    }

    /// Print a single line of plain text (URLs)
    pub fn print_line(&self, line: &str) -> anyhow::Result<()> {
        if self.json {
            return self.print(line);
        }
        println!("{}", line);
        Ok(())
    }

    /// Print error and return exit code
    pub fn error(&self, msg: impl Into<String>, code: ExitCode) -> ExitCode {
        let msg = msg.into();
        if self.json {
            let output = JsonOutput::<()>::error_msg(&msg, code);
            if let Ok(json) = serde_json::to_string_pretty(&output) {
                eprintln!("{}", json);
            }
        } else if !self.quiet {
            eprintln!("Error: {}", msg);
        }
        code
    }

    /// Print info message (suppressed in quiet mode)
    pub fn info(&self, msg: impl std::fmt::Display) {
        if !self.quiet && !self.json {
            eprintln!("{}", msg);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
