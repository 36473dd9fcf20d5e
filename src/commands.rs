//! CLI Command Handlers
//!
//! Implements all CLI commands by calling the TMDB client or the pager.
//! Each handler takes CLI args, the loaded config and Output, returns ExitCode.

use serde::Serialize;
use std::path::Path;

use crate::api::{TmdbClient, TmdbError};
use crate::cli::{
    AnimeCmd, ConfigCmd, CreditsCmd, DiscoverCmd, EpisodesCmd, ExitCode, GenresCmd,
    ImageUrlCmd, InfoCmd, ListCmd, Output, SearchCmd, TrendingCmd, UpcomingCmd, WatchUrlCmd,
};
use crate::config::Config;
use crate::links::image_url;
use crate::models::{
    CastMember, Catalog, CrewMember, FilterSet, Item, MediaKind, QueryDescriptor, ResultPage,
};
use crate::pager::{AggregationState, Aggregator, PageOutcome, Snapshot};

// =============================================================================
// Shared Plumbing
// =============================================================================

/// Build a client or report that the token is missing
fn client(config: &Config, output: &Output) -> Result<TmdbClient, ExitCode> {
    TmdbClient::from_config(config).map_err(|e| {
        output.error(
            format!("{}. Set TMDB_API_TOKEN or run `cinegrid config --token <TOKEN>`", e),
            ExitCode::NotConfigured,
        )
    })
}

/// Print data, mapping serialization failures to a general error
fn emit<T: Serialize>(output: &Output, data: T) -> ExitCode {
    match output.print(data) {
        Ok(()) => ExitCode::Success,
        Err(e) => output.error(format!("Failed to serialize: {}", e), ExitCode::Error),
    }
}

fn fail(output: &Output, context: &str, err: TmdbError) -> ExitCode {
    output.error(format!("{}: {}", context, err), err.category().into())
}

/// Reset to `query`, then keep loading until `pages` pages are in or the list ends
pub async fn collect_pages(
    client: &TmdbClient,
    catalog: Catalog,
    query: QueryDescriptor,
    pages: u32,
) -> AggregationState {
    let aggregator = Aggregator::new(client);
    let mut state = AggregationState::new(catalog);

    aggregator.reset(&mut state, query).await;
    while state.current_page() < pages && state.has_more() {
        if let PageOutcome::Failed(_) = aggregator.load_more(&mut state).await {
            break;
        }
    }
    state
}

/// Print an aggregated listing; a failure after some pages loaded still prints them
fn emit_listing(output: &Output, state: &AggregationState, limit: Option<usize>) -> ExitCode {
    let mut snapshot: Snapshot = state.snapshot();
    if let Some(limit) = limit {
        snapshot.items.truncate(limit);
    }

    match (state.last_error(), state.items().is_empty()) {
        (Some(failure), true) => output.error(
            format!("Loading page {} failed: {}", failure.page, failure.message),
            failure.category.into(),
        ),
        (Some(failure), false) => {
            output.info(format!(
                "Stopped after page {}: {}",
                state.current_page(),
                failure.message
            ));
            let code = emit(output, &snapshot);
            if code == ExitCode::Success {
                failure.category.into()
            } else {
                code
            }
        }
        (None, _) => emit(output, &snapshot),
    }
}

fn emit_page(output: &Output, context: &str, result: Result<ResultPage<Item>, TmdbError>) -> ExitCode {
    match result {
        Ok(page) => emit(output, &page),
        Err(e) => fail(output, context, e),
    }
}

// =============================================================================
// Listing Commands
// =============================================================================

pub async fn search_cmd(cmd: SearchCmd, config: &Config, output: &Output) -> ExitCode {
    if cmd.query.trim().is_empty() {
        return output.error("Search query must not be empty", ExitCode::InvalidArgs);
    }

    let client = match client(config, output) {
        Ok(c) => c,
        Err(code) => return code,
    };
    output.info(format!("Searching for: {}", cmd.query));

    let state = collect_pages(
        &client,
        cmd.media_type.into(),
        QueryDescriptor::Search(cmd.query),
        cmd.pages,
    )
    .await;
    emit_listing(output, &state, cmd.limit)
}

pub async fn discover_cmd(cmd: DiscoverCmd, config: &Config, output: &Output) -> ExitCode {
    let client = match client(config, output) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let filters = FilterSet {
        genre: cmd.genre,
        sort_by: cmd.sort,
        year: cmd.year,
        origin_country: cmd.country,
    };
    let kind: MediaKind = cmd.media_type.into();
    let order = filters.sort_by.unwrap_or_default();
    output.info(format!("Discovering {}s, {}...", kind, order.label()));

    let state = collect_pages(&client, kind.into(), filters.into(), cmd.pages).await;
    emit_listing(output, &state, cmd.limit)
}

pub async fn anime_cmd(cmd: AnimeCmd, config: &Config, output: &Output) -> ExitCode {
    let client = match client(config, output) {
        Ok(c) => c,
        Err(code) => return code,
    };

    output.info("Fetching anime...");
    let state = collect_pages(&client, Catalog::Tv, FilterSet::anime().into(), cmd.pages).await;
    emit_listing(output, &state, cmd.limit)
}

pub async fn trending_cmd(cmd: TrendingCmd, config: &Config, output: &Output) -> ExitCode {
    let client = match client(config, output) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let result = client
        .trending(cmd.media_type.into(), cmd.window.into(), cmd.page)
        .await;
    emit_page(output, "Trending fetch failed", result)
}

pub async fn popular_cmd(cmd: ListCmd, config: &Config, output: &Output) -> ExitCode {
    let client = match client(config, output) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let result = client.popular(cmd.media_type.into(), cmd.page).await;
    emit_page(output, "Popular fetch failed", result)
}

pub async fn top_rated_cmd(cmd: ListCmd, config: &Config, output: &Output) -> ExitCode {
    let client = match client(config, output) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let result = client.top_rated(cmd.media_type.into(), cmd.page).await;
    emit_page(output, "Top rated fetch failed", result)
}

pub async fn upcoming_cmd(cmd: UpcomingCmd, config: &Config, output: &Output) -> ExitCode {
    let client = match client(config, output) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let result = client.upcoming_movies(cmd.page).await;
    emit_page(output, "Upcoming fetch failed", result)
}

// =============================================================================
// Detail Commands
// =============================================================================

pub async fn info_cmd(cmd: InfoCmd, config: &Config, output: &Output) -> ExitCode {
    let client = match client(config, output) {
        Ok(c) => c,
        Err(code) => return code,
    };

    output.info(format!("Getting info for: {}", cmd.id));

    match MediaKind::from(cmd.media_type) {
        MediaKind::Movie => match client.movie_detail(cmd.id).await {
            Ok(detail) => {
                output.info(&detail);
                emit(output, &detail)
            }
            Err(e) => fail(output, "Movie info failed", e),
        },
        MediaKind::Tv => match client.tv_detail(cmd.id).await {
            Ok(detail) => {
                output.info(&detail);
                emit(output, &detail)
            }
            Err(e) => fail(output, "TV info failed", e),
        },
    }
}

#[derive(Serialize)]
struct CreditsSummary<'a> {
    cast: &'a [CastMember],
    directors: Vec<&'a CrewMember>,
    creators: Vec<&'a CrewMember>,
}

pub async fn credits_cmd(cmd: CreditsCmd, config: &Config, output: &Output) -> ExitCode {
    let client = match client(config, output) {
        Ok(c) => c,
        Err(code) => return code,
    };

    match client.credits(cmd.media_type.into(), cmd.id).await {
        Ok(credits) => {
            let cast = &credits.cast[..credits.cast.len().min(cmd.limit)];
            let summary = CreditsSummary {
                cast,
                directors: credits.with_job("Director").collect(),
                creators: credits.with_job("Creator").collect(),
            };
            emit(output, &summary)
        }
        Err(e) => fail(output, "Credits fetch failed", e),
    }
}

pub async fn recommendations_cmd(cmd: InfoCmd, config: &Config, output: &Output) -> ExitCode {
    let client = match client(config, output) {
        Ok(c) => c,
        Err(code) => return code,
    };

    match client.recommendations(cmd.media_type.into(), cmd.id).await {
        Ok(items) => emit(output, &items),
        Err(e) => fail(output, "Recommendations fetch failed", e),
    }
}

pub async fn episodes_cmd(cmd: EpisodesCmd, config: &Config, output: &Output) -> ExitCode {
    let client = match client(config, output) {
        Ok(c) => c,
        Err(code) => return code,
    };

    output.info(format!("Season {} of show {}", cmd.season, cmd.show_id));
    match client.season_episodes(cmd.show_id, cmd.season).await {
        Ok(episodes) => emit(output, &episodes),
        Err(e) => fail(output, "Episodes fetch failed", e),
    }
}

pub async fn genres_cmd(cmd: GenresCmd, config: &Config, output: &Output) -> ExitCode {
    let client = match client(config, output) {
        Ok(c) => c,
        Err(code) => return code,
    };

    match client.genres(cmd.media_type.into()).await {
        Ok(genres) => emit(output, &genres),
        Err(e) => fail(output, "Genre list fetch failed", e),
    }
}

// =============================================================================
// Link Commands
// =============================================================================

pub fn watch_url_cmd(cmd: WatchUrlCmd, config: &Config, output: &Output) -> ExitCode {
    let Some(templates) = config.embed_templates() else {
        return output.error(
            "Player URLs are not configured. Set MOVIE_EMBED_URL and TV_EMBED_URL",
            ExitCode::NotConfigured,
        );
    };

    let kind: MediaKind = cmd.media_type.into();
    if kind == MediaKind::Movie && (cmd.season.is_some() || cmd.episode.is_some()) {
        return output.error(
            "--season/--episode only apply to TV shows",
            ExitCode::InvalidArgs,
        );
    }

    let url = templates.url(kind, cmd.id, cmd.season, cmd.episode);
    match output.print_line(&url) {
        Ok(()) => ExitCode::Success,
        Err(e) => output.error(format!("Failed to serialize: {}", e), ExitCode::Error),
    }
}

pub fn image_url_cmd(cmd: ImageUrlCmd, config: &Config, output: &Output) -> ExitCode {
    let url = image_url(config.image_base_url(), Some(&cmd.path), cmd.size.into());
    match output.print_line(&url) {
        Ok(()) => ExitCode::Success,
        Err(e) => output.error(format!("Failed to serialize: {}", e), ExitCode::Error),
    }
}

// =============================================================================
// Config Command
// =============================================================================

/// Config with the token masked, for display
#[derive(Serialize)]
struct ConfigView {
    path: String,
    api_token: Option<String>,
    api_base_url: String,
    image_base_url: String,
    movie_embed_url: Option<String>,
    tv_embed_url: Option<String>,
}

fn mask(token: &str) -> String {
    let skip = token.chars().count().saturating_sub(4);
    format!("****{}", token.chars().skip(skip).collect::<String>())
}

pub fn config_cmd(cmd: ConfigCmd, path: Option<&Path>, output: &Output) -> ExitCode {
    let Some(path) = path.map(Path::to_path_buf).or_else(Config::path) else {
        return output.error("Could not determine config path", ExitCode::Error);
    };

    let mut config = match Config::read_file(&path) {
        Ok(c) => c,
        Err(e) => return output.error(format!("{:#}", e), ExitCode::Error),
    };

    if !cmd.is_show() {
        if cmd.token.is_some() {
            config.api_token = cmd.token;
        }
        if cmd.base_url.is_some() {
            config.api_base_url = cmd.base_url;
        }
        if cmd.image_base_url.is_some() {
            config.image_base_url = cmd.image_base_url;
        }
        if cmd.movie_embed_url.is_some() {
            config.movie_embed_url = cmd.movie_embed_url;
        }
        if cmd.tv_embed_url.is_some() {
            config.tv_embed_url = cmd.tv_embed_url;
        }
        if let Err(e) = config.save_to(&path) {
            return output.error(format!("{:#}", e), ExitCode::Error);
        }
        output.info(format!("Saved {}", path.display()));
    }

    let view = ConfigView {
        path: path.display().to_string(),
        api_token: config.api_token.as_deref().map(mask),
        api_base_url: config.api_base_url().to_string(),
        image_base_url: config.image_base_url().to_string(),
        movie_embed_url: config.movie_embed_url.clone(),
        tv_embed_url: config.tv_embed_url.clone(),
    };
    emit(output, &view)
}
