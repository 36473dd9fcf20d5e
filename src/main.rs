//! cinegrid - browse movies and TV shows from TMDB
//!
//! # Usage
//!
//! ```bash
//! cinegrid search "blade runner"
//! cinegrid discover -t tv --genre 16 --country JP --pages 2
//! cinegrid watch-url 1396 -t tv --season 2 --episode 5
//! ```

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cinegrid::cli::{Cli, Command, ExitCode, Output};
use cinegrid::commands;
use cinegrid::config::Config;

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    run_cli(cli).await.into()
}

/// Run CLI command and return exit code
async fn run_cli(cli: Cli) -> ExitCode {
    let output = Output::new(&cli);

    // The config command edits the file itself and must not see env overrides
    let command = match cli.command {
        Command::Config(cmd) => return commands::config_cmd(cmd, cli.config.as_deref(), &output),
        command => command,
    };

    let config = match cli.config.as_deref() {
        Some(path) => match Config::load_from(path) {
            Ok(config) => config,
            Err(e) => return output.error(format!("{:#}", e), ExitCode::Error),
        },
        None => Config::load(),
    };
    tracing::debug!(base_url = config.api_base_url(), "config loaded");

    match command {
        Command::Search(cmd) => commands::search_cmd(cmd, &config, &output).await,

        Command::Discover(cmd) => commands::discover_cmd(cmd, &config, &output).await,

        Command::Anime(cmd) => commands::anime_cmd(cmd, &config, &output).await,

        Command::Trending(cmd) => commands::trending_cmd(cmd, &config, &output).await,

        Command::Popular(cmd) => commands::popular_cmd(cmd, &config, &output).await,

        Command::TopRated(cmd) => commands::top_rated_cmd(cmd, &config, &output).await,

        Command::Upcoming(cmd) => commands::upcoming_cmd(cmd, &config, &output).await,

        Command::Info(cmd) => commands::info_cmd(cmd, &config, &output).await,

        Command::Credits(cmd) => commands::credits_cmd(cmd, &config, &output).await,

        Command::Recommendations(cmd) => {
            commands::recommendations_cmd(cmd, &config, &output).await
        }

        Command::Episodes(cmd) => commands::episodes_cmd(cmd, &config, &output).await,

        Command::Genres(cmd) => commands::genres_cmd(cmd, &config, &output).await,

        Command::WatchUrl(cmd) => commands::watch_url_cmd(cmd, &config, &output),

        Command::ImageUrl(cmd) => commands::image_url_cmd(cmd, &config, &output),

        Command::Config(_) => ExitCode::Success,
    }
}
