//! CLI Command Tests
//!
//! Argument parsing plus command handlers run against a mocked TMDB server.
//! Covers exit codes and input validation.

// =============================================================================
// CLI Argument Parsing Tests
// =============================================================================

mod cli_parsing {
    use clap::Parser;
    use cinegrid::cli::{
        Cli, Command, MediaTypeFilter, SearchScope, SizeArg, TrendingWindow,
    };

    #[test]
    fn test_search_with_options() {
        let cli = Cli::parse_from([
            "cinegrid", "search", "batman", "-t", "movie", "--pages", "3", "--limit", "25",
        ]);
        match cli.command {
            Command::Search(cmd) => {
                assert_eq!(cmd.query, "batman");
                assert_eq!(cmd.media_type, SearchScope::Movie);
                assert_eq!(cmd.pages, 3);
                assert_eq!(cmd.limit, Some(25));
            }
            _ => panic!("Expected Search command"),
        }
    }

    #[test]
    fn test_search_alias() {
        let cli = Cli::parse_from(["cinegrid", "s", "alien"]);
        assert!(matches!(cli.command, Command::Search(_)));
    }

    #[test]
    fn test_search_requires_query() {
        assert!(Cli::try_parse_from(["cinegrid", "search"]).is_err());
    }

    #[test]
    fn test_discover_defaults() {
        let cli = Cli::parse_from(["cinegrid", "discover"]);
        match cli.command {
            Command::Discover(cmd) => {
                assert_eq!(cmd.media_type, MediaTypeFilter::Movie);
                assert!(cmd.genre.is_none());
                assert!(cmd.sort.is_none());
                assert!(cmd.year.is_none());
                assert!(cmd.country.is_none());
                assert_eq!(cmd.pages, 1);
            }
            _ => panic!("Expected Discover command"),
        }
    }

    #[test]
    fn test_trending_window() {
        let cli = Cli::parse_from(["cinegrid", "trending", "-t", "tv", "-w", "week"]);
        match cli.command {
            Command::Trending(cmd) => {
                assert_eq!(cmd.media_type, MediaTypeFilter::Tv);
                assert_eq!(cmd.window, TrendingWindow::Week);
                assert_eq!(cmd.page, 1);
            }
            _ => panic!("Expected Trending command"),
        }
    }

    #[test]
    fn test_top_rated_kebab_case() {
        let cli = Cli::parse_from(["cinegrid", "top-rated", "-t", "tv", "-p", "2"]);
        match cli.command {
            Command::TopRated(cmd) => {
                assert_eq!(cmd.media_type, MediaTypeFilter::Tv);
                assert_eq!(cmd.page, 2);
            }
            _ => panic!("Expected TopRated command"),
        }
    }

    #[test]
    fn test_info_requires_numeric_id() {
        assert!(Cli::try_parse_from(["cinegrid", "info", "tt0133093"]).is_err());
        let cli = Cli::parse_from(["cinegrid", "info", "603"]);
        assert!(matches!(cli.command, Command::Info(ref cmd) if cmd.id == 603));
    }

    #[test]
    fn test_episodes_season() {
        let cli = Cli::parse_from(["cinegrid", "episodes", "1396", "--season", "3"]);
        match cli.command {
            Command::Episodes(cmd) => {
                assert_eq!(cmd.show_id, 1396);
                assert_eq!(cmd.season, 3);
            }
            _ => panic!("Expected Episodes command"),
        }
    }

    #[test]
    fn test_watch_url_episode() {
        let cli = Cli::parse_from([
            "cinegrid", "watch-url", "1396", "-t", "tv", "-s", "2", "-e", "5",
        ]);
        match cli.command {
            Command::WatchUrl(cmd) => {
                assert_eq!(cmd.season, Some(2));
                assert_eq!(cmd.episode, Some(5));
            }
            _ => panic!("Expected WatchUrl command"),
        }
    }

    #[test]
    fn test_image_url_size() {
        let cli = Cli::parse_from(["cinegrid", "image-url", "/abc.jpg", "--size", "original"]);
        match cli.command {
            Command::ImageUrl(cmd) => {
                assert_eq!(cmd.path, "/abc.jpg");
                assert_eq!(cmd.size, SizeArg::Original);
            }
            _ => panic!("Expected ImageUrl command"),
        }
    }

    #[test]
    fn test_global_config_path() {
        let cli = Cli::parse_from(["cinegrid", "genres", "--config", "/tmp/c.toml"]);
        assert_eq!(
            cli.config.as_deref(),
            Some(std::path::Path::new("/tmp/c.toml"))
        );
    }
}

// =============================================================================
// Command Handler Tests
// =============================================================================

mod handlers {
    use cinegrid::cli::{
        ConfigCmd, ExitCode, ImageUrlCmd, InfoCmd, MediaTypeFilter, Output, SearchCmd,
        SearchScope, SizeArg, WatchUrlCmd,
    };
    use cinegrid::commands;
    use cinegrid::config::Config;
    use cinegrid::models::{Catalog, QueryDescriptor};
    use mockito::{Matcher, Server};

    fn quiet() -> Output {
        Output {
            json: true,
            quiet: true,
        }
    }

    fn config_for(url: String) -> Config {
        Config {
            api_token: Some("test_token".to_string()),
            api_base_url: Some(url),
            ..Config::default()
        }
    }

    fn search(query: &str) -> SearchCmd {
        SearchCmd {
            query: query.to_string(),
            media_type: SearchScope::Movie,
            pages: 2,
            limit: None,
        }
    }

    #[tokio::test]
    async fn test_missing_token_is_not_configured() {
        let code = commands::search_cmd(search("batman"), &Config::default(), &quiet()).await;
        assert_eq!(code, ExitCode::NotConfigured);
    }

    #[tokio::test]
    async fn test_blank_query_is_invalid() {
        let config = config_for("http://127.0.0.1:9".to_string());
        let code = commands::search_cmd(search("   "), &config, &quiet()).await;
        assert_eq!(code, ExitCode::InvalidArgs);
    }

    #[tokio::test]
    async fn test_blank_query_without_token_is_invalid() {
        let code = commands::search_cmd(search("  "), &Config::default(), &quiet()).await;
        assert_eq!(code, ExitCode::InvalidArgs);
    }

    #[tokio::test]
    async fn test_later_page_failure_keeps_loaded_pages_and_fails() {
        let mut server = Server::new_async().await;
        let page1 = server
            .mock("GET", "/search/movie")
            .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
            .with_status(200)
            .with_body(r#"{"page": 1, "results": [{"id": 1, "title": "Batman"}], "total_pages": 3, "total_results": 3}"#)
            .expect(1)
            .create_async()
            .await;
        let page2 = server
            .mock("GET", "/search/movie")
            .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
            .with_status(500)
            .with_body(r#"{"status_message": "Internal error."}"#)
            .expect(1)
            .create_async()
            .await;
        let page3 = server
            .mock("GET", "/search/movie")
            .match_query(Matcher::UrlEncoded("page".into(), "3".into()))
            .expect(0)
            .create_async()
            .await;

        let config = config_for(server.url());
        let mut cmd = search("batman");
        cmd.pages = 3;
        let code = commands::search_cmd(cmd, &config, &quiet()).await;

        assert_eq!(code, ExitCode::ProviderError);
        page1.assert_async().await;
        page2.assert_async().await;
        page3.assert_async().await;

        // Page 1 stays loaded with the page 2 failure recorded
        let client = cinegrid::TmdbClient::with_base_url("k", server.url());
        let state = commands::collect_pages(
            &client,
            Catalog::Movies,
            QueryDescriptor::Search("batman".to_string()),
            3,
        )
        .await;
        assert_eq!(state.items().len(), 1);
        assert_eq!(state.current_page(), 1);
        assert_eq!(state.last_error().map(|f| f.page), Some(2));
    }

    #[tokio::test]
    async fn test_first_page_failure_keeps_state_empty() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/search/movie")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body(r#"{"status_message": "Internal error."}"#)
            .expect(1)
            .create_async()
            .await;

        let config = config_for(server.url());
        let code = commands::search_cmd(search("batman"), &config, &quiet()).await;
        assert_eq!(code, ExitCode::ProviderError);
        mock.assert_async().await;

        // Nothing loaded, so nothing to print
        let client = cinegrid::TmdbClient::with_base_url("k", server.url());
        let state = commands::collect_pages(
            &client,
            Catalog::Movies,
            QueryDescriptor::Search("batman".to_string()),
            3,
        )
        .await;
        assert!(state.items().is_empty());
        assert_eq!(state.last_error().map(|f| f.page), Some(1));
    }

    #[tokio::test]
    async fn test_search_loads_requested_pages() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/search/movie")
            .match_query(Matcher::UrlEncoded("query".into(), "batman".into()))
            .with_status(200)
            .with_body(r#"{"page": 1, "results": [{"id": 1, "title": "Batman"}], "total_pages": 5, "total_results": 5}"#)
            .expect(2)
            .create_async()
            .await;

        let config = config_for(server.url());
        let code = commands::search_cmd(search("batman"), &config, &quiet()).await;

        assert_eq!(code, ExitCode::Success);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_collect_pages_stops_at_last_page() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/search/multi")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"page": 1, "results": [{"id": 1, "media_type": "movie", "title": "Only"}], "total_pages": 1, "total_results": 1}"#)
            .expect(1)
            .create_async()
            .await;

        let client = cinegrid::TmdbClient::with_base_url("k", server.url());
        let state = commands::collect_pages(
            &client,
            Catalog::Multi,
            QueryDescriptor::Search("only".to_string()),
            10,
        )
        .await;

        mock.assert_async().await;
        assert_eq!(state.items().len(), 1);
        assert!(!state.has_more());
    }

    #[tokio::test]
    async fn test_not_found_maps_to_provider_exit_code() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/movie/1")
            .with_status(404)
            .with_body(r#"{"status_message": "The resource you requested could not be found."}"#)
            .create_async()
            .await;

        let config = config_for(server.url());
        let cmd = InfoCmd {
            id: 1,
            media_type: MediaTypeFilter::Movie,
        };
        assert_eq!(
            commands::info_cmd(cmd, &config, &quiet()).await,
            ExitCode::ProviderError
        );
    }

    #[tokio::test]
    async fn test_unreachable_api_maps_to_network_exit_code() {
        let config = config_for("http://127.0.0.1:9".to_string());
        let cmd = InfoCmd {
            id: 1,
            media_type: MediaTypeFilter::Tv,
        };
        assert_eq!(
            commands::info_cmd(cmd, &config, &quiet()).await,
            ExitCode::NetworkError
        );
    }

    #[test]
    fn test_watch_url_needs_templates() {
        let cmd = WatchUrlCmd {
            id: 603,
            media_type: MediaTypeFilter::Movie,
            season: None,
            episode: None,
        };
        assert_eq!(
            commands::watch_url_cmd(cmd, &Config::default(), &quiet()),
            ExitCode::NotConfigured
        );
    }

    #[test]
    fn test_watch_url_rejects_season_for_movie() {
        let config = Config {
            movie_embed_url: Some("https://player.example/movie/".to_string()),
            tv_embed_url: Some("https://player.example/tv?id=".to_string()),
            ..Config::default()
        };
        let cmd = WatchUrlCmd {
            id: 603,
            media_type: MediaTypeFilter::Movie,
            season: Some(1),
            episode: None,
        };
        assert_eq!(
            commands::watch_url_cmd(cmd, &config, &quiet()),
            ExitCode::InvalidArgs
        );
    }

    #[test]
    fn test_image_url_succeeds_without_token() {
        let cmd = ImageUrlCmd {
            path: "/abc.jpg".to_string(),
            size: SizeArg::W300,
        };
        assert_eq!(
            commands::image_url_cmd(cmd, &Config::default(), &quiet()),
            ExitCode::Success
        );
    }

    #[test]
    fn test_config_cmd_writes_only_given_fields() {
        let dir = std::env::temp_dir().join(format!("cinegrid-cli-test-{}", std::process::id()));
        let path = dir.join("config.toml");

        let set_token = ConfigCmd {
            token: Some("abc123".to_string()),
            ..ConfigCmd::default()
        };
        assert_eq!(
            commands::config_cmd(set_token, Some(&path), &quiet()),
            ExitCode::Success
        );

        let set_url = ConfigCmd {
            tv_embed_url: Some("https://player.example/tv?id=".to_string()),
            ..ConfigCmd::default()
        };
        commands::config_cmd(set_url, Some(&path), &quiet());

        let saved = Config::read_file(&path).unwrap();
        assert_eq!(saved.api_token.as_deref(), Some("abc123"));
        assert_eq!(saved.tv_embed_url.as_deref(), Some("https://player.example/tv?id="));
        assert!(saved.api_base_url.is_none());

        let _ = std::fs::remove_dir_all(dir);
    }
}
