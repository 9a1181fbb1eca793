//! Integration tests for dataset loading
//!
//! Exercise the typed dataset bindings end to end: URL resolution against a
//! mock raw-content host, season fallback, parsing and row mapping.

use std::time::Duration;

use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nflverse_fetcher::app::cache::CacheMode;
use nflverse_fetcher::app::{ClientConfig, FetchContext, Fetcher, Loader, SeasonWeeks, Selection};
use nflverse_fetcher::config::AppConfig;
use nflverse_fetcher::datasets::team_stats::Summary;
use nflverse_fetcher::datasets::{injuries, players, snap_counts, team_stats};

const PREFIX: &str = "/nflverse/nflverse-data/master/data";

fn loader(server: &MockServer) -> Loader {
    let fetcher = Fetcher::new(&ClientConfig::default(), None).unwrap();
    Loader::new(fetcher).with_raw_host(server.uri())
}

async fn serve(server: &MockServer, route: String, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_string(body.to_string()))
        .expect(1..)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_snap_counts_multi_season_with_fallback() {
    let server = MockServer::start().await;
    serve(
        &server,
        format!("{}/snap_counts/snap_counts_2022.csv", PREFIX),
        200,
        "season,week,team,offense_snaps,player_snaps\n2022,1,kc,60,30\n",
    )
    .await;
    serve(
        &server,
        format!("{}/snap_counts/snap_counts_2023.csv", PREFIX),
        404,
        "404: Not Found",
    )
    .await;
    serve(
        &server,
        format!("{}/snap_counts/snap_counts.csv", PREFIX),
        200,
        "season,week,team,offense_snaps,player_snaps\n2021,2,buf,50,50\n2023,1,det,70,7\n",
    )
    .await;

    let loader = loader(&server);
    let records = snap_counts::load_seasons(&loader, &FetchContext::new(), &[2023, 2022])
        .await
        .unwrap();

    // 2022 first, then the whole base file standing in for 2023
    let seasons: Vec<i32> = records.iter().map(|r| r.season).collect();
    assert_eq!(seasons, vec![2022, 2021, 2023]);
    assert_eq!(records[0].team, "KC");
    assert_eq!(records[0].snap_pct, 50.0);
    assert_eq!(records[2].snap_pct, 10.0);
}

#[tokio::test]
async fn test_players_always_use_base_file() {
    let server = MockServer::start().await;
    serve(
        &server,
        format!("{}/players/players.csv", PREFIX),
        200,
        "gsis_id,display_name,position,height,weight\n00-0033873,Patrick Mahomes,QB,74,225\n",
    )
    .await;

    let players = players::load(&loader(&server), &FetchContext::new())
        .await
        .unwrap();
    assert_eq!(players.len(), 1);
    assert_eq!(players[0].full_name, "Patrick Mahomes");
    assert_eq!(players[0].height, 74);
}

#[tokio::test]
async fn test_team_stats_summary_levels() {
    let server = MockServer::start().await;
    serve(
        &server,
        format!("{}/stats_team/stats_team_reg_2023.csv", PREFIX),
        200,
        "season,season_type,team,passing_yards\n2023,REG,MIA,4514\n",
    )
    .await;
    serve(
        &server,
        format!("{}/stats_team/stats_team_week_2023.csv", PREFIX),
        200,
        "season,week,team,passing_yards\n2023,1,MIA,466\n2023,2,MIA,249\n",
    )
    .await;

    let loader = loader(&server);
    let ctx = FetchContext::new();

    let season = team_stats::load_summary(&loader, &ctx, Summary::Regular, 2023)
        .await
        .unwrap();
    assert_eq!(season.len(), 1);
    assert_eq!(season[0].week, 0);
    assert_eq!(season[0].passing_yards, 4514);

    let weeks = team_stats::load(&loader, &ctx, 2023).await.unwrap();
    assert_eq!(weeks.iter().map(|w| w.week).collect::<Vec<_>>(), vec![1, 2]);
}

#[tokio::test]
async fn test_missing_dataset_reports_not_found() {
    let server = MockServer::start().await;
    serve(&server, format!("{}/injuries/injuries_2024.csv", PREFIX), 404, "").await;
    serve(&server, format!("{}/injuries/injuries.csv", PREFIX), 404, "").await;

    let error = injuries::load(&loader(&server), &FetchContext::new(), 2024)
        .await
        .unwrap_err();
    assert!(error.is_not_found());
}

#[tokio::test]
async fn test_loader_from_config_with_filesystem_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/injuries/injuries_2024.csv", PREFIX)))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "\"inj-2024\"")
                .set_body_string("season,week,team,full_name\n2024,1,SF,Christian McCaffrey\n"),
        )
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let mut config = AppConfig {
        raw_host: server.uri(),
        ..AppConfig::default()
    };
    config.cache.mode = CacheMode::Filesystem;
    config.cache.cache_root = Some(temp_dir.path().to_path_buf());
    config.cache.ttl = Duration::from_secs(600);

    let loader = Loader::from_config(&config).await.unwrap();
    let records = injuries::load(&loader, &FetchContext::new(), 2024).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].full_name, "Christian McCaffrey");

    let cached = std::fs::read_dir(temp_dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "data"))
        .count();
    assert_eq!(cached, 1);
}

#[tokio::test]
async fn test_snap_counts_selection_filters_fallback_rows() {
    let server = MockServer::start().await;
    serve(
        &server,
        format!("{}/snap_counts/snap_counts_2023.csv", PREFIX),
        404,
        "404: Not Found",
    )
    .await;
    serve(
        &server,
        format!("{}/snap_counts/snap_counts.csv", PREFIX),
        200,
        "season,week,team,offense_snaps,player_snaps\n2021,2,buf,50,50\n2023,1,det,70,7\n2023,2,gb,60,6\n",
    )
    .await;

    let loader = loader(&server);
    let selection = Selection::SeasonWeeks(vec![SeasonWeeks::new(2023, [2])]);
    let records = snap_counts::load_selection(&loader, &FetchContext::new(), &selection)
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].team, "GB");
    assert_eq!(records[0].week, 2);
}
