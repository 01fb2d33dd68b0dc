//! End-to-end tests for the home feed: a mock content API served over HTTP,
//! the real HTTP client, and the aggregator on top.
//!
//! Each test starts its own mock server. Requests to unmounted paths get a 404,
//! which the aggregator must treat like any other failed episode lookup.

use anifeed::api::{ApiError, HttpContentApi};
use anifeed::feed::{AggregationError, FeedAggregator, HomeFeed};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn catalog_entry(i: usize) -> Value {
    json!({
        "id": format!("title-{}", i),
        "slug": format!("title-{}", i),
        "title": format!("Title {}", i),
        "genres": if i % 2 == 0 { json!(["Action", "Fantasy"]) } else { json!("Comedy, Action") },
        "tvInfo": { "sub": "12", "showType": "TV" }
    })
}

async fn mount_catalog(server: &MockServer, count: usize) {
    let results: Vec<Value> = (0..count).map(catalog_entry).collect();
    Mock::given(method("GET"))
        .and(path("/api/anime"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "success": true, "results": results })),
        )
        .mount(server)
        .await;
}

async fn mount_episodes(server: &MockServer, slug: &str, numbers: &[u32]) {
    let episodes: Vec<Value> = numbers
        .iter()
        .map(|n| json!({ "episode_no": n, "title": format!("Episode {}", n) }))
        .collect();
    Mock::given(method("GET"))
        .and(path(format!("/api/episodes/{}", slug)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "results": { "episodes": episodes }
        })))
        .mount(server)
        .await;
}

fn aggregator_for(server: &MockServer) -> FeedAggregator {
    let api = HttpContentApi::new(&server.uri()).unwrap();
    FeedAggregator::new(Arc::new(api)).with_concurrency(4)
}

fn latest_numbers(feed: &HomeFeed) -> Vec<Option<u32>> {
    feed.latest_episode
        .iter()
        .map(|e| e.latest_episode.as_ref().map(|ep| ep.number))
        .collect()
}

#[tokio::test]
async fn test_home_feed_with_mixed_episode_outcomes() {
    let server = MockServer::start().await;
    mount_catalog(&server, 4).await;
    mount_episodes(&server, "title-0", &[1, 2, 3]).await;
    // title-1: nothing mounted, lookup gets a 404
    Mock::given(method("GET"))
        .and(path("/api/episodes/title-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": false })))
        .mount(&server)
        .await;
    mount_episodes(&server, "title-3", &[]).await;

    let feed = aggregator_for(&server).build_home_feed().await.unwrap();

    assert_eq!(feed.spotlights.len(), 4);
    assert_eq!(feed.spotlights[0].title, "Title 0");
    assert_eq!(feed.spotlights[0].tv_info.show_type.as_deref(), Some("TV"));
    assert_eq!(latest_numbers(&feed), vec![Some(3), None, None, None]);

    let genres: Vec<&str> = feed.genres.iter().map(String::as_str).collect();
    assert_eq!(genres, vec!["Action", "Comedy", "Fantasy"]);
}

#[tokio::test]
async fn test_home_feed_windows_over_large_catalog() {
    let server = MockServer::start().await;
    mount_catalog(&server, 30).await;
    for i in 0..30 {
        mount_episodes(&server, &format!("title-{}", i), &[i as u32 + 1]).await;
    }

    let feed = aggregator_for(&server).build_home_feed().await.unwrap();

    assert_eq!(feed.spotlights.len(), HomeFeed::SPOTLIGHTS);
    assert_eq!(feed.trending.len(), HomeFeed::TRENDING);
    assert_eq!(feed.top_ten.len(), HomeFeed::TOP_LISTS);
    assert_eq!(feed.latest_completed[0].id, "title-20");
    assert_eq!(feed.latest_episode.len(), HomeFeed::LATEST_EPISODES);
    assert_eq!(feed.latest_episode[0].item.id, "title-18");
    assert_eq!(
        feed.latest_episode[11].latest_episode.as_ref().map(|e| e.number),
        Some(30)
    );
}

#[tokio::test]
async fn test_catalog_failure_skips_episode_lookups() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/anime"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/episodes/title-0"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = aggregator_for(&server).build_home_feed().await;
    assert!(matches!(
        result,
        Err(AggregationError::Catalog(ApiError::HttpStatus(503)))
    ));
}

#[tokio::test]
async fn test_catalog_reporting_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/anime"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "success": false, "results": [] })),
        )
        .mount(&server)
        .await;

    let result = aggregator_for(&server).build_home_feed().await;
    assert!(matches!(
        result,
        Err(AggregationError::Catalog(ApiError::Format(_)))
    ));
}

#[tokio::test]
async fn test_empty_catalog_builds_empty_feed() {
    let server = MockServer::start().await;
    mount_catalog(&server, 0).await;

    let feed = aggregator_for(&server).build_home_feed().await.unwrap();
    assert_eq!(feed, HomeFeed::default());
}

#[tokio::test]
async fn test_cancel_during_episode_lookups() {
    let server = MockServer::start().await;
    mount_catalog(&server, 3).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/api/episodes/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "results": { "episodes": [] } }))
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;

    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let started = std::time::Instant::now();
    let result = aggregator_for(&server).build_home_feed_with(&token).await;
    assert!(matches!(result, Err(AggregationError::Cancelled)));
    assert!(started.elapsed() < Duration::from_secs(5));
}
