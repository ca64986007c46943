//! Pagination driver behavior

use crate::support::mock_api::{video, videos, MockApi, Scripted};
use std::sync::Arc;
use youtube_data_extractor::client::SearchOrder;
use youtube_data_extractor::extract::{QueryTermination, VideoCollector};
use youtube_data_extractor::VideoRecord;

#[tokio::test]
async fn output_is_capped_at_target_even_on_overshoot() {
    let api = Arc::new(MockApi::new(10_000));
    api.script_page("q", videos("a", 50, &["UC1"]), Some("p2"));
    // The platform ignores the smaller page size and overshoots.
    api.script_page("q", videos("b", 50, &["UC1"]), Some("p3"));

    let collector = VideoCollector::new(api.clone());
    let outcome = collector.collect("q", 75, SearchOrder::Date).await;

    assert_eq!(outcome.videos.len(), 75);
    assert!(matches!(outcome.termination, QueryTermination::Exhausted));

    // The driver asked for exactly what it still needed.
    let sizes = api.requested_page_sizes.lock().unwrap().clone();
    assert_eq!(sizes, vec![50, 25]);
}

#[tokio::test]
async fn records_without_video_id_are_dropped() {
    let api = Arc::new(MockApi::new(10_000));
    let mut items = vec![video("a", "UC1")];
    items.push(VideoRecord {
        video_id: String::new(),
        title: "no id".to_string(),
        description: String::new(),
        published_at: String::new(),
        channel_title: String::new(),
        channel_id: "UC1".to_string(),
    });
    items.push(video("b", "UC2"));
    api.script_page("q", items, None);

    let collector = VideoCollector::new(api);
    let outcome = collector.collect("q", 50, SearchOrder::Date).await;

    assert_eq!(outcome.videos.len(), 2);
    assert!(outcome.videos.iter().all(VideoRecord::has_video_id));
}

#[tokio::test]
async fn missing_page_token_means_exhausted() {
    let api = Arc::new(MockApi::new(10_000));
    api.script_page("q", videos("a", 30, &["UC1"]), None);

    let collector = VideoCollector::new(api.clone());
    let outcome = collector.collect("q", 100, SearchOrder::Date).await;

    assert_eq!(outcome.videos.len(), 30);
    assert!(matches!(outcome.termination, QueryTermination::Exhausted));
    assert_eq!(*api.requested_page_sizes.lock().unwrap(), vec![50]);
}

#[tokio::test]
async fn empty_page_means_exhausted() {
    let api = Arc::new(MockApi::new(10_000));
    api.script_page("q", Vec::new(), Some("p2"));

    let collector = VideoCollector::new(api);
    let outcome = collector.collect("q", 100, SearchOrder::Date).await;

    assert!(outcome.videos.is_empty());
    assert!(matches!(outcome.termination, QueryTermination::Exhausted));
}

#[tokio::test]
async fn quota_exhaustion_between_pages_keeps_partial_results() {
    // 150 units: page one fits, the pre-check for page two fails.
    let api = Arc::new(MockApi::new(150));
    api.script_page("q", videos("a", 50, &["UC1"]), Some("p2"));

    let collector = VideoCollector::new(api.clone());
    let outcome = collector.collect("q", 100, SearchOrder::Date).await;

    assert!(outcome.is_quota_blocked());
    assert_eq!(outcome.videos.len(), 50);
    assert_eq!(api.usage().used, 100);
}

#[tokio::test]
async fn transport_failure_surfaces_with_partial_results() {
    let api = Arc::new(MockApi::new(10_000));
    api.script_page("q", videos("a", 50, &["UC1"]), Some("p2"));
    api.script_error("q", Scripted::Transport("timeout".to_string()));

    let collector = VideoCollector::new(api);
    let outcome = collector.collect("q", 100, SearchOrder::Date).await;

    assert_eq!(outcome.videos.len(), 50);
    match outcome.termination {
        QueryTermination::Failed(message) => assert!(message.contains("timeout")),
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn target_already_met_issues_no_calls() {
    let api = Arc::new(MockApi::new(10_000));

    let collector = VideoCollector::new(api.clone());
    let outcome = collector.collect("q", 0, SearchOrder::Date).await;

    assert!(outcome.videos.is_empty());
    assert!(matches!(outcome.termination, QueryTermination::Exhausted));
    assert_eq!(api.usage().used, 0);
}
