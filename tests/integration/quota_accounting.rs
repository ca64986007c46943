//! Quota accounting contract tests
//!
//! The ledger must reflect only confirmed successful remote calls: failed
//! calls never charge, and a local pre-check failure never reaches the
//! remote side at all.

use crate::support::mock_api::{video, MockApi, Scripted};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use youtube_data_extractor::client::{SearchOrder, VideoApi};
use youtube_data_extractor::extract::VideoCollector;

#[tokio::test]
async fn failed_calls_do_not_charge_the_ledger() {
    let api = Arc::new(MockApi::new(10_000));
    api.script_page("q", vec![video("a", "UC1")], Some("page2"));
    api.script_error("q", Scripted::Transport("connection reset".to_string()));

    let collector = VideoCollector::new(api.clone());
    let outcome = collector.collect("q", 100, SearchOrder::Date).await;

    // One successful page, one failed page: exactly one charge.
    assert_eq!(api.search_calls.load(Ordering::SeqCst), 2);
    assert_eq!(api.usage().used, 100);
    assert_eq!(api.usage().requests, 1);
    assert_eq!(outcome.videos.len(), 1);
}

#[tokio::test]
async fn local_pre_check_blocks_without_contacting_remote() {
    // 50 units cannot cover a 100-unit search.
    let api = Arc::new(MockApi::new(50));

    let collector = VideoCollector::new(api.clone());
    let outcome = collector.collect("q", 100, SearchOrder::Date).await;

    assert!(outcome.is_quota_blocked());
    assert!(outcome.videos.is_empty());
    assert_eq!(api.search_calls.load(Ordering::SeqCst), 0);
    assert_eq!(api.usage().used, 0);
}

#[tokio::test]
async fn remote_quota_rejection_leaves_ledger_uncharged() {
    // The local ledger thinks budget remains; the remote side disagrees.
    // The remote signal wins and the ledger stays untouched.
    let api = Arc::new(MockApi::new(10_000));
    api.script_error("q", Scripted::RemoteQuota);

    let collector = VideoCollector::new(api.clone());
    let outcome = collector.collect("q", 100, SearchOrder::Date).await;

    assert!(outcome.is_quota_blocked());
    assert_eq!(api.usage().used, 0);
    assert_eq!(api.usage().requests, 0);
}

#[tokio::test]
async fn detail_fetches_charge_one_unit_each() {
    let api = Arc::new(MockApi::new(10_000));

    let details = api
        .fetch_video_details(&["a".to_string(), "b".to_string()])
        .await
        .unwrap();
    assert_eq!(details.len(), 2);
    assert_eq!(api.usage().used, 1);

    api.fetch_channel_details(&["UC1".to_string()]).await.unwrap();
    assert_eq!(api.usage().used, 2);
    assert_eq!(api.usage().requests, 2);
}

#[tokio::test]
async fn empty_detail_requests_are_free() {
    let api = Arc::new(MockApi::new(10_000));
    let details = api.fetch_video_details(&[]).await.unwrap();
    assert!(details.is_empty());
    assert_eq!(api.usage().used, 0);
}
