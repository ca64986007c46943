//! Channel aggregation pass behavior

use crate::support::mock_api::{channel_record, videos, MockApi};
use std::collections::BTreeMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use youtube_data_extractor::extract::ChannelCollector;
use youtube_data_extractor::VideoRecord;

fn video_data(records: Vec<VideoRecord>) -> BTreeMap<String, Vec<VideoRecord>> {
    let mut data = BTreeMap::new();
    data.insert("query".to_string(), records);
    data
}

#[tokio::test]
async fn thirty_channels_fit_in_one_batch() {
    // 120 videos referencing 30 distinct channels: exactly one request.
    let api = Arc::new(MockApi::new(10_000));
    let channel_ids: Vec<String> = (0..30).map(|i| format!("UC{i:02}")).collect();
    let channel_refs: Vec<&str> = channel_ids.iter().map(String::as_str).collect();

    let collector = ChannelCollector::new(api.clone());
    let outcome = collector
        .collect(&video_data(videos("v", 120, &channel_refs)))
        .await;

    assert_eq!(api.channel_calls.load(Ordering::SeqCst), 1);
    assert_eq!(outcome.channels.len(), 30);
    assert!(!outcome.quota_blocked);
    assert!(outcome.errors.is_empty());
}

#[tokio::test]
async fn batches_are_sorted_and_sized_at_fifty() {
    let api = Arc::new(MockApi::new(10_000));
    let channel_ids: Vec<String> = (0..60).map(|i| format!("UC{i:02}")).collect();
    let channel_refs: Vec<&str> = channel_ids.iter().map(String::as_str).collect();

    let collector = ChannelCollector::new(api.clone());
    let outcome = collector
        .collect(&video_data(videos("v", 60, &channel_refs)))
        .await;

    assert_eq!(outcome.channels.len(), 60);

    let batches = api.requested_batches.lock().unwrap().clone();
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].len(), 50);
    assert_eq!(batches[1].len(), 10);

    // Lexicographic ID order makes batch membership reproducible.
    let mut expected = channel_ids.clone();
    expected.sort();
    assert_eq!(batches[0], expected[..50]);
    assert_eq!(batches[1], expected[50..]);
}

#[tokio::test]
async fn failed_batch_is_skipped_and_the_next_continues() {
    let api = Arc::new(MockApi::new(10_000));
    let channel_ids: Vec<String> = (0..60).map(|i| format!("UC{i:02}")).collect();
    let channel_refs: Vec<&str> = channel_ids.iter().map(String::as_str).collect();
    api.fail_channel_batch(0);

    let collector = ChannelCollector::new(api.clone());
    let outcome = collector
        .collect(&video_data(videos("v", 60, &channel_refs)))
        .await;

    // First batch lost, second batch collected.
    assert_eq!(api.channel_calls.load(Ordering::SeqCst), 2);
    assert_eq!(outcome.channels.len(), 10);
    assert!(!outcome.quota_blocked);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].contains("batch 1"));
    // The failed call was not charged: one successful batch only.
    assert_eq!(api.usage().used, 1);
}

#[tokio::test]
async fn remote_quota_rejection_stops_the_pass_with_partial_results() {
    let api = Arc::new(MockApi::new(10_000));
    let channel_ids: Vec<String> = (0..120).map(|i| format!("UC{i:03}")).collect();
    let channel_refs: Vec<&str> = channel_ids.iter().map(String::as_str).collect();
    api.quota_block_channel_batch(1);

    let collector = ChannelCollector::new(api.clone());
    let outcome = collector
        .collect(&video_data(videos("v", 120, &channel_refs)))
        .await;

    assert!(outcome.quota_blocked);
    assert_eq!(outcome.channels.len(), 50);
    // The third batch was never attempted.
    assert_eq!(api.channel_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn local_budget_exhaustion_stops_before_the_batch() {
    // 100 units, all consumed by a search before the channel pass runs.
    let api = Arc::new(MockApi::new(100));
    api.script_page("warmup", videos("w", 1, &["UC1"]), None);
    let _ = youtube_data_extractor::extract::VideoCollector::new(api.clone())
        .collect("warmup", 1, youtube_data_extractor::client::SearchOrder::Date)
        .await;
    assert_eq!(api.usage().remaining, 0);

    let collector = ChannelCollector::new(api.clone());
    let outcome = collector.collect(&video_data(videos("v", 5, &["UC1"]))).await;

    assert!(outcome.quota_blocked);
    assert!(outcome.channels.is_empty());
    assert_eq!(api.channel_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn duplicate_platform_responses_are_deduplicated() {
    let api = Arc::new(MockApi::new(10_000));
    api.add_channel(channel_record("UC01", "500"));
    api.duplicate_channel_in_responses("UC01");

    let collector = ChannelCollector::new(api);
    let outcome = collector
        .collect(&video_data(videos("v", 10, &["UC01", "UC02"])))
        .await;

    let uc01_count = outcome
        .channels
        .iter()
        .filter(|c| c.channel_id == "UC01")
        .count();
    assert_eq!(uc01_count, 1);
    assert_eq!(outcome.channels.len(), 2);
}

#[tokio::test]
async fn empty_video_data_issues_no_calls() {
    let api = Arc::new(MockApi::new(10_000));
    let collector = ChannelCollector::new(api.clone());
    let outcome = collector.collect(&BTreeMap::new()).await;

    assert!(outcome.channels.is_empty());
    assert_eq!(api.channel_calls.load(Ordering::SeqCst), 0);
}
