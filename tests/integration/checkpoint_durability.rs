//! Checkpoint persistence and recovery

use crate::support::mock_api::video;
use youtube_data_extractor::campaign::CampaignCheckpoint;

#[test]
fn every_save_leaves_a_parseable_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("extraction_progress.json");

    let mut checkpoint = CampaignCheckpoint::default();
    for i in 0..10 {
        let query = format!("query {i}");
        checkpoint.record_query(
            &query,
            (0..25).map(|j| video(&format!("v{i}-{j}"), "UC1")).collect(),
        );
        checkpoint.save(&path).unwrap();

        // A reader between saves must always see a complete snapshot: the
        // write is temp-file + rename, never an in-place truncate.
        let raw = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            parsed["completed_queries"].as_array().unwrap().len(),
            i + 1
        );
    }
}

#[test]
fn no_stray_temp_files_remain_after_save() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("extraction_progress.json");

    let mut checkpoint = CampaignCheckpoint::default();
    checkpoint.record_query("q", vec![video("a", "UC1")]);
    checkpoint.save(&path).unwrap();

    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    // Only the checkpoint and its lock file.
    assert!(names.contains(&"extraction_progress.json".to_string()));
    assert!(names
        .iter()
        .all(|n| n == "extraction_progress.json" || n == "extraction_progress.lock"));
}

#[test]
fn corrupt_checkpoint_recovers_to_fresh_state() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("extraction_progress.json");

    std::fs::write(&path, r#"{"completed_queries": ["q1"], "video_da"#).unwrap();

    let checkpoint = CampaignCheckpoint::load(&path);
    assert!(checkpoint.completed_queries().is_empty());
    assert_eq!(checkpoint.total_videos(), 0);
}

#[test]
fn wrong_shape_checkpoint_recovers_to_fresh_state() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("extraction_progress.json");

    std::fs::write(&path, r#"{"completed_queries": "not-a-list"}"#).unwrap();

    let checkpoint = CampaignCheckpoint::load(&path);
    assert!(checkpoint.completed_queries().is_empty());
}

#[test]
fn legacy_file_without_last_updated_loads() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("extraction_progress.json");

    std::fs::write(
        &path,
        r#"{
            "completed_queries": ["Vivaldi Gloria"],
            "video_data": {
                "Vivaldi Gloria": [
                    {"videoId": "x", "title": "t", "description": "",
                     "publishedAt": "2024-01-01T00:00:00Z",
                     "channelTitle": "c", "channelId": "UC1"}
                ]
            },
            "last_updated": null
        }"#,
    )
    .unwrap();

    let checkpoint = CampaignCheckpoint::load(&path);
    assert_eq!(checkpoint.completed_queries(), &["Vivaldi Gloria".to_string()]);
    assert_eq!(checkpoint.total_videos(), 1);
    assert!(checkpoint.last_updated().is_none());
}

#[test]
fn retire_removes_checkpoint_and_lock() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("extraction_progress.json");

    let mut checkpoint = CampaignCheckpoint::default();
    checkpoint.record_query("q", vec![]);
    checkpoint.save(&path).unwrap();
    assert!(path.exists());

    CampaignCheckpoint::retire(&path);
    assert!(!path.exists());
    assert!(!path.with_extension("lock").exists());
}
