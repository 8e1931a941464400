//! Merging the older localStorage dump.

mod common;

use common::{test_db, test_slot};
use dropdesk::slot::DailyTracker;
use dropdesk::sync::legacy::{import_legacy, parse_legacy};
use tempfile::TempDir;

const DUMP: &str = r#"{
    "wallets": [
        {"address": "0x1111111111111111111111111111111111111111", "type": "EVM", "alias": "hot"},
        {"address": "0x2222222222222222222222222222222222222222", "type": "StarkNet"}
    ],
    "walletTypes": ["EVM", "StarkNet", "Sui"],
    "projects": [
        {"name": "Zora", "isMandatory": true, "tags": ["NFT"]},
        {"name": "Base", "tags": []}
    ],
    "dailyTasks": [
        {"date": "2024-02-01", "project": "Zora",
         "completedWallets": ["0x1111111111111111111111111111111111111111"]}
    ]
}"#;

#[test]
fn merge_is_idempotent() {
    let mut storage = test_db();
    let dir = TempDir::new().expect("temp dir");
    let slot = test_slot(&dir);
    let dump = parse_legacy(DUMP).expect("parse");

    let first = import_legacy(&mut storage, &slot, &dump).expect("first import");
    assert_eq!(first.wallets, 2);
    assert_eq!(first.projects_added, 2);
    assert_eq!(first.daily_marks_added, 1);

    let second = import_legacy(&mut storage, &slot, &dump).expect("second import");
    assert_eq!(second.projects_added, 0);
    assert_eq!(second.projects_skipped, 2);
    assert_eq!(second.daily_marks_added, 0);

    assert_eq!(storage.projects().list().expect("projects").len(), 2);
    assert_eq!(storage.wallets().list().expect("wallets").len(), 2);
    assert_eq!(
        storage.wallet_types().expect("types"),
        vec!["EVM", "StarkNet", "Sui"]
    );
    assert!(
        DailyTracker::new(&slot)
            .is_completed(
                "2024-02-01",
                "Zora",
                "0x1111111111111111111111111111111111111111"
            )
            .expect("daily")
    );
}

#[test]
fn projects_receive_fresh_ids_and_timestamps() {
    let mut storage = test_db();
    let dir = TempDir::new().expect("temp dir");
    let dump = parse_legacy(DUMP).expect("parse");
    import_legacy(&mut storage, &test_slot(&dir), &dump).expect("import");

    for project in storage.projects().list().expect("projects") {
        assert!(!project.id.is_empty());
        assert!(project.created_at.is_some());
    }
}

#[test]
fn garbage_is_rejected() {
    assert!(parse_legacy("[1, 2, 3]").is_err());
}
