//! The shared database handle opens once, however many threads ask.

mod common;

use common::{fixtures, init_test_logging};
use dropdesk::model::Note;
use dropdesk::storage::Database;
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::TempDir;

#[test]
fn concurrent_first_use_shares_one_connection() {
    init_test_logging();
    let dir = TempDir::new().expect("temp dir");
    let db = Arc::new(Database::new(dir.path().join("dropdesk.db")));
    assert!(!db.is_open());

    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let db = Arc::clone(&db);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let mut note = fixtures::note(&format!("note {i}"));
                db.storage()
                    .expect("storage")
                    .notes()
                    .save(&mut note)
                    .expect("save")
            })
        })
        .collect();

    let mut ids: Vec<String> = handles
        .into_iter()
        .map(|h| h.join().expect("thread"))
        .collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), threads);

    assert!(db.is_open());
    let notes: Vec<Note> = db.storage().expect("storage").notes().list().expect("list");
    assert_eq!(notes.len(), threads);
}

#[test]
fn in_memory_handle_keeps_state_between_calls() {
    let db = Database::in_memory();
    assert!(db.path().is_none());

    db.storage()
        .expect("storage")
        .wallets()
        .save(&mut fixtures::wallet(fixtures::EVM_A))
        .expect("save");
    assert_eq!(db.storage().expect("storage").wallets().count().expect("count"), 1);
}
