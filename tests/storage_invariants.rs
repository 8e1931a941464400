//! Store-level guarantees: key assignment, soft-delete visibility and
//! schema shape.

mod common;

use common::{fixtures, test_db, test_db_with_dir};
use dropdesk::model::{Note, Project, SubTask, Task};
use dropdesk::storage::SqliteStorage;
use dropdesk::storage::schema::{CURRENT_SCHEMA_VERSION, schema_version};
use dropdesk::util::ID_LENGTH;
use proptest::prelude::*;
use rusqlite::Connection;

fn table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
        .expect("prepare");
    stmt.query_map([], |row| row.get(0))
        .expect("query")
        .collect::<Result<Vec<String>, _>>()
        .expect("collect")
}

#[test]
fn fresh_database_has_every_store() {
    let storage = test_db();
    let tables = table_names(storage.conn());
    for table in [
        "chains",
        "notes",
        "projects",
        "sub_tasks",
        "tags",
        "tasks",
        "wallet_types",
        "wallets",
    ] {
        assert!(tables.iter().any(|t| t == table), "missing table {table}");
    }
    assert_eq!(
        schema_version(storage.conn()).expect("version"),
        CURRENT_SCHEMA_VERSION
    );
}

#[test]
fn generated_ids_are_fixed_length_and_stable() {
    let mut storage = test_db();
    let mut project = fixtures::project("Scroll");

    let id = storage.projects().save(&mut project).expect("save");
    assert_eq!(id.len(), ID_LENGTH);
    assert_eq!(project.id, id);
    let created = project.created_at.expect("createdAt set");

    project.description = "zk rollup".to_string();
    let again = storage.projects().save(&mut project).expect("resave");
    assert_eq!(again, id);

    let stored = storage.projects().require(&id).expect("stored");
    assert_eq!(stored.created_at, Some(created));
    assert_eq!(stored.description, "zk rollup");
    assert!(stored.updated_at >= stored.created_at);
    assert_eq!(storage.projects().count().expect("count"), 1);
}

#[test]
fn wallets_are_keyed_by_address() {
    let mut storage = test_db();
    let mut wallet = fixtures::wallet(fixtures::EVM_A);
    storage.wallets().save(&mut wallet).expect("save");

    wallet.alias = Some("main".to_string());
    storage.wallets().save(&mut wallet).expect("overwrite");

    let wallets = storage.wallets().list().expect("list");
    assert_eq!(wallets.len(), 1);
    assert_eq!(wallets[0].display_name(), "main");
}

#[test]
fn soft_deleted_records_stay_reachable_by_key() {
    let mut storage = test_db();
    let mut note = fixtures::note("Claim window");
    let id = storage.notes().save(&mut note).expect("save");

    assert!(storage.notes().remove(&id).expect("remove"));
    assert!(storage.notes().list().expect("list").is_empty());

    let hidden: Note = storage.notes().get(&id).expect("get").expect("still stored");
    assert!(hidden.is_deleted);
    assert_eq!(
        storage.notes().list_including_deleted().expect("list all").len(),
        1
    );
}

#[test]
fn removing_unknown_keys_reports_false() {
    let mut storage = test_db();
    assert!(!storage.projects().remove("nope").expect("remove"));
    assert!(!storage.wallets().remove("0xnope").expect("remove"));
    assert!(storage.tasks().get("nope").expect("get").is_none());
}

#[test]
fn sub_tasks_follow_their_task() {
    let mut storage = test_db();
    let mut project = fixtures::project("Linea");
    let project_id = storage.projects().save(&mut project).expect("project");
    let mut task: Task = fixtures::task("Bridge", &project_id);
    let task_id = storage.tasks().save(&mut task).expect("task");

    let mut steps = vec![fixtures::sub_task("Approve"), fixtures::sub_task("Send")];
    storage
        .sub_tasks()
        .save_for_task(&task_id, &mut steps)
        .expect("save steps");

    let stored: Vec<SubTask> = storage.sub_tasks().for_task(&task_id).expect("for task");
    let names: Vec<_> = stored.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Approve", "Send"]);
    assert!(stored.iter().all(|s| s.task_id == task_id));

    assert_eq!(storage.sub_tasks().delete_for_task(&task_id).expect("clear"), 2);
    assert!(storage.sub_tasks().for_task(&task_id).expect("for task").is_empty());
}

#[test]
fn records_survive_reopen() {
    let (mut storage, dir) = test_db_with_dir();
    let mut project = fixtures::project("Taiko");
    let id = storage.projects().save(&mut project).expect("save");
    drop(storage);

    let path = dir.path().join(".dropdesk").join("dropdesk.db");
    let mut reopened = SqliteStorage::open(&path).expect("reopen");
    let stored: Project = reopened.projects().require(&id).expect("stored");
    assert_eq!(stored.name, "Taiko");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn ids_are_assigned_once(names in prop::collection::vec("[A-Za-z][A-Za-z0-9 ]{0,15}", 1..12)) {
        let mut storage = test_db();
        let mut projects: Vec<Project> = names.iter().map(|n| Project::new(n.as_str())).collect();
        let ids = storage.projects().save_all(&mut projects).expect("save all");

        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(unique.len(), ids.len());

        let again = storage.projects().save_all(&mut projects).expect("resave");
        prop_assert_eq!(&again, &ids);
        prop_assert_eq!(storage.projects().count().expect("count"), names.len());
    }

    #[test]
    fn list_skips_exactly_the_removed(flags in prop::collection::vec(any::<bool>(), 1..16)) {
        let mut storage = test_db();
        let mut tasks: Vec<Task> = (0..flags.len())
            .map(|i| Task::new(format!("task {i}"), "p"))
            .collect();
        let ids = storage.tasks().save_all(&mut tasks).expect("save all");

        for (id, removed) in ids.iter().zip(&flags) {
            if *removed {
                prop_assert!(storage.tasks().remove(id).expect("remove"));
            }
        }

        let live: Vec<String> = storage.tasks().list().expect("list").into_iter().map(|t| t.id).collect();
        let expected: Vec<String> = ids
            .iter()
            .zip(&flags)
            .filter(|(_, removed)| !**removed)
            .map(|(id, _)| id.clone())
            .collect();
        prop_assert_eq!(live, expected);
        prop_assert_eq!(
            storage.tasks().list_including_deleted().expect("all").len(),
            flags.len()
        );
    }
}
