//! End-to-end runs of the `dropdesk` binary.

mod common;

use common::cli::DeskWorkspace;
use common::fixtures::{EVM_A, EVM_B};
use predicates::prelude::*;

#[test]
fn commands_need_an_initialized_directory() {
    let workspace = DeskWorkspace::uninitialized();

    workspace
        .cmd()
        .args(["wallet", "list"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("dropdesk init"));

    let output = workspace
        .cmd()
        .args(["wallet", "list", "--json"])
        .output()
        .expect("run");
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json error");
    assert_eq!(body["error"]["code"], "NOT_INITIALIZED");
}

#[test]
fn init_refuses_to_run_twice() {
    let workspace = DeskWorkspace::new();
    assert!(workspace.data_dir().join("metadata.json").is_file());

    workspace
        .cmd()
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Already initialized"));
    workspace.cmd().args(["init", "--force"]).assert().success();
}

#[test]
fn wallets_round_trip_through_the_cli() {
    let workspace = DeskWorkspace::new();

    let created = workspace.json(["wallet", "add", EVM_A, "--alias", "main"]);
    assert_eq!(created["status"], "created");
    assert_eq!(created["key"], EVM_A);
    workspace.json(["wallet", "add", EVM_B, "--type", "StarkNet"]);

    let listed = workspace.json(["wallet", "list"]);
    let wallets = listed.as_array().expect("array");
    assert_eq!(wallets.len(), 2);
    assert_eq!(wallets[0]["alias"], "main");
    assert_eq!(wallets[1]["type"], "StarkNet");

    let evm_only = workspace.json(["wallet", "list", "--type", "EVM"]);
    assert_eq!(evm_only.as_array().map(Vec::len), Some(1));
}

#[test]
fn duplicate_wallets_exit_with_two() {
    let workspace = DeskWorkspace::new();
    workspace.cmd().args(["wallet", "add", EVM_A]).assert().success();

    workspace
        .cmd()
        .args(["wallet", "add", EVM_A])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn unknown_wallet_types_are_rejected() {
    let workspace = DeskWorkspace::new();
    workspace
        .cmd()
        .args(["wallet", "add", EVM_A, "--type", "Cosmos"])
        .assert()
        .code(2);

    workspace.json(["wallet", "types", "--add", "Cosmos"]);
    workspace
        .cmd()
        .args(["wallet", "add", EVM_A, "--type", "Cosmos"])
        .assert()
        .success();
}

#[test]
fn project_task_and_subtask_flow() {
    let workspace = DeskWorkspace::new();

    let project = workspace.json(["project", "add", "Scroll", "--tag", "L2"]);
    let project_id = project["key"].as_str().expect("project id").to_string();

    let task = workspace.json(["task", "add", "Bridge", "-p", &project_id, "--priority", "2"]);
    let task_id = task["key"].as_str().expect("task id").to_string();

    let steps = workspace.json(["subtask", "add", &task_id, "Approve", "Send"]);
    assert_eq!(steps.as_array().map(Vec::len), Some(2));

    let details = workspace.json(["task", "show", &task_id]);
    assert_eq!(details["name"], "Bridge");
    assert_eq!(details["priority"], 2);
    assert_eq!(details["subTasks"][1]["name"], "Send");

    let cleared = workspace.json(["subtask", "clear", &task_id]);
    assert_eq!(cleared["removed"], 2);

    workspace.json(["project", "rm", &project_id]);
    let live = workspace.json(["project", "list"]);
    assert_eq!(live.as_array().map(Vec::len), Some(0));
    let all = workspace.json(["project", "list", "--all"]);
    assert_eq!(all[0]["isDeleted"], true);
}

#[test]
fn tasks_need_an_existing_project() {
    let workspace = DeskWorkspace::new();
    workspace
        .cmd()
        .args(["task", "add", "Orphan", "-p", "missing01"])
        .assert()
        .code(3);
}

#[test]
fn export_and_import_between_workspaces() {
    let source = DeskWorkspace::new();
    source.json(["wallet", "add", EVM_A]);
    source.json(["note", "add", "Claim", "-c", "before June"]);
    source.json(["tag", "add", "DeFi"]);

    let backup = source.root().join("backup.json");
    let exported = source.json(["export", "-o", backup.to_str().expect("utf-8 path")]);
    assert_eq!(exported["counts"]["wallets"], 1);
    assert!(backup.is_file());

    let target = DeskWorkspace::new();
    target.json(["wallet", "add", EVM_B]);
    let imported = target.json(["import", backup.to_str().expect("utf-8 path")]);
    assert_eq!(imported["tags_replaced"], true);

    let wallets = target.json(["wallet", "list"]);
    assert_eq!(wallets.as_array().map(Vec::len), Some(1));
    assert_eq!(wallets[0]["address"], EVM_A);
    let notes = target.json(["note", "list"]);
    assert_eq!(notes[0]["content"], "before June");
}

#[test]
fn export_to_stdout_is_a_snapshot_document() {
    let workspace = DeskWorkspace::new();
    workspace.json(["wallet", "add", EVM_A]);

    workspace
        .cmd()
        .args(["export", "--stdout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"exportDate\""))
        .stdout(predicate::str::contains(EVM_A));
}

#[test]
fn invalid_backups_are_refused() {
    let workspace = DeskWorkspace::new();
    workspace.json(["wallet", "add", EVM_A]);
    let bad = workspace.root().join("bad.json");
    std::fs::write(&bad, r#"{"wallets": []}"#).expect("write");

    workspace
        .cmd()
        .args(["import", bad.to_str().expect("utf-8 path")])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("missing version"));

    let wallets = workspace.json(["wallet", "list"]);
    assert_eq!(wallets.as_array().map(Vec::len), Some(1));
}

#[test]
fn daily_marks_toggle() {
    let workspace = DeskWorkspace::new();
    workspace.json(["wallet", "add", EVM_A]);

    let on = workspace.json(["daily", "toggle", "Zora", EVM_A, "--date", "2024-03-01"]);
    assert_eq!(on["completed"], true);
    let shown = workspace.json(["daily", "show", "--date", "2024-03-01"]);
    assert_eq!(shown[0]["completedWallets"][0], EVM_A);

    let off = workspace.json(["daily", "toggle", "Zora", EVM_A, "--date", "2024-03-01"]);
    assert_eq!(off["completed"], false);
}

#[test]
fn schema_lists_every_record_type() {
    let workspace = DeskWorkspace::uninitialized();
    let output = workspace.json(["schema"]);
    assert_eq!(output["tool"], "dropdesk");
    assert!(output["schemas"]["Snapshot"].is_object());
}

#[test]
fn completions_are_generated() {
    let workspace = DeskWorkspace::uninitialized();
    workspace
        .cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dropdesk"));
}

#[test]
fn tasks_cannot_move_onto_a_removed_project() {
    let workspace = DeskWorkspace::new();
    let live = workspace.json(["project", "add", "Live"]);
    let live_id = live["key"].as_str().expect("live id").to_string();
    let dead = workspace.json(["project", "add", "Dead"]);
    let dead_id = dead["key"].as_str().expect("dead id").to_string();
    workspace.json(["project", "rm", &dead_id]);

    let task = workspace.json(["task", "add", "Bridge", "-p", &live_id]);
    let task_id = task["key"].as_str().expect("task id").to_string();

    workspace
        .cmd()
        .args(["task", "edit", &task_id, "--project", &dead_id])
        .assert()
        .code(3);
    let details = workspace.json(["task", "show", &task_id]);
    assert_eq!(details["projectId"], live_id.as_str());
}

#[test]
fn removed_projects_can_be_restored() {
    let workspace = DeskWorkspace::new();
    let project = workspace.json(["project", "add", "Scroll"]);
    let project_id = project["key"].as_str().expect("project id").to_string();

    workspace.json(["project", "rm", &project_id]);
    assert_eq!(workspace.json(["project", "list"]).as_array().map(Vec::len), Some(0));

    let restored = workspace.json(["project", "restore", &project_id]);
    assert_eq!(restored["status"], "restored");
    let live = workspace.json(["project", "list"]);
    assert_eq!(live[0]["id"], project_id.as_str());
    assert_eq!(live[0]["isDeleted"], false);

    let again = workspace.json(["project", "restore", &project_id]);
    assert_eq!(again["status"], "unchanged");

    workspace
        .cmd()
        .args(["project", "restore", "missing01"])
        .assert()
        .code(3);
}
