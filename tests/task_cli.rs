mod support;

use predicates::str::contains;
use serde_json::Value;

use support::TestBoard;

fn statuses(columns: &Value) -> Vec<String> {
    columns
        .as_array()
        .map(|columns| {
            columns
                .iter()
                .filter_map(|column| column["status"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

fn column<'a>(columns: &'a Value, status: &str) -> &'a Value {
    columns
        .as_array()
        .and_then(|columns| columns.iter().find(|column| column["status"] == status))
        .expect("column present")
}

#[test]
fn new_task_on_empty_store_gets_id_one() -> Result<(), Box<dyn std::error::Error>> {
    let board = TestBoard::empty()?;

    let created = board.json(&["task", "new", "Buy milk", "--board", "Home"])?;
    assert_eq!(created["status"], "success");
    assert_eq!(created["command"], "task new");
    assert_eq!(created["data"]["id"], 1);
    assert_eq!(created["data"]["board"], "Home");
    assert_eq!(created["data"]["status"], "todo");

    let list = board.json(&["task", "list"])?;
    assert_eq!(list["data"]["total"], 1);
    assert_eq!(list["data"]["tasks"][0]["title"], "Buy milk");

    let boards = board.json(&["board", "list"])?;
    assert_eq!(boards["data"]["active"], "Home");
    assert_eq!(boards["data"]["boards"][0]["name"], "Home");
    assert_eq!(boards["data"]["boards"][0]["tasks"], 1);
    Ok(())
}

#[test]
fn moved_task_shows_under_new_status() -> Result<(), Box<dyn std::error::Error>> {
    let board = TestBoard::empty()?;
    board
        .cmd()
        .args(["task", "new", "Buy milk", "--board", "Home"])
        .assert()
        .success();

    board
        .cmd()
        .args(["task", "move", "1", "done"])
        .assert()
        .success()
        .stdout(contains("Task updated"));

    let shown = board.json(&["board", "show", "Home"])?;
    let columns = &shown["data"]["columns"];
    assert_eq!(statuses(columns), vec!["todo", "doing", "done"]);
    assert_eq!(column(columns, "todo")["tasks"].as_array().map(Vec::len), Some(0));
    assert_eq!(column(columns, "done")["tasks"][0]["title"], "Buy milk");
    assert_eq!(column(columns, "done")["title"], "DONE");
    Ok(())
}

#[test]
fn new_task_defaults_to_active_board() -> Result<(), Box<dyn std::error::Error>> {
    let board = TestBoard::empty()?;
    board
        .cmd()
        .args(["task", "new", "first"])
        .assert()
        .code(2)
        .stderr(contains("--board"));

    board
        .cmd()
        .args(["task", "new", "a", "--board", "Work"])
        .assert()
        .success();
    board
        .cmd()
        .args(["task", "new", "b", "--board", "Home"])
        .assert()
        .success();
    board.cmd().args(["board", "use", "Home"]).assert().success();

    let created = board.json(&["task", "new", "c"])?;
    assert_eq!(created["data"]["id"], 3);
    assert_eq!(created["data"]["board"], "Home");
    Ok(())
}

#[test]
fn unknown_status_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let board = TestBoard::empty()?;
    board
        .cmd()
        .args(["task", "new", "x", "--board", "Home"])
        .assert()
        .success();

    let output = board
        .cmd()
        .args(["--json", "task", "move", "1", "archived"])
        .output()?;
    assert_eq!(output.status.code(), Some(2));
    let envelope: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(envelope["status"], "error");
    assert_eq!(envelope["error"]["kind"], "validation");

    let shown = board.json(&["task", "show", "1"])?;
    assert_eq!(shown["data"]["status"], "todo");
    Ok(())
}

#[test]
fn edit_of_missing_task_is_a_noop() -> Result<(), Box<dyn std::error::Error>> {
    let board = TestBoard::empty()?;

    let edited = board.json(&["task", "edit", "42", "--title", "nope"])?;
    assert_eq!(edited["status"], "success");
    assert_eq!(edited["data"]["updated"], false);
    assert_eq!(edited["warnings"][0], "no task with id 42");

    let list = board.json(&["task", "list"])?;
    assert_eq!(list["data"]["total"], 0);
    Ok(())
}

#[test]
fn edit_needs_a_field() -> Result<(), Box<dyn std::error::Error>> {
    let board = TestBoard::empty()?;
    board
        .cmd()
        .args(["task", "edit", "1"])
        .assert()
        .code(2)
        .stderr(contains("nothing to change"));
    Ok(())
}

#[test]
fn show_missing_task_fails() -> Result<(), Box<dyn std::error::Error>> {
    let board = TestBoard::empty()?;
    let output = board.cmd().args(["--json", "task", "show", "7"]).output()?;
    assert_eq!(output.status.code(), Some(2));
    let envelope: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(envelope["error"]["kind"], "not_found");
    assert_eq!(envelope["error"]["details"]["id"], 7);
    Ok(())
}

#[test]
fn rm_reports_whether_anything_was_removed() -> Result<(), Box<dyn std::error::Error>> {
    let board = TestBoard::empty()?;
    board
        .cmd()
        .args(["task", "new", "x", "--board", "Home"])
        .assert()
        .success();

    let removed = board.json(&["task", "rm", "1"])?;
    assert_eq!(removed["data"]["removed"], true);

    let again = board.json(&["task", "rm", "1"])?;
    assert_eq!(again["status"], "success");
    assert_eq!(again["data"]["removed"], false);

    let boards = board.json(&["board", "list"])?;
    assert_eq!(boards["data"]["boards"].as_array().map(Vec::len), Some(0));
    Ok(())
}

#[test]
fn ids_continue_after_the_highest() -> Result<(), Box<dyn std::error::Error>> {
    let board = TestBoard::empty()?;
    for title in ["a", "b", "c"] {
        board
            .cmd()
            .args(["task", "new", title, "--board", "Home"])
            .assert()
            .success();
    }
    board.cmd().args(["task", "rm", "2"]).assert().success();

    let created = board.json(&["task", "new", "d", "--board", "Home"])?;
    assert_eq!(created["data"]["id"], 4);
    Ok(())
}

#[test]
fn list_filters_by_board_and_status() -> Result<(), Box<dyn std::error::Error>> {
    let board = TestBoard::empty()?;
    board
        .cmd()
        .args(["task", "new", "a", "--board", "Work", "--status", "doing"])
        .assert()
        .success();
    board
        .cmd()
        .args(["task", "new", "b", "--board", "Home"])
        .assert()
        .success();

    let work = board.json(&["task", "list", "--board", "Work"])?;
    assert_eq!(work["data"]["total"], 1);
    assert_eq!(work["data"]["tasks"][0]["title"], "a");

    let todo = board.json(&["task", "list", "--status", "todo"])?;
    assert_eq!(todo["data"]["total"], 1);
    assert_eq!(todo["data"]["tasks"][0]["title"], "b");
    Ok(())
}

#[test]
fn board_use_rejects_unknown_board() -> Result<(), Box<dyn std::error::Error>> {
    let board = TestBoard::empty()?;
    board
        .cmd()
        .args(["board", "use", "Nowhere"])
        .assert()
        .code(2)
        .stderr(contains("no board named"));
    Ok(())
}

#[test]
fn stale_active_board_falls_back_to_first() -> Result<(), Box<dyn std::error::Error>> {
    let board = TestBoard::empty()?;
    board
        .cmd()
        .args(["task", "new", "a", "--board", "Work"])
        .assert()
        .success();
    board
        .cmd()
        .args(["task", "new", "b", "--board", "Home"])
        .assert()
        .success();
    board.cmd().args(["board", "use", "Home"]).assert().success();
    board.cmd().args(["task", "rm", "2"]).assert().success();

    let shown = board.json(&["board", "show"])?;
    assert_eq!(shown["data"]["board"], "Work");
    Ok(())
}

#[test]
fn init_seeds_example_boards_once() -> Result<(), Box<dyn std::error::Error>> {
    let board = TestBoard::seeded()?;

    let first = board.json(&["init"])?;
    assert_eq!(first["data"]["seeded"], true);
    assert_eq!(first["data"]["tasks"], 6);
    assert_eq!(first["data"]["boards"][0], "Getting Started");
    assert_eq!(first["data"]["config_written"], true);
    assert!(board.path().join("kanban.toml").exists());

    let store = board.store()?;
    assert_eq!(store["showSideBar"], "true");

    let second = board.json(&["init"])?;
    assert_eq!(second["data"]["seeded"], false);
    assert_eq!(second["data"]["config_written"], false);
    Ok(())
}

#[test]
fn seed_file_replaces_builtin_board() -> Result<(), Box<dyn std::error::Error>> {
    let board = TestBoard::seeded()?;
    board.write_file(
        "seed.json",
        r#"[{"id": 7, "title": "Imported", "status": "doing", "board": "Ops"}]"#,
    )?;
    board.write_config("[seed]\nfile = \"seed.json\"\n")?;

    let list = board.json(&["task", "list"])?;
    assert_eq!(list["data"]["total"], 1);
    assert_eq!(list["data"]["tasks"][0]["id"], 7);

    let created = board.json(&["task", "new", "next"])?;
    assert_eq!(created["data"]["id"], 8);
    assert_eq!(created["data"]["board"], "Ops");
    Ok(())
}

#[test]
fn reset_requires_force() -> Result<(), Box<dyn std::error::Error>> {
    let board = TestBoard::empty()?;
    board
        .cmd()
        .args(["task", "new", "x", "--board", "Home"])
        .assert()
        .success();

    board
        .cmd()
        .arg("reset")
        .assert()
        .code(2)
        .stderr(contains("--force"));

    board
        .cmd()
        .args(["reset", "--force"])
        .assert()
        .success()
        .stdout(contains("Store cleared"));

    let store = board.store()?;
    assert_eq!(store.as_object().map(|entries| entries.len()), Some(0));

    let list = board.json(&["task", "list"])?;
    assert_eq!(list["data"]["total"], 0);
    Ok(())
}

#[test]
fn sidebar_and_theme_are_persisted() -> Result<(), Box<dyn std::error::Error>> {
    let board = TestBoard::empty()?;

    board.cmd().args(["sidebar", "hide"]).assert().success();
    board.cmd().args(["theme", "light"]).assert().success();

    let store = board.store()?;
    assert_eq!(store["showSideBar"], "false");
    assert_eq!(store["light-theme"], "enabled");

    let theme = board.json(&["theme"])?;
    assert_eq!(theme["data"]["theme"], "light");
    assert_eq!(theme["data"]["changed"], false);

    board
        .cmd()
        .args(["sidebar", "sideways"])
        .assert()
        .code(2);
    board.cmd().args(["theme", "sepia"]).assert().code(2);
    Ok(())
}

#[test]
fn corrupt_tasks_read_as_empty_by_default() -> Result<(), Box<dyn std::error::Error>> {
    let board = TestBoard::empty()?;
    board.write_file("store.json", r#"{"tasks": "not json"}"#)?;

    let list = board.json(&["task", "list"])?;
    assert_eq!(list["status"], "success");
    assert_eq!(list["data"]["total"], 0);

    // the next write replaces the unreadable value
    let created = board.json(&["task", "new", "fresh", "--board", "Home"])?;
    assert_eq!(created["data"]["id"], 1);
    let store = board.store()?;
    let tasks: Value = serde_json::from_str(store["tasks"].as_str().unwrap_or(""))?;
    assert_eq!(tasks.as_array().map(Vec::len), Some(1));
    Ok(())
}

#[test]
fn strict_storage_surfaces_corrupt_tasks() -> Result<(), Box<dyn std::error::Error>> {
    let board = TestBoard::empty()?;
    board.write_config("[storage]\nstrict = true\n\n[seed]\nenabled = false\n")?;
    board.write_file("store.json", r#"{"tasks": "{broken"}"#)?;

    let output = board.cmd().args(["--json", "task", "list"]).output()?;
    assert_eq!(output.status.code(), Some(4));
    let envelope: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(envelope["error"]["kind"], "corrupt_state");
    assert_eq!(envelope["next_steps"][0], "kanban reset --force");
    Ok(())
}

#[test]
fn unreadable_store_file_keeps_commands_usable() -> Result<(), Box<dyn std::error::Error>> {
    let board = TestBoard::empty()?;
    board.write_file("store.json", "garbage")?;

    let boards = board.json(&["board", "list"])?;
    assert_eq!(boards["status"], "success");
    assert_eq!(boards["data"]["boards"].as_array().map(Vec::len), Some(0));

    // no board to default to, which is a usage error rather than a storage one
    let output = board.cmd().args(["--json", "task", "new", "x"]).output()?;
    assert_eq!(output.status.code(), Some(2));
    let envelope: Value = serde_json::from_slice(&output.stdout)?;
    assert_ne!(envelope["error"]["kind"], "corrupt_state");

    board
        .cmd()
        .args(["task", "new", "x", "--board", "Home"])
        .assert()
        .success();
    let boards = board.json(&["board", "list"])?;
    assert_eq!(boards["data"]["active"], "Home");
    Ok(())
}

#[test]
fn invalid_config_fails_without_touching_store() -> Result<(), Box<dyn std::error::Error>> {
    let board = TestBoard::empty()?;
    board.write_config("[board]\ndefault_status = \"backlog\"\n\n[storage]\nstrict = true\n")?;
    let store = board.write_file("store.json", r#"{"tasks": "{broken"}"#)?;

    let output = board
        .cmd()
        .args(["--json", "task", "new", "x", "--board", "H"])
        .output()?;
    assert_eq!(output.status.code(), Some(2));
    let envelope: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(envelope["status"], "error");
    assert_eq!(envelope["next_steps"][0], "fix kanban.toml then retry");

    assert_eq!(std::fs::read_to_string(store)?, r#"{"tasks": "{broken"}"#);

    board
        .cmd()
        .args(["board", "list"])
        .assert()
        .code(2)
        .stderr(contains("Invalid configuration"));
    Ok(())
}

#[test]
fn blank_board_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let board = TestBoard::empty()?;

    board
        .cmd()
        .args(["task", "new", "x", "--board", "  "])
        .assert()
        .code(2)
        .stderr(contains("--board cannot be blank"));

    let list = board.json(&["task", "list"])?;
    assert_eq!(list["data"]["total"], 0);
    Ok(())
}
