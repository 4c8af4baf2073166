use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("taskmaster-{nanos}-{file_name}"))
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_taskmaster"))
        .args(args)
        .env("TASKMASTER_CONFIG_PATH", temp_path("no-config.json"))
        .output()
        .expect("failed to run taskmaster")
}

fn json_ids(output: &Output) -> Vec<String> {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("json output");
    parsed
        .as_array()
        .expect("json array")
        .iter()
        .map(|task| task["id"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[test]
fn help_lists_commands() {
    let output = run(&["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("dashboard"));
    assert!(stdout.contains("list"));
}

#[test]
fn default_list_shows_open_tasks_in_a_table() {
    let output = run(&["list"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Prepare for presentation"));
    assert!(stdout.contains("(overdue)"));
    assert!(!stdout.contains("Pay utility bills"));
    assert!(stdout.contains("Priority"));
}

#[test]
fn completed_preset_json_is_sorted_by_due_date() {
    let output = run(&["--json", "list", "--preset", "completed"]);

    assert!(output.status.success());
    assert_eq!(json_ids(&output), vec!["task7", "task5"]);
}

#[test]
fn search_matches_description_text() {
    let output = run(&["--json", "list", "--search", "dr. SMITH"]);

    assert!(output.status.success());
    assert_eq!(json_ids(&output), vec!["task3"]);
}

#[test]
fn search_matches_title_text() {
    let output = run(&["--json", "list", "--search", "DENT"]);

    assert!(output.status.success());
    assert_eq!(json_ids(&output), vec!["task3"]);
}

#[test]
fn tag_filter_matches_any_tag() {
    let output = run(&["--json", "list", "--tag", "urgent", "--tag", "idea"]);

    assert!(output.status.success());
    assert_eq!(json_ids(&output), vec!["task4", "task1", "task8", "task6"]);
}

#[test]
fn priority_sort_descending_puts_high_first() {
    let output = run(&[
        "--json",
        "list",
        "--priority",
        "high",
        "--priority",
        "low",
        "--sort",
        "priority",
        "--direction",
        "desc",
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("json output");
    let priorities: Vec<&str> = parsed
        .as_array()
        .expect("json array")
        .iter()
        .map(|task| task["priority"].as_str().unwrap_or_default())
        .collect();
    assert_eq!(priorities, vec!["high", "high", "low", "low"]);
}

#[test]
fn config_override_changes_default_sort() {
    let output = run(&[
        "--json",
        "--config-override",
        "default_sort=title",
        "list",
        "--preset",
        "completed",
    ]);

    assert!(output.status.success());
    assert_eq!(json_ids(&output), vec!["task5", "task7"]);
}

#[test]
fn unknown_preset_is_invalid_input() {
    let output = run(&["list", "--preset", "someday"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input - unknown filter preset 'someday'"));
}

#[test]
fn list_reads_seed_file() {
    let seed_path = temp_path("cli-list-seed.json");
    let content = serde_json::json!({
        "schema_version": 1,
        "tasks": [
            {
                "id": "a",
                "title": "seeded task",
                "status": "todo",
                "priority": "low",
                "created_at": "2024-06-01T00:00:00Z",
                "updated_at": "2024-06-01T00:00:00Z",
                "user_id": "user1"
            }
        ]
    });
    std::fs::write(&seed_path, serde_json::to_string_pretty(&content).unwrap()).unwrap();

    let seed_arg = seed_path.to_string_lossy().to_string();
    let output = run(&["--json", "--seed", &seed_arg, "list"]);
    std::fs::remove_file(&seed_path).ok();

    assert!(output.status.success());
    assert_eq!(json_ids(&output), vec!["a"]);
}

#[test]
fn invalid_seed_is_reported_as_invalid_data() {
    let seed_path = temp_path("cli-bad-seed.json");
    std::fs::write(&seed_path, "{ \"schema_version\": 99, \"tasks\": [] }").unwrap();

    let seed_arg = seed_path.to_string_lossy().to_string();
    let output = run(&["--seed", &seed_arg, "list"]);
    std::fs::remove_file(&seed_path).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_data"));
}
