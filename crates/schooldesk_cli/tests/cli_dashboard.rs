use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("schooldesk-{nanos}-{file_name}"))
}

fn run(store_path: &PathBuf, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_schooldesk"))
        .args(args)
        .env("SCHOOLDESK_STORE_PATH", store_path)
        .env("SCHOOLDESK_CONFIG_PATH", store_path.with_extension("config.json"))
        .env("SCHOOLDESK_DISABLE_NOTIFICATIONS", "1")
        .env_remove("SCHOOLDESK_LOG_DIR")
        .output()
        .expect("failed to run schooldesk")
}

fn json_stdout(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).expect("json output")
}

#[test]
fn summary_counts_seed_session() {
    let store_path = temp_path("cli-summary.json");

    let output = run(&store_path, &["--json", "summary"]);

    assert!(output.status.success());
    let summary = json_stdout(&output);
    assert_eq!(summary["my_tasks_due_today"], 2);
    assert_eq!(summary["overdue_total"], 4);
    assert_eq!(summary["purchases_today"], 4);
    assert_eq!(summary["purchases_today_amount"], 123750);
    assert_eq!(
        summary["latest_purchases"].as_array().expect("latest").len(),
        5
    );
}

#[test]
fn summary_plain_text_uses_rupee_grouping() {
    let store_path = temp_path("cli-summary-text.json");

    let output = run(&store_path, &["summary"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("₹1,23,750"));
}

#[test]
fn summary_follows_completed_tasks() {
    let store_path = temp_path("cli-summary-done.json");
    assert!(run(&store_path, &["done", "mt-3"]).status.success());

    let output = run(&store_path, &["--json", "summary"]);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    assert_eq!(json_stdout(&output)["overdue_total"], 3);
}

#[test]
fn inbox_lists_newest_first() {
    let store_path = temp_path("cli-inbox.json");

    let output = run(&store_path, &["--json", "inbox"]);

    assert!(output.status.success());
    let feed = json_stdout(&output);
    let items = feed.as_array().expect("array output");
    assert_eq!(items.len(), 7);
    assert_eq!(items[0]["id"], "nt-1");
    assert!(items.iter().any(|item| item["title"] == "2 HOD tasks overdue"));
}

#[test]
fn notify_reports_overdue_tasks() {
    let store_path = temp_path("cli-notify.json");

    let output = run(&store_path, &["--json", "notify"]);

    assert!(output.status.success());
    let outcome = json_stdout(&output);
    let sent: Vec<&str> = outcome["sent"]
        .as_array()
        .expect("sent")
        .iter()
        .filter_map(|id| id.as_str())
        .collect();
    assert_eq!(sent, vec!["mt-3", "mt-4", "hd-04", "hd-06", "st-203"]);
    assert!(outcome["failures"].as_array().expect("failures").is_empty());
}

#[test]
fn show_prints_record_details() {
    let store_path = temp_path("cli-show.json");

    let output = run(&store_path, &["show", "hd-04"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Late fee waiver summary"));
    assert!(stdout.contains("Finance"));
    assert!(stdout.contains("overdue"));
}

#[test]
fn show_blank_id_is_invalid_input() {
    let store_path = temp_path("cli-show-blank.json");

    let output = run(&store_path, &["show", " "]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
}
