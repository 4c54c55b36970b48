//! Plain-text and JSON output for the CLI.

use schooldesk_core::bucket::{Bucket, BucketedView, classify};
use schooldesk_core::config::Palette;
use schooldesk_core::dashboard::{DashboardSummary, format_inr};
use schooldesk_core::dates::{describe_due, format_local};
use schooldesk_core::error::AppError;
use schooldesk_core::model::{Record, RecordKind};
use schooldesk_core::notify::{FeedItem, NotificationOutcome};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use time::OffsetDateTime;

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Due")]
    due: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

#[derive(Tabled)]
struct FeedRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Detail")]
    detail: String,
    #[tabled(rename = "At")]
    at: String,
}

/// The column that says the most about a record of this kind.
fn detail(record: &Record) -> String {
    let parts: Vec<Option<String>> = match record.kind {
        RecordKind::OwnerTask => vec![record.staff.clone(), record.kra.clone()],
        RecordKind::HodTask => vec![record.department.clone(), record.hod.clone()],
        RecordKind::SelfTask => vec![record.priority.map(|p| p.label().to_string())],
        RecordKind::Kra => vec![record.department.clone(), record.owner.clone()],
        RecordKind::Department => vec![record.hod.clone()],
        RecordKind::Purchase => vec![
            record.vendor.clone(),
            record.amount.map(format_inr),
        ],
    };
    let joined: Vec<String> = parts.into_iter().flatten().collect();
    if joined.is_empty() {
        "-".to_string()
    } else {
        joined.join(" / ")
    }
}

fn record_row(record: &Record, now: OffsetDateTime, palette: &Palette) -> RecordRow {
    let bucket = classify(record, now);
    RecordRow {
        id: record.id.clone(),
        title: palette.tone(bucket, &record.title),
        status: record.status.clone(),
        due: describe_due(record.due_at, now),
        detail: detail(record),
    }
}

pub fn records_table(records: &[Record], now: OffsetDateTime, palette: &Palette) -> String {
    let rows = records.iter().map(|record| record_row(record, now, palette));
    Table::new(rows).with(Style::psql()).to_string()
}

pub fn print_records(records: &[Record], now: OffsetDateTime, palette: &Palette) {
    if records.is_empty() {
        println!("No records.");
        return;
    }
    println!("{}", records_table(records, now, palette));
}

pub fn print_board(view: &BucketedView, now: OffsetDateTime, palette: &Palette) {
    let sections = [
        (Bucket::DueToday, "Due today"),
        (Bucket::Overdue, "Overdue"),
        (Bucket::Upcoming, "Upcoming"),
        (Bucket::Completed, "Completed"),
    ];
    for (index, (bucket, heading)) in sections.into_iter().enumerate() {
        let records = view.bucket(bucket);
        if index > 0 {
            println!();
        }
        println!("{}", palette.tone(bucket, &format!("{heading} ({})", records.len())));
        if !records.is_empty() {
            println!("{}", records_table(records, now, palette));
        }
    }
}

pub fn print_record(record: &Record, now: OffsetDateTime, palette: &Palette) {
    let bucket = classify(record, now);
    let mut lines = vec![
        ("id", record.id.clone()),
        ("kind", record.kind.to_string()),
        ("title", record.title.clone()),
        ("type", record.task_type.label().to_string()),
        ("status", record.status.clone()),
        ("bucket", palette.tone(bucket, bucket.label())),
    ];
    let optional = [
        ("description", record.description.clone()),
        ("starts", record.starts_at.map(|at| format_local(at, now))),
        ("due", record.due_at.map(|at| format_local(at, now))),
        ("priority", record.priority.map(|p| p.label().to_string())),
        ("department", record.department.clone()),
        ("hod", record.hod.clone()),
        ("kra", record.kra.clone()),
        ("staff", record.staff.clone()),
        ("owner", record.owner.clone()),
        ("category", record.category.clone()),
        ("vendor", record.vendor.clone()),
        ("amount", record.amount.map(format_inr)),
        ("accepted", record.accepted_at.map(|at| format_local(at, now))),
    ];
    lines.extend(
        optional
            .into_iter()
            .filter_map(|(label, value)| value.map(|value| (label, value))),
    );
    if !record.tags.is_empty() {
        lines.push(("tags", record.tags.join(", ")));
    }
    lines.push(("created", format_local(record.created_at, now)));

    for (label, value) in lines {
        println!("{label:<12}{value}");
    }
    for line in history_lines(record, now) {
        println!("{line}");
    }
}

/// Progress notes (newest first) then delegations (oldest first).
fn history_lines(record: &Record, now: OffsetDateTime) -> Vec<String> {
    let mut lines = Vec::new();
    if !record.notes.is_empty() {
        lines.push(String::new());
        lines.push("Progress notes".to_string());
        for note in &record.notes {
            let mut line = format!("  {}  {}", format_local(note.at, now), note.text);
            if !note.attachments.is_empty() {
                line.push_str(&format!(" [{}]", note.attachments.join(", ")));
            }
            lines.push(line);
        }
    }
    if !record.delegations.is_empty() {
        lines.push(String::new());
        lines.push("Delegations".to_string());
        for delegation in &record.delegations {
            let due = delegation
                .due_at
                .map(|at| format!(" due {}", format_local(at, now)))
                .unwrap_or_default();
            let notes = delegation.notes.as_deref().unwrap_or("No notes added");
            lines.push(format!("  {}{due}: {notes}", delegation.staff));
        }
    }
    lines
}

pub fn print_summary(summary: &DashboardSummary, now: OffsetDateTime, palette: &Palette) {
    println!("My tasks due today   {}", summary.my_tasks_due_today);
    println!("HOD tasks due today  {}", summary.hod_tasks_due_today);
    println!(
        "Overdue              {}",
        palette.alertize(&summary.overdue_total.to_string())
    );
    println!(
        "Purchases today      {} ({})",
        summary.purchases_today,
        format_inr(summary.purchases_today_amount)
    );
    if !summary.latest_purchases.is_empty() {
        println!();
        println!("Latest purchases");
        println!("{}", records_table(&summary.latest_purchases, now, palette));
    }
}

pub fn print_feed(items: &[FeedItem], now: OffsetDateTime) {
    if items.is_empty() {
        println!("Inbox is empty.");
        return;
    }
    let rows = items.iter().map(|item| FeedRow {
        id: item.id.clone(),
        kind: item.kind.label(),
        title: item.title.clone(),
        detail: item.detail.clone(),
        at: format_local(item.at, now),
    });
    println!("{}", Table::new(rows).with(Style::psql()));
}

pub fn print_notification_outcome(outcome: &NotificationOutcome) {
    for record in &outcome.records {
        println!("Notified: {} ({})", record.title, record.id);
    }
    for failure in &outcome.failures {
        eprintln!("WARN: {} - {}", failure.record_id, failure.error);
    }
    if outcome.records.is_empty() && outcome.failures.is_empty() {
        println!("Nothing overdue.");
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), AppError> {
    let rendered =
        serde_json::to_string(value).map_err(|err| AppError::invalid_data(err.to_string()))?;
    println!("{rendered}");
    Ok(())
}

pub fn notification_outcome_json(outcome: &NotificationOutcome) -> serde_json::Value {
    let failures: Vec<serde_json::Value> = outcome
        .failures
        .iter()
        .map(|failure| {
            serde_json::json!({
                "id": failure.record_id,
                "code": failure.error.code(),
                "message": failure.error.message(),
            })
        })
        .collect();
    let sent: Vec<&str> = outcome.records.iter().map(|r| r.id.as_str()).collect();
    serde_json::json!({ "sent": sent, "failures": failures })
}
