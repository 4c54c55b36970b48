use crate::bucket::{Bucket, classify, is_same_day};
use crate::dates::format_local;
use crate::error::AppError;
use crate::model::{Record, RecordKind};
use crate::store::EntityStore;
use log::{info, warn};
use serde::Serialize;
use std::cmp::Reverse;
use time::OffsetDateTime;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub use linux::LinuxNotifier;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::WindowsNotifier;

const APP_TITLE: &str = "schooldesk";

/// Posts one desktop notification. The process exits right after a `notify`
/// run, so backends show a plain notification and register no callbacks.
pub trait Notifier {
    fn notify(&self, record: &Record) -> Result<(), AppError>;
}

pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _record: &Record) -> Result<(), AppError> {
        Ok(())
    }
}

pub fn notifier_from_env() -> Result<Box<dyn Notifier>, AppError> {
    if std::env::var("SCHOOLDESK_DISABLE_NOTIFICATIONS").is_ok() {
        return Ok(Box::new(NoopNotifier));
    }

    match platform_notifier() {
        Ok(notifier) => Ok(notifier),
        Err(err) => match err {
            AppError::InvalidData(_) => Ok(Box::new(NoopNotifier)),
            other => Err(other),
        },
    }
}

/// Title, department and id, then the command that opens the record.
pub fn notification_body(record: &Record) -> String {
    let headline = match record.department.as_deref() {
        Some(department) => format!("{} ({}, {})", record.title, department, record.id),
        None => format!("{} ({})", record.title, record.id),
    };
    format!("{headline}\nOpen with: {APP_TITLE} show {}", record.id)
}

#[cfg(target_os = "linux")]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Ok(Box::new(LinuxNotifier))
}

#[cfg(windows)]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Ok(Box::new(WindowsNotifier))
}

#[cfg(not(any(target_os = "linux", windows)))]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Err(AppError::invalid_data(
        "notifications are not supported on this platform",
    ))
}

#[derive(Debug)]
pub struct NotificationOutcome {
    pub records: Vec<Record>,
    pub failures: Vec<NotificationFailure>,
}

#[derive(Debug)]
pub struct NotificationFailure {
    pub record_id: String,
    pub error: AppError,
}

/// Sends one desktop notification per overdue, open task-like record.
/// A failing record is collected and the rest are still sent.
pub fn notify_overdue(
    store: &EntityStore,
    now: OffsetDateTime,
    notifier: &dyn Notifier,
) -> NotificationOutcome {
    let mut records = Vec::new();
    let mut failures = Vec::new();

    let overdue = RecordKind::ALL
        .into_iter()
        .filter(|kind| kind.is_task_like())
        .flat_map(|kind| store.list(kind))
        .filter(|record| classify(record, now) == Bucket::Overdue);

    for record in overdue {
        match notifier.notify(record) {
            Ok(()) => records.push(record.clone()),
            Err(err) => {
                warn!(
                    "event=notify_failed kind={} id={} code={}",
                    record.kind,
                    record.id,
                    err.code()
                );
                failures.push(NotificationFailure {
                    record_id: record.id.clone(),
                    error: err,
                });
            }
        }
    }

    info!(
        "event=notify_overdue sent={} failed={}",
        records.len(),
        failures.len()
    );
    NotificationOutcome { records, failures }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    Task,
    Purchase,
    System,
}

impl FeedKind {
    pub fn label(self) -> &'static str {
        match self {
            FeedKind::Task => "task",
            FeedKind::Purchase => "purchase",
            FeedKind::System => "system",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedItem {
    pub id: String,
    pub kind: FeedKind,
    pub title: String,
    pub detail: String,
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
}

/// Inbox items derived from the current store, newest first.
pub fn build_feed(store: &EntityStore, now: OffsetDateTime) -> Vec<FeedItem> {
    let mut items: Vec<(FeedKind, String, String, OffsetDateTime)> = Vec::new();

    let overdue_hod: Vec<&Record> = store
        .list(RecordKind::HodTask)
        .iter()
        .filter(|record| classify(record, now) == Bucket::Overdue)
        .collect();
    if !overdue_hod.is_empty() {
        let mut departments: Vec<&str> = Vec::new();
        for department in overdue_hod.iter().filter_map(|r| r.department.as_deref()) {
            if !departments.contains(&department) {
                departments.push(department);
            }
        }
        let noun = if overdue_hod.len() == 1 { "task" } else { "tasks" };
        let verb = if departments.len() == 1 { "needs" } else { "need" };
        items.push((
            FeedKind::Task,
            format!("{} HOD {noun} overdue", overdue_hod.len()),
            format!("{} {verb} your attention.", join_names(&departments)),
            now,
        ));
    }

    for purchase in store
        .list(RecordKind::Purchase)
        .iter()
        .filter(|purchase| is_same_day(purchase.reference_at(), now))
    {
        items.push((
            FeedKind::Purchase,
            "New purchase logged".to_string(),
            format!("{} recorded today.", purchase.title),
            purchase.reference_at(),
        ));
    }

    for task in store
        .list(RecordKind::OwnerTask)
        .iter()
        .filter(|task| classify(task, now) == Bucket::DueToday)
    {
        let due = task.reference_at();
        items.push((
            FeedKind::System,
            "System reminder".to_string(),
            format!("{} by {}.", task.title, format_local(due, now)),
            due,
        ));
    }

    items.sort_by_key(|(_, _, _, at)| Reverse(*at));
    items
        .into_iter()
        .enumerate()
        .map(|(index, (kind, title, detail, at))| FeedItem {
            id: format!("nt-{}", index + 1),
            kind,
            title,
            detail,
            at,
        })
        .collect()
}

fn join_names(names: &[&str]) -> String {
    match names {
        [] => "Departments".to_string(),
        [only] => only.to_string(),
        [rest @ .., last] => format!("{} and {last}", rest.join(", ")),
    }
}
