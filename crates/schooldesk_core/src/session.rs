use crate::bucket::BucketedView;
use crate::dashboard::{DashboardSummary, summarize};
use crate::engine::Engine;
use crate::error::AppError;
use crate::model::{DelegationDraft, Record, RecordDraft, RecordKind, RecordPatch};
use crate::notify::{
    FeedItem, NotificationOutcome, Notifier, build_feed, notifier_from_env, notify_overdue,
};
use crate::query::{FilterSet, Sort};
use crate::seed::seed_store;
use crate::storage::json_store;
use crate::store::EntityStore;
use log::info;
use std::path::Path;
use time::{OffsetDateTime, UtcOffset};

/// The current instant in the machine's local offset, falling back to UTC.
pub fn local_now() -> OffsetDateTime {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetDateTime::now_utc().to_offset(offset)
}

pub fn create_record(draft: RecordDraft) -> Result<Record, AppError> {
    let path = json_store::store_path()?;
    create_record_with_path(&path, draft, local_now())
}

pub fn patch_record(id: &str, patch: &RecordPatch) -> Result<Record, AppError> {
    let path = json_store::store_path()?;
    patch_record_with_path(&path, id, patch, local_now())
}

pub fn advance_status(id: &str) -> Result<Record, AppError> {
    let path = json_store::store_path()?;
    advance_status_with_path(&path, id, local_now())
}

pub fn force_complete(id: &str) -> Result<Record, AppError> {
    let path = json_store::store_path()?;
    force_complete_with_path(&path, id, local_now())
}

pub fn reopen(id: &str) -> Result<Record, AppError> {
    let path = json_store::store_path()?;
    reopen_with_path(&path, id, local_now())
}

pub fn add_note(id: &str, text: &str, attachments: Vec<String>) -> Result<Record, AppError> {
    let path = json_store::store_path()?;
    add_note_with_path(&path, id, text, attachments, local_now())
}

pub fn delegate(id: &str, draft: DelegationDraft) -> Result<Record, AppError> {
    let path = json_store::store_path()?;
    delegate_with_path(&path, id, draft, local_now())
}

pub fn accept(id: &str) -> Result<Record, AppError> {
    let path = json_store::store_path()?;
    accept_with_path(&path, id, local_now())
}

pub fn get_record(id: &str) -> Result<Record, AppError> {
    let path = json_store::store_path()?;
    get_record_with_path(&path, id, local_now())
}

pub fn list_records(
    kind: RecordKind,
    filters: FilterSet,
    sort: Sort,
) -> Result<Vec<Record>, AppError> {
    let path = json_store::store_path()?;
    list_records_with_path(&path, kind, filters, sort, local_now())
}

pub fn bucketed_view(
    kind: RecordKind,
    filters: FilterSet,
    sort: Sort,
) -> Result<BucketedView, AppError> {
    let path = json_store::store_path()?;
    bucketed_view_with_path(&path, kind, filters, sort, local_now())
}

pub fn summary() -> Result<DashboardSummary, AppError> {
    let path = json_store::store_path()?;
    let now = local_now();
    Ok(summarize(&open_store(&path, now)?, now))
}

pub fn inbox() -> Result<Vec<FeedItem>, AppError> {
    let path = json_store::store_path()?;
    let now = local_now();
    Ok(build_feed(&open_store(&path, now)?, now))
}

pub fn notify_overdue_records() -> Result<NotificationOutcome, AppError> {
    let path = json_store::store_path()?;
    let notifier = notifier_from_env()?;
    notify_overdue_with_path(&path, notifier.as_ref(), local_now())
}

pub fn reset() -> Result<usize, AppError> {
    let path = json_store::store_path()?;
    reset_with_path(&path, local_now())
}

fn open_store(path: &Path, now: OffsetDateTime) -> Result<EntityStore, AppError> {
    match json_store::load_store(path)? {
        Some(store) => Ok(store),
        None => {
            info!("event=session_seed path={}", path.display());
            seed_store(now)
        }
    }
}

fn mutate_with_path<T>(
    path: &Path,
    now: OffsetDateTime,
    operation: impl FnOnce(&mut Engine) -> Result<T, AppError>,
) -> Result<T, AppError> {
    let mut engine = Engine::new(open_store(path, now)?);
    let result = operation(&mut engine)?;
    json_store::save_store(path, engine.store())?;
    Ok(result)
}

fn create_record_with_path(
    path: &Path,
    draft: RecordDraft,
    now: OffsetDateTime,
) -> Result<Record, AppError> {
    mutate_with_path(path, now, |engine| engine.create_record(draft, now))
}

fn patch_record_with_path(
    path: &Path,
    id: &str,
    patch: &RecordPatch,
    now: OffsetDateTime,
) -> Result<Record, AppError> {
    if patch.is_empty() {
        return Err(AppError::invalid_input("nothing to update"));
    }
    mutate_with_path(path, now, |engine| engine.patch_record(id, patch))
}

fn advance_status_with_path(path: &Path, id: &str, now: OffsetDateTime) -> Result<Record, AppError> {
    mutate_with_path(path, now, |engine| engine.advance_status(id))
}

fn force_complete_with_path(path: &Path, id: &str, now: OffsetDateTime) -> Result<Record, AppError> {
    mutate_with_path(path, now, |engine| engine.force_complete(id))
}

fn reopen_with_path(path: &Path, id: &str, now: OffsetDateTime) -> Result<Record, AppError> {
    mutate_with_path(path, now, |engine| engine.reopen(id))
}

fn add_note_with_path(
    path: &Path,
    id: &str,
    text: &str,
    attachments: Vec<String>,
    now: OffsetDateTime,
) -> Result<Record, AppError> {
    mutate_with_path(path, now, |engine| engine.add_note(id, text, attachments, now))
}

fn delegate_with_path(
    path: &Path,
    id: &str,
    draft: DelegationDraft,
    now: OffsetDateTime,
) -> Result<Record, AppError> {
    mutate_with_path(path, now, |engine| engine.delegate(id, draft, now))
}

fn accept_with_path(path: &Path, id: &str, now: OffsetDateTime) -> Result<Record, AppError> {
    mutate_with_path(path, now, |engine| engine.accept(id, now))
}

fn get_record_with_path(path: &Path, id: &str, now: OffsetDateTime) -> Result<Record, AppError> {
    let engine = Engine::new(open_store(path, now)?);
    engine.get(id).cloned()
}

fn list_records_with_path(
    path: &Path,
    kind: RecordKind,
    filters: FilterSet,
    sort: Sort,
    now: OffsetDateTime,
) -> Result<Vec<Record>, AppError> {
    let engine = Engine::new(open_store(path, now)?);
    engine.filtered_list(kind, &filters, sort)
}

fn bucketed_view_with_path(
    path: &Path,
    kind: RecordKind,
    filters: FilterSet,
    sort: Sort,
    now: OffsetDateTime,
) -> Result<BucketedView, AppError> {
    let mut engine = Engine::new(open_store(path, now)?);
    engine.set_filters(kind, filters)?;
    engine.set_sort(kind, sort);
    Ok(engine.bucketed_view(kind, now))
}

fn notify_overdue_with_path(
    path: &Path,
    notifier: &dyn Notifier,
    now: OffsetDateTime,
) -> Result<NotificationOutcome, AppError> {
    Ok(notify_overdue(&open_store(path, now)?, now, notifier))
}

fn reset_with_path(path: &Path, now: OffsetDateTime) -> Result<usize, AppError> {
    json_store::clear(path)?;
    let store = seed_store(now)?;
    json_store::save_store(path, &store)?;
    info!("event=session_reset records={}", store.len());
    Ok(store.len())
}
