use crate::error::{AppError, FieldError};
use crate::model::{Record, RecordDraft, RecordKind, TaskType};
use crate::status::StatusTable;
use time::OffsetDateTime;

const KRA_DESCRIPTION_MIN_CHARS: usize = 10;

pub fn validate_draft(draft: &RecordDraft) -> Result<(), AppError> {
    let mut errors = Vec::new();
    let table = StatusTable::for_kind(draft.kind);

    if let Some(status) = draft.status.as_deref()
        && !table.contains(status)
    {
        errors.push(unknown_status(draft.kind, status));
    }

    collect_field_errors(
        &FieldView {
            kind: draft.kind,
            title: &draft.title,
            description: draft.description.as_deref(),
            starts_at: draft.starts_at,
            due_at: draft.due_at,
            department: draft.department.as_deref(),
            hod: draft.hod.as_deref(),
            kra: draft.kra.as_deref(),
            owner: draft.owner.as_deref(),
            category: draft.category.as_deref(),
            vendor: draft.vendor.as_deref(),
            amount: draft.amount,
            task_type: draft.task_type,
        },
        &mut errors,
    );

    finish(errors)
}

/// Checks a record as it would look after a patch.
pub fn validate_record(record: &Record) -> Result<(), AppError> {
    let mut errors = Vec::new();
    let table = StatusTable::for_kind(record.kind);

    if !table.contains(&record.status) {
        errors.push(unknown_status(record.kind, &record.status));
    }

    collect_field_errors(
        &FieldView {
            kind: record.kind,
            title: &record.title,
            description: record.description.as_deref(),
            starts_at: record.starts_at,
            due_at: record.due_at,
            department: record.department.as_deref(),
            hod: record.hod.as_deref(),
            kra: record.kra.as_deref(),
            owner: record.owner.as_deref(),
            category: record.category.as_deref(),
            vendor: record.vendor.as_deref(),
            amount: record.amount,
            task_type: record.task_type,
        },
        &mut errors,
    );

    finish(errors)
}

struct FieldView<'a> {
    kind: RecordKind,
    title: &'a str,
    description: Option<&'a str>,
    starts_at: Option<OffsetDateTime>,
    due_at: Option<OffsetDateTime>,
    department: Option<&'a str>,
    hod: Option<&'a str>,
    kra: Option<&'a str>,
    owner: Option<&'a str>,
    category: Option<&'a str>,
    vendor: Option<&'a str>,
    amount: Option<u64>,
    task_type: TaskType,
}

fn collect_field_errors(view: &FieldView<'_>, errors: &mut Vec<FieldError>) {
    if is_blank(Some(view.title)) {
        errors.push(FieldError::new("title", "Title is required"));
    }

    if view.kind.is_task_like() && view.due_at.is_none() {
        errors.push(FieldError::new("due_at", "Due date is required"));
    }

    match view.kind {
        RecordKind::OwnerTask => {
            require(view.department, "department", "Select a department", errors);
            require(view.kra, "kra", "Select a KRA", errors);
            require(view.description, "description", "Description is required", errors);
            if view.starts_at.is_none() {
                errors.push(FieldError::new("starts_at", "Start date is required"));
            }
        }
        RecordKind::HodTask => {
            require(view.department, "department", "Select a department", errors);
            require(view.hod, "hod", "Assign a HOD", errors);
        }
        RecordKind::SelfTask => {
            require(view.description, "description", "Description is required", errors);
        }
        RecordKind::Kra => {
            require(view.department, "department", "Select a department", errors);
            require(view.owner, "owner", "Assign an owner", errors);
            let description_len = view
                .description
                .map(|text| text.trim().chars().count())
                .unwrap_or(0);
            if description_len < KRA_DESCRIPTION_MIN_CHARS {
                errors.push(FieldError::new("description", "Add a short description"));
            }
        }
        RecordKind::Department => {
            require(view.hod, "hod", "Assign a HOD", errors);
        }
        RecordKind::Purchase => {
            if view.due_at.is_none() {
                errors.push(FieldError::new("due_at", "Pick a date"));
            }
            require(view.category, "category", "Category is required", errors);
            require(view.vendor, "vendor", "Vendor is required", errors);
            require(view.description, "description", "Purpose is required", errors);
            match view.amount {
                None => errors.push(FieldError::new("amount", "Amount is required")),
                Some(0) => errors.push(FieldError::new("amount", "Amount must be at least 1")),
                Some(_) => {}
            }
        }
    }

    if view.task_type == TaskType::Question && view.kind != RecordKind::OwnerTask {
        errors.push(FieldError::new("task_type", "Only owner tasks can be questions"));
    }

    if let (Some(starts_at), Some(due_at)) = (view.starts_at, view.due_at)
        && starts_after_due(starts_at, due_at)
    {
        let message = "Start date must be on or before the due date";
        errors.push(FieldError::new("starts_at", message));
        errors.push(FieldError::new("due_at", message));
    }
}

/// Compared by calendar day in the due date's offset.
fn starts_after_due(starts_at: OffsetDateTime, due_at: OffsetDateTime) -> bool {
    starts_at.to_offset(due_at.offset()).date() > due_at.date()
}

fn require(
    value: Option<&str>,
    field: &'static str,
    message: &str,
    errors: &mut Vec<FieldError>,
) {
    if is_blank(value) {
        errors.push(FieldError::new(field, message));
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|text| text.trim().is_empty())
}

fn unknown_status(kind: RecordKind, status: &str) -> FieldError {
    FieldError::new("status", format!("'{status}' is not a {kind} status"))
}

fn finish(errors: Vec<FieldError>) -> Result<(), AppError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}
