use crate::error::{AppError, FieldError};
use crate::model::{
    Delegation, DelegationDraft, ProgressNote, Record, RecordDraft, RecordKind, RecordPatch,
};
use crate::status::StatusTable;
use crate::validate::{validate_draft, validate_record};
use log::debug;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use time::OffsetDateTime;

/// Records grouped by kind. Collections are copy-on-write, so a
/// [`EntityStore::snapshot`] never changes underneath its holder.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    collections: BTreeMap<RecordKind, Arc<Vec<Record>>>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a session store from seed or snapshot records, keeping their order.
    pub fn from_records(records: Vec<Record>) -> Result<Self, AppError> {
        let mut seen = HashSet::new();
        let mut collections: BTreeMap<RecordKind, Vec<Record>> = BTreeMap::new();

        for mut record in records {
            if record.id.trim().is_empty() {
                return Err(AppError::invalid_data("record id cannot be blank"));
            }
            if !seen.insert(record.id.clone()) {
                return Err(AppError::invalid_data(format!(
                    "duplicate record id '{}'",
                    record.id
                )));
            }
            let table = StatusTable::for_kind(record.kind);
            if !table.contains(&record.status) {
                return Err(AppError::invalid_data(format!(
                    "record '{}' has unknown {} status '{}'",
                    record.id, record.kind, record.status
                )));
            }
            record.completed = table.is_terminal(&record.status);
            collections.entry(record.kind).or_default().push(record);
        }

        Ok(Self {
            collections: collections
                .into_iter()
                .map(|(kind, records)| (kind, Arc::new(records)))
                .collect(),
        })
    }

    /// Records of one kind in insertion order.
    pub fn list(&self, kind: RecordKind) -> &[Record] {
        self.collections
            .get(&kind)
            .map(|records| records.as_slice())
            .unwrap_or(&[])
    }

    /// A shared handle on the current collection; later mutations do not affect it.
    pub fn snapshot(&self, kind: RecordKind) -> Arc<Vec<Record>> {
        self.collections.get(&kind).cloned().unwrap_or_default()
    }

    /// Every record, grouped by kind.
    pub fn all_records(&self) -> impl Iterator<Item = &Record> {
        self.collections.values().flat_map(|records| records.iter())
    }

    pub fn len(&self) -> usize {
        self.collections.values().map(|records| records.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.all_records().find(|record| record.id == id)
    }

    pub fn insert(&mut self, draft: RecordDraft, now: OffsetDateTime) -> Result<String, AppError> {
        validate_draft(&draft)?;

        let table = StatusTable::for_kind(draft.kind);
        let status = draft
            .status
            .unwrap_or_else(|| table.initial().to_string());
        let id = self.next_id(draft.kind)?;

        let record = Record {
            id: id.clone(),
            kind: draft.kind,
            title: draft.title.trim().to_string(),
            description: clean_text(draft.description),
            starts_at: draft.starts_at,
            due_at: draft.due_at,
            priority: draft.priority,
            completed: table.is_terminal(&status),
            status,
            department: clean_text(draft.department),
            hod: clean_text(draft.hod),
            kra: clean_text(draft.kra),
            staff: clean_text(draft.staff),
            owner: clean_text(draft.owner),
            category: clean_text(draft.category),
            vendor: clean_text(draft.vendor),
            tags: clean_tags(draft.tags),
            amount: draft.amount,
            task_type: draft.task_type,
            notes: Vec::new(),
            delegations: Vec::new(),
            accepted_at: None,
            created_at: now,
        };

        debug!("event=store_insert kind={} id={}", record.kind, record.id);
        Arc::make_mut(self.collections.entry(record.kind).or_default()).push(record);
        Ok(id)
    }

    /// Applies a partial update. `NotFound` or a validation failure leaves the store unchanged.
    pub fn patch(&mut self, id: &str, patch: &RecordPatch) -> Result<Record, AppError> {
        let (kind, index) = self.locate(id)?;
        let mut updated = self.list(kind)[index].clone();

        patch.apply(&mut updated);
        if let Some(tags) = patch.tags.as_ref() {
            updated.tags = clean_tags(tags.clone());
        }
        if patch.status.is_some() {
            updated.completed = StatusTable::for_kind(kind).is_terminal(&updated.status);
        }
        validate_record(&updated)?;

        debug!("event=store_patch kind={} id={}", kind, id);
        self.write(kind, index, updated.clone());
        Ok(updated)
    }

    /// Replaces a record by id after a lifecycle transition.
    pub fn replace(&mut self, record: Record) -> Result<Record, AppError> {
        let (kind, index) = self.locate(&record.id)?;
        if record.kind != kind {
            return Err(AppError::invalid_input(format!(
                "record '{}' cannot change kind from {} to {}",
                record.id, kind, record.kind
            )));
        }
        let current = &self.list(kind)[index];
        if current.created_at != record.created_at {
            return Err(AppError::invalid_input("created_at is immutable"));
        }
        let table = StatusTable::for_kind(kind);
        if !table.contains(&record.status) || table.is_terminal(&record.status) != record.completed
        {
            return Err(AppError::invalid_input(format!(
                "record '{}' has an inconsistent status",
                record.id
            )));
        }

        self.write(kind, index, record.clone());
        Ok(record)
    }

    /// Prepends a progress note to a HOD task.
    pub fn add_note(
        &mut self,
        id: &str,
        text: &str,
        attachments: Vec<String>,
        now: OffsetDateTime,
    ) -> Result<Record, AppError> {
        let (kind, index) = self.locate_hod_task(id, "progress notes")?;
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::Validation(vec![FieldError::new(
                "note",
                "Add a quick note",
            )]));
        }

        let mut updated = self.list(kind)[index].clone();
        updated.notes.insert(
            0,
            ProgressNote {
                text: text.to_string(),
                attachments: clean_tags(attachments),
                at: now,
            },
        );
        debug!("event=store_note id={} notes={}", id, updated.notes.len());
        self.write(kind, index, updated.clone());
        Ok(updated)
    }

    /// Appends a delegation to a HOD task.
    pub fn delegate(
        &mut self,
        id: &str,
        draft: DelegationDraft,
        now: OffsetDateTime,
    ) -> Result<Record, AppError> {
        let (kind, index) = self.locate_hod_task(id, "delegation")?;
        let Some(staff) = clean_text(Some(draft.staff)) else {
            return Err(AppError::Validation(vec![FieldError::new(
                "staff",
                "Staff name is required",
            )]));
        };

        let mut updated = self.list(kind)[index].clone();
        updated.delegations.push(Delegation {
            staff,
            notes: clean_text(draft.notes),
            due_at: draft.due_at,
            at: now,
        });
        debug!("event=store_delegate id={} delegations={}", id, updated.delegations.len());
        self.write(kind, index, updated.clone());
        Ok(updated)
    }

    /// Marks a HOD task accepted. Accepting twice keeps the first time.
    pub fn accept(&mut self, id: &str, now: OffsetDateTime) -> Result<Record, AppError> {
        let (kind, index) = self.locate_hod_task(id, "acceptance")?;
        let current = &self.list(kind)[index];
        if current.accepted_at.is_some() {
            return Ok(current.clone());
        }

        let mut updated = current.clone();
        updated.accepted_at = Some(now);
        debug!("event=store_accept id={}", id);
        self.write(kind, index, updated.clone());
        Ok(updated)
    }

    fn locate_hod_task(&self, id: &str, what: &str) -> Result<(RecordKind, usize), AppError> {
        let (kind, index) = self.locate(id)?;
        if kind != RecordKind::HodTask {
            return Err(AppError::invalid_input(format!(
                "only hod tasks support {what}, '{id}' is a {kind}"
            )));
        }
        Ok((kind, index))
    }

    fn locate(&self, id: &str) -> Result<(RecordKind, usize), AppError> {
        self.collections
            .iter()
            .find_map(|(kind, records)| {
                records
                    .iter()
                    .position(|record| record.id == id)
                    .map(|index| (*kind, index))
            })
            .ok_or_else(|| AppError::not_found(id))
    }

    fn write(&mut self, kind: RecordKind, index: usize, record: Record) {
        if let Some(collection) = self.collections.get_mut(&kind) {
            Arc::make_mut(collection)[index] = record;
        }
    }

    fn next_id(&self, kind: RecordKind) -> Result<String, AppError> {
        let prefix = kind.id_prefix();
        let highest = self
            .all_records()
            .filter_map(|record| record.id.strip_prefix(prefix)?.strip_prefix('-'))
            .filter_map(|suffix| suffix.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        let next = highest.checked_add(1).ok_or_else(|| {
            AppError::invalid_data(format!("no {kind} ids left after '{prefix}-{highest}'"))
        })?;
        Ok(format!("{prefix}-{next}"))
    }
}

fn clean_text(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let trimmed = tag.trim();
        if !trimmed.is_empty() && !cleaned.iter().any(|existing| existing == trimmed) {
            cleaned.push(trimmed.to_string());
        }
    }
    cleaned
}
