use crate::bucket::BucketedView;
use crate::error::AppError;
use crate::model::{DelegationDraft, Record, RecordDraft, RecordKind, RecordPatch};
use crate::query::{self, FilterSet, Sort};
use crate::status::StatusTable;
use crate::store::EntityStore;
use log::info;
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// Filters and sort currently applied to one kind's list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub filters: FilterSet,
    pub sort: Sort,
}

#[derive(Debug, Clone, Copy)]
enum Transition {
    Advance,
    ForceComplete,
    Reopen,
}

impl Transition {
    fn event(self) -> &'static str {
        match self {
            Transition::Advance => "record_advance",
            Transition::ForceComplete => "record_complete",
            Transition::Reopen => "record_reopen",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Engine {
    store: EntityStore,
    views: BTreeMap<RecordKind, ViewState>,
}

impl Engine {
    pub fn new(store: EntityStore) -> Self {
        Self {
            store,
            views: BTreeMap::new(),
        }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn get(&self, id: &str) -> Result<&Record, AppError> {
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(AppError::invalid_input("id is required"));
        }
        self.store
            .get(trimmed)
            .ok_or_else(|| AppError::not_found(trimmed))
    }

    pub fn create_record(
        &mut self,
        draft: RecordDraft,
        now: OffsetDateTime,
    ) -> Result<Record, AppError> {
        let kind = draft.kind;
        let id = self.store.insert(draft, now)?;
        info!("event=record_insert kind={kind} id={id}");
        self.get(&id).cloned()
    }

    pub fn patch_record(&mut self, id: &str, patch: &RecordPatch) -> Result<Record, AppError> {
        let updated = self.store.patch(id.trim(), patch)?;
        info!(
            "event=record_patch kind={} id={} status={}",
            updated.kind, updated.id, updated.status
        );
        Ok(updated)
    }

    pub fn advance_status(&mut self, id: &str) -> Result<Record, AppError> {
        self.transition(id, Transition::Advance)
    }

    pub fn force_complete(&mut self, id: &str) -> Result<Record, AppError> {
        self.transition(id, Transition::ForceComplete)
    }

    pub fn reopen(&mut self, id: &str) -> Result<Record, AppError> {
        self.transition(id, Transition::Reopen)
    }

    pub fn add_note(
        &mut self,
        id: &str,
        text: &str,
        attachments: Vec<String>,
        now: OffsetDateTime,
    ) -> Result<Record, AppError> {
        let updated = self.store.add_note(id.trim(), text, attachments, now)?;
        info!("event=record_note id={} notes={}", updated.id, updated.notes.len());
        Ok(updated)
    }

    pub fn delegate(
        &mut self,
        id: &str,
        draft: DelegationDraft,
        now: OffsetDateTime,
    ) -> Result<Record, AppError> {
        let updated = self.store.delegate(id.trim(), draft, now)?;
        info!(
            "event=record_delegate id={} delegations={}",
            updated.id,
            updated.delegations.len()
        );
        Ok(updated)
    }

    pub fn accept(&mut self, id: &str, now: OffsetDateTime) -> Result<Record, AppError> {
        let updated = self.store.accept(id.trim(), now)?;
        info!("event=record_accept id={} status={}", updated.id, updated.status);
        Ok(updated)
    }

    fn transition(&mut self, id: &str, transition: Transition) -> Result<Record, AppError> {
        let current = self.get(id)?;
        let table = StatusTable::for_kind(current.kind);
        let from = current.status.clone();
        let next = match transition {
            Transition::Advance => table.advance(current),
            Transition::ForceComplete => table.force_complete(current),
            Transition::Reopen => table.reopen(current),
        };

        let updated = self.store.replace(next)?;
        info!(
            "event={} kind={} id={} from={:?} to={:?} completed={}",
            transition.event(),
            updated.kind,
            updated.id,
            from,
            updated.status,
            updated.completed
        );
        Ok(updated)
    }

    pub fn set_filters(&mut self, kind: RecordKind, filters: FilterSet) -> Result<(), AppError> {
        filters.validate()?;
        self.views.entry(kind).or_default().filters = filters;
        info!("event=view_filters kind={kind}");
        Ok(())
    }

    pub fn set_sort(&mut self, kind: RecordKind, sort: Sort) {
        self.views.entry(kind).or_default().sort = sort;
        info!(
            "event=view_sort kind={kind} key={:?} direction={:?}",
            sort.key, sort.direction
        );
    }

    pub fn view_state(&self, kind: RecordKind) -> ViewState {
        self.views.get(&kind).cloned().unwrap_or_default()
    }

    /// The kind's list after its current filters and sort, split into buckets.
    pub fn bucketed_view(&self, kind: RecordKind, now: OffsetDateTime) -> BucketedView {
        BucketedView::build(&self.current_list(kind), now)
    }

    pub fn filtered_list(
        &self,
        kind: RecordKind,
        filters: &FilterSet,
        sort: Sort,
    ) -> Result<Vec<Record>, AppError> {
        filters.validate()?;
        Ok(query::apply(self.store.list(kind), filters, sort))
    }

    pub fn current_list(&self, kind: RecordKind) -> Vec<Record> {
        let view = self.view_state(kind);
        query::apply(self.store.list(kind), &view.filters, view.sort)
    }
}

#[cfg(test)]
mod tests {
    use super::Engine;
    use crate::bucket::Bucket;
    use crate::model::{DelegationDraft, RecordDraft, RecordKind, RecordPatch};
    use crate::query::{BucketFilter, FilterSet, Selection, Sort, SortDirection, SortKey};
    use crate::store::EntityStore;
    use time::macros::datetime;
    use time::{Duration, OffsetDateTime};

    const NOW: OffsetDateTime = datetime!(2026-09-07 09:30 +05:30);

    fn hod_task(title: &str, department: &str, due_in_days: i64) -> RecordDraft {
        let mut draft = RecordDraft::new(RecordKind::HodTask, title);
        draft.department = Some(department.to_string());
        draft.hod = Some("R. Singh".to_string());
        draft.due_at = Some(NOW + Duration::days(due_in_days));
        draft
    }

    fn engine_with(drafts: Vec<RecordDraft>) -> Engine {
        let mut engine = Engine::new(EntityStore::new());
        for draft in drafts {
            engine.create_record(draft, NOW).unwrap();
        }
        engine
    }

    #[test]
    fn create_record_returns_stored_record() {
        let mut engine = Engine::default();
        let record = engine
            .create_record(hod_task("PTM invites", "Academics", 1), NOW)
            .unwrap();

        assert_eq!(record.id, "hd-1");
        assert_eq!(record.status, "New");
        assert_eq!(engine.get("hd-1").unwrap(), &record);
    }

    #[test]
    fn advance_walks_table_and_wraps_from_terminal() {
        let mut engine = engine_with(vec![hod_task("Lab servicing", "Science", 2)]);

        let statuses: Vec<(String, bool)> = (0..4)
            .map(|_| {
                let record = engine.advance_status("hd-1").unwrap();
                (record.status, record.completed)
            })
            .collect();

        assert_eq!(
            statuses,
            vec![
                ("In Progress".to_string(), false),
                ("Overdue".to_string(), false),
                ("Completed".to_string(), true),
                ("New".to_string(), false),
            ]
        );
    }

    #[test]
    fn force_complete_and_reopen_move_between_buckets() {
        let mut engine = engine_with(vec![hod_task("Fee reminders", "Finance", -1)]);
        assert_eq!(engine.bucketed_view(RecordKind::HodTask, NOW).overdue.len(), 1);

        engine.force_complete("hd-1").unwrap();
        let view = engine.bucketed_view(RecordKind::HodTask, NOW);
        assert!(view.overdue.is_empty());
        assert_eq!(view.completed[0].status, "Completed");

        let reopened = engine.reopen("hd-1").unwrap();
        assert_eq!(reopened.status, "New");
        assert_eq!(engine.bucketed_view(RecordKind::HodTask, NOW).overdue.len(), 1);
    }

    #[test]
    fn lifecycle_on_unknown_id_is_not_found_and_changes_nothing() {
        let mut engine = engine_with(vec![hod_task("Bus audit", "Transport", 0)]);
        let before = engine.store().list(RecordKind::HodTask).to_vec();

        for result in [
            engine.advance_status("hd-404"),
            engine.force_complete("hd-404"),
            engine.reopen("hd-404"),
            engine.patch_record("hd-404", &RecordPatch::default()),
        ] {
            assert_eq!(result.unwrap_err().code(), "not_found");
        }
        assert_eq!(engine.store().list(RecordKind::HodTask), before.as_slice());
    }

    #[test]
    fn hod_workflow_keeps_status_editable() {
        let mut engine = engine_with(vec![hod_task("Exam hall plan", "Academics", 1)]);

        engine.accept(" hd-1 ", NOW).unwrap();
        engine
            .delegate(
                "hd-1",
                DelegationDraft {
                    staff: "P. Nair".to_string(),
                    ..DelegationDraft::default()
                },
                NOW,
            )
            .unwrap();
        engine.add_note("hd-1", "Seating drafted", Vec::new(), NOW).unwrap();
        let advanced = engine.advance_status("hd-1").unwrap();

        assert_eq!(advanced.status, "In Progress");
        assert_eq!(advanced.accepted_at, Some(NOW));
        assert_eq!(advanced.delegations.len(), 1);
        assert_eq!(advanced.notes[0].text, "Seating drafted");
    }

    #[test]
    fn current_list_uses_stored_filters_and_sort() {
        let mut engine = engine_with(vec![
            hod_task("Zoology fieldwork", "Science", 3),
            hod_task("Bus audit", "Transport", 0),
            hod_task("Atlas refresh", "Science", 1),
        ]);

        engine
            .set_filters(
                RecordKind::HodTask,
                FilterSet {
                    department: Selection::from("Science"),
                    ..FilterSet::default()
                },
            )
            .unwrap();
        engine.set_sort(
            RecordKind::HodTask,
            Sort::new(SortKey::Title, SortDirection::Asc),
        );

        let titles: Vec<String> = engine
            .current_list(RecordKind::HodTask)
            .into_iter()
            .map(|record| record.title)
            .collect();
        assert_eq!(titles, vec!["Atlas refresh", "Zoology fieldwork"]);
        assert_eq!(engine.current_list(RecordKind::SelfTask).len(), 0);
    }

    #[test]
    fn filtered_list_by_bucket_is_empty_when_nothing_overdue() {
        let engine = engine_with(vec![hod_task("Sports", "Sports", 3)]);
        let filters = FilterSet {
            bucket: Some(BucketFilter {
                bucket: Bucket::Overdue,
                now: NOW,
            }),
            ..FilterSet::default()
        };

        let result = engine
            .filtered_list(RecordKind::HodTask, &filters, Sort::default())
            .unwrap();

        assert!(result.is_empty());
    }

    #[test]
    fn set_filters_rejects_inverted_range() {
        let mut engine = Engine::default();
        let filters = FilterSet {
            min_amount: Some(500),
            max_amount: Some(100),
            ..FilterSet::default()
        };

        assert!(engine.set_filters(RecordKind::Purchase, filters).is_err());
        assert_eq!(
            engine.view_state(RecordKind::Purchase).filters,
            FilterSet::default()
        );
    }
}
