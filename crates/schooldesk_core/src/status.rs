use crate::error::AppError;
use crate::model::{Record, RecordKind};

const OWNER_TASK_STATUSES: [&str; 7] = [
    "In progress",
    "Ready to sign",
    "Waiting for info",
    "Needs reschedule",
    "Blocked",
    "Escalated",
    "Done",
];
const HOD_TASK_STATUSES: [&str; 4] = ["New", "In Progress", "Overdue", "Completed"];
const SELF_TASK_STATUSES: [&str; 3] = ["Not started", "In progress", "Completed"];
const PURCHASE_STATUSES: [&str; 3] = ["Submitted", "In review", "Approved"];
const ACTIVATION_STATUSES: [&str; 2] = ["Active", "Inactive"];

/// Ordered statuses for one kind; the last one is terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTable {
    statuses: Vec<String>,
    terminal: String,
}

impl StatusTable {
    pub fn new<I, S, T>(statuses: I, terminal: T) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        T: Into<String>,
    {
        let statuses: Vec<String> = statuses.into_iter().map(Into::into).collect();
        let terminal = terminal.into();

        if statuses.is_empty() {
            return Err(AppError::invalid_input("status table cannot be empty"));
        }
        for (index, status) in statuses.iter().enumerate() {
            if status.trim().is_empty() {
                return Err(AppError::invalid_input("status names cannot be blank"));
            }
            if statuses[..index].contains(status) {
                return Err(AppError::invalid_input(format!(
                    "duplicate status '{status}'"
                )));
            }
        }
        if !statuses.contains(&terminal) {
            return Err(AppError::invalid_input(format!(
                "terminal status '{terminal}' is not in the table"
            )));
        }

        Ok(Self { statuses, terminal })
    }

    /// The built-in table for a record kind.
    pub fn for_kind(kind: RecordKind) -> Self {
        let (statuses, terminal): (&[&str], &str) = match kind {
            RecordKind::OwnerTask => (OWNER_TASK_STATUSES.as_slice(), "Done"),
            RecordKind::HodTask => (HOD_TASK_STATUSES.as_slice(), "Completed"),
            RecordKind::SelfTask => (SELF_TASK_STATUSES.as_slice(), "Completed"),
            RecordKind::Purchase => (PURCHASE_STATUSES.as_slice(), "Approved"),
            RecordKind::Kra | RecordKind::Department => {
                (ACTIVATION_STATUSES.as_slice(), "Inactive")
            }
        };
        Self {
            statuses: statuses.iter().map(|status| status.to_string()).collect(),
            terminal: terminal.to_string(),
        }
    }

    pub fn statuses(&self) -> &[String] {
        &self.statuses
    }

    pub fn initial(&self) -> &str {
        &self.statuses[0]
    }

    pub fn contains(&self, status: &str) -> bool {
        self.statuses.iter().any(|candidate| candidate == status)
    }

    pub fn is_terminal(&self, status: &str) -> bool {
        self.terminal == status
    }

    /// The status after `current`, wrapping from the last back to the first.
    /// Unknown statuses restart at the first entry.
    pub fn next_status(&self, current: &str) -> &str {
        match self.statuses.iter().position(|status| status == current) {
            Some(index) => &self.statuses[(index + 1) % self.statuses.len()],
            None => self.initial(),
        }
    }

    pub fn advance(&self, record: &Record) -> Record {
        let next = self.next_status(&record.status).to_string();
        self.with_status(record, next)
    }

    pub fn force_complete(&self, record: &Record) -> Record {
        self.with_status(record, self.terminal.clone())
    }

    pub fn reopen(&self, record: &Record) -> Record {
        self.with_status(record, self.initial().to_string())
    }

    fn with_status(&self, record: &Record, status: String) -> Record {
        let mut updated = record.clone();
        updated.completed = self.is_terminal(&status);
        updated.status = status;
        updated
    }
}

#[cfg(test)]
mod tests {
    use super::StatusTable;
    use crate::model::{Record, RecordKind, TaskType};
    use time::macros::datetime;

    fn record_with_status(kind: RecordKind, status: &str) -> Record {
        Record {
            id: "rec-1".to_string(),
            kind,
            title: "Annual day rehearsal".to_string(),
            description: None,
            starts_at: None,
            due_at: Some(datetime!(2026-04-01 10:00 UTC)),
            priority: None,
            status: status.to_string(),
            completed: false,
            department: None,
            hod: None,
            kra: None,
            staff: None,
            owner: None,
            category: None,
            vendor: None,
            tags: Vec::new(),
            amount: None,
            task_type: TaskType::Task,
            notes: Vec::new(),
            delegations: Vec::new(),
            accepted_at: None,
            created_at: datetime!(2026-03-20 10:00 UTC),
        }
    }

    #[test]
    fn next_status_cycles_back_after_full_length() {
        for kind in RecordKind::ALL {
            let table = StatusTable::for_kind(kind);
            for start in table.statuses() {
                let mut current = start.clone();
                for _ in 0..table.statuses().len() {
                    current = table.next_status(&current).to_string();
                }
                assert_eq!(&current, start, "{kind} did not close its cycle");
            }
        }
    }

    #[test]
    fn next_status_of_unknown_value_restarts() {
        let table = StatusTable::for_kind(RecordKind::OwnerTask);
        assert_eq!(table.next_status("Archived"), "In progress");
    }

    #[test]
    fn advance_from_terminal_wraps_and_clears_completion() {
        let table = StatusTable::new(["New", "In Progress", "Completed"], "Completed").unwrap();
        let mut record = record_with_status(RecordKind::HodTask, "Completed");
        record.completed = true;

        let advanced = table.advance(&record);

        assert_eq!(advanced.status, "New");
        assert!(!advanced.completed);
    }

    #[test]
    fn advance_into_terminal_sets_completion_then_leaves_it() {
        let table = StatusTable::for_kind(RecordKind::SelfTask);
        let record = record_with_status(RecordKind::SelfTask, "In progress");

        let finished = table.advance(&record);
        assert_eq!(finished.status, "Completed");
        assert!(finished.completed);

        let wrapped = table.advance(&finished);
        assert_eq!(wrapped.status, "Not started");
        assert!(!wrapped.completed);
    }

    #[test]
    fn force_complete_changes_only_status_fields() {
        let table = StatusTable::for_kind(RecordKind::OwnerTask);
        let record = record_with_status(RecordKind::OwnerTask, "Blocked");

        let done = table.force_complete(&record);

        assert_eq!(done.status, "Done");
        assert!(done.completed);
        assert_eq!(done.title, record.title);
        assert_eq!(done.due_at, record.due_at);
        assert_eq!(done.created_at, record.created_at);
    }

    #[test]
    fn reopen_returns_to_first_status() {
        let table = StatusTable::for_kind(RecordKind::Purchase);
        let mut record = record_with_status(RecordKind::Purchase, "Approved");
        record.completed = true;

        let reopened = table.reopen(&record);

        assert_eq!(reopened.status, "Submitted");
        assert!(!reopened.completed);
    }

    #[test]
    fn department_toggle_alternates_between_two_states() {
        let table = StatusTable::for_kind(RecordKind::Department);
        let active = record_with_status(RecordKind::Department, "Active");

        let inactive = table.advance(&active);
        assert_eq!(inactive.status, "Inactive");
        assert_eq!(table.advance(&inactive).status, "Active");
    }

    #[test]
    fn new_rejects_malformed_tables() {
        assert!(StatusTable::new(Vec::<String>::new(), "Done").is_err());
        assert!(StatusTable::new(["Open", "Open", "Done"], "Done").is_err());
        assert!(StatusTable::new(["Open", "Done"], "Closed").is_err());
        assert!(StatusTable::new(["Open", " "], "Open").is_err());
    }
}
