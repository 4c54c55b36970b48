use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

/// Which collection a record lives in.
///
/// The tag is explicit so dispatch over kinds is exhaustive instead of being
/// inferred from which optional fields happen to be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    OwnerTask,
    HodTask,
    SelfTask,
    Kra,
    Department,
    Purchase,
}

impl RecordKind {
    pub const ALL: [RecordKind; 6] = [
        RecordKind::OwnerTask,
        RecordKind::HodTask,
        RecordKind::SelfTask,
        RecordKind::Kra,
        RecordKind::Department,
        RecordKind::Purchase,
    ];

    pub fn id_prefix(self) -> &'static str {
        match self {
            RecordKind::OwnerTask => "mt",
            RecordKind::HodTask => "hd",
            RecordKind::SelfTask => "st",
            RecordKind::Kra => "kra",
            RecordKind::Department => "dept",
            RecordKind::Purchase => "ph",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RecordKind::OwnerTask => "owner_task",
            RecordKind::HodTask => "hod_task",
            RecordKind::SelfTask => "self_task",
            RecordKind::Kra => "kra",
            RecordKind::Department => "department",
            RecordKind::Purchase => "purchase",
        }
    }

    /// Kinds whose records must carry a due timestamp.
    pub fn is_task_like(self) -> bool {
        matches!(
            self,
            RecordKind::OwnerTask | RecordKind::HodTask | RecordKind::SelfTask
        )
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RecordKind {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "owner_task" | "owner" | "my" | "mine" => Ok(RecordKind::OwnerTask),
            "hod_task" | "hod" => Ok(RecordKind::HodTask),
            "self_task" | "self" => Ok(RecordKind::SelfTask),
            "kra" | "kras" => Ok(RecordKind::Kra),
            "department" | "departments" | "dept" => Ok(RecordKind::Department),
            "purchase" | "purchases" => Ok(RecordKind::Purchase),
            _ => Err(AppError::invalid_input(format!(
                "unknown record kind '{}'",
                raw.trim()
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[serde(alias = "Low")]
    Low,
    #[serde(alias = "Medium", alias = "Med", alias = "med")]
    Medium,
    #[serde(alias = "High")]
    High,
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

impl FromStr for Priority {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" | "med" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(AppError::invalid_input(format!(
                "unknown priority '{}'",
                raw.trim()
            ))),
        }
    }
}

/// Whether an owner task asks for work or for an answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    #[default]
    Task,
    Question,
}

impl TaskType {
    pub fn label(self) -> &'static str {
        match self {
            TaskType::Task => "task",
            TaskType::Question => "question",
        }
    }
}

impl FromStr for TaskType {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "task" => Ok(TaskType::Task),
            "question" => Ok(TaskType::Question),
            _ => Err(AppError::invalid_input(format!(
                "unknown task type '{}'",
                raw.trim()
            ))),
        }
    }
}

/// A dated progress entry on a HOD task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressNote {
    pub text: String,
    #[serde(default)]
    pub attachments: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
}

/// A HOD task handed on to a staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegation {
    pub staff: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub due_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DelegationDraft {
    pub staff: String,
    pub notes: Option<String>,
    /// Internal due date for the staff member, separate from the task's own.
    pub due_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub kind: RecordKind,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub starts_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub due_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub priority: Option<Priority>,
    pub status: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub hod: Option<String>,
    #[serde(default)]
    pub kra: Option<String>,
    #[serde(default)]
    pub staff: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub amount: Option<u64>,
    #[serde(default)]
    pub task_type: TaskType,
    /// Newest first.
    #[serde(default)]
    pub notes: Vec<ProgressNote>,
    /// In the order they were made.
    #[serde(default)]
    pub delegations: Vec<Delegation>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub accepted_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Record {
    /// The date a record is filed under: its due date, else its creation time.
    pub fn reference_at(&self) -> OffsetDateTime {
        self.due_at.unwrap_or(self.created_at)
    }
}

/// Input for creating a record. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDraft {
    pub kind: RecordKind,
    pub title: String,
    pub description: Option<String>,
    pub starts_at: Option<OffsetDateTime>,
    pub due_at: Option<OffsetDateTime>,
    pub priority: Option<Priority>,
    /// Initial status; the kind's first status when absent.
    pub status: Option<String>,
    pub department: Option<String>,
    pub hod: Option<String>,
    pub kra: Option<String>,
    pub staff: Option<String>,
    pub owner: Option<String>,
    pub category: Option<String>,
    pub vendor: Option<String>,
    pub tags: Vec<String>,
    pub amount: Option<u64>,
    pub task_type: TaskType,
}

impl RecordDraft {
    pub fn new<T: Into<String>>(kind: RecordKind, title: T) -> Self {
        Self {
            kind,
            title: title.into(),
            description: None,
            starts_at: None,
            due_at: None,
            priority: None,
            status: None,
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
        }
    }
}

/// Partial update. `None` leaves a field alone; `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub starts_at: Option<Option<OffsetDateTime>>,
    pub due_at: Option<Option<OffsetDateTime>>,
    pub priority: Option<Option<Priority>>,
    pub status: Option<String>,
    pub department: Option<Option<String>>,
    pub hod: Option<Option<String>>,
    pub kra: Option<Option<String>>,
    pub staff: Option<Option<String>>,
    pub owner: Option<Option<String>>,
    pub category: Option<Option<String>>,
    pub vendor: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub amount: Option<Option<u64>>,
    pub task_type: Option<TaskType>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        *self == RecordPatch::default()
    }

    /// Copies every set field onto `record`. Status bookkeeping is left to the caller.
    pub fn apply(&self, record: &mut Record) {
        if let Some(title) = self.title.as_ref() {
            record.title = title.trim().to_string();
        }
        if let Some(status) = self.status.as_ref() {
            record.status = status.clone();
        }
        if let Some(tags) = self.tags.as_ref() {
            record.tags = tags.clone();
        }
        if let Some(starts_at) = self.starts_at {
            record.starts_at = starts_at;
        }
        if let Some(due_at) = self.due_at {
            record.due_at = due_at;
        }
        if let Some(priority) = self.priority {
            record.priority = priority;
        }
        if let Some(amount) = self.amount {
            record.amount = amount;
        }
        if let Some(task_type) = self.task_type {
            record.task_type = task_type;
        }

        let text_fields = [
            (&self.description, &mut record.description),
            (&self.department, &mut record.department),
            (&self.hod, &mut record.hod),
            (&self.kra, &mut record.kra),
            (&self.staff, &mut record.staff),
            (&self.owner, &mut record.owner),
            (&self.category, &mut record.category),
            (&self.vendor, &mut record.vendor),
        ];
        for (update, target) in text_fields {
            if let Some(value) = update {
                *target = value.as_deref().map(str::trim).map(str::to_string);
            }
        }
    }
}
