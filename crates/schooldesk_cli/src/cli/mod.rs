use clap::{Args, Parser, Subcommand};
use schooldesk_core::config::ConfigOverrides;
use schooldesk_core::dates::parse_when;
use schooldesk_core::error::AppError;
use schooldesk_core::model::{
    DelegationDraft, Priority, RecordDraft, RecordKind, RecordPatch, TaskType,
};
use schooldesk_core::query::{
    BucketFilter, DateRange, FilterSet, Selection, Sort, SortDirection, SortKey,
};
use time::OffsetDateTime;

#[derive(Parser, Debug)]
#[command(name = "schooldesk", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List records of one kind
    ///
    /// Example: schooldesk list hod --department Finance --sort due
    /// Example: schooldesk list purchases --min-amount 20000 --desc
    List {
        kind: String,
        #[command(flatten)]
        filters: FilterArgs,
        /// title | due | created | amount
        #[arg(long)]
        sort: Option<String>,
        /// Sort descending
        #[arg(long)]
        desc: bool,
    },
    /// Show records grouped into due today, overdue, upcoming and completed
    ///
    /// Example: schooldesk board hod
    Board {
        kind: String,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Create a record
    ///
    /// Example: schooldesk add self --title "Call vendor" --description "Fares" --due tomorrow
    Add {
        kind: String,
        #[command(flatten)]
        fields: RecordFields,
    },
    /// Update fields of a record
    ///
    /// Example: schooldesk edit hd-01 --due "in 2d" --priority high
    /// Example: schooldesk edit mt-1 --clear staff
    Edit {
        id: String,
        #[command(flatten)]
        fields: RecordFields,
        /// Clear an optional field
        #[arg(long = "clear", value_name = "FIELD")]
        clear: Vec<String>,
    },
    /// Move a record to its next status
    ///
    /// Example: schooldesk advance hd-01
    Advance { id: String },
    /// Mark a record completed
    ///
    /// Example: schooldesk done st-203
    Done { id: String },
    /// Move a record back to its first status
    ///
    /// Example: schooldesk reopen st-204
    Reopen { id: String },
    /// Show details of a record
    ///
    /// Example: schooldesk show ph-01
    Show { id: String },
    /// Accept a HOD task; its status stays editable
    ///
    /// Example: schooldesk accept hd-01
    Accept { id: String },
    /// Log a progress note on a HOD task
    ///
    /// Example: schooldesk note hd-02 "Drivers briefed" --attach roster.pdf
    Note {
        id: String,
        text: String,
        /// Attached file name; repeat for several
        #[arg(long = "attach", value_name = "FILE")]
        attachments: Vec<String>,
    },
    /// Delegate a HOD task to a staff member
    ///
    /// Example: schooldesk delegate hd-02 --staff "P. Nair" --due friday
    Delegate {
        id: String,
        #[command(flatten)]
        delegation: DelegationArgs,
    },
    /// Home screen summary
    Summary,
    /// Notification feed
    Inbox,
    /// Send desktop notifications for overdue tasks
    Notify,
    /// Discard the saved session and start from the sample data
    Reset,
}

#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    #[arg(long)]
    pub department: Option<String>,
    #[arg(long)]
    pub hod: Option<String>,
    #[arg(long)]
    pub kra: Option<String>,
    #[arg(long)]
    pub tag: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub vendor: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    /// due_today | overdue | upcoming | completed
    #[arg(long)]
    pub bucket: Option<String>,
    #[arg(long, value_name = "RUPEES")]
    pub min_amount: Option<u64>,
    #[arg(long, value_name = "RUPEES")]
    pub max_amount: Option<u64>,
    /// First day included, e.g. 2026-03-01 or yesterday
    #[arg(long, value_name = "WHEN")]
    pub from: Option<String>,
    /// Last day included
    #[arg(long, value_name = "WHEN")]
    pub to: Option<String>,
}

impl FilterArgs {
    pub fn to_filters(&self, now: OffsetDateTime) -> Result<FilterSet, AppError> {
        let select = |value: &Option<String>| {
            value
                .as_deref()
                .map(Selection::parse)
                .unwrap_or_default()
        };
        let day = |value: &Option<String>| -> Result<_, AppError> {
            value
                .as_deref()
                .map(|raw| parse_when(raw, now).map(|at| at.date()))
                .transpose()
        };
        let from = day(&self.from)?;
        let to = day(&self.to)?;
        let bucket = match self.bucket.as_deref() {
            Some(raw) => Some(BucketFilter {
                bucket: raw.parse()?,
                now,
            }),
            None => None,
        };

        Ok(FilterSet {
            department: select(&self.department),
            hod: select(&self.hod),
            kra: select(&self.kra),
            tag: select(&self.tag),
            category: select(&self.category),
            vendor: select(&self.vendor),
            status: select(&self.status),
            bucket,
            min_amount: self.min_amount,
            max_amount: self.max_amount,
            dates: (from.is_some() || to.is_some()).then(|| DateRange::new(from, to, now)),
        })
    }
}

#[derive(Args, Debug, Default, Clone)]
pub struct RecordFields {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Start time, e.g. "2026-03-18 09:00" or today
    #[arg(long, value_name = "WHEN")]
    pub starts: Option<String>,
    /// Due time (purchase date for purchases), e.g. tomorrow or "in 3d"
    #[arg(long, value_name = "WHEN")]
    pub due: Option<String>,
    /// low | medium | high
    #[arg(long)]
    pub priority: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub department: Option<String>,
    #[arg(long)]
    pub hod: Option<String>,
    #[arg(long)]
    pub kra: Option<String>,
    /// Person the task is delegated to
    #[arg(long)]
    pub staff: Option<String>,
    #[arg(long)]
    pub owner: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub vendor: Option<String>,
    /// Repeat for several tags
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,
    #[arg(long, value_name = "RUPEES")]
    pub amount: Option<u64>,
    /// task | question (owner tasks only)
    #[arg(long = "type", value_name = "TYPE")]
    pub task_type: Option<String>,
}

impl RecordFields {
    pub fn into_draft(self, kind: RecordKind, now: OffsetDateTime) -> Result<RecordDraft, AppError> {
        let mut draft = RecordDraft::new(kind, self.title.unwrap_or_default());
        draft.description = self.description;
        draft.starts_at = parse_optional_when(self.starts.as_deref(), now)?;
        draft.due_at = parse_optional_when(self.due.as_deref(), now)?;
        draft.priority = self.priority.as_deref().map(str::parse).transpose()?;
        draft.status = self.status;
        draft.department = self.department;
        draft.hod = self.hod;
        draft.kra = self.kra;
        draft.staff = self.staff;
        draft.owner = self.owner;
        draft.category = self.category;
        draft.vendor = self.vendor;
        draft.tags = self.tags;
        draft.amount = self.amount;
        if let Some(task_type) = self.task_type.as_deref() {
            draft.task_type = task_type.parse()?;
        }
        Ok(draft)
    }

    pub fn into_patch(self, clear: &[String], now: OffsetDateTime) -> Result<RecordPatch, AppError> {
        let priority: Option<Priority> = self.priority.as_deref().map(str::parse).transpose()?;
        let task_type: Option<TaskType> = self.task_type.as_deref().map(str::parse).transpose()?;
        let mut patch = RecordPatch {
            title: self.title,
            description: self.description.map(Some),
            starts_at: parse_optional_when(self.starts.as_deref(), now)?.map(Some),
            due_at: parse_optional_when(self.due.as_deref(), now)?.map(Some),
            priority: priority.map(Some),
            status: self.status,
            department: self.department.map(Some),
            hod: self.hod.map(Some),
            kra: self.kra.map(Some),
            staff: self.staff.map(Some),
            owner: self.owner.map(Some),
            category: self.category.map(Some),
            vendor: self.vendor.map(Some),
            tags: (!self.tags.is_empty()).then_some(self.tags),
            amount: self.amount.map(Some),
            task_type,
        };

        for field in clear {
            match canonicalize_flag_name(field).as_deref() {
                Some("description") => patch.description = Some(None),
                Some("starts" | "starts_at") => patch.starts_at = Some(None),
                Some("due" | "due_at") => patch.due_at = Some(None),
                Some("priority") => patch.priority = Some(None),
                Some("department") => patch.department = Some(None),
                Some("hod") => patch.hod = Some(None),
                Some("kra") => patch.kra = Some(None),
                Some("staff") => patch.staff = Some(None),
                Some("owner") => patch.owner = Some(None),
                Some("category") => patch.category = Some(None),
                Some("vendor") => patch.vendor = Some(None),
                Some("tags" | "tag") => patch.tags = Some(Vec::new()),
                Some("amount") => patch.amount = Some(None),
                _ => {
                    return Err(AppError::invalid_input(format!(
                        "cannot clear field '{}'",
                        field.trim()
                    )));
                }
            }
        }

        Ok(patch)
    }
}

#[derive(Args, Debug, Default, Clone)]
pub struct DelegationArgs {
    #[arg(long)]
    pub staff: Option<String>,
    /// Instructions for the staff member
    #[arg(long)]
    pub note: Option<String>,
    /// Internal due date for the staff member
    #[arg(long, value_name = "WHEN")]
    pub due: Option<String>,
}

impl DelegationArgs {
    pub fn into_draft(self, now: OffsetDateTime) -> Result<DelegationDraft, AppError> {
        Ok(DelegationDraft {
            staff: self.staff.unwrap_or_default(),
            notes: self.note,
            due_at: parse_optional_when(self.due.as_deref(), now)?,
        })
    }
}

fn parse_optional_when(
    raw: Option<&str>,
    now: OffsetDateTime,
) -> Result<Option<OffsetDateTime>, AppError> {
    raw.map(|value| parse_when(value, now)).transpose()
}

/// The sort for `list`: the `--sort` flag if given, else the configured default.
pub fn resolve_sort(flag: Option<&str>, desc: bool, configured: Sort) -> Result<Sort, AppError> {
    let key = match flag {
        Some(raw) => raw.parse::<SortKey>()?,
        None => configured.key,
    };
    let direction = if desc {
        SortDirection::Desc
    } else if flag.is_some() {
        SortDirection::Asc
    } else {
        configured.direction
    };
    Ok(Sort::new(key, direction))
}

/// Flag name used to identify config override arguments by the runtime.
pub const CONFIG_OVERRIDE_FLAG: &str = "--config-override";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub key: String,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let key =
        canonicalize_flag_name(key_raw).ok_or_else(|| "override key cannot be empty".to_string())?;

    Ok(ParsedConfigOverride {
        key,
        value: value_raw.trim().to_string(),
    })
}

/// Folds every `--config-override` argument into one set of overrides.
pub fn collect_config_overrides(raw: &[String]) -> Result<ConfigOverrides, AppError> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry)
            .map_err(|message| AppError::invalid_input(format!("{CONFIG_OVERRIDE_FLAG}: {message}")))?;
        overrides.set(&parsed.key, &parsed.value)?;
    }
    Ok(overrides)
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
