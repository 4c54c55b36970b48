//! Filters are ANDed; an unset filter always matches.

use crate::bucket::{Bucket, classify};
use crate::error::AppError;
use crate::model::Record;
use std::cmp::Ordering;
use std::str::FromStr;
use time::{Date, OffsetDateTime, UtcOffset};

/// Sentinel-aware equality filter value. `"all"` and blank input mean "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            Selection::All
        } else {
            Selection::Only(trimmed.to_string())
        }
    }

    pub fn matches(&self, value: Option<&str>) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(expected) => value == Some(expected.as_str()),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }
}

impl From<&str> for Selection {
    fn from(raw: &str) -> Self {
        Selection::parse(raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketFilter {
    pub bucket: Bucket,
    pub now: OffsetDateTime,
}

/// Inclusive calendar-day bounds, read in `offset` like the buckets are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<Date>,
    pub to: Option<Date>,
    pub offset: UtcOffset,
}

impl DateRange {
    /// Bounds read in the offset of `now`.
    pub fn new(from: Option<Date>, to: Option<Date>, now: OffsetDateTime) -> Self {
        Self {
            from,
            to,
            offset: now.offset(),
        }
    }

    pub fn contains(&self, at: OffsetDateTime) -> bool {
        let day = at.to_offset(self.offset).date();
        self.from.is_none_or(|from| day >= from) && self.to.is_none_or(|to| day <= to)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    pub department: Selection,
    pub hod: Selection,
    pub kra: Selection,
    pub tag: Selection,
    pub category: Selection,
    pub vendor: Selection,
    pub status: Selection,
    pub bucket: Option<BucketFilter>,
    pub min_amount: Option<u64>,
    pub max_amount: Option<u64>,
    pub dates: Option<DateRange>,
}

impl FilterSet {
    pub fn matches(&self, record: &Record) -> bool {
        self.department.matches(record.department.as_deref())
            && self.hod.matches(record.hod.as_deref())
            && self.kra.matches(record.kra.as_deref())
            && self.category.matches(record.category.as_deref())
            && self.vendor.matches(record.vendor.as_deref())
            && self.status.matches(Some(record.status.as_str()))
            && self.matches_tag(record)
            && self.matches_bucket(record)
            && self.matches_amount(record)
            && self.matches_dates(record)
    }

    fn matches_tag(&self, record: &Record) -> bool {
        match &self.tag {
            Selection::All => true,
            Selection::Only(tag) => record.tags.iter().any(|candidate| candidate == tag),
        }
    }

    fn matches_bucket(&self, record: &Record) -> bool {
        self.bucket
            .is_none_or(|filter| classify(record, filter.now) == filter.bucket)
    }

    fn matches_amount(&self, record: &Record) -> bool {
        if self.min_amount.is_none() && self.max_amount.is_none() {
            return true;
        }
        let Some(amount) = record.amount else {
            return false;
        };
        self.min_amount.is_none_or(|min| amount >= min)
            && self.max_amount.is_none_or(|max| amount <= max)
    }

    fn matches_dates(&self, record: &Record) -> bool {
        self.dates
            .is_none_or(|range| range.contains(record.reference_at()))
    }

    /// Rejects ranges whose lower bound is above the upper bound.
    pub fn validate(&self) -> Result<(), AppError> {
        if let (Some(min), Some(max)) = (self.min_amount, self.max_amount)
            && min > max
        {
            return Err(AppError::invalid_input(
                "minimum amount cannot exceed maximum amount",
            ));
        }
        if let Some(DateRange {
            from: Some(from),
            to: Some(to),
            ..
        }) = self.dates
            && from > to
        {
            return Err(AppError::invalid_input("date range start is after its end"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    Title,
    #[default]
    DueAt,
    CreatedAt,
    Amount,
}

impl FromStr for SortKey {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "title" | "name" => Ok(SortKey::Title),
            "due" | "due_at" | "date" => Ok(SortKey::DueAt),
            "created" | "created_at" => Ok(SortKey::CreatedAt),
            "amount" => Ok(SortKey::Amount),
            _ => Err(AppError::invalid_input(format!(
                "unknown sort key '{}'",
                raw.trim()
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            _ => Err(AppError::invalid_input(format!(
                "unknown sort direction '{}'",
                raw.trim()
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sort {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Sort {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Orders two records. Records without the key go last in either direction.
    fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let ordering = match self.key {
            SortKey::Title => Some(a.title.to_lowercase().cmp(&b.title.to_lowercase())),
            SortKey::CreatedAt => Some(a.created_at.cmp(&b.created_at)),
            SortKey::DueAt => compare_present(a.due_at, b.due_at),
            SortKey::Amount => compare_present(a.amount, b.amount),
        };
        match ordering {
            Some(ordering) if self.direction == SortDirection::Desc => ordering.reverse(),
            Some(ordering) => ordering,
            None => a_missing_last(a, b, self.key),
        }
    }
}

fn compare_present<T: Ord>(a: Option<T>, b: Option<T>) -> Option<Ordering> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.cmp(&b)),
        _ => None,
    }
}

fn a_missing_last(a: &Record, b: &Record, key: SortKey) -> Ordering {
    let has_key = |record: &Record| match key {
        SortKey::DueAt => record.due_at.is_some(),
        SortKey::Amount => record.amount.is_some(),
        SortKey::Title | SortKey::CreatedAt => true,
    };
    has_key(b).cmp(&has_key(a))
}

/// Filters then stably sorts `records`, returning a new sequence.
pub fn apply(records: &[Record], filters: &FilterSet, sort: Sort) -> Vec<Record> {
    let mut selected: Vec<Record> = records
        .iter()
        .filter(|record| filters.matches(record))
        .cloned()
        .collect();
    selected.sort_by(|a, b| sort.compare(a, b));
    selected
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facet {
    Department,
    Hod,
    Kra,
    Category,
    Vendor,
    Tag,
}

/// Option list for a filter dropdown: `"all"` followed by distinct values in
/// first-seen order.
pub fn distinct_values(records: &[Record], facet: Facet) -> Vec<String> {
    let mut values = vec!["all".to_string()];
    for record in records {
        let candidates: Vec<&str> = match facet {
            Facet::Department => record.department.as_deref().into_iter().collect(),
            Facet::Hod => record.hod.as_deref().into_iter().collect(),
            Facet::Kra => record.kra.as_deref().into_iter().collect(),
            Facet::Category => record.category.as_deref().into_iter().collect(),
            Facet::Vendor => record.vendor.as_deref().into_iter().collect(),
            Facet::Tag => record.tags.iter().map(String::as_str).collect(),
        };
        for candidate in candidates {
            if !values.iter().any(|value| value == candidate) {
                values.push(candidate.to_string());
            }
        }
    }
    values
}
