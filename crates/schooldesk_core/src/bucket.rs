use crate::error::AppError;
use crate::model::Record;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    DueToday,
    Overdue,
    Upcoming,
    Completed,
}

impl Bucket {
    pub fn label(self) -> &'static str {
        match self {
            Bucket::DueToday => "due_today",
            Bucket::Overdue => "overdue",
            Bucket::Upcoming => "upcoming",
            Bucket::Completed => "completed",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Bucket {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "due_today" | "today" => Ok(Bucket::DueToday),
            "overdue" => Ok(Bucket::Overdue),
            "upcoming" => Ok(Bucket::Upcoming),
            "completed" | "done" => Ok(Bucket::Completed),
            _ => Err(AppError::invalid_input(format!(
                "unknown bucket '{}'",
                raw.trim()
            ))),
        }
    }
}

/// Whether two instants fall on the same civil day as seen from `now`'s offset.
pub fn is_same_day(at: OffsetDateTime, now: OffsetDateTime) -> bool {
    compare_days(at, now) == Ordering::Equal
}

/// Orders the civil day of `at` against the civil day of `now`.
pub fn compare_days(at: OffsetDateTime, now: OffsetDateTime) -> Ordering {
    at.to_offset(now.offset()).date().cmp(&now.date())
}

pub fn classify(record: &Record, now: OffsetDateTime) -> Bucket {
    if record.completed {
        return Bucket::Completed;
    }

    match record.due_at {
        Some(due_at) => match compare_days(due_at, now) {
            Ordering::Equal => Bucket::DueToday,
            Ordering::Less => Bucket::Overdue,
            Ordering::Greater => Bucket::Upcoming,
        },
        None => Bucket::Upcoming,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BucketedView {
    pub due_today: Vec<Record>,
    pub overdue: Vec<Record>,
    pub upcoming: Vec<Record>,
    pub completed: Vec<Record>,
}

impl BucketedView {
    pub fn build(records: &[Record], now: OffsetDateTime) -> Self {
        let mut view = BucketedView::default();
        for record in records {
            view.bucket_mut(classify(record, now)).push(record.clone());
        }
        view
    }

    pub fn bucket(&self, bucket: Bucket) -> &[Record] {
        match bucket {
            Bucket::DueToday => &self.due_today,
            Bucket::Overdue => &self.overdue,
            Bucket::Upcoming => &self.upcoming,
            Bucket::Completed => &self.completed,
        }
    }

    fn bucket_mut(&mut self, bucket: Bucket) -> &mut Vec<Record> {
        match bucket {
            Bucket::DueToday => &mut self.due_today,
            Bucket::Overdue => &mut self.overdue,
            Bucket::Upcoming => &mut self.upcoming,
            Bucket::Completed => &mut self.completed,
        }
    }

    pub fn len(&self) -> usize {
        self.due_today.len() + self.overdue.len() + self.upcoming.len() + self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::{Bucket, BucketedView, classify, is_same_day};
    use crate::model::{Record, RecordKind, TaskType};
    use time::macros::{datetime, offset};
    use time::{Duration, OffsetDateTime};

    const NOW: OffsetDateTime = datetime!(2026-05-14 11:30 +05:30);

    fn task(title: &str, due_at: Option<OffsetDateTime>, completed: bool) -> Record {
        Record {
            id: format!("st-{title}"),
            kind: RecordKind::SelfTask,
            title: title.to_string(),
            description: None,
            starts_at: None,
            due_at,
            priority: None,
            status: if completed { "Completed" } else { "Not started" }.to_string(),
            completed,
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
            created_at: NOW - Duration::days(10),
        }
    }

    #[test]
    fn completed_wins_over_any_due_date() {
        for offset_days in [-30, -1, 0, 1, 30] {
            let record = task("done", Some(NOW + Duration::days(offset_days)), true);
            assert_eq!(classify(&record, NOW), Bucket::Completed);
        }
    }

    #[test]
    fn open_records_partition_by_calendar_day() {
        let early_today = task("early", Some(datetime!(2026-05-14 00:05 +05:30)), false);
        let late_today = task("late", Some(datetime!(2026-05-14 23:55 +05:30)), false);
        let yesterday = task("yesterday", Some(datetime!(2026-05-13 23:59 +05:30)), false);
        let tomorrow = task("tomorrow", Some(datetime!(2026-05-15 00:00 +05:30)), false);

        assert_eq!(classify(&early_today, NOW), Bucket::DueToday);
        assert_eq!(classify(&late_today, NOW), Bucket::DueToday);
        assert_eq!(classify(&yesterday, NOW), Bucket::Overdue);
        assert_eq!(classify(&tomorrow, NOW), Bucket::Upcoming);
    }

    #[test]
    fn days_are_compared_in_the_offset_of_now() {
        // 20:00 UTC on the 13th is already the 14th in India.
        let due = datetime!(2026-05-13 20:00 UTC);
        let record = task("evening", Some(due), false);

        assert_eq!(classify(&record, NOW), Bucket::DueToday);
        assert_eq!(
            classify(&record, NOW.to_offset(offset!(UTC))),
            Bucket::Overdue
        );
        assert!(is_same_day(due, NOW));
    }

    #[test]
    fn undated_open_records_are_upcoming() {
        let record = task("someday", None, false);
        assert_eq!(classify(&record, NOW), Bucket::Upcoming);
    }

    #[test]
    fn sports_and_library_scenario() {
        let sports = task("Sports", Some(NOW + Duration::days(3)), false);
        let library = task("Library", Some(NOW - Duration::days(1)), true);

        assert_eq!(classify(&sports, NOW), Bucket::Upcoming);
        assert_eq!(classify(&library, NOW), Bucket::Completed);

        let view = BucketedView::build(&[sports, library], NOW);
        assert!(view.bucket(Bucket::Overdue).is_empty());
        assert_eq!(view.upcoming[0].title, "Sports");
        assert_eq!(view.completed[0].title, "Library");
    }

    #[test]
    fn bucketed_view_keeps_every_record_once_in_input_order() {
        let records = vec![
            task("a", Some(NOW), false),
            task("b", Some(NOW - Duration::days(2)), false),
            task("c", Some(NOW), false),
            task("d", Some(NOW + Duration::days(1)), true),
        ];

        let view = BucketedView::build(&records, NOW);

        assert_eq!(view.len(), records.len());
        let today: Vec<_> = view.due_today.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(today, vec!["a", "c"]);
        assert_eq!(view.overdue.len(), 1);
        assert_eq!(view.completed.len(), 1);
    }

    #[test]
    fn bucket_parses_display_names() {
        assert_eq!("due-today".parse::<Bucket>().unwrap(), Bucket::DueToday);
        assert_eq!("Overdue".parse::<Bucket>().unwrap(), Bucket::Overdue);
        assert!("later".parse::<Bucket>().is_err());
    }
}
