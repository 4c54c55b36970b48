use crate::bucket::{Bucket, classify, is_same_day};
use crate::model::{Record, RecordKind};
use crate::store::EntityStore;
use serde::Serialize;
use std::cmp::Reverse;
use time::OffsetDateTime;

const LATEST_PURCHASES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub my_tasks_due_today: usize,
    pub hod_tasks_due_today: usize,
    /// Owner and HOD tasks together.
    pub overdue_total: usize,
    pub purchases_today: usize,
    pub purchases_today_amount: u64,
    pub latest_purchases: Vec<Record>,
}

pub fn summarize(store: &EntityStore, now: OffsetDateTime) -> DashboardSummary {
    let count = |kind: RecordKind, bucket: Bucket| {
        store
            .list(kind)
            .iter()
            .filter(|record| classify(record, now) == bucket)
            .count()
    };

    let purchases = store.list(RecordKind::Purchase);
    let today: Vec<&Record> = purchases
        .iter()
        .filter(|purchase| is_same_day(purchase.reference_at(), now))
        .collect();

    let mut latest_purchases = purchases.to_vec();
    latest_purchases.sort_by_key(|purchase| Reverse(purchase.reference_at()));
    latest_purchases.truncate(LATEST_PURCHASES);

    DashboardSummary {
        my_tasks_due_today: count(RecordKind::OwnerTask, Bucket::DueToday),
        hod_tasks_due_today: count(RecordKind::HodTask, Bucket::DueToday),
        overdue_total: count(RecordKind::OwnerTask, Bucket::Overdue)
            + count(RecordKind::HodTask, Bucket::Overdue),
        purchases_today: today.len(),
        purchases_today_amount: today
            .iter()
            .filter_map(|purchase| purchase.amount)
            .sum(),
        latest_purchases,
    }
}

/// Whole rupees with Indian digit grouping, e.g. `₹1,23,750`.
pub fn format_inr(amount: u64) -> String {
    let digits = amount.to_string();
    if digits.len() <= 3 {
        return format!("₹{digits}");
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (left, right) = rest.split_at(rest.len() - 2);
        groups.push(right);
        rest = left;
    }
    groups.push(rest);
    groups.reverse();

    format!("₹{},{tail}", groups.join(","))
}

#[cfg(test)]
mod tests {
    use super::{format_inr, summarize};
    use crate::model::RecordKind;
    use crate::seed::seed_store;
    use crate::store::EntityStore;
    use time::OffsetDateTime;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2026-03-18 10:00 +05:30);

    #[test]
    fn summary_counts_seeded_session() {
        let store = seed_store(NOW).unwrap();

        let summary = summarize(&store, NOW);

        assert_eq!(summary.my_tasks_due_today, 2);
        assert_eq!(summary.hod_tasks_due_today, 3);
        assert_eq!(summary.overdue_total, 4);
        assert_eq!(summary.purchases_today, 4);
        assert_eq!(summary.purchases_today_amount, 123_750);
    }

    #[test]
    fn latest_purchases_are_newest_first_and_capped() {
        let store = seed_store(NOW).unwrap();

        let summary = summarize(&store, NOW);
        let ids: Vec<&str> = summary
            .latest_purchases
            .iter()
            .map(|purchase| purchase.id.as_str())
            .collect();

        assert_eq!(ids, vec!["ph-01", "ph-04", "ph-05", "ph-06", "ph-02"]);
        assert!(
            summary
                .latest_purchases
                .iter()
                .all(|purchase| purchase.kind == RecordKind::Purchase)
        );
    }

    #[test]
    fn empty_store_summarizes_to_zero() {
        let summary = summarize(&EntityStore::new(), NOW);
        assert_eq!(summary.overdue_total, 0);
        assert_eq!(summary.purchases_today_amount, 0);
        assert!(summary.latest_purchases.is_empty());
    }

    #[test]
    fn inr_uses_lakh_grouping() {
        assert_eq!(format_inr(0), "₹0");
        assert_eq!(format_inr(950), "₹950");
        assert_eq!(format_inr(9_300), "₹9,300");
        assert_eq!(format_inr(123_750), "₹1,23,750");
        assert_eq!(format_inr(12_345_678), "₹1,23,45,678");
    }
}
