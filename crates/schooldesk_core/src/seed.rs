//! Mock data a fresh session starts from. Due dates are relative to `now`.

use crate::error::AppError;
use crate::model::{Priority, ProgressNote, Record, RecordKind, TaskType};
use crate::status::StatusTable;
use crate::store::EntityStore;
use time::macros::time;
use time::{Duration, OffsetDateTime};

struct Seed {
    record: Record,
}

impl Seed {
    fn new(kind: RecordKind, id: &str, title: &str, status: &str, created_at: OffsetDateTime) -> Self {
        Self {
            record: Record {
                id: id.to_string(),
                kind,
                title: title.to_string(),
                description: None,
                starts_at: None,
                due_at: None,
                priority: None,
                status: status.to_string(),
                completed: StatusTable::for_kind(kind).is_terminal(status),
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
                created_at,
            },
        }
    }

    fn due(mut self, due_at: OffsetDateTime) -> Self {
        self.record.due_at = Some(due_at);
        self
    }

    fn priority(mut self, priority: Priority) -> Self {
        self.record.priority = Some(priority);
        self
    }

    fn description(mut self, description: &str) -> Self {
        self.record.description = Some(description.to_string());
        self
    }

    fn department(mut self, department: &str, hod: &str) -> Self {
        self.record.department = Some(department.to_string());
        self.record.hod = Some(hod.to_string());
        self
    }

    fn starts(mut self, starts_at: OffsetDateTime) -> Self {
        self.record.starts_at = Some(starts_at);
        self
    }

    fn question(mut self) -> Self {
        self.record.task_type = TaskType::Question;
        self
    }

    fn accepted(mut self, at: OffsetDateTime, note: &str) -> Self {
        self.record.accepted_at = Some(at);
        self.record.notes.insert(
            0,
            ProgressNote {
                text: note.to_string(),
                attachments: Vec::new(),
                at,
            },
        );
        self
    }

    fn kra(mut self, kra: &str) -> Self {
        self.record.kra = Some(kra.to_string());
        self
    }

    fn owner(mut self, owner: &str) -> Self {
        self.record.owner = Some(owner.to_string());
        self
    }

    fn tags(mut self, tags: &[&str]) -> Self {
        self.record.tags = tags.iter().map(|tag| tag.to_string()).collect();
        self
    }

    fn purchase(mut self, category: &str, vendor: &str, amount: u64) -> Self {
        self.record.category = Some(category.to_string());
        self.record.vendor = Some(vendor.to_string());
        self.record.amount = Some(amount);
        self
    }

    fn build(self) -> Record {
        self.record
    }
}

pub fn seed_records(now: OffsetDateTime) -> Vec<Record> {
    let mut records = Vec::new();
    records.extend(owner_tasks(now));
    records.extend(hod_tasks(now));
    records.extend(self_tasks(now));
    records.extend(departments(now));
    records.extend(kras(now));
    records.extend(purchases(now));
    records
}

/// A store initialized from [`seed_records`].
pub fn seed_store(now: OffsetDateTime) -> Result<EntityStore, AppError> {
    EntityStore::from_records(seed_records(now))
}

fn owner_tasks(now: OffsetDateTime) -> Vec<Record> {
    let days = Duration::days;
    let kind = RecordKind::OwnerTask;
    let created = now - days(7);
    vec![
        Seed::new(kind, "mt-1", "Approve science lab vendor payments", "In progress", created)
            .description("Release the second tranche once the lab audit is signed off.")
            .department("Academics", "R. Singh")
            .kra("Asset care")
            .starts(created)
            .due(now)
            .priority(Priority::High)
            .build(),
        Seed::new(kind, "mt-2", "Sign payroll release", "Ready to sign", created)
            .description("March payroll for teaching and support staff.")
            .department("Operations", "L. Patel")
            .kra("Compliance")
            .starts(created)
            .due(now)
            .priority(Priority::Medium)
            .build(),
        Seed::new(kind, "mt-3", "Review overdue maintenance tickets", "Needs reschedule", created)
            .description("Pick the tickets that block classrooms and reschedule the rest.")
            .department("Operations", "L. Patel")
            .kra("Asset care")
            .starts(created)
            .due(now - days(1))
            .priority(Priority::High)
            .build(),
        Seed::new(kind, "mt-4", "Confirm transport invoices", "Waiting for info", created)
            .description("Did the February invoices include the extra field-trip runs?")
            .department("Transport", "D. Khanna")
            .kra("Budget")
            .question()
            .starts(created)
            .due(now - days(2))
            .priority(Priority::Medium)
            .build(),
    ]
}

fn hod_tasks(now: OffsetDateTime) -> Vec<Record> {
    let days = Duration::days;
    let kind = RecordKind::HodTask;
    let created = now - days(5);
    vec![
        Seed::new(kind, "hd-01", "Math remedial plan for Grade 9", "New", created)
            .department("Academics", "R. Singh")
            .kra("Curriculum depth")
            .due(now)
            .priority(Priority::High)
            .build(),
        Seed::new(kind, "hd-02", "Route safety log for buses", "In Progress", created)
            .department("Transport", "D. Khanna")
            .kra("Safety")
            .accepted(created + days(1), "Drivers briefed on the new pickup order.")
            .due(now + Duration::hours(2))
            .priority(Priority::Medium)
            .build(),
        Seed::new(kind, "hd-03", "Sports day vendor shortlist", "Completed", created)
            .department("Sports", "S. Rao")
            .kra("Budget")
            .due(now + days(1))
            .priority(Priority::Low)
            .build(),
        Seed::new(kind, "hd-04", "Late fee waiver summary", "Overdue", created)
            .department("Finance", "L. Patel")
            .kra("Compliance")
            .due(now - days(1))
            .priority(Priority::High)
            .build(),
        Seed::new(kind, "hd-05", "Lab equipment servicing calendar", "New", created)
            .department("Academics", "R. Singh")
            .kra("Asset care")
            .due(now)
            .priority(Priority::Medium)
            .build(),
        Seed::new(kind, "hd-06", "PTM invites ready for print", "Overdue", created)
            .department("Academics", "R. Singh")
            .kra("Parent connect")
            .due(now - days(2))
            .priority(Priority::Medium)
            .build(),
    ]
}

fn self_tasks(now: OffsetDateTime) -> Vec<Record> {
    let days = Duration::days;
    let kind = RecordKind::SelfTask;
    vec![
        Seed::new(kind, "st-201", "Prep talking points for parent townhall", "In progress", now)
            .description(
                "Outline the wins, acknowledge pain points, and list 3 asks for the PTA core.",
            )
            .due(now + Duration::hours(2))
            .priority(Priority::High)
            .tags(&["Approvals", "Calls"])
            .build(),
        Seed::new(kind, "st-202", "Sign transport vendor addendum", "Not started", now - days(1))
            .description("Cross-check clauses 4 and 7, then sign and archive.")
            .due(now + days(1))
            .priority(Priority::Medium)
            .tags(&["Finance"])
            .build(),
        Seed::new(kind, "st-203", "Schedule call with Sports HOD", "Not started", now - days(2))
            .description("Align on tournament budget asks and set next review date.")
            .due((now - days(1)).replace_time(time!(17:00)))
            .priority(Priority::Low)
            .tags(&["People", "Calls"])
            .build(),
        Seed::new(kind, "st-204", "Reflect on fee waiver policy", "Completed", now - days(4))
            .description(
                "List non-negotiables and where flexibility is allowed before board meeting.",
            )
            .due(now - days(3))
            .priority(Priority::Medium)
            .tags(&["Deep work"])
            .build(),
    ]
}

fn departments(now: OffsetDateTime) -> Vec<Record> {
    let days = Duration::days;
    let kind = RecordKind::Department;
    let created = now - days(30);
    [
        ("dept-1", "Academics", "R. Singh", "Active"),
        ("dept-2", "Operations", "L. Patel", "Active"),
        ("dept-3", "Library", "A. Menon", "Inactive"),
        ("dept-4", "Sports", "S. Rao", "Active"),
        ("dept-5", "Transport", "D. Khanna", "Inactive"),
    ]
    .into_iter()
    .map(|(id, name, hod, status)| {
        Seed::new(kind, id, name, status, created)
            .department(name, hod)
            .build()
    })
    .collect()
}

fn kras(now: OffsetDateTime) -> Vec<Record> {
    let days = Duration::days;
    let kind = RecordKind::Kra;
    [
        (
            "kra-1",
            "Improve student outcomes",
            "Raise average assessment scores by 10% with targeted remediation.",
            "Academics",
            "A. Rao",
            "Active",
            0,
        ),
        (
            "kra-2",
            "Teacher readiness",
            "Ensure every teacher completes the new pedagogy training plan.",
            "Academics",
            "L. Patel",
            "Active",
            2,
        ),
        (
            "kra-3",
            "Bus safety compliance",
            "Complete monthly bus safety drills and log incident responses.",
            "Operations",
            "M. Sharma",
            "Inactive",
            1,
        ),
        (
            "kra-4",
            "Library engagement",
            "Grow weekly student library visits by 20% via reading programs.",
            "Library",
            "P. Iyer",
            "Active",
            4,
        ),
        (
            "kra-5",
            "Athlete readiness",
            "Prepare inter-school teams with verified medical and training logs.",
            "Sports",
            "S. Mehta",
            "Active",
            0,
        ),
    ]
    .into_iter()
    .map(|(id, title, description, department, owner, status, age)| {
        let mut record = Seed::new(kind, id, title, status, now - days(age))
            .description(description)
            .owner(owner)
            .build();
        record.department = Some(department.to_string());
        record
    })
    .collect()
}

fn purchases(now: OffsetDateTime) -> Vec<Record> {
    let days = Duration::days;
    let kind = RecordKind::Purchase;
    vec![
        Seed::new(kind, "ph-01", "Science lab consumables", "Submitted", now)
            .description("Chemicals and glassware restock")
            .department("Academics", "R. Singh")
            .kra("Lab safety")
            .purchase("Lab", "Sharma Supplies", 42_000)
            .due(now)
            .build(),
        Seed::new(kind, "ph-02", "Bus tyre replacement", "In review", now)
            .description("Tyre replacements for route 3 buses")
            .department("Transport", "L. Patel")
            .purchase("Transport", "SafeRoute Motors", 58_000)
            .due(now - days(1))
            .build(),
        Seed::new(kind, "ph-03", "Sports jerseys", "Approved", now - days(1))
            .description("Jerseys for inter-school teams")
            .department("Sports", "S. Rao")
            .kra("Athlete readiness")
            .purchase("Sports", "Zephyr Sports", 18_600)
            .due(now - days(2))
            .build(),
        Seed::new(kind, "ph-04", "Smart board accessories", "Submitted", now)
            .description("Styluses and wall mounts for Grade 8 rooms")
            .department("Academics", "R. Singh")
            .purchase("Academics", "Brightclass Tech", 48_000)
            .due(now)
            .build(),
        Seed::new(kind, "ph-05", "Transport diesel top-up", "Submitted", now)
            .description("Fuel for the week's route schedule")
            .department("Transport", "D. Khanna")
            .purchase("Transport", "City Fuels", 21_500)
            .due(now)
            .build(),
        Seed::new(kind, "ph-06", "Cafeteria dry stock", "In review", now)
            .description("Monthly dry ration order")
            .department("Cafeteria", "N. Bose")
            .purchase("Cafeteria", "Annapurna Traders", 12_250)
            .due(now)
            .build(),
        Seed::new(kind, "ph-07", "Library renewals", "Approved", now - days(3))
            .description("Periodical and e-book subscription renewals")
            .department("Library", "A. Menon")
            .purchase("Library", "ReadWell Distributors", 9_300)
            .due(now - days(3))
            .build(),
    ]
}
