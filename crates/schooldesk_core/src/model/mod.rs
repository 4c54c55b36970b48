pub mod record;

pub use record::{
    Delegation, DelegationDraft, Priority, ProgressNote, Record, RecordDraft, RecordKind,
    RecordPatch, TaskType,
};
