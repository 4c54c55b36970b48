pub mod bucket;
pub mod config;
pub mod dashboard;
pub mod dates;
pub mod engine;
pub mod error;
pub mod logging;
pub mod model;
pub mod notify;
pub mod query;
pub mod seed;
pub mod session;
pub mod status;
pub mod storage;
pub mod store;
pub mod validate;

pub use bucket::{Bucket, BucketedView};
pub use engine::Engine;
pub use error::{AppError, FieldError};
pub use model::{Priority, Record, RecordDraft, RecordKind, RecordPatch, TaskType};
pub use query::{DateRange, FilterSet, Selection, Sort, SortDirection, SortKey};
pub use store::EntityStore;
