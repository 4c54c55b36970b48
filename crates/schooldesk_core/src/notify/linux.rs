use crate::error::AppError;
use crate::model::Record;
use crate::notify::{APP_TITLE, Notifier, notification_body};
use notify_rust::{Notification, Urgency};

pub struct LinuxNotifier;

impl Notifier for LinuxNotifier {
    fn notify(&self, record: &Record) -> Result<(), AppError> {
        Notification::new()
            .summary(&format!("{APP_TITLE}: overdue {}", record.kind))
            .body(&notification_body(record))
            .urgency(Urgency::Critical)
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;
        Ok(())
    }
}
