use crate::error::AppError;
use crate::model::Record;
use crate::notify::{APP_TITLE, Notifier, notification_body};
use tauri_winrt_notification::Toast;

pub struct WindowsNotifier;

impl Notifier for WindowsNotifier {
    fn notify(&self, record: &Record) -> Result<(), AppError> {
        Toast::new(Toast::POWERSHELL_APP_ID)
            .title(&format!("{APP_TITLE}: overdue {}", record.kind))
            .text1(&notification_body(record))
            .show()
            .map_err(|err| AppError::io(err.to_string()))
    }
}
