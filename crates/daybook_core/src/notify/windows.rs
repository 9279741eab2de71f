use crate::error::AppError;
use crate::model::Task;
use crate::notify::{APP_NAME, Celebrator, celebration_message};
use tauri_winrt_notification::Toast;

pub struct WindowsCelebrator;

impl Celebrator for WindowsCelebrator {
    fn celebrate(&self, task: &Task) -> Result<(), AppError> {
        Toast::new(Toast::POWERSHELL_APP_ID)
            .title(APP_NAME)
            .text1(&celebration_message(task))
            .show()
            .map_err(|err| AppError::io(err.to_string()))
    }
}
