use crate::error::AppError;
use crate::model::Task;
use crate::notify::{APP_NAME, Celebrator, celebration_message};
use notify_rust::Notification;

pub struct LinuxCelebrator;

impl Celebrator for LinuxCelebrator {
    fn celebrate(&self, task: &Task) -> Result<(), AppError> {
        Notification::new()
            .summary(APP_NAME)
            .body(&celebration_message(task))
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;
        Ok(())
    }
}
