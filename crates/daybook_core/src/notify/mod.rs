use crate::error::AppError;
use crate::model::Task;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub use linux::LinuxCelebrator;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::WindowsCelebrator;

const DISABLE_ENV_VAR: &str = "DAYBOOK_DISABLE_NOTIFICATIONS";
pub const APP_NAME: &str = "daybook";

/// Fired when a task goes from pending to completed.
pub trait Celebrator {
    fn celebrate(&self, task: &Task) -> Result<(), AppError>;
}

pub struct NoopCelebrator;

impl Celebrator for NoopCelebrator {
    fn celebrate(&self, _task: &Task) -> Result<(), AppError> {
        Ok(())
    }
}

pub fn celebration_message(task: &Task) -> String {
    let first_line = task.text.lines().next().unwrap_or("").trim();
    if first_line.is_empty() {
        "Task completed!".to_string()
    } else {
        format!("Completed: {first_line}")
    }
}

pub fn celebrator_from_env() -> Box<dyn Celebrator> {
    if std::env::var(DISABLE_ENV_VAR).is_ok() {
        return Box::new(NoopCelebrator);
    }

    platform_celebrator().unwrap_or_else(|_| Box::new(NoopCelebrator))
}

#[cfg(target_os = "linux")]
pub fn platform_celebrator() -> Result<Box<dyn Celebrator>, AppError> {
    Ok(Box::new(LinuxCelebrator))
}

#[cfg(windows)]
pub fn platform_celebrator() -> Result<Box<dyn Celebrator>, AppError> {
    Ok(Box::new(WindowsCelebrator))
}

#[cfg(not(any(target_os = "linux", windows)))]
pub fn platform_celebrator() -> Result<Box<dyn Celebrator>, AppError> {
    Err(AppError::invalid_data(
        "notifications are not supported on this platform",
    ))
}

#[cfg(test)]
mod tests {
    use super::{Celebrator, NoopCelebrator, celebration_message};
    use crate::model::Task;

    #[test]
    fn celebration_message_uses_first_line() {
        let task = Task::new(1, "Buy milk\nand bread");
        assert_eq!(celebration_message(&task), "Completed: Buy milk");
    }

    #[test]
    fn celebration_message_handles_empty_text() {
        let task = Task::new(1, "");
        assert_eq!(celebration_message(&task), "Task completed!");
    }

    #[test]
    fn noop_celebrator_succeeds() {
        assert!(NoopCelebrator.celebrate(&Task::new(1, "x")).is_ok());
    }
}
