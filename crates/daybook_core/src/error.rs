use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("invalid_input - {0}")]
    InvalidInput(String),
    #[error("invalid_data - {0}")]
    InvalidData(String),
    #[error("io_error - {0}")]
    Io(String),
    #[error("persistence_failure - {0}")]
    Persistence(String),
    #[error("collaborator_failure - {0}")]
    Collaborator(String),
    #[error("index_out_of_range - history index {index} is outside 0..{len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("invalid_state - {0}")]
    InvalidState(String),
}

impl AppError {
    pub fn invalid_input<M: Into<String>>(message: M) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn invalid_data<M: Into<String>>(message: M) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn io<M: Into<String>>(message: M) -> Self {
        Self::Io(message.into())
    }

    pub fn persistence<M: Into<String>>(message: M) -> Self {
        Self::Persistence(message.into())
    }

    pub fn collaborator<M: Into<String>>(message: M) -> Self {
        Self::Collaborator(message.into())
    }

    pub fn invalid_state<M: Into<String>>(message: M) -> Self {
        Self::InvalidState(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidData(_) => "invalid_data",
            Self::Io(_) => "io_error",
            Self::Persistence(_) => "persistence_failure",
            Self::Collaborator(_) => "collaborator_failure",
            Self::IndexOutOfRange { .. } => "index_out_of_range",
            Self::InvalidState(_) => "invalid_state",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::InvalidInput(message)
            | Self::InvalidData(message)
            | Self::Io(message)
            | Self::Persistence(message)
            | Self::Collaborator(message)
            | Self::InvalidState(message) => message.clone(),
            Self::IndexOutOfRange { index, len } => {
                format!("history index {index} is outside 0..{len}")
            }
        }
    }
}
