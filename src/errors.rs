use thiserror::Error;

/// Errors surfaced to the user by any sugar command.
///
/// Validation failures are raised before any external process is spawned;
/// command failures carry the captured stderr of the child.
#[derive(Debug, Error)]
pub enum SugarError {
    #[error("{0}")]
    InvalidParameter(String),

    #[error("{0}")]
    InvalidConfiguration(String),

    #[error("{0}")]
    CommandError(String),

    #[error("Error: 'container' command not found. Please ensure Apple Container is installed.")]
    RuntimeNotFound,
}

impl SugarError {
    /// Process exit code reported for this error kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            SugarError::InvalidParameter(_) => 2,
            SugarError::InvalidConfiguration(_) => 3,
            SugarError::CommandError(_) => 1,
            SugarError::RuntimeNotFound => 1,
        }
    }

    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        SugarError::InvalidParameter(msg.into())
    }

    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        SugarError::InvalidConfiguration(msg.into())
    }

    pub fn command_error(msg: impl Into<String>) -> Self {
        SugarError::CommandError(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, SugarError>;
