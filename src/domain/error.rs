use thiserror::Error;

/// Errors raised by records, clients and the fake service
#[derive(Debug, Error)]
pub enum PulpError {
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Task {task_id} failed: {summary}")]
    TaskFailed { task_id: String, summary: String },

    #[error("Invalid task state transition from '{from}' to '{to}'")]
    InvalidTransition { from: String, to: String },

    #[error("Invalid RPM header: {message}")]
    RpmHeader { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PulpError {
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn task_failed(task_id: impl Into<String>, summary: impl Into<String>) -> Self {
        Self::TaskFailed {
            task_id: task_id.into(),
            summary: summary.into(),
        }
    }

    pub fn invalid_transition(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::InvalidTransition {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn rpm_header(message: impl Into<String>) -> Self {
        Self::RpmHeader {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// True for errors caused by malformed input data
    pub fn is_invalid_data(&self) -> bool {
        matches!(self, Self::InvalidData { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_data_error() {
        let error = PulpError::invalid_data("missing field `id`");
        assert_eq!(error.to_string(), "Invalid data: missing field `id`");
        assert!(error.is_invalid_data());
    }

    #[test]
    fn test_not_found_error() {
        let error = PulpError::not_found("Repository 'repo1'");
        assert_eq!(error.to_string(), "Not found: Repository 'repo1'");
        assert!(!error.is_invalid_data());
    }

    #[test]
    fn test_task_failed_error() {
        let error = PulpError::task_failed("task-1", "bad package");
        assert_eq!(error.to_string(), "Task task-1 failed: bad package");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let error: PulpError = io.into();
        assert!(matches!(error, PulpError::Io(_)));
    }
}
