use std::any::Any;

/// Result type alias for deferstack operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for deferstack operations
///
/// Failures raised by deferred actions never surface through this type; they
/// are reported as [`ActionFailure`] to the log and discarded.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration errors
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Json {
            message: error.to_string(),
            source: error,
        }
    }
}

impl Error {
    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }
}

/// A failure raised by a deferred action while its registry was draining.
///
/// Draining never propagates these. They exist so the failure can be logged
/// with a readable cause before it is dropped.
#[derive(Debug, thiserror::Error)]
pub enum ActionFailure {
    /// The action panicked
    #[error("deferred action panicked: {message}")]
    Panicked { message: String },

    /// A fallible action returned an error
    #[error("deferred action failed: {source}")]
    Failed {
        #[source]
        source: anyhow::Error,
    },
}

impl ActionFailure {
    /// Build a failure from the payload handed back by `catch_unwind`
    #[must_use]
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "<non-string panic payload>".to_string()
        };
        ActionFailure::Panicked { message }
    }

    /// Build a failure from an error returned by a fallible action
    #[must_use]
    pub fn from_error(error: impl Into<anyhow::Error>) -> Self {
        ActionFailure::Failed {
            source: error.into(),
        }
    }

    /// Whether the action panicked rather than returning an error
    pub fn is_panic(&self) -> bool {
        matches!(self, ActionFailure::Panicked { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_display() {
        let err = Error::configuration("max_idle must be greater than zero");
        assert_eq!(
            err.to_string(),
            "configuration error: max_idle must be greater than zero"
        );
    }

    #[test]
    fn test_json_error_conversion() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = parse_err.into();
        assert!(matches!(err, Error::Json { .. }));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_failure_from_str_panic() {
        let payload = std::panic::catch_unwind(|| panic!("boom")).unwrap_err();
        let failure = ActionFailure::from_panic(payload);
        assert!(failure.is_panic());
        assert_eq!(failure.to_string(), "deferred action panicked: boom");
    }

    #[test]
    fn test_failure_from_formatted_panic() {
        let code = 7;
        let payload = std::panic::catch_unwind(|| panic!("exit code {code}")).unwrap_err();
        let failure = ActionFailure::from_panic(payload);
        assert_eq!(failure.to_string(), "deferred action panicked: exit code 7");
    }

    #[test]
    fn test_failure_from_opaque_panic() {
        let payload: Box<dyn Any + Send> = Box::new(42_u32);
        let failure = ActionFailure::from_panic(payload);
        assert_eq!(
            failure.to_string(),
            "deferred action panicked: <non-string panic payload>"
        );
    }

    #[test]
    fn test_failure_from_error() {
        let failure = ActionFailure::from_error(anyhow::anyhow!("disk full"));
        assert!(!failure.is_panic());
        assert_eq!(failure.to_string(), "deferred action failed: disk full");
    }
}
