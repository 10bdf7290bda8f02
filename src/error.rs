use std::fmt;
use thiserror::Error;

/// Main error type for the junction routing engine
#[derive(Error, Debug, Clone)]
pub enum JunctionError {
    /// Configuration related errors; fatal to the build/reload attempt only
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// No route matched the request path/host at any matching stage
    #[error("No route matched path '{path}' for host '{host}'")]
    RouteNotFound { path: String, host: String },

    /// Target list empty or total weight zero at selection time
    #[error("Service unavailable: {message}")]
    ServiceUnavailable { message: String },

    /// Malformed rule state encountered while evaluating a compiled rule
    #[error("Rule evaluation error: {message}")]
    RuleEvaluation { message: String },

    /// File system errors (config loading, watcher setup)
    #[error("File system error: {message}")]
    FileSystem { message: String },

    /// Internal invariant violations
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl JunctionError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a route-not-found error
    pub fn route_not_found<S: Into<String>, T: Into<String>>(path: S, host: T) -> Self {
        Self::RouteNotFound {
            path: path.into(),
            host: host.into(),
        }
    }

    /// Create a service unavailable error
    pub fn service_unavailable<S: Into<String>>(message: S) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
        }
    }

    /// Create a rule evaluation error
    pub fn rule_evaluation<S: Into<String>>(message: S) -> Self {
        Self::RuleEvaluation {
            message: message.into(),
        }
    }

    /// Create a file system error
    pub fn file_system<S: Into<String>>(message: S) -> Self {
        Self::FileSystem {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Request-time errors are returned to the caller for translation into a
    /// user-visible response; they are never system faults
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            JunctionError::RouteNotFound { .. } | JunctionError::ServiceUnavailable { .. }
        )
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            JunctionError::Config { .. } => ErrorSeverity::Critical,
            JunctionError::Internal { .. } => ErrorSeverity::High,
            JunctionError::FileSystem { .. } => ErrorSeverity::High,
            JunctionError::ServiceUnavailable { .. } => ErrorSeverity::Medium,
            JunctionError::RuleEvaluation { .. } => ErrorSeverity::Medium,
            JunctionError::RouteNotFound { .. } => ErrorSeverity::Low,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low = 1,
    Medium = 2,
    High = 3,
    Critical = 4,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Low => write!(f, "LOW"),
            ErrorSeverity::Medium => write!(f, "MEDIUM"),
            ErrorSeverity::High => write!(f, "HIGH"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Result type alias for junction operations
pub type JunctionResult<T> = Result<T, JunctionError>;

/// Convert from std::io::Error to JunctionError
impl From<std::io::Error> for JunctionError {
    fn from(err: std::io::Error) -> Self {
        JunctionError::file_system(format!("IO error: {}", err))
    }
}

/// Convert from toml::de::Error to JunctionError
impl From<toml::de::Error> for JunctionError {
    fn from(err: toml::de::Error) -> Self {
        JunctionError::config(format!("TOML parsing error: {}", err))
    }
}

/// Convert from regex::Error to JunctionError
impl From<regex::Error> for JunctionError {
    fn from(err: regex::Error) -> Self {
        JunctionError::config(format!("Invalid regex: {}", err))
    }
}

/// Convert from notify::Error to JunctionError
impl From<notify::Error> for JunctionError {
    fn from(err: notify::Error) -> Self {
        JunctionError::file_system(format!("File watching error: {}", err))
    }
}

/// Convert from serde_json::Error to JunctionError
impl From<serde_json::Error> for JunctionError {
    fn from(err: serde_json::Error) -> Self {
        JunctionError::config(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = JunctionError::config("empty route list");
        assert!(matches!(config_err, JunctionError::Config { .. }));
        assert_eq!(
            config_err.to_string(),
            "Configuration error: empty route list"
        );

        let nf = JunctionError::route_not_found("/missing", "a.com");
        assert!(matches!(nf, JunctionError::RouteNotFound { .. }));
        assert_eq!(
            nf.to_string(),
            "No route matched path '/missing' for host 'a.com'"
        );
    }

    #[test]
    fn test_error_properties() {
        assert!(JunctionError::route_not_found("/x", "").is_request_error());
        assert!(JunctionError::service_unavailable("no targets").is_request_error());
        assert!(!JunctionError::config("bad").is_request_error());

        assert_eq!(
            JunctionError::config("bad").severity(),
            ErrorSeverity::Critical
        );
        assert_eq!(
            JunctionError::route_not_found("/x", "").severity(),
            ErrorSeverity::Low
        );
    }

    #[test]
    fn test_severity_ordering() {
        assert!(ErrorSeverity::Critical > ErrorSeverity::High);
        assert!(ErrorSeverity::High > ErrorSeverity::Medium);
        assert!(ErrorSeverity::Medium > ErrorSeverity::Low);
    }

    #[test]
    fn test_error_conversions() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: JunctionError = io_error.into();
        assert!(matches!(err, JunctionError::FileSystem { .. }));

        let regex_error = regex::Regex::new("[").unwrap_err();
        let err: JunctionError = regex_error.into();
        assert!(matches!(err, JunctionError::Config { .. }));
    }
}
