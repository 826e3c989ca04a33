//! Error types and handling
//!
//! This module contains error types and error handling for the simulation.

use thiserror::Error;

use crate::sink::SinkError;
use crate::types::{ConfigError, ConfigValidationError};

/// Errors that can occur during simulation
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Configuration loading or validation failed
    #[error("Configuration validation failed: {0}")]
    ConfigurationError(String),

    /// Writing the EPC list failed
    #[error("Failed to persist EPCs to {path}: {source}")]
    PersistenceError {
        /// Destination path
        path: String,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Connecting the publish sink failed
    #[error("Broker connection failed: {0}")]
    ConnectionError(String),

    /// Handing a payload to the publish sink failed
    #[error("Publish failed: {0}")]
    PublishError(#[from] SinkError),

    /// The scheduling task is gone or failed
    #[error("Scheduler error: {0}")]
    SchedulerError(String),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<ConfigError> for SimulationError {
    fn from(error: ConfigError) -> Self {
        SimulationError::ConfigurationError(error.to_string())
    }
}

impl From<ConfigValidationError> for SimulationError {
    fn from(error: ConfigValidationError) -> Self {
        SimulationError::ConfigurationError(error.to_string())
    }
}

impl SimulationError {
    /// Create a configuration error
    pub fn configuration_error(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    /// Create a persistence error for `path`
    pub fn persistence_error(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::PersistenceError { path: path.into(), source }
    }

    /// Create a connection error
    pub fn connection_error(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a scheduler error
    pub fn scheduler_error(msg: impl Into<String>) -> Self {
        Self::SchedulerError(msg.into())
    }

    /// Check if the simulation can keep running after this error
    pub fn is_recoverable(&self) -> bool {
        match self {
            SimulationError::ConfigurationError(_) => false,
            SimulationError::PersistenceError { .. } => true,
            SimulationError::ConnectionError(_) => true,
            SimulationError::PublishError(_) => true,
            SimulationError::SchedulerError(_) => false,
            SimulationError::IoError(_) => true,
            SimulationError::SerializationError(_) => true,
        }
    }

    /// Get the error category
    pub fn category(&self) -> &'static str {
        match self {
            SimulationError::ConfigurationError(_) => "Configuration",
            SimulationError::PersistenceError { .. } => "Persistence",
            SimulationError::ConnectionError(_) => "Connection",
            SimulationError::PublishError(_) => "Publish",
            SimulationError::SchedulerError(_) => "Scheduler",
            SimulationError::IoError(_) => "IO",
            SimulationError::SerializationError(_) => "Serialization",
        }
    }
}

/// Result type for simulation operations
pub type SimulationResult<T> = Result<T, SimulationError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_creation() {
        let config_error = SimulationError::configuration_error("Invalid config");
        assert!(matches!(config_error, SimulationError::ConfigurationError(_)));
        assert_eq!(config_error.to_string(), "Configuration validation failed: Invalid config");

        let persistence_error = SimulationError::persistence_error(
            "epcs.txt",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(persistence_error.to_string(), "Failed to persist EPCs to epcs.txt: denied");
    }

    #[test]
    fn test_error_from_validation_error() {
        let error: SimulationError = ConfigValidationError::EmptyHost.into();
        assert!(matches!(error, SimulationError::ConfigurationError(_)));
        assert!(!error.is_recoverable());
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let sim_error: SimulationError = io_error.into();
        assert!(matches!(sim_error, SimulationError::IoError(_)));
        assert!(sim_error.is_recoverable());
    }

    #[test]
    fn test_error_from_sink_error() {
        let sim_error: SimulationError = SinkError::Closed.into();
        assert_eq!(sim_error.category(), "Publish");
        assert!(sim_error.is_recoverable());
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(SimulationError::configuration_error("x").category(), "Configuration");
        assert_eq!(SimulationError::connection_error("x").category(), "Connection");
        assert_eq!(SimulationError::scheduler_error("x").category(), "Scheduler");
        assert!(!SimulationError::scheduler_error("x").is_recoverable());
    }
}
