//! Error types and handling for the trip planner

use thiserror::Error;

/// Main error type for the trip planner
#[derive(Error, Debug)]
pub enum TripPlannerError {
    /// Configuration-related errors, including credentials missing at first use
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Places or language-model API errors
    #[error("API error: {message}")]
    Api { message: String },

    /// Trip form validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Outbound messaging errors
    #[error("Messaging error: {message}")]
    Messaging { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl TripPlannerError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new messaging error
    pub fn messaging<S: Into<String>>(message: S) -> Self {
        Self::Messaging {
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TripPlannerError::Config { message } => {
                format!("Configuration error: {message}. Please check your API keys.")
            }
            TripPlannerError::Api { message } => {
                format!("Unable to reach an external service: {message}")
            }
            TripPlannerError::Validation { message } => message.clone(),
            TripPlannerError::Messaging { message } => {
                format!("Failed to send WhatsApp message: {message}")
            }
            TripPlannerError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
            TripPlannerError::General { message } => message.clone(),
        }
    }
}

impl From<reqwest::Error> for TripPlannerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::api(format!("request timed out: {err}"))
        } else if err.is_decode() {
            Self::api(format!("malformed response payload: {err}"))
        } else {
            Self::api(err.to_string())
        }
    }
}
