use thiserror::Error;

/// Main error type for itinerary planning and monitoring
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid trip preferences: {0}")]
    InvalidPreferences(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{provider} lookup failed: {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },

    #[error("Schedule error: {0}")]
    Schedule(String),

    #[error("Itinerary assembly failed: {}", .0.join("; "))]
    Assembly(Vec<String>),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, PlannerError>;

impl PlannerError {
    /// Shorthand for a failed collaborator call
    pub fn provider(provider: &'static str, message: impl Into<String>) -> Self {
        PlannerError::Provider {
            provider,
            message: message.into(),
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PlannerError::Provider { .. }
                | PlannerError::Persistence(_)
                | PlannerError::Timeout(_)
                | PlannerError::Io(_)
        )
    }

    /// Get the error code for structured responses
    pub fn error_code(&self) -> &'static str {
        match self {
            PlannerError::Config(_) => "CONFIG_ERROR",
            PlannerError::InvalidPreferences(_) => "INVALID_PREFERENCES",
            PlannerError::Serialization(_) => "SERIALIZATION_ERROR",
            PlannerError::Validation(_) => "VALIDATION_ERROR",
            PlannerError::Provider { .. } => "PROVIDER_ERROR",
            PlannerError::Schedule(_) => "SCHEDULE_ERROR",
            PlannerError::Assembly(_) => "ASSEMBLY_FAILED",
            PlannerError::Persistence(_) => "PERSISTENCE_ERROR",
            PlannerError::Timeout(_) => "TIMEOUT_ERROR",
            PlannerError::Io(_) => "IO_ERROR",
            PlannerError::Unknown(_) => "UNKNOWN_ERROR",
        }
    }

    /// Convert to a structured error payload for the UI layer
    pub fn to_error_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
                "retryable": self.is_retryable()
            }
        })
    }
}
