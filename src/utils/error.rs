use axum::http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TryOnError {
    #[error("Invalid request: {message}")]
    InputValidationError { message: String },

    #[error("Could not read or process image '{reference}': {reason}")]
    AssetReadError { reference: String, reason: String },

    #[error("Image model invocation failed: {detail}")]
    ModelInvocationError { detail: String },

    #[error("{message}")]
    NoImageProduced { message: String },

    #[error("Upload rejected: {message}")]
    UploadRejected { message: String },

    #[error("Upload exceeds the {limit} byte limit")]
    UploadTooLarge { limit: usize },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Password hashing failed: {detail}")]
    HashingError { detail: String },

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },
}

impl TryOnError {
    pub fn input(message: impl Into<String>) -> Self {
        Self::InputValidationError {
            message: message.into(),
        }
    }

    pub fn asset(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::AssetReadError {
            reference: reference.into(),
            reason: reason.into(),
        }
    }

    pub fn model(detail: impl Into<String>) -> Self {
        Self::ModelInvocationError {
            detail: detail.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InputValidationError { .. } | Self::UploadRejected { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::UploadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to hand back to API clients. Provider and database
    /// internals stay in the server log.
    pub fn client_message(&self) -> String {
        match self {
            Self::InputValidationError { message } | Self::UploadRejected { message } => {
                message.clone()
            }
            Self::AssetReadError { reference, .. } => {
                format!("Could not read or process the image file: {}", reference)
            }
            Self::ModelInvocationError { .. } => {
                "The image model could not be reached. Please try again later.".to_string()
            }
            Self::NoImageProduced { message } | Self::Conflict { message } => message.clone(),
            Self::UploadTooLarge { .. } => self.to_string(),
            _ => "Internal server error.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TryOnError>;
