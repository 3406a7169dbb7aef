use serde::Deserialize;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq)]
pub enum AppErrorType {
    ValidationError,
    NetworkError,
    ApiError { status: u16, message: Option<String> },
    DecodeError,
    ConfigError,
    SessionError,
    UploadError,
    InsecureTransport,
    InternalError,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppError {
    pub error_type: AppErrorType,
    pub message: Option<String>,
    pub cause: Option<String>,
}

/// Error body returned by the backend. Either key may carry the text.
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    pub message: Option<String>,
    pub error: Option<String>,
}

impl ApiErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.message
            .filter(|m| !m.trim().is_empty())
            .or_else(|| self.error.filter(|e| !e.trim().is_empty()))
    }
}

impl AppError {
    pub fn message(&self) -> String {
        match self {
            AppError {
                message: Some(message),
                ..
            } => message.clone(),

            AppError {
                message: None,
                error_type: AppErrorType::ApiError {
                    message: Some(message),
                    ..
                },
                ..
            } => message.clone(),

            AppError {
                message: None,
                error_type: AppErrorType::NetworkError,
                ..
            } => "Unable to reach the server. Check your connection and try again".to_string(),
            _ => "An unexpected error has occurred".to_string(),
        }
    }

    /// Message shown to the user, or `fallback` when the server gave none.
    /// Errors raised locally keep their own text.
    pub fn message_or(&self, fallback: &str) -> String {
        if let Some(message) = self.server_message() {
            return message.to_string();
        }
        match self.error_type {
            AppErrorType::ValidationError
            | AppErrorType::InsecureTransport
            | AppErrorType::UploadError
            | AppErrorType::SessionError => self.message(),
            _ => fallback.to_string(),
        }
    }

    pub fn server_message(&self) -> Option<&str> {
        match &self.error_type {
            AppErrorType::ApiError {
                message: Some(message),
                ..
            } => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn api_error(status: u16, message: Option<String>) -> AppError {
        AppError {
            cause: Some(format!("server responded with status {}", status)),
            error_type: AppErrorType::ApiError { status, message },
            message: None,
        }
    }

    pub fn network_error(error: impl ToString) -> AppError {
        AppError {
            cause: Some(error.to_string()),
            error_type: AppErrorType::NetworkError,
            message: None,
        }
    }

    pub fn decode_error(error: impl ToString) -> AppError {
        AppError {
            cause: Some(error.to_string()),
            error_type: AppErrorType::DecodeError,
            message: Some("The server sent a response that could not be read".to_string()),
        }
    }

    pub fn validation_error(message: impl ToString) -> AppError {
        AppError {
            cause: None,
            error_type: AppErrorType::ValidationError,
            message: Some(message.to_string()),
        }
    }

    pub fn upload_error(message: impl ToString) -> AppError {
        AppError {
            cause: None,
            error_type: AppErrorType::UploadError,
            message: Some(message.to_string()),
        }
    }

    pub fn session_error(error: impl ToString) -> AppError {
        AppError {
            cause: Some(error.to_string()),
            error_type: AppErrorType::SessionError,
            message: Some(error.to_string()),
        }
    }

    pub fn internal_error(error: impl ToString) -> AppError {
        AppError {
            cause: Some(error.to_string()),
            error_type: AppErrorType::InternalError,
            message: Some(error.to_string()),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            return AppError::decode_error(error);
        }
        AppError::network_error(error)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        AppError::decode_error(error)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(error: config::ConfigError) -> Self {
        AppError {
            cause: Some(error.to_string()),
            error_type: AppErrorType::ConfigError,
            message: Some(format!("Invalid configuration: {}", error)),
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for AppError {}
