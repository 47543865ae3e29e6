use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use std::fmt::{Display, Formatter};

#[derive(Debug, PartialEq)]
pub enum AppErrorType {
    BadRequest { field: String },
    NotFound,
    MethodNotAllowed,
    Timeout,
    StorageError,
    InternalServerError,
}

#[derive(Debug, PartialEq)]
pub struct AppError {
    pub error_type: AppErrorType,
    pub message: Option<String>,
    pub cause: Option<String>,
}

#[derive(Serialize)]
pub struct AppErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    /// Text shown to the client. Storage and internal failures never expose
    /// their cause.
    pub fn message(&self) -> String {
        match self {
            AppError {
                error_type: AppErrorType::StorageError | AppErrorType::InternalServerError,
                ..
            } => "internal".to_string(),

            AppError {
                message: Some(message),
                ..
            } => message.clone(),

            AppError {
                error_type: AppErrorType::NotFound,
                ..
            } => "Not found".to_string(),

            AppError {
                error_type: AppErrorType::MethodNotAllowed,
                ..
            } => "Method not allowed".to_string(),

            AppError {
                error_type: AppErrorType::Timeout,
                ..
            } => "Request timed out".to_string(),

            _ => "An unexpected error has occurred".to_string(),
        }
    }

    pub fn bad_request(field: &str, message: impl ToString) -> AppError {
        AppError {
            error_type: AppErrorType::BadRequest {
                field: field.to_string(),
            },
            message: Some(message.to_string()),
            cause: None,
        }
    }

    pub fn not_found(message: impl ToString) -> AppError {
        AppError {
            error_type: AppErrorType::NotFound,
            message: Some(message.to_string()),
            cause: None,
        }
    }

    pub fn method_not_allowed() -> AppError {
        AppError {
            error_type: AppErrorType::MethodNotAllowed,
            message: None,
            cause: None,
        }
    }

    pub fn timeout() -> AppError {
        AppError {
            error_type: AppErrorType::Timeout,
            message: None,
            cause: None,
        }
    }

    pub fn db_error(error: impl ToString) -> AppError {
        AppError {
            cause: Some(error.to_string()),
            error_type: AppErrorType::StorageError,
            message: None,
        }
    }

    pub fn internal_error(error: impl ToString) -> AppError {
        AppError {
            cause: Some(error.to_string()),
            error_type: AppErrorType::InternalServerError,
            message: None,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        AppError::db_error(error)
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self.error_type {
            AppErrorType::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppErrorType::NotFound => StatusCode::NOT_FOUND,
            AppErrorType::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppErrorType::Timeout => StatusCode::SERVICE_UNAVAILABLE,
            AppErrorType::StorageError | AppErrorType::InternalServerError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let field = match &self.error_type {
            AppErrorType::BadRequest { field } => Some(field.clone()),
            AppErrorType::StorageError | AppErrorType::InternalServerError => {
                tracing::error!(
                    error.cause = ?self.cause,
                    "request failed with {:?}",
                    self.error_type
                );
                None
            }
            _ => None,
        };

        let mut response = HttpResponse::build(self.status_code());
        if self.error_type == AppErrorType::MethodNotAllowed {
            response.insert_header((header::ALLOW, "GET"));
        }

        response.json(AppErrorResponse {
            error: self.message(),
            field,
        })
    }
}
