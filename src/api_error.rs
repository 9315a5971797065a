//! HTTP error responses.
//!
//! Errors leave the server as `application/problem+json` bodies with a
//! title, a detail message and a numeric error code.

use crate::error::Error;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API HTTP error.
#[derive(Debug)]
pub struct ApiError {
    pub http_code: StatusCode,
    pub body: ErrorBody,
}

/// Error body serialized in JSON responses.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<u16>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.body.detail.is_empty() {
            write!(f, "{}: {}", self.body.title, self.body.detail)
        } else {
            write!(f, "{}", self.body.title)
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    pub fn new(http_code: StatusCode) -> Self {
        Self {
            http_code,
            body: ErrorBody::default(),
        }
    }

    /// 404
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND)
            .title("Not Found")
            .error_code(StatusCode::NOT_FOUND.as_u16())
    }

    /// 422
    pub fn unprocessable() -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY)
            .title("Unprocessable Entity")
            .error_code(StatusCode::UNPROCESSABLE_ENTITY.as_u16())
    }

    /// 500
    pub fn internal(cause: impl fmt::Display) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR)
            .title("Internal Server Error")
            .detail(cause.to_string())
            .error_code(StatusCode::INTERNAL_SERVER_ERROR.as_u16())
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.body.title = title.into();
        self
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.body.detail = detail.into();
        self
    }

    pub fn error_code(mut self, code: u16) -> Self {
        self.body.error_code = Some(code);
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::to_string(&self.body).unwrap_or_default();

        (
            self.http_code,
            [(header::CONTENT_TYPE, "application/problem+json")],
            body,
        )
            .into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        if !err.is_user_error() {
            error!("Request failed: {}", err);
            return ApiError::internal(err);
        }
        match &err {
            Error::NotFound { .. } => ApiError::not_found().detail(err.to_string()),
            _ => ApiError::unprocessable().detail(err.to_string()),
        }
    }
}

/// Type alias for handler results.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
