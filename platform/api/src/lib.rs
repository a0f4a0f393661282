use std::sync::Arc;

use async_graphql::{Error, ErrorExtensions};
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum ApiError {
    #[error("login required")]
    Unauthenticated,
    #[error("insufficient permissions")]
    Forbidden,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("invalid id")]
    BadRequest,
    #[error("internal server error")]
    Internal(Arc<anyhow::Error>),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthenticated => "UNAUTHENTICATED",
            ApiError::Forbidden => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Validation(_) => "VALIDATION",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::BadRequest => "BAD_REQUEST",
            ApiError::Internal(_) => "INTERNAL",
        }
    }

    pub fn internal(err: anyhow::Error) -> Self {
        Self::Internal(Arc::new(err))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }
}

impl ErrorExtensions for ApiError {
    fn extend(&self) -> Error {
        if let ApiError::Internal(source) = self {
            tracing::error!(error = %source, "request failed");
        }
        Error::new(self.to_string()).extend_with(|_err, e| {
            e.set("code", self.code());
        })
    }
}

/// Convert any error into a GraphQL error payload while hiding internals.
pub fn internal_error(err: impl Into<anyhow::Error>) -> Error {
    ApiError::internal(err.into()).extend()
}
