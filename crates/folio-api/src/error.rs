//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every variant renders as an error [`Envelope`]. Internal failures carry a
//! fixed, client-safe message; their source is logged and never returned.

use axum::{
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use folio_core::validation::FieldViolation;
use thiserror::Error;

use crate::envelope::Envelope;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("validation failed")]
  Validation(Vec<FieldViolation>),

  #[error("invalid status value")]
  InvalidStatus,

  #[error("contact message not found")]
  NotFound,

  #[error("unauthorized")]
  Unauthorized,

  /// The framework could not decode the request (malformed body or query).
  #[error("rejected request: {message}")]
  Rejected { status: StatusCode, message: String },

  #[error("{message}")]
  Internal {
    message: &'static str,
    #[source]
    source:  Box<dyn std::error::Error + Send + Sync>,
  },
}

impl ApiError {
  /// Adapter for `map_err` that wraps a store error with the client-facing
  /// `message` for the failing operation.
  pub fn internal<E>(message: &'static str) -> impl FnOnce(E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    move |e| Self::Internal { message, source: Box::new(e) }
  }
}

impl From<folio_core::Error> for ApiError {
  fn from(e: folio_core::Error) -> Self {
    match e {
      folio_core::Error::Validation(v) => Self::Validation(v),
      folio_core::Error::InvalidStatus(_) => Self::InvalidStatus,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::Validation(errors) => {
        tracing::debug!(?errors, "validation failed");
        (
          StatusCode::BAD_REQUEST,
          Envelope::error("Validation failed").with_errors(errors),
        )
          .into_response()
      }
      ApiError::InvalidStatus => {
        (StatusCode::BAD_REQUEST, Envelope::error("Invalid status value"))
          .into_response()
      }
      ApiError::NotFound => {
        (StatusCode::NOT_FOUND, Envelope::error("Contact message not found"))
          .into_response()
      }
      ApiError::Unauthorized => {
        let mut res =
          (StatusCode::UNAUTHORIZED, Envelope::error("Unauthorized")).into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Basic realm=\"folio\""),
        );
        res
      }
      ApiError::Rejected { status, message } => {
        tracing::debug!(%status, %message, "request rejected");
        (status, Envelope::error(message)).into_response()
      }
      ApiError::Internal { message, source } => {
        tracing::error!(error = %source, "{message}");
        (StatusCode::INTERNAL_SERVER_ERROR, Envelope::error(message)).into_response()
      }
    }
  }
}
