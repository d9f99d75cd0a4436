//! The uniform JSON envelope wrapped around every response.
//!
//! ```json
//! { "status": "success" | "error", "message": "...", "data": ..., "errors": [...] }
//! ```
//!
//! Absent members are omitted rather than serialised as `null`.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use folio_core::validation::FieldViolation;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
  Success,
  Error,
}

#[derive(Debug, Serialize)]
pub struct Envelope<T = ()> {
  pub status:  Outcome,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub data:    Option<T>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub errors:  Option<Vec<FieldViolation>>,
}

impl<T> Envelope<T> {
  pub fn success(data: T) -> Self {
    Self {
      status:  Outcome::Success,
      message: None,
      data:    Some(data),
      errors:  None,
    }
  }

  pub fn with_message(mut self, message: impl Into<String>) -> Self {
    self.message = Some(message.into());
    self
  }
}

impl Envelope {
  /// A success envelope carrying only a message.
  pub fn confirmation(message: impl Into<String>) -> Self {
    Self {
      status:  Outcome::Success,
      message: Some(message.into()),
      data:    None,
      errors:  None,
    }
  }

  pub fn error(message: impl Into<String>) -> Self {
    Self {
      status:  Outcome::Error,
      message: Some(message.into()),
      data:    None,
      errors:  None,
    }
  }

  pub fn with_errors(mut self, errors: Vec<FieldViolation>) -> Self {
    self.errors = Some(errors);
    self
  }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
  fn into_response(self) -> Response { Json(self).into_response() }
}

/// Fallback for unmatched routes and unsupported methods.
pub async fn route_not_found() -> Response {
  (StatusCode::NOT_FOUND, Envelope::error("Route not found")).into_response()
}
