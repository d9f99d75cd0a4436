//! Error types for `folio-core`.

use thiserror::Error;

use crate::validation::FieldViolation;

#[derive(Debug, Error)]
pub enum Error {
  /// One or more input fields failed validation. Always non-empty.
  #[error("validation failed on {} field(s)", .0.len())]
  Validation(Vec<FieldViolation>),

  #[error("invalid status value: {0:?}")]
  InvalidStatus(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
