//! The `ContactStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `folio-store-sqlite`).
//! The API layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  Error, Result,
  contact::{Contact, ContactStatus, NewContact},
  pagination::PageRequest,
  validation::FieldViolation,
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`ContactStore::list`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactQuery {
  /// Restrict to contacts in this status.
  pub status: Option<ContactStatus>,
  pub page:   PageRequest,
}

impl ContactQuery {
  /// Build a query from raw query-string values, reporting every invalid
  /// parameter at once.
  pub fn from_params(
    status: Option<&str>,
    page: Option<&str>,
    limit: Option<&str>,
    max_limit: u64,
  ) -> Result<Self> {
    let mut violations = Vec::new();

    let status = match status.filter(|s| !s.is_empty()) {
      None => None,
      Some(s) => match ContactStatus::parse(s) {
        Ok(status) => Some(status),
        Err(_) => {
          violations.push(FieldViolation::new(
            "status",
            "Status must be one of: new, read, replied, archived",
          ));
          None
        }
      },
    };

    let page = match PageRequest::parse(page, limit, max_limit) {
      Ok(page) => Some(page),
      Err(v) => {
        violations.extend(v);
        None
      }
    };

    match page {
      Some(page) if violations.is_empty() => Ok(Self { status, page }),
      _ => Err(Error::Validation(violations)),
    }
  }
}

/// One page of contacts plus the number of records matching the filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactPage {
  /// Newest first.
  pub contacts: Vec<Contact>,
  pub total:    u64,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a contact inbox backend.
///
/// Each method is a single atomic operation on one record; implementations
/// must not require callers to coordinate concurrent requests.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ContactStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a validated submission with status [`ContactStatus::New`].
  /// The store assigns the id and both timestamps.
  fn insert(
    &self,
    input: NewContact,
  ) -> impl Future<Output = Result<Contact, Self::Error>> + Send + '_;

  /// Retrieve a contact by id. Returns `None` if not found.
  fn get(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Contact>, Self::Error>> + Send + '_;

  /// List contacts matching `query`, newest first.
  fn list<'a>(
    &'a self,
    query: &'a ContactQuery,
  ) -> impl Future<Output = Result<ContactPage, Self::Error>> + Send + 'a;

  /// Set the status of a contact and refresh its `updated_at`.
  /// Returns the updated contact, or `None` if not found.
  fn update_status(
    &self,
    id: Uuid,
    status: ContactStatus,
  ) -> impl Future<Output = Result<Option<Contact>, Self::Error>> + Send + '_;

  /// Permanently remove a contact. Returns `false` if it did not exist.
  fn delete(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_params_give_the_default_query() {
    let q = ContactQuery::from_params(None, None, None, 100).unwrap();
    assert_eq!(q, ContactQuery::default());
    let q = ContactQuery::from_params(Some(""), None, None, 100).unwrap();
    assert_eq!(q.status, None);
  }

  #[test]
  fn known_status_filter_is_accepted() {
    let q = ContactQuery::from_params(Some("archived"), Some("3"), Some("5"), 100)
      .unwrap();
    assert_eq!(q.status, Some(ContactStatus::Archived));
    assert_eq!(q.page, PageRequest { page: 3, limit: 5 });
  }

  #[test]
  fn unknown_status_and_bad_paging_are_reported_together() {
    let err = ContactQuery::from_params(Some("spam"), Some("0"), None, 100)
      .unwrap_err();
    let Error::Validation(v) = err else { panic!("expected validation error") };
    let fields: Vec<_> = v.iter().map(|f| f.field.as_str()).collect();
    assert_eq!(fields, ["status", "page"]);
  }
}
