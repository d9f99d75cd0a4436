//! Page-number pagination for contact listings.

use serde::{Deserialize, Serialize};

use crate::validation::FieldViolation;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u64 = 50;

/// Default upper bound on a requested page size.
pub const DEFAULT_MAX_PAGE_SIZE: u64 = 100;

/// A validated page request. `page` is 1-based; both fields are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
  pub page:  u64,
  pub limit: u64,
}

impl Default for PageRequest {
  fn default() -> Self { Self { page: 1, limit: DEFAULT_PAGE_SIZE } }
}

impl PageRequest {
  /// Parse raw query-string values. Absent values take their defaults and a
  /// `limit` above `max_limit` is clamped to it.
  pub fn parse(
    page: Option<&str>,
    limit: Option<&str>,
    max_limit: u64,
  ) -> Result<Self, Vec<FieldViolation>> {
    let mut violations = Vec::new();
    let mut positive = |field: &str, label: &str, raw: Option<&str>, default: u64| {
      match raw.map(str::trim) {
        None | Some("") => Some(default),
        Some(s) => match s.parse::<u64>() {
          Ok(n) if n >= 1 => Some(n),
          _ => {
            violations.push(FieldViolation::new(
              field,
              format!("{label} must be a positive integer"),
            ));
            None
          }
        },
      }
    };

    let page = positive("page", "Page", page, 1);
    let limit = positive("limit", "Limit", limit, DEFAULT_PAGE_SIZE);

    match (page, limit) {
      (Some(page), Some(limit)) => Ok(Self { page, limit: limit.min(max_limit.max(1)) }),
      _ => Err(violations),
    }
  }

  /// Number of records to skip: `(page - 1) * limit`, saturating.
  pub fn offset(&self) -> u64 { (self.page - 1).saturating_mul(self.limit) }

  /// Build the pagination summary for a result set of `total` records.
  pub fn summarize(&self, total: u64) -> Pagination {
    Pagination {
      total,
      page: self.page,
      limit: self.limit,
      pages: total.div_ceil(self.limit),
    }
  }
}

/// Pagination metadata reported alongside a page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
  pub total: u64,
  pub page:  u64,
  pub limit: u64,
  /// `ceil(total / limit)`; zero when there are no matches.
  pub pages: u64,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn absent_values_take_defaults() {
    let p = PageRequest::parse(None, None, DEFAULT_MAX_PAGE_SIZE).unwrap();
    assert_eq!(p, PageRequest::default());
    assert_eq!(p.offset(), 0);
    let p = PageRequest::parse(Some(""), Some(" "), DEFAULT_MAX_PAGE_SIZE).unwrap();
    assert_eq!(p, PageRequest::default());
  }

  #[test]
  fn offset_skips_previous_pages() {
    let p = PageRequest::parse(Some("2"), Some("10"), DEFAULT_MAX_PAGE_SIZE).unwrap();
    assert_eq!(p.offset(), 10);
    let p = PageRequest::parse(Some("4"), Some("25"), DEFAULT_MAX_PAGE_SIZE).unwrap();
    assert_eq!(p.offset(), 75);
  }

  #[test]
  fn limit_is_clamped_to_max() {
    let p = PageRequest::parse(None, Some("5000"), 100).unwrap();
    assert_eq!(p.limit, 100);
  }

  #[test]
  fn rejects_zero_negative_and_garbage() {
    let v = PageRequest::parse(Some("0"), Some("-5"), 100).unwrap_err();
    let fields: Vec<_> = v.iter().map(|f| f.field.as_str()).collect();
    assert_eq!(fields, ["page", "limit"]);
    assert_eq!(v[0].message, "Page must be a positive integer");

    let v = PageRequest::parse(Some("two"), None, 100).unwrap_err();
    assert_eq!(v.len(), 1);
    assert_eq!(v[0].field, "page");
  }

  #[test]
  fn summary_rounds_pages_up() {
    let p = PageRequest { page: 2, limit: 10 };
    assert_eq!(
      p.summarize(25),
      Pagination { total: 25, page: 2, limit: 10, pages: 3 }
    );
    assert_eq!(p.summarize(20).pages, 2);
    assert_eq!(p.summarize(0).pages, 0);
  }
}
