//! Contact record types.
//!
//! A contact is one submission from the portfolio contact form. Its content
//! is fixed at creation; only [`Contact::status`] (and with it
//! [`Contact::updated_at`]) ever changes afterwards.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Status ──────────────────────────────────────────────────────────────────

/// Lifecycle tag an operator assigns to a contact record.
///
/// Every state is reachable from every other through an explicit update;
/// there is no terminal state.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ContactStatus {
  #[default]
  New,
  Read,
  Replied,
  Archived,
}

impl ContactStatus {
  /// Parse a wire value, rejecting anything outside the four known states.
  ///
  /// Matching is exact: `"Read"` or `" read"` are not accepted.
  pub fn parse(s: &str) -> Result<Self> {
    Self::from_str(s).map_err(|_| Error::InvalidStatus(s.to_owned()))
  }
}

// ─── Contact ─────────────────────────────────────────────────────────────────

/// A stored contact submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
  pub id:         Uuid,
  pub name:       String,
  /// Normalised form; see [`crate::email::normalize`].
  pub email:      String,
  pub subject:    String,
  pub message:    String,
  pub status:     ContactStatus,
  /// Peer address of the submitting request, when known.
  pub ip_address: Option<String>,
  pub user_agent: Option<String>,
  /// Server-assigned; never changes after creation.
  pub created_at: DateTime<Utc>,
  /// Equal to `created_at` until the first status update.
  pub updated_at: DateTime<Utc>,
}

/// The summary returned to the submitter after a successful submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactReceipt {
  pub id:         Uuid,
  pub name:       String,
  pub email:      String,
  pub created_at: DateTime<Utc>,
}

impl From<&Contact> for ContactReceipt {
  fn from(c: &Contact) -> Self {
    Self {
      id:         c.id,
      name:       c.name.clone(),
      email:      c.email.clone(),
      created_at: c.created_at,
    }
  }
}

// ─── NewContact ──────────────────────────────────────────────────────────────

/// Request metadata captured alongside a submission. Both fields are
/// best-effort.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOrigin {
  pub ip_address: Option<String>,
  pub user_agent: Option<String>,
}

/// Input to [`crate::store::ContactStore::insert`].
///
/// Produced by [`crate::validation::ContactSubmission::validate`], so every
/// field already satisfies its constraints. `id`, `status` and the
/// timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
  pub name:       String,
  pub email:      String,
  pub subject:    String,
  pub message:    String,
  pub ip_address: Option<String>,
  pub user_agent: Option<String>,
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator;

  use super::*;

  #[test]
  fn status_parses_every_known_value() {
    for status in ContactStatus::iter() {
      assert_eq!(ContactStatus::parse(status.as_ref()).unwrap(), status);
    }
  }

  #[test]
  fn status_rejects_unknown_and_miscased_values() {
    for bad in ["", "pending", "Read", "NEW", " read"] {
      assert!(
        matches!(ContactStatus::parse(bad), Err(Error::InvalidStatus(ref s)) if s == bad),
        "accepted {bad:?}"
      );
    }
  }

  #[test]
  fn status_serialises_lowercase() {
    assert_eq!(
      serde_json::to_string(&ContactStatus::Replied).unwrap(),
      "\"replied\""
    );
    assert_eq!(ContactStatus::default(), ContactStatus::New);
  }

  #[test]
  fn contact_serialises_camel_case() {
    let now = Utc::now();
    let contact = Contact {
      id:         Uuid::new_v4(),
      name:       "Jane Doe".into(),
      email:      "jane@example.com".into(),
      subject:    "Hello there".into(),
      message:    "This is a test message.".into(),
      status:     ContactStatus::New,
      ip_address: Some("127.0.0.1".into()),
      user_agent: None,
      created_at: now,
      updated_at: now,
    };
    let json = serde_json::to_value(&contact).unwrap();
    assert_eq!(json["ipAddress"], "127.0.0.1");
    assert!(json["userAgent"].is_null());
    assert!(json.get("createdAt").is_some());
    assert!(json.get("updatedAt").is_some());
    assert_eq!(json["status"], "new");

    let receipt = ContactReceipt::from(&contact);
    assert_eq!(receipt.id, contact.id);
    assert_eq!(receipt.created_at, now);
  }
}
