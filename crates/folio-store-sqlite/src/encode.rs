//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microsecond
//! precision, `Z` suffix) so that lexical order equals chronological order.
//! UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use folio_core::contact::{Contact, ContactStatus};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// The current time truncated to the precision we store, so a value handed
/// back from a write equals the same value read back later.
pub fn now() -> DateTime<Utc> {
  let now = Utc::now();
  decode_dt(&encode_dt(now)).unwrap_or(now)
}

// ─── ContactStatus ────────────────────────────────────────────────────────────

pub fn encode_status(s: ContactStatus) -> &'static str {
  match s {
    ContactStatus::New => "new",
    ContactStatus::Read => "read",
    ContactStatus::Replied => "replied",
    ContactStatus::Archived => "archived",
  }
}

pub fn decode_status(s: &str) -> Result<ContactStatus> {
  ContactStatus::parse(s).map_err(|_| Error::UnknownStatus(s.to_owned()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawContact::from_row`].
pub const CONTACT_COLUMNS: &str = "id, name, email, subject, message, status, \
                                   ip_address, user_agent, created_at, updated_at";

/// Raw strings read directly from a `contacts` row.
pub struct RawContact {
  pub id:         String,
  pub name:       String,
  pub email:      String,
  pub subject:    String,
  pub message:    String,
  pub status:     String,
  pub ip_address: Option<String>,
  pub user_agent: Option<String>,
  pub created_at: String,
  pub updated_at: String,
}

impl RawContact {
  /// Read a row selected with [`CONTACT_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      name:       row.get(1)?,
      email:      row.get(2)?,
      subject:    row.get(3)?,
      message:    row.get(4)?,
      status:     row.get(5)?,
      ip_address: row.get(6)?,
      user_agent: row.get(7)?,
      created_at: row.get(8)?,
      updated_at: row.get(9)?,
    })
  }

  pub fn into_contact(self) -> Result<Contact> {
    Ok(Contact {
      id:         decode_uuid(&self.id)?,
      name:       self.name,
      email:      self.email,
      subject:    self.subject,
      message:    self.message,
      status:     decode_status(&self.status)?,
      ip_address: self.ip_address,
      user_agent: self.user_agent,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}
