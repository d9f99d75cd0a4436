//! [`SqliteStore`], the SQLite implementation of [`ContactStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use folio_core::{
  contact::{Contact, ContactStatus, NewContact},
  store::{ContactPage, ContactQuery, ContactStore},
};

use crate::{
  Result,
  encode::{CONTACT_COLUMNS, RawContact, encode_dt, encode_status, encode_uuid, now},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A contact inbox backed by a single SQLite file.
///
/// Clones share one connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open a private in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Close the underlying connection. Any remaining clones of this store
  /// will fail subsequent calls.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    tracing::debug!("sqlite connection closed");
    Ok(())
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// SQLite stores integers as `i64`; anything larger is effectively unbounded.
fn to_sql_int(n: u64) -> i64 { i64::try_from(n).unwrap_or(i64::MAX) }

// ─── ContactStore impl ───────────────────────────────────────────────────────

impl ContactStore for SqliteStore {
  type Error = crate::Error;

  async fn insert(&self, input: NewContact) -> Result<Contact> {
    let created_at = now();
    let contact = Contact {
      id: Uuid::new_v4(),
      name: input.name,
      email: input.email,
      subject: input.subject,
      message: input.message,
      status: ContactStatus::New,
      ip_address: input.ip_address,
      user_agent: input.user_agent,
      created_at,
      updated_at: created_at,
    };

    let id_str     = encode_uuid(contact.id);
    let name       = contact.name.clone();
    let email      = contact.email.clone();
    let subject    = contact.subject.clone();
    let message    = contact.message.clone();
    let status_str = encode_status(contact.status);
    let ip_address = contact.ip_address.clone();
    let user_agent = contact.user_agent.clone();
    let at_str     = encode_dt(contact.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO contacts (
             id, name, email, subject, message, status,
             ip_address, user_agent, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
          rusqlite::params![
            id_str, name, email, subject, message, status_str, ip_address,
            user_agent, at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(contact)
  }

  async fn get(&self, id: Uuid) -> Result<Option<Contact>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawContact> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1"),
            rusqlite::params![id_str],
            RawContact::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawContact::into_contact).transpose()
  }

  async fn list(&self, query: &ContactQuery) -> Result<ContactPage> {
    let status_str = query.status.map(encode_status);
    let limit_val  = to_sql_int(query.page.limit);
    let offset_val = to_sql_int(query.page.offset());

    let (raws, total): (Vec<RawContact>, i64) = self
      .conn
      .call(move |conn| {
        // `?1 IS NULL` disables the status filter.
        let total: i64 = conn.query_row(
          "SELECT COUNT(*) FROM contacts WHERE (?1 IS NULL OR status = ?1)",
          rusqlite::params![status_str],
          |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
          "SELECT {CONTACT_COLUMNS}
           FROM contacts
           WHERE (?1 IS NULL OR status = ?1)
           ORDER BY created_at DESC, seq DESC
           LIMIT ?2 OFFSET ?3"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![status_str, limit_val, offset_val],
            RawContact::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((rows, total))
      })
      .await?;

    let contacts = raws
      .into_iter()
      .map(RawContact::into_contact)
      .collect::<Result<_>>()?;

    Ok(ContactPage { contacts, total: u64::try_from(total).unwrap_or_default() })
  }

  async fn update_status(
    &self,
    id:     Uuid,
    status: ContactStatus,
  ) -> Result<Option<Contact>> {
    let id_str     = encode_uuid(id);
    let status_str = encode_status(status);
    let at_str     = encode_dt(now());

    let raw: Option<RawContact> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "UPDATE contacts SET status = ?2, updated_at = ?3
               WHERE id = ?1
               RETURNING {CONTACT_COLUMNS}"
            ),
            rusqlite::params![id_str, status_str, at_str],
            RawContact::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawContact::into_contact).transpose()
  }

  async fn delete(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM contacts WHERE id = ?1", rusqlite::params![id_str])?)
      })
      .await?;

    Ok(removed > 0)
  }
}
