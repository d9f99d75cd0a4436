//! Handlers for the `/api/contact` resource.
//!
//! | Method   | Path               | Auth   | Notes |
//! |----------|--------------------|--------|-------|
//! | `POST`   | `/api/contact`     | public | Body: [`ContactSubmission`]; returns 201 + receipt |
//! | `GET`    | `/api/contact`     | admin  | Optional `?status`, `?page`, `?limit` |
//! | `GET`    | `/api/contact/:id` | admin  | 404 if absent or malformed |
//! | `PATCH`  | `/api/contact/:id` | admin  | Body: `{"status":"read"}` |
//! | `DELETE` | `/api/contact/:id` | admin  | Permanent |

use axum::{
  extract::{Query, State, rejection::QueryRejection},
  http::StatusCode,
  response::IntoResponse,
};
use folio_core::{
  contact::{Contact, ContactReceipt, ContactStatus},
  pagination::Pagination,
  store::{ContactQuery, ContactStore},
  validation::ContactSubmission,
};
use serde::{Deserialize, Serialize};

use crate::{
  ApiState,
  auth::Admin,
  envelope::Envelope,
  error::ApiError,
  extract::{ClientOrigin, ContactId, Payload},
};

const SUBMIT_FAILED: &str = "Failed to submit contact form. Please try again later.";
const LIST_FAILED: &str = "Failed to retrieve contact messages";
const GET_FAILED: &str = "Failed to retrieve contact message";
const UPDATE_FAILED: &str = "Failed to update contact message";
const DELETE_FAILED: &str = "Failed to delete contact message";

// ─── Submit ───────────────────────────────────────────────────────────────────

/// `POST /api/contact`: returns 201 and a [`ContactReceipt`].
pub async fn submit<S>(
  State(state): State<ApiState<S>>,
  ClientOrigin(origin): ClientOrigin,
  Payload(body): Payload<ContactSubmission>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ContactStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let input = body.validate(origin)?;
  let contact = state
    .store
    .insert(input)
    .await
    .map_err(ApiError::internal(SUBMIT_FAILED))?;

  tracing::info!(id = %contact.id, "contact submission stored");

  Ok((
    StatusCode::CREATED,
    Envelope::success(ContactReceipt::from(&contact))
      .with_message("Thank you for your message! I will get back to you soon."),
  ))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// Raw query string; parsed by [`ContactQuery::from_params`] so that every
/// invalid parameter is reported in the envelope.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub status: Option<String>,
  pub page:   Option<String>,
  pub limit:  Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ContactList {
  pub contacts:   Vec<Contact>,
  pub pagination: Pagination,
}

/// `GET /api/contact[?status=<status>][&page=<n>][&limit=<n>]`
pub async fn list<S>(
  _admin: Admin,
  State(state): State<ApiState<S>>,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Envelope<ContactList>, ApiError>
where
  S: ContactStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let Query(params) = params.map_err(|e| ApiError::Rejected {
    status:  e.status(),
    message: e.body_text(),
  })?;

  let query = ContactQuery::from_params(
    params.status.as_deref(),
    params.page.as_deref(),
    params.limit.as_deref(),
    state.max_page_size,
  )?;

  let page = state
    .store
    .list(&query)
    .await
    .map_err(ApiError::internal(LIST_FAILED))?;

  Ok(Envelope::success(ContactList {
    pagination: query.page.summarize(page.total),
    contacts:   page.contacts,
  }))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /api/contact/:id`
pub async fn get_one<S>(
  _admin: Admin,
  State(state): State<ApiState<S>>,
  ContactId(id): ContactId,
) -> Result<Envelope<Contact>, ApiError>
where
  S: ContactStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let contact = state
    .store
    .get(id)
    .await
    .map_err(ApiError::internal(GET_FAILED))?
    .ok_or(ApiError::NotFound)?;
  Ok(Envelope::success(contact))
}

// ─── Update status ────────────────────────────────────────────────────────────

/// JSON body accepted by `PATCH /api/contact/:id`.
///
/// `status` is kept as a raw JSON value so that a missing, non-string or
/// unknown status all fail the same way.
#[derive(Debug, Default, Deserialize)]
pub struct StatusBody {
  #[serde(default)]
  pub status: Option<serde_json::Value>,
}

/// `PATCH /api/contact/:id` with body `{"status":"new|read|replied|archived"}`.
///
/// The status is checked before the id.
pub async fn update_status<S>(
  _admin: Admin,
  State(state): State<ApiState<S>>,
  id: Result<ContactId, ApiError>,
  Payload(body): Payload<StatusBody>,
) -> Result<Envelope<Contact>, ApiError>
where
  S: ContactStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let status = body
    .status
    .as_ref()
    .and_then(serde_json::Value::as_str)
    .ok_or(ApiError::InvalidStatus)
    .and_then(|s| ContactStatus::parse(s).map_err(ApiError::from))?;

  let ContactId(id) = id?;
  let contact = state
    .store
    .update_status(id, status)
    .await
    .map_err(ApiError::internal(UPDATE_FAILED))?
    .ok_or(ApiError::NotFound)?;

  tracing::info!(%id, %status, "contact status updated");

  Ok(Envelope::success(contact).with_message("Contact status updated successfully"))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /api/contact/:id`
pub async fn delete_one<S>(
  _admin: Admin,
  State(state): State<ApiState<S>>,
  ContactId(id): ContactId,
) -> Result<Envelope, ApiError>
where
  S: ContactStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let removed = state
    .store
    .delete(id)
    .await
    .map_err(ApiError::internal(DELETE_FAILED))?;
  if !removed {
    return Err(ApiError::NotFound);
  }

  tracing::info!(%id, "contact deleted");

  Ok(Envelope::confirmation("Contact message deleted successfully"))
}
