//! Request extractors shared by the contact handlers.

use std::{convert::Infallible, net::SocketAddr};

use axum::{
  Form,
  body::Bytes,
  extract::{ConnectInfo, FromRequest, FromRequestParts, Path, Request},
  http::{header, request::Parts},
};
use folio_core::contact::RequestOrigin;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::ApiError;

// ─── Client origin ───────────────────────────────────────────────────────────

/// Best-effort peer address and user agent of the current request.
///
/// The address is only available when the server is run with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub struct ClientOrigin(pub RequestOrigin);

impl<S> FromRequestParts<S> for ClientOrigin
where
  S: Send + Sync,
{
  type Rejection = Infallible;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    let ip_address = parts
      .extensions
      .get::<ConnectInfo<SocketAddr>>()
      .map(|ConnectInfo(addr)| addr.ip().to_string());
    let user_agent = parts
      .headers
      .get(header::USER_AGENT)
      .and_then(|v| v.to_str().ok())
      .map(str::to_owned);
    Ok(Self(RequestOrigin { ip_address, user_agent }))
  }
}

// ─── Contact id ──────────────────────────────────────────────────────────────

/// The `:id` path segment as a contact id.
///
/// A segment that is not a UUID cannot name a stored record, so it is
/// rejected as [`ApiError::NotFound`]. That includes segments that do not
/// percent-decode to UTF-8, such as `%FF`.
#[derive(Debug, Clone, Copy)]
pub struct ContactId(pub Uuid);

impl<S> FromRequestParts<S> for ContactId
where
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, ApiError> {
    let Path(raw) = Path::<String>::from_request_parts(parts, state)
      .await
      .map_err(|e| {
        tracing::debug!(error = %e.body_text(), "unreadable contact id");
        ApiError::NotFound
      })?;
    Uuid::parse_str(&raw).map(Self).map_err(|_| ApiError::NotFound)
  }
}

// ─── Payload ─────────────────────────────────────────────────────────────────

/// A request body accepted as either JSON or `x-www-form-urlencoded`.
///
/// An empty body, or one with any other content type, yields `T::default()`
/// so that missing input is reported by validation rather than as a decoding
/// failure.
pub struct Payload<T>(pub T);

impl<S, T> FromRequest<S> for Payload<T>
where
  S: Send + Sync,
  T: DeserializeOwned + Default,
{
  type Rejection = ApiError;

  async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
    let content_type = req
      .headers()
      .get(header::CONTENT_TYPE)
      .and_then(|v| v.to_str().ok())
      .unwrap_or_default()
      .to_ascii_lowercase();

    if content_type.starts_with("application/x-www-form-urlencoded") {
      let Form(value) = Form::<T>::from_request(req, state).await.map_err(|e| {
        ApiError::Rejected { status: e.status(), message: e.body_text() }
      })?;
      return Ok(Self(value));
    }

    let is_json = content_type.starts_with("application/json")
      || content_type.contains("+json");

    let bytes = Bytes::from_request(req, state).await.map_err(|e| {
      ApiError::Rejected { status: e.status(), message: e.body_text() }
    })?;

    if !is_json || bytes.iter().all(u8::is_ascii_whitespace) {
      return Ok(Self(T::default()));
    }

    serde_json::from_slice(&bytes).map(Self).map_err(|e| ApiError::Rejected {
      status:  axum::http::StatusCode::BAD_REQUEST,
      message: format!("Invalid JSON body: {e}"),
    })
  }
}
