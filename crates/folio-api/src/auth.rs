//! HTTP Basic-auth gate for the admin operations.
//!
//! Listing, reading, re-tagging and deleting contacts all require the
//! operator credential. Submitting does not.

use argon2::{
  Argon2,
  password_hash::{PasswordHash, PasswordVerifier},
};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use folio_core::store::ContactStore;

use crate::{ApiState, error::ApiError};

/// The single operator account.
#[derive(Clone, Debug)]
pub struct AuthConfig {
  pub username:      String,
  /// argon2 PHC string, as printed by `folio-server --hash-password`.
  pub password_hash: String,
}

impl AuthConfig {
  /// Whether `username`/`password` match this account. An unparsable hash
  /// matches nothing.
  pub fn accepts(&self, username: &str, password: &str) -> bool {
    if username != self.username {
      return false;
    }
    PasswordHash::new(&self.password_hash).is_ok_and(|hash| {
      Argon2::default()
        .verify_password(password.as_bytes(), &hash)
        .is_ok()
    })
  }
}

/// Decode `Authorization: Basic <base64(user:pass)>`.
fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
  let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
  let (scheme, token) = value.split_once(' ')?;
  if !scheme.eq_ignore_ascii_case("basic") {
    return None;
  }
  let decoded = String::from_utf8(STANDARD.decode(token.trim()).ok()?).ok()?;
  let (user, pass) = decoded.split_once(':')?;
  Some((user.to_owned(), pass.to_owned()))
}

/// Check the request's Basic credentials against `config`.
pub fn verify_auth(headers: &HeaderMap, config: &AuthConfig) -> Result<(), ApiError> {
  match basic_credentials(headers) {
    Some((user, pass)) if config.accepts(&user, &pass) => Ok(()),
    Some((user, _)) => {
      tracing::debug!(%user, "admin credentials rejected");
      Err(ApiError::Unauthorized)
    }
    None => Err(ApiError::Unauthorized),
  }
}

/// Proof that the request carried valid admin credentials. Taking it as a
/// handler argument gates the handler.
pub struct Admin;

impl<S> FromRequestParts<ApiState<S>> for Admin
where
  S: ContactStore + Clone + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &ApiState<S>,
  ) -> Result<Self, ApiError> {
    let Some(config) = state.auth.as_deref() else {
      tracing::debug!("admin request refused: no admin credential configured");
      return Err(ApiError::Unauthorized);
    };
    verify_auth(&parts.headers, config).map(|()| Admin)
  }
}
