//! JSON REST API for the Folio contact inbox.
//!
//! Exposes an axum [`Router`] backed by any [`folio_core::store::ContactStore`].
//! Submitting is public; every other operation requires the admin credential
//! (see [`auth`]). TLS, CORS and other transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = Router::new().merge(folio_api::api_router(state));
//! ```

pub mod auth;
pub mod contacts;
pub mod envelope;
pub mod error;
pub mod extract;

use std::sync::Arc;

use axum::{
  Router,
  routing::{MethodRouter, get, post},
};
use folio_core::store::ContactStore;

pub use envelope::{Envelope, route_not_found};
pub use error::ApiError;

use auth::AuthConfig;

/// Path prefix of the contact resource.
pub const CONTACT_PATH: &str = "/api/contact";

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all contact handlers.
#[derive(Clone)]
pub struct ApiState<S: ContactStore> {
  pub store:         Arc<S>,
  /// `None` locks the admin operations.
  pub auth:          Option<Arc<AuthConfig>>,
  /// Upper bound applied to the list `limit` parameter.
  pub max_page_size: u64,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the contact resource router for `state`.
///
/// The returned `Router<()>` can be merged into any parent router regardless
/// of its own state type. Unsupported methods on known paths answer with the
/// same 404 envelope as unknown paths.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: ContactStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let collection = || -> MethodRouter<ApiState<S>> {
    post(contacts::submit::<S>)
      .get(contacts::list::<S>)
      .fallback(route_not_found)
  };

  Router::new()
    .route(CONTACT_PATH, collection())
    .route(&format!("{CONTACT_PATH}/"), collection())
    .route(
      &format!("{CONTACT_PATH}/{{id}}"),
      get(contacts::get_one::<S>)
        .patch(contacts::update_status::<S>)
        .delete(contacts::delete_one::<S>)
        .fallback(route_not_found),
    )
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
