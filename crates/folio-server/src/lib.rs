//! HTTP process wiring for the Folio service.
//!
//! Mounts the contact API from [`folio_api`] next to the process endpoints
//! (`/api/health` and `/`) and wraps everything in the transport layers:
//! request tracing, panic recovery, CORS and the security-header baseline.

use std::{any::Any, path::{Path, PathBuf}};

use axum::{
  Json, Router,
  http::{HeaderName, HeaderValue, Method, StatusCode, header},
  response::{IntoResponse, Response},
  routing::get,
};
use folio_api::{ApiState, CONTACT_PATH, Envelope, auth::AuthConfig, route_not_found};
use folio_core::pagination::DEFAULT_MAX_PAGE_SIZE;
use folio_store_sqlite::SqliteStore;
use serde::Deserialize;
use serde_json::json;
use tower_http::{
  catch_panic::CatchPanicLayer,
  cors::CorsLayer,
  set_header::SetResponseHeaderLayer,
  trace::TraceLayer,
};

/// Path of the liveness endpoint.
pub const HEALTH_PATH: &str = "/api/health";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration.
///
/// Layered as built-in defaults, then the optional TOML file, then `FOLIO_*`
/// environment variables.
#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
  pub host:                String,
  pub port:                u16,
  /// The one origin allowed to make cross-origin requests.
  pub client_url:          String,
  pub store_path:          PathBuf,
  pub environment:         String,
  pub max_page_size:       u64,
  pub admin_username:      Option<String>,
  pub admin_password_hash: Option<String>,
}

impl ServerConfig {
  /// Load the configuration, reading `path` if it exists.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .set_default("host", "0.0.0.0")?
      .set_default("port", 5000_i64)?
      .set_default("client_url", "http://localhost:3000")?
      .set_default("store_path", "portfolio.db")?
      .set_default("environment", "development")?
      .set_default("max_page_size", DEFAULT_MAX_PAGE_SIZE as i64)?
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("FOLIO"))
      .build()?
      .try_deserialize()
  }

  /// `store_path` with a leading `~` replaced by `$HOME`.
  pub fn resolved_store_path(&self) -> PathBuf {
    match (self.store_path.strip_prefix("~"), std::env::var_os("HOME")) {
      (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
      _ => self.store_path.clone(),
    }
  }

  /// The admin credential, if both halves are configured and non-empty.
  pub fn admin_credential(&self) -> Option<AuthConfig> {
    let username = self.admin_username.as_deref().filter(|s| !s.is_empty())?;
    let password_hash = self.admin_password_hash.as_deref().filter(|s| !s.is_empty())?;
    Some(AuthConfig {
      username:      username.to_owned(),
      password_hash: password_hash.to_owned(),
    })
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the complete application router.
///
/// `client_origin` is the single origin allowed by CORS.
pub fn router(state: ApiState<SqliteStore>, client_origin: HeaderValue) -> Router {
  let app = Router::new()
    .route(HEALTH_PATH, get(health))
    .route("/", get(service_info))
    .merge(folio_api::api_router(state));
  layered(app, client_origin)
}

/// Wrap `app` in the process-wide layers and the 404 fallback.
fn layered(app: Router, client_origin: HeaderValue) -> Router {
  let cors = CorsLayer::new()
    .allow_origin(client_origin)
    .allow_credentials(true)
    .allow_methods([
      Method::GET,
      Method::POST,
      Method::PATCH,
      Method::DELETE,
      Method::OPTIONS,
    ])
    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

  let mut app = app
    .fallback(route_not_found)
    .layer(CatchPanicLayer::custom(handle_panic))
    .layer(TraceLayer::new_for_http())
    .layer(cors);

  // Applied last so they also wrap preflight and panic responses.
  for (name, value) in SECURITY_HEADERS {
    app = app.layer(SetResponseHeaderLayer::if_not_present(
      HeaderName::from_static(name),
      HeaderValue::from_static(value),
    ));
  }
  app
}

// ─── Security headers ─────────────────────────────────────────────────────────

/// Baseline response headers. Names must be lowercase.
pub const SECURITY_HEADERS: [(&str, &str); 12] = [
  (
    "content-security-policy",
    "default-src 'self';base-uri 'self';font-src 'self' https: data:;\
     form-action 'self';frame-ancestors 'self';img-src 'self' data:;\
     object-src 'none';script-src 'self';script-src-attr 'none';\
     style-src 'self' https: 'unsafe-inline';upgrade-insecure-requests",
  ),
  ("cross-origin-opener-policy", "same-origin"),
  ("cross-origin-resource-policy", "same-origin"),
  ("origin-agent-cluster", "?1"),
  ("referrer-policy", "no-referrer"),
  ("strict-transport-security", "max-age=15552000; includeSubDomains"),
  ("x-content-type-options", "nosniff"),
  ("x-dns-prefetch-control", "off"),
  ("x-download-options", "noopen"),
  ("x-frame-options", "SAMEORIGIN"),
  ("x-permitted-cross-domain-policies", "none"),
  ("x-xss-protection", "0"),
];

// ─── Process endpoints ────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
  Json(json!({
    "status":    "success",
    "message":   "Server is running",
    "timestamp": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
  }))
}

async fn service_info() -> impl IntoResponse {
  Json(json!({
    "message":   "Portfolio API Server",
    "version":   env!("CARGO_PKG_VERSION"),
    "endpoints": {
      "health":  HEALTH_PATH,
      "contact": CONTACT_PATH,
    },
  }))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
  let detail = err
    .downcast_ref::<String>()
    .map(String::as_str)
    .or_else(|| err.downcast_ref::<&str>().copied())
    .unwrap_or("unknown panic payload");
  tracing::error!(panic = detail, "handler panicked");
  (
    StatusCode::INTERNAL_SERVER_ERROR,
    Envelope::error("Internal Server Error"),
  )
    .into_response()
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use super::*;

  use axum::{body::Body, http::Request};
  use serde_json::Value;
  use tower::ServiceExt as _;

  const ORIGIN: &str = "http://localhost:3000";

  async fn app() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let state = ApiState {
      store:         Arc::new(store),
      auth:          None,
      max_page_size: 100,
    };
    router(state, HeaderValue::from_static(ORIGIN))
  }

  async fn body_json(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  fn get_req(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
  }

  fn assert_security_headers(resp: &Response) {
    for (name, value) in SECURITY_HEADERS {
      assert_eq!(
        resp.headers().get(name).and_then(|v| v.to_str().ok()),
        Some(value),
        "{name}"
      );
    }
  }

  #[tokio::test]
  async fn health_reports_running() {
    let resp = app().await.oneshot(get_req("/api/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_security_headers(&resp);

    let body = body_json(resp).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Server is running");
    let ts = body["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
  }

  #[tokio::test]
  async fn root_describes_the_service() {
    let resp = app().await.oneshot(get_req("/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["message"], "Portfolio API Server");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["endpoints"]["health"], "/api/health");
    assert_eq!(body["endpoints"]["contact"], "/api/contact");
  }

  #[tokio::test]
  async fn unknown_route_returns_not_found_envelope() {
    let resp = app().await.oneshot(get_req("/api/nope")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_security_headers(&resp);
    assert_eq!(
      body_json(resp).await,
      json!({ "status": "error", "message": "Route not found" })
    );
  }

  #[tokio::test]
  async fn contact_api_is_mounted() {
    let req = Request::builder()
      .method("POST")
      .uri("/api/contact")
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(
        json!({
          "name": "Jane Doe",
          "email": "jane@example.com",
          "subject": "Hello there",
          "message": "This is a test message.",
        })
        .to_string(),
      ))
      .unwrap();
    let resp = app().await.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_security_headers(&resp);

    // No credential configured: admin routes stay locked.
    let resp = app().await.oneshot(get_req("/api/contact")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn cors_preflight_allows_only_the_client_origin() {
    let preflight = |origin: &str| {
      Request::builder()
        .method("OPTIONS")
        .uri("/api/contact")
        .header(header::ORIGIN, origin)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PATCH")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap()
    };

    let resp = app().await.oneshot(preflight(ORIGIN)).await.unwrap();
    let h = resp.headers();
    assert_eq!(h.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), ORIGIN);
    assert_eq!(h.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(), "true");
    let methods = h
      .get(header::ACCESS_CONTROL_ALLOW_METHODS)
      .unwrap()
      .to_str()
      .unwrap();
    assert!(methods.contains("PATCH"));
    assert_security_headers(&resp);

    let resp = app()
      .await
      .oneshot(preflight("https://evil.example"))
      .await
      .unwrap();
    assert!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
  }

  #[tokio::test]
  async fn handler_headers_are_not_overridden() {
    let inner = Router::new().route(
      "/framed",
      get(|| async { ([(header::X_FRAME_OPTIONS, "DENY")], "ok") }),
    );
    let resp = layered(inner, HeaderValue::from_static(ORIGIN))
      .oneshot(get_req("/framed"))
      .await
      .unwrap();
    assert_eq!(resp.headers().get(header::X_FRAME_OPTIONS).unwrap(), "DENY");
    assert_eq!(
      resp.headers().get(header::X_CONTENT_TYPE_OPTIONS).unwrap(),
      "nosniff"
    );
  }

  #[tokio::test]
  async fn panics_become_internal_error_envelopes() {
    async fn boom() -> &'static str { panic!("kaboom") }

    let inner = Router::new().route("/boom", get(boom));
    let resp = layered(inner, HeaderValue::from_static(ORIGIN))
      .oneshot(get_req("/boom"))
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_security_headers(&resp);
    assert_eq!(
      body_json(resp).await,
      json!({ "status": "error", "message": "Internal Server Error" })
    );
  }

  #[test]
  fn config_defaults_apply_without_a_file() {
    let missing = std::env::temp_dir().join("folio-no-such-config.toml");
    let cfg = ServerConfig::load(&missing).unwrap();
    assert_eq!(cfg.max_page_size, 100);
    assert!(!cfg.environment.is_empty());
  }

  #[test]
  fn config_file_overrides_defaults() {
    let path = std::env::temp_dir()
      .join(format!("folio-config-{}.toml", std::process::id()));
    std::fs::write(
      &path,
      "port = 8088\nclient_url = \"https://me.example\"\nadmin_username = \"op\"\n",
    )
    .unwrap();

    let cfg = ServerConfig::load(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(cfg.client_url, "https://me.example");
    assert_eq!(cfg.store_path, PathBuf::from("portfolio.db"));
    // A username alone does not unlock anything.
    assert!(cfg.admin_credential().is_none());
  }

  #[test]
  fn store_path_expands_home() {
    let mut cfg = ServerConfig::load(Path::new("/nonexistent/folio.toml")).unwrap();
    cfg.store_path = PathBuf::from("/var/lib/folio.db");
    assert_eq!(cfg.resolved_store_path(), PathBuf::from("/var/lib/folio.db"));

    if let Some(home) = std::env::var_os("HOME") {
      cfg.store_path = PathBuf::from("~/data/folio.db");
      assert_eq!(
        cfg.resolved_store_path(),
        PathBuf::from(home).join("data/folio.db")
      );
    }
  }

  #[test]
  fn admin_credential_requires_both_halves() {
    let mut cfg = ServerConfig::load(Path::new("/nonexistent/folio.toml")).unwrap();
    cfg.admin_username = Some("op".into());
    cfg.admin_password_hash = Some(String::new());
    assert!(cfg.admin_credential().is_none());

    cfg.admin_password_hash = Some("$argon2id$v=19$m=19456,t=2,p=1$abc$def".into());
    let auth = cfg.admin_credential().unwrap();
    assert_eq!(auth.username, "op");
  }
}
