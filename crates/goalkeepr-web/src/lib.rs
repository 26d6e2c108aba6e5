//! HTTP layer for Goalkeepr.
//!
//! Exposes an axum [`Router`] serving the server-rendered site, backed by any
//! [`GoalkeeprStore`].

pub mod auth;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod middleware;
pub mod pages;
pub mod rate_limit;
pub mod render;

pub use error::Error;

use std::{num::NonZeroU32, sync::Arc};

use axum::{
  Router,
  http::{HeaderName, HeaderValue, header},
  middleware::{from_fn, from_fn_with_state},
  routing::{get, post},
};
use goalkeepr_core::store::GoalkeeprStore;
use governor::Quota;
use serde::Deserialize;
use thiserror::Error as ThisError;
use tower::ServiceBuilder;
use tower_http::{
  request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
  set_header::SetResponseHeaderLayer,
  trace::TraceLayer,
};
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::SameSite};

use handlers::{criteria, goals, health, public, settings, share};
use middleware::{MakeTraceId, TRACE_ID_HEADER, cross_origin_guard, error_pages, request_span};
use rate_limit::RateLimiters;
use render::Templates;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Deployment environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Env {
  Dev,
  Stage,
  #[default]
  Prod,
}

impl Env {
  pub fn as_str(self) -> &'static str {
    match self {
      Env::Dev => "dev",
      Env::Stage => "stage",
      Env::Prod => "prod",
    }
  }
}

/// Runtime server configuration, deserialised from `config.toml`, the
/// environment and command-line overrides.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub env:                    Env,
  pub host:                   String,
  pub port:                   u16,
  pub database_driver:        String,
  /// SQLite path; `~` is expanded and `:memory:` opens a transient store.
  pub database_dsn:           String,
  pub session_lifetime_hours: i64,
  pub honeypot_delay_ms:      u64,
  pub rate_limit_burst:       u32,
  pub rate_limit_per_second:  u32,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      env:                    Env::Prod,
      host:                   "127.0.0.1".to_owned(),
      port:                   4000,
      database_driver:        "sqlite".to_owned(),
      database_dsn:           "~/.local/share/goalkeepr/goalkeepr.db".to_owned(),
      session_lifetime_hours: 24,
      honeypot_delay_ms:      3000,
      rate_limit_burst:       5,
      rate_limit_per_second:  1,
    }
  }
}

#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum ConfigError {
  #[error("unsupported database driver {0:?}; only \"sqlite\" is available")]
  UnsupportedDriver(String),

  #[error("database_dsn must not be empty")]
  EmptyDsn,

  #[error("{0} must be greater than zero")]
  NotPositive(&'static str),
}

impl ServerConfig {
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.database_driver != "sqlite" {
      return Err(ConfigError::UnsupportedDriver(self.database_driver.clone()));
    }
    if self.database_dsn.trim().is_empty() {
      return Err(ConfigError::EmptyDsn);
    }
    if self.session_lifetime_hours <= 0 {
      return Err(ConfigError::NotPositive("session_lifetime_hours"));
    }
    self.rate_limit_quota().map(|_| ())
  }

  /// Token bucket for the sign-in and sign-up forms.
  pub fn rate_limit_quota(&self) -> Result<Quota, ConfigError> {
    let burst = NonZeroU32::new(self.rate_limit_burst)
      .ok_or(ConfigError::NotPositive("rate_limit_burst"))?;
    let per_second = NonZeroU32::new(self.rate_limit_per_second)
      .ok_or(ConfigError::NotPositive("rate_limit_per_second"))?;
    Ok(Quota::per_second(per_second).allow_burst(burst))
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: GoalkeeprStore> {
  pub store:         Arc<S>,
  pub config:        Arc<ServerConfig>,
  pub templates:     Arc<Templates>,
  pub rate_limiters: Arc<RateLimiters>,
}

impl<S: GoalkeeprStore> AppState<S> {
  pub fn new(store: S, config: ServerConfig) -> Result<Self, ConfigError> {
    config.validate()?;
    let quota = config.rate_limit_quota()?;
    Ok(Self {
      store:         Arc::new(store),
      config:        Arc::new(config),
      templates:     Arc::new(Templates::new()),
      rate_limiters: Arc::new(RateLimiters::new(quota)),
    })
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

fn session_layer(config: &ServerConfig) -> SessionManagerLayer<MemoryStore> {
  SessionManagerLayer::new(MemoryStore::default())
    .with_name("goalkeepr")
    .with_http_only(true)
    .with_secure(config.env == Env::Prod)
    .with_same_site(SameSite::Lax)
    .with_expiry(Expiry::OnInactivity(time::Duration::hours(
      config.session_lifetime_hours,
    )))
}

/// Build the axum [`Router`] with every route and the middleware chain.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: GoalkeeprStore + Clone + 'static,
{
  let auth_forms = Router::new()
    .route("/signup", get(handlers::auth::signup_page::<S>).post(handlers::auth::signup::<S>))
    .route("/signin", get(handlers::auth::signin_page::<S>).post(handlers::auth::signin::<S>))
    .route_layer(from_fn_with_state(state.rate_limiters.clone(), rate_limit::enforce));

  let protected = Router::new()
    .route("/goals",                             get(goals::list::<S>))
    .route("/goals/add/",                        get(goals::add_page::<S>).post(goals::add::<S>))
    .route("/goals/share/",                      get(share::list::<S>))
    .route("/goals/share/create",                post(share::create::<S>))
    .route("/goals/share/{id}",                  post(share::delete_override::<S>).delete(share::delete::<S>))
    .route("/goals/{id}",                        get(goals::edit_page::<S>).post(goals::update::<S>).delete(goals::delete::<S>))
    .route("/goals/{id}/criteria",               post(criteria::add::<S>))
    .route("/goals/{id}/criteria/{cid}",         post(criteria::update::<S>).delete(criteria::delete::<S>))
    .route("/goals/{id}/criteria/{cid}/toggle",  post(criteria::toggle::<S>))
    .route("/settings",                          get(settings::show::<S>))
    .route("/settings/branding",                 post(settings::branding::<S>))
    .route("/settings/delete-user",              post(settings::delete_user_override::<S>).delete(settings::delete_user::<S>))
    .route_layer(from_fn(auth::require_auth));

  let layers = ServiceBuilder::new()
    .layer(session_layer(&state.config))
    .layer(from_fn(cross_origin_guard))
    .layer(SetRequestIdLayer::new(TRACE_ID_HEADER, MakeTraceId))
    .layer(PropagateRequestIdLayer::new(TRACE_ID_HEADER))
    .layer(from_fn_with_state(state.templates.clone(), error_pages))
    .layer(TraceLayer::new_for_http().make_span_with(request_span))
    .layer(SetResponseHeaderLayer::overriding(
      header::X_FRAME_OPTIONS,
      HeaderValue::from_static("deny"),
    ))
    .layer(SetResponseHeaderLayer::overriding(
      HeaderName::from_static("x-xss-protection"),
      HeaderValue::from_static("0"),
    ))
    .layer(SetResponseHeaderLayer::overriding(
      header::REFERRER_POLICY,
      HeaderValue::from_static("origin-when-cross-origin"),
    ));

  Router::new()
    .route("/",         get(public::landing::<S>))
    .route("/privacy",  get(public::privacy::<S>))
    .route("/imprint",  get(public::imprint::<S>))
    .route("/s/{id}",   get(public::shared::<S>))
    .route("/healthz",  get(health::healthz::<S>))
    .route("/signout",  post(handlers::auth::signout))
    .merge(auth_forms)
    .merge(protected)
    .fallback(public::not_found)
    .with_state(state)
    .layer(layers)
}

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
  };
  use goalkeepr_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  // ── Harness ────────────────────────────────────────────────────────────────

  fn test_config() -> ServerConfig {
    ServerConfig {
      env: Env::Dev,
      database_dsn: ":memory:".to_owned(),
      honeypot_delay_ms: 10,
      ..ServerConfig::default()
    }
  }

  async fn make_app() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    router(AppState::new(store, test_config()).unwrap())
  }

  /// A browser stand-in: one router, one cookie jar of size one.
  struct Client {
    app:    Router,
    cookie: Option<String>,
  }

  impl Client {
    async fn new() -> Self { Self::on(make_app().await) }

    fn on(app: Router) -> Self { Self { app, cookie: None } }

    async fn send(&mut self, method: &str, uri: &str, headers: &[(&str, &str)], body: &str) -> Response {
      let mut builder = Request::builder().method(method).uri(uri);
      if let Some(cookie) = &self.cookie {
        builder = builder.header(header::COOKIE, cookie);
      }
      for (k, v) in headers {
        builder = builder.header(*k, *v);
      }
      let req = builder.body(Body::from(body.to_owned())).unwrap();
      let res = self.app.clone().oneshot(req).await.unwrap();

      if let Some(set) = res.headers().get(header::SET_COOKIE) {
        let pair = set.to_str().unwrap().split(';').next().unwrap();
        self.cookie = Some(pair.to_owned());
      }
      res
    }

    async fn get(&mut self, uri: &str) -> Response { self.send("GET", uri, &[], "").await }

    async fn post(&mut self, uri: &str, form: &str) -> Response {
      self
        .send("POST", uri, &[("content-type", "application/x-www-form-urlencoded")], form)
        .await
    }

    async fn post_hx(&mut self, uri: &str, form: &str) -> Response {
      self
        .send(
          "POST",
          uri,
          &[("content-type", "application/x-www-form-urlencoded"), ("hx-request", "true")],
          form,
        )
        .await
    }

    async fn delete_hx(&mut self, uri: &str) -> Response {
      self.send("DELETE", uri, &[("hx-request", "true")], "").await
    }

    async fn sign_up(&mut self, email: &str) -> Response {
      let form = format!("email={email}&password=validpassword&repeat_password=validpassword");
      self.post("/signup", &form).await
    }
  }

  async fn body(res: Response) -> String {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
  }

  fn location(res: &Response) -> &str { res.headers()["location"].to_str().unwrap() }

  /// First `/s/{public_id}` link in a page.
  fn public_link(html: &str) -> String {
    let start = html.find("/s/").unwrap();
    html[start..start + 3 + 32].to_owned()
  }

  // ── Public pages ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn public_pages_return_200() {
    let mut c = Client::new().await;
    for uri in ["/", "/privacy", "/imprint", "/signup", "/signin", "/healthz"] {
      let res = c.get(uri).await;
      assert_eq!(res.status(), StatusCode::OK, "{uri}");
    }
  }

  #[tokio::test]
  async fn unknown_paths_render_not_found() {
    let mut c = Client::new().await;
    for uri in ["/s/1", "/a/b/c"] {
      let res = c.get(uri).await;
      assert_eq!(res.status(), StatusCode::NOT_FOUND, "{uri}");
      assert_eq!(res.headers()["content-type"], "text/html; charset=utf-8");
      assert!(body(res).await.contains("Page not found"));
    }
  }

  #[tokio::test]
  async fn protected_pages_redirect_to_sign_in() {
    let mut c = Client::new().await;
    for uri in ["/goals", "/goals/add/", "/goals/share/", "/goals/1", "/settings"] {
      let res = c.get(uri).await;
      assert_eq!(res.status(), StatusCode::SEE_OTHER, "{uri}");
      assert_eq!(location(&res), "/signin");
    }
  }

  #[tokio::test]
  async fn signup_page_has_form() {
    let mut c = Client::new().await;
    let html = body(c.get("/signup").await).await;
    assert!(html.contains(r#"<form action="/signup" method="post" novalidate>"#));
  }

  #[tokio::test]
  async fn healthz_reports_env_and_version() {
    let mut c = Client::new().await;
    let res = c.get("/healthz").await;
    let json: serde_json::Value = serde_json::from_str(&body(res).await).unwrap();
    assert_eq!(json["status"], "available");
    assert_eq!(json["system_info"]["env"], "dev");
    assert_eq!(json["system_info"]["version"], env!("CARGO_PKG_VERSION"));
  }

  // ── Middleware ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn responses_carry_security_headers_and_trace_id() {
    let mut c = Client::new().await;
    let res = c.get("/").await;
    assert_eq!(res.headers()["x-frame-options"], "deny");
    assert_eq!(res.headers()["x-xss-protection"], "0");
    assert_eq!(res.headers()["referrer-policy"], "origin-when-cross-origin");
    let trace_id = res.headers()["x-trace-id"].to_str().unwrap();
    assert_eq!(trace_id.len(), 8);
  }

  #[tokio::test]
  async fn cross_site_posts_are_rejected() {
    let mut c = Client::new().await;
    let res = c
      .send(
        "POST",
        "/signin",
        &[("content-type", "application/x-www-form-urlencoded"), ("sec-fetch-site", "cross-site")],
        "email=user%40example.com&password=validpassword",
      )
      .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
  }

  #[tokio::test]
  async fn sign_in_is_rate_limited() {
    let mut c = Client::new().await;
    for n in 0..5 {
      let res = c.post("/signin", "").await;
      assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY, "attempt {n}");
    }
    let res = c.post("/signin", "").await;
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(body(res).await.contains("Slow Down There!"));

    // Reading the form is never throttled.
    assert_eq!(c.get("/signin").await.status(), StatusCode::OK);
  }

  #[tokio::test]
  async fn sign_up_is_rate_limited() {
    let mut c = Client::new().await;
    for n in 0..5 {
      let res = c.post("/signup", "email=nope").await;
      assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY, "attempt {n}");
    }
    let res = c.sign_up("user%40example.com").await;
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(body(res).await.contains("Slow Down There!"));

    // The throttled attempt created nothing.
    assert_eq!(c.get("/goals").await.status(), StatusCode::SEE_OTHER);
  }

  // ── Accounts ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn valid_signup_lands_on_goals() {
    let mut c = Client::new().await;
    let res = c.sign_up("user%40example.com").await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/goals");

    assert_eq!(c.get("/goals").await.status(), StatusCode::OK);

    let res = c.get("/signup").await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/goals");
  }

  #[tokio::test]
  async fn invalid_signup_shows_every_message() {
    let mut c = Client::new().await;
    let res = c.post("/signup", "email=bad&password=short&repeat_password=other").await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body(res).await;
    assert!(html.contains("This field must be a valid email address"));
    assert!(html.contains("This field must be at least 8 characters long"));
    assert!(html.contains("Passwords do not match"));
    assert!(!html.contains("short"));
  }

  #[tokio::test]
  async fn duplicate_email_is_refused_generically() {
    let app = make_app().await;
    let mut first = Client::on(app.clone());
    first.sign_up("user%40example.com").await;

    let mut second = Client::on(app);
    let res = second.sign_up("USER%40example.com").await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body(res).await.contains("This email cannot be used."));
  }

  #[tokio::test]
  async fn honeypot_submissions_are_discarded() {
    let mut c = Client::new().await;
    let res = c
      .post(
        "/signup",
        "email=bot%40example.com&password=validpassword&repeat_password=validpassword&website=spam",
      )
      .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body(res).await.is_empty());

    // No account was created.
    let res = c.sign_up("bot%40example.com").await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
  }

  #[tokio::test]
  async fn sign_out_then_sign_in_again() {
    let app = make_app().await;
    let mut c = Client::on(app.clone());
    c.sign_up("user%40example.com").await;

    let res = c.post("/signout", "").await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");
    assert_eq!(location(&c.get("/goals").await), "/signin");

    let res = c.post("/signin", "email=user%40example.com&password=wrongpassword").await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body(res).await;
    assert!(html.contains("Invalid email or password."));
    assert!(html.contains(r#"value="user@example.com""#));

    let res = c.post("/signin", "email=nobody%40example.com&password=validpassword").await;
    assert!(body(res).await.contains("Invalid email or password."));

    let res = c.post("/signin", "email=user%40example.com&password=validpassword").await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/goals");
    assert_eq!(c.get("/goals").await.status(), StatusCode::OK);
  }

  #[tokio::test]
  async fn deleting_the_account_signs_out() {
    let mut c = Client::new().await;
    c.sign_up("user%40example.com").await;

    let res = c.delete_hx("/settings/delete-user").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["hx-redirect"], "/signup");
    assert_eq!(location(&c.get("/goals").await), "/signin");

    let res = c.post("/signin", "email=user%40example.com&password=validpassword").await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
  }

  // ── Goals ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn goal_lifecycle() {
    let mut c = Client::new().await;
    c.sign_up("user%40example.com").await;

    let res = c.post("/goals/add/", "goal=Run+a+%3Cb%3Emarathon%3C%2Fb%3E&due=2030-06-01&visible=on").await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/goals");

    let html = body(c.get("/goals").await).await;
    assert!(html.contains("<h2>2030</h2>"));
    assert!(html.contains("Run a &lt;b&gt;marathon&lt;/b&gt;"));
    assert!(!html.contains("<b>marathon"));

    let res = c.post("/goals/1", "goal=Run+a+half+marathon&due=2030-03-01&achieved=on").await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/goals/1");
    let html = body(c.get("/goals/1").await).await;
    assert!(html.contains("Goal saved!"));
    assert!(html.contains("Run a half marathon"));

    // The flash is shown once.
    assert!(!body(c.get("/goals/1").await).await.contains("Goal saved!"));

    let res = c.delete_hx("/goals/1").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["hx-redirect"], "/goals");
    assert_eq!(c.delete_hx("/goals/1").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(c.get("/goals/1").await.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn htmx_saves_redirect_through_header() {
    let mut c = Client::new().await;
    c.sign_up("user%40example.com").await;
    c.post("/goals/add/", "goal=Read&due=2030-01-01").await;

    let res = c.post_hx("/goals/1", "goal=Read+more&due=2030-01-01").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["hx-redirect"], "/goals/1");
    assert!(res.headers().get("location").is_none());

    let res = c.post_hx("/settings/branding", "title=Mine&description=x").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["hx-redirect"], "/settings");
    assert!(res.headers().get("location").is_none());

    let html = body(c.get("/settings").await).await;
    assert!(html.contains("Branding saved"));
  }

  #[tokio::test]
  async fn goal_form_errors_are_unprocessable() {
    let mut c = Client::new().await;
    c.sign_up("user%40example.com").await;

    let res = c.post("/goals/add/", "goal=&due=2030-02-30").await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body(res).await;
    assert!(html.contains("This field cannot be blank"));
    assert!(html.contains("Due date must be a valid date (YYYY-MM-DD)"));
  }

  #[tokio::test]
  async fn method_override_deletes_goal() {
    let mut c = Client::new().await;
    c.sign_up("user%40example.com").await;
    c.post("/goals/add/", "goal=Read&due=2030-01-01").await;

    let res = c.post("/goals/1", "_method=DELETE").await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/goals");
    assert_eq!(c.get("/goals/1").await.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn other_users_goals_look_missing() {
    let app = make_app().await;
    let mut alice = Client::on(app.clone());
    alice.sign_up("alice%40example.com").await;
    alice.post("/goals/add/", "goal=Secret&due=2030-01-01").await;

    let mut bob = Client::on(app);
    bob.sign_up("bob%40example.com").await;
    assert_eq!(bob.get("/goals/1").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(bob.delete_hx("/goals/1").await.status(), StatusCode::NOT_FOUND);
    assert!(!body(bob.get("/goals").await).await.contains("Secret"));

    assert_eq!(alice.get("/goals/1").await.status(), StatusCode::OK);
  }

  #[tokio::test]
  async fn criteria_checklist() {
    let mut c = Client::new().await;
    c.sign_up("user%40example.com").await;
    c.post("/goals/add/", "goal=Marathon&due=2030-01-01").await;

    let res = c.post("/goals/1/criteria", "description=Run+10k").await;
    assert_eq!(location(&res), "/goals/1");
    assert!(body(c.get("/goals/1").await).await.contains("<small>0/1</small>"));

    let res = c.post("/goals/1/criteria/1/toggle", "").await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert!(body(c.get("/goals/1").await).await.contains("<small>1/1</small>"));

    let res = c.post("/goals/1/criteria", "description=").await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body(res).await.contains("Description cannot be blank"));

    // Wrong goal in the path.
    assert_eq!(c.post("/goals/2/criteria/1/toggle", "").await.status(), StatusCode::NOT_FOUND);

    // The inline edit form keeps the completed state in a hidden field.
    let res = c.post("/goals/1/criteria/1", "description=Run+12k&position=2&completed=on").await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    let html = body(c.get("/goals/1").await).await;
    assert!(html.contains(r#"value="Run 12k""#));
    assert!(html.contains("<small>1/1</small>"));

    let res = c.post("/goals/1/criteria/1", "_method=DELETE").await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert!(body(c.get("/goals/1").await).await.contains("<small>0/0</small>"));
  }

  // ── Sharing ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn share_links_expose_only_visible_goals() {
    let app = make_app().await;
    let mut c = Client::on(app.clone());
    c.sign_up("user%40example.com").await;
    c.post("/goals/add/", "goal=Public+goal&due=2030-01-01&visible=on").await;
    c.post("/goals/add/", "goal=Private+goal&due=2030-01-01").await;
    c.post("/settings/branding", "title=My+plans&description=").await;

    let res = c.post_hx("/goals/share/create", "").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["hx-trigger"], "shareCreated");
    let row = body(res).await;
    assert!(row.starts_with("<li id=\"share-"));
    let link = public_link(&row);

    let mut anon = Client::on(app);
    let html = body(anon.get(&link).await).await;
    assert!(html.contains("<h1>My plans</h1>"));
    assert!(html.contains("Public goal"));
    assert!(!html.contains("Private goal"));

    let res = c.delete_hx("/goals/share/1").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(anon.get(&link).await.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn share_quota_is_ten() {
    let mut c = Client::new().await;
    c.sign_up("user%40example.com").await;

    for n in 0..10 {
      let res = c.post("/goals/share/create", "").await;
      assert_eq!(res.status(), StatusCode::SEE_OTHER, "link {n}");
      assert_eq!(location(&res), "/goals/share/");
    }
    let res = c.post("/goals/share/create", "").await;
    assert_eq!(location(&res), "/goals/share/");

    let html = body(c.send("GET", "/goals/share/", &[("host", "goalkeepr.app")], "").await).await;
    assert!(html.contains("You can have at most 10 share links."));
    assert!(html.contains("You reached the maximum number of links."));
    assert_eq!(html.matches("goalkeepr.app/s/").count(), 10);
  }

  #[tokio::test]
  async fn share_post_needs_delete_override() {
    let mut c = Client::new().await;
    c.sign_up("user%40example.com").await;
    c.post("/goals/share/create", "").await;

    assert_eq!(c.post("/goals/share/1", "").await.status(), StatusCode::METHOD_NOT_ALLOWED);
    let res = c.post("/goals/share/1", "_method=DELETE").await;
    assert_eq!(location(&res), "/goals/share/");
    assert_eq!(c.post("/goals/share/1", "_method=DELETE").await.status(), StatusCode::NOT_FOUND);
  }

  // ── Settings ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn branding_is_saved_and_validated() {
    let mut c = Client::new().await;
    c.sign_up("user%40example.com").await;

    let res = c.post("/settings/branding", "title=Year+of+%26+running&description=Plans").await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/settings");

    let html = body(c.get("/settings").await).await;
    assert!(html.contains("Branding saved"));
    assert!(html.contains(r#"value="Year of &amp; running""#));
    assert!(html.contains("user@example.com"));

    let long = "x".repeat(513);
    let res = c.post("/settings/branding", &format!("title={long}")).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body(res).await.contains("Title cannot be more than 512 characters"));
  }
}
