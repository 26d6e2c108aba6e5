//! Cross-cutting request and response handling: cross-origin protection,
//! trace ids, the access-log span, security headers, error pages and the
//! HTMX redirect convention.

use std::sync::Arc;

use axum::{
  body::Body,
  extract::{Request, State},
  http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, header},
  middleware::Next,
  response::{IntoResponse, Redirect, Response},
};
use chrono::{Datelike, Utc};
use rand_core::{OsRng, RngCore as _};
use tower_http::request_id::{MakeRequestId, RequestId};
use tower_sessions::Session;
use tracing::Span;

use crate::{
  auth,
  error::{Error, ErrorPage},
  pages::public::ErrorView,
  render::{Page, TemplateData, Templates, View},
};

pub const TRACE_ID_HEADER: HeaderName = HeaderName::from_static("x-trace-id");

pub const HX_REQUEST: HeaderName = HeaderName::from_static("hx-request");
pub const HX_REDIRECT: HeaderName = HeaderName::from_static("hx-redirect");
pub const HX_TRIGGER: HeaderName = HeaderName::from_static("hx-trigger");

// ─── Cross-origin protection ─────────────────────────────────────────────────

/// Whether a state-changing request came from another origin. Browsers send
/// `Sec-Fetch-Site`; older ones only `Origin`, which must then match `Host`.
/// Requests carrying neither are not from a browser and pass.
fn is_cross_origin(method: &Method, headers: &HeaderMap) -> bool {
  if matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS) {
    return false;
  }

  if let Some(site) = headers.get("sec-fetch-site") {
    return !matches!(site.as_bytes(), b"same-origin" | b"none");
  }

  let Some(origin) = headers.get(header::ORIGIN) else {
    return false;
  };
  let origin_host = origin
    .to_str()
    .ok()
    .and_then(|o| o.split_once("://"))
    .map(|(_, host)| host);
  let host = headers.get(header::HOST).and_then(|h| h.to_str().ok());

  match (origin_host, host) {
    (Some(origin_host), Some(host)) => origin_host != host,
    _ => true,
  }
}

pub async fn cross_origin_guard(req: Request, next: Next) -> Response {
  if is_cross_origin(req.method(), req.headers()) {
    tracing::warn!(method = %req.method(), path = %req.uri().path(), "cross-origin request rejected");
    return Error::Forbidden.into_response();
  }
  next.run(req).await
}

// ─── Trace ids ───────────────────────────────────────────────────────────────

/// Short random correlation id: four OS-random bytes, hex-encoded.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeTraceId;

impl MakeRequestId for MakeTraceId {
  fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
    let mut bytes = [0u8; 4];
    OsRng.fill_bytes(&mut bytes);
    HeaderValue::from_str(&hex::encode(bytes))
      .ok()
      .map(RequestId::new)
  }
}

/// The trace id assigned to a request, or `"-"` outside the trace layer.
pub fn trace_id<B>(req: &axum::http::Request<B>) -> String {
  req
    .extensions()
    .get::<RequestId>()
    .and_then(|id| id.header_value().to_str().ok())
    .unwrap_or("-")
    .to_owned()
}

/// Span for the access log; every event inside a request carries its trace
/// id.
pub fn request_span(req: &axum::http::Request<Body>) -> Span {
  tracing::info_span!(
    "request",
    method   = %req.method(),
    path     = %req.uri().path(),
    trace_id = %trace_id(req),
  )
}

// ─── Error pages ─────────────────────────────────────────────────────────────

/// Replace the body of responses tagged with an [`ErrorPage`] by the full
/// HTML page.
pub async fn error_pages(
  State(templates): State<Arc<Templates>>,
  session: Session,
  req: Request,
  next: Next,
) -> Response {
  let trace_id = trace_id(&req);
  let res = next.run(req).await;

  let Some(error_page) = res.extensions().get::<ErrorPage>().cloned() else {
    return res;
  };

  let (page, view) = match error_page {
    ErrorPage::NotFound => (Page::NotFound, View::None),
    ErrorPage::TooManyRequests => (Page::TooManyRequests, View::None),
    ErrorPage::Internal { message } => (Page::Error, View::Error(ErrorView {
      trace_id,
      message,
    })),
  };

  let data = TemplateData {
    year: Utc::now().year(),
    is_authenticated: auth::is_authenticated(&session).await,
    flash: None,
    view,
  };

  let (mut parts, _) = res.into_parts();
  match templates.execute(page, &data) {
    Ok(html) => {
      parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
      );
      parts.headers.remove(header::CONTENT_LENGTH);
      Response::from_parts(parts, Body::from(html))
    }
    Err(e) => {
      tracing::error!(error = %e, page = page.name(), "error page failed to render");
      (parts.status, "Internal Server Error").into_response()
    }
  }
}

// ─── HTMX ────────────────────────────────────────────────────────────────────

pub fn is_htmx(headers: &HeaderMap) -> bool {
  headers
    .get(HX_REQUEST)
    .is_some_and(|v| v.as_bytes() == b"true")
}

/// `303 See Other` for page navigations; `200` plus `HX-Redirect` for HTMX
/// requests, which would otherwise follow the redirect in the background.
pub fn redirect(headers: &HeaderMap, to: &str) -> Response {
  if !is_htmx(headers) {
    return Redirect::to(to).into_response();
  }
  match HeaderValue::from_str(to) {
    Ok(location) => (StatusCode::OK, [(HX_REDIRECT, location)]).into_response(),
    Err(_) => Redirect::to(to).into_response(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (k, v) in pairs {
      map.insert(*k, HeaderValue::from_static(v));
    }
    map
  }

  #[test]
  fn safe_methods_are_never_cross_origin() {
    let h = headers(&[("sec-fetch-site", "cross-site")]);
    assert!(!is_cross_origin(&Method::GET, &h));
    assert!(!is_cross_origin(&Method::HEAD, &h));
  }

  #[test]
  fn fetch_metadata_decides_when_present() {
    assert!(!is_cross_origin(&Method::POST, &headers(&[("sec-fetch-site", "same-origin")])));
    assert!(!is_cross_origin(&Method::POST, &headers(&[("sec-fetch-site", "none")])));
    assert!(is_cross_origin(&Method::POST, &headers(&[("sec-fetch-site", "same-site")])));
    assert!(is_cross_origin(&Method::DELETE, &headers(&[("sec-fetch-site", "cross-site")])));
  }

  #[test]
  fn origin_must_match_host() {
    let same = headers(&[("origin", "https://goalkeepr.app"), ("host", "goalkeepr.app")]);
    let other = headers(&[("origin", "https://evil.example"), ("host", "goalkeepr.app")]);
    let opaque = headers(&[("origin", "null"), ("host", "goalkeepr.app")]);
    assert!(!is_cross_origin(&Method::POST, &same));
    assert!(is_cross_origin(&Method::POST, &other));
    assert!(is_cross_origin(&Method::POST, &opaque));
  }

  #[test]
  fn non_browser_requests_pass() {
    assert!(!is_cross_origin(&Method::POST, &HeaderMap::new()));
  }

  #[test]
  fn trace_ids_are_eight_hex_chars() {
    let req = axum::http::Request::new(());
    let id = MakeTraceId.make_request_id(&req).unwrap();
    let s = id.header_value().to_str().unwrap();
    assert_eq!(s.len(), 8);
    assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
  }

  #[test]
  fn redirect_follows_htmx_convention() {
    let plain = redirect(&HeaderMap::new(), "/goals");
    assert_eq!(plain.status(), StatusCode::SEE_OTHER);
    assert_eq!(plain.headers()["location"], "/goals");

    let hx = redirect(&headers(&[("hx-request", "true")]), "/goals");
    assert_eq!(hx.status(), StatusCode::OK);
    assert_eq!(hx.headers()["hx-redirect"], "/goals");
    assert!(hx.headers().get("location").is_none());
  }
}
