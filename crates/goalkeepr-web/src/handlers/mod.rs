//! Route handlers, one module per area of the site.

pub mod auth;
pub mod criteria;
pub mod goals;
pub mod health;
pub mod public;
pub mod settings;
pub mod share;

use axum::{
  http::{HeaderMap, StatusCode, header},
  response::Response,
};
use tower_sessions::Session;

use crate::{
  auth as session_auth,
  error::Error,
  render::{Page, TemplateData, Templates, View},
};

/// Render `page` with the session's auth state and pending flash.
pub(crate) async fn page(
  templates: &Templates,
  session: &Session,
  status: StatusCode,
  page: Page,
  view: View,
) -> Result<Response, Error> {
  let flash = session_auth::take_flash(session).await?;
  let is_authenticated = session_auth::is_authenticated(session).await;
  let data = TemplateData::new(is_authenticated, flash, view);
  Ok(templates.render(status, page, data)?)
}

/// Numeric path ids; anything else is a missing page rather than a 400.
pub(crate) fn parse_id(raw: &str) -> Result<i64, Error> {
  raw.parse::<i64>().map_err(|_| Error::NotFound)
}

/// `Host` header of the request, for printing absolute links.
pub(crate) fn host(headers: &HeaderMap) -> String {
  headers
    .get(header::HOST)
    .and_then(|h| h.to_str().ok())
    .unwrap_or("localhost")
    .to_owned()
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  #[test]
  fn ids_must_be_numeric() {
    assert_eq!(parse_id("42").unwrap(), 42);
    assert!(matches!(parse_id("abc"), Err(Error::NotFound)));
    assert!(matches!(parse_id(""), Err(Error::NotFound)));
  }

  #[test]
  fn host_falls_back_to_localhost() {
    let mut headers = HeaderMap::new();
    assert_eq!(host(&headers), "localhost");
    headers.insert(header::HOST, HeaderValue::from_static("goalkeepr.app"));
    assert_eq!(host(&headers), "goalkeepr.app");
  }
}
