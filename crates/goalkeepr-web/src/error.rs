//! Error types and axum `IntoResponse` implementation.
//!
//! Validation failures are not errors: handlers re-render the form with 422.
//! Everything here ends up either as a redirect or as one of the HTML error
//! pages. The page body needs the trace id and session state, so
//! `into_response` only tags the response with an [`ErrorPage`] and
//! [`crate::middleware::error_pages`] renders it.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::render::RenderError;

/// Message shown when nothing more specific is known.
pub const GENERIC_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Error)]
pub enum Error {
  #[error("not found")]
  NotFound,

  #[error("authentication required")]
  Unauthenticated,

  #[error("too many requests")]
  RateLimited,

  #[error("cross-origin request rejected")]
  Forbidden,

  #[error("{message} ({source})")]
  Internal {
    message: &'static str,
    #[source]
    source:  Box<dyn std::error::Error + Send + Sync>,
  },

  #[error("session error: {0}")]
  Session(#[from] tower_sessions::session::Error),

  #[error("render error: {0}")]
  Render(#[from] RenderError),
}

/// Which error page the response should carry. Inserted into response
/// extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorPage {
  NotFound,
  TooManyRequests,
  Internal { message: String },
}

impl Error {
  /// The text the user sees; never includes internal detail.
  pub fn user_message(&self) -> &'static str {
    match self {
      Error::Internal { message, .. } => *message,
      _ => GENERIC_MESSAGE,
    }
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::NotFound => tagged(StatusCode::NOT_FOUND, ErrorPage::NotFound),
      Error::Unauthenticated => Redirect::to("/signin").into_response(),
      Error::RateLimited => {
        tagged(StatusCode::TOO_MANY_REQUESTS, ErrorPage::TooManyRequests)
      }
      Error::Forbidden => (StatusCode::FORBIDDEN, "Forbidden").into_response(),
      other => {
        tracing::error!(error = %other, "request failed");
        tagged(StatusCode::INTERNAL_SERVER_ERROR, ErrorPage::Internal {
          message: other.user_message().to_owned(),
        })
      }
    }
  }
}

fn tagged(status: StatusCode, page: ErrorPage) -> Response {
  let mut res = status.into_response();
  res.extensions_mut().insert(page);
  res
}

/// Attach a user-facing message to an opaque failure.
pub trait OrInternal<T> {
  fn or_internal(self, message: &'static str) -> Result<T, Error>;
}

impl<T, E> OrInternal<T> for Result<T, E>
where
  E: std::error::Error + Send + Sync + 'static,
{
  fn or_internal(self, message: &'static str) -> Result<T, Error> {
    self.map_err(|e| Error::Internal { message, source: Box::new(e) })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn internal_errors_are_tagged_with_their_message() {
    let res = Err::<(), _>(std::io::Error::other("disk on fire"))
      .or_internal("Error loading your goals.")
      .unwrap_err()
      .into_response();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
      res.extensions().get::<ErrorPage>(),
      Some(&ErrorPage::Internal { message: "Error loading your goals.".into() })
    );
  }

  #[test]
  fn unauthenticated_redirects_to_sign_in() {
    let res = Error::Unauthenticated.into_response();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()["location"], "/signin");
  }

  #[test]
  fn rate_limited_is_429() {
    let res = Error::RateLimited.into_response();
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(res.extensions().get::<ErrorPage>(), Some(&ErrorPage::TooManyRequests));
  }
}
