//! Password hashing, session identity and the `require_auth` middleware.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::{self, SaltString},
};
use axum::{
  extract::{FromRequestParts, Request},
  http::request::Parts,
  middleware::Next,
  response::{IntoResponse, Response},
};
use chrono::Utc;
use goalkeepr_core::user::User;
use rand_core::OsRng;
use thiserror::Error;
use tokio::sync::OnceCell;
use tower_sessions::Session;

use crate::error::Error;

/// Session key holding the signed-in user's id.
pub const USER_ID_KEY: &str = "user_id";

/// Session key holding a one-shot message for the next rendered page.
pub const FLASH_KEY: &str = "flash";

// ─── Password ────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum PasswordError {
  #[error("argon2 error: {0}")]
  Argon2(String),

  #[error("hashing task failed: {0}")]
  Join(#[from] tokio::task::JoinError),
}

/// An argon2id PHC string. Hashing and verification run on the blocking
/// pool.
#[derive(Debug, Clone)]
pub struct Password(String);

impl Password {
  pub fn from_hash(phc: impl Into<String>) -> Self { Self(phc.into()) }

  pub async fn hash(plaintext: String) -> Result<Self, PasswordError> {
    let phc = tokio::task::spawn_blocking(move || {
      let salt = SaltString::generate(&mut OsRng);
      Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|h| h.to_string())
    })
    .await?
    .map_err(|e| PasswordError::Argon2(e.to_string()))?;
    Ok(Self(phc))
  }

  /// `Ok(false)` on mismatch; `Err` when the stored hash is malformed.
  pub async fn matches(&self, plaintext: String) -> Result<bool, PasswordError> {
    let phc = self.0.clone();
    tokio::task::spawn_blocking(move || {
      let parsed = PasswordHash::new(&phc)?;
      match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
      }
    })
    .await?
    .map_err(|e| PasswordError::Argon2(e.to_string()))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

const DUMMY_PLAINTEXT: &str = "goalkeepr-dummy-password-never-valid";

static DUMMY_PASSWORD: OnceCell<Password> = OnceCell::const_new();

/// Decoy hash compared against when a sign-in names an unknown email.
/// `main` forces it at startup so the first such request is not slower.
pub async fn dummy_password() -> Result<&'static Password, PasswordError> {
  DUMMY_PASSWORD
    .get_or_try_init(|| Password::hash(DUMMY_PLAINTEXT.to_owned()))
    .await
}

/// Check a sign-in attempt. Exactly one hash comparison runs on every path,
/// so an unknown email costs the same as a wrong password.
pub async fn verify_credentials(user: Option<&User>, plaintext: &str) -> bool {
  verify_with(user, plaintext, |stored, plaintext| async move { stored.matches(plaintext).await }).await
}

async fn verify_with<F, Fut>(user: Option<&User>, plaintext: &str, compare: F) -> bool
where
  F: FnOnce(Password, String) -> Fut,
  Fut: Future<Output = Result<bool, PasswordError>>,
{
  let stored = match user {
    Some(user) => Password::from_hash(user.password_hash.as_str()),
    None => match dummy_password().await {
      Ok(dummy) => dummy.clone(),
      Err(e) => {
        tracing::warn!(error = %e, "dummy password unavailable");
        return false;
      }
    },
  };

  let matched = match compare(stored, plaintext.to_owned()).await {
    Ok(matched) => matched,
    Err(e) => {
      tracing::warn!(error = %e, "error matching passwords");
      false
    }
  };

  match user {
    Some(user) if matched => !user.is_locked(Utc::now()),
    _ => false,
  }
}

// ─── Session identity ────────────────────────────────────────────────────────

pub async fn current_user_id(session: &Session) -> Result<Option<i64>, Error> {
  Ok(session.get::<i64>(USER_ID_KEY).await?)
}

/// Session errors count as signed out.
pub async fn is_authenticated(session: &Session) -> bool {
  matches!(current_user_id(session).await, Ok(Some(_)))
}

/// Bind the session to `user_id` under a fresh session id.
pub async fn log_in(session: &Session, user_id: i64) -> Result<(), Error> {
  session.cycle_id().await?;
  session.insert(USER_ID_KEY, user_id).await?;
  Ok(())
}

pub async fn put_flash(session: &Session, message: &str) -> Result<(), Error> {
  session.insert(FLASH_KEY, message).await?;
  Ok(())
}

pub async fn take_flash(session: &Session) -> Result<Option<String>, Error> {
  Ok(session.remove::<String>(FLASH_KEY).await?)
}

// ─── Middleware & extractor ──────────────────────────────────────────────────

/// The authenticated user's id, placed in request extensions by
/// [`require_auth`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub i64);

/// Redirect anonymous requests to `/signin`; otherwise expose the user id
/// to handlers as [`CurrentUser`].
pub async fn require_auth(session: Session, mut req: Request, next: Next) -> Response {
  match current_user_id(&session).await {
    Ok(Some(id)) => {
      req.extensions_mut().insert(CurrentUser(id));
      next.run(req).await
    }
    Ok(None) => Error::Unauthenticated.into_response(),
    Err(e) => e.into_response(),
  }
}

impl<S> FromRequestParts<S> for CurrentUser
where
  S: Send + Sync,
{
  type Rejection = Error;

  async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
    parts
      .extensions
      .get::<CurrentUser>()
      .copied()
      .ok_or(Error::Unauthenticated)
  }
}
