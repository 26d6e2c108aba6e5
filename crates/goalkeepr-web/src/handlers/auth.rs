//! Sign up, sign in and sign out.

use std::time::Duration;

use axum::{
  Form,
  extract::State,
  http::{HeaderMap, StatusCode},
  response::{IntoResponse, Redirect, Response},
};
use goalkeepr_core::{
  store::{GoalkeeprStore, StoreError as _},
  user::NewUser,
};
use tower_sessions::Session;

use super::page;
use crate::{
  AppState,
  auth::{self, Password, USER_ID_KEY},
  error::{Error, OrInternal as _},
  forms::{EMAIL_UNUSABLE, SignInForm, SignUpForm},
  middleware::redirect,
  render::{Page, View},
};

/// Where a fresh session lands.
const HOME: &str = "/goals";

/// Bots that fill the honeypot wait, then get nothing.
async fn turn_away<S>(state: &AppState<S>) -> Response
where
  S: GoalkeeprStore + Clone + 'static,
{
  tracing::info!("honeypot field filled, discarding submission");
  tokio::time::sleep(Duration::from_millis(state.config.honeypot_delay_ms)).await;
  StatusCode::OK.into_response()
}

// ─── Sign up ─────────────────────────────────────────────────────────────────

pub async fn signup_page<S>(State(state): State<AppState<S>>, session: Session) -> Result<Response, Error>
where
  S: GoalkeeprStore + Clone + 'static,
{
  if auth::is_authenticated(&session).await {
    return Ok(Redirect::to(HOME).into_response());
  }
  let view = View::SignUp(SignUpForm::default());
  page(&state.templates, &session, StatusCode::OK, Page::SignUp, view).await
}

pub async fn signup<S>(
  State(state): State<AppState<S>>,
  session: Session,
  headers: HeaderMap,
  Form(form): Form<SignUpForm>,
) -> Result<Response, Error>
where
  S: GoalkeeprStore + Clone + 'static,
{
  let mut form = form.sanitize();
  if form.is_bot() {
    return Ok(turn_away(&state).await);
  }

  if !form.validate() {
    let view = View::SignUp(form.without_passwords());
    return page(&state.templates, &session, StatusCode::UNPROCESSABLE_ENTITY, Page::SignUp, view).await;
  }

  let hash = Password::hash(form.password.clone())
    .await
    .or_internal("Error creating your account.")?;

  let new_user = NewUser {
    email:         form.email.clone(),
    password_hash: hash.as_str().to_owned(),
  };
  let user = match state.store.add_user(new_user).await {
    Ok(user) => user,
    Err(e) if matches!(e.domain(), Some(goalkeepr_core::Error::EmailTaken)) => {
      form.validator.add_error("email", EMAIL_UNUSABLE);
      let view = View::SignUp(form.without_passwords());
      return page(&state.templates, &session, StatusCode::UNPROCESSABLE_ENTITY, Page::SignUp, view).await;
    }
    Err(e) => return Err(e).or_internal("Error creating your account."),
  };

  auth::log_in(&session, user.id).await?;
  tracing::info!(user_id = user.id, "account created");
  Ok(redirect(&headers, HOME))
}

// ─── Sign in ─────────────────────────────────────────────────────────────────

pub async fn signin_page<S>(State(state): State<AppState<S>>, session: Session) -> Result<Response, Error>
where
  S: GoalkeeprStore + Clone + 'static,
{
  if auth::is_authenticated(&session).await {
    return Ok(Redirect::to(HOME).into_response());
  }
  let view = View::SignIn(SignInForm::default());
  page(&state.templates, &session, StatusCode::OK, Page::SignIn, view).await
}

pub async fn signin<S>(
  State(state): State<AppState<S>>,
  session: Session,
  headers: HeaderMap,
  Form(form): Form<SignInForm>,
) -> Result<Response, Error>
where
  S: GoalkeeprStore + Clone + 'static,
{
  let mut form = form.sanitize();
  if form.is_bot() {
    return Ok(turn_away(&state).await);
  }

  if !form.validate() {
    form.password.clear();
    let view = View::SignIn(form);
    return page(&state.templates, &session, StatusCode::UNPROCESSABLE_ENTITY, Page::SignIn, view).await;
  }

  // A failed lookup is treated as an unknown email; the decoy comparison
  // still runs.
  let user = match state.store.get_user_by_email(&form.email).await {
    Ok(user) => user,
    Err(e) => {
      tracing::warn!(error = %e, "user lookup failed during sign-in");
      None
    }
  };

  let verified = auth::verify_credentials(user.as_ref(), &form.password).await;
  let Some(user) = user.filter(|_| verified) else {
    return rejected(&state, &session, form.email).await;
  };

  auth::log_in(&session, user.id).await?;
  tracing::info!(user_id = user.id, "signed in");
  Ok(redirect(&headers, HOME))
}

async fn rejected<S>(state: &AppState<S>, session: &Session, email: String) -> Result<Response, Error>
where
  S: GoalkeeprStore + Clone + 'static,
{
  let view = View::SignIn(SignInForm::rejected(email));
  page(&state.templates, session, StatusCode::UNPROCESSABLE_ENTITY, Page::SignIn, view).await
}

// ─── Sign out ────────────────────────────────────────────────────────────────

pub async fn signout(session: Session, headers: HeaderMap) -> Result<Response, Error> {
  session.remove::<i64>(USER_ID_KEY).await?;
  session.cycle_id().await?;
  Ok(redirect(&headers, "/"))
}
