//! Account settings: branding and account deletion.

use axum::{
  Form,
  extract::State,
  http::{HeaderMap, StatusCode},
  response::{IntoResponse, Response},
};
use goalkeepr_core::store::GoalkeeprStore;
use tower_sessions::Session;

use super::page;
use crate::{
  AppState,
  auth::{self, CurrentUser},
  error::{Error, OrInternal as _},
  forms::{BrandingForm, MethodForm, wants_delete},
  middleware::redirect,
  pages::settings::SettingsView,
  render::{Page, View},
};

async fn settings_view<S>(
  state: &AppState<S>,
  session: &Session,
  status: StatusCode,
  user_id: i64,
  branding: Option<BrandingForm>,
) -> Result<Response, Error>
where
  S: GoalkeeprStore + Clone + 'static,
{
  let Some(user) = state
    .store
    .get_user(user_id)
    .await
    .or_internal("Error loading your settings.")?
  else {
    // The account is gone but the session outlived it.
    session.flush().await?;
    return Err(Error::Unauthenticated);
  };

  let branding = match branding {
    Some(form) => form,
    None => {
      let stored = state
        .store
        .get_branding(user_id)
        .await
        .or_internal("Error loading your settings.")?;
      BrandingForm::from_branding(stored.as_ref())
    }
  };

  let view = SettingsView { email: user.email, branding };
  page(&state.templates, session, status, Page::Settings, View::Settings(view)).await
}

pub async fn show<S>(
  State(state): State<AppState<S>>,
  session: Session,
  CurrentUser(user_id): CurrentUser,
) -> Result<Response, Error>
where
  S: GoalkeeprStore + Clone + 'static,
{
  settings_view(&state, &session, StatusCode::OK, user_id, None).await
}

pub async fn branding<S>(
  State(state): State<AppState<S>>,
  session: Session,
  CurrentUser(user_id): CurrentUser,
  headers: HeaderMap,
  Form(form): Form<BrandingForm>,
) -> Result<Response, Error>
where
  S: GoalkeeprStore + Clone + 'static,
{
  let mut form = form.sanitize();
  if !form.validate() {
    return settings_view(&state, &session, StatusCode::UNPROCESSABLE_ENTITY, user_id, Some(form)).await;
  }

  state
    .store
    .upsert_branding(user_id, Some(form.title), Some(form.description))
    .await
    .or_internal("Error saving your branding.")?;

  auth::put_flash(&session, "Branding saved").await?;
  Ok(redirect(&headers, "/settings"))
}

pub async fn delete_user<S>(
  State(state): State<AppState<S>>,
  session: Session,
  CurrentUser(user_id): CurrentUser,
  headers: HeaderMap,
) -> Result<Response, Error>
where
  S: GoalkeeprStore + Clone + 'static,
{
  remove(&state, &session, &headers, user_id).await
}

pub async fn delete_user_override<S>(
  State(state): State<AppState<S>>,
  session: Session,
  CurrentUser(user_id): CurrentUser,
  headers: HeaderMap,
  Form(form): Form<MethodForm>,
) -> Result<Response, Error>
where
  S: GoalkeeprStore + Clone + 'static,
{
  if !wants_delete(&form.method) {
    return Ok(StatusCode::METHOD_NOT_ALLOWED.into_response());
  }
  remove(&state, &session, &headers, user_id).await
}

async fn remove<S>(
  state: &AppState<S>,
  session: &Session,
  headers: &HeaderMap,
  user_id: i64,
) -> Result<Response, Error>
where
  S: GoalkeeprStore + Clone + 'static,
{
  state
    .store
    .delete_user(user_id)
    .await
    .or_internal("Error deleting your account.")?;
  session.flush().await?;
  tracing::info!(user_id, "account deleted");
  Ok(redirect(headers, "/signup"))
}
