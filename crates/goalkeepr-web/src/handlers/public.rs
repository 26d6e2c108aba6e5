//! Pages reachable without an account.

use axum::{
  extract::{Path, State},
  http::StatusCode,
  response::Response,
};
use chrono::Utc;
use goalkeepr_core::{goal::group_by_year, store::GoalkeeprStore};
use tower_sessions::Session;

use super::page;
use crate::{
  AppState,
  error::{Error, OrInternal as _},
  pages::share::SharedView,
  render::{Page, View},
};

pub async fn landing<S>(State(state): State<AppState<S>>, session: Session) -> Result<Response, Error>
where
  S: GoalkeeprStore + Clone + 'static,
{
  page(&state.templates, &session, StatusCode::OK, Page::Landing, View::None).await
}

pub async fn privacy<S>(State(state): State<AppState<S>>, session: Session) -> Result<Response, Error>
where
  S: GoalkeeprStore + Clone + 'static,
{
  page(&state.templates, &session, StatusCode::OK, Page::Privacy, View::None).await
}

pub async fn imprint<S>(State(state): State<AppState<S>>, session: Session) -> Result<Response, Error>
where
  S: GoalkeeprStore + Clone + 'static,
{
  page(&state.templates, &session, StatusCode::OK, Page::Imprint, View::None).await
}

/// `GET /s/{id}`: the public goals of whoever owns the link.
pub async fn shared<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Path(public_id): Path<String>,
) -> Result<Response, Error>
where
  S: GoalkeeprStore + Clone + 'static,
{
  let user_id = state
    .store
    .get_user_id_by_public_id(&public_id)
    .await
    .or_internal("Error loading shared goals.")?
    .ok_or(Error::NotFound)?;

  let goals = state
    .store
    .list_shared_goals(user_id)
    .await
    .or_internal("Error loading shared goals.")?;
  let branding = state
    .store
    .get_branding(user_id)
    .await
    .or_internal("Error loading shared goals.")?;

  let view = SharedView {
    groups: group_by_year(&goals),
    branding,
    today: Utc::now().date_naive(),
  };
  page(&state.templates, &session, StatusCode::OK, Page::Shared, View::Shared(view)).await
}

pub async fn not_found() -> Error { Error::NotFound }
