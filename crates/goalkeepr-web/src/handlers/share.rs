//! Share-link management.

use axum::{
  Form,
  extract::{Path, State},
  http::{HeaderMap, HeaderValue, StatusCode},
  response::{Html, IntoResponse, Response},
};
use goalkeepr_core::{
  share::MAX_SHARES_PER_USER,
  store::{GoalkeeprStore, StoreError as _},
};
use tower_sessions::Session;

use super::{host, page, parse_id};
use crate::{
  AppState,
  auth::{self, CurrentUser},
  error::{Error, OrInternal as _},
  forms::{MethodForm, wants_delete},
  middleware::{HX_TRIGGER, is_htmx, redirect},
  pages::share::{ShareLinksView, link_row},
  render::{Page, View},
};

const SHARE_PAGE: &str = "/goals/share/";

pub async fn list<S>(
  State(state): State<AppState<S>>,
  session: Session,
  CurrentUser(user_id): CurrentUser,
  headers: HeaderMap,
) -> Result<Response, Error>
where
  S: GoalkeeprStore + Clone + 'static,
{
  let links = state
    .store
    .list_shares(user_id)
    .await
    .or_internal("Error loading your share links.")?;

  let view = ShareLinksView {
    links,
    host: host(&headers),
    max: MAX_SHARES_PER_USER,
  };
  page(&state.templates, &session, StatusCode::OK, Page::ShareLinks, View::ShareLinks(view)).await
}

/// `POST /goals/share/create`. HTMX callers get the new row and a
/// `shareCreated` event; everyone else goes back to the list.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  session: Session,
  CurrentUser(user_id): CurrentUser,
  headers: HeaderMap,
) -> Result<Response, Error>
where
  S: GoalkeeprStore + Clone + 'static,
{
  let share = match state.store.create_share(user_id).await {
    Ok(share) => share,
    Err(e) if matches!(e.domain(), Some(goalkeepr_core::Error::ShareLimitReached(_))) => {
      tracing::info!(user_id, "share link quota reached");
      auth::put_flash(
        &session,
        &format!("You can have at most {MAX_SHARES_PER_USER} share links."),
      )
      .await?;
      return Ok(redirect(&headers, SHARE_PAGE));
    }
    Err(e) => return Err(e).or_internal("Error creating a share link."),
  };
  tracing::info!(user_id, share_id = share.id, "share link created");

  if !is_htmx(&headers) {
    return Ok(redirect(&headers, SHARE_PAGE));
  }

  let mut row = String::new();
  link_row(&mut row, &share, &host(&headers))?;
  Ok(([(HX_TRIGGER, HeaderValue::from_static("shareCreated"))], Html(row)).into_response())
}

pub async fn delete<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user_id): CurrentUser,
  headers: HeaderMap,
  Path(id): Path<String>,
) -> Result<Response, Error>
where
  S: GoalkeeprStore + Clone + 'static,
{
  let id = parse_id(&id)?;
  remove(&state, &headers, user_id, id).await
}

/// `POST /goals/share/{id}` only deletes; anything but `_method=DELETE` is
/// refused.
pub async fn delete_override<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user_id): CurrentUser,
  headers: HeaderMap,
  Path(id): Path<String>,
  Form(form): Form<MethodForm>,
) -> Result<Response, Error>
where
  S: GoalkeeprStore + Clone + 'static,
{
  let id = parse_id(&id)?;
  if !wants_delete(&form.method) {
    return Ok(StatusCode::METHOD_NOT_ALLOWED.into_response());
  }
  remove(&state, &headers, user_id, id).await
}

async fn remove<S>(state: &AppState<S>, headers: &HeaderMap, user_id: i64, id: i64) -> Result<Response, Error>
where
  S: GoalkeeprStore + Clone + 'static,
{
  let deleted = state
    .store
    .delete_share(id, user_id)
    .await
    .or_internal("Error deleting the share link.")?;
  if deleted == 0 {
    return Err(Error::NotFound);
  }
  tracing::info!(user_id, share_id = id, "share link deleted");

  // HTMX swaps the row out itself.
  if is_htmx(headers) {
    return Ok(StatusCode::OK.into_response());
  }
  Ok(redirect(headers, SHARE_PAGE))
}
