//! Success criteria on the goal edit page.

use axum::{
  Form,
  extract::{Path, State},
  http::{HeaderMap, StatusCode},
  response::Response,
};
use goalkeepr_core::store::GoalkeeprStore;
use tower_sessions::Session;

use super::{goals::edit_view, parse_id};
use crate::{
  AppState,
  auth::CurrentUser,
  error::{Error, OrInternal as _},
  forms::{CriterionForm, wants_delete},
  middleware::redirect,
};

fn goal_path(goal_id: i64) -> String { format!("/goals/{goal_id}") }

/// Resolve `{id}/criteria/{cid}` and make sure the criterion belongs to that
/// goal and to the signed-in user.
async fn owned<S>(state: &AppState<S>, user_id: i64, ids: &(String, String)) -> Result<(i64, i64), Error>
where
  S: GoalkeeprStore + Clone + 'static,
{
  let goal_id = parse_id(&ids.0)?;
  let id = parse_id(&ids.1)?;
  state
    .store
    .get_criterion(id, user_id)
    .await
    .or_internal("Error loading your goal.")?
    .filter(|c| c.goal_id == goal_id)
    .ok_or(Error::NotFound)?;
  Ok((goal_id, id))
}

pub async fn add<S>(
  State(state): State<AppState<S>>,
  session: Session,
  CurrentUser(user_id): CurrentUser,
  headers: HeaderMap,
  Path(goal_id): Path<String>,
  Form(form): Form<CriterionForm>,
) -> Result<Response, Error>
where
  S: GoalkeeprStore + Clone + 'static,
{
  let goal_id = parse_id(&goal_id)?;
  let mut form = form.sanitize();
  let Some(input) = form.validate() else {
    let status = StatusCode::UNPROCESSABLE_ENTITY;
    return edit_view(&state, &session, status, user_id, goal_id, None, form).await;
  };

  state
    .store
    .add_criterion(goal_id, user_id, input)
    .await
    .or_internal("Error saving the criterion.")?
    .ok_or(Error::NotFound)?;
  Ok(redirect(&headers, &goal_path(goal_id)))
}

/// `POST /goals/{id}/criteria/{cid}`: replace the description, completion
/// and position, or delete on `_method=DELETE`.
pub async fn update<S>(
  State(state): State<AppState<S>>,
  session: Session,
  CurrentUser(user_id): CurrentUser,
  headers: HeaderMap,
  Path(ids): Path<(String, String)>,
  Form(form): Form<CriterionForm>,
) -> Result<Response, Error>
where
  S: GoalkeeprStore + Clone + 'static,
{
  let (goal_id, id) = owned(&state, user_id, &ids).await?;
  if wants_delete(&form.method) {
    return remove(&state, &headers, user_id, goal_id, id).await;
  }

  let mut form = form.sanitize();
  let Some(input) = form.validate() else {
    let status = StatusCode::UNPROCESSABLE_ENTITY;
    return edit_view(&state, &session, status, user_id, goal_id, None, form).await;
  };

  let updated = state
    .store
    .update_criterion(id, user_id, input)
    .await
    .or_internal("Error saving the criterion.")?;
  if updated == 0 {
    return Err(Error::NotFound);
  }
  Ok(redirect(&headers, &goal_path(goal_id)))
}

pub async fn delete<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user_id): CurrentUser,
  headers: HeaderMap,
  Path(ids): Path<(String, String)>,
) -> Result<Response, Error>
where
  S: GoalkeeprStore + Clone + 'static,
{
  let (goal_id, id) = owned(&state, user_id, &ids).await?;
  remove(&state, &headers, user_id, goal_id, id).await
}

async fn remove<S>(
  state: &AppState<S>,
  headers: &HeaderMap,
  user_id: i64,
  goal_id: i64,
  id: i64,
) -> Result<Response, Error>
where
  S: GoalkeeprStore + Clone + 'static,
{
  let deleted = state
    .store
    .delete_criterion(id, user_id)
    .await
    .or_internal("Error deleting the criterion.")?;
  if deleted == 0 {
    return Err(Error::NotFound);
  }
  Ok(redirect(headers, &goal_path(goal_id)))
}

pub async fn toggle<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user_id): CurrentUser,
  headers: HeaderMap,
  Path(ids): Path<(String, String)>,
) -> Result<Response, Error>
where
  S: GoalkeeprStore + Clone + 'static,
{
  let (goal_id, id) = owned(&state, user_id, &ids).await?;
  let toggled = state
    .store
    .toggle_criterion(id, user_id)
    .await
    .or_internal("Error saving the criterion.")?;
  if toggled == 0 {
    return Err(Error::NotFound);
  }
  Ok(redirect(&headers, &goal_path(goal_id)))
}
