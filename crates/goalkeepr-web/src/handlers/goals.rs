//! Goal list, add, edit and delete.

use axum::{
  Form,
  extract::{Path, State},
  http::{HeaderMap, StatusCode},
  response::Response,
};
use chrono::Utc;
use goalkeepr_core::{goal::{DATE_FORMAT, group_by_year}, store::GoalkeeprStore};
use tower_sessions::Session;

use super::{page, parse_id};
use crate::{
  AppState,
  auth::{self, CurrentUser},
  error::{Error, OrInternal as _},
  forms::{CriterionForm, GoalForm, wants_delete},
  middleware::redirect,
  pages::goals::{EditGoalView, GoalsView},
  render::{Page, View},
};

pub async fn list<S>(
  State(state): State<AppState<S>>,
  session: Session,
  CurrentUser(user_id): CurrentUser,
) -> Result<Response, Error>
where
  S: GoalkeeprStore + Clone + 'static,
{
  let goals = state
    .store
    .list_goals(user_id)
    .await
    .or_internal("Error loading your goals.")?;
  let branding = state
    .store
    .get_branding(user_id)
    .await
    .or_internal("Error loading your goals.")?;

  let view = GoalsView {
    groups: group_by_year(&goals),
    branding,
    today: Utc::now().date_naive(),
  };
  page(&state.templates, &session, StatusCode::OK, Page::Goals, View::Goals(view)).await
}

// ─── Add ─────────────────────────────────────────────────────────────────────

pub async fn add_page<S>(State(state): State<AppState<S>>, session: Session) -> Result<Response, Error>
where
  S: GoalkeeprStore + Clone + 'static,
{
  let form = GoalForm {
    due: Utc::now().date_naive().format(DATE_FORMAT).to_string(),
    ..GoalForm::default()
  };
  page(&state.templates, &session, StatusCode::OK, Page::AddGoal, View::AddGoal(form)).await
}

pub async fn add<S>(
  State(state): State<AppState<S>>,
  session: Session,
  CurrentUser(user_id): CurrentUser,
  headers: HeaderMap,
  Form(form): Form<GoalForm>,
) -> Result<Response, Error>
where
  S: GoalkeeprStore + Clone + 'static,
{
  let mut form = form.sanitize();
  let Some(input) = form.validate() else {
    let view = View::AddGoal(form);
    return page(&state.templates, &session, StatusCode::UNPROCESSABLE_ENTITY, Page::AddGoal, view).await;
  };

  let goal = state
    .store
    .add_goal(user_id, input)
    .await
    .or_internal("Error saving your goal.")?;
  tracing::debug!(user_id, goal_id = goal.id, "goal added");
  Ok(redirect(&headers, "/goals"))
}

// ─── Edit ────────────────────────────────────────────────────────────────────

/// Render the edit page for goal `id`, with `form` and `criterion_form` as
/// given so failed submissions keep their input and messages.
pub(crate) async fn edit_view<S>(
  state: &AppState<S>,
  session: &Session,
  status: StatusCode,
  user_id: i64,
  id: i64,
  form: Option<GoalForm>,
  criterion_form: CriterionForm,
) -> Result<Response, Error>
where
  S: GoalkeeprStore + Clone + 'static,
{
  let goal = state
    .store
    .get_goal(id, user_id)
    .await
    .or_internal("Error loading your goal.")?
    .ok_or(Error::NotFound)?;
  let criteria = state
    .store
    .list_criteria(id, user_id)
    .await
    .or_internal("Error loading your goal.")?;

  let view = EditGoalView {
    goal_id: goal.id,
    form: form.unwrap_or_else(|| GoalForm::from_goal(&goal)),
    criteria,
    criterion_form,
  };
  page(&state.templates, session, status, Page::EditGoal, View::EditGoal(view)).await
}

pub async fn edit_page<S>(
  State(state): State<AppState<S>>,
  session: Session,
  CurrentUser(user_id): CurrentUser,
  Path(id): Path<String>,
) -> Result<Response, Error>
where
  S: GoalkeeprStore + Clone + 'static,
{
  let id = parse_id(&id)?;
  edit_view(&state, &session, StatusCode::OK, user_id, id, None, CriterionForm::default()).await
}

/// `POST /goals/{id}`: save, or delete when the form overrides the method.
pub async fn update<S>(
  State(state): State<AppState<S>>,
  session: Session,
  CurrentUser(user_id): CurrentUser,
  headers: HeaderMap,
  Path(id): Path<String>,
  Form(form): Form<GoalForm>,
) -> Result<Response, Error>
where
  S: GoalkeeprStore + Clone + 'static,
{
  let id = parse_id(&id)?;
  if wants_delete(&form.method) {
    return remove(&state, &headers, user_id, id).await;
  }

  let mut form = form.sanitize();
  let Some(input) = form.validate() else {
    let status = StatusCode::UNPROCESSABLE_ENTITY;
    return edit_view(&state, &session, status, user_id, id, Some(form), CriterionForm::default()).await;
  };

  let updated = state
    .store
    .update_goal(id, user_id, input)
    .await
    .or_internal("Error saving your goal.")?;
  if updated == 0 {
    return Err(Error::NotFound);
  }

  auth::put_flash(&session, "Goal saved!").await?;
  Ok(redirect(&headers, &format!("/goals/{id}")))
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

async fn remove<S>(state: &AppState<S>, headers: &HeaderMap, user_id: i64, id: i64) -> Result<Response, Error>
where
  S: GoalkeeprStore + Clone + 'static,
{
  let deleted = state
    .store
    .delete_goal(id, user_id)
    .await
    .or_internal("Error deleting your goal.")?;
  if deleted == 0 {
    return Err(Error::NotFound);
  }
  tracing::debug!(user_id, goal_id = id, "goal deleted");
  Ok(redirect(headers, "/goals"))
}
