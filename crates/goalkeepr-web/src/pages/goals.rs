//! Goal list, add and edit pages.

use std::fmt::Write as _;

use chrono::NaiveDate;
use goalkeepr_core::{
  branding::Branding,
  criterion::{self, SuccessCriterion},
  goal::GoalGroup,
};

use super::{checked, esc, field_errors, mismatch};
use crate::{
  forms::{CriterionForm, GoalForm},
  render::{Page, RenderError, TemplateData, View},
};

#[derive(Debug)]
pub struct GoalsView {
  pub groups:   Vec<GoalGroup>,
  pub branding: Option<Branding>,
  pub today:    NaiveDate,
}

#[derive(Debug)]
pub struct EditGoalView {
  pub goal_id:        i64,
  pub form:           GoalForm,
  pub criteria:       Vec<SuccessCriterion>,
  pub criterion_form: CriterionForm,
}

// ─── Shared partial ──────────────────────────────────────────────────────────

/// Goals under one heading per due year. `link` makes each goal open its
/// edit page.
pub(crate) fn goal_groups(
  buf: &mut String,
  groups: &[GoalGroup],
  today: NaiveDate,
  link: bool,
) -> Result<(), RenderError> {
  for group in groups {
    writeln!(buf, r#"<section class="year">"#)?;
    writeln!(buf, "<h2>{}</h2>", group.year)?;
    writeln!(buf, "<ul>")?;
    for goal in &group.goals {
      let mut class = String::from("goal");
      if goal.achieved {
        class.push_str(" achieved");
      }
      if goal.is_overdue(today) {
        class.push_str(" overdue");
      }
      write!(buf, r#"<li class="{class}">"#)?;
      if link {
        write!(buf, r#"<a href="/goals/{}">{}</a>"#, goal.id, goal.goal)?;
      } else {
        write!(buf, "<span>{}</span>", goal.goal)?;
      }
      write!(buf, r#" <time datetime="{0}">{0}</time>"#, goal.due_str())?;
      if goal.is_overdue(today) {
        write!(buf, r#" <span class="badge">Overdue</span>"#)?;
      }
      if goal.achieved {
        write!(buf, r#" <span class="badge">Achieved</span>"#)?;
      }
      writeln!(buf, "</li>")?;
    }
    writeln!(buf, "</ul>")?;
    writeln!(buf, "</section>")?;
  }
  Ok(())
}

fn goal_fields(buf: &mut String, form: &GoalForm) -> Result<(), RenderError> {
  let v = &form.validator;

  writeln!(buf, r#"<label for="goal">Goal</label>"#)?;
  writeln!(buf, r#"<textarea id="goal" name="goal" rows="3">{}</textarea>"#, form.goal)?;
  field_errors(buf, v, "goal")?;

  writeln!(buf, r#"<label for="due">Due</label>"#)?;
  writeln!(buf, r#"<input id="due" type="date" name="due" value="{}">"#, esc(&form.due))?;
  field_errors(buf, v, "due")?;

  writeln!(
    buf,
    r#"<label><input type="checkbox" name="visible"{}> Visible on share pages</label>"#,
    checked(&form.visible)
  )?;
  field_errors(buf, v, "visible")?;

  writeln!(
    buf,
    r#"<label><input type="checkbox" name="achieved"{}> Achieved</label>"#,
    checked(&form.achieved)
  )?;
  field_errors(buf, v, "achieved")?;
  Ok(())
}

// ─── Pages ───────────────────────────────────────────────────────────────────

pub fn list(buf: &mut String, data: &TemplateData) -> Result<(), RenderError> {
  let View::Goals(view) = &data.view else {
    return Err(mismatch(Page::Goals));
  };

  let heading = view
    .branding
    .as_ref()
    .and_then(|b| b.title.as_deref())
    .unwrap_or("Your goals");
  writeln!(buf, "<h1>{heading}</h1>")?;

  if view.groups.is_empty() {
    writeln!(
      buf,
      r#"<p class="empty">No goals yet. <a href="/goals/add/">Add your first goal</a>.</p>"#
    )?;
    return Ok(());
  }
  goal_groups(buf, &view.groups, view.today, true)
}

pub fn add(buf: &mut String, data: &TemplateData) -> Result<(), RenderError> {
  let View::AddGoal(form) = &data.view else {
    return Err(mismatch(Page::AddGoal));
  };

  writeln!(buf, "<h1>Add goal</h1>")?;
  writeln!(buf, r#"<form action="/goals/add/" method="post" novalidate>"#)?;
  goal_fields(buf, form)?;
  writeln!(buf, r#"<button type="submit">Add goal</button>"#)?;
  writeln!(buf, "</form>")?;
  Ok(())
}

pub fn edit(buf: &mut String, data: &TemplateData) -> Result<(), RenderError> {
  let View::EditGoal(view) = &data.view else {
    return Err(mismatch(Page::EditGoal));
  };
  let id = view.goal_id;

  writeln!(buf, "<h1>Edit goal</h1>")?;
  writeln!(buf, r#"<form action="/goals/{id}" method="post" novalidate>"#)?;
  goal_fields(buf, &view.form)?;
  writeln!(buf, r#"<button type="submit">Save</button>"#)?;
  writeln!(buf, "</form>")?;

  writeln!(
    buf,
    r#"<form action="/goals/{id}" method="post" hx-delete="/goals/{id}" hx-confirm="Delete this goal?">"#
  )?;
  writeln!(buf, r#"<input type="hidden" name="_method" value="DELETE">"#)?;
  writeln!(buf, r#"<button type="submit" class="danger">Delete goal</button>"#)?;
  writeln!(buf, "</form>")?;

  criteria(buf, id, &view.criteria, &view.criterion_form)
}

fn criteria(
  buf: &mut String,
  goal_id: i64,
  items: &[SuccessCriterion],
  form: &CriterionForm,
) -> Result<(), RenderError> {
  let (done, total) = criterion::progress(items);

  writeln!(buf, r#"<section class="criteria">"#)?;
  writeln!(buf, "<h2>Success criteria <small>{done}/{total}</small></h2>")?;
  writeln!(buf, "<ul>")?;
  for c in items {
    let base = format!("/goals/{goal_id}/criteria/{}", c.id);
    writeln!(buf, r#"<li class="criterion{}">"#, if c.completed { " completed" } else { "" })?;
    writeln!(
      buf,
      r#"<form action="{base}/toggle" method="post"><button type="submit" aria-pressed="{}">{}</button></form>"#,
      c.completed,
      if c.completed { "&#10003;" } else { "&#9744;" }
    )?;
    writeln!(buf, r#"<form action="{base}" method="post" class="inline" novalidate>"#)?;
    writeln!(
      buf,
      r#"<input type="text" name="description" aria-label="Description" value="{}">"#,
      c.description
    )?;
    writeln!(
      buf,
      r#"<input type="number" name="position" min="1" aria-label="Position" value="{}">"#,
      c.position.map(|p| p.to_string()).unwrap_or_default()
    )?;
    if c.completed {
      writeln!(buf, r#"<input type="hidden" name="completed" value="on">"#)?;
    }
    writeln!(buf, r#"<button type="submit">Save</button>"#)?;
    writeln!(buf, "</form>")?;
    writeln!(buf, r#"<form action="{base}" method="post" hx-delete="{base}">"#)?;
    writeln!(buf, r#"<input type="hidden" name="_method" value="DELETE">"#)?;
    writeln!(buf, r#"<button type="submit" class="danger">Remove</button>"#)?;
    writeln!(buf, "</form>")?;
    writeln!(buf, "</li>")?;
  }
  writeln!(buf, "</ul>")?;

  writeln!(buf, r#"<form action="/goals/{goal_id}/criteria" method="post" novalidate>"#)?;
  writeln!(buf, r#"<label for="description">New criterion</label>"#)?;
  writeln!(
    buf,
    r#"<input id="description" type="text" name="description" value="{}">"#,
    form.description
  )?;
  field_errors(buf, &form.validator, "description")?;
  writeln!(
    buf,
    r#"<input type="number" name="position" min="1" placeholder="Position" value="{}">"#,
    esc(&form.position)
  )?;
  field_errors(buf, &form.validator, "position")?;
  writeln!(buf, r#"<button type="submit">Add</button>"#)?;
  writeln!(buf, "</form>")?;
  writeln!(buf, "</section>")?;
  Ok(())
}
