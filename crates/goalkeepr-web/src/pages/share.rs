//! Share-link management and the public share page.

use std::fmt::Write as _;

use chrono::NaiveDate;
use goalkeepr_core::{branding::Branding, goal::GoalGroup, share::Share};

use super::{esc, goals::goal_groups, mismatch};
use crate::render::{Page, RenderError, TemplateData, View};

#[derive(Debug)]
pub struct ShareLinksView {
  pub links: Vec<Share>,
  /// `Host` of the current request, used to print absolute links.
  pub host:  String,
  pub max:   usize,
}

#[derive(Debug)]
pub struct SharedView {
  pub groups:   Vec<GoalGroup>,
  pub branding: Option<Branding>,
  pub today:    NaiveDate,
}

/// One `<li>` of the link list; also returned on its own to HTMX after a
/// link is created.
pub fn link_row(buf: &mut String, share: &Share, host: &str) -> Result<(), RenderError> {
  let url = format!("{}{}", esc(host), share.path());
  writeln!(buf, r#"<li id="share-{}">"#, share.id)?;
  writeln!(buf, r#"<a href="{}" target="_blank">{url}</a>"#, share.path())?;
  writeln!(
    buf,
    r#"<form action="/goals/share/{0}" method="post" hx-delete="/goals/share/{0}" hx-target="closest li" hx-swap="outerHTML">"#,
    share.id
  )?;
  writeln!(buf, r#"<input type="hidden" name="_method" value="DELETE">"#)?;
  writeln!(buf, r#"<button type="submit" class="danger">Revoke</button>"#)?;
  writeln!(buf, "</form>")?;
  writeln!(buf, "</li>")?;
  Ok(())
}

pub fn links(buf: &mut String, data: &TemplateData) -> Result<(), RenderError> {
  let View::ShareLinks(view) = &data.view else {
    return Err(mismatch(Page::ShareLinks));
  };

  writeln!(buf, "<h1>Share goals</h1>")?;
  writeln!(
    buf,
    "<p>Anyone with a link sees the goals you marked visible. You can hold up \
     to {} links.</p>",
    view.max
  )?;
  writeln!(buf, r#"<ul id="share-links">"#)?;
  for share in &view.links {
    link_row(buf, share, &view.host)?;
  }
  writeln!(buf, "</ul>")?;

  if view.links.len() < view.max {
    writeln!(
      buf,
      r##"<form action="/goals/share/create" method="post" hx-post="/goals/share/create" hx-target="#share-links" hx-swap="beforeend">"##
    )?;
    writeln!(buf, r#"<button type="submit">Create link</button>"#)?;
    writeln!(buf, "</form>")?;
  } else {
    writeln!(buf, r#"<p class="notice">You reached the maximum number of links.</p>"#)?;
  }
  Ok(())
}

pub fn shared(buf: &mut String, data: &TemplateData) -> Result<(), RenderError> {
  let View::Shared(view) = &data.view else {
    return Err(mismatch(Page::Shared));
  };

  let branding = view.branding.as_ref();
  let title = branding.and_then(|b| b.title.as_deref()).unwrap_or("Goals");
  writeln!(buf, "<h1>{title}</h1>")?;
  if let Some(description) = branding.and_then(|b| b.description.as_deref()) {
    writeln!(buf, r#"<p class="description">{description}</p>"#)?;
  }

  if view.groups.is_empty() {
    writeln!(buf, r#"<p class="empty">Nothing to see here yet.</p>"#)?;
    return Ok(());
  }
  goal_groups(buf, &view.groups, view.today, false)
}
