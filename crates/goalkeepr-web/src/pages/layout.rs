//! Document chrome shared by all pages: head, navigation, flash and footer.

use std::fmt::Write as _;

use super::esc;
use crate::render::{Layout, RenderError, Template, TemplateData};

const HTMX_SRC: &str = "https://unpkg.com/htmx.org@2.0.4";

pub fn write(buf: &mut String, template: &Template, data: &TemplateData) -> Result<(), RenderError> {
  writeln!(buf, "<!doctype html>")?;
  writeln!(buf, r#"<html lang="en">"#)?;
  writeln!(buf, "<head>")?;
  writeln!(buf, r#"<meta charset="utf-8">"#)?;
  writeln!(buf, r#"<meta name="viewport" content="width=device-width, initial-scale=1">"#)?;
  writeln!(buf, "<title>{} | Goalkeepr</title>", template.title)?;
  writeln!(buf, r#"<script src="{HTMX_SRC}" defer></script>"#)?;
  writeln!(buf, "</head>")?;
  writeln!(buf, r#"<body class="layout-{}">"#, class(template.layout))?;

  nav(buf, template.layout, data)?;

  writeln!(buf, "<main>")?;
  if matches!(template.layout, Layout::App | Layout::Settings)
    && let Some(flash) = &data.flash
  {
    writeln!(buf, r#"<div class="flash" role="status">{}</div>"#, esc(flash))?;
  }
  (template.body)(buf, data)?;
  writeln!(buf, "</main>")?;

  footer(buf, data)?;
  writeln!(buf, "</body>")?;
  writeln!(buf, "</html>")?;
  Ok(())
}

fn class(layout: Layout) -> &'static str {
  match layout {
    Layout::Landing => "landing",
    Layout::Auth => "auth",
    Layout::App => "app",
    Layout::Settings => "settings",
    Layout::Share => "share",
    Layout::Center => "center",
  }
}

// ─── Partials ────────────────────────────────────────────────────────────────

/// Navigation. Settings borrows the app bar and the auth pages borrow the
/// minimal share bar; centred pages have none.
fn nav(buf: &mut String, layout: Layout, data: &TemplateData) -> Result<(), RenderError> {
  match layout {
    Layout::Landing => landing_nav(buf, data),
    Layout::App | Layout::Settings => app_nav(buf),
    Layout::Share | Layout::Auth => share_nav(buf),
    Layout::Center => Ok(()),
  }
}

fn landing_nav(buf: &mut String, data: &TemplateData) -> Result<(), RenderError> {
  writeln!(buf, "<nav>")?;
  writeln!(buf, r#"<a class="brand" href="/">Goalkeepr</a>"#)?;
  if data.is_authenticated {
    writeln!(buf, r#"<a href="/goals">Your goals</a>"#)?;
  } else {
    writeln!(buf, r#"<a href="/signin">Sign in</a>"#)?;
    writeln!(buf, r#"<a class="button" href="/signup">Sign up</a>"#)?;
  }
  writeln!(buf, "</nav>")?;
  Ok(())
}

fn app_nav(buf: &mut String) -> Result<(), RenderError> {
  writeln!(buf, "<nav>")?;
  writeln!(buf, r#"<a class="brand" href="/goals">Goalkeepr</a>"#)?;
  writeln!(buf, r#"<a href="/goals/add/">Add goal</a>"#)?;
  writeln!(buf, r#"<a href="/goals/share/">Share</a>"#)?;
  writeln!(buf, r#"<a href="/settings">Settings</a>"#)?;
  writeln!(buf, r#"<form action="/signout" method="post"><button type="submit">Sign out</button></form>"#)?;
  writeln!(buf, "</nav>")?;
  Ok(())
}

fn share_nav(buf: &mut String) -> Result<(), RenderError> {
  writeln!(buf, r#"<nav><a class="brand" href="/">Goalkeepr</a></nav>"#)?;
  Ok(())
}

fn footer(buf: &mut String, data: &TemplateData) -> Result<(), RenderError> {
  writeln!(buf, "<footer>")?;
  writeln!(buf, "<span>&copy; {} Goalkeepr</span>", data.year)?;
  writeln!(buf, r#"<a href="/privacy">Privacy</a>"#)?;
  writeln!(buf, r#"<a href="/imprint">Imprint</a>"#)?;
  writeln!(buf, "</footer>")?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    pages,
    render::{Page, View},
  };

  fn render(page: Page, data: &TemplateData) -> String {
    let mut buf = String::new();
    write(&mut buf, &pages::template(page), data).unwrap();
    buf
  }

  #[test]
  fn flash_only_in_app_layouts() {
    let data = TemplateData::new(true, Some("Goal saved!".into()), View::None);
    assert!(!render(Page::Landing, &data).contains("Goal saved!"));
    assert!(render(Page::NotFound, &data).contains("<title>Not found | Goalkeepr</title>"));
  }

  #[test]
  fn landing_nav_tracks_authentication() {
    let anon = render(Page::Landing, &TemplateData::new(false, None, View::None));
    assert!(anon.contains(r#"href="/signup""#));

    let user = render(Page::Landing, &TemplateData::new(true, None, View::None));
    assert!(user.contains(r#"href="/goals""#));
    assert!(!user.contains(r#"href="/signup""#));
  }

  #[test]
  fn centred_pages_have_no_nav() {
    let html = render(Page::TooManyRequests, &TemplateData::new(false, None, View::None));
    assert!(!html.contains("<nav>"));
    assert!(html.contains(r#"href="/privacy""#));
  }
}
