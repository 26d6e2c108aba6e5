//! HTML for every page, written straight into the render buffer.
//!
//! Values already escaped at input time (goal text, criterion descriptions,
//! branding) are written verbatim; everything else goes through [`esc`].

pub mod auth;
pub mod goals;
pub mod layout;
pub mod public;
pub mod settings;
pub mod share;

use std::fmt::Write as _;

use goalkeepr_core::{sanitize::escape_html, validate::Validator};

use crate::render::{BodyWriter, Layout, Page, RenderError, Template};

/// Compile `page` into its layout, title and body writer.
pub fn template(page: Page) -> Template {
  let (layout, title, body): (Layout, &'static str, BodyWriter) = match page {
    Page::Landing => (Layout::Landing, "Goalkeepr", public::landing),
    Page::Privacy => (Layout::Landing, "Privacy", public::privacy),
    Page::Imprint => (Layout::Landing, "Imprint", public::imprint),
    Page::SignUp => (Layout::Auth, "Sign up", auth::signup),
    Page::SignIn => (Layout::Auth, "Sign in", auth::signin),
    Page::Goals => (Layout::App, "Your goals", goals::list),
    Page::AddGoal => (Layout::App, "Add goal", goals::add),
    Page::EditGoal => (Layout::App, "Edit goal", goals::edit),
    Page::ShareLinks => (Layout::App, "Share goals", share::links),
    Page::Shared => (Layout::Share, "Goals", share::shared),
    Page::Settings => (Layout::Settings, "Settings", settings::page),
    Page::NotFound => (Layout::Center, "Not found", public::not_found),
    Page::Error => (Layout::Center, "Error", public::error),
    Page::TooManyRequests => (Layout::Center, "Too many requests", public::too_many_requests),
  };
  Template { layout, title, body }
}

/// Escape a value that was not sanitised on input.
pub(crate) fn esc(s: &str) -> String { escape_html(s) }

/// The `<p class="error">` lines for one field.
pub(crate) fn field_errors(
  buf: &mut String,
  validator: &Validator,
  field: &str,
) -> Result<(), RenderError> {
  for message in validator.errors(field) {
    writeln!(buf, r#"<p class="error">{}</p>"#, esc(message))?;
  }
  Ok(())
}

/// ` checked` when a sanitised checkbox value is set.
pub(crate) fn checked(value: &str) -> &'static str {
  if matches!(value, "on" | "true") { " checked" } else { "" }
}

/// The error a body writer returns when handed another page's view.
pub(crate) fn mismatch(page: Page) -> RenderError { RenderError::ViewMismatch(page.name()) }
