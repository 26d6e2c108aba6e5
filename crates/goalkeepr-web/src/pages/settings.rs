use std::fmt::Write as _;

use super::{esc, field_errors, mismatch};
use crate::{
  forms::BrandingForm,
  render::{Page, RenderError, TemplateData, View},
};

#[derive(Debug)]
pub struct SettingsView {
  pub email:    String,
  pub branding: BrandingForm,
}

pub fn page(buf: &mut String, data: &TemplateData) -> Result<(), RenderError> {
  let View::Settings(view) = &data.view else {
    return Err(mismatch(Page::Settings));
  };
  let form = &view.branding;

  writeln!(buf, "<h1>Settings</h1>")?;
  writeln!(buf, "<p>Signed in as <strong>{}</strong>.</p>", esc(&view.email))?;

  writeln!(buf, "<h2>Branding</h2>")?;
  writeln!(buf, r#"<form action="/settings/branding" method="post" novalidate>"#)?;
  writeln!(buf, r#"<label for="title">Title</label>"#)?;
  writeln!(buf, r#"<input id="title" type="text" name="title" value="{}">"#, form.title)?;
  field_errors(buf, &form.validator, "title")?;
  writeln!(buf, r#"<label for="description">Description</label>"#)?;
  writeln!(
    buf,
    r#"<textarea id="description" name="description" rows="4">{}</textarea>"#,
    form.description
  )?;
  field_errors(buf, &form.validator, "description")?;
  writeln!(buf, r#"<button type="submit">Save</button>"#)?;
  writeln!(buf, "</form>")?;

  writeln!(buf, "<h2>Delete account</h2>")?;
  writeln!(buf, "<p>This removes your account, goals and share links for good.</p>")?;
  writeln!(
    buf,
    r#"<form action="/settings/delete-user" method="post" hx-delete="/settings/delete-user" hx-confirm="Delete your account?">"#
  )?;
  writeln!(buf, r#"<input type="hidden" name="_method" value="DELETE">"#)?;
  writeln!(buf, r#"<button type="submit" class="danger">Delete account</button>"#)?;
  writeln!(buf, "</form>")?;
  Ok(())
}
