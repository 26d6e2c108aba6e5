use std::fmt::Write as _;

use super::{esc, field_errors, mismatch};
use crate::render::{Page, RenderError, TemplateData, View};

/// Hidden from people; bots filling it are turned away.
const HONEYPOT: &str = r#"<div class="hp" aria-hidden="true"><label>Website <input type="text" name="website" tabindex="-1" autocomplete="off"></label></div>"#;

pub fn signup(buf: &mut String, data: &TemplateData) -> Result<(), RenderError> {
  let View::SignUp(form) = &data.view else {
    return Err(mismatch(Page::SignUp));
  };
  let v = &form.validator;

  writeln!(buf, "<h1>Create your account</h1>")?;
  writeln!(buf, r#"<form action="/signup" method="post" novalidate>"#)?;

  writeln!(buf, r#"<label for="email">Email</label>"#)?;
  writeln!(
    buf,
    r#"<input id="email" type="email" name="email" value="{}" autocomplete="email">"#,
    esc(&form.email)
  )?;
  field_errors(buf, v, "email")?;

  writeln!(buf, r#"<label for="password">Password</label>"#)?;
  writeln!(buf, r#"<input id="password" type="password" name="password" autocomplete="new-password">"#)?;
  field_errors(buf, v, "password")?;

  writeln!(buf, r#"<label for="repeat_password">Repeat password</label>"#)?;
  writeln!(
    buf,
    r#"<input id="repeat_password" type="password" name="repeat_password" autocomplete="new-password">"#
  )?;
  field_errors(buf, v, "repeat_password")?;

  writeln!(buf, "{HONEYPOT}")?;
  writeln!(buf, r#"<button type="submit">Sign up</button>"#)?;
  writeln!(buf, "</form>")?;
  writeln!(buf, r#"<p>Already have an account? <a href="/signin">Sign in</a></p>"#)?;
  Ok(())
}

pub fn signin(buf: &mut String, data: &TemplateData) -> Result<(), RenderError> {
  let View::SignIn(form) = &data.view else {
    return Err(mismatch(Page::SignIn));
  };
  let v = &form.validator;

  writeln!(buf, "<h1>Welcome back</h1>")?;
  writeln!(buf, r#"<form action="/signin" method="post" novalidate>"#)?;

  writeln!(buf, r#"<label for="email">Email</label>"#)?;
  writeln!(
    buf,
    r#"<input id="email" type="email" name="email" value="{}" autocomplete="email">"#,
    esc(&form.email)
  )?;
  field_errors(buf, v, "email")?;

  writeln!(buf, r#"<label for="password">Password</label>"#)?;
  writeln!(buf, r#"<input id="password" type="password" name="password" autocomplete="current-password">"#)?;
  field_errors(buf, v, "password")?;

  writeln!(buf, "{HONEYPOT}")?;
  writeln!(buf, r#"<button type="submit">Sign in</button>"#)?;
  writeln!(buf, "</form>")?;
  writeln!(buf, r#"<p>New here? <a href="/signup">Create an account</a></p>"#)?;
  Ok(())
}
