//! Landing, legal and error pages.

use std::fmt::Write as _;

use super::{esc, mismatch};
use crate::render::{Page, RenderError, TemplateData, View};

/// Data for the internal-error page.
#[derive(Debug, Clone)]
pub struct ErrorView {
  pub trace_id: String,
  pub message:  String,
}

pub fn landing(buf: &mut String, data: &TemplateData) -> Result<(), RenderError> {
  writeln!(buf, "<section class=\"hero\">")?;
  writeln!(buf, "<h1>Keep your goals in sight</h1>")?;
  writeln!(
    buf,
    "<p>Write down what you want to achieve, set a due date and tick off the \
     criteria that tell you when you are done. Share the goals you choose with \
     a private link.</p>"
  )?;
  if data.is_authenticated {
    writeln!(buf, r#"<a class="button" href="/goals">Go to your goals</a>"#)?;
  } else {
    writeln!(buf, r#"<a class="button" href="/signup">Get started</a>"#)?;
  }
  writeln!(buf, "</section>")?;
  Ok(())
}

pub fn privacy(buf: &mut String, _data: &TemplateData) -> Result<(), RenderError> {
  writeln!(buf, "<h1>Privacy</h1>")?;
  writeln!(
    buf,
    "<p>Goalkeepr stores your email address, a hash of your password and the \
     goals you enter. A single session cookie keeps you signed in. Nothing is \
     shared with third parties.</p>"
  )?;
  writeln!(
    buf,
    "<p>Goals are only visible to others when you mark them public and hand \
     out a share link. Deleting your account removes all of your data.</p>"
  )?;
  Ok(())
}

pub fn imprint(buf: &mut String, _data: &TemplateData) -> Result<(), RenderError> {
  writeln!(buf, "<h1>Imprint</h1>")?;
  writeln!(buf, "<p>Goalkeepr is operated as a personal project.</p>")?;
  Ok(())
}

pub fn not_found(buf: &mut String, _data: &TemplateData) -> Result<(), RenderError> {
  writeln!(buf, "<h1>Page not found</h1>")?;
  writeln!(buf, "<p>The page you are looking for does not exist.</p>")?;
  writeln!(buf, r#"<a href="/">Back to the start</a>"#)?;
  Ok(())
}

pub fn error(buf: &mut String, data: &TemplateData) -> Result<(), RenderError> {
  let View::Error(view) = &data.view else {
    return Err(mismatch(Page::Error));
  };
  writeln!(buf, "<h1>Something went wrong</h1>")?;
  writeln!(buf, "<p>{}</p>", esc(&view.message))?;
  writeln!(
    buf,
    r#"<p class="trace">Trace id: <code>{}</code></p>"#,
    esc(&view.trace_id)
  )?;
  Ok(())
}

pub fn too_many_requests(buf: &mut String, _data: &TemplateData) -> Result<(), RenderError> {
  writeln!(buf, "<h1>Slow Down There!</h1>")?;
  writeln!(buf, "<p>You sent too many requests. Wait a moment and try again.</p>")?;
  Ok(())
}
