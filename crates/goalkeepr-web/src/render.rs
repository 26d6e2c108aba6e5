//! Template cache and renderer.
//!
//! Every [`Page`] is compiled once at startup into a [`Template`]: the layout
//! it sits in plus the function that writes its body. Rendering executes into
//! a buffer; a response is only built after the whole page rendered, so a
//! failure never leaves half a page on the wire.

use std::collections::HashMap;

use axum::{
  http::StatusCode,
  response::{Html, IntoResponse, Response},
};
use chrono::{Datelike, Utc};
use thiserror::Error;

use crate::{
  forms::{GoalForm, SignInForm, SignUpForm},
  pages::{
    self,
    goals::{EditGoalView, GoalsView},
    public::ErrorView,
    settings::SettingsView,
    share::{ShareLinksView, SharedView},
  },
};

#[derive(Debug, Error)]
pub enum RenderError {
  #[error("no template for page {0:?}")]
  Missing(&'static str),

  #[error("page {0:?} rendered with the wrong view")]
  ViewMismatch(&'static str),

  #[error("write error: {0}")]
  Fmt(#[from] std::fmt::Error),
}

// ─── Pages & layouts ─────────────────────────────────────────────────────────

/// Logical page identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
  Landing,
  Privacy,
  Imprint,
  SignUp,
  SignIn,
  Goals,
  AddGoal,
  EditGoal,
  ShareLinks,
  Shared,
  Settings,
  NotFound,
  Error,
  TooManyRequests,
}

impl Page {
  pub const ALL: [Page; 14] = [
    Page::Landing,
    Page::Privacy,
    Page::Imprint,
    Page::SignUp,
    Page::SignIn,
    Page::Goals,
    Page::AddGoal,
    Page::EditGoal,
    Page::ShareLinks,
    Page::Shared,
    Page::Settings,
    Page::NotFound,
    Page::Error,
    Page::TooManyRequests,
  ];

  pub fn name(self) -> &'static str {
    match self {
      Page::Landing => "landing",
      Page::Privacy => "privacy",
      Page::Imprint => "imprint",
      Page::SignUp => "signup",
      Page::SignIn => "signin",
      Page::Goals => "goals",
      Page::AddGoal => "add-goal",
      Page::EditGoal => "edit-goal",
      Page::ShareLinks => "share-goals",
      Page::Shared => "share",
      Page::Settings => "settings",
      Page::NotFound => "not-found",
      Page::Error => "error",
      Page::TooManyRequests => "too-many-requests",
    }
  }
}

/// Page chrome. Each layout decides the navigation partial and whether the
/// flash message is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
  Landing,
  Auth,
  App,
  Settings,
  Share,
  Center,
}

// ─── Data envelope ───────────────────────────────────────────────────────────

/// Page-specific data.
#[derive(Debug)]
pub enum View {
  None,
  SignUp(SignUpForm),
  SignIn(SignInForm),
  Goals(GoalsView),
  AddGoal(GoalForm),
  EditGoal(EditGoalView),
  ShareLinks(ShareLinksView),
  Shared(SharedView),
  Settings(SettingsView),
  Error(ErrorView),
}

/// Everything a template can see.
#[derive(Debug)]
pub struct TemplateData {
  pub year:             i32,
  pub is_authenticated: bool,
  pub flash:            Option<String>,
  pub view:             View,
}

impl TemplateData {
  pub fn new(is_authenticated: bool, flash: Option<String>, view: View) -> Self {
    Self {
      year: Utc::now().year(),
      is_authenticated,
      flash,
      view,
    }
  }
}

// ─── Cache ───────────────────────────────────────────────────────────────────

pub type BodyWriter = fn(&mut String, &TemplateData) -> Result<(), RenderError>;

/// A compiled page: layout, title and body writer.
#[derive(Clone, Copy)]
pub struct Template {
  pub layout: Layout,
  pub title:  &'static str,
  pub body:   BodyWriter,
}

pub struct Templates {
  cache: HashMap<&'static str, Template>,
}

impl Templates {
  /// Compile every page.
  pub fn new() -> Self { Self::with_pages(&Page::ALL) }

  /// Compile only `pages`; anything else renders as a cache miss.
  pub fn with_pages(pages: &[Page]) -> Self {
    let cache = pages
      .iter()
      .map(|&page| (page.name(), pages::template(page)))
      .collect();
    Self { cache }
  }

  /// Render `page` into a complete HTML document.
  pub fn execute(&self, page: Page, data: &TemplateData) -> Result<String, RenderError> {
    let template = self
      .cache
      .get(page.name())
      .ok_or(RenderError::Missing(page.name()))?;

    let mut buf = String::with_capacity(8 * 1024);
    pages::layout::write(&mut buf, template, data)?;
    Ok(buf)
  }

  pub fn render(
    &self,
    status: StatusCode,
    page: Page,
    data: TemplateData,
  ) -> Result<Response, RenderError> {
    let html = self.execute(page, &data)?;
    Ok((status, Html(html)).into_response())
  }
}

impl Default for Templates {
  fn default() -> Self { Self::new() }
}
