//! Form payloads: deserialised from `application/x-www-form-urlencoded`,
//! sanitised, then validated. A form that fails validation is handed back to
//! its page so the user sees their input next to the messages.

use goalkeepr_core::{
  branding,
  criterion::{self, CriterionInput},
  goal::{GoalInput, parse_date},
  sanitize,
  validate::{Validator, is_email, is_flag, max_chars, min_chars, not_blank},
};
use serde::Deserialize;

pub const BLANK: &str = "This field cannot be blank";
pub const NOT_EMAIL: &str = "This field must be a valid email address";
pub const TOO_SHORT: &str = "This field must be at least 8 characters long";
pub const MISMATCH: &str = "Passwords do not match";
pub const BAD_FLAG: &str = "This field must be either checked or unchecked";
pub const EMAIL_UNUSABLE: &str = "This email cannot be used.";
pub const BAD_CREDENTIALS: &str = "Invalid email or password.";

/// Longest accepted goal text, in characters.
pub const MAX_GOAL_CHARS: usize = 1024;

const MIN_PASSWORD_CHARS: usize = 8;

/// Checkbox semantics: `on`/`true` is set, anything else accepted by
/// [`is_flag`] is unset.
fn checked(value: &str) -> bool { matches!(value, "on" | "true") }

/// Whether a `_method` form override asks for `DELETE`.
pub fn wants_delete(method: &str) -> bool { method.trim().eq_ignore_ascii_case("delete") }

// ─── Sign up ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignUpForm {
  pub email:           String,
  pub password:        String,
  pub repeat_password: String,
  /// Honeypot; hidden from humans.
  pub website:         String,
  #[serde(skip)]
  pub validator:       Validator,
}

impl SignUpForm {
  pub fn is_bot(&self) -> bool { not_blank(&self.website) }

  pub fn sanitize(self) -> Self {
    Self {
      email: sanitize::email(&self.email),
      password: sanitize::password(&self.password),
      repeat_password: sanitize::password(&self.repeat_password),
      website: sanitize::text(&self.website),
      validator: self.validator,
    }
  }

  pub fn validate(&mut self) -> bool {
    let v = &mut self.validator;
    v.check(not_blank(&self.email), "email", BLANK);
    v.check(is_email(&self.email), "email", NOT_EMAIL);
    v.check(not_blank(&self.password), "password", BLANK);
    v.check(min_chars(&self.password, MIN_PASSWORD_CHARS), "password", TOO_SHORT);
    v.check(not_blank(&self.repeat_password), "repeat_password", BLANK);
    v.check(self.password == self.repeat_password, "repeat_password", MISMATCH);
    v.valid()
  }

  /// Drop the secrets before the form is rendered back.
  pub fn without_passwords(self) -> Self {
    Self {
      password: String::new(),
      repeat_password: String::new(),
      ..self
    }
  }
}

// ─── Sign in ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignInForm {
  pub email:     String,
  pub password:  String,
  pub website:   String,
  #[serde(skip)]
  pub validator: Validator,
}

impl SignInForm {
  pub fn is_bot(&self) -> bool { not_blank(&self.website) }

  pub fn sanitize(self) -> Self {
    Self {
      email: sanitize::email(&self.email),
      password: sanitize::password(&self.password),
      website: sanitize::text(&self.website),
      validator: self.validator,
    }
  }

  pub fn validate(&mut self) -> bool {
    let v = &mut self.validator;
    v.check(not_blank(&self.email), "email", BLANK);
    v.check(is_email(&self.email), "email", NOT_EMAIL);
    v.check(not_blank(&self.password), "password", BLANK);
    v.check(min_chars(&self.password, MIN_PASSWORD_CHARS), "password", TOO_SHORT);
    v.valid()
  }

  /// The form shown after a failed sign-in: the email only, with one
  /// message that does not say which half was wrong.
  pub fn rejected(email: String) -> Self {
    let mut form = Self { email, ..Self::default() };
    form.validator.add_error("email", BAD_CREDENTIALS);
    form
  }
}

// ─── Goal ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GoalForm {
  pub goal:      String,
  pub due:       String,
  pub visible:   String,
  pub achieved:  String,
  #[serde(rename = "_method")]
  pub method:    String,
  #[serde(skip)]
  pub validator: Validator,
}

impl GoalForm {
  /// Pre-filled form for an existing goal.
  pub fn from_goal(goal: &goalkeepr_core::goal::Goal) -> Self {
    Self {
      goal: goal.goal.clone(),
      due: goal.due_str(),
      visible: if goal.visible_to_public { "on" } else { "" }.to_owned(),
      achieved: if goal.achieved { "on" } else { "" }.to_owned(),
      ..Self::default()
    }
  }

  pub fn sanitize(self) -> Self {
    Self {
      goal: sanitize::text(&self.goal),
      due: sanitize::date(&self.due),
      visible: sanitize::flag(&self.visible),
      achieved: sanitize::flag(&self.achieved),
      method: self.method,
      validator: self.validator,
    }
  }

  /// Validate and, when everything passes, produce the store input. The due
  /// date is checked here rather than at parse time so a malformed date is a
  /// field error like any other.
  pub fn validate(&mut self) -> Option<GoalInput> {
    let due = parse_date(&self.due).ok();

    let v = &mut self.validator;
    v.check(not_blank(&self.goal), "goal", BLANK);
    v.check(
      max_chars(&self.goal, MAX_GOAL_CHARS),
      "goal",
      "This field cannot be more than 1024 characters long",
    );
    v.check(not_blank(&self.due), "due", BLANK);
    if not_blank(&self.due) {
      v.check(due.is_some(), "due", "Due date must be a valid date (YYYY-MM-DD)");
    }
    v.check(is_flag(&self.visible), "visible", BAD_FLAG);
    v.check(is_flag(&self.achieved), "achieved", BAD_FLAG);

    match due {
      Some(due) if v.valid() => Some(GoalInput {
        goal: self.goal.clone(),
        due,
        visible_to_public: checked(&self.visible),
        achieved: checked(&self.achieved),
      }),
      _ => None,
    }
  }

  pub fn is_visible(&self) -> bool { checked(&self.visible) }

  pub fn is_achieved(&self) -> bool { checked(&self.achieved) }
}

// ─── Success criterion ───────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CriterionForm {
  pub description: String,
  pub completed:   String,
  pub position:    String,
  #[serde(rename = "_method")]
  pub method:      String,
  #[serde(skip)]
  pub validator:   Validator,
}

impl CriterionForm {
  pub fn sanitize(self) -> Self {
    Self {
      description: sanitize::text(&self.description),
      completed: sanitize::flag(&self.completed),
      position: self.position.trim().to_owned(),
      method: self.method,
      validator: self.validator,
    }
  }

  pub fn validate(&mut self) -> Option<CriterionInput> {
    let position = match self.position.as_str() {
      "" => Ok(None),
      raw => raw.parse::<i64>().ok().filter(|p| *p >= 1).map(Some).ok_or(()),
    };

    let v = &mut self.validator;
    v.check(not_blank(&self.description), "description", "Description cannot be blank");
    v.check(
      max_chars(&self.description, criterion::MAX_DESCRIPTION_CHARS),
      "description",
      "Description cannot be more than 500 characters",
    );
    v.check(is_flag(&self.completed), "completed", BAD_FLAG);
    v.check(position.is_ok(), "position", "Position must be a whole number from 1");

    match position {
      Ok(position) if v.valid() => Some(CriterionInput {
        description: self.description.clone(),
        completed: checked(&self.completed),
        position,
      }),
      _ => None,
    }
  }
}

// ─── Branding ────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BrandingForm {
  pub title:       String,
  pub description: String,
  #[serde(skip)]
  pub validator:   Validator,
}

impl BrandingForm {
  pub fn from_branding(b: Option<&branding::Branding>) -> Self {
    Self {
      title: b.and_then(|b| b.title.clone()).unwrap_or_default(),
      description: b.and_then(|b| b.description.clone()).unwrap_or_default(),
      ..Self::default()
    }
  }

  pub fn sanitize(self) -> Self {
    Self {
      title: sanitize::text(&self.title),
      description: sanitize::text(&self.description),
      validator: self.validator,
    }
  }

  pub fn validate(&mut self) -> bool {
    let v = &mut self.validator;
    v.check(
      max_chars(&self.title, branding::MAX_TITLE_CHARS),
      "title",
      "Title cannot be more than 512 characters",
    );
    v.check(
      max_chars(&self.description, branding::MAX_DESCRIPTION_CHARS),
      "description",
      "Description cannot be more than 2048 characters",
    );
    v.valid()
  }
}

/// Body of forms that carry nothing but an optional method override.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MethodForm {
  #[serde(rename = "_method")]
  pub method: String,
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;

  fn signup(email: &str, password: &str, repeat: &str) -> SignUpForm {
    SignUpForm {
      email: email.into(),
      password: password.into(),
      repeat_password: repeat.into(),
      ..SignUpForm::default()
    }
    .sanitize()
  }

  #[test]
  fn valid_signup_passes() {
    let mut form = signup(" User@Example.com ", "validpassword", "validpassword");
    assert!(form.validate());
    assert_eq!(form.email, "user@example.com");
  }

  #[test]
  fn signup_reports_every_failed_check() {
    let mut form = signup("", "", "");
    assert!(!form.validate());
    assert_eq!(form.validator.errors("email"), [BLANK, NOT_EMAIL]);
    assert_eq!(form.validator.errors("password"), [BLANK, TOO_SHORT]);
    assert_eq!(form.validator.errors("repeat_password"), [BLANK]);
  }

  #[test]
  fn mismatched_passwords() {
    let mut form = signup("user@example.com", "validpassword", "otherpassword");
    assert!(!form.validate());
    assert_eq!(form.validator.errors("repeat_password"), [MISMATCH]);
  }

  #[test]
  fn rejected_signin_keeps_only_email() {
    let form = SignInForm::rejected("user@example.com".into());
    assert_eq!(form.email, "user@example.com");
    assert!(form.password.is_empty());
    assert_eq!(form.validator.errors("email"), [BAD_CREDENTIALS]);
  }

  #[test]
  fn honeypot_detects_bots() {
    let form = SignInForm { website: "http://spam".into(), ..SignInForm::default() };
    assert!(form.is_bot());
    assert!(!SignInForm::default().is_bot());
  }

  fn goal_form(goal: &str, due: &str, visible: &str) -> GoalForm {
    GoalForm {
      goal: goal.into(),
      due: due.into(),
      visible: visible.into(),
      ..GoalForm::default()
    }
    .sanitize()
  }

  #[test]
  fn goal_form_produces_input() {
    let mut form = goal_form(" Run a marathon ", "2025-06-01", "on");
    let input = form.validate().unwrap();
    assert_eq!(input.goal, "Run a marathon");
    assert_eq!(input.due, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
    assert!(input.visible_to_public);
    assert!(!input.achieved);
  }

  #[test]
  fn goal_text_is_escaped() {
    let mut form = goal_form("<b>bold</b>", "2025-06-01", "");
    assert_eq!(form.validate().unwrap().goal, "&lt;b&gt;bold&lt;/b&gt;");
  }

  #[test]
  fn malformed_due_date_is_a_field_error() {
    let mut form = goal_form("Run", "not-a-date", "");
    assert!(form.validate().is_none());
    assert_eq!(form.validator.errors("due"), ["Due date must be a valid date (YYYY-MM-DD)"]);

    let mut blank = goal_form("Run", " ", "");
    assert!(blank.validate().is_none());
    assert_eq!(blank.validator.errors("due"), [BLANK]);
  }

  #[test]
  fn unexpected_flag_values_are_rejected() {
    let mut form = goal_form("Run", "2025-06-01", "yes");
    assert!(form.validate().is_none());
    assert_eq!(form.validator.errors("visible"), [BAD_FLAG]);

    let mut off = goal_form("Run", "2025-06-01", "false");
    assert!(!off.validate().unwrap().visible_to_public);
  }

  #[test]
  fn goal_length_limit() {
    let mut form = goal_form(&"x".repeat(MAX_GOAL_CHARS + 1), "2025-06-01", "");
    assert!(form.validate().is_none());
    assert_eq!(form.validator.errors("goal").len(), 1);
  }

  #[test]
  fn criterion_rules() {
    let mut ok = CriterionForm {
      description: "Run 10k".into(),
      position: "2".into(),
      ..CriterionForm::default()
    }
    .sanitize();
    let input = ok.validate().unwrap();
    assert_eq!(input.position, Some(2));
    assert!(!input.completed);

    let mut long = CriterionForm {
      description: "x".repeat(criterion::MAX_DESCRIPTION_CHARS + 1),
      ..CriterionForm::default()
    }
    .sanitize();
    assert!(long.validate().is_none());
    assert_eq!(
      long.validator.errors("description"),
      ["Description cannot be more than 500 characters"]
    );

    let mut bad_pos = CriterionForm {
      description: "Run".into(),
      position: "0".into(),
      ..CriterionForm::default()
    }
    .sanitize();
    assert!(bad_pos.validate().is_none());
  }

  #[test]
  fn branding_limits() {
    let mut form = BrandingForm {
      title: "t".repeat(branding::MAX_TITLE_CHARS + 1),
      description: "ok".into(),
      ..BrandingForm::default()
    }
    .sanitize();
    assert!(!form.validate());
    assert_eq!(form.validator.errors("title").len(), 1);
    assert!(form.validator.errors("description").is_empty());
  }

  #[test]
  fn method_override() {
    assert!(wants_delete("DELETE"));
    assert!(wants_delete(" delete "));
    assert!(!wants_delete(""));
    assert!(!wants_delete("PUT"));
  }
}
