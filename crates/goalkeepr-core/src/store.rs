//! The `GoalkeeprStore` trait.
//!
//! Implemented by storage backends (e.g. `goalkeepr-store-sqlite`). The web
//! layer depends on this abstraction, not on any concrete backend.
//!
//! Every read or write of user-owned data takes the owner's id and filters on
//! it, so a guessed id belonging to another user looks exactly like a missing
//! row: `None` for reads, `0` rows affected for writes.

use std::future::Future;

use crate::{
  branding::Branding,
  criterion::{CriterionInput, SuccessCriterion},
  goal::{Goal, GoalInput},
  share::Share,
  user::{NewUser, User},
};

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Error bound for store backends.
///
/// Most failures are opaque to callers; the few they react to individually
/// (duplicate email, share quota) are exposed through [`StoreError::domain`].
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn domain(&self) -> Option<&crate::Error>;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Goalkeepr store backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait GoalkeeprStore: Send + Sync {
  type Error: StoreError;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Persist a new account. A duplicate email fails with
  /// [`crate::Error::EmailTaken`].
  fn add_user(
    &self,
    user: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  fn get_user(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Delete an account together with everything it owns.
  fn delete_user(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Goals ─────────────────────────────────────────────────────────────

  fn add_goal(
    &self,
    user_id: i64,
    input: GoalInput,
  ) -> impl Future<Output = Result<Goal, Self::Error>> + Send + '_;

  /// All goals of a user, ordered by due date ascending.
  fn list_goals(
    &self,
    user_id: i64,
  ) -> impl Future<Output = Result<Vec<Goal>, Self::Error>> + Send + '_;

  fn get_goal(
    &self,
    id: i64,
    user_id: i64,
  ) -> impl Future<Output = Result<Option<Goal>, Self::Error>> + Send + '_;

  fn update_goal(
    &self,
    id: i64,
    user_id: i64,
    input: GoalInput,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Delete a goal and its success criteria. A second delete of the same id
  /// affects zero rows.
  fn delete_goal(
    &self,
    id: i64,
    user_id: i64,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Goals flagged visible to the public, ordered by due date ascending.
  fn list_shared_goals(
    &self,
    user_id: i64,
  ) -> impl Future<Output = Result<Vec<Goal>, Self::Error>> + Send + '_;

  // ── Success criteria ──────────────────────────────────────────────────

  /// Attach a criterion to a goal. Returns `None` when the goal does not
  /// exist or belongs to someone else.
  fn add_criterion(
    &self,
    goal_id: i64,
    user_id: i64,
    input: CriterionInput,
  ) -> impl Future<Output = Result<Option<SuccessCriterion>, Self::Error>> + Send + '_;

  /// Criteria of a goal ordered by position (unset last), then insertion.
  fn list_criteria(
    &self,
    goal_id: i64,
    user_id: i64,
  ) -> impl Future<Output = Result<Vec<SuccessCriterion>, Self::Error>> + Send + '_;

  fn get_criterion(
    &self,
    id: i64,
    user_id: i64,
  ) -> impl Future<Output = Result<Option<SuccessCriterion>, Self::Error>> + Send + '_;

  /// Flip the completed flag.
  fn toggle_criterion(
    &self,
    id: i64,
    user_id: i64,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  fn update_criterion(
    &self,
    id: i64,
    user_id: i64,
    input: CriterionInput,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  fn delete_criterion(
    &self,
    id: i64,
    user_id: i64,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  fn delete_criteria_for_goal(
    &self,
    goal_id: i64,
    user_id: i64,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Branding ──────────────────────────────────────────────────────────

  fn get_branding(
    &self,
    user_id: i64,
  ) -> impl Future<Output = Result<Option<Branding>, Self::Error>> + Send + '_;

  /// Create or replace the user's branding. Empty strings are stored as
  /// absent.
  fn upsert_branding(
    &self,
    user_id: i64,
    title: Option<String>,
    description: Option<String>,
  ) -> impl Future<Output = Result<Branding, Self::Error>> + Send + '_;

  fn delete_branding(
    &self,
    user_id: i64,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Share links ───────────────────────────────────────────────────────

  /// Mint a share link with a fresh random public id. The quota check and
  /// the insert are atomic; exceeding it fails with
  /// [`crate::Error::ShareLimitReached`].
  fn create_share(
    &self,
    user_id: i64,
  ) -> impl Future<Output = Result<Share, Self::Error>> + Send + '_;

  fn delete_share(
    &self,
    id: i64,
    user_id: i64,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  fn list_shares(
    &self,
    user_id: i64,
  ) -> impl Future<Output = Result<Vec<Share>, Self::Error>> + Send + '_;

  /// Resolve a public id to its owner. This is the only path from an
  /// anonymous request to a user's data.
  fn get_user_id_by_public_id<'a>(
    &'a self,
    public_id: &'a str,
  ) -> impl Future<Output = Result<Option<i64>, Self::Error>> + Send + 'a;
}
