//! [`SqliteStore`]: the SQLite implementation of [`GoalkeeprStore`].

use std::path::Path;

use chrono::Utc;
use goalkeepr_core::{
  Error as CoreError,
  branding::Branding,
  criterion::{CriterionInput, SuccessCriterion},
  goal::{Goal, GoalInput},
  share::{MAX_SHARES_PER_USER, PUBLIC_ID_BYTES, Share},
  store::GoalkeeprStore,
  user::{NewUser, User},
};
use rand_core::{OsRng, RngCore as _};
use rusqlite::{OptionalExtension as _, TransactionBehavior};

use crate::{
  Result,
  encode::{
    CRITERION_COLUMNS, GOAL_COLUMNS, RawCriterion, RawGoal, RawShare, RawUser,
    SHARE_COLUMNS, USER_COLUMNS, encode_date, encode_dt, non_empty,
  },
  schema::{PRAGMAS, SCHEMA},
};

/// Fresh public ids tried before giving up on a share insert.
const PUBLIC_ID_ATTEMPTS: usize = 3;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Goalkeepr store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store; useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(PRAGMAS)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

fn new_public_id() -> String {
  let mut bytes = [0u8; PUBLIC_ID_BYTES];
  OsRng.fill_bytes(&mut bytes);
  hex::encode(bytes)
}

// ─── GoalkeeprStore impl ─────────────────────────────────────────────────────

impl GoalkeeprStore for SqliteStore {
  type Error = crate::Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn add_user(&self, user: NewUser) -> Result<User> {
    let now    = Utc::now();
    let now_s  = encode_dt(now);
    let email  = user.email.clone();
    let hash   = user.password_hash.clone();

    let id = self
      .conn
      .call(move |conn| {
        match conn.execute(
          "INSERT INTO users (email, password_hash, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?3)",
          rusqlite::params![email, hash, now_s],
        ) {
          Ok(_) => Ok(Ok(conn.last_insert_rowid())),
          Err(e) if is_unique_violation(&e) => Ok(Err(CoreError::EmailTaken)),
          Err(e) => Err(e.into()),
        }
      })
      .await??;

    Ok(User {
      id,
      email: user.email,
      password_hash: user.password_hash,
      locked_until: None,
      created_at: now,
      updated_at: now,
    })
  }

  async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
    let email = email.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            rusqlite::params![email],
            RawUser::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn get_user(&self, id: i64) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            rusqlite::params![id],
            RawUser::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn delete_user(&self, id: i64) -> Result<u64> {
    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM users WHERE id = ?1", rusqlite::params![id])?)
      })
      .await?;
    Ok(n as u64)
  }

  // ── Goals ─────────────────────────────────────────────────────────────────

  async fn add_goal(&self, user_id: i64, input: GoalInput) -> Result<Goal> {
    let text    = input.goal.clone();
    let due_str = encode_date(input.due);
    let visible = input.visible_to_public;
    let done    = input.achieved;

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO goals (user_id, goal, due, visible_to_public, achieved)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![user_id, text, due_str, visible, done],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Goal {
      id,
      user_id,
      goal: input.goal,
      due: input.due,
      visible_to_public: input.visible_to_public,
      achieved: input.achieved,
    })
  }

  async fn list_goals(&self, user_id: i64) -> Result<Vec<Goal>> {
    let raws: Vec<RawGoal> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {GOAL_COLUMNS} FROM goals WHERE user_id = ?1 ORDER BY due ASC, id ASC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![user_id], RawGoal::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawGoal::into_goal).collect()
  }

  async fn get_goal(&self, id: i64, user_id: i64) -> Result<Option<Goal>> {
    let raw: Option<RawGoal> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {GOAL_COLUMNS} FROM goals WHERE id = ?1 AND user_id = ?2"),
            rusqlite::params![id, user_id],
            RawGoal::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawGoal::into_goal).transpose()
  }

  async fn update_goal(&self, id: i64, user_id: i64, input: GoalInput) -> Result<u64> {
    let due_str = encode_date(input.due);

    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE goals
              SET goal = ?1, due = ?2, visible_to_public = ?3, achieved = ?4
            WHERE id = ?5 AND user_id = ?6",
          rusqlite::params![
            input.goal,
            due_str,
            input.visible_to_public,
            input.achieved,
            id,
            user_id,
          ],
        )?)
      })
      .await?;
    Ok(n as u64)
  }

  async fn delete_goal(&self, id: i64, user_id: i64) -> Result<u64> {
    let n = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM success_criteria WHERE goal_id = ?1 AND user_id = ?2",
          rusqlite::params![id, user_id],
        )?;
        let n = tx.execute(
          "DELETE FROM goals WHERE id = ?1 AND user_id = ?2",
          rusqlite::params![id, user_id],
        )?;
        tx.commit()?;
        Ok(n)
      })
      .await?;
    Ok(n as u64)
  }

  async fn list_shared_goals(&self, user_id: i64) -> Result<Vec<Goal>> {
    let raws: Vec<RawGoal> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {GOAL_COLUMNS} FROM goals
            WHERE user_id = ?1 AND visible_to_public = 1
            ORDER BY due ASC, id ASC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![user_id], RawGoal::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawGoal::into_goal).collect()
  }

  // ── Success criteria ──────────────────────────────────────────────────────

  async fn add_criterion(
    &self,
    goal_id: i64,
    user_id: i64,
    input: CriterionInput,
  ) -> Result<Option<SuccessCriterion>> {
    let now   = Utc::now();
    let now_s = encode_dt(now);
    let desc  = input.description.clone();
    let done  = input.completed;
    let pos   = input.position;

    // The SELECT only yields a row when the goal belongs to the user.
    let id = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "INSERT INTO success_criteria
             (goal_id, user_id, description, completed, position, created_at)
           SELECT id, user_id, ?3, ?4, ?5, ?6
             FROM goals WHERE id = ?1 AND user_id = ?2",
          rusqlite::params![goal_id, user_id, desc, done, pos, now_s],
        )?;
        Ok((n > 0).then(|| conn.last_insert_rowid()))
      })
      .await?;

    Ok(id.map(|id| SuccessCriterion {
      id,
      goal_id,
      user_id,
      description: input.description,
      completed: input.completed,
      position: input.position,
      created_at: now,
    }))
  }

  async fn list_criteria(&self, goal_id: i64, user_id: i64) -> Result<Vec<SuccessCriterion>> {
    let raws: Vec<RawCriterion> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CRITERION_COLUMNS} FROM success_criteria
            WHERE goal_id = ?1 AND user_id = ?2
            ORDER BY position IS NULL, position ASC, id ASC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![goal_id, user_id], RawCriterion::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCriterion::into_criterion).collect()
  }

  async fn get_criterion(&self, id: i64, user_id: i64) -> Result<Option<SuccessCriterion>> {
    let raw: Option<RawCriterion> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {CRITERION_COLUMNS} FROM success_criteria WHERE id = ?1 AND user_id = ?2"
            ),
            rusqlite::params![id, user_id],
            RawCriterion::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawCriterion::into_criterion).transpose()
  }

  async fn toggle_criterion(&self, id: i64, user_id: i64) -> Result<u64> {
    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE success_criteria SET completed = 1 - completed
            WHERE id = ?1 AND user_id = ?2",
          rusqlite::params![id, user_id],
        )?)
      })
      .await?;
    Ok(n as u64)
  }

  async fn update_criterion(
    &self,
    id: i64,
    user_id: i64,
    input: CriterionInput,
  ) -> Result<u64> {
    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE success_criteria
              SET description = ?1, completed = ?2, position = ?3
            WHERE id = ?4 AND user_id = ?5",
          rusqlite::params![input.description, input.completed, input.position, id, user_id],
        )?)
      })
      .await?;
    Ok(n as u64)
  }

  async fn delete_criterion(&self, id: i64, user_id: i64) -> Result<u64> {
    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM success_criteria WHERE id = ?1 AND user_id = ?2",
          rusqlite::params![id, user_id],
        )?)
      })
      .await?;
    Ok(n as u64)
  }

  async fn delete_criteria_for_goal(&self, goal_id: i64, user_id: i64) -> Result<u64> {
    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM success_criteria WHERE goal_id = ?1 AND user_id = ?2",
          rusqlite::params![goal_id, user_id],
        )?)
      })
      .await?;
    Ok(n as u64)
  }

  // ── Branding ──────────────────────────────────────────────────────────────

  async fn get_branding(&self, user_id: i64) -> Result<Option<Branding>> {
    let branding = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT user_id, title, description FROM branding WHERE user_id = ?1",
            rusqlite::params![user_id],
            |row| {
              Ok(Branding {
                user_id:     row.get(0)?,
                title:       row.get(1)?,
                description: row.get(2)?,
              })
            },
          )
          .optional()?)
      })
      .await?;
    Ok(branding)
  }

  async fn upsert_branding(
    &self,
    user_id: i64,
    title: Option<String>,
    description: Option<String>,
  ) -> Result<Branding> {
    let branding = Branding {
      user_id,
      title: non_empty(title),
      description: non_empty(description),
    };
    let title       = branding.title.clone();
    let description = branding.description.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO branding (user_id, title, description) VALUES (?1, ?2, ?3)
           ON CONFLICT(user_id) DO UPDATE
             SET title = excluded.title, description = excluded.description",
          rusqlite::params![user_id, title, description],
        )?;
        Ok(())
      })
      .await?;

    Ok(branding)
  }

  async fn delete_branding(&self, user_id: i64) -> Result<u64> {
    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM branding WHERE user_id = ?1",
          rusqlite::params![user_id],
        )?)
      })
      .await?;
    Ok(n as u64)
  }

  // ── Share links ───────────────────────────────────────────────────────────

  async fn create_share(&self, user_id: i64) -> Result<Share> {
    let now_s = encode_dt(Utc::now());

    // IMMEDIATE takes the write lock up front so concurrent creators cannot
    // both pass the quota check.
    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let count: i64 = tx.query_row(
          "SELECT COUNT(*) FROM share WHERE user_id = ?1",
          rusqlite::params![user_id],
          |row| row.get(0),
        )?;
        if count >= MAX_SHARES_PER_USER as i64 {
          return Ok(Err(CoreError::ShareLimitReached(MAX_SHARES_PER_USER)));
        }

        for _ in 0..PUBLIC_ID_ATTEMPTS {
          let public_id = new_public_id();
          match tx.execute(
            "INSERT INTO share (user_id, public_id, created_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![user_id, public_id, now_s],
          ) {
            Ok(_) => {
              let id = tx.last_insert_rowid();
              tx.commit()?;
              return Ok(Ok(RawShare {
                id,
                user_id,
                public_id,
                created_at: now_s,
              }));
            }
            Err(e) if is_unique_violation(&e) => {
              tracing::warn!(user_id, "public share id collision, retrying");
            }
            Err(e) => return Err(e.into()),
          }
        }
        Ok(Err(CoreError::PublicIdExhausted))
      })
      .await??;

    raw.into_share()
  }

  async fn delete_share(&self, id: i64, user_id: i64) -> Result<u64> {
    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM share WHERE id = ?1 AND user_id = ?2",
          rusqlite::params![id, user_id],
        )?)
      })
      .await?;
    Ok(n as u64)
  }

  async fn list_shares(&self, user_id: i64) -> Result<Vec<Share>> {
    let raws: Vec<RawShare> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SHARE_COLUMNS} FROM share WHERE user_id = ?1 ORDER BY id ASC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![user_id], RawShare::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawShare::into_share).collect()
  }

  async fn get_user_id_by_public_id(&self, public_id: &str) -> Result<Option<i64>> {
    let public_id = public_id.to_owned();

    let user_id = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT user_id FROM share WHERE public_id = ?1",
            rusqlite::params![public_id],
            |row| row.get(0),
          )
          .optional()?)
      })
      .await?;
    Ok(user_id)
  }
}
