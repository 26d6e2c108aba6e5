//! SQL schema for the Goalkeepr SQLite store.
//!
//! Executed once at connection startup. The version lives in
//! `PRAGMA user_version` so later migrations can be gated on it.

/// Connection-level settings; applied to every connection before the schema.
pub const PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
PRAGMA synchronous  = NORMAL;
PRAGMA busy_timeout = 5000;
PRAGMA foreign_keys = ON;
";

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,       -- argon2 PHC string
    locked_until  TEXT,                -- RFC 3339 UTC or NULL
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS goals (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id           INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    goal              TEXT NOT NULL,
    due               TEXT NOT NULL,   -- YYYY-MM-DD; orders lexically
    visible_to_public INTEGER NOT NULL DEFAULT 0,
    achieved          INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS success_criteria (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    goal_id     INTEGER NOT NULL REFERENCES goals(id) ON DELETE CASCADE,
    user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    description TEXT NOT NULL,
    completed   INTEGER NOT NULL DEFAULT 0,
    position    INTEGER,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS branding (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
    title       TEXT,
    description TEXT
);

CREATE TABLE IF NOT EXISTS share (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    public_id  TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS goals_user_due_idx     ON goals(user_id, due);
CREATE INDEX IF NOT EXISTS criteria_goal_idx      ON success_criteria(goal_id);
CREATE INDEX IF NOT EXISTS share_user_idx         ON share(user_id);

PRAGMA user_version = 1;
";
