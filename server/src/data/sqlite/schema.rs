//! Database schema definition
//!
//! UUIDs, dates, and timestamps are stored as TEXT in canonical forms
//! (hyphenated lowercase, `YYYY-MM-DD`, RFC 3339 UTC with second
//! precision) so lexicographic comparison matches value ordering.

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Initial schema (version 1)
pub const SCHEMA: &str = r#"
CREATE TABLE schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL,
    applied_at INTEGER NOT NULL,
    description TEXT NOT NULL
);

CREATE TABLE user (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    surname TEXT NOT NULL,
    patronymic TEXT,
    email TEXT NOT NULL UNIQUE,
    login TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'client' CHECK (role IN ('client', 'admin')),
    registered_at TEXT NOT NULL
);

CREATE TABLE coach (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    surname TEXT NOT NULL,
    removed INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE lesson (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    max_students INTEGER NOT NULL,
    removed INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE subscription_type (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    lesson_quota INTEGER NOT NULL,
    period_days INTEGER NOT NULL,
    price REAL NOT NULL,
    removed INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE timetable (
    id TEXT PRIMARY KEY,
    coach_id TEXT NOT NULL REFERENCES coach(id),
    lesson_id TEXT NOT NULL REFERENCES lesson(id),
    starts_at TEXT NOT NULL,
    removed INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE client_subscription (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES user(id),
    plan_id TEXT NOT NULL REFERENCES subscription_type(id),
    paid_on TEXT NOT NULL,
    expires_on TEXT NOT NULL,
    removed INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE attendance (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES user(id),
    timetable_id TEXT NOT NULL REFERENCES timetable(id),
    subscription_id TEXT NOT NULL REFERENCES client_subscription(id),
    visited INTEGER NOT NULL DEFAULT 0,
    removed INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX idx_timetable_starts_at ON timetable(starts_at);
CREATE INDEX idx_client_subscription_user ON client_subscription(user_id);
CREATE INDEX idx_attendance_user ON attendance(user_id);
CREATE INDEX idx_attendance_timetable ON attendance(timetable_id);
CREATE INDEX idx_attendance_subscription ON attendance(subscription_id);
"#;
