//! SQL schema for the Clubhouse SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS persons (
    person_id     TEXT PRIMARY KEY,
    last_name     TEXT NOT NULL,
    first_name    TEXT NOT NULL,
    patronymic    TEXT,
    date_of_birth TEXT NOT NULL,   -- YYYY-MM-DD
    gender        TEXT NOT NULL,   -- 'male' | 'female'
    email         TEXT NOT NULL UNIQUE,
    phone         TEXT NOT NULL,
    created_at    TEXT NOT NULL,   -- RFC 3339 UTC
    is_active     INTEGER NOT NULL DEFAULT 1,
    password_hash TEXT NOT NULL
);

-- Role tables. A row is active while date_to IS NULL; ended rows are kept.
CREATE TABLE IF NOT EXISTS administrators (
    role_id   TEXT PRIMARY KEY,
    person_id TEXT NOT NULL REFERENCES persons(person_id),
    date_from TEXT NOT NULL,
    date_to   TEXT
);

CREATE TABLE IF NOT EXISTS coaches (
    role_id          TEXT PRIMARY KEY,
    person_id        TEXT NOT NULL REFERENCES persons(person_id),
    date_from        TEXT NOT NULL,
    date_to          TEXT,
    position         TEXT NOT NULL DEFAULT 'instructor',
    coach_experience INTEGER NOT NULL DEFAULT 0,
    judge_category   TEXT,
    education        TEXT,
    additional_info  TEXT,
    achievements     TEXT
);

CREATE TABLE IF NOT EXISTS athletes (
    role_id       TEXT PRIMARY KEY,
    person_id     TEXT NOT NULL REFERENCES persons(person_id),
    date_from     TEXT NOT NULL,
    date_to       TEXT,
    playing_level TEXT NOT NULL
);

-- At most one active role of each kind per person.
CREATE UNIQUE INDEX IF NOT EXISTS administrators_active_idx
    ON administrators(person_id) WHERE date_to IS NULL;
CREATE UNIQUE INDEX IF NOT EXISTS coaches_active_idx
    ON coaches(person_id) WHERE date_to IS NULL;
CREATE UNIQUE INDEX IF NOT EXISTS athletes_active_idx
    ON athletes(person_id) WHERE date_to IS NULL;

CREATE TABLE IF NOT EXISTS training_groups (
    group_id         TEXT PRIMARY KEY,
    name             TEXT NOT NULL,
    description      TEXT,
    coach_id         TEXT NOT NULL REFERENCES coaches(role_id),
    min_participants INTEGER NOT NULL,
    max_participants INTEGER NOT NULL CHECK (max_participants <= 12),
    playing_level    TEXT NOT NULL,
    training_days    TEXT NOT NULL,   -- JSON array of weekday names
    training_time    TEXT NOT NULL,
    status           TEXT NOT NULL DEFAULT 'future',
    training_start   TEXT,
    CHECK (min_participants <= max_participants)
);

CREATE TABLE IF NOT EXISTS athlete_groups (
    athlete_id TEXT NOT NULL REFERENCES athletes(role_id),
    group_id   TEXT NOT NULL REFERENCES training_groups(group_id),
    PRIMARY KEY (athlete_id, group_id)
);

CREATE TABLE IF NOT EXISTS group_applications (
    application_id TEXT PRIMARY KEY,
    person_id      TEXT NOT NULL REFERENCES persons(person_id) ON DELETE CASCADE,
    group_id       TEXT NOT NULL REFERENCES training_groups(group_id) ON DELETE CASCADE,
    created_at     TEXT NOT NULL,
    status         TEXT NOT NULL DEFAULT 'new',
    playing_level  TEXT NOT NULL,
    comment        TEXT,
    reject_reason  TEXT,
    CHECK ((status = 'rejected') = (reject_reason IS NOT NULL))
);

CREATE INDEX IF NOT EXISTS training_groups_coach_idx  ON training_groups(coach_id);
CREATE INDEX IF NOT EXISTS athlete_groups_group_idx   ON athlete_groups(group_id);
CREATE INDEX IF NOT EXISTS group_applications_person_idx
    ON group_applications(person_id);
CREATE INDEX IF NOT EXISTS group_applications_group_idx
    ON group_applications(group_id);

PRAGMA user_version = 1;
";
