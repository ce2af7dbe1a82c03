//! Database schema definitions

use diesel::connection::SimpleConnection;
use diesel::SqliteConnection;
use tracing::info;

use crate::error::ProgressError;

/// Current schema version for migrations
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema
pub fn init_schema(conn: &mut SqliteConnection) -> Result<(), ProgressError> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        info!("Creating new database schema v{}", SCHEMA_VERSION);
        create_tables(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if current_version < SCHEMA_VERSION {
        info!("Migrating schema from v{} to v{}", current_version, SCHEMA_VERSION);
        migrate_schema(conn, current_version)?;
    } else {
        info!("Database schema is up to date (v{})", current_version);
    }

    Ok(())
}

/// Get current schema version (0 if not initialized)
fn get_schema_version(conn: &mut SqliteConnection) -> Result<i32, ProgressError> {
    conn.batch_execute("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)")
        .map_err(|e| ProgressError::Internal(format!("Failed to create schema_version table: {}", e)))?;

    use diesel::prelude::*;
    use super::diesel_schema::schema_version;

    let version: Option<i32> = schema_version::table
        .select(schema_version::version)
        .first(conn)
        .optional()
        .map_err(|e| ProgressError::Internal(format!("Failed to read schema_version: {}", e)))?;

    Ok(version.unwrap_or(0))
}

/// Set schema version
fn set_schema_version(conn: &mut SqliteConnection, version: i32) -> Result<(), ProgressError> {
    conn.batch_execute(&format!(
        "DELETE FROM schema_version; INSERT INTO schema_version (version) VALUES ({});",
        version
    ))
    .map_err(|e| ProgressError::Internal(format!("Failed to set schema_version: {}", e)))?;
    Ok(())
}

/// Create all tables
fn create_tables(conn: &mut SqliteConnection) -> Result<(), ProgressError> {
    conn.batch_execute(CATALOG_SCHEMA)
        .map_err(|e| ProgressError::Internal(format!("Failed to create catalog tables: {}", e)))?;

    conn.batch_execute(PROGRESS_SCHEMA)
        .map_err(|e| ProgressError::Internal(format!("Failed to create progress tables: {}", e)))?;

    conn.batch_execute(INDEXES_SCHEMA)
        .map_err(|e| ProgressError::Internal(format!("Failed to create indexes: {}", e)))?;

    Ok(())
}

/// Migrate schema from older version
fn migrate_schema(conn: &mut SqliteConnection, _from_version: i32) -> Result<(), ProgressError> {
    // Add migration steps here as the schema evolves
    set_schema_version(conn, SCHEMA_VERSION)?;
    Ok(())
}

/// Course catalog schema: courses, ordered sections, enrollments
const CATALOG_SCHEMA: &str = r#"
-- Published courses, immutable after publish
CREATE TABLE IF NOT EXISTS courses (
    id TEXT PRIMARY KEY NOT NULL,
    title TEXT NOT NULL,
    description TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Sections ordered by position (0-based, dense)
CREATE TABLE IF NOT EXISTS sections (
    id TEXT PRIMARY KEY NOT NULL,
    course_id TEXT NOT NULL,
    position INTEGER NOT NULL,
    title TEXT NOT NULL,
    module_kind TEXT NOT NULL,

    -- Kind-specific content (topic quizzes, card counts) as JSON
    content_json TEXT,

    UNIQUE (course_id, position),
    FOREIGN KEY (course_id) REFERENCES courses(id) ON DELETE CASCADE
);

-- Enrollment keyed by the (learner, course) pair
CREATE TABLE IF NOT EXISTS enrollments (
    learner_id TEXT NOT NULL,
    course_id TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',

    -- Display name used on the certificate, if the learner provided one
    display_name TEXT,

    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (learner_id, course_id)
);
"#;

/// Progress facts schema: natural-key upserts are the concurrency primitive
const PROGRESS_SCHEMA: &str = r#"
-- Durable fact that a learner finished a section of a course.
-- The composite key is the idempotency boundary: re-completion updates the
-- existing row, never duplicates it.
CREATE TABLE IF NOT EXISTS progress_records (
    learner_id TEXT NOT NULL,
    course_id TEXT NOT NULL,
    section_id TEXT NOT NULL,
    completed INTEGER NOT NULL DEFAULT 0,
    completed_at TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (learner_id, course_id, section_id)
);

-- Durable fact that a learner committed an answer to a question instance.
-- Participation only: correctness is shown transiently in the UI and is
-- never gating state.
CREATE TABLE IF NOT EXISTS quiz_answers (
    learner_id TEXT NOT NULL,
    course_id TEXT NOT NULL,
    section_id TEXT NOT NULL,
    topic TEXT NOT NULL,
    question_index INTEGER NOT NULL,
    answered INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (learner_id, course_id, section_id, topic, question_index)
);

-- Issued at most once per (learner, course), then immutable
CREATE TABLE IF NOT EXISTS certificates (
    learner_id TEXT NOT NULL,
    course_id TEXT NOT NULL,
    recipient_name TEXT NOT NULL,
    course_title TEXT NOT NULL,
    issued_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (learner_id, course_id)
);
"#;

/// Indexes for common lookups
const INDEXES_SCHEMA: &str = r#"
CREATE INDEX IF NOT EXISTS idx_sections_course ON sections(course_id, position);
CREATE INDEX IF NOT EXISTS idx_progress_learner_course ON progress_records(learner_id, course_id);
CREATE INDEX IF NOT EXISTS idx_quiz_answers_topic ON quiz_answers(learner_id, course_id, section_id, topic);
"#;
