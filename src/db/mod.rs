//! SQLite database module for progress and quiz-answer storage
//!
//! ## Architecture
//!
//! - Course catalog (courses, sections, enrollments) read by the access
//!   controller
//! - Progress facts (progress_records, quiz_answers, certificates) written
//!   through idempotent upserts keyed by their full natural keys
//!
//! The composite natural key is the concurrency primitive: duplicate or
//! out-of-order deliveries of the same completion converge on one row, and
//! `completed_at` is never regressed.

pub mod certificates;
pub mod courses;
pub mod diesel_schema;
pub mod enrollments;
pub mod models;
pub mod progress;
pub mod quiz_answers;
pub mod schema;

use std::path::Path;

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use tracing::{debug, info};

use crate::error::ProgressError;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConn = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Applies per-connection pragmas when the pool hands out a connection
#[derive(Debug, Clone, Copy)]
struct ConnectionPragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionPragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        // WAL for concurrent reads, foreign keys for catalog integrity
        conn.batch_execute(
            "PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA foreign_keys=ON; PRAGMA busy_timeout=5000;",
        )
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// SQLite database for course catalog and progress facts
pub struct ProgressDb {
    pool: DbPool,
}

impl ProgressDb {
    /// Open or create the progress database in the given directory
    pub fn open(data_dir: &Path) -> Result<Self, ProgressError> {
        Self::open_path(&data_dir.join("progress.db"))
    }

    /// Open or create the database at an explicit file path (pairs with
    /// [`crate::Config::db_path`])
    pub fn open_path(db_path: &Path) -> Result<Self, ProgressError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        info!("Opening SQLite database at {:?}", db_path);

        let url = db_path
            .to_str()
            .ok_or_else(|| ProgressError::Config(format!("Non-UTF8 path: {:?}", db_path)))?
            .to_string();

        Self::open_url(&url, 8)
    }

    /// Open an in-memory database (for testing)
    ///
    /// Pool size is pinned to 1: each `:memory:` connection would otherwise
    /// see its own empty database.
    pub fn open_in_memory() -> Result<Self, ProgressError> {
        debug!("Opening in-memory SQLite database");
        Self::open_url(":memory:", 1)
    }

    fn open_url(url: &str, max_size: u32) -> Result<Self, ProgressError> {
        let manager = ConnectionManager::<SqliteConnection>::new(url);
        let pool = Pool::builder()
            .max_size(max_size)
            .connection_customizer(Box::new(ConnectionPragmas))
            .build(manager)
            .map_err(|e| ProgressError::Connection(format!("Failed to build pool: {}", e)))?;

        let db = Self { pool };
        db.with_conn(schema::init_schema)?;

        Ok(db)
    }

    /// Run a closure with a pooled connection
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, ProgressError>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T, ProgressError>,
    {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| ProgressError::Connection(format!("Pool checkout failed: {}", e)))?;
        f(&mut conn)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats, ProgressError> {
        self.with_conn(|conn| {
            use diesel_schema::*;

            let course_count: i64 = courses::table
                .count()
                .get_result(conn)
                .map_err(|e| ProgressError::Internal(format!("Count query failed: {}", e)))?;

            let enrollment_count: i64 = enrollments::table
                .count()
                .get_result(conn)
                .map_err(|e| ProgressError::Internal(format!("Count query failed: {}", e)))?;

            let progress_count: i64 = progress_records::table
                .count()
                .get_result(conn)
                .map_err(|e| ProgressError::Internal(format!("Count query failed: {}", e)))?;

            let certificate_count: i64 = certificates::table
                .count()
                .get_result(conn)
                .map_err(|e| ProgressError::Internal(format!("Count query failed: {}", e)))?;

            Ok(DbStats {
                course_count: course_count as u64,
                enrollment_count: enrollment_count as u64,
                progress_count: progress_count as u64,
                certificate_count: certificate_count as u64,
            })
        })
    }
}

/// Database statistics
#[derive(Debug, Clone, serde::Serialize)]
pub struct DbStats {
    pub course_count: u64,
    pub enrollment_count: u64,
    pub progress_count: u64,
    pub certificate_count: u64,
}

// Re-exports
pub use courses::{CreateCourseInput, CreateSectionInput};
pub use models::{Certificate, Enrollment, ProgressRecord, QuizAnswer};
pub use progress::ProgressUpsert;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory_initializes_schema() {
        let db = ProgressDb::open_in_memory().unwrap();
        let stats = db.stats().unwrap();
        assert_eq!(stats.course_count, 0);
        assert_eq!(stats.progress_count, 0);
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let db = ProgressDb::open(dir.path()).unwrap();
        assert_eq!(db.stats().unwrap().certificate_count, 0);

        // Reopen is idempotent
        drop(db);
        let db = ProgressDb::open(dir.path()).unwrap();
        assert_eq!(db.stats().unwrap().course_count, 0);
    }
}
