//! Progress record operations using Diesel
//!
//! The (learner, course, section) triple is the natural key and the
//! idempotency boundary. Writing the same completion twice updates the one
//! existing row, and `completed_at` keeps the value from the first
//! successful completion - a later delivery with an earlier (or later)
//! timestamp never regresses it.

use diesel::prelude::*;
use serde::Serialize;

use super::diesel_schema::progress_records;
use super::models::{current_timestamp, NewProgressRecord, ProgressRecord};
use crate::error::ProgressError;

/// Result of a progress upsert
#[derive(Debug, Clone, Serialize)]
pub struct ProgressUpsert {
    pub record: ProgressRecord,
    /// True only when this write flipped the row to completed. Drives the
    /// edge-triggered certificate check.
    pub newly_completed: bool,
}

/// Get the progress record for one section
pub fn get_progress(
    conn: &mut SqliteConnection,
    learner_id: &str,
    course_id: &str,
    section_id: &str,
) -> Result<Option<ProgressRecord>, ProgressError> {
    progress_records::table
        .filter(progress_records::learner_id.eq(learner_id))
        .filter(progress_records::course_id.eq(course_id))
        .filter(progress_records::section_id.eq(section_id))
        .first(conn)
        .optional()
        .map_err(|e| ProgressError::Internal(format!("Query failed: {}", e)))
}

/// List all progress records for a (learner, course) pair
pub fn list_progress(
    conn: &mut SqliteConnection,
    learner_id: &str,
    course_id: &str,
) -> Result<Vec<ProgressRecord>, ProgressError> {
    progress_records::table
        .filter(progress_records::learner_id.eq(learner_id))
        .filter(progress_records::course_id.eq(course_id))
        .load(conn)
        .map_err(|e| ProgressError::Internal(format!("Query failed: {}", e)))
}

/// Count completed sections for a (learner, course) pair
pub fn completed_count(
    conn: &mut SqliteConnection,
    learner_id: &str,
    course_id: &str,
) -> Result<i64, ProgressError> {
    progress_records::table
        .filter(progress_records::learner_id.eq(learner_id))
        .filter(progress_records::course_id.eq(course_id))
        .filter(progress_records::completed.eq(1))
        .count()
        .get_result(conn)
        .map_err(|e| ProgressError::Internal(format!("Count query failed: {}", e)))
}

/// Idempotent insert-or-update keyed by (learner, course, section)
///
/// First-completion-wins: if the row is already completed, only `updated_at`
/// moves; `completed_at` keeps its original value and `newly_completed` is
/// false.
pub fn upsert_progress(
    conn: &mut SqliteConnection,
    learner_id: &str,
    course_id: &str,
    section_id: &str,
    completed: bool,
    completed_at: &str,
) -> Result<ProgressUpsert, ProgressError> {
    let existing = get_progress(conn, learner_id, course_id, section_id)?;

    let newly_completed = match existing {
        Some(ref record) if record.is_completed() => {
            // Re-completion: no-op with respect to completed_at
            diesel::update(
                progress_records::table
                    .filter(progress_records::learner_id.eq(learner_id))
                    .filter(progress_records::course_id.eq(course_id))
                    .filter(progress_records::section_id.eq(section_id)),
            )
            .set(progress_records::updated_at.eq(current_timestamp()))
            .execute(conn)
            .map_err(|e| ProgressError::Internal(format!("Update failed: {}", e)))?;

            false
        }
        Some(_) => {
            diesel::update(
                progress_records::table
                    .filter(progress_records::learner_id.eq(learner_id))
                    .filter(progress_records::course_id.eq(course_id))
                    .filter(progress_records::section_id.eq(section_id)),
            )
            .set((
                progress_records::completed.eq(completed as i32),
                progress_records::completed_at.eq(completed.then(|| completed_at.to_string())),
                progress_records::updated_at.eq(current_timestamp()),
            ))
            .execute(conn)
            .map_err(|e| ProgressError::Internal(format!("Update failed: {}", e)))?;

            completed
        }
        None => {
            let new_record = NewProgressRecord {
                learner_id,
                course_id,
                section_id,
                completed: completed as i32,
                completed_at: completed.then_some(completed_at),
            };

            diesel::insert_into(progress_records::table)
                .values(&new_record)
                .execute(conn)
                .map_err(|e| ProgressError::Internal(format!("Insert failed: {}", e)))?;

            completed
        }
    };

    let record = get_progress(conn, learner_id, course_id, section_id)?
        .ok_or_else(|| ProgressError::Internal("Failed to retrieve progress record".into()))?;

    Ok(ProgressUpsert { record, newly_completed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ProgressDb;

    #[test]
    fn test_first_completion_wins() {
        let db = ProgressDb::open_in_memory().unwrap();

        let first = db
            .with_conn(|conn| upsert_progress(conn, "ada", "rust-101", "s0", true, "2026-01-01T00:00:00Z"))
            .unwrap();
        assert!(first.newly_completed);
        assert_eq!(first.record.completed_at.as_deref(), Some("2026-01-01T00:00:00Z"));

        // Duplicate delivery with a different timestamp: no regression
        let second = db
            .with_conn(|conn| upsert_progress(conn, "ada", "rust-101", "s0", true, "2026-02-02T00:00:00Z"))
            .unwrap();
        assert!(!second.newly_completed);
        assert_eq!(second.record.completed_at.as_deref(), Some("2026-01-01T00:00:00Z"));

        // Exactly one row exists
        let all = db.with_conn(|conn| list_progress(conn, "ada", "rust-101")).unwrap();
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn test_completed_count() {
        let db = ProgressDb::open_in_memory().unwrap();
        let now = current_timestamp();

        db.with_conn(|conn| upsert_progress(conn, "ada", "rust-101", "s0", true, &now)).unwrap();
        db.with_conn(|conn| upsert_progress(conn, "ada", "rust-101", "s1", true, &now)).unwrap();
        db.with_conn(|conn| upsert_progress(conn, "ada", "other", "s0", true, &now)).unwrap();

        let count = db.with_conn(|conn| completed_count(conn, "ada", "rust-101")).unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_uncompleted_row_can_complete_later() {
        let db = ProgressDb::open_in_memory().unwrap();

        let first = db
            .with_conn(|conn| upsert_progress(conn, "ada", "rust-101", "s0", false, ""))
            .unwrap();
        assert!(!first.newly_completed);
        assert!(first.record.completed_at.is_none());

        let second = db
            .with_conn(|conn| upsert_progress(conn, "ada", "rust-101", "s0", true, "2026-03-03T00:00:00Z"))
            .unwrap();
        assert!(second.newly_completed);
        assert_eq!(second.record.completed_at.as_deref(), Some("2026-03-03T00:00:00Z"));
    }
}
