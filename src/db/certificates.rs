//! Certificate record operations using Diesel
//!
//! A certificate is created at most once per (learner, course) and is
//! thereafter immutable. The primary key is the durable backstop beneath
//! the aggregator's edge trigger: issuing over an existing row returns the
//! existing record untouched.

use diesel::prelude::*;

use super::diesel_schema::certificates;
use super::models::{current_timestamp, Certificate};
use crate::error::ProgressError;

/// Get the certificate for a (learner, course) pair
pub fn get_certificate(
    conn: &mut SqliteConnection,
    learner_id: &str,
    course_id: &str,
) -> Result<Option<Certificate>, ProgressError> {
    certificates::table
        .filter(certificates::learner_id.eq(learner_id))
        .filter(certificates::course_id.eq(course_id))
        .first(conn)
        .optional()
        .map_err(|e| ProgressError::Internal(format!("Query failed: {}", e)))
}

/// Insert-at-most-once keyed by (learner, course)
///
/// Returns the certificate and whether this call created it.
pub fn issue_certificate(
    conn: &mut SqliteConnection,
    learner_id: &str,
    course_id: &str,
    recipient_name: &str,
    course_title: &str,
) -> Result<(Certificate, bool), ProgressError> {
    if let Some(existing) = get_certificate(conn, learner_id, course_id)? {
        return Ok((existing, false));
    }

    let record = Certificate {
        learner_id: learner_id.to_string(),
        course_id: course_id.to_string(),
        recipient_name: recipient_name.to_string(),
        course_title: course_title.to_string(),
        issued_at: current_timestamp(),
    };

    diesel::insert_into(certificates::table)
        .values(&record)
        .execute(conn)
        .map_err(|e| ProgressError::Internal(format!("Insert failed: {}", e)))?;

    Ok((record, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ProgressDb;

    #[test]
    fn test_at_most_once() {
        let db = ProgressDb::open_in_memory().unwrap();

        let (first, created) = db
            .with_conn(|conn| issue_certificate(conn, "ada", "rust-101", "Ada L.", "Rust Fundamentals"))
            .unwrap();
        assert!(created);

        let (second, created_again) = db
            .with_conn(|conn| issue_certificate(conn, "ada", "rust-101", "Someone Else", "Renamed"))
            .unwrap();
        assert!(!created_again);
        // The original record is immutable
        assert_eq!(second.recipient_name, "Ada L.");
        assert_eq!(second.issued_at, first.issued_at);
    }

    #[test]
    fn test_get_missing() {
        let db = ProgressDb::open_in_memory().unwrap();
        assert!(db.with_conn(|conn| get_certificate(conn, "ada", "rust-101")).unwrap().is_none());
    }
}
