//! Enrollment CRUD operations using Diesel
//!
//! An enrollment is keyed by the (learner, course) pair. The gating engine
//! only consumes `active` enrollments; everything else is an access-denial
//! case handled upstream of the core.

use diesel::prelude::*;

use super::diesel_schema::enrollments;
use super::models::{current_timestamp, Enrollment, NewEnrollment};
use crate::course::EnrollmentStatus;
use crate::error::ProgressError;

/// Get an enrollment for a (learner, course) pair
pub fn get_enrollment(
    conn: &mut SqliteConnection,
    learner_id: &str,
    course_id: &str,
) -> Result<Option<Enrollment>, ProgressError> {
    enrollments::table
        .filter(enrollments::learner_id.eq(learner_id))
        .filter(enrollments::course_id.eq(course_id))
        .first(conn)
        .optional()
        .map_err(|e| ProgressError::Internal(format!("Query failed: {}", e)))
}

/// True iff the learner has an `active` enrollment in the course
pub fn is_active(
    conn: &mut SqliteConnection,
    learner_id: &str,
    course_id: &str,
) -> Result<bool, ProgressError> {
    Ok(get_enrollment(conn, learner_id, course_id)?
        .map(|e| e.status == EnrollmentStatus::Active.as_str())
        .unwrap_or(false))
}

/// Create or update an enrollment keyed by (learner, course)
pub fn upsert_enrollment(
    conn: &mut SqliteConnection,
    learner_id: &str,
    course_id: &str,
    status: EnrollmentStatus,
    display_name: Option<&str>,
) -> Result<Enrollment, ProgressError> {
    let existing = get_enrollment(conn, learner_id, course_id)?;

    if existing.is_some() {
        diesel::update(
            enrollments::table
                .filter(enrollments::learner_id.eq(learner_id))
                .filter(enrollments::course_id.eq(course_id)),
        )
        .set((
            enrollments::status.eq(status.as_str()),
            enrollments::display_name.eq(display_name),
            enrollments::updated_at.eq(current_timestamp()),
        ))
        .execute(conn)
        .map_err(|e| ProgressError::Internal(format!("Update failed: {}", e)))?;
    } else {
        let new_enrollment = NewEnrollment {
            learner_id,
            course_id,
            status: status.as_str(),
            display_name,
        };

        diesel::insert_into(enrollments::table)
            .values(&new_enrollment)
            .execute(conn)
            .map_err(|e| ProgressError::Internal(format!("Insert failed: {}", e)))?;
    }

    get_enrollment(conn, learner_id, course_id)?
        .ok_or_else(|| ProgressError::Internal("Failed to retrieve enrollment".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ProgressDb;

    #[test]
    fn test_upsert_and_activate() {
        let db = ProgressDb::open_in_memory().unwrap();

        db.with_conn(|conn| {
            upsert_enrollment(conn, "ada", "rust-101", EnrollmentStatus::Pending, None)
        })
        .unwrap();
        assert!(!db.with_conn(|conn| is_active(conn, "ada", "rust-101")).unwrap());

        let updated = db
            .with_conn(|conn| {
                upsert_enrollment(conn, "ada", "rust-101", EnrollmentStatus::Active, Some("Ada L."))
            })
            .unwrap();
        assert_eq!(updated.status, "active");
        assert_eq!(updated.display_name.as_deref(), Some("Ada L."));
        assert!(db.with_conn(|conn| is_active(conn, "ada", "rust-101")).unwrap());
    }

    #[test]
    fn test_missing_enrollment_is_inactive() {
        let db = ProgressDb::open_in_memory().unwrap();
        assert!(!db.with_conn(|conn| is_active(conn, "ghost", "rust-101")).unwrap());
    }
}
