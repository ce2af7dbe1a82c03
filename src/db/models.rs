//! Diesel model definitions for database tables
//!
//! - Queryable structs: for SELECT queries (reading data)
//! - Insertable structs: for INSERT queries (writing data)
//!
//! SQLite stores timestamps as ISO 8601 TEXT; booleans as INTEGER 0/1.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::diesel_schema::*;

// ============================================================================
// Timestamp Helpers
// ============================================================================

/// Get current UTC timestamp as ISO 8601 string for SQLite TEXT columns
pub fn current_timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

// ============================================================================
// Course Catalog Models
// ============================================================================

/// Course row from SELECT query
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = courses)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CourseRow {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// New course for INSERT
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = courses)]
pub struct NewCourse<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub description: Option<&'a str>,
}

/// Section row from SELECT query
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = sections)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SectionRow {
    pub id: String,
    pub course_id: String,
    pub position: i32,
    pub title: String,
    pub module_kind: String,
    pub content_json: Option<String>,
}

/// New section for INSERT
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = sections)]
pub struct NewSection<'a> {
    pub id: &'a str,
    pub course_id: &'a str,
    pub position: i32,
    pub title: &'a str,
    pub module_kind: &'a str,
    pub content_json: Option<&'a str>,
}

// ============================================================================
// Enrollment Models
// ============================================================================

/// Enrollment row from SELECT query
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = enrollments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Enrollment {
    pub learner_id: String,
    pub course_id: String,
    pub status: String,
    pub display_name: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// New enrollment for INSERT
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = enrollments)]
pub struct NewEnrollment<'a> {
    pub learner_id: &'a str,
    pub course_id: &'a str,
    pub status: &'a str,
    pub display_name: Option<&'a str>,
}

// ============================================================================
// Progress Models
// ============================================================================

/// Progress record row from SELECT query
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = progress_records)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ProgressRecord {
    pub learner_id: String,
    pub course_id: String,
    pub section_id: String,
    pub completed: i32,
    pub completed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl ProgressRecord {
    pub fn is_completed(&self) -> bool {
        self.completed == 1
    }
}

/// New progress record for INSERT
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = progress_records)]
pub struct NewProgressRecord<'a> {
    pub learner_id: &'a str,
    pub course_id: &'a str,
    pub section_id: &'a str,
    pub completed: i32,
    pub completed_at: Option<&'a str>,
}

// ============================================================================
// Quiz Answer Models
// ============================================================================

/// Quiz answer row from SELECT query
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = quiz_answers)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct QuizAnswer {
    pub learner_id: String,
    pub course_id: String,
    pub section_id: String,
    pub topic: String,
    pub question_index: i32,
    pub answered: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl QuizAnswer {
    pub fn is_answered(&self) -> bool {
        self.answered == 1
    }
}

/// New quiz answer for INSERT
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = quiz_answers)]
pub struct NewQuizAnswer<'a> {
    pub learner_id: &'a str,
    pub course_id: &'a str,
    pub section_id: &'a str,
    pub topic: &'a str,
    pub question_index: i32,
    pub answered: i32,
    pub updated_at: &'a str,
}

// ============================================================================
// Certificate Models
// ============================================================================

/// Issued certificate row
#[derive(Debug, Clone, Queryable, Selectable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = certificates)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Certificate {
    pub learner_id: String,
    pub course_id: String,
    pub recipient_name: String,
    pub course_title: String,
    pub issued_at: String,
}
