//! Course catalog CRUD operations using Diesel
//!
//! Courses are immutable after publish; the gating engine only reads them.
//! Section positions are validated dense 0-based on insert so the access
//! chain derivation can index sections directly.

use diesel::prelude::*;
use serde::Deserialize;
use uuid::Uuid;

use super::diesel_schema::{courses, sections};
use super::models::{CourseRow, NewCourse, NewSection, SectionRow};
use crate::course::{Course, ModuleKind, Section};
use crate::error::ProgressError;

// ============================================================================
// Query Types
// ============================================================================

/// Input for publishing a course
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCourseInput {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub sections: Vec<CreateSectionInput>,
}

/// Input for one section of a course being published
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSectionInput {
    #[serde(default)]
    pub id: Option<String>,
    pub position: usize,
    pub title: String,
    pub kind: ModuleKind,
}

// ============================================================================
// Read Operations
// ============================================================================

/// Get a course row by ID
pub fn get_course_row(
    conn: &mut SqliteConnection,
    course_id: &str,
) -> Result<Option<CourseRow>, ProgressError> {
    courses::table
        .filter(courses::id.eq(course_id))
        .first(conn)
        .optional()
        .map_err(|e| ProgressError::Internal(format!("Query failed: {}", e)))
}

/// Get a course with its sections ordered by position
pub fn get_course(
    conn: &mut SqliteConnection,
    course_id: &str,
) -> Result<Option<Course>, ProgressError> {
    let row = match get_course_row(conn, course_id)? {
        Some(row) => row,
        None => return Ok(None),
    };

    let section_rows: Vec<SectionRow> = sections::table
        .filter(sections::course_id.eq(course_id))
        .order(sections::position.asc())
        .load(conn)
        .map_err(|e| ProgressError::Internal(format!("Query failed: {}", e)))?;

    let mut course_sections = Vec::with_capacity(section_rows.len());
    for s in section_rows {
        course_sections.push(section_from_row(s)?);
    }

    Ok(Some(Course {
        id: row.id,
        title: row.title,
        description: row.description,
        sections: course_sections,
    }))
}

/// List all published courses (rows only, without sections)
pub fn list_courses(
    conn: &mut SqliteConnection,
    limit: i64,
    offset: i64,
) -> Result<Vec<CourseRow>, ProgressError> {
    courses::table
        .order(courses::created_at.desc())
        .limit(limit)
        .offset(offset)
        .load(conn)
        .map_err(|e| ProgressError::Internal(format!("Query failed: {}", e)))
}

fn section_from_row(row: SectionRow) -> Result<Section, ProgressError> {
    let content = row.content_json.ok_or_else(|| {
        ProgressError::Internal(format!("Section {} has no module content", row.id))
    })?;
    let kind: ModuleKind = serde_json::from_str(&content)?;

    Ok(Section {
        id: row.id,
        position: row.position as usize,
        title: row.title,
        kind,
    })
}

// ============================================================================
// Write Operations
// ============================================================================

/// Publish a course with its sections
///
/// Positions must be dense and 0-based; the section order in the input does
/// not matter, only the declared positions.
pub fn create_course(
    conn: &mut SqliteConnection,
    input: CreateCourseInput,
) -> Result<Course, ProgressError> {
    validate_positions(&input.sections)?;

    if input.title.trim().is_empty() {
        return Err(ProgressError::InvalidInput("Course title is required".into()));
    }

    let course_id = input.id.unwrap_or_else(|| Uuid::new_v4().to_string());

    conn.transaction::<_, ProgressError, _>(|conn| {
        let new_course = NewCourse {
            id: &course_id,
            title: &input.title,
            description: input.description.as_deref(),
        };

        diesel::insert_into(courses::table)
            .values(&new_course)
            .execute(conn)
            .map_err(|e| ProgressError::Internal(format!("Insert failed: {}", e)))?;

        for section in &input.sections {
            let section_id = section
                .id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string());
            let content_json = serde_json::to_string(&section.kind)?;

            let new_section = NewSection {
                id: &section_id,
                course_id: &course_id,
                position: section.position as i32,
                title: &section.title,
                module_kind: section.kind.kind_tag(),
                content_json: Some(&content_json),
            };

            diesel::insert_into(sections::table)
                .values(&new_section)
                .execute(conn)
                .map_err(|e| ProgressError::Internal(format!("Insert failed: {}", e)))?;
        }

        Ok(())
    })?;

    get_course(conn, &course_id)?
        .ok_or_else(|| ProgressError::Internal("Failed to retrieve created course".into()))
}

/// Positions must be exactly 0..n with no gaps or duplicates
fn validate_positions(sections: &[CreateSectionInput]) -> Result<(), ProgressError> {
    let mut positions: Vec<usize> = sections.iter().map(|s| s.position).collect();
    positions.sort_unstable();

    for (expected, actual) in positions.iter().enumerate() {
        if *actual != expected {
            return Err(ProgressError::InvalidInput(format!(
                "Section positions must be dense and 0-based, got {:?}",
                positions
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ProgressDb;

    fn sample_input() -> CreateCourseInput {
        CreateCourseInput {
            id: Some("rust-101".to_string()),
            title: "Rust Fundamentals".to_string(),
            description: None,
            sections: vec![
                CreateSectionInput {
                    id: Some("s1".to_string()),
                    position: 1,
                    title: "Reading".to_string(),
                    kind: ModuleKind::FreeFormReading,
                },
                CreateSectionInput {
                    id: Some("s0".to_string()),
                    position: 0,
                    title: "Cards".to_string(),
                    kind: ModuleKind::CardReview { card_count: 3 },
                },
            ],
        }
    }

    #[test]
    fn test_create_and_get_course_ordered() {
        let db = ProgressDb::open_in_memory().unwrap();
        let course = db.with_conn(|conn| create_course(conn, sample_input())).unwrap();

        assert_eq!(course.id, "rust-101");
        assert_eq!(course.sections.len(), 2);
        // Ordered by position regardless of input order
        assert_eq!(course.sections[0].id, "s0");
        assert_eq!(course.sections[1].id, "s1");
        assert_eq!(course.sections[0].kind, ModuleKind::CardReview { card_count: 3 });
    }

    #[test]
    fn test_gapped_positions_rejected() {
        let db = ProgressDb::open_in_memory().unwrap();
        let mut input = sample_input();
        input.sections[0].position = 2;

        let err = db.with_conn(|conn| create_course(conn, input)).unwrap_err();
        assert!(matches!(err, ProgressError::InvalidInput(_)));
    }

    #[test]
    fn test_get_missing_course() {
        let db = ProgressDb::open_in_memory().unwrap();
        let course = db.with_conn(|conn| get_course(conn, "nope")).unwrap();
        assert!(course.is_none());
    }

    #[test]
    fn test_list_courses() {
        let db = ProgressDb::open_in_memory().unwrap();
        db.with_conn(|conn| create_course(conn, sample_input())).unwrap();

        let rows = db.with_conn(|conn| list_courses(conn, 10, 0)).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "Rust Fundamentals");
    }
}
