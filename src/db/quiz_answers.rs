//! Quiz answer operations using Diesel
//!
//! Keyed by the (learner, course, section, topic, question_index) 5-tuple.
//! These are participation records: they track only that the learner
//! committed to an option, never whether the choice was right.

use diesel::prelude::*;

use super::diesel_schema::quiz_answers;
use super::models::{NewQuizAnswer, QuizAnswer};
use crate::error::ProgressError;

/// Get a single quiz answer record
pub fn get_quiz_answer(
    conn: &mut SqliteConnection,
    learner_id: &str,
    course_id: &str,
    section_id: &str,
    topic: &str,
    question_index: i32,
) -> Result<Option<QuizAnswer>, ProgressError> {
    quiz_answers::table
        .filter(quiz_answers::learner_id.eq(learner_id))
        .filter(quiz_answers::course_id.eq(course_id))
        .filter(quiz_answers::section_id.eq(section_id))
        .filter(quiz_answers::topic.eq(topic))
        .filter(quiz_answers::question_index.eq(question_index))
        .first(conn)
        .optional()
        .map_err(|e| ProgressError::Internal(format!("Query failed: {}", e)))
}

/// List all answer records for one topic of one module instance
pub fn list_quiz_answers(
    conn: &mut SqliteConnection,
    learner_id: &str,
    course_id: &str,
    section_id: &str,
    topic: &str,
) -> Result<Vec<QuizAnswer>, ProgressError> {
    quiz_answers::table
        .filter(quiz_answers::learner_id.eq(learner_id))
        .filter(quiz_answers::course_id.eq(course_id))
        .filter(quiz_answers::section_id.eq(section_id))
        .filter(quiz_answers::topic.eq(topic))
        .order(quiz_answers::question_index.asc())
        .load(conn)
        .map_err(|e| ProgressError::Internal(format!("Query failed: {}", e)))
}

/// Count answered questions for one topic
pub fn answered_count(
    conn: &mut SqliteConnection,
    learner_id: &str,
    course_id: &str,
    section_id: &str,
    topic: &str,
) -> Result<i64, ProgressError> {
    quiz_answers::table
        .filter(quiz_answers::learner_id.eq(learner_id))
        .filter(quiz_answers::course_id.eq(course_id))
        .filter(quiz_answers::section_id.eq(section_id))
        .filter(quiz_answers::topic.eq(topic))
        .filter(quiz_answers::answered.eq(1))
        .count()
        .get_result(conn)
        .map_err(|e| ProgressError::Internal(format!("Count query failed: {}", e)))
}

/// Idempotent insert-or-update keyed by the full 5-tuple
///
/// Returns true when this write newly marked the question answered;
/// re-answering only bumps `updated_at`.
pub fn upsert_quiz_answer(
    conn: &mut SqliteConnection,
    learner_id: &str,
    course_id: &str,
    section_id: &str,
    topic: &str,
    question_index: i32,
    answered: bool,
    updated_at: &str,
) -> Result<bool, ProgressError> {
    let existing = get_quiz_answer(conn, learner_id, course_id, section_id, topic, question_index)?;

    match existing {
        Some(ref record) if record.is_answered() => {
            diesel::update(
                quiz_answers::table
                    .filter(quiz_answers::learner_id.eq(learner_id))
                    .filter(quiz_answers::course_id.eq(course_id))
                    .filter(quiz_answers::section_id.eq(section_id))
                    .filter(quiz_answers::topic.eq(topic))
                    .filter(quiz_answers::question_index.eq(question_index)),
            )
            .set(quiz_answers::updated_at.eq(updated_at))
            .execute(conn)
            .map_err(|e| ProgressError::Internal(format!("Update failed: {}", e)))?;

            Ok(false)
        }
        Some(_) => {
            diesel::update(
                quiz_answers::table
                    .filter(quiz_answers::learner_id.eq(learner_id))
                    .filter(quiz_answers::course_id.eq(course_id))
                    .filter(quiz_answers::section_id.eq(section_id))
                    .filter(quiz_answers::topic.eq(topic))
                    .filter(quiz_answers::question_index.eq(question_index)),
            )
            .set((
                quiz_answers::answered.eq(answered as i32),
                quiz_answers::updated_at.eq(updated_at),
            ))
            .execute(conn)
            .map_err(|e| ProgressError::Internal(format!("Update failed: {}", e)))?;

            Ok(answered)
        }
        None => {
            let new_answer = NewQuizAnswer {
                learner_id,
                course_id,
                section_id,
                topic,
                question_index,
                answered: answered as i32,
                updated_at,
            };

            diesel::insert_into(quiz_answers::table)
                .values(&new_answer)
                .execute(conn)
                .map_err(|e| ProgressError::Internal(format!("Insert failed: {}", e)))?;

            Ok(answered)
        }
    }
}
