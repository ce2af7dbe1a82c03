//! External collaborator seams
//!
//! The gating engine talks to durable storage and the certificate renderer
//! through these traits. `ProgressDb` implements both over SQLite; tests
//! substitute stubs to exercise failure semantics.

use std::sync::Arc;

use crate::db::{self, Certificate, ProgressDb, ProgressRecord, ProgressUpsert, QuizAnswer};
use crate::error::ProgressError;

/// Durable, key-addressed storage for progress and quiz-answer facts.
///
/// All writes are insert-or-update by the full natural key; that idempotency
/// is what makes retries and out-of-order delivery safe without locks.
pub trait ProgressGateway: Send + Sync {
    /// Upsert keyed by (learner, course, section); first-completion-wins
    fn upsert_progress(
        &self,
        learner_id: &str,
        course_id: &str,
        section_id: &str,
        completed: bool,
        completed_at: &str,
    ) -> Result<ProgressUpsert, ProgressError>;

    /// All progress rows for a (learner, course) pair
    fn list_progress(
        &self,
        learner_id: &str,
        course_id: &str,
    ) -> Result<Vec<ProgressRecord>, ProgressError>;

    /// Upsert keyed by (learner, course, section, topic, question_index);
    /// returns true when the question was newly marked answered
    fn upsert_quiz_answer(
        &self,
        learner_id: &str,
        course_id: &str,
        section_id: &str,
        topic: &str,
        question_index: i32,
        answered: bool,
        updated_at: &str,
    ) -> Result<bool, ProgressError>;

    /// All answer rows for one topic of one module instance
    fn list_quiz_answers(
        &self,
        learner_id: &str,
        course_id: &str,
        section_id: &str,
        topic: &str,
    ) -> Result<Vec<QuizAnswer>, ProgressError>;
}

impl ProgressGateway for ProgressDb {
    fn upsert_progress(
        &self,
        learner_id: &str,
        course_id: &str,
        section_id: &str,
        completed: bool,
        completed_at: &str,
    ) -> Result<ProgressUpsert, ProgressError> {
        self.with_conn(|conn| {
            db::progress::upsert_progress(conn, learner_id, course_id, section_id, completed, completed_at)
        })
    }

    fn list_progress(
        &self,
        learner_id: &str,
        course_id: &str,
    ) -> Result<Vec<ProgressRecord>, ProgressError> {
        self.with_conn(|conn| db::progress::list_progress(conn, learner_id, course_id))
    }

    fn upsert_quiz_answer(
        &self,
        learner_id: &str,
        course_id: &str,
        section_id: &str,
        topic: &str,
        question_index: i32,
        answered: bool,
        updated_at: &str,
    ) -> Result<bool, ProgressError> {
        self.with_conn(|conn| {
            db::quiz_answers::upsert_quiz_answer(
                conn,
                learner_id,
                course_id,
                section_id,
                topic,
                question_index,
                answered,
                updated_at,
            )
        })
    }

    fn list_quiz_answers(
        &self,
        learner_id: &str,
        course_id: &str,
        section_id: &str,
        topic: &str,
    ) -> Result<Vec<QuizAnswer>, ProgressError> {
        self.with_conn(|conn| {
            db::quiz_answers::list_quiz_answers(conn, learner_id, course_id, section_id, topic)
        })
    }
}

/// Produces a durable certificate record for a learner who completed a
/// course. Called at most once per (learner, course).
pub trait CertificateIssuer: Send + Sync {
    fn issue_certificate(
        &self,
        learner_id: &str,
        course_id: &str,
        recipient_display_name: &str,
        course_title: &str,
    ) -> Result<Certificate, ProgressError>;
}

/// Certificate issuer that writes through the certificates table
pub struct StoredCertificateIssuer {
    db: Arc<ProgressDb>,
}

impl StoredCertificateIssuer {
    pub fn new(db: Arc<ProgressDb>) -> Self {
        Self { db }
    }
}

impl CertificateIssuer for StoredCertificateIssuer {
    fn issue_certificate(
        &self,
        learner_id: &str,
        course_id: &str,
        recipient_display_name: &str,
        course_title: &str,
    ) -> Result<Certificate, ProgressError> {
        self.db.with_conn(|conn| {
            let (record, _created) = db::certificates::issue_certificate(
                conn,
                learner_id,
                course_id,
                recipient_display_name,
                course_title,
            )?;
            Ok(record)
        })
    }
}
