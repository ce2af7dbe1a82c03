//! Error types for coursetrack

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProgressError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Section is locked: {0}")]
    SectionLocked(String),

    #[error("No active enrollment for learner {learner_id} in course {course_id}")]
    NotEnrolled {
        learner_id: String,
        course_id: String,
    },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
