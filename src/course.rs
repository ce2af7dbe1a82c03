//! Domain model: courses, sections, module kinds, access states
//!
//! A course is an ordered list of sections. Each section carries a module
//! kind tag that determines which completion strategy applies to it; the
//! kind-specific content itself is opaque to the gating engine.

use serde::{Deserialize, Serialize};

/// A published course: identifier, title, ordered sections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    /// Sections ordered by position (0-based, dense)
    pub sections: Vec<Section>,
}

impl Course {
    /// Find a section's index by ID
    pub fn section_index(&self, section_id: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.id == section_id)
    }

    pub fn total_sections(&self) -> usize {
        self.sections.len()
    }
}

/// One module/step of a course, sequentially ordered
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    /// 0-based order, strictly increasing, no gaps
    pub position: usize,
    pub title: String,
    pub kind: ModuleKind,
}

/// One embedded quiz within a quiz-gated module, keyed by topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicQuiz {
    pub topic: String,
    pub question_count: usize,
}

/// The interaction pattern a section follows, determining its completion
/// strategy. New module kinds add a variant here plus an `is_complete` arm;
/// the access controller never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ModuleKind {
    /// Complete once every card has been visited at least once
    CardReview { card_count: usize },
    /// Paginated by topic; each topic's quiz must be fully answered before
    /// advancing, and an explicit finish ends the module
    QuizGatedReading { topics: Vec<TopicQuiz> },
    /// Complete on explicit finish, no sub-gating
    FreeFormReading,
    /// Terminal resource module, complete on explicit finish
    ResourceHub,
}

impl ModuleKind {
    /// Stable tag string, used as the `module_kind` column value
    pub fn kind_tag(&self) -> &'static str {
        match self {
            ModuleKind::CardReview { .. } => "card-review",
            ModuleKind::QuizGatedReading { .. } => "quiz-gated-reading",
            ModuleKind::FreeFormReading => "free-form-reading",
            ModuleKind::ResourceHub => "resource-hub",
        }
    }
}

/// Access state of a section for one learner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessState {
    Locked,
    Unlocked,
    Completed,
}

impl AccessState {
    /// Completed subsumes Unlocked: a completed section remains navigable
    pub fn is_reachable(&self) -> bool {
        !matches!(self, AccessState::Locked)
    }
}

/// Enrollment status; the gating engine only consumes `Active`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Pending,
    Active,
    Cancelled,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Pending => "pending",
            EnrollmentStatus::Active => "active",
            EnrollmentStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(EnrollmentStatus::Pending),
            "active" => Some(EnrollmentStatus::Active),
            "cancelled" => Some(EnrollmentStatus::Cancelled),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags() {
        assert_eq!(ModuleKind::CardReview { card_count: 3 }.kind_tag(), "card-review");
        assert_eq!(ModuleKind::FreeFormReading.kind_tag(), "free-form-reading");
        assert_eq!(ModuleKind::ResourceHub.kind_tag(), "resource-hub");
    }

    #[test]
    fn test_kind_json_round_trip() {
        let kind = ModuleKind::QuizGatedReading {
            topics: vec![TopicQuiz {
                topic: "ownership".to_string(),
                question_count: 3,
            }],
        };
        let json = serde_json::to_string(&kind).unwrap();
        assert!(json.contains("quiz-gated-reading"));
        let back: ModuleKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, kind);
    }

    #[test]
    fn test_access_state_reachable() {
        assert!(!AccessState::Locked.is_reachable());
        assert!(AccessState::Unlocked.is_reachable());
        assert!(AccessState::Completed.is_reachable());
    }

    #[test]
    fn test_enrollment_status_parse() {
        assert_eq!(EnrollmentStatus::parse("active"), Some(EnrollmentStatus::Active));
        assert_eq!(EnrollmentStatus::parse("bogus"), None);
    }
}
