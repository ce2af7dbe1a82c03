//! Completion strategies per module kind
//!
//! Each module kind owns its own notion of "done", but every kind funnels
//! into the same access-controller contract. `ModuleKind::is_complete` is the
//! single dispatch point: it takes the module's interaction state and returns
//! whether the module may be marked complete.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::course::ModuleKind;

/// How long a quiz-gate advisory stays visible before auto-expiring
pub const ADVISORY_DURATION: Duration = Duration::from_secs(4);

/// Per-module interaction state, mirroring the `ModuleKind` variants.
///
/// This is UI-session state, not durable state: quiz answers are restored
/// from the quiz answer store on revisit, visited cards start empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InteractionState {
    CardReview {
        visited: BTreeSet<usize>,
    },
    QuizGated {
        /// Topic the learner is currently on (index into the kind's topic list)
        current_topic: usize,
        /// Answered question indices per topic name
        answered: BTreeMap<String, BTreeSet<usize>>,
        finished: bool,
    },
    FreeForm {
        finished: bool,
    },
    ResourceHub {
        finished: bool,
    },
}

impl InteractionState {
    /// Fresh state for a module of the given kind
    pub fn new_for(kind: &ModuleKind) -> Self {
        match kind {
            ModuleKind::CardReview { .. } => InteractionState::CardReview {
                visited: BTreeSet::new(),
            },
            ModuleKind::QuizGatedReading { .. } => InteractionState::QuizGated {
                current_topic: 0,
                answered: BTreeMap::new(),
                finished: false,
            },
            ModuleKind::FreeFormReading => InteractionState::FreeForm { finished: false },
            ModuleKind::ResourceHub => InteractionState::ResourceHub { finished: false },
        }
    }

    /// Record a card visit. Revisits and non-card states are no-ops.
    pub fn visit_card(&mut self, index: usize) {
        if let InteractionState::CardReview { visited } = self {
            visited.insert(index);
        }
    }

    /// Mirror an answered question into quiz-gated state
    pub fn record_topic_answer(&mut self, topic: &str, question_index: usize) {
        if let InteractionState::QuizGated { answered, .. } = self {
            answered.entry(topic.to_string()).or_default().insert(question_index);
        }
    }

    /// Explicit learner "finish" action
    pub fn finish(&mut self) {
        match self {
            InteractionState::QuizGated { finished, .. }
            | InteractionState::FreeForm { finished }
            | InteractionState::ResourceHub { finished } => *finished = true,
            InteractionState::CardReview { .. } => {}
        }
    }
}

impl ModuleKind {
    /// The completion predicate: is this module "done" given its interaction
    /// state? Pure; a kind/state mismatch is never complete.
    pub fn is_complete(&self, state: &InteractionState) -> bool {
        match (self, state) {
            (ModuleKind::CardReview { card_count }, InteractionState::CardReview { visited }) => {
                // Order of visits is irrelevant; out-of-range indices don't count
                visited.iter().filter(|&&i| i < *card_count).count() == *card_count
            }
            (
                ModuleKind::QuizGatedReading { topics },
                InteractionState::QuizGated { answered, finished, .. },
            ) => {
                *finished
                    && topics.iter().all(|t| {
                        topic_fully_answered(answered.get(&t.topic), t.question_count)
                    })
            }
            (ModuleKind::FreeFormReading, InteractionState::FreeForm { finished }) => *finished,
            (ModuleKind::ResourceHub, InteractionState::ResourceHub { finished }) => *finished,
            _ => false,
        }
    }
}

/// True iff every question index in `0..question_count` is answered
fn topic_fully_answered(answered: Option<&BTreeSet<usize>>, question_count: usize) -> bool {
    match answered {
        Some(set) => (0..question_count).all(|q| set.contains(&q)),
        None => question_count == 0,
    }
}

/// User-visible, auto-expiring advisory produced when a quiz-gated advance
/// is blocked. Not an error path: the caller shows it for `expires_after`
/// and leaves the module exactly where it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateAdvisory {
    pub message: String,
    pub expires_after: Duration,
}

impl GateAdvisory {
    fn unanswered(topic: &str, remaining: usize) -> Self {
        Self {
            message: format!(
                "Answer all questions in \"{}\" before continuing ({} remaining)",
                topic, remaining
            ),
            expires_after: ADVISORY_DURATION,
        }
    }
}

impl std::fmt::Display for GateAdvisory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Attempt to advance a quiz-gated module past its current topic.
///
/// Returns the new current topic index on success. A blocked advance returns
/// the advisory and mutates nothing; advancing while already on the last
/// topic leaves the index unchanged (the learner finishes explicitly from
/// there). Non-quiz-gated modules have nothing to advance.
pub fn try_advance(
    kind: &ModuleKind,
    state: &mut InteractionState,
) -> Result<usize, GateAdvisory> {
    let ModuleKind::QuizGatedReading { topics } = kind else {
        return Err(GateAdvisory {
            message: "This module has no topic gate".to_string(),
            expires_after: ADVISORY_DURATION,
        });
    };
    let InteractionState::QuizGated { current_topic, answered, .. } = state else {
        return Err(GateAdvisory {
            message: "This module has no topic gate".to_string(),
            expires_after: ADVISORY_DURATION,
        });
    };

    let Some(topic) = topics.get(*current_topic) else {
        return Ok(*current_topic);
    };

    let answered_here = answered.get(&topic.topic);
    if !topic_fully_answered(answered_here, topic.question_count) {
        let done = answered_here
            .map(|s| s.iter().filter(|&&q| q < topic.question_count).count())
            .unwrap_or(0);
        return Err(GateAdvisory::unanswered(
            &topic.topic,
            topic.question_count - done,
        ));
    }

    if *current_topic + 1 < topics.len() {
        *current_topic += 1;
    }
    Ok(*current_topic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::TopicQuiz;

    fn quiz_kind() -> ModuleKind {
        ModuleKind::QuizGatedReading {
            topics: vec![
                TopicQuiz { topic: "intro".to_string(), question_count: 2 },
                TopicQuiz { topic: "depth".to_string(), question_count: 1 },
            ],
        }
    }

    #[test]
    fn test_card_review_requires_every_card() {
        let kind = ModuleKind::CardReview { card_count: 3 };
        let mut state = InteractionState::new_for(&kind);

        state.visit_card(0);
        state.visit_card(1);
        assert!(!kind.is_complete(&state));

        // Revisits don't un-complete, out-of-range visits don't help
        state.visit_card(1);
        state.visit_card(9);
        assert!(!kind.is_complete(&state));

        state.visit_card(2);
        assert!(kind.is_complete(&state));
    }

    #[test]
    fn test_card_review_order_irrelevant() {
        let kind = ModuleKind::CardReview { card_count: 2 };
        let mut state = InteractionState::new_for(&kind);
        state.visit_card(1);
        state.visit_card(0);
        assert!(kind.is_complete(&state));
    }

    #[test]
    fn test_quiz_gate_blocks_advance_without_mutation() {
        let kind = quiz_kind();
        let mut state = InteractionState::new_for(&kind);
        state.record_topic_answer("intro", 0);

        let advisory = try_advance(&kind, &mut state).unwrap_err();
        assert!(advisory.message.contains("intro"));
        assert!(advisory.message.contains("1 remaining"));
        assert_eq!(advisory.expires_after, ADVISORY_DURATION);

        // Blocked advance left the topic index where it was
        let InteractionState::QuizGated { current_topic, .. } = &state else { unreachable!() };
        assert_eq!(*current_topic, 0);
    }

    #[test]
    fn test_quiz_gate_advances_when_fully_answered() {
        let kind = quiz_kind();
        let mut state = InteractionState::new_for(&kind);
        state.record_topic_answer("intro", 0);
        state.record_topic_answer("intro", 1);

        assert_eq!(try_advance(&kind, &mut state).unwrap(), 1);
        // Last topic: advancing again is a no-op even once answered
        state.record_topic_answer("depth", 0);
        assert_eq!(try_advance(&kind, &mut state).unwrap(), 1);
    }

    #[test]
    fn test_quiz_completion_needs_explicit_finish() {
        let kind = quiz_kind();
        let mut state = InteractionState::new_for(&kind);
        state.record_topic_answer("intro", 0);
        state.record_topic_answer("intro", 1);
        state.record_topic_answer("depth", 0);

        assert!(!kind.is_complete(&state));
        state.finish();
        assert!(kind.is_complete(&state));
    }

    #[test]
    fn test_quiz_finish_without_answers_is_incomplete() {
        let kind = quiz_kind();
        let mut state = InteractionState::new_for(&kind);
        state.finish();
        assert!(!kind.is_complete(&state));
    }

    #[test]
    fn test_free_form_and_resource_hub_finish() {
        for kind in [ModuleKind::FreeFormReading, ModuleKind::ResourceHub] {
            let mut state = InteractionState::new_for(&kind);
            assert!(!kind.is_complete(&state));
            state.finish();
            assert!(kind.is_complete(&state));
        }
    }

    #[test]
    fn test_kind_state_mismatch_is_never_complete() {
        let kind = ModuleKind::FreeFormReading;
        let mut state = InteractionState::CardReview { visited: BTreeSet::new() };
        state.finish();
        assert!(!kind.is_complete(&state));
    }
}
