//! Event system for progression operations
//!
//! Provides an event bus for notifying listeners about gating transitions.
//! Useful for:
//! - Audit logging
//! - UI subscriptions (unlock animations, completion toasts)
//! - Downstream notifications (certificate email)

use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Progression events emitted by services
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    SectionCompleted {
        learner_id: String,
        course_id: String,
        section_id: String,
        /// False when this was a re-completion of an already-complete section
        newly_completed: bool,
    },
    SectionUnlocked {
        learner_id: String,
        course_id: String,
        section_id: String,
    },
    QuizAnswerRecorded {
        learner_id: String,
        course_id: String,
        section_id: String,
        topic: String,
        question_index: usize,
    },
    CourseCompleted {
        learner_id: String,
        course_id: String,
        completed_sections: usize,
    },
    CertificateIssued {
        learner_id: String,
        course_id: String,
        recipient_name: String,
    },
}

/// Trait for event listeners
pub trait EventListener: Send + Sync {
    /// Handle an event
    fn on_event(&self, event: &ProgressEvent);
}

/// Event bus for broadcasting progression events
pub struct EventBus {
    sender: broadcast::Sender<ProgressEvent>,
}

impl EventBus {
    /// Create a new event bus with default capacity
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    /// Create a new event bus with specified capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Emit an event to all subscribers
    pub fn emit(&self, event: ProgressEvent) {
        trace!(event = ?event, "Emitting progress event");
        // Ignore send errors (no subscribers)
        let _ = self.sender.send(event);
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Logging event listener for audit trails
pub struct LoggingEventListener;

impl EventListener for LoggingEventListener {
    fn on_event(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::SectionCompleted { learner_id, section_id, newly_completed, .. } => {
                debug!(learner = %learner_id, section = %section_id, newly = newly_completed, "Section completed");
            }
            ProgressEvent::SectionUnlocked { learner_id, section_id, .. } => {
                debug!(learner = %learner_id, section = %section_id, "Section unlocked");
            }
            ProgressEvent::QuizAnswerRecorded { learner_id, topic, question_index, .. } => {
                debug!(learner = %learner_id, topic = %topic, question = question_index, "Quiz answer recorded");
            }
            ProgressEvent::CourseCompleted { learner_id, course_id, .. } => {
                debug!(learner = %learner_id, course = %course_id, "Course completed");
            }
            ProgressEvent::CertificateIssued { learner_id, course_id, recipient_name } => {
                debug!(learner = %learner_id, course = %course_id, recipient = %recipient_name, "Certificate issued");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_reaches_subscriber() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.emit(ProgressEvent::SectionUnlocked {
            learner_id: "ada".to_string(),
            course_id: "rust-101".to_string(),
            section_id: "s1".to_string(),
        });

        match rx.try_recv().unwrap() {
            ProgressEvent::SectionUnlocked { section_id, .. } => assert_eq!(section_id, "s1"),
            other => panic!("Unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_emit_without_subscribers_is_fine() {
        let bus = EventBus::new();
        assert_eq!(bus.subscriber_count(), 0);
        bus.emit(ProgressEvent::CourseCompleted {
            learner_id: "ada".to_string(),
            course_id: "rust-101".to_string(),
            completed_sections: 2,
        });
    }
}
