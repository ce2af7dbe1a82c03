//! Service layer for coursetrack
//!
//! Services encapsulate gating logic between callers (routing, module views)
//! and the repository layer:
//! - Precondition checks (locked sections, inactive enrollments)
//! - Event emission for UI subscriptions and audit
//! - The edge-triggered certificate check
//!
//! ## Architecture
//!
//! ```text
//! Module views / routing (thin)
//!     ↓
//! Service Layer (gating logic)
//!     ↓
//! Gateway traits → Repository Layer (db/*.rs)
//!     ↓
//! SQLite Database
//! ```

pub mod access_service;
pub mod events;
pub mod quiz_service;

// Re-exports
pub use access_service::{AccessService, CompletionOutcome};
pub use events::{EventBus, EventListener, LoggingEventListener, ProgressEvent};
pub use quiz_service::QuizAnswerStore;

use std::sync::Arc;

use crate::config::Config;
use crate::db::ProgressDb;
use crate::gateway::{CertificateIssuer, ProgressGateway, StoredCertificateIssuer};

/// Service container for dependency injection
///
/// Holds the access service with a shared database and event bus; quiz
/// answer stores are created per module instance via [`Services::quiz_store`].
pub struct Services {
    pub access: Arc<AccessService>,
    pub events: Arc<EventBus>,
    gateway: Arc<dyn ProgressGateway>,
}

impl Services {
    /// Create services with default settings
    pub fn new(db: Arc<ProgressDb>) -> Self {
        Self::with_config(db, &Config::default())
    }

    /// Create services honoring configuration (event capacity, certificate
    /// toggle)
    pub fn with_config(db: Arc<ProgressDb>, config: &Config) -> Self {
        let events = Arc::new(EventBus::with_capacity(config.event_capacity));
        let gateway: Arc<dyn ProgressGateway> = db.clone();
        let issuer: Arc<dyn CertificateIssuer> = Arc::new(StoredCertificateIssuer::new(db.clone()));

        let access = Arc::new(
            AccessService::new(db, gateway.clone(), issuer, events.clone())
                .with_certificates(config.issue_certificates),
        );

        Self { access, events, gateway }
    }

    /// Quiz answer store bound to one (learner, course, section) module
    /// instance
    pub fn quiz_store(
        &self,
        learner_id: impl Into<String>,
        course_id: impl Into<String>,
        section_id: impl Into<String>,
    ) -> QuizAnswerStore {
        QuizAnswerStore::new(
            self.gateway.clone(),
            self.events.clone(),
            learner_id,
            course_id,
            section_id,
        )
    }
}
