//! Coursetrack - course progression and completion-gating engine
//!
//! The stateful core of an e-learning platform: decides which section of a
//! course a learner may enter, what counts as "done" per module kind, and
//! when finishing every section triggers certificate issuance.
//!
//! ## Architecture
//!
//! - **Access controller** ([`services::AccessService`]): the gating state
//!   machine. Sections form a strict linear chain; section `i` unlocks only
//!   when section `i-1` has a completed progress record.
//! - **Completion strategies** ([`course::ModuleKind::is_complete`]): one
//!   predicate per module kind (card review, quiz-gated reading, free-form
//!   reading, resource hub), all funneling into the same controller contract.
//! - **Quiz answer store** ([`services::QuizAnswerStore`]): per-question
//!   participation facts for one module instance, write-through to storage.
//! - **Progress aggregator**: after every successful completion, re-checks
//!   completed-vs-total and fires certificate issuance on the transition
//!   into full completion - edge-triggered, at most once per (learner,
//!   course).
//!
//! ## Why Upsert-by-Natural-Key?
//!
//! Every durable fact (progress record, quiz answer, certificate) is keyed
//! by its full natural key and written with insert-or-update semantics.
//! Completions are independent asynchronous calls, so the transport
//! guarantees no ordering; the natural key is what makes duplicate or
//! out-of-order delivery converge on one row, with first-completion-wins on
//! `completed_at`. No locks, no versions.

pub mod completion;
pub mod config;
pub mod course;
pub mod db;
pub mod error;
pub mod gateway;
pub mod services;

// Re-exports
pub use completion::{try_advance, GateAdvisory, InteractionState, ADVISORY_DURATION};
pub use config::Config;
pub use course::{AccessState, Course, EnrollmentStatus, ModuleKind, Section, TopicQuiz};
pub use db::{Certificate, Enrollment, ProgressDb, ProgressRecord, ProgressUpsert, QuizAnswer};
pub use error::ProgressError;
pub use gateway::{CertificateIssuer, ProgressGateway, StoredCertificateIssuer};
pub use services::{AccessService, CompletionOutcome, EventBus, ProgressEvent, QuizAnswerStore, Services};
