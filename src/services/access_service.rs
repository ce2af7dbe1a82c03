//! Section access controller and progress aggregator
//!
//! The gating state machine: derives Locked/Unlocked/Completed for every
//! section of a course, mediates `mark_complete`, and re-checks total
//! completion after each successful write. Certificate issuance is
//! edge-triggered: it fires only on the transition into "all sections
//! complete", never on re-reads of an already-complete course.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::course::{AccessState, Course, Section};
use crate::db::models::current_timestamp;
use crate::db::{self, Certificate, ProgressDb};
use crate::error::ProgressError;
use crate::gateway::{CertificateIssuer, ProgressGateway};

use super::events::{EventBus, ProgressEvent};

/// Result of a `mark_complete` call
#[derive(Debug, Clone, Serialize)]
pub struct CompletionOutcome {
    /// False when the section was already complete (idempotent re-completion)
    pub newly_completed: bool,
    pub completed_count: usize,
    pub total_sections: usize,
    pub course_completed: bool,
    /// Present when this completion triggered issuance
    pub certificate: Option<Certificate>,
}

/// Access controller for the strict linear section chain
pub struct AccessService {
    db: Arc<ProgressDb>,
    gateway: Arc<dyn ProgressGateway>,
    issuer: Arc<dyn CertificateIssuer>,
    events: Arc<EventBus>,
    issue_certificates: bool,
}

impl AccessService {
    pub fn new(
        db: Arc<ProgressDb>,
        gateway: Arc<dyn ProgressGateway>,
        issuer: Arc<dyn CertificateIssuer>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            db,
            gateway,
            issuer,
            events,
            issue_certificates: true,
        }
    }

    /// Disable or enable the certificate side effect (on by default)
    pub fn with_certificates(mut self, enabled: bool) -> Self {
        self.issue_certificates = enabled;
        self
    }

    // =========================================================================
    // Access Derivation
    // =========================================================================

    /// Derive access states for an ordered section list given the set of
    /// completed section IDs. Pure.
    ///
    /// Section 0 is always at least Unlocked; section i > 0 is reachable iff
    /// section i-1 is Completed. A completed record whose predecessor is not
    /// complete derives Locked: access follows predecessor state, never an
    /// anomalous row on its own.
    pub fn derive_states(sections: &[Section], completed: &HashSet<String>) -> Vec<AccessState> {
        let mut states = Vec::with_capacity(sections.len());
        let mut reachable = true;

        for section in sections {
            let state = if !reachable {
                AccessState::Locked
            } else if completed.contains(&section.id) {
                AccessState::Completed
            } else {
                AccessState::Unlocked
            };
            reachable = state == AccessState::Completed;
            states.push(state);
        }

        states
    }

    /// Access states for every section of a course, for one learner
    pub fn section_states(
        &self,
        learner_id: &str,
        course_id: &str,
    ) -> Result<Vec<AccessState>, ProgressError> {
        let course = self.load_course(course_id)?;
        let completed = self.completed_set(learner_id, &course)?;
        Ok(Self::derive_states(&course.sections, &completed))
    }

    /// Can the learner enter the section at `index`? Pure over the derivation;
    /// denies when the enrollment is not active or the index is out of range.
    /// Used to gate routing before a module renders.
    pub fn can_access(
        &self,
        learner_id: &str,
        course_id: &str,
        index: usize,
    ) -> Result<bool, ProgressError> {
        let active = self
            .db
            .with_conn(|conn| db::enrollments::is_active(conn, learner_id, course_id))?;
        if !active {
            return Ok(false);
        }

        let states = self.section_states(learner_id, course_id)?;
        Ok(states.get(index).map(|s| s.is_reachable()).unwrap_or(false))
    }

    // =========================================================================
    // Completion
    // =========================================================================

    /// Mark a section complete for a learner.
    ///
    /// Precondition: the section is reachable (not Locked). The write goes
    /// through the persistence gateway first; if it fails, nothing changes
    /// locally and the caller's module stays in its pre-completion state so
    /// the learner can retry. On success the next section unlocks and total
    /// completion is re-checked.
    pub fn mark_complete(
        &self,
        learner_id: &str,
        course_id: &str,
        section_id: &str,
    ) -> Result<CompletionOutcome, ProgressError> {
        let active = self
            .db
            .with_conn(|conn| db::enrollments::is_active(conn, learner_id, course_id))?;
        if !active {
            return Err(ProgressError::NotEnrolled {
                learner_id: learner_id.to_string(),
                course_id: course_id.to_string(),
            });
        }

        let course = self.load_course(course_id)?;
        let index = course
            .section_index(section_id)
            .ok_or_else(|| ProgressError::NotFound(format!("Section {}", section_id)))?;

        let completed = self.completed_set(learner_id, &course)?;
        let states = Self::derive_states(&course.sections, &completed);
        if !states[index].is_reachable() {
            return Err(ProgressError::SectionLocked(section_id.to_string()));
        }

        // The one durable write. On failure the error propagates and no
        // derived state has moved.
        let upsert = self.gateway.upsert_progress(
            learner_id,
            course_id,
            section_id,
            true,
            &current_timestamp(),
        )?;

        self.events.emit(ProgressEvent::SectionCompleted {
            learner_id: learner_id.to_string(),
            course_id: course_id.to_string(),
            section_id: section_id.to_string(),
            newly_completed: upsert.newly_completed,
        });

        if upsert.newly_completed {
            if let Some(next) = course.sections.get(index + 1) {
                self.events.emit(ProgressEvent::SectionUnlocked {
                    learner_id: learner_id.to_string(),
                    course_id: course_id.to_string(),
                    section_id: next.id.clone(),
                });
            }
        }

        self.aggregate(learner_id, &course, upsert.newly_completed)
    }

    /// Recompute completed-vs-total and run the edge-triggered certificate
    /// check. The trigger condition is "this write newly completed a section
    /// AND the count now equals the total": re-reads of an already-complete
    /// course never reach issuance.
    fn aggregate(
        &self,
        learner_id: &str,
        course: &Course,
        newly_completed: bool,
    ) -> Result<CompletionOutcome, ProgressError> {
        let completed = self.completed_set(learner_id, course)?;
        let completed_count = completed.len();
        let total_sections = course.total_sections();
        let course_completed = total_sections > 0 && completed_count == total_sections;

        let mut certificate = None;
        if course_completed && newly_completed {
            self.events.emit(ProgressEvent::CourseCompleted {
                learner_id: learner_id.to_string(),
                course_id: course.id.clone(),
                completed_sections: completed_count,
            });

            if self.issue_certificates {
                certificate = self.try_issue(learner_id, course);
            }
        }

        Ok(CompletionOutcome {
            newly_completed,
            completed_count,
            total_sections,
            course_completed,
            certificate,
        })
    }

    /// Issuance failure never rolls back the completion; the learner retries
    /// from a complete course and the durable key keeps it at-most-once.
    fn try_issue(&self, learner_id: &str, course: &Course) -> Option<Certificate> {
        let display_name = self
            .db
            .with_conn(|conn| db::enrollments::get_enrollment(conn, learner_id, &course.id))
            .ok()
            .flatten()
            .and_then(|e| e.display_name)
            .unwrap_or_else(|| learner_id.to_string());

        match self
            .issuer
            .issue_certificate(learner_id, &course.id, &display_name, &course.title)
        {
            Ok(record) => {
                info!(learner = %learner_id, course = %course.id, "Certificate issued");
                self.events.emit(ProgressEvent::CertificateIssued {
                    learner_id: learner_id.to_string(),
                    course_id: course.id.clone(),
                    recipient_name: record.recipient_name.clone(),
                });
                Some(record)
            }
            Err(e) => {
                warn!(learner = %learner_id, course = %course.id, error = %e, "Certificate issuance failed");
                None
            }
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn load_course(&self, course_id: &str) -> Result<Course, ProgressError> {
        self.db
            .with_conn(|conn| db::courses::get_course(conn, course_id))?
            .ok_or_else(|| ProgressError::NotFound(format!("Course {}", course_id)))
    }

    /// Completed section IDs for a (learner, course), restricted to sections
    /// that actually belong to the course
    fn completed_set(
        &self,
        learner_id: &str,
        course: &Course,
    ) -> Result<HashSet<String>, ProgressError> {
        let section_ids: HashSet<&str> = course.sections.iter().map(|s| s.id.as_str()).collect();

        let records = self.gateway.list_progress(learner_id, &course.id)?;
        Ok(records
            .into_iter()
            .filter(|r| r.is_completed() && section_ids.contains(r.section_id.as_str()))
            .map(|r| r.section_id)
            .collect())
    }
}
