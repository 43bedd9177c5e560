use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{Datelike, NaiveDate};
use tracing::{debug, info};

use super::domain::{
    ApplicationId, BulkEnrollment, EnrolledStudent, EnrollmentCandidate, EnrollmentFilter,
    EnrollmentStatus, SkippedCandidate, StudentId,
};
use super::error::AdmissionError;
use super::ids::{self, Sequence};
use crate::config::DEFAULT_STUDENT_ID_PREFIX;

/// Append-only register of enrolled students.
///
/// Student ids come from one counter owned by the registry and advanced once
/// per allocation under the registry lock, for single and bulk enrollment
/// alike. At most one enrollment exists per application.
#[derive(Debug)]
pub struct EnrollmentRegistry {
    prefix: String,
    state: Mutex<RegistryState>,
}

#[derive(Debug, Default)]
struct RegistryState {
    students: Vec<EnrolledStudent>,
    by_application: HashMap<ApplicationId, usize>,
    sequence: Sequence,
}

impl RegistryState {
    fn enroll(
        &mut self,
        prefix: &str,
        candidate: EnrollmentCandidate,
        enrollment_date: NaiveDate,
    ) -> Result<EnrolledStudent, AdmissionError> {
        if self.by_application.contains_key(&candidate.application_id) {
            return Err(AdmissionError::DuplicateEnrollment(candidate.application_id));
        }

        let student = EnrolledStudent {
            student_id: ids::student_id(prefix, enrollment_date.year(), self.sequence.advance()),
            application_id: candidate.application_id,
            student_name: candidate.student_name,
            course: candidate.course,
            enrollment_date,
            enrollment_status: EnrollmentStatus::Completed,
            fee_paid: candidate.paid_amount,
            total_fee: candidate.offer_amount,
        };

        let position = self.students.len();
        self.by_application
            .insert(student.application_id.clone(), position);
        self.students.push(student.clone());
        Ok(student)
    }
}

impl Default for EnrollmentRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_STUDENT_ID_PREFIX)
    }
}

impl EnrollmentRegistry {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            state: Mutex::new(RegistryState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enroll one candidate. Fails without touching state if the application
    /// already holds an enrollment.
    pub fn enroll(
        &self,
        candidate: EnrollmentCandidate,
        enrollment_date: NaiveDate,
    ) -> Result<EnrolledStudent, AdmissionError> {
        let application_id = candidate.application_id.clone();
        match self.lock().enroll(&self.prefix, candidate, enrollment_date) {
            Ok(student) => {
                info!(
                    student_id = %student.student_id,
                    application_id = %student.application_id,
                    balance = student.balance(),
                    "student enrolled"
                );
                Ok(student)
            }
            Err(error) => {
                debug!(application_id = %application_id, %error, "enrollment refused");
                Err(error)
            }
        }
    }

    /// Enroll a batch under a single lock. Every enrolled candidate receives
    /// its own sequence number; repeats and already-enrolled applications are
    /// reported as skipped.
    pub fn bulk_enroll(
        &self,
        candidates: Vec<EnrollmentCandidate>,
        enrollment_date: NaiveDate,
    ) -> BulkEnrollment {
        let mut outcome = BulkEnrollment::default();
        let mut state = self.lock();

        for candidate in candidates {
            let application_id = candidate.application_id.clone();
            match state.enroll(&self.prefix, candidate, enrollment_date) {
                Ok(student) => outcome.enrolled.push(student),
                Err(error) => outcome.skipped.push(SkippedCandidate {
                    application_id,
                    reason: error.to_string(),
                }),
            }
        }
        drop(state);

        info!(
            enrolled = outcome.enrolled.len(),
            skipped = outcome.skipped.len(),
            "bulk enrollment finished"
        );
        outcome
    }

    pub fn get(&self, student_id: &StudentId) -> Result<EnrolledStudent, AdmissionError> {
        self.lock()
            .students
            .iter()
            .find(|student| &student.student_id == student_id)
            .cloned()
            .ok_or_else(|| AdmissionError::not_found("student", student_id))
    }

    pub fn for_application(&self, application_id: &ApplicationId) -> Option<EnrolledStudent> {
        let state = self.lock();
        state
            .by_application
            .get(application_id)
            .map(|position| state.students[*position].clone())
    }

    pub fn is_enrolled(&self, application_id: &ApplicationId) -> bool {
        self.lock().by_application.contains_key(application_id)
    }

    pub fn list(&self, filter: &EnrollmentFilter) -> Vec<EnrolledStudent> {
        self.lock()
            .students
            .iter()
            .filter(|student| filter.matches(student))
            .cloned()
            .collect()
    }

    pub fn snapshot(&self) -> Vec<EnrolledStudent> {
        self.lock().students.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
