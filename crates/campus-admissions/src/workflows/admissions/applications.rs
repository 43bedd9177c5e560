use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Datelike;
use tracing::{debug, info};

use super::domain::{
    Application, ApplicationFilter, ApplicationId, ApplicationIntake, ApplicationStatus,
};
use super::error::AdmissionError;
use super::ids::{self, Sequence};

impl ApplicationStatus {
    /// Validate a requested move. Only review, approve and reject from a
    /// non-terminal state are legal; repeating the current state is not.
    pub fn transition(self, requested: ApplicationStatus) -> Result<Self, AdmissionError> {
        use ApplicationStatus::{Approved, Rejected, Submitted, UnderReview};

        let legal = !self.is_terminal()
            && match requested {
                UnderReview => self == Submitted,
                Approved | Rejected => true,
                Submitted => false,
            };

        if legal {
            Ok(requested)
        } else {
            Err(AdmissionError::InvalidTransition {
                entity: "application",
                from: self.label(),
                requested: requested.label(),
            })
        }
    }
}

/// Owner of every application and its review state machine.
///
/// All mutations run under one lock, so concurrent administrators see
/// serialized transitions. Applications are never deleted.
#[derive(Debug, Default)]
pub struct ApplicationStore {
    state: Mutex<ApplicationState>,
}

#[derive(Debug, Default)]
struct ApplicationState {
    records: Vec<Application>,
    index: HashMap<ApplicationId, usize>,
    sequence: Sequence,
}

impl ApplicationState {
    fn allocate_id(&mut self, year: i32) -> ApplicationId {
        loop {
            let candidate = ids::application_id(year, self.sequence.advance());
            if !self.index.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    fn get_mut(&mut self, id: &ApplicationId) -> Result<&mut Application, AdmissionError> {
        let position = *self
            .index
            .get(id)
            .ok_or_else(|| AdmissionError::not_found("application", id))?;
        Ok(&mut self.records[position])
    }
}

impl ApplicationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ApplicationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a new intake in the `submitted` state.
    pub fn submit(&self, intake: ApplicationIntake) -> Result<Application, AdmissionError> {
        let student_name = ids::required_text("student_name", &intake.student_name)?;
        let course = ids::required_text("course", &intake.course)?;
        let supplied_id = match intake.application_id {
            Some(id) => Some(ApplicationId(ids::required_text("application_id", &id.0)?)),
            None => None,
        };

        let mut state = self.lock();
        let application_id = match supplied_id {
            Some(id) if state.index.contains_key(&id) => {
                debug!(application_id = %id, "duplicate intake refused");
                return Err(AdmissionError::DuplicateApplication(id));
            }
            Some(id) => id,
            None => state.allocate_id(intake.applied_date.year()),
        };

        let application = Application {
            application_id: application_id.clone(),
            student_name,
            course,
            status: ApplicationStatus::Submitted,
            document_status: intake.document_status,
            applied_date: intake.applied_date,
        };

        let position = state.records.len();
        state.records.push(application.clone());
        state.index.insert(application_id, position);

        info!(
            application_id = %application.application_id,
            course = %application.course,
            "application submitted"
        );
        Ok(application)
    }

    pub fn review(&self, id: &ApplicationId) -> Result<Application, AdmissionError> {
        self.transition(id, ApplicationStatus::UnderReview)
    }

    pub fn approve(&self, id: &ApplicationId) -> Result<Application, AdmissionError> {
        self.transition(id, ApplicationStatus::Approved)
    }

    pub fn reject(&self, id: &ApplicationId) -> Result<Application, AdmissionError> {
        self.transition(id, ApplicationStatus::Rejected)
    }

    fn transition(
        &self,
        id: &ApplicationId,
        requested: ApplicationStatus,
    ) -> Result<Application, AdmissionError> {
        let mut state = self.lock();
        let application = state.get_mut(id)?;

        match application.status.transition(requested) {
            Ok(next) => {
                let previous = application.status;
                application.status = next;
                info!(
                    application_id = %id,
                    from = previous.label(),
                    to = next.label(),
                    "application transitioned"
                );
                Ok(application.clone())
            }
            Err(error) => {
                debug!(application_id = %id, %error, "application transition refused");
                Err(error)
            }
        }
    }

    pub fn get(&self, id: &ApplicationId) -> Result<Application, AdmissionError> {
        let state = self.lock();
        state
            .index
            .get(id)
            .map(|position| state.records[*position].clone())
            .ok_or_else(|| AdmissionError::not_found("application", id))
    }

    /// Applications in intake order that satisfy `filter`.
    pub fn list(&self, filter: &ApplicationFilter) -> Vec<Application> {
        self.lock()
            .records
            .iter()
            .filter(|application| filter.matches(application))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
