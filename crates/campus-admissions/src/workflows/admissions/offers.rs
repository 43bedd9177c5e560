use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use tracing::{debug, info};

use super::applications::ApplicationStore;
use super::domain::{
    AcceptanceStatus, ApplicationId, ApplicationStatus, CreateOffer, EffectiveAcceptance, Offer,
    OfferFilter, OfferId, OfferStatus, OfferView,
};
use super::error::AdmissionError;
use super::ids::{self, Sequence};

/// Acceptance state of `offer` as seen on `today`.
///
/// An offer is `expired` once `today` is past its expiry date, whatever was
/// stored. The projection is never written back to the offer.
pub fn effective_status(offer: &Offer, today: NaiveDate) -> EffectiveAcceptance {
    if today > offer.expiry_date {
        EffectiveAcceptance::Expired
    } else {
        offer.acceptance_status.into()
    }
}

/// Creates and manages at most one offer per approved application.
#[derive(Debug)]
pub struct OfferEngine {
    applications: Arc<ApplicationStore>,
    state: Mutex<OfferState>,
}

#[derive(Debug, Default)]
struct OfferState {
    offers: Vec<Offer>,
    by_id: HashMap<OfferId, usize>,
    by_application: HashMap<ApplicationId, usize>,
    sequence: Sequence,
}

impl OfferState {
    fn get_mut(&mut self, id: &OfferId) -> Result<&mut Offer, AdmissionError> {
        let position = *self
            .by_id
            .get(id)
            .ok_or_else(|| AdmissionError::not_found("offer", id))?;
        Ok(&mut self.offers[position])
    }
}

impl OfferEngine {
    pub fn new(applications: Arc<ApplicationStore>) -> Self {
        Self {
            applications,
            state: Mutex::new(OfferState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, OfferState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn create_offer(&self, command: CreateOffer) -> Result<Offer, AdmissionError> {
        let application = self.applications.get(&command.application_id)?;
        if application.status != ApplicationStatus::Approved {
            debug!(
                application_id = %application.application_id,
                status = application.status.label(),
                "offer refused for unapproved application"
            );
            return Err(AdmissionError::ApplicationNotApproved(
                application.application_id,
            ));
        }

        let final_amount = ids::final_amount(command.fee_amount, command.scholarship)?;
        if command.expiry_date < command.offer_date {
            return Err(AdmissionError::InvalidIntake {
                field: "expiry_date",
                reason: "must not precede the offer date",
            });
        }

        // Approval is terminal, so the check above cannot go stale while we
        // wait for the offer lock. Duplicate detection must happen under it.
        let mut state = self.lock();
        if state.by_application.contains_key(&application.application_id) {
            debug!(application_id = %application.application_id, "duplicate offer refused");
            return Err(AdmissionError::DuplicateOffer(application.application_id));
        }

        let offer = Offer {
            offer_id: ids::offer_id(state.sequence.advance()),
            application_id: application.application_id,
            student_name: application.student_name,
            course: application.course,
            fee_amount: command.fee_amount,
            scholarship: command.scholarship,
            final_amount,
            offer_date: command.offer_date,
            expiry_date: command.expiry_date,
            status: command.status,
            acceptance_status: AcceptanceStatus::Pending,
        };

        let position = state.offers.len();
        state.offers.push(offer.clone());
        state.by_id.insert(offer.offer_id.clone(), position);
        state
            .by_application
            .insert(offer.application_id.clone(), position);

        info!(
            offer_id = %offer.offer_id,
            application_id = %offer.application_id,
            final_amount = offer.final_amount,
            status = offer.status.label(),
            "offer created"
        );
        Ok(offer)
    }

    /// Move a draft offer to `sent`.
    pub fn send(&self, offer_id: &OfferId) -> Result<Offer, AdmissionError> {
        let mut state = self.lock();
        let offer = state.get_mut(offer_id)?;
        if offer.status != OfferStatus::Draft {
            return Err(AdmissionError::InvalidTransition {
                entity: "offer",
                from: offer.status.label(),
                requested: OfferStatus::Sent.label(),
            });
        }

        offer.status = OfferStatus::Sent;
        info!(offer_id = %offer_id, "offer sent");
        Ok(offer.clone())
    }

    pub fn accept(&self, offer_id: &OfferId, today: NaiveDate) -> Result<Offer, AdmissionError> {
        self.respond(offer_id, today, AcceptanceStatus::Accepted)
    }

    pub fn reject(&self, offer_id: &OfferId, today: NaiveDate) -> Result<Offer, AdmissionError> {
        self.respond(offer_id, today, AcceptanceStatus::Rejected)
    }

    fn respond(
        &self,
        offer_id: &OfferId,
        today: NaiveDate,
        response: AcceptanceStatus,
    ) -> Result<Offer, AdmissionError> {
        let mut state = self.lock();
        let offer = state.get_mut(offer_id)?;

        match effective_status(offer, today) {
            EffectiveAcceptance::Pending => {
                offer.acceptance_status = response;
                info!(
                    offer_id = %offer_id,
                    response = response.label(),
                    "offer response recorded"
                );
                Ok(offer.clone())
            }
            EffectiveAcceptance::Expired => {
                debug!(
                    offer_id = %offer_id,
                    expiry_date = %offer.expiry_date,
                    "late offer response refused"
                );
                Err(AdmissionError::OfferExpired {
                    offer_id: offer_id.clone(),
                    expiry_date: offer.expiry_date,
                })
            }
            settled => Err(AdmissionError::InvalidTransition {
                entity: "offer",
                from: settled.label(),
                requested: response.label(),
            }),
        }
    }

    pub fn get(&self, offer_id: &OfferId) -> Result<Offer, AdmissionError> {
        let state = self.lock();
        state
            .by_id
            .get(offer_id)
            .map(|position| state.offers[*position].clone())
            .ok_or_else(|| AdmissionError::not_found("offer", offer_id))
    }

    pub fn for_application(&self, application_id: &ApplicationId) -> Option<Offer> {
        let state = self.lock();
        state
            .by_application
            .get(application_id)
            .map(|position| state.offers[*position].clone())
    }

    /// Offers in creation order with their acceptance state as of `today`.
    pub fn list(&self, filter: &OfferFilter, today: NaiveDate) -> Vec<OfferView> {
        self.lock()
            .offers
            .iter()
            .filter_map(|offer| {
                let effective_status = effective_status(offer, today);
                filter.matches(offer, effective_status).then(|| OfferView {
                    offer: offer.clone(),
                    effective_status,
                })
            })
            .collect()
    }

    /// Point-in-time copy of every offer, for read-only joins.
    pub fn snapshot(&self) -> Vec<Offer> {
        self.lock().offers.clone()
    }
}
