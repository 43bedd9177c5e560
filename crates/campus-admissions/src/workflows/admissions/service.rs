use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Days, NaiveDate};
use tracing::warn;

use super::applications::ApplicationStore;
use super::domain::{
    Application, ApplicationFilter, ApplicationId, ApplicationIntake, BulkEnrollment,
    CreateOffer, EffectiveAcceptance, EnrolledStudent, EnrollmentCandidate, EnrollmentFilter,
    Offer, OfferFilter, OfferId, OfferStatus, OfferView,
};
use super::eligibility::resolve_candidates;
use super::enrollment::EnrollmentRegistry;
use super::error::AdmissionError;
use super::offers::{effective_status, OfferEngine};
use super::ports::{AdmissionNotice, AdmissionNotifier, CourseCatalog, PaymentFeed};
use crate::config::AdmissionsConfig;

/// Facade wiring the three registries to the payment feed, course catalog
/// and notification collaborators.
pub struct AdmissionsService<F, C, N> {
    applications: Arc<ApplicationStore>,
    offers: Arc<OfferEngine>,
    enrollments: Arc<EnrollmentRegistry>,
    payments: Arc<F>,
    catalog: Arc<C>,
    notifier: Arc<N>,
    config: AdmissionsConfig,
}

impl<F, C, N> AdmissionsService<F, C, N>
where
    F: PaymentFeed + 'static,
    C: CourseCatalog + 'static,
    N: AdmissionNotifier + 'static,
{
    pub fn new(
        payments: Arc<F>,
        catalog: Arc<C>,
        notifier: Arc<N>,
        config: AdmissionsConfig,
    ) -> Self {
        let applications = Arc::new(ApplicationStore::new());
        let offers = Arc::new(OfferEngine::new(applications.clone()));
        let enrollments = Arc::new(EnrollmentRegistry::new(config.student_id_prefix.clone()));

        Self {
            applications,
            offers,
            enrollments,
            payments,
            catalog,
            notifier,
            config,
        }
    }

    pub fn applications(&self) -> &ApplicationStore {
        &self.applications
    }

    pub fn offers(&self) -> &OfferEngine {
        &self.offers
    }

    pub fn enrollments(&self) -> &EnrollmentRegistry {
        &self.enrollments
    }

    pub fn submit(&self, intake: ApplicationIntake) -> Result<Application, AdmissionError> {
        self.applications.submit(intake)
    }

    pub fn review(&self, id: &ApplicationId) -> Result<Application, AdmissionError> {
        self.applications.review(id)
    }

    pub fn approve(&self, id: &ApplicationId) -> Result<Application, AdmissionError> {
        self.applications.approve(id)
    }

    pub fn reject_application(&self, id: &ApplicationId) -> Result<Application, AdmissionError> {
        self.applications.reject(id)
    }

    pub fn get_application(&self, id: &ApplicationId) -> Result<Application, AdmissionError> {
        self.applications.get(id)
    }

    pub fn list_applications(&self, filter: &ApplicationFilter) -> Vec<Application> {
        self.applications.list(filter)
    }

    pub fn create_offer(&self, command: CreateOffer) -> Result<Offer, AdmissionError> {
        let offer = self.offers.create_offer(command)?;
        if offer.status == OfferStatus::Sent {
            self.notify_offer_sent(&offer);
        }
        Ok(offer)
    }

    /// Create an offer priced from the course catalog, expiring after the
    /// configured validity window.
    pub fn create_catalog_offer(
        &self,
        application_id: &ApplicationId,
        scholarship: u64,
        offer_date: NaiveDate,
        status: OfferStatus,
    ) -> Result<Offer, AdmissionError> {
        let application = self.applications.get(application_id)?;
        let fee_amount = self
            .catalog
            .course_fee(&application.course)
            .ok_or_else(|| AdmissionError::not_found("course", &application.course))?;
        let expiry_date = offer_date
            .checked_add_days(Days::new(u64::from(self.config.offer_validity_days)))
            .ok_or(AdmissionError::InvalidIntake {
                field: "offer_date",
                reason: "validity window runs past the last representable date",
            })?;

        self.create_offer(CreateOffer {
            application_id: application.application_id,
            fee_amount,
            scholarship,
            offer_date,
            expiry_date,
            status,
        })
    }

    pub fn send_offer(&self, offer_id: &OfferId) -> Result<Offer, AdmissionError> {
        let offer = self.offers.send(offer_id)?;
        self.notify_offer_sent(&offer);
        Ok(offer)
    }

    pub fn accept_offer(
        &self,
        offer_id: &OfferId,
        today: NaiveDate,
    ) -> Result<Offer, AdmissionError> {
        self.offers.accept(offer_id, today)
    }

    pub fn reject_offer(
        &self,
        offer_id: &OfferId,
        today: NaiveDate,
    ) -> Result<Offer, AdmissionError> {
        self.offers.reject(offer_id, today)
    }

    pub fn list_offers(&self, filter: &OfferFilter, today: NaiveDate) -> Vec<OfferView> {
        self.offers.list(filter, today)
    }

    /// Candidates ready for enrollment on `today`, recomputed from the
    /// current offers, payments and enrollments.
    pub fn list_eligible_for_enrollment(&self, today: NaiveDate) -> Vec<EnrollmentCandidate> {
        let offers = self.offers.snapshot();
        let payments = self.payments.payments();
        let enrolled = self.enrollments.snapshot();
        resolve_candidates(&offers, &payments, &enrolled, today)
    }

    pub fn enroll(
        &self,
        candidate: EnrollmentCandidate,
        enrollment_date: NaiveDate,
    ) -> Result<EnrolledStudent, AdmissionError> {
        let student = self.enrollments.enroll(candidate, enrollment_date)?;
        self.notify_enrolled(&student);
        Ok(student)
    }

    /// Enroll one application by id, checking the whole chain: not yet
    /// enrolled, offer present, accepted and unexpired, payment completed.
    pub fn enroll_application(
        &self,
        application_id: &ApplicationId,
        today: NaiveDate,
    ) -> Result<EnrolledStudent, AdmissionError> {
        if self.enrollments.is_enrolled(application_id) {
            return Err(AdmissionError::DuplicateEnrollment(application_id.clone()));
        }

        let offer = self
            .offers
            .for_application(application_id)
            .ok_or_else(|| AdmissionError::not_found("offer", application_id))?;

        match effective_status(&offer, today) {
            EffectiveAcceptance::Accepted => {}
            EffectiveAcceptance::Expired => {
                return Err(AdmissionError::OfferExpired {
                    offer_id: offer.offer_id,
                    expiry_date: offer.expiry_date,
                })
            }
            other => {
                return Err(AdmissionError::InvalidTransition {
                    entity: "offer",
                    from: other.label(),
                    requested: "enrolled",
                })
            }
        }

        let payment = self
            .payments
            .completed_payment(application_id)
            .ok_or_else(|| AdmissionError::PaymentMissing(application_id.clone()))?;

        self.enroll(
            EnrollmentCandidate {
                application_id: offer.application_id,
                student_name: offer.student_name,
                course: offer.course,
                offer_amount: offer.final_amount,
                paid_amount: payment.amount,
                payment_date: payment.payment_date,
            },
            today,
        )
    }

    /// Enroll everything currently eligible in one registry call.
    pub fn bulk_enroll(&self, today: NaiveDate) -> BulkEnrollment {
        let candidates = self.list_eligible_for_enrollment(today);
        let outcome = self.enrollments.bulk_enroll(candidates, today);
        for student in &outcome.enrolled {
            self.notify_enrolled(student);
        }
        outcome
    }

    pub fn list_enrolled(&self, filter: &EnrollmentFilter) -> Vec<EnrolledStudent> {
        self.enrollments.list(filter)
    }

    fn notify_offer_sent(&self, offer: &Offer) {
        let mut details = BTreeMap::new();
        details.insert("offer_id".to_string(), offer.offer_id.0.clone());
        details.insert("final_amount".to_string(), offer.final_amount.to_string());
        details.insert("expiry_date".to_string(), offer.expiry_date.to_string());
        self.publish("offer_sent", &offer.application_id, details);
    }

    fn notify_enrolled(&self, student: &EnrolledStudent) {
        let mut details = BTreeMap::new();
        details.insert("student_id".to_string(), student.student_id.0.clone());
        details.insert("course".to_string(), student.course.clone());
        details.insert("balance".to_string(), student.balance().to_string());
        self.publish("student_enrolled", &student.application_id, details);
    }

    fn publish(
        &self,
        template: &str,
        application_id: &ApplicationId,
        details: BTreeMap<String, String>,
    ) {
        let notice = AdmissionNotice {
            template: template.to_string(),
            application_id: application_id.clone(),
            details,
        };
        if let Err(error) = self.notifier.publish(notice) {
            warn!(%application_id, template, %error, "notification dispatch failed");
        }
    }
}
