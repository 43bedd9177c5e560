//! Admission lifecycle: application review, offers, eligibility and enrollment.
//!
//! Data flows one way: `ApplicationStore` feeds `OfferEngine`, the eligibility
//! resolver joins offers with payments and existing enrollments, and
//! `EnrollmentRegistry` mints student identities for the resolved candidates.

pub mod applications;
pub mod domain;
pub mod eligibility;
pub mod enrollment;
pub mod error;
pub(crate) mod ids;
pub mod offers;
pub mod ports;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use applications::ApplicationStore;
pub use domain::{
    AcceptanceStatus, Application, ApplicationFilter, ApplicationId, ApplicationIntake,
    ApplicationStatus, BulkEnrollment, CreateOffer, DocumentStatus, EffectiveAcceptance,
    EnrolledStudent, EnrollmentCandidate, EnrollmentFilter, EnrollmentStatus, Offer, OfferFilter,
    OfferId, OfferStatus, OfferView, Payment, PaymentStatus, SkippedCandidate, StudentId,
};
pub use eligibility::resolve_candidates;
pub use enrollment::EnrollmentRegistry;
pub use error::AdmissionError;
pub use offers::{effective_status, OfferEngine};
pub use ports::{AdmissionNotice, AdmissionNotifier, CourseCatalog, NotifyError, PaymentFeed};
pub use router::admissions_router;
pub use service::AdmissionsService;
