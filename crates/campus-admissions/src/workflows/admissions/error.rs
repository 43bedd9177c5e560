use chrono::NaiveDate;

use super::domain::{ApplicationId, OfferId};

/// Local validation failures raised by the admission registries.
///
/// Every variant is recoverable by the caller; none is retried by the core.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdmissionError {
    #[error("cannot move {entity} from {from} to {requested}")]
    InvalidTransition {
        entity: &'static str,
        from: &'static str,
        requested: &'static str,
    },
    #[error("application {0} is not approved")]
    ApplicationNotApproved(ApplicationId),
    #[error("application {0} already has an offer")]
    DuplicateOffer(ApplicationId),
    #[error("scholarship {scholarship} exceeds fee amount {fee_amount}")]
    InvalidAmount { fee_amount: u64, scholarship: u64 },
    #[error("offer {offer_id} expired on {expiry_date}")]
    OfferExpired {
        offer_id: OfferId,
        expiry_date: NaiveDate,
    },
    #[error("no completed payment recorded for application {0}")]
    PaymentMissing(ApplicationId),
    #[error("application {0} is already enrolled")]
    DuplicateEnrollment(ApplicationId),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("application {0} already exists")]
    DuplicateApplication(ApplicationId),
    #[error("{field} is invalid: {reason}")]
    InvalidIntake {
        field: &'static str,
        reason: &'static str,
    },
}

impl AdmissionError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Stable machine-readable code for API payloads.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::ApplicationNotApproved(_) => "application_not_approved",
            Self::DuplicateOffer(_) => "duplicate_offer",
            Self::InvalidAmount { .. } => "invalid_amount",
            Self::OfferExpired { .. } => "offer_expired",
            Self::PaymentMissing(_) => "payment_missing",
            Self::DuplicateEnrollment(_) => "duplicate_enrollment",
            Self::NotFound { .. } => "not_found",
            Self::DuplicateApplication(_) => "duplicate_application",
            Self::InvalidIntake { .. } => "invalid_intake",
        }
    }
}
