use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{ApplicationId, Payment};

/// Fee lookup backed by the course catalog screens.
pub trait CourseCatalog: Send + Sync {
    fn course_fee(&self, course: &str) -> Option<u64>;
}

/// Completed-payment facts delivered by the payment collaborator.
pub trait PaymentFeed: Send + Sync {
    /// Every payment currently known, in any status.
    fn payments(&self) -> Vec<Payment>;

    /// Latest completed payment for `application_id`, if any.
    fn completed_payment(&self, application_id: &ApplicationId) -> Option<Payment> {
        self.payments()
            .into_iter()
            .filter(|payment| payment.is_completed() && &payment.application_id == application_id)
            .max_by_key(|payment| payment.payment_date)
    }
}

/// Outbound notice hook (e-mail or SMS adapters). Delivery is the adapter's
/// problem: the core logs failures and moves on.
pub trait AdmissionNotifier: Send + Sync {
    fn publish(&self, notice: AdmissionNotice) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionNotice {
    pub template: String,
    pub application_id: ApplicationId,
    pub details: BTreeMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
