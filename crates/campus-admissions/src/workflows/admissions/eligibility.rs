use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use super::domain::{
    ApplicationId, EffectiveAcceptance, EnrolledStudent, EnrollmentCandidate, Offer, Payment,
};
use super::offers::effective_status;

/// Join accepted offers with completed payments, minus anything already enrolled.
///
/// Recomputed from scratch on every call: any of the three inputs may have
/// changed since the last one. Output follows offer order. When several
/// completed payments exist for one application the latest one is reported.
pub fn resolve_candidates(
    offers: &[Offer],
    payments: &[Payment],
    enrolled: &[EnrolledStudent],
    today: NaiveDate,
) -> Vec<EnrollmentCandidate> {
    let mut completed: HashMap<&ApplicationId, &Payment> = HashMap::new();
    for payment in payments.iter().filter(|payment| payment.is_completed()) {
        completed
            .entry(&payment.application_id)
            .and_modify(|current| {
                if payment.payment_date >= current.payment_date {
                    *current = payment;
                }
            })
            .or_insert(payment);
    }

    let enrolled: HashSet<&ApplicationId> = enrolled
        .iter()
        .map(|student| &student.application_id)
        .collect();

    offers
        .iter()
        .filter(|offer| effective_status(offer, today) == EffectiveAcceptance::Accepted)
        .filter(|offer| !enrolled.contains(&offer.application_id))
        .filter_map(|offer| {
            let payment = completed.get(&offer.application_id)?;
            Some(EnrollmentCandidate {
                application_id: offer.application_id.clone(),
                student_name: offer.student_name.clone(),
                course: offer.course.clone(),
                offer_amount: offer.final_amount,
                paid_amount: payment.amount,
                payment_date: payment.payment_date,
            })
        })
        .collect()
}
