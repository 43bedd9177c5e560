use super::normalizer::normalize_token;
use crate::workflows::admissions::PaymentStatus;
use std::collections::HashMap;
use std::sync::OnceLock;

static GATEWAY_STATUS_MAP: OnceLock<HashMap<String, PaymentStatus>> = OnceLock::new();

/// Map a gateway status label onto the two states the core understands.
pub(crate) fn status_for(raw: &str) -> Option<PaymentStatus> {
    gateway_status_map().get(&normalize_token(raw)).copied()
}

fn gateway_status_map() -> &'static HashMap<String, PaymentStatus> {
    GATEWAY_STATUS_MAP.get_or_init(|| {
        const LABELS: &[(&str, PaymentStatus)] = &[
            ("completed", PaymentStatus::Completed),
            ("complete", PaymentStatus::Completed),
            ("paid", PaymentStatus::Completed),
            ("success", PaymentStatus::Completed),
            ("successful", PaymentStatus::Completed),
            ("captured", PaymentStatus::Completed),
            ("settled", PaymentStatus::Completed),
            ("pending", PaymentStatus::Pending),
            ("processing", PaymentStatus::Pending),
            ("initiated", PaymentStatus::Pending),
            ("failed", PaymentStatus::Pending),
            ("declined", PaymentStatus::Pending),
            ("partially paid", PaymentStatus::Pending),
        ];

        LABELS
            .iter()
            .map(|(label, status)| (normalize_token(label), *status))
            .collect()
    })
}

#[cfg(test)]
pub(crate) fn lookup_for_tests(raw: &str) -> Option<PaymentStatus> {
    status_for(raw)
}
