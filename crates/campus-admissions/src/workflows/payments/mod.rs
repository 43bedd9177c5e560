//! Payment facts consumed by the admission core.
//!
//! `PaymentLedger` is the in-process `PaymentFeed`; gateway exports reach it
//! through `PaymentCsvImporter`.

mod mapping;
mod normalizer;
mod parser;

use crate::workflows::admissions::{Payment, PaymentFeed};
use std::io::Read;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::info;

use parser::RowError;

#[derive(Debug)]
pub enum PaymentImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidRow { row: usize, reason: String },
}

impl std::fmt::Display for PaymentImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentImportError::Io(err) => write!(f, "failed to read payment export: {}", err),
            PaymentImportError::Csv(err) => write!(f, "invalid payment CSV data: {}", err),
            PaymentImportError::InvalidRow { row, reason } => {
                write!(f, "payment export row {}: {}", row, reason)
            }
        }
    }
}

impl std::error::Error for PaymentImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PaymentImportError::Io(err) => Some(err),
            PaymentImportError::Csv(err) => Some(err),
            PaymentImportError::InvalidRow { .. } => None,
        }
    }
}

impl From<std::io::Error> for PaymentImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for PaymentImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<RowError> for PaymentImportError {
    fn from(err: RowError) -> Self {
        match err {
            RowError::Csv(err) => Self::Csv(err),
            RowError::Invalid { row, reason } => Self::InvalidRow { row, reason },
        }
    }
}

/// Reads gateway exports with `Application ID, Amount, Status, Payment Date` columns.
pub struct PaymentCsvImporter;

impl PaymentCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Payment>, PaymentImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Payment>, PaymentImportError> {
        Ok(parser::parse_payments(reader)?)
    }
}

/// In-memory payment feed. Payments are appended, never edited: a payment
/// that later completes arrives as a new fact.
#[derive(Debug, Default)]
pub struct PaymentLedger {
    payments: Mutex<Vec<Payment>>,
}

impl PaymentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Payment>> {
        self.payments.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record(&self, payment: Payment) {
        info!(
            application_id = %payment.application_id,
            amount = payment.amount,
            status = payment.status.label(),
            "payment recorded"
        );
        self.lock().push(payment);
    }

    /// Record every payment from an import, returning how many were added.
    pub fn import(&self, payments: Vec<Payment>) -> usize {
        let count = payments.len();
        self.lock().extend(payments);
        info!(count, "payment export imported");
        count
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PaymentFeed for PaymentLedger {
    fn payments(&self) -> Vec<Payment> {
        self.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::admissions::{ApplicationId, PaymentStatus};
    use chrono::NaiveDate;
    use std::io::Cursor;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, day).expect("valid date")
    }

    #[test]
    fn normalize_token_removes_whitespace_and_case() {
        let normalized = normalizer::normalize_for_tests("\u{feff}  Partially   Paid ");
        assert_eq!(normalized, "partially paid");
    }

    #[test]
    fn amounts_accept_grouping_and_zero_fractions() {
        assert_eq!(normalizer::parse_amount("45000"), Some(45_000));
        assert_eq!(normalizer::parse_amount("45,000.00"), Some(45_000));
        assert_eq!(normalizer::parse_amount("₹ 1,20,000"), Some(120_000));
        assert_eq!(normalizer::parse_amount("450.50"), None);
        assert_eq!(normalizer::parse_amount("-10"), None);
        assert_eq!(normalizer::parse_amount(""), None);
    }

    #[test]
    fn gateway_statuses_are_mapped() {
        assert_eq!(
            mapping::lookup_for_tests("PAID"),
            Some(PaymentStatus::Completed)
        );
        assert_eq!(
            mapping::lookup_for_tests(" Success "),
            Some(PaymentStatus::Completed)
        );
        assert_eq!(
            mapping::lookup_for_tests("failed"),
            Some(PaymentStatus::Pending)
        );
        assert_eq!(mapping::lookup_for_tests("refunded"), None);
    }

    #[test]
    fn payment_dates_support_rfc3339_and_plain_dates() {
        assert_eq!(
            parser::parse_date_for_tests("2024-07-05T10:00:00Z"),
            Some(date(5))
        );
        assert_eq!(parser::parse_date_for_tests("2024-07-06"), Some(date(6)));
        assert_eq!(parser::parse_date_for_tests("07/07/2024"), Some(date(7)));
        assert!(parser::parse_date_for_tests("  ").is_none());
        assert!(parser::parse_date_for_tests("yesterday").is_none());
    }

    #[test]
    fn importer_reads_rows_in_order() {
        let csv = "Application ID,Amount,Status,Payment Date\n\
APP2024001,\"45,000\",Paid,2024-07-05\n\
APP2024002,30000,Processing,2024-07-06\n";
        let payments = PaymentCsvImporter::from_reader(Cursor::new(csv)).expect("import succeeds");

        assert_eq!(payments.len(), 2);
        assert_eq!(payments[0].application_id, ApplicationId("APP2024001".to_string()));
        assert_eq!(payments[0].amount, 45_000);
        assert_eq!(payments[0].status, PaymentStatus::Completed);
        assert_eq!(payments[1].status, PaymentStatus::Pending);
        assert_eq!(payments[1].payment_date, date(6));
    }

    #[test]
    fn importer_reports_offending_row() {
        let csv = "Application ID,Amount,Status,Payment Date\n\
APP2024001,45000,Paid,2024-07-05\n\
APP2024002,30000,Refunded,2024-07-06\n";
        let error = PaymentCsvImporter::from_reader(Cursor::new(csv)).expect_err("bad status");

        match error {
            PaymentImportError::InvalidRow { row, reason } => {
                assert_eq!(row, 3);
                assert!(reason.contains("Refunded"));
            }
            other => panic!("expected invalid row, got {other:?}"),
        }
    }

    #[test]
    fn importer_from_path_propagates_io_errors() {
        let error = PaymentCsvImporter::from_path("./does-not-exist.csv")
            .expect_err("expected io error");

        match error {
            PaymentImportError::Io(_) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[test]
    fn ledger_feeds_latest_completed_payment() {
        let ledger = PaymentLedger::new();
        let id = ApplicationId("APP2024001".to_string());
        ledger.record(Payment {
            application_id: id.clone(),
            amount: 10_000,
            status: PaymentStatus::Completed,
            payment_date: date(1),
        });
        ledger.record(Payment {
            application_id: id.clone(),
            amount: 35_000,
            status: PaymentStatus::Completed,
            payment_date: date(9),
        });
        ledger.record(Payment {
            application_id: id.clone(),
            amount: 99_000,
            status: PaymentStatus::Pending,
            payment_date: date(20),
        });

        let latest = ledger.completed_payment(&id).expect("completed payment");
        assert_eq!(latest.amount, 35_000);
        assert!(ledger
            .completed_payment(&ApplicationId("APP2024999".to_string()))
            .is_none());
        assert_eq!(ledger.len(), 3);
    }
}
