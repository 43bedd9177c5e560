use campus_admissions::config::AdmissionsConfig;
use campus_admissions::workflows::admissions::{
    AdmissionNotice, AdmissionNotifier, AdmissionsService, CourseCatalog, NotifyError,
};
use campus_admissions::workflows::payments::PaymentLedger;
use chrono::{Datelike, NaiveDate};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::info;

pub(crate) type ApiService = AdmissionsService<PaymentLedger, StaticCourseCatalog, LoggingNotifier>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) payments: Arc<PaymentLedger>,
}

/// Fee schedule served until the catalog screens are wired in.
#[derive(Debug, Clone)]
pub(crate) struct StaticCourseCatalog {
    fees: HashMap<String, u64>,
}

impl Default for StaticCourseCatalog {
    fn default() -> Self {
        let fees = [
            ("B.Tech Computer Science", 50_000),
            ("B.Tech Mechanical", 48_000),
            ("BBA", 30_000),
            ("B.Com", 25_000),
            ("MBA", 75_000),
        ]
        .into_iter()
        .map(|(course, fee)| (course.to_string(), fee))
        .collect();

        Self { fees }
    }
}

impl CourseCatalog for StaticCourseCatalog {
    fn course_fee(&self, course: &str) -> Option<u64> {
        self.fees
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(course.trim()))
            .map(|(_, fee)| *fee)
    }
}

/// Notifier that writes notices to the log and keeps them for inspection.
#[derive(Default, Clone)]
pub(crate) struct LoggingNotifier {
    events: Arc<Mutex<Vec<AdmissionNotice>>>,
}

impl AdmissionNotifier for LoggingNotifier {
    fn publish(&self, notice: AdmissionNotice) -> Result<(), NotifyError> {
        info!(
            template = %notice.template,
            application_id = %notice.application_id,
            details = ?notice.details,
            "admission notice queued"
        );
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
        Ok(())
    }
}

impl LoggingNotifier {
    pub(crate) fn events(&self) -> Vec<AdmissionNotice> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

pub(crate) struct Wiring {
    pub(crate) service: Arc<ApiService>,
    pub(crate) payments: Arc<PaymentLedger>,
    pub(crate) notifier: Arc<LoggingNotifier>,
}

pub(crate) fn build_admissions(config: AdmissionsConfig) -> Wiring {
    let payments = Arc::new(PaymentLedger::new());
    let notifier = Arc::new(LoggingNotifier::default());
    let service = Arc::new(AdmissionsService::new(
        payments.clone(),
        Arc::new(StaticCourseCatalog::default()),
        notifier.clone(),
        config,
    ));

    Wiring {
        service,
        payments,
        notifier,
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))?;
    if !(1900..=9999).contains(&date.year()) {
        return Err(format!("'{raw}' is outside the supported years 1900-9999"));
    }
    Ok(date)
}
