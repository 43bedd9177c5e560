use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{Duration, NaiveDate};
use serde_json::Value;

use crate::config::AdmissionsConfig;
use crate::workflows::admissions::domain::{
    Application, ApplicationId, ApplicationIntake, CreateOffer, DocumentStatus, Offer,
    OfferStatus, Payment, PaymentStatus,
};
use crate::workflows::admissions::ports::{
    AdmissionNotice, AdmissionNotifier, CourseCatalog, NotifyError,
};
use crate::workflows::admissions::{admissions_router, AdmissionsService};
use crate::workflows::payments::PaymentLedger;

pub(super) type TestService = AdmissionsService<PaymentLedger, MemoryCatalog, MemoryNotices>;

pub(super) fn day(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).expect("valid date")
}

pub(super) fn offer_date() -> NaiveDate {
    day(7, 1)
}

pub(super) fn expiry_date() -> NaiveDate {
    offer_date() + Duration::days(30)
}

pub(super) fn intake(name: &str, course: &str) -> ApplicationIntake {
    ApplicationIntake {
        application_id: None,
        student_name: name.to_string(),
        course: course.to_string(),
        document_status: DocumentStatus::Verified,
        applied_date: day(6, 10),
    }
}

pub(super) fn offer_command(application_id: &ApplicationId) -> CreateOffer {
    CreateOffer {
        application_id: application_id.clone(),
        fee_amount: 50_000,
        scholarship: 5_000,
        offer_date: offer_date(),
        expiry_date: expiry_date(),
        status: OfferStatus::Draft,
    }
}

pub(super) fn completed_payment(application_id: &ApplicationId, amount: u64) -> Payment {
    Payment {
        application_id: application_id.clone(),
        amount,
        status: PaymentStatus::Completed,
        payment_date: day(7, 10),
    }
}

#[derive(Default)]
pub(super) struct MemoryCatalog {
    fees: HashMap<String, u64>,
}

impl MemoryCatalog {
    pub(super) fn standard() -> Self {
        let mut fees = HashMap::new();
        fees.insert("B.Tech Computer Science".to_string(), 50_000);
        fees.insert("BBA".to_string(), 30_000);
        Self { fees }
    }
}

impl CourseCatalog for MemoryCatalog {
    fn course_fee(&self, course: &str) -> Option<u64> {
        self.fees.get(course).copied()
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotices {
    events: Arc<Mutex<Vec<AdmissionNotice>>>,
}

impl MemoryNotices {
    pub(super) fn events(&self) -> Vec<AdmissionNotice> {
        self.events.lock().expect("notice mutex poisoned").clone()
    }

    pub(super) fn templates(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .map(|notice| notice.template)
            .collect()
    }
}

impl AdmissionNotifier for MemoryNotices {
    fn publish(&self, notice: AdmissionNotice) -> Result<(), NotifyError> {
        self.events
            .lock()
            .expect("notice mutex poisoned")
            .push(notice);
        Ok(())
    }
}

pub(super) struct OfflineNotifier;

impl AdmissionNotifier for OfflineNotifier {
    fn publish(&self, _notice: AdmissionNotice) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("smtp relay offline".to_string()))
    }
}

pub(super) fn build_service() -> (TestService, Arc<PaymentLedger>, Arc<MemoryNotices>) {
    let payments = Arc::new(PaymentLedger::new());
    let notices = Arc::new(MemoryNotices::default());
    let service = AdmissionsService::new(
        payments.clone(),
        Arc::new(MemoryCatalog::standard()),
        notices.clone(),
        AdmissionsConfig::default(),
    );
    (service, payments, notices)
}

/// Submit, review and approve an application in one go.
pub(super) fn approved_application(service: &TestService, name: &str) -> Application {
    let application = service
        .submit(intake(name, "B.Tech Computer Science"))
        .expect("intake accepted");
    service
        .review(&application.application_id)
        .expect("review succeeds");
    service
        .approve(&application.application_id)
        .expect("approval succeeds")
}

/// Drive an application all the way to an accepted offer with a completed payment.
pub(super) fn paid_acceptance(
    service: &TestService,
    payments: &PaymentLedger,
    name: &str,
) -> Offer {
    let application = approved_application(service, name);
    let offer = service
        .create_offer(offer_command(&application.application_id))
        .expect("offer created");
    service.send_offer(&offer.offer_id).expect("offer sent");
    let accepted = service
        .accept_offer(&offer.offer_id, day(7, 5))
        .expect("offer accepted");
    payments.record(completed_payment(
        &application.application_id,
        accepted.final_amount,
    ));
    accepted
}

pub(super) fn router_with_service(service: TestService) -> axum::Router {
    admissions_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
