use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    Application, ApplicationFilter, ApplicationId, ApplicationIntake, BulkEnrollment,
    CreateOffer, EnrolledStudent, EnrollmentCandidate, EnrollmentFilter, Offer, OfferFilter,
    OfferId, OfferStatus, OfferView,
};
use super::error::AdmissionError;
use super::ports::{AdmissionNotifier, CourseCatalog, PaymentFeed};
use super::service::AdmissionsService;

type SharedService<F, C, N> = State<Arc<AdmissionsService<F, C, N>>>;
type ApiResult<T> = Result<(StatusCode, Json<T>), AdmissionError>;

/// Evaluation day for expiry-sensitive endpoints. Defaults to the local date.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct AsOf {
    #[serde(default)]
    today: Option<NaiveDate>,
}

impl AsOf {
    fn resolve(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CatalogOfferRequest {
    application_id: ApplicationId,
    #[serde(default)]
    scholarship: u64,
    offer_date: NaiveDate,
    #[serde(default)]
    status: OfferStatus,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EnrollRequest {
    application_id: ApplicationId,
}

impl IntoResponse for AdmissionError {
    fn into_response(self) -> Response {
        let status = match self {
            AdmissionError::NotFound { .. } => StatusCode::NOT_FOUND,
            AdmissionError::InvalidAmount { .. } | AdmissionError::InvalidIntake { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AdmissionError::InvalidTransition { .. }
            | AdmissionError::ApplicationNotApproved(_)
            | AdmissionError::DuplicateOffer(_)
            | AdmissionError::OfferExpired { .. }
            | AdmissionError::PaymentMissing(_)
            | AdmissionError::DuplicateEnrollment(_)
            | AdmissionError::DuplicateApplication(_) => StatusCode::CONFLICT,
        };

        let payload = json!({
            "error": self.to_string(),
            "kind": self.kind(),
        });
        (status, Json(payload)).into_response()
    }
}

/// Router builder exposing the admission lifecycle over HTTP.
pub fn admissions_router<F, C, N>(service: Arc<AdmissionsService<F, C, N>>) -> Router
where
    F: PaymentFeed + 'static,
    C: CourseCatalog + 'static,
    N: AdmissionNotifier + 'static,
{
    Router::new()
        .route(
            "/api/v1/admissions/applications",
            post(submit_handler::<F, C, N>).get(list_applications_handler::<F, C, N>),
        )
        .route(
            "/api/v1/admissions/applications/:application_id",
            get(application_handler::<F, C, N>),
        )
        .route(
            "/api/v1/admissions/applications/:application_id/review",
            post(review_handler::<F, C, N>),
        )
        .route(
            "/api/v1/admissions/applications/:application_id/approve",
            post(approve_handler::<F, C, N>),
        )
        .route(
            "/api/v1/admissions/applications/:application_id/reject",
            post(reject_application_handler::<F, C, N>),
        )
        .route(
            "/api/v1/admissions/offers",
            post(create_offer_handler::<F, C, N>).get(list_offers_handler::<F, C, N>),
        )
        .route(
            "/api/v1/admissions/offers/catalog",
            post(catalog_offer_handler::<F, C, N>),
        )
        .route(
            "/api/v1/admissions/offers/:offer_id/send",
            post(send_offer_handler::<F, C, N>),
        )
        .route(
            "/api/v1/admissions/offers/:offer_id/accept",
            post(accept_offer_handler::<F, C, N>),
        )
        .route(
            "/api/v1/admissions/offers/:offer_id/reject",
            post(reject_offer_handler::<F, C, N>),
        )
        .route(
            "/api/v1/admissions/enrollments",
            post(enroll_handler::<F, C, N>).get(list_enrolled_handler::<F, C, N>),
        )
        .route(
            "/api/v1/admissions/enrollments/eligible",
            get(eligible_handler::<F, C, N>),
        )
        .route(
            "/api/v1/admissions/enrollments/bulk",
            post(bulk_enroll_handler::<F, C, N>),
        )
        .with_state(service)
}

pub(crate) async fn submit_handler<F, C, N>(
    State(service): SharedService<F, C, N>,
    Json(intake): Json<ApplicationIntake>,
) -> ApiResult<Application>
where
    F: PaymentFeed + 'static,
    C: CourseCatalog + 'static,
    N: AdmissionNotifier + 'static,
{
    let application = service.submit(intake)?;
    Ok((StatusCode::CREATED, Json(application)))
}

pub(crate) async fn list_applications_handler<F, C, N>(
    State(service): SharedService<F, C, N>,
    Query(filter): Query<ApplicationFilter>,
) -> Json<Vec<Application>>
where
    F: PaymentFeed + 'static,
    C: CourseCatalog + 'static,
    N: AdmissionNotifier + 'static,
{
    Json(service.list_applications(&filter))
}

pub(crate) async fn application_handler<F, C, N>(
    State(service): SharedService<F, C, N>,
    Path(application_id): Path<String>,
) -> ApiResult<Application>
where
    F: PaymentFeed + 'static,
    C: CourseCatalog + 'static,
    N: AdmissionNotifier + 'static,
{
    let application = service.get_application(&ApplicationId(application_id))?;
    Ok((StatusCode::OK, Json(application)))
}

pub(crate) async fn review_handler<F, C, N>(
    State(service): SharedService<F, C, N>,
    Path(application_id): Path<String>,
) -> ApiResult<Application>
where
    F: PaymentFeed + 'static,
    C: CourseCatalog + 'static,
    N: AdmissionNotifier + 'static,
{
    let application = service.review(&ApplicationId(application_id))?;
    Ok((StatusCode::OK, Json(application)))
}

pub(crate) async fn approve_handler<F, C, N>(
    State(service): SharedService<F, C, N>,
    Path(application_id): Path<String>,
) -> ApiResult<Application>
where
    F: PaymentFeed + 'static,
    C: CourseCatalog + 'static,
    N: AdmissionNotifier + 'static,
{
    let application = service.approve(&ApplicationId(application_id))?;
    Ok((StatusCode::OK, Json(application)))
}

pub(crate) async fn reject_application_handler<F, C, N>(
    State(service): SharedService<F, C, N>,
    Path(application_id): Path<String>,
) -> ApiResult<Application>
where
    F: PaymentFeed + 'static,
    C: CourseCatalog + 'static,
    N: AdmissionNotifier + 'static,
{
    let application = service.reject_application(&ApplicationId(application_id))?;
    Ok((StatusCode::OK, Json(application)))
}

pub(crate) async fn create_offer_handler<F, C, N>(
    State(service): SharedService<F, C, N>,
    Json(command): Json<CreateOffer>,
) -> ApiResult<Offer>
where
    F: PaymentFeed + 'static,
    C: CourseCatalog + 'static,
    N: AdmissionNotifier + 'static,
{
    let offer = service.create_offer(command)?;
    Ok((StatusCode::CREATED, Json(offer)))
}

pub(crate) async fn catalog_offer_handler<F, C, N>(
    State(service): SharedService<F, C, N>,
    Json(request): Json<CatalogOfferRequest>,
) -> ApiResult<Offer>
where
    F: PaymentFeed + 'static,
    C: CourseCatalog + 'static,
    N: AdmissionNotifier + 'static,
{
    let offer = service.create_catalog_offer(
        &request.application_id,
        request.scholarship,
        request.offer_date,
        request.status,
    )?;
    Ok((StatusCode::CREATED, Json(offer)))
}

pub(crate) async fn list_offers_handler<F, C, N>(
    State(service): SharedService<F, C, N>,
    Query(filter): Query<OfferFilter>,
    Query(as_of): Query<AsOf>,
) -> Json<Vec<OfferView>>
where
    F: PaymentFeed + 'static,
    C: CourseCatalog + 'static,
    N: AdmissionNotifier + 'static,
{
    Json(service.list_offers(&filter, as_of.resolve()))
}

pub(crate) async fn send_offer_handler<F, C, N>(
    State(service): SharedService<F, C, N>,
    Path(offer_id): Path<String>,
) -> ApiResult<Offer>
where
    F: PaymentFeed + 'static,
    C: CourseCatalog + 'static,
    N: AdmissionNotifier + 'static,
{
    let offer = service.send_offer(&OfferId(offer_id))?;
    Ok((StatusCode::OK, Json(offer)))
}

pub(crate) async fn accept_offer_handler<F, C, N>(
    State(service): SharedService<F, C, N>,
    Path(offer_id): Path<String>,
    Query(as_of): Query<AsOf>,
) -> ApiResult<Offer>
where
    F: PaymentFeed + 'static,
    C: CourseCatalog + 'static,
    N: AdmissionNotifier + 'static,
{
    let offer = service.accept_offer(&OfferId(offer_id), as_of.resolve())?;
    Ok((StatusCode::OK, Json(offer)))
}

pub(crate) async fn reject_offer_handler<F, C, N>(
    State(service): SharedService<F, C, N>,
    Path(offer_id): Path<String>,
    Query(as_of): Query<AsOf>,
) -> ApiResult<Offer>
where
    F: PaymentFeed + 'static,
    C: CourseCatalog + 'static,
    N: AdmissionNotifier + 'static,
{
    let offer = service.reject_offer(&OfferId(offer_id), as_of.resolve())?;
    Ok((StatusCode::OK, Json(offer)))
}

pub(crate) async fn eligible_handler<F, C, N>(
    State(service): SharedService<F, C, N>,
    Query(as_of): Query<AsOf>,
) -> Json<Vec<EnrollmentCandidate>>
where
    F: PaymentFeed + 'static,
    C: CourseCatalog + 'static,
    N: AdmissionNotifier + 'static,
{
    Json(service.list_eligible_for_enrollment(as_of.resolve()))
}

pub(crate) async fn enroll_handler<F, C, N>(
    State(service): SharedService<F, C, N>,
    Query(as_of): Query<AsOf>,
    Json(request): Json<EnrollRequest>,
) -> ApiResult<EnrolledStudent>
where
    F: PaymentFeed + 'static,
    C: CourseCatalog + 'static,
    N: AdmissionNotifier + 'static,
{
    let student = service.enroll_application(&request.application_id, as_of.resolve())?;
    Ok((StatusCode::CREATED, Json(student)))
}

pub(crate) async fn bulk_enroll_handler<F, C, N>(
    State(service): SharedService<F, C, N>,
    Query(as_of): Query<AsOf>,
) -> (StatusCode, Json<BulkEnrollment>)
where
    F: PaymentFeed + 'static,
    C: CourseCatalog + 'static,
    N: AdmissionNotifier + 'static,
{
    (StatusCode::OK, Json(service.bulk_enroll(as_of.resolve())))
}

pub(crate) async fn list_enrolled_handler<F, C, N>(
    State(service): SharedService<F, C, N>,
    Query(filter): Query<EnrollmentFilter>,
) -> Json<Vec<EnrolledStudent>>
where
    F: PaymentFeed + 'static,
    C: CourseCatalog + 'static,
    N: AdmissionNotifier + 'static,
{
    Json(service.list_enrolled(&filter))
}
