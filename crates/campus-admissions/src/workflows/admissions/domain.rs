use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for submitted applications (e.g. `APP2024001`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Identifier wrapper for admission offers (e.g. `OFF001`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OfferId(pub String);

/// Identity minted exactly once per enrollment (e.g. `STU2024001`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StudentId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for OfferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Review state of an application. `Approved` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Submitted,
    UnderReview,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::UnderReview => "under_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    #[default]
    Pending,
    Verified,
    Incomplete,
}

impl DocumentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Incomplete => "incomplete",
        }
    }
}

/// A prospective student's intake record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub application_id: ApplicationId,
    pub student_name: String,
    pub course: String,
    pub status: ApplicationStatus,
    pub document_status: DocumentStatus,
    pub applied_date: NaiveDate,
}

/// Intake payload handed over by the external form submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationIntake {
    #[serde(default)]
    pub application_id: Option<ApplicationId>,
    pub student_name: String,
    pub course: String,
    #[serde(default)]
    pub document_status: DocumentStatus,
    pub applied_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    #[default]
    Draft,
    Sent,
}

impl OfferStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
        }
    }
}

/// Acceptance state as written by explicit accept/reject calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcceptanceStatus {
    Pending,
    Accepted,
    Rejected,
}

impl AcceptanceStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

/// Read-time projection of an offer's acceptance state. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectiveAcceptance {
    Pending,
    Accepted,
    Rejected,
    Expired,
}

impl EffectiveAcceptance {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Expired => "expired",
        }
    }
}

impl From<AcceptanceStatus> for EffectiveAcceptance {
    fn from(status: AcceptanceStatus) -> Self {
        match status {
            AcceptanceStatus::Pending => Self::Pending,
            AcceptanceStatus::Accepted => Self::Accepted,
            AcceptanceStatus::Rejected => Self::Rejected,
        }
    }
}

/// Conditional admission grant tied to exactly one application.
///
/// `student_name` and `course` are copied from the application when the offer
/// is created so eligibility can be resolved from offers alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub offer_id: OfferId,
    pub application_id: ApplicationId,
    pub student_name: String,
    pub course: String,
    pub fee_amount: u64,
    pub scholarship: u64,
    pub final_amount: u64,
    pub offer_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub status: OfferStatus,
    pub acceptance_status: AcceptanceStatus,
}

/// Command payload for `OfferEngine::create_offer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOffer {
    pub application_id: ApplicationId,
    pub fee_amount: u64,
    #[serde(default)]
    pub scholarship: u64,
    pub offer_date: NaiveDate,
    pub expiry_date: NaiveDate,
    #[serde(default)]
    pub status: OfferStatus,
}

/// Offer paired with its acceptance state as of a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OfferView {
    #[serde(flatten)]
    pub offer: Offer,
    pub effective_status: EffectiveAcceptance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
}

impl PaymentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

/// Payment fact delivered by the payment collaborator. Read-only to the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub application_id: ApplicationId,
    pub amount: u64,
    pub status: PaymentStatus,
    pub payment_date: NaiveDate,
}

impl Payment {
    pub fn is_completed(&self) -> bool {
        self.status == PaymentStatus::Completed
    }
}

/// An accepted, paid, not-yet-enrolled application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentCandidate {
    pub application_id: ApplicationId,
    pub student_name: String,
    pub course: String,
    pub offer_amount: u64,
    pub paid_amount: u64,
    pub payment_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Completed,
}

impl EnrollmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrolledStudent {
    pub student_id: StudentId,
    pub application_id: ApplicationId,
    pub student_name: String,
    pub course: String,
    pub enrollment_date: NaiveDate,
    pub enrollment_status: EnrollmentStatus,
    pub fee_paid: u64,
    pub total_fee: u64,
}

impl EnrolledStudent {
    pub fn balance(&self) -> u64 {
        self.total_fee.saturating_sub(self.fee_paid)
    }
}

/// Result of a bulk enrollment: who got an identity and who was turned away.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkEnrollment {
    pub enrolled: Vec<EnrolledStudent>,
    pub skipped: Vec<SkippedCandidate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedCandidate {
    pub application_id: ApplicationId,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApplicationFilter {
    #[serde(default)]
    pub status: Option<ApplicationStatus>,
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

impl ApplicationFilter {
    pub fn matches(&self, application: &Application) -> bool {
        self.status.map_or(true, |status| application.status == status)
            && course_matches(self.course.as_deref(), &application.course)
            && search_matches(
                self.search.as_deref(),
                &[&application.application_id.0, &application.student_name],
            )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OfferFilter {
    #[serde(default)]
    pub application_id: Option<ApplicationId>,
    #[serde(default)]
    pub status: Option<OfferStatus>,
    #[serde(default)]
    pub acceptance: Option<EffectiveAcceptance>,
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

impl OfferFilter {
    /// `effective` must be the offer's projection for the day being listed.
    pub fn matches(&self, offer: &Offer, effective: EffectiveAcceptance) -> bool {
        self.application_id
            .as_ref()
            .map_or(true, |id| &offer.application_id == id)
            && self.status.map_or(true, |status| offer.status == status)
            && self.acceptance.map_or(true, |wanted| effective == wanted)
            && course_matches(self.course.as_deref(), &offer.course)
            && search_matches(
                self.search.as_deref(),
                &[
                    &offer.offer_id.0,
                    &offer.application_id.0,
                    &offer.student_name,
                ],
            )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EnrollmentFilter {
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

impl EnrollmentFilter {
    pub fn matches(&self, student: &EnrolledStudent) -> bool {
        course_matches(self.course.as_deref(), &student.course)
            && search_matches(
                self.search.as_deref(),
                &[
                    &student.student_id.0,
                    &student.application_id.0,
                    &student.student_name,
                ],
            )
    }
}

fn course_matches(wanted: Option<&str>, course: &str) -> bool {
    match wanted.map(str::trim).filter(|value| !value.is_empty()) {
        Some(wanted) => course.eq_ignore_ascii_case(wanted),
        None => true,
    }
}

fn search_matches(needle: Option<&str>, haystacks: &[&str]) -> bool {
    let Some(needle) = needle.map(str::trim).filter(|value| !value.is_empty()) else {
        return true;
    };
    let needle = needle.to_lowercase();
    haystacks
        .iter()
        .any(|haystack| haystack.to_lowercase().contains(&needle))
}
