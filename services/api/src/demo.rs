use crate::infra::{build_admissions, ApiService};
use campus_admissions::config::AppConfig;
use campus_admissions::error::AppError;
use campus_admissions::workflows::admissions::{
    AdmissionError, ApplicationIntake, DocumentStatus, EnrollmentFilter, Offer, OfferFilter,
    OfferStatus, Payment, PaymentStatus,
};
use campus_admissions::workflows::payments::{PaymentCsvImporter, PaymentLedger};
use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation date for the walk-through (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Gateway CSV export to load instead of the synthetic payments.
    #[arg(long)]
    pub(crate) payments_csv: Option<PathBuf>,
    /// Print enrolled students as JSON.
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Response {
    Accept,
    Ignore,
    Late,
}

struct Applicant {
    name: &'static str,
    course: &'static str,
    scholarship: u64,
    response: Response,
}

const COHORT: &[Applicant] = &[
    Applicant {
        name: "Aarav Sharma",
        course: "B.Tech Computer Science",
        scholarship: 5_000,
        response: Response::Accept,
    },
    Applicant {
        name: "Diya Patel",
        course: "BBA",
        scholarship: 0,
        response: Response::Accept,
    },
    Applicant {
        name: "Kabir Rao",
        course: "MBA",
        scholarship: 10_000,
        response: Response::Ignore,
    },
    Applicant {
        name: "Meera Iyer",
        course: "B.Com",
        scholarship: 0,
        response: Response::Late,
    },
];

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        today,
        payments_csv,
        json,
    } = args;

    let config = AppConfig::load()?;
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let wiring = build_admissions(config.admissions.clone());

    println!("Campus admissions demo (evaluated {today})");
    println!(
        "Student ids use prefix '{}', offers stay open {} days",
        config.admissions.student_id_prefix, config.admissions.offer_validity_days
    );

    println!("\nApplications and offers");
    let accepted = admit_cohort(&wiring.service, today);

    println!("\nPayments");
    match payments_csv {
        Some(path) => {
            let imported = wiring.payments.import(PaymentCsvImporter::from_path(&path)?);
            println!("- Imported {imported} rows from {}", path.display());
        }
        None => record_synthetic_payments(&wiring.payments, &accepted, today),
    }

    println!("\nEligible for enrollment");
    let eligible = wiring.service.list_eligible_for_enrollment(today);
    if eligible.is_empty() {
        println!("- none");
    }
    for candidate in &eligible {
        println!(
            "- {} {} ({}): paid {} of {} on {}",
            candidate.application_id,
            candidate.student_name,
            candidate.course,
            candidate.paid_amount,
            candidate.offer_amount,
            candidate.payment_date
        );
    }

    println!("\nBulk enrollment");
    let outcome = wiring.service.bulk_enroll(today);
    for student in &outcome.enrolled {
        println!(
            "- {} <- {} {} | balance {}",
            student.student_id,
            student.application_id,
            student.student_name,
            student.balance()
        );
    }
    for skipped in &outcome.skipped {
        println!("- skipped {}: {}", skipped.application_id, skipped.reason);
    }
    if json {
        let enrolled = wiring.service.list_enrolled(&EnrollmentFilter::default());
        match serde_json::to_string_pretty(&enrolled) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("  Enrollment payload unavailable: {err}"),
        }
    }

    println!("\nOffer book");
    for view in wiring.service.list_offers(&OfferFilter::default(), today) {
        println!(
            "- {} for {} | {} | {} (expires {})",
            view.offer.offer_id,
            view.offer.application_id,
            view.offer.final_amount,
            view.effective_status.label(),
            view.offer.expiry_date
        );
    }

    let notices = wiring.notifier.events();
    if notices.is_empty() {
        println!("\nNotifications: none dispatched");
    } else {
        println!("\nNotifications");
        for notice in notices {
            println!("- template={} -> {}", notice.template, notice.application_id);
        }
    }

    Ok(())
}

/// Run each applicant through review and a catalog-priced offer, returning
/// the offers that were accepted.
fn admit_cohort(service: &ApiService, today: NaiveDate) -> Vec<Offer> {
    let mut accepted = Vec::new();

    for applicant in COHORT {
        match admit(service, applicant, today) {
            Ok(Some(offer)) => accepted.push(offer),
            Ok(None) => {}
            Err(err) => println!("  {}: {}", applicant.name, err),
        }
    }

    accepted
}

fn admit(
    service: &ApiService,
    applicant: &Applicant,
    today: NaiveDate,
) -> Result<Option<Offer>, AdmissionError> {
    let application = service.submit(ApplicationIntake {
        application_id: None,
        student_name: applicant.name.to_string(),
        course: applicant.course.to_string(),
        document_status: DocumentStatus::Verified,
        applied_date: today - Duration::days(75),
    })?;
    service.review(&application.application_id)?;
    service.approve(&application.application_id)?;

    let offer_date = match applicant.response {
        Response::Late => today - Duration::days(70),
        Response::Accept | Response::Ignore => today - Duration::days(10),
    };
    let offer = service.create_catalog_offer(
        &application.application_id,
        applicant.scholarship,
        offer_date,
        OfferStatus::Sent,
    )?;
    println!(
        "- {} {} ({}) -> {} at {} after {} scholarship",
        application.application_id,
        application.student_name,
        application.course,
        offer.offer_id,
        offer.final_amount,
        offer.scholarship
    );

    match applicant.response {
        Response::Accept => {
            let offer = service.accept_offer(&offer.offer_id, today - Duration::days(5))?;
            println!("  accepted");
            Ok(Some(offer))
        }
        Response::Ignore => {
            println!("  awaiting response");
            Ok(None)
        }
        Response::Late => match service.accept_offer(&offer.offer_id, today) {
            Ok(offer) => {
                println!("  accepted");
                Ok(Some(offer))
            }
            Err(err) => {
                println!("  late acceptance refused: {err}");
                Ok(None)
            }
        },
    }
}

/// Full payment for the first accepted offer, a deposit for the rest.
fn record_synthetic_payments(payments: &PaymentLedger, accepted: &[Offer], today: NaiveDate) {
    for (index, offer) in accepted.iter().enumerate() {
        let amount = if index == 0 {
            offer.final_amount
        } else {
            offer.final_amount / 2
        };
        payments.record(Payment {
            application_id: offer.application_id.clone(),
            amount,
            status: PaymentStatus::Completed,
            payment_date: today - Duration::days(2),
        });
        println!("- {} paid {amount}", offer.application_id);
    }
}
