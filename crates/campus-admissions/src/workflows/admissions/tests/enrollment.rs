use std::collections::HashSet;
use std::thread;

use super::common::*;
use crate::workflows::admissions::domain::{
    ApplicationId, EnrollmentCandidate, EnrollmentFilter, EnrollmentStatus, StudentId,
};
use crate::workflows::admissions::enrollment::EnrollmentRegistry;
use crate::workflows::admissions::error::AdmissionError;

fn candidate(application: &str, name: &str) -> EnrollmentCandidate {
    EnrollmentCandidate {
        application_id: ApplicationId(application.to_string()),
        student_name: name.to_string(),
        course: "BBA".to_string(),
        offer_amount: 45_000,
        paid_amount: 20_000,
        payment_date: day(7, 10),
    }
}

#[test]
fn enroll_mints_year_scoped_student_id() {
    let registry = EnrollmentRegistry::default();
    let student = registry
        .enroll(candidate("APP2024001", "Aarav Sharma"), day(7, 20))
        .expect("enroll");

    assert_eq!(student.student_id, StudentId("STU2024001".to_string()));
    assert_eq!(student.enrollment_status, EnrollmentStatus::Completed);
    assert_eq!(student.enrollment_date, day(7, 20));
    assert_eq!(student.fee_paid, 20_000);
    assert_eq!(student.total_fee, 45_000);
    assert_eq!(student.balance(), 25_000);
}

#[test]
fn custom_prefix_is_used() {
    let registry = EnrollmentRegistry::new("ENR");
    let student = registry
        .enroll(candidate("APP2024001", "Aarav Sharma"), day(7, 20))
        .expect("enroll");
    assert_eq!(student.student_id.0, "ENR2024001");
}

#[test]
fn duplicate_enrollment_leaves_registry_unchanged() {
    let registry = EnrollmentRegistry::default();
    let first = registry
        .enroll(candidate("APP2024001", "Aarav Sharma"), day(7, 20))
        .expect("enroll");

    assert_eq!(
        registry.enroll(candidate("APP2024001", "Aarav Sharma"), day(7, 21)),
        Err(AdmissionError::DuplicateEnrollment(ApplicationId(
            "APP2024001".to_string()
        )))
    );
    assert_eq!(registry.len(), 1);
    assert_eq!(
        registry
            .for_application(&first.application_id)
            .expect("still enrolled"),
        first
    );

    let next = registry
        .enroll(candidate("APP2024002", "Diya Patel"), day(7, 21))
        .expect("enroll");
    assert_eq!(next.student_id.0, "STU2024002");
}

#[test]
fn bulk_enroll_assigns_distinct_sequential_ids() {
    let registry = EnrollmentRegistry::default();
    let candidates = (1..=5)
        .map(|n| candidate(&format!("APP2024{n:03}"), &format!("Student {n}")))
        .collect();

    let outcome = registry.bulk_enroll(candidates, day(7, 20));
    assert!(outcome.skipped.is_empty());
    let ids: Vec<_> = outcome
        .enrolled
        .iter()
        .map(|student| student.student_id.0.clone())
        .collect();
    assert_eq!(
        ids,
        vec!["STU2024001", "STU2024002", "STU2024003", "STU2024004", "STU2024005"]
    );
}

#[test]
fn bulk_enroll_skips_repeats_and_already_enrolled() {
    let registry = EnrollmentRegistry::default();
    registry
        .enroll(candidate("APP2024001", "Aarav Sharma"), day(7, 20))
        .expect("enroll");

    let outcome = registry.bulk_enroll(
        vec![
            candidate("APP2024001", "Aarav Sharma"),
            candidate("APP2024002", "Diya Patel"),
            candidate("APP2024002", "Diya Patel"),
        ],
        day(7, 21),
    );

    assert_eq!(outcome.enrolled.len(), 1);
    assert_eq!(outcome.enrolled[0].student_id.0, "STU2024002");
    let skipped: Vec<_> = outcome
        .skipped
        .iter()
        .map(|skip| skip.application_id.0.as_str())
        .collect();
    assert_eq!(skipped, vec!["APP2024001", "APP2024002"]);
    assert!(outcome.skipped[0].reason.contains("already enrolled"));
    assert_eq!(registry.len(), 2);
}

#[test]
fn concurrent_enrollments_never_share_an_id() {
    let registry = EnrollmentRegistry::default();

    thread::scope(|scope| {
        for worker in 0..4 {
            let registry = &registry;
            scope.spawn(move || {
                for n in 0..10 {
                    let application = format!("APP2024{:03}", worker * 10 + n + 1);
                    registry
                        .enroll(candidate(&application, "Concurrent"), day(7, 20))
                        .expect("enroll");
                }
            });
        }
    });

    let students = registry.snapshot();
    assert_eq!(students.len(), 40);
    let ids: HashSet<_> = students.iter().map(|student| &student.student_id).collect();
    assert_eq!(ids.len(), 40);
}

#[test]
fn lookups_and_filters() {
    let registry = EnrollmentRegistry::default();
    let first = registry
        .enroll(candidate("APP2024001", "Aarav Sharma"), day(7, 20))
        .expect("enroll");
    let mut other = candidate("APP2024002", "Diya Patel");
    other.course = "B.Tech Computer Science".to_string();
    registry.enroll(other, day(7, 20)).expect("enroll");

    assert_eq!(registry.get(&first.student_id).expect("found"), first);
    assert!(matches!(
        registry.get(&StudentId("STU2024999".to_string())),
        Err(AdmissionError::NotFound { entity: "student", .. })
    ));
    assert!(registry.is_enrolled(&first.application_id));

    let bba = registry.list(&EnrollmentFilter {
        course: Some("bba".to_string()),
        ..EnrollmentFilter::default()
    });
    assert_eq!(bba.len(), 1);
    let search = registry.list(&EnrollmentFilter {
        search: Some("stu2024002".to_string()),
        ..EnrollmentFilter::default()
    });
    assert_eq!(search[0].student_name, "Diya Patel");
}
