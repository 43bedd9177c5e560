pub mod admissions;
pub mod payments;
