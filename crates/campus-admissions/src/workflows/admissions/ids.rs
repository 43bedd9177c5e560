//! Identifier minting and boundary validation shared by the registries.

use super::domain::{ApplicationId, OfferId, StudentId};
use super::error::AdmissionError;

const SEQUENCE_WIDTH: usize = 3;

/// Monotonic counter owned by exactly one registry and only advanced while
/// that registry's lock is held.
#[derive(Debug)]
pub(crate) struct Sequence {
    next: u32,
}

impl Sequence {
    pub(crate) fn starting_at(first: u32) -> Self {
        Self { next: first }
    }

    /// Hand out the current value and advance. Each call yields a new number.
    pub(crate) fn advance(&mut self) -> u32 {
        let value = self.next;
        self.next = self.next.saturating_add(1);
        value
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

pub(crate) fn application_id(year: i32, seq: u32) -> ApplicationId {
    ApplicationId(format!("APP{year}{seq:0width$}", width = SEQUENCE_WIDTH))
}

pub(crate) fn offer_id(seq: u32) -> OfferId {
    OfferId(format!("OFF{seq:0width$}", width = SEQUENCE_WIDTH))
}

/// `<prefix><year><zero-padded seq>`, e.g. `STU2024001`.
pub(crate) fn student_id(prefix: &str, year: i32, seq: u32) -> StudentId {
    StudentId(format!("{prefix}{year}{seq:0width$}", width = SEQUENCE_WIDTH))
}

/// Trimmed copy of a required text field.
pub(crate) fn required_text(field: &'static str, value: &str) -> Result<String, AdmissionError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AdmissionError::InvalidIntake {
            field,
            reason: "must not be blank",
        });
    }
    Ok(trimmed.to_string())
}

/// `fee_amount - scholarship`, refusing scholarships larger than the fee.
pub(crate) fn final_amount(fee_amount: u64, scholarship: u64) -> Result<u64, AdmissionError> {
    fee_amount
        .checked_sub(scholarship)
        .ok_or(AdmissionError::InvalidAmount {
            fee_amount,
            scholarship,
        })
}
