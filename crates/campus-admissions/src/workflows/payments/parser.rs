use super::mapping::status_for;
use super::normalizer::parse_amount;
use crate::workflows::admissions::{ApplicationId, Payment};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer};
use std::io::Read;

/// Row-level problems detected while reading an export.
#[derive(Debug)]
pub(crate) enum RowError {
    Csv(csv::Error),
    Invalid { row: usize, reason: String },
}

impl From<csv::Error> for RowError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub(crate) fn parse_payments<R: Read>(reader: R) -> Result<Vec<Payment>, RowError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut payments = Vec::new();

    // Row numbers are 1-based and count the header line.
    for (index, record) in csv_reader.deserialize::<PaymentRow>().enumerate() {
        let row = record?;
        payments.push(row.into_payment(index + 2)?);
    }

    Ok(payments)
}

#[derive(Debug, Deserialize)]
struct PaymentRow {
    #[serde(alias = "\u{feff}Application ID", rename = "Application ID")]
    application_id: String,
    #[serde(rename = "Amount")]
    amount: String,
    #[serde(rename = "Status")]
    status: String,
    #[serde(
        rename = "Payment Date",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    payment_date: Option<String>,
}

impl PaymentRow {
    fn into_payment(self, row: usize) -> Result<Payment, RowError> {
        let invalid = |reason: String| RowError::Invalid { row, reason };

        let application_id = self.application_id.trim().to_string();
        if application_id.is_empty() {
            return Err(invalid("missing application id".to_string()));
        }

        let amount = parse_amount(&self.amount)
            .ok_or_else(|| invalid(format!("unreadable amount '{}'", self.amount)))?;
        let status = status_for(&self.status)
            .ok_or_else(|| invalid(format!("unknown payment status '{}'", self.status)))?;
        let payment_date = self
            .payment_date
            .as_deref()
            .and_then(parse_date)
            .ok_or_else(|| invalid("missing or unreadable payment date".to_string()))?;

        Ok(Payment {
            application_id: ApplicationId(application_id),
            amount,
            status,
            payment_date,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc().date());
    }

    for format in ["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }

    None
}

#[cfg(test)]
pub(crate) fn parse_date_for_tests(value: &str) -> Option<NaiveDate> {
    parse_date(value)
}
