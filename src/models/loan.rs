use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

use super::EvidencePhoto;

/// Persisted loan state. `Borrowed → Returned` is the only transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Borrowed,
    Returned,
}

#[derive(Error, Debug)]
#[error("unknown loan status '{0}'")]
pub struct UnknownStatus(pub String);

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Borrowed => "borrowed",
            LoanStatus::Returned => "returned",
        }
    }

    pub fn parse(s: &str) -> Result<Self, UnknownStatus> {
        match s.to_ascii_lowercase().as_str() {
            "borrowed" => Ok(LoanStatus::Borrowed),
            "returned" => Ok(LoanStatus::Returned),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }

    pub fn can_transition_to(&self, next: LoanStatus) -> bool {
        matches!((self, next), (LoanStatus::Borrowed, LoanStatus::Returned))
    }
}

impl TryFrom<String> for LoanStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        LoanStatus::parse(&value)
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display-only comparison of the due date with the actual return date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnTiming {
    OnTime,
    Late,
}

impl ReturnTiming {
    /// Not yet returned counts as on time.
    pub fn of(due_date: NaiveDate, returned_on: Option<NaiveDate>) -> Self {
        match returned_on {
            Some(actual) if actual > due_date => ReturnTiming::Late,
            _ => ReturnTiming::OnTime,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnTiming::OnTime => "on_time",
            ReturnTiming::Late => "late",
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct LoanRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub borrower_name: String,
    pub borrower_phone: Option<String>,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    pub returned_on: Option<NaiveDate>,
    #[sqlx(try_from = "String")]
    pub status: LoanStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LoanRecord {
    pub fn timing(&self) -> ReturnTiming {
        ReturnTiming::of(self.due_date, self.returned_on)
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct LoanLineItem {
    pub id: Uuid,
    pub loan_id: Uuid,
    pub item_id: Uuid,
    pub quantity: i32,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineView {
    pub line: LoanLineItem,
    pub photo: Option<EvidencePhoto>,
}

/// A loan with its line items (in request order) and their evidence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoanDetail {
    pub loan: LoanRecord,
    pub lines: Vec<LineView>,
}

impl LoanDetail {
    pub fn paths(&self) -> Vec<String> {
        self.lines
            .iter()
            .filter_map(|l| l.photo.as_ref())
            .flat_map(|p| p.paths().map(str::to_string))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LineRequest {
    pub item_id: Uuid,
    pub quantity: i32,
}

/// How photos are matched to a loan's lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub enum EvidenceInput {
    #[default]
    None,
    /// Photo path per item id.
    Mapped(Vec<(Uuid, String)>),
    /// Photo paths in line order; may be shorter than the line list.
    Positional(Vec<String>),
}

impl EvidenceInput {
    /// Every supplied path, in request order.
    pub fn paths(&self) -> Vec<&str> {
        match self {
            EvidenceInput::None => Vec::new(),
            EvidenceInput::Mapped(entries) => entries.iter().map(|(_, path)| path.as_str()).collect(),
            EvidenceInput::Positional(paths) => paths.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewLoan {
    pub borrower_name: String,
    pub borrower_phone: Option<String>,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    pub lines: Vec<LineRequest>,
    pub evidence: EvidenceInput,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoanReturn {
    pub returned_on: NaiveDate,
    pub evidence: EvidenceInput,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoanFilter {
    pub status: Option<LoanStatus>,
    /// Only loans due on or before this date.
    pub due_before: Option<NaiveDate>,
}

impl LoanFilter {
    pub fn matches(&self, loan: &LoanRecord) -> bool {
        self.status.map_or(true, |s| loan.status == s)
            && self.due_before.map_or(true, |d| loan.due_date <= d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_return_timing() {
        let due = date("2025-01-10");
        assert_eq!(ReturnTiming::of(due, Some(date("2025-01-12"))), ReturnTiming::Late);
        assert_eq!(ReturnTiming::of(due, Some(date("2025-01-09"))), ReturnTiming::OnTime);
        assert_eq!(ReturnTiming::of(due, Some(due)), ReturnTiming::OnTime);
        assert_eq!(ReturnTiming::of(due, None), ReturnTiming::OnTime);
    }

    #[test]
    fn test_status_transitions() {
        assert!(LoanStatus::Borrowed.can_transition_to(LoanStatus::Returned));
        assert!(!LoanStatus::Returned.can_transition_to(LoanStatus::Borrowed));
        assert!(!LoanStatus::Returned.can_transition_to(LoanStatus::Returned));
        assert!(!LoanStatus::Borrowed.can_transition_to(LoanStatus::Borrowed));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(LoanStatus::parse("Borrowed").unwrap(), LoanStatus::Borrowed);
        assert_eq!(LoanStatus::try_from("returned".to_string()).unwrap(), LoanStatus::Returned);
        assert!(LoanStatus::parse("lost").is_err());
        assert_eq!(LoanStatus::Returned.to_string(), "returned");
    }
}
