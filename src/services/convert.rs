//! Conversions between wire messages and ledger models.
//!
//! Dates travel as `YYYY-MM-DD`, timestamps as RFC 3339, absent optional
//! values as empty strings.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{EvidenceInput, EvidencePhoto, ItemView, LineView, LoanDetail};
use crate::proto::common::{self, PhotoRef};
use crate::proto::{inventory, loans};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_id(field: &str, value: &str) -> AppResult<Uuid> {
    if value.trim().is_empty() {
        return Err(AppError::missing_fields(&[field]));
    }
    Uuid::parse_str(value.trim())
        .map_err(|_| AppError::Validation(format!("{} is not a valid id: '{}'", field, value)))
}

/// Empty string means "not given".
pub fn parse_optional_id(field: &str, value: &str) -> AppResult<Option<Uuid>> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    parse_id(field, value).map(Some)
}

pub fn parse_date(field: &str, value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        AppError::Validation(format!("{} must be a date (YYYY-MM-DD), got '{}'", field, value))
    })
}

pub fn parse_optional_date(field: &str, value: &str) -> AppResult<Option<NaiveDate>> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    parse_date(field, value).map(Some)
}

/// Empty means today (UTC).
pub fn date_or_today(field: &str, value: &str) -> AppResult<NaiveDate> {
    Ok(parse_optional_date(field, value)?.unwrap_or_else(|| Utc::now().date_naive()))
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string()).unwrap_or_default()
}

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn id_or_empty(id: Option<Uuid>) -> String {
    id.map(|id| id.to_string()).unwrap_or_default()
}

/// Builds the evidence input from either the mapping or the positional list.
pub fn evidence_input(photos: Vec<PhotoRef>, positional: Vec<String>) -> AppResult<EvidenceInput> {
    match (photos.is_empty(), positional.is_empty()) {
        (true, true) => Ok(EvidenceInput::None),
        (true, false) => Ok(EvidenceInput::Positional(positional)),
        (false, true) => {
            let mapped = photos
                .into_iter()
                .map(|p| Ok((parse_id("photos.item_id", &p.item_id)?, p.path)))
                .collect::<AppResult<Vec<_>>>()?;
            Ok(EvidenceInput::Mapped(mapped))
        }
        (false, false) => Err(AppError::Validation(
            "send either photos or positional_photos, not both".to_string(),
        )),
    }
}

pub fn photo_to_proto(photo: &EvidencePhoto) -> common::EvidencePhoto {
    common::EvidencePhoto {
        id: photo.id.to_string(),
        line_item_id: id_or_empty(photo.line_item_id),
        item_id: id_or_empty(photo.item_id),
        loan_image_path: photo.loan_image_path.clone().unwrap_or_default(),
        return_image_path: photo.return_image_path.clone().unwrap_or_default(),
        synced: photo.synced,
        updated_at: format_timestamp(photo.updated_at),
    }
}

pub fn item_to_proto(view: &ItemView) -> inventory::Item {
    let item = &view.item;
    inventory::Item {
        id: item.id.to_string(),
        owner_id: item.owner_id.to_string(),
        name: item.name.clone(),
        code: item.code.clone(),
        quantity: item.quantity,
        category: item.category.clone(),
        condition: item.condition.clone(),
        location: item.location.clone().unwrap_or_default(),
        acquired_on: format_date(item.acquired_on),
        description: item.description.clone().unwrap_or_default(),
        created_at: format_timestamp(item.created_at),
        updated_at: format_timestamp(item.updated_at),
        borrowed_quantity: view.borrowed,
        available_quantity: view.available(),
        photos: view.photos.iter().map(photo_to_proto).collect(),
    }
}

fn line_to_proto(view: &LineView) -> loans::LineItem {
    loans::LineItem {
        id: view.line.id.to_string(),
        item_id: view.line.item_id.to_string(),
        quantity: view.line.quantity,
        photo: view.photo.as_ref().map(photo_to_proto),
    }
}

pub fn loan_to_proto(detail: &LoanDetail) -> loans::Loan {
    let loan = &detail.loan;
    loans::Loan {
        id: loan.id.to_string(),
        owner_id: loan.owner_id.to_string(),
        borrower_name: loan.borrower_name.clone(),
        borrower_phone: loan.borrower_phone.clone().unwrap_or_default(),
        loan_date: format_date(Some(loan.loan_date)),
        due_date: format_date(Some(loan.due_date)),
        returned_on: format_date(loan.returned_on),
        status: loan.status.as_str().to_string(),
        timing: loan.timing().as_str().to_string(),
        created_at: format_timestamp(loan.created_at),
        updated_at: format_timestamp(loan.updated_at),
        lines: detail.lines.iter().map(line_to_proto).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_names_field() {
        match parse_id("item_id", "") {
            Err(AppError::Validation(msg)) => assert!(msg.contains("item_id")),
            other => panic!("unexpected: {:?}", other),
        }
        assert!(matches!(parse_id("item_id", "nope"), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_dates() {
        assert_eq!(
            parse_date("due_date", "2025-01-10").unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()
        );
        assert!(parse_date("due_date", "10/01/2025").is_err());
        assert_eq!(parse_optional_date("acquired_on", " ").unwrap(), None);
        assert_eq!(format_date(None), "");
    }

    #[test]
    fn test_evidence_input_forms() {
        let item = Uuid::new_v4();
        let mapped = evidence_input(
            vec![PhotoRef { item_id: item.to_string(), path: "gs://b/k.jpg".into() }],
            vec![],
        )
        .unwrap();
        assert_eq!(mapped, EvidenceInput::Mapped(vec![(item, "gs://b/k.jpg".into())]));

        assert_eq!(evidence_input(vec![], vec![]).unwrap(), EvidenceInput::None);
        assert!(evidence_input(
            vec![PhotoRef { item_id: item.to_string(), path: "a".into() }],
            vec!["b".into()],
        )
        .is_err());
    }
}
