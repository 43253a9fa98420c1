//! Input validation and record construction for the ledger.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::ledger::evidence::{self, Attach};
use crate::models::{
    EvidenceParent, EvidenceSlot, InventoryItem, ItemPatch, LineView, LoanDetail, LoanLineItem,
    LoanRecord, LoanStatus, NewItem, NewLoan,
};
use crate::normalize::normalize_code;

fn trimmed(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value.as_deref().and_then(trimmed)
}

/// Builds the record for a newly registered item.
pub fn new_item(owner_id: Uuid, attrs: NewItem, now: DateTime<Utc>) -> AppResult<InventoryItem> {
    let name = trimmed(&attrs.name);
    let code = trimmed(&attrs.code);
    let category = trimmed(&attrs.category);
    let condition = trimmed(&attrs.condition);

    let mut missing = Vec::new();
    if name.is_none() {
        missing.push("name");
    }
    if code.is_none() {
        missing.push("code");
    }
    if attrs.quantity <= 0 {
        missing.push("quantity");
    }
    if category.is_none() {
        missing.push("category");
    }
    if condition.is_none() {
        missing.push("condition");
    }
    let (Some(name), Some(code), Some(category), Some(condition), true) =
        (name, code, category, condition, missing.is_empty())
    else {
        return Err(AppError::missing_fields(&missing));
    };

    Ok(InventoryItem {
        id: Uuid::new_v4(),
        owner_id,
        code_key: normalize_code(&code),
        name,
        code,
        quantity: attrs.quantity,
        category,
        condition,
        location: optional(attrs.location),
        acquired_on: attrs.acquired_on,
        description: optional(attrs.description),
        created_at: now,
        updated_at: now,
    })
}

/// Applies a partial update. Returns whether the code changed.
pub fn apply_patch(item: &mut InventoryItem, patch: ItemPatch, now: DateTime<Utc>) -> AppResult<bool> {
    let required = |value: Option<String>, field: &str| -> AppResult<Option<String>> {
        match value {
            None => Ok(None),
            Some(v) => trimmed(&v)
                .map(Some)
                .ok_or_else(|| AppError::missing_fields(&[field])),
        }
    };

    let name = required(patch.name, "name")?;
    let code = required(patch.code, "code")?;
    let category = required(patch.category, "category")?;
    let condition = required(patch.condition, "condition")?;
    if matches!(patch.quantity, Some(q) if q <= 0) {
        return Err(AppError::missing_fields(&["quantity"]));
    }

    let mut code_changed = false;
    if let Some(name) = name {
        item.name = name;
    }
    if let Some(code) = code {
        let key = normalize_code(&code);
        code_changed = key != item.code_key;
        item.code = code;
        item.code_key = key;
    }
    if let Some(quantity) = patch.quantity {
        item.quantity = quantity;
    }
    if let Some(category) = category {
        item.category = category;
    }
    if let Some(condition) = condition {
        item.condition = condition;
    }
    if let Some(location) = patch.location {
        item.location = trimmed(&location);
    }
    if let Some(acquired_on) = patch.acquired_on {
        item.acquired_on = acquired_on;
    }
    if let Some(description) = patch.description {
        item.description = trimmed(&description);
    }
    item.updated_at = now;
    Ok(code_changed)
}

/// Builds the loan, its lines and their loan-time evidence as one unit.
///
/// Availability is not checked here; the store does that under its lock.
pub fn new_loan(owner_id: Uuid, draft: NewLoan, now: DateTime<Utc>) -> AppResult<LoanDetail> {
    let borrower_name =
        trimmed(&draft.borrower_name).ok_or_else(|| AppError::missing_fields(&["borrower_name"]))?;
    if draft.lines.is_empty() {
        return Err(AppError::missing_fields(&["lines"]));
    }
    if draft.due_date < draft.loan_date {
        return Err(AppError::Validation(format!(
            "due date {} is before loan date {}",
            draft.due_date, draft.loan_date
        )));
    }

    let mut seen = HashSet::new();
    for line in &draft.lines {
        if line.quantity <= 0 {
            return Err(AppError::Validation(format!(
                "quantity for item {} must be greater than zero",
                line.item_id
            )));
        }
        if !seen.insert(line.item_id) {
            return Err(AppError::Validation(format!(
                "item {} is listed more than once",
                line.item_id
            )));
        }
    }

    let item_ids: Vec<Uuid> = draft.lines.iter().map(|l| l.item_id).collect();
    let photos = evidence::assign(&item_ids, &draft.evidence)?;

    let loan = LoanRecord {
        id: Uuid::new_v4(),
        owner_id,
        borrower_name,
        borrower_phone: optional(draft.borrower_phone),
        loan_date: draft.loan_date,
        due_date: draft.due_date,
        returned_on: None,
        status: LoanStatus::Borrowed,
        created_at: now,
        updated_at: now,
    };

    let mut lines = Vec::with_capacity(draft.lines.len());
    for (position, (request, photo)) in draft.lines.iter().zip(photos).enumerate() {
        let line = LoanLineItem {
            id: Uuid::new_v4(),
            loan_id: loan.id,
            item_id: request.item_id,
            quantity: request.quantity,
            position: position as i32,
        };
        let photo = match photo {
            Some(path) => Some(
                evidence::plan_attach(
                    None,
                    EvidenceParent::LineItem(line.id),
                    EvidenceSlot::Loan,
                    &path,
                    now,
                )?
                .into_photo(),
            ),
            None => None,
        };
        lines.push(LineView { line, photo });
    }

    Ok(LoanDetail { loan, lines })
}

/// Validates a return against the loan's current state.
pub fn check_return(loan: &LoanRecord, returned_on: NaiveDate) -> AppResult<()> {
    if !loan.status.can_transition_to(LoanStatus::Returned) {
        return Err(AppError::Validation(format!(
            "loan {} is already {}",
            loan.id, loan.status
        )));
    }
    if returned_on < loan.loan_date {
        return Err(AppError::Validation(format!(
            "return date {} is before loan date {}",
            returned_on, loan.loan_date
        )));
    }
    Ok(())
}

/// Marks the loan returned and plans the return-time evidence per line.
///
/// Returns the attach plans for lines that received a photo, in line order.
pub fn apply_return(
    detail: &mut LoanDetail,
    returned_on: NaiveDate,
    photos: Vec<Option<String>>,
    now: DateTime<Utc>,
) -> AppResult<Vec<Attach>> {
    check_return(&detail.loan, returned_on)?;

    let mut planned = Vec::new();
    for (idx, (view, path)) in detail.lines.iter().zip(photos).enumerate() {
        let Some(path) = path else { continue };
        let plan = evidence::plan_attach(
            view.photo.as_ref(),
            EvidenceParent::LineItem(view.line.id),
            EvidenceSlot::Return,
            &path,
            now,
        )?;
        planned.push((idx, plan));
    }

    let mut plans = Vec::with_capacity(planned.len());
    for (idx, plan) in planned {
        detail.lines[idx].photo = Some(plan.photo().clone());
        plans.push(plan);
    }
    detail.loan.status = LoanStatus::Returned;
    detail.loan.returned_on = Some(returned_on);
    detail.loan.updated_at = now;
    Ok(plans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EvidenceInput, LineRequest};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn attrs() -> NewItem {
        NewItem {
            name: "Projector".into(),
            code: "HMSI/ELK/001".into(),
            quantity: 2,
            category: "Electronics".into(),
            condition: "good".into(),
            ..Default::default()
        }
    }

    fn draft(lines: Vec<LineRequest>) -> NewLoan {
        NewLoan {
            borrower_name: "Rani".into(),
            borrower_phone: Some("0812".into()),
            loan_date: date("2025-01-01"),
            due_date: date("2025-01-10"),
            lines,
            evidence: EvidenceInput::None,
        }
    }

    #[test]
    fn test_new_item_normalizes_code() {
        let item = new_item(Uuid::new_v4(), attrs(), Utc::now()).unwrap();
        assert_eq!(item.code, "HMSI/ELK/001");
        assert_eq!(item.code_key, "hmsi/elk/1");
    }

    #[test]
    fn test_new_item_names_all_missing_fields() {
        let err = new_item(
            Uuid::new_v4(),
            NewItem {
                name: " ".into(),
                quantity: 0,
                ..attrs()
            },
            Utc::now(),
        )
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("name"), "{}", msg);
        assert!(msg.contains("quantity"), "{}", msg);
        assert!(!msg.contains("code"), "{}", msg);
    }

    #[test]
    fn test_patch_rejects_blank_required_field() {
        let mut item = new_item(Uuid::new_v4(), attrs(), Utc::now()).unwrap();
        let patch = ItemPatch {
            condition: Some("".into()),
            ..Default::default()
        };
        assert!(apply_patch(&mut item, patch, Utc::now()).is_err());
        assert_eq!(item.condition, "good");
    }

    #[test]
    fn test_patch_sets_and_clears_acquired_on() {
        let mut item = new_item(Uuid::new_v4(), attrs(), Utc::now()).unwrap();
        let set = ItemPatch {
            acquired_on: Some(Some(date("2023-04-01"))),
            ..Default::default()
        };
        apply_patch(&mut item, set, Utc::now()).unwrap();
        assert_eq!(item.acquired_on, Some(date("2023-04-01")));

        apply_patch(&mut item, ItemPatch::default(), Utc::now()).unwrap();
        assert_eq!(item.acquired_on, Some(date("2023-04-01")));

        let clear = ItemPatch {
            acquired_on: Some(None),
            ..Default::default()
        };
        apply_patch(&mut item, clear, Utc::now()).unwrap();
        assert_eq!(item.acquired_on, None);
    }

    #[test]
    fn test_patch_reports_code_change_by_key() {
        let mut item = new_item(Uuid::new_v4(), attrs(), Utc::now()).unwrap();
        let same = ItemPatch {
            code: Some("hmsi-elk-1".into()),
            ..Default::default()
        };
        assert!(!apply_patch(&mut item, same, Utc::now()).unwrap());
        assert_eq!(item.code, "hmsi-elk-1");
        let other = ItemPatch {
            code: Some("hmsi-elk-2".into()),
            ..Default::default()
        };
        assert!(apply_patch(&mut item, other, Utc::now()).unwrap());
    }

    #[test]
    fn test_new_loan_rejects_repeated_item() {
        let item = Uuid::new_v4();
        let err = new_loan(
            Uuid::new_v4(),
            draft(vec![
                LineRequest { item_id: item, quantity: 1 },
                LineRequest { item_id: item, quantity: 2 },
            ]),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_new_loan_rejects_due_before_loan_date() {
        let mut d = draft(vec![LineRequest { item_id: Uuid::new_v4(), quantity: 1 }]);
        d.due_date = date("2024-12-31");
        assert!(new_loan(Uuid::new_v4(), d, Utc::now()).is_err());
    }

    #[test]
    fn test_new_loan_places_photos_on_lines() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut d = draft(vec![
            LineRequest { item_id: a, quantity: 1 },
            LineRequest { item_id: b, quantity: 1 },
        ]);
        d.evidence = EvidenceInput::Mapped(vec![(b, "b.jpg".into())]);
        let detail = new_loan(Uuid::new_v4(), d, Utc::now()).unwrap();
        assert_eq!(detail.loan.status, LoanStatus::Borrowed);
        assert!(detail.lines[0].photo.is_none());
        let photo = detail.lines[1].photo.as_ref().unwrap();
        assert_eq!(photo.line_item_id, Some(detail.lines[1].line.id));
        assert_eq!(photo.loan_image_path.as_deref(), Some("b.jpg"));
    }

    #[test]
    fn test_return_is_terminal() {
        let d = draft(vec![LineRequest { item_id: Uuid::new_v4(), quantity: 1 }]);
        let mut detail = new_loan(Uuid::new_v4(), d, Utc::now()).unwrap();
        apply_return(&mut detail, date("2025-01-05"), vec![None], Utc::now()).unwrap();
        assert_eq!(detail.loan.status, LoanStatus::Returned);
        assert!(apply_return(&mut detail, date("2025-01-06"), vec![None], Utc::now()).is_err());
    }

    #[test]
    fn test_return_before_loan_date_rejected() {
        let d = draft(vec![LineRequest { item_id: Uuid::new_v4(), quantity: 1 }]);
        let mut detail = new_loan(Uuid::new_v4(), d, Utc::now()).unwrap();
        assert!(apply_return(&mut detail, date("2024-12-01"), vec![None], Utc::now()).is_err());
        assert_eq!(detail.loan.status, LoanStatus::Borrowed);
    }
}
