use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{EvidenceInput, EvidenceParent, EvidencePhoto, EvidenceSlot};

/// Matches supplied photos to loan lines, given the lines' item ids in order.
///
/// Positional lists may be shorter than the line list; longer lists are
/// rejected rather than wrapped onto earlier lines.
pub fn assign(item_ids: &[Uuid], input: &EvidenceInput) -> AppResult<Vec<Option<String>>> {
    let mut assigned: Vec<Option<String>> = vec![None; item_ids.len()];
    match input {
        EvidenceInput::None => {}
        EvidenceInput::Positional(paths) => {
            if paths.len() > item_ids.len() {
                return Err(AppError::Validation(format!(
                    "{} photo(s) supplied for {} line(s); map photos to items explicitly",
                    paths.len(),
                    item_ids.len()
                )));
            }
            for (slot, path) in assigned.iter_mut().zip(paths) {
                *slot = Some(non_blank(path)?);
            }
        }
        EvidenceInput::Mapped(entries) => {
            for (item_id, path) in entries {
                let idx = item_ids
                    .iter()
                    .position(|id| id == item_id)
                    .ok_or_else(|| {
                        AppError::Validation(format!(
                            "photo mapped to item {} which is not on this loan",
                            item_id
                        ))
                    })?;
                if assigned[idx].is_some() {
                    return Err(AppError::Validation(format!(
                        "more than one photo mapped to item {}",
                        item_id
                    )));
                }
                assigned[idx] = Some(non_blank(path)?);
            }
        }
    }
    Ok(assigned)
}

fn non_blank(path: &str) -> AppResult<String> {
    let path = path.trim();
    if path.is_empty() {
        return Err(AppError::Validation("photo path must not be empty".to_string()));
    }
    Ok(path.to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub enum Attach {
    Insert(EvidencePhoto),
    Update(EvidencePhoto),
}

impl Attach {
    pub fn photo(&self) -> &EvidencePhoto {
        match self {
            Attach::Insert(p) | Attach::Update(p) => p,
        }
    }

    pub fn into_photo(self) -> EvidencePhoto {
        match self {
            Attach::Insert(p) | Attach::Update(p) => p,
        }
    }
}

/// Decides how a photo lands on its parent.
///
/// A line item keeps a single record carrying both its loan-time and
/// return-time image, so an existing record is updated in place; a slot
/// that already holds a photo is never overwritten. Inventory items collect
/// any number of asset photos, each in its own record.
pub fn plan_attach(
    existing: Option<&EvidencePhoto>,
    parent: EvidenceParent,
    slot: EvidenceSlot,
    path: &str,
    now: DateTime<Utc>,
) -> AppResult<Attach> {
    let path = non_blank(path)?;
    let (mut photo, insert) = match (parent, existing) {
        (EvidenceParent::LineItem(_), Some(current)) => {
            if current.slot(slot).is_some() {
                return Err(AppError::Validation(format!(
                    "line already has a {} photo",
                    slot.as_str()
                )));
            }
            (current.clone(), false)
        }
        _ => (EvidencePhoto::new(parent), true),
    };
    match slot {
        EvidenceSlot::Loan => photo.loan_image_path = Some(path),
        EvidenceSlot::Return => photo.return_image_path = Some(path),
    }
    photo.updated_at = now;
    Ok(if insert {
        photo.created_at = now;
        Attach::Insert(photo)
    } else {
        Attach::Update(photo)
    })
}
