use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::EvidencePhoto;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct InventoryItem {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub code: String,
    /// Normalized form of `code`, unique per owner.
    pub code_key: String,
    pub quantity: i32,
    pub category: String,
    pub condition: String,
    pub location: Option<String>,
    pub acquired_on: Option<NaiveDate>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Item together with its live availability figures and asset photos.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemView {
    pub item: InventoryItem,
    pub borrowed: i64,
    pub photos: Vec<EvidencePhoto>,
}

impl ItemView {
    pub fn available(&self) -> i64 {
        i64::from(self.item.quantity) - self.borrowed
    }

    pub fn availability(&self) -> Availability {
        Availability {
            item_id: self.item.id,
            total: self.item.quantity,
            borrowed: self.borrowed,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Availability {
    pub item_id: Uuid,
    pub total: i32,
    pub borrowed: i64,
}

impl Availability {
    pub fn available(&self) -> i64 {
        i64::from(self.total) - self.borrowed
    }
}

/// Attributes supplied when registering an item.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub code: String,
    pub quantity: i32,
    pub category: String,
    pub condition: String,
    pub location: Option<String>,
    pub acquired_on: Option<NaiveDate>,
    pub description: Option<String>,
}

/// Partial update; `None` leaves the field unchanged. Blank text and
/// `Some(None)` dates clear optional fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub code: Option<String>,
    pub quantity: Option<i32>,
    pub category: Option<String>,
    pub condition: Option<String>,
    pub location: Option<String>,
    pub acquired_on: Option<Option<NaiveDate>>,
    pub description: Option<String>,
}
