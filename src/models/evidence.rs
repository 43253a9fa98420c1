use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct EvidencePhoto {
    pub id: Uuid,
    pub line_item_id: Option<Uuid>,
    pub item_id: Option<Uuid>,
    pub loan_image_path: Option<String>,
    pub return_image_path: Option<String>,
    pub synced: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EvidencePhoto {
    pub fn new(parent: EvidenceParent) -> Self {
        let now = Utc::now();
        let (line_item_id, item_id) = match parent {
            EvidenceParent::LineItem(id) => (Some(id), None),
            EvidenceParent::Item(id) => (None, Some(id)),
        };
        Self {
            id: Uuid::new_v4(),
            line_item_id,
            item_id,
            loan_image_path: None,
            return_image_path: None,
            synced: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn slot(&self, slot: EvidenceSlot) -> Option<&str> {
        match slot {
            EvidenceSlot::Loan => self.loan_image_path.as_deref(),
            EvidenceSlot::Return => self.return_image_path.as_deref(),
        }
    }

    /// Blob paths referenced by this record.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.loan_image_path
            .as_deref()
            .into_iter()
            .chain(self.return_image_path.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvidenceParent {
    LineItem(Uuid),
    Item(Uuid),
}

/// Moment a photo documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvidenceSlot {
    Loan,
    Return,
}

impl EvidenceSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceSlot::Loan => "loan",
            EvidenceSlot::Return => "return",
        }
    }
}
