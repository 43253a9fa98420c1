//! Loan & availability ledger.
//!
//! [`Ledger`] is the entry point the gRPC services call. It runs the pure
//! rules in [`rules`], [`availability`] and [`evidence`], hands finished
//! records to a [`LedgerStore`], and cleans up blobs after deletes.

pub mod availability;
pub mod evidence;
pub mod rules;

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    Availability, EvidenceParent, EvidencePhoto, EvidenceSlot, InventoryItem, ItemPatch, ItemView,
    LoanDetail, LoanFilter, LoanReturn, NewItem, NewLoan,
};
use crate::normalize::normalize_code;
use crate::storage::{content_type_for, owned_key, photo_key, StorageBackend};
use crate::store::LedgerStore;
use crate::sync::Snapshot;

/// Outcome of probing a code against the owner's inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeCheck {
    pub normalized: String,
    pub existing_id: Option<Uuid>,
}

impl CodeCheck {
    pub fn is_duplicate(&self) -> bool {
        self.existing_id.is_some()
    }
}

#[derive(Clone)]
pub struct Ledger {
    store: Arc<dyn LedgerStore>,
    blobs: Arc<dyn StorageBackend>,
}

impl Ledger {
    pub fn new(store: Arc<dyn LedgerStore>, blobs: Arc<dyn StorageBackend>) -> Self {
        Self { store, blobs }
    }

    // ---- inventory ----

    pub async fn create_item(&self, owner_id: Uuid, attrs: NewItem) -> AppResult<InventoryItem> {
        let item = rules::new_item(owner_id, attrs, Utc::now())?;
        let item = self.store.insert_item(item).await?;
        tracing::info!("Created item {} ({}) for owner {}", item.id, item.code, owner_id);
        Ok(item)
    }

    pub async fn get_item(&self, owner_id: Uuid, id: Uuid) -> AppResult<ItemView> {
        self.store.item(owner_id, id).await
    }

    /// Items of the owner, optionally restricted to one category.
    pub async fn list_items(&self, owner_id: Uuid, category: Option<&str>) -> AppResult<Vec<ItemView>> {
        let items = self.store.items(owner_id).await?;
        Ok(match category.map(str::trim).filter(|c| !c.is_empty()) {
            Some(category) => items
                .into_iter()
                .filter(|v| v.item.category.eq_ignore_ascii_case(category))
                .collect(),
            None => items,
        })
    }

    pub async fn update_item(&self, owner_id: Uuid, id: Uuid, patch: ItemPatch) -> AppResult<InventoryItem> {
        let item = self.store.update_item(owner_id, id, patch).await?;
        tracing::info!("Updated item {} for owner {}", id, owner_id);
        Ok(item)
    }

    /// Deletes the item and its asset photos. Blob removal is best-effort.
    pub async fn delete_item(&self, owner_id: Uuid, id: Uuid) -> AppResult<()> {
        let photos = self.store.delete_item(owner_id, id).await?;
        tracing::info!(
            "Deleted item {} for owner {} ({} photo(s))",
            id,
            owner_id,
            photos.len()
        );
        let paths: Vec<String> = photos
            .iter()
            .flat_map(|p| p.paths().map(str::to_string))
            .collect();
        self.remove_blobs(owner_id, &paths).await;
        Ok(())
    }

    pub async fn borrowed_quantity(&self, owner_id: Uuid, item_id: Uuid) -> AppResult<i64> {
        self.store.borrowed_quantity(owner_id, item_id).await
    }

    pub async fn available_quantity(&self, owner_id: Uuid, item_id: Uuid) -> AppResult<i64> {
        Ok(self.availability(owner_id, item_id).await?.available())
    }

    pub async fn availability(&self, owner_id: Uuid, item_id: Uuid) -> AppResult<Availability> {
        Ok(self.store.item(owner_id, item_id).await?.availability())
    }

    /// Reports whether `code` collides with another item of the owner.
    pub async fn check_code(&self, owner_id: Uuid, code: &str, exclude: Option<Uuid>) -> AppResult<CodeCheck> {
        let normalized = normalize_code(code);
        if normalized.is_empty() {
            return Err(AppError::missing_fields(&["code"]));
        }
        let existing_id = self.store.find_code(owner_id, &normalized, exclude).await?;
        Ok(CodeCheck {
            normalized,
            existing_id,
        })
    }

    // ---- loans ----

    pub async fn create_loan(&self, owner_id: Uuid, draft: NewLoan) -> AppResult<LoanDetail> {
        self.check_paths(owner_id, draft.evidence.paths())?;
        let detail = rules::new_loan(owner_id, draft, Utc::now())?;
        match self.store.insert_loan(detail).await {
            Ok(detail) => {
                tracing::info!(
                    "Created loan {} for owner {} with {} line(s)",
                    detail.loan.id,
                    owner_id,
                    detail.lines.len()
                );
                Ok(detail)
            }
            Err(e @ AppError::InsufficientAvailability(_)) => {
                tracing::warn!("Rejected loan for owner {}: {}", owner_id, e);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn get_loan(&self, owner_id: Uuid, id: Uuid) -> AppResult<LoanDetail> {
        self.store.loan(owner_id, id).await
    }

    pub async fn list_loans(&self, owner_id: Uuid, filter: &LoanFilter) -> AppResult<Vec<LoanDetail>> {
        self.store.loans(owner_id, filter).await
    }

    pub async fn return_loan(&self, owner_id: Uuid, id: Uuid, ret: LoanReturn) -> AppResult<LoanDetail> {
        self.check_paths(owner_id, ret.evidence.paths())?;
        let detail = self.store.return_loan(owner_id, id, ret).await?;
        tracing::info!(
            "Returned loan {} for owner {} ({})",
            id,
            owner_id,
            detail.loan.timing().as_str()
        );
        Ok(detail)
    }

    /// Deletes the loan with its lines and evidence. Blob removal is best-effort.
    pub async fn delete_loan(&self, owner_id: Uuid, id: Uuid) -> AppResult<()> {
        let detail = self.store.delete_loan(owner_id, id).await?;
        tracing::info!("Deleted loan {} for owner {}", id, owner_id);
        self.remove_blobs(owner_id, &detail.paths()).await;
        Ok(())
    }

    // ---- evidence ----

    /// Stores photo bytes and returns the blob path to reference from a
    /// loan, a return or an item.
    pub async fn upload_photo(
        &self,
        owner_id: Uuid,
        filename: &str,
        content_type: Option<&str>,
        data: &[u8],
    ) -> AppResult<String> {
        if data.is_empty() {
            return Err(AppError::missing_fields(&["content"]));
        }
        let key = photo_key(owner_id, filename, data);
        let content_type = content_type
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| content_type_for(filename));
        let path = self.blobs.upload(&key, data, content_type).await?;
        tracing::debug!("Uploaded {} bytes to {}", data.len(), path);
        Ok(path)
    }

    /// Returns the bytes behind one of the owner's photo paths and their
    /// content type.
    pub async fn download_photo(&self, owner_id: Uuid, path: &str) -> AppResult<(Vec<u8>, &'static str)> {
        let path = path.trim();
        if path.is_empty() {
            return Err(AppError::missing_fields(&["path"]));
        }
        owned_key(self.blobs.as_ref(), owner_id, path)?;
        let data = self.blobs.download(path).await?;
        Ok((data, content_type_for(path)))
    }

    pub async fn attach_item_photo(&self, owner_id: Uuid, item_id: Uuid, path: &str) -> AppResult<EvidencePhoto> {
        self.check_paths(owner_id, [path])?;
        let photo = self
            .store
            .attach_evidence(owner_id, EvidenceParent::Item(item_id), EvidenceSlot::Loan, path)
            .await?;
        tracing::info!("Attached photo {} to item {}", photo.id, item_id);
        Ok(photo)
    }

    /// Attaches a loan-time or return-time photo to a single loan line.
    pub async fn attach_line_photo(
        &self,
        owner_id: Uuid,
        line_item_id: Uuid,
        slot: EvidenceSlot,
        path: &str,
    ) -> AppResult<EvidencePhoto> {
        self.check_paths(owner_id, [path])?;
        let photo = self
            .store
            .attach_evidence(owner_id, EvidenceParent::LineItem(line_item_id), slot, path)
            .await?;
        tracing::info!("Attached {:?} photo to line {}", slot, line_item_id);
        Ok(photo)
    }

    pub async fn delete_item_photo(&self, owner_id: Uuid, photo_id: Uuid) -> AppResult<()> {
        let photo = self.store.delete_item_photo(owner_id, photo_id).await?;
        tracing::info!("Deleted photo {} for owner {}", photo_id, owner_id);
        let paths: Vec<String> = photo.paths().map(str::to_string).collect();
        self.remove_blobs(owner_id, &paths).await;
        Ok(())
    }

    // ---- sync ----

    pub async fn snapshot(&self, owner_id: Uuid) -> AppResult<Snapshot> {
        let snapshot = self.store.snapshot(owner_id).await?;
        tracing::debug!(
            "Snapshot for owner {}: {} item(s), {} loan(s)",
            owner_id,
            snapshot.items.len(),
            snapshot.loans.len()
        );
        Ok(snapshot)
    }

    /// Rejects photo paths that are not uploads of the owner. Blank paths
    /// are left to the record rules, which name them.
    fn check_paths<'a>(&self, owner_id: Uuid, paths: impl IntoIterator<Item = &'a str>) -> AppResult<()> {
        for path in paths.into_iter().filter(|p| !p.trim().is_empty()) {
            owned_key(self.blobs.as_ref(), owner_id, path)?;
        }
        Ok(())
    }

    /// Deletes the owner's blobs no remaining record points at. Keys are
    /// content addressed, so the same blob may back several records.
    async fn remove_blobs(&self, owner_id: Uuid, paths: &[String]) {
        for path in paths {
            if owned_key(self.blobs.as_ref(), owner_id, path).is_err() {
                tracing::warn!("Not deleting blob {}: outside the prefix of owner {}", path, owner_id);
                continue;
            }
            match self.store.path_referenced(path).await {
                Ok(false) => {}
                Ok(true) => {
                    tracing::debug!("Keeping blob {}: still referenced", path);
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Skipping blob cleanup for {}: {}", path, e);
                    continue;
                }
            }
            if let Err(e) = self.blobs.delete(path).await {
                tracing::warn!("Failed to delete blob {}: {}", path, e);
            }
        }
    }
}
