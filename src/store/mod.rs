//! Persistence behind the ledger.
//!
//! Each method is one all-or-nothing unit of work scoped to `owner_id`;
//! records of another owner behave exactly like missing ones.

pub mod memory;
pub mod postgres;

pub use memory::MemoryLedgerStore;
pub use postgres::PgLedgerStore;

use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{
    EvidenceParent, EvidencePhoto, EvidenceSlot, InventoryItem, ItemPatch, ItemView, LoanDetail,
    LoanFilter, LoanReturn,
};
use crate::sync::Snapshot;

#[tonic::async_trait]
pub trait LedgerStore: Send + Sync {
    /// Inserts a fully built item, failing with `DuplicateCode` when another
    /// item of the owner has the same `code_key`.
    async fn insert_item(&self, item: InventoryItem) -> AppResult<InventoryItem>;

    async fn item(&self, owner_id: Uuid, id: Uuid) -> AppResult<ItemView>;

    /// All items of the owner, ordered by name.
    async fn items(&self, owner_id: Uuid) -> AppResult<Vec<ItemView>>;

    /// Applies the patch under the item's lock. Lowering the quantity below
    /// what is currently borrowed fails with `InsufficientAvailability`.
    async fn update_item(&self, owner_id: Uuid, id: Uuid, patch: ItemPatch) -> AppResult<InventoryItem>;

    /// Deletes the item and its asset photos, returning the removed photo
    /// records so their blobs can be cleaned up.
    async fn delete_item(&self, owner_id: Uuid, id: Uuid) -> AppResult<Vec<EvidencePhoto>>;

    /// Id of the owner's item whose normalized code equals `code_key`.
    async fn find_code(&self, owner_id: Uuid, code_key: &str, exclude: Option<Uuid>) -> AppResult<Option<Uuid>>;

    async fn borrowed_quantity(&self, owner_id: Uuid, item_id: Uuid) -> AppResult<i64>;

    /// Persists a loan built by `ledger::rules::new_loan` after re-checking
    /// availability of every line while the affected items are locked.
    async fn insert_loan(&self, detail: LoanDetail) -> AppResult<LoanDetail>;

    async fn loan(&self, owner_id: Uuid, id: Uuid) -> AppResult<LoanDetail>;

    /// Loans ordered by loan date, newest first.
    async fn loans(&self, owner_id: Uuid, filter: &LoanFilter) -> AppResult<Vec<LoanDetail>>;

    async fn return_loan(&self, owner_id: Uuid, id: Uuid, ret: LoanReturn) -> AppResult<LoanDetail>;

    /// Deletes the loan with its lines and their evidence, returning what was removed.
    async fn delete_loan(&self, owner_id: Uuid, id: Uuid) -> AppResult<LoanDetail>;

    async fn attach_evidence(
        &self,
        owner_id: Uuid,
        parent: EvidenceParent,
        slot: EvidenceSlot,
        path: &str,
    ) -> AppResult<EvidencePhoto>;

    /// Removes one asset photo of an inventory item.
    async fn delete_item_photo(&self, owner_id: Uuid, photo_id: Uuid) -> AppResult<EvidencePhoto>;

    /// Whether any evidence record still points at the blob path.
    async fn path_referenced(&self, path: &str) -> AppResult<bool>;

    /// Items and loans of the owner read at one consistent point in time.
    async fn snapshot(&self, owner_id: Uuid) -> AppResult<Snapshot>;
}
