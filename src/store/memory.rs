use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::ledger::{availability, evidence, rules};
use crate::models::{
    Availability, EvidenceParent, EvidencePhoto, EvidenceSlot, InventoryItem, ItemPatch, ItemView,
    LineView, LoanDetail, LoanFilter, LoanLineItem, LoanRecord, LoanReturn, LoanStatus,
};
use crate::sync::Snapshot;

use super::LedgerStore;

#[derive(Debug, Default)]
struct State {
    items: HashMap<Uuid, InventoryItem>,
    loans: HashMap<Uuid, LoanRecord>,
    lines: HashMap<Uuid, LoanLineItem>,
    photos: HashMap<Uuid, EvidencePhoto>,
}

impl State {
    fn owned_item(&self, owner_id: Uuid, id: Uuid) -> AppResult<&InventoryItem> {
        self.items
            .get(&id)
            .filter(|i| i.owner_id == owner_id)
            .ok_or_else(AppError::item_not_found)
    }

    fn owned_loan(&self, owner_id: Uuid, id: Uuid) -> AppResult<&LoanRecord> {
        self.loans
            .get(&id)
            .filter(|l| l.owner_id == owner_id)
            .ok_or_else(AppError::loan_not_found)
    }

    fn borrowed(&self, item_id: Uuid) -> i64 {
        self.lines
            .values()
            .filter(|l| l.item_id == item_id)
            .filter(|l| {
                self.loans
                    .get(&l.loan_id)
                    .is_some_and(|loan| loan.status == LoanStatus::Borrowed)
            })
            .map(|l| i64::from(l.quantity))
            .sum()
    }

    fn find_code(&self, owner_id: Uuid, code_key: &str, exclude: Option<Uuid>) -> Option<Uuid> {
        self.items
            .values()
            .find(|i| i.owner_id == owner_id && i.code_key == code_key && Some(i.id) != exclude)
            .map(|i| i.id)
    }

    fn item_view(&self, item: &InventoryItem) -> ItemView {
        let mut photos: Vec<EvidencePhoto> = self
            .photos
            .values()
            .filter(|p| p.item_id == Some(item.id))
            .cloned()
            .collect();
        photos.sort_by_key(|p| (p.created_at, p.id));
        ItemView {
            item: item.clone(),
            borrowed: self.borrowed(item.id),
            photos,
        }
    }

    fn items_of(&self, owner_id: Uuid) -> Vec<ItemView> {
        let mut items: Vec<&InventoryItem> =
            self.items.values().filter(|i| i.owner_id == owner_id).collect();
        items.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        items.into_iter().map(|i| self.item_view(i)).collect()
    }

    fn line_photo(&self, line_id: Uuid) -> Option<&EvidencePhoto> {
        self.photos.values().find(|p| p.line_item_id == Some(line_id))
    }

    fn loan_detail(&self, loan: &LoanRecord) -> LoanDetail {
        let mut lines: Vec<&LoanLineItem> =
            self.lines.values().filter(|l| l.loan_id == loan.id).collect();
        lines.sort_by_key(|l| l.position);
        LoanDetail {
            loan: loan.clone(),
            lines: lines
                .into_iter()
                .map(|line| LineView {
                    line: line.clone(),
                    photo: self.line_photo(line.id).cloned(),
                })
                .collect(),
        }
    }

    fn loans_of(&self, owner_id: Uuid, filter: &LoanFilter) -> Vec<LoanDetail> {
        let mut loans: Vec<&LoanRecord> = self
            .loans
            .values()
            .filter(|l| l.owner_id == owner_id && filter.matches(l))
            .collect();
        loans.sort_by(|a, b| {
            b.loan_date
                .cmp(&a.loan_date)
                .then(b.created_at.cmp(&a.created_at))
        });
        loans.into_iter().map(|l| self.loan_detail(l)).collect()
    }

    fn store_photo(&mut self, photo: EvidencePhoto) {
        self.photos.insert(photo.id, photo);
    }
}

/// Ledger store kept in process memory.
///
/// A single mutex serialises every operation, so each one observes and
/// commits a consistent state. Every check runs before the first mutation,
/// which keeps failed operations free of partial writes.
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    state: Mutex<State>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[tonic::async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn insert_item(&self, item: InventoryItem) -> AppResult<InventoryItem> {
        let mut state = self.state.lock().await;
        if let Some(existing_id) = state.find_code(item.owner_id, &item.code_key, None) {
            return Err(AppError::DuplicateCode {
                code: item.code,
                existing_id,
            });
        }
        state.items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn item(&self, owner_id: Uuid, id: Uuid) -> AppResult<ItemView> {
        let state = self.state.lock().await;
        let item = state.owned_item(owner_id, id)?;
        Ok(state.item_view(item))
    }

    async fn items(&self, owner_id: Uuid) -> AppResult<Vec<ItemView>> {
        Ok(self.state.lock().await.items_of(owner_id))
    }

    async fn update_item(&self, owner_id: Uuid, id: Uuid, patch: ItemPatch) -> AppResult<InventoryItem> {
        let mut state = self.state.lock().await;
        let mut item = state.owned_item(owner_id, id)?.clone();
        let previous_quantity = item.quantity;

        let code_changed = rules::apply_patch(&mut item, patch, Utc::now())?;
        if code_changed {
            if let Some(existing_id) = state.find_code(owner_id, &item.code_key, Some(id)) {
                return Err(AppError::DuplicateCode {
                    code: item.code,
                    existing_id,
                });
            }
        }
        if item.quantity < previous_quantity {
            availability::check_total(id, item.quantity, state.borrowed(id))?;
        }

        state.items.insert(id, item.clone());
        Ok(item)
    }

    async fn delete_item(&self, owner_id: Uuid, id: Uuid) -> AppResult<Vec<EvidencePhoto>> {
        let mut state = self.state.lock().await;
        state.owned_item(owner_id, id)?;

        let open = state
            .lines
            .values()
            .filter(|l| l.item_id == id)
            .filter(|l| {
                state
                    .loans
                    .get(&l.loan_id)
                    .is_some_and(|loan| loan.status == LoanStatus::Borrowed)
            })
            .count();
        if open > 0 {
            return Err(AppError::Validation(format!(
                "item is still out on {} loan(s); return them first",
                open
            )));
        }

        let photo_ids: Vec<Uuid> = state
            .photos
            .values()
            .filter(|p| p.item_id == Some(id))
            .map(|p| p.id)
            .collect();
        let removed = photo_ids
            .iter()
            .filter_map(|pid| state.photos.remove(pid))
            .collect();
        state.items.remove(&id);
        Ok(removed)
    }

    async fn find_code(&self, owner_id: Uuid, code_key: &str, exclude: Option<Uuid>) -> AppResult<Option<Uuid>> {
        Ok(self.state.lock().await.find_code(owner_id, code_key, exclude))
    }

    async fn borrowed_quantity(&self, owner_id: Uuid, item_id: Uuid) -> AppResult<i64> {
        let state = self.state.lock().await;
        state.owned_item(owner_id, item_id)?;
        Ok(state.borrowed(item_id))
    }

    async fn insert_loan(&self, detail: LoanDetail) -> AppResult<LoanDetail> {
        let mut state = self.state.lock().await;
        let owner_id = detail.loan.owner_id;

        let stock: HashMap<Uuid, Availability> = detail
            .lines
            .iter()
            .filter_map(|view| state.owned_item(owner_id, view.line.item_id).ok())
            .map(|item| {
                let avail = Availability {
                    item_id: item.id,
                    total: item.quantity,
                    borrowed: state.borrowed(item.id),
                };
                (item.id, avail)
            })
            .collect();
        availability::check_lines(&detail.lines, &stock)?;

        state.loans.insert(detail.loan.id, detail.loan.clone());
        for view in &detail.lines {
            state.lines.insert(view.line.id, view.line.clone());
            if let Some(photo) = &view.photo {
                state.store_photo(photo.clone());
            }
        }
        Ok(detail)
    }

    async fn loan(&self, owner_id: Uuid, id: Uuid) -> AppResult<LoanDetail> {
        let state = self.state.lock().await;
        let loan = state.owned_loan(owner_id, id)?;
        Ok(state.loan_detail(loan))
    }

    async fn loans(&self, owner_id: Uuid, filter: &LoanFilter) -> AppResult<Vec<LoanDetail>> {
        Ok(self.state.lock().await.loans_of(owner_id, filter))
    }

    async fn return_loan(&self, owner_id: Uuid, id: Uuid, ret: LoanReturn) -> AppResult<LoanDetail> {
        let mut state = self.state.lock().await;
        let mut detail = state.loan_detail(state.owned_loan(owner_id, id)?);

        let item_ids: Vec<Uuid> = detail.lines.iter().map(|l| l.line.item_id).collect();
        let photos = evidence::assign(&item_ids, &ret.evidence)?;
        let plans = rules::apply_return(&mut detail, ret.returned_on, photos, Utc::now())?;

        state.loans.insert(id, detail.loan.clone());
        for plan in plans {
            state.store_photo(plan.into_photo());
        }
        Ok(detail)
    }

    async fn delete_loan(&self, owner_id: Uuid, id: Uuid) -> AppResult<LoanDetail> {
        let mut state = self.state.lock().await;
        let detail = state.loan_detail(state.owned_loan(owner_id, id)?);

        for view in &detail.lines {
            if let Some(photo) = &view.photo {
                state.photos.remove(&photo.id);
            }
            state.lines.remove(&view.line.id);
        }
        state.loans.remove(&id);
        Ok(detail)
    }

    async fn attach_evidence(
        &self,
        owner_id: Uuid,
        parent: EvidenceParent,
        slot: EvidenceSlot,
        path: &str,
    ) -> AppResult<EvidencePhoto> {
        let mut state = self.state.lock().await;
        let existing = match parent {
            EvidenceParent::Item(item_id) => {
                state.owned_item(owner_id, item_id)?;
                None
            }
            EvidenceParent::LineItem(line_id) => {
                let line = state
                    .lines
                    .get(&line_id)
                    .ok_or_else(|| AppError::NotFound("Line item not found".to_string()))?;
                state
                    .owned_loan(owner_id, line.loan_id)
                    .map_err(|_| AppError::NotFound("Line item not found".to_string()))?;
                state.line_photo(line_id).cloned()
            }
        };

        let photo = evidence::plan_attach(existing.as_ref(), parent, slot, path, Utc::now())?.into_photo();
        state.store_photo(photo.clone());
        Ok(photo)
    }

    async fn delete_item_photo(&self, owner_id: Uuid, photo_id: Uuid) -> AppResult<EvidencePhoto> {
        let mut state = self.state.lock().await;
        let owned = state
            .photos
            .get(&photo_id)
            .and_then(|p| p.item_id)
            .is_some_and(|item_id| state.owned_item(owner_id, item_id).is_ok());
        if !owned {
            return Err(AppError::NotFound("Photo not found".to_string()));
        }
        state
            .photos
            .remove(&photo_id)
            .ok_or_else(|| AppError::NotFound("Photo not found".to_string()))
    }

    async fn path_referenced(&self, path: &str) -> AppResult<bool> {
        let state = self.state.lock().await;
        Ok(state.photos.values().any(|p| p.paths().any(|used| used == path)))
    }

    async fn snapshot(&self, owner_id: Uuid) -> AppResult<Snapshot> {
        let state = self.state.lock().await;
        Ok(Snapshot {
            items: state.items_of(owner_id),
            loans: state.loans_of(owner_id, &LoanFilter::default()),
            as_of: Utc::now(),
        })
    }
}
