#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use asset_ledger::error::{AppError, AppResult};
use asset_ledger::ledger::Ledger;
use asset_ledger::models::{EvidenceInput, LineRequest, NewItem, NewLoan};
use asset_ledger::storage::StorageBackend;
use asset_ledger::store::{LedgerStore, MemoryLedgerStore};
use chrono::NaiveDate;
use uuid::Uuid;

/// In-memory blob store that records deletions and can be told to fail them.
#[derive(Default)]
pub struct TestBlobs {
    pub fail_deletes: bool,
    pub deleted: Mutex<Vec<String>>,
    pub stored: Mutex<HashMap<String, Vec<u8>>>,
}

#[tonic::async_trait]
impl StorageBackend for TestBlobs {
    async fn upload(&self, key: &str, data: &[u8], _content_type: &str) -> AppResult<String> {
        let path = format!("mem://test/{}", key);
        self.stored.lock().unwrap().insert(path.clone(), data.to_vec());
        Ok(path)
    }

    async fn download(&self, path: &str) -> AppResult<Vec<u8>> {
        self.stored
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| AppError::Blob(format!("not stored: {}", path)))
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        self.deleted.lock().unwrap().push(path.to_string());
        if self.fail_deletes {
            return Err(AppError::Blob("bucket unavailable".to_string()));
        }
        Ok(())
    }

    fn bucket(&self) -> &str {
        "test"
    }

    fn key_of<'a>(&self, path: &'a str) -> AppResult<&'a str> {
        path.strip_prefix("mem://test/")
            .filter(|key| !key.is_empty())
            .ok_or_else(|| AppError::Blob(format!("path {} is not in mem://test", path)))
    }
}

/// Path of a blob under the owner's prefix, as `upload_photo` would issue it.
pub fn photo(owner: Uuid, name: &str) -> String {
    format!("mem://test/{}/{}", owner, name)
}

pub fn ledger_with(store: Arc<dyn LedgerStore>, blobs: TestBlobs) -> (Ledger, Arc<TestBlobs>) {
    let blobs = Arc::new(blobs);
    (Ledger::new(store, blobs.clone()), blobs)
}

pub fn memory_ledger() -> (Ledger, Arc<TestBlobs>) {
    ledger_with(Arc::new(MemoryLedgerStore::new()), TestBlobs::default())
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn item(code: &str, quantity: i32) -> NewItem {
    NewItem {
        name: format!("Item {}", code),
        code: code.to_string(),
        quantity,
        category: "camera".to_string(),
        condition: "good".to_string(),
        ..Default::default()
    }
}

pub fn loan(lines: &[(Uuid, i32)]) -> NewLoan {
    NewLoan {
        borrower_name: "Aiko".to_string(),
        borrower_phone: Some("090-0000-0000".to_string()),
        loan_date: date(2025, 1, 1),
        due_date: date(2025, 1, 10),
        lines: lines
            .iter()
            .map(|&(item_id, quantity)| LineRequest { item_id, quantity })
            .collect(),
        evidence: EvidenceInput::None,
    }
}
