use tonic::{Request, Response, Status};

use crate::db::owner_from_request;
use crate::ledger::Ledger;
use crate::proto::sync::sync_service_server::SyncService;
use crate::proto::sync::{SnapshotReq, SnapshotRes};
use crate::services::convert::{format_timestamp, item_to_proto, loan_to_proto};

pub struct SyncServiceImpl {
    ledger: Ledger,
}

impl SyncServiceImpl {
    pub fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }
}

#[tonic::async_trait]
impl SyncService for SyncServiceImpl {
    /// Full owner-scoped dump; clients diff it against their cache.
    async fn snapshot(&self, request: Request<SnapshotReq>) -> Result<Response<SnapshotRes>, Status> {
        let owner_id = owner_from_request(&request)?;

        let snapshot = self.ledger.snapshot(owner_id).await?;
        Ok(Response::new(SnapshotRes {
            items: snapshot.items.iter().map(item_to_proto).collect(),
            loans: snapshot.loans.iter().map(loan_to_proto).collect(),
            as_of: format_timestamp(snapshot.as_of),
        }))
    }
}
