use tonic::{Request, Response, Status};

use crate::proto::health::{
    health_check_response::ServingStatus, health_server::Health, HealthCheckRequest,
    HealthCheckResponse,
};

/// Services this process reports on. An empty name means the whole server.
const SERVICES: &[&str] = &[
    "ledger.inventory.InventoryService",
    "ledger.loans.LoanService",
    "ledger.evidence.EvidenceService",
    "ledger.sync.SyncService",
];

#[derive(Debug, Default)]
pub struct HealthServiceImpl;

impl HealthServiceImpl {
    pub fn new() -> Self {
        Self
    }

    fn status_of(service: &str) -> ServingStatus {
        if service.is_empty() || SERVICES.contains(&service) {
            ServingStatus::Serving
        } else {
            ServingStatus::ServiceUnknown
        }
    }
}

#[tonic::async_trait]
impl Health for HealthServiceImpl {
    async fn check(
        &self,
        request: Request<HealthCheckRequest>,
    ) -> Result<Response<HealthCheckResponse>, Status> {
        let status = Self::status_of(&request.get_ref().service);
        Ok(Response::new(HealthCheckResponse {
            status: status.into(),
        }))
    }

    type WatchStream = tokio_stream::wrappers::ReceiverStream<Result<HealthCheckResponse, Status>>;

    async fn watch(
        &self,
        request: Request<HealthCheckRequest>,
    ) -> Result<Response<Self::WatchStream>, Status> {
        let status = Self::status_of(&request.get_ref().service);
        let (tx, rx) = tokio::sync::mpsc::channel(1);

        tokio::spawn(async move {
            let _ = tx
                .send(Ok(HealthCheckResponse {
                    status: status.into(),
                }))
                .await;
        });

        Ok(Response::new(tokio_stream::wrappers::ReceiverStream::new(rx)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_check_known_and_unknown_services() {
        let health = HealthServiceImpl::new();
        for (service, expected) in [
            ("", ServingStatus::Serving),
            ("ledger.loans.LoanService", ServingStatus::Serving),
            ("shop.CartService", ServingStatus::ServiceUnknown),
        ] {
            let res = health
                .check(Request::new(HealthCheckRequest {
                    service: service.to_string(),
                }))
                .await
                .unwrap();
            assert_eq!(res.get_ref().status, expected as i32);
        }
    }
}
