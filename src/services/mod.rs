pub mod convert;
pub mod evidence_service;
pub mod health_service;
pub mod inventory_service;
pub mod loan_service;
pub mod sync_service;

pub use evidence_service::EvidenceServiceImpl;
pub use health_service::HealthServiceImpl;
pub use inventory_service::InventoryServiceImpl;
pub use loan_service::LoanServiceImpl;
pub use sync_service::SyncServiceImpl;
