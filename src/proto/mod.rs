// Generated by build.rs from proto/*.proto

pub mod common {
    include!("ledger.common.rs");
}

pub mod inventory {
    include!("ledger.inventory.rs");
}

pub mod loans {
    include!("ledger.loans.rs");
}

pub mod evidence {
    include!("ledger.evidence.rs");
}

pub mod sync {
    include!("ledger.sync.rs");
}

pub mod health {
    include!("grpc.health.v1.rs");
}
