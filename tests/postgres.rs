//! Runs against a real database when `TEST_DATABASE_URL` is set; otherwise
//! every test returns immediately.

mod common;

use std::sync::Arc;

use asset_ledger::db::create_pool;
use asset_ledger::error::AppError;
use asset_ledger::ledger::Ledger;
use asset_ledger::models::{EvidenceInput, LoanFilter, LoanReturn};
use asset_ledger::store::PgLedgerStore;
use common::{date, item, ledger_with, loan, photo, TestBlobs};
use uuid::Uuid;

async fn pg_ledger() -> Option<Ledger> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let pool = create_pool(&url, 20).await.expect("connect to TEST_DATABASE_URL");
    let store = PgLedgerStore::new(pool);
    store.migrate().await.expect("run migrations");
    Some(ledger_with(Arc::new(store), TestBlobs::default()).0)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_pg_concurrent_loans_never_overcommit() {
    let Some(ledger) = pg_ledger().await else { return };
    let owner = Uuid::new_v4();
    let projector = ledger.create_item(owner, item("PRJ-1", 3)).await.unwrap().id;

    let mut handles = Vec::new();
    for _ in 0..12 {
        let ledger = ledger.clone();
        handles.push(tokio::spawn(async move {
            ledger.create_loan(owner, loan(&[(projector, 1)])).await
        }));
    }
    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(AppError::InsufficientAvailability(_)) => {}
            Err(e) => panic!("unexpected error: {}", e),
        }
    }
    assert_eq!(created, 3);
    assert_eq!(ledger.borrowed_quantity(owner, projector).await.unwrap(), 3);
}

#[tokio::test]
async fn test_pg_failed_loan_rolls_back() {
    let Some(ledger) = pg_ledger().await else { return };
    let owner = Uuid::new_v4();
    let a = ledger.create_item(owner, item("PG-A", 2)).await.unwrap();
    let b = ledger.create_item(owner, item("PG-B", 2)).await.unwrap();
    let c = ledger.create_item(owner, item("PG-C", 1)).await.unwrap();

    let mut draft = loan(&[(a.id, 1), (b.id, 1), (c.id, 2)]);
    draft.evidence = EvidenceInput::Positional(vec![photo(owner, "a.jpg")]);
    assert!(matches!(
        ledger.create_loan(owner, draft).await,
        Err(AppError::InsufficientAvailability(_))
    ));
    assert!(ledger.list_loans(owner, &LoanFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_pg_loan_lifecycle() {
    let Some(ledger) = pg_ledger().await else { return };
    let owner = Uuid::new_v4();
    let kit = ledger.create_item(owner, item("PG-KIT/001", 10)).await.unwrap();
    assert!(matches!(
        ledger.create_item(owner, item("pg-kit-1", 1)).await,
        Err(AppError::DuplicateCode { .. })
    ));

    let mut draft = loan(&[(kit.id, 4)]);
    draft.evidence = EvidenceInput::Mapped(vec![(kit.id, photo(owner, "out.jpg"))]);
    let a = ledger.create_loan(owner, draft).await.unwrap();
    ledger.create_loan(owner, loan(&[(kit.id, 3)])).await.unwrap();
    assert_eq!(ledger.available_quantity(owner, kit.id).await.unwrap(), 3);

    let ret = LoanReturn {
        returned_on: date(2025, 1, 4),
        evidence: EvidenceInput::Positional(vec![photo(owner, "in.jpg")]),
    };
    let returned = ledger.return_loan(owner, a.loan.id, ret).await.unwrap();
    assert_eq!(ledger.available_quantity(owner, kit.id).await.unwrap(), 7);

    let evidence = returned.lines[0].photo.clone().unwrap();
    assert_eq!(Some(evidence.id), a.lines[0].photo.as_ref().map(|p| p.id));
    assert_eq!(evidence.return_image_path.as_deref(), Some(photo(owner, "in.jpg").as_str()));

    assert!(matches!(
        ledger.get_loan(Uuid::new_v4(), a.loan.id).await,
        Err(AppError::NotFound(_))
    ));
    ledger.delete_loan(owner, a.loan.id).await.unwrap();
    assert!(matches!(ledger.get_loan(owner, a.loan.id).await, Err(AppError::NotFound(_))));

    let snapshot = ledger.snapshot(owner).await.unwrap();
    assert_eq!(snapshot.items.len(), 1);
    assert_eq!(snapshot.loans.len(), 1);
}

#[tokio::test]
async fn test_pg_deleting_item_keeps_returned_loans() {
    let Some(ledger) = pg_ledger().await else { return };
    let owner = Uuid::new_v4();
    let mixer = ledger.create_item(owner, item("PG-MIX", 1)).await.unwrap();
    let detail = ledger.create_loan(owner, loan(&[(mixer.id, 1)])).await.unwrap();

    assert!(matches!(
        ledger.delete_item(owner, mixer.id).await,
        Err(AppError::Validation(_))
    ));
    let ret = LoanReturn {
        returned_on: date(2025, 1, 2),
        evidence: EvidenceInput::None,
    };
    ledger.return_loan(owner, detail.loan.id, ret).await.unwrap();
    ledger.delete_item(owner, mixer.id).await.unwrap();

    let history = ledger.get_loan(owner, detail.loan.id).await.unwrap();
    assert_eq!(history.lines[0].line.item_id, mixer.id);
}
