mod common;

use std::sync::Arc;

use asset_ledger::error::AppError;
use asset_ledger::models::{
    EvidenceInput, EvidenceSlot, ItemPatch, LoanFilter, LoanReturn, LoanStatus, ReturnTiming,
};
use asset_ledger::store::MemoryLedgerStore;
use asset_ledger::sync::{reconcile, LocalCache};
use common::{date, item, ledger_with, loan, memory_ledger, photo, TestBlobs};
use uuid::Uuid;

fn returned_on(d: chrono::NaiveDate) -> LoanReturn {
    LoanReturn {
        returned_on: d,
        evidence: EvidenceInput::None,
    }
}

#[tokio::test]
async fn test_availability_is_derived_from_open_loans() {
    let (ledger, _) = memory_ledger();
    let owner = Uuid::new_v4();
    let tripod = ledger.create_item(owner, item("TRP-01", 10)).await.unwrap();

    let a = ledger.create_loan(owner, loan(&[(tripod.id, 4)])).await.unwrap();
    ledger.create_loan(owner, loan(&[(tripod.id, 3)])).await.unwrap();
    assert_eq!(ledger.borrowed_quantity(owner, tripod.id).await.unwrap(), 7);
    assert_eq!(ledger.available_quantity(owner, tripod.id).await.unwrap(), 3);

    ledger
        .return_loan(owner, a.loan.id, returned_on(date(2025, 1, 5)))
        .await
        .unwrap();
    assert_eq!(ledger.available_quantity(owner, tripod.id).await.unwrap(), 7);

    let avail = ledger.availability(owner, tripod.id).await.unwrap();
    assert_eq!((avail.total, avail.borrowed, avail.available()), (10, 3, 7));
}

#[tokio::test]
async fn test_overcommit_is_rejected_and_nothing_persists() {
    let (ledger, _) = memory_ledger();
    let owner = Uuid::new_v4();
    let mic = ledger.create_item(owner, item("MIC-1", 5)).await.unwrap();
    ledger.create_loan(owner, loan(&[(mic.id, 5)])).await.unwrap();

    let err = ledger.create_loan(owner, loan(&[(mic.id, 1)])).await.unwrap_err();
    match err {
        AppError::InsufficientAvailability(shortfalls) => {
            assert_eq!(shortfalls.len(), 1);
            assert_eq!(shortfalls[0].item_id, mic.id);
            assert_eq!(shortfalls[0].requested, 1);
            assert_eq!(shortfalls[0].available, 0);
        }
        other => panic!("expected InsufficientAvailability, got {:?}", other),
    }

    let loans = ledger.list_loans(owner, &LoanFilter::default()).await.unwrap();
    assert_eq!(loans.len(), 1);
    assert_eq!(ledger.borrowed_quantity(owner, mic.id).await.unwrap(), 5);
}

#[tokio::test]
async fn test_failure_on_last_line_leaves_no_partial_loan() {
    let (ledger, _) = memory_ledger();
    let owner = Uuid::new_v4();
    let a = ledger.create_item(owner, item("A-1", 5)).await.unwrap();
    let b = ledger.create_item(owner, item("B-1", 5)).await.unwrap();
    let c = ledger.create_item(owner, item("C-1", 1)).await.unwrap();

    let mut draft = loan(&[(a.id, 2), (b.id, 2), (c.id, 3)]);
    draft.evidence = EvidenceInput::Positional(vec![
        photo(owner, "a.jpg"),
        photo(owner, "b.jpg"),
        photo(owner, "c.jpg"),
    ]);
    let err = ledger.create_loan(owner, draft).await.unwrap_err();
    assert!(matches!(err, AppError::InsufficientAvailability(_)));

    let snapshot = ledger.snapshot(owner).await.unwrap();
    assert!(snapshot.loans.is_empty());
    for view in &snapshot.items {
        assert_eq!(view.borrowed, 0);
        assert!(view.photos.is_empty());
    }
}

#[tokio::test]
async fn test_records_of_other_owners_are_not_found() {
    let (ledger, _) = memory_ledger();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let lens = ledger.create_item(alice, item("LENS-50", 2)).await.unwrap();
    let detail = ledger.create_loan(alice, loan(&[(lens.id, 1)])).await.unwrap();

    assert!(matches!(ledger.get_item(bob, lens.id).await, Err(AppError::NotFound(_))));
    assert!(matches!(
        ledger.update_item(bob, lens.id, ItemPatch { quantity: Some(9), ..Default::default() }).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(ledger.delete_item(bob, lens.id).await, Err(AppError::NotFound(_))));
    assert!(matches!(ledger.get_loan(bob, detail.loan.id).await, Err(AppError::NotFound(_))));
    assert!(matches!(
        ledger.return_loan(bob, detail.loan.id, returned_on(date(2025, 1, 2))).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(ledger.delete_loan(bob, detail.loan.id).await, Err(AppError::NotFound(_))));

    // Bob cannot borrow Alice's item either.
    assert!(matches!(
        ledger.create_loan(bob, loan(&[(lens.id, 1)])).await,
        Err(AppError::NotFound(_))
    ));
    assert!(ledger.list_items(bob, None).await.unwrap().is_empty());
    assert_eq!(ledger.get_loan(alice, detail.loan.id).await.unwrap(), detail);
}

#[tokio::test]
async fn test_duplicate_codes_are_detected_after_normalization() {
    let (ledger, _) = memory_ledger();
    let owner = Uuid::new_v4();
    let first = ledger.create_item(owner, item("HMSI/ELK/001", 1)).await.unwrap();

    match ledger.create_item(owner, item("hmsi-elk-1", 1)).await {
        Err(AppError::DuplicateCode { existing_id, .. }) => assert_eq!(existing_id, first.id),
        other => panic!("expected DuplicateCode, got {:?}", other),
    }

    // Codes are unique per owner only.
    ledger.create_item(Uuid::new_v4(), item("hmsi-elk-1", 1)).await.unwrap();

    let second = ledger.create_item(owner, item("HMSI/ELK/002", 1)).await.unwrap();
    let clash = ItemPatch {
        code: Some("hmsi_elk_01".into()),
        ..Default::default()
    };
    assert!(matches!(
        ledger.update_item(owner, second.id, clash).await,
        Err(AppError::DuplicateCode { .. })
    ));

    // Re-spelling an item's own code is not a collision.
    let respell = ItemPatch {
        code: Some("hmsi-elk-001".into()),
        ..Default::default()
    };
    let updated = ledger.update_item(owner, first.id, respell).await.unwrap();
    assert_eq!(updated.code, "hmsi-elk-001");

    let check = ledger.check_code(owner, "HMSI\\ELK\\2", None).await.unwrap();
    assert_eq!(check.existing_id, Some(second.id));
    let check = ledger.check_code(owner, "HMSI\\ELK\\2", Some(second.id)).await.unwrap();
    assert!(!check.is_duplicate());
}

#[tokio::test]
async fn test_missing_fields_are_named() {
    let (ledger, _) = memory_ledger();
    let mut attrs = item("", 0);
    attrs.name = " ".into();
    match ledger.create_item(Uuid::new_v4(), attrs).await {
        Err(AppError::Validation(msg)) => {
            assert!(msg.contains("name"));
            assert!(msg.contains("code"));
            assert!(msg.contains("quantity"));
        }
        other => panic!("expected Validation, got {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_loans_never_overcommit() {
    let (ledger, _) = memory_ledger();
    let owner = Uuid::new_v4();
    let battery = ledger.create_item(owner, item("BAT-1", 5)).await.unwrap().id;

    let mut handles = Vec::new();
    for _ in 0..20 {
        let ledger = ledger.clone();
        handles.push(tokio::spawn(async move {
            ledger.create_loan(owner, loan(&[(battery, 1)])).await
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
    assert_eq!(created, 5);
    assert_eq!(ledger.borrowed_quantity(owner, battery).await.unwrap(), 5);
}

#[tokio::test]
async fn test_line_evidence_is_updated_in_place_on_return() {
    let (ledger, _) = memory_ledger();
    let owner = Uuid::new_v4();
    let cam = ledger.create_item(owner, item("CAM-1", 2)).await.unwrap();
    let bag = ledger.create_item(owner, item("BAG-1", 2)).await.unwrap();

    let mut draft = loan(&[(cam.id, 1), (bag.id, 1)]);
    draft.evidence = EvidenceInput::Mapped(vec![(bag.id, photo(owner, "bag-out.jpg"))]);
    let detail = ledger.create_loan(owner, draft).await.unwrap();
    assert!(detail.lines[0].photo.is_none());
    let loan_photo = detail.lines[1].photo.clone().unwrap();

    let ret = LoanReturn {
        returned_on: date(2025, 1, 12),
        evidence: EvidenceInput::Mapped(vec![
            (bag.id, photo(owner, "bag-in.jpg")),
            (cam.id, photo(owner, "cam-in.jpg")),
        ]),
    };
    let returned = ledger.return_loan(owner, detail.loan.id, ret).await.unwrap();
    assert_eq!(returned.loan.status, LoanStatus::Returned);
    assert_eq!(returned.loan.timing(), ReturnTiming::Late);

    let bag_photo = returned.lines[1].photo.clone().unwrap();
    assert_eq!(bag_photo.id, loan_photo.id);
    assert_eq!(bag_photo.loan_image_path.as_deref(), Some(photo(owner, "bag-out.jpg").as_str()));
    assert_eq!(bag_photo.return_image_path.as_deref(), Some(photo(owner, "bag-in.jpg").as_str()));

    let cam_photo = returned.lines[0].photo.clone().unwrap();
    assert_eq!(cam_photo.loan_image_path, None);
    assert_eq!(cam_photo.return_image_path.as_deref(), Some(photo(owner, "cam-in.jpg").as_str()));

    assert_eq!(ledger.get_loan(owner, detail.loan.id).await.unwrap(), returned);
}

#[tokio::test]
async fn test_return_rules() {
    let (ledger, _) = memory_ledger();
    let owner = Uuid::new_v4();
    let light = ledger.create_item(owner, item("LGT-1", 1)).await.unwrap();
    let detail = ledger.create_loan(owner, loan(&[(light.id, 1)])).await.unwrap();

    assert!(matches!(
        ledger.return_loan(owner, detail.loan.id, returned_on(date(2024, 12, 31))).await,
        Err(AppError::Validation(_))
    ));

    let overflow = LoanReturn {
        returned_on: date(2025, 1, 9),
        evidence: EvidenceInput::Positional(vec!["a".into(), "b".into()]),
    };
    assert!(matches!(
        ledger.return_loan(owner, detail.loan.id, overflow).await,
        Err(AppError::Validation(_))
    ));
    // Rejected returns change nothing.
    assert_eq!(ledger.get_loan(owner, detail.loan.id).await.unwrap(), detail);

    let returned = ledger
        .return_loan(owner, detail.loan.id, returned_on(date(2025, 1, 9)))
        .await
        .unwrap();
    assert_eq!(returned.loan.timing(), ReturnTiming::OnTime);
    assert!(matches!(
        ledger.return_loan(owner, detail.loan.id, returned_on(date(2025, 1, 9))).await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn test_quantity_cannot_drop_below_borrowed() {
    let (ledger, _) = memory_ledger();
    let owner = Uuid::new_v4();
    let cable = ledger.create_item(owner, item("CBL-1", 6)).await.unwrap();
    ledger.create_loan(owner, loan(&[(cable.id, 4)])).await.unwrap();

    let lower = |q| ItemPatch {
        quantity: Some(q),
        ..Default::default()
    };
    assert!(matches!(
        ledger.update_item(owner, cable.id, lower(3)).await,
        Err(AppError::InsufficientAvailability(_))
    ));
    let updated = ledger.update_item(owner, cable.id, lower(4)).await.unwrap();
    assert_eq!(updated.quantity, 4);
    assert_eq!(ledger.available_quantity(owner, cable.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_item_out_on_loan_cannot_be_deleted() {
    let (ledger, _) = memory_ledger();
    let owner = Uuid::new_v4();
    let drone = ledger.create_item(owner, item("DRN-1", 1)).await.unwrap();
    let detail = ledger.create_loan(owner, loan(&[(drone.id, 1)])).await.unwrap();

    assert!(matches!(
        ledger.delete_item(owner, drone.id).await,
        Err(AppError::Validation(_))
    ));
    ledger.delete_loan(owner, detail.loan.id).await.unwrap();
    ledger.delete_item(owner, drone.id).await.unwrap();
    assert!(matches!(ledger.get_item(owner, drone.id).await, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_returned_loans_keep_history_of_deleted_items() {
    let (ledger, _) = memory_ledger();
    let owner = Uuid::new_v4();
    let gimbal = ledger.create_item(owner, item("GMB-1", 2)).await.unwrap();
    let detail = ledger.create_loan(owner, loan(&[(gimbal.id, 1)])).await.unwrap();
    ledger
        .return_loan(owner, detail.loan.id, returned_on(date(2025, 1, 4)))
        .await
        .unwrap();

    ledger.delete_item(owner, gimbal.id).await.unwrap();
    assert!(matches!(ledger.get_item(owner, gimbal.id).await, Err(AppError::NotFound(_))));

    let history = ledger.get_loan(owner, detail.loan.id).await.unwrap();
    assert_eq!(history.loan.status, LoanStatus::Returned);
    assert_eq!(history.lines[0].line.item_id, gimbal.id);
    assert!(matches!(
        ledger.create_loan(owner, loan(&[(gimbal.id, 1)])).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_cleared_acquisition_date_is_saved() {
    let (ledger, _) = memory_ledger();
    let owner = Uuid::new_v4();
    let mut attrs = item("PRJ-9", 1);
    attrs.acquired_on = Some(date(2022, 9, 1));
    let projector = ledger.create_item(owner, attrs).await.unwrap();

    let untouched = ledger
        .update_item(owner, projector.id, ItemPatch { quantity: Some(2), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(untouched.acquired_on, Some(date(2022, 9, 1)));

    let cleared = ledger
        .update_item(owner, projector.id, ItemPatch { acquired_on: Some(None), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(cleared.acquired_on, None);
}

#[tokio::test]
async fn test_blob_delete_failures_do_not_block_metadata_delete() {
    let blobs = TestBlobs {
        fail_deletes: true,
        ..Default::default()
    };
    let (ledger, blobs) = ledger_with(Arc::new(MemoryLedgerStore::new()), blobs);
    let owner = Uuid::new_v4();
    let amp = ledger.create_item(owner, item("AMP-1", 1)).await.unwrap();

    let path = ledger
        .upload_photo(owner, "amp.JPG", None, b"jpeg bytes")
        .await
        .unwrap();
    ledger.attach_item_photo(owner, amp.id, &path).await.unwrap();

    ledger.delete_item(owner, amp.id).await.unwrap();
    assert_eq!(*blobs.deleted.lock().unwrap(), vec![path]);
    assert!(matches!(ledger.get_item(owner, amp.id).await, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_shared_blob_survives_until_last_reference_is_gone() {
    let (ledger, blobs) = memory_ledger();
    let owner = Uuid::new_v4();
    let first = ledger.create_item(owner, item("SPK-1", 1)).await.unwrap();
    let second = ledger.create_item(owner, item("SPK-2", 1)).await.unwrap();

    let path = ledger.upload_photo(owner, "spk.png", None, b"png").await.unwrap();
    let again = ledger.upload_photo(owner, "speaker.png", None, b"png").await.unwrap();
    assert_eq!(path, again);

    ledger.attach_item_photo(owner, first.id, &path).await.unwrap();
    let shared = ledger.attach_item_photo(owner, second.id, &path).await.unwrap();

    ledger.delete_item(owner, first.id).await.unwrap();
    assert!(blobs.deleted.lock().unwrap().is_empty());

    ledger.delete_item_photo(owner, shared.id).await.unwrap();
    assert_eq!(*blobs.deleted.lock().unwrap(), vec![path]);
}

#[tokio::test]
async fn test_item_photos_are_separate_records() {
    let (ledger, _) = memory_ledger();
    let owner = Uuid::new_v4();
    let desk = ledger.create_item(owner, item("DSK-1", 1)).await.unwrap();

    ledger.attach_item_photo(owner, desk.id, &photo(owner, "front.jpg")).await.unwrap();
    ledger.attach_item_photo(owner, desk.id, &photo(owner, "back.jpg")).await.unwrap();
    assert!(matches!(
        ledger.attach_item_photo(owner, desk.id, "  ").await,
        Err(AppError::Validation(_))
    ));

    let view = ledger.get_item(owner, desk.id).await.unwrap();
    assert_eq!(view.photos.len(), 2);
    assert!(matches!(
        ledger.delete_item_photo(Uuid::new_v4(), view.photos[0].id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_line_photo_attached_after_the_fact() {
    let (ledger, _) = memory_ledger();
    let owner = Uuid::new_v4();
    let mixer = ledger.create_item(owner, item("MIX-1", 1)).await.unwrap();
    let detail = ledger.create_loan(owner, loan(&[(mixer.id, 1)])).await.unwrap();
    let line_id = detail.lines[0].line.id;

    let first = ledger
        .attach_line_photo(owner, line_id, EvidenceSlot::Loan, &photo(owner, "out.jpg"))
        .await
        .unwrap();
    let second = ledger
        .attach_line_photo(owner, line_id, EvidenceSlot::Return, &photo(owner, "in.jpg"))
        .await
        .unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(second.loan_image_path.as_deref(), Some(photo(owner, "out.jpg").as_str()));

    // A filled slot keeps its photo.
    assert!(matches!(
        ledger
            .attach_line_photo(owner, line_id, EvidenceSlot::Loan, &photo(owner, "retake.jpg"))
            .await,
        Err(AppError::Validation(_))
    ));
    let kept = ledger.get_loan(owner, detail.loan.id).await.unwrap();
    assert_eq!(kept.lines[0].photo.as_ref(), Some(&second));

    let stranger = Uuid::new_v4();
    assert!(matches!(
        ledger
            .attach_line_photo(stranger, line_id, EvidenceSlot::Loan, &photo(stranger, "x.jpg"))
            .await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_reminder_feed_filters_by_status_and_due_date() {
    let (ledger, _) = memory_ledger();
    let owner = Uuid::new_v4();
    let tent = ledger.create_item(owner, item("TNT-1", 10)).await.unwrap();

    let mut early = loan(&[(tent.id, 1)]);
    early.due_date = date(2025, 1, 5);
    let early = ledger.create_loan(owner, early).await.unwrap();
    let late = ledger.create_loan(owner, loan(&[(tent.id, 1)])).await.unwrap();
    let mut done = loan(&[(tent.id, 1)]);
    done.due_date = date(2025, 1, 3);
    let done = ledger.create_loan(owner, done).await.unwrap();
    ledger
        .return_loan(owner, done.loan.id, returned_on(date(2025, 1, 2)))
        .await
        .unwrap();

    let filter = LoanFilter {
        status: Some(LoanStatus::Borrowed),
        due_before: Some(date(2025, 1, 6)),
    };
    let due: Vec<Uuid> = ledger
        .list_loans(owner, &filter)
        .await
        .unwrap()
        .iter()
        .map(|d| d.loan.id)
        .collect();
    assert_eq!(due, vec![early.loan.id]);

    let borrowed = LoanFilter {
        status: Some(LoanStatus::Borrowed),
        ..Default::default()
    };
    assert_eq!(ledger.list_loans(owner, &borrowed).await.unwrap().len(), 2);
    assert!(ledger
        .list_loans(owner, &LoanFilter::default())
        .await
        .unwrap()
        .iter()
        .any(|d| d.loan.id == late.loan.id));
}

#[tokio::test]
async fn test_snapshot_feeds_client_reconciliation() {
    let (ledger, _) = memory_ledger();
    let owner = Uuid::new_v4();
    let a = ledger.create_item(owner, item("SNP-1", 3)).await.unwrap();
    ledger.create_item(owner, item("SNP-2", 1)).await.unwrap();
    ledger.create_item(Uuid::new_v4(), item("OTHER-1", 1)).await.unwrap();
    ledger.create_loan(owner, loan(&[(a.id, 2)])).await.unwrap();

    let snapshot = ledger.snapshot(owner).await.unwrap();
    assert_eq!(snapshot.items.len(), 2);
    assert_eq!(snapshot.loans.len(), 1);

    let merged = reconcile(&LocalCache::default(), &snapshot);
    assert_eq!(merged.added, 2);
    let cached = merged
        .cache
        .items
        .iter()
        .find(|c| c.server_id == Some(a.id))
        .unwrap();
    assert_eq!(cached.available, Some(1));
    assert_eq!(merged.cache.last_pulled, Some(snapshot.as_of));
}

#[tokio::test]
async fn test_category_filter() {
    let (ledger, _) = memory_ledger();
    let owner = Uuid::new_v4();
    ledger.create_item(owner, item("CAT-1", 1)).await.unwrap();
    let mut audio = item("CAT-2", 1);
    audio.category = "audio".into();
    ledger.create_item(owner, audio).await.unwrap();

    assert_eq!(ledger.list_items(owner, Some("Audio")).await.unwrap().len(), 1);
    assert_eq!(ledger.list_items(owner, Some("")).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_replaced_line_photo_leaves_no_orphan_blob() {
    let (ledger, blobs) = memory_ledger();
    let owner = Uuid::new_v4();
    let boom = ledger.create_item(owner, item("BOOM-1", 1)).await.unwrap();
    let detail = ledger.create_loan(owner, loan(&[(boom.id, 1)])).await.unwrap();
    let line_id = detail.lines[0].line.id;

    let first = ledger.upload_photo(owner, "p1.jpg", None, b"first").await.unwrap();
    let second = ledger.upload_photo(owner, "p2.jpg", None, b"second").await.unwrap();
    ledger
        .attach_line_photo(owner, line_id, EvidenceSlot::Loan, &first)
        .await
        .unwrap();
    assert!(ledger
        .attach_line_photo(owner, line_id, EvidenceSlot::Loan, &second)
        .await
        .is_err());

    ledger.delete_loan(owner, detail.loan.id).await.unwrap();
    assert_eq!(*blobs.deleted.lock().unwrap(), vec![first]);
}

#[tokio::test]
async fn test_photos_of_another_owner_cannot_be_referenced() {
    let (ledger, blobs) = memory_ledger();
    let alice = Uuid::new_v4();
    let mallory = Uuid::new_v4();
    let taken = ledger.upload_photo(alice, "receipt.jpg", None, b"alice's").await.unwrap();

    let crate_item = ledger.create_item(mallory, item("CRT-1", 2)).await.unwrap();
    assert!(matches!(
        ledger.attach_item_photo(mallory, crate_item.id, &taken).await,
        Err(AppError::Validation(_))
    ));

    let mut draft = loan(&[(crate_item.id, 1)]);
    draft.evidence = EvidenceInput::Positional(vec![taken.clone()]);
    assert!(matches!(
        ledger.create_loan(mallory, draft).await,
        Err(AppError::Validation(_))
    ));

    let detail = ledger.create_loan(mallory, loan(&[(crate_item.id, 1)])).await.unwrap();
    let ret = LoanReturn {
        returned_on: date(2025, 1, 3),
        evidence: EvidenceInput::Positional(vec![taken.clone()]),
    };
    assert!(matches!(
        ledger.return_loan(mallory, detail.loan.id, ret).await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        ledger
            .attach_line_photo(mallory, detail.lines[0].line.id, EvidenceSlot::Loan, &taken)
            .await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        ledger.attach_item_photo(mallory, crate_item.id, "mem://elsewhere/x.jpg").await,
        Err(AppError::Validation(_))
    ));

    ledger.delete_loan(mallory, detail.loan.id).await.unwrap();
    ledger.delete_item(mallory, crate_item.id).await.unwrap();
    assert!(blobs.deleted.lock().unwrap().is_empty());

    assert!(matches!(
        ledger.download_photo(mallory, &taken).await,
        Err(AppError::Validation(_))
    ));
    let (bytes, content_type) = ledger.download_photo(alice, &taken).await.unwrap();
    assert_eq!(bytes, b"alice's");
    assert_eq!(content_type, "image/jpeg");
}
