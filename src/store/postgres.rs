use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::ledger::evidence::{self, Attach};
use crate::ledger::{availability, rules};
use crate::models::{
    Availability, EvidenceParent, EvidencePhoto, EvidenceSlot, InventoryItem, ItemPatch, ItemView,
    LineView, LoanDetail, LoanFilter, LoanLineItem, LoanRecord, LoanReturn,
};
use crate::sync::Snapshot;

use super::LedgerStore;

const ITEM_COLUMNS: &str = "id, owner_id, name, code, code_key, quantity, category, condition, \
     location, acquired_on, description, created_at, updated_at";

const LOAN_COLUMNS: &str = "id, owner_id, borrower_name, borrower_phone, loan_date, due_date, \
     returned_on, status, created_at, updated_at";

const LINE_COLUMNS: &str = "id, loan_id, item_id, quantity, position";

const PHOTO_COLUMNS: &str = "id, line_item_id, item_id, loan_image_path, return_image_path, \
     synced, created_at, updated_at";

/// Unique index guarding normalized codes per owner.
const CODE_KEY_INDEX: &str = "inventory_items_owner_code_key";

/// PostgreSQL server of record.
///
/// Writers that can raise the borrowed quantity of an item take
/// `FOR UPDATE` row locks on the affected `inventory_items` rows (in id
/// order) and recompute borrowed sums inside the same transaction before
/// writing, so concurrent loans cannot both pass the availability check.
#[derive(Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!().run(&self.pool).await
    }

    async fn code_conflict(&self, item: &InventoryItem) -> AppError {
        let mut conn = match self.pool.acquire().await {
            Ok(conn) => conn,
            Err(e) => return AppError::Database(e),
        };
        match find_code(&mut conn, item.owner_id, &item.code_key, Some(item.id)).await {
            Ok(Some(existing_id)) => AppError::DuplicateCode {
                code: item.code.clone(),
                existing_id,
            },
            Ok(None) => AppError::Internal("code conflict vanished before it could be reported".to_string()),
            Err(e) => e,
        }
    }
}

fn is_code_conflict(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.constraint() == Some(CODE_KEY_INDEX))
}

async fn fetch_item(conn: &mut PgConnection, owner_id: Uuid, id: Uuid, lock: bool) -> AppResult<InventoryItem> {
    let sql = format!(
        "SELECT {} FROM inventory_items WHERE id = $1 AND owner_id = $2{}",
        ITEM_COLUMNS,
        if lock { " FOR UPDATE" } else { "" }
    );
    sqlx::query_as::<_, InventoryItem>(&sql)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(AppError::item_not_found)
}

async fn find_code(
    conn: &mut PgConnection,
    owner_id: Uuid,
    code_key: &str,
    exclude: Option<Uuid>,
) -> AppResult<Option<Uuid>> {
    let id = sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM inventory_items \
         WHERE owner_id = $1 AND code_key = $2 AND ($3::uuid IS NULL OR id <> $3) \
         LIMIT 1",
    )
    .bind(owner_id)
    .bind(code_key)
    .bind(exclude)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(id)
}

/// Quantity per item currently tied up in `borrowed` loans.
async fn borrowed_map(conn: &mut PgConnection, item_ids: &[Uuid]) -> AppResult<HashMap<Uuid, i64>> {
    let rows: Vec<(Uuid, i64)> = sqlx::query_as(
        "SELECT li.item_id, COALESCE(SUM(li.quantity), 0)::BIGINT \
         FROM loan_line_items li JOIN loans l ON l.id = li.loan_id \
         WHERE l.status = 'borrowed' AND li.item_id = ANY($1) \
         GROUP BY li.item_id",
    )
    .bind(item_ids)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows.into_iter().collect())
}

async fn item_views(conn: &mut PgConnection, items: Vec<InventoryItem>) -> AppResult<Vec<ItemView>> {
    let ids: Vec<Uuid> = items.iter().map(|i| i.id).collect();
    let borrowed = borrowed_map(conn, &ids).await?;

    let sql = format!(
        "SELECT {} FROM evidence_photos WHERE item_id = ANY($1) ORDER BY created_at, id",
        PHOTO_COLUMNS
    );
    let mut photos: HashMap<Uuid, Vec<EvidencePhoto>> = HashMap::new();
    for photo in sqlx::query_as::<_, EvidencePhoto>(&sql)
        .bind(&ids)
        .fetch_all(&mut *conn)
        .await?
    {
        if let Some(item_id) = photo.item_id {
            photos.entry(item_id).or_default().push(photo);
        }
    }

    Ok(items
        .into_iter()
        .map(|item| ItemView {
            borrowed: borrowed.get(&item.id).copied().unwrap_or(0),
            photos: photos.remove(&item.id).unwrap_or_default(),
            item,
        })
        .collect())
}

async fn owner_items(conn: &mut PgConnection, owner_id: Uuid) -> AppResult<Vec<ItemView>> {
    let sql = format!(
        "SELECT {} FROM inventory_items WHERE owner_id = $1 ORDER BY name ASC, id",
        ITEM_COLUMNS
    );
    let items = sqlx::query_as::<_, InventoryItem>(&sql)
        .bind(owner_id)
        .fetch_all(&mut *conn)
        .await?;
    item_views(conn, items).await
}

async fn loan_details(conn: &mut PgConnection, loans: Vec<LoanRecord>) -> AppResult<Vec<LoanDetail>> {
    let loan_ids: Vec<Uuid> = loans.iter().map(|l| l.id).collect();

    let sql = format!(
        "SELECT {} FROM loan_line_items WHERE loan_id = ANY($1) ORDER BY loan_id, position",
        LINE_COLUMNS
    );
    let lines = sqlx::query_as::<_, LoanLineItem>(&sql)
        .bind(&loan_ids)
        .fetch_all(&mut *conn)
        .await?;

    let line_ids: Vec<Uuid> = lines.iter().map(|l| l.id).collect();
    let sql = format!(
        "SELECT {} FROM evidence_photos WHERE line_item_id = ANY($1)",
        PHOTO_COLUMNS
    );
    let mut photos: HashMap<Uuid, EvidencePhoto> = sqlx::query_as::<_, EvidencePhoto>(&sql)
        .bind(&line_ids)
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .filter_map(|p| p.line_item_id.map(|id| (id, p)))
        .collect();

    let mut by_loan: HashMap<Uuid, Vec<LineView>> = HashMap::new();
    for line in lines {
        let photo = photos.remove(&line.id);
        by_loan
            .entry(line.loan_id)
            .or_default()
            .push(LineView { line, photo });
    }

    Ok(loans
        .into_iter()
        .map(|loan| LoanDetail {
            lines: by_loan.remove(&loan.id).unwrap_or_default(),
            loan,
        })
        .collect())
}

async fn fetch_loan(conn: &mut PgConnection, owner_id: Uuid, id: Uuid, lock: bool) -> AppResult<LoanDetail> {
    let sql = format!(
        "SELECT {} FROM loans WHERE id = $1 AND owner_id = $2{}",
        LOAN_COLUMNS,
        if lock { " FOR UPDATE" } else { "" }
    );
    let loan = sqlx::query_as::<_, LoanRecord>(&sql)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(AppError::loan_not_found)?;
    let mut details = loan_details(conn, vec![loan]).await?;
    details.pop().ok_or_else(AppError::loan_not_found)
}

async fn owner_loans(conn: &mut PgConnection, owner_id: Uuid, filter: &LoanFilter) -> AppResult<Vec<LoanDetail>> {
    let sql = format!(
        "SELECT {} FROM loans \
         WHERE owner_id = $1 AND ($2::text IS NULL OR status = $2) \
         AND ($3::date IS NULL OR due_date <= $3) \
         ORDER BY loan_date DESC, created_at DESC",
        LOAN_COLUMNS
    );
    let loans = sqlx::query_as::<_, LoanRecord>(&sql)
        .bind(owner_id)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.due_before)
        .fetch_all(&mut *conn)
        .await?;
    loan_details(conn, loans).await
}

async fn insert_photo(conn: &mut PgConnection, photo: &EvidencePhoto) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO evidence_photos \
         (id, line_item_id, item_id, loan_image_path, return_image_path, synced, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(photo.id)
    .bind(photo.line_item_id)
    .bind(photo.item_id)
    .bind(&photo.loan_image_path)
    .bind(&photo.return_image_path)
    .bind(photo.synced)
    .bind(photo.created_at)
    .bind(photo.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn update_photo(conn: &mut PgConnection, photo: &EvidencePhoto) -> AppResult<()> {
    sqlx::query(
        "UPDATE evidence_photos SET loan_image_path = $1, return_image_path = $2, \
         synced = $3, updated_at = $4 WHERE id = $5",
    )
    .bind(&photo.loan_image_path)
    .bind(&photo.return_image_path)
    .bind(photo.synced)
    .bind(photo.updated_at)
    .bind(photo.id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn save_attach(conn: &mut PgConnection, plan: &Attach) -> AppResult<()> {
    match plan {
        Attach::Insert(photo) => insert_photo(conn, photo).await,
        Attach::Update(photo) => update_photo(conn, photo).await,
    }
}

#[tonic::async_trait]
impl LedgerStore for PgLedgerStore {
    async fn insert_item(&self, item: InventoryItem) -> AppResult<InventoryItem> {
        let mut conn = self.pool.acquire().await?;
        if let Some(existing_id) = find_code(&mut conn, item.owner_id, &item.code_key, None).await? {
            return Err(AppError::DuplicateCode {
                code: item.code,
                existing_id,
            });
        }

        let sql = format!(
            "INSERT INTO inventory_items ({cols}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {cols}",
            cols = ITEM_COLUMNS
        );
        let result = sqlx::query_as::<_, InventoryItem>(&sql)
            .bind(item.id)
            .bind(item.owner_id)
            .bind(&item.name)
            .bind(&item.code)
            .bind(&item.code_key)
            .bind(item.quantity)
            .bind(&item.category)
            .bind(&item.condition)
            .bind(&item.location)
            .bind(item.acquired_on)
            .bind(&item.description)
            .bind(item.created_at)
            .bind(item.updated_at)
            .fetch_one(&mut *conn)
            .await;

        match result {
            Ok(saved) => Ok(saved),
            Err(e) if is_code_conflict(&e) => Err(self.code_conflict(&item).await),
            Err(e) => Err(e.into()),
        }
    }

    async fn item(&self, owner_id: Uuid, id: Uuid) -> AppResult<ItemView> {
        let mut conn = self.pool.acquire().await?;
        let item = fetch_item(&mut conn, owner_id, id, false).await?;
        let mut views = item_views(&mut conn, vec![item]).await?;
        views.pop().ok_or_else(AppError::item_not_found)
    }

    async fn items(&self, owner_id: Uuid) -> AppResult<Vec<ItemView>> {
        let mut conn = self.pool.acquire().await?;
        owner_items(&mut conn, owner_id).await
    }

    async fn update_item(&self, owner_id: Uuid, id: Uuid, patch: ItemPatch) -> AppResult<InventoryItem> {
        let mut tx = self.pool.begin().await?;
        let mut item = fetch_item(&mut tx, owner_id, id, true).await?;
        let previous_quantity = item.quantity;

        let code_changed = rules::apply_patch(&mut item, patch, Utc::now())?;
        if code_changed {
            if let Some(existing_id) = find_code(&mut tx, owner_id, &item.code_key, Some(id)).await? {
                return Err(AppError::DuplicateCode {
                    code: item.code,
                    existing_id,
                });
            }
        }
        if item.quantity < previous_quantity {
            let borrowed = borrowed_map(&mut tx, &[id]).await?;
            availability::check_total(id, item.quantity, borrowed.get(&id).copied().unwrap_or(0))?;
        }

        let sql = format!(
            "UPDATE inventory_items SET name = $1, code = $2, code_key = $3, quantity = $4, \
             category = $5, condition = $6, location = $7, acquired_on = $8, description = $9, \
             updated_at = $10 \
             WHERE id = $11 AND owner_id = $12 \
             RETURNING {}",
            ITEM_COLUMNS
        );
        let result = sqlx::query_as::<_, InventoryItem>(&sql)
            .bind(&item.name)
            .bind(&item.code)
            .bind(&item.code_key)
            .bind(item.quantity)
            .bind(&item.category)
            .bind(&item.condition)
            .bind(&item.location)
            .bind(item.acquired_on)
            .bind(&item.description)
            .bind(item.updated_at)
            .bind(id)
            .bind(owner_id)
            .fetch_one(&mut *tx)
            .await;

        let saved = match result {
            Ok(saved) => saved,
            Err(e) if is_code_conflict(&e) => {
                drop(tx);
                return Err(self.code_conflict(&item).await);
            }
            Err(e) => return Err(e.into()),
        };
        tx.commit().await?;
        Ok(saved)
    }

    async fn delete_item(&self, owner_id: Uuid, id: Uuid) -> AppResult<Vec<EvidencePhoto>> {
        let mut tx = self.pool.begin().await?;
        fetch_item(&mut tx, owner_id, id, true).await?;

        // Returned loans keep their lines as history; only open loans block.
        let open: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loan_line_items li JOIN loans l ON l.id = li.loan_id \
             WHERE li.item_id = $1 AND l.status = 'borrowed'",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if open > 0 {
            return Err(AppError::Validation(format!(
                "item is still out on {} loan(s); return them first",
                open
            )));
        }

        let sql = format!(
            "DELETE FROM evidence_photos WHERE item_id = $1 RETURNING {}",
            PHOTO_COLUMNS
        );
        let photos = sqlx::query_as::<_, EvidencePhoto>(&sql)
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM inventory_items WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(photos)
    }

    async fn find_code(&self, owner_id: Uuid, code_key: &str, exclude: Option<Uuid>) -> AppResult<Option<Uuid>> {
        let mut conn = self.pool.acquire().await?;
        find_code(&mut conn, owner_id, code_key, exclude).await
    }

    async fn borrowed_quantity(&self, owner_id: Uuid, item_id: Uuid) -> AppResult<i64> {
        let mut conn = self.pool.acquire().await?;
        fetch_item(&mut conn, owner_id, item_id, false).await?;
        let borrowed = borrowed_map(&mut conn, &[item_id]).await?;
        Ok(borrowed.get(&item_id).copied().unwrap_or(0))
    }

    async fn insert_loan(&self, detail: LoanDetail) -> AppResult<LoanDetail> {
        let owner_id = detail.loan.owner_id;
        let mut item_ids: Vec<Uuid> = detail.lines.iter().map(|l| l.line.item_id).collect();
        item_ids.sort();
        item_ids.dedup();

        let mut tx = self.pool.begin().await?;

        let locked: Vec<(Uuid, i32)> = sqlx::query_as(
            "SELECT id, quantity FROM inventory_items \
             WHERE owner_id = $1 AND id = ANY($2) \
             ORDER BY id FOR UPDATE",
        )
        .bind(owner_id)
        .bind(&item_ids)
        .fetch_all(&mut *tx)
        .await?;
        let borrowed = borrowed_map(&mut tx, &item_ids).await?;
        let stock: HashMap<Uuid, Availability> = locked
            .into_iter()
            .map(|(item_id, total)| {
                let avail = Availability {
                    item_id,
                    total,
                    borrowed: borrowed.get(&item_id).copied().unwrap_or(0),
                };
                (item_id, avail)
            })
            .collect();
        availability::check_lines(&detail.lines, &stock)?;

        let loan = &detail.loan;
        sqlx::query(&format!(
            "INSERT INTO loans ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
            LOAN_COLUMNS
        ))
        .bind(loan.id)
        .bind(loan.owner_id)
        .bind(&loan.borrower_name)
        .bind(&loan.borrower_phone)
        .bind(loan.loan_date)
        .bind(loan.due_date)
        .bind(loan.returned_on)
        .bind(loan.status.as_str())
        .bind(loan.created_at)
        .bind(loan.updated_at)
        .execute(&mut *tx)
        .await?;

        for view in &detail.lines {
            let line = &view.line;
            sqlx::query(&format!(
                "INSERT INTO loan_line_items ({}) VALUES ($1, $2, $3, $4, $5)",
                LINE_COLUMNS
            ))
            .bind(line.id)
            .bind(line.loan_id)
            .bind(line.item_id)
            .bind(line.quantity)
            .bind(line.position)
            .execute(&mut *tx)
            .await?;
            if let Some(photo) = &view.photo {
                insert_photo(&mut tx, photo).await?;
            }
        }

        tx.commit().await?;
        Ok(detail)
    }

    async fn loan(&self, owner_id: Uuid, id: Uuid) -> AppResult<LoanDetail> {
        let mut conn = self.pool.acquire().await?;
        fetch_loan(&mut conn, owner_id, id, false).await
    }

    async fn loans(&self, owner_id: Uuid, filter: &LoanFilter) -> AppResult<Vec<LoanDetail>> {
        let mut conn = self.pool.acquire().await?;
        owner_loans(&mut conn, owner_id, filter).await
    }

    async fn return_loan(&self, owner_id: Uuid, id: Uuid, ret: LoanReturn) -> AppResult<LoanDetail> {
        let mut tx = self.pool.begin().await?;
        let mut detail = fetch_loan(&mut tx, owner_id, id, true).await?;

        let item_ids: Vec<Uuid> = detail.lines.iter().map(|l| l.line.item_id).collect();
        let photos = evidence::assign(&item_ids, &ret.evidence)?;
        let plans = rules::apply_return(&mut detail, ret.returned_on, photos, Utc::now())?;

        let loan = &detail.loan;
        sqlx::query("UPDATE loans SET status = $1, returned_on = $2, updated_at = $3 WHERE id = $4")
            .bind(loan.status.as_str())
            .bind(loan.returned_on)
            .bind(loan.updated_at)
            .bind(loan.id)
            .execute(&mut *tx)
            .await?;
        for plan in &plans {
            save_attach(&mut tx, plan).await?;
        }

        tx.commit().await?;
        Ok(detail)
    }

    async fn delete_loan(&self, owner_id: Uuid, id: Uuid) -> AppResult<LoanDetail> {
        let mut tx = self.pool.begin().await?;
        let detail = fetch_loan(&mut tx, owner_id, id, true).await?;

        let line_ids: Vec<Uuid> = detail.lines.iter().map(|l| l.line.id).collect();
        sqlx::query("DELETE FROM evidence_photos WHERE line_item_id = ANY($1)")
            .bind(&line_ids)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM loan_line_items WHERE loan_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM loans WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(detail)
    }

    async fn attach_evidence(
        &self,
        owner_id: Uuid,
        parent: EvidenceParent,
        slot: EvidenceSlot,
        path: &str,
    ) -> AppResult<EvidencePhoto> {
        let mut tx = self.pool.begin().await?;
        let existing = match parent {
            EvidenceParent::Item(item_id) => {
                fetch_item(&mut tx, owner_id, item_id, false).await?;
                None
            }
            EvidenceParent::LineItem(line_id) => {
                sqlx::query_scalar::<_, Uuid>(
                    "SELECT li.id FROM loan_line_items li JOIN loans l ON l.id = li.loan_id \
                     WHERE li.id = $1 AND l.owner_id = $2 FOR UPDATE OF li",
                )
                .bind(line_id)
                .bind(owner_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::NotFound("Line item not found".to_string()))?;

                let sql = format!(
                    "SELECT {} FROM evidence_photos WHERE line_item_id = $1",
                    PHOTO_COLUMNS
                );
                sqlx::query_as::<_, EvidencePhoto>(&sql)
                    .bind(line_id)
                    .fetch_optional(&mut *tx)
                    .await?
            }
        };

        let plan = evidence::plan_attach(existing.as_ref(), parent, slot, path, Utc::now())?;
        save_attach(&mut tx, &plan).await?;
        tx.commit().await?;
        Ok(plan.into_photo())
    }

    async fn delete_item_photo(&self, owner_id: Uuid, photo_id: Uuid) -> AppResult<EvidencePhoto> {
        let sql = "DELETE FROM evidence_photos p USING inventory_items i \
                   WHERE p.id = $1 AND p.item_id = i.id AND i.owner_id = $2 \
                   RETURNING p.id, p.line_item_id, p.item_id, p.loan_image_path, \
                   p.return_image_path, p.synced, p.created_at, p.updated_at";
        sqlx::query_as::<_, EvidencePhoto>(sql)
            .bind(photo_id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Photo not found".to_string()))
    }

    async fn path_referenced(&self, path: &str) -> AppResult<bool> {
        let referenced: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM evidence_photos \
             WHERE loan_image_path = $1 OR return_image_path = $1)",
        )
        .bind(path)
        .fetch_one(&self.pool)
        .await?;
        Ok(referenced)
    }

    async fn snapshot(&self, owner_id: Uuid) -> AppResult<Snapshot> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let as_of: DateTime<Utc> = sqlx::query_scalar("SELECT NOW()").fetch_one(&mut *tx).await?;
        let items = owner_items(&mut tx, owner_id).await?;
        let loans = owner_loans(&mut tx, owner_id, &LoanFilter::default()).await?;

        tx.commit().await?;
        Ok(Snapshot { items, loans, as_of })
    }
}
