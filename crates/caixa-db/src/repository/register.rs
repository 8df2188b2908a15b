//! # Register Repository
//!
//! Database operations for cash registers.
//!
//! ## Register Lifecycle at the Store Layer
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Register Lifecycle                               │
//! │                                                                     │
//! │  1. CREATE                                                          │
//! │     └── create() → CashRegister { status: Open }                   │
//! │                                                                     │
//! │  2. EDIT (notes, reconcile-phase status hops)                      │
//! │     └── apply_change_set() ← writes ONLY what the lifecycle rules  │
//! │         in caixa-core accepted; never totals, never closed_at      │
//! │                                                                     │
//! │  3. EXPLICIT TRANSITIONS (guarded UPDATEs)                         │
//! │     └── close()                  WHERE status = 'open'             │
//! │     └── reconcile()              WHERE status = 'closed'           │
//! │     └── reopen_for_correction()  WHERE status = 'reconciled'       │
//! │                                                                     │
//! │  4. DELETE                                                          │
//! │     └── delete() → FK violation when transactions still exist      │
//! │                                                                     │
//! │  Totals are never stored: every SELECT derives them from           │
//! │  SUM(cash_transactions.amount_cents) subqueries.                   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use caixa_core::{CashRegister, RegisterChangeSet, RegisterStatus};

/// Shared SELECT list: register columns plus the derived totals.
const SELECT_REGISTER: &str = r#"
SELECT
    r.id,
    r.operator_id,
    r.opening_balance_cents,
    r.opened_at,
    r.closed_at,
    r.status,
    r.opening_notes,
    r.closing_notes,
    COALESCE((SELECT SUM(t.amount_cents) FROM cash_transactions t
              WHERE t.register_id = r.id AND t.kind = 'inflow'), 0) AS total_inflow_cents,
    COALESCE((SELECT SUM(t.amount_cents) FROM cash_transactions t
              WHERE t.register_id = r.id AND t.kind = 'outflow'), 0) AS total_outflow_cents,
    r.created_at,
    r.updated_at
FROM cash_registers r
"#;

// =============================================================================
// Listing Parameters
// =============================================================================

/// Filter for register listing. All fields combine with AND.
#[derive(Debug, Clone, Default)]
pub struct RegisterFilter {
    pub status: Option<RegisterStatus>,
    pub operator_id: Option<String>,
    pub opened_from: Option<DateTime<Utc>>,
    pub opened_to: Option<DateTime<Utc>>,
    /// Case-insensitive substring match over both notes fields.
    pub search: Option<String>,
}

/// Ordering for register listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOrder {
    /// Newest first - the admin table default.
    OpenedAtDesc,
    OpenedAtAsc,
}

impl RegisterOrder {
    fn sql(&self) -> &'static str {
        match self {
            RegisterOrder::OpenedAtDesc => "r.opened_at DESC",
            RegisterOrder::OpenedAtAsc => "r.opened_at ASC",
        }
    }
}

/// Pagination window.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

/// Input for creating a register. Id and timestamps are minted here.
#[derive(Debug, Clone)]
pub struct NewRegister {
    pub operator_id: String,
    pub opening_balance_cents: i64,
    pub opening_notes: Option<String>,
}

/// Derived transaction sums for one register.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct RegisterTotals {
    pub total_inflow_cents: i64,
    pub total_outflow_cents: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for cash register database operations.
#[derive(Debug, Clone)]
pub struct RegisterRepository {
    pool: SqlitePool,
}

impl RegisterRepository {
    /// Creates a new RegisterRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RegisterRepository { pool }
    }

    /// Creates a register in `Open` status with a minted UUID.
    pub async fn create(&self, new: NewRegister) -> DbResult<CashRegister> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(id = %id, operator_id = %new.operator_id, "Creating cash register");

        let register = CashRegister::new_open(
            id,
            new.operator_id,
            new.opening_balance_cents,
            new.opening_notes,
            now,
        );

        sqlx::query(
            r#"
            INSERT INTO cash_registers (
                id, operator_id, opening_balance_cents,
                opened_at, closed_at, status,
                opening_notes, closing_notes,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&register.id)
        .bind(&register.operator_id)
        .bind(register.opening_balance_cents)
        .bind(register.opened_at)
        .bind(register.closed_at)
        .bind(register.status)
        .bind(&register.opening_notes)
        .bind(&register.closing_notes)
        .bind(register.created_at)
        .bind(register.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(register)
    }

    /// Gets a register by ID, with derived totals.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<CashRegister>> {
        let sql = format!("{SELECT_REGISTER} WHERE r.id = ?1");
        let register = sqlx::query_as::<_, CashRegister>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(register)
    }

    /// Lists registers matching the filter, ordered and paginated.
    pub async fn list(
        &self,
        filter: &RegisterFilter,
        order: RegisterOrder,
        page: &Page,
    ) -> DbResult<Vec<CashRegister>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_REGISTER);
        push_filter(&mut qb, filter);

        qb.push(" ORDER BY ").push(order.sql());
        qb.push(" LIMIT ").push_bind(page.limit);
        qb.push(" OFFSET ").push_bind(page.offset);

        let registers = qb
            .build_query_as::<CashRegister>()
            .fetch_all(&self.pool)
            .await?;

        Ok(registers)
    }

    /// Counts registers matching the filter (for pagination totals).
    pub async fn count(&self, filter: &RegisterFilter) -> DbResult<i64> {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT COUNT(*) FROM cash_registers r");
        push_filter(&mut qb, filter);

        let count: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;

        Ok(count)
    }

    /// Applies a change set computed by `caixa_core::propose_update`.
    ///
    /// Writes exactly the accepted fields plus `updated_at`. Totals and
    /// `closed_at` have no path through here: totals are derived, and
    /// `closed_at` is owned by the explicit close action.
    pub async fn apply_change_set(&self, id: &str, changes: &RegisterChangeSet) -> DbResult<()> {
        if changes.is_empty() {
            // The service skips the write on NoChanges; reaching here with
            // an empty set is a caller bug, not a database problem.
            return Ok(());
        }

        debug!(id = %id, ?changes, "Applying register change set");

        let now = Utc::now();
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE cash_registers SET ");
        let mut fields = qb.separated(", ");

        if let Some(notes) = &changes.opening_notes {
            fields.push("opening_notes = ");
            fields.push_bind_unseparated(notes.clone());
        }
        if let Some(notes) = &changes.closing_notes {
            fields.push("closing_notes = ");
            fields.push_bind_unseparated(notes.clone());
        }
        if let Some(status) = changes.status {
            fields.push("status = ");
            fields.push_bind_unseparated(status);
        }
        fields.push("updated_at = ");
        fields.push_bind_unseparated(now);

        qb.push(" WHERE id = ").push_bind(id.to_string());

        let result = qb.build().execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Cash register", id));
        }

        Ok(())
    }

    /// Closes an open register, stamping `closed_at` exactly once.
    ///
    /// The `WHERE status = 'open'` guard makes the transition atomic:
    /// a concurrent close loses the race and reports not-found-in-state.
    pub async fn close(&self, id: &str, now: DateTime<Utc>) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE cash_registers SET
                status = 'closed',
                closed_at = COALESCE(closed_at, ?1),
                updated_at = ?1
            WHERE id = ?2 AND status = 'open'
            "#,
        )
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Cash register (open)", id));
        }

        Ok(())
    }

    /// Marks a closed register as reconciled.
    pub async fn reconcile(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE cash_registers SET
                status = 'reconciled',
                updated_at = ?1
            WHERE id = ?2 AND status = 'closed'
            "#,
        )
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Cash register (closed)", id));
        }

        Ok(())
    }

    /// The correction path: Reconciled back to Closed. `closed_at` keeps
    /// its original value.
    pub async fn reopen_for_correction(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE cash_registers SET
                status = 'closed',
                updated_at = ?1
            WHERE id = ?2 AND status = 'reconciled'
            "#,
        )
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Cash register (reconciled)", id));
        }

        Ok(())
    }

    /// Deletes a register. The RESTRICT foreign key on cash_transactions
    /// surfaces as [`DbError::ForeignKeyViolation`] when movements exist;
    /// the service layer classifies that for the user.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting cash register");

        let result = sqlx::query("DELETE FROM cash_registers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Cash register", id));
        }

        Ok(())
    }

    /// Derived inflow/outflow sums for a register.
    pub async fn totals(&self, id: &str) -> DbResult<RegisterTotals> {
        let totals = sqlx::query_as::<_, RegisterTotals>(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN kind = 'inflow' THEN amount_cents END), 0)
                    AS total_inflow_cents,
                COALESCE(SUM(CASE WHEN kind = 'outflow' THEN amount_cents END), 0)
                    AS total_outflow_cents
            FROM cash_transactions
            WHERE register_id = ?1
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(totals)
    }
}

/// Appends the filter's WHERE clause to a query under construction.
fn push_filter(qb: &mut QueryBuilder<Sqlite>, filter: &RegisterFilter) {
    qb.push(" WHERE 1 = 1");

    if let Some(status) = filter.status {
        qb.push(" AND r.status = ").push_bind(status);
    }
    if let Some(operator_id) = &filter.operator_id {
        qb.push(" AND r.operator_id = ").push_bind(operator_id.clone());
    }
    if let Some(from) = filter.opened_from {
        qb.push(" AND r.opened_at >= ").push_bind(from);
    }
    if let Some(to) = filter.opened_to {
        qb.push(" AND r.opened_at <= ").push_bind(to);
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search);
        qb.push(" AND (r.opening_notes LIKE ")
            .push_bind(pattern.clone())
            .push(" OR r.closing_notes LIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::transaction::{NewTransaction, TransactionRepository};
    use caixa_core::TransactionKind;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn new_register(operator: &str) -> NewRegister {
        NewRegister {
            operator_id: operator.to_string(),
            opening_balance_cents: 10_000,
            opening_notes: Some("morning shift".to_string()),
        }
    }

    async fn seed_transactions(repo: &TransactionRepository, register_id: &str) {
        for (kind, amount) in [
            (TransactionKind::Inflow, 2500),
            (TransactionKind::Inflow, 50),
            (TransactionKind::Outflow, 500),
        ] {
            repo.insert(NewTransaction {
                register_id: register_id.to_string(),
                kind,
                amount_cents: amount,
                description: None,
            })
            .await
            .unwrap();
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = test_db().await;
        let created = db.registers().create(new_register("op-1")).await.unwrap();

        let fetched = db.registers().get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, RegisterStatus::Open);
        assert_eq!(fetched.opening_balance_cents, 10_000);
        assert_eq!(fetched.total_inflow_cents, 0);
        assert_eq!(fetched.total_outflow_cents, 0);
        assert!(fetched.invariants_hold());
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let db = test_db().await;
        assert!(db.registers().get_by_id("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_totals_derived_from_transactions() {
        let db = test_db().await;
        let register = db.registers().create(new_register("op-1")).await.unwrap();
        seed_transactions(&db.transactions(), &register.id).await;

        let fetched = db.registers().get_by_id(&register.id).await.unwrap().unwrap();
        assert_eq!(fetched.total_inflow_cents, 2550);
        assert_eq!(fetched.total_outflow_cents, 500);
        assert_eq!(fetched.final_balance().cents(), 10_000 + 2550 - 500);

        let totals = db.registers().totals(&register.id).await.unwrap();
        assert_eq!(totals.total_inflow_cents, 2550);
        assert_eq!(totals.total_outflow_cents, 500);
    }

    #[tokio::test]
    async fn test_apply_change_set_writes_only_accepted_fields() {
        let db = test_db().await;
        let register = db.registers().create(new_register("op-1")).await.unwrap();
        db.registers().close(&register.id, Utc::now()).await.unwrap();

        let changes = RegisterChangeSet {
            opening_notes: Some("corrected".to_string()),
            closing_notes: Some("till counted".to_string()),
            status: None,
        };
        db.registers()
            .apply_change_set(&register.id, &changes)
            .await
            .unwrap();

        let fetched = db.registers().get_by_id(&register.id).await.unwrap().unwrap();
        assert_eq!(fetched.opening_notes.as_deref(), Some("corrected"));
        assert_eq!(fetched.closing_notes.as_deref(), Some("till counted"));
        assert_eq!(fetched.status, RegisterStatus::Closed);
        // untouched fields survive
        assert_eq!(fetched.opening_balance_cents, 10_000);
    }

    #[tokio::test]
    async fn test_apply_change_set_status_hop() {
        let db = test_db().await;
        let register = db.registers().create(new_register("op-1")).await.unwrap();
        db.registers().close(&register.id, Utc::now()).await.unwrap();

        let changes = RegisterChangeSet {
            status: Some(RegisterStatus::Reconciled),
            ..Default::default()
        };
        db.registers()
            .apply_change_set(&register.id, &changes)
            .await
            .unwrap();

        let fetched = db.registers().get_by_id(&register.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, RegisterStatus::Reconciled);
        assert!(fetched.closed_at.is_some());
    }

    #[tokio::test]
    async fn test_apply_change_set_missing_register() {
        let db = test_db().await;
        let changes = RegisterChangeSet {
            opening_notes: Some("x".to_string()),
            ..Default::default()
        };
        let err = db
            .registers()
            .apply_change_set("missing", &changes)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_close_sets_closed_at_once() {
        let db = test_db().await;
        let register = db.registers().create(new_register("op-1")).await.unwrap();

        let t1 = Utc::now();
        db.registers().close(&register.id, t1).await.unwrap();
        let after_close = db.registers().get_by_id(&register.id).await.unwrap().unwrap();
        assert_eq!(after_close.status, RegisterStatus::Closed);
        assert!(after_close.closed_at.is_some());
        assert!(after_close.invariants_hold());

        // reconcile then correct back: closed_at unchanged
        db.registers().reconcile(&register.id).await.unwrap();
        db.registers().reopen_for_correction(&register.id).await.unwrap();
        let after_hops = db.registers().get_by_id(&register.id).await.unwrap().unwrap();
        assert_eq!(after_hops.closed_at, after_close.closed_at);
        assert_eq!(after_hops.status, RegisterStatus::Closed);
    }

    #[tokio::test]
    async fn test_guarded_transitions_reject_wrong_state() {
        let db = test_db().await;
        let register = db.registers().create(new_register("op-1")).await.unwrap();

        // reconcile before close: guard misses the row
        assert!(db.registers().reconcile(&register.id).await.is_err());
        // correction before reconcile likewise
        assert!(db.registers().reopen_for_correction(&register.id).await.is_err());

        db.registers().close(&register.id, Utc::now()).await.unwrap();
        // second close loses the status guard
        assert!(db.registers().close(&register.id, Utc::now()).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_without_transactions() {
        let db = test_db().await;
        let register = db.registers().create(new_register("op-1")).await.unwrap();

        db.registers().delete(&register.id).await.unwrap();
        assert!(db.registers().get_by_id(&register.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_blocked_by_transactions() {
        let db = test_db().await;
        let register = db.registers().create(new_register("op-1")).await.unwrap();
        seed_transactions(&db.transactions(), &register.id).await;

        let err = db.registers().delete(&register.id).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));

        // register survives the rejected delete
        assert!(db.registers().get_by_id(&register.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_list_filter_and_pagination() {
        let db = test_db().await;
        let repo = db.registers();

        let a = repo.create(new_register("op-1")).await.unwrap();
        let _b = repo.create(new_register("op-1")).await.unwrap();
        let _c = repo.create(new_register("op-2")).await.unwrap();
        repo.close(&a.id, Utc::now()).await.unwrap();

        let all = RegisterFilter::default();
        let page = Page { limit: 10, offset: 0 };
        assert_eq!(repo.list(&all, RegisterOrder::OpenedAtDesc, &page).await.unwrap().len(), 3);
        assert_eq!(repo.count(&all).await.unwrap(), 3);

        let open_only = RegisterFilter {
            status: Some(RegisterStatus::Open),
            ..Default::default()
        };
        assert_eq!(repo.count(&open_only).await.unwrap(), 2);

        let by_operator = RegisterFilter {
            operator_id: Some("op-2".to_string()),
            ..Default::default()
        };
        assert_eq!(repo.count(&by_operator).await.unwrap(), 1);

        // pagination window
        let first_two = Page { limit: 2, offset: 0 };
        assert_eq!(
            repo.list(&all, RegisterOrder::OpenedAtDesc, &first_two)
                .await
                .unwrap()
                .len(),
            2
        );
        let rest = Page { limit: 2, offset: 2 };
        assert_eq!(
            repo.list(&all, RegisterOrder::OpenedAtDesc, &rest)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_list_search_over_notes() {
        let db = test_db().await;
        let repo = db.registers();

        repo.create(NewRegister {
            operator_id: "op-1".to_string(),
            opening_balance_cents: 0,
            opening_notes: Some("evening shift".to_string()),
        })
        .await
        .unwrap();
        repo.create(new_register("op-1")).await.unwrap(); // "morning shift"

        let filter = RegisterFilter {
            search: Some("evening".to_string()),
            ..Default::default()
        };
        let rows = repo
            .list(&filter, RegisterOrder::OpenedAtDesc, &Page { limit: 10, offset: 0 })
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].opening_notes.as_deref(), Some("evening shift"));
    }
}
