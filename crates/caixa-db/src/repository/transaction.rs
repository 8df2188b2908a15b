//! # Transaction Repository
//!
//! Database operations for cash movements. Transactions are append-only:
//! there is no update or delete here, and the foreign key back to
//! `cash_registers` is what the deletion guard leans on.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use caixa_core::{CashTransaction, TransactionKind};

/// Input for recording a cash movement.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub register_id: String,
    pub kind: TransactionKind,
    /// Always positive; direction is carried by `kind`.
    pub amount_cents: i64,
    pub description: Option<String>,
}

/// Repository for cash transaction database operations.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Records a movement against a register.
    pub async fn insert(&self, new: NewTransaction) -> DbResult<CashTransaction> {
        let transaction = CashTransaction {
            id: Uuid::new_v4().to_string(),
            register_id: new.register_id,
            kind: new.kind,
            amount_cents: new.amount_cents,
            description: new.description,
            created_at: Utc::now(),
        };

        debug!(
            register_id = %transaction.register_id,
            amount = transaction.amount_cents,
            "Recording cash transaction"
        );

        sqlx::query(
            r#"
            INSERT INTO cash_transactions (
                id, register_id, kind, amount_cents, description, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&transaction.id)
        .bind(&transaction.register_id)
        .bind(transaction.kind)
        .bind(transaction.amount_cents)
        .bind(&transaction.description)
        .bind(transaction.created_at)
        .execute(&self.pool)
        .await?;

        Ok(transaction)
    }

    /// Lists all movements for a register, oldest first.
    pub async fn list_for_register(&self, register_id: &str) -> DbResult<Vec<CashTransaction>> {
        let transactions = sqlx::query_as::<_, CashTransaction>(
            r#"
            SELECT id, register_id, kind, amount_cents, description, created_at
            FROM cash_transactions
            WHERE register_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(register_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    /// Number of movements recorded against a register.
    pub async fn count_for_register(&self, register_id: &str) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM cash_transactions WHERE register_id = ?1")
                .bind(register_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use crate::repository::register::NewRegister;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_list() {
        let db = test_db().await;
        let register = db
            .registers()
            .create(NewRegister {
                operator_id: "op-1".to_string(),
                opening_balance_cents: 5000,
                opening_notes: None,
            })
            .await
            .unwrap();

        db.transactions()
            .insert(NewTransaction {
                register_id: register.id.clone(),
                kind: TransactionKind::Inflow,
                amount_cents: 1200,
                description: Some("day pass".to_string()),
            })
            .await
            .unwrap();
        db.transactions()
            .insert(NewTransaction {
                register_id: register.id.clone(),
                kind: TransactionKind::Outflow,
                amount_cents: 300,
                description: None,
            })
            .await
            .unwrap();

        let rows = db.transactions().list_for_register(&register.id).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].kind, TransactionKind::Inflow);
        assert_eq!(rows[0].signed_amount().cents(), 1200);
        assert_eq!(rows[1].signed_amount().cents(), -300);

        assert_eq!(db.transactions().count_for_register(&register.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_insert_requires_existing_register() {
        let db = test_db().await;
        let err = db
            .transactions()
            .insert(NewTransaction {
                register_id: "ghost".to_string(),
                kind: TransactionKind::Inflow,
                amount_cents: 100,
                description: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }
}
