//! # Register Service
//!
//! The operations the admin front-end calls. Each one follows the same
//! shape: fetch current state, run the caixa-core rules, persist what the
//! rules accepted, convert failures at the call site.
//!
//! ## Update Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  update_register(id, patch)                                         │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  get_by_id(id) ── None ──► ApiError::NotFound                       │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  propose_update(current, patch, policy)                             │
//! │       │                                                             │
//! │       ├── Err(InvalidTransition) ─► warn-grade ApiError, NO WRITE   │
//! │       ├── Ok(NoChanges) ──────────► UpdateResponse::NoChanges,      │
//! │       │                             write skipped                   │
//! │       └── Ok(Apply(cs)) ──────────► apply_change_set + re-fetch     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! One mutating request per record at a time is the caller's contract; the
//! store is the arbiter of anything concurrent (last-write-wins).

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ApiError, ErrorCode};
use caixa_core::{
    classify_delete_failure, propose_update, validation, CashRegister, CashTransaction, CoreError,
    DeleteRejection, LifecyclePolicy, RegisterPatch, RegisterStatus, TransactionKind,
    UpdateOutcome,
};
use caixa_db::{Database, DbError, NewRegister, NewTransaction, Page, RegisterFilter, RegisterOrder};

// =============================================================================
// Context & Requests
// =============================================================================

/// Who is acting. Passed explicitly into each mutating operation instead of
/// the legacy ambient session lookup.
#[derive(Debug, Clone)]
pub struct OperatorContext {
    pub operator_id: String,
}

/// Request to open a new register.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenRegisterRequest {
    pub opening_balance_cents: i64,
    pub opening_notes: Option<String>,
}

/// Request to record a cash movement.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordTransactionRequest {
    pub kind: TransactionKind,
    pub amount_cents: i64,
    pub description: Option<String>,
}

/// Listing parameters from the admin table (filters, search, pagination).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRegistersRequest {
    pub status: Option<RegisterStatus>,
    pub operator_id: Option<String>,
    pub search: Option<String>,
    pub page_size: Option<i64>,
    #[serde(default)]
    pub offset: i64,
    #[serde(default)]
    pub oldest_first: bool,
}

// =============================================================================
// DTOs
// =============================================================================

/// Register row as the front-end sees it. `final_balance_cents` is always
/// recomputed here from the derived totals, never taken from input.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDto {
    pub id: String,
    pub operator_id: String,
    pub opening_balance_cents: i64,
    pub opened_at: String,
    pub closed_at: Option<String>,
    pub status: RegisterStatus,
    pub opening_notes: Option<String>,
    pub closing_notes: Option<String>,
    pub total_inflow_cents: i64,
    pub total_outflow_cents: i64,
    pub final_balance_cents: i64,
}

impl From<CashRegister> for RegisterDto {
    fn from(r: CashRegister) -> Self {
        RegisterDto {
            final_balance_cents: r.final_balance().cents(),
            id: r.id,
            operator_id: r.operator_id,
            opening_balance_cents: r.opening_balance_cents,
            opened_at: r.opened_at.to_rfc3339(),
            closed_at: r.closed_at.map(|t| t.to_rfc3339()),
            status: r.status,
            opening_notes: r.opening_notes,
            closing_notes: r.closing_notes,
            total_inflow_cents: r.total_inflow_cents,
            total_outflow_cents: r.total_outflow_cents,
        }
    }
}

/// One page of the registers table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPage {
    pub registers: Vec<RegisterDto>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Result of an edit submission.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum UpdateResponse {
    /// Nothing to write; the UI tells the user and leaves the form as-is.
    NoChanges,
    /// The accepted fields were persisted.
    Updated { register: RegisterDto },
}

/// Balance breakdown for the reconciliation panel.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceDto {
    pub register_id: String,
    pub opening_balance_cents: i64,
    pub total_inflow_cents: i64,
    pub total_outflow_cents: i64,
    pub final_balance_cents: i64,
    pub transaction_count: i64,
}

/// Cash movement as the front-end sees it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDto {
    pub id: String,
    pub register_id: String,
    pub kind: TransactionKind,
    pub amount_cents: i64,
    pub description: Option<String>,
    pub created_at: String,
}

impl From<CashTransaction> for TransactionDto {
    fn from(t: CashTransaction) -> Self {
        TransactionDto {
            id: t.id,
            register_id: t.register_id,
            kind: t.kind,
            amount_cents: t.amount_cents,
            description: t.description,
            created_at: t.created_at.to_rfc3339(),
        }
    }
}

// =============================================================================
// Service
// =============================================================================

/// The register operations exposed to the presentation layer.
#[derive(Debug, Clone)]
pub struct RegisterService {
    db: Database,
    policy: LifecyclePolicy,
}

impl RegisterService {
    /// Creates a service with the default (legacy-compatible) policy.
    pub fn new(db: Database) -> Self {
        RegisterService {
            db,
            policy: LifecyclePolicy::default(),
        }
    }

    /// Creates a service with an explicit lifecycle policy.
    pub fn with_policy(db: Database, policy: LifecyclePolicy) -> Self {
        RegisterService { db, policy }
    }

    /// Opens a new register for the acting operator.
    pub async fn open_register(
        &self,
        ctx: &OperatorContext,
        req: OpenRegisterRequest,
    ) -> Result<RegisterDto, ApiError> {
        validation::validate_operator_id(&ctx.operator_id)?;
        validation::validate_opening_balance_cents(req.opening_balance_cents)?;
        let opening_notes = match &req.opening_notes {
            Some(notes) => validation::validate_notes("opening_notes", notes)?,
            None => None,
        };

        let register = self
            .db
            .registers()
            .create(NewRegister {
                operator_id: ctx.operator_id.clone(),
                opening_balance_cents: req.opening_balance_cents,
                opening_notes,
            })
            .await?;

        info!(id = %register.id, operator_id = %ctx.operator_id, "Register opened");
        Ok(register.into())
    }

    /// Fetches a single register with derived totals.
    pub async fn get_register(&self, id: &str) -> Result<RegisterDto, ApiError> {
        let register = self.fetch(id).await?;
        Ok(register.into())
    }

    /// Lists registers for the admin table.
    pub async fn list_registers(&self, req: ListRegistersRequest) -> Result<RegisterPage, ApiError> {
        let limit = validation::validate_page_size(req.page_size)?;
        let search = match &req.search {
            Some(q) => {
                let q = validation::validate_search_query(q)?;
                if q.is_empty() {
                    None
                } else {
                    Some(q)
                }
            }
            None => None,
        };

        let filter = RegisterFilter {
            status: req.status,
            operator_id: req.operator_id,
            search,
            ..Default::default()
        };
        let order = if req.oldest_first {
            RegisterOrder::OpenedAtAsc
        } else {
            RegisterOrder::OpenedAtDesc
        };
        let page = Page {
            limit,
            offset: req.offset.max(0),
        };

        let registers = self.db.registers().list(&filter, order, &page).await?;
        let total = self.db.registers().count(&filter).await?;

        Ok(RegisterPage {
            registers: registers.into_iter().map(RegisterDto::from).collect(),
            total,
            limit: page.limit,
            offset: page.offset,
        })
    }

    /// Applies an edit-form submission through the propose/apply round.
    pub async fn update_register(
        &self,
        id: &str,
        patch: RegisterPatch,
    ) -> Result<UpdateResponse, ApiError> {
        // Same validation layer as the open path. A trimmed-empty notes
        // value means the field was not submitted.
        let patch = RegisterPatch {
            opening_notes: match &patch.opening_notes {
                Some(notes) => validation::validate_notes("opening_notes", notes)?,
                None => None,
            },
            closing_notes: match &patch.closing_notes {
                Some(notes) => validation::validate_notes("closing_notes", notes)?,
                None => None,
            },
            status: patch.status,
        };

        let current = self.fetch(id).await?;

        match propose_update(&current, &patch, &self.policy) {
            Err(e) => {
                // Warn-grade: nothing is written, the form stays open.
                warn!(id = %id, error = %e, "Rejected register update");
                Err(e.into())
            }
            Ok(UpdateOutcome::NoChanges) => {
                debug!(id = %id, "Update contained no changes; write skipped");
                Ok(UpdateResponse::NoChanges)
            }
            Ok(UpdateOutcome::Apply(changes)) => {
                self.db.registers().apply_change_set(id, &changes).await?;
                let updated = self.fetch(id).await?;
                info!(id = %id, ?changes, "Register updated");
                Ok(UpdateResponse::Updated {
                    register: updated.into(),
                })
            }
        }
    }

    /// Explicit close action: Open → Closed, stamping `closed_at`.
    pub async fn close_register(&self, id: &str) -> Result<RegisterDto, ApiError> {
        let current = self.fetch(id).await?;
        let transition = caixa_core::lifecycle::close_transition(&current, chrono::Utc::now())?;

        // The guarded UPDATE re-checks the state; a concurrent close loses
        // the race there rather than double-stamping.
        self.db
            .registers()
            .close(id, transition.closed_at.unwrap_or_else(chrono::Utc::now))
            .await?;

        info!(id = %id, "Register closed");
        Ok(self.fetch(id).await?.into())
    }

    /// Explicit reconcile action: Closed → Reconciled.
    pub async fn reconcile_register(&self, id: &str) -> Result<RegisterDto, ApiError> {
        let current = self.fetch(id).await?;
        caixa_core::lifecycle::reconcile_transition(&current)?;

        self.db.registers().reconcile(id).await?;

        info!(id = %id, "Register reconciled");
        Ok(self.fetch(id).await?.into())
    }

    /// Explicit correction action: Reconciled → Closed (the one backward
    /// edge), so the audit can be redone.
    pub async fn correct_reconciliation(&self, id: &str) -> Result<RegisterDto, ApiError> {
        let current = self.fetch(id).await?;
        caixa_core::lifecycle::correction_transition(&current)?;

        self.db.registers().reopen_for_correction(id).await?;

        info!(id = %id, "Reconciliation reopened for correction");
        Ok(self.fetch(id).await?.into())
    }

    /// Deletes a register. The store's referential-integrity rejection is
    /// classified for the user; anything else surfaces with its message.
    pub async fn delete_register(&self, id: &str) -> Result<(), ApiError> {
        validation::validate_register_id(id)?;

        match self.db.registers().delete(id).await {
            Ok(()) => {
                info!(id = %id, "Register deleted");
                Ok(())
            }
            Err(DbError::NotFound { entity, id }) => Err(ApiError::not_found(&entity, &id)),
            Err(err) => match classify_delete_failure(&err.to_string()) {
                DeleteRejection::HasDependentTransactions => {
                    warn!(id = %id, "Delete rejected: transactions exist");
                    Err(ApiError::new(
                        ErrorCode::HasDependentTransactions,
                        "Cannot delete register: transactions exist",
                    ))
                }
                DeleteRejection::StoreFailure(message) => {
                    tracing::error!(id = %id, %message, "Delete failed");
                    Err(ApiError::new(ErrorCode::DatabaseError, message))
                }
            },
        }
    }

    /// Records a cash movement against an open register.
    pub async fn record_transaction(
        &self,
        id: &str,
        req: RecordTransactionRequest,
    ) -> Result<TransactionDto, ApiError> {
        validation::validate_amount_cents(req.amount_cents)?;
        let description = match &req.description {
            Some(d) => validation::validate_notes("description", d)?,
            None => None,
        };

        let current = self.fetch(id).await?;
        if current.status != RegisterStatus::Open {
            return Err(CoreError::InvalidRegisterState {
                register_id: current.id,
                current_status: current.status,
            }
            .into());
        }

        let transaction = self
            .db
            .transactions()
            .insert(NewTransaction {
                register_id: id.to_string(),
                kind: req.kind,
                amount_cents: req.amount_cents,
                description,
            })
            .await?;

        Ok(transaction.into())
    }

    /// Balance breakdown with the final balance recomputed server-side.
    pub async fn register_balance(&self, id: &str) -> Result<BalanceDto, ApiError> {
        let register = self.fetch(id).await?;
        let transaction_count = self.db.transactions().count_for_register(id).await?;

        Ok(BalanceDto {
            register_id: register.id.clone(),
            opening_balance_cents: register.opening_balance_cents,
            total_inflow_cents: register.total_inflow_cents,
            total_outflow_cents: register.total_outflow_cents,
            final_balance_cents: register.final_balance().cents(),
            transaction_count,
        })
    }

    /// Movements for the register detail view.
    pub async fn list_transactions(&self, id: &str) -> Result<Vec<TransactionDto>, ApiError> {
        // 404 on the register beats an empty list for a bad id.
        self.fetch(id).await?;
        let rows = self.db.transactions().list_for_register(id).await?;
        Ok(rows.into_iter().map(TransactionDto::from).collect())
    }

    async fn fetch(&self, id: &str) -> Result<CashRegister, ApiError> {
        validation::validate_register_id(id)?;
        self.db
            .registers()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Cash register", id))
    }
}
