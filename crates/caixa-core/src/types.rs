//! # Domain Types
//!
//! Core domain types for the cash-register subsystem.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌──────────────────┐      ┌──────────────────┐                    │
//! │  │   CashRegister   │      │ CashTransaction  │                    │
//! │  │  ──────────────  │      │  ──────────────  │                    │
//! │  │  id (UUID)       │◄─────│  register_id FK  │                    │
//! │  │  operator_id     │      │  kind            │                    │
//! │  │  status          │      │  amount_cents    │                    │
//! │  │  opening_balance │      │  description     │                    │
//! │  └──────────────────┘      └──────────────────┘                    │
//! │                                                                     │
//! │  ┌──────────────────┐      ┌──────────────────┐                    │
//! │  │  RegisterStatus  │      │ TransactionKind  │                    │
//! │  │  ──────────────  │      │  ──────────────  │                    │
//! │  │  Open            │      │  Inflow          │                    │
//! │  │  Closed          │      │  Outflow         │                    │
//! │  │  Reconciled      │      └──────────────────┘                    │
//! │  └──────────────────┘                                              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Transaction storage belongs to the store collaborator; the register
//! carries the *derived* inflow/outflow sums the store computed for it,
//! never independently mutable values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Register Status
// =============================================================================

/// The lifecycle status of a cash register.
///
/// ## State Machine
/// ```text
/// Open ──close──► Closed ──reconcile──► Reconciled
///                   ▲                       │
///                   └──────correction───────┘
/// ```
/// Forward-only past `Open`: a register never reopens. The single backward
/// edge (`Reconciled → Closed`) exists so an audit mistake can be corrected
/// and the register reconciled again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RegisterStatus {
    /// Register is open and accepting transactions.
    Open,
    /// Register was closed by the operator; totals are frozen.
    Closed,
    /// Closing totals were verified by an auditor.
    Reconciled,
}

impl RegisterStatus {
    /// Returns true if this status counts as closed for bookkeeping
    /// purposes (`closed_at` must be present).
    #[inline]
    pub const fn is_closed(&self) -> bool {
        matches!(self, RegisterStatus::Closed | RegisterStatus::Reconciled)
    }

    /// Checks whether `self → to` is a permitted edge of the state machine.
    ///
    /// ## Permitted Edges
    /// | From       | To         | Trigger           |
    /// |------------|------------|-------------------|
    /// | Open       | Closed     | close action      |
    /// | Closed     | Reconciled | reconcile action  |
    /// | Reconciled | Closed     | correction action |
    /// | X          | X          | no-op             |
    ///
    /// Everything else is rejected: `Open → Reconciled` must pass through
    /// `Closed`, and nothing ever returns to `Open`.
    pub const fn can_transition_to(&self, to: RegisterStatus) -> bool {
        use RegisterStatus::*;
        matches!(
            (*self, to),
            (Open, Closed) | (Closed, Reconciled) | (Reconciled, Closed)
        ) || (*self as u8) == (to as u8)
    }
}

impl Default for RegisterStatus {
    fn default() -> Self {
        RegisterStatus::Open
    }
}

impl fmt::Display for RegisterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RegisterStatus::Open => "open",
            RegisterStatus::Closed => "closed",
            RegisterStatus::Reconciled => "reconciled",
        };
        f.write_str(s)
    }
}

// =============================================================================
// Cash Register
// =============================================================================

/// A session-scoped till record: opened with a float, accumulates
/// transactions, closed and reconciled at end of shift.
///
/// ## Derived Totals
/// `total_inflow_cents` / `total_outflow_cents` are filled in by the store
/// from `SUM` over the register's transactions at read time. They are never
/// written through any update path, and the final balance is always
/// recomputed from them (never accepted from a client).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CashRegister {
    /// Unique identifier (UUID v4). Immutable.
    pub id: String,

    /// The operator who opened the register. Immutable after opening.
    pub operator_id: String,

    /// Opening float in cents. Non-negative, fixed at creation.
    pub opening_balance_cents: i64,

    /// When the register was opened. Immutable.
    #[ts(as = "String")]
    pub opened_at: DateTime<Utc>,

    /// When the register was first closed. Absent while `Open`; set exactly
    /// once and kept through any later reconcile/correction hops.
    #[ts(as = "Option<String>")]
    pub closed_at: Option<DateTime<Utc>>,

    /// Lifecycle status.
    pub status: RegisterStatus,

    /// Free-text notes from opening (shift, observations).
    pub opening_notes: Option<String>,

    /// Free-text notes from closing. Empty while `Open`.
    pub closing_notes: Option<String>,

    /// Derived sum of inflow transactions, in cents.
    pub total_inflow_cents: i64,

    /// Derived sum of outflow transactions, in cents.
    pub total_outflow_cents: i64,

    /// Record bookkeeping timestamps.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl CashRegister {
    /// Builds a freshly-opened register. Id generation belongs to the
    /// caller (the store layer mints UUIDs, tests pass fixed ids).
    pub fn new_open(
        id: String,
        operator_id: String,
        opening_balance_cents: i64,
        opening_notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        CashRegister {
            id,
            operator_id,
            opening_balance_cents,
            opened_at: now,
            closed_at: None,
            status: RegisterStatus::Open,
            opening_notes,
            closing_notes: None,
            total_inflow_cents: 0,
            total_outflow_cents: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Opening float as Money.
    #[inline]
    pub fn opening_balance(&self) -> Money {
        Money::from_cents(self.opening_balance_cents)
    }

    /// Derived inflow total as Money.
    #[inline]
    pub fn total_inflows(&self) -> Money {
        Money::from_cents(self.total_inflow_cents)
    }

    /// Derived outflow total as Money.
    #[inline]
    pub fn total_outflows(&self) -> Money {
        Money::from_cents(self.total_outflow_cents)
    }

    /// The computed final balance:
    /// `opening_balance + total_inflows − total_outflows`.
    ///
    /// Always recomputed from its inputs. There is intentionally no stored
    /// column and no setter for this value.
    #[inline]
    pub fn final_balance(&self) -> Money {
        self.opening_balance() + self.total_inflows() - self.total_outflows()
    }

    /// Invariant check: `closed_at` present iff status is Closed/Reconciled,
    /// and closing notes empty while Open. Used by store-layer tests.
    pub fn invariants_hold(&self) -> bool {
        let closed_at_ok = self.closed_at.is_some() == self.status.is_closed();
        let closing_notes_ok =
            self.status != RegisterStatus::Open || self.closing_notes.is_none();
        closed_at_ok && closing_notes_ok
    }
}

// =============================================================================
// Cash Transaction
// =============================================================================

/// Direction of a cash movement through the till.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Money into the till (sale, membership payment received in cash).
    Inflow,
    /// Money out of the till (refund, supplier payment, withdrawal).
    Outflow,
}

/// A single cash movement recorded against an open register.
///
/// Transactions are append-only: a register cannot be deleted while any
/// transaction still references it (enforced by the store's foreign key).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CashTransaction {
    pub id: String,
    pub register_id: String,
    pub kind: TransactionKind,
    /// Always positive; direction is carried by `kind`.
    pub amount_cents: i64,
    pub description: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl CashTransaction {
    /// Amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    /// Signed contribution of this transaction to the final balance.
    pub fn signed_amount(&self) -> Money {
        match self.kind {
            TransactionKind::Inflow => self.amount(),
            TransactionKind::Outflow => Money::zero() - self.amount(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn open_register() -> CashRegister {
        CashRegister::new_open(
            "r1".into(),
            "op1".into(),
            10_000,
            Some("morning".into()),
            Utc::now(),
        )
    }

    #[test]
    fn test_status_default_is_open() {
        assert_eq!(RegisterStatus::default(), RegisterStatus::Open);
    }

    #[test]
    fn test_permitted_edges() {
        use RegisterStatus::*;
        assert!(Open.can_transition_to(Closed));
        assert!(Closed.can_transition_to(Reconciled));
        assert!(Reconciled.can_transition_to(Closed));

        // no-op edges
        assert!(Open.can_transition_to(Open));
        assert!(Closed.can_transition_to(Closed));
        assert!(Reconciled.can_transition_to(Reconciled));
    }

    #[test]
    fn test_rejected_edges() {
        use RegisterStatus::*;
        // must pass through Closed
        assert!(!Open.can_transition_to(Reconciled));
        // forward-only past Open
        assert!(!Closed.can_transition_to(Open));
        assert!(!Reconciled.can_transition_to(Open));
    }

    #[test]
    fn test_final_balance_recomputed() {
        let mut reg = open_register();
        reg.total_inflow_cents = 2550;
        reg.total_outflow_cents = 500;
        assert_eq!(reg.final_balance().cents(), 10_000 + 2550 - 500);
    }

    #[test]
    fn test_final_balance_zero_inputs() {
        let mut reg = open_register();
        reg.opening_balance_cents = 0;
        assert_eq!(reg.final_balance(), Money::zero());
    }

    #[test]
    fn test_new_open_invariants() {
        let reg = open_register();
        assert_eq!(reg.status, RegisterStatus::Open);
        assert!(reg.closed_at.is_none());
        assert!(reg.closing_notes.is_none());
        assert!(reg.invariants_hold());
    }

    #[test]
    fn test_signed_amount() {
        let now = Utc::now();
        let inflow = CashTransaction {
            id: "t1".into(),
            register_id: "r1".into(),
            kind: TransactionKind::Inflow,
            amount_cents: 500,
            description: None,
            created_at: now,
        };
        let outflow = CashTransaction {
            kind: TransactionKind::Outflow,
            ..inflow.clone()
        };
        assert_eq!(inflow.signed_amount().cents(), 500);
        assert_eq!(outflow.signed_amount().cents(), -500);
    }
}
