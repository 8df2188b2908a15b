//! # Register Lifecycle
//!
//! The status state machine and per-status field-mutation rules for a cash
//! register. This is the one place in the system that decides what an edit
//! is allowed to change.
//!
//! ## The Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                   Edit Submission Flow                              │
//! │                                                                     │
//! │  Admin UI modal form (notes, status dropdown)                      │
//! │       │ RegisterPatch (typed, already deserialized)                │
//! │       ▼                                                             │
//! │  service: fetch current row from store                             │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  propose_update(current, patch, policy)  ← THIS MODULE             │
//! │       │                                                             │
//! │       ├── Err(InvalidTransition) → warn user, write nothing        │
//! │       ├── Ok(NoChanges)          → inform user, skip the write     │
//! │       └── Ok(Apply(change_set))  → store.apply_change_set(...)     │
//! │                                                                     │
//! │  No I/O here: persistence is the caller's collaborator.            │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Field Rules (evaluated independently of the transition)
//! - `opening_notes`: accepted whenever it differs from current, in any
//!   status, unless [`LifecyclePolicy::freeze_notes_after_reconcile`] is
//!   set, in which case edits on a reconciled register are dropped.
//! - `closing_notes`: accepted only once the register is no longer `Open`
//!   and the value differs. While `Open` it is dropped silently, not
//!   rejected; the form always submits the field.
//! - `status`: considered only when the register is no longer `Open` and
//!   the proposed value differs; the edge must be permitted. Leaving
//!   `Open` happens exclusively through the explicit close action, so a
//!   proposed status on an open register is dropped, not rejected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::LifecycleError;
use crate::types::{CashRegister, RegisterStatus};

// =============================================================================
// Policy
// =============================================================================

/// Tunable lifecycle behavior.
///
/// The legacy system allowed editing opening notes on an already-reconciled
/// register. That is likely unintended (an audited record should be frozen),
/// so instead of hard-coding either behavior the rule is configurable.
/// The default mirrors the legacy behavior.
#[derive(Debug, Clone, Copy, Default)]
pub struct LifecyclePolicy {
    /// When set, opening-notes edits on a `Reconciled` register are dropped
    /// from the change set (same silent-drop convention as closing notes on
    /// an open register).
    pub freeze_notes_after_reconcile: bool,
}

// =============================================================================
// Patch and Change Set
// =============================================================================

/// A proposed edit, as submitted from the admin form.
///
/// `None` means "field not submitted"; `Some` carries the proposed value.
/// This is the strongly-typed replacement for the loose form payload the
/// legacy front-end passed around.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RegisterPatch {
    pub opening_notes: Option<String>,
    pub closing_notes: Option<String>,
    pub status: Option<RegisterStatus>,
}

/// The subset of proposed fields actually accepted for persistence.
///
/// Only what rule evaluation let through ends up here; the store writes
/// exactly these fields and nothing else.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterChangeSet {
    pub opening_notes: Option<String>,
    pub closing_notes: Option<String>,
    pub status: Option<RegisterStatus>,
}

impl RegisterChangeSet {
    /// True when rule evaluation accepted nothing.
    pub fn is_empty(&self) -> bool {
        self.opening_notes.is_none() && self.closing_notes.is_none() && self.status.is_none()
    }
}

/// Outcome of a successful rule evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Every proposed field matched current state (or was dropped by the
    /// rules). Informational, not an error: skip the write, tell the user.
    NoChanges,
    /// Persist exactly this change set.
    Apply(RegisterChangeSet),
}

// =============================================================================
// propose_update
// =============================================================================

/// Evaluates a proposed edit against the register's current state and
/// returns the fields to persist, a distinguished no-op, or a rejection.
///
/// Performs no I/O. See the module docs for the field rules.
///
/// ## Example
/// ```rust
/// use caixa_core::lifecycle::{propose_update, LifecyclePolicy, RegisterPatch, UpdateOutcome};
/// use caixa_core::types::{CashRegister, RegisterStatus};
/// use chrono::Utc;
///
/// let current = CashRegister::new_open("r1".into(), "op1".into(), 5000, None, Utc::now());
///
/// // Closing notes on an open register are dropped silently.
/// let patch = RegisterPatch {
///     closing_notes: Some("left early".into()),
///     ..Default::default()
/// };
/// let outcome = propose_update(&current, &patch, &LifecyclePolicy::default()).unwrap();
/// assert_eq!(outcome, UpdateOutcome::NoChanges);
/// ```
pub fn propose_update(
    current: &CashRegister,
    patch: &RegisterPatch,
    policy: &LifecyclePolicy,
) -> Result<UpdateOutcome, LifecycleError> {
    let mut changes = RegisterChangeSet::default();

    if let Some(notes) = &patch.opening_notes {
        let frozen = policy.freeze_notes_after_reconcile
            && current.status == RegisterStatus::Reconciled;
        if !frozen && differs(&current.opening_notes, notes) {
            changes.opening_notes = Some(notes.clone());
        }
    }

    if let Some(notes) = &patch.closing_notes {
        // Dropped while Open; the register has no closing to annotate yet.
        if current.status != RegisterStatus::Open && differs(&current.closing_notes, notes) {
            changes.closing_notes = Some(notes.clone());
        }
    }

    if let Some(proposed) = patch.status {
        // While Open the only way forward is the explicit close action;
        // a status submitted through the edit form is ignored.
        if current.status != RegisterStatus::Open && proposed != current.status {
            if !current.status.can_transition_to(proposed) {
                return Err(LifecycleError::InvalidTransition {
                    from: current.status,
                    to: proposed,
                });
            }
            changes.status = Some(proposed);
        }
    }

    if changes.is_empty() {
        Ok(UpdateOutcome::NoChanges)
    } else {
        Ok(UpdateOutcome::Apply(changes))
    }
}

/// A proposed notes value counts as a change when it differs from what is
/// stored, treating "no notes" and the empty value as distinct (mirrors
/// the form, which submits whatever is in the textarea).
fn differs(current: &Option<String>, proposed: &str) -> bool {
    current.as_deref() != Some(proposed)
}

// =============================================================================
// Explicit Transitions
// =============================================================================

/// The change produced by one of the explicit trigger actions
/// (close / reconcile / correction).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterTransition {
    pub to: RegisterStatus,
    /// Set on the first close only; later hops keep the original value.
    pub closed_at: Option<DateTime<Utc>>,
}

/// Open → Closed. Stamps `closed_at` exactly once.
pub fn close_transition(
    current: &CashRegister,
    now: DateTime<Utc>,
) -> Result<RegisterTransition, LifecycleError> {
    require_exact(current.status, RegisterStatus::Open, RegisterStatus::Closed)?;
    Ok(RegisterTransition {
        to: RegisterStatus::Closed,
        closed_at: current.closed_at.or(Some(now)),
    })
}

/// Closed → Reconciled.
pub fn reconcile_transition(current: &CashRegister) -> Result<RegisterTransition, LifecycleError> {
    require_exact(
        current.status,
        RegisterStatus::Closed,
        RegisterStatus::Reconciled,
    )?;
    Ok(RegisterTransition {
        to: RegisterStatus::Reconciled,
        closed_at: current.closed_at,
    })
}

/// Reconciled → Closed, the single backward edge. Lets an auditor undo a
/// premature reconciliation and reconcile again after fixing the totals.
pub fn correction_transition(current: &CashRegister) -> Result<RegisterTransition, LifecycleError> {
    require_exact(
        current.status,
        RegisterStatus::Reconciled,
        RegisterStatus::Closed,
    )?;
    Ok(RegisterTransition {
        to: RegisterStatus::Closed,
        closed_at: current.closed_at,
    })
}

/// The explicit actions each map to exactly one edge of the table, so the
/// guard is stricter than `can_transition_to`: close on an already-closed
/// register is a rejection, not a no-op.
fn require_exact(
    from: RegisterStatus,
    expected_from: RegisterStatus,
    to: RegisterStatus,
) -> Result<(), LifecycleError> {
    if from != expected_from {
        return Err(LifecycleError::InvalidTransition { from, to });
    }
    Ok(())
}

// =============================================================================
// Deletion Classification
// =============================================================================

/// Why a deletion request came back rejected from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteRejection {
    /// Transactions still reference the register. User-facing: the register
    /// cannot be deleted while movements exist.
    HasDependentTransactions,
    /// Any other store failure, surfaced with the underlying message.
    StoreFailure(String),
}

/// Markers that identify a referential-integrity rejection tied to the
/// transactions table. SQLite reports a bare `FOREIGN KEY constraint
/// failed`; stores with richer messages name the table.
const FK_MARKERS: &[&str] = &["FOREIGN KEY constraint failed", "cash_transactions"];

/// Classifies a store-level deletion failure by its message.
///
/// ## Example
/// ```rust
/// use caixa_core::lifecycle::{classify_delete_failure, DeleteRejection};
///
/// let r = classify_delete_failure("FOREIGN KEY constraint failed");
/// assert_eq!(r, DeleteRejection::HasDependentTransactions);
///
/// let r = classify_delete_failure("disk I/O error");
/// assert!(matches!(r, DeleteRejection::StoreFailure(_)));
/// ```
pub fn classify_delete_failure(message: &str) -> DeleteRejection {
    if FK_MARKERS.iter().any(|marker| message.contains(marker)) {
        DeleteRejection::HasDependentTransactions
    } else {
        DeleteRejection::StoreFailure(message.to_string())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
