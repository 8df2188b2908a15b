//! # caixa-core: Pure Business Logic for the Caixa Backend
//!
//! This crate is the heart of the cash-register subsystem. It contains the
//! lifecycle rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Caixa Data Flow                                │
//! │                                                                     │
//! │  Browser admin UI (tables + modal forms)                           │
//! │       │ JSON over the application API                              │
//! │       ▼                                                             │
//! │  caixa-service (orchestration, error surface)                      │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  ★ caixa-core (THIS CRATE) ★                                       │
//! │                                                                     │
//! │   ┌───────────┐ ┌───────────┐ ┌───────────┐ ┌───────────┐         │
//! │   │   types   │ │   money   │ │ lifecycle │ │ validation│         │
//! │   │ Register  │ │   Money   │ │  propose  │ │   rules   │         │
//! │   │  Status   │ │  balance  │ │  _update  │ │  checks   │         │
//! │   └───────────┘ └───────────┘ └───────────┘ └───────────┘         │
//! │                                                                     │
//! │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS               │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  caixa-db (SQLite store)                                           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (CashRegister, CashTransaction, status enums)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`lifecycle`] - The status state machine and change-set rules
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: same input, same output, always
//! 2. **No I/O**: persistence is a collaborator invoked by the caller
//! 3. **Integer money**: all monetary values are cents (i64)
//! 4. **Explicit errors**: typed enums, never strings or panics
//!
//! ## Example
//!
//! ```rust
//! use caixa_core::lifecycle::{propose_update, LifecyclePolicy, RegisterPatch, UpdateOutcome};
//! use caixa_core::types::CashRegister;
//! use chrono::Utc;
//!
//! let current = CashRegister::new_open(
//!     "b4a1c6fe-7c61-4d9a-9be2-3f6f3f1c9e01".into(),
//!     "7d6e2a10-52f5-4e57-a41f-0c9fca0d2b44".into(),
//!     10_000, // R$100.00 float (troco) to start the till
//!     None,
//!     Utc::now(),
//! );
//!
//! let patch = RegisterPatch {
//!     opening_notes: Some("morning shift".to_string()),
//!     ..Default::default()
//! };
//!
//! let outcome = propose_update(&current, &patch, &LifecyclePolicy::default()).unwrap();
//! assert!(matches!(outcome, UpdateOutcome::Apply(_)));
//! ```

pub mod error;
pub mod lifecycle;
pub mod money;
pub mod types;
pub mod validation;

// Re-exports for convenience: `use caixa_core::Money` instead of
// `use caixa_core::money::Money`.
pub use error::{CoreError, LifecycleError, ValidationError};
pub use lifecycle::{
    classify_delete_failure, propose_update, DeleteRejection, LifecyclePolicy, RegisterChangeSet,
    RegisterPatch, UpdateOutcome,
};
pub use money::Money;
pub use types::*;

/// Maximum length accepted for free-text notes fields.
///
/// Opening/closing notes come straight from a textarea in the admin UI;
/// the cap keeps runaway payloads out of the store.
pub const MAX_NOTES_LEN: usize = 1000;

/// Maximum page size the listing API will serve in one call.
pub const MAX_PAGE_SIZE: i64 = 200;

/// Default page size when the caller does not specify one.
pub const DEFAULT_PAGE_SIZE: i64 = 25;
