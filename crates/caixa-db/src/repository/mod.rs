//! # Repository Module
//!
//! Repository implementations for the caixa store.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  caixa-service                                                      │
//! │       │  db.registers().list(&filter, order, &page)                 │
//! │       ▼                                                             │
//! │  RegisterRepository                                                 │
//! │  ├── create / get_by_id / list / count                              │
//! │  ├── apply_change_set (writes what the lifecycle accepted)          │
//! │  ├── close / reconcile / reopen_for_correction (guarded UPDATEs)    │
//! │  └── delete / totals                                                │
//! │       │  SQL                                                        │
//! │       ▼                                                             │
//! │  SQLite                                                             │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! SQL stays isolated here; business rules stay in caixa-core.
//!
//! ## Available Repositories
//!
//! - [`register::RegisterRepository`] - Register CRUD, transitions, listing
//! - [`transaction::TransactionRepository`] - Append-only cash movements

pub mod register;
pub mod transaction;
