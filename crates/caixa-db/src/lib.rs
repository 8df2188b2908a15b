//! # caixa-db: Database Layer for the Caixa Backend
//!
//! SQLite persistence for cash registers and their transactions, via sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  caixa-service (orchestration)                                      │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │                   caixa-db (THIS CRATE)                       │ │
//! │  │                                                               │ │
//! │  │  ┌─────────────┐  ┌────────────────┐  ┌──────────────┐      │ │
//! │  │  │  Database   │  │  Repositories  │  │  Migrations  │      │ │
//! │  │  │  (pool.rs)  │◄─│  register.rs   │  │  (embedded)  │      │ │
//! │  │  │ SqlitePool  │  │ transaction.rs │  │ 001_init.sql │      │ │
//! │  │  └─────────────┘  └────────────────┘  └──────────────┘      │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  SQLite database (WAL, foreign keys ON)                            │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use caixa_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/caixa.db")).await?;
//! let open = db.registers().list(&filter, order, &page).await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::DbError;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::register::{
    NewRegister, Page, RegisterFilter, RegisterOrder, RegisterRepository, RegisterTotals,
};
pub use repository::transaction::{NewTransaction, TransactionRepository};
