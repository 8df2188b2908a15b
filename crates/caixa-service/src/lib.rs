//! # caixa-service: Orchestration Layer for the Caixa Backend
//!
//! The functions the presentation layer calls, and the error surface it
//! sees. One mutating round trip per user action: load the table, open the
//! edit modal, submit the edit, confirm the delete.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Browser admin UI                                                   │
//! │       │ JSON                                                        │
//! │       ▼                                                             │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │               caixa-service (THIS CRATE)                      │ │
//! │  │                                                               │ │
//! │  │  RegisterService          ApiError / ErrorCode                │ │
//! │  │  ├── open_register        ├── NOT_FOUND                       │ │
//! │  │  ├── update_register      ├── VALIDATION_ERROR                │ │
//! │  │  ├── close / reconcile    ├── INVALID_TRANSITION (warn)       │ │
//! │  │  ├── delete_register      ├── HAS_DEPENDENT_TRANSACTIONS      │ │
//! │  │  └── list / balance       └── DATABASE_ERROR                  │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! │       │ caixa-core rules            │ caixa-db store               │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every store failure is converted to an [`error::ApiError`] at the call
//! site; nothing propagates unhandled and nothing here is fatal.

pub mod error;
pub mod register;

pub use error::{ApiError, ErrorCode};
pub use register::{
    BalanceDto, ListRegistersRequest, OpenRegisterRequest, OperatorContext,
    RecordTransactionRequest, RegisterDto, RegisterPage, RegisterService, TransactionDto,
    UpdateResponse,
};

// =============================================================================
// Service-Level Tests
// =============================================================================
// End-to-end against an in-memory SQLite store: the same wiring the
// application uses, minus the HTTP surface.
