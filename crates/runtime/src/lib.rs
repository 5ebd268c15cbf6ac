//! Runtime orchestration for archery scoring sessions.
//!
//! This crate wires the pure ledger and scoring logic of `archery-core` to
//! persistent storage and a single-writer worker. Consumers start a
//! [`ScoringRuntime`] and interact with sessions through [`ScoringHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator
//! - [`api`] exposes the types downstream clients interact with
//! - [`ledger`] applies ledger deltas to a store atomically
//! - [`oracle`] and [`repository`] provide data adapters reused by other crates
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod ledger;
pub mod oracle;
pub mod repository;
pub mod runtime;

mod workers;

pub use api::{Result, RuntimeError, ScoringHandle};
pub use ledger::SessionLedger;
pub use oracle::OracleBundle;
pub use repository::{
    ArrowRepository, FileScoringStore, InMemoryScoringStore, NewSession, RepositoryError,
    ScoringStore, Session, SessionRepository,
};
pub use runtime::{RuntimeConfig, ScoringRuntime};
