//! Test Utilities Crate
//!
//! Shared test infrastructure for the order lifecycle test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built test data and inbound messages
//! - `builders`: Builder for orders in any lifecycle status
//! - `harness`: Orchestrator, router and service wired to in-memory ports
//! - `database`: PostgreSQL test container management
//! - `assertions`: Custom assertion helpers for orders
//! - `generators`: Property-based test data generators

pub mod assertions;
pub mod builders;
pub mod database;
pub mod fixtures;
pub mod generators;
pub mod harness;

pub use assertions::*;
pub use builders::*;
pub use database::*;
pub use fixtures::*;
pub use generators::*;
pub use harness::*;
