//! Core Kernel - Foundational types and utilities for the order lifecycle system
//!
//! This crate provides the fundamental building blocks used across all crates:
//! - Strongly-typed identifiers
//! - A clock abstraction so time-dependent rules can be tested deterministically
//! - Port infrastructure shared by every adapter (errors, health checks)

pub mod clock;
pub mod error;
pub mod identifiers;
pub mod ports;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::CoreError;
pub use identifiers::OrderId;
pub use ports::{AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, PortError};
