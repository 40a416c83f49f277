//! Repository implementations
//!
//! Thin SQL access for each table. Port adapters in [`crate::adapters`] map
//! these rows to domain types.

pub mod order;
pub mod payment_marker;

pub use order::{OrderDocumentRepository, OrderRow};
pub use payment_marker::PaymentMarkerRepository;
