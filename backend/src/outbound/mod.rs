//! Outbound adapters implementing the domain's driven ports.
//!
//! - **persistence**: PostgreSQL via Diesel, one transaction per unit of work
//! - **memory**: in-process store with the same unit-of-work semantics, for
//!   tests and database-less development
//! - **storage**: listing image files under a capability-scoped directory
//! - **security**: password digests
//!
//! Adapters translate between domain types and infrastructure; they hold no
//! business rules.

pub mod memory;
pub mod persistence;
pub mod security;
pub mod storage;
