//! PostgreSQL persistence adapter using Diesel.
//!
//! - **Thin adapter**: translates between Diesel rows and domain types; the
//!   rules live in the domain services.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Async pooling**: `diesel-async` connections pooled through `bb8`.
//! - **Typed errors**: every failure becomes a
//!   [`PersistenceError`](crate::domain::ports::PersistenceError).
//!
//! # Example
//!
//! ```ignore
//! use marketplace::outbound::persistence::{DbPool, DieselGateway, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/market")).await?;
//! let gateway = DieselGateway::new(pool);
//! ```

mod diesel_gateway;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_gateway::DieselGateway;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, OwnedConnection, PoolConfig, PoolError};
