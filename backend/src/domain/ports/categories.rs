//! Driving port for category reference data.

use async_trait::async_trait;

use crate::domain::{Category, CategoryFilter, CategoryId, Error};

/// Category reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryQueries: Send + Sync {
    /// Active categories matching `filter`, by display order.
    async fn list(&self, filter: CategoryFilter) -> Result<Vec<Category>, Error>;

    async fn get(&self, id: CategoryId) -> Result<Category, Error>;
}
