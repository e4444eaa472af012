//! Category reference data queries.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{CategoryQueries, PersistenceGateway};
use crate::domain::{Category, CategoryFilter, CategoryId, Error};

/// Category service implementing [`CategoryQueries`].
#[derive(Clone)]
pub struct CategoryService<G> {
    gateway: Arc<G>,
}

impl<G> CategoryService<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl<G> CategoryQueries for CategoryService<G>
where
    G: PersistenceGateway,
{
    async fn list(&self, filter: CategoryFilter) -> Result<Vec<Category>, Error> {
        let mut uow = self.gateway.begin().await?;
        let categories = uow.categories().await?;
        uow.commit().await?;
        Ok(categories
            .into_iter()
            .filter(|category| filter.matches(category))
            .collect())
    }

    async fn get(&self, id: CategoryId) -> Result<Category, Error> {
        let mut uow = self.gateway.begin().await?;
        let category = uow.category(id).await?;
        uow.commit().await?;
        category.ok_or_else(|| Error::not_found(format!("category {id} not found")))
    }
}
