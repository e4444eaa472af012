//! Listing categories.
//!
//! Categories are reference data seeded by migration and never written by
//! the application.

use serde::Serialize;

/// Category identifier (a small serial integer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CategoryId(i32);

impl CategoryId {
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A listing category, optionally nested under a parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub parent_id: Option<CategoryId>,
    pub display_order: i32,
    pub is_active: bool,
    pub is_skill_category: bool,
}

/// Filter for category listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryFilter {
    pub parent_id: Option<CategoryId>,
    pub is_skill_category: Option<bool>,
}

impl CategoryFilter {
    /// Whether `category` is active and satisfies every set criterion.
    pub fn matches(&self, category: &Category) -> bool {
        category.is_active
            && self
                .parent_id
                .is_none_or(|parent| category.parent_id == Some(parent))
            && self
                .is_skill_category
                .is_none_or(|skill| category.is_skill_category == skill)
    }
}
