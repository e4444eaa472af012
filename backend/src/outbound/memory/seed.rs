//! Reference categories shared with the initial migration.

use crate::domain::{Category, CategoryId};

const DEFAULTS: [(&str, bool); 10] = [
    ("Electronics", false),
    ("Textbooks & Notes", false),
    ("Furniture & Decor", false),
    ("Clothing & Accessories", false),
    ("Miscellaneous Items", false),
    ("Tutoring Services", true),
    ("Creative Services", true),
    ("Technical Services", true),
    ("Personal Assistance", true),
    ("Workshops & Lessons", true),
];

/// The ten top-level categories every deployment starts with.
pub fn default_categories() -> Vec<Category> {
    (1..)
        .zip(DEFAULTS)
        .map(|(position, (name, is_skill_category))| Category {
            id: CategoryId::new(position),
            name: name.to_owned(),
            parent_id: None,
            display_order: position,
            is_active: true,
            is_skill_category,
        })
        .collect()
}
