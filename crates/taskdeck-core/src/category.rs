//! Category records and the draft the category editor works on.

use serde::{Deserialize, Serialize};

use crate::identifiers::CategoryId;
use crate::validation::TextRules;

/// A named label tasks can carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub category_id: CategoryId,
    pub category_name: String,
}

impl Category {
    pub fn new(category_id: CategoryId, category_name: impl Into<String>) -> Self {
        Self {
            category_id,
            category_name: category_name.into(),
        }
    }

    /// Whether `name` collides with this category's name, ignoring case and
    /// surrounding whitespace.
    pub fn name_matches(&self, name: &str) -> bool {
        TextRules::fold(&self.category_name) == TextRules::fold(name)
    }
}

/// Category being created (`category_id` is `None`) or edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryDraft {
    pub category_id: Option<CategoryId>,
    pub name: String,
}

impl CategoryDraft {
    pub fn create(name: impl Into<String>) -> Self {
        Self {
            category_id: None,
            name: name.into(),
        }
    }

    pub fn rename(category_id: CategoryId, name: impl Into<String>) -> Self {
        Self {
            category_id: Some(category_id),
            name: name.into(),
        }
    }

    pub fn is_new(&self) -> bool {
        self.category_id.is_none()
    }
}

impl From<&Category> for CategoryDraft {
    fn from(category: &Category) -> Self {
        Self::rename(category.category_id.clone(), category.category_name.clone())
    }
}
