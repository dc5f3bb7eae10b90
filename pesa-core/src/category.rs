//! Spending categories and the user-defined rules that assign them

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct CategoryId(pub u32);

impl CategoryId {
    /// The default "Other" category. Always present, never deletable.
    pub const OTHER: CategoryId = CategoryId(1);

    pub fn is_default(&self) -> bool {
        *self == Self::OTHER
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// Display color tag, e.g. "#9e9e9e"
    pub color: String,
}

/// Ordered matching rule. A `None` pattern never matches, like a SQL NULL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryRule {
    pub counterparty_pattern: Option<String>,
    pub description_pattern: Option<String>,
    pub category_id: CategoryId,
}

impl CategoryRule {
    pub fn counterparty(pattern: impl Into<String>, category_id: CategoryId) -> Self {
        Self {
            counterparty_pattern: Some(pattern.into()),
            description_pattern: None,
            category_id,
        }
    }

    pub fn description(pattern: impl Into<String>, category_id: CategoryId) -> Self {
        Self {
            counterparty_pattern: None,
            description_pattern: Some(pattern.into()),
            category_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CategoryError {
    #[error("the default category cannot be deleted")]
    DefaultCategory,
    #[error("unknown category: {0}")]
    UnknownCategory(CategoryId),
    #[error("category name must not be empty")]
    EmptyName,
}

/// The set of known categories, always containing "Other".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryBook {
    categories: Vec<Category>,
}

impl Default for CategoryBook {
    fn default() -> Self {
        Self {
            categories: vec![Category {
                id: CategoryId::OTHER,
                name: "Other".to_string(),
                color: "#9e9e9e".to_string(),
            }],
        }
    }
}

impl CategoryBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> &[Category] {
        &self.categories
    }

    pub fn get(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn contains(&self, id: CategoryId) -> bool {
        self.get(id).is_some()
    }

    pub fn add(
        &mut self,
        name: impl Into<String>,
        color: impl Into<String>,
    ) -> Result<CategoryId, CategoryError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CategoryError::EmptyName);
        }
        let next = self
            .categories
            .iter()
            .map(|c| c.id.0)
            .max()
            .unwrap_or(CategoryId::OTHER.0)
            + 1;
        let id = CategoryId(next);
        self.categories.push(Category {
            id,
            name: name.trim().to_string(),
            color: color.into(),
        });
        Ok(id)
    }

    pub fn rename(&mut self, id: CategoryId, name: impl Into<String>) -> Result<(), CategoryError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CategoryError::EmptyName);
        }
        let cat = self
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(CategoryError::UnknownCategory(id))?;
        cat.name = name.trim().to_string();
        Ok(())
    }

    /// Remove a category. Callers must retarget member transactions to
    /// `CategoryId::OTHER` before committing the removal.
    pub fn delete(&mut self, id: CategoryId) -> Result<Category, CategoryError> {
        if id.is_default() {
            return Err(CategoryError::DefaultCategory);
        }
        let idx = self
            .categories
            .iter()
            .position(|c| c.id == id)
            .ok_or(CategoryError::UnknownCategory(id))?;
        Ok(self.categories.remove(idx))
    }

    /// Restore "Other" if a deserialized book lost it.
    pub fn ensure_default(&mut self) {
        if !self.contains(CategoryId::OTHER) {
            self.categories.insert(0, CategoryBook::default().categories.remove(0));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_starts_with_other() {
        let book = CategoryBook::new();
        assert_eq!(book.all().len(), 1);
        assert_eq!(book.get(CategoryId::OTHER).unwrap().name, "Other");
    }

    #[test]
    fn test_add_assigns_increasing_ids() {
        let mut book = CategoryBook::new();
        let utilities = book.add("Utilities", "#ff9800").unwrap();
        let food = book.add("Food", "#4caf50").unwrap();
        assert_eq!(utilities, CategoryId(2));
        assert_eq!(food, CategoryId(3));
        assert_eq!(book.add("  ", "#000"), Err(CategoryError::EmptyName));
    }

    #[test]
    fn test_other_cannot_be_deleted() {
        let mut book = CategoryBook::new();
        assert_eq!(book.delete(CategoryId::OTHER), Err(CategoryError::DefaultCategory));
        assert!(book.contains(CategoryId::OTHER));
    }

    #[test]
    fn test_delete_and_unknown() {
        let mut book = CategoryBook::new();
        let id = book.add("Rent", "#3f51b5").unwrap();
        assert_eq!(book.delete(id).unwrap().name, "Rent");
        assert_eq!(book.delete(id), Err(CategoryError::UnknownCategory(id)));
    }

    #[test]
    fn test_ensure_default_restores_other() {
        let mut book: CategoryBook = serde_json::from_str(r#"{"categories":[]}"#).unwrap();
        book.ensure_default();
        assert!(book.contains(CategoryId::OTHER));
    }
}
