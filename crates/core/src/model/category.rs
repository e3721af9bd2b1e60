use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Categories every installation starts with. These cannot be removed.
pub const DEFAULT_CATEGORIES: [&str; 11] = [
    "Strategic Planning",
    "Resource Management",
    "Risk Management",
    "Stakeholder Management",
    "Portfolio Optimization",
    "Governance",
    "Change Management",
    "PMO Maturity",
    "Crisis Management",
    "Organizational Development",
    "People Management",
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CategoryError {
    #[error("category name cannot be empty")]
    EmptyName,

    #[error("category `{0}` already exists")]
    AlreadyExists(String),

    #[error("default category `{0}` cannot be removed")]
    Protected(String),

    #[error("category `{0}` not found")]
    NotFound(String),
}

/// Validated category label (trimmed, non-empty).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a validated category name.
    ///
    /// # Errors
    ///
    /// Returns `CategoryError::EmptyName` if the name is empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, CategoryError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CategoryError::EmptyName);
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_default(&self) -> bool {
        DEFAULT_CATEGORIES.contains(&self.0.as_str())
    }

    fn matches_ignore_case(&self, other: &str) -> bool {
        self.0.to_lowercase() == other.trim().to_lowercase()
    }
}

impl std::fmt::Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for CategoryName {
    type Error = CategoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CategoryName> for String {
    fn from(value: CategoryName) -> Self {
        value.0
    }
}

/// Ordered set of active categories.
///
/// Names are unique ignoring case. Default categories are protected from removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategorySet(Vec<CategoryName>);

impl CategorySet {
    #[must_use]
    pub fn with_defaults() -> Self {
        Self(
            DEFAULT_CATEGORIES
                .iter()
                .map(|name| CategoryName((*name).to_owned()))
                .collect(),
        )
    }

    /// Add a category and return its normalized name.
    ///
    /// # Errors
    ///
    /// Returns `CategoryError::EmptyName` for blank input and
    /// `CategoryError::AlreadyExists` when a case-insensitive match exists.
    pub fn add(&mut self, name: &str) -> Result<CategoryName, CategoryError> {
        let name = CategoryName::new(name)?;
        if self.0.iter().any(|c| c.matches_ignore_case(name.as_str())) {
            return Err(CategoryError::AlreadyExists(name.0));
        }
        self.0.push(name.clone());
        Ok(name)
    }

    /// Remove a user-added category by exact name.
    ///
    /// # Errors
    ///
    /// Returns `CategoryError::Protected` for default categories and
    /// `CategoryError::NotFound` if no such category exists.
    pub fn remove(&mut self, name: &str) -> Result<CategoryName, CategoryError> {
        if DEFAULT_CATEGORIES.contains(&name) {
            return Err(CategoryError::Protected(name.to_owned()));
        }
        let index = self
            .0
            .iter()
            .position(|c| c.as_str() == name)
            .ok_or_else(|| CategoryError::NotFound(name.to_owned()))?;
        Ok(self.0.remove(index))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|c| c.as_str() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryName> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for CategorySet {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_trims_and_appends() {
        let mut set = CategorySet::with_defaults();
        let added = set.add("  Agile Delivery ").unwrap();
        assert_eq!(added.as_str(), "Agile Delivery");
        assert_eq!(set.iter().last(), Some(&added));
        assert_eq!(set.len(), DEFAULT_CATEGORIES.len() + 1);
    }

    #[test]
    fn add_rejects_case_insensitive_duplicate() {
        let mut set = CategorySet::with_defaults();
        let err = set.add("governance").unwrap_err();
        assert_eq!(err, CategoryError::AlreadyExists("governance".into()));
    }

    #[test]
    fn add_rejects_blank() {
        let mut set = CategorySet::with_defaults();
        assert_eq!(set.add("   ").unwrap_err(), CategoryError::EmptyName);
    }

    #[test]
    fn remove_protects_defaults() {
        let mut set = CategorySet::with_defaults();
        let err = set.remove("Governance").unwrap_err();
        assert_eq!(err, CategoryError::Protected("Governance".into()));
        assert!(set.contains("Governance"));
    }

    #[test]
    fn remove_custom_category() {
        let mut set = CategorySet::with_defaults();
        set.add("Agile Delivery").unwrap();
        set.remove("Agile Delivery").unwrap();
        assert!(!set.contains("Agile Delivery"));
        assert_eq!(
            set.remove("Agile Delivery").unwrap_err(),
            CategoryError::NotFound("Agile Delivery".into())
        );
    }

    #[test]
    fn category_name_rejects_blank_on_deserialize() {
        let err = serde_json::from_str::<CategoryName>("\"  \"");
        assert!(err.is_err());
    }
}
