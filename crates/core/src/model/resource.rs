use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::model::ids::ResourceId;

/// JSON source of the learning-resource catalog that ships with the crate.
const BUNDLED_RESOURCES: &str = include_str!("../../data/learning_resources.json");

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResourceError {
    #[error("resource title is required")]
    MissingTitle,

    #[error("resource link is required")]
    MissingLink,

    #[error("resource link is not a valid URL: {0}")]
    InvalidLink(String),

    #[error("no {kind} resource at index {index} in `{category}`")]
    NotFound {
        category: String,
        kind: ResourceKind,
        index: usize,
    },

    #[error("resource catalog could not be parsed: {0}")]
    Parse(String),
}

//
// ─── KIND ──────────────────────────────────────────────────────────────────────
//

/// The shelves a category's resources are sorted onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    Videos,
    Documents,
    Courses,
    Webinars,
    Downloads,
    Ebooks,
    Products,
    ExternalSites,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 8] = [
        ResourceKind::Videos,
        ResourceKind::Documents,
        ResourceKind::Courses,
        ResourceKind::Webinars,
        ResourceKind::Downloads,
        ResourceKind::Ebooks,
        ResourceKind::Products,
        ResourceKind::ExternalSites,
    ];

    /// Human-readable shelf label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Videos => "Videos",
            ResourceKind::Documents => "Documents",
            ResourceKind::Courses => "Courses",
            ResourceKind::Webinars => "Webinars",
            ResourceKind::Downloads => "Downloads",
            ResourceKind::Ebooks => "E-Books",
            ResourceKind::Products => "Products",
            ResourceKind::ExternalSites => "External Sites",
        }
    }

    /// Stable key used in persisted documents and on the command line.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            ResourceKind::Videos => "videos",
            ResourceKind::Documents => "documents",
            ResourceKind::Courses => "courses",
            ResourceKind::Webinars => "webinars",
            ResourceKind::Downloads => "downloads",
            ResourceKind::Ebooks => "ebooks",
            ResourceKind::Products => "products",
            ResourceKind::ExternalSites => "externalSites",
        }
    }

    /// Parse a shelf key, ignoring ASCII case.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.key().eq_ignore_ascii_case(key.trim()))
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

//
// ─── RESOURCE ──────────────────────────────────────────────────────────────────
//

/// A single entry on a category shelf.
///
/// `details` holds kind-specific fields such as `duration`, `fileSize`,
/// `provider` or `price`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningResource {
    pub id: ResourceId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub link: String,
    #[serde(flatten)]
    pub details: BTreeMap<String, String>,
}

/// Unvalidated resource input.
#[derive(Debug, Clone, Default)]
pub struct ResourceDraft {
    pub title: String,
    pub description: String,
    pub link: String,
    pub details: BTreeMap<String, String>,
}

impl ResourceDraft {
    #[must_use]
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Validate the draft for the given shelf.
    ///
    /// # Errors
    ///
    /// Returns `MissingTitle`/`MissingLink` for blank required fields and
    /// `InvalidLink` when an external-site link is not an absolute URL.
    pub fn validate(
        self,
        kind: ResourceKind,
        id: ResourceId,
    ) -> Result<LearningResource, ResourceError> {
        let title = self.title.trim().to_owned();
        if title.is_empty() {
            return Err(ResourceError::MissingTitle);
        }
        let link = self.link.trim().to_owned();
        if link.is_empty() {
            return Err(ResourceError::MissingLink);
        }
        if kind == ResourceKind::ExternalSites && Url::parse(&link).is_err() {
            return Err(ResourceError::InvalidLink(link));
        }

        let details = self
            .details
            .into_iter()
            .map(|(k, v)| (k.trim().to_owned(), v.trim().to_owned()))
            .filter(|(k, v)| !k.is_empty() && !v.is_empty())
            .collect();

        Ok(LearningResource {
            id,
            title,
            description: self.description.trim().to_owned(),
            link,
            details,
        })
    }
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

type Shelves = BTreeMap<ResourceKind, Vec<LearningResource>>;

/// Category → kind → ordered resources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceCatalog {
    categories: BTreeMap<String, Shelves>,
}

impl ResourceCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalog document.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::Parse` for malformed JSON.
    pub fn from_json(json: &str) -> Result<Self, ResourceError> {
        serde_json::from_str(json).map_err(|err| ResourceError::Parse(err.to_string()))
    }

    /// The starter catalog bundled with the crate.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::Parse` if the bundled data is malformed.
    pub fn bundled() -> Result<Self, ResourceError> {
        Self::from_json(BUNDLED_RESOURCES)
    }

    /// Make sure `category` exists with an empty shelf for every kind.
    pub fn ensure_category(&mut self, category: &str) {
        let shelves = self.categories.entry(category.to_owned()).or_default();
        for kind in ResourceKind::ALL {
            shelves.entry(kind).or_default();
        }
    }

    /// Drop a category with all of its shelves. Returns whether it existed.
    pub fn remove_category(&mut self, category: &str) -> bool {
        self.categories.remove(category).is_some()
    }

    /// Append a resource to a shelf, creating the category or shelf if needed.
    ///
    /// # Errors
    ///
    /// Returns the draft's validation error.
    pub fn add(
        &mut self,
        category: &str,
        kind: ResourceKind,
        draft: ResourceDraft,
    ) -> Result<ResourceId, ResourceError> {
        let resource = draft.validate(kind, self.next_id())?;
        let id = resource.id;
        self.categories
            .entry(category.to_owned())
            .or_default()
            .entry(kind)
            .or_default()
            .push(resource);
        Ok(id)
    }

    /// Remove the resource at `index` on a shelf.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::NotFound` if the category, shelf or index is missing.
    pub fn remove(
        &mut self,
        category: &str,
        kind: ResourceKind,
        index: usize,
    ) -> Result<LearningResource, ResourceError> {
        let not_found = || ResourceError::NotFound {
            category: category.to_owned(),
            kind,
            index,
        };
        let shelf = self
            .categories
            .get_mut(category)
            .and_then(|shelves| shelves.get_mut(&kind))
            .ok_or_else(not_found)?;
        if index >= shelf.len() {
            return Err(not_found());
        }
        Ok(shelf.remove(index))
    }

    /// Resources on one shelf; empty when the category or shelf is missing.
    #[must_use]
    pub fn resources(&self, category: &str, kind: ResourceKind) -> &[LearningResource] {
        self.categories
            .get(category)
            .and_then(|shelves| shelves.get(&kind))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Resources on one shelf whose title or description contains `term`,
    /// ignoring case. A blank term matches everything.
    #[must_use]
    pub fn search(&self, category: &str, kind: ResourceKind, term: &str) -> Vec<&LearningResource> {
        let term = term.trim().to_lowercase();
        self.resources(category, kind)
            .iter()
            .filter(|r| {
                term.is_empty()
                    || r.title.to_lowercase().contains(&term)
                    || r.description.to_lowercase().contains(&term)
            })
            .collect()
    }

    #[must_use]
    pub fn contains_category(&self, category: &str) -> bool {
        self.categories.contains_key(category)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Total number of resources in a category across all shelves.
    #[must_use]
    pub fn count_in(&self, category: &str) -> usize {
        self.categories
            .get(category)
            .map_or(0, |shelves| shelves.values().map(Vec::len).sum())
    }

    fn next_id(&self) -> ResourceId {
        self.categories
            .values()
            .flat_map(BTreeMap::values)
            .flatten()
            .map(|r| r.id)
            .max()
            .map_or_else(|| ResourceId::new(1), |id| id.next())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_catalog_parses_with_details() {
        let catalog = ResourceCatalog::bundled().unwrap();
        let courses = catalog.resources("Agile Methodologies", ResourceKind::Courses);
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].details.get("price").map(String::as_str), Some("$499"));
        assert!(catalog.contains_category("General PMO"));
    }

    #[test]
    fn search_matches_title_or_description_ignoring_case() {
        let mut catalog = ResourceCatalog::new();
        for draft in [
            ResourceDraft::new("Portfolio Governance", "/a"),
            ResourceDraft::new("Risk basics", "/b").with_description("Covers GOVERNANCE boards"),
            ResourceDraft::new("Scheduling", "/c"),
        ] {
            catalog.add("General PMO", ResourceKind::Videos, draft).unwrap();
        }

        let titles = |term: &str| -> Vec<String> {
            catalog
                .search("General PMO", ResourceKind::Videos, term)
                .into_iter()
                .map(|r| r.title.clone())
                .collect()
        };
        assert_eq!(titles("governance"), vec!["Portfolio Governance", "Risk basics"]);
        assert_eq!(titles("SCHED"), vec!["Scheduling"]);
        assert_eq!(titles("   ").len(), 3);
        assert!(titles("budget").is_empty());
        assert!(catalog.search("Missing", ResourceKind::Videos, "").is_empty());
    }

    #[test]
    fn ensure_category_creates_every_shelf() {
        let mut catalog = ResourceCatalog::new();
        catalog.ensure_category("Agile Delivery");
        for kind in ResourceKind::ALL {
            assert!(catalog.resources("Agile Delivery", kind).is_empty());
        }
        assert_eq!(catalog.count_in("Agile Delivery"), 0);
    }

    #[test]
    fn add_assigns_increasing_ids() {
        let mut catalog = ResourceCatalog::new();
        let first = catalog
            .add("Governance", ResourceKind::Videos, ResourceDraft::new("A", "/a"))
            .unwrap();
        let second = catalog
            .add("Risk Management", ResourceKind::Documents, ResourceDraft::new("B", "/b"))
            .unwrap();
        assert_eq!(first, ResourceId::new(1));
        assert_eq!(second, ResourceId::new(2));
    }

    #[test]
    fn add_requires_title_and_link() {
        let mut catalog = ResourceCatalog::new();
        let err = catalog
            .add("Governance", ResourceKind::Videos, ResourceDraft::new(" ", "/a"))
            .unwrap_err();
        assert_eq!(err, ResourceError::MissingTitle);
        let err = catalog
            .add("Governance", ResourceKind::Videos, ResourceDraft::new("A", ""))
            .unwrap_err();
        assert_eq!(err, ResourceError::MissingLink);
    }

    #[test]
    fn external_sites_need_absolute_urls() {
        let mut catalog = ResourceCatalog::new();
        let err = catalog
            .add(
                "General PMO",
                ResourceKind::ExternalSites,
                ResourceDraft::new("Channel", "not a url"),
            )
            .unwrap_err();
        assert!(matches!(err, ResourceError::InvalidLink(_)));

        catalog
            .add(
                "General PMO",
                ResourceKind::ExternalSites,
                ResourceDraft::new("Channel", "https://example.com/pmo").with_detail("type", "YouTube"),
            )
            .unwrap();
        assert_eq!(catalog.count_in("General PMO"), 1);
    }

    #[test]
    fn remove_by_index() {
        let mut catalog = ResourceCatalog::new();
        catalog
            .add("Governance", ResourceKind::Videos, ResourceDraft::new("A", "/a"))
            .unwrap();
        catalog
            .add("Governance", ResourceKind::Videos, ResourceDraft::new("B", "/b"))
            .unwrap();

        let removed = catalog.remove("Governance", ResourceKind::Videos, 0).unwrap();
        assert_eq!(removed.title, "A");
        let left = catalog.resources("Governance", ResourceKind::Videos);
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].title, "B");

        let err = catalog.remove("Governance", ResourceKind::Videos, 5).unwrap_err();
        assert!(matches!(err, ResourceError::NotFound { index: 5, .. }));
    }

    #[test]
    fn kind_keys_round_trip() {
        for kind in ResourceKind::ALL {
            assert_eq!(ResourceKind::from_key(kind.key()), Some(kind));
        }
        assert_eq!(
            ResourceKind::from_key("EXTERNALSITES"),
            Some(ResourceKind::ExternalSites)
        );
        assert_eq!(ResourceKind::from_key("podcasts"), None);
    }
}
