use serde::{Deserialize, Serialize};

use crate::options::BrandKey;

/// A selectable brand: display name plus the registry's brand identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BrandEntry {
    pub name: String,
    pub brand_id: Option<String>,
}

impl BrandEntry {
    /// The value to filter on when this entry is selected.
    ///
    /// Entries without a brand id cannot be selected under [`BrandKey::Id`].
    #[must_use]
    pub fn filter_value(&self, key: BrandKey) -> Option<&str> {
        match key {
            BrandKey::Id => self.brand_id.as_deref(),
            BrandKey::Name => Some(&self.name),
        }
    }
}

/// Distinct brands ordered by name, then id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BrandCatalog {
    entries: Vec<BrandEntry>,
}

impl BrandCatalog {
    #[must_use]
    pub fn new(mut entries: Vec<BrandEntry>) -> Self {
        entries.retain(|e| !e.name.trim().is_empty());
        entries.sort();
        entries.dedup();
        Self { entries }
    }

    #[must_use]
    pub fn entries(&self) -> &[BrandEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for BrandCatalog {
    type Item = BrandEntry;
    type IntoIter = std::vec::IntoIter<BrandEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
