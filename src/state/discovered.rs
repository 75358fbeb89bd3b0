//! Deduplicated URL set built up by a traversal

use std::collections::hash_set;
use std::collections::HashSet;

/// The set of listing URLs discovered by one traversal
///
/// Adding a URL that is already present is a no-op, so merging results
/// from overlapping sitemaps never produces duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveredSet {
    urls: HashSet<String>,
}

impl DiscoveredSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a URL, returning true if it was not already present
    pub fn insert(&mut self, url: impl Into<String>) -> bool {
        self.urls.insert(url.into())
    }

    /// Merges another set into this one, returning how many URLs were new
    pub fn union(&mut self, other: DiscoveredSet) -> usize {
        let before = self.urls.len();
        if before == 0 {
            self.urls = other.urls;
        } else {
            self.urls.extend(other.urls);
        }
        self.urls.len() - before
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn iter(&self) -> hash_set::Iter<'_, String> {
        self.urls.iter()
    }

    /// Returns the URLs in lexicographic order
    ///
    /// Exports and bulk loads use this order so their output is reproducible.
    pub fn to_sorted_vec(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.urls.iter().cloned().collect();
        urls.sort_unstable();
        urls
    }
}

impl FromIterator<String> for DiscoveredSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            urls: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<&'a str> for DiscoveredSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(str::to_string).collect()
    }
}

impl Extend<String> for DiscoveredSet {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        self.urls.extend(iter);
    }
}

impl IntoIterator for DiscoveredSet {
    type Item = String;
    type IntoIter = hash_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.urls.into_iter()
    }
}

impl<'a> IntoIterator for &'a DiscoveredSet {
    type Item = &'a String;
    type IntoIter = hash_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.urls.iter()
    }
}
