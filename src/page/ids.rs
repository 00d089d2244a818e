//! Newtype IDs for pages and text regions.
//!
//! Both wrap strings: a page is identified by its filename within the comic,
//! and a region by its page plus its position in the analysis result.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A unique identifier for a page, derived from its filename.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(String);

impl PageId {
    /// Creates a new PageId.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PageId({:?})", self.0)
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PageId {
    fn from(id: &str) -> Self {
        PageId::new(id)
    }
}

/// A unique identifier for a text region.
///
/// Unique across the whole page collection, not just within one page, so a
/// playback guard can compare region ids across page boundaries.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(String);

impl RegionId {
    /// Creates a new RegionId from an arbitrary string.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates the id of the `seq`-th region (1-based) detected on `page`.
    pub fn for_page(page: &PageId, seq: usize) -> Self {
        Self(format!("{}#{}", page.as_str(), seq))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RegionId({:?})", self.0)
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RegionId {
    fn from(id: &str) -> Self {
        RegionId::new(id)
    }
}
