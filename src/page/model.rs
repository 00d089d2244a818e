//! Core page model: pages, their text regions, and the reading mode.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use super::bbox::RegionBox;
use super::ids::{PageId, RegionId};

/// Traversal policy for the regions on a page.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReadingMode {
    /// Top to bottom, for continuously scrolling vertical strips.
    Webtoon,
    /// Rows top to bottom, right to left within a row.
    #[default]
    Manga,
}

impl ReadingMode {
    /// Returns the other mode.
    pub fn toggled(self) -> Self {
        match self {
            ReadingMode::Webtoon => ReadingMode::Manga,
            ReadingMode::Manga => ReadingMode::Webtoon,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReadingMode::Webtoon => "webtoon",
            ReadingMode::Manga => "manga",
        }
    }
}

impl fmt::Display for ReadingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detected text area on a page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextRegion {
    /// Unique identifier for this region.
    pub id: RegionId,

    /// Text to narrate.
    pub text: String,

    /// Bounding box on the 0–1000 scale.
    #[serde(rename = "box_2d")]
    pub bbox: RegionBox,

    /// 1-based reading position, assigned by the sequencer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

impl TextRegion {
    /// Creates a new, not yet sequenced region.
    pub fn new(id: impl Into<RegionId>, text: impl Into<String>, bbox: RegionBox) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            bbox,
            order: None,
        }
    }

    /// Sets the reading position.
    pub fn with_order(mut self, order: u32) -> Self {
        self.order = Some(order);
        self
    }
}

impl From<String> for RegionId {
    fn from(id: String) -> Self {
        RegionId::new(id)
    }
}

/// Where a page's image bytes live.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageRef {
    /// A plain image file on disk.
    File { path: PathBuf },
    /// An entry inside a comic archive.
    ArchiveEntry { archive: PathBuf, entry: String },
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageRef::File { path } => write!(f, "{}", path.display()),
            ImageRef::ArchiveEntry { archive, entry } => {
                write!(f, "{}:{}", archive.display(), entry)
            }
        }
    }
}

/// A single page of the comic.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Page {
    /// Unique identifier, the page's filename relative to the comic root.
    pub id: PageId,

    /// Location of the page image.
    pub image: ImageRef,

    /// Width of the image in pixels.
    pub width: u32,

    /// Height of the image in pixels.
    pub height: u32,

    /// Set once the analysis result has landed.
    #[serde(default)]
    pub analyzed: bool,

    /// Regions in reading order; empty until analyzed.
    #[serde(default)]
    pub regions: Vec<TextRegion>,
}

impl Page {
    /// Creates a new, unanalyzed page.
    pub fn new(id: impl Into<PageId>, image: ImageRef, width: u32, height: u32) -> Self {
        Self {
            id: id.into(),
            image,
            width,
            height,
            analyzed: false,
            regions: Vec::new(),
        }
    }

    /// Marks the page analyzed with an already-sequenced region list.
    pub fn with_regions(mut self, regions: Vec<TextRegion>) -> Self {
        self.regions = regions;
        self.analyzed = true;
        self
    }

    /// Finds a region on this page by id.
    pub fn region(&self, id: &RegionId) -> Option<&TextRegion> {
        self.regions.iter().find(|r| &r.id == id)
    }
}

impl From<String> for PageId {
    fn from(id: String) -> Self {
        PageId::new(id)
    }
}
