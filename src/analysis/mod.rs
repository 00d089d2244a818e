//! Page analysis: the collaborator interface and its offline implementation.
//!
//! The analysis collaborator turns a page image into raw `(text, box_2d)`
//! pairs. comicast does not detect text itself; [`SidecarAnalyzer`] reads
//! results produced elsewhere from `<page>.json` files. Other collaborators
//! (a remote vision service, a local OCR model) plug in through
//! [`Analyzer`].

pub mod prefetch;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::page::io_json::from_analysis_slice;
use crate::page::{ImageRef, PageId, RawRegion, RegionBox, RegionId, TextRegion};

pub use prefetch::{AnalysisTicket, PrefetchScheduler, PREFETCH_WINDOW};

/// Failure of a single page analysis. Never fatal: the page stays unanalyzed.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("no analysis result for {0}")]
    Missing(String),

    #[error("failed to read analysis for {image}: {source}")]
    Io {
        image: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to read analysis from archive: {0}")]
    Archive(String),

    #[error("failed to parse analysis for {image}: {source}")]
    Parse {
        image: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed analysis result: {0}")]
    Malformed(String),
}

/// Turns a page image into raw text regions.
///
/// Implementations may be called from worker threads.
pub trait Analyzer: Send + Sync {
    fn analyze(&self, page: &PageId, image: &ImageRef) -> Result<Vec<RawRegion>, AnalysisError>;
}

/// Validates raw regions and gives each a stable id on `page`.
///
/// Boxes with reversed corners are reordered; non-finite coordinates make
/// the whole result malformed.
pub fn into_regions(page: &PageId, raw: Vec<RawRegion>) -> Result<Vec<TextRegion>, AnalysisError> {
    raw.into_iter()
        .enumerate()
        .map(|(idx, region)| {
            if !region.box_2d.iter().all(|c| c.is_finite()) {
                return Err(AnalysisError::Malformed(format!(
                    "region {} on page {} has non-finite box {:?}",
                    idx + 1,
                    page,
                    region.box_2d
                )));
            }
            Ok(TextRegion::new(
                RegionId::for_page(page, idx + 1),
                region.text,
                RegionBox::from_box_2d(region.box_2d),
            ))
        })
        .collect()
}

/// Reads analysis results from JSON sidecar files.
///
/// Without an analysis directory, the sidecar of `comic/001.png` is
/// `comic/001.json`, and the sidecar of archive entry `ch1/001.png` is the
/// entry `ch1/001.json` in the same archive. With an analysis directory,
/// the sidecar of page `ch1/001.png` is `<dir>/ch1/001.json`.
#[derive(Clone, Debug, Default)]
pub struct SidecarAnalyzer {
    dir: Option<PathBuf>,
}

impl SidecarAnalyzer {
    pub fn new() -> Self {
        Self { dir: None }
    }

    /// Reads every sidecar from `dir` instead of next to the images.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    fn read_sidecar(&self, page: &PageId, image: &ImageRef) -> Result<Vec<u8>, AnalysisError> {
        match (&self.dir, image) {
            (Some(dir), _) => read_file(&dir.join(sidecar_name(page.as_str()))),
            (None, ImageRef::File { path }) => read_file(&path.with_extension("json")),
            (None, ImageRef::ArchiveEntry { archive, entry }) => {
                read_from_archive(archive, &sidecar_name(entry))
            }
        }
    }
}

impl Analyzer for SidecarAnalyzer {
    fn analyze(&self, page: &PageId, image: &ImageRef) -> Result<Vec<RawRegion>, AnalysisError> {
        let bytes = self.read_sidecar(page, image)?;
        let response = from_analysis_slice(&bytes).map_err(|source| AnalysisError::Parse {
            image: image.to_string(),
            source,
        })?;
        log::debug!(
            "read {} region(s) for page {}",
            response.bubbles.len(),
            page
        );
        Ok(response.bubbles)
    }
}

fn sidecar_name(name: &str) -> String {
    Path::new(name)
        .with_extension("json")
        .to_string_lossy()
        .into_owned()
}

fn read_file(path: &Path) -> Result<Vec<u8>, AnalysisError> {
    fs::read(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            AnalysisError::Missing(path.display().to_string())
        } else {
            AnalysisError::Io {
                image: path.display().to_string(),
                source,
            }
        }
    })
}

#[cfg(feature = "cbz")]
fn read_from_archive(archive: &Path, entry: &str) -> Result<Vec<u8>, AnalysisError> {
    match crate::source::archive::read_archive_entry(archive, entry) {
        Ok(Some(bytes)) => Ok(bytes),
        Ok(None) => Err(AnalysisError::Missing(format!(
            "{}:{}",
            archive.display(),
            entry
        ))),
        Err(err) => Err(AnalysisError::Archive(err.to_string())),
    }
}

#[cfg(not(feature = "cbz"))]
fn read_from_archive(archive: &Path, _entry: &str) -> Result<Vec<u8>, AnalysisError> {
    Err(AnalysisError::Archive(format!(
        "{}: archive support requires the 'cbz' feature",
        archive.display()
    )))
}
