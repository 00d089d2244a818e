use std::path::PathBuf;
use thiserror::Error;

use crate::analysis::AnalysisError;
use crate::page::PageId;

/// The main error type for comicast operations.
#[derive(Debug, Error)]
pub enum ComicastError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse analysis JSON from {path}: {source}")]
    AnalysisJsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse settings from {path}: {message}")]
    SettingsParse { path: PathBuf, message: String },

    #[error("Failed to read image dimensions for {path}: {source}")]
    ImageSize {
        path: String,
        #[source]
        source: imagesize::ImageError,
    },

    #[cfg(feature = "cbz")]
    #[error("Failed to read archive {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("No page images found in {0}")]
    NoPages(PathBuf),

    #[error("Page {page} is still unanalyzed after {attempts} analysis attempt(s)")]
    AnalysisStalled { page: PageId, attempts: u32 },

    #[error("Failed to serialize output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}
