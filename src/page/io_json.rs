//! JSON serialization for analysis results and page listings.
//!
//! An analysis result is the object returned by the vision collaborator:
//!
//! ```json
//! { "bubbles": [ { "text": "Hello!", "box_2d": [100, 800, 150, 900] } ] }
//! ```
//!
//! `box_2d` is `[ymin, xmin, ymax, xmax]` on the 0–1000 scale.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ComicastError;

/// One detected text area as reported by the analysis collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawRegion {
    pub text: String,
    pub box_2d: [f64; 4],
}

impl RawRegion {
    pub fn new(text: impl Into<String>, box_2d: [f64; 4]) -> Self {
        Self {
            text: text.into(),
            box_2d,
        }
    }
}

/// The analysis collaborator's response for one page.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub bubbles: Vec<RawRegion>,
}

/// Reads an analysis result from a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn read_analysis_json(path: &Path) -> Result<AnalysisResponse, ComicastError> {
    let file = File::open(path).map_err(ComicastError::Io)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| ComicastError::AnalysisJsonParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses an analysis result from a JSON string.
pub fn from_analysis_str(json: &str) -> Result<AnalysisResponse, serde_json::Error> {
    serde_json::from_str(json)
}

/// Parses an analysis result from raw bytes (e.g. an archive entry).
pub fn from_analysis_slice(bytes: &[u8]) -> Result<AnalysisResponse, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Pretty-prints any serializable value (pages, reports, snapshots).
pub fn to_json_string<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}
