//! Reader settings, loaded read-only from a JSON or YAML file.
//!
//! Keys missing from the file fall back to [`Settings::default`], so a
//! settings file only needs to name what it changes:
//!
//! ```yaml
//! tts_rate: 1.25
//! default_reading_mode: WEBTOON
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ComicastError;
use crate::page::ReadingMode;

/// Narration and reading preferences.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Speech rate multiplier (1.0 is normal speed).
    pub tts_rate: f32,

    /// Speech pitch multiplier (1.0 is the voice's natural pitch).
    pub tts_pitch: f32,

    /// Preferred voice identifier, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tts_voice: Option<String>,

    /// BCP 47 language tag handed to the narrator.
    pub language: String,

    /// Reading mode used when a comic is opened.
    pub default_reading_mode: ReadingMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tts_rate: 1.0,
            tts_pitch: 1.0,
            tts_voice: None,
            language: "en-US".to_string(),
            default_reading_mode: ReadingMode::Manga,
        }
    }
}

impl Settings {
    /// Loads settings from `path`; the format follows the file extension.
    ///
    /// `.yaml`/`.yml` files are read as YAML, everything else as JSON.
    pub fn load(path: &Path) -> Result<Self, ComicastError> {
        let data = fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
            .unwrap_or(false);

        let parsed = if is_yaml {
            serde_yaml::from_str(&data).map_err(|err| err.to_string())
        } else {
            serde_json::from_str(&data).map_err(|err| err.to_string())
        };

        parsed.map_err(|message| ComicastError::SettingsParse {
            path: path.to_path_buf(),
            message,
        })
    }
}
