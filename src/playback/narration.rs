//! The narration collaborator: something that can speak a region's text.

use std::io;
use std::process::Command;

use thiserror::Error;

use crate::page::RegionId;
use crate::settings::Settings;

/// Speech synthesis failure. The playback driver treats it as a completion.
#[derive(Debug, Error)]
pub enum NarrationError {
    #[error("failed to start speech command '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("speech command '{command}' exited with {status}")]
    Failed { command: String, status: String },

    #[error("speech synthesis failed: {0}")]
    Synthesis(String),
}

/// Voice parameters applied to every narration request.
#[derive(Clone, Debug, PartialEq)]
pub struct Voice {
    pub rate: f32,
    pub pitch: f32,
    pub voice: Option<String>,
    pub language: String,
}

impl Voice {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            rate: settings.tts_rate,
            pitch: settings.tts_pitch,
            voice: settings.tts_voice.clone(),
            language: settings.language.clone(),
        }
    }
}

impl Default for Voice {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// One utterance handed to the narrator.
#[derive(Clone, Debug, PartialEq)]
pub struct NarrationRequest {
    pub region_id: RegionId,
    pub text: String,
    pub voice: Voice,
}

/// Speaks narration requests.
///
/// `speak` starts an utterance, superseding any still in progress. Its
/// completion is reported back to the playback driver by whoever owns the
/// narrator's event source; an `Err` from `speak` counts as an immediate
/// completion.
pub trait Narrator {
    fn speak(&mut self, request: &NarrationRequest) -> Result<(), NarrationError>;

    /// Stops the current utterance, if any. Best effort.
    fn cancel(&mut self);
}

impl<N: Narrator + ?Sized> Narrator for Box<N> {
    fn speak(&mut self, request: &NarrationRequest) -> Result<(), NarrationError> {
        (**self).speak(request)
    }

    fn cancel(&mut self) {
        (**self).cancel()
    }
}

/// Collapses line breaks and trims, as speech engines read them as pauses.
pub fn clean_text(text: &str) -> String {
    text.replace(['\r', '\n'], " ").trim().to_string()
}

/// A narrator that produces no audio; used for transcripts.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullNarrator;

impl Narrator for NullNarrator {
    fn speak(&mut self, request: &NarrationRequest) -> Result<(), NarrationError> {
        log::trace!("narrating {} silently", request.region_id);
        Ok(())
    }

    fn cancel(&mut self) {}
}

/// Speaks through an external command such as `espeak` or `say`.
///
/// The text is passed as the last argument. Voice parameters are exported
/// as `COMICAST_RATE`, `COMICAST_PITCH`, `COMICAST_VOICE` and
/// `COMICAST_LANG`. The command runs to completion inside `speak`.
#[derive(Clone, Debug)]
pub struct CommandNarrator {
    program: String,
    args: Vec<String>,
}

impl CommandNarrator {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Parses a whitespace-separated command line, e.g. `"espeak -s 160"`.
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }
}

impl Narrator for CommandNarrator {
    fn speak(&mut self, request: &NarrationRequest) -> Result<(), NarrationError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(&request.text)
            .env("COMICAST_RATE", request.voice.rate.to_string())
            .env("COMICAST_PITCH", request.voice.pitch.to_string())
            .env("COMICAST_LANG", &request.voice.language);
        if let Some(voice) = &request.voice.voice {
            command.env("COMICAST_VOICE", voice);
        }

        let status = command.status().map_err(|source| NarrationError::Spawn {
            command: self.program.clone(),
            source,
        })?;
        if status.success() {
            Ok(())
        } else {
            Err(NarrationError::Failed {
                command: self.program.clone(),
                status: status.to_string(),
            })
        }
    }

    fn cancel(&mut self) {}
}
