//! The playback driver: a read-aloud state machine over the page list.
//!
//! The driver is synchronous. Time and audio reach it as explicit calls:
//! [`PlaybackDriver::step`] is invoked whenever something may have changed
//! (a tick, an analysis landing, a narration finishing) and
//! [`PlaybackDriver::narration_finished`] reports the end of an utterance.
//! The driver owns the narrator and cancels it on every transition out of
//! playing.
//!
//! Ordering guarantee: the block after `N` is only dispatched once `N`'s
//! completion has been observed, except when a seek interrupts.

pub mod narration;

use std::time::Duration;

use serde::Serialize;

use crate::page::{Page, RegionId};
use crate::settings::Settings;

pub use narration::{
    clean_text, CommandNarrator, NarrationError, NarrationRequest, Narrator, NullNarrator, Voice,
};

/// How long a caller should wait before stepping again while the current
/// page is still being analyzed.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Playback position and status. Only the driver mutates it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PlaybackState {
    pub page_index: usize,
    pub block_index: usize,
    pub playing: bool,
    /// Region highlighted by the display.
    pub active_region: Option<RegionId>,
    /// Region whose narration is outstanding.
    pub last_dispatched: Option<RegionId>,
}

/// What a single [`PlaybackDriver::step`] did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// Not playing; nothing to do.
    Idle,
    /// The current page is not analyzed yet; step again after [`POLL_INTERVAL`].
    WaitingForAnalysis { page: usize },
    /// Moved to the first block of the next page.
    PageAdvanced { page: usize },
    /// Narration of a region was dispatched.
    Dispatched {
        page: usize,
        block: usize,
        region: RegionId,
    },
    /// The current region's narration is still outstanding.
    Speaking { region: RegionId },
    /// Reached the end of the last page and stopped.
    Finished,
}

/// Drives narration through pages and blocks.
pub struct PlaybackDriver<N> {
    state: PlaybackState,
    narrator: N,
    voice: Voice,
}

impl<N: Narrator> PlaybackDriver<N> {
    pub fn new(narrator: N, settings: &Settings) -> Self {
        Self {
            state: PlaybackState::default(),
            narrator,
            voice: Voice::from_settings(settings),
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state.playing
    }

    pub fn narrator(&self) -> &N {
        &self.narrator
    }

    /// Starts playing from the current position.
    ///
    /// Returns false (and stays idle) when there are no pages.
    pub fn play(&mut self, pages: &[Page]) -> bool {
        if pages.is_empty() {
            log::debug!("play requested with no pages; ignoring");
            return false;
        }
        if !self.state.playing {
            log::debug!(
                "playing from page {} block {}",
                self.state.page_index,
                self.state.block_index
            );
            self.state.playing = true;
            self.state.last_dispatched = None;
        }
        true
    }

    /// Stops playing and cancels any outstanding narration.
    pub fn pause(&mut self) {
        if self.state.playing {
            log::debug!("paused at page {}", self.state.page_index);
        }
        self.stop();
    }

    pub fn toggle_play(&mut self, pages: &[Page]) -> bool {
        if self.state.playing {
            self.pause();
            false
        } else {
            self.play(pages)
        }
    }

    fn stop(&mut self) {
        self.state.playing = false;
        self.state.active_region = None;
        self.state.last_dispatched = None;
        self.narrator.cancel();
    }

    /// Advances the state machine by one step.
    pub fn step(&mut self, pages: &[Page]) -> StepOutcome {
        if !self.state.playing {
            return StepOutcome::Idle;
        }

        let page_index = self.state.page_index;
        let Some(page) = pages.get(page_index) else {
            log::warn!("page {} is out of range; stopping", page_index);
            self.stop();
            return StepOutcome::Finished;
        };

        if !page.analyzed {
            return StepOutcome::WaitingForAnalysis { page: page_index };
        }

        let block_index = self.state.block_index;
        let Some(region) = page.regions.get(block_index) else {
            return self.advance_page(pages.len());
        };

        if self.state.last_dispatched.as_ref() == Some(&region.id) {
            return StepOutcome::Speaking {
                region: region.id.clone(),
            };
        }

        let region_id = region.id.clone();
        let request = NarrationRequest {
            region_id: region_id.clone(),
            text: clean_text(&region.text),
            voice: self.voice.clone(),
        };
        self.state.active_region = Some(region_id.clone());
        self.state.last_dispatched = Some(region_id.clone());

        if request.text.is_empty() {
            log::debug!("region {} has no text; skipping", region_id);
            self.narration_finished(&region_id, Ok(()));
        } else if let Err(err) = self.narrator.speak(&request) {
            self.narration_finished(&region_id, Err(err));
        }

        StepOutcome::Dispatched {
            page: page_index,
            block: block_index,
            region: region_id,
        }
    }

    fn advance_page(&mut self, page_count: usize) -> StepOutcome {
        let next = self.state.page_index + 1;
        if next < page_count {
            log::debug!("advancing to page {}", next);
            self.state.page_index = next;
            self.state.block_index = 0;
            StepOutcome::PageAdvanced { page: next }
        } else {
            log::info!("reached the end of the last page");
            self.stop();
            StepOutcome::Finished
        }
    }

    /// Reports that narration of `region` ended, successfully or not.
    ///
    /// Advances to the next block only if playback is still on and `region`
    /// is the outstanding narration; completions of cancelled narrations are
    /// ignored. Returns true if the position advanced.
    pub fn narration_finished(
        &mut self,
        region: &RegionId,
        outcome: Result<(), NarrationError>,
    ) -> bool {
        if let Err(err) = outcome {
            log::warn!("narration of {} failed: {}", region, err);
        }
        if !self.state.playing || self.state.last_dispatched.as_ref() != Some(region) {
            log::debug!("ignoring stale narration completion for {}", region);
            return false;
        }
        self.state.block_index += 1;
        self.state.last_dispatched = None;
        true
    }

    /// Jumps to a block chosen by the user and resumes playing from it.
    ///
    /// Any outstanding narration is cancelled first. Returns false, leaving
    /// the position unchanged, if the target does not exist.
    pub fn select_block(&mut self, pages: &[Page], page: usize, block: usize) -> bool {
        let Some(region) = pages.get(page).and_then(|p| p.regions.get(block)) else {
            log::debug!("ignoring selection of missing block {} on page {}", block, page);
            return false;
        };
        let region_id = region.id.clone();

        self.stop();
        self.state.page_index = page;
        self.state.block_index = block;
        self.state.active_region = Some(region_id);
        self.state.playing = true;
        true
    }

    /// Follows a page change made by the display (e.g. the reader scrolled).
    ///
    /// Moving to a different page restarts at its first block and cancels
    /// outstanding narration. Returns false if `page` does not exist.
    pub fn focus_page(&mut self, pages: &[Page], page: usize) -> bool {
        if page >= pages.len() {
            return false;
        }
        if page != self.state.page_index {
            self.state.page_index = page;
            self.state.block_index = 0;
            if self.state.playing {
                self.narrator.cancel();
                self.state.active_region = None;
                self.state.last_dispatched = None;
            }
        }
        true
    }
}
