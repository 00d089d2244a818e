//! A reading session: one comic, its reading mode, and its playback.
//!
//! [`ReaderSession`] is the single owner of the page list, the prefetch
//! scheduler and the playback driver. A UI calls its methods from its event
//! loop; [`headless::run_headless`] drives one without a UI.

pub mod headless;
mod report;

use serde::Serialize;

use crate::analysis::{AnalysisError, AnalysisTicket, PrefetchScheduler};
use crate::page::{Page, PageId, RawRegion, ReadingMode, RegionId, TextRegion};
use crate::playback::{NarrationError, Narrator, PlaybackDriver, PlaybackState, StepOutcome};
use crate::sequence::sequence;
use crate::settings::Settings;

pub use headless::{run_headless, HeadlessOptions};
pub use report::{NarrationEntry, ReadReport};

/// Per-page status for the display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PageStatus {
    pub id: PageId,
    pub analyzed: bool,
    pub analyzing: bool,
    pub regions: usize,
}

/// Read-only view of a session after a transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub mode: ReadingMode,
    pub page_index: usize,
    pub block_index: usize,
    pub playing: bool,
    pub active_region: Option<RegionId>,
    pub pages: Vec<PageStatus>,
}

/// Owns a comic's pages and everything that reads them aloud.
pub struct ReaderSession<N> {
    pages: Vec<Page>,
    mode: ReadingMode,
    scheduler: PrefetchScheduler,
    driver: PlaybackDriver<N>,
}

impl<N: Narrator> ReaderSession<N> {
    /// Opens a session in the settings' default reading mode.
    pub fn new(pages: Vec<Page>, settings: &Settings, narrator: N) -> Self {
        Self {
            pages,
            mode: settings.default_reading_mode,
            scheduler: PrefetchScheduler::new(),
            driver: PlaybackDriver::new(narrator, settings),
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn mode(&self) -> ReadingMode {
        self.mode
    }

    pub fn playback(&self) -> &PlaybackState {
        self.driver.state()
    }

    pub fn narrator(&self) -> &N {
        self.driver.narrator()
    }

    pub fn scheduler(&self) -> &PrefetchScheduler {
        &self.scheduler
    }

    /// Region at `block` on `page`, in current reading order.
    pub fn region(&self, page: usize, block: usize) -> Option<&TextRegion> {
        self.pages.get(page).and_then(|p| p.regions.get(block))
    }

    /// Switches the reading mode and re-sequences every analyzed page.
    ///
    /// Unanalyzed pages are sequenced with the new mode when their analysis
    /// lands. The playback position is left as is, so while playing the
    /// current block index may name a different region afterwards.
    pub fn set_mode(&mut self, mode: ReadingMode) {
        if mode == self.mode {
            return;
        }
        self.mode = mode;
        let mut resequenced = 0;
        for page in self.pages.iter_mut().filter(|p| p.analyzed) {
            page.regions = sequence(std::mem::take(&mut page.regions), mode);
            resequenced += 1;
        }
        log::info!("reading mode set to {} ({} page(s) re-sequenced)", mode, resequenced);
    }

    pub fn toggle_mode(&mut self) -> ReadingMode {
        self.set_mode(self.mode.toggled());
        self.mode
    }

    pub fn play(&mut self) -> bool {
        self.driver.play(&self.pages)
    }

    pub fn pause(&mut self) {
        self.driver.pause();
    }

    pub fn toggle_play(&mut self) -> bool {
        self.driver.toggle_play(&self.pages)
    }

    pub fn select_block(&mut self, page: usize, block: usize) -> bool {
        self.driver.select_block(&self.pages, page, block)
    }

    /// Jumps to a region the user clicked, using its reading position.
    pub fn select_region(&mut self, page: usize, region: &RegionId) -> bool {
        let Some(found) = self.pages.get(page).and_then(|p| p.region(region)) else {
            log::debug!("ignoring selection of unknown region {}", region);
            return false;
        };
        let block = found
            .order
            .map(|order| order.saturating_sub(1) as usize)
            .unwrap_or(0);
        self.driver.select_block(&self.pages, page, block)
    }

    pub fn focus_page(&mut self, page: usize) -> bool {
        self.driver.focus_page(&self.pages, page)
    }

    /// Issues analysis tickets for the look-ahead window at the current page.
    pub fn prefetch(&mut self) -> Vec<AnalysisTicket> {
        let current = self.driver.state().page_index;
        self.scheduler.plan(&self.pages, current)
    }

    /// Issues an analysis ticket for one page on the reader's request.
    pub fn request_analysis(&mut self, page: usize) -> Option<AnalysisTicket> {
        self.scheduler.request(&self.pages, page)
    }

    /// Applies a finished analysis. Returns true if the page became analyzed.
    pub fn apply_analysis(
        &mut self,
        page_id: &PageId,
        result: Result<Vec<RawRegion>, AnalysisError>,
    ) -> bool {
        self.scheduler
            .complete(&mut self.pages, self.mode, page_id, result)
    }

    pub fn step(&mut self) -> StepOutcome {
        self.driver.step(&self.pages)
    }

    pub fn narration_finished(
        &mut self,
        region: &RegionId,
        outcome: Result<(), NarrationError>,
    ) -> bool {
        self.driver.narration_finished(region, outcome)
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = self.driver.state();
        Snapshot {
            mode: self.mode,
            page_index: state.page_index,
            block_index: state.block_index,
            playing: state.playing,
            active_region: state.active_region.clone(),
            pages: self
                .pages
                .iter()
                .map(|page| PageStatus {
                    id: page.id.clone(),
                    analyzed: page.analyzed,
                    analyzing: self.scheduler.is_in_flight(&page.id),
                    regions: page.regions.len(),
                })
                .collect(),
        }
    }
}
