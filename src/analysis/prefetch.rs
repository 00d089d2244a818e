//! Look-ahead scheduling of page analysis.
//!
//! The scheduler keeps the pages at and just after the reading position
//! analyzed, so narration rarely waits on the analysis collaborator. It does
//! not run analyses itself: [`PrefetchScheduler::plan`] hands out
//! [`AnalysisTicket`]s and [`PrefetchScheduler::complete`] applies their
//! results. The in-flight set guards against two tickets for the same page.

use std::collections::HashSet;

use super::{into_regions, AnalysisError};
use crate::page::{ImageRef, Page, PageId, RawRegion, ReadingMode};
use crate::sequence::sequence;

/// Number of pages, starting at the current one, kept analyzed ahead of playback.
pub const PREFETCH_WINDOW: usize = 3;

/// A work order for analyzing one page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalysisTicket {
    pub page_index: usize,
    pub page_id: PageId,
    pub image: ImageRef,
}

/// Tracks which pages are being analyzed and applies finished analyses.
#[derive(Clone, Debug)]
pub struct PrefetchScheduler {
    in_flight: HashSet<PageId>,
    window: usize,
}

impl Default for PrefetchScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl PrefetchScheduler {
    pub fn new() -> Self {
        Self::with_window(PREFETCH_WINDOW)
    }

    pub fn with_window(window: usize) -> Self {
        Self {
            in_flight: HashSet::new(),
            window,
        }
    }

    /// Issues tickets for the unanalyzed, idle pages in the window at `current`.
    pub fn plan(&mut self, pages: &[Page], current: usize) -> Vec<AnalysisTicket> {
        let end = current.saturating_add(self.window).min(pages.len());
        (current..end)
            .filter_map(|index| self.request(pages, index))
            .collect()
    }

    /// Issues a ticket for one page, unless it is analyzed or already in flight.
    pub fn request(&mut self, pages: &[Page], index: usize) -> Option<AnalysisTicket> {
        let page = pages.get(index)?;
        if page.analyzed || self.in_flight.contains(&page.id) {
            return None;
        }
        self.in_flight.insert(page.id.clone());
        log::debug!("requesting analysis of page {} ({})", index, page.id);
        Some(AnalysisTicket {
            page_index: index,
            page_id: page.id.clone(),
            image: page.image.clone(),
        })
    }

    /// Applies an analysis result and clears the page's in-flight mark.
    ///
    /// On success the page's regions are replaced in one assignment with the
    /// sequencer's output for `mode` and the page becomes analyzed. Failures
    /// are logged and leave the page unanalyzed so a later pass can retry.
    /// Returns true if the page was updated.
    pub fn complete(
        &mut self,
        pages: &mut [Page],
        mode: ReadingMode,
        page_id: &PageId,
        result: Result<Vec<RawRegion>, AnalysisError>,
    ) -> bool {
        self.in_flight.remove(page_id);

        let Some(page) = pages.iter_mut().find(|p| &p.id == page_id) else {
            log::warn!("dropping analysis for unknown page {}", page_id);
            return false;
        };

        match result.and_then(|raw| into_regions(page_id, raw)) {
            Ok(regions) => {
                log::info!("page {} analyzed: {} region(s)", page_id, regions.len());
                page.regions = sequence(regions, mode);
                page.analyzed = true;
                true
            }
            Err(err) => {
                log::warn!("analysis failed for page {}: {}", page_id, err);
                false
            }
        }
    }

    pub fn is_in_flight(&self, page_id: &PageId) -> bool {
        self.in_flight.contains(page_id)
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }
}
