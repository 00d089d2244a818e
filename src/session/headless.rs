//! Runs a session to the end without a UI.
//!
//! The loop thread owns the session. Analysis tickets run on worker threads
//! that only call the [`Analyzer`] and send the result back over a channel;
//! pages, the in-flight set and the playback state are touched only by the
//! loop thread. Narration is assumed blocking: when `speak` returns, the
//! utterance is over and its completion is reported immediately.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::{NarrationEntry, ReadReport, ReaderSession};
use crate::analysis::{AnalysisError, AnalysisTicket, Analyzer};
use crate::error::ComicastError;
use crate::page::{PageId, RawRegion};
use crate::playback::{clean_text, Narrator, StepOutcome, POLL_INTERVAL};

/// Options for a headless run.
#[derive(Clone, Debug)]
pub struct HeadlessOptions {
    /// Page to start reading from (0-based).
    pub start_page: usize,
    /// Block to start reading from on the start page (0-based).
    pub start_block: usize,
    /// Extra analysis attempts for a page playback is waiting on.
    pub analysis_retries: u32,
    /// How long to wait for an analysis before stepping again.
    pub poll_interval: Duration,
}

impl Default for HeadlessOptions {
    fn default() -> Self {
        Self {
            start_page: 0,
            start_block: 0,
            analysis_retries: 2,
            poll_interval: POLL_INTERVAL,
        }
    }
}

struct AnalysisDone {
    page_id: PageId,
    result: Result<Vec<RawRegion>, AnalysisError>,
}

/// Plays `session` from the requested position to the end of the last page.
///
/// # Errors
/// Returns [`ComicastError::AnalysisStalled`] if playback waits on a page
/// whose analysis keeps failing.
pub fn run_headless<N: Narrator>(
    session: &mut ReaderSession<N>,
    analyzer: Arc<dyn Analyzer>,
    options: &HeadlessOptions,
) -> Result<ReadReport, ComicastError> {
    let (tx, rx) = mpsc::channel();
    let mut report = ReadReport::new(session.mode());
    let mut retries: HashMap<PageId, u32> = HashMap::new();

    if options.start_page > 0 && !session.focus_page(options.start_page) {
        log::warn!(
            "start page {} is out of range; starting at the first page",
            options.start_page + 1
        );
    }
    let mut pending_seek = (options.start_block > 0).then_some(options.start_block);

    spawn_analyses(session.prefetch(), &analyzer, &tx);
    if !session.play() {
        report.final_state = Some(session.snapshot());
        return Ok(report);
    }

    loop {
        while let Ok(done) = rx.try_recv() {
            apply(session, &mut report, done);
        }

        if let Some(block) = pending_seek {
            let page = session.playback().page_index;
            if session.pages()[page].analyzed {
                if !session.select_block(page, block) {
                    log::warn!("start block {} not found on page {}", block + 1, page + 1);
                }
                pending_seek = None;
            }
        }

        match session.step() {
            StepOutcome::Idle | StepOutcome::Finished => break,
            StepOutcome::PageAdvanced { page } => {
                log::debug!("now on page {}", page + 1);
                spawn_analyses(session.prefetch(), &analyzer, &tx);
            }
            StepOutcome::Dispatched {
                page,
                block,
                region,
            } => {
                if let Some(entry) = narration_entry(session, page, block) {
                    report.entries.push(entry);
                }
                session.narration_finished(&region, Ok(()));
            }
            StepOutcome::Speaking { region } => {
                session.narration_finished(&region, Ok(()));
            }
            StepOutcome::WaitingForAnalysis { page } => {
                let page_id = session.pages()[page].id.clone();
                if !session.scheduler().is_in_flight(&page_id) {
                    let attempts = retries.entry(page_id.clone()).or_insert(0);
                    if *attempts >= options.analysis_retries {
                        return Err(ComicastError::AnalysisStalled {
                            page: page_id,
                            attempts: *attempts + 1,
                        });
                    }
                    *attempts += 1;
                    log::warn!("retrying analysis of page {} (attempt {})", page_id, *attempts + 1);
                    if let Some(ticket) = session.request_analysis(page) {
                        spawn_analyses(vec![ticket], &analyzer, &tx);
                    }
                }
                wait_for_analysis(session, &mut report, &rx, options.poll_interval);
            }
        }
    }

    report.final_state = Some(session.snapshot());
    Ok(report)
}

fn spawn_analyses(
    tickets: Vec<AnalysisTicket>,
    analyzer: &Arc<dyn Analyzer>,
    tx: &Sender<AnalysisDone>,
) {
    for ticket in tickets {
        let analyzer = Arc::clone(analyzer);
        let tx = tx.clone();
        thread::spawn(move || {
            let result = analyzer.analyze(&ticket.page_id, &ticket.image);
            // The loop may have finished already; a dropped receiver is fine.
            let _ = tx.send(AnalysisDone {
                page_id: ticket.page_id,
                result,
            });
        });
    }
}

fn wait_for_analysis<N: Narrator>(
    session: &mut ReaderSession<N>,
    report: &mut ReadReport,
    rx: &Receiver<AnalysisDone>,
    timeout: Duration,
) {
    match rx.recv_timeout(timeout) {
        Ok(done) => apply(session, report, done),
        Err(RecvTimeoutError::Timeout) => log::trace!("still waiting for analysis"),
        Err(RecvTimeoutError::Disconnected) => {}
    }
}

fn apply<N: Narrator>(session: &mut ReaderSession<N>, report: &mut ReadReport, done: AnalysisDone) {
    if session.apply_analysis(&done.page_id, done.result) {
        report.pages_analyzed += 1;
    } else {
        report.analysis_failures += 1;
    }
}

fn narration_entry<N: Narrator>(
    session: &ReaderSession<N>,
    page: usize,
    block: usize,
) -> Option<NarrationEntry> {
    let region = session.region(page, block)?;
    let text = clean_text(&region.text);
    if text.is_empty() {
        return None;
    }
    Some(NarrationEntry {
        page_index: page,
        page_id: session.pages()[page].id.clone(),
        order: region.order.unwrap_or(block as u32 + 1),
        region_id: region.id.clone(),
        text,
    })
}
