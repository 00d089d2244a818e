//! Transcript of a headless reading run.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use super::Snapshot;
use crate::page::{PageId, ReadingMode, RegionId};

/// One narrated region.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NarrationEntry {
    pub page_index: usize,
    pub page_id: PageId,
    pub order: u32,
    pub region_id: RegionId,
    pub text: String,
}

/// Everything narrated during a run, in narration order.
#[derive(Clone, Debug, Serialize)]
pub struct ReadReport {
    pub mode: ReadingMode,
    pub entries: Vec<NarrationEntry>,
    pub pages_analyzed: usize,
    pub analysis_failures: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_state: Option<Snapshot>,
}

impl ReadReport {
    pub fn new(mode: ReadingMode) -> Self {
        Self {
            mode,
            entries: Vec::new(),
            pages_analyzed: 0,
            analysis_failures: 0,
            final_state: None,
        }
    }

    /// Number of distinct pages with at least one narrated region.
    pub fn pages_read(&self) -> usize {
        self.entries
            .iter()
            .map(|e| e.page_index)
            .collect::<BTreeSet<_>>()
            .len()
    }
}

impl fmt::Display for ReadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Read {} block(s) across {} page(s) in {} mode",
            self.entries.len(),
            self.pages_read(),
            self.mode
        )?;
        if self.analysis_failures > 0 {
            writeln!(f, "{} analysis attempt(s) failed", self.analysis_failures)?;
        }

        let mut current_page = None;
        for entry in &self.entries {
            if current_page != Some(entry.page_index) {
                writeln!(f)?;
                writeln!(f, "[page {}: {}]", entry.page_index + 1, entry.page_id)?;
                current_page = Some(entry.page_index);
            }
            writeln!(f, "  {}. {}", entry.order, entry.text)?;
        }

        Ok(())
    }
}
