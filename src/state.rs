use std::collections::VecDeque;

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::ordering::SortState;
use crate::render::RenderPlan;
use crate::standings::{build_snapshot, render_snapshot, StandingsSnapshot};

const MAX_LOGS: usize = 200;

/// Single owner of everything the dashboard shows. Fetch results and header
/// clicks both land here; neither resets the other.
#[derive(Debug, Clone)]
pub struct AppState {
    pub sort: SortState,
    pub snapshot: Option<StandingsSnapshot>,
    pub plan: RenderPlan,
    /// Highest fetch sequence number handed out by [`AppState::tick`].
    pub issued_seq: u64,
    pub applied_seq: Option<u64>,
    pub updated_at: Option<DateTime<Local>>,
    pub scroll: u16,
    pub help_overlay: bool,
    pub logs: VecDeque<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            sort: SortState::automatic(),
            snapshot: None,
            plan: RenderPlan::default(),
            issued_seq: 0,
            applied_seq: None,
            updated_at: None,
            scroll: 0,
            help_overlay: false,
            logs: VecDeque::new(),
        }
    }

    /// Issues the next fetch. From here on only the response carrying the
    /// returned sequence number is applied; older in-flight ones are dropped.
    pub fn tick(&mut self) -> ProviderCommand {
        self.issued_seq += 1;
        debug!(seq = self.issued_seq, "fetch issued");
        ProviderCommand::FetchFeed {
            seq: self.issued_seq,
        }
    }

    pub fn click_header(&mut self, column: usize) {
        let next = self.sort.apply_click(column);
        if next == self.sort {
            return;
        }
        self.sort = next;
        info!(sort = %self.sort.label(), "sort changed");
        self.push_log(format!("[INFO] Sort: {}", self.sort.label()));
        self.rerender();
    }

    /// Rebuilds the plan from the current snapshot. Without a snapshot the
    /// plan is left as is.
    pub fn rerender(&mut self) {
        if let Some(snapshot) = &self.snapshot {
            self.plan = render_snapshot(snapshot, &self.sort);
        }
    }

    pub fn apply_feed(&mut self, seq: u64, text: &str) {
        if seq != self.issued_seq {
            debug!(seq, latest = self.issued_seq, "stale feed discarded");
            self.push_log(format!(
                "[INFO] Discarded stale feed #{seq} (latest #{})",
                self.issued_seq
            ));
            return;
        }

        match build_snapshot(text) {
            Ok(snapshot) => {
                debug!(
                    seq,
                    rows = snapshot.len(),
                    dropped = snapshot.dropped_rows,
                    filtered = snapshot.filtered_rows,
                    "feed applied"
                );
                self.snapshot = Some(snapshot);
                self.applied_seq = Some(seq);
                self.updated_at = Some(Local::now());
                self.rerender();
                self.clamp_scroll();
            }
            Err(err) => warn!(seq, error = %err, "feed rejected"),
        }
    }

    /// Failed fetches only reach the diagnostic log; the view keeps showing
    /// the last good render.
    pub fn fetch_failed(&self, seq: u64, error: &str) {
        warn!(seq, error, "feed fetch failed");
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn scroll_down(&mut self) {
        let max = self.max_scroll();
        if self.scroll < max {
            self.scroll += 1;
        }
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    fn clamp_scroll(&mut self) {
        self.scroll = self.scroll.min(self.max_scroll());
    }

    fn max_scroll(&self) -> u16 {
        self.plan.entries.len().saturating_sub(1).min(u16::MAX as usize) as u16
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delta {
    FeedLoaded { seq: u64, text: String },
    FeedFailed { seq: u64, error: String },
    Log(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderCommand {
    FetchFeed { seq: u64 },
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::FeedLoaded { seq, text } => state.apply_feed(seq, &text),
        Delta::FeedFailed { seq, error } => state.fetch_failed(seq, &error),
        Delta::Log(msg) => state.push_log(msg),
    }
}
