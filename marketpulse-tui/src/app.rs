//! Application state — single-owner, main-thread only.
//!
//! All TUI state lives here. The worker thread communicates via channels.
//! Detail and history requests carry a generation counter; responses with
//! a stale generation are dropped, so rapid navigation never lets an old
//! answer overwrite a newer view.

use std::collections::VecDeque;
use std::sync::mpsc::{Receiver, Sender};

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use marketpulse_core::fallback::Degraded;
use marketpulse_core::model::{
    AssetClass, DetailRecord, ListingRecord, PricePoint, RecordSource, TimeRange,
};
use marketpulse_core::table::TableState;

use crate::worker::WorkerCommand;

/// Which panel is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Panel {
    Crypto,
    Stocks,
    Detail,
    Help,
}

impl Panel {
    pub fn index(self) -> usize {
        match self {
            Panel::Crypto => 0,
            Panel::Stocks => 1,
            Panel::Detail => 2,
            Panel::Help => 3,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        match i {
            0 => Some(Panel::Crypto),
            1 => Some(Panel::Stocks),
            2 => Some(Panel::Detail),
            3 => Some(Panel::Help),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Panel::Crypto => "Crypto",
            Panel::Stocks => "Stocks",
            Panel::Detail => "Detail",
            Panel::Help => "Help",
        }
    }

    pub fn next(self) -> Panel {
        Panel::from_index((self.index() + 1) % 4).unwrap()
    }

    pub fn prev(self) -> Panel {
        Panel::from_index((self.index() + 3) % 4).unwrap()
    }
}

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// An error record for the error history overlay.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub timestamp: NaiveDateTime,
    pub category: ErrorCategory,
    pub message: String,
    pub context: String,
}

/// Error category for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Other,
}

impl ErrorCategory {
    pub fn label(self) -> &'static str {
        match self {
            ErrorCategory::Network => "NET",
            ErrorCategory::Data => "DATA",
            ErrorCategory::Other => "ERR",
        }
    }
}

/// One overview-table panel (crypto or stocks share this shape).
pub struct ListPanelState {
    pub class: AssetClass,
    pub table: TableState,
    /// Row cursor within the current page.
    pub cursor: usize,
    /// True while the query line is capturing keystrokes.
    pub search_active: bool,
    pub loading: bool,
    pub source: RecordSource,
    pub advisory: Option<String>,
    pub last_updated: Option<DateTime<Local>>,
}

impl ListPanelState {
    pub fn new(class: AssetClass) -> Self {
        Self {
            class,
            table: TableState::new(10),
            cursor: 0,
            search_active: false,
            loading: false,
            source: RecordSource::Live,
            advisory: None,
            last_updated: None,
        }
    }

    /// The record under the cursor, if the page has one.
    pub fn cursor_record(&self) -> Option<&ListingRecord> {
        self.table.page_items().get(self.cursor)
    }

    pub fn clamp_cursor(&mut self) {
        let len = self.table.page_items().len();
        if len == 0 {
            self.cursor = 0;
        } else if self.cursor >= len {
            self.cursor = len - 1;
        }
    }
}

/// How the price series part of the detail view is doing.
#[derive(Debug, Clone)]
pub enum SeriesView {
    Loading,
    Ready(Degraded<Vec<PricePoint>>),
    Failed(String),
}

/// Detail view lifecycle.
#[derive(Debug, Clone)]
pub enum DetailView {
    Idle,
    Loading,
    Ready {
        record: Degraded<DetailRecord>,
        series: SeriesView,
    },
    NotFound {
        id: String,
    },
    Error {
        message: String,
    },
}

/// Detail panel state: the view plus the request bookkeeping behind it.
pub struct DetailPanelState {
    pub view: DetailView,
    pub class: AssetClass,
    pub id: String,
    pub range: TimeRange,
    /// Panel to return to on Esc.
    pub return_panel: Panel,
    /// Generation of the most recent detail/history request.
    pub generation: u64,
    /// Series answer that arrived before its profile did.
    pub pending_series: Option<SeriesView>,
}

impl DetailPanelState {
    pub fn new() -> Self {
        Self {
            view: DetailView::Idle,
            class: AssetClass::Crypto,
            id: String::new(),
            range: TimeRange::default_for(AssetClass::Crypto),
            return_panel: Panel::Crypto,
            generation: 0,
            pending_series: None,
        }
    }
}

/// Which overlay (if any) is shown on top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    None,
    ErrorHistory,
}

/// Top-level application state.
pub struct AppState {
    pub active_panel: Panel,
    pub running: bool,

    pub crypto: ListPanelState,
    pub stocks: ListPanelState,
    pub detail: DetailPanelState,

    pub worker_tx: Sender<WorkerCommand>,
    pub worker_rx: Receiver<crate::worker::WorkerResponse>,

    /// Last-selected chart range per class, reused for new detail views.
    pub crypto_range_pref: TimeRange,
    pub stocks_range_pref: TimeRange,

    pub status_message: Option<(String, StatusLevel)>,
    pub error_history: VecDeque<ErrorRecord>,
    pub error_scroll: usize,
    pub overlay: Overlay,
}

impl AppState {
    pub fn new(
        worker_tx: Sender<WorkerCommand>,
        worker_rx: Receiver<crate::worker::WorkerResponse>,
    ) -> Self {
        Self {
            active_panel: Panel::Crypto,
            running: true,
            crypto: ListPanelState::new(AssetClass::Crypto),
            stocks: ListPanelState::new(AssetClass::Equity),
            detail: DetailPanelState::new(),
            worker_tx,
            worker_rx,
            crypto_range_pref: TimeRange::default_for(AssetClass::Crypto),
            stocks_range_pref: TimeRange::default_for(AssetClass::Equity),
            status_message: None,
            error_history: VecDeque::with_capacity(50),
            error_scroll: 0,
            overlay: Overlay::None,
        }
    }

    pub fn list_panel(&self, class: AssetClass) -> &ListPanelState {
        match class {
            AssetClass::Crypto => &self.crypto,
            AssetClass::Equity => &self.stocks,
        }
    }

    pub fn list_panel_mut(&mut self, class: AssetClass) -> &mut ListPanelState {
        match class {
            AssetClass::Crypto => &mut self.crypto,
            AssetClass::Equity => &mut self.stocks,
        }
    }

    /// The list panel behind the active panel, if it is one.
    pub fn active_list_mut(&mut self) -> Option<&mut ListPanelState> {
        match self.active_panel {
            Panel::Crypto => Some(&mut self.crypto),
            Panel::Stocks => Some(&mut self.stocks),
            _ => None,
        }
    }

    fn range_pref(&self, class: AssetClass) -> TimeRange {
        let pref = match class {
            AssetClass::Crypto => self.crypto_range_pref,
            AssetClass::Equity => self.stocks_range_pref,
        };
        if TimeRange::ranges_for(class).contains(&pref) {
            pref
        } else {
            TimeRange::default_for(class)
        }
    }

    /// Kick off a listings fetch for one asset class.
    pub fn request_listings(&mut self, class: AssetClass) {
        let panel = self.list_panel_mut(class);
        if panel.loading {
            return;
        }
        panel.loading = true;
        let _ = self.worker_tx.send(WorkerCommand::FetchListings { class });
    }

    /// Open the detail view for an asset and fetch its profile + series.
    pub fn open_detail(&mut self, class: AssetClass, id: String) {
        self.detail.generation += 1;
        self.detail.class = class;
        self.detail.id = id.clone();
        self.detail.range = self.range_pref(class);
        self.detail.return_panel = self.active_panel;
        self.detail.view = DetailView::Loading;
        self.detail.pending_series = None;
        self.active_panel = Panel::Detail;

        let generation = self.detail.generation;
        let sent = self
            .worker_tx
            .send(WorkerCommand::FetchDetail {
                class,
                id: id.clone(),
                generation,
            })
            .and_then(|_| {
                self.worker_tx.send(WorkerCommand::FetchHistory {
                    class,
                    id,
                    range: self.detail.range,
                    generation,
                })
            });
        // A failed send means the worker thread is gone; nothing will
        // ever answer this request.
        if sent.is_err() {
            self.detail.view = DetailView::Error {
                message: "Background worker is unavailable. Restart the app.".into(),
            };
        }
    }

    /// Switch the chart range; refetches the series only, keeping the
    /// profile on screen.
    pub fn set_detail_range(&mut self, range: TimeRange) {
        if range == self.detail.range {
            return;
        }
        self.detail.range = range;
        match self.detail.class {
            AssetClass::Crypto => self.crypto_range_pref = range,
            AssetClass::Equity => self.stocks_range_pref = range,
        }
        if let DetailView::Ready { series, .. } = &mut self.detail.view {
            *series = SeriesView::Loading;
        }
        self.detail.generation += 1;
        let _ = self.worker_tx.send(WorkerCommand::FetchHistory {
            class: self.detail.class,
            id: self.detail.id.clone(),
            range,
            generation: self.detail.generation,
        });
    }

    /// Push an error to the history, capping at 50.
    pub fn push_error(&mut self, category: ErrorCategory, message: String, context: String) {
        let record = ErrorRecord {
            timestamp: Local::now().naive_local(),
            category,
            message: message.clone(),
            context,
        };
        self.error_history.push_front(record);
        if self.error_history.len() > 50 {
            self.error_history.pop_back();
        }
        self.status_message = Some((message, StatusLevel::Error));
    }

    /// Set an info status message.
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    /// Set a warning status message.
    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn app() -> (AppState, Receiver<WorkerCommand>) {
        let (tx, cmd_rx) = mpsc::channel();
        let (_resp_tx, rx) = mpsc::channel();
        (AppState::new(tx, rx), cmd_rx)
    }

    #[test]
    fn panel_cycle() {
        assert_eq!(Panel::Crypto.next(), Panel::Stocks);
        assert_eq!(Panel::Help.next(), Panel::Crypto);
        assert_eq!(Panel::Crypto.prev(), Panel::Help);
        assert_eq!(Panel::Stocks.prev(), Panel::Crypto);
    }

    #[test]
    fn panel_from_index() {
        for i in 0..4 {
            let p = Panel::from_index(i).unwrap();
            assert_eq!(p.index(), i);
        }
        assert!(Panel::from_index(4).is_none());
    }

    #[test]
    fn error_history_caps_at_50() {
        let (mut app, _cmds) = app();
        for i in 0..60 {
            app.push_error(ErrorCategory::Other, format!("error {i}"), String::new());
        }
        assert_eq!(app.error_history.len(), 50);
        assert!(app.error_history[0].message.contains("59"));
    }

    #[test]
    fn open_detail_bumps_generation_and_sends_both_fetches() {
        let (mut app, cmds) = app();
        app.open_detail(AssetClass::Crypto, "bitcoin".into());

        assert_eq!(app.active_panel, Panel::Detail);
        assert!(matches!(app.detail.view, DetailView::Loading));
        assert_eq!(app.detail.generation, 1);

        match cmds.recv().unwrap() {
            WorkerCommand::FetchDetail { id, generation, .. } => {
                assert_eq!(id, "bitcoin");
                assert_eq!(generation, 1);
            }
            other => panic!("expected FetchDetail, got {other:?}"),
        }
        match cmds.recv().unwrap() {
            WorkerCommand::FetchHistory { range, generation, .. } => {
                assert_eq!(range, TimeRange::default_for(AssetClass::Crypto));
                assert_eq!(generation, 1);
            }
            other => panic!("expected FetchHistory, got {other:?}"),
        }
    }

    #[test]
    fn range_change_refetches_series_only() {
        let (mut app, cmds) = app();
        app.open_detail(AssetClass::Equity, "AAPL".into());
        let _ = cmds.recv();
        let _ = cmds.recv();

        app.set_detail_range(TimeRange::ThreeMonths);
        assert_eq!(app.detail.generation, 2);
        match cmds.recv().unwrap() {
            WorkerCommand::FetchHistory { range, generation, .. } => {
                assert_eq!(range, TimeRange::ThreeMonths);
                assert_eq!(generation, 2);
            }
            other => panic!("expected FetchHistory, got {other:?}"),
        }

        // Selecting the current range again is a no-op.
        app.set_detail_range(TimeRange::ThreeMonths);
        assert_eq!(app.detail.generation, 2);
    }

    #[test]
    fn dead_worker_surfaces_as_detail_error() {
        let (mut app, cmds) = app();
        drop(cmds);

        app.open_detail(AssetClass::Crypto, "bitcoin".into());
        assert!(matches!(app.detail.view, DetailView::Error { .. }));
    }

    #[test]
    fn cursor_clamps_to_page() {
        let mut panel = ListPanelState::new(AssetClass::Crypto);
        panel.cursor = 10;
        panel.clamp_cursor();
        assert_eq!(panel.cursor, 0);
    }
}
