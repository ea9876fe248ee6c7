//! MarketPulse TUI — four-panel terminal market dashboard.
//!
//! Panels:
//! 1. Crypto — top cryptocurrencies by market cap (CoinGecko)
//! 2. Stocks — watchlist equities (FMP / Alpha Vantage)
//! 3. Detail — asset profile with a historical price chart
//! 4. Help — keyboard shortcuts and documentation

mod app;
mod input;
mod persistence;
mod theme;
mod ui;
mod worker;

use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use marketpulse_core::fallback::DetailOutcome;
use marketpulse_core::model::{AssetClass, RecordSource};
use marketpulse_core::watchlist::Watchlist;

use crate::app::{AppState, DetailView, ErrorCategory, SeriesView};
use crate::worker::{WorkerCommand, WorkerResponse};

fn main() -> Result<()> {
    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    // Paths
    let config_dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("marketpulse");
    let state_path = config_dir.join("state.json");
    let watchlist_path = config_dir.join("watchlist.toml");

    // Watchlist: optional user config, falling back to the built-in universe.
    let watchlist = if watchlist_path.exists() {
        match Watchlist::from_file(&watchlist_path) {
            Ok(w) => w,
            Err(err) => {
                eprintln!("warning: {err}; using the default watchlist");
                Watchlist::default_universe()
            }
        }
    } else {
        Watchlist::default_universe()
    };

    // Load persisted state
    let persisted = persistence::load(&state_path);

    // Worker channels
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();

    // Spawn worker
    let worker_handle = worker::spawn_worker(cmd_rx, resp_tx, watchlist);

    // Build app state
    let mut app = AppState::new(cmd_tx.clone(), resp_rx);

    // Apply persisted state
    persistence::apply(&mut app, persisted);

    // Kick off the initial fetches
    app.request_listings(AssetClass::Crypto);
    app.request_listings(AssetClass::Equity);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run the main event loop
    let result = run_app(&mut terminal, &mut app);

    // Save state before exit
    let persisted = persistence::extract(&app);
    let _ = persistence::save(&state_path, &persisted);

    // Shutdown worker
    let _ = cmd_tx.send(WorkerCommand::Shutdown);
    let _ = worker_handle.join();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    loop {
        // 1. Render
        terminal.draw(|f| ui::draw(f, app))?;

        // 2. Drain worker responses (non-blocking)
        while let Ok(resp) = app.worker_rx.try_recv() {
            handle_worker_response(app, resp);
        }

        // 3. Poll for input events (50ms timeout for ~20 FPS tick)
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }

        // 4. Check quit
        if !app.running {
            break;
        }
    }
    Ok(())
}

fn handle_worker_response(app: &mut AppState, resp: WorkerResponse) {
    match resp {
        WorkerResponse::Listings { class, records } => {
            let advisory = records.advisory.clone();
            let source = records.source;

            let panel = app.list_panel_mut(class);
            panel.loading = false;
            panel.source = source;
            panel.advisory = advisory.clone();
            panel.last_updated = Some(Local::now());
            panel.table.set_records(records.value);
            panel.clamp_cursor();

            match source {
                RecordSource::Live => {
                    app.set_status(format!("{} refreshed", class.label()));
                }
                RecordSource::Synthetic => {
                    app.push_error(
                        ErrorCategory::Network,
                        advisory.unwrap_or_else(|| "Live data unavailable".into()),
                        class.label().to_string(),
                    );
                    app.set_warning(format!("{}: showing sample data", class.label()));
                }
            }
        }
        WorkerResponse::Detail { generation, outcome } => {
            // Stale response from a view the user has already left.
            if generation != app.detail.generation {
                return;
            }
            match outcome {
                DetailOutcome::Ready(record) => {
                    // A series answer may have arrived before the profile.
                    let series = app
                        .detail
                        .pending_series
                        .take()
                        .unwrap_or(SeriesView::Loading);
                    if let Some(advisory) = &record.advisory {
                        app.push_error(
                            ErrorCategory::Network,
                            advisory.clone(),
                            app.detail.id.clone(),
                        );
                    }
                    app.detail.view = DetailView::Ready { record, series };
                }
                DetailOutcome::NotFound { id } => {
                    app.detail.view = DetailView::NotFound { id };
                }
            }
        }
        WorkerResponse::History { generation, result } => {
            if generation != app.detail.generation {
                return;
            }
            let series = match result {
                Ok(degraded) => SeriesView::Ready(degraded),
                Err(message) => {
                    app.push_error(
                        ErrorCategory::Data,
                        message.clone(),
                        app.detail.id.clone(),
                    );
                    SeriesView::Failed(message)
                }
            };
            match &mut app.detail.view {
                DetailView::Ready { series: slot, .. } => *slot = series,
                // Profile still in flight; hold the series for its arrival.
                DetailView::Loading => app.detail.pending_series = Some(series),
                _ => {}
            }
        }
    }
}
