//! Background worker thread — all network fetches run here.
//!
//! Communication with the TUI main thread is via `mpsc` channels. The
//! worker owns both providers and the watchlist; fallback resolution
//! happens on this side, so responses always carry displayable data.
//! Detail and history responses echo the request generation so the main
//! thread can drop answers to requests it has since abandoned.

use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use marketpulse_core::fallback::{
    detail_or_fallback, history_or_fallback, listings_or_fallback, Degraded, DetailOutcome,
};
use marketpulse_core::model::{AssetClass, ListingRecord, PricePoint, TimeRange};
use marketpulse_core::providers::{
    CircuitBreaker, CoinGeckoProvider, EquityProvider, MarketProvider,
};
use marketpulse_core::watchlist::Watchlist;

/// Commands sent from the TUI to the worker.
#[derive(Debug)]
pub enum WorkerCommand {
    FetchListings {
        class: AssetClass,
    },
    FetchDetail {
        class: AssetClass,
        id: String,
        generation: u64,
    },
    FetchHistory {
        class: AssetClass,
        id: String,
        range: TimeRange,
        generation: u64,
    },
    Shutdown,
}

/// Responses sent from the worker back to the TUI.
#[derive(Debug, Clone)]
pub enum WorkerResponse {
    Listings {
        class: AssetClass,
        records: Degraded<Vec<ListingRecord>>,
    },
    Detail {
        generation: u64,
        outcome: DetailOutcome,
    },
    History {
        generation: u64,
        result: Result<Degraded<Vec<PricePoint>>, String>,
    },
}

/// Spawn the background worker thread.
pub fn spawn_worker(
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
    watchlist: Watchlist,
) -> JoinHandle<()> {
    thread::Builder::new()
        .name("marketpulse-worker".into())
        .spawn(move || {
            worker_loop(rx, tx, watchlist);
        })
        .expect("failed to spawn worker thread")
}

struct Worker {
    crypto: CoinGeckoProvider,
    equity: EquityProvider,
    watchlist: Watchlist,
}

impl Worker {
    fn new(watchlist: Watchlist) -> Self {
        let crypto = CoinGeckoProvider::new(Arc::new(CircuitBreaker::default_provider()));
        let equity = EquityProvider::new(
            Arc::new(CircuitBreaker::default_provider()),
            watchlist.equities.clone(),
        );
        Self {
            crypto,
            equity,
            watchlist,
        }
    }

    fn provider(&self, class: AssetClass) -> &dyn MarketProvider {
        match class {
            AssetClass::Crypto => &self.crypto,
            AssetClass::Equity => &self.equity,
        }
    }
}

fn worker_loop(rx: Receiver<WorkerCommand>, tx: Sender<WorkerResponse>, watchlist: Watchlist) {
    let worker = Worker::new(watchlist);

    loop {
        match rx.recv() {
            Ok(WorkerCommand::Shutdown) | Err(_) => break,
            Ok(cmd) => handle_command(&worker, cmd, &tx),
        }
    }
}

fn handle_command(worker: &Worker, cmd: WorkerCommand, tx: &Sender<WorkerResponse>) {
    match cmd {
        WorkerCommand::FetchListings { class } => {
            let records = listings_or_fallback(worker.provider(class), &worker.watchlist);
            let _ = tx.send(WorkerResponse::Listings { class, records });
        }
        WorkerCommand::FetchDetail {
            class,
            id,
            generation,
        } => {
            let outcome = detail_or_fallback(worker.provider(class), &worker.watchlist, &id);
            let _ = tx.send(WorkerResponse::Detail { generation, outcome });
        }
        WorkerCommand::FetchHistory {
            class,
            id,
            range,
            generation,
        } => {
            let result =
                history_or_fallback(worker.provider(class), &worker.watchlist, &id, range)
                    .map_err(|e| e.to_string());
            let _ = tx.send(WorkerResponse::History { generation, result });
        }
        WorkerCommand::Shutdown => {} // handled in loop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn worker_shutdown() {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, _resp_rx) = mpsc::channel();

        let handle = spawn_worker(cmd_rx, resp_tx, Watchlist::default_universe());
        cmd_tx.send(WorkerCommand::Shutdown).unwrap();
        handle.join().expect("worker should join cleanly");
    }

    #[test]
    fn worker_exits_when_sender_drops() {
        let (cmd_tx, cmd_rx) = mpsc::channel::<WorkerCommand>();
        let (resp_tx, _resp_rx) = mpsc::channel();

        let handle = spawn_worker(cmd_rx, resp_tx, Watchlist::default_universe());
        drop(cmd_tx);
        handle.join().expect("worker should join cleanly");
    }
}
