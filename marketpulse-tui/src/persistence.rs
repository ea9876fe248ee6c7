//! App state persistence — JSON save/load across restarts.

use std::path::Path;

use serde::{Deserialize, Serialize};

use marketpulse_core::model::{AssetClass, TimeRange};

use crate::app::Panel;

/// Serializable subset of app state that persists across restarts.
///
/// Only view preferences are saved; market data is always refetched.
#[derive(Debug, Serialize, Deserialize)]
pub struct PersistedState {
    pub active_panel: Panel,
    pub crypto_page_size: usize,
    pub stocks_page_size: usize,
    pub crypto_range: TimeRange,
    pub stocks_range: TimeRange,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            active_panel: Panel::Crypto,
            crypto_page_size: 10,
            stocks_page_size: 10,
            crypto_range: TimeRange::default_for(AssetClass::Crypto),
            stocks_range: TimeRange::default_for(AssetClass::Equity),
        }
    }
}

/// Load persisted state from disk. Returns defaults if file is missing or corrupt.
pub fn load(path: &Path) -> PersistedState {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
        Err(_) => PersistedState::default(),
    }
}

/// Save persisted state to disk. Creates parent directories if needed.
pub fn save(path: &Path, state: &PersistedState) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Extract persisted state from AppState.
pub fn extract(app: &crate::app::AppState) -> PersistedState {
    PersistedState {
        // The detail panel is transient; land on its origin instead.
        active_panel: match app.active_panel {
            Panel::Detail => app.detail.return_panel,
            other => other,
        },
        crypto_page_size: app.crypto.table.pager.page_size(),
        stocks_page_size: app.stocks.table.pager.page_size(),
        crypto_range: app.crypto_range_pref,
        stocks_range: app.stocks_range_pref,
    }
}

/// Apply persisted state to AppState.
pub fn apply(app: &mut crate::app::AppState, state: PersistedState) {
    app.active_panel = match state.active_panel {
        Panel::Detail => Panel::Crypto,
        other => other,
    };
    app.crypto.table.set_page_size(state.crypto_page_size);
    app.stocks.table.set_page_size(state.stocks_page_size);
    app.crypto_range_pref = state.crypto_range;
    app.stocks_range_pref = state.stocks_range;
}
