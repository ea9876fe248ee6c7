//! Keyboard input dispatch — global keys → overlays → panel-specific handlers.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use marketpulse_core::table::SortKey;

use crate::app::{AppState, DetailView, Overlay, Panel};

const SORT_CYCLE: &[SortKey] = &[
    SortKey::Name,
    SortKey::Symbol,
    SortKey::Price,
    SortKey::ChangePct,
    SortKey::MarketCap,
    SortKey::Volume,
];

/// Handle a key event.
pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    // 1. Overlays consume input first.
    if app.overlay == Overlay::ErrorHistory {
        handle_error_overlay(app, key);
        return;
    }

    // 2. An active search line captures everything except its exit keys.
    if let Some(panel) = app.active_list_mut() {
        if panel.search_active {
            handle_search_input(app, key);
            return;
        }
    }

    // 3. Global keys.
    match key.code {
        KeyCode::Char('q') => {
            app.running = false;
            return;
        }
        KeyCode::Char('1') => { app.active_panel = Panel::Crypto; return; }
        KeyCode::Char('2') => { app.active_panel = Panel::Stocks; return; }
        KeyCode::Char('3') => { app.active_panel = Panel::Detail; return; }
        KeyCode::Char('4') => { app.active_panel = Panel::Help; return; }
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.active_panel = app.active_panel.prev();
            } else {
                app.active_panel = app.active_panel.next();
            }
            return;
        }
        KeyCode::BackTab => {
            app.active_panel = app.active_panel.prev();
            return;
        }
        _ => {}
    }

    // 4. Panel-specific keys.
    match app.active_panel {
        Panel::Crypto | Panel::Stocks => handle_list_key(app, key),
        Panel::Detail => handle_detail_key(app, key),
        Panel::Help => handle_help_key(app, key),
    }
}

fn handle_error_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('e') => {
            app.overlay = Overlay::None;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if app.error_scroll + 1 < app.error_history.len() {
                app.error_scroll += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.error_scroll = app.error_scroll.saturating_sub(1);
        }
        _ => {}
    }
}

/// Live filter: every keystroke re-applies the query.
fn handle_search_input(app: &mut AppState, key: KeyEvent) {
    let Some(panel) = app.active_list_mut() else {
        return;
    };
    match key.code {
        KeyCode::Esc => {
            panel.search_active = false;
            panel.table.set_query("");
            panel.cursor = 0;
        }
        KeyCode::Enter => {
            panel.search_active = false;
        }
        KeyCode::Backspace => {
            let mut query = panel.table.query().to_string();
            query.pop();
            panel.table.set_query(query);
            panel.cursor = 0;
        }
        KeyCode::Char(c) => {
            let mut query = panel.table.query().to_string();
            query.push(c);
            panel.table.set_query(query);
            panel.cursor = 0;
        }
        _ => {}
    }
}

fn handle_list_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if let Some(panel) = app.active_list_mut() {
                let len = panel.table.page_items().len();
                if len > 0 && panel.cursor + 1 < len {
                    panel.cursor += 1;
                }
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            if let Some(panel) = app.active_list_mut() {
                panel.cursor = panel.cursor.saturating_sub(1);
            }
        }
        KeyCode::Char('h') | KeyCode::Left => {
            if let Some(panel) = app.active_list_mut() {
                panel.table.pager.prev_page();
                panel.cursor = 0;
            }
        }
        KeyCode::Char('l') | KeyCode::Right => {
            if let Some(panel) = app.active_list_mut() {
                panel.table.pager.next_page();
                panel.cursor = 0;
            }
        }
        KeyCode::Char('/') => {
            if let Some(panel) = app.active_list_mut() {
                panel.search_active = true;
            }
        }
        KeyCode::Char('s') => {
            // Advance to the next sort column (ascending).
            if let Some(panel) = app.active_list_mut() {
                let next = match panel.table.sort() {
                    None => SORT_CYCLE[0],
                    Some(d) => {
                        let idx = SORT_CYCLE.iter().position(|k| *k == d.key).unwrap_or(0);
                        SORT_CYCLE[(idx + 1) % SORT_CYCLE.len()]
                    }
                };
                panel.table.request_sort(next);
                panel.cursor = 0;
            }
        }
        KeyCode::Char('x') => {
            // Flip the active sort direction.
            if let Some(panel) = app.active_list_mut() {
                if let Some(directive) = panel.table.sort() {
                    panel.table.request_sort(directive.key);
                    panel.cursor = 0;
                }
            }
        }
        KeyCode::Char('z') => {
            if let Some(panel) = app.active_list_mut() {
                panel.table.cycle_page_size();
                panel.cursor = 0;
            }
        }
        KeyCode::Char('r') => {
            let class = match app.active_panel {
                Panel::Crypto => marketpulse_core::model::AssetClass::Crypto,
                Panel::Stocks => marketpulse_core::model::AssetClass::Equity,
                _ => return,
            };
            app.request_listings(class);
            app.set_status("Refreshing...");
        }
        KeyCode::Enter => {
            let target = app
                .active_list_mut()
                .and_then(|panel| panel.cursor_record().map(|r| (panel.class, r.id.clone())));
            if let Some((class, id)) = target {
                app.open_detail(class, id);
            }
        }
        _ => {}
    }
}

fn handle_detail_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Backspace => {
            app.active_panel = app.detail.return_panel;
        }
        KeyCode::Char('t') => {
            // Only cycle ranges once there is something on screen.
            if matches!(app.detail.view, DetailView::Ready { .. }) {
                let next = app.detail.range.next_for(app.detail.class);
                app.set_detail_range(next);
            }
        }
        KeyCode::Char('r') => {
            if !app.detail.id.is_empty() {
                let class = app.detail.class;
                let id = app.detail.id.clone();
                app.active_panel = app.detail.return_panel;
                app.open_detail(class, id);
            }
        }
        _ => {}
    }
}

fn handle_help_key(app: &mut AppState, key: KeyEvent) {
    if let KeyCode::Char('e') = key.code {
        app.overlay = Overlay::ErrorHistory;
        app.error_scroll = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppState;
    use crossterm::event::{KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
    use marketpulse_core::model::{AssetClass, ListingRecord};
    use std::sync::mpsc;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn app_with_records(n: usize) -> AppState {
        let (tx, _cmd_rx) = mpsc::channel();
        let (_resp_tx, rx) = mpsc::channel();
        let mut app = AppState::new(tx, rx);
        let records: Vec<ListingRecord> = (0..n)
            .map(|i| ListingRecord {
                id: format!("coin-{i}"),
                name: format!("Coin {i}"),
                symbol: format!("C{i}"),
                price: i as f64 + 1.0,
                change_pct_24h: 0.0,
                market_cap: None,
                volume: 0.0,
            })
            .collect();
        app.crypto.table.set_records(records);
        app
    }

    #[test]
    fn quit_key_stops_the_loop() {
        let mut app = app_with_records(0);
        handle_key(&mut app, press(KeyCode::Char('q')));
        assert!(!app.running);
    }

    #[test]
    fn tab_cycles_panels() {
        let mut app = app_with_records(0);
        handle_key(&mut app, press(KeyCode::Tab));
        assert_eq!(app.active_panel, Panel::Stocks);
        handle_key(&mut app, press(KeyCode::BackTab));
        assert_eq!(app.active_panel, Panel::Crypto);
    }

    #[test]
    fn search_types_into_the_query() {
        let mut app = app_with_records(25);
        handle_key(&mut app, press(KeyCode::Char('/')));
        assert!(app.crypto.search_active);
        handle_key(&mut app, press(KeyCode::Char('c')));
        handle_key(&mut app, press(KeyCode::Char('o')));
        assert_eq!(app.crypto.table.query(), "co");
        handle_key(&mut app, press(KeyCode::Enter));
        assert!(!app.crypto.search_active);
        assert_eq!(app.crypto.table.query(), "co");
    }

    #[test]
    fn escape_clears_the_search() {
        let mut app = app_with_records(25);
        handle_key(&mut app, press(KeyCode::Char('/')));
        handle_key(&mut app, press(KeyCode::Char('c')));
        handle_key(&mut app, press(KeyCode::Esc));
        assert!(!app.crypto.search_active);
        assert_eq!(app.crypto.table.query(), "");
    }

    #[test]
    fn page_keys_move_the_window() {
        let mut app = app_with_records(25);
        assert_eq!(app.crypto.table.pager.total_pages(), 3);
        handle_key(&mut app, press(KeyCode::Char('l')));
        assert_eq!(app.crypto.table.pager.current_page(), 2);
        handle_key(&mut app, press(KeyCode::Char('h')));
        assert_eq!(app.crypto.table.pager.current_page(), 1);
    }

    #[test]
    fn sort_key_cycles_and_x_flips() {
        use marketpulse_core::table::SortDirection;

        let mut app = app_with_records(5);
        handle_key(&mut app, press(KeyCode::Char('s')));
        let d = app.crypto.table.sort().unwrap();
        assert_eq!(d.key, SortKey::Name);
        assert_eq!(d.direction, SortDirection::Ascending);

        handle_key(&mut app, press(KeyCode::Char('x')));
        let d = app.crypto.table.sort().unwrap();
        assert_eq!(d.key, SortKey::Name);
        assert_eq!(d.direction, SortDirection::Descending);
    }

    #[test]
    fn enter_opens_detail_for_cursor_row() {
        let mut app = app_with_records(5);
        handle_key(&mut app, press(KeyCode::Char('j')));
        handle_key(&mut app, press(KeyCode::Enter));
        assert_eq!(app.active_panel, Panel::Detail);
        assert_eq!(app.detail.id, "coin-1");
        assert_eq!(app.detail.class, AssetClass::Crypto);
    }

    #[test]
    fn escape_returns_from_detail() {
        let mut app = app_with_records(5);
        handle_key(&mut app, press(KeyCode::Enter));
        assert_eq!(app.active_panel, Panel::Detail);
        handle_key(&mut app, press(KeyCode::Esc));
        assert_eq!(app.active_panel, Panel::Crypto);
    }
}
