//! Panel 4 — Help: keyboard shortcuts and documentation.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, _app: &AppState) {
    let mut lines: Vec<Line> = Vec::new();

    section(&mut lines, "Global Navigation");
    key(&mut lines, "1-4", "Switch to panel by number");
    key(&mut lines, "Tab / Shift+Tab", "Cycle panels forward / back");
    key(&mut lines, "q", "Quit");
    lines.push(Line::from(""));

    section(&mut lines, "Panels 1 & 2 — Crypto / Stocks");
    key(&mut lines, "j / k", "Move cursor down / up");
    key(&mut lines, "h / l", "Previous / next page");
    key(&mut lines, "/", "Filter by name or symbol (Esc clears)");
    key(&mut lines, "s", "Cycle sort column");
    key(&mut lines, "x", "Flip sort direction");
    key(&mut lines, "z", "Cycle page size (5 / 10 / 20 / 50)");
    key(&mut lines, "r", "Refresh market data");
    key(&mut lines, "Enter", "Open asset detail");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 3 — Detail");
    key(&mut lines, "t", "Cycle chart time range");
    key(&mut lines, "r", "Refetch profile and series");
    key(&mut lines, "Esc / Backspace", "Return to the originating panel");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 4 — Help (this panel)");
    key(&mut lines, "e", "Open error history overlay");
    lines.push(Line::from(""));

    section(&mut lines, "Data Sources");
    key(&mut lines, "Crypto", "CoinGecko public API");
    key(&mut lines, "Stocks", "Financial Modeling Prep + Alpha Vantage");
    key(&mut lines, "Offline", "Deterministic sample data, flagged in orange");

    let para = Paragraph::new(lines);
    f.render_widget(para, area);
}

fn section<'a>(lines: &mut Vec<Line<'a>>, title: &str) {
    lines.push(Line::from(Span::styled(title.to_string(), theme::accent_bold())));
}

fn key<'a>(lines: &mut Vec<Line<'a>>, keys: &str, desc: &str) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {:>20}  ", keys), theme::accent()),
        Span::styled(desc.to_string(), theme::muted()),
    ]));
}
