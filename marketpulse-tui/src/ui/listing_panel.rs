//! Panels 1 and 2 — sortable, filterable, paginated market overview tables.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use marketpulse_core::model::{
    format_change_pct, format_market_cap, format_price, format_quantity, RecordSource,
};
use marketpulse_core::pager::PageLink;
use marketpulse_core::table::SortKey;

use crate::app::ListPanelState;
use crate::theme;

const COLUMNS: &[(SortKey, &str, usize)] = &[
    (SortKey::Symbol, "Symbol", 8),
    (SortKey::Name, "Name", 22),
    (SortKey::Price, "Price", 14),
    (SortKey::ChangePct, "24h Change", 11),
    (SortKey::MarketCap, "Market Cap", 12),
    (SortKey::Volume, "Volume", 12),
];

pub fn render(f: &mut Frame, area: Rect, panel: &ListPanelState) {
    let mut lines: Vec<Line> = Vec::new();

    header_line(&mut lines, panel);
    lines.push(Line::from(""));
    column_header(&mut lines, panel);

    let page = panel.table.page_items();
    if page.is_empty() {
        lines.push(Line::from(""));
        let msg = if panel.loading {
            "Loading market data..."
        } else if panel.table.query().is_empty() {
            "No records. Press r to refresh."
        } else {
            "No matches for the current filter."
        };
        lines.push(Line::from(Span::styled(msg, theme::muted())));
    } else {
        for (i, record) in page.iter().enumerate() {
            let is_cursor = i == panel.cursor;
            let style = if is_cursor {
                theme::accent().add_modifier(Modifier::REVERSED)
            } else {
                theme::secondary()
            };
            let change = if is_cursor {
                style
            } else {
                theme::change_style(record.change_pct_24h)
            };
            let cap = record
                .market_cap
                .map(format_market_cap)
                .unwrap_or_else(|| "—".to_string());

            lines.push(Line::from(vec![
                Span::styled(format!("{:<8} ", truncate(&record.symbol, 8)), style),
                Span::styled(format!("{:<22} ", truncate(&record.name, 22)), style),
                Span::styled(format!("{:>14} ", format_price(record.price)), style),
                Span::styled(
                    format!("{:>11} ", format_change_pct(record.change_pct_24h)),
                    change,
                ),
                Span::styled(format!("{:>12} ", cap), style),
                Span::styled(format!("{:>12}", format_quantity(record.volume)), style),
            ]));
        }
    }

    lines.push(Line::from(""));
    footer_line(&mut lines, panel);

    f.render_widget(Paragraph::new(lines), area);
}

fn header_line<'a>(lines: &mut Vec<Line<'a>>, panel: &ListPanelState) {
    let mut spans: Vec<Span> = Vec::new();

    if panel.search_active {
        spans.push(Span::styled("Filter: ", theme::accent_bold()));
        spans.push(Span::styled(panel.table.query().to_string(), theme::accent()));
        spans.push(Span::styled("_", theme::accent()));
    } else if !panel.table.query().is_empty() {
        spans.push(Span::styled(
            format!("Filter: {}  ", panel.table.query()),
            theme::neutral(),
        ));
    } else {
        spans.push(Span::styled(
            format!("{} assets  ", panel.table.record_count()),
            theme::muted(),
        ));
    }

    if panel.loading {
        spans.push(Span::styled("refreshing...  ", theme::muted()));
    }

    if panel.source == RecordSource::Synthetic {
        if let Some(advisory) = &panel.advisory {
            spans.push(Span::styled(advisory.clone(), theme::warning()));
        }
    } else if let Some(updated) = panel.last_updated {
        spans.push(Span::styled(
            format!("updated {}", updated.format("%H:%M:%S")),
            theme::muted(),
        ));
    }

    lines.push(Line::from(spans));
}

fn column_header<'a>(lines: &mut Vec<Line<'a>>, panel: &ListPanelState) {
    let sort = panel.table.sort();
    let mut spans: Vec<Span> = Vec::new();

    for &(key, label, width) in COLUMNS {
        let (text, style) = match sort {
            Some(d) if d.key == key => {
                (format!("{}{}", label, d.direction.arrow()), theme::accent_bold())
            }
            _ => (label.to_string(), theme::muted().add_modifier(Modifier::BOLD)),
        };
        // First two columns are left-aligned like their cells.
        let padded = if matches!(key, SortKey::Symbol | SortKey::Name) {
            format!("{text:<width$} ")
        } else {
            format!("{text:>width$} ")
        };
        spans.push(Span::styled(padded, style));
    }

    lines.push(Line::from(spans));
}

fn footer_line<'a>(lines: &mut Vec<Line<'a>>, panel: &ListPanelState) {
    let filtered_len = panel.table.filtered().len();
    let (start, end, total) = panel.table.pager.showing(filtered_len);

    let mut spans: Vec<Span> = vec![Span::styled(
        format!("Showing {start} to {end} of {total}  "),
        theme::muted(),
    )];

    for link in panel.table.pager.page_links() {
        match link {
            PageLink::Page(page) => {
                if page == panel.table.pager.current_page() {
                    spans.push(Span::styled(format!("[{page}] "), theme::accent_bold()));
                } else {
                    spans.push(Span::styled(format!("{page} "), theme::muted()));
                }
            }
            PageLink::Ellipsis => spans.push(Span::styled("... ", theme::muted())),
        }
    }

    spans.push(Span::styled(
        format!(" {}/page", panel.table.pager.page_size()),
        theme::neutral(),
    ));

    lines.push(Line::from(spans));
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max - 1).collect();
        format!("{cut}.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketpulse_core::model::{AssetClass, ListingRecord};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use crate::app::ListPanelState;

    fn rendered_text(panel: &ListPanelState) -> String {
        let backend = TestBackend::new(100, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| render(f, f.area(), panel)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn volume_column_is_a_bare_quantity() {
        let mut panel = ListPanelState::new(AssetClass::Equity);
        panel.table.set_records(vec![ListingRecord {
            id: "AAPL".into(),
            name: "Apple Inc.".into(),
            symbol: "AAPL".into(),
            price: 187.32,
            change_pct_24h: 0.67,
            market_cap: Some(2.95e12),
            volume: 58_900_000.0,
        }]);

        let text = rendered_text(&panel);
        assert!(text.contains("$2.95T"));
        assert!(text.contains("58.90M"));
        assert!(!text.contains("$58.90M"));
    }
}
