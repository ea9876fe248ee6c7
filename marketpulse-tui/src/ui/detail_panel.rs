//! Panel 3 — Detail: asset profile plus a historical price chart.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Chart, Dataset, GraphType, Paragraph, Wrap};

use marketpulse_core::fallback::Degraded;
use marketpulse_core::model::{
    format_change_pct, format_market_cap, format_price, format_quantity, DetailRecord,
    PricePoint, TimeRange,
};

use crate::app::{AppState, DetailView, SeriesView};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    match &app.detail.view {
        DetailView::Idle => render_message(
            f,
            area,
            "Select an asset from the Crypto or Stocks panel and press Enter.",
        ),
        DetailView::Loading => render_message(f, area, "Loading asset profile..."),
        DetailView::NotFound { id } => {
            render_message(f, area, &format!("Asset \"{id}\" was not found."))
        }
        DetailView::Error { message } => render_message(f, area, message),
        DetailView::Ready { record, series } => render_ready(f, area, app, record, series),
    }
}

fn render_message(f: &mut Frame, area: Rect, msg: &str) {
    let lines = vec![
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(msg.to_string(), theme::muted())),
        Line::from(""),
        Line::from(Span::styled("Press Esc to go back.", theme::muted())),
    ];
    f.render_widget(Paragraph::new(lines), area);
}

fn render_ready(
    f: &mut Frame,
    area: Rect,
    app: &AppState,
    record: &Degraded<DetailRecord>,
    series: &SeriesView,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(16), Constraint::Min(6)])
        .split(area);

    render_profile(f, chunks[0], app, record);
    render_series(f, chunks[1], series);
}

fn render_profile(f: &mut Frame, area: Rect, app: &AppState, record: &Degraded<DetailRecord>) {
    let detail = &record.value;
    let listing = &detail.listing;
    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(vec![
        Span::styled(
            format!("{} ({})  ", listing.name, listing.symbol),
            theme::accent_bold(),
        ),
        Span::styled(format!("{}  ", format_price(listing.price)), theme::accent()),
        Span::styled(
            format_change_pct(listing.change_pct_24h),
            theme::change_style(listing.change_pct_24h),
        ),
    ]));

    if let Some(advisory) = &record.advisory {
        lines.push(Line::from(Span::styled(advisory.clone(), theme::warning())));
    }
    lines.push(Line::from(""));

    if let Some(cap) = listing.market_cap {
        metric_line(&mut lines, "Market Cap", &format_market_cap(cap));
    }
    metric_line(&mut lines, "24h Volume", &format_market_cap(listing.volume));
    if let Some(supply) = detail.circulating_supply {
        metric_line(&mut lines, "Circulating Supply", &format_quantity(supply));
    }
    if let Some(supply) = detail.max_supply {
        metric_line(&mut lines, "Max Supply", &format_quantity(supply));
    }
    if let Some(high) = &detail.all_time_high {
        metric_line(&mut lines, "High", &extreme_text(high));
    }
    if let Some(low) = &detail.all_time_low {
        metric_line(&mut lines, "Low", &extreme_text(low));
    }
    if let Some(sector) = &detail.sector {
        metric_line(&mut lines, "Sector", sector);
    }
    if let Some(industry) = &detail.industry {
        metric_line(&mut lines, "Industry", industry);
    }
    if let Some(exchange) = &detail.exchange {
        metric_line(&mut lines, "Exchange", exchange);
    }
    if let Some(website) = &detail.website {
        metric_line(&mut lines, "Website", website);
    }
    if let Some(employees) = detail.employees {
        metric_line(&mut lines, "Employees", &employees.to_string());
    }

    if !detail.description.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            detail.description.clone(),
            theme::secondary(),
        )));
    }

    lines.push(Line::from(""));
    lines.push(range_selector(app));

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
}

fn metric_line<'a>(lines: &mut Vec<Line<'a>>, label: &str, value: &str) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {:>20}: ", label), theme::muted()),
        Span::styled(value.to_string(), theme::secondary()),
    ]));
}

fn extreme_text(extreme: &marketpulse_core::model::PriceExtreme) -> String {
    match extreme.date {
        Some(date) => format!("{} ({})", format_price(extreme.price), date.format("%Y-%m-%d")),
        None => format_price(extreme.price),
    }
}

/// Range row, current selection bracketed. `t` cycles.
fn range_selector(app: &AppState) -> Line<'static> {
    let mut spans: Vec<Span> = vec![Span::styled("Range: ", theme::muted())];
    for range in TimeRange::ranges_for(app.detail.class) {
        if *range == app.detail.range {
            spans.push(Span::styled(format!("[{}] ", range.label()), theme::accent_bold()));
        } else {
            spans.push(Span::styled(format!("{} ", range.label()), theme::muted()));
        }
    }
    spans.push(Span::styled(" [t]cycle", theme::muted()));
    Line::from(spans)
}

fn render_series(f: &mut Frame, area: Rect, series: &SeriesView) {
    match series {
        SeriesView::Loading => {
            let para = Paragraph::new(Span::styled("Loading price history...", theme::muted()));
            f.render_widget(para, area);
        }
        SeriesView::Failed(message) => {
            let para = Paragraph::new(Span::styled(message.clone(), theme::negative()));
            f.render_widget(para, area);
        }
        SeriesView::Ready(degraded) => render_chart(f, area, degraded),
    }
}

fn render_chart(f: &mut Frame, area: Rect, degraded: &Degraded<Vec<PricePoint>>) {
    let points = &degraded.value;
    if points.is_empty() {
        let para = Paragraph::new(Span::styled("No price history available.", theme::muted()));
        f.render_widget(para, area);
        return;
    }

    let min_y = points.iter().map(|p| p.price).fold(f64::INFINITY, f64::min);
    let max_y = points
        .iter()
        .map(|p| p.price)
        .fold(f64::NEG_INFINITY, f64::max);

    let padding = (max_y - min_y).abs() * 0.05;
    let y_min = min_y - padding;
    let y_max = max_y + padding;
    let x_max = points.len().saturating_sub(1) as f64;

    let data: Vec<(f64, f64)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.price))
        .collect();

    let color = if degraded.advisory.is_some() {
        theme::WARNING
    } else {
        theme::ACCENT
    };

    let name = match &degraded.advisory {
        Some(_) => "Price (sample)",
        None => "Price",
    };

    let dataset = Dataset::default()
        .name(name)
        .marker(symbols::Marker::Braille)
        .style(Style::default().fg(color))
        .graph_type(GraphType::Line)
        .data(&data);

    let first = points.first().map(|p| p.timestamp.format("%Y-%m-%d").to_string());
    let last = points.last().map(|p| p.timestamp.format("%Y-%m-%d").to_string());

    let chart = Chart::new(vec![dataset])
        .x_axis(
            Axis::default()
                .style(theme::muted())
                .bounds([0.0, x_max.max(1.0)])
                .labels(vec![
                    Span::styled(first.unwrap_or_default(), theme::muted()),
                    Span::styled(last.unwrap_or_default(), theme::muted()),
                ]),
        )
        .y_axis(
            Axis::default()
                .style(theme::muted())
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::styled(format_price(y_min), theme::muted()),
                    Span::styled(format_price(y_max), theme::muted()),
                ]),
        );

    f.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppState;
    use chrono::{Duration, Utc};
    use marketpulse_core::model::{AssetClass, ListingRecord, PriceExtreme};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::sync::mpsc;

    fn app_with_ready_detail() -> AppState {
        let (tx, _cmd_rx) = mpsc::channel();
        let (_resp_tx, rx) = mpsc::channel();
        let mut app = AppState::new(tx, rx);

        let record = DetailRecord {
            listing: ListingRecord {
                id: "bitcoin".into(),
                name: "Bitcoin".into(),
                symbol: "BTC".into(),
                price: 64_250.0,
                change_pct_24h: 1.2,
                market_cap: Some(1.26e12),
                volume: 3.2e10,
            },
            description: "The first cryptocurrency.".into(),
            all_time_high: Some(PriceExtreme {
                price: 73_000.0,
                date: Some(Utc::now()),
            }),
            all_time_low: Some(PriceExtreme {
                price: 67.81,
                date: None,
            }),
            circulating_supply: Some(1.96e7),
            max_supply: Some(2.1e7),
            sector: None,
            industry: None,
            exchange: Some("Spot markets".into()),
            website: Some("https://bitcoin.org".into()),
            employees: None,
        };
        let points: Vec<PricePoint> = (0..30)
            .map(|i| PricePoint {
                timestamp: Utc::now() - Duration::days(30 - i),
                price: 60_000.0 + i as f64 * 100.0,
            })
            .collect();

        app.detail.class = AssetClass::Crypto;
        app.detail.id = "bitcoin".into();
        app.detail.view = DetailView::Ready {
            record: Degraded::live(record),
            series: SeriesView::Ready(Degraded::live(points)),
        };
        app
    }

    fn rendered_text(app: &AppState) -> String {
        let backend = TestBackend::new(100, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| render(f, f.area(), app))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn ready_view_renders_profile_and_chart() {
        let app = app_with_ready_detail();
        let text = rendered_text(&app);
        assert!(text.contains("Bitcoin (BTC)"));
        assert!(text.contains("Market Cap"));
        assert!(text.contains("Circulating Supply"));
        assert!(text.contains("Range:"));
    }

    #[test]
    fn idle_view_renders_prompt() {
        let (tx, _cmd_rx) = mpsc::channel();
        let (_resp_tx, rx) = mpsc::channel();
        let app = AppState::new(tx, rx);
        let text = rendered_text(&app);
        assert!(text.contains("press Enter"));
    }
}
