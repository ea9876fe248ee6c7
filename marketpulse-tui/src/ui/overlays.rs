//! Overlay widgets — error history.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::app::{AppState, ErrorCategory};
use crate::theme;
use crate::ui::centered_rect;

/// Error history overlay. Newest entries first; `j`/`k` move the window.
pub fn render_error_history(f: &mut Frame, area: Rect, app: &AppState) {
    let popup = centered_rect(80, 70, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::negative())
        .title(format!(
            " Error History ({}) [Esc]close [j/k]scroll ",
            app.error_history.len()
        ))
        .title_style(theme::negative());

    let inner = block.inner(popup);
    f.render_widget(block, popup);

    if app.error_history.is_empty() {
        let text = Paragraph::new(Span::styled(
            "No errors recorded this session.",
            theme::muted(),
        ));
        f.render_widget(text, inner);
        return;
    }

    // Context lines take a row each, so the window budget is approximate.
    let visible = (inner.height as usize).saturating_sub(1).max(1);
    let start = app.error_scroll;
    let end = (start + visible).min(app.error_history.len());

    let mut lines: Vec<Line> = Vec::new();
    for i in start..end {
        let err = &app.error_history[i];
        let category_style = match err.category {
            ErrorCategory::Network => theme::warning(),
            ErrorCategory::Data => theme::neutral(),
            ErrorCategory::Other => theme::muted(),
        };
        let message_style = if i == app.error_scroll {
            theme::negative().add_modifier(Modifier::BOLD)
        } else {
            theme::secondary()
        };

        lines.push(Line::from(vec![
            Span::styled(
                format!("{} ", err.timestamp.format("%H:%M:%S")),
                theme::muted(),
            ),
            Span::styled(format!("{:<5}", err.category.label()), category_style),
            Span::styled(&err.message, message_style),
        ]));

        if !err.context.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("        {}", err.context),
                theme::muted(),
            )));
        }
    }

    if end < app.error_history.len() {
        lines.push(Line::from(Span::styled(
            format!("  ... {} more below", app.error_history.len() - end),
            theme::muted(),
        )));
    }

    let para = Paragraph::new(lines);
    f.render_widget(para, inner);
}
