use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use rust_decimal::Decimal;

use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, truncate};

fn block(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(
            title,
            Style::default()
                .fg(theme::TEXT_DIM)
                .add_modifier(Modifier::BOLD),
        ))
}

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    if app.records.is_empty() {
        let msg = vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("No records for {} in {}", app.owner_label(), app.current_month),
                theme::dim_style(),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Pick a user with :owner <id>, then :add <category> <sum> <description>",
                theme::dim_style(),
            )),
        ];
        f.render_widget(
            Paragraph::new(msg)
                .centered()
                .block(block(" Records (0) ".into())),
            area,
        );
        return;
    }

    let header_cells = ["Date", "User", "Category", "Description", "Sum"]
        .iter()
        .map(|h| Cell::from(*h).style(theme::header_style()));
    let header = Row::new(header_cells).height(1);

    let cursor = app.records_cursor;
    let rows: Vec<Row> = app
        .records
        .iter()
        .enumerate()
        .skip(cursor.scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, record)| {
            let style = if i == cursor.index {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };

            Row::new(vec![
                Cell::from(format!("  {}", record.occurred_at.format("%Y-%m-%d"))),
                Cell::from(record.owner_id.to_string()),
                Cell::from(Span::styled(
                    truncate(&record.category, 18),
                    theme::category_style(&record.category),
                )),
                Cell::from(truncate(&record.description, 40)),
                Cell::from(Span::styled(
                    format_amount(record.amount),
                    theme::amount_style(),
                )),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(14),
        Constraint::Length(8),
        Constraint::Length(20),
        Constraint::Min(20),
        Constraint::Length(14),
    ];

    let total: Decimal = app.records.iter().map(|r| r.amount).sum();
    let title = format!(
        " Records ({}) | {} | total {} ",
        app.records.len(),
        app.owner_label(),
        format_amount(total)
    );

    let table = Table::new(rows, widths).header(header).block(block(title));
    f.render_widget(table, area);
}
