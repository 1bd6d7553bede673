use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::ui::app::{App, ReportLine};
use crate::ui::theme;
use crate::ui::util::{format_amount, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let title = format!(" Report | {} | {} ", app.owner_label(), app.current_month);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(
            title,
            Style::default()
                .fg(theme::TEXT_DIM)
                .add_modifier(Modifier::BOLD),
        ));

    let Some(report) = &app.report else {
        let msg = vec![
            Line::from(""),
            Line::from(Span::styled(app.report_note.as_str(), theme::dim_style())),
        ];
        f.render_widget(Paragraph::new(msg).centered().block(block), area);
        return;
    };

    let header_cells = ["Category / Day", "Description", "Sum"]
        .iter()
        .map(|h| Cell::from(*h).style(theme::header_style()));
    let header = Row::new(header_cells).height(1);

    let cursor = app.report_cursor;
    let rows: Vec<Row> = app
        .report_lines()
        .into_iter()
        .enumerate()
        .skip(cursor.scroll)
        .take(area.height.saturating_sub(4) as usize)
        .map(|(i, line)| {
            let row = match line {
                ReportLine::Category { name, total, count } => {
                    let heading_style = if count == 0 {
                        theme::dim_style()
                    } else {
                        theme::category_style(name)
                    };
                    Row::new(vec![
                        Cell::from(Span::styled(truncate(name, 24), heading_style)),
                        Cell::from(Span::styled(
                            format!("{count} entr{}", if count == 1 { "y" } else { "ies" }),
                            theme::dim_style(),
                        )),
                        Cell::from(format_amount(total)),
                    ])
                }
                ReportLine::Entry(entry) => Row::new(vec![
                    Cell::from(format!("    {:>2}", entry.day_of_month)),
                    Cell::from(truncate(&entry.description, 40)),
                    Cell::from(Span::styled(
                        format_amount(entry.amount),
                        theme::amount_style(),
                    )),
                ]),
            };
            if i == cursor.index {
                row.style(theme::selected_style())
            } else {
                row.style(theme::normal_style())
            }
        })
        .collect();

    let widths = [
        Constraint::Length(26),
        Constraint::Min(20),
        Constraint::Length(14),
    ];

    let footer = Row::new(vec![
        Cell::from(Span::styled("Total", theme::total_style())),
        Cell::from(""),
        Cell::from(Span::styled(
            format_amount(report.total()),
            theme::total_style(),
        )),
    ]);

    let table = Table::new(rows, widths)
        .header(header)
        .footer(footer)
        .block(block);
    f.render_widget(table, area);
}
