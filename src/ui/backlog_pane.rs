use crate::app::{App, View};
use crate::ui::column_pane::{render_column, ColumnView};
use ratatui::{layout::Rect, Frame};

/// Render the four backlog columns
pub fn render_backlog_pane(f: &mut Frame, app: &App, columns: &[Rect]) {
    let interaction = &app.interaction;
    let active = interaction.view() == View::Backlog;

    for (idx, (items, area)) in app.board.backlog.iter().zip(columns).enumerate() {
        let mut column = ColumnView::new(format!("Someday {}", idx + 1), items);
        if active && idx == usize::from(interaction.backlog.focused_column) {
            column.focused_row = Some(interaction.backlog.focused_row);
        }
        column.selection = interaction.selection;

        render_column(f, &app.board, column, *area);
    }
}
