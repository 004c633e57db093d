use crate::app::{App, View};
use crate::domain::day_label;
use crate::ui::column_pane::{render_column, ColumnView};
use crate::ui::styles::today_style;
use ratatui::{layout::Rect, Frame};

/// Render the seven day columns of the visible week
pub fn render_week_pane(f: &mut Frame, app: &App, columns: &[Rect]) {
    let interaction = &app.interaction;
    let focused = interaction.weekly.focused_date;
    let active = interaction.view() == View::Weekly;

    for ((date, items), area) in app.board.days.iter().zip(columns) {
        let mut column = ColumnView::new(day_label(*date), items);
        if *date == app.board.today {
            column.title = format!("{} (today)", column.title);
            column.title_style = today_style();
        }
        if active && *date == focused {
            column.focused_row = Some(interaction.weekly.focused_row);
        }
        column.selection = interaction.selection;

        render_column(f, &app.board, column, *area);
    }
}
