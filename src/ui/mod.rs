pub mod backlog_pane;
pub mod column_pane;
pub mod keybindings;
pub mod layout;
pub mod modal;
pub mod styles;
pub mod week_pane;

use crate::app::{App, View};
use crate::domain::{week_label, BACKLOG_COLUMNS};
use backlog_pane::render_backlog_pane;
use keybindings::render_keybindings;
use layout::create_layout;
use modal::render_overlay;
use ratatui::{text::Span, widgets::Paragraph, Frame};
use styles::title_style;
use week_pane::render_week_pane;

/// Main render function - draws the entire UI
pub fn render(f: &mut Frame, app: &App) {
    let size = f.size();
    let view = app.interaction.view();
    let column_count = match view {
        View::Weekly => 7,
        View::Backlog => usize::from(BACKLOG_COLUMNS),
    };
    let layout = create_layout(size, column_count);

    render_keybindings(f, &app.interaction, layout.keybindings_area);

    let header = match view {
        View::Weekly => format!(
            " {} ",
            week_label(app.interaction.weekly.focused_date, app.board.config.week_start)
        ),
        View::Backlog => " Someday ".to_string(),
    };
    f.render_widget(
        Paragraph::new(Span::styled(header, title_style())),
        layout.header_area,
    );

    match view {
        View::Weekly => render_week_pane(f, app, &layout.columns),
        View::Backlog => render_backlog_pane(f, app, &layout.columns),
    }

    render_overlay(f, app, size);
}
