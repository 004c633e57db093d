use crate::app::Board;
use crate::domain::Item;
use crate::ui::styles::{
    border_style, default_style, done_style, focused_border_style, overdue_style, picked_style,
    selected_style, tag_style, title_style,
};
use chrono::NaiveDate;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};
use uuid::Uuid;

/// What one board column needs besides its items
pub struct ColumnView<'a> {
    pub title: String,
    pub title_style: Style,
    pub items: &'a [Item],
    /// Row under the cursor when this column has focus
    pub focused_row: Option<usize>,
    pub selection: Option<Uuid>,
}

impl<'a> ColumnView<'a> {
    pub fn new(title: String, items: &'a [Item]) -> Self {
        Self {
            title,
            title_style: title_style(),
            items,
            focused_row: None,
            selection: None,
        }
    }
}

/// Render one column of items as a bordered list
pub fn render_column(f: &mut Frame, board: &Board, column: ColumnView, area: Rect) {
    let rows: Vec<ListItem> = column
        .items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let line = create_item_line(item, board, board.today);
            let style = if column.selection == Some(item.id) {
                picked_style()
            } else if column.focused_row == Some(idx) {
                selected_style()
            } else {
                default_style()
            };
            ListItem::new(line).style(style)
        })
        .collect();

    let border = if column.focused_row.is_some() {
        focused_border_style()
    } else {
        border_style()
    };

    let list = List::new(rows).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(Span::styled(format!(" {} ", column.title), column.title_style)),
    );

    // Keeps the focused row scrolled into view
    let mut state = ListState::default().with_selected(column.focused_row);
    f.render_stateful_widget(list, area, &mut state);
}

/// Create a single line for an item
/// Format: [x] Write proposal  @Work/Launch
pub fn create_item_line(item: &Item, board: &Board, today: NaiveDate) -> Line<'static> {
    let mut spans = Vec::new();

    let (checkbox, style) = if item.is_done() {
        ("[x] ", done_style())
    } else if item.is_overdue(today) {
        ("[ ] ", overdue_style())
    } else {
        ("[ ] ", Style::default())
    };
    spans.push(Span::raw(checkbox.to_string()));
    spans.push(Span::styled(item.title.clone(), style));

    let owner = match (
        board.workspace_name(item.workspace_id),
        board.project_name(item.project_id),
    ) {
        (Some(workspace), Some(project)) => Some(format!("{workspace}/{project}")),
        (Some(workspace), None) => Some(workspace.to_string()),
        (None, Some(project)) => Some(project.to_string()),
        (None, None) => None,
    };
    if let Some(owner) = owner {
        spans.push(Span::raw("  ".to_string()));
        spans.push(Span::styled(format!("@{owner}"), tag_style()));
    }

    if item.notes.is_some() {
        spans.push(Span::styled(" *".to_string(), tag_style()));
    }

    Line::from(spans)
}
