use crate::app::{App, Board, DetailField, Mode};
use crate::app::interaction::DetailsState;
use crate::domain::{Column, Config};
use crate::ui::{
    layout::{create_modal_area, create_popup_area},
    styles::{error_style, modal_bg_style, modal_title_style, selected_style},
};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

fn modal_block(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(title, modal_title_style()))
        .style(modal_bg_style())
}

/// Render whichever overlay the current mode carries
pub fn render_overlay(f: &mut Frame, app: &App, area: Rect) {
    match &app.interaction.mode {
        Mode::AddPopup { target, input, .. } => render_add_popup(f, *target, input, area),
        Mode::Details { details, .. } => render_details_modal(f, &app.board, details, area),
        Mode::Settings { config, .. } => render_settings_modal(f, config, area),
        Mode::Weekly | Mode::Backlog => {}
    }

    if let Some(message) = &app.interaction.message {
        render_message(f, message, area);
    }
}

fn column_title(target: Column) -> String {
    match target {
        Column::Day(date) => date.format("%a %b %d").to_string(),
        Column::Backlog(c) => format!("Someday {}", c + 1),
    }
}

/// Render the add-item popup
pub fn render_add_popup(f: &mut Frame, target: Column, input: &str, area: Rect) {
    let popup_area = create_popup_area(area);
    f.render_widget(Clear, popup_area);

    let lines = vec![
        Line::raw(""),
        Line::from(vec![Span::raw(format!("  {input}")), Span::styled("_", modal_title_style())]),
    ];

    let paragraph = Paragraph::new(lines)
        .block(modal_block(format!(" Add to {} ", column_title(target))))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, popup_area);
}

/// Render the item details modal
pub fn render_details_modal(f: &mut Frame, board: &Board, details: &DetailsState, area: Rect) {
    let Some(item) = board.item(details.item_id) else {
        return;
    };
    let modal_area = create_modal_area(area);
    f.render_widget(Clear, modal_area);

    let mut lines = vec![Line::raw("")];
    for field in DetailField::ALL {
        let value = match (&details.editing, field == details.field) {
            (Some(buffer), true) => format!("{buffer}_"),
            _ => field.current_value(item, board),
        };
        let value = if value.is_empty() { "-".to_string() } else { value };

        let label = Span::styled(format!("  {:<10}", field.label()), modal_title_style());
        let value = if field == details.field {
            Span::styled(value, selected_style())
        } else {
            Span::raw(value)
        };
        lines.push(Line::from(vec![label, value]));
    }

    lines.push(Line::raw(""));
    let status = if item.is_done() { "done" } else { "pending" };
    lines.push(Line::raw(format!("  Status    {status}")));
    lines.push(Line::raw(""));
    lines.push(Line::from(vec![
        Span::styled("  [Enter]", modal_title_style()),
        Span::raw(" Edit  "),
        Span::styled("[x]", modal_title_style()),
        Span::raw(" Toggle done  "),
        Span::styled("[Esc]", modal_title_style()),
        Span::raw(" Close"),
    ]));

    let paragraph = Paragraph::new(lines)
        .block(modal_block(" Details ".to_string()))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, modal_area);
}

/// Render the settings modal
pub fn render_settings_modal(f: &mut Frame, config: &Config, area: Rect) {
    let modal_area = create_modal_area(area);
    f.render_widget(Clear, modal_area);

    let on_off = if config.auto_rollover { "on" } else { "off" };
    let lines = vec![
        Line::raw(""),
        Line::raw(format!("  Week starts on   {}", config.week_start.name())),
        Line::raw(format!("  Auto rollover    {on_off}")),
        Line::raw(""),
        Line::from(vec![
            Span::styled("  [m]", modal_title_style()),
            Span::raw(" Monday  "),
            Span::styled("[s]", modal_title_style()),
            Span::raw(" Sunday  "),
            Span::styled("[r]", modal_title_style()),
            Span::raw(" Toggle rollover"),
        ]),
        Line::from(vec![
            Span::styled("  [Esc]", modal_title_style()),
            Span::raw(" Close"),
        ]),
    ];

    let paragraph = Paragraph::new(lines)
        .block(modal_block(" Settings ".to_string()))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, modal_area);
}

/// Render an error from the last action; any key dismisses it
pub fn render_message(f: &mut Frame, message: &str, area: Rect) {
    let popup_area = create_popup_area(area);
    f.render_widget(Clear, popup_area);

    let lines = vec![
        Line::raw(""),
        Line::styled(format!("  {message}"), error_style()),
    ];

    let paragraph = Paragraph::new(lines)
        .block(modal_block(" Error ".to_string()))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_column_title() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        assert_eq!(column_title(Column::Day(date)), "Fri Jan 10");
        assert_eq!(column_title(Column::Backlog(0)), "Someday 1");
    }
}
