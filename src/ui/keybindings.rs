use crate::app::interaction::Chord;
use crate::app::{Interaction, Mode};
use crate::ui::styles::{hint_style, modal_title_style};
use ratatui::{layout::Rect, text::{Line, Span}, widgets::Paragraph, Frame};

/// Hint spans for the active mode
pub fn hints(interaction: &Interaction) -> Vec<Span<'static>> {
    match interaction.pending {
        Some(Chord::Delete) => {
            return vec![Span::styled(" d again to delete, any other key cancels", modal_title_style())]
        }
        Some(Chord::Goto) => {
            return vec![Span::styled(" s settings", modal_title_style())]
        }
        None => {}
    }

    let hints: &[&'static str] = match &interaction.mode {
        Mode::Weekly | Mode::Backlog if interaction.selection.is_some() => &[
            " ←/→ move   ",
            "↑/↓ reorder   ",
            "Enter drop   ",
            "Esc drop",
        ],
        Mode::Weekly => &[
            " h/j/k/l move   ",
            "[ / ] week   ",
            "Enter pick   ",
            "a add   ",
            "Space details   ",
            "x done   ",
            "dd delete   ",
            "s someday   ",
            "t/T today/tomorrow   ",
            "b backlog   ",
            "S settings   ",
            "q quit",
        ],
        Mode::Backlog => &[
            " h/j/k/l move   ",
            "Enter pick   ",
            "a add   ",
            "Space details   ",
            "x done   ",
            "dd delete   ",
            "t/T today/tomorrow   ",
            "b week   ",
            "S settings   ",
            "q quit",
        ],
        Mode::AddPopup { .. } => &[" Enter add   ", "Esc cancel"],
        Mode::Details { details, .. } if details.editing.is_some() => {
            &[" Enter save   ", "Esc cancel"]
        }
        Mode::Details { .. } => &[" ↑/↓ field   ", "Enter edit   ", "x done   ", "Esc close"],
        Mode::Settings { .. } => &[
            " m Monday   ",
            "s Sunday   ",
            "r auto-rollover   ",
            "Esc close",
        ],
    };

    hints.iter().map(|h| Span::raw(*h)).collect()
}

/// Render the keybindings hint bar
pub fn render_keybindings(f: &mut Frame, interaction: &Interaction, area: Rect) {
    let paragraph = Paragraph::new(Line::from(hints(interaction))).style(hint_style());
    f.render_widget(paragraph, area);
}
