use crate::app::interaction::Chord;
use crate::app::{App, Event, Interaction, Mode};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Handle keyboard input events. Returns true when the app should exit.
pub fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    match map_key(&app.interaction, key) {
        Some(event) => app.handle(event),
        None => false,
    }
}

/// Translate a key press into a controller event for the active mode
pub fn map_key(state: &Interaction, key: KeyEvent) -> Option<Event> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Event::Quit);
    }

    // An error message is dismissed by any key
    if state.message.is_some() {
        return Some(Event::Escape);
    }

    if state.mode.is_text_entry() {
        return map_text_key(key);
    }

    match state.mode {
        Mode::Weekly | Mode::Backlog => map_board_key(state, key),
        Mode::Details { .. } => map_details_key(key),
        Mode::Settings { .. } => map_settings_key(key),
        Mode::AddPopup { .. } => map_text_key(key),
    }
}

fn map_text_key(key: KeyEvent) -> Option<Event> {
    match key.code {
        KeyCode::Char(c) => Some(Event::Char(c)),
        KeyCode::Backspace => Some(Event::Backspace),
        KeyCode::Enter => Some(Event::Confirm),
        KeyCode::Esc => Some(Event::Escape),
        _ => None,
    }
}

fn map_board_key(state: &Interaction, key: KeyEvent) -> Option<Event> {
    // Second key of `g s`
    if state.pending == Some(Chord::Goto) && key.code == KeyCode::Char('s') {
        return Some(Event::OpenSettings);
    }

    let event = match key.code {
        // Navigation (drags the item while one is selected)
        KeyCode::Left | KeyCode::Char('h') => Event::Left,
        KeyCode::Right | KeyCode::Char('l') => Event::Right,
        KeyCode::Up | KeyCode::Char('k') => Event::Up,
        KeyCode::Down | KeyCode::Char('j') => Event::Down,
        KeyCode::Char('[') => Event::PrevWeek,
        KeyCode::Char(']') => Event::NextWeek,

        KeyCode::Enter => Event::Select,
        KeyCode::Char('a') => Event::Add,
        KeyCode::Char(' ') => Event::OpenDetails,
        KeyCode::Char('b') => Event::ToggleView,
        KeyCode::Char('g') => Event::Goto,
        KeyCode::Char('S') => Event::OpenSettings,

        KeyCode::Char('x') => Event::ToggleComplete,
        KeyCode::Char('d') => Event::Delete,

        // Quick moves
        KeyCode::Char('s') => Event::ToBacklog,
        KeyCode::Char('t') => Event::ToToday,
        KeyCode::Char('T') => Event::ToTomorrow,

        KeyCode::Esc => Event::Escape,
        KeyCode::Char('q') => Event::Quit,
        _ => return None,
    };
    Some(event)
}

fn map_details_key(key: KeyEvent) -> Option<Event> {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Some(Event::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(Event::Down),
        KeyCode::Enter => Some(Event::Confirm),
        KeyCode::Char('x') => Some(Event::ToggleComplete),
        KeyCode::Esc | KeyCode::Char('q') => Some(Event::Escape),
        _ => None,
    }
}

fn map_settings_key(key: KeyEvent) -> Option<Event> {
    match key.code {
        KeyCode::Char(c) => Some(Event::Char(c)),
        KeyCode::Enter => Some(Event::Confirm),
        KeyCode::Esc => Some(Event::Escape),
        _ => None,
    }
}
