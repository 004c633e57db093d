//! Modal controller for the board.
//!
//! `transition` is pure: it takes the current state, the board snapshot and
//! one event, and returns the next state plus at most one planner call. The
//! runner in `app` executes that call and only then commits the next state.

use super::board::Board;
use crate::domain::{Column, Config, Item, ReorderDirection, WeekStart, BACKLOG_COLUMNS};
use chrono::{Duration, NaiveDate};
use uuid::Uuid;

/// The two full-screen views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Weekly,
    Backlog,
}

impl View {
    pub fn toggled(self) -> Self {
        match self {
            View::Weekly => View::Backlog,
            View::Backlog => View::Weekly,
        }
    }

    fn mode(self) -> Mode {
        match self {
            View::Weekly => Mode::Weekly,
            View::Backlog => Mode::Backlog,
        }
    }
}

/// Editable fields of the details modal, top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailField {
    Title,
    Date,
    Notes,
    Workspace,
    Project,
}

impl DetailField {
    pub const ALL: [DetailField; 5] = [
        DetailField::Title,
        DetailField::Date,
        DetailField::Notes,
        DetailField::Workspace,
        DetailField::Project,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DetailField::Title => "Title",
            DetailField::Date => "Date",
            DetailField::Notes => "Notes",
            DetailField::Workspace => "Workspace",
            DetailField::Project => "Project",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    fn step(self, delta: isize) -> Self {
        let last = Self::ALL.len() as isize - 1;
        let index = (self.index() as isize + delta).clamp(0, last);
        Self::ALL[index as usize]
    }

    /// Text shown in the editor when editing starts
    pub fn current_value(&self, item: &Item, board: &Board) -> String {
        match self {
            DetailField::Title => item.title.clone(),
            DetailField::Date => item
                .scheduled_for
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            DetailField::Notes => item.notes.clone().unwrap_or_default(),
            DetailField::Workspace => board
                .workspace_name(item.workspace_id)
                .unwrap_or_default()
                .to_string(),
            DetailField::Project => board
                .project_name(item.project_id)
                .unwrap_or_default()
                .to_string(),
        }
    }

    fn edit(self, value: String) -> FieldEdit {
        match self {
            DetailField::Title => FieldEdit::Title(value),
            DetailField::Date => FieldEdit::Date(value),
            DetailField::Notes => FieldEdit::Notes(value),
            DetailField::Workspace => FieldEdit::Workspace(value),
            DetailField::Project => FieldEdit::Project(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailsState {
    pub item_id: Uuid,
    pub field: DetailField,
    /// Buffer of the field being edited, None while browsing fields
    pub editing: Option<String>,
}

/// Active layer. Overlays remember the view they cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Weekly,
    Backlog,
    AddPopup {
        over: View,
        target: Column,
        input: String,
    },
    Details {
        over: View,
        details: DetailsState,
    },
    Settings {
        over: View,
        config: Config,
    },
}

impl Mode {
    /// The base view under any overlay
    pub fn view(&self) -> View {
        match self {
            Mode::Weekly => View::Weekly,
            Mode::Backlog => View::Backlog,
            Mode::AddPopup { over, .. } | Mode::Details { over, .. } | Mode::Settings { over, .. } => {
                *over
            }
        }
    }

    /// Whether printable keys are text rather than commands
    pub fn is_text_entry(&self) -> bool {
        match self {
            Mode::AddPopup { .. } => true,
            Mode::Details { details, .. } => details.editing.is_some(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklyCursor {
    pub focused_date: NaiveDate,
    pub focused_row: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BacklogCursor {
    pub focused_column: u8,
    pub focused_row: usize,
}

/// First key of a two-key command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chord {
    Delete,
    Goto,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interaction {
    pub mode: Mode,
    pub weekly: WeeklyCursor,
    pub backlog: BacklogCursor,
    /// Item being dragged with the direction keys
    pub selection: Option<Uuid>,
    pub pending: Option<Chord>,
    /// Error from the last failed call; the next key dismisses it
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Left,
    Right,
    Up,
    Down,
    PrevWeek,
    NextWeek,
    Select,
    Add,
    OpenDetails,
    ToggleView,
    Goto,
    OpenSettings,
    ToggleComplete,
    Delete,
    ToBacklog,
    ToToday,
    ToTomorrow,
    Char(char),
    Backspace,
    Confirm,
    Escape,
    Quit,
}

/// Raw text committed from the details modal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    Title(String),
    Date(String),
    Notes(String),
    Workspace(String),
    Project(String),
}

/// The planner call a transition asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Add { title: String, column: Column },
    Complete(Uuid),
    Reopen(Uuid),
    Move { id: Uuid, to: Column },
    Reorder { id: Uuid, direction: ReorderDirection },
    Delete(Uuid),
    Update { id: Uuid, edit: FieldEdit },
    SaveConfig(Config),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: Interaction,
    pub effect: Option<Effect>,
    pub quit: bool,
}

impl Transition {
    fn stay(state: Interaction) -> Self {
        Self {
            state,
            effect: None,
            quit: false,
        }
    }

    fn with(state: Interaction, effect: Effect) -> Self {
        Self {
            state,
            effect: Some(effect),
            quit: false,
        }
    }

    fn quit(state: Interaction) -> Self {
        Self {
            state,
            effect: None,
            quit: true,
        }
    }
}

fn wrap_column(column: u8, delta: i64) -> u8 {
    (i64::from(column) + delta).rem_euclid(i64::from(BACKLOG_COLUMNS)) as u8
}

/// Column one step left or right of `column`. Days cross week boundaries,
/// backlog columns wrap around.
fn shift_column(column: Column, delta: i64) -> Column {
    match column {
        Column::Day(date) => Column::Day(date + Duration::days(delta)),
        Column::Backlog(c) => Column::Backlog(wrap_column(c, delta)),
    }
}

fn completion_effect(item: &Item) -> Effect {
    if item.is_done() {
        Effect::Reopen(item.id)
    } else {
        Effect::Complete(item.id)
    }
}

impl Interaction {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            mode: Mode::Weekly,
            weekly: WeeklyCursor {
                focused_date: today,
                focused_row: 0,
            },
            backlog: BacklogCursor {
                focused_column: 0,
                focused_row: 0,
            },
            selection: None,
            pending: None,
            message: None,
        }
    }

    pub fn view(&self) -> View {
        self.mode.view()
    }

    pub fn focused_column(&self) -> Column {
        match self.view() {
            View::Weekly => Column::Day(self.weekly.focused_date),
            View::Backlog => Column::Backlog(self.backlog.focused_column),
        }
    }

    pub fn focused_row(&self) -> usize {
        match self.view() {
            View::Weekly => self.weekly.focused_row,
            View::Backlog => self.backlog.focused_row,
        }
    }

    pub fn focused_item<'a>(&self, board: &'a Board) -> Option<&'a Item> {
        board
            .column_items(self.focused_column())
            .get(self.focused_row())
    }

    /// The selected item if any, otherwise the focused one
    pub fn target_item<'a>(&self, board: &'a Board) -> Option<&'a Item> {
        self.selection
            .and_then(|id| board.item(id))
            .or_else(|| self.focused_item(board))
    }

    fn set_focus(&mut self, column: Column, row: usize) {
        match column {
            Column::Day(date) => {
                self.weekly.focused_date = date;
                self.weekly.focused_row = row;
            }
            Column::Backlog(c) => {
                self.backlog.focused_column = c;
                self.backlog.focused_row = row;
            }
        }
    }

    fn clamp_row(&mut self, board: &Board) {
        let len = board.column_items(self.focused_column()).len();
        let row = self.focused_row().min(len.saturating_sub(1));
        self.set_focus(self.focused_column(), row);
    }

    /// Put the cursor on `id` when it is visible in the active view
    pub fn focus_item(&mut self, board: &Board, id: Uuid) {
        if let Some((column, row)) = board.position(id) {
            let visible = match self.view() {
                View::Weekly => !column.is_backlog(),
                View::Backlog => column.is_backlog(),
            };
            if visible {
                self.set_focus(column, row);
            }
        }
    }

    /// Reconcile with a freshly loaded board: drop stale references, follow
    /// the selection and keep the cursor inside its column.
    pub fn sync(&mut self, board: &Board) {
        if let Some(id) = self.selection {
            match board.position(id) {
                Some((column, _)) if column.is_backlog() == (self.view() == View::Backlog) => {
                    self.focus_item(board, id);
                }
                _ => self.selection = None,
            }
        }

        let closed = match &self.mode {
            Mode::Details { over, details } if board.item(details.item_id).is_none() => {
                Some(over.mode())
            }
            _ => None,
        };
        if let Some(mode) = closed {
            self.mode = mode;
        }

        self.clamp_row(board);
    }
}

/// Compute the next state and effect for one event
pub fn transition(state: &Interaction, board: &Board, event: Event) -> Transition {
    let mut next = state.clone();

    if event == Event::Quit {
        return Transition::quit(next);
    }

    // A visible error swallows the key that dismisses it
    if next.message.take().is_some() {
        next.pending = None;
        return Transition::stay(next);
    }

    let pending = next.pending.take();

    match state.mode.clone() {
        Mode::Weekly | Mode::Backlog => base_view(next, board, event, pending),
        Mode::AddPopup {
            over,
            target,
            input,
        } => add_popup(next, over, target, input, event),
        Mode::Details { over, details } => details_modal(next, board, over, details, event),
        Mode::Settings { over, config } => settings_modal(next, over, config, event),
    }
}

fn base_view(mut next: Interaction, board: &Board, event: Event, pending: Option<Chord>) -> Transition {
    let view = next.view();
    let selected = next.selection.and_then(|id| board.item(id));

    match event {
        Event::Left | Event::Right | Event::PrevWeek | Event::NextWeek => {
            let delta = match (event, view) {
                (Event::Left, _) => -1,
                (Event::Right, _) => 1,
                (Event::PrevWeek, View::Weekly) => -7,
                (Event::NextWeek, View::Weekly) => 7,
                _ => return Transition::stay(next),
            };

            if let Some(item) = selected {
                let to = shift_column(item.column(), delta);
                next.set_focus(to, 0);
                return Transition::with(next, Effect::Move { id: item.id, to });
            }

            let row = next.focused_row();
            next.set_focus(shift_column(next.focused_column(), delta), row);
            next.clamp_row(board);
            Transition::stay(next)
        }
        Event::Up | Event::Down => {
            let up = event == Event::Up;
            let row = next.focused_row();

            if let Some(item) = selected {
                let direction = if up {
                    ReorderDirection::Up
                } else {
                    ReorderDirection::Down
                };
                let row = if up { row.saturating_sub(1) } else { row + 1 };
                next.set_focus(item.column(), row);
                return Transition::with(
                    next,
                    Effect::Reorder {
                        id: item.id,
                        direction,
                    },
                );
            }

            let row = if up { row.saturating_sub(1) } else { row + 1 };
            next.set_focus(next.focused_column(), row);
            next.clamp_row(board);
            Transition::stay(next)
        }
        Event::Select => {
            if next.selection.is_some() {
                next.selection = None;
            } else {
                next.selection = next.focused_item(board).map(|item| item.id);
            }
            Transition::stay(next)
        }
        Event::Add => {
            next.mode = Mode::AddPopup {
                over: view,
                target: next.focused_column(),
                input: String::new(),
            };
            Transition::stay(next)
        }
        Event::OpenDetails => {
            if let Some(item) = next.target_item(board) {
                next.mode = Mode::Details {
                    over: view,
                    details: DetailsState {
                        item_id: item.id,
                        field: DetailField::Title,
                        editing: None,
                    },
                };
            }
            Transition::stay(next)
        }
        Event::ToggleView => {
            next.mode = view.toggled().mode();
            next.selection = None;
            Transition::stay(next)
        }
        Event::Goto => {
            next.pending = Some(Chord::Goto);
            Transition::stay(next)
        }
        Event::OpenSettings => {
            next.mode = Mode::Settings {
                over: view,
                config: board.config,
            };
            Transition::stay(next)
        }
        Event::ToggleComplete => match next.target_item(board) {
            Some(item) => {
                let effect = completion_effect(item);
                Transition::with(next, effect)
            }
            None => Transition::stay(next),
        },
        Event::Delete => {
            if pending != Some(Chord::Delete) {
                next.pending = Some(Chord::Delete);
                return Transition::stay(next);
            }
            match next.target_item(board).map(|item| item.id) {
                Some(id) => {
                    if next.selection == Some(id) {
                        next.selection = None;
                    }
                    Transition::with(next, Effect::Delete(id))
                }
                None => Transition::stay(next),
            }
        }
        Event::ToBacklog | Event::ToToday | Event::ToTomorrow => {
            let Some(item) = next.target_item(board) else {
                return Transition::stay(next);
            };
            let to = match event {
                Event::ToBacklog => Column::Backlog(item.backlog_column),
                Event::ToToday => Column::Day(board.today),
                _ => Column::Day(board.today + Duration::days(1)),
            };
            if to == item.column() {
                return Transition::stay(next);
            }
            let id = item.id;
            if next.selection == Some(id) && to.is_backlog() != (view == View::Backlog) {
                next.selection = None;
            }
            Transition::with(next, Effect::Move { id, to })
        }
        Event::Escape => {
            if pending.is_some() {
                return Transition::stay(next);
            }
            if next.selection.take().is_some() {
                return Transition::stay(next);
            }
            Transition::quit(next)
        }
        Event::Quit => Transition::quit(next),
        Event::Char(_) | Event::Backspace | Event::Confirm => Transition::stay(next),
    }
}

fn add_popup(mut next: Interaction, over: View, target: Column, mut input: String, event: Event) -> Transition {
    match event {
        Event::Char(c) => input.push(c),
        Event::Backspace => {
            input.pop();
        }
        Event::Confirm => {
            next.mode = over.mode();
            return Transition::with(
                next,
                Effect::Add {
                    title: input,
                    column: target,
                },
            );
        }
        Event::Escape => {
            next.mode = over.mode();
            return Transition::stay(next);
        }
        _ => {}
    }

    next.mode = Mode::AddPopup {
        over,
        target,
        input,
    };
    Transition::stay(next)
}

fn details_modal(
    mut next: Interaction,
    board: &Board,
    over: View,
    mut details: DetailsState,
    event: Event,
) -> Transition {
    let Some(item) = board.item(details.item_id) else {
        next.mode = over.mode();
        return Transition::stay(next);
    };

    let mut effect = None;
    match (details.editing.take(), event) {
        (Some(mut buffer), Event::Char(c)) => {
            buffer.push(c);
            details.editing = Some(buffer);
        }
        (Some(mut buffer), Event::Backspace) => {
            buffer.pop();
            details.editing = Some(buffer);
        }
        (Some(buffer), Event::Confirm) => {
            effect = Some(Effect::Update {
                id: item.id,
                edit: details.field.edit(buffer),
            });
        }
        (Some(_), Event::Escape) => {}
        (Some(buffer), _) => details.editing = Some(buffer),
        (None, Event::Up) => details.field = details.field.step(-1),
        (None, Event::Down) => details.field = details.field.step(1),
        (None, Event::Confirm) => {
            details.editing = Some(details.field.current_value(item, board));
        }
        (None, Event::ToggleComplete) => effect = Some(completion_effect(item)),
        (None, Event::Escape) => {
            next.mode = over.mode();
            return Transition::stay(next);
        }
        (None, _) => {}
    }

    next.mode = Mode::Details { over, details };
    match effect {
        Some(effect) => Transition::with(next, effect),
        None => Transition::stay(next),
    }
}

fn settings_modal(mut next: Interaction, over: View, config: Config, event: Event) -> Transition {
    let updated = match event {
        Event::Char('m') => Config {
            week_start: WeekStart::Monday,
            ..config
        },
        Event::Char('s') => Config {
            week_start: WeekStart::Sunday,
            ..config
        },
        Event::Char('w') | Event::Char(' ') => Config {
            week_start: config.week_start.toggled(),
            ..config
        },
        Event::Char('r') => Config {
            auto_rollover: !config.auto_rollover,
            ..config
        },
        Event::Confirm | Event::Escape => {
            next.mode = over.mode();
            return Transition::stay(next);
        }
        _ => config,
    };

    next.mode = Mode::Settings {
        over,
        config: updated,
    };
    if updated == config {
        Transition::stay(next)
    } else {
        Transition::with(next, Effect::SaveConfig(updated))
    }
}
