pub mod board;
pub mod interaction;

pub use board::Board;
pub use interaction::{DetailField, Event, Interaction, Mode, View};

use crate::domain::{parse_schedule, Column, ItemPatch, Project, Target};
use crate::error::{PlannerError, PlannerResult};
use crate::service::Planner;
use chrono::NaiveDate;
use interaction::{transition, Effect, FieldEdit};
use uuid::Uuid;

/// Main application state: the planner, the controller state and the
/// board snapshot drawn from it
pub struct App {
    pub planner: Planner,
    pub interaction: Interaction,
    pub board: Board,
}

fn parse_date_field(value: &str, today: NaiveDate) -> PlannerResult<Option<NaiveDate>> {
    parse_schedule(value, today).ok_or_else(|| {
        PlannerError::validation(format!("'{}' is not a date (use YYYY-MM-DD)", value.trim()))
    })
}

impl App {
    pub fn new(planner: Planner) -> PlannerResult<Self> {
        let interaction = Interaction::new(planner.today());
        let board = Board::load(&planner, interaction.weekly.focused_date)?;
        Ok(Self {
            planner,
            interaction,
            board,
        })
    }

    /// Feed one event through the controller. Returns true when the app
    /// should exit.
    ///
    /// The next state is only committed once its planner call succeeded;
    /// on failure the previous state stays and the error is shown.
    pub fn handle(&mut self, event: Event) -> bool {
        let step = transition(&self.interaction, &self.board, event);
        if step.quit {
            return true;
        }

        let Some(effect) = step.effect else {
            self.interaction = step.state;
            if let Err(err) = self.reload() {
                self.fail(err);
            }
            return false;
        };

        match self.apply(effect) {
            Ok(follow) => {
                self.interaction = step.state;
                if let Some(id) = follow {
                    self.reveal(id);
                }
                if let Err(err) = self.reload() {
                    self.fail(err);
                    return false;
                }
                if let Some(id) = follow {
                    self.interaction.focus_item(&self.board, id);
                }
            }
            Err(err) => self.fail(err),
        }
        false
    }

    /// Bring the week holding `id` on screen when the weekly view is active
    fn reveal(&mut self, id: Uuid) {
        if self.interaction.view() != View::Weekly {
            return;
        }
        if let Ok(item) = self.planner.get_item(id) {
            if let Some(date) = item.scheduled_for {
                self.interaction.weekly.focused_date = date;
            }
        }
    }

    fn fail(&mut self, err: PlannerError) {
        tracing::warn!(error = %err, "board action failed");
        self.interaction.message = Some(err.to_string());
    }

    /// Run one planner call. Returns the item the cursor should follow.
    fn apply(&mut self, effect: Effect) -> PlannerResult<Option<Uuid>> {
        let follow = match effect {
            Effect::Add { title, column } => {
                let target = match column {
                    Column::Day(date) => Target::Date(date),
                    Column::Backlog(c) => Target::Backlog(c),
                };
                Some(self.planner.add_item(&title, target, None, None)?.id)
            }
            Effect::Complete(id) => {
                self.planner.complete(id)?;
                None
            }
            Effect::Reopen(id) => {
                self.planner.reopen(id)?;
                None
            }
            Effect::Move { id, to } => Some(self.planner.move_item(id, to)?.id),
            Effect::Reorder { id, direction } => Some(self.planner.reorder_item(id, direction)?.id),
            Effect::Delete(id) => {
                self.planner.delete_item(id)?;
                None
            }
            Effect::Update { id, edit } => {
                let patch = self.patch_for(id, edit)?;
                Some(self.planner.update_item(id, patch)?.id)
            }
            Effect::SaveConfig(config) => {
                self.planner.update_config(config)?;
                None
            }
        };
        Ok(follow)
    }

    /// Translate one committed field edit into a planner patch
    fn patch_for(&self, id: Uuid, edit: FieldEdit) -> PlannerResult<ItemPatch> {
        let mut patch = ItemPatch::default();
        match edit {
            FieldEdit::Title(title) => patch.title = Some(title),
            FieldEdit::Date(value) => {
                patch.scheduled_for = Some(parse_date_field(&value, self.planner.today())?);
            }
            FieldEdit::Notes(notes) => patch.notes = Some(Some(notes)),
            FieldEdit::Workspace(name) => {
                let workspace = match name.trim() {
                    "" => None,
                    name => Some(self.planner.resolve_workspace(name)?.id),
                };
                patch.workspace = Some(workspace);
            }
            FieldEdit::Project(name) => {
                let project = match name.trim() {
                    "" => None,
                    name => Some(self.project_for(id, name)?.id),
                };
                patch.project = Some(project);
            }
        }
        Ok(patch)
    }

    /// Look a project name up among the item's own workspace first
    fn project_for(&self, id: Uuid, name: &str) -> PlannerResult<Project> {
        let workspace = self.planner.get_item(id)?.workspace_id;
        self.planner.resolve_project_near(name, workspace)
    }

    /// Reload the board around the focused week and re-anchor the cursor
    pub fn reload(&mut self) -> PlannerResult<()> {
        self.board = Board::load(&self.planner, self.interaction.weekly.focused_date)?;
        self.interaction.sync(&self.board);
        Ok(())
    }

    /// Midnight check: advance today and roll overdue items over once the
    /// date changed. Returns true when it did.
    pub fn tick(&mut self, today: NaiveDate) -> bool {
        if today == self.planner.today() {
            return false;
        }

        tracing::info!(%today, "day changed");
        self.planner.set_today(today);
        let result = self.planner.auto_rollover().and_then(|_| self.reload());
        if let Err(err) = result {
            self.fail(err);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ItemStatus, ProjectStatus, Target, WeekStart};
    use crate::service::test_support::*;
    use crate::service::ListFilter;
    use pretty_assertions::assert_eq;

    fn app() -> App {
        App::new(planner()).unwrap()
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle(Event::Char(c));
        }
    }

    #[test]
    fn test_add_through_popup() {
        let mut app = app();
        app.handle(Event::Add);
        type_text(&mut app, "Write report");
        app.handle(Event::Confirm);

        let items = app.planner.list_items(ListFilter::Today, true).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Write report");
        assert_eq!(app.interaction.mode, Mode::Weekly);
        assert_eq!(
            app.interaction.focused_item(&app.board).map(|i| i.id),
            Some(items[0].id)
        );
    }

    #[test]
    fn test_failed_add_keeps_popup_and_shows_message() {
        let mut app = app();
        app.handle(Event::Add);
        type_text(&mut app, "   ");
        app.handle(Event::Confirm);

        assert!(matches!(app.interaction.mode, Mode::AddPopup { .. }));
        assert!(app.interaction.message.is_some());
        assert!(app.planner.list_items(ListFilter::Today, true).unwrap().is_empty());

        // The next key only dismisses the message
        app.handle(Event::Escape);
        assert_eq!(app.interaction.message, None);
        assert!(matches!(app.interaction.mode, Mode::AddPopup { .. }));
    }

    #[test]
    fn test_drag_across_days_follows_item() {
        let mut planner = planner();
        let item = planner.add_item("walk", Target::Today, None, None).unwrap();
        let mut app = App::new(planner).unwrap();

        app.handle(Event::Select);
        app.handle(Event::Right);
        app.handle(Event::Right);

        let moved = app.planner.get_item(item.id).unwrap();
        assert_eq!(moved.scheduled_for, Some(date(2025, 1, 12)));
        assert_eq!(app.interaction.weekly.focused_date, date(2025, 1, 12));
        assert_eq!(app.interaction.selection, Some(item.id));
        // The board now shows the following week
        assert_eq!(app.board.days[0].0, date(2025, 1, 12));
    }

    #[test]
    fn test_toggle_complete_and_delete() {
        let mut planner = planner();
        let item = planner.add_item("call", Target::Today, None, None).unwrap();
        let mut app = App::new(planner).unwrap();

        app.handle(Event::ToggleComplete);
        assert_eq!(app.planner.get_item(item.id).unwrap().status, ItemStatus::Done);
        app.handle(Event::ToggleComplete);
        assert_eq!(app.planner.get_item(item.id).unwrap().status, ItemStatus::Pending);

        app.handle(Event::Delete);
        assert!(app.planner.get_item(item.id).is_ok());
        app.handle(Event::Delete);
        assert!(app.planner.get_item(item.id).is_err());
    }

    #[test]
    fn test_details_edits_date_and_workspace() {
        let mut planner = planner();
        let work = planner.create_workspace("Work").unwrap();
        let item = planner.add_item("plan", Target::Today, None, None).unwrap();
        let mut app = App::new(planner).unwrap();

        app.handle(Event::OpenDetails);
        app.handle(Event::Down);
        app.handle(Event::Confirm);
        for _ in 0..10 {
            app.handle(Event::Backspace);
        }
        type_text(&mut app, "2025-01-14");
        app.handle(Event::Confirm);
        assert_eq!(
            app.planner.get_item(item.id).unwrap().scheduled_for,
            Some(date(2025, 1, 14))
        );

        app.handle(Event::Down);
        app.handle(Event::Down);
        app.handle(Event::Confirm);
        type_text(&mut app, "Work");
        app.handle(Event::Confirm);
        assert_eq!(app.planner.get_item(item.id).unwrap().workspace_id, Some(work.id));
    }

    #[test]
    fn test_bad_date_edit_is_rejected() {
        let mut planner = planner();
        let item = planner.add_item("plan", Target::Today, None, None).unwrap();
        let mut app = App::new(planner).unwrap();

        app.handle(Event::OpenDetails);
        app.handle(Event::Down);
        app.handle(Event::Confirm);
        type_text(&mut app, "x");
        app.handle(Event::Confirm);

        assert!(app.interaction.message.is_some());
        assert!(app.interaction.mode.is_text_entry());
        assert_eq!(
            app.planner.get_item(item.id).unwrap().scheduled_for,
            Some(date(2025, 1, 10))
        );
    }

    #[test]
    fn test_project_edit_brings_its_workspace() {
        let mut planner = planner();
        let work = planner.create_workspace("Work").unwrap();
        let home = planner.create_workspace("Home").unwrap();
        planner
            .create_project("Launch", work.id, ProjectStatus::Pending)
            .unwrap();
        let item = planner
            .add_item("plan", Target::Today, Some(home.id), None)
            .unwrap();
        let mut app = App::new(planner).unwrap();

        app.handle(Event::OpenDetails);
        for _ in 0..4 {
            app.handle(Event::Down);
        }
        app.handle(Event::Confirm);
        type_text(&mut app, "Launch");
        app.handle(Event::Confirm);

        let item = app.planner.get_item(item.id).unwrap();
        assert_eq!(item.workspace_id, Some(work.id));
        assert!(item.project_id.is_some());
        assert_eq!(app.interaction.message, None);
    }

    #[test]
    fn test_project_edit_prefers_items_workspace() {
        let mut planner = planner();
        let work = planner.create_workspace("Work").unwrap();
        let home = planner.create_workspace("Home").unwrap();
        planner
            .create_project("Admin", work.id, ProjectStatus::Pending)
            .unwrap();
        let home_admin = planner
            .create_project("Admin", home.id, ProjectStatus::Pending)
            .unwrap();
        let item = planner
            .add_item("taxes", Target::Today, Some(home.id), None)
            .unwrap();
        let loose = planner.add_item("loose", Target::Today, None, None).unwrap();
        let mut app = App::new(planner).unwrap();

        app.interaction.focus_item(&app.board, item.id);
        app.handle(Event::OpenDetails);
        for _ in 0..4 {
            app.handle(Event::Down);
        }
        app.handle(Event::Confirm);
        type_text(&mut app, "Admin");
        app.handle(Event::Confirm);

        assert_eq!(app.interaction.message, None);
        assert_eq!(app.planner.get_item(item.id).unwrap().project_id, Some(home_admin.id));

        // Without a workspace to narrow by, the duplicate name stays ambiguous
        assert!(matches!(
            app.project_for(loose.id, "Admin"),
            Err(PlannerError::Ambiguous { count: 2, .. })
        ));
    }

    #[test]
    fn test_settings_are_saved() {
        let mut app = app();
        app.handle(Event::OpenSettings);
        app.handle(Event::Char('m'));

        assert_eq!(app.planner.config().week_start, WeekStart::Monday);
        assert_eq!(app.board.days[0].0, date(2025, 1, 6));
    }

    #[test]
    fn test_tick_rolls_over_on_new_day() {
        let mut app = app();
        app.planner
            .add_item("late", Target::Today, None, None)
            .unwrap();

        assert!(!app.tick(date(2025, 1, 10)));
        assert!(app.tick(date(2025, 1, 11)));

        let items = app.planner.list_items(ListFilter::Day(date(2025, 1, 11)), true).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(app.board.today, date(2025, 1, 11));
    }

    #[test]
    fn test_escape_quits_from_base_view() {
        let mut app = app();
        assert!(app.handle(Event::Escape));
        assert!(app.handle(Event::Quit));
    }

    #[test]
    fn test_parse_date_field() {
        let today = date(2025, 1, 10);
        assert_eq!(parse_date_field("", today).unwrap(), None);
        assert_eq!(parse_date_field("Someday", today).unwrap(), None);
        assert_eq!(parse_date_field("tomorrow", today).unwrap(), Some(date(2025, 1, 11)));
        assert!(matches!(
            parse_date_field("13/01", today),
            Err(PlannerError::Validation(_))
        ));
    }
}
