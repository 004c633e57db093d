use crate::domain::{week_days, Column, Config, Item, Project, Workspace, BACKLOG_COLUMNS};
use crate::error::PlannerResult;
use crate::service::{ListFilter, Planner};
use chrono::NaiveDate;
use uuid::Uuid;

/// Read-only snapshot of everything the screen shows
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    pub today: NaiveDate,
    pub config: Config,
    /// The seven days of the visible week with their items
    pub days: Vec<(NaiveDate, Vec<Item>)>,
    pub backlog: Vec<Vec<Item>>,
    pub workspaces: Vec<Workspace>,
    pub projects: Vec<Project>,
}

impl Board {
    /// Load the week containing `focused_date` plus the whole backlog
    pub fn load(planner: &Planner, focused_date: NaiveDate) -> PlannerResult<Self> {
        let config = planner.config();

        let mut days = Vec::with_capacity(7);
        for date in week_days(focused_date, config.week_start) {
            days.push((date, planner.list_items(ListFilter::Day(date), true)?));
        }

        let mut backlog = Vec::with_capacity(usize::from(BACKLOG_COLUMNS));
        for column in 0..BACKLOG_COLUMNS {
            backlog.push(planner.list_items(ListFilter::BacklogColumn(column), true)?);
        }

        Ok(Self {
            today: planner.today(),
            config,
            days,
            backlog,
            workspaces: planner.list_workspaces()?,
            projects: planner.list_projects(None)?,
        })
    }

    /// Items of a column in display order; empty when it is not loaded
    pub fn column_items(&self, column: Column) -> &[Item] {
        match column {
            Column::Day(date) => self
                .days
                .iter()
                .find(|(d, _)| *d == date)
                .map(|(_, items)| items.as_slice())
                .unwrap_or(&[]),
            Column::Backlog(c) => self
                .backlog
                .get(usize::from(c))
                .map(|items| items.as_slice())
                .unwrap_or(&[]),
        }
    }

    /// Column and row of an item, if it is on the board
    pub fn position(&self, id: Uuid) -> Option<(Column, usize)> {
        let days = self
            .days
            .iter()
            .map(|(date, items)| (Column::Day(*date), items));
        let backlog = self
            .backlog
            .iter()
            .enumerate()
            .map(|(c, items)| (Column::Backlog(c as u8), items));

        days.chain(backlog).find_map(|(column, items)| {
            items
                .iter()
                .position(|item| item.id == id)
                .map(|row| (column, row))
        })
    }

    pub fn item(&self, id: Uuid) -> Option<&Item> {
        self.position(id)
            .and_then(|(column, row)| self.column_items(column).get(row))
    }

    pub fn workspace_name(&self, id: Option<Uuid>) -> Option<&str> {
        let id = id?;
        self.workspaces
            .iter()
            .find(|w| w.id == id)
            .map(|w| w.name.as_str())
    }

    pub fn project_name(&self, id: Option<Uuid>) -> Option<&str> {
        let id = id?;
        self.projects
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.name.as_str())
    }
}
