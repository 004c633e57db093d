use super::enums::{ItemStatus, ProjectStatus};
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// Number of user-assignable backlog buckets
pub const BACKLOG_COLUMNS: u8 = 4;

/// The partition an item's `order_index` is relative to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    /// A calendar day on the weekly board
    Day(NaiveDate),
    /// One of the backlog buckets (0-based)
    Backlog(u8),
}

impl Column {
    pub fn is_backlog(&self) -> bool {
        matches!(self, Column::Backlog(_))
    }
}

/// Where a newly added item goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Today,
    Date(NaiveDate),
    Backlog(u8),
}

impl Target {
    /// Resolve the target against the current date
    pub fn column(&self, today: NaiveDate) -> Column {
        match self {
            Target::Today => Column::Day(today),
            Target::Date(date) => Column::Day(*date),
            Target::Backlog(column) => Column::Backlog(*column),
        }
    }
}

/// A planned piece of work, either scheduled on a day or parked in the backlog
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: Uuid,
    pub title: String,
    pub status: ItemStatus,
    /// None means the item lives in the backlog
    pub scheduled_for: Option<NaiveDate>,
    /// Position inside the column, lower renders first
    pub order_index: i64,
    /// Only meaningful when `scheduled_for` is None
    pub backlog_column: u8,
    pub notes: Option<String>,
    pub workspace_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Create a pending item placed in `column`
    pub fn new(title: String, column: Column, order_index: i64, now: DateTime<Utc>) -> Self {
        let (scheduled_for, backlog_column) = match column {
            Column::Day(date) => (Some(date), 0),
            Column::Backlog(c) => (None, c),
        };

        Self {
            id: Uuid::new_v4(),
            title,
            status: ItemStatus::Pending,
            scheduled_for,
            order_index,
            backlog_column,
            notes: None,
            workspace_id: None,
            project_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn column(&self) -> Column {
        match self.scheduled_for {
            Some(date) => Column::Day(date),
            None => Column::Backlog(self.backlog_column),
        }
    }

    pub fn is_done(&self) -> bool {
        self.status.is_done()
    }

    /// Overdue pending items are the ones rollover moves forward
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_done() && self.scheduled_for.is_some_and(|date| date < today)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Workspace {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workspace {
    pub fn new(name: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    /// Fixed at creation
    pub workspace_id: Uuid,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(name: String, workspace_id: Uuid, status: ProjectStatus, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            workspace_id,
            status,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update for an item. The outer Option means "leave unchanged",
/// the inner one allows clearing a field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    pub title: Option<String>,
    pub scheduled_for: Option<Option<NaiveDate>>,
    pub notes: Option<Option<String>>,
    pub workspace: Option<Option<Uuid>>,
    pub project: Option<Option<Uuid>>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self == &ItemPatch::default()
    }
}

/// Completion counts for a workspace or project
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
}

impl Stats {
    pub fn remaining(&self) -> usize {
        self.total - self.completed
    }
}
