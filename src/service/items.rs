use super::Planner;
use crate::domain::{
    Column, Item, ItemPatch, ItemStatus, ReorderDirection, Target, BACKLOG_COLUMNS,
};
use crate::error::{PlannerError, PlannerResult};
use crate::persistence::repo::{self, ItemFilter, ItemOrder};
use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use uuid::Uuid;

/// Which items a listing covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFilter {
    Today,
    Day(NaiveDate),
    /// Every backlog column
    Backlog,
    BacklogColumn(u8),
    /// Completed items only
    Done,
    Workspace(Uuid),
    Project(Uuid),
}

fn validate_title(title: &str) -> PlannerResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(PlannerError::validation("title cannot be empty"));
    }
    Ok(title.to_string())
}

fn validate_column(column: Column) -> PlannerResult<()> {
    match column {
        Column::Backlog(c) if c >= BACKLOG_COLUMNS => Err(PlannerError::validation(format!(
            "backlog column must be between 1 and {BACKLOG_COLUMNS}"
        ))),
        _ => Ok(()),
    }
}

fn load_item(conn: &Connection, id: Uuid) -> PlannerResult<Item> {
    repo::get_item(conn, id)?.ok_or_else(|| PlannerError::not_found("item", id.to_string()))
}

/// Index that places an item above everything currently in `column`
fn top_of(conn: &Connection, column: Column) -> PlannerResult<i64> {
    Ok(repo::min_order_index(conn, column, None)?.map_or(0, |min| min - 1))
}

/// Index that places an item below everything currently in `column`
fn bottom_of(conn: &Connection, column: Column) -> PlannerResult<i64> {
    Ok(repo::max_order_index(conn, column, None)?.map_or(0, |max| max + 1))
}

/// Workspace/project pair for an item. A project always brings its own
/// workspace; naming a different workspace alongside it is a conflict.
pub(crate) fn derive_owner(
    conn: &Connection,
    workspace: Option<Uuid>,
    project: Option<Uuid>,
) -> PlannerResult<(Option<Uuid>, Option<Uuid>)> {
    if let Some(project_id) = project {
        let project = repo::get_project(conn, project_id)?
            .ok_or_else(|| PlannerError::not_found("project", project_id.to_string()))?;
        if let Some(workspace_id) = workspace {
            if workspace_id != project.workspace_id {
                return Err(PlannerError::Conflict(format!(
                    "project '{}' does not belong to the given workspace",
                    project.name
                )));
            }
        }
        return Ok((Some(project.workspace_id), Some(project_id)));
    }

    if let Some(workspace_id) = workspace {
        if repo::get_workspace(conn, workspace_id)?.is_none() {
            return Err(PlannerError::not_found("workspace", workspace_id.to_string()));
        }
    }
    Ok((workspace, None))
}

impl Planner {
    /// Create an item at the top of its column
    pub fn add_item(
        &mut self,
        title: &str,
        target: Target,
        workspace: Option<Uuid>,
        project: Option<Uuid>,
    ) -> PlannerResult<Item> {
        let title = validate_title(title)?;
        let column = target.column(self.today);
        validate_column(column)?;

        let item = self.store.with_tx(|tx| {
            let (workspace_id, project_id) = derive_owner(tx, workspace, project)?;
            let mut item = Item::new(title, column, top_of(tx, column)?, Utc::now());
            item.workspace_id = workspace_id;
            item.project_id = project_id;
            repo::insert_item(tx, &item)?;
            Ok(item)
        })?;

        tracing::debug!(id = %item.id, column = ?column, "added item");
        Ok(item)
    }

    pub fn get_item(&self, id: Uuid) -> PlannerResult<Item> {
        load_item(self.store.conn(), id)
    }

    /// Items for a view, pending before done and then by position
    pub fn list_items(&self, filter: ListFilter, include_done: bool) -> PlannerResult<Vec<Item>> {
        self.query_items(filter, include_done, None)
    }

    /// Like `list_items`, restricted to items without a project
    pub fn list_unassigned(&self, filter: ListFilter, include_done: bool) -> PlannerResult<Vec<Item>> {
        self.query_items(filter, include_done, Some(ItemFilter::NoProject))
    }

    fn query_items(
        &self,
        filter: ListFilter,
        include_done: bool,
        extra: Option<ItemFilter>,
    ) -> PlannerResult<Vec<Item>> {
        let mut filters = match filter {
            ListFilter::Today => vec![ItemFilter::Column(Column::Day(self.today))],
            ListFilter::Day(date) => vec![ItemFilter::Column(Column::Day(date))],
            ListFilter::Backlog => vec![ItemFilter::AnyBacklog],
            ListFilter::BacklogColumn(c) => vec![ItemFilter::Column(Column::Backlog(c))],
            ListFilter::Done => vec![ItemFilter::Status(ItemStatus::Done)],
            ListFilter::Workspace(id) => vec![ItemFilter::Workspace(id)],
            ListFilter::Project(id) => vec![ItemFilter::Project(id)],
        };
        if !include_done && filter != ListFilter::Done {
            filters.push(ItemFilter::Status(ItemStatus::Pending));
        }
        filters.extend(extra);

        Ok(repo::query_items(self.store.conn(), &filters, ItemOrder::Board)?)
    }

    /// Mark an item done and sink it to the bottom of its column.
    /// A backlog item is scheduled for today on completion.
    pub fn complete(&mut self, id: Uuid) -> PlannerResult<Item> {
        let today = self.today;
        self.store.with_tx(|tx| {
            let mut item = load_item(tx, id)?;
            if item.is_done() {
                return Ok(item);
            }

            if item.scheduled_for.is_none() {
                item.scheduled_for = Some(today);
            }
            item.order_index = bottom_of(tx, item.column())?;
            item.status = ItemStatus::Done;
            item.updated_at = Utc::now();
            repo::update_item_fields(tx, &item)?;
            Ok(item)
        })
    }

    /// Mark an item pending again, back at the top of its column. The date stays.
    pub fn reopen(&mut self, id: Uuid) -> PlannerResult<Item> {
        self.store.with_tx(|tx| {
            let mut item = load_item(tx, id)?;
            if !item.is_done() {
                return Ok(item);
            }

            item.order_index = top_of(tx, item.column())?;
            item.status = ItemStatus::Pending;
            item.updated_at = Utc::now();
            repo::update_item_fields(tx, &item)?;
            Ok(item)
        })
    }

    /// Move an item to another day or backlog column, placing it on top
    pub fn move_item(&mut self, id: Uuid, destination: Column) -> PlannerResult<Item> {
        validate_column(destination)?;

        let item = self.store.with_tx(|tx| {
            let mut item = load_item(tx, id)?;
            if item.column() == destination {
                return Ok(item);
            }

            match destination {
                Column::Day(date) => item.scheduled_for = Some(date),
                Column::Backlog(c) => {
                    item.scheduled_for = None;
                    item.backlog_column = c;
                }
            }
            item.order_index = top_of(tx, destination)?;
            item.updated_at = Utc::now();
            repo::update_item_fields(tx, &item)?;
            Ok(item)
        })?;

        tracing::debug!(id = %id, destination = ?destination, "moved item");
        Ok(item)
    }

    /// Swap an item with its neighbour in the same column and status group.
    /// Does nothing at either end.
    pub fn reorder_item(&mut self, id: Uuid, direction: ReorderDirection) -> PlannerResult<Item> {
        self.store.with_tx(|tx| {
            let item = load_item(tx, id)?;
            let mut group = repo::query_items(
                tx,
                &[
                    ItemFilter::Column(item.column()),
                    ItemFilter::Status(item.status),
                ],
                ItemOrder::Board,
            )?;

            let Some(pos) = group.iter().position(|i| i.id == id) else {
                return Ok(item);
            };
            let neighbour = match direction {
                ReorderDirection::Up => pos.checked_sub(1),
                ReorderDirection::Down => Some(pos + 1).filter(|n| *n < group.len()),
            };
            let Some(neighbour) = neighbour else {
                return Ok(item);
            };
            group.swap(pos, neighbour);

            // Renumber densely so ties can never survive a swap
            let now = Utc::now();
            for (index, member) in group.iter().enumerate() {
                let index = index as i64;
                if member.order_index != index {
                    repo::set_order_index(tx, member.id, index, now)?;
                }
            }

            load_item(tx, id)
        })
    }

    /// Permanently remove an item, returning its last state
    pub fn delete_item(&mut self, id: Uuid) -> PlannerResult<Item> {
        let item = self.store.with_tx(|tx| {
            let item = load_item(tx, id)?;
            repo::delete_item(tx, id)?;
            Ok(item)
        })?;

        tracing::info!(id = %id, title = %item.title, "deleted item");
        Ok(item)
    }

    /// Apply a partial update
    pub fn update_item(&mut self, id: Uuid, patch: ItemPatch) -> PlannerResult<Item> {
        let title = patch.title.as_deref().map(validate_title).transpose()?;

        self.store.with_tx(|tx| {
            let mut item = load_item(tx, id)?;

            if let Some(title) = title {
                item.title = title;
            }

            if patch.workspace.is_some() || patch.project.is_some() {
                let project = patch.project.unwrap_or(item.project_id);
                let (workspace_id, project_id) = match (project, patch.workspace) {
                    (Some(_), Some(None)) => {
                        return Err(PlannerError::Conflict(
                            "cannot clear the workspace of an item that has a project".to_string(),
                        ))
                    }
                    (Some(project_id), workspace) => {
                        derive_owner(tx, workspace.flatten(), Some(project_id))?
                    }
                    (None, Some(workspace)) => derive_owner(tx, workspace, None)?,
                    (None, None) => (item.workspace_id, None),
                };
                item.workspace_id = workspace_id;
                item.project_id = project_id;
            }

            if let Some(scheduled_for) = patch.scheduled_for {
                if scheduled_for != item.scheduled_for {
                    item.scheduled_for = scheduled_for;
                    item.order_index = top_of(tx, item.column())?;
                }
            }

            if let Some(notes) = patch.notes {
                item.notes = notes.filter(|n| !n.trim().is_empty());
            }

            item.updated_at = Utc::now();
            repo::update_item_fields(tx, &item)?;
            Ok(item)
        })
    }
}
