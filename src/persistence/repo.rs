//! Row level access to items, workspaces and projects.
//!
//! Every function takes a `&Connection` so it can run either directly or
//! inside a transaction opened by `Store::with_tx`.

use crate::domain::{Column, Item, ItemStatus, Project, ProjectStatus, Stats, Workspace};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{
    params, params_from_iter,
    types::{Type, Value},
    Connection, OptionalExtension, Row,
};
use std::error::Error as StdError;
use uuid::Uuid;

const DATE_FORMAT: &str = "%Y-%m-%d";

const ITEM_COLUMNS: &str = "id, title, status, scheduled_for, order_index, backlog_column, \
     notes, workspace_id, project_id, created_at, updated_at";

/// Pending rows first, then by position
const BOARD_ORDER: &str =
    "CASE status WHEN 'done' THEN 1 ELSE 0 END, order_index, created_at, id";

/// Order in which overdue rows are carried forward
const ROLLOVER_ORDER: &str = "order_index, scheduled_for, created_at, id";

/// Predicate on item rows; several are combined with AND
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemFilter {
    Column(Column),
    AnyBacklog,
    Status(ItemStatus),
    Workspace(Uuid),
    Project(Uuid),
    /// Items not attached to any project
    NoProject,
    /// Pending and dated strictly before the given day
    OverdueBefore(NaiveDate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOrder {
    Board,
    Rollover,
}

fn conversion_error(idx: usize, err: impl Into<Box<dyn StdError + Send + Sync>>) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err.into())
}

pub fn date_to_sql(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn read_uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw).map_err(|e| conversion_error(idx, e))
}

fn read_opt_uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Uuid>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| Uuid::parse_str(&s).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

fn read_opt_date(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

fn read_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<Item> {
    let status: String = row.get(2)?;
    let status = ItemStatus::from_tag(&status)
        .ok_or_else(|| conversion_error(2, format!("unknown item status '{status}'")))?;

    Ok(Item {
        id: read_uuid(row, 0)?,
        title: row.get(1)?,
        status,
        scheduled_for: read_opt_date(row, 3)?,
        order_index: row.get(4)?,
        backlog_column: row.get(5)?,
        notes: row.get(6)?,
        workspace_id: read_opt_uuid(row, 7)?,
        project_id: read_opt_uuid(row, 8)?,
        created_at: read_timestamp(row, 9)?,
        updated_at: read_timestamp(row, 10)?,
    })
}

fn workspace_from_row(row: &Row<'_>) -> rusqlite::Result<Workspace> {
    Ok(Workspace {
        id: read_uuid(row, 0)?,
        name: row.get(1)?,
        created_at: read_timestamp(row, 2)?,
        updated_at: read_timestamp(row, 3)?,
    })
}

fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    let status: String = row.get(3)?;
    let status = ProjectStatus::from_tag(&status)
        .ok_or_else(|| conversion_error(3, format!("unknown project status '{status}'")))?;

    Ok(Project {
        id: read_uuid(row, 0)?,
        name: row.get(1)?,
        workspace_id: read_uuid(row, 2)?,
        status,
        created_at: read_timestamp(row, 4)?,
        updated_at: read_timestamp(row, 5)?,
    })
}

/// Build a WHERE clause and its bound values
fn where_clause(filters: &[ItemFilter], title: Option<&str>) -> (String, Vec<Value>) {
    let mut clauses = Vec::new();
    let mut values = Vec::new();

    for filter in filters {
        match filter {
            ItemFilter::Column(Column::Day(date)) => {
                clauses.push("scheduled_for = ?");
                values.push(Value::Text(date_to_sql(*date)));
            }
            ItemFilter::Column(Column::Backlog(column)) => {
                clauses.push("scheduled_for IS NULL AND backlog_column = ?");
                values.push(Value::Integer(i64::from(*column)));
            }
            ItemFilter::AnyBacklog => clauses.push("scheduled_for IS NULL"),
            ItemFilter::Status(status) => {
                clauses.push("status = ?");
                values.push(Value::Text(status.to_tag().to_string()));
            }
            ItemFilter::Workspace(id) => {
                clauses.push("workspace_id = ?");
                values.push(Value::Text(id.to_string()));
            }
            ItemFilter::Project(id) => {
                clauses.push("project_id = ?");
                values.push(Value::Text(id.to_string()));
            }
            ItemFilter::NoProject => clauses.push("project_id IS NULL"),
            ItemFilter::OverdueBefore(date) => {
                clauses.push("status = 'pending' AND scheduled_for IS NOT NULL AND scheduled_for < ?");
                values.push(Value::Text(date_to_sql(*date)));
            }
        }
    }

    if let Some(title) = title {
        clauses.push("title = ?");
        values.push(Value::Text(title.to_string()));
    }

    if clauses.is_empty() {
        (String::new(), values)
    } else {
        (format!(" WHERE {}", clauses.join(" AND ")), values)
    }
}

// ---- items ----

pub fn insert_item(conn: &Connection, item: &Item) -> rusqlite::Result<()> {
    conn.execute(
        &format!("INSERT INTO items ({ITEM_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"),
        params![
            item.id.to_string(),
            item.title,
            item.status.to_tag(),
            item.scheduled_for.map(date_to_sql),
            item.order_index,
            item.backlog_column,
            item.notes,
            item.workspace_id.map(|id| id.to_string()),
            item.project_id.map(|id| id.to_string()),
            item.created_at.to_rfc3339(),
            item.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get_item(conn: &Connection, id: Uuid) -> rusqlite::Result<Option<Item>> {
    conn.query_row(
        &format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1"),
        params![id.to_string()],
        item_from_row,
    )
    .optional()
}

/// Write every mutable field of `item` back to its row
pub fn update_item_fields(conn: &Connection, item: &Item) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE items SET title = ?2, status = ?3, scheduled_for = ?4, order_index = ?5, \
         backlog_column = ?6, notes = ?7, workspace_id = ?8, project_id = ?9, updated_at = ?10 \
         WHERE id = ?1",
        params![
            item.id.to_string(),
            item.title,
            item.status.to_tag(),
            item.scheduled_for.map(date_to_sql),
            item.order_index,
            item.backlog_column,
            item.notes,
            item.workspace_id.map(|id| id.to_string()),
            item.project_id.map(|id| id.to_string()),
            item.updated_at.to_rfc3339(),
        ],
    )
}

pub fn set_order_index(
    conn: &Connection,
    id: Uuid,
    order_index: i64,
    now: DateTime<Utc>,
) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE items SET order_index = ?2, updated_at = ?3 WHERE id = ?1",
        params![id.to_string(), order_index, now.to_rfc3339()],
    )?;
    Ok(())
}

pub fn delete_item(conn: &Connection, id: Uuid) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM items WHERE id = ?1", params![id.to_string()])
}

/// Items matching every filter, in the requested order
pub fn query_items(
    conn: &Connection,
    filters: &[ItemFilter],
    order: ItemOrder,
) -> rusqlite::Result<Vec<Item>> {
    select_items(conn, filters, None, order)
}

/// Items whose title is exactly `title`
pub fn items_titled(conn: &Connection, title: &str) -> rusqlite::Result<Vec<Item>> {
    select_items(conn, &[], Some(title), ItemOrder::Board)
}

fn select_items(
    conn: &Connection,
    filters: &[ItemFilter],
    title: Option<&str>,
    order: ItemOrder,
) -> rusqlite::Result<Vec<Item>> {
    let (clause, values) = where_clause(filters, title);
    let order_by = match order {
        ItemOrder::Board => BOARD_ORDER,
        ItemOrder::Rollover => ROLLOVER_ORDER,
    };
    let sql = format!("SELECT {ITEM_COLUMNS} FROM items{clause} ORDER BY {order_by}");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values), item_from_row)?;
    rows.collect()
}

fn order_bound(
    conn: &Connection,
    aggregate: &str,
    column: Column,
    status: Option<ItemStatus>,
) -> rusqlite::Result<Option<i64>> {
    let mut filters = vec![ItemFilter::Column(column)];
    if let Some(status) = status {
        filters.push(ItemFilter::Status(status));
    }
    let (clause, values) = where_clause(&filters, None);
    conn.query_row(
        &format!("SELECT {aggregate}(order_index) FROM items{clause}"),
        params_from_iter(values),
        |row| row.get(0),
    )
}

/// Smallest `order_index` in a column, optionally for one status
pub fn min_order_index(
    conn: &Connection,
    column: Column,
    status: Option<ItemStatus>,
) -> rusqlite::Result<Option<i64>> {
    order_bound(conn, "MIN", column, status)
}

/// Largest `order_index` in a column, optionally for one status
pub fn max_order_index(
    conn: &Connection,
    column: Column,
    status: Option<ItemStatus>,
) -> rusqlite::Result<Option<i64>> {
    order_bound(conn, "MAX", column, status)
}

/// Detach items from a project, or from a workspace and all its projects
pub fn detach_items(
    conn: &Connection,
    filter: ItemFilter,
    now: DateTime<Utc>,
) -> rusqlite::Result<usize> {
    let (sql, id) = match filter {
        ItemFilter::Project(id) => (
            "UPDATE items SET project_id = NULL, updated_at = ?2 WHERE project_id = ?1",
            id,
        ),
        ItemFilter::Workspace(id) => (
            "UPDATE items SET project_id = NULL, workspace_id = NULL, updated_at = ?2 \
             WHERE workspace_id = ?1",
            id,
        ),
        _ => return Ok(0),
    };
    conn.execute(sql, params![id.to_string(), now.to_rfc3339()])
}

/// Completion counts over the items matching `filter`
pub fn item_stats(conn: &Connection, filter: ItemFilter) -> rusqlite::Result<Stats> {
    let (clause, values) = where_clause(&[filter], None);
    conn.query_row(
        &format!(
            "SELECT COUNT(*), COALESCE(SUM(CASE status WHEN 'done' THEN 1 ELSE 0 END), 0) \
             FROM items{clause}"
        ),
        params_from_iter(values),
        |row| {
            let total: i64 = row.get(0)?;
            let completed: i64 = row.get(1)?;
            Ok(Stats {
                total: total as usize,
                completed: completed as usize,
            })
        },
    )
}

// ---- workspaces ----

pub fn insert_workspace(conn: &Connection, workspace: &Workspace) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO workspaces (id, name, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)",
        params![
            workspace.id.to_string(),
            workspace.name,
            workspace.created_at.to_rfc3339(),
            workspace.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get_workspace(conn: &Connection, id: Uuid) -> rusqlite::Result<Option<Workspace>> {
    conn.query_row(
        "SELECT id, name, created_at, updated_at FROM workspaces WHERE id = ?1",
        params![id.to_string()],
        workspace_from_row,
    )
    .optional()
}

pub fn list_workspaces(conn: &Connection) -> rusqlite::Result<Vec<Workspace>> {
    let mut stmt =
        conn.prepare("SELECT id, name, created_at, updated_at FROM workspaces ORDER BY name, created_at")?;
    let rows = stmt.query_map([], workspace_from_row)?;
    rows.collect()
}

pub fn workspaces_named(conn: &Connection, name: &str) -> rusqlite::Result<Vec<Workspace>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, created_at, updated_at FROM workspaces WHERE name = ?1 ORDER BY created_at",
    )?;
    let rows = stmt.query_map(params![name], workspace_from_row)?;
    rows.collect()
}

pub fn rename_workspace(
    conn: &Connection,
    id: Uuid,
    name: &str,
    now: DateTime<Utc>,
) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE workspaces SET name = ?2, updated_at = ?3 WHERE id = ?1",
        params![id.to_string(), name, now.to_rfc3339()],
    )
}

pub fn delete_workspace(conn: &Connection, id: Uuid) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM workspaces WHERE id = ?1", params![id.to_string()])
}

// ---- projects ----

const PROJECT_COLUMNS: &str = "id, name, workspace_id, status, created_at, updated_at";

pub fn insert_project(conn: &Connection, project: &Project) -> rusqlite::Result<()> {
    conn.execute(
        &format!("INSERT INTO projects ({PROJECT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
        params![
            project.id.to_string(),
            project.name,
            project.workspace_id.to_string(),
            project.status.to_tag(),
            project.created_at.to_rfc3339(),
            project.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get_project(conn: &Connection, id: Uuid) -> rusqlite::Result<Option<Project>> {
    conn.query_row(
        &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1"),
        params![id.to_string()],
        project_from_row,
    )
    .optional()
}

/// Projects, optionally restricted to one workspace
pub fn list_projects(conn: &Connection, workspace: Option<Uuid>) -> rusqlite::Result<Vec<Project>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PROJECT_COLUMNS} FROM projects \
         WHERE (?1 IS NULL OR workspace_id = ?1) ORDER BY name, created_at"
    ))?;
    let rows = stmt.query_map(params![workspace.map(|id| id.to_string())], project_from_row)?;
    rows.collect()
}

pub fn projects_named(
    conn: &Connection,
    name: &str,
    workspace: Option<Uuid>,
) -> rusqlite::Result<Vec<Project>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PROJECT_COLUMNS} FROM projects \
         WHERE name = ?1 AND (?2 IS NULL OR workspace_id = ?2) ORDER BY created_at"
    ))?;
    let rows = stmt.query_map(
        params![name, workspace.map(|id| id.to_string())],
        project_from_row,
    )?;
    rows.collect()
}

pub fn update_project(conn: &Connection, project: &Project) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE projects SET name = ?2, status = ?3, updated_at = ?4 WHERE id = ?1",
        params![
            project.id.to_string(),
            project.name,
            project.status.to_tag(),
            project.updated_at.to_rfc3339(),
        ],
    )
}

pub fn delete_project(conn: &Connection, id: Uuid) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM projects WHERE id = ?1", params![id.to_string()])
}

pub fn delete_projects_in(conn: &Connection, workspace_id: Uuid) -> rusqlite::Result<usize> {
    conn.execute(
        "DELETE FROM projects WHERE workspace_id = ?1",
        params![workspace_id.to_string()],
    )
}
