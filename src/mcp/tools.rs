//! Tools exposed over the stdio server. Arguments are camelCase JSON, items
//! are referenced by id or exact title, and every answer is a JSON object.

use super::RpcError;
use crate::domain::{parse_schedule, Column, Item, ItemPatch, Target};
use crate::service::{ListFilter, Planner};
use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

/// What `tools/list` reports for one tool
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescription {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ItemView {
    id: Uuid,
    title: String,
    status: &'static str,
    scheduled_for: Option<String>,
    /// 1-based bucket, only for backlog items
    backlog_column: Option<u8>,
    order_index: i64,
    notes: Option<String>,
    workspace_id: Option<Uuid>,
    project_id: Option<Uuid>,
}

impl From<Item> for ItemView {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            status: item.status.to_tag(),
            scheduled_for: item.scheduled_for.map(|d| d.to_string()),
            backlog_column: item
                .scheduled_for
                .is_none()
                .then_some(item.backlog_column + 1),
            order_index: item.order_index,
            title: item.title,
            notes: item.notes,
            workspace_id: item.workspace_id,
            project_id: item.project_id,
        }
    }
}

#[derive(Debug, Serialize)]
struct ListView {
    scope: String,
    count: usize,
    items: Vec<ItemView>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct AddParams {
    title: String,
    scheduled_for: Option<String>,
    notes: Option<String>,
    workspace: Option<String>,
    project: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ListParams {
    scope: Option<String>,
    include_done: Option<bool>,
    workspace: Option<String>,
    project: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RefParams {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct UpdateParams {
    id: String,
    title: Option<String>,
    scheduled_for: Option<String>,
    notes: Option<String>,
    workspace: Option<String>,
    project: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MoveParams {
    id: String,
    scope: String,
}

const REF_SCHEMA: &str = "Item id (UUID) or exact title";
const DAY_SCHEMA: &str = "YYYY-MM-DD, 'today', 'tomorrow', or 'backlog' for no date";

/// The tool catalogue in `tools/list` order
pub fn descriptions() -> Vec<ToolDescription> {
    let by_ref = json!({
        "type": "object",
        "required": ["id"],
        "properties": { "id": { "type": "string", "description": REF_SCHEMA } },
        "additionalProperties": false
    });

    vec![
        ToolDescription {
            name: "add_todo",
            description: "Add an item on top of its column. Without scheduledFor it goes to today.",
            input_schema: json!({
                "type": "object",
                "required": ["title"],
                "properties": {
                    "title": { "type": "string" },
                    "scheduledFor": { "type": "string", "description": DAY_SCHEMA },
                    "notes": { "type": "string" },
                    "workspace": { "type": "string", "description": "Workspace name or id" },
                    "project": { "type": "string", "description": "Project name or id" }
                },
                "additionalProperties": false
            }),
        },
        ToolDescription {
            name: "list_todos",
            description: "List items of one day or of the backlog, pending before done.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "scope": { "type": "string", "description": "'today' (default), 'backlog' or YYYY-MM-DD" },
                    "includeDone": { "type": "boolean" },
                    "workspace": { "type": "string", "description": "Only items of this workspace" },
                    "project": { "type": "string", "description": "Only items of this project" }
                },
                "additionalProperties": false
            }),
        },
        ToolDescription {
            name: "get_todo",
            description: "Show one item.",
            input_schema: by_ref.clone(),
        },
        ToolDescription {
            name: "update_todo",
            description: "Change an item's title, day, notes, workspace or project. \
                          An empty string clears notes, workspace or project.",
            input_schema: json!({
                "type": "object",
                "required": ["id"],
                "properties": {
                    "id": { "type": "string", "description": REF_SCHEMA },
                    "title": { "type": "string" },
                    "scheduledFor": { "type": "string", "description": DAY_SCHEMA },
                    "notes": { "type": "string" },
                    "workspace": { "type": "string" },
                    "project": { "type": "string" }
                },
                "additionalProperties": false
            }),
        },
        ToolDescription {
            name: "move_todo",
            description: "Move an item to the top of another day or back to its backlog bucket.",
            input_schema: json!({
                "type": "object",
                "required": ["id", "scope"],
                "properties": {
                    "id": { "type": "string", "description": REF_SCHEMA },
                    "scope": { "type": "string", "description": DAY_SCHEMA }
                },
                "additionalProperties": false
            }),
        },
        ToolDescription {
            name: "mark_done",
            description: "Complete an item; it sinks to the bottom of its column.",
            input_schema: by_ref.clone(),
        },
        ToolDescription {
            name: "mark_pending",
            description: "Reopen a completed item at the top of its column.",
            input_schema: by_ref.clone(),
        },
        ToolDescription {
            name: "delete_todo",
            description: "Delete an item permanently.",
            input_schema: by_ref,
        },
    ]
}

/// Run one tool against the planner
pub fn call(planner: &mut Planner, name: &str, arguments: Value) -> Result<Value, RpcError> {
    match name {
        "add_todo" => add(planner, parse(arguments)?),
        "list_todos" => list(planner, parse(arguments)?),
        "get_todo" => {
            let params: RefParams = parse(arguments)?;
            item_value(planner.resolve_item(&params.id)?)
        }
        "update_todo" => update(planner, parse(arguments)?),
        "move_todo" => move_item(planner, parse(arguments)?),
        "mark_done" => {
            let params: RefParams = parse(arguments)?;
            let item = planner.resolve_item(&params.id)?;
            item_value(planner.complete(item.id)?)
        }
        "mark_pending" => {
            let params: RefParams = parse(arguments)?;
            let item = planner.resolve_item(&params.id)?;
            item_value(planner.reopen(item.id)?)
        }
        "delete_todo" => {
            let params: RefParams = parse(arguments)?;
            let item = planner.resolve_item(&params.id)?;
            planner.delete_item(item.id)?;
            Ok(json!({ "deleted": true, "id": item.id.to_string() }))
        }
        other => Err(RpcError::UnknownTool(other.to_string())),
    }
}

fn parse<T: DeserializeOwned>(arguments: Value) -> Result<T, RpcError> {
    let arguments = if arguments.is_null() {
        Value::Object(Default::default())
    } else {
        arguments
    };
    serde_json::from_value(arguments)
        .map_err(|err| RpcError::InvalidParams(format!("invalid arguments: {err}")))
}

fn item_value(item: Item) -> Result<Value, RpcError> {
    Ok(serde_json::to_value(ItemView::from(item))?)
}

/// A day, or None for the backlog
fn parse_day_arg(value: &str, today: NaiveDate) -> Result<Option<NaiveDate>, RpcError> {
    parse_schedule(value, today).ok_or_else(|| {
        RpcError::InvalidParams(format!(
            "'{value}' is not a day (use YYYY-MM-DD, today, tomorrow or backlog)"
        ))
    })
}

fn add(planner: &mut Planner, params: AddParams) -> Result<Value, RpcError> {
    let target = match params.scheduled_for.as_deref() {
        None => Target::Today,
        Some(day) => match parse_day_arg(day, planner.today())? {
            Some(date) => Target::Date(date),
            None => Target::Backlog(0),
        },
    };
    let (workspace, project) =
        planner.resolve_owner(params.workspace.as_deref(), params.project.as_deref())?;

    let mut item = planner.add_item(&params.title, target, workspace, project)?;
    if let Some(notes) = params.notes.filter(|n| !n.trim().is_empty()) {
        let patch = ItemPatch {
            notes: Some(Some(notes)),
            ..ItemPatch::default()
        };
        item = planner.update_item(item.id, patch)?;
    }
    item_value(item)
}

fn list(planner: &mut Planner, params: ListParams) -> Result<Value, RpcError> {
    let scope = params.scope.unwrap_or_else(|| "today".to_string());
    let filter = match parse_day_arg(&scope, planner.today())? {
        Some(date) => ListFilter::Day(date),
        None => ListFilter::Backlog,
    };

    // Owners only narrow the listing, so a project outside the workspace
    // simply matches nothing
    let workspace = params
        .workspace
        .as_deref()
        .map(|r| planner.resolve_workspace(r))
        .transpose()?
        .map(|w| w.id);
    let project = params
        .project
        .as_deref()
        .map(|r| planner.resolve_project_near(r, workspace))
        .transpose()?
        .map(|p| p.id);

    let mut items = planner.list_items(filter, params.include_done.unwrap_or(false))?;
    items.retain(|item| {
        workspace.map_or(true, |id| item.workspace_id == Some(id))
            && project.map_or(true, |id| item.project_id == Some(id))
    });

    let view = ListView {
        scope,
        count: items.len(),
        items: items.into_iter().map(ItemView::from).collect(),
    };
    Ok(serde_json::to_value(view)?)
}

fn update(planner: &mut Planner, params: UpdateParams) -> Result<Value, RpcError> {
    let item = planner.resolve_item(&params.id)?;
    let mut patch = ItemPatch {
        title: params.title,
        notes: params.notes.map(Some),
        ..ItemPatch::default()
    };

    if let Some(day) = params.scheduled_for.as_deref() {
        patch.scheduled_for = Some(parse_day_arg(day, planner.today())?);
    }

    if let Some(reference) = params.workspace.as_deref() {
        patch.workspace = Some(match reference.trim() {
            "" => None,
            name => Some(planner.resolve_workspace(name)?.id),
        });
    }

    if let Some(reference) = params.project.as_deref() {
        let near = patch.workspace.flatten().or(item.workspace_id);
        patch.project = Some(match reference.trim() {
            "" => None,
            name => Some(planner.resolve_project_near(name, near)?.id),
        });
    }

    if patch.is_empty() {
        return Err(RpcError::InvalidParams("no fields to update".to_string()));
    }
    item_value(planner.update_item(item.id, patch)?)
}

fn move_item(planner: &mut Planner, params: MoveParams) -> Result<Value, RpcError> {
    let item = planner.resolve_item(&params.id)?;
    let destination = match parse_day_arg(&params.scope, planner.today())? {
        Some(date) => Column::Day(date),
        None => Column::Backlog(item.backlog_column),
    };
    item_value(planner.move_item(item.id, destination)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ItemStatus, ProjectStatus};
    use crate::error::PlannerError;
    use crate::service::test_support::*;
    use pretty_assertions::assert_eq;

    fn run(planner: &mut Planner, name: &str, arguments: Value) -> Value {
        call(planner, name, arguments).unwrap()
    }

    #[test]
    fn test_catalogue_names_are_unique() {
        let tools = descriptions();
        let mut names: Vec<&str> = tools.iter().map(|t| t.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 8);
        assert!(tools.iter().all(|t| t.input_schema["type"] == "object"));
    }

    #[test]
    fn test_add_defaults_to_today_and_accepts_backlog() {
        let mut planner = planner();
        let today = run(&mut planner, "add_todo", json!({ "title": "Buy milk" }));
        assert_eq!(today["scheduledFor"], "2025-01-10");
        assert_eq!(today["status"], "pending");
        assert_eq!(today["backlogColumn"], Value::Null);

        let later = run(
            &mut planner,
            "add_todo",
            json!({ "title": "Learn piano", "scheduledFor": "backlog", "notes": "scales first" }),
        );
        assert_eq!(later["scheduledFor"], Value::Null);
        assert_eq!(later["backlogColumn"], 1);
        assert_eq!(later["notes"], "scales first");
    }

    #[test]
    fn test_add_with_project_brings_workspace() {
        let mut planner = planner();
        let work = planner.create_workspace("Work").unwrap();
        let launch = planner
            .create_project("Launch", work.id, ProjectStatus::Pending)
            .unwrap();

        let item = run(&mut planner, "add_todo", json!({ "title": "ship", "project": "Launch" }));
        assert_eq!(item["workspaceId"], work.id.to_string());
        assert_eq!(item["projectId"], launch.id.to_string());
    }

    #[test]
    fn test_list_scope_and_owner_filters() {
        let mut planner = planner();
        let work = planner.create_workspace("Work").unwrap();
        planner.add_item("report", Target::Today, Some(work.id), None).unwrap();
        planner.add_item("laundry", Target::Today, None, None).unwrap();
        planner.add_item("piano", Target::Backlog(2), None, None).unwrap();
        let done = planner.add_item("call", Target::Today, None, None).unwrap();
        planner.complete(done.id).unwrap();

        let today = run(&mut planner, "list_todos", json!({}));
        assert_eq!(today["scope"], "today");
        assert_eq!(today["count"], 2);
        assert_eq!(today["items"][0]["title"], "laundry");

        let with_done = run(&mut planner, "list_todos", json!({ "includeDone": true }));
        assert_eq!(with_done["count"], 3);
        assert_eq!(with_done["items"][2]["status"], "done");

        let work_only = run(&mut planner, "list_todos", json!({ "workspace": "Work" }));
        assert_eq!(work_only["count"], 1);
        assert_eq!(work_only["items"][0]["title"], "report");

        let backlog = run(&mut planner, "list_todos", json!({ "scope": "backlog" }));
        assert_eq!(backlog["items"][0]["backlogColumn"], 3);
    }

    #[test]
    fn test_update_sets_and_clears_fields() {
        let mut planner = planner();
        let work = planner.create_workspace("Work").unwrap();
        let item = planner.add_item("plan", Target::Today, None, None).unwrap();
        let id = item.id.to_string();

        let updated = run(
            &mut planner,
            "update_todo",
            json!({ "id": id, "title": "plan week", "scheduledFor": "2025-01-13",
                    "notes": "monday", "workspace": "Work" }),
        );
        assert_eq!(updated["title"], "plan week");
        assert_eq!(updated["scheduledFor"], "2025-01-13");
        assert_eq!(updated["workspaceId"], work.id.to_string());

        let cleared = run(
            &mut planner,
            "update_todo",
            json!({ "id": "plan week", "notes": "", "workspace": "" }),
        );
        assert_eq!(cleared["notes"], Value::Null);
        assert_eq!(cleared["workspaceId"], Value::Null);

        let err = call(&mut planner, "update_todo", json!({ "id": "plan week" })).unwrap_err();
        assert!(matches!(err, RpcError::InvalidParams(_)));
    }

    #[test]
    fn test_move_to_day_and_back_to_bucket() {
        let mut planner = planner();
        planner.add_item("piano", Target::Backlog(2), None, None).unwrap();

        let moved = run(&mut planner, "move_todo", json!({ "id": "piano", "scope": "tomorrow" }));
        assert_eq!(moved["scheduledFor"], "2025-01-11");

        let back = run(&mut planner, "move_todo", json!({ "id": "piano", "scope": "backlog" }));
        assert_eq!(back["backlogColumn"], 3);
    }

    #[test]
    fn test_done_pending_and_delete() {
        let mut planner = planner();
        let item = planner.add_item("call", Target::Today, None, None).unwrap();

        let done = run(&mut planner, "mark_done", json!({ "id": "call" }));
        assert_eq!(done["status"], "done");
        let pending = run(&mut planner, "mark_pending", json!({ "id": item.id.to_string() }));
        assert_eq!(pending["status"], "pending");

        let deleted = run(&mut planner, "delete_todo", json!({ "id": "call" }));
        assert_eq!(deleted, json!({ "deleted": true, "id": item.id.to_string() }));
        assert!(matches!(
            planner.get_item(item.id),
            Err(PlannerError::NotFound { .. })
        ));
    }

    #[test]
    fn test_errors_map_to_kinds() {
        let mut planner = planner();
        planner.add_item("Standup", Target::Today, None, None).unwrap();
        planner.add_item("Standup", Target::Today, None, None).unwrap();

        let err = call(&mut planner, "mark_done", json!({ "id": "Standup" })).unwrap_err();
        assert!(matches!(err, RpcError::Planner(PlannerError::Ambiguous { count: 2, .. })));
        // Nothing completed
        let items = planner.list_items(ListFilter::Today, true).unwrap();
        assert!(items.iter().all(|i| i.status == ItemStatus::Pending));

        let err = call(&mut planner, "add_todo", json!({ "title": "x", "scheduledFor": "soon" }))
            .unwrap_err();
        assert!(matches!(err, RpcError::InvalidParams(_)));

        let err = call(&mut planner, "add_todo", json!({ "title": "x", "colour": "red" }))
            .unwrap_err();
        assert!(matches!(err, RpcError::InvalidParams(_)));

        let err = call(&mut planner, "add_todo", json!({ "title": "  " })).unwrap_err();
        assert!(matches!(err, RpcError::Planner(PlannerError::Validation(_))));

        let err = call(&mut planner, "archive_todo", json!({})).unwrap_err();
        assert!(matches!(err, RpcError::UnknownTool(_)));
    }
}
