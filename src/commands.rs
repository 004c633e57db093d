//! One-shot command line operations. Each handler resolves its references,
//! makes one planner call and prints a short confirmation.

use crate::domain::{
    parse_schedule, Column, Config, Item, ItemPatch, ProjectStatus, Target, WeekStart,
};
use crate::error::PlannerError;
use crate::persistence::init_local_dir;
use crate::service::{ListFilter, Planner};
use anyhow::Result;
use clap::{error::ErrorKind, Args, Subcommand};
use std::io::Write;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a local .weekboard directory in the current directory
    Init,
    /// Add an item for today, or to the backlog with --some-day
    #[command(visible_alias = "a")]
    Add(AddArgs),
    /// List today's items, or the backlog with --some-day
    #[command(visible_alias = "l")]
    List(ListArgs),
    /// Mark an item as done
    #[command(visible_alias = "d")]
    Done(RefArgs),
    /// Mark a done item as pending again
    #[command(visible_alias = "r")]
    Reopen(RefArgs),
    /// Change an item's fields
    #[command(visible_alias = "u")]
    Update(UpdateArgs),
    /// Move an item to a day or to the backlog
    #[command(visible_alias = "m")]
    Move(MoveArgs),
    /// Delete an item
    #[command(visible_alias = "rm")]
    Delete(RefArgs),
    /// Manage workspaces
    #[command(subcommand, visible_alias = "w")]
    Workspaces(WorkspaceCommand),
    /// Manage projects
    #[command(subcommand, visible_alias = "p")]
    Projects(ProjectCommand),
    /// Show or change settings
    Config(ConfigArgs),
    /// Serve the planner's tools over stdio (Model Context Protocol)
    Mcp,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Put the item in the backlog instead of today
    #[arg(short, long)]
    some_day: bool,

    /// Workspace name or id
    #[arg(short, long)]
    workspace: Option<String>,

    /// Project name or id
    #[arg(short, long)]
    project: Option<String>,

    /// Title of the item (quoted or space separated)
    #[arg(required = true)]
    title: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// List the backlog
    #[arg(short, long)]
    some_day: bool,

    /// Include completed items
    #[arg(short, long)]
    done: bool,

    /// Include the id column
    #[arg(short, long)]
    ids: bool,

    /// Only items of this workspace
    #[arg(short, long)]
    workspace: Option<String>,

    /// Only items of this project
    #[arg(short, long)]
    project: Option<String>,

    /// Only items without a project
    #[arg(long, conflicts_with = "project")]
    no_project: bool,
}

#[derive(Args, Debug)]
pub struct RefArgs {
    /// Id or exact title (quoted or space separated)
    #[arg(required = true)]
    reference: Vec<String>,
}

impl RefArgs {
    fn reference(&self) -> String {
        self.reference.join(" ")
    }
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Item id or exact title
    reference: String,

    /// New title
    #[arg(short, long)]
    title: Option<String>,

    /// New day (YYYY-MM-DD, today, tomorrow, or none/someday for the backlog)
    #[arg(short, long)]
    day: Option<String>,

    /// New notes; an empty string clears them
    #[arg(short, long)]
    notes: Option<String>,

    /// Workspace name or id
    #[arg(short, long)]
    workspace: Option<String>,

    /// Project name or id
    #[arg(short, long)]
    project: Option<String>,
}

#[derive(Args, Debug)]
pub struct MoveArgs {
    /// Item id or exact title
    reference: String,

    /// YYYY-MM-DD, today, tomorrow or someday
    destination: String,
}

#[derive(Subcommand, Debug)]
pub enum WorkspaceCommand {
    /// Create a new workspace
    #[command(alias = "c")]
    Create {
        #[arg(required = true)]
        name: Vec<String>,
    },
    /// List all workspaces
    #[command(alias = "l")]
    List {
        /// Include the id column
        #[arg(short, long)]
        ids: bool,
    },
    /// Rename a workspace
    #[command(alias = "u")]
    Update {
        reference: String,
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Delete a workspace and its projects; its items are kept
    Delete(RefArgs),
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    /// Create a new project
    #[command(alias = "c")]
    Create {
        /// Workspace name or id
        #[arg(short, long)]
        workspace: String,

        /// Never counts as finished
        #[arg(short, long)]
        permanent: bool,

        #[arg(required = true)]
        name: Vec<String>,
    },
    /// List projects
    #[command(alias = "l")]
    List {
        /// Only projects of this workspace
        #[arg(short, long)]
        workspace: Option<String>,

        /// Include the id column
        #[arg(short, long)]
        ids: bool,
    },
    /// Rename a project or change its status
    #[command(alias = "u")]
    Update {
        reference: String,
        #[arg(short, long)]
        name: Option<String>,
        /// pending, done or permanent
        #[arg(short, long, value_parser = parse_project_status)]
        status: Option<ProjectStatus>,
    },
    /// Mark a project as done
    Done(RefArgs),
    /// Mark a project as pending again
    Reopen(RefArgs),
    /// Delete a project; its items are kept
    Delete(RefArgs),
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// monday or sunday
    #[arg(long, value_parser = parse_week_start)]
    week_start: Option<WeekStart>,

    /// Roll overdue items forward on start
    #[arg(long)]
    auto_rollover: Option<bool>,
}

fn parse_project_status(value: &str) -> std::result::Result<ProjectStatus, String> {
    ProjectStatus::from_tag(value)
        .ok_or_else(|| format!("unknown status '{value}' (pending, done, permanent)"))
}

fn parse_week_start(value: &str) -> std::result::Result<WeekStart, String> {
    WeekStart::from_name(value).ok_or_else(|| format!("unknown week start '{value}' (monday, sunday)"))
}

/// Process exit status for a command line clap rejected. Help and version
/// output are not failures.
pub fn usage_exit_code(err: &clap::Error) -> u8 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

/// Process exit status for a failed command
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<PlannerError>()
        .map_or(1, PlannerError::exit_code)
}

/// Create the local data directory
pub fn init(out: &mut impl Write) -> Result<()> {
    let dir = init_local_dir()?;
    writeln!(out, "Initialized weekboard directory: {}", dir.display())?;
    writeln!(out)?;
    writeln!(out, "Weekboard will now use this local directory for its database.")?;
    Ok(())
}

/// Run one command against the planner
pub fn run(command: Command, planner: &mut Planner, out: &mut impl Write) -> Result<()> {
    match command {
        Command::Init => init(out),
        Command::Add(args) => add(args, planner, out),
        Command::List(args) => list(args, planner, out),
        Command::Done(args) => {
            let item = planner.resolve_item(&args.reference())?;
            let item = planner.complete(item.id)?;
            writeln!(out, "Marked '{}' as done", item.title)?;
            Ok(())
        }
        Command::Reopen(args) => {
            let item = planner.resolve_item(&args.reference())?;
            let item = planner.reopen(item.id)?;
            writeln!(out, "Reopened '{}'", item.title)?;
            Ok(())
        }
        Command::Update(args) => update(args, planner, out),
        Command::Move(args) => move_item(args, planner, out),
        Command::Delete(args) => {
            let item = planner.resolve_item(&args.reference())?;
            let item = planner.delete_item(item.id)?;
            writeln!(out, "Deleted '{}'", item.title)?;
            Ok(())
        }
        Command::Workspaces(command) => workspaces(command, planner, out),
        Command::Projects(command) => projects(command, planner, out),
        Command::Config(args) => config(args, planner, out),
        Command::Mcp => {
            let stdin = std::io::stdin();
            crate::mcp::serve(planner, stdin.lock(), &mut *out, crate::ticker::local_today)
        }
    }
}

fn day_label(item: &Item) -> String {
    item.scheduled_for
        .map(|d| d.to_string())
        .unwrap_or_else(|| "Someday".to_string())
}

fn add(args: AddArgs, planner: &mut Planner, out: &mut impl Write) -> Result<()> {
    let (workspace, project) =
        planner.resolve_owner(args.workspace.as_deref(), args.project.as_deref())?;
    let target = if args.some_day {
        Target::Backlog(0)
    } else {
        Target::Today
    };

    let item = planner.add_item(&args.title.join(" "), target, workspace, project)?;
    writeln!(out, "Added '{}' -> {}", item.title, day_label(&item))?;
    Ok(())
}

fn list(args: ListArgs, planner: &mut Planner, out: &mut impl Write) -> Result<()> {
    let (workspace, project) =
        planner.resolve_owner(args.workspace.as_deref(), args.project.as_deref())?;

    // An owner filter spans every column; --some-day narrows it to the backlog
    let filter = match (project, workspace, args.some_day) {
        (Some(project), _, _) => ListFilter::Project(project),
        (None, Some(workspace), _) => ListFilter::Workspace(workspace),
        (None, None, true) => ListFilter::Backlog,
        (None, None, false) => ListFilter::Today,
    };
    let mut items = if args.no_project {
        planner.list_unassigned(filter, args.done)?
    } else {
        planner.list_items(filter, args.done)?
    };
    if args.some_day {
        items.retain(|item| item.scheduled_for.is_none());
    }

    if items.is_empty() {
        writeln!(out, "No items found.")?;
        return Ok(());
    }

    if args.ids {
        writeln!(out, "{:<36} {:<8} {:<12} Title", "Id", "Status", "Day")?;
        writeln!(out, "{}", "-".repeat(85))?;
    } else {
        writeln!(out, "{:<8} {:<12} Title", "Status", "Day")?;
        writeln!(out, "{}", "-".repeat(48))?;
    }

    for item in items {
        let status = item.status.to_tag();
        if args.ids {
            writeln!(out, "{:<36} {:<8} {:<12} {}", item.id, status, day_label(&item), item.title)?;
        } else {
            writeln!(out, "{:<8} {:<12} {}", status, day_label(&item), item.title)?;
        }
    }
    Ok(())
}

fn update(args: UpdateArgs, planner: &mut Planner, out: &mut impl Write) -> Result<()> {
    let item = planner.resolve_item(&args.reference)?;
    let mut patch = ItemPatch {
        title: args.title,
        notes: args.notes.map(Some),
        ..ItemPatch::default()
    };

    if let Some(day) = args.day {
        let date = parse_schedule(&day, planner.today()).ok_or_else(|| {
            PlannerError::validation(format!("'{day}' is not a date (use YYYY-MM-DD or none)"))
        })?;
        patch.scheduled_for = Some(date);
    }

    if args.workspace.is_some() || args.project.is_some() {
        let (workspace, project) =
            planner.resolve_owner(args.workspace.as_deref(), args.project.as_deref())?;
        patch.workspace = Some(workspace);
        if project.is_some() {
            patch.project = Some(project);
        }
    }

    if patch.is_empty() {
        writeln!(out, "No updates specified")?;
        return Ok(());
    }

    let item = planner.update_item(item.id, patch)?;
    writeln!(out, "Updated '{}'", item.title)?;
    Ok(())
}

fn move_item(args: MoveArgs, planner: &mut Planner, out: &mut impl Write) -> Result<()> {
    let item = planner.resolve_item(&args.reference)?;
    let destination = match parse_schedule(&args.destination, planner.today()) {
        Some(Some(date)) => Column::Day(date),
        Some(None) => Column::Backlog(item.backlog_column),
        None => {
            return Err(PlannerError::validation(format!(
                "'{}' is not a date (use YYYY-MM-DD, today, tomorrow or someday)",
                args.destination
            ))
            .into())
        }
    };

    let item = planner.move_item(item.id, destination)?;
    writeln!(out, "Moved '{}' -> {}", item.title, day_label(&item))?;
    Ok(())
}

fn workspaces(command: WorkspaceCommand, planner: &mut Planner, out: &mut impl Write) -> Result<()> {
    match command {
        WorkspaceCommand::Create { name } => {
            let workspace = planner.create_workspace(&name.join(" "))?;
            writeln!(out, "Created workspace '{}'", workspace.name)?;
        }
        WorkspaceCommand::List { ids } => {
            let workspaces = planner.list_workspaces()?;
            if workspaces.is_empty() {
                writeln!(out, "No workspaces found")?;
                return Ok(());
            }

            let header = format!(
                "{:<20} {:>8} {:>6} {:>9} {:>9} {:>12}",
                "Name", "Projects", "Items", "Completed", "Remaining", "Updated"
            );
            if ids {
                writeln!(out, "{:<36} {header}", "Id")?;
            } else {
                writeln!(out, "{header}")?;
            }
            writeln!(out, "{}", "-".repeat(if ids { 106 } else { 69 }))?;

            for workspace in workspaces {
                let stats = planner.workspace_stats(workspace.id)?;
                let row = format!(
                    "{:<20} {:>8} {:>6} {:>9} {:>9} {:>12}",
                    workspace.name,
                    planner.project_count(workspace.id)?,
                    stats.total,
                    stats.completed,
                    stats.remaining(),
                    workspace.updated_at.format("%Y-%m-%d")
                );
                if ids {
                    writeln!(out, "{:<36} {row}", workspace.id)?;
                } else {
                    writeln!(out, "{row}")?;
                }
            }
        }
        WorkspaceCommand::Update { reference, name } => {
            let workspace = planner.resolve_workspace(&reference)?;
            let Some(name) = name else {
                writeln!(out, "No updates specified")?;
                return Ok(());
            };
            let workspace = planner.rename_workspace(workspace.id, &name)?;
            writeln!(out, "Updated workspace '{}'", workspace.name)?;
        }
        WorkspaceCommand::Delete(args) => {
            let workspace = planner.resolve_workspace(&args.reference())?;
            let workspace = planner.delete_workspace(workspace.id)?;
            writeln!(out, "Deleted workspace '{}'", workspace.name)?;
        }
    }
    Ok(())
}

fn projects(command: ProjectCommand, planner: &mut Planner, out: &mut impl Write) -> Result<()> {
    match command {
        ProjectCommand::Create {
            workspace,
            permanent,
            name,
        } => {
            let workspace = planner.resolve_workspace(&workspace)?;
            let status = if permanent {
                ProjectStatus::Permanent
            } else {
                ProjectStatus::Pending
            };
            let project = planner.create_project(&name.join(" "), workspace.id, status)?;
            writeln!(
                out,
                "Created project '{}' in workspace '{}'",
                project.name, workspace.name
            )?;
        }
        ProjectCommand::List { workspace, ids } => {
            let scope = workspace
                .map(|w| planner.resolve_workspace(&w))
                .transpose()?
                .map(|w| w.id);
            let projects = planner.list_projects(scope)?;
            if projects.is_empty() {
                writeln!(out, "No projects found")?;
                return Ok(());
            }

            let header = format!(
                "{:<20} {:<10} {:>6} {:>9} {:>9} {:>12}",
                "Name", "Status", "Items", "Completed", "Remaining", "Updated"
            );
            if ids {
                writeln!(out, "{:<36} {header}", "Id")?;
            } else {
                writeln!(out, "{header}")?;
            }
            writeln!(out, "{}", "-".repeat(if ids { 108 } else { 71 }))?;

            for project in projects {
                let stats = planner.project_stats(project.id)?;
                let row = format!(
                    "{:<20} {:<10} {:>6} {:>9} {:>9} {:>12}",
                    project.name,
                    project.status.to_tag(),
                    stats.total,
                    stats.completed,
                    stats.remaining(),
                    project.updated_at.format("%Y-%m-%d")
                );
                if ids {
                    writeln!(out, "{:<36} {row}", project.id)?;
                } else {
                    writeln!(out, "{row}")?;
                }
            }
        }
        ProjectCommand::Update {
            reference,
            name,
            status,
        } => {
            let mut project = planner.resolve_project(&reference, None)?;
            if name.is_none() && status.is_none() {
                writeln!(out, "No updates specified")?;
                return Ok(());
            }
            if let Some(name) = name {
                project = planner.rename_project(project.id, &name)?;
            }
            if let Some(status) = status {
                project = planner.set_project_status(project.id, status)?;
            }
            writeln!(out, "Updated project '{}'", project.name)?;
        }
        ProjectCommand::Done(args) => {
            let project = planner.resolve_project(&args.reference(), None)?;
            let project = planner.set_project_status(project.id, ProjectStatus::Done)?;
            writeln!(out, "Marked project '{}' as done", project.name)?;
        }
        ProjectCommand::Reopen(args) => {
            let project = planner.resolve_project(&args.reference(), None)?;
            let project = planner.set_project_status(project.id, ProjectStatus::Pending)?;
            writeln!(out, "Reopened project '{}'", project.name)?;
        }
        ProjectCommand::Delete(args) => {
            let project = planner.resolve_project(&args.reference(), None)?;
            let project = planner.delete_project(project.id)?;
            writeln!(out, "Deleted project '{}'", project.name)?;
        }
    }
    Ok(())
}

fn config(args: ConfigArgs, planner: &mut Planner, out: &mut impl Write) -> Result<()> {
    let current = planner.config();
    let updated = Config {
        week_start: args.week_start.unwrap_or(current.week_start),
        auto_rollover: args.auto_rollover.unwrap_or(current.auto_rollover),
    };
    if updated != current {
        planner.update_config(updated)?;
    }

    writeln!(out, "week-start     {}", updated.week_start.name())?;
    writeln!(out, "auto-rollover  {}", updated.auto_rollover)?;
    Ok(())
}
