//! Turn user supplied references (ids or exact names) into exactly one entity.
//!
//! An id is tried first. Otherwise the name must match exactly one entity,
//! case-sensitively; duplicates are reported, never guessed.

use super::Planner;
use crate::domain::{Item, Project, Workspace};
use crate::error::{PlannerError, PlannerResult};
use crate::persistence::repo;
use uuid::Uuid;

fn pick_one<T>(kind: &'static str, reference: &str, mut matches: Vec<T>) -> PlannerResult<T> {
    match matches.len() {
        0 => Err(PlannerError::not_found(kind, reference)),
        1 => Ok(matches.remove(0)),
        count => Err(PlannerError::Ambiguous {
            kind,
            reference: reference.to_string(),
            count,
        }),
    }
}

fn parse_id(reference: &str) -> Option<Uuid> {
    Uuid::parse_str(reference.trim()).ok()
}

impl Planner {
    pub fn resolve_item(&self, reference: &str) -> PlannerResult<Item> {
        let conn = self.store.conn();
        if let Some(id) = parse_id(reference) {
            if let Some(item) = repo::get_item(conn, id)? {
                return Ok(item);
            }
        }
        pick_one("item", reference, repo::items_titled(conn, reference)?)
    }

    pub fn resolve_workspace(&self, reference: &str) -> PlannerResult<Workspace> {
        let conn = self.store.conn();
        if let Some(id) = parse_id(reference) {
            if let Some(workspace) = repo::get_workspace(conn, id)? {
                return Ok(workspace);
            }
        }
        pick_one("workspace", reference, repo::workspaces_named(conn, reference)?)
    }

    /// Resolve a project, optionally only among one workspace's projects
    pub fn resolve_project(&self, reference: &str, workspace: Option<Uuid>) -> PlannerResult<Project> {
        let conn = self.store.conn();
        if let Some(id) = parse_id(reference) {
            if let Some(project) = repo::get_project(conn, id)? {
                if workspace.map_or(true, |ws| ws == project.workspace_id) {
                    return Ok(project);
                }
            }
        }
        pick_one("project", reference, repo::projects_named(conn, reference, workspace)?)
    }

    /// Resolve a project among `workspace`'s projects first and fall back to
    /// every workspace when none of them has that name
    pub fn resolve_project_near(
        &self,
        reference: &str,
        workspace: Option<Uuid>,
    ) -> PlannerResult<Project> {
        if workspace.is_some() {
            match self.resolve_project(reference, workspace) {
                Err(PlannerError::NotFound { .. }) => {}
                found => return found,
            }
        }
        self.resolve_project(reference, None)
    }

    /// Resolve the optional workspace and project references given together
    /// on a command line. A project alone implies its workspace; a project
    /// outside the named workspace is a conflict.
    pub fn resolve_owner(
        &self,
        workspace_ref: Option<&str>,
        project_ref: Option<&str>,
    ) -> PlannerResult<(Option<Uuid>, Option<Uuid>)> {
        let workspace = workspace_ref
            .map(|r| self.resolve_workspace(r))
            .transpose()?;

        let Some(project_ref) = project_ref else {
            return Ok((workspace.map(|w| w.id), None));
        };

        let scope = workspace.as_ref().map(|w| w.id);
        let project = match self.resolve_project(project_ref, scope) {
            Err(PlannerError::NotFound { .. }) if workspace.is_some() => {
                let elsewhere = self.resolve_project(project_ref, None)?;
                return Err(PlannerError::Conflict(format!(
                    "project '{}' is not in workspace '{}'",
                    elsewhere.name,
                    workspace.map(|w| w.name).unwrap_or_default()
                )));
            }
            other => other?,
        };

        Ok((Some(project.workspace_id), Some(project.id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ItemStatus, ProjectStatus, Target};
    use crate::service::test_support::*;

    #[test]
    fn test_resolve_item_by_title() {
        let mut planner = planner();
        let item = planner.add_item("Buy milk", Target::Today, None, None).unwrap();

        assert_eq!(planner.resolve_item("Buy milk").unwrap().id, item.id);
        assert!(matches!(
            planner.resolve_item("buy milk"),
            Err(PlannerError::NotFound { .. })
        ));
    }

    #[test]
    fn test_resolve_item_by_id() {
        let mut planner = planner();
        planner.add_item("Standup", Target::Today, None, None).unwrap();
        let second = planner.add_item("Standup", Target::Today, None, None).unwrap();

        let resolved = planner.resolve_item(&second.id.to_string()).unwrap();
        assert_eq!(resolved.id, second.id);
    }

    #[test]
    fn test_duplicate_titles_are_ambiguous() {
        let mut planner = planner();
        let a = planner.add_item("Standup", Target::Today, None, None).unwrap();
        let b = planner.add_item("Standup", Target::Backlog(0), None, None).unwrap();

        let err = planner.resolve_item("Standup").unwrap_err();
        assert!(matches!(err, PlannerError::Ambiguous { count: 2, .. }));

        // Nothing was touched
        assert_eq!(planner.get_item(a.id).unwrap().status, ItemStatus::Pending);
        assert_eq!(planner.get_item(b.id).unwrap().status, ItemStatus::Pending);
    }

    #[test]
    fn test_resolve_workspace() {
        let mut planner = planner();
        planner.create_workspace("Work").unwrap();
        planner.create_workspace("Home").unwrap();
        planner.create_workspace("Home").unwrap();

        assert_eq!(planner.resolve_workspace("Work").unwrap().name, "Work");
        assert!(matches!(
            planner.resolve_workspace("Home"),
            Err(PlannerError::Ambiguous { count: 2, .. })
        ));
        assert!(matches!(
            planner.resolve_workspace("Garden"),
            Err(PlannerError::NotFound { kind: "workspace", .. })
        ));
    }

    #[test]
    fn test_project_scope_disambiguates() {
        let mut planner = planner();
        let work = planner.create_workspace("Work").unwrap();
        let home = planner.create_workspace("Home").unwrap();
        planner.create_project("Admin", work.id, ProjectStatus::Pending).unwrap();
        let home_admin = planner
            .create_project("Admin", home.id, ProjectStatus::Pending)
            .unwrap();

        assert!(matches!(
            planner.resolve_project("Admin", None),
            Err(PlannerError::Ambiguous { .. })
        ));
        assert_eq!(
            planner.resolve_project("Admin", Some(home.id)).unwrap().id,
            home_admin.id
        );
    }

    #[test]
    fn test_resolve_project_near_prefers_workspace() {
        let mut planner = planner();
        let work = planner.create_workspace("Work").unwrap();
        let home = planner.create_workspace("Home").unwrap();
        let garden = planner.create_workspace("Garden").unwrap();
        planner.create_project("Admin", work.id, ProjectStatus::Pending).unwrap();
        let home_admin = planner
            .create_project("Admin", home.id, ProjectStatus::Pending)
            .unwrap();
        let launch = planner
            .create_project("Launch", work.id, ProjectStatus::Pending)
            .unwrap();

        assert_eq!(
            planner.resolve_project_near("Admin", Some(home.id)).unwrap().id,
            home_admin.id
        );
        // Not in Garden, so every workspace is searched
        assert_eq!(
            planner.resolve_project_near("Launch", Some(garden.id)).unwrap().id,
            launch.id
        );
        assert!(matches!(
            planner.resolve_project_near("Admin", Some(garden.id)),
            Err(PlannerError::Ambiguous { count: 2, .. })
        ));
        assert!(matches!(
            planner.resolve_project_near("Admin", None),
            Err(PlannerError::Ambiguous { count: 2, .. })
        ));
    }

    #[test]
    fn test_resolve_owner() {
        let mut planner = planner();
        let work = planner.create_workspace("Work").unwrap();
        planner.create_workspace("Home").unwrap();
        let launch = planner
            .create_project("Launch", work.id, ProjectStatus::Pending)
            .unwrap();

        assert_eq!(planner.resolve_owner(None, None).unwrap(), (None, None));
        assert_eq!(
            planner.resolve_owner(None, Some("Launch")).unwrap(),
            (Some(work.id), Some(launch.id))
        );
        assert_eq!(
            planner.resolve_owner(Some("Work"), Some("Launch")).unwrap(),
            (Some(work.id), Some(launch.id))
        );
        assert!(matches!(
            planner.resolve_owner(Some("Home"), Some("Launch")),
            Err(PlannerError::Conflict(_))
        ));
        assert!(matches!(
            planner.resolve_owner(Some("Home"), Some("Missing")),
            Err(PlannerError::NotFound { .. })
        ));
    }
}
