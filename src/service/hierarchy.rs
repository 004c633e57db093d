use super::Planner;
use crate::domain::{Project, ProjectStatus, Stats, Workspace};
use crate::error::{PlannerError, PlannerResult};
use crate::persistence::repo::{self, ItemFilter};
use chrono::Utc;
use uuid::Uuid;

fn validate_name(kind: &str, name: &str) -> PlannerResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PlannerError::validation(format!("{kind} name cannot be empty")));
    }
    Ok(name.to_string())
}

impl Planner {
    pub fn create_workspace(&mut self, name: &str) -> PlannerResult<Workspace> {
        let workspace = Workspace::new(validate_name("workspace", name)?, Utc::now());
        repo::insert_workspace(self.store.conn(), &workspace)?;
        Ok(workspace)
    }

    pub fn get_workspace(&self, id: Uuid) -> PlannerResult<Workspace> {
        repo::get_workspace(self.store.conn(), id)?
            .ok_or_else(|| PlannerError::not_found("workspace", id.to_string()))
    }

    pub fn list_workspaces(&self) -> PlannerResult<Vec<Workspace>> {
        Ok(repo::list_workspaces(self.store.conn())?)
    }

    pub fn rename_workspace(&mut self, id: Uuid, name: &str) -> PlannerResult<Workspace> {
        let name = validate_name("workspace", name)?;
        if repo::rename_workspace(self.store.conn(), id, &name, Utc::now())? == 0 {
            return Err(PlannerError::not_found("workspace", id.to_string()));
        }
        self.get_workspace(id)
    }

    /// Delete a workspace together with its projects. Its items are kept
    /// but lose both their workspace and project.
    pub fn delete_workspace(&mut self, id: Uuid) -> PlannerResult<Workspace> {
        let (workspace, detached, projects) = self.store.with_tx(|tx| {
            let workspace = repo::get_workspace(tx, id)?
                .ok_or_else(|| PlannerError::not_found("workspace", id.to_string()))?;
            let detached = repo::detach_items(tx, ItemFilter::Workspace(id), Utc::now())?;
            let projects = repo::delete_projects_in(tx, id)?;
            repo::delete_workspace(tx, id)?;
            Ok((workspace, detached, projects))
        })?;

        tracing::info!(
            workspace = %workspace.name,
            projects,
            detached_items = detached,
            "deleted workspace"
        );
        Ok(workspace)
    }

    pub fn create_project(
        &mut self,
        name: &str,
        workspace_id: Uuid,
        status: ProjectStatus,
    ) -> PlannerResult<Project> {
        let name = validate_name("project", name)?;
        self.get_workspace(workspace_id)?;

        let project = Project::new(name, workspace_id, status, Utc::now());
        repo::insert_project(self.store.conn(), &project)?;
        Ok(project)
    }

    pub fn get_project(&self, id: Uuid) -> PlannerResult<Project> {
        repo::get_project(self.store.conn(), id)?
            .ok_or_else(|| PlannerError::not_found("project", id.to_string()))
    }

    /// Projects, optionally only those of one workspace
    pub fn list_projects(&self, workspace: Option<Uuid>) -> PlannerResult<Vec<Project>> {
        Ok(repo::list_projects(self.store.conn(), workspace)?)
    }

    pub fn rename_project(&mut self, id: Uuid, name: &str) -> PlannerResult<Project> {
        let name = validate_name("project", name)?;
        let mut project = self.get_project(id)?;
        project.name = name;
        project.updated_at = Utc::now();
        repo::update_project(self.store.conn(), &project)?;
        Ok(project)
    }

    pub fn set_project_status(&mut self, id: Uuid, status: ProjectStatus) -> PlannerResult<Project> {
        let mut project = self.get_project(id)?;
        if project.status == status {
            return Ok(project);
        }
        project.status = status;
        project.updated_at = Utc::now();
        repo::update_project(self.store.conn(), &project)?;
        Ok(project)
    }

    /// Delete a project; its items stay in the project's workspace
    pub fn delete_project(&mut self, id: Uuid) -> PlannerResult<Project> {
        let (project, detached) = self.store.with_tx(|tx| {
            let project = repo::get_project(tx, id)?
                .ok_or_else(|| PlannerError::not_found("project", id.to_string()))?;
            let detached = repo::detach_items(tx, ItemFilter::Project(id), Utc::now())?;
            repo::delete_project(tx, id)?;
            Ok((project, detached))
        })?;

        tracing::info!(project = %project.name, detached_items = detached, "deleted project");
        Ok(project)
    }

    pub fn project_count(&self, workspace: Uuid) -> PlannerResult<usize> {
        Ok(repo::list_projects(self.store.conn(), Some(workspace))?.len())
    }

    pub fn workspace_stats(&self, id: Uuid) -> PlannerResult<Stats> {
        Ok(repo::item_stats(self.store.conn(), ItemFilter::Workspace(id))?)
    }

    pub fn project_stats(&self, id: Uuid) -> PlannerResult<Stats> {
        Ok(repo::item_stats(self.store.conn(), ItemFilter::Project(id))?)
    }
}
