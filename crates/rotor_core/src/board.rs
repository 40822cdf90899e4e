use crate::error::AppError;
use crate::model::{Project, Task, TaskStatus};

/// The in-memory entity store: a flat task arena plus projects holding
/// ordered task-id lists, and the rotation cursor (last presented task).
///
/// Projects and tasks keep their insertion order; that order is what the
/// scheduler rotates over. All hierarchy changes go through these methods.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    pub projects: Vec<Project>,
    pub tasks: Vec<Task>,
    pub cursor: Option<String>,
}

impl Board {
    pub fn project(&self, id: &str) -> Result<&Project, AppError> {
        self.projects
            .iter()
            .find(|project| project.id == id)
            .ok_or_else(|| AppError::not_found("project not found"))
    }

    pub fn project_mut(&mut self, id: &str) -> Result<&mut Project, AppError> {
        self.projects
            .iter_mut()
            .find(|project| project.id == id)
            .ok_or_else(|| AppError::not_found("project not found"))
    }

    pub fn task(&self, id: &str) -> Result<&Task, AppError> {
        self.tasks
            .iter()
            .find(|task| task.id == id)
            .ok_or_else(|| AppError::not_found("task not found"))
    }

    pub fn task_mut(&mut self, id: &str) -> Result<&mut Task, AppError> {
        self.tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(|| AppError::not_found("task not found"))
    }

    pub fn add_project(&mut self, project: Project) {
        self.projects.push(project);
    }

    /// Attach a task to its project; fails with NotFound when the
    /// task's `project_id` is unknown.
    pub fn add_task(&mut self, task: Task) -> Result<(), AppError> {
        let id = task.id.clone();
        let project = self.project_mut(&task.project_id)?;
        project.task_ids.push(id);
        self.tasks.push(task);
        Ok(())
    }

    /// Tasks owned by a project, in insertion order.
    pub fn tasks_in(&self, project_id: &str) -> Result<Vec<&Task>, AppError> {
        let project = self.project(project_id)?;
        let mut tasks = Vec::with_capacity(project.task_ids.len());
        for task_id in &project.task_ids {
            tasks.push(self.task(task_id)?);
        }
        Ok(tasks)
    }

    pub fn delete_task(&mut self, id: &str) -> Result<Task, AppError> {
        let index = self
            .tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or_else(|| AppError::not_found("task not found"))?;

        let removed = self.tasks.remove(index);
        if let Ok(project) = self.project_mut(&removed.project_id) {
            project.task_ids.retain(|task_id| task_id != id);
        }
        if self.cursor.as_deref() == Some(id) {
            self.cursor = None;
        }
        Ok(removed)
    }

    /// Delete a project and the tasks it owns. Rejected while the project
    /// still holds non-done tasks unless `force` is set.
    pub fn delete_project(&mut self, id: &str, force: bool) -> Result<Project, AppError> {
        let project = self.project(id)?;
        if !force {
            let open = project
                .task_ids
                .iter()
                .filter_map(|task_id| self.task(task_id).ok())
                .any(|task| task.status != TaskStatus::Done);
            if open {
                return Err(AppError::invalid_argument(
                    "project still has open tasks (use force to cascade)",
                ));
            }
        }

        let index = self
            .projects
            .iter()
            .position(|project| project.id == id)
            .ok_or_else(|| AppError::not_found("project not found"))?;
        let removed = self.projects.remove(index);

        if let Some(cursor) = self.cursor.as_deref()
            && removed.task_ids.iter().any(|task_id| task_id == cursor)
        {
            self.cursor = None;
        }
        self.tasks.retain(|task| task.project_id != id);

        Ok(removed)
    }
}
