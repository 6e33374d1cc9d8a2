pub mod actions;
pub mod app;
pub mod drag;
pub mod editor;
pub mod model;
pub mod view;

pub use app::run;

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use chrono::Utc;

    use crate::client::Gateway;
    use crate::error::{Error, Result};
    use crate::types::{
        NewOrganizationInput, NewProjectInput, NewTaskInput, Organization, OrganizationChanges,
        OrganizationStats, Project, ProjectChanges, ProjectStats, ProjectStatus, Task,
        TaskChanges, TaskComment, TaskPriority, TaskStatus,
    };

    pub fn task_fixture(id: &str, title: &str, status: TaskStatus) -> Task {
        Task {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            status,
            priority: TaskPriority::Medium,
            assignee_email: None,
            due_date: None,
            created_at: Utc::now(),
            updated_at: None,
            comment_count: 0,
            project: None,
        }
    }

    /// Recording gateway double. Each call appends one line so tests can
    /// assert exactly which remote operations ran and in what order.
    pub struct FakeGateway {
        calls: Mutex<Vec<String>>,
        tasks: Mutex<Vec<Task>>,
        fail_update: AtomicBool,
    }

    impl FakeGateway {
        pub fn new() -> Self {
            Self::with_tasks(Vec::new())
        }

        pub fn with_tasks(tasks: Vec<Task>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                tasks: Mutex::new(tasks),
                fail_update: AtomicBool::new(false),
            }
        }

        pub fn recorded(&self) -> Vec<String> {
            self.calls.lock().expect("calls lock").clone()
        }

        pub fn fail_next_update(&self) {
            self.fail_update.store(true, Ordering::SeqCst);
        }

        fn record(&self, entry: String) {
            self.calls.lock().expect("calls lock").push(entry);
        }
    }

    impl Gateway for FakeGateway {
        fn organizations(&self) -> Result<Vec<Organization>> {
            unimplemented!("not used by the board")
        }

        fn organization(&self, _slug: &str) -> Result<Organization> {
            unimplemented!("not used by the board")
        }

        fn organization_stats(&self, _slug: &str) -> Result<OrganizationStats> {
            unimplemented!("not used by the board")
        }

        fn projects(
            &self,
            _organization_slug: &str,
            _status: Option<ProjectStatus>,
        ) -> Result<Vec<Project>> {
            unimplemented!("not used by the board")
        }

        fn project(&self, _id: &str) -> Result<Project> {
            unimplemented!("not used by the board")
        }

        fn project_stats(&self, _id: &str) -> Result<ProjectStats> {
            unimplemented!("not used by the board")
        }

        fn tasks(
            &self,
            project_id: &str,
            _status: Option<TaskStatus>,
            _priority: Option<TaskPriority>,
        ) -> Result<Vec<Task>> {
            self.record(format!("tasks {project_id}"));
            Ok(self.tasks.lock().expect("tasks lock").clone())
        }

        fn task(&self, id: &str) -> Result<Task> {
            self.record(format!("task {id}"));
            self.tasks
                .lock()
                .expect("tasks lock")
                .iter()
                .find(|task| task.id == id)
                .cloned()
                .ok_or_else(|| Error::TaskNotFound(id.to_string()))
        }

        fn task_comments(&self, task_id: &str) -> Result<Vec<TaskComment>> {
            self.record(format!("task_comments {task_id}"));
            Ok(Vec::new())
        }

        fn create_organization(&self, _input: &NewOrganizationInput) -> Result<Organization> {
            unimplemented!("not used by the board")
        }

        fn update_organization(
            &self,
            _id: &str,
            _changes: &OrganizationChanges,
        ) -> Result<Organization> {
            unimplemented!("not used by the board")
        }

        fn create_project(&self, _input: &NewProjectInput) -> Result<Project> {
            unimplemented!("not used by the board")
        }

        fn update_project(&self, _id: &str, _changes: &ProjectChanges) -> Result<Project> {
            unimplemented!("not used by the board")
        }

        fn delete_project(&self, _id: &str) -> Result<()> {
            unimplemented!("not used by the board")
        }

        fn create_task(&self, input: &NewTaskInput) -> Result<Task> {
            let body = serde_json::to_string(input).expect("serialize input");
            self.record(format!("create_task {} {body}", input.project_id));
            Ok(task_fixture("t-new", &input.title, TaskStatus::Todo))
        }

        fn update_task(&self, id: &str, changes: &TaskChanges) -> Result<Task> {
            let body = serde_json::to_string(changes).expect("serialize changes");
            self.record(format!("update_task {id} {body}"));
            if self.fail_update.swap(false, Ordering::SeqCst) {
                return Err(Error::OperationFailed("update rejected".to_string()));
            }
            let tasks = self.tasks.lock().expect("tasks lock");
            Ok(tasks
                .iter()
                .find(|task| task.id == id)
                .cloned()
                .unwrap_or_else(|| task_fixture(id, "task", TaskStatus::Todo)))
        }

        fn delete_task(&self, id: &str) -> Result<()> {
            self.record(format!("delete_task {id}"));
            Ok(())
        }

        fn add_comment(
            &self,
            task_id: &str,
            content: &str,
            author_email: &str,
        ) -> Result<TaskComment> {
            self.record(format!("add_comment {task_id} {content} {author_email}"));
            Ok(TaskComment {
                id: "c-new".to_string(),
                content: content.to_string(),
                author_email: author_email.to_string(),
                created_at: Utc::now(),
                updated_at: None,
            })
        }

        fn update_comment(&self, _id: &str, _content: &str) -> Result<TaskComment> {
            unimplemented!("not used by the board")
        }

        fn delete_comment(&self, _id: &str) -> Result<()> {
            unimplemented!("not used by the board")
        }
    }
}
