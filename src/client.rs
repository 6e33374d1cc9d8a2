//! GraphQL client for the project-management API.
//!
//! All remote access goes through the [`Gateway`] trait so the board and
//! the tests can substitute a fake. [`GraphQlClient`] is the production
//! implementation: plain POST requests with a `{query, variables}` body
//! against a single endpoint, optional bearer token.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::types::{
    MutationOutcome, NewOrganizationInput, NewProjectInput, NewTaskInput, Organization,
    OrganizationChanges, OrganizationStats, Project, ProjectChanges, ProjectStats, ProjectStatus,
    Task, TaskChanges, TaskComment, TaskPriority, TaskStatus,
};

/// Remote operations the CLI and the board depend on.
pub trait Gateway: Send + Sync {
    fn organizations(&self) -> Result<Vec<Organization>>;
    fn organization(&self, slug: &str) -> Result<Organization>;
    fn organization_stats(&self, slug: &str) -> Result<OrganizationStats>;

    fn projects(&self, organization_slug: &str, status: Option<ProjectStatus>)
        -> Result<Vec<Project>>;
    fn project(&self, id: &str) -> Result<Project>;
    fn project_stats(&self, id: &str) -> Result<ProjectStats>;

    fn tasks(
        &self,
        project_id: &str,
        status: Option<TaskStatus>,
        priority: Option<TaskPriority>,
    ) -> Result<Vec<Task>>;
    fn task(&self, id: &str) -> Result<Task>;
    fn task_comments(&self, task_id: &str) -> Result<Vec<TaskComment>>;

    fn create_organization(&self, input: &NewOrganizationInput) -> Result<Organization>;
    fn update_organization(&self, id: &str, changes: &OrganizationChanges)
        -> Result<Organization>;

    fn create_project(&self, input: &NewProjectInput) -> Result<Project>;
    fn update_project(&self, id: &str, changes: &ProjectChanges) -> Result<Project>;
    fn delete_project(&self, id: &str) -> Result<()>;

    fn create_task(&self, input: &NewTaskInput) -> Result<Task>;
    fn update_task(&self, id: &str, changes: &TaskChanges) -> Result<Task>;
    fn delete_task(&self, id: &str) -> Result<()>;

    fn add_comment(&self, task_id: &str, content: &str, author_email: &str)
        -> Result<TaskComment>;
    fn update_comment(&self, id: &str, content: &str) -> Result<TaskComment>;
    fn delete_comment(&self, id: &str) -> Result<()>;
}

/// Blocking HTTP implementation of [`Gateway`].
pub struct GraphQlClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    token: Option<String>,
}

impl GraphQlClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            endpoint: config.endpoint.trim().to_string(),
            token: config.token.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn execute<T: DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T> {
        debug!(operation, "graphql request");
        let mut request = self
            .http
            .post(&self.endpoint)
            .json(&json!({ "query": query, "variables": variables }));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send()?.error_for_status()?;
        let body: GraphQlResponse<T> = response.json()?;
        unwrap_response(operation, body)
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    #[serde(default)]
    data: Option<T>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

/// Map a transport-level response body to data or a typed error.
fn unwrap_response<T>(operation: &str, body: GraphQlResponse<T>) -> Result<T> {
    if let Some(errors) = &body.errors {
        if !errors.is_empty() {
            let joined = errors
                .iter()
                .map(|err| err.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(Error::GraphQl(format!("{operation}: {joined}")));
        }
    }
    body.data
        .ok_or_else(|| Error::GraphQl(format!("{operation}: response carried no data")))
}

/// Merge an id argument into serialized change-set variables.
fn with_var(mut variables: serde_json::Value, key: &str, value: &str) -> serde_json::Value {
    if let Some(object) = variables.as_object_mut() {
        object.insert(
            key.to_string(),
            serde_json::Value::String(value.to_string()),
        );
    }
    variables
}

// Field selections are supersets of what any one caller needs, so every
// response deserializes into the full record types.
const ORGANIZATION_FIELDS: &str = "id name slug contactEmail createdAt updatedAt projectCount";
const PROJECT_FIELDS: &str =
    "id name description status dueDate createdAt updatedAt taskCount completedTaskCount completionRate";
const TASK_FIELDS: &str =
    "id title description status priority assigneeEmail dueDate createdAt updatedAt commentCount";
const COMMENT_FIELDS: &str = "id content authorEmail createdAt updatedAt";

impl Gateway for GraphQlClient {
    fn organizations(&self) -> Result<Vec<Organization>> {
        #[derive(Deserialize)]
        struct Data {
            organizations: Vec<Organization>,
        }
        let query = format!("query {{ organizations {{ {ORGANIZATION_FIELDS} }} }}");
        let data: Data = self.execute("organizations", &query, json!({}))?;
        Ok(data.organizations)
    }

    fn organization(&self, slug: &str) -> Result<Organization> {
        #[derive(Deserialize)]
        struct Data {
            organization: Option<Organization>,
        }
        let query = format!(
            "query($slug: String) {{ organization(slug: $slug) {{ {ORGANIZATION_FIELDS} }} }}"
        );
        let data: Data = self.execute("organization", &query, json!({ "slug": slug }))?;
        data.organization
            .ok_or_else(|| Error::OrganizationNotFound(slug.to_string()))
    }

    fn organization_stats(&self, slug: &str) -> Result<OrganizationStats> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Data {
            organization_statistics: Option<OrganizationStats>,
        }
        let query = "query($organizationSlug: String!) { \
             organizationStatistics(organizationSlug: $organizationSlug) { \
             organizationId organizationName totalProjects activeProjects completedProjects \
             totalTasks completedTasks overallCompletionRate } }";
        let data: Data = self.execute(
            "organizationStatistics",
            query,
            json!({ "organizationSlug": slug }),
        )?;
        data.organization_statistics
            .ok_or_else(|| Error::OrganizationNotFound(slug.to_string()))
    }

    fn projects(
        &self,
        organization_slug: &str,
        status: Option<ProjectStatus>,
    ) -> Result<Vec<Project>> {
        #[derive(Deserialize)]
        struct Data {
            projects: Vec<Project>,
        }
        let query = format!(
            "query($organizationSlug: String!, $status: String) {{ \
             projects(organizationSlug: $organizationSlug, status: $status) {{ {PROJECT_FIELDS} }} }}"
        );
        let variables = json!({
            "organizationSlug": organization_slug,
            "status": status.map(|s| s.as_str()),
        });
        let data: Data = self.execute("projects", &query, variables)?;
        Ok(data.projects)
    }

    fn project(&self, id: &str) -> Result<Project> {
        #[derive(Deserialize)]
        struct Data {
            project: Option<Project>,
        }
        let query = format!(
            "query($id: ID!) {{ project(id: $id) {{ {PROJECT_FIELDS} \
             organization {{ id name slug }} }} }}"
        );
        let data: Data = self.execute("project", &query, json!({ "id": id }))?;
        data.project
            .ok_or_else(|| Error::ProjectNotFound(id.to_string()))
    }

    fn project_stats(&self, id: &str) -> Result<ProjectStats> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Data {
            project_statistics: Option<ProjectStats>,
        }
        let query = "query($projectId: ID!) { projectStatistics(projectId: $projectId) { \
             projectId projectName totalTasks completedTasks inProgressTasks todoTasks \
             blockedTasks completionRate } }";
        let data: Data = self.execute("projectStatistics", query, json!({ "projectId": id }))?;
        data.project_statistics
            .ok_or_else(|| Error::ProjectNotFound(id.to_string()))
    }

    fn tasks(
        &self,
        project_id: &str,
        status: Option<TaskStatus>,
        priority: Option<TaskPriority>,
    ) -> Result<Vec<Task>> {
        #[derive(Deserialize)]
        struct Data {
            tasks: Vec<Task>,
        }
        let query = format!(
            "query($projectId: ID!, $status: String, $priority: String) {{ \
             tasks(projectId: $projectId, status: $status, priority: $priority) {{ {TASK_FIELDS} }} }}"
        );
        let variables = json!({
            "projectId": project_id,
            "status": status.map(|s| s.as_str()),
            "priority": priority.map(|p| p.as_str()),
        });
        let data: Data = self.execute("tasks", &query, variables)?;
        Ok(data.tasks)
    }

    fn task(&self, id: &str) -> Result<Task> {
        #[derive(Deserialize)]
        struct Data {
            task: Option<Task>,
        }
        let query = format!(
            "query($id: ID!) {{ task(id: $id) {{ {TASK_FIELDS} \
             project {{ id name organization {{ id name slug }} }} }} }}"
        );
        let data: Data = self.execute("task", &query, json!({ "id": id }))?;
        data.task.ok_or_else(|| Error::TaskNotFound(id.to_string()))
    }

    fn task_comments(&self, task_id: &str) -> Result<Vec<TaskComment>> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Data {
            task_comments: Vec<TaskComment>,
        }
        let query = format!(
            "query($taskId: ID!) {{ taskComments(taskId: $taskId) {{ {COMMENT_FIELDS} }} }}"
        );
        let data: Data = self.execute("taskComments", &query, json!({ "taskId": task_id }))?;
        Ok(data.task_comments)
    }

    fn create_organization(&self, input: &NewOrganizationInput) -> Result<Organization> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Data {
            create_organization: OrganizationPayload,
        }
        let query = format!(
            "mutation($name: String!, $contactEmail: String!, $slug: String) {{ \
             createOrganization(name: $name, contactEmail: $contactEmail, slug: $slug) {{ \
             success errors organization {{ {ORGANIZATION_FIELDS} }} }} }}"
        );
        let data: Data =
            self.execute("createOrganization", &query, serde_json::to_value(input)?)?;
        data.create_organization.into_entity("createOrganization")
    }

    fn update_organization(
        &self,
        id: &str,
        changes: &OrganizationChanges,
    ) -> Result<Organization> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Data {
            update_organization: OrganizationPayload,
        }
        let query = format!(
            "mutation($id: ID!, $name: String, $contactEmail: String) {{ \
             updateOrganization(id: $id, name: $name, contactEmail: $contactEmail) {{ \
             success errors organization {{ {ORGANIZATION_FIELDS} }} }} }}"
        );
        let variables = with_var(serde_json::to_value(changes)?, "id", id);
        let data: Data = self.execute("updateOrganization", &query, variables)?;
        data.update_organization.into_entity("updateOrganization")
    }

    fn create_project(&self, input: &NewProjectInput) -> Result<Project> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Data {
            create_project: ProjectPayload,
        }
        let query = format!(
            "mutation($organizationSlug: String!, $name: String!, $description: String, \
             $status: String, $dueDate: Date) {{ \
             createProject(organizationSlug: $organizationSlug, name: $name, \
             description: $description, status: $status, dueDate: $dueDate) {{ \
             success errors project {{ {PROJECT_FIELDS} }} }} }}"
        );
        let data: Data = self.execute("createProject", &query, serde_json::to_value(input)?)?;
        data.create_project.into_entity("createProject")
    }

    fn update_project(&self, id: &str, changes: &ProjectChanges) -> Result<Project> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Data {
            update_project: ProjectPayload,
        }
        let query = format!(
            "mutation($id: ID!, $name: String, $description: String, $status: String, \
             $dueDate: Date) {{ \
             updateProject(id: $id, name: $name, description: $description, \
             status: $status, dueDate: $dueDate) {{ \
             success errors project {{ {PROJECT_FIELDS} }} }} }}"
        );
        let variables = with_var(serde_json::to_value(changes)?, "id", id);
        let data: Data = self.execute("updateProject", &query, variables)?;
        data.update_project.into_entity("updateProject")
    }

    fn delete_project(&self, id: &str) -> Result<()> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Data {
            delete_project: MutationOutcome,
        }
        let query = "mutation($id: ID!) { deleteProject(id: $id) { success errors } }";
        let data: Data = self.execute("deleteProject", query, json!({ "id": id }))?;
        data.delete_project.ensure("deleteProject")
    }

    fn create_task(&self, input: &NewTaskInput) -> Result<Task> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Data {
            create_task: TaskPayload,
        }
        let query = format!(
            "mutation($projectId: ID!, $title: String!, $description: String, \
             $status: String, $priority: String, $assigneeEmail: String, $dueDate: DateTime) {{ \
             createTask(projectId: $projectId, title: $title, description: $description, \
             status: $status, priority: $priority, assigneeEmail: $assigneeEmail, \
             dueDate: $dueDate) {{ success errors task {{ {TASK_FIELDS} }} }} }}"
        );
        let data: Data = self.execute("createTask", &query, serde_json::to_value(input)?)?;
        data.create_task.into_entity("createTask")
    }

    fn update_task(&self, id: &str, changes: &TaskChanges) -> Result<Task> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Data {
            update_task: TaskPayload,
        }
        let query = format!(
            "mutation($id: ID!, $title: String, $description: String, $status: String, \
             $priority: String, $assigneeEmail: String, $dueDate: DateTime) {{ \
             updateTask(id: $id, title: $title, description: $description, \
             status: $status, priority: $priority, assigneeEmail: $assigneeEmail, \
             dueDate: $dueDate) {{ success errors task {{ {TASK_FIELDS} }} }} }}"
        );
        let variables = with_var(serde_json::to_value(changes)?, "id", id);
        let data: Data = self.execute("updateTask", &query, variables)?;
        data.update_task.into_entity("updateTask")
    }

    fn delete_task(&self, id: &str) -> Result<()> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Data {
            delete_task: MutationOutcome,
        }
        let query = "mutation($id: ID!) { deleteTask(id: $id) { success errors } }";
        let data: Data = self.execute("deleteTask", query, json!({ "id": id }))?;
        data.delete_task.ensure("deleteTask")
    }

    fn add_comment(
        &self,
        task_id: &str,
        content: &str,
        author_email: &str,
    ) -> Result<TaskComment> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Data {
            add_task_comment: CommentPayload,
        }
        let query = format!(
            "mutation($taskId: ID!, $content: String!, $authorEmail: String!) {{ \
             addTaskComment(taskId: $taskId, content: $content, authorEmail: $authorEmail) {{ \
             success errors comment {{ {COMMENT_FIELDS} }} }} }}"
        );
        let variables = json!({
            "taskId": task_id,
            "content": content,
            "authorEmail": author_email,
        });
        let data: Data = self.execute("addTaskComment", &query, variables)?;
        data.add_task_comment.into_entity("addTaskComment")
    }

    fn update_comment(&self, id: &str, content: &str) -> Result<TaskComment> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Data {
            update_task_comment: CommentPayload,
        }
        let query = format!(
            "mutation($id: ID!, $content: String!) {{ \
             updateTaskComment(id: $id, content: $content) {{ \
             success errors comment {{ {COMMENT_FIELDS} }} }} }}"
        );
        let data: Data = self.execute(
            "updateTaskComment",
            &query,
            json!({ "id": id, "content": content }),
        )?;
        data.update_task_comment.into_entity("updateTaskComment")
    }

    fn delete_comment(&self, id: &str) -> Result<()> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Data {
            delete_task_comment: MutationOutcome,
        }
        let query = "mutation($id: ID!) { deleteTaskComment(id: $id) { success errors } }";
        let data: Data = self.execute("deleteTaskComment", query, json!({ "id": id }))?;
        data.delete_task_comment.ensure("deleteTaskComment")
    }
}

#[derive(Debug, Deserialize)]
struct OrganizationPayload {
    #[serde(flatten)]
    outcome: MutationOutcome,
    organization: Option<Organization>,
}

#[derive(Debug, Deserialize)]
struct ProjectPayload {
    #[serde(flatten)]
    outcome: MutationOutcome,
    project: Option<Project>,
}

#[derive(Debug, Deserialize)]
struct TaskPayload {
    #[serde(flatten)]
    outcome: MutationOutcome,
    task: Option<Task>,
}

#[derive(Debug, Deserialize)]
struct CommentPayload {
    #[serde(flatten)]
    outcome: MutationOutcome,
    comment: Option<TaskComment>,
}

impl OrganizationPayload {
    fn into_entity(self, operation: &str) -> Result<Organization> {
        self.outcome.ensure(operation)?;
        self.organization
            .ok_or_else(|| Error::GraphQl(format!("{operation}: payload carried no entity")))
    }
}

impl ProjectPayload {
    fn into_entity(self, operation: &str) -> Result<Project> {
        self.outcome.ensure(operation)?;
        self.project
            .ok_or_else(|| Error::GraphQl(format!("{operation}: payload carried no entity")))
    }
}

impl TaskPayload {
    fn into_entity(self, operation: &str) -> Result<Task> {
        self.outcome.ensure(operation)?;
        self.task
            .ok_or_else(|| Error::GraphQl(format!("{operation}: payload carried no entity")))
    }
}

impl CommentPayload {
    fn into_entity(self, operation: &str) -> Result<TaskComment> {
        self.outcome.ensure(operation)?;
        self.comment
            .ok_or_else(|| Error::GraphQl(format!("{operation}: payload carried no entity")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwrap_response_prefers_errors_over_data() {
        let body: GraphQlResponse<serde_json::Value> = serde_json::from_str(
            r#"{"data": null, "errors": [{"message": "boom"}, {"message": "again"}]}"#,
        )
        .expect("parse");
        let err = unwrap_response("tasks", body).expect_err("errors win");
        let text = err.to_string();
        assert!(text.contains("tasks"));
        assert!(text.contains("boom; again"));
    }

    #[test]
    fn unwrap_response_requires_data() {
        let body: GraphQlResponse<serde_json::Value> =
            serde_json::from_str(r#"{"errors": []}"#).expect("parse");
        assert!(unwrap_response("tasks", body).is_err());

        let body: GraphQlResponse<serde_json::Value> =
            serde_json::from_str(r#"{"data": {"tasks": []}}"#).expect("parse");
        let data = unwrap_response("tasks", body).expect("data");
        assert_eq!(data["tasks"], serde_json::json!([]));
    }

    #[test]
    fn with_var_merges_into_change_sets() {
        let changes = TaskChanges::status_only(TaskStatus::Done);
        let variables = with_var(serde_json::to_value(&changes).expect("value"), "id", "42");
        assert_eq!(variables["id"], "42");
        assert_eq!(variables["status"], "DONE");
    }

    #[test]
    fn task_payload_flattens_outcome() {
        let payload: TaskPayload = serde_json::from_str(
            r#"{
                "success": true,
                "errors": [],
                "task": {
                    "id": "9",
                    "title": "Ship it",
                    "status": "DONE",
                    "priority": "HIGH",
                    "createdAt": "2024-03-01T09:00:00+00:00",
                    "commentCount": 0
                }
            }"#,
        )
        .expect("parse");
        let task = payload.into_entity("updateTask").expect("entity");
        assert_eq!(task.id, "9");
        assert_eq!(task.status, TaskStatus::Done);
    }

    #[test]
    fn rejected_payload_surfaces_server_reasons() {
        let payload: TaskPayload = serde_json::from_str(
            r#"{"success": false, "errors": ["Task not found"], "task": null}"#,
        )
        .expect("parse");
        let err = payload.into_entity("updateTask").expect_err("rejected");
        assert!(err.to_string().contains("Task not found"));
    }
}
