// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
//! GraphQL documents for every operation the dashboard consumes.

pub const GET_ORGANIZATIONS: &str = r#"
query GetOrganizations {
  organizations {
    id
    name
    slug
    contactEmail
    createdAt
  }
}
"#;

pub const GET_PROJECTS: &str = r#"
query GetProjects($organizationSlug: String!, $status: String, $search: String) {
  projects(organizationSlug: $organizationSlug, status: $status, search: $search) {
    id
    name
    description
    status
    dueDate
    createdAt
    taskCount
    completedTasks
  }
}
"#;

pub const GET_PROJECT: &str = r#"
query GetProject($id: ID!) {
  project(id: $id) {
    id
    name
    description
    status
    dueDate
    createdAt
    taskCount
    completedTasks
  }
}
"#;

pub const GET_PROJECT_STATISTICS: &str = r#"
query GetProjectStatistics($projectId: ID!) {
  projectStatistics(projectId: $projectId) {
    totalTasks
    completedTasks
    inProgressTasks
    todoTasks
    completionRate
  }
}
"#;

pub const GET_TASKS: &str = r#"
query GetTasks($projectId: ID!, $status: String, $search: String) {
  tasks(projectId: $projectId, status: $status, search: $search) {
    id
    title
    description
    status
    assigneeEmail
    dueDate
    createdAt
  }
}
"#;

pub const GET_TASK: &str = r#"
query GetTask($id: ID!) {
  task(id: $id) {
    id
    title
    description
    status
    assigneeEmail
    dueDate
    createdAt
    comments {
      id
      content
      authorEmail
      createdAt
    }
  }
}
"#;

pub const GET_COMMENTS: &str = r#"
query GetComments($taskId: ID!) {
  comments(taskId: $taskId) {
    id
    content
    authorEmail
    createdAt
  }
}
"#;

pub const CREATE_ORGANIZATION: &str = r#"
mutation CreateOrganization($input: CreateOrganizationInput!) {
  createOrganization(input: $input) {
    organization {
      id
      name
      slug
      contactEmail
    }
    errors {
      field
      message
    }
  }
}
"#;

pub const CREATE_PROJECT: &str = r#"
mutation CreateProject($input: CreateProjectInput!) {
  createProject(input: $input) {
    project {
      id
      name
      description
      status
      dueDate
      createdAt
      taskCount
      completedTasks
    }
    errors {
      field
      message
    }
  }
}
"#;

pub const UPDATE_PROJECT: &str = r#"
mutation UpdateProject($id: ID!, $input: UpdateProjectInput!) {
  updateProject(id: $id, input: $input) {
    project {
      id
      name
      description
      status
      dueDate
      createdAt
      taskCount
      completedTasks
    }
    errors {
      field
      message
    }
  }
}
"#;

pub const DELETE_PROJECT: &str = r#"
mutation DeleteProject($id: ID!) {
  deleteProject(id: $id) {
    success
    errors {
      field
      message
    }
  }
}
"#;

pub const CREATE_TASK: &str = r#"
mutation CreateTask($input: CreateTaskInput!) {
  createTask(input: $input) {
    task {
      id
      title
      description
      status
      assigneeEmail
      dueDate
      createdAt
    }
    errors {
      field
      message
    }
  }
}
"#;

pub const UPDATE_TASK: &str = r#"
mutation UpdateTask($id: ID!, $input: UpdateTaskInput!) {
  updateTask(id: $id, input: $input) {
    task {
      id
      title
      description
      status
      assigneeEmail
      dueDate
      createdAt
    }
    errors {
      field
      message
    }
  }
}
"#;

pub const DELETE_TASK: &str = r#"
mutation DeleteTask($id: ID!) {
  deleteTask(id: $id) {
    success
    errors {
      field
      message
    }
  }
}
"#;

pub const CREATE_COMMENT: &str = r#"
mutation CreateComment($input: CreateCommentInput!) {
  createComment(input: $input) {
    comment {
      id
      content
      authorEmail
      createdAt
    }
    errors {
      field
      message
    }
  }
}
"#;

pub const TASK_UPDATED: &str = r#"
subscription OnTaskUpdated($projectId: ID!) {
  taskUpdated(projectId: $projectId) {
    id
    title
    description
    status
    assigneeEmail
    dueDate
  }
}
"#;

pub const COMMENT_ADDED: &str = r#"
subscription OnCommentAdded($taskId: ID!) {
  commentAdded(taskId: $taskId) {
    id
    content
    authorEmail
    createdAt
  }
}
"#;
