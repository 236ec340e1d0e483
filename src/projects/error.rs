use thiserror::Error;

/// Domain failures a caller may want to tell apart from transport noise.
#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("Project {project_id} not found or not accessible")]
    ProjectNotFound { project_id: String },

    #[error("GraphQL error: {0}")]
    Graphql(String),

    #[error("GraphQL response carried no data")]
    EmptyResponse,
}

impl ProjectError {
    /// Stable identifier for user-facing messaging.
    pub fn code(&self) -> &'static str {
        match self {
            ProjectError::ProjectNotFound { .. } => "PROJECT_NOT_FOUND",
            ProjectError::Graphql(_) => "GRAPHQL_ERROR",
            ProjectError::EmptyResponse => "EMPTY_RESPONSE",
        }
    }
}
