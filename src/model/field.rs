use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Declared kind of a project field, kept verbatim from the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DataType {
    Assignees,
    Date,
    IssueType,
    Iteration,
    Labels,
    LinkedPullRequests,
    Milestone,
    Number,
    ParentIssue,
    Repository,
    Reviewers,
    SingleSelect,
    SubIssuesProgress,
    Text,
    Title,
    TrackedBy,
    Tracks,
    Other(String),
}

impl DataType {
    pub fn as_str(&self) -> &str {
        match self {
            DataType::Assignees => "ASSIGNEES",
            DataType::Date => "DATE",
            DataType::IssueType => "ISSUE_TYPE",
            DataType::Iteration => "ITERATION",
            DataType::Labels => "LABELS",
            DataType::LinkedPullRequests => "LINKED_PULL_REQUESTS",
            DataType::Milestone => "MILESTONE",
            DataType::Number => "NUMBER",
            DataType::ParentIssue => "PARENT_ISSUE",
            DataType::Repository => "REPOSITORY",
            DataType::Reviewers => "REVIEWERS",
            DataType::SingleSelect => "SINGLE_SELECT",
            DataType::SubIssuesProgress => "SUB_ISSUES_PROGRESS",
            DataType::Text => "TEXT",
            DataType::Title => "TITLE",
            DataType::TrackedBy => "TRACKED_BY",
            DataType::Tracks => "TRACKS",
            DataType::Other(s) => s,
        }
    }
}

impl From<&str> for DataType {
    fn from(s: &str) -> Self {
        match s {
            "ASSIGNEES" => DataType::Assignees,
            "DATE" => DataType::Date,
            "ISSUE_TYPE" => DataType::IssueType,
            "ITERATION" => DataType::Iteration,
            "LABELS" => DataType::Labels,
            "LINKED_PULL_REQUESTS" => DataType::LinkedPullRequests,
            "MILESTONE" => DataType::Milestone,
            "NUMBER" => DataType::Number,
            "PARENT_ISSUE" => DataType::ParentIssue,
            "REPOSITORY" => DataType::Repository,
            "REVIEWERS" => DataType::Reviewers,
            "SINGLE_SELECT" => DataType::SingleSelect,
            "SUB_ISSUES_PROGRESS" => DataType::SubIssuesProgress,
            "TEXT" => DataType::Text,
            "TITLE" => DataType::Title,
            "TRACKED_BY" => DataType::TrackedBy,
            "TRACKS" => DataType::Tracks,
            other => DataType::Other(other.to_string()),
        }
    }
}

impl From<String> for DataType {
    fn from(s: String) -> Self {
        DataType::from(s.as_str())
    }
}

impl From<DataType> for String {
    fn from(d: DataType) -> Self {
        d.as_str().to_string()
    }
}

/// One selectable option: a single-select choice, a label, a milestone...
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl FieldOption {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            color: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IterationDef {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

/// Iteration field definition (cadence plus known iterations).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IterationConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_day: Option<u32>,
    #[serde(default)]
    pub iterations: Vec<IterationDef>,
    #[serde(default)]
    pub completed_iterations: Vec<IterationDef>,
}

/// A project field as advertised by the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfig {
    pub id: String,
    pub name: String,
    pub data_type: DataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<IterationConfiguration>,
    /// Per-repository option catalogs, keyed by `owner/name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_options: Option<BTreeMap<String, Vec<FieldOption>>>,
}

impl FieldConfig {
    pub fn new(id: impl Into<String>, name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            data_type,
            options: None,
            configuration: None,
            repo_options: None,
        }
    }

    pub fn is_title(&self) -> bool {
        self.data_type == DataType::Title || self.name.eq_ignore_ascii_case("title")
    }
}
