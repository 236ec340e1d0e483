use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::item::ItemContent;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_with_owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl RepositoryRef {
    /// `owner/name`, derived from the parts when the service omitted it.
    pub fn full_name(&self) -> Option<String> {
        if let Some(full) = self.name_with_owner.as_deref().filter(|s| !s.is_empty()) {
            return Some(full.to_string());
        }
        match (self.owner.as_deref(), self.name.as_deref()) {
            (Some(owner), Some(name)) if !owner.is_empty() && !name.is_empty() => {
                Some(format!("{owner}/{name}"))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelRef {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub login: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneRef {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Sub-issue completion counters as reported on an issue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubIssuesSummary {
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub completed: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_completed: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueSummary {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u64>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// `owner/name` of the repository holding the issue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRef {
    #[serde(flatten)]
    pub summary: IssueSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<IssueSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_issues_summary: Option<SubIssuesSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestRef {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u64>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default)]
    pub merged: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default)]
    pub labels: Vec<LabelRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewerKind {
    User,
    Mannequin,
    Team,
    Unknown,
}

impl ReviewerKind {
    pub fn from_typename(typename: Option<&str>) -> Self {
        match typename {
            Some("User") => ReviewerKind::User,
            Some("Mannequin") => ReviewerKind::Mannequin,
            Some("Team") => ReviewerKind::Team,
            _ => ReviewerKind::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reviewer {
    pub kind: ReviewerKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Login for users and mannequins, slug for teams.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Payload of a normalized field value, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ValueKind {
    Text {
        text: Option<String>,
    },
    Date {
        date: Option<String>,
    },
    Number {
        number: Option<f64>,
    },
    SingleSelect {
        option_id: Option<String>,
        name: Option<String>,
        color: Option<String>,
        description: Option<String>,
    },
    Repository {
        repository: Option<RepositoryRef>,
    },
    PullRequest {
        pull_requests: Vec<PullRequestRef>,
    },
    Labels {
        labels: Vec<LabelRef>,
    },
    Issue {
        issues: Vec<IssueRef>,
    },
    ParentIssue {
        parent: IssueSummary,
    },
    RequestedReviewers {
        reviewers: Vec<Reviewer>,
    },
    Assignees {
        assignees: Vec<UserRef>,
    },
    Iteration {
        iteration_id: Option<String>,
        title: Option<String>,
        start_date: Option<String>,
        duration: Option<u32>,
        end_date: Option<String>,
    },
    Milestone {
        milestone: Option<MilestoneRef>,
    },
    SubIssuesProgress {
        total: u32,
        done: u32,
        percent: u32,
    },
    Title {
        title: Option<String>,
    },
    Missing {
        field_name: String,
    },
    Unknown {
        typename: Option<String>,
    },
}

impl ValueKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ValueKind::Text { .. } => "text",
            ValueKind::Date { .. } => "date",
            ValueKind::Number { .. } => "number",
            ValueKind::SingleSelect { .. } => "single_select",
            ValueKind::Repository { .. } => "repository",
            ValueKind::PullRequest { .. } => "pull_request",
            ValueKind::Labels { .. } => "labels",
            ValueKind::Issue { .. } => "issue",
            ValueKind::ParentIssue { .. } => "parent_issue",
            ValueKind::RequestedReviewers { .. } => "requested_reviewers",
            ValueKind::Assignees { .. } => "assignees",
            ValueKind::Iteration { .. } => "iteration",
            ValueKind::Milestone { .. } => "milestone",
            ValueKind::SubIssuesProgress { .. } => "sub_issues_progress",
            ValueKind::Title { .. } => "title",
            ValueKind::Missing { .. } => "missing",
            ValueKind::Unknown { .. } => "unknown",
        }
    }
}

/// One item's value for one field.
///
/// `raw` echoes the source node and `content` the item's issue/PR summary so
/// renderers never need the original response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedValue {
    pub field_id: String,
    #[serde(flatten)]
    pub kind: ValueKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ItemContent>,
}

impl NormalizedValue {
    pub fn new(field_id: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            field_id: field_id.into(),
            kind,
            raw: None,
            content: None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }
}
