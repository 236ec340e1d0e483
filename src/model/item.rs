use serde::{Deserialize, Serialize};

use super::field::FieldConfig;
use super::value::{IssueSummary, LabelRef, NormalizedValue, RepositoryRef, SubIssuesSummary, UserRef};
use super::view::ViewDetail;

/// Summary of the issue, pull request or draft behind a project item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemContent {
    /// `Issue`, `PullRequest` or `DraftIssue`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<RepositoryRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<LabelRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assignees: Vec<UserRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<IssueSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_issues_summary: Option<SubIssuesSummary>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_issues: Vec<IssueSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub content: Option<ItemContent>,
    /// One entry per project field, in field order.
    pub field_values: Vec<NormalizedValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(default)]
    pub closed: bool,
}

/// Everything one fetch knows about a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSnapshot {
    pub project: ProjectInfo,
    /// Fields advertised as visible, in display order.
    pub fields: Vec<FieldConfig>,
    pub items: Vec<Item>,
    /// Unfiltered field list, set when a view narrowed `fields`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_fields: Option<Vec<FieldConfig>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ViewDetail>,
}
