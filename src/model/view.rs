use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    pub id: String,
    pub name: String,
    pub number: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewField {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSort {
    pub field_id: String,
    pub field_name: String,
    /// `ASC` or `DESC`.
    pub direction: String,
}

/// A view's full definition: which fields it shows, in which order, and how
/// it groups and sorts items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewDetail {
    #[serde(flatten)]
    pub view: ProjectView,
    #[serde(default)]
    pub fields: Vec<ViewField>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_by_fields: Vec<ViewField>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vertical_group_by_fields: Vec<ViewField>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sort_by: Vec<ViewSort>,
}
