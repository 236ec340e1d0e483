//! Query text construction. Everything here is pure: same inputs, same text.

use serde::{Deserialize, Serialize};

use super::introspect::{shapes, ShapeSet};
use crate::model::field::{DataType, FieldConfig};

/// Page sizes for every collection a query asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryLimits {
    pub items: u32,
    pub fields: u32,
    pub sub_issues: u32,
    pub linked_prs: u32,
    pub labels: u32,
    pub users: u32,
    pub repo_labels: u32,
    pub repo_milestones: u32,
    pub views: u32,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            items: 50,
            fields: 50,
            sub_issues: 20,
            linked_prs: 10,
            labels: 20,
            users: 10,
            repo_labels: 100,
            repo_milestones: 50,
            views: 50,
        }
    }
}

/// GraphQL string literal for `s`.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Wraps `body` in `node(id: $projectId) { ... on ProjectV2 { body } }`.
fn project_query(name: &str, extra_vars: &str, body: &str) -> String {
    format!(
        "query {name}($projectId: ID!{extra_vars}) {{\n  node(id: $projectId) {{\n    ... on ProjectV2 {{\n{body}    }}\n  }}\n}}"
    )
}

const OPTION_SELECTION: &str = "options { id name description color }";
const ITERATION_SELECTION: &str = "configuration { duration startDay iterations { id title startDate duration } completedIterations { id title startDate duration } }";
const FIELD_COMMON: &str = "... on ProjectV2FieldCommon { id name dataType }";
const ISSUE_SUMMARY: &str = "id number title url state repository { nameWithOwner }";

pub fn project_metadata_query() -> String {
    project_query(
        "ProjectMetadata",
        "",
        "      id title number url shortDescription closed\n",
    )
}

/// Field listing; single-select and iteration sub-selections only for shapes
/// in `config_shapes`.
pub fn fields_query(limits: &QueryLimits, config_shapes: &ShapeSet) -> String {
    let mut nodes = format!("          {FIELD_COMMON}\n");
    if config_shapes.contains(shapes::SINGLE_SELECT_FIELD) {
        nodes.push_str(&format!(
            "          ... on {} {{ {OPTION_SELECTION} }}\n",
            shapes::SINGLE_SELECT_FIELD
        ));
    }
    if config_shapes.contains(shapes::ITERATION_FIELD) {
        nodes.push_str(&format!(
            "          ... on {} {{ {ITERATION_SELECTION} }}\n",
            shapes::ITERATION_FIELD
        ));
    }
    let body = format!(
        "      fields(first: {}) {{\n        nodes {{\n{nodes}        }}\n      }}\n",
        limits.fields
    );
    project_query("ProjectFields", "", &body)
}

/// Config shape a field needs a detail lookup for, if any.
pub fn detail_shape(field: &FieldConfig) -> Option<&'static str> {
    match field.data_type {
        DataType::SingleSelect => Some(shapes::SINGLE_SELECT_FIELD),
        DataType::Iteration => Some(shapes::ITERATION_FIELD),
        _ => None,
    }
}

/// Per-field detail lookups aliased `f{index}`. Fields without a confirmed
/// detail shape are left out entirely; `None` when nothing remains.
pub fn field_detail_query(fields: &[FieldConfig], config_shapes: &ShapeSet) -> Option<String> {
    let mut body = String::new();
    for (i, field) in fields.iter().enumerate() {
        let Some(shape) = detail_shape(field).filter(|s| config_shapes.contains(s)) else {
            continue;
        };
        let selection = if shape == shapes::SINGLE_SELECT_FIELD {
            OPTION_SELECTION
        } else {
            ITERATION_SELECTION
        };
        body.push_str(&format!(
            "      f{i}: field(name: {}) {{ ... on {shape} {{ id {selection} }} }}\n",
            quote(&field.name)
        ));
    }
    if body.is_empty() {
        return None;
    }
    Some(project_query("ProjectFieldDetails", "", &body))
}

/// Selection body for one value shape, without the `... on` wrapper.
pub fn value_fragment_body(shape: &str, limits: &QueryLimits) -> Option<String> {
    let body = match shape {
        shapes::TEXT => "text".to_string(),
        shapes::DATE => "date".to_string(),
        shapes::NUMBER => "number".to_string(),
        shapes::SINGLE_SELECT => "optionId name color description".to_string(),
        shapes::REPOSITORY => {
            "repository { id name nameWithOwner url owner { login } }".to_string()
        }
        shapes::PULL_REQUEST => format!(
            "pullRequests(first: {}) {{ nodes {{ id number title url state merged mergedAt repository {{ nameWithOwner }} author {{ login }} labels(first: {}) {{ nodes {{ id name color description }} }} }} }}",
            limits.linked_prs, limits.labels
        ),
        shapes::LABEL => format!(
            "labels(first: {}) {{ nodes {{ id name color description }} }}",
            limits.labels
        ),
        shapes::ISSUE => format!(
            "issue {{ {ISSUE_SUMMARY} parent {{ {ISSUE_SUMMARY} }} subIssuesSummary {{ total completed percentCompleted }} }}"
        ),
        shapes::REVIEWER => format!(
            "reviewers(first: {}) {{ nodes {{ __typename ... on User {{ id login name avatarUrl url }} ... on Mannequin {{ id login avatarUrl url }} ... on Team {{ id teamName: name slug teamAvatarUrl: avatarUrl url }} }} }}",
            limits.users
        ),
        shapes::USER => format!(
            "users(first: {}) {{ nodes {{ id login name avatarUrl url }} }}",
            limits.users
        ),
        shapes::ITERATION => "iterationId title startDate duration".to_string(),
        shapes::MILESTONE => {
            "milestone { id title number state dueOn description url }".to_string()
        }
        shapes::SUB_ISSUES_PROGRESS => "total completed percentCompleted".to_string(),
        _ => return None,
    };
    Some(body)
}

/// Value shape forced onto fields of a kind whose alias otherwise comes back
/// null.
fn forced_shape(data_type: &DataType) -> Option<&'static str> {
    match data_type {
        DataType::ParentIssue => Some(shapes::ISSUE),
        DataType::SubIssuesProgress => Some(shapes::SUB_ISSUES_PROGRESS),
        _ => None,
    }
}

/// Shapes requested for one field's value alias, in candidate order.
pub fn value_shapes_for(field: &FieldConfig, value_shapes: &ShapeSet) -> Vec<&'static str> {
    let mut selected: Vec<&'static str> = shapes::VALUE_SHAPES
        .iter()
        .copied()
        .filter(|s| value_shapes.is_empty() || value_shapes.contains(s))
        .collect();
    if let Some(forced) = forced_shape(&field.data_type) {
        if value_shapes.contains(forced) && !selected.contains(&forced) {
            selected.push(forced);
        }
    }
    selected
}

/// Embedded item content. `state` and the reviewer `name`/`avatarUrl` differ
/// in type across the union members, so those selections are aliased.
fn content_selection(limits: &QueryLimits) -> String {
    let labels = format!(
        "labels(first: {}) {{ nodes {{ id name color description }} }}",
        limits.labels
    );
    let assignees = format!(
        "assignees(first: {}) {{ nodes {{ id login name avatarUrl url }} }}",
        limits.users
    );
    let repo = "repository { id name nameWithOwner url owner { login } }";
    format!(
        "content {{\n            __typename\n            ... on DraftIssue {{ id title body }}\n            ... on Issue {{ id number title url issueState: state {repo} {labels} {assignees} parent {{ {ISSUE_SUMMARY} }} subIssuesSummary {{ total completed percentCompleted }} subIssues(first: {}) {{ nodes {{ {ISSUE_SUMMARY} }} }} }}\n            ... on PullRequest {{ id number title url prState: state merged {repo} {labels} {assignees} author {{ login }} }}\n          }}\n",
        limits.sub_issues
    )
}

/// Item listing with one `f{index}: fieldValueByName` alias per field.
pub fn items_query(
    limits: &QueryLimits,
    fields: &[FieldConfig],
    value_shapes: &ShapeSet,
    filter: Option<&str>,
) -> String {
    let mut args = format!("first: {}", limits.items);
    if let Some(filter) = filter.filter(|f| !f.trim().is_empty()) {
        args.push_str(&format!(", query: {}", quote(filter)));
    }

    let mut nodes = String::from("          id\n          ");
    nodes.push_str(&content_selection(limits));
    for (i, field) in fields.iter().enumerate() {
        let fragments: Vec<String> = value_shapes_for(field, value_shapes)
            .into_iter()
            .filter_map(|shape| {
                value_fragment_body(shape, limits).map(|body| format!("... on {shape} {{ {body} }}"))
            })
            .collect();
        let mut selection = String::from("__typename");
        for fragment in fragments {
            selection.push(' ');
            selection.push_str(&fragment);
        }
        nodes.push_str(&format!(
            "          f{i}: fieldValueByName(name: {}) {{ {selection} }}\n",
            quote(&field.name)
        ));
    }

    let body = format!(
        "      items({args}) {{\n        nodes {{\n{nodes}        }}\n      }}\n"
    );
    project_query("ProjectItems", "", &body)
}

/// Splits `owner/name`; `None` for anything else.
pub fn split_repo(full_name: &str) -> Option<(&str, &str)> {
    let (owner, name) = full_name.split_once('/')?;
    if owner.is_empty() || name.is_empty() || name.contains('/') {
        return None;
    }
    Some((owner, name))
}

/// Label and milestone catalogs per repository, aliased `r{index}`.
/// Malformed names are skipped but keep their index.
pub fn repo_options_query(limits: &QueryLimits, repo_names: &[String]) -> Option<String> {
    let mut query = String::from("query RepositoryOptions {\n");
    let mut any = false;
    for (i, full_name) in repo_names.iter().enumerate() {
        let Some((owner, name)) = split_repo(full_name) else {
            continue;
        };
        any = true;
        query.push_str(&format!(
            "  r{i}: repository(owner: {}, name: {}) {{\n    nameWithOwner\n    labels(first: {}) {{ nodes {{ id name color description }} }}\n    milestones(first: {}) {{ nodes {{ id title number state dueOn description url }} }}\n  }}\n",
            quote(owner),
            quote(name),
            limits.repo_labels,
            limits.repo_milestones
        ));
    }
    query.push('}');
    any.then_some(query)
}

pub fn views_query(limits: &QueryLimits) -> String {
    let body = format!(
        "      views(first: {}) {{\n        nodes {{ id name number layout filter }}\n      }}\n",
        limits.views
    );
    project_query("ProjectViews", "", &body)
}

pub fn view_detail_query(limits: &QueryLimits) -> String {
    let field_ref = "... on ProjectV2FieldCommon { id name }";
    let n = limits.fields;
    let body = format!(
        "      view(number: $number) {{\n        id name number layout filter\n        fields(first: {n}) {{ nodes {{ {field_ref} }} }}\n        groupByFields(first: {n}) {{ nodes {{ {field_ref} }} }}\n        verticalGroupByFields(first: {n}) {{ nodes {{ {field_ref} }} }}\n        sortByFields(first: {n}) {{ nodes {{ direction field {{ {field_ref} }} }} }}\n      }}\n"
    );
    project_query("ProjectViewDetails", ", $number: Int!", &body)
}
