use std::collections::BTreeSet;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::GraphqlExecutor;

/// Shape tags of the `ProjectV2ItemFieldValue` union this crate can decode.
pub mod shapes {
    pub const TEXT: &str = "ProjectV2ItemFieldTextValue";
    pub const DATE: &str = "ProjectV2ItemFieldDateValue";
    pub const NUMBER: &str = "ProjectV2ItemFieldNumberValue";
    pub const SINGLE_SELECT: &str = "ProjectV2ItemFieldSingleSelectValue";
    pub const REPOSITORY: &str = "ProjectV2ItemFieldRepositoryValue";
    pub const PULL_REQUEST: &str = "ProjectV2ItemFieldPullRequestValue";
    pub const LABEL: &str = "ProjectV2ItemFieldLabelValue";
    pub const ISSUE: &str = "ProjectV2ItemFieldIssueValue";
    pub const REVIEWER: &str = "ProjectV2ItemFieldReviewerValue";
    pub const USER: &str = "ProjectV2ItemFieldUserValue";
    pub const ITERATION: &str = "ProjectV2ItemFieldIterationValue";
    pub const MILESTONE: &str = "ProjectV2ItemFieldMilestoneValue";
    pub const SUB_ISSUES_PROGRESS: &str = "ProjectV2ItemFieldSubIssuesProgressValue";

    pub const VALUE_UNION: &str = "ProjectV2ItemFieldValue";

    pub const SINGLE_SELECT_FIELD: &str = "ProjectV2SingleSelectField";
    pub const ITERATION_FIELD: &str = "ProjectV2IterationField";

    pub const VALUE_SHAPES: [&str; 13] = [
        TEXT,
        DATE,
        NUMBER,
        SINGLE_SELECT,
        REPOSITORY,
        PULL_REQUEST,
        LABEL,
        ISSUE,
        REVIEWER,
        USER,
        ITERATION,
        MILESTONE,
        SUB_ISSUES_PROGRESS,
    ];

    pub const CONFIG_SHAPES: [&str; 2] = [SINGLE_SELECT_FIELD, ITERATION_FIELD];
}

/// What to assume about shape support when the introspection call itself fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IntrospectionFailurePolicy {
    /// Treat every candidate as present.
    #[default]
    IncludeAll,
    /// Treat every candidate as absent.
    ExcludeAll,
}

/// Set of shape names known to exist on the remote schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShapeSet(BTreeSet<String>);

impl ShapeSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn contains(&self, shape: &str) -> bool {
        self.0.contains(shape)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<S: Into<String>> FromIterator<S> for ShapeSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

pub struct SchemaIntrospector<'a> {
    executor: &'a dyn GraphqlExecutor,
    policy: IntrospectionFailurePolicy,
}

impl<'a> SchemaIntrospector<'a> {
    pub fn new(executor: &'a dyn GraphqlExecutor, policy: IntrospectionFailurePolicy) -> Self {
        Self { executor, policy }
    }

    /// Which candidate value shapes are members of the field value union.
    pub async fn discover_value_shapes(&self) -> ShapeSet {
        let candidates = &shapes::VALUE_SHAPES;
        match self.executor.execute(&value_shapes_query(), None).await {
            Ok(data) => {
                let found = parse_value_shapes(&data, candidates);
                tracing::debug!("Value shapes confirmed: {}/{}", found.len(), candidates.len());
                found
            }
            Err(e) => {
                tracing::warn!("Value shape introspection failed ({:?}): {e:#}", self.policy);
                self.fallback(candidates)
            }
        }
    }

    /// Which of `candidates` exist as types on the remote schema.
    pub async fn discover_config_shapes(&self, candidates: &[&str]) -> ShapeSet {
        let Some(query) = config_shapes_query(candidates) else {
            return ShapeSet::empty();
        };
        match self.executor.execute(&query, None).await {
            Ok(data) => {
                let found = parse_config_shapes(&data, candidates);
                tracing::debug!("Config shapes confirmed: {}/{}", found.len(), candidates.len());
                found
            }
            Err(e) => {
                tracing::warn!("Config shape introspection failed ({:?}): {e:#}", self.policy);
                self.fallback(candidates)
            }
        }
    }

    fn fallback(&self, candidates: &[&str]) -> ShapeSet {
        match self.policy {
            IntrospectionFailurePolicy::IncludeAll => candidates.iter().copied().collect(),
            IntrospectionFailurePolicy::ExcludeAll => ShapeSet::empty(),
        }
    }
}

pub fn value_shapes_query() -> String {
    format!(
        "query ValueShapes {{\n  __type(name: \"{}\") {{\n    possibleTypes {{ name }}\n  }}\n}}",
        shapes::VALUE_UNION
    )
}

pub fn config_shapes_query(candidates: &[&str]) -> Option<String> {
    if candidates.is_empty() {
        return None;
    }
    let mut query = String::from("query ConfigShapes {\n");
    for (i, name) in candidates.iter().enumerate() {
        query.push_str(&format!("  t{i}: __type(name: {}) {{ name }}\n", super::query::quote(name)));
    }
    query.push('}');
    Some(query)
}

fn parse_value_shapes(data: &Value, candidates: &[&str]) -> ShapeSet {
    let possible: BTreeSet<&str> = data
        .get("__type")
        .and_then(|t| t.get("possibleTypes"))
        .and_then(Value::as_array)
        .map(|types| types.iter().filter_map(|t| t.get("name")?.as_str()).collect())
        .unwrap_or_default();
    candidates
        .iter()
        .copied()
        .filter(|c| possible.contains(c))
        .collect()
}

fn parse_config_shapes(data: &Value, candidates: &[&str]) -> ShapeSet {
    candidates
        .iter()
        .enumerate()
        .filter(|(i, _)| data.get(format!("t{i}")).is_some_and(|t| !t.is_null()))
        .map(|(_, name)| *name)
        .collect()
}
