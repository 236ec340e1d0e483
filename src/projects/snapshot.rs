use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::{json, Value};

use super::aggregate::{
    aggregate_maps, issue_options, label_options, merge_options, milestone_options,
    parse_repo_catalogs, pull_request_options, AggregatedMaps, RepoCatalogs,
};
use super::introspect::{shapes, IntrospectionFailurePolicy, SchemaIntrospector};
use super::normalize::normalize_item;
use super::query::{
    field_detail_query, fields_query, items_query, project_metadata_query, repo_options_query,
    view_detail_query, views_query, QueryLimits,
};
use super::views::{apply_view, parse_view_detail, parse_views};
use super::{GraphqlExecutor, ProjectError};
use crate::model::field::{DataType, FieldConfig, FieldOption, IterationConfiguration};
use crate::model::item::{Item, ProjectInfo, ProjectSnapshot};
use crate::model::view::{ProjectView, ViewDetail};
use crate::util::json::{decode, nodes_at, present, str_at, u64_at};

#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Item page size; falls back to the configured limit.
    pub first: Option<u32>,
    /// Item filter expression, passed through verbatim.
    pub view_filter: Option<String>,
}

/// Runs the whole fetch sequence against one executor.
pub struct SnapshotAssembler {
    executor: Arc<dyn GraphqlExecutor>,
    limits: QueryLimits,
    policy: IntrospectionFailurePolicy,
}

impl SnapshotAssembler {
    pub fn new(executor: Arc<dyn GraphqlExecutor>) -> Self {
        Self {
            executor,
            limits: QueryLimits::default(),
            policy: IntrospectionFailurePolicy::default(),
        }
    }

    pub fn with_limits(mut self, limits: QueryLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_failure_policy(mut self, policy: IntrospectionFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    fn introspector(&self) -> SchemaIntrospector<'_> {
        SchemaIntrospector::new(self.executor.as_ref(), self.policy)
    }

    pub async fn fetch_project_fields(
        &self,
        project_id: &str,
        options: FetchOptions,
    ) -> Result<ProjectSnapshot> {
        let executor = self.executor.as_ref();
        let vars = json!({ "projectId": project_id });

        let data = executor
            .execute(&project_metadata_query(), Some(vars.clone()))
            .await
            .context("Failed to fetch project metadata")?;
        let project = parse_project_info(&data).ok_or_else(|| ProjectError::ProjectNotFound {
            project_id: project_id.to_string(),
        })?;
        tracing::info!("Fetching project {} ({})", project.title, project.id);

        // The listing carries options and iteration configuration for every
        // confirmed config shape; the detail pass below only refines them.
        let introspector = self.introspector();
        let config_shapes = introspector
            .discover_config_shapes(&shapes::CONFIG_SHAPES)
            .await;
        let data = executor
            .execute(&fields_query(&self.limits, &config_shapes), Some(vars.clone()))
            .await
            .context("Failed to fetch project fields")?;
        let mut fields = parse_fields(&data);
        tracing::debug!("Project has {} fields", fields.len());

        if let Some(query) = field_detail_query(&fields, &config_shapes) {
            match executor.execute(&query, Some(vars.clone())).await {
                Ok(data) => apply_field_details(&mut fields, &data),
                Err(e) => tracing::warn!("Field detail fetch failed, keeping listed options: {e:#}"),
            }
        }

        let value_shapes = introspector.discover_value_shapes().await;
        let limits = QueryLimits {
            items: options.first.unwrap_or(self.limits.items),
            ..self.limits
        };
        let query = items_query(&limits, &fields, &value_shapes, options.view_filter.as_deref());
        let data = executor
            .execute(&query, Some(vars))
            .await
            .context("Failed to fetch project items")?;
        let items = parse_items(&data, &fields);
        tracing::debug!("Normalized {} items", items.len());

        let maps = aggregate_maps(&items);
        let catalogs = self.fetch_repo_catalogs(&maps.repo_names).await;
        enrich_fields(&mut fields, &maps, &catalogs);

        Ok(ProjectSnapshot {
            project,
            fields,
            items,
            all_fields: None,
            details: None,
        })
    }

    async fn fetch_repo_catalogs(&self, repo_names: &[String]) -> RepoCatalogs {
        let Some(query) = repo_options_query(&self.limits, repo_names) else {
            return RepoCatalogs::default();
        };
        match self.executor.execute(&query, None).await {
            Ok(data) => parse_repo_catalogs(&data, repo_names),
            Err(e) => {
                tracing::warn!("Repository option fetch failed for {} repos: {e:#}", repo_names.len());
                RepoCatalogs::default()
            }
        }
    }

    pub async fn fetch_project_views(&self, project_id: &str) -> Result<Vec<ProjectView>> {
        let data = self
            .executor
            .execute(&views_query(&self.limits), Some(json!({ "projectId": project_id })))
            .await
            .context("Failed to fetch project views")?;
        Ok(parse_views(&data))
    }

    pub async fn get_project_view_details(
        &self,
        project_id: &str,
        view_number: u64,
    ) -> Result<Option<ViewDetail>> {
        let vars = json!({ "projectId": project_id, "number": view_number });
        let data = self
            .executor
            .execute(&view_detail_query(&self.limits), Some(vars))
            .await
            .with_context(|| format!("Failed to fetch view {view_number}"))?;
        Ok(parse_view_detail(&data))
    }

    /// Snapshot scoped to one view: its filter narrows the items, its field
    /// list orders the advertised fields.
    pub async fn fetch_view_snapshot(
        &self,
        project_id: &str,
        view_number: u64,
        first: Option<u32>,
    ) -> Result<ProjectSnapshot> {
        let view = self
            .get_project_view_details(project_id, view_number)
            .await?
            .with_context(|| format!("View {view_number} not found in project {project_id}"))?;
        let options = FetchOptions {
            first,
            view_filter: view.view.filter.clone(),
        };
        let snapshot = self.fetch_project_fields(project_id, options).await?;
        Ok(apply_view(snapshot, view))
    }
}

fn project_node(data: &Value) -> Option<&Value> {
    present(data, "node")
}

pub fn parse_project_info(data: &Value) -> Option<ProjectInfo> {
    let node = project_node(data)?;
    Some(ProjectInfo {
        id: str_at(node, "id")?,
        title: str_at(node, "title").unwrap_or_default(),
        number: u64_at(node, "number"),
        url: str_at(node, "url"),
        short_description: str_at(node, "shortDescription"),
        closed: node.get("closed").and_then(Value::as_bool).unwrap_or(false),
    })
}

/// Field listing; nodes without id or name are dropped.
pub fn parse_fields(data: &Value) -> Vec<FieldConfig> {
    let Some(node) = project_node(data) else {
        return Vec::new();
    };
    nodes_at(node, "fields")
        .iter()
        .filter_map(|n| {
            let mut field = FieldConfig::new(
                str_at(n, "id")?,
                str_at(n, "name")?,
                DataType::from(n.get("dataType").and_then(Value::as_str).unwrap_or_default()),
            );
            field.options = present(n, "options").and_then(decode::<Vec<FieldOption>>);
            field.configuration = present(n, "configuration").and_then(decode::<IterationConfiguration>);
            Some(field)
        })
        .collect()
}

/// Attaches `f{index}` detail lookups to `fields[index]`.
pub fn apply_field_details(fields: &mut [FieldConfig], data: &Value) {
    let Some(node) = project_node(data) else {
        return;
    };
    for (i, field) in fields.iter_mut().enumerate() {
        let Some(detail) = present(node, &format!("f{i}")) else {
            continue;
        };
        if let Some(options) = present(detail, "options").and_then(decode::<Vec<FieldOption>>) {
            field.options = Some(options);
        }
        if let Some(config) = present(detail, "configuration").and_then(decode) {
            field.configuration = Some(config);
        }
    }
}

pub fn parse_items(data: &Value, fields: &[FieldConfig]) -> Vec<Item> {
    let Some(node) = project_node(data) else {
        tracing::warn!("Item query returned no project node");
        return Vec::new();
    };
    nodes_at(node, "items")
        .iter()
        .filter_map(|n| normalize_item(n, fields))
        .collect()
}

/// Folds catalogs back into field option lists.
pub fn enrich_fields(fields: &mut [FieldConfig], maps: &AggregatedMaps, catalogs: &RepoCatalogs) {
    for field in fields.iter_mut() {
        let (repo_options, inferred) = match field.data_type {
            DataType::Labels => (Some(&catalogs.labels), label_options(&maps.label_map)),
            DataType::Milestone => (
                Some(&catalogs.milestones),
                milestone_options(&maps.milestone_map),
            ),
            DataType::LinkedPullRequests => (None, pull_request_options(&maps.pr_map)),
            DataType::ParentIssue => (None, issue_options(&maps.issue_map)),
            _ => continue,
        };
        let repo_options = repo_options.filter(|m| !m.is_empty());
        let merged = merge_options(field.options.as_deref(), repo_options, Some(inferred.as_slice()));
        if !merged.is_empty() {
            field.options = Some(merged);
        }
        if let Some(repo_options) = repo_options {
            field.repo_options = Some(repo_options.clone());
        }
    }
}
