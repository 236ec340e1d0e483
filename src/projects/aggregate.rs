use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::Serialize;
use serde_json::Value;

use crate::model::field::FieldOption;
use crate::model::item::Item;
use crate::model::value::{
    IssueSummary, LabelRef, MilestoneRef, PullRequestRef, RepositoryRef, ValueKind,
};
use crate::util::json::{decode, nodes_at, present};

/// Cross-item catalogs gathered from one page of normalized items.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedMaps {
    pub label_map: BTreeMap<String, LabelRef>,
    pub milestone_map: BTreeMap<String, MilestoneRef>,
    pub repo_map: BTreeMap<String, RepositoryRef>,
    pub pr_map: BTreeMap<String, PullRequestRef>,
    pub issue_map: BTreeMap<String, IssueSummary>,
    /// Sorted `owner/name` of every repository seen or referenced.
    pub repo_names: Vec<String>,
}

#[derive(Default)]
struct Collector {
    maps: AggregatedMaps,
    repo_names: BTreeSet<String>,
}

impl Collector {
    fn label(&mut self, label: &LabelRef) {
        if !label.id.is_empty() {
            self.maps
                .label_map
                .entry(label.id.clone())
                .or_insert_with(|| label.clone());
        }
    }

    fn milestone(&mut self, milestone: &MilestoneRef) {
        if !milestone.id.is_empty() {
            self.maps
                .milestone_map
                .entry(milestone.id.clone())
                .or_insert_with(|| milestone.clone());
        }
    }

    fn repository(&mut self, repo: &RepositoryRef) {
        let full_name = repo.full_name();
        if let Some(name) = &full_name {
            self.repo_names.insert(name.clone());
        }
        if let Some(key) = repo.id.clone().or(full_name) {
            self.maps.repo_map.entry(key).or_insert_with(|| repo.clone());
        }
    }

    fn repo_name(&mut self, name: Option<&String>) {
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            self.repo_names.insert(name.clone());
        }
    }

    fn pull_request(&mut self, pr: &PullRequestRef) {
        self.repo_name(pr.repository.as_ref());
        for label in &pr.labels {
            self.label(label);
        }
        if !pr.id.is_empty() {
            self.maps
                .pr_map
                .entry(pr.id.clone())
                .or_insert_with(|| pr.clone());
        }
    }

    fn issue(&mut self, issue: &IssueSummary) {
        self.repo_name(issue.repository.as_ref());
        if !issue.id.is_empty() {
            self.maps
                .issue_map
                .entry(issue.id.clone())
                .or_insert_with(|| issue.clone());
        }
    }

    fn finish(mut self) -> AggregatedMaps {
        self.maps.repo_names = self.repo_names.into_iter().collect();
        self.maps
    }
}

/// Single pass over every item's values and content; first insertion wins.
pub fn aggregate_maps(items: &[Item]) -> AggregatedMaps {
    let mut c = Collector::default();

    for item in items {
        if let Some(content) = &item.content {
            if let Some(repo) = &content.repository {
                c.repository(repo);
            }
            for label in &content.labels {
                c.label(label);
            }
        }

        for value in &item.field_values {
            match &value.kind {
                ValueKind::Labels { labels } => labels.iter().for_each(|l| c.label(l)),
                ValueKind::Milestone {
                    milestone: Some(milestone),
                } => c.milestone(milestone),
                ValueKind::Repository {
                    repository: Some(repo),
                } => c.repository(repo),
                ValueKind::PullRequest { pull_requests } => {
                    pull_requests.iter().for_each(|pr| c.pull_request(pr))
                }
                ValueKind::Issue { issues } => {
                    for issue in issues {
                        c.issue(&issue.summary);
                        if let Some(parent) = &issue.parent {
                            c.issue(parent);
                        }
                    }
                }
                ValueKind::ParentIssue { parent } => c.issue(parent),
                _ => {}
            }
        }
    }

    c.finish()
}

fn option_key(option: &FieldOption) -> String {
    if option.id.is_empty() {
        format!("name:{}", option.name.to_lowercase())
    } else {
        format!("id:{}", option.id)
    }
}

/// De-duplicating merge of up to three option sources.
///
/// Keyed by id, else by lower-cased name. The first occurrence wins and the
/// result keeps first-seen order. Two distinct id-less options sharing a
/// display name collapse into one.
pub fn merge_options(
    existing: Option<&[FieldOption]>,
    repo_options: Option<&BTreeMap<String, Vec<FieldOption>>>,
    inferred: Option<&[FieldOption]>,
) -> Vec<FieldOption> {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();

    let from_repos = repo_options.into_iter().flat_map(|m| m.values().flatten());
    let sources = existing
        .unwrap_or_default()
        .iter()
        .chain(from_repos)
        .chain(inferred.unwrap_or_default());

    for option in sources {
        if seen.insert(option_key(option)) {
            merged.push(option.clone());
        }
    }
    merged
}

pub fn label_options(labels: &BTreeMap<String, LabelRef>) -> Vec<FieldOption> {
    labels.values().map(label_option).collect()
}

fn label_option(label: &LabelRef) -> FieldOption {
    FieldOption {
        id: label.id.clone(),
        name: label.name.clone(),
        description: label.description.clone(),
        color: label.color.clone(),
    }
}

pub fn milestone_options(milestones: &BTreeMap<String, MilestoneRef>) -> Vec<FieldOption> {
    milestones.values().map(milestone_option).collect()
}

fn milestone_option(milestone: &MilestoneRef) -> FieldOption {
    FieldOption {
        id: milestone.id.clone(),
        name: milestone.title.clone(),
        description: milestone.description.clone(),
        color: None,
    }
}

pub fn pull_request_options(prs: &BTreeMap<String, PullRequestRef>) -> Vec<FieldOption> {
    prs.values()
        .map(|pr| FieldOption::new(pr.id.clone(), numbered(pr.number, &pr.title)))
        .collect()
}

pub fn issue_options(issues: &BTreeMap<String, IssueSummary>) -> Vec<FieldOption> {
    issues
        .values()
        .map(|issue| FieldOption::new(issue.id.clone(), numbered(issue.number, &issue.title)))
        .collect()
}

fn numbered(number: Option<u64>, title: &str) -> String {
    match number {
        Some(n) => format!("#{n} {title}"),
        None => title.to_string(),
    }
}

/// Label and milestone catalogs per repository, keyed by `owner/name`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepoCatalogs {
    pub labels: BTreeMap<String, Vec<FieldOption>>,
    pub milestones: BTreeMap<String, Vec<FieldOption>>,
}

/// Reads `r{index}` aliases back onto `repo_names[index]`.
pub fn parse_repo_catalogs(data: &Value, repo_names: &[String]) -> RepoCatalogs {
    let mut catalogs = RepoCatalogs::default();
    for (i, name) in repo_names.iter().enumerate() {
        let Some(repo) = present(data, &format!("r{i}")) else {
            continue;
        };
        let labels: Vec<FieldOption> = nodes_at(repo, "labels")
            .iter()
            .filter_map(decode::<LabelRef>)
            .map(|l| label_option(&l))
            .collect();
        let milestones: Vec<FieldOption> = nodes_at(repo, "milestones")
            .iter()
            .filter_map(decode::<MilestoneRef>)
            .map(|m| milestone_option(&m))
            .collect();
        catalogs.labels.insert(name.clone(), labels);
        catalogs.milestones.insert(name.clone(), milestones);
    }
    catalogs
}
