use chrono::{Days, NaiveDate};
use serde_json::Value;

use super::introspect::shapes;
use crate::model::field::{DataType, FieldConfig};
use crate::model::item::{Item, ItemContent};
use crate::model::value::{
    IssueRef, IssueSummary, LabelRef, NormalizedValue, PullRequestRef, RepositoryRef, Reviewer,
    ReviewerKind, SubIssuesSummary, UserRef, ValueKind,
};
use crate::util::json::{coerce_number, decode, nodes_at, present, str_at, u64_at};

type Decoder = fn(&Value) -> ValueKind;

/// Shape tag to decoder. Tags not listed here decode to `unknown`.
const DECODERS: [(&str, Decoder); 13] = [
    (shapes::TEXT, decode_text),
    (shapes::DATE, decode_date),
    (shapes::NUMBER, decode_number),
    (shapes::SINGLE_SELECT, decode_single_select),
    (shapes::REPOSITORY, decode_repository),
    (shapes::PULL_REQUEST, decode_pull_requests),
    (shapes::LABEL, decode_labels),
    (shapes::ISSUE, decode_issues),
    (shapes::REVIEWER, decode_reviewers),
    (shapes::USER, decode_users),
    (shapes::ITERATION, decode_iteration),
    (shapes::MILESTONE, decode_milestone),
    (shapes::SUB_ISSUES_PROGRESS, decode_progress),
];

fn decoder_for(typename: &str) -> Option<Decoder> {
    DECODERS
        .iter()
        .find(|(tag, _)| *tag == typename)
        .map(|(_, decode)| *decode)
}

/// Normalizes one value node for `field`.
///
/// Title fields always yield `title`. Everything else dispatches on
/// `__typename`; unfamiliar tags yield `unknown`, never an error.
pub fn parse_field_value(
    node: &Value,
    field: &FieldConfig,
    content: Option<&ItemContent>,
) -> NormalizedValue {
    let kind = if field.is_title() {
        decode_title(node, content)
    } else {
        let typename = node.get("__typename").and_then(Value::as_str);
        match typename.and_then(decoder_for) {
            Some(decode) => decode(node),
            None => ValueKind::Unknown {
                typename: typename.map(String::from),
            },
        }
    };
    annotate(NormalizedValue::new(&field.id, kind), Some(node), content)
}

/// Value for a field whose alias came back absent or null.
///
/// Parent issue, sub-issue progress and title are rebuilt from the item's
/// own content when it carries them; anything else is `missing`.
pub fn synthesize_value(field: &FieldConfig, content: Option<&ItemContent>) -> NormalizedValue {
    let synthesized = content.and_then(|c| match field.data_type {
        DataType::ParentIssue => c.parent.as_ref().map(|parent| {
            (
                ValueKind::ParentIssue {
                    parent: parent.clone(),
                },
                serde_json::to_value(parent).ok(),
            )
        }),
        DataType::SubIssuesProgress => c.sub_issues_summary.as_ref().map(|s| {
            (
                progress_kind(s.total, s.completed, s.percent_completed),
                serde_json::to_value(s).ok(),
            )
        }),
        _ if field.is_title() => c.title.as_ref().map(|title| {
            (
                ValueKind::Title {
                    title: Some(title.clone()),
                },
                None,
            )
        }),
        _ => None,
    });

    match synthesized {
        Some((kind, raw)) => {
            let mut value = NormalizedValue::new(&field.id, kind);
            value.raw = raw;
            annotate(value, None, content)
        }
        None => annotate(
            NormalizedValue::new(
                &field.id,
                ValueKind::Missing {
                    field_name: field.name.clone(),
                },
            ),
            None,
            content,
        ),
    }
}

/// Builds an item with exactly one value per field, in field order.
/// `None` when the node has no id.
pub fn normalize_item(node: &Value, fields: &[FieldConfig]) -> Option<Item> {
    let id = str_at(node, "id")?;
    let content = present(node, "content").and_then(parse_content);

    let field_values = fields
        .iter()
        .enumerate()
        .map(|(i, field)| match present(node, &format!("f{i}")) {
            Some(value_node) => parse_field_value(value_node, field, content.as_ref()),
            None => synthesize_value(field, content.as_ref()),
        })
        .collect();

    Some(Item {
        id,
        content,
        field_values,
    })
}

/// Typed view of an item's `content` (Issue, PullRequest or DraftIssue).
pub fn parse_content(v: &Value) -> Option<ItemContent> {
    if !v.is_object() {
        return None;
    }
    Some(ItemContent {
        kind: str_at(v, "__typename"),
        id: str_at(v, "id"),
        number: u64_at(v, "number"),
        title: v.get("title").and_then(Value::as_str).map(String::from),
        body: str_at(v, "body"),
        url: str_at(v, "url"),
        state: str_at(v, "issueState")
            .or_else(|| str_at(v, "prState"))
            .or_else(|| str_at(v, "state")),
        merged: v.get("merged").and_then(Value::as_bool),
        author: present(v, "author").and_then(|a| str_at(a, "login")),
        repository: present(v, "repository").map(repository_ref),
        labels: decode_nodes(v, "labels"),
        assignees: decode_nodes(v, "assignees"),
        parent: present(v, "parent").and_then(issue_summary),
        sub_issues_summary: present(v, "subIssuesSummary").and_then(decode::<SubIssuesSummary>),
        sub_issues: nodes_at(v, "subIssues")
            .iter()
            .filter_map(issue_summary)
            .collect(),
    })
}

fn annotate(
    mut value: NormalizedValue,
    node: Option<&Value>,
    content: Option<&ItemContent>,
) -> NormalizedValue {
    if value.raw.is_none() {
        value.raw = node.cloned();
    }
    if value.content.is_none() {
        value.content = content.cloned();
    }
    value
}

fn decode_nodes<T: serde::de::DeserializeOwned>(v: &Value, key: &str) -> Vec<T> {
    nodes_at(v, key).iter().filter_map(decode).collect()
}

fn repository_ref(v: &Value) -> RepositoryRef {
    RepositoryRef {
        id: str_at(v, "id"),
        name: str_at(v, "name"),
        name_with_owner: str_at(v, "nameWithOwner"),
        owner: present(v, "owner").and_then(|o| str_at(o, "login")),
        url: str_at(v, "url"),
    }
}

fn issue_summary(v: &Value) -> Option<IssueSummary> {
    if !v.is_object() {
        return None;
    }
    Some(IssueSummary {
        id: str_at(v, "id").unwrap_or_default(),
        number: u64_at(v, "number"),
        title: str_at(v, "title").unwrap_or_default(),
        url: str_at(v, "url"),
        state: str_at(v, "state"),
        repository: present(v, "repository").and_then(|r| str_at(r, "nameWithOwner")),
    })
}

fn issue_ref(v: &Value) -> Option<IssueRef> {
    Some(IssueRef {
        summary: issue_summary(v)?,
        parent: present(v, "parent").and_then(issue_summary),
        sub_issues_summary: present(v, "subIssuesSummary").and_then(decode),
    })
}

fn pull_request_ref(v: &Value) -> Option<PullRequestRef> {
    if !v.is_object() {
        return None;
    }
    Some(PullRequestRef {
        id: str_at(v, "id").unwrap_or_default(),
        number: u64_at(v, "number"),
        title: str_at(v, "title").unwrap_or_default(),
        url: str_at(v, "url"),
        state: str_at(v, "state"),
        merged: v.get("merged").and_then(Value::as_bool).unwrap_or(false),
        merged_at: str_at(v, "mergedAt"),
        repository: present(v, "repository").and_then(|r| str_at(r, "nameWithOwner")),
        author: present(v, "author").and_then(|a| str_at(a, "login")),
        labels: decode_nodes(v, "labels"),
    })
}

fn reviewer(v: &Value) -> Option<Reviewer> {
    if !v.is_object() {
        return None;
    }
    Some(Reviewer {
        kind: ReviewerKind::from_typename(v.get("__typename").and_then(Value::as_str)),
        id: str_at(v, "id"),
        login: str_at(v, "login").or_else(|| str_at(v, "slug")),
        name: str_at(v, "name").or_else(|| str_at(v, "teamName")),
        avatar_url: str_at(v, "avatarUrl").or_else(|| str_at(v, "teamAvatarUrl")),
        url: str_at(v, "url"),
    })
}

/// Counts wider than `u32` are treated as absent rather than truncated.
fn u32_at(v: &Value, key: &str) -> Option<u32> {
    u64_at(v, key).and_then(|n| u32::try_from(n).ok())
}

fn progress_kind(total: u32, done: u32, percent: Option<u32>) -> ValueKind {
    let percent = percent.unwrap_or_else(|| {
        if total == 0 {
            0
        } else {
            ((done as f64 / total as f64) * 100.0).round() as u32
        }
    });
    ValueKind::SubIssuesProgress {
        total,
        done,
        percent,
    }
}

/// Last day of an iteration starting on `start` and lasting `days` days.
fn iteration_end(start: &str, days: u32) -> Option<String> {
    let start = NaiveDate::parse_from_str(start, "%Y-%m-%d").ok()?;
    let end = start.checked_add_days(Days::new(u64::from(days.checked_sub(1)?)))?;
    Some(end.format("%Y-%m-%d").to_string())
}

fn decode_title(node: &Value, content: Option<&ItemContent>) -> ValueKind {
    let title = node
        .get("text")
        .and_then(Value::as_str)
        .map(String::from)
        .or_else(|| content.and_then(|c| c.title.clone()));
    ValueKind::Title { title }
}

fn decode_text(node: &Value) -> ValueKind {
    ValueKind::Text {
        text: node.get("text").and_then(Value::as_str).map(String::from),
    }
}

fn decode_date(node: &Value) -> ValueKind {
    ValueKind::Date {
        date: str_at(node, "date"),
    }
}

fn decode_number(node: &Value) -> ValueKind {
    ValueKind::Number {
        number: node.get("number").and_then(coerce_number),
    }
}

fn decode_single_select(node: &Value) -> ValueKind {
    ValueKind::SingleSelect {
        option_id: str_at(node, "optionId"),
        name: str_at(node, "name"),
        color: str_at(node, "color"),
        description: str_at(node, "description"),
    }
}

fn decode_repository(node: &Value) -> ValueKind {
    ValueKind::Repository {
        repository: present(node, "repository").map(repository_ref),
    }
}

fn decode_pull_requests(node: &Value) -> ValueKind {
    ValueKind::PullRequest {
        pull_requests: nodes_at(node, "pullRequests")
            .iter()
            .filter_map(pull_request_ref)
            .collect(),
    }
}

fn decode_labels(node: &Value) -> ValueKind {
    ValueKind::Labels {
        labels: decode_nodes::<LabelRef>(node, "labels"),
    }
}

fn decode_issues(node: &Value) -> ValueKind {
    let listed = nodes_at(node, "issues").iter().filter_map(issue_ref);
    let single = present(node, "issue").and_then(issue_ref);
    ValueKind::Issue {
        issues: listed.chain(single).collect(),
    }
}

fn decode_reviewers(node: &Value) -> ValueKind {
    ValueKind::RequestedReviewers {
        reviewers: nodes_at(node, "reviewers")
            .iter()
            .filter_map(reviewer)
            .collect(),
    }
}

fn decode_users(node: &Value) -> ValueKind {
    ValueKind::Assignees {
        assignees: decode_nodes::<UserRef>(node, "users"),
    }
}

fn decode_iteration(node: &Value) -> ValueKind {
    let start_date = str_at(node, "startDate");
    let duration = u32_at(node, "duration");
    let end_date = match (start_date.as_deref(), duration) {
        (Some(start), Some(days)) => iteration_end(start, days),
        _ => None,
    };
    ValueKind::Iteration {
        iteration_id: str_at(node, "iterationId"),
        title: str_at(node, "title"),
        start_date,
        duration,
        end_date,
    }
}

fn decode_milestone(node: &Value) -> ValueKind {
    ValueKind::Milestone {
        milestone: present(node, "milestone").and_then(decode),
    }
}

fn decode_progress(node: &Value) -> ValueKind {
    let total = u32_at(node, "total").unwrap_or(0);
    let done = u32_at(node, "completed").unwrap_or(0);
    let percent = u32_at(node, "percentCompleted");
    progress_kind(total, done, percent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(id: &str, name: &str, data_type: DataType) -> FieldConfig {
        FieldConfig::new(id, name, data_type)
    }

    #[test]
    fn title_field_wins_over_text_shape() {
        let f = field("f-title", "Title", DataType::Title);
        let value = parse_field_value(&json!({ "text": "Hello" }), &f, None);
        assert_eq!(value.type_name(), "title");
        assert_eq!(
            value.kind,
            ValueKind::Title {
                title: Some("Hello".into())
            }
        );

        let tagged = json!({ "__typename": shapes::TEXT, "text": "Hello" });
        assert_eq!(parse_field_value(&tagged, &f, None).type_name(), "title");
    }

    #[test]
    fn title_by_name_falls_back_to_content_title() {
        let f = field("f", "title", DataType::Other("CUSTOM".into()));
        let content = ItemContent {
            title: Some("From content".into()),
            ..Default::default()
        };
        let value = parse_field_value(&json!({}), &f, Some(&content));
        assert_eq!(
            value.kind,
            ValueKind::Title {
                title: Some("From content".into())
            }
        );
        assert_eq!(value.content.as_ref(), Some(&content));
    }

    #[test]
    fn parse_is_pure() {
        let f = field("f1", "Labels", DataType::Labels);
        let node = json!({
            "__typename": shapes::LABEL,
            "labels": { "nodes": [{ "id": "L1", "name": "bug", "color": "d73a4a" }] }
        });
        assert_eq!(parse_field_value(&node, &f, None), parse_field_value(&node, &f, None));
    }

    #[test]
    fn unknown_shape_keeps_raw_node() {
        let f = field("f1", "Mystery", DataType::Other("FUTURE".into()));
        let node = json!({ "__typename": "ProjectV2ItemFieldFutureValue", "x": 1 });
        let value = parse_field_value(&node, &f, None);
        assert_eq!(
            value.kind,
            ValueKind::Unknown {
                typename: Some("ProjectV2ItemFieldFutureValue".into())
            }
        );
        assert_eq!(value.raw, Some(node));
    }

    #[test]
    fn untagged_node_is_unknown() {
        let f = field("f1", "Estimate", DataType::Number);
        let value = parse_field_value(&json!({ "number": 3 }), &f, None);
        assert_eq!(value.kind, ValueKind::Unknown { typename: None });
    }

    #[test]
    fn number_strings_are_coerced() {
        let f = field("f1", "Estimate", DataType::Number);
        let node = json!({ "__typename": shapes::NUMBER, "number": "8" });
        assert_eq!(
            parse_field_value(&node, &f, None).kind,
            ValueKind::Number { number: Some(8.0) }
        );
    }

    #[test]
    fn single_select_carries_option_details() {
        let f = field("f1", "Status", DataType::SingleSelect);
        let node = json!({
            "__typename": shapes::SINGLE_SELECT,
            "optionId": "opt1", "name": "Todo", "color": "GRAY", "description": "Not started"
        });
        assert_eq!(
            parse_field_value(&node, &f, None).kind,
            ValueKind::SingleSelect {
                option_id: Some("opt1".into()),
                name: Some("Todo".into()),
                color: Some("GRAY".into()),
                description: Some("Not started".into()),
            }
        );
    }

    #[test]
    fn plain_text_field_decodes_text() {
        let f = field("f1", "Notes", DataType::Text);
        let node = json!({ "__typename": shapes::TEXT, "text": "Needs design review" });
        assert_eq!(
            parse_field_value(&node, &f, None).kind,
            ValueKind::Text {
                text: Some("Needs design review".into())
            }
        );
        let empty = json!({ "__typename": shapes::TEXT, "text": null });
        assert_eq!(
            parse_field_value(&empty, &f, None).kind,
            ValueKind::Text { text: None }
        );
    }

    #[test]
    fn date_field_keeps_date_string() {
        let f = field("f1", "Due", DataType::Date);
        let node = json!({ "__typename": shapes::DATE, "date": "2024-06-30" });
        assert_eq!(
            parse_field_value(&node, &f, None).kind,
            ValueKind::Date {
                date: Some("2024-06-30".into())
            }
        );
    }

    #[test]
    fn repository_field_decodes_reference() {
        let f = field("f1", "Repository", DataType::Repository);
        let node = json!({
            "__typename": shapes::REPOSITORY,
            "repository": {
                "id": "R_1", "name": "api", "nameWithOwner": "acme/api",
                "url": "https://github.com/acme/api", "owner": { "login": "acme" }
            }
        });
        let ValueKind::Repository { repository } = parse_field_value(&node, &f, None).kind else {
            panic!("expected repository");
        };
        let repository = repository.unwrap();
        assert_eq!(repository.id.as_deref(), Some("R_1"));
        assert_eq!(repository.owner.as_deref(), Some("acme"));
        assert_eq!(repository.full_name().as_deref(), Some("acme/api"));

        let detached = json!({ "__typename": shapes::REPOSITORY, "repository": null });
        assert_eq!(
            parse_field_value(&detached, &f, None).kind,
            ValueKind::Repository { repository: None }
        );
    }

    #[test]
    fn milestone_field_decodes_reference() {
        let f = field("f1", "Milestone", DataType::Milestone);
        let node = json!({
            "__typename": shapes::MILESTONE,
            "milestone": {
                "id": "M_1", "title": "v1.0", "number": 3, "state": "OPEN",
                "dueOn": "2024-07-01T00:00:00Z"
            }
        });
        let ValueKind::Milestone { milestone } = parse_field_value(&node, &f, None).kind else {
            panic!("expected milestone");
        };
        let milestone = milestone.unwrap();
        assert_eq!(milestone.id, "M_1");
        assert_eq!(milestone.title, "v1.0");
        assert_eq!(milestone.number, Some(3));
        assert_eq!(milestone.due_on.as_deref(), Some("2024-07-01T00:00:00Z"));
    }

    #[test]
    fn user_field_decodes_assignees() {
        let f = field("f1", "Assignees", DataType::Assignees);
        let node = json!({
            "__typename": shapes::USER,
            "users": { "nodes": [
                { "id": "U_1", "login": "octo", "name": "Octo Cat" },
                { "id": "U_2", "name": "No Login" },
                null
            ]}
        });
        let value = parse_field_value(&node, &f, None);
        assert_eq!(value.type_name(), "assignees");
        let ValueKind::Assignees { assignees } = value.kind else {
            panic!("expected assignees");
        };
        assert_eq!(assignees.len(), 2);
        assert_eq!(assignees[0].login, "octo");
        assert_eq!(assignees[0].name.as_deref(), Some("Octo Cat"));
        assert_eq!(assignees[1].login, "");
        assert_eq!(assignees[1].id.as_deref(), Some("U_2"));
    }

    #[test]
    fn pull_requests_are_flattened() {
        let f = field("f1", "Linked pull requests", DataType::LinkedPullRequests);
        let node = json!({
            "__typename": shapes::PULL_REQUEST,
            "pullRequests": { "nodes": [{
                "id": "PR_1", "number": 7, "title": "Fix", "url": "u", "state": "MERGED",
                "merged": true, "mergedAt": "2024-05-01T00:00:00Z",
                "repository": { "nameWithOwner": "acme/api" },
                "author": { "login": "octo" },
                "labels": { "nodes": [{ "id": "L1", "name": "bug" }] }
            }, null] }
        });
        let ValueKind::PullRequest { pull_requests } = parse_field_value(&node, &f, None).kind
        else {
            panic!("expected pull_request");
        };
        assert_eq!(pull_requests.len(), 1);
        let pr = &pull_requests[0];
        assert_eq!(pr.number, Some(7));
        assert!(pr.merged);
        assert_eq!(pr.repository.as_deref(), Some("acme/api"));
        assert_eq!(pr.author.as_deref(), Some("octo"));
        assert_eq!(pr.labels[0].name, "bug");
    }

    #[test]
    fn issue_list_and_single_issue_are_concatenated() {
        let f = field("f1", "Parent issue", DataType::ParentIssue);
        let node = json!({
            "__typename": shapes::ISSUE,
            "issues": { "nodes": [{ "id": "I_1", "number": 1, "title": "One" }] },
            "issue": {
                "id": "I_2", "number": 2, "title": "Two",
                "repository": { "nameWithOwner": "acme/api" },
                "parent": { "id": "I_0", "title": "Epic" },
                "subIssuesSummary": { "total": 2, "completed": 1, "percentCompleted": 50 }
            }
        });
        let ValueKind::Issue { issues } = parse_field_value(&node, &f, None).kind else {
            panic!("expected issue");
        };
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].summary.id, "I_1");
        assert_eq!(issues[1].summary.repository.as_deref(), Some("acme/api"));
        assert_eq!(issues[1].parent.as_ref().map(|p| p.title.as_str()), Some("Epic"));
        assert_eq!(issues[1].sub_issues_summary.as_ref().map(|s| s.total), Some(2));
    }

    #[test]
    fn reviewers_are_kind_tagged() {
        let f = field("f1", "Reviewers", DataType::Reviewers);
        let node = json!({
            "__typename": shapes::REVIEWER,
            "reviewers": { "nodes": [
                { "__typename": "User", "login": "octo" },
                { "__typename": "Team", "slug": "core", "name": "Core" },
                { "__typename": "Bot", "login": "ci" }
            ]}
        });
        let ValueKind::RequestedReviewers { reviewers } = parse_field_value(&node, &f, None).kind
        else {
            panic!("expected requested_reviewers");
        };
        let kinds: Vec<ReviewerKind> = reviewers.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![ReviewerKind::User, ReviewerKind::Team, ReviewerKind::Unknown]
        );
        assert_eq!(reviewers[1].login.as_deref(), Some("core"));
    }

    #[test]
    fn team_reviewer_reads_aliased_fields() {
        let f = field("f1", "Reviewers", DataType::Reviewers);
        let node = json!({
            "__typename": shapes::REVIEWER,
            "reviewers": { "nodes": [{
                "__typename": "Team", "id": "T_1", "slug": "core",
                "teamName": "Core", "teamAvatarUrl": "https://avatars/core"
            }]}
        });
        let ValueKind::RequestedReviewers { reviewers } = parse_field_value(&node, &f, None).kind
        else {
            panic!("expected requested_reviewers");
        };
        assert_eq!(reviewers[0].name.as_deref(), Some("Core"));
        assert_eq!(reviewers[0].avatar_url.as_deref(), Some("https://avatars/core"));
    }

    #[test]
    fn iteration_computes_end_date() {
        let f = field("f1", "Sprint", DataType::Iteration);
        let node = json!({
            "__typename": shapes::ITERATION,
            "iterationId": "it1", "title": "Sprint 3", "startDate": "2024-02-26", "duration": 14
        });
        let ValueKind::Iteration { end_date, duration, .. } = parse_field_value(&node, &f, None).kind
        else {
            panic!("expected iteration");
        };
        assert_eq!(duration, Some(14));
        assert_eq!(end_date.as_deref(), Some("2024-03-10"));
    }

    #[test]
    fn progress_computes_missing_percent() {
        let f = field("f1", "Progress", DataType::SubIssuesProgress);
        let node = json!({ "__typename": shapes::SUB_ISSUES_PROGRESS, "total": 3, "completed": 1 });
        assert_eq!(
            parse_field_value(&node, &f, None).kind,
            ValueKind::SubIssuesProgress {
                total: 3,
                done: 1,
                percent: 33
            }
        );
    }

    #[test]
    fn progress_synthesized_from_content() {
        let f = field("f1", "Progress", DataType::SubIssuesProgress);
        let content = parse_content(&json!({
            "__typename": "Issue",
            "subIssuesSummary": { "total": 4, "completed": 1, "percentCompleted": 25 }
        }))
        .unwrap();
        let value = synthesize_value(&f, Some(&content));
        assert_eq!(
            value.kind,
            ValueKind::SubIssuesProgress {
                total: 4,
                done: 1,
                percent: 25
            }
        );
        assert_eq!(value.field_id, "f1");
        assert!(value.raw.is_some());
    }

    #[test]
    fn synthesized_progress_computes_missing_percent() {
        let f = field("f1", "Progress", DataType::SubIssuesProgress);
        let content = parse_content(&json!({
            "__typename": "Issue",
            "subIssuesSummary": { "total": 3, "completed": 2 }
        }))
        .unwrap();
        assert_eq!(
            synthesize_value(&f, Some(&content)).kind,
            ValueKind::SubIssuesProgress {
                total: 3,
                done: 2,
                percent: 67
            }
        );
    }

    #[test]
    fn oversized_counts_are_not_truncated() {
        let f = field("f1", "Progress", DataType::SubIssuesProgress);
        let node = json!({
            "__typename": shapes::SUB_ISSUES_PROGRESS,
            "total": 4_294_967_300u64, "completed": 1, "percentCompleted": 4_294_967_296u64
        });
        assert_eq!(
            parse_field_value(&node, &f, None).kind,
            ValueKind::SubIssuesProgress {
                total: 0,
                done: 1,
                percent: 0
            }
        );

        let sprint = field("f2", "Sprint", DataType::Iteration);
        let node = json!({
            "__typename": shapes::ITERATION,
            "startDate": "2024-02-26", "duration": 4_294_967_310u64
        });
        let ValueKind::Iteration { duration, end_date, .. } =
            parse_field_value(&node, &sprint, None).kind
        else {
            panic!("expected iteration");
        };
        assert_eq!(duration, None);
        assert_eq!(end_date, None);
    }

    #[test]
    fn parent_issue_synthesized_from_content() {
        let f = field("f1", "Parent issue", DataType::ParentIssue);
        let content = parse_content(&json!({
            "__typename": "Issue",
            "parent": { "id": "I_9", "number": 9, "title": "Epic", "repository": { "nameWithOwner": "acme/api" } }
        }))
        .unwrap();
        let ValueKind::ParentIssue { parent } = synthesize_value(&f, Some(&content)).kind else {
            panic!("expected parent_issue");
        };
        assert_eq!(parent.number, Some(9));
        assert_eq!(parent.repository.as_deref(), Some("acme/api"));
    }

    #[test]
    fn missing_without_equivalent_content() {
        let f = field("f1", "Progress", DataType::SubIssuesProgress);
        let value = synthesize_value(&f, None);
        assert_eq!(
            value.kind,
            ValueKind::Missing {
                field_name: "Progress".into()
            }
        );

        let status = field("f2", "Status", DataType::SingleSelect);
        let content = ItemContent::default();
        assert_eq!(synthesize_value(&status, Some(&content)).type_name(), "missing");
    }

    #[test]
    fn item_has_one_value_per_field_in_order() {
        let fields = vec![
            field("a", "Title", DataType::Title),
            field("b", "Status", DataType::SingleSelect),
            field("c", "Progress", DataType::SubIssuesProgress),
        ];
        let node = json!({
            "id": "PVTI_1",
            "content": { "__typename": "Issue", "title": "Do it", "number": 3 },
            "f0": { "__typename": shapes::TEXT, "text": "Do it" },
            "f1": null
        });
        let item = normalize_item(&node, &fields).unwrap();
        assert_eq!(item.field_values.len(), fields.len());
        for (value, field) in item.field_values.iter().zip(&fields) {
            assert_eq!(value.field_id, field.id);
        }
        assert_eq!(item.field_values[0].type_name(), "title");
        assert_eq!(item.field_values[1].type_name(), "missing");
        assert_eq!(item.field_values[2].type_name(), "missing");
        assert_eq!(item.content.as_ref().and_then(|c| c.number), Some(3));
    }

    #[test]
    fn item_without_id_is_skipped() {
        assert!(normalize_item(&json!({ "content": null }), &[]).is_none());
    }

    #[test]
    fn content_parses_pull_request_summary() {
        let content = parse_content(&json!({
            "__typename": "PullRequest", "id": "PR_1", "number": 4, "title": "Add", "merged": false,
            "repository": { "id": "R_1", "name": "api", "owner": { "login": "acme" } },
            "author": { "login": "octo" },
            "labels": { "nodes": [{ "id": "L1", "name": "feature" }] }
        }))
        .unwrap();
        assert_eq!(content.kind.as_deref(), Some("PullRequest"));
        assert_eq!(content.merged, Some(false));
        assert_eq!(
            content.repository.as_ref().and_then(|r| r.full_name()).as_deref(),
            Some("acme/api")
        );
        assert_eq!(content.labels.len(), 1);
        assert!(parse_content(&json!(null)).is_none());

        let pr = parse_content(&json!({ "__typename": "PullRequest", "prState": "MERGED" })).unwrap();
        assert_eq!(pr.state.as_deref(), Some("MERGED"));
        let issue = parse_content(&json!({ "__typename": "Issue", "issueState": "OPEN" })).unwrap();
        assert_eq!(issue.state.as_deref(), Some("OPEN"));
    }
}
