use std::collections::HashMap;

use serde_json::Value;

use crate::model::field::FieldConfig;
use crate::model::item::ProjectSnapshot;
use crate::model::view::{ProjectView, ViewDetail, ViewField, ViewSort};
use crate::util::json::{decode, nodes_at, present, str_at};

pub fn parse_views(data: &Value) -> Vec<ProjectView> {
    let Some(node) = present(data, "node") else {
        return Vec::new();
    };
    nodes_at(node, "views").iter().filter_map(decode).collect()
}

fn view_field(v: &Value) -> Option<ViewField> {
    Some(ViewField {
        id: str_at(v, "id")?,
        name: str_at(v, "name").unwrap_or_default(),
    })
}

fn view_fields(view: &Value, key: &str) -> Vec<ViewField> {
    nodes_at(view, key).iter().filter_map(view_field).collect()
}

/// `None` when the project or the view does not exist.
pub fn parse_view_detail(data: &Value) -> Option<ViewDetail> {
    let view = present(data, "node").and_then(|n| present(n, "view"))?;
    let sort_by = nodes_at(view, "sortByFields")
        .iter()
        .filter_map(|s| {
            let field = view_field(present(s, "field")?)?;
            Some(ViewSort {
                field_id: field.id,
                field_name: field.name,
                direction: str_at(s, "direction").unwrap_or_else(|| "ASC".into()),
            })
        })
        .collect();

    Some(ViewDetail {
        view: decode(view)?,
        fields: view_fields(view, "fields"),
        group_by_fields: view_fields(view, "groupByFields"),
        vertical_group_by_fields: view_fields(view, "verticalGroupByFields"),
        sort_by,
    })
}

/// Narrows and reorders the advertised fields to the view's field list.
///
/// Items keep every value; `all_fields` keeps the unfiltered list. A view
/// naming no known field leaves the field list as is.
pub fn apply_view(mut snapshot: ProjectSnapshot, view: ViewDetail) -> ProjectSnapshot {
    let all_fields = snapshot
        .all_fields
        .take()
        .unwrap_or_else(|| snapshot.fields.clone());

    let by_id: HashMap<&str, &FieldConfig> =
        all_fields.iter().map(|f| (f.id.as_str(), f)).collect();
    let mut visible: Vec<FieldConfig> = Vec::new();
    for view_field in &view.fields {
        if let Some(field) = by_id.get(view_field.id.as_str()) {
            if !visible.iter().any(|f| f.id == field.id) {
                visible.push((*field).clone());
            }
        }
    }

    snapshot.fields = if visible.is_empty() {
        all_fields.clone()
    } else {
        visible
    };
    snapshot.all_fields = Some(all_fields);
    snapshot.details = Some(view);
    snapshot
}
