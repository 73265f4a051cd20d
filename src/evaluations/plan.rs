use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{ActionPlanItem, EvaluationId, PlanItemId, PlanStatus};

/// Editable plan row as submitted from and rendered into the report view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanRow {
    pub id: Option<PlanItemId>,
    pub behavior: Option<String>,
    pub description: Option<String>,
    pub target_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: PlanStatus,
    pub progress_pct: Option<u8>,
    pub evaluator_comments: Option<String>,
    pub follow_up_comments: Option<String>,
    pub follow_up_on: Option<NaiveDate>,
}

fn blank(value: &Option<String>) -> bool {
    value
        .as_deref()
        .map(|text| text.trim().is_empty())
        .unwrap_or(true)
}

/// Filter submitted rows down to the persistable plan items.
///
/// Rows missing a descriptor or the originating-behavior label are dropped
/// silently; the remaining rows keep their id when editing an existing item
/// or receive one from `next_id` when new.
pub fn collect_rows(
    evaluation_id: &EvaluationId,
    rows: Vec<PlanRow>,
    mut next_id: impl FnMut() -> PlanItemId,
) -> Vec<ActionPlanItem> {
    rows.into_iter()
        .filter(|row| !blank(&row.description) && !blank(&row.behavior))
        .map(|row| ActionPlanItem {
            id: row.id.unwrap_or_else(&mut next_id),
            evaluation_id: evaluation_id.clone(),
            description: row.description.unwrap_or_default(),
            behavior_label: row.behavior.unwrap_or_default(),
            target_date: row.target_date,
            status: row.status,
            progress_pct: row.progress_pct,
            evaluator_comments: row.evaluator_comments,
            follow_up_comments: row.follow_up_comments,
            follow_up_on: row.follow_up_on,
        })
        .collect()
}

/// Build the editable rows for the report view.
///
/// When no plan exists yet exactly one blank row is synthesized so the view
/// always has an entry point for authoring the first item.
pub fn display_rows(items: &[ActionPlanItem]) -> Vec<PlanRow> {
    if items.is_empty() {
        return vec![PlanRow::default()];
    }

    items
        .iter()
        .map(|item| PlanRow {
            id: Some(item.id.clone()),
            behavior: Some(item.behavior_label.clone()),
            description: Some(item.description.clone()),
            target_date: item.target_date,
            status: item.status,
            progress_pct: item.progress_pct,
            evaluator_comments: item.evaluator_comments.clone(),
            follow_up_comments: item.follow_up_comments.clone(),
            follow_up_on: item.follow_up_on,
        })
        .collect()
}
