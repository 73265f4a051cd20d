use super::common::*;

use crate::evaluations::domain::{EvaluationId, PlanItemId, PlanStatus};
use crate::evaluations::plan::{collect_rows, display_rows, PlanRow};

fn row(behavior: Option<&str>, description: Option<&str>) -> PlanRow {
    PlanRow {
        behavior: behavior.map(str::to_string),
        description: description.map(str::to_string),
        ..PlanRow::default()
    }
}

fn next_id_from(counter: &mut u32) -> PlanItemId {
    *counter += 1;
    PlanItemId(format!("plan-test-{counter}"))
}

#[test]
fn blank_rows_are_dropped_on_collect() {
    let evaluation_id = EvaluationId("eval-1".to_string());
    let rows = vec![
        row(Some("Behavior one"), Some("Pair with a mentor")),
        row(Some("Behavior two"), Some("   ")),
        row(None, Some("Orphan description")),
        row(Some("Behavior three"), Some("Shadow the shift lead")),
    ];

    let mut counter = 0;
    let items = collect_rows(&evaluation_id, rows, || next_id_from(&mut counter));

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].description, "Pair with a mentor");
    assert_eq!(items[1].description, "Shadow the shift lead");
    assert!(items
        .iter()
        .all(|item| item.evaluation_id == evaluation_id));
}

#[test]
fn existing_rows_keep_their_ids_and_new_rows_get_one() {
    let evaluation_id = EvaluationId("eval-1".to_string());
    let mut kept = row(Some("Behavior one"), Some("Keep doing this"));
    kept.id = Some(PlanItemId("plan-existing".to_string()));
    kept.status = PlanStatus::InProgress;
    kept.progress_pct = Some(40);
    let fresh = row(Some("Behavior two"), Some("Start doing that"));

    let mut counter = 0;
    let items = collect_rows(&evaluation_id, vec![kept, fresh], || {
        next_id_from(&mut counter)
    });

    assert_eq!(items[0].id.0, "plan-existing");
    assert_eq!(items[0].status, PlanStatus::InProgress);
    assert_eq!(items[0].progress_pct, Some(40));
    assert_eq!(items[1].id.0, "plan-test-1");
    assert_eq!(items[1].status, PlanStatus::Pending);
}

#[test]
fn empty_plan_displays_one_blank_row() {
    let rows = display_rows(&[]);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0], PlanRow::default());
}

#[test]
fn stored_items_display_without_synthesized_rows() {
    let evaluation_id = EvaluationId("eval-1".to_string());
    let mut counter = 0;
    let items = collect_rows(
        &evaluation_id,
        vec![
            row(Some("Behavior one"), Some("Pair with a mentor")),
            row(Some("Behavior two"), Some("Shadow the shift lead")),
        ],
        || next_id_from(&mut counter),
    );

    let rows = display_rows(&items);

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].description.as_deref(), Some("Pair with a mentor"));
    assert_eq!(rows[0].id.as_ref().map(|id| id.0.as_str()), Some("plan-test-1"));
}

#[test]
fn plan_row_status_defaults_to_pending_when_absent_from_payload() {
    let parsed: PlanRow = serde_json::from_str(
        r#"{"behavior": "Behavior one", "description": "Pair with a mentor"}"#,
    )
    .expect("row parses without a status field");

    assert_eq!(parsed.status, PlanStatus::Pending);
    assert_eq!(parsed.target_date, None);
}

#[test]
fn collect_then_display_round_trips_dates() {
    let evaluation_id = EvaluationId("eval-1".to_string());
    let mut planned = row(Some("Behavior one"), Some("Pair with a mentor"));
    planned.target_date = Some(date(2024, 10, 1));
    planned.follow_up_on = Some(date(2024, 11, 1));

    let mut counter = 0;
    let items = collect_rows(&evaluation_id, vec![planned], || next_id_from(&mut counter));
    let rows = display_rows(&items);

    assert_eq!(rows[0].target_date, Some(date(2024, 10, 1)));
    assert_eq!(rows[0].follow_up_on, Some(date(2024, 11, 1)));
}
