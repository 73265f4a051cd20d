use super::common::*;

use crate::evaluations::domain::{
    Evaluation, EvaluationId, EvaluationKind, EvaluationState,
};
use crate::evaluations::form::assemble;

#[test]
fn new_form_orders_sections_and_slots_by_catalog_order() {
    let record = employee("emp-1", "Jordan Vega", None);
    let lvl = level("lvl-1", "Operational", "OPE");
    let competencies = vec![
        competency("cmp-b", "Second", 2),
        competency("cmp-a", "First", 1),
    ];
    let behaviors = vec![
        behavior("bhv-a2", "cmp-a", "lvl-1", 2),
        behavior("bhv-a1", "cmp-a", "lvl-1", 1),
        behavior("bhv-b1", "cmp-b", "lvl-1", 1),
    ];

    let form = assemble(
        &record,
        &lvl,
        &competencies,
        &behaviors,
        None,
        None,
        date(2024, 1, 15),
    );

    assert_eq!(form.id, None);
    assert_eq!(form.kind, EvaluationKind::Initial);
    assert_eq!(form.evaluated_on, date(2024, 1, 15));
    assert_eq!(form.competencies.len(), 2);
    assert_eq!(form.competencies[0].name, "First");
    assert_eq!(form.competencies[0].behaviors[0].behavior_id.0, "bhv-a1");
    assert_eq!(form.competencies[0].behaviors[1].behavior_id.0, "bhv-a2");
    assert_eq!(form.competencies[1].name, "Second");
    assert!(form
        .competencies
        .iter()
        .flat_map(|section| &section.behaviors)
        .all(|slot| slot.score.is_none()));
}

#[test]
fn competency_with_no_behaviors_at_level_is_omitted() {
    let record = employee("emp-1", "Jordan Vega", None);
    let lvl = level("lvl-1", "Operational", "OPE");
    let competencies = vec![
        competency("cmp-a", "Present", 1),
        competency("cmp-b", "Absent", 2),
    ];
    let behaviors = vec![behavior("bhv-a1", "cmp-a", "lvl-1", 1)];

    let form = assemble(
        &record,
        &lvl,
        &competencies,
        &behaviors,
        None,
        None,
        date(2024, 1, 15),
    );

    assert_eq!(form.competencies.len(), 1);
    assert_eq!(form.competencies[0].name, "Present");
}

#[test]
fn origin_reference_makes_the_form_a_follow_up() {
    let record = employee("emp-1", "Jordan Vega", None);
    let lvl = level("lvl-1", "Operational", "OPE");
    let competencies = vec![competency("cmp-a", "First", 1)];
    let behaviors = vec![behavior("bhv-a1", "cmp-a", "lvl-1", 1)];

    let form = assemble(
        &record,
        &lvl,
        &competencies,
        &behaviors,
        None,
        Some(EvaluationId("eval-000001".to_string())),
        date(2024, 7, 15),
    );

    assert_eq!(form.kind, EvaluationKind::FollowUp);
    assert_eq!(form.origin_id, Some(EvaluationId("eval-000001".to_string())));
}

#[test]
fn edit_form_prefills_stored_scores_and_header() {
    let record = employee("emp-1", "Jordan Vega", None);
    let lvl = level("lvl-1", "Operational", "OPE");
    let competencies = vec![competency("cmp-a", "First", 1)];
    let behaviors = vec![
        behavior("bhv-a1", "cmp-a", "lvl-1", 1),
        behavior("bhv-a2", "cmp-a", "lvl-1", 2),
    ];

    let evaluation = Evaluation {
        id: EvaluationId("eval-7".to_string()),
        employee_id: record.id.clone(),
        level_id: lvl.id.clone(),
        evaluated_on: date(2024, 3, 1),
        kind: EvaluationKind::Initial,
        state: EvaluationState::Draft,
        overall_score: Some(82.0),
        observations: Some("steady progress".to_string()),
        next_evaluation_on: Some(date(2024, 9, 1)),
        origin_id: None,
        evaluator_email: Some("pat.reyes@example.com".to_string()),
    };
    let mut stored = detail("eval-7", "bhv-a2", 82);
    stored.comment = Some("good under pressure".to_string());
    let details = vec![stored];

    let form = assemble(
        &record,
        &lvl,
        &competencies,
        &behaviors,
        Some((&evaluation, &details)),
        None,
        date(2024, 6, 30),
    );

    assert_eq!(form.id, Some(EvaluationId("eval-7".to_string())));
    // Header keeps the stored date, not today's.
    assert_eq!(form.evaluated_on, date(2024, 3, 1));
    assert_eq!(form.observations.as_deref(), Some("steady progress"));

    let slots = &form.competencies[0].behaviors;
    assert_eq!(slots[0].score, None);
    assert_eq!(slots[1].score, Some(82));
    assert_eq!(slots[1].comment.as_deref(), Some("good under pressure"));
}
