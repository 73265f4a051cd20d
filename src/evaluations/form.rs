use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{
    Behavior, BehaviorId, Competency, EmployeeId, EmployeeRecord, Evaluation, EvaluationDetail,
    EvaluationKind, EvaluationLevel, EvaluationId, LevelId,
};

/// Editable scoring form for one (employee, level) pair.
///
/// `id` is present in edit mode; `origin_id` marks the form as a follow-up
/// chained to an earlier evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringForm {
    pub id: Option<EvaluationId>,
    pub employee_id: EmployeeId,
    pub level_id: LevelId,
    pub employee_name: String,
    pub document_id: String,
    pub position: Option<String>,
    pub division: Option<String>,
    pub level_name: String,
    pub evaluated_on: NaiveDate,
    pub kind: EvaluationKind,
    pub origin_id: Option<EvaluationId>,
    pub observations: Option<String>,
    pub competencies: Vec<CompetencySection>,
}

/// One competency block of the form, in catalog order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetencySection {
    pub name: String,
    pub behaviors: Vec<BehaviorSlot>,
}

/// One scorable row of the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorSlot {
    pub behavior_id: BehaviorId,
    pub description: String,
    pub score: Option<u8>,
    pub comment: Option<String>,
}

/// Assemble the nested competency/behavior structure for a scoring form.
///
/// Competencies come out in catalog `order`, behaviors in behavior `order`
/// within their competency; competencies with no behavior at this level are
/// omitted entirely. When `existing` is given the slots are pre-filled from
/// the stored detail scores and the form header carries the stored date,
/// kind, chain reference, and observations.
pub fn assemble(
    employee: &EmployeeRecord,
    level: &EvaluationLevel,
    competencies: &[Competency],
    behaviors: &[Behavior],
    existing: Option<(&Evaluation, &[EvaluationDetail])>,
    origin_id: Option<EvaluationId>,
    today: NaiveDate,
) -> ScoringForm {
    let mut ordered: Vec<&Competency> = competencies.iter().collect();
    ordered.sort_by_key(|competency| competency.order);

    let mut sections = Vec::new();
    for competency in ordered {
        let mut grouped: Vec<&Behavior> = behaviors
            .iter()
            .filter(|behavior| behavior.competency_id == competency.id)
            .collect();
        grouped.sort_by_key(|behavior| behavior.order);

        if grouped.is_empty() {
            continue;
        }

        let slots = grouped
            .into_iter()
            .map(|behavior| {
                let stored = existing.and_then(|(_, details)| {
                    details
                        .iter()
                        .find(|detail| detail.behavior_id == behavior.id)
                });
                BehaviorSlot {
                    behavior_id: behavior.id.clone(),
                    description: behavior.description.clone(),
                    score: stored.map(|detail| detail.score),
                    comment: stored.and_then(|detail| detail.comment.clone()),
                }
            })
            .collect();

        sections.push(CompetencySection {
            name: competency.name.clone(),
            behaviors: slots,
        });
    }

    match existing {
        Some((evaluation, _)) => ScoringForm {
            id: Some(evaluation.id.clone()),
            employee_id: employee.id.clone(),
            level_id: level.id.clone(),
            employee_name: employee.full_name.clone(),
            document_id: employee.document_id.clone(),
            position: employee.position.clone(),
            division: employee.division.clone(),
            level_name: level.name.clone(),
            evaluated_on: evaluation.evaluated_on,
            kind: evaluation.kind,
            origin_id: evaluation.origin_id.clone(),
            observations: evaluation.observations.clone(),
            competencies: sections,
        },
        None => ScoringForm {
            id: None,
            employee_id: employee.id.clone(),
            level_id: level.id.clone(),
            employee_name: employee.full_name.clone(),
            document_id: employee.document_id.clone(),
            position: employee.position.clone(),
            division: employee.division.clone(),
            level_name: level.name.clone(),
            evaluated_on: today,
            kind: if origin_id.is_some() {
                EvaluationKind::FollowUp
            } else {
                EvaluationKind::Initial
            },
            origin_id,
            observations: None,
            competencies: sections,
        },
    }
}
