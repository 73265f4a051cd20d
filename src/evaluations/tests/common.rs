use std::sync::Arc;

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::evaluations::domain::{
    ActionPlanItem, Behavior, BehaviorId, Competency, CompetencyId, EmployeeId, EmployeeRecord,
    Evaluation, EvaluationDetail, EvaluationId, EvaluationLevel, LevelId,
};
use crate::evaluations::form::ScoringForm;
use crate::evaluations::identity::PrincipalClaims;
use crate::evaluations::memory::{MemoryRepository, DEMO_EVALUATOR_EMAIL};
use crate::evaluations::notify::{
    ActivationNotifier, ActivationRequest, NotifyError, RecordingNotifier,
};
use crate::evaluations::repository::{EvaluationRepository, RepositoryError};
use crate::evaluations::service::EvaluationService;

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn level(id: &str, name: &str, code: &str) -> EvaluationLevel {
    EvaluationLevel {
        id: LevelId(id.to_string()),
        name: name.to_string(),
        code: code.to_string(),
        description: None,
        active: true,
    }
}

pub(super) fn competency(id: &str, name: &str, order: u32) -> Competency {
    Competency {
        id: CompetencyId(id.to_string()),
        name: name.to_string(),
        description: None,
        order,
        active: true,
    }
}

pub(super) fn behavior(id: &str, competency_id: &str, level_id: &str, order: u32) -> Behavior {
    Behavior {
        id: BehaviorId(id.to_string()),
        competency_id: CompetencyId(competency_id.to_string()),
        level_id: LevelId(level_id.to_string()),
        description: format!("Behavior {id}"),
        order,
        active: true,
    }
}

pub(super) fn employee(id: &str, name: &str, form_type: Option<u32>) -> EmployeeRecord {
    EmployeeRecord {
        id: EmployeeId(id.to_string()),
        full_name: name.to_string(),
        document_id: "555000111".to_string(),
        position: Some("Analyst".to_string()),
        division: Some("Operations".to_string()),
        region: None,
        hired_on: Some(date(2023, 2, 1)),
        contract_start: Some(date(2023, 2, 1)),
        contract_end: None,
        probation_end: None,
        email: Some(format!("{id}@example.com")),
        evaluator: None,
        form_type,
        super_administrator: false,
        notes: None,
    }
}

pub(super) fn detail(evaluation_id: &str, behavior_id: &str, score: u8) -> EvaluationDetail {
    EvaluationDetail {
        id: crate::evaluations::domain::DetailId(format!("det-{behavior_id}")),
        evaluation_id: EvaluationId(evaluation_id.to_string()),
        behavior_id: BehaviorId(behavior_id.to_string()),
        score,
        comment: None,
    }
}

pub(super) fn evaluator_claims() -> PrincipalClaims {
    PrincipalClaims::new().with_claim("preferred_username", DEMO_EVALUATOR_EMAIL)
}

pub(super) fn build_service() -> (
    Arc<EvaluationService<MemoryRepository, RecordingNotifier>>,
    Arc<MemoryRepository>,
    Arc<RecordingNotifier>,
) {
    let repository = Arc::new(MemoryRepository::seeded());
    let notifier = Arc::new(RecordingNotifier::default());
    let service = Arc::new(EvaluationService::new(repository.clone(), notifier.clone()));
    (service, repository, notifier)
}

pub(super) fn evaluator(
    service: &EvaluationService<MemoryRepository, RecordingNotifier>,
) -> EmployeeRecord {
    service
        .current_evaluator(&evaluator_claims())
        .expect("seeded evaluator resolves")
}

/// Score every slot of the form, cycling through `scores`.
pub(super) fn fill_scores(form: &mut ScoringForm, scores: &[u8]) {
    let mut index = 0usize;
    for section in &mut form.competencies {
        for slot in &mut section.behaviors {
            slot.score = Some(scores[index % scores.len()]);
            index += 1;
        }
    }
}

/// Repository stub whose every operation reports the backend as offline.
pub(super) struct UnavailableRepository;

fn offline<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("store offline".to_string()))
}

impl EvaluationRepository for UnavailableRepository {
    fn employee_by_email(&self, _email: &str) -> Result<Option<EmployeeRecord>, RepositoryError> {
        offline()
    }

    fn employee_by_id(&self, _id: &EmployeeId) -> Result<Option<EmployeeRecord>, RepositoryError> {
        offline()
    }

    fn employees(&self) -> Result<Vec<EmployeeRecord>, RepositoryError> {
        offline()
    }

    fn employees_by_evaluator(
        &self,
        _evaluator: &str,
    ) -> Result<Vec<EmployeeRecord>, RepositoryError> {
        offline()
    }

    fn update_employee_notes(
        &self,
        _id: &EmployeeId,
        _notes: Option<String>,
    ) -> Result<(), RepositoryError> {
        offline()
    }

    fn active_levels(&self) -> Result<Vec<EvaluationLevel>, RepositoryError> {
        offline()
    }

    fn level_by_id(&self, _id: &LevelId) -> Result<Option<EvaluationLevel>, RepositoryError> {
        offline()
    }

    fn competencies(&self) -> Result<Vec<Competency>, RepositoryError> {
        offline()
    }

    fn behaviors_by_level(&self, _level_id: &LevelId) -> Result<Vec<Behavior>, RepositoryError> {
        offline()
    }

    fn evaluations_by_evaluator(
        &self,
        _evaluator: &str,
    ) -> Result<Vec<Evaluation>, RepositoryError> {
        offline()
    }

    fn evaluations_by_employee(
        &self,
        _employee_id: &EmployeeId,
    ) -> Result<Vec<Evaluation>, RepositoryError> {
        offline()
    }

    fn evaluation_by_id(&self, _id: &EvaluationId) -> Result<Option<Evaluation>, RepositoryError> {
        offline()
    }

    fn create_evaluation(
        &self,
        _evaluation: Evaluation,
        _details: Vec<EvaluationDetail>,
        _plan: Vec<ActionPlanItem>,
    ) -> Result<EvaluationId, RepositoryError> {
        offline()
    }

    fn update_evaluation(
        &self,
        _evaluation: Evaluation,
        _details: Vec<EvaluationDetail>,
        _plan: Vec<ActionPlanItem>,
    ) -> Result<(), RepositoryError> {
        offline()
    }

    fn details_by_evaluation(
        &self,
        _evaluation_id: &EvaluationId,
    ) -> Result<Vec<EvaluationDetail>, RepositoryError> {
        offline()
    }

    fn plan_by_evaluation(
        &self,
        _evaluation_id: &EvaluationId,
    ) -> Result<Vec<ActionPlanItem>, RepositoryError> {
        offline()
    }
}

/// Notifier stub whose upstream endpoint always answers 502.
pub(super) struct RejectingNotifier;

pub(super) const REJECTION_BODY: &str = "automation flow offline";

impl ActivationNotifier for RejectingNotifier {
    fn send(&self, _request: ActivationRequest) -> Result<(), NotifyError> {
        Err(NotifyError::Rejected {
            status: 502,
            body: REJECTION_BODY.to_string(),
        })
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
