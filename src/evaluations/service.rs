use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::catalog;
use super::domain::{
    EmployeeId, EmployeeRecord, Evaluation, EvaluationDetail, EvaluationId, EvaluationKind,
    EvaluationLevel, EvaluationState, DetailId, LevelId, PlanItemId,
};
use super::form::{self, ScoringForm};
use super::identity::PrincipalClaims;
use super::notify::{ActivationNotifier, ActivationRequest, NotifyError};
use super::plan::{self, PlanRow};
use super::repository::{EvaluationRepository, RepositoryError};
use super::scoring::{self, CompetencyResult, ImprovementOpportunity};

static EVALUATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static DETAIL_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static PLAN_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_evaluation_id() -> EvaluationId {
    let id = EVALUATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    EvaluationId(format!("eval-{id:06}"))
}

fn next_detail_id() -> DetailId {
    let id = DETAIL_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    DetailId(format!("det-{id:06}"))
}

fn next_plan_item_id() -> PlanItemId {
    let id = PLAN_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    PlanItemId(format!("plan-{id:06}"))
}

/// Months between an initial evaluation and its scheduled follow-up.
const FOLLOW_UP_INTERVAL_MONTHS: u32 = 6;

/// Caller intent when submitting a scoring form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveAction {
    Draft,
    Finalize,
}

/// Outcome of the automatic level resolution for a new evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "resolution")]
pub enum LevelAssignment {
    /// The employee's form-type code selected a level; go straight to the form.
    Auto { level: EvaluationLevel },
    /// No automatic level; the caller must pick from the active catalog.
    Manual { levels: Vec<EvaluationLevel> },
}

/// Parameters needed to open a follow-up form chained to an existing
/// evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowUpTarget {
    pub employee_id: EmployeeId,
    pub level_id: LevelId,
    pub origin_id: EvaluationId,
}

/// One row of an evaluation listing (evaluator dashboard or employee folder).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationListRow {
    pub id: EvaluationId,
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub document_id: String,
    pub level_name: String,
    pub level_code: String,
    pub evaluated_on: NaiveDate,
    pub next_evaluation_on: Option<NaiveDate>,
    pub kind: EvaluationKind,
    pub state: EvaluationState,
    pub overall_score: Option<f64>,
    pub can_follow_up: bool,
}

/// Evaluation history of one employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeFolder {
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub document_id: String,
    pub position: Option<String>,
    pub evaluations: Vec<EvaluationListRow>,
}

/// Aggregated report for one evaluation, including the editable plan rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub evaluation_id: EvaluationId,
    pub employee_name: String,
    pub document_id: String,
    pub position: Option<String>,
    pub division: Option<String>,
    pub level_name: String,
    pub evaluated_on: NaiveDate,
    pub kind: EvaluationKind,
    pub state: EvaluationState,
    pub overall_average: Option<f64>,
    pub competencies: Vec<CompetencyResult>,
    pub improvement_opportunities: Vec<ImprovementOpportunity>,
    pub plan: Vec<PlanRow>,
    pub observations: Option<String>,
    pub next_evaluation_on: Option<NaiveDate>,
}

/// Error raised by the evaluation service.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationServiceError {
    #[error("signed-in principal is not a registered evaluator")]
    Forbidden,
    #[error("referenced record not found")]
    NotFound,
    #[error("submitted form failed validation: {}", reasons.join("; "))]
    InvalidForm {
        form: Box<ScoringForm>,
        reasons: Vec<String>,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
}

/// Service composing the catalog, scoring rules, and repository into the
/// evaluation lifecycle. Stateless and request-scoped: every operation is a
/// bounded sequence of reads followed by at most one all-or-nothing write.
pub struct EvaluationService<R, N> {
    repository: Arc<R>,
    notifier: Arc<N>,
}

impl<R, N> EvaluationService<R, N>
where
    R: EvaluationRepository + 'static,
    N: ActivationNotifier + 'static,
{
    pub fn new(repository: Arc<R>, notifier: Arc<N>) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    /// Resolve the signed-in principal to a registered evaluator record.
    /// Every entry point starts here; a principal without a matching record
    /// is refused outright.
    pub fn current_evaluator(
        &self,
        claims: &PrincipalClaims,
    ) -> Result<EmployeeRecord, EvaluationServiceError> {
        let email = claims.email().ok_or(EvaluationServiceError::Forbidden)?;
        self.repository
            .employee_by_email(email)?
            .ok_or(EvaluationServiceError::Forbidden)
    }

    // Evaluator references on employees and evaluations are free text holding
    // the evaluator's email (the upstream HR column is not a relational id).
    fn evaluator_correlation(&self, evaluator: &EmployeeRecord) -> String {
        evaluator
            .email
            .clone()
            .unwrap_or_else(|| evaluator.full_name.clone())
    }

    /// Employees assigned to this evaluator, optionally filtered by a
    /// document-id substring.
    pub fn employees_for(
        &self,
        evaluator: &EmployeeRecord,
        document_filter: Option<&str>,
    ) -> Result<Vec<EmployeeRecord>, EvaluationServiceError> {
        let correlation = self.evaluator_correlation(evaluator);
        let mut employees = self.repository.employees_by_evaluator(&correlation)?;

        if let Some(filter) = document_filter.map(str::trim).filter(|f| !f.is_empty()) {
            let needle = filter.to_ascii_lowercase();
            employees.retain(|employee| {
                employee
                    .document_id
                    .to_ascii_lowercase()
                    .contains(&needle)
            });
        }

        Ok(employees)
    }

    /// All employees, super-administrators only.
    pub fn all_employees(
        &self,
        evaluator: &EmployeeRecord,
    ) -> Result<Vec<EmployeeRecord>, EvaluationServiceError> {
        if !evaluator.super_administrator {
            return Err(EvaluationServiceError::Forbidden);
        }
        Ok(self.repository.employees()?)
    }

    /// Update an employee's free-text notes, super-administrators only.
    pub fn update_notes(
        &self,
        evaluator: &EmployeeRecord,
        employee_id: &EmployeeId,
        notes: Option<String>,
    ) -> Result<(), EvaluationServiceError> {
        if !evaluator.super_administrator {
            return Err(EvaluationServiceError::Forbidden);
        }
        match self.repository.update_employee_notes(employee_id, notes) {
            Ok(()) => Ok(()),
            Err(RepositoryError::NotFound) => Err(EvaluationServiceError::NotFound),
            Err(other) => Err(other.into()),
        }
    }

    /// Resolve which level a new evaluation of this employee should use:
    /// either the level auto-assigned by the form-type code, or the active
    /// catalog for manual selection.
    pub fn level_assignment(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<LevelAssignment, EvaluationServiceError> {
        let employee = self
            .repository
            .employee_by_id(employee_id)?
            .ok_or(EvaluationServiceError::NotFound)?;
        let levels = self.repository.active_levels()?;

        match catalog::auto_assign_level(&employee, &levels) {
            Some(level) => Ok(LevelAssignment::Auto {
                level: level.clone(),
            }),
            None => Ok(LevelAssignment::Manual { levels }),
        }
    }

    /// Assemble a blank form for (employee, level); `origin_id` chains it to
    /// an earlier evaluation as a follow-up.
    pub fn new_form(
        &self,
        employee_id: &EmployeeId,
        level_id: &LevelId,
        origin_id: Option<EvaluationId>,
        today: NaiveDate,
    ) -> Result<ScoringForm, EvaluationServiceError> {
        let employee = self
            .repository
            .employee_by_id(employee_id)?
            .ok_or(EvaluationServiceError::NotFound)?;
        let level = self
            .repository
            .level_by_id(level_id)?
            .ok_or(EvaluationServiceError::NotFound)?;

        let competencies = self.repository.competencies()?;
        let behaviors = self.repository.behaviors_by_level(level_id)?;

        Ok(form::assemble(
            &employee,
            &level,
            &competencies,
            &behaviors,
            None,
            origin_id,
            today,
        ))
    }

    /// Assemble the form for an existing evaluation, pre-filled with its
    /// stored detail scores. The action plan is deliberately not loaded
    /// here; it is edited only through the report flow.
    pub fn edit_form(
        &self,
        evaluation_id: &EvaluationId,
    ) -> Result<ScoringForm, EvaluationServiceError> {
        let evaluation = self
            .repository
            .evaluation_by_id(evaluation_id)?
            .ok_or(EvaluationServiceError::NotFound)?;
        let employee = self
            .repository
            .employee_by_id(&evaluation.employee_id)?
            .ok_or(EvaluationServiceError::NotFound)?;
        let level = self
            .repository
            .level_by_id(&evaluation.level_id)?
            .ok_or(EvaluationServiceError::NotFound)?;

        let details = self.repository.details_by_evaluation(evaluation_id)?;
        let competencies = self.repository.competencies()?;
        let behaviors = self.repository.behaviors_by_level(&evaluation.level_id)?;

        Ok(form::assemble(
            &employee,
            &level,
            &competencies,
            &behaviors,
            Some((&evaluation, &details)),
            None,
            evaluation.evaluated_on,
        ))
    }

    fn validate(form: &ScoringForm) -> Vec<String> {
        let mut reasons = Vec::new();

        if form.kind == EvaluationKind::FollowUp && form.origin_id.is_none() {
            reasons.push("follow-up evaluation must reference its origin".to_string());
        }
        if form.kind == EvaluationKind::Initial && form.origin_id.is_some() {
            reasons.push("initial evaluation must not reference an origin".to_string());
        }

        for section in &form.competencies {
            for slot in &section.behaviors {
                if let Some(score) = slot.score {
                    if score > 100 {
                        reasons.push(format!(
                            "score {} for behavior {} exceeds the 0-100 scale",
                            score, slot.behavior_id.0
                        ));
                    }
                }
            }
        }

        reasons
    }

    /// Persist a submitted scoring form, creating or updating the
    /// evaluation together with its detail scores as one unit.
    ///
    /// Detail rows are rebuilt from the scored slots with fresh ids; an
    /// update replaces the previous detail set wholesale. The action plan is
    /// never written from the form: a new evaluation starts with an empty
    /// plan, and an edit re-saves the plan items already stored. The overall
    /// score is the two-stage competency-then-overall mean, the same formula
    /// the report shows.
    pub fn save(
        &self,
        evaluator: &EmployeeRecord,
        form: ScoringForm,
        action: SaveAction,
    ) -> Result<EvaluationId, EvaluationServiceError> {
        self.repository
            .employee_by_id(&form.employee_id)?
            .ok_or(EvaluationServiceError::NotFound)?;
        self.repository
            .level_by_id(&form.level_id)?
            .ok_or(EvaluationServiceError::NotFound)?;

        let reasons = Self::validate(&form);
        if !reasons.is_empty() {
            return Err(EvaluationServiceError::InvalidForm {
                form: Box::new(form),
                reasons,
            });
        }

        let evaluation_id = form.id.clone().unwrap_or_else(next_evaluation_id);

        let mut details = Vec::new();
        for section in &form.competencies {
            for slot in &section.behaviors {
                if let Some(score) = slot.score {
                    details.push(EvaluationDetail {
                        id: next_detail_id(),
                        evaluation_id: evaluation_id.clone(),
                        behavior_id: slot.behavior_id.clone(),
                        score,
                        comment: slot.comment.clone(),
                    });
                }
            }
        }

        let competencies = self.repository.competencies()?;
        let behaviors = self.repository.behaviors_by_level(&form.level_id)?;
        let overall_score =
            scoring::aggregate(&details, &competencies, &behaviors).overall_average;

        let evaluation = Evaluation {
            id: evaluation_id.clone(),
            employee_id: form.employee_id.clone(),
            level_id: form.level_id.clone(),
            evaluated_on: form.evaluated_on,
            kind: form.kind,
            state: match action {
                SaveAction::Finalize => EvaluationState::Finalized,
                SaveAction::Draft => EvaluationState::Draft,
            },
            overall_score,
            observations: form.observations.clone(),
            next_evaluation_on: match form.kind {
                EvaluationKind::Initial => form
                    .evaluated_on
                    .checked_add_months(Months::new(FOLLOW_UP_INTERVAL_MONTHS)),
                EvaluationKind::FollowUp => None,
            },
            origin_id: form.origin_id.clone(),
            evaluator_email: evaluator.email.clone(),
        };

        if form.id.is_none() {
            let id = self.repository.create_evaluation(evaluation, details, Vec::new())?;
            tracing::info!(evaluation = %id.0, "evaluation created");
            Ok(id)
        } else {
            let existing_plan = self.repository.plan_by_evaluation(&evaluation_id)?;
            match self
                .repository
                .update_evaluation(evaluation, details, existing_plan)
            {
                Ok(()) => {
                    tracing::info!(evaluation = %evaluation_id.0, "evaluation updated");
                    Ok(evaluation_id)
                }
                Err(RepositoryError::NotFound) => Err(EvaluationServiceError::NotFound),
                Err(other) => Err(other.into()),
            }
        }
    }

    /// Resolve the parameters for a follow-up chained to `evaluation_id`.
    /// Does not create anything.
    pub fn resolve_follow_up(
        &self,
        evaluation_id: &EvaluationId,
    ) -> Result<FollowUpTarget, EvaluationServiceError> {
        let origin = self
            .repository
            .evaluation_by_id(evaluation_id)?
            .ok_or(EvaluationServiceError::NotFound)?;

        Ok(FollowUpTarget {
            employee_id: origin.employee_id,
            level_id: origin.level_id,
            origin_id: origin.id,
        })
    }

    /// Replace the action plan and next-evaluation date of an existing
    /// evaluation, re-saving its stored detail scores unchanged so the plan
    /// edit cannot destroy them.
    pub fn save_action_plan(
        &self,
        evaluation_id: &EvaluationId,
        rows: Vec<PlanRow>,
        next_evaluation_on: Option<NaiveDate>,
    ) -> Result<(), EvaluationServiceError> {
        let mut evaluation = self
            .repository
            .evaluation_by_id(evaluation_id)?
            .ok_or(EvaluationServiceError::NotFound)?;
        let details = self.repository.details_by_evaluation(evaluation_id)?;

        let plan = plan::collect_rows(evaluation_id, rows, next_plan_item_id);
        evaluation.next_evaluation_on = next_evaluation_on;

        match self.repository.update_evaluation(evaluation, details, plan) {
            Ok(()) => Ok(()),
            Err(RepositoryError::NotFound) => Err(EvaluationServiceError::NotFound),
            Err(other) => Err(other.into()),
        }
    }

    /// Build the aggregated report for one evaluation, including the
    /// editable plan rows (with the synthesized blank row when empty).
    pub fn report(
        &self,
        evaluation_id: &EvaluationId,
    ) -> Result<EvaluationReport, EvaluationServiceError> {
        let evaluation = self
            .repository
            .evaluation_by_id(evaluation_id)?
            .ok_or(EvaluationServiceError::NotFound)?;
        let employee = self
            .repository
            .employee_by_id(&evaluation.employee_id)?
            .ok_or(EvaluationServiceError::NotFound)?;
        let level = self
            .repository
            .level_by_id(&evaluation.level_id)?
            .ok_or(EvaluationServiceError::NotFound)?;

        let details = self.repository.details_by_evaluation(evaluation_id)?;
        let plan_items = self.repository.plan_by_evaluation(evaluation_id)?;
        let competencies = self.repository.competencies()?;
        let behaviors = self.repository.behaviors_by_level(&evaluation.level_id)?;

        let summary = scoring::aggregate(&details, &competencies, &behaviors);

        Ok(EvaluationReport {
            evaluation_id: evaluation.id.clone(),
            employee_name: employee.full_name,
            document_id: employee.document_id,
            position: employee.position,
            division: employee.division,
            level_name: level.name,
            evaluated_on: evaluation.evaluated_on,
            kind: evaluation.kind,
            state: evaluation.state,
            overall_average: summary.overall_average,
            competencies: summary.competencies,
            improvement_opportunities: summary.improvement_opportunities,
            plan: plan::display_rows(&plan_items),
            observations: evaluation.observations,
            next_evaluation_on: evaluation.next_evaluation_on,
        })
    }

    /// Evaluations recorded by this evaluator, newest first.
    pub fn evaluation_list(
        &self,
        evaluator: &EmployeeRecord,
    ) -> Result<Vec<EvaluationListRow>, EvaluationServiceError> {
        let correlation = self.evaluator_correlation(evaluator);
        let evaluations = self.repository.evaluations_by_evaluator(&correlation)?;
        self.list_rows(evaluations)
    }

    /// Folder view: the employee's full evaluation history, newest first.
    pub fn employee_folder(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<EmployeeFolder, EvaluationServiceError> {
        let employee = self
            .repository
            .employee_by_id(employee_id)?
            .ok_or(EvaluationServiceError::NotFound)?;
        let evaluations = self.repository.evaluations_by_employee(employee_id)?;
        let rows = self.list_rows(evaluations)?;

        Ok(EmployeeFolder {
            employee_id: employee.id,
            employee_name: employee.full_name,
            document_id: employee.document_id,
            position: employee.position,
            evaluations: rows,
        })
    }

    fn list_rows(
        &self,
        evaluations: Vec<Evaluation>,
    ) -> Result<Vec<EvaluationListRow>, EvaluationServiceError> {
        let mut employees: HashMap<EmployeeId, Option<EmployeeRecord>> = HashMap::new();
        let mut levels: HashMap<LevelId, Option<EvaluationLevel>> = HashMap::new();
        let mut rows = Vec::with_capacity(evaluations.len());

        for evaluation in evaluations {
            let employee = match employees.get(&evaluation.employee_id) {
                Some(cached) => cached.clone(),
                None => {
                    let fetched = self.repository.employee_by_id(&evaluation.employee_id)?;
                    employees.insert(evaluation.employee_id.clone(), fetched.clone());
                    fetched
                }
            };
            let level = match levels.get(&evaluation.level_id) {
                Some(cached) => cached.clone(),
                None => {
                    let fetched = self.repository.level_by_id(&evaluation.level_id)?;
                    levels.insert(evaluation.level_id.clone(), fetched.clone());
                    fetched
                }
            };

            // Catalog gaps get an empty placeholder here; this is display
            // data only and is never written back.
            let (employee_name, document_id) = employee
                .map(|record| (record.full_name, record.document_id))
                .unwrap_or_default();
            let (level_name, level_code) = level
                .map(|record| (record.name, record.code))
                .unwrap_or_default();

            rows.push(EvaluationListRow {
                id: evaluation.id,
                employee_id: evaluation.employee_id,
                employee_name,
                document_id,
                level_name,
                level_code,
                evaluated_on: evaluation.evaluated_on,
                next_evaluation_on: evaluation.next_evaluation_on,
                kind: evaluation.kind,
                state: evaluation.state,
                overall_score: evaluation.overall_score,
                can_follow_up: evaluation.kind == EvaluationKind::Initial,
            });
        }

        Ok(rows)
    }

    /// Fire the activation-request notification for one employee. The call
    /// is a side channel: it happens after any save and is never retried;
    /// upstream rejection is surfaced verbatim.
    pub fn request_activation(
        &self,
        evaluator: &EmployeeRecord,
        employee_id: &EmployeeId,
    ) -> Result<(), EvaluationServiceError> {
        let employee = self
            .repository
            .employee_by_id(employee_id)?
            .ok_or(EvaluationServiceError::NotFound)?;

        let request = ActivationRequest {
            employee_id: employee.id.clone(),
            employee_name: employee.full_name.clone(),
            document_id: employee.document_id.clone(),
            employee_email: employee.email.clone(),
            evaluator_name: evaluator.full_name.clone(),
            evaluator_email: evaluator.email.clone(),
            contract_end: employee.contract_end,
            probation_end: employee.probation_end,
        };

        match self.notifier.send(request) {
            Ok(()) => Ok(()),
            Err(err) => {
                tracing::warn!(employee = %employee_id.0, error = %err, "activation request failed");
                Err(err.into())
            }
        }
    }
}
