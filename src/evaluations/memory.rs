use std::sync::Mutex;

use super::domain::{
    ActionPlanItem, Behavior, BehaviorId, Competency, CompetencyId, EmployeeId, EmployeeRecord,
    Evaluation, EvaluationDetail, EvaluationId, EvaluationLevel, LevelId,
};
use super::repository::{EvaluationRepository, RepositoryError};

#[derive(Debug, Default)]
struct StoreState {
    employees: Vec<EmployeeRecord>,
    levels: Vec<EvaluationLevel>,
    competencies: Vec<Competency>,
    behaviors: Vec<Behavior>,
    evaluations: Vec<Evaluation>,
    details: Vec<EvaluationDetail>,
    plans: Vec<ActionPlanItem>,
}

/// In-memory fallback store for local and offline operation.
///
/// All tables live behind one mutex; this serializes every operation, which
/// is intentional: the fallback targets low-traffic demo use, not
/// throughput. It must be shared as a single instance (via `Arc`) so all
/// requests in the process see the same data.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    state: Mutex<StoreState>,
}

/// Correlation email of the seeded demo evaluator.
pub const DEMO_EVALUATOR_EMAIL: &str = "pat.reyes@example.com";

impl MemoryRepository {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with the demo catalog: the four levels, two ordered
    /// competencies with two behaviors each per level, one super-admin
    /// evaluator and two employees under them.
    pub fn seeded() -> Self {
        let evaluator_name = "Pat Reyes";
        // The evaluator reference column holds the correlation email.
        let evaluator_ref = DEMO_EVALUATOR_EMAIL;

        let employees = vec![
            EmployeeRecord {
                id: EmployeeId("emp-evaluator".to_string()),
                full_name: evaluator_name.to_string(),
                document_id: "1111111111".to_string(),
                position: Some("Manager".to_string()),
                division: Some("Operations".to_string()),
                region: None,
                hired_on: None,
                contract_start: None,
                contract_end: None,
                probation_end: None,
                email: Some(DEMO_EVALUATOR_EMAIL.to_string()),
                evaluator: None,
                form_type: None,
                super_administrator: true,
                notes: Some("Demo account with super-admin role.".to_string()),
            },
            EmployeeRecord {
                id: EmployeeId("emp-001".to_string()),
                full_name: "Jordan Vega".to_string(),
                document_id: "123456789".to_string(),
                position: Some("Operator".to_string()),
                division: Some("Operations".to_string()),
                region: Some("North".to_string()),
                hired_on: chrono::NaiveDate::from_ymd_opt(2023, 3, 1),
                contract_start: chrono::NaiveDate::from_ymd_opt(2023, 3, 1),
                contract_end: chrono::NaiveDate::from_ymd_opt(2026, 3, 1),
                probation_end: chrono::NaiveDate::from_ymd_opt(2023, 6, 1),
                email: Some("jordan.vega@example.com".to_string()),
                evaluator: Some(evaluator_ref.to_string()),
                form_type: Some(433930002),
                super_administrator: false,
                notes: Some("Documentation pending.".to_string()),
            },
            EmployeeRecord {
                id: EmployeeId("emp-002".to_string()),
                full_name: "Sam Ortega".to_string(),
                document_id: "987654321".to_string(),
                position: Some("Assistant".to_string()),
                division: Some("Environmental".to_string()),
                region: Some("South".to_string()),
                hired_on: chrono::NaiveDate::from_ymd_opt(2024, 1, 15),
                contract_start: chrono::NaiveDate::from_ymd_opt(2024, 1, 15),
                contract_end: chrono::NaiveDate::from_ymd_opt(2026, 1, 15),
                probation_end: chrono::NaiveDate::from_ymd_opt(2024, 3, 15),
                email: Some("sam.ortega@example.com".to_string()),
                evaluator: Some(evaluator_ref.to_string()),
                form_type: None,
                super_administrator: false,
                notes: None,
            },
        ];

        let levels = vec![
            level("lvl-estr", "Strategic", "ESTR"),
            level("lvl-tact", "Tactical", "TACT"),
            level("lvl-opeadm", "Operational Administrative", "OPEADM"),
            level("lvl-ope", "Operational", "OPE"),
        ];

        let competencies = vec![
            Competency {
                id: CompetencyId("cmp-teamwork".to_string()),
                name: "Teamwork".to_string(),
                description: None,
                order: 1,
                active: true,
            },
            Competency {
                id: CompetencyId("cmp-service".to_string()),
                name: "Service orientation".to_string(),
                description: None,
                order: 2,
                active: true,
            },
        ];

        let mut behaviors = Vec::new();
        for level in &levels {
            for competency in &competencies {
                behaviors.push(Behavior {
                    id: BehaviorId(format!("bhv-{}-{}-1", level.code.to_lowercase(), competency.id.0)),
                    competency_id: competency.id.clone(),
                    level_id: level.id.clone(),
                    description: format!(
                        "Demonstrates {} at the {} level",
                        competency.name.to_lowercase(),
                        level.name.to_lowercase()
                    ),
                    order: 1,
                    active: true,
                });
                behaviors.push(Behavior {
                    id: BehaviorId(format!("bhv-{}-{}-2", level.code.to_lowercase(), competency.id.0)),
                    competency_id: competency.id.clone(),
                    level_id: level.id.clone(),
                    description: format!(
                        "Applies {} consistently",
                        competency.name.to_lowercase()
                    ),
                    order: 2,
                    active: true,
                });
            }
        }

        Self {
            state: Mutex::new(StoreState {
                employees,
                levels,
                competencies,
                behaviors,
                evaluations: Vec::new(),
                details: Vec::new(),
                plans: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, StoreState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("fallback store mutex poisoned".to_string()))
    }
}

fn level(id: &str, name: &str, code: &str) -> EvaluationLevel {
    EvaluationLevel {
        id: LevelId(id.to_string()),
        name: name.to_string(),
        code: code.to_string(),
        description: None,
        active: true,
    }
}

fn matches_evaluator(candidate: Option<&str>, evaluator: &str) -> bool {
    candidate
        .map(|value| value.eq_ignore_ascii_case(evaluator))
        .unwrap_or(false)
}

impl EvaluationRepository for MemoryRepository {
    fn employee_by_email(&self, email: &str) -> Result<Option<EmployeeRecord>, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .employees
            .iter()
            .find(|employee| matches_evaluator(employee.email.as_deref(), email))
            .cloned())
    }

    fn employee_by_id(&self, id: &EmployeeId) -> Result<Option<EmployeeRecord>, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .employees
            .iter()
            .find(|employee| employee.id == *id)
            .cloned())
    }

    fn employees(&self) -> Result<Vec<EmployeeRecord>, RepositoryError> {
        Ok(self.lock()?.employees.clone())
    }

    fn employees_by_evaluator(
        &self,
        evaluator: &str,
    ) -> Result<Vec<EmployeeRecord>, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .employees
            .iter()
            .filter(|employee| matches_evaluator(employee.evaluator.as_deref(), evaluator))
            .cloned()
            .collect())
    }

    fn update_employee_notes(
        &self,
        id: &EmployeeId,
        notes: Option<String>,
    ) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        let employee = state
            .employees
            .iter_mut()
            .find(|employee| employee.id == *id)
            .ok_or(RepositoryError::NotFound)?;
        employee.notes = notes;
        Ok(())
    }

    fn active_levels(&self) -> Result<Vec<EvaluationLevel>, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .levels
            .iter()
            .filter(|level| level.active)
            .cloned()
            .collect())
    }

    fn level_by_id(&self, id: &LevelId) -> Result<Option<EvaluationLevel>, RepositoryError> {
        let state = self.lock()?;
        Ok(state.levels.iter().find(|level| level.id == *id).cloned())
    }

    fn competencies(&self) -> Result<Vec<Competency>, RepositoryError> {
        let mut competencies = self.lock()?.competencies.clone();
        competencies.sort_by_key(|competency| competency.order);
        Ok(competencies)
    }

    fn behaviors_by_level(&self, level_id: &LevelId) -> Result<Vec<Behavior>, RepositoryError> {
        let state = self.lock()?;
        let mut behaviors: Vec<Behavior> = state
            .behaviors
            .iter()
            .filter(|behavior| behavior.level_id == *level_id)
            .cloned()
            .collect();
        behaviors.sort_by(|a, b| {
            a.competency_id
                .0
                .cmp(&b.competency_id.0)
                .then(a.order.cmp(&b.order))
        });
        Ok(behaviors)
    }

    fn evaluations_by_evaluator(
        &self,
        evaluator: &str,
    ) -> Result<Vec<Evaluation>, RepositoryError> {
        let state = self.lock()?;
        let mut evaluations: Vec<Evaluation> = state
            .evaluations
            .iter()
            .filter(|evaluation| {
                matches_evaluator(evaluation.evaluator_email.as_deref(), evaluator)
            })
            .cloned()
            .collect();
        evaluations.sort_by(|a, b| b.evaluated_on.cmp(&a.evaluated_on));
        Ok(evaluations)
    }

    fn evaluations_by_employee(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<Evaluation>, RepositoryError> {
        let state = self.lock()?;
        let mut evaluations: Vec<Evaluation> = state
            .evaluations
            .iter()
            .filter(|evaluation| evaluation.employee_id == *employee_id)
            .cloned()
            .collect();
        evaluations.sort_by(|a, b| b.evaluated_on.cmp(&a.evaluated_on));
        Ok(evaluations)
    }

    fn evaluation_by_id(
        &self,
        id: &EvaluationId,
    ) -> Result<Option<Evaluation>, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .evaluations
            .iter()
            .find(|evaluation| evaluation.id == *id)
            .cloned())
    }

    fn create_evaluation(
        &self,
        evaluation: Evaluation,
        details: Vec<EvaluationDetail>,
        plan: Vec<ActionPlanItem>,
    ) -> Result<EvaluationId, RepositoryError> {
        let mut state = self.lock()?;
        if state
            .evaluations
            .iter()
            .any(|existing| existing.id == evaluation.id)
        {
            return Err(RepositoryError::Conflict);
        }

        let id = evaluation.id.clone();
        state.evaluations.push(evaluation);
        state.details.extend(details);
        state.plans.extend(plan);
        Ok(id)
    }

    fn update_evaluation(
        &self,
        evaluation: Evaluation,
        details: Vec<EvaluationDetail>,
        plan: Vec<ActionPlanItem>,
    ) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        let slot = state
            .evaluations
            .iter_mut()
            .find(|existing| existing.id == evaluation.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = evaluation.clone();

        state
            .details
            .retain(|detail| detail.evaluation_id != evaluation.id);
        state.details.extend(details);

        state
            .plans
            .retain(|item| item.evaluation_id != evaluation.id);
        state.plans.extend(plan);
        Ok(())
    }

    fn details_by_evaluation(
        &self,
        evaluation_id: &EvaluationId,
    ) -> Result<Vec<EvaluationDetail>, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .details
            .iter()
            .filter(|detail| detail.evaluation_id == *evaluation_id)
            .cloned()
            .collect())
    }

    fn plan_by_evaluation(
        &self,
        evaluation_id: &EvaluationId,
    ) -> Result<Vec<ActionPlanItem>, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .plans
            .iter()
            .filter(|item| item.evaluation_id == *evaluation_id)
            .cloned()
            .collect())
    }
}
