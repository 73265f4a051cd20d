use super::domain::{
    ActionPlanItem, Behavior, Competency, EmployeeId, EmployeeRecord, Evaluation,
    EvaluationDetail, EvaluationId, EvaluationLevel, LevelId,
};

/// Storage abstraction consumed by the engine.
///
/// Implemented once against the real data store and once against the
/// in-memory fallback; both must behave identically from the engine's
/// perspective. `update_evaluation` replaces the detail and plan child sets
/// wholesale (delete-then-insert); the engine does not coordinate concurrent
/// updates of the same evaluation, so the last writer's child set wins. A
/// production adapter should add optimistic concurrency or a per-id lock at
/// this boundary.
pub trait EvaluationRepository: Send + Sync {
    fn employee_by_email(&self, email: &str) -> Result<Option<EmployeeRecord>, RepositoryError>;
    fn employee_by_id(&self, id: &EmployeeId) -> Result<Option<EmployeeRecord>, RepositoryError>;
    fn employees(&self) -> Result<Vec<EmployeeRecord>, RepositoryError>;
    fn employees_by_evaluator(
        &self,
        evaluator: &str,
    ) -> Result<Vec<EmployeeRecord>, RepositoryError>;
    fn update_employee_notes(
        &self,
        id: &EmployeeId,
        notes: Option<String>,
    ) -> Result<(), RepositoryError>;

    fn active_levels(&self) -> Result<Vec<EvaluationLevel>, RepositoryError>;
    fn level_by_id(&self, id: &LevelId) -> Result<Option<EvaluationLevel>, RepositoryError>;

    fn competencies(&self) -> Result<Vec<Competency>, RepositoryError>;
    fn behaviors_by_level(&self, level_id: &LevelId) -> Result<Vec<Behavior>, RepositoryError>;

    fn evaluations_by_evaluator(
        &self,
        evaluator: &str,
    ) -> Result<Vec<Evaluation>, RepositoryError>;
    fn evaluations_by_employee(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<Evaluation>, RepositoryError>;
    fn evaluation_by_id(&self, id: &EvaluationId)
        -> Result<Option<Evaluation>, RepositoryError>;

    fn create_evaluation(
        &self,
        evaluation: Evaluation,
        details: Vec<EvaluationDetail>,
        plan: Vec<ActionPlanItem>,
    ) -> Result<EvaluationId, RepositoryError>;
    fn update_evaluation(
        &self,
        evaluation: Evaluation,
        details: Vec<EvaluationDetail>,
        plan: Vec<ActionPlanItem>,
    ) -> Result<(), RepositoryError>;

    fn details_by_evaluation(
        &self,
        evaluation_id: &EvaluationId,
    ) -> Result<Vec<EvaluationDetail>, RepositoryError>;
    fn plan_by_evaluation(
        &self,
        evaluation_id: &EvaluationId,
    ) -> Result<Vec<ActionPlanItem>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
