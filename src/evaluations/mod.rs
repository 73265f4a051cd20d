//! Evaluation lifecycle and scoring engine.
//!
//! The engine resolves which catalog level applies to an employee, assembles
//! the competency/behavior scoring form, aggregates raw scores into
//! competency and overall averages, derives improvement opportunities, and
//! manages the draft/finalized state and initial/follow-up chaining of
//! evaluation records together with their action plans. Persistence is
//! behind [`repository::EvaluationRepository`]; the engine itself holds no
//! state.

pub mod catalog;
pub mod domain;
pub mod form;
pub mod identity;
pub mod memory;
pub mod notify;
pub mod plan;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ActionPlanItem, Behavior, BehaviorId, Competency, CompetencyId, DetailId, EmployeeId,
    EmployeeRecord, Evaluation, EvaluationDetail, EvaluationId, EvaluationKind, EvaluationLevel,
    EvaluationState, LevelId, PlanItemId, PlanStatus,
};
pub use form::{BehaviorSlot, CompetencySection, ScoringForm};
pub use identity::PrincipalClaims;
pub use memory::MemoryRepository;
pub use notify::{
    ActivationNotifier, ActivationRequest, ConfiguredNotifier, NotifyError, RecordingNotifier,
};
pub use plan::PlanRow;
pub use repository::{EvaluationRepository, RepositoryError};
pub use router::evaluation_router;
pub use scoring::{
    BehaviorResult, CompetencyResult, ImprovementOpportunity, ScoreSummary,
    IMPROVEMENT_THRESHOLD,
};
pub use service::{
    EmployeeFolder, EvaluationListRow, EvaluationReport, EvaluationService,
    EvaluationServiceError, FollowUpTarget, LevelAssignment, SaveAction,
};
