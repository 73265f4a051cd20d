use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for evaluated employees.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmployeeId(pub String);

/// Identifier wrapper for catalog levels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LevelId(pub String);

/// Identifier wrapper for catalog competencies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompetencyId(pub String);

/// Identifier wrapper for catalog behaviors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BehaviorId(pub String);

/// Identifier wrapper for evaluation records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvaluationId(pub String);

/// Identifier wrapper for detail-score rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DetailId(pub String);

/// Identifier wrapper for action-plan items.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlanItemId(pub String);

/// Employee master record maintained by the external HR source.
///
/// Read-only to this engine except for the free-text `notes` field. The
/// evaluator is referenced by name or email as recorded upstream, not by a
/// relational id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub id: EmployeeId,
    pub full_name: String,
    pub document_id: String,
    pub position: Option<String>,
    pub division: Option<String>,
    pub region: Option<String>,
    pub hired_on: Option<NaiveDate>,
    pub contract_start: Option<NaiveDate>,
    pub contract_end: Option<NaiveDate>,
    pub probation_end: Option<NaiveDate>,
    pub email: Option<String>,
    pub evaluator: Option<String>,
    pub form_type: Option<u32>,
    pub super_administrator: bool,
    pub notes: Option<String>,
}

/// A tier of the evaluation catalog that determines which behaviors apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationLevel {
    pub id: LevelId,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub active: bool,
}

/// Named grouping of related behaviors, globally ordered by `order`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competency {
    pub id: CompetencyId,
    pub name: String,
    pub description: Option<String>,
    pub order: u32,
    pub active: bool,
}

/// A single scorable statement belonging to one competency and one level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Behavior {
    pub id: BehaviorId,
    pub competency_id: CompetencyId,
    pub level_id: LevelId,
    pub description: String,
    pub order: u32,
    pub active: bool,
}

/// Evaluation type: a follow-up always chains to an origin evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationKind {
    Initial,
    FollowUp,
}

impl EvaluationKind {
    pub const fn label(self) -> &'static str {
        match self {
            EvaluationKind::Initial => "initial",
            EvaluationKind::FollowUp => "follow_up",
        }
    }
}

/// Lifecycle state of an evaluation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationState {
    Draft,
    Finalized,
}

impl EvaluationState {
    pub const fn label(self) -> &'static str {
        match self {
            EvaluationState::Draft => "draft",
            EvaluationState::Finalized => "finalized",
        }
    }
}

/// One evaluation of one employee at one level.
///
/// `next_evaluation_on` is populated only for initial evaluations (six months
/// after the evaluation date). `origin_id` is present exactly when the kind
/// is `FollowUp`. The evaluator identity is the email captured at save time,
/// not a foreign key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: EvaluationId,
    pub employee_id: EmployeeId,
    pub level_id: LevelId,
    pub evaluated_on: NaiveDate,
    pub kind: EvaluationKind,
    pub state: EvaluationState,
    pub overall_score: Option<f64>,
    pub observations: Option<String>,
    pub next_evaluation_on: Option<NaiveDate>,
    pub origin_id: Option<EvaluationId>,
    pub evaluator_email: Option<String>,
}

/// Detail score for one behavior within one evaluation. Scores live on a
/// 0-100 scale. Owned by the evaluation and replaced wholesale on update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationDetail {
    pub id: DetailId,
    pub evaluation_id: EvaluationId,
    pub behavior_id: BehaviorId,
    pub score: u8,
    pub comment: Option<String>,
}

/// Progress state of an action-plan item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Pending,
    InProgress,
    Completed,
    NotMet,
}

impl PlanStatus {
    pub const fn label(self) -> &'static str {
        match self {
            PlanStatus::Pending => "pending",
            PlanStatus::InProgress => "in_progress",
            PlanStatus::Completed => "completed",
            PlanStatus::NotMet => "not_met",
        }
    }
}

impl Default for PlanStatus {
    fn default() -> Self {
        PlanStatus::Pending
    }
}

/// Remediation task attached to an evaluation, edited through the report
/// flow only. The originating behavior is kept as free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPlanItem {
    pub id: PlanItemId,
    pub evaluation_id: EvaluationId,
    pub description: String,
    pub behavior_label: String,
    pub target_date: Option<NaiveDate>,
    pub status: PlanStatus,
    pub progress_pct: Option<u8>,
    pub evaluator_comments: Option<String>,
    pub follow_up_comments: Option<String>,
    pub follow_up_on: Option<NaiveDate>,
}
