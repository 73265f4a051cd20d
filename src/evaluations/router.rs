use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{EmployeeId, EvaluationId};
use super::form::ScoringForm;
use super::identity::PrincipalClaims;
use super::notify::{ActivationNotifier, NotifyError};
use super::plan::PlanRow;
use super::repository::{EvaluationRepository, RepositoryError};
use super::service::{EvaluationService, EvaluationServiceError, SaveAction};

/// Router builder exposing the JSON surface of the evaluation engine.
pub fn evaluation_router<R, N>(service: Arc<EvaluationService<R, N>>) -> Router
where
    R: EvaluationRepository + 'static,
    N: ActivationNotifier + 'static,
{
    Router::new()
        .route(
            "/api/v1/evaluations",
            get(list_handler::<R, N>).post(save_handler::<R, N>),
        )
        .route("/api/v1/evaluations/form", get(new_form_handler::<R, N>))
        .route(
            "/api/v1/evaluations/:evaluation_id/form",
            get(edit_form_handler::<R, N>),
        )
        .route(
            "/api/v1/evaluations/:evaluation_id/follow-up",
            post(follow_up_handler::<R, N>),
        )
        .route(
            "/api/v1/evaluations/:evaluation_id/report",
            get(report_handler::<R, N>),
        )
        .route(
            "/api/v1/evaluations/:evaluation_id/plan",
            post(save_plan_handler::<R, N>),
        )
        .route("/api/v1/employees", get(employees_handler::<R, N>))
        .route(
            "/api/v1/employees/:employee_id",
            get(employee_folder_handler::<R, N>),
        )
        .route(
            "/api/v1/employees/:employee_id/level",
            get(level_assignment_handler::<R, N>),
        )
        .route(
            "/api/v1/employees/:employee_id/activation-request",
            post(activation_handler::<R, N>),
        )
        .route(
            "/api/v1/admin/employees",
            get(admin_employees_handler::<R, N>),
        )
        .route(
            "/api/v1/admin/employees/:employee_id/notes",
            post(notes_handler::<R, N>),
        )
        .with_state(service)
}

fn error_response(error: EvaluationServiceError) -> Response {
    match error {
        EvaluationServiceError::Forbidden => {
            let payload = json!({ "error": "principal is not a registered evaluator" });
            (StatusCode::FORBIDDEN, Json(payload)).into_response()
        }
        EvaluationServiceError::NotFound
        | EvaluationServiceError::Repository(RepositoryError::NotFound) => {
            let payload = json!({ "error": "record not found" });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        EvaluationServiceError::InvalidForm { form, reasons } => {
            // The submitted form is echoed back unpersisted so the caller
            // can correct and resubmit it.
            let payload = json!({ "error": reasons, "form": *form });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        EvaluationServiceError::Repository(RepositoryError::Unavailable(detail)) => {
            let payload = json!({ "error": format!("repository unavailable: {detail}") });
            (StatusCode::SERVICE_UNAVAILABLE, Json(payload)).into_response()
        }
        EvaluationServiceError::Notify(NotifyError::Rejected { status, body }) => {
            let code =
                StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let payload = json!({ "error": body });
            (code, Json(payload)).into_response()
        }
        other => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

macro_rules! authorize {
    ($service:expr, $headers:expr) => {
        match $service.current_evaluator(&PrincipalClaims::from_headers(&$headers)) {
            Ok(evaluator) => evaluator,
            Err(error) => return error_response(error),
        }
    };
}

async fn list_handler<R, N>(
    State(service): State<Arc<EvaluationService<R, N>>>,
    headers: HeaderMap,
) -> Response
where
    R: EvaluationRepository + 'static,
    N: ActivationNotifier + 'static,
{
    let evaluator = authorize!(service, headers);
    match service.evaluation_list(&evaluator) {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
struct EmployeesQuery {
    document: Option<String>,
}

async fn employees_handler<R, N>(
    State(service): State<Arc<EvaluationService<R, N>>>,
    Query(query): Query<EmployeesQuery>,
    headers: HeaderMap,
) -> Response
where
    R: EvaluationRepository + 'static,
    N: ActivationNotifier + 'static,
{
    let evaluator = authorize!(service, headers);
    match service.employees_for(&evaluator, query.document.as_deref()) {
        Ok(employees) => (StatusCode::OK, Json(employees)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn employee_folder_handler<R, N>(
    State(service): State<Arc<EvaluationService<R, N>>>,
    Path(employee_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    R: EvaluationRepository + 'static,
    N: ActivationNotifier + 'static,
{
    let _evaluator = authorize!(service, headers);
    match service.employee_folder(&EmployeeId(employee_id)) {
        Ok(folder) => (StatusCode::OK, Json(folder)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn level_assignment_handler<R, N>(
    State(service): State<Arc<EvaluationService<R, N>>>,
    Path(employee_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    R: EvaluationRepository + 'static,
    N: ActivationNotifier + 'static,
{
    let _evaluator = authorize!(service, headers);
    match service.level_assignment(&EmployeeId(employee_id)) {
        Ok(assignment) => (StatusCode::OK, Json(assignment)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
struct NewFormQuery {
    employee_id: String,
    level_id: String,
    origin_id: Option<String>,
}

async fn new_form_handler<R, N>(
    State(service): State<Arc<EvaluationService<R, N>>>,
    Query(query): Query<NewFormQuery>,
    headers: HeaderMap,
) -> Response
where
    R: EvaluationRepository + 'static,
    N: ActivationNotifier + 'static,
{
    let _evaluator = authorize!(service, headers);
    let today = Local::now().date_naive();
    match service.new_form(
        &EmployeeId(query.employee_id),
        &super::domain::LevelId(query.level_id),
        query.origin_id.map(EvaluationId),
        today,
    ) {
        Ok(form) => (StatusCode::OK, Json(form)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn edit_form_handler<R, N>(
    State(service): State<Arc<EvaluationService<R, N>>>,
    Path(evaluation_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    R: EvaluationRepository + 'static,
    N: ActivationNotifier + 'static,
{
    let _evaluator = authorize!(service, headers);
    match service.edit_form(&EvaluationId(evaluation_id)) {
        Ok(form) => (StatusCode::OK, Json(form)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
struct SaveSubmission {
    action: SaveAction,
    form: ScoringForm,
}

#[derive(Debug, Serialize)]
struct SaveResponse {
    evaluation_id: EvaluationId,
    state: &'static str,
}

async fn save_handler<R, N>(
    State(service): State<Arc<EvaluationService<R, N>>>,
    headers: HeaderMap,
    Json(submission): Json<SaveSubmission>,
) -> Response
where
    R: EvaluationRepository + 'static,
    N: ActivationNotifier + 'static,
{
    let evaluator = authorize!(service, headers);
    let created = submission.form.id.is_none();
    match service.save(&evaluator, submission.form, submission.action) {
        Ok(evaluation_id) => {
            let state = match submission.action {
                SaveAction::Finalize => "finalized",
                SaveAction::Draft => "draft",
            };
            let status = if created {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            (
                status,
                Json(SaveResponse {
                    evaluation_id,
                    state,
                }),
            )
                .into_response()
        }
        Err(error) => error_response(error),
    }
}

async fn follow_up_handler<R, N>(
    State(service): State<Arc<EvaluationService<R, N>>>,
    Path(evaluation_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    R: EvaluationRepository + 'static,
    N: ActivationNotifier + 'static,
{
    let _evaluator = authorize!(service, headers);
    match service.resolve_follow_up(&EvaluationId(evaluation_id)) {
        Ok(target) => (StatusCode::OK, Json(target)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn report_handler<R, N>(
    State(service): State<Arc<EvaluationService<R, N>>>,
    Path(evaluation_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    R: EvaluationRepository + 'static,
    N: ActivationNotifier + 'static,
{
    let _evaluator = authorize!(service, headers);
    match service.report(&EvaluationId(evaluation_id)) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
struct PlanSubmission {
    rows: Vec<PlanRow>,
    next_evaluation_on: Option<NaiveDate>,
}

async fn save_plan_handler<R, N>(
    State(service): State<Arc<EvaluationService<R, N>>>,
    Path(evaluation_id): Path<String>,
    headers: HeaderMap,
    Json(submission): Json<PlanSubmission>,
) -> Response
where
    R: EvaluationRepository + 'static,
    N: ActivationNotifier + 'static,
{
    let _evaluator = authorize!(service, headers);
    match service.save_action_plan(
        &EvaluationId(evaluation_id),
        submission.rows,
        submission.next_evaluation_on,
    ) {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "saved" }))).into_response(),
        Err(error) => error_response(error),
    }
}

async fn activation_handler<R, N>(
    State(service): State<Arc<EvaluationService<R, N>>>,
    Path(employee_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    R: EvaluationRepository + 'static,
    N: ActivationNotifier + 'static,
{
    let evaluator = authorize!(service, headers);
    match service.request_activation(&evaluator, &EmployeeId(employee_id)) {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "sent" }))).into_response(),
        Err(error) => error_response(error),
    }
}

async fn admin_employees_handler<R, N>(
    State(service): State<Arc<EvaluationService<R, N>>>,
    headers: HeaderMap,
) -> Response
where
    R: EvaluationRepository + 'static,
    N: ActivationNotifier + 'static,
{
    let evaluator = authorize!(service, headers);
    match service.all_employees(&evaluator) {
        Ok(employees) => (StatusCode::OK, Json(employees)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
struct NotesSubmission {
    notes: Option<String>,
}

async fn notes_handler<R, N>(
    State(service): State<Arc<EvaluationService<R, N>>>,
    Path(employee_id): Path<String>,
    headers: HeaderMap,
    Json(submission): Json<NotesSubmission>,
) -> Response
where
    R: EvaluationRepository + 'static,
    N: ActivationNotifier + 'static,
{
    let evaluator = authorize!(service, headers);
    match service.update_notes(&evaluator, &EmployeeId(employee_id), submission.notes) {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "updated" }))).into_response(),
        Err(error) => error_response(error),
    }
}
