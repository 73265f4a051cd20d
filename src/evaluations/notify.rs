use std::sync::Mutex;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::EmployeeId;

/// Payload posted to the workflow-automation endpoint when an evaluator
/// requests activation of an employee's evaluation cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivationRequest {
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub document_id: String,
    pub employee_email: Option<String>,
    pub evaluator_name: String,
    pub evaluator_email: Option<String>,
    pub contract_end: Option<NaiveDate>,
    pub probation_end: Option<NaiveDate>,
}

/// Outbound notification hook. One call, fire-and-forget: the engine never
/// retries, and a failure here must not undo any save that preceded it.
pub trait ActivationNotifier: Send + Sync {
    fn send(&self, request: ActivationRequest) -> Result<(), NotifyError>;
}

/// Notification dispatch error. `Rejected` carries the upstream status and
/// body verbatim so the caller sees exactly what the automation endpoint
/// answered.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("activation endpoint rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("activation transport unavailable: {0}")]
    Transport(String),
    #[error("no activation flow URL configured")]
    NotConfigured,
}

/// Notifier enforcing the workflow configuration before dispatch: without
/// an activation flow URL every request is refused as `NotConfigured` and
/// never reaches the transport.
#[derive(Debug)]
pub struct ConfiguredNotifier<N> {
    activation_flow_url: Option<String>,
    transport: N,
}

impl<N> ConfiguredNotifier<N> {
    pub fn new(activation_flow_url: Option<String>, transport: N) -> Self {
        Self {
            activation_flow_url,
            transport,
        }
    }

    pub fn transport(&self) -> &N {
        &self.transport
    }
}

impl<N> ActivationNotifier for ConfiguredNotifier<N>
where
    N: ActivationNotifier,
{
    fn send(&self, request: ActivationRequest) -> Result<(), NotifyError> {
        let url = self
            .activation_flow_url
            .as_deref()
            .ok_or(NotifyError::NotConfigured)?;
        tracing::debug!(%url, employee = %request.employee_id.0, "dispatching activation request");
        self.transport.send(request)
    }
}

/// Notifier that records requests in memory, for tests and offline runs.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    requests: Mutex<Vec<ActivationRequest>>,
}

impl RecordingNotifier {
    pub fn requests(&self) -> Vec<ActivationRequest> {
        self.requests
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl ActivationNotifier for RecordingNotifier {
    fn send(&self, request: ActivationRequest) -> Result<(), NotifyError> {
        tracing::info!(employee = %request.employee_id.0, "activation request recorded");
        self.requests
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(request);
        Ok(())
    }
}
