// Instance action dispatcher - confirm, submit, acknowledge
use crate::application::cloud_api::ApiError;
use crate::domain::dashboard::Notification;
use crate::domain::resources::{ActionRequest, ActionResponse};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionPhase {
    Idle,
    Confirming(ActionRequest),
    AwaitingResponse(ActionRequest),
}

/// Start/stop flow for the compute widget.
///
/// Only one action is in flight at a time. Controls that were submitted stay
/// pending until the compute widget is reloaded.
#[derive(Debug)]
pub struct ActionDispatcher {
    phase: ActionPhase,
    pending: HashSet<ActionRequest>,
}

impl ActionDispatcher {
    pub fn new() -> Self {
        Self {
            phase: ActionPhase::Idle,
            pending: HashSet::new(),
        }
    }

    pub fn phase(&self) -> &ActionPhase {
        &self.phase
    }

    /// Prompt text while confirming
    pub fn prompt(&self) -> Option<String> {
        match &self.phase {
            ActionPhase::Confirming(request) => Some(format!(
                "Are you sure you want to {} instance {}?",
                request.action, request.instance_id
            )),
            _ => None,
        }
    }

    /// Ask for confirmation. Returns false when the request is ignored because
    /// another action is underway or the control is already pending.
    pub fn request(&mut self, request: ActionRequest) -> bool {
        if self.phase != ActionPhase::Idle || self.pending.contains(&request) {
            tracing::debug!("Ignoring {} on {}: busy", request.action, request.instance_id);
            return false;
        }
        self.phase = ActionPhase::Confirming(request);
        true
    }

    /// Resolve the prompt. On yes the control is marked pending and the request
    /// to submit is returned; on no the dispatcher goes back to idle.
    pub fn confirm(&mut self, accepted: bool) -> Option<ActionRequest> {
        let ActionPhase::Confirming(request) = &self.phase else {
            return None;
        };
        let request = request.clone();

        if !accepted {
            tracing::debug!("{} on {} cancelled", request.action, request.instance_id);
            self.phase = ActionPhase::Idle;
            return None;
        }

        self.pending.insert(request.clone());
        self.phase = ActionPhase::AwaitingResponse(request.clone());
        Some(request)
    }

    /// Turn the outcome into the acknowledgment to show and return to idle
    pub fn complete(&mut self, outcome: &Result<ActionResponse, ApiError>) -> Notification {
        self.phase = ActionPhase::Idle;
        notification_for(outcome)
    }

    pub fn is_pending(&self, request: &ActionRequest) -> bool {
        self.pending.contains(request)
    }

    /// Forget pending controls; called when the compute widget re-renders
    pub fn reset_controls(&mut self) {
        self.pending.clear();
    }
}

impl Default for ActionDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

pub fn notification_for(outcome: &Result<ActionResponse, ApiError>) -> Notification {
    match outcome {
        Ok(response) if response.success => Notification::info(
            response
                .message
                .clone()
                .unwrap_or_else(|| "Action submitted".to_string()),
        ),
        Ok(response) => Notification::error(format!(
            "Error: {}",
            response.error.as_deref().unwrap_or("unknown error")
        )),
        Err(e) => Notification::error(format!("Failed to perform action: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dashboard::NotificationKind;
    use crate::domain::resources::InstanceAction;

    fn stop_i1() -> ActionRequest {
        ActionRequest::new(InstanceAction::Stop, "i-1")
    }

    #[test]
    fn test_decline_returns_to_idle_without_request() {
        let mut dispatcher = ActionDispatcher::new();
        assert!(dispatcher.request(stop_i1()));
        assert_eq!(
            dispatcher.prompt().as_deref(),
            Some("Are you sure you want to stop instance i-1?")
        );

        assert_eq!(dispatcher.confirm(false), None);
        assert_eq!(dispatcher.phase(), &ActionPhase::Idle);
        assert!(!dispatcher.is_pending(&stop_i1()));
    }

    #[test]
    fn test_accept_marks_control_pending() {
        let mut dispatcher = ActionDispatcher::new();
        dispatcher.request(stop_i1());

        assert_eq!(dispatcher.confirm(true), Some(stop_i1()));
        assert_eq!(dispatcher.phase(), &ActionPhase::AwaitingResponse(stop_i1()));
        assert!(dispatcher.is_pending(&stop_i1()));
    }

    #[test]
    fn test_no_double_submit_on_same_control() {
        let mut dispatcher = ActionDispatcher::new();
        dispatcher.request(stop_i1());
        dispatcher.confirm(true);

        // still awaiting
        assert!(!dispatcher.request(stop_i1()));

        dispatcher.complete(&Ok(ActionResponse::succeeded("ok")));
        // response in, but the control stays pending until the widget reloads
        assert!(!dispatcher.request(stop_i1()));
        assert!(dispatcher.request(ActionRequest::new(InstanceAction::Start, "i-2")));
        dispatcher.confirm(false);

        dispatcher.reset_controls();
        assert!(dispatcher.request(stop_i1()));
    }

    #[test]
    fn test_confirm_without_prompt_is_noop() {
        let mut dispatcher = ActionDispatcher::new();
        assert_eq!(dispatcher.confirm(true), None);
        assert_eq!(dispatcher.phase(), &ActionPhase::Idle);
    }

    #[test]
    fn test_notifications_for_outcomes() {
        let ok = notification_for(&Ok(ActionResponse::succeeded(
            "Successfully initiated stop for i-1",
        )));
        assert_eq!(ok.kind, NotificationKind::Info);
        assert_eq!(ok.message, "Successfully initiated stop for i-1");

        let failed = notification_for(&Ok(ActionResponse::failed("InvalidInstanceID")));
        assert_eq!(failed.kind, NotificationKind::Error);
        assert_eq!(failed.message, "Error: InvalidInstanceID");

        let transport = notification_for(&Err(ApiError::Status {
            endpoint: "ec2-action".into(),
            status: 502,
            body: "bad gateway".into(),
        }));
        assert_eq!(transport.kind, NotificationKind::Error);
        assert_eq!(
            transport.message,
            "Failed to perform action: ec2-action returned 502: bad gateway"
        );
    }
}
