//! Outbound audit and notification hooks shared by the cheque and move-out workflows.
//!
//! Both are fire-and-forget from the workflow's point of view: a failed call is logged
//! at the call site and the already-persisted transition stands.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Structured record of a single state transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event_type: String,
    pub actor: String,
    pub entity_id: String,
    pub summary: Value,
    pub recorded_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(
        event_type: impl Into<String>,
        actor: impl Into<String>,
        entity_id: impl Into<String>,
        summary: Value,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            actor: actor.into(),
            entity_id: entity_id.into(),
            summary,
            recorded_at: Utc::now(),
        }
    }
}

pub trait AuditLogger: Send + Sync {
    fn record(&self, event: AuditEvent) -> Result<(), AuditError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("audit sink unavailable: {0}")]
    Unavailable(String),
}

/// Notification kinds raised by the workflows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    CheckoutInitiated {
        tenant_id: String,
        checkout_number: String,
        expected_move_out_date: NaiveDate,
    },
    InspectionScheduled {
        tenant_id: String,
        checkout_number: String,
        inspection_date: Option<NaiveDate>,
        time_slot: Option<String>,
    },
    CheckoutCompleted {
        tenant_id: String,
        checkout_number: String,
        net_refund: String,
        amount_owed: Option<String>,
    },
    PdcDueReminder {
        tenant_id: String,
        cheque_number: String,
        cheque_date: NaiveDate,
        amount: String,
    },
}

impl Notification {
    pub const fn template(&self) -> &'static str {
        match self {
            Notification::CheckoutInitiated { .. } => "checkout_initiated",
            Notification::InspectionScheduled { .. } => "inspection_scheduled",
            Notification::CheckoutCompleted { .. } => "checkout_completed",
            Notification::PdcDueReminder { .. } => "pdc_due_reminder",
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Write an audit event, logging instead of failing when the sink is down.
pub(crate) fn audit(logger: &dyn AuditLogger, event: AuditEvent) {
    let event_type = event.event_type.clone();
    let entity_id = event.entity_id.clone();
    if let Err(error) = logger.record(event) {
        tracing::warn!(%event_type, %entity_id, %error, "audit event dropped");
    }
}

/// Send a notification, logging instead of failing when the transport is down.
pub(crate) fn notify(notifier: &dyn Notifier, notification: Notification) {
    let template = notification.template();
    if let Err(error) = notifier.notify(notification) {
        tracing::warn!(template, %error, "notification dropped");
    }
}
