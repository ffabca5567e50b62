pub mod checkout;
pub mod directory;
pub mod events;
pub mod money;
pub mod pdc;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

pub use directory::{
    DirectoryError, InvoiceId, PropertyId, TenantDirectory, TenantId, TenantSnapshot,
    TenantStatus, UnitId, UnitStatus,
};
pub use events::{AuditError, AuditEvent, AuditLogger, Notification, Notifier, NotifyError};
pub use store::RepositoryError;

use axum::http::HeaderMap;

/// Header carrying the staff member performing a request.
pub const ACTOR_HEADER: &str = "x-actor-id";

pub(crate) fn actor_from(headers: &HeaderMap) -> String {
    headers
        .get(ACTOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or("system")
        .to_string()
}
