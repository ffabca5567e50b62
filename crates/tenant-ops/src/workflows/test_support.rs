//! In-memory collaborators shared by the workflow unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use rust_decimal::Decimal;

use crate::workflows::directory::{
    DirectoryError, InvoiceId, PropertyId, TenantDirectory, TenantId, TenantSnapshot,
    TenantStatus, UnitId, UnitStatus,
};
use crate::workflows::events::{
    AuditError, AuditEvent, AuditLogger, Notification, Notifier, NotifyError,
};

pub(crate) fn tenant(id: &str, status: TenantStatus, deposit: i64) -> TenantSnapshot {
    TenantSnapshot {
        tenant_id: TenantId(id.to_string()),
        full_name: format!("Tenant {id}"),
        status,
        security_deposit: Decimal::from(deposit),
        property_id: PropertyId("prop-marina".to_string()),
        unit_id: UnitId(format!("unit-{id}")),
        user_id: Some(format!("user-{id}")),
    }
}

#[derive(Default)]
pub(crate) struct MemoryDirectory {
    tenants: Mutex<HashMap<TenantId, TenantSnapshot>>,
    invoices: Mutex<HashSet<InvoiceId>>,
    units: Mutex<HashMap<UnitId, UnitStatus>>,
    deactivated: Mutex<Vec<String>>,
    pub(crate) fail_deactivation: bool,
    pub(crate) fail_unit_update: bool,
}

impl MemoryDirectory {
    pub(crate) fn with_tenant(self, snapshot: TenantSnapshot) -> Self {
        self.units
            .lock()
            .expect("directory mutex poisoned")
            .insert(snapshot.unit_id.clone(), UnitStatus::Occupied);
        self.tenants
            .lock()
            .expect("directory mutex poisoned")
            .insert(snapshot.tenant_id.clone(), snapshot);
        self
    }

    pub(crate) fn with_invoice(self, id: &str) -> Self {
        self.invoices
            .lock()
            .expect("directory mutex poisoned")
            .insert(InvoiceId(id.to_string()));
        self
    }

    pub(crate) fn tenant_status(&self, id: &str) -> Option<TenantStatus> {
        self.tenants
            .lock()
            .expect("directory mutex poisoned")
            .get(&TenantId(id.to_string()))
            .map(|tenant| tenant.status)
    }

    pub(crate) fn unit_status(&self, id: &str) -> Option<UnitStatus> {
        self.units
            .lock()
            .expect("directory mutex poisoned")
            .get(&UnitId(id.to_string()))
            .copied()
    }

    pub(crate) fn deactivated_users(&self) -> Vec<String> {
        self.deactivated
            .lock()
            .expect("directory mutex poisoned")
            .clone()
    }
}

impl TenantDirectory for MemoryDirectory {
    fn tenant(&self, id: &TenantId) -> Result<Option<TenantSnapshot>, DirectoryError> {
        Ok(self
            .tenants
            .lock()
            .expect("directory mutex poisoned")
            .get(id)
            .cloned())
    }

    fn invoice_exists(&self, id: &InvoiceId) -> Result<bool, DirectoryError> {
        Ok(self
            .invoices
            .lock()
            .expect("directory mutex poisoned")
            .contains(id))
    }

    fn set_tenant_status(
        &self,
        id: &TenantId,
        status: TenantStatus,
    ) -> Result<(), DirectoryError> {
        let mut tenants = self.tenants.lock().expect("directory mutex poisoned");
        let tenant = tenants.get_mut(id).ok_or_else(|| DirectoryError::Missing {
            entity: "tenant",
            id: id.0.clone(),
        })?;
        tenant.status = status;
        Ok(())
    }

    fn set_unit_status(&self, id: &UnitId, status: UnitStatus) -> Result<(), DirectoryError> {
        if self.fail_unit_update {
            return Err(DirectoryError::Unavailable("unit service down".to_string()));
        }
        self.units
            .lock()
            .expect("directory mutex poisoned")
            .insert(id.clone(), status);
        Ok(())
    }

    fn deactivate_user(&self, user_id: &str) -> Result<(), DirectoryError> {
        if self.fail_deactivation {
            return Err(DirectoryError::Unavailable("identity provider down".to_string()));
        }
        self.deactivated
            .lock()
            .expect("directory mutex poisoned")
            .push(user_id.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct MemoryAudit {
    events: Mutex<Vec<AuditEvent>>,
    pub(crate) fail: bool,
}

impl MemoryAudit {
    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(crate) fn event_types(&self) -> Vec<String> {
        self.events
            .lock()
            .expect("audit mutex poisoned")
            .iter()
            .map(|event| event.event_type.clone())
            .collect()
    }
}

impl AuditLogger for MemoryAudit {
    fn record(&self, event: AuditEvent) -> Result<(), AuditError> {
        if self.fail {
            return Err(AuditError::Unavailable("audit store offline".to_string()));
        }
        self.events.lock().expect("audit mutex poisoned").push(event);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct MemoryNotifier {
    sent: Mutex<Vec<Notification>>,
    pub(crate) fail: bool,
}

impl MemoryNotifier {
    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(crate) fn templates(&self) -> Vec<&'static str> {
        self.sent
            .lock()
            .expect("notifier mutex poisoned")
            .iter()
            .map(Notification::template)
            .collect()
    }

    pub(crate) fn sent(&self) -> Vec<Notification> {
        self.sent.lock().expect("notifier mutex poisoned").clone()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::Transport("smtp relay refused".to_string()));
        }
        self.sent
            .lock()
            .expect("notifier mutex poisoned")
            .push(notification);
        Ok(())
    }
}
