use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tenant_ops::config::WorkflowConfig;
use tenant_ops::workflows::checkout::{
    CheckoutId, CheckoutRecord, CheckoutRepository, CheckoutWorkflowService, FileStorage,
    StorageError,
};
use tenant_ops::workflows::pdc::{
    InvoicePayment, PaymentError, PaymentRecorder, Pdc, PdcId, PdcLifecycleService,
    PdcRepository, PdcStatus,
};
use tenant_ops::workflows::{
    AuditError, AuditEvent, AuditLogger, DirectoryError, InvoiceId, Notification, Notifier,
    NotifyError, PropertyId, RepositoryError, TenantDirectory, TenantId, TenantSnapshot,
    TenantStatus, UnitId, UnitStatus,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// A poisoned lock only means another request panicked mid-write; the map itself is intact.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryPdcRepository {
    records: Arc<Mutex<BTreeMap<PdcId, Pdc>>>,
}

impl PdcRepository for InMemoryPdcRepository {
    fn fetch(&self, id: &PdcId) -> Result<Option<Pdc>, RepositoryError> {
        Ok(lock(&self.records).get(id).cloned())
    }

    fn for_tenant(&self, tenant_id: &TenantId) -> Result<Vec<Pdc>, RepositoryError> {
        Ok(lock(&self.records)
            .values()
            .filter(|record| &record.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    fn with_status(&self, status: PdcStatus) -> Result<Vec<Pdc>, RepositoryError> {
        Ok(lock(&self.records)
            .values()
            .filter(|record| record.status == status)
            .cloned()
            .collect())
    }

    fn insert_all(&self, records: Vec<Pdc>) -> Result<Vec<Pdc>, RepositoryError> {
        let mut guard = lock(&self.records);
        if records.iter().any(|record| guard.contains_key(&record.id)) {
            return Err(RepositoryError::Conflict);
        }
        for record in &records {
            guard.insert(record.id.clone(), record.clone());
        }
        Ok(records)
    }

    fn update(&self, record: Pdc) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records);
        if guard.contains_key(&record.id) {
            guard.insert(record.id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn replace(&self, source: Pdc, replacement: Pdc) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records);
        if !guard.contains_key(&source.id) {
            return Err(RepositoryError::NotFound);
        }
        if guard.contains_key(&replacement.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(source.id.clone(), source);
        guard.insert(replacement.id.clone(), replacement);
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryCheckoutRepository {
    records: Arc<Mutex<HashMap<CheckoutId, CheckoutRecord>>>,
}

impl CheckoutRepository for InMemoryCheckoutRepository {
    fn insert(&self, record: CheckoutRecord) -> Result<CheckoutRecord, RepositoryError> {
        let mut guard = lock(&self.records);
        if guard.contains_key(&record.checkout.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.checkout.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: CheckoutRecord) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records);
        if guard.contains_key(&record.checkout.id) {
            guard.insert(record.checkout.id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &CheckoutId) -> Result<Option<CheckoutRecord>, RepositoryError> {
        Ok(lock(&self.records).get(id).cloned())
    }

    fn for_tenant(&self, tenant_id: &TenantId) -> Result<Vec<CheckoutRecord>, RepositoryError> {
        Ok(lock(&self.records)
            .values()
            .filter(|record| &record.checkout.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    fn count(&self) -> Result<usize, RepositoryError> {
        Ok(lock(&self.records).len())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryDirectory {
    tenants: Arc<Mutex<HashMap<TenantId, TenantSnapshot>>>,
    invoices: Arc<Mutex<HashSet<InvoiceId>>>,
    units: Arc<Mutex<HashMap<UnitId, UnitStatus>>>,
    active_users: Arc<Mutex<HashSet<String>>>,
}

impl InMemoryDirectory {
    pub(crate) fn seed_tenant(&self, snapshot: TenantSnapshot) {
        lock(&self.units).insert(snapshot.unit_id.clone(), UnitStatus::Occupied);
        if let Some(user_id) = &snapshot.user_id {
            lock(&self.active_users).insert(user_id.clone());
        }
        lock(&self.tenants).insert(snapshot.tenant_id.clone(), snapshot);
    }

    pub(crate) fn seed_invoice(&self, id: &str) {
        lock(&self.invoices).insert(InvoiceId(id.to_string()));
    }

    pub(crate) fn unit_status(&self, id: &UnitId) -> Option<UnitStatus> {
        lock(&self.units).get(id).copied()
    }

    pub(crate) fn user_active(&self, user_id: &str) -> bool {
        lock(&self.active_users).contains(user_id)
    }

    /// Sample portfolio used by the demo and by development servers.
    pub(crate) fn with_demo_tenants() -> Self {
        let directory = Self::default();
        for (id, name, status, deposit, unit) in [
            ("tnt-1001", "Layla Haddad", TenantStatus::Active, Decimal::new(450000, 2), "MRN-1204"),
            (
                "tnt-1002",
                "Omar Saleh",
                TenantStatus::ExpiringSoon,
                Decimal::new(1200000, 2),
                "MRN-0807",
            ),
            ("tnt-1003", "Priya Nair", TenantStatus::Active, Decimal::new(800000, 2), "JBR-2210"),
        ] {
            directory.seed_tenant(TenantSnapshot {
                tenant_id: TenantId(id.to_string()),
                full_name: name.to_string(),
                status,
                security_deposit: deposit,
                property_id: PropertyId("prop-marina-heights".to_string()),
                unit_id: UnitId(unit.to_string()),
                user_id: Some(format!("user-{id}")),
            });
        }
        directory.seed_invoice("INV-2025-0410");
        directory.seed_invoice("INV-2025-0411");
        directory
    }
}

impl TenantDirectory for InMemoryDirectory {
    fn tenant(&self, id: &TenantId) -> Result<Option<TenantSnapshot>, DirectoryError> {
        Ok(lock(&self.tenants).get(id).cloned())
    }

    fn invoice_exists(&self, id: &InvoiceId) -> Result<bool, DirectoryError> {
        Ok(lock(&self.invoices).contains(id))
    }

    fn set_tenant_status(
        &self,
        id: &TenantId,
        status: TenantStatus,
    ) -> Result<(), DirectoryError> {
        let mut tenants = lock(&self.tenants);
        let tenant = tenants.get_mut(id).ok_or_else(|| DirectoryError::Missing {
            entity: "tenant",
            id: id.0.clone(),
        })?;
        tenant.status = status;
        Ok(())
    }

    fn set_unit_status(&self, id: &UnitId, status: UnitStatus) -> Result<(), DirectoryError> {
        lock(&self.units).insert(id.clone(), status);
        Ok(())
    }

    fn deactivate_user(&self, user_id: &str) -> Result<(), DirectoryError> {
        if lock(&self.active_users).remove(user_id) {
            Ok(())
        } else {
            Err(DirectoryError::Missing {
                entity: "user",
                id: user_id.to_string(),
            })
        }
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryPaymentLedger {
    payments: Arc<Mutex<Vec<InvoicePayment>>>,
}

impl InMemoryPaymentLedger {
    pub(crate) fn payments(&self) -> Vec<InvoicePayment> {
        lock(&self.payments).clone()
    }
}

impl PaymentRecorder for InMemoryPaymentLedger {
    fn record_payment(&self, payment: InvoicePayment) -> Result<(), PaymentError> {
        tracing::info!(
            invoice_id = %payment.invoice_id.0,
            amount = %payment.amount,
            reference = %payment.reference,
            "invoice payment booked"
        );
        lock(&self.payments).push(payment);
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryFileStorage {
    objects: Arc<Mutex<HashMap<String, StoredObject>>>,
}

#[derive(Debug, Clone)]
struct StoredObject {
    content_type: String,
    size: usize,
}

impl InMemoryFileStorage {
    pub(crate) fn content_type(&self, key: &str) -> Option<String> {
        lock(&self.objects)
            .get(key)
            .map(|object| object.content_type.clone())
    }
}

impl FileStorage for InMemoryFileStorage {
    fn upload(
        &self,
        folder: &str,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError> {
        let content_type = if content_type.is_empty() || content_type == "application/octet-stream"
        {
            mime_guess::from_path(file_name)
                .first_or_octet_stream()
                .essence_str()
                .to_string()
        } else {
            content_type.to_string()
        };

        let key = format!("{}/{}", folder.trim_end_matches('/'), file_name);
        tracing::debug!(%key, %content_type, size = bytes.len(), "object stored");
        lock(&self.objects).insert(
            key.clone(),
            StoredObject {
                content_type,
                size: bytes.len(),
            },
        );
        Ok(key)
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        lock(&self.objects)
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    fn presign(&self, key: &str, expires_in_secs: u64) -> Result<String, StorageError> {
        let objects = lock(&self.objects);
        let object = objects
            .get(key)
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;
        Ok(format!(
            "memory://{key}?expires_in={expires_in_secs}&size={}",
            object.size
        ))
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAuditLog {
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl InMemoryAuditLog {
    pub(crate) fn events(&self) -> Vec<AuditEvent> {
        lock(&self.events).clone()
    }
}

impl AuditLogger for InMemoryAuditLog {
    fn record(&self, event: AuditEvent) -> Result<(), AuditError> {
        tracing::info!(
            target: "audit",
            event_type = %event.event_type,
            actor = %event.actor,
            entity_id = %event.entity_id,
            summary = %event.summary,
        );
        lock(&self.events).push(event);
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl InMemoryNotifier {
    pub(crate) fn sent(&self) -> Vec<Notification> {
        lock(&self.sent).clone()
    }
}

impl Notifier for InMemoryNotifier {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        tracing::info!(template = notification.template(), "notification queued");
        lock(&self.sent).push(notification);
        Ok(())
    }
}

/// Both workflow services wired against one set of in-memory adapters.
#[derive(Clone)]
pub(crate) struct Workflows {
    pub(crate) pdc: Arc<PdcLifecycleService>,
    pub(crate) checkout: Arc<CheckoutWorkflowService>,
    pub(crate) directory: InMemoryDirectory,
    pub(crate) payments: InMemoryPaymentLedger,
    pub(crate) storage: InMemoryFileStorage,
    pub(crate) audit: InMemoryAuditLog,
    pub(crate) notifier: InMemoryNotifier,
}

impl Workflows {
    pub(crate) fn in_memory(config: &WorkflowConfig, directory: InMemoryDirectory) -> Self {
        let payments = InMemoryPaymentLedger::default();
        let storage = InMemoryFileStorage::default();
        let audit = InMemoryAuditLog::default();
        let notifier = InMemoryNotifier::default();

        let pdc = Arc::new(PdcLifecycleService::new(
            Arc::new(InMemoryPdcRepository::default()),
            Arc::new(directory.clone()),
            Arc::new(payments.clone()),
            Arc::new(audit.clone()),
            Arc::new(notifier.clone()),
            config,
        ));
        let checkout = Arc::new(CheckoutWorkflowService::new(
            Arc::new(InMemoryCheckoutRepository::default()),
            Arc::new(directory.clone()),
            Arc::new(storage.clone()),
            Arc::new(audit.clone()),
            Arc::new(notifier.clone()),
            config,
        ));

        Self {
            pdc,
            checkout,
            directory,
            payments,
            storage,
            audit,
            notifier,
        }
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
