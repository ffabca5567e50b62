#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use rust_decimal::Decimal;
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

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

#[derive(Default)]
pub struct Directory {
    tenants: Mutex<HashMap<TenantId, TenantSnapshot>>,
    invoices: Mutex<HashSet<InvoiceId>>,
    units: Mutex<HashMap<UnitId, UnitStatus>>,
}

impl Directory {
    pub fn with_tenant(self, id: &str, status: TenantStatus, deposit: Decimal) -> Self {
        let unit_id = UnitId(format!("unit-{id}"));
        self.units
            .lock()
            .expect("directory lock")
            .insert(unit_id.clone(), UnitStatus::Occupied);
        self.tenants.lock().expect("directory lock").insert(
            TenantId(id.to_string()),
            TenantSnapshot {
                tenant_id: TenantId(id.to_string()),
                full_name: format!("Tenant {id}"),
                status,
                security_deposit: deposit,
                property_id: PropertyId("prop-downtown".to_string()),
                unit_id,
                user_id: None,
            },
        );
        self
    }

    pub fn with_invoice(self, id: &str) -> Self {
        self.invoices
            .lock()
            .expect("directory lock")
            .insert(InvoiceId(id.to_string()));
        self
    }

    pub fn tenant_status(&self, id: &str) -> Option<TenantStatus> {
        self.tenants
            .lock()
            .expect("directory lock")
            .get(&TenantId(id.to_string()))
            .map(|tenant| tenant.status)
    }

    pub fn unit_status(&self, id: &str) -> Option<UnitStatus> {
        self.units
            .lock()
            .expect("directory lock")
            .get(&UnitId(id.to_string()))
            .copied()
    }
}

impl TenantDirectory for Directory {
    fn tenant(&self, id: &TenantId) -> Result<Option<TenantSnapshot>, DirectoryError> {
        Ok(self.tenants.lock().expect("directory lock").get(id).cloned())
    }

    fn invoice_exists(&self, id: &InvoiceId) -> Result<bool, DirectoryError> {
        Ok(self.invoices.lock().expect("directory lock").contains(id))
    }

    fn set_tenant_status(
        &self,
        id: &TenantId,
        status: TenantStatus,
    ) -> Result<(), DirectoryError> {
        if let Some(tenant) = self.tenants.lock().expect("directory lock").get_mut(id) {
            tenant.status = status;
        }
        Ok(())
    }

    fn set_unit_status(&self, id: &UnitId, status: UnitStatus) -> Result<(), DirectoryError> {
        self.units
            .lock()
            .expect("directory lock")
            .insert(id.clone(), status);
        Ok(())
    }

    fn deactivate_user(&self, _user_id: &str) -> Result<(), DirectoryError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct Cheques(Mutex<BTreeMap<PdcId, Pdc>>);

impl PdcRepository for Cheques {
    fn fetch(&self, id: &PdcId) -> Result<Option<Pdc>, RepositoryError> {
        Ok(self.0.lock().expect("cheque lock").get(id).cloned())
    }

    fn for_tenant(&self, tenant_id: &TenantId) -> Result<Vec<Pdc>, RepositoryError> {
        Ok(self
            .0
            .lock()
            .expect("cheque lock")
            .values()
            .filter(|pdc| &pdc.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    fn with_status(&self, status: PdcStatus) -> Result<Vec<Pdc>, RepositoryError> {
        Ok(self
            .0
            .lock()
            .expect("cheque lock")
            .values()
            .filter(|pdc| pdc.status == status)
            .cloned()
            .collect())
    }

    fn insert_all(&self, records: Vec<Pdc>) -> Result<Vec<Pdc>, RepositoryError> {
        let mut guard = self.0.lock().expect("cheque lock");
        for record in &records {
            guard.insert(record.id.clone(), record.clone());
        }
        Ok(records)
    }

    fn update(&self, record: Pdc) -> Result<(), RepositoryError> {
        self.0
            .lock()
            .expect("cheque lock")
            .insert(record.id.clone(), record);
        Ok(())
    }

    fn replace(&self, source: Pdc, replacement: Pdc) -> Result<(), RepositoryError> {
        let mut guard = self.0.lock().expect("cheque lock");
        guard.insert(source.id.clone(), source);
        guard.insert(replacement.id.clone(), replacement);
        Ok(())
    }
}

#[derive(Default)]
pub struct Ledger(Mutex<Vec<InvoicePayment>>);

impl Ledger {
    pub fn payments(&self) -> Vec<InvoicePayment> {
        self.0.lock().expect("ledger lock").clone()
    }
}

impl PaymentRecorder for Ledger {
    fn record_payment(&self, payment: InvoicePayment) -> Result<(), PaymentError> {
        self.0.lock().expect("ledger lock").push(payment);
        Ok(())
    }
}

#[derive(Default)]
pub struct Checkouts(Mutex<BTreeMap<CheckoutId, CheckoutRecord>>);

impl CheckoutRepository for Checkouts {
    fn insert(&self, record: CheckoutRecord) -> Result<CheckoutRecord, RepositoryError> {
        self.0
            .lock()
            .expect("checkout lock")
            .insert(record.checkout.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: CheckoutRecord) -> Result<(), RepositoryError> {
        self.0
            .lock()
            .expect("checkout lock")
            .insert(record.checkout.id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &CheckoutId) -> Result<Option<CheckoutRecord>, RepositoryError> {
        Ok(self.0.lock().expect("checkout lock").get(id).cloned())
    }

    fn for_tenant(&self, tenant_id: &TenantId) -> Result<Vec<CheckoutRecord>, RepositoryError> {
        Ok(self
            .0
            .lock()
            .expect("checkout lock")
            .values()
            .filter(|record| &record.checkout.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.0.lock().expect("checkout lock").len())
    }
}

#[derive(Default)]
pub struct Bucket(Mutex<HashSet<String>>);

impl FileStorage for Bucket {
    fn upload(
        &self,
        folder: &str,
        file_name: &str,
        _content_type: &str,
        _bytes: Vec<u8>,
    ) -> Result<String, StorageError> {
        let key = format!("{folder}/{file_name}");
        self.0.lock().expect("bucket lock").insert(key.clone());
        Ok(key)
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.0.lock().expect("bucket lock").remove(key);
        Ok(())
    }

    fn presign(&self, key: &str, expires_in_secs: u64) -> Result<String, StorageError> {
        Ok(format!("https://bucket.test/{key}?ttl={expires_in_secs}"))
    }
}

#[derive(Default)]
pub struct Outbox {
    pub events: Mutex<Vec<AuditEvent>>,
    pub notifications: Mutex<Vec<Notification>>,
}

impl Outbox {
    pub fn event_types(&self) -> Vec<String> {
        self.events
            .lock()
            .expect("outbox lock")
            .iter()
            .map(|event| event.event_type.clone())
            .collect()
    }

    pub fn templates(&self) -> Vec<&'static str> {
        self.notifications
            .lock()
            .expect("outbox lock")
            .iter()
            .map(Notification::template)
            .collect()
    }
}

impl AuditLogger for Outbox {
    fn record(&self, event: AuditEvent) -> Result<(), AuditError> {
        self.events.lock().expect("outbox lock").push(event);
        Ok(())
    }
}

impl Notifier for Outbox {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        self.notifications
            .lock()
            .expect("outbox lock")
            .push(notification);
        Ok(())
    }
}

pub struct Backoffice {
    pub pdc: PdcLifecycleService,
    pub checkout: CheckoutWorkflowService,
    pub directory: Arc<Directory>,
    pub ledger: Arc<Ledger>,
    pub outbox: Arc<Outbox>,
}

pub fn backoffice(directory: Directory, config: &WorkflowConfig) -> Backoffice {
    let directory = Arc::new(directory);
    let ledger = Arc::new(Ledger::default());
    let outbox = Arc::new(Outbox::default());

    let pdc = PdcLifecycleService::new(
        Arc::new(Cheques::default()),
        directory.clone(),
        ledger.clone(),
        outbox.clone(),
        outbox.clone(),
        config,
    );
    let checkout = CheckoutWorkflowService::new(
        Arc::new(Checkouts::default()),
        directory.clone(),
        Arc::new(Bucket::default()),
        outbox.clone(),
        outbox.clone(),
        config,
    );

    Backoffice {
        pdc,
        checkout,
        directory,
        ledger,
        outbox,
    }
}
