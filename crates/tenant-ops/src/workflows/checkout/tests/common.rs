use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::WorkflowConfig;
use crate::workflows::checkout::domain::{
    CheckoutId, CheckoutReason, CheckoutRecord, Deduction, DeductionType, InitiateCheckout,
    InspectionItem, InspectionSection, ItemCondition,
};
use crate::workflows::checkout::repository::{CheckoutRepository, FileStorage, StorageError};
use crate::workflows::checkout::CheckoutWorkflowService;
use crate::workflows::directory::{TenantId, TenantStatus};
use crate::workflows::store::RepositoryError;
use crate::workflows::test_support::{tenant, MemoryAudit, MemoryDirectory, MemoryNotifier};

/// Deposit below the approval threshold.
pub(super) const TENANT: &str = "tnt-200";
/// Deposit above the approval threshold.
pub(super) const LARGE_DEPOSIT_TENANT: &str = "tnt-300";
pub(super) const EXPIRED_TENANT: &str = "tnt-400";

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn initiate(tenant_id: &str) -> InitiateCheckout {
    InitiateCheckout {
        tenant_id: TenantId(tenant_id.to_string()),
        notice_date: date(2025, 9, 1),
        expected_move_out_date: date(2025, 10, 31),
        reason: CheckoutReason::LeaseEnd,
        reason_notes: None,
    }
}

pub(super) fn deduction(deduction_type: DeductionType, amount: i64) -> Deduction {
    Deduction {
        deduction_type,
        description: format!("{deduction_type:?}"),
        amount: Decimal::from(amount),
        auto_calculated: false,
    }
}

pub(super) fn damaged(name: &str, cost: i64) -> InspectionItem {
    InspectionItem {
        name: name.to_string(),
        condition: ItemCondition::Damaged,
        repair_cost: Some(Decimal::from(cost)),
        notes: None,
    }
}

pub(super) fn section(name: &str, items: Vec<InspectionItem>) -> InspectionSection {
    InspectionSection {
        name: name.to_string(),
        items,
    }
}

#[derive(Default)]
pub(super) struct MemoryCheckoutRepository {
    records: Mutex<BTreeMap<CheckoutId, CheckoutRecord>>,
}

impl MemoryCheckoutRepository {
    pub(super) fn stored(&self, id: &CheckoutId) -> CheckoutRecord {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .cloned()
            .expect("record present")
    }
}

impl CheckoutRepository for MemoryCheckoutRepository {
    fn insert(&self, record: CheckoutRecord) -> Result<CheckoutRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.checkout.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.checkout.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: CheckoutRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.checkout.id) {
            guard.insert(record.checkout.id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &CheckoutId) -> Result<Option<CheckoutRecord>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .cloned())
    }

    fn for_tenant(&self, tenant_id: &TenantId) -> Result<Vec<CheckoutRecord>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("repository mutex poisoned")
            .values()
            .filter(|record| &record.checkout.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.records.lock().expect("repository mutex poisoned").len())
    }
}

#[derive(Default)]
pub(super) struct MemoryStorage {
    objects: Mutex<HashMap<String, (String, Vec<u8>)>>,
    unavailable: bool,
}

impl MemoryStorage {
    pub(super) fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub(super) fn contains(&self, key: &str) -> bool {
        self.objects
            .lock()
            .expect("storage mutex poisoned")
            .contains_key(key)
    }

    pub(super) fn forget(&self, key: &str) {
        self.objects
            .lock()
            .expect("storage mutex poisoned")
            .remove(key);
    }
}

impl FileStorage for MemoryStorage {
    fn upload(
        &self,
        folder: &str,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable("bucket unreachable".to_string()));
        }
        let key = format!("{folder}/{file_name}");
        self.objects
            .lock()
            .expect("storage mutex poisoned")
            .insert(key.clone(), (content_type.to_string(), bytes));
        Ok(key)
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.objects
            .lock()
            .expect("storage mutex poisoned")
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    fn presign(&self, key: &str, expires_in_secs: u64) -> Result<String, StorageError> {
        if !self.contains(key) {
            return Err(StorageError::NotFound(key.to_string()));
        }
        Ok(format!("https://files.test/{key}?expires={expires_in_secs}"))
    }
}

pub(super) struct Harness {
    pub(super) service: CheckoutWorkflowService,
    pub(super) repository: Arc<MemoryCheckoutRepository>,
    pub(super) directory: Arc<MemoryDirectory>,
    pub(super) storage: Arc<MemoryStorage>,
    pub(super) audit: Arc<MemoryAudit>,
    pub(super) notifier: Arc<MemoryNotifier>,
}

pub(super) fn directory() -> MemoryDirectory {
    MemoryDirectory::default()
        .with_tenant(tenant(TENANT, TenantStatus::Active, 5_000))
        .with_tenant(tenant(LARGE_DEPOSIT_TENANT, TenantStatus::ExpiringSoon, 10_000))
        .with_tenant(tenant(EXPIRED_TENANT, TenantStatus::Expired, 4_000))
}

pub(super) fn harness() -> Harness {
    harness_with(directory(), MemoryStorage::default(), MemoryNotifier::default())
}

pub(super) fn harness_with(
    directory: MemoryDirectory,
    storage: MemoryStorage,
    notifier: MemoryNotifier,
) -> Harness {
    let repository = Arc::new(MemoryCheckoutRepository::default());
    let directory = Arc::new(directory);
    let storage = Arc::new(storage);
    let audit = Arc::new(MemoryAudit::default());
    let notifier = Arc::new(notifier);
    let service = CheckoutWorkflowService::new(
        repository.clone(),
        directory.clone(),
        storage.clone(),
        audit.clone(),
        notifier.clone(),
        &WorkflowConfig::default(),
    );

    Harness {
        service,
        repository,
        directory,
        storage,
        audit,
        notifier,
    }
}

impl Harness {
    pub(super) fn started(&self, tenant_id: &str) -> CheckoutRecord {
        self.service
            .initiate_checkout(initiate(tenant_id), "leasing-officer")
            .expect("checkout starts")
    }
}
