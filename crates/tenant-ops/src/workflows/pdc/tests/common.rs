use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::WorkflowConfig;
use crate::workflows::directory::{InvoiceId, TenantId, TenantStatus};
use crate::workflows::pdc::domain::{BatchCheque, NewPdc, NewPdcBatch, Pdc, PdcId, PdcStatus};
use crate::workflows::pdc::repository::{
    InvoicePayment, PaymentError, PaymentRecorder, PdcRepository,
};
use crate::workflows::pdc::PdcLifecycleService;
use crate::workflows::store::RepositoryError;
use crate::workflows::test_support::{tenant, MemoryAudit, MemoryDirectory, MemoryNotifier};

pub(super) const TENANT: &str = "tnt-100";
pub(super) const INVOICE: &str = "inv-2025-001";

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn new_pdc(cheque_number: &str) -> NewPdc {
    NewPdc {
        cheque_number: cheque_number.to_string(),
        bank_name: "Emirates NBD".to_string(),
        tenant_id: TenantId(TENANT.to_string()),
        invoice_id: Some(InvoiceId(INVOICE.to_string())),
        lease_id: Some("lease-7".to_string()),
        amount: Decimal::new(1250000, 2),
        cheque_date: date(2025, 11, 1),
    }
}

pub(super) fn batch(numbers: &[&str]) -> NewPdcBatch {
    NewPdcBatch {
        tenant_id: TenantId(TENANT.to_string()),
        invoice_id: None,
        lease_id: Some("lease-7".to_string()),
        cheques: numbers
            .iter()
            .enumerate()
            .map(|(index, number)| BatchCheque {
                cheque_number: number.to_string(),
                bank_name: "ADCB".to_string(),
                amount: Decimal::from(8_000),
                cheque_date: date(2026, 1 + (index as u32 % 12), 1),
            })
            .collect(),
    }
}

#[derive(Default)]
pub(super) struct MemoryPdcRepository {
    records: Mutex<BTreeMap<PdcId, Pdc>>,
    pub(super) fail_updates_for: Mutex<Vec<String>>,
}

impl MemoryPdcRepository {
    pub(super) fn count(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }

    pub(super) fn stored(&self, id: &PdcId) -> Pdc {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .cloned()
            .expect("record present")
    }

    pub(super) fn fail_update_of(&self, cheque_number: &str) {
        self.fail_updates_for
            .lock()
            .expect("repository mutex poisoned")
            .push(cheque_number.to_string());
    }
}

impl PdcRepository for MemoryPdcRepository {
    fn fetch(&self, id: &PdcId) -> Result<Option<Pdc>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .cloned())
    }

    fn for_tenant(&self, tenant_id: &TenantId) -> Result<Vec<Pdc>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("repository mutex poisoned")
            .values()
            .filter(|record| &record.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    fn with_status(&self, status: PdcStatus) -> Result<Vec<Pdc>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("repository mutex poisoned")
            .values()
            .filter(|record| record.status == status)
            .cloned()
            .collect())
    }

    fn insert_all(&self, records: Vec<Pdc>) -> Result<Vec<Pdc>, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if records.iter().any(|record| guard.contains_key(&record.id)) {
            return Err(RepositoryError::Conflict);
        }
        for record in &records {
            guard.insert(record.id.clone(), record.clone());
        }
        Ok(records)
    }

    fn update(&self, record: Pdc) -> Result<(), RepositoryError> {
        let failing = self
            .fail_updates_for
            .lock()
            .expect("repository mutex poisoned")
            .contains(&record.cheque_number);
        if failing {
            return Err(RepositoryError::Unavailable("write timeout".to_string()));
        }
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            guard.insert(record.id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn replace(&self, source: Pdc, replacement: Pdc) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
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

#[derive(Default)]
pub(super) struct MemoryPayments {
    payments: Mutex<Vec<InvoicePayment>>,
    pub(super) fail: bool,
}

impl MemoryPayments {
    pub(super) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(super) fn recorded(&self) -> Vec<InvoicePayment> {
        self.payments.lock().expect("payments mutex poisoned").clone()
    }
}

impl PaymentRecorder for MemoryPayments {
    fn record_payment(&self, payment: InvoicePayment) -> Result<(), PaymentError> {
        if self.fail {
            return Err(PaymentError::Unavailable("ledger offline".to_string()));
        }
        self.payments
            .lock()
            .expect("payments mutex poisoned")
            .push(payment);
        Ok(())
    }
}

pub(super) struct Harness {
    pub(super) service: PdcLifecycleService,
    pub(super) repository: Arc<MemoryPdcRepository>,
    pub(super) payments: Arc<MemoryPayments>,
    pub(super) audit: Arc<MemoryAudit>,
    pub(super) notifier: Arc<MemoryNotifier>,
}

pub(super) fn directory() -> MemoryDirectory {
    MemoryDirectory::default()
        .with_tenant(tenant(TENANT, TenantStatus::Active, 10_000))
        .with_invoice(INVOICE)
}

pub(super) fn harness() -> Harness {
    harness_with(MemoryPayments::default(), MemoryAudit::default(), MemoryNotifier::default())
}

pub(super) fn harness_with(
    payments: MemoryPayments,
    audit: MemoryAudit,
    notifier: MemoryNotifier,
) -> Harness {
    let repository = Arc::new(MemoryPdcRepository::default());
    let payments = Arc::new(payments);
    let audit = Arc::new(audit);
    let notifier = Arc::new(notifier);
    let service = PdcLifecycleService::new(
        repository.clone(),
        Arc::new(directory()),
        payments.clone(),
        audit.clone(),
        notifier.clone(),
        &WorkflowConfig::default(),
    );

    Harness {
        service,
        repository,
        payments,
        audit,
        notifier,
    }
}

impl Harness {
    pub(super) fn received(&self, cheque_number: &str) -> Pdc {
        self.service
            .create(new_pdc(cheque_number), "clerk")
            .expect("cheque registers")
    }

    /// Drive a fresh cheque to `status` along the shortest legal path.
    pub(super) fn in_status(&self, cheque_number: &str, status: PdcStatus) -> Pdc {
        use crate::workflows::pdc::domain::{
            DepositRequest, PaymentMethod, ReplacementCheque, WithdrawRequest,
        };

        let pdc = self.received(cheque_number);
        let id = pdc.id.clone();
        let deposit = |svc: &PdcLifecycleService| {
            svc.deposit(
                &id,
                DepositRequest {
                    deposit_date: date(2025, 11, 2),
                    bank_account_id: "acct-ops".to_string(),
                },
                "clerk",
            )
            .expect("deposit succeeds")
        };

        match status {
            PdcStatus::Received => pdc,
            PdcStatus::Due => {
                let mut stored = self.repository.stored(&id);
                stored.status = PdcStatus::Due;
                self.repository.update(stored.clone()).expect("update");
                stored
            }
            PdcStatus::Deposited => deposit(&self.service),
            PdcStatus::Cleared => {
                deposit(&self.service);
                self.service
                    .clear(&id, Some(date(2025, 11, 5)), "clerk")
                    .expect("clear succeeds")
            }
            PdcStatus::Bounced => {
                deposit(&self.service);
                self.service
                    .bounce(&id, "insufficient funds", Some(date(2025, 11, 5)), "clerk")
                    .expect("bounce succeeds")
            }
            PdcStatus::Withdrawn => self
                .service
                .withdraw(
                    &id,
                    WithdrawRequest {
                        withdrawal_date: date(2025, 10, 20),
                        reason: "paying by transfer".to_string(),
                        new_payment_method: PaymentMethod::BankTransfer,
                        transaction_id: Some("TRX-1".to_string()),
                    },
                    "clerk",
                )
                .expect("withdraw succeeds"),
            PdcStatus::Cancelled => self.service.cancel(&id, "clerk").expect("cancel succeeds"),
            PdcStatus::Replaced => {
                deposit(&self.service);
                self.service
                    .bounce(&id, "signature mismatch", None, "clerk")
                    .expect("bounce succeeds");
                self.service
                    .replace(
                        &id,
                        ReplacementCheque {
                            cheque_number: format!("{cheque_number}-R"),
                            bank_name: None,
                            amount: None,
                            cheque_date: date(2025, 11, 20),
                        },
                        "clerk",
                    )
                    .expect("replace succeeds");
                self.repository.stored(&id)
            }
        }
    }
}
