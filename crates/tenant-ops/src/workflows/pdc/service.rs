use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Days, Local, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::json;

use super::domain::{
    BatchCheque, Bounce, DepositRequest, NewPdc, NewPdcBatch, PaymentMethod, Pdc, PdcId,
    PdcStatus, ReplacementCheque, WithdrawRequest, Withdrawal,
};
use super::repository::{InvoicePayment, PaymentRecorder, PdcRepository};
use crate::config::WorkflowConfig;
use crate::workflows::directory::{DirectoryError, InvoiceId, TenantDirectory, TenantId};
use crate::workflows::events::{self, AuditEvent, AuditLogger, Notification, Notifier};
use crate::workflows::money;
use crate::workflows::store::RepositoryError;

/// Upper bound on cheques accepted in one bulk registration (two years of monthly rent).
pub const MAX_BULK_CHEQUES: usize = 24;

static PDC_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_pdc_id() -> PdcId {
    let id = PDC_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    PdcId(format!("pdc-{id:06}"))
}

/// Service owning the post-dated cheque state machine.
pub struct PdcLifecycleService {
    repository: Arc<dyn PdcRepository>,
    directory: Arc<dyn TenantDirectory>,
    payments: Arc<dyn PaymentRecorder>,
    audit: Arc<dyn AuditLogger>,
    notifier: Arc<dyn Notifier>,
    due_window_days: i64,
}

impl PdcLifecycleService {
    pub fn new(
        repository: Arc<dyn PdcRepository>,
        directory: Arc<dyn TenantDirectory>,
        payments: Arc<dyn PaymentRecorder>,
        audit: Arc<dyn AuditLogger>,
        notifier: Arc<dyn Notifier>,
        config: &WorkflowConfig,
    ) -> Self {
        Self {
            repository,
            directory,
            payments,
            audit,
            notifier,
            due_window_days: config.pdc_due_window_days,
        }
    }

    /// Register a single cheque for a tenant.
    #[tracing::instrument(skip(self, request), fields(cheque_number = %request.cheque_number))]
    pub fn create(&self, request: NewPdc, actor: &str) -> Result<Pdc, PdcError> {
        self.require_tenant(&request.tenant_id)?;
        if let Some(invoice_id) = &request.invoice_id {
            self.require_invoice(invoice_id)?;
        }

        let cheque_number = normalize_cheque_number(&request.cheque_number)?;
        let amount = validate_amount(request.amount)?;
        let existing = self.existing_numbers(&request.tenant_id)?;
        if existing.contains(&cheque_number) {
            return Err(PdcError::DuplicateCheque {
                tenant_id: request.tenant_id.0,
                cheque_number,
            });
        }

        let record = new_record(
            cheque_number,
            request.bank_name,
            request.tenant_id,
            request.invoice_id,
            request.lease_id,
            amount,
            request.cheque_date,
            actor,
        );

        let mut stored = self.repository.insert_all(vec![record])?;
        let stored = stored.pop().ok_or(RepositoryError::NotFound)?;
        tracing::info!(pdc_id = %stored.id, "cheque registered");
        self.audit_transition(&stored, "PDC_CREATED", actor, None);
        Ok(stored)
    }

    /// Register a batch of cheques; nothing is written unless every entry validates.
    #[tracing::instrument(
        skip(self, batch),
        fields(tenant_id = %batch.tenant_id.0, count = batch.cheques.len())
    )]
    pub fn create_bulk(&self, batch: NewPdcBatch, actor: &str) -> Result<Vec<Pdc>, PdcError> {
        if batch.cheques.is_empty() {
            return Err(PdcError::Validation(
                "bulk registration requires at least one cheque".to_string(),
            ));
        }
        if batch.cheques.len() > MAX_BULK_CHEQUES {
            return Err(PdcError::Validation(format!(
                "bulk registration accepts at most {MAX_BULK_CHEQUES} cheques, received {}",
                batch.cheques.len()
            )));
        }

        self.require_tenant(&batch.tenant_id)?;
        if let Some(invoice_id) = &batch.invoice_id {
            self.require_invoice(invoice_id)?;
        }

        let existing = self.existing_numbers(&batch.tenant_id)?;
        let mut seen = HashSet::with_capacity(batch.cheques.len());
        let mut validated = Vec::with_capacity(batch.cheques.len());
        for cheque in batch.cheques {
            let BatchCheque {
                cheque_number,
                bank_name,
                amount,
                cheque_date,
            } = cheque;
            let cheque_number = normalize_cheque_number(&cheque_number)?;
            let amount = validate_amount(amount)?;

            if existing.contains(&cheque_number) {
                return Err(PdcError::DuplicateCheque {
                    tenant_id: batch.tenant_id.0,
                    cheque_number,
                });
            }
            if !seen.insert(cheque_number.clone()) {
                return Err(PdcError::Validation(format!(
                    "cheque number {cheque_number} appears more than once in the batch"
                )));
            }
            validated.push((cheque_number, bank_name, amount, cheque_date));
        }

        let records = validated
            .into_iter()
            .map(|(cheque_number, bank_name, amount, cheque_date)| {
                new_record(
                    cheque_number,
                    bank_name,
                    batch.tenant_id.clone(),
                    batch.invoice_id.clone(),
                    batch.lease_id.clone(),
                    amount,
                    cheque_date,
                    actor,
                )
            })
            .collect();

        let stored = self.repository.insert_all(records)?;
        tracing::info!(count = stored.len(), "cheque batch registered");
        for record in &stored {
            self.audit_transition(record, "PDC_CREATED", actor, None);
        }
        Ok(stored)
    }

    /// Present a held cheque to the bank.
    #[tracing::instrument(skip(self, request))]
    pub fn deposit(
        &self,
        id: &PdcId,
        request: DepositRequest,
        actor: &str,
    ) -> Result<Pdc, PdcError> {
        if request.bank_account_id.trim().is_empty() {
            return Err(PdcError::Validation(
                "a bank account is required to deposit a cheque".to_string(),
            ));
        }

        let mut record = self.load(id)?;
        let previous = guard(&record, PdcStatus::Deposited)?;
        record.status = PdcStatus::Deposited;
        record.deposit_date = Some(request.deposit_date);
        record.bank_account_id = Some(request.bank_account_id);
        self.commit(record, previous, "PDC_DEPOSITED", actor)
    }

    /// Mark a deposited cheque as honoured and book the linked invoice payment.
    #[tracing::instrument(skip(self))]
    pub fn clear(
        &self,
        id: &PdcId,
        cleared_date: Option<NaiveDate>,
        actor: &str,
    ) -> Result<Pdc, PdcError> {
        let mut record = self.load(id)?;
        let previous = guard(&record, PdcStatus::Cleared)?;
        let cleared_date = cleared_date.unwrap_or_else(|| Local::now().date_naive());
        record.status = PdcStatus::Cleared;
        record.cleared_date = Some(cleared_date);
        let record = self.commit(record, previous, "PDC_CLEARED", actor)?;

        if let Some(invoice_id) = record.invoice_id.clone() {
            let payment = InvoicePayment {
                invoice_id,
                amount: record.amount,
                method: PaymentMethod::Pdc,
                reference: record.cheque_number.clone(),
                date: cleared_date,
            };
            if let Err(error) = self.payments.record_payment(payment) {
                tracing::warn!(
                    pdc_id = %record.id,
                    %error,
                    "cheque cleared but invoice payment was not recorded"
                );
            }
        }

        Ok(record)
    }

    /// Record a returned cheque.
    #[tracing::instrument(skip(self, reason))]
    pub fn bounce(
        &self,
        id: &PdcId,
        reason: &str,
        bounced_date: Option<NaiveDate>,
        actor: &str,
    ) -> Result<Pdc, PdcError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(PdcError::Validation(
                "a bounce reason is required".to_string(),
            ));
        }

        let mut record = self.load(id)?;
        let previous = guard(&record, PdcStatus::Bounced)?;
        record.status = PdcStatus::Bounced;
        record.bounce = Some(Bounce {
            date: bounced_date.unwrap_or_else(|| Local::now().date_naive()),
            reason: reason.to_string(),
        });
        self.commit(record, previous, "PDC_BOUNCED", actor)
    }

    /// Swap a bounced cheque for a fresh one. Returns the new cheque.
    #[tracing::instrument(skip(self, replacement), fields(new_cheque = %replacement.cheque_number))]
    pub fn replace(
        &self,
        id: &PdcId,
        replacement: ReplacementCheque,
        actor: &str,
    ) -> Result<Pdc, PdcError> {
        let mut source = self.load(id)?;
        let previous = guard(&source, PdcStatus::Replaced)?;

        let cheque_number = normalize_cheque_number(&replacement.cheque_number)?;
        let amount = validate_amount(replacement.amount.unwrap_or(source.amount))?;
        if self
            .existing_numbers(&source.tenant_id)?
            .contains(&cheque_number)
        {
            return Err(PdcError::DuplicateCheque {
                tenant_id: source.tenant_id.0,
                cheque_number,
            });
        }

        let mut fresh = new_record(
            cheque_number,
            replacement
                .bank_name
                .unwrap_or_else(|| source.bank_name.clone()),
            source.tenant_id.clone(),
            source.invoice_id.clone(),
            source.lease_id.clone(),
            amount,
            replacement.cheque_date,
            actor,
        );
        fresh.original_pdc_id = Some(source.id.clone());

        source.status = PdcStatus::Replaced;
        source.replacement_pdc_id = Some(fresh.id.clone());
        source.updated_at = Utc::now();

        self.repository.replace(source.clone(), fresh.clone())?;
        tracing::info!(pdc_id = %source.id, replacement_id = %fresh.id, "bounced cheque replaced");
        self.audit_transition(&source, "PDC_REPLACED", actor, Some(previous));
        self.audit_transition(&fresh, "PDC_CREATED", actor, None);
        Ok(fresh)
    }

    /// Hand a held cheque back to the tenant, who pays by other means.
    #[tracing::instrument(skip(self, request))]
    pub fn withdraw(
        &self,
        id: &PdcId,
        request: WithdrawRequest,
        actor: &str,
    ) -> Result<Pdc, PdcError> {
        let reason = request.reason.trim();
        if reason.is_empty() {
            return Err(PdcError::Validation(
                "a withdrawal reason is required".to_string(),
            ));
        }

        let mut record = self.load(id)?;
        let previous = guard(&record, PdcStatus::Withdrawn)?;
        record.status = PdcStatus::Withdrawn;
        record.withdrawal = Some(Withdrawal {
            date: request.withdrawal_date,
            reason: reason.to_string(),
            new_payment_method: request.new_payment_method,
            transaction_id: request.transaction_id.filter(|id| !id.trim().is_empty()),
        });
        self.commit(record, previous, "PDC_WITHDRAWN", actor)
    }

    #[tracing::instrument(skip(self))]
    pub fn cancel(&self, id: &PdcId, actor: &str) -> Result<Pdc, PdcError> {
        let mut record = self.load(id)?;
        let previous = guard(&record, PdcStatus::Cancelled)?;
        record.status = PdcStatus::Cancelled;
        self.commit(record, previous, "PDC_CANCELLED", actor)
    }

    /// Daily job: move received cheques inside the due window to due.
    ///
    /// Each cheque is handled on its own; a failure is logged and the batch continues.
    /// Returns how many cheques moved.
    #[tracing::instrument(skip(self))]
    pub fn transition_received_to_due(&self, today: NaiveDate) -> Result<usize, PdcError> {
        let horizon = self.due_horizon(today)?;
        let candidates: Vec<Pdc> = self
            .repository
            .with_status(PdcStatus::Received)?
            .into_iter()
            .filter(|record| record.cheque_date <= horizon)
            .collect();
        tracing::debug!(candidates = candidates.len(), %horizon, "due window scan");

        let mut transitioned = 0;
        for mut record in candidates {
            let id = record.id.clone();
            let previous = record.status;
            record.status = PdcStatus::Due;
            match self.commit(record, previous, "PDC_DUE", "scheduler") {
                Ok(_) => transitioned += 1,
                Err(error) => {
                    tracing::warn!(pdc_id = %id, %error, "failed to mark cheque due");
                }
            }
        }

        tracing::info!(transitioned, "due window transition finished");
        Ok(transitioned)
    }

    /// Daily job: remind tenants whose held cheques fall inside the due window.
    /// Returns how many reminders were handed to the notifier.
    #[tracing::instrument(skip(self))]
    pub fn send_due_reminders(&self, today: NaiveDate) -> Result<usize, PdcError> {
        let reminders = self.due_reminders(today)?;
        let mut sent = 0;
        for record in reminders {
            let notification = Notification::PdcDueReminder {
                tenant_id: record.tenant_id.0.clone(),
                cheque_number: record.cheque_number.clone(),
                cheque_date: record.cheque_date,
                amount: money::display(record.amount),
            };
            match self.notifier.notify(notification) {
                Ok(()) => sent += 1,
                Err(error) => {
                    tracing::warn!(pdc_id = %record.id, %error, "due reminder not delivered");
                }
            }
        }
        Ok(sent)
    }

    /// Held cheques dated between today and the end of the due window.
    pub fn due_reminders(&self, today: NaiveDate) -> Result<Vec<Pdc>, PdcError> {
        let horizon = self.due_horizon(today)?;
        let mut due = Vec::new();
        for status in [PdcStatus::Received, PdcStatus::Due] {
            due.extend(
                self.repository
                    .with_status(status)?
                    .into_iter()
                    .filter(|record| record.cheque_date >= today && record.cheque_date <= horizon),
            );
        }
        due.sort_by(|left, right| {
            left.cheque_date
                .cmp(&right.cheque_date)
                .then_with(|| left.cheque_number.cmp(&right.cheque_number))
        });
        Ok(due)
    }

    /// Last cheque date inside the due window, or a validation error when the window
    /// runs past the calendar.
    fn due_horizon(&self, today: NaiveDate) -> Result<NaiveDate, PdcError> {
        u64::try_from(self.due_window_days)
            .ok()
            .and_then(|days| today.checked_add_days(Days::new(days)))
            .ok_or_else(|| {
                PdcError::Validation(format!(
                    "due window of {} days from {today} is out of range",
                    self.due_window_days
                ))
            })
    }

    pub fn get(&self, id: &PdcId) -> Result<Pdc, PdcError> {
        self.load(id)
    }

    /// Every cheque held for a tenant, ordered by cheque date.
    pub fn list_for_tenant(&self, tenant_id: &TenantId) -> Result<Vec<Pdc>, PdcError> {
        let mut records = self.repository.for_tenant(tenant_id)?;
        records.sort_by(|left, right| left.cheque_date.cmp(&right.cheque_date));
        Ok(records)
    }

    fn load(&self, id: &PdcId) -> Result<Pdc, PdcError> {
        self.repository
            .fetch(id)?
            .ok_or_else(|| PdcError::NotFound {
                entity: "cheque",
                id: id.0.clone(),
            })
    }

    fn require_tenant(&self, tenant_id: &TenantId) -> Result<(), PdcError> {
        match self.directory.tenant(tenant_id)? {
            Some(_) => Ok(()),
            None => Err(PdcError::NotFound {
                entity: "tenant",
                id: tenant_id.0.clone(),
            }),
        }
    }

    fn require_invoice(&self, invoice_id: &InvoiceId) -> Result<(), PdcError> {
        if self.directory.invoice_exists(invoice_id)? {
            Ok(())
        } else {
            Err(PdcError::NotFound {
                entity: "invoice",
                id: invoice_id.0.clone(),
            })
        }
    }

    fn existing_numbers(&self, tenant_id: &TenantId) -> Result<HashSet<String>, PdcError> {
        Ok(self
            .repository
            .for_tenant(tenant_id)?
            .into_iter()
            .map(|record| record.cheque_number)
            .collect())
    }

    fn commit(
        &self,
        mut record: Pdc,
        previous: PdcStatus,
        event_type: &str,
        actor: &str,
    ) -> Result<Pdc, PdcError> {
        record.updated_at = Utc::now();
        self.repository.update(record.clone())?;
        tracing::info!(
            pdc_id = %record.id,
            from = %previous,
            to = %record.status,
            "cheque status changed"
        );
        self.audit_transition(&record, event_type, actor, Some(previous));
        Ok(record)
    }

    fn audit_transition(
        &self,
        record: &Pdc,
        event_type: &str,
        actor: &str,
        previous: Option<PdcStatus>,
    ) {
        let summary = json!({
            "cheque_number": record.cheque_number,
            "tenant_id": record.tenant_id.0,
            "amount": money::display(record.amount),
            "from": previous.map(PdcStatus::label),
            "to": record.status.label(),
        });
        events::audit(
            self.audit.as_ref(),
            AuditEvent::new(event_type, actor, record.id.0.clone(), summary),
        );
    }
}

fn guard(record: &Pdc, requested: PdcStatus) -> Result<PdcStatus, PdcError> {
    if record.status.can_transition_to(requested) {
        Ok(record.status)
    } else {
        Err(PdcError::InvalidTransition {
            cheque_number: record.cheque_number.clone(),
            current: record.status,
            requested,
        })
    }
}

fn normalize_cheque_number(raw: &str) -> Result<String, PdcError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PdcError::Validation(
            "cheque number must not be blank".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

fn validate_amount(amount: Decimal) -> Result<Decimal, PdcError> {
    let amount = money::round(amount);
    if amount <= Decimal::ZERO {
        return Err(PdcError::Validation(format!(
            "cheque amount must be positive, received {}",
            money::display(amount)
        )));
    }
    Ok(amount)
}

#[allow(clippy::too_many_arguments)]
fn new_record(
    cheque_number: String,
    bank_name: String,
    tenant_id: TenantId,
    invoice_id: Option<InvoiceId>,
    lease_id: Option<String>,
    amount: Decimal,
    cheque_date: NaiveDate,
    actor: &str,
) -> Pdc {
    let now = Utc::now();
    Pdc {
        id: next_pdc_id(),
        cheque_number,
        bank_name: bank_name.trim().to_string(),
        tenant_id,
        invoice_id,
        lease_id,
        amount,
        cheque_date,
        status: PdcStatus::Received,
        deposit_date: None,
        bank_account_id: None,
        cleared_date: None,
        bounce: None,
        withdrawal: None,
        original_pdc_id: None,
        replacement_pdc_id: None,
        created_by: actor.to_string(),
        created_at: now,
        updated_at: now,
    }
}

/// Error raised by the cheque lifecycle service.
#[derive(Debug, thiserror::Error)]
pub enum PdcError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("{0}")]
    Validation(String),
    #[error("cheque {cheque_number} is {current} and cannot move to {requested}")]
    InvalidTransition {
        cheque_number: String,
        current: PdcStatus,
        requested: PdcStatus,
    },
    #[error("cheque number {cheque_number} already exists for tenant {tenant_id}")]
    DuplicateCheque {
        tenant_id: String,
        cheque_number: String,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}
