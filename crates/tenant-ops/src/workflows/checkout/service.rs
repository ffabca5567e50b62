use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use chrono::{Datelike, Local, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use serde_json::json;

use super::domain::{
    AttachmentKind, CheckoutId, CheckoutRecord, CheckoutReason, CheckoutStatus, CompleteCheckout,
    DepositCalculation, DepositRefund, FileUpload, Inspection, InspectionUpdate,
    InitiateCheckout, ProcessRefund, RefundPayout, RefundStatus, TenantCheckout,
};
use super::repository::{CheckoutRepository, FileStorage, StorageError};
use super::settlement::{self, Settlement};
use crate::config::WorkflowConfig;
use crate::workflows::directory::{
    DirectoryError, TenantDirectory, TenantId, TenantSnapshot, TenantStatus, UnitStatus,
};
use crate::workflows::events::{self, AuditEvent, AuditLogger, Notification, Notifier};
use crate::workflows::money;
use crate::workflows::store::RepositoryError;

/// Lifetime of presigned links handed out for stored attachments.
pub const PRESIGN_TTL_SECS: u64 = 15 * 60;

static CHECKOUT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_checkout_id() -> CheckoutId {
    let id = CHECKOUT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    CheckoutId(format!("chk-{id:06}"))
}

fn iban_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^AE[0-9]{2}[A-Z0-9]{19}$").expect("IBAN pattern compiles")
    })
}

/// Normalise an IBAN as typed by staff and check it against the UAE layout.
pub fn normalize_uae_iban(raw: &str) -> Option<String> {
    let compact: String = raw
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase();
    iban_pattern().is_match(&compact).then_some(compact)
}

/// Service orchestrating the tenant move-out and deposit settlement.
pub struct CheckoutWorkflowService {
    repository: Arc<dyn CheckoutRepository>,
    directory: Arc<dyn TenantDirectory>,
    storage: Arc<dyn FileStorage>,
    audit: Arc<dyn AuditLogger>,
    notifier: Arc<dyn Notifier>,
    approval_threshold: Decimal,
}

impl CheckoutWorkflowService {
    pub fn new(
        repository: Arc<dyn CheckoutRepository>,
        directory: Arc<dyn TenantDirectory>,
        storage: Arc<dyn FileStorage>,
        audit: Arc<dyn AuditLogger>,
        notifier: Arc<dyn Notifier>,
        config: &WorkflowConfig,
    ) -> Self {
        Self {
            repository,
            directory,
            storage,
            audit,
            notifier,
            approval_threshold: config.refund_approval_threshold,
        }
    }

    pub fn approval_threshold(&self) -> Decimal {
        self.approval_threshold
    }

    /// Open a move-out for a tenant together with its deposit refund.
    #[tracing::instrument(skip(self, request), fields(tenant_id = %request.tenant_id.0))]
    pub fn initiate_checkout(
        &self,
        request: InitiateCheckout,
        actor: &str,
    ) -> Result<CheckoutRecord, CheckoutError> {
        let tenant = self.require_tenant(&request.tenant_id)?;
        if !tenant.status.can_start_checkout() {
            return Err(CheckoutError::Validation(format!(
                "tenant {} is {} and cannot start a checkout",
                tenant.tenant_id.0,
                tenant.status.label()
            )));
        }

        if let Some(active) = self
            .repository
            .for_tenant(&tenant.tenant_id)?
            .into_iter()
            .find(|record| record.checkout.status.is_editable())
        {
            return Err(CheckoutError::Conflict(format!(
                "tenant {} already has active checkout {}",
                tenant.tenant_id.0, active.checkout.checkout_number
            )));
        }

        if request.expected_move_out_date < request.notice_date {
            return Err(CheckoutError::Validation(format!(
                "move-out date {} is before notice date {}",
                request.expected_move_out_date, request.notice_date
            )));
        }

        let reason_notes = request
            .reason_notes
            .map(|notes| notes.trim().to_string())
            .filter(|notes| !notes.is_empty());
        if request.reason == CheckoutReason::Other && reason_notes.is_none() {
            return Err(CheckoutError::Validation(
                "reason notes are required when the checkout reason is OTHER".to_string(),
            ));
        }

        let id = next_checkout_id();
        let sequence = self.repository.count()? + 1;
        let now = Utc::now();
        let original_deposit = money::round(tenant.security_deposit);

        let checkout = TenantCheckout {
            id: id.clone(),
            checkout_number: format!("CHK-{}-{sequence:04}", now.year()),
            tenant_id: tenant.tenant_id.clone(),
            property_id: tenant.property_id.clone(),
            unit_id: tenant.unit_id.clone(),
            notice_date: request.notice_date,
            expected_move_out_date: request.expected_move_out_date,
            actual_move_out_date: None,
            reason: request.reason,
            reason_notes,
            status: CheckoutStatus::Pending,
            inspection: Inspection::default(),
            settlement_type: None,
            settlement_notes: None,
            document_keys: Vec::new(),
            cancellation_reason: None,
            completed_by: None,
            completed_at: None,
            created_by: actor.to_string(),
            created_at: now,
            updated_at: now,
        };
        let refund = DepositRefund {
            checkout_id: id,
            original_deposit,
            deductions: Vec::new(),
            total_deductions: Decimal::ZERO,
            net_refund: original_deposit,
            amount_owed_by_tenant: None,
            refund_status: RefundStatus::Calculated,
            payout: None,
            refund_reference: None,
            refund_date: None,
            approved_by: None,
            approved_at: None,
            processed_at: None,
            transaction_id: None,
        };

        let record = self.repository.insert(CheckoutRecord { checkout, refund })?;
        tracing::info!(
            checkout_id = %record.checkout.id,
            checkout_number = %record.checkout.checkout_number,
            "checkout initiated"
        );
        self.audit_transition(&record, "CHECKOUT_INITIATED", actor, None);
        events::notify(
            self.notifier.as_ref(),
            Notification::CheckoutInitiated {
                tenant_id: record.checkout.tenant_id.0.clone(),
                checkout_number: record.checkout.checkout_number.clone(),
                expected_move_out_date: record.checkout.expected_move_out_date,
            },
        );
        Ok(record)
    }

    /// Store inspection details and raise the damage deduction from repair costs.
    #[tracing::instrument(skip(self, update))]
    pub fn save_inspection(
        &self,
        id: &CheckoutId,
        update: InspectionUpdate,
        actor: &str,
    ) -> Result<CheckoutRecord, CheckoutError> {
        let mut record = self.load(id)?;
        guard_settlement_open(&record, "save inspection")?;
        let previous = record.checkout.status;

        let inspection = &mut record.checkout.inspection;
        if let Some(date) = update.inspection_date {
            inspection.inspection_date = Some(date);
        }
        if let Some(slot) = update.time_slot {
            inspection.time_slot = Some(slot);
        }
        if let Some(inspector) = update.inspector_id {
            inspection.inspector_id = Some(inspector);
        }
        if let Some(condition) = update.overall_condition {
            inspection.overall_condition = Some(condition);
        }
        if let Some(notes) = update.notes {
            inspection.notes = Some(notes);
        }
        let checklist_saved = update.checklist.is_some();
        if let Some(checklist) = update.checklist {
            inspection.checklist = checklist;
        }

        if record.checkout.status == CheckoutStatus::Pending {
            record.checkout.status = CheckoutStatus::InspectionScheduled;
        }

        if checklist_saved && record.checkout.inspection.has_checklist() {
            let repairs = settlement::repair_total(&record.checkout.inspection.checklist);
            record.refund.deductions.retain(|line| !line.is_auto_damage());
            if repairs > Decimal::ZERO {
                record
                    .refund
                    .deductions
                    .push(settlement::damage_deduction(repairs));
            }

            if record.checkout.status == CheckoutStatus::InspectionScheduled {
                record.checkout.status = CheckoutStatus::InspectionComplete;
            }
            let outcome = self.settle(&record.refund);
            apply_settlement(&mut record, outcome);
        }

        let record = self.commit(record, previous, "INSPECTION_SAVED", actor)?;
        if previous == CheckoutStatus::Pending {
            events::notify(
                self.notifier.as_ref(),
                Notification::InspectionScheduled {
                    tenant_id: record.checkout.tenant_id.0.clone(),
                    checkout_number: record.checkout.checkout_number.clone(),
                    inspection_date: record.checkout.inspection.inspection_date,
                    time_slot: record.checkout.inspection.time_slot.clone(),
                },
            );
        }
        Ok(record)
    }

    /// Replace every deduction with the supplied list and recompute the refund.
    #[tracing::instrument(skip(self, calculation), fields(lines = calculation.deductions.len()))]
    pub fn save_deposit_calculation(
        &self,
        id: &CheckoutId,
        calculation: DepositCalculation,
        actor: &str,
    ) -> Result<CheckoutRecord, CheckoutError> {
        let mut record = self.load(id)?;
        guard_settlement_open(&record, "save deposit calculation")?;
        let previous = record.checkout.status;

        let mut deductions = Vec::with_capacity(calculation.deductions.len());
        for mut line in calculation.deductions {
            if line.amount.is_sign_negative() {
                return Err(CheckoutError::Validation(format!(
                    "deduction '{}' has a negative amount",
                    line.description
                )));
            }
            line.amount = money::round(line.amount);
            deductions.push(line);
        }

        record.refund.deductions = deductions;
        record.checkout.settlement_type = calculation.settlement_type;
        record.checkout.settlement_notes = calculation.settlement_notes;
        let outcome = self.settle(&record.refund);
        apply_settlement(&mut record, outcome);
        record.checkout.status = if outcome.requires_approval {
            CheckoutStatus::PendingApproval
        } else {
            CheckoutStatus::DepositCalculated
        };

        self.commit(record, previous, "DEPOSIT_CALCULATED", actor)
    }

    /// Pay out the refund by the chosen method.
    #[tracing::instrument(skip(self, request))]
    pub fn process_refund(
        &self,
        id: &CheckoutId,
        request: ProcessRefund,
        actor: &str,
    ) -> Result<CheckoutRecord, CheckoutError> {
        let mut record = self.load(id)?;
        guard_editable(&record, "process refund")?;
        if !matches!(
            record.refund.refund_status,
            RefundStatus::Calculated | RefundStatus::Approved
        ) {
            return Err(CheckoutError::InvalidState {
                checkout_number: record.checkout.checkout_number,
                current: record.refund.refund_status.label(),
                operation: "process refund",
            });
        }
        self.guard_approved(&record, "process refund")?;

        let payout = validate_payout(request.payout)?;
        let previous = record.checkout.status;

        record.refund.payout = Some(payout);
        record.refund.refund_reference = request
            .refund_reference
            .filter(|reference| !reference.trim().is_empty());
        record.refund.refund_date = Some(
            request
                .refund_date
                .unwrap_or_else(|| Local::now().date_naive()),
        );
        record.refund.transaction_id = request.transaction_id;
        record.refund.processed_at = Some(Utc::now());
        record.refund.refund_status = RefundStatus::Processing;
        record.checkout.status = CheckoutStatus::RefundProcessing;

        self.commit(record, previous, "REFUND_PROCESSING", actor)
    }

    /// Second-person sign-off for refunds above the threshold.
    #[tracing::instrument(skip(self))]
    pub fn approve_refund(
        &self,
        id: &CheckoutId,
        approver: &str,
    ) -> Result<CheckoutRecord, CheckoutError> {
        let approver = approver.trim();
        if approver.is_empty() {
            return Err(CheckoutError::Validation(
                "an approver is required".to_string(),
            ));
        }

        let mut record = self.load(id)?;
        guard_editable(&record, "approve refund")?;
        if record.refund.refund_status != RefundStatus::PendingApproval {
            return Err(CheckoutError::InvalidState {
                checkout_number: record.checkout.checkout_number,
                current: record.refund.refund_status.label(),
                operation: "approve refund",
            });
        }

        let previous = record.checkout.status;
        record.refund.approved_by = Some(approver.to_string());
        record.refund.approved_at = Some(Utc::now());
        record.refund.refund_status = RefundStatus::Approved;
        record.checkout.status = CheckoutStatus::Approved;

        self.commit(record, previous, "REFUND_APPROVED", approver)
    }

    /// Close the move-out: terminate the tenancy, free the unit, and finalise the refund.
    #[tracing::instrument(skip(self, request))]
    pub fn complete_checkout(
        &self,
        id: &CheckoutId,
        request: CompleteCheckout,
        actor: &str,
    ) -> Result<CheckoutRecord, CheckoutError> {
        if !request.finalize_acknowledged {
            return Err(CheckoutError::Validation(
                "checkout completion must be explicitly acknowledged".to_string(),
            ));
        }

        let mut record = self.load(id)?;
        guard_editable(&record, "complete checkout")?;
        self.guard_approved(&record, "complete checkout")?;
        let tenant = self.require_tenant(&record.checkout.tenant_id)?;
        let previous = record.checkout.status;

        self.directory
            .set_tenant_status(&tenant.tenant_id, TenantStatus::Terminated)?;
        self.directory
            .set_unit_status(&record.checkout.unit_id, UnitStatus::Available)?;
        if let Some(user_id) = tenant.user_id.as_deref() {
            if let Err(error) = self.directory.deactivate_user(user_id) {
                tracing::warn!(
                    checkout_id = %record.checkout.id,
                    user_id,
                    %error,
                    "tenant user account left active"
                );
            }
        }

        let now = Utc::now();
        record.checkout.status = CheckoutStatus::Completed;
        record.checkout.completed_by = Some(actor.to_string());
        record.checkout.completed_at = Some(now);
        record.checkout.actual_move_out_date = request
            .actual_move_out_date
            .or(record.checkout.actual_move_out_date)
            .or(Some(record.checkout.expected_move_out_date));
        record.refund.refund_status = RefundStatus::Completed;

        let record = self.commit(record, previous, "CHECKOUT_COMPLETED", actor)?;
        events::notify(
            self.notifier.as_ref(),
            Notification::CheckoutCompleted {
                tenant_id: record.checkout.tenant_id.0.clone(),
                checkout_number: record.checkout.checkout_number.clone(),
                net_refund: money::display(record.refund.net_refund),
                amount_owed: record.refund.amount_owed_by_tenant.map(money::display),
            },
        );
        Ok(record)
    }

    /// Abandon a move-out before any money has left.
    #[tracing::instrument(skip(self, reason))]
    pub fn cancel_checkout(
        &self,
        id: &CheckoutId,
        reason: &str,
        actor: &str,
    ) -> Result<CheckoutRecord, CheckoutError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(CheckoutError::Validation(
                "a cancellation reason is required".to_string(),
            ));
        }

        let mut record = self.load(id)?;
        guard_settlement_open(&record, "cancel checkout")?;
        let previous = record.checkout.status;
        record.checkout.status = CheckoutStatus::Cancelled;
        record.checkout.cancellation_reason = Some(reason.to_string());
        self.commit(record, previous, "CHECKOUT_CANCELLED", actor)
    }

    /// Upload a file and remember its storage key on the checkout.
    #[tracing::instrument(skip(self, upload), fields(file_name = %upload.file_name))]
    pub fn attach_file(
        &self,
        id: &CheckoutId,
        kind: AttachmentKind,
        upload: FileUpload,
        actor: &str,
    ) -> Result<String, CheckoutError> {
        if upload.bytes.is_empty() {
            return Err(CheckoutError::Validation(format!(
                "file {} is empty",
                upload.file_name
            )));
        }

        let mut record = self.load(id)?;
        guard_editable(&record, "attach file")?;
        let previous = record.checkout.status;

        let folder = format!(
            "checkouts/{}/{}",
            record.checkout.checkout_number,
            kind.folder()
        );
        let key = self.storage.upload(
            &folder,
            &upload.file_name,
            &upload.content_type,
            upload.bytes,
        )?;

        match kind {
            AttachmentKind::InspectionPhoto => {
                record.checkout.inspection.photo_keys.push(key.clone())
            }
            AttachmentKind::Document => record.checkout.document_keys.push(key.clone()),
        }
        self.commit(record, previous, "ATTACHMENT_ADDED", actor)?;
        Ok(key)
    }

    /// Delete a stored file and drop its key from the checkout.
    #[tracing::instrument(skip(self))]
    pub fn remove_attachment(
        &self,
        id: &CheckoutId,
        key: &str,
        actor: &str,
    ) -> Result<CheckoutRecord, CheckoutError> {
        let mut record = self.load(id)?;
        guard_editable(&record, "remove attachment")?;
        require_attachment(&record, key)?;
        let previous = record.checkout.status;

        match self.storage.delete(key) {
            Ok(()) | Err(StorageError::NotFound(_)) => {}
            Err(error) => return Err(error.into()),
        }

        record.checkout.inspection.photo_keys.retain(|stored| stored != key);
        record.checkout.document_keys.retain(|stored| stored != key);
        self.commit(record, previous, "ATTACHMENT_REMOVED", actor)
    }

    /// Short-lived download link for a file stored on the checkout.
    pub fn attachment_url(&self, id: &CheckoutId, key: &str) -> Result<String, CheckoutError> {
        let record = self.load(id)?;
        require_attachment(&record, key)?;
        Ok(self.storage.presign(key, PRESIGN_TTL_SECS)?)
    }

    pub fn get(&self, id: &CheckoutId) -> Result<CheckoutRecord, CheckoutError> {
        self.load(id)
    }

    pub fn list_for_tenant(
        &self,
        tenant_id: &TenantId,
    ) -> Result<Vec<CheckoutRecord>, CheckoutError> {
        let mut records = self.repository.for_tenant(tenant_id)?;
        records.sort_by(|left, right| left.checkout.created_at.cmp(&right.checkout.created_at));
        Ok(records)
    }

    /// Money above the threshold never leaves without a second sign-off. A refund still
    /// CALCULATED from initiation is checked against the threshold as well.
    fn guard_approved(
        &self,
        record: &CheckoutRecord,
        operation: &'static str,
    ) -> Result<(), CheckoutError> {
        let awaiting_approval = match record.refund.refund_status {
            RefundStatus::PendingApproval => true,
            RefundStatus::Calculated => self.settle(&record.refund).requires_approval,
            RefundStatus::Approved | RefundStatus::Processing | RefundStatus::Completed => false,
        };
        if awaiting_approval {
            return Err(CheckoutError::InvalidState {
                checkout_number: record.checkout.checkout_number.clone(),
                current: RefundStatus::PendingApproval.label(),
                operation,
            });
        }
        Ok(())
    }

    fn settle(&self, refund: &DepositRefund) -> Settlement {
        settlement::settle(
            refund.original_deposit,
            &refund.deductions,
            self.approval_threshold,
        )
    }

    fn load(&self, id: &CheckoutId) -> Result<CheckoutRecord, CheckoutError> {
        self.repository
            .fetch(id)?
            .ok_or_else(|| CheckoutError::NotFound {
                entity: "checkout",
                id: id.0.clone(),
            })
    }

    fn require_tenant(&self, tenant_id: &TenantId) -> Result<TenantSnapshot, CheckoutError> {
        self.directory
            .tenant(tenant_id)?
            .ok_or_else(|| CheckoutError::NotFound {
                entity: "tenant",
                id: tenant_id.0.clone(),
            })
    }

    fn commit(
        &self,
        mut record: CheckoutRecord,
        previous: CheckoutStatus,
        event_type: &str,
        actor: &str,
    ) -> Result<CheckoutRecord, CheckoutError> {
        record.checkout.updated_at = Utc::now();
        self.repository.update(record.clone())?;
        if previous != record.checkout.status {
            tracing::info!(
                checkout_id = %record.checkout.id,
                from = %previous,
                to = %record.checkout.status,
                "checkout status changed"
            );
        }
        self.audit_transition(&record, event_type, actor, Some(previous));
        Ok(record)
    }

    fn audit_transition(
        &self,
        record: &CheckoutRecord,
        event_type: &str,
        actor: &str,
        previous: Option<CheckoutStatus>,
    ) {
        let summary = json!({
            "checkout_number": record.checkout.checkout_number,
            "tenant_id": record.checkout.tenant_id.0,
            "from": previous.map(CheckoutStatus::label),
            "to": record.checkout.status.label(),
            "refund_status": record.refund.refund_status.label(),
            "total_deductions": money::display(record.refund.total_deductions),
            "net_refund": money::display(record.refund.net_refund),
            "amount_owed": record.refund.amount_owed_by_tenant.map(money::display),
        });
        events::audit(
            self.audit.as_ref(),
            AuditEvent::new(event_type, actor, record.checkout.id.0.clone(), summary),
        );
    }
}

/// Write a settlement onto the refund and re-derive the approval step.
///
/// Changing the figures after calculation re-opens approval, so an earlier sign-off
/// does not carry over to different amounts.
fn apply_settlement(record: &mut CheckoutRecord, outcome: Settlement) {
    let refund = &mut record.refund;
    refund.total_deductions = outcome.total_deductions;
    refund.net_refund = outcome.net_refund;
    refund.amount_owed_by_tenant = outcome.amount_owed_by_tenant;
    refund.refund_status = if outcome.requires_approval {
        RefundStatus::PendingApproval
    } else {
        RefundStatus::Calculated
    };
    refund.approved_by = None;
    refund.approved_at = None;

    if matches!(
        record.checkout.status,
        CheckoutStatus::DepositCalculated
            | CheckoutStatus::PendingApproval
            | CheckoutStatus::Approved
    ) {
        record.checkout.status = if outcome.requires_approval {
            CheckoutStatus::PendingApproval
        } else {
            CheckoutStatus::DepositCalculated
        };
    }
}

fn guard_editable(record: &CheckoutRecord, operation: &'static str) -> Result<(), CheckoutError> {
    if record.checkout.status.is_editable() {
        Ok(())
    } else {
        Err(CheckoutError::InvalidState {
            checkout_number: record.checkout.checkout_number.clone(),
            current: record.checkout.status.label(),
            operation,
        })
    }
}

/// Deductions are frozen once the refund is being paid out.
fn guard_settlement_open(
    record: &CheckoutRecord,
    operation: &'static str,
) -> Result<(), CheckoutError> {
    guard_editable(record, operation)?;
    if matches!(
        record.refund.refund_status,
        RefundStatus::Processing | RefundStatus::Completed
    ) {
        return Err(CheckoutError::InvalidState {
            checkout_number: record.checkout.checkout_number.clone(),
            current: record.refund.refund_status.label(),
            operation,
        });
    }
    Ok(())
}

fn require_attachment(record: &CheckoutRecord, key: &str) -> Result<(), CheckoutError> {
    let known = record
        .checkout
        .inspection
        .photo_keys
        .iter()
        .chain(record.checkout.document_keys.iter())
        .any(|stored| stored == key);
    if known {
        Ok(())
    } else {
        Err(CheckoutError::NotFound {
            entity: "attachment",
            id: key.to_string(),
        })
    }
}

fn require_text(value: &str, field: &str, method: &str) -> Result<String, CheckoutError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(CheckoutError::Validation(format!(
            "{field} is required for {method} refunds"
        )))
    } else {
        Ok(trimmed.to_string())
    }
}

fn validate_payout(payout: RefundPayout) -> Result<RefundPayout, CheckoutError> {
    match payout {
        RefundPayout::BankTransfer {
            bank_name,
            account_holder_name,
            iban,
        } => {
            let bank_name = require_text(&bank_name, "bank name", "bank transfer")?;
            let account_holder_name =
                require_text(&account_holder_name, "account holder name", "bank transfer")?;
            let iban = normalize_uae_iban(&iban).ok_or_else(|| {
                CheckoutError::Validation(format!(
                    "IBAN '{}' is not a valid UAE IBAN (AE + 2 check digits + 19 characters)",
                    iban.trim()
                ))
            })?;
            Ok(RefundPayout::BankTransfer {
                bank_name,
                account_holder_name,
                iban,
            })
        }
        RefundPayout::Cheque {
            cheque_number,
            cheque_date,
        } => Ok(RefundPayout::Cheque {
            cheque_number: require_text(&cheque_number, "cheque number", "cheque")?,
            cheque_date,
        }),
        RefundPayout::Cash { acknowledged } => {
            if acknowledged {
                Ok(RefundPayout::Cash { acknowledged })
            } else {
                Err(CheckoutError::Validation(
                    "cash refunds must be acknowledged by the tenant".to_string(),
                ))
            }
        }
    }
}

/// Error raised by the checkout workflow service.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("{0}")]
    Validation(String),
    #[error("cannot {operation} for checkout {checkout_number} while it is {current}")]
    InvalidState {
        checkout_number: String,
        current: &'static str,
        operation: &'static str,
    },
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
