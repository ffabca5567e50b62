use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::workflows::directory::{PropertyId, TenantId, UnitId};

/// Identifier wrapper for move-out records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CheckoutId(pub String);

impl fmt::Display for CheckoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Move-out workflow status.
///
/// ```text
/// Pending ─► InspectionScheduled ─► InspectionComplete ─► DepositCalculated
///
/// DepositCalculated ─┬──────────────────────────────────┬─► RefundProcessing ─► Completed
///                    └─► PendingApproval ─► Approved ───┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckoutStatus {
    Pending,
    InspectionScheduled,
    InspectionComplete,
    DepositCalculated,
    PendingApproval,
    Approved,
    RefundProcessing,
    Completed,
    Cancelled,
}

impl CheckoutStatus {
    pub const fn label(self) -> &'static str {
        match self {
            CheckoutStatus::Pending => "PENDING",
            CheckoutStatus::InspectionScheduled => "INSPECTION_SCHEDULED",
            CheckoutStatus::InspectionComplete => "INSPECTION_COMPLETE",
            CheckoutStatus::DepositCalculated => "DEPOSIT_CALCULATED",
            CheckoutStatus::PendingApproval => "PENDING_APPROVAL",
            CheckoutStatus::Approved => "APPROVED",
            CheckoutStatus::RefundProcessing => "REFUND_PROCESSING",
            CheckoutStatus::Completed => "COMPLETED",
            CheckoutStatus::Cancelled => "CANCELLED",
        }
    }

    /// Inspection and deduction data may still change.
    pub const fn is_editable(self) -> bool {
        !matches!(self, CheckoutStatus::Completed | CheckoutStatus::Cancelled)
    }
}

impl fmt::Display for CheckoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckoutReason {
    LeaseEnd,
    EarlyTermination,
    Relocation,
    Purchase,
    Eviction,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemCondition {
    Good,
    Fair,
    Damaged,
    Missing,
    NotApplicable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallCondition {
    Excellent,
    Good,
    Fair,
    Poor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionItem {
    pub name: String,
    pub condition: ItemCondition,
    #[serde(default)]
    pub repair_cost: Option<Decimal>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// One room or area of the move-out checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionSection {
    pub name: String,
    pub items: Vec<InspectionItem>,
}

/// Inspection data captured on the checkout record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inspection {
    pub inspection_date: Option<NaiveDate>,
    pub time_slot: Option<String>,
    pub inspector_id: Option<String>,
    pub checklist: Vec<InspectionSection>,
    pub overall_condition: Option<OverallCondition>,
    pub notes: Option<String>,
    pub photo_keys: Vec<String>,
}

impl Inspection {
    pub fn has_checklist(&self) -> bool {
        self.checklist.iter().any(|section| !section.items.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeductionType {
    DamageRepairs,
    Cleaning,
    UnpaidRent,
    UnpaidUtilities,
    KeyReplacement,
    EarlyTermination,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deduction {
    pub deduction_type: DeductionType,
    pub description: String,
    pub amount: Decimal,
    #[serde(default)]
    pub auto_calculated: bool,
}

impl Deduction {
    /// The synthetic line produced from inspection repair costs.
    pub fn is_auto_damage(&self) -> bool {
        self.auto_calculated && self.deduction_type == DeductionType::DamageRepairs
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefundMethod {
    BankTransfer,
    Cheque,
    Cash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefundStatus {
    Calculated,
    PendingApproval,
    Approved,
    Processing,
    Completed,
}

impl RefundStatus {
    pub const fn label(self) -> &'static str {
        match self {
            RefundStatus::Calculated => "CALCULATED",
            RefundStatus::PendingApproval => "PENDING_APPROVAL",
            RefundStatus::Approved => "APPROVED",
            RefundStatus::Processing => "PROCESSING",
            RefundStatus::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for RefundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where and how the refund was paid out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefundPayout {
    BankTransfer {
        bank_name: String,
        account_holder_name: String,
        iban: String,
    },
    Cheque {
        cheque_number: String,
        cheque_date: NaiveDate,
    },
    Cash {
        acknowledged: bool,
    },
}

impl RefundPayout {
    pub const fn method(&self) -> RefundMethod {
        match self {
            RefundPayout::BankTransfer { .. } => RefundMethod::BankTransfer,
            RefundPayout::Cheque { .. } => RefundMethod::Cheque,
            RefundPayout::Cash { .. } => RefundMethod::Cash,
        }
    }
}

/// Security deposit settlement, one per checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositRefund {
    pub checkout_id: CheckoutId,
    pub original_deposit: Decimal,
    pub deductions: Vec<Deduction>,
    pub total_deductions: Decimal,
    pub net_refund: Decimal,
    pub amount_owed_by_tenant: Option<Decimal>,
    pub refund_status: RefundStatus,
    pub payout: Option<RefundPayout>,
    pub refund_reference: Option<String>,
    pub refund_date: Option<NaiveDate>,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub processed_at: Option<DateTime<Utc>>,
    pub transaction_id: Option<String>,
}

impl DepositRefund {
    pub fn method(&self) -> Option<RefundMethod> {
        self.payout.as_ref().map(RefundPayout::method)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantCheckout {
    pub id: CheckoutId,
    pub checkout_number: String,
    pub tenant_id: TenantId,
    pub property_id: PropertyId,
    pub unit_id: UnitId,
    pub notice_date: NaiveDate,
    pub expected_move_out_date: NaiveDate,
    pub actual_move_out_date: Option<NaiveDate>,
    pub reason: CheckoutReason,
    pub reason_notes: Option<String>,
    pub status: CheckoutStatus,
    pub inspection: Inspection,
    pub settlement_type: Option<String>,
    pub settlement_notes: Option<String>,
    pub document_keys: Vec<String>,
    pub cancellation_reason: Option<String>,
    pub completed_by: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Checkout plus its refund, the unit the store reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRecord {
    pub checkout: TenantCheckout,
    pub refund: DepositRefund,
}

impl CheckoutRecord {
    pub fn status_view(&self) -> CheckoutView {
        CheckoutView {
            checkout_id: self.checkout.id.clone(),
            checkout_number: self.checkout.checkout_number.clone(),
            tenant_id: self.checkout.tenant_id.clone(),
            status: self.checkout.status.label(),
            refund_status: self.refund.refund_status.label(),
            original_deposit: self.refund.original_deposit,
            total_deductions: self.refund.total_deductions,
            net_refund: self.refund.net_refund,
            amount_owed_by_tenant: self.refund.amount_owed_by_tenant,
        }
    }
}

/// Sanitized representation exposed by routes.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutView {
    pub checkout_id: CheckoutId,
    pub checkout_number: String,
    pub tenant_id: TenantId,
    pub status: &'static str,
    pub refund_status: &'static str,
    pub original_deposit: Decimal,
    pub total_deductions: Decimal,
    pub net_refund: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_owed_by_tenant: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitiateCheckout {
    pub tenant_id: TenantId,
    pub notice_date: NaiveDate,
    pub expected_move_out_date: NaiveDate,
    pub reason: CheckoutReason,
    #[serde(default)]
    pub reason_notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionUpdate {
    #[serde(default)]
    pub inspection_date: Option<NaiveDate>,
    #[serde(default)]
    pub time_slot: Option<String>,
    #[serde(default)]
    pub inspector_id: Option<String>,
    #[serde(default)]
    pub checklist: Option<Vec<InspectionSection>>,
    #[serde(default)]
    pub overall_condition: Option<OverallCondition>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositCalculation {
    pub deductions: Vec<Deduction>,
    #[serde(default)]
    pub settlement_type: Option<String>,
    #[serde(default)]
    pub settlement_notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRefund {
    pub payout: RefundPayout,
    #[serde(default)]
    pub refund_reference: Option<String>,
    #[serde(default)]
    pub refund_date: Option<NaiveDate>,
    #[serde(default)]
    pub transaction_id: Option<String>,
}

/// Which list on the checkout an uploaded file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    InspectionPhoto,
    Document,
}

impl AttachmentKind {
    pub const fn folder(self) -> &'static str {
        match self {
            AttachmentKind::InspectionPhoto => "inspection",
            AttachmentKind::Document => "documents",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteCheckout {
    pub finalize_acknowledged: bool,
    #[serde(default)]
    pub actual_move_out_date: Option<NaiveDate>,
}
