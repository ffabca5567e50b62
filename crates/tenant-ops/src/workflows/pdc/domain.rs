use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::workflows::directory::{InvoiceId, TenantId};

/// Identifier wrapper for stored cheques.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PdcId(pub String);

impl fmt::Display for PdcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cheque lifecycle.
///
/// ```text
/// Received ──► Due ──► Deposited ──┬──► Cleared
///    │          │                  └──► Bounced ──► Replaced
///    └────┬─────┘
///         ├──► Withdrawn
///         └──► Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PdcStatus {
    Received,
    Due,
    Deposited,
    Cleared,
    Bounced,
    Withdrawn,
    Cancelled,
    Replaced,
}

impl PdcStatus {
    pub const fn label(self) -> &'static str {
        match self {
            PdcStatus::Received => "RECEIVED",
            PdcStatus::Due => "DUE",
            PdcStatus::Deposited => "DEPOSITED",
            PdcStatus::Cleared => "CLEARED",
            PdcStatus::Bounced => "BOUNCED",
            PdcStatus::Withdrawn => "WITHDRAWN",
            PdcStatus::Cancelled => "CANCELLED",
            PdcStatus::Replaced => "REPLACED",
        }
    }

    /// No status change is possible from here.
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            PdcStatus::Cleared | PdcStatus::Withdrawn | PdcStatus::Cancelled | PdcStatus::Replaced
        )
    }

    /// Cheque is still in the landlord's hands and has not been presented.
    pub const fn is_held(self) -> bool {
        matches!(self, PdcStatus::Received | PdcStatus::Due)
    }

    /// Whether `self -> next` is an edge of the lifecycle graph.
    pub const fn can_transition_to(self, next: PdcStatus) -> bool {
        match next {
            PdcStatus::Due => matches!(self, PdcStatus::Received),
            PdcStatus::Deposited | PdcStatus::Withdrawn | PdcStatus::Cancelled => self.is_held(),
            PdcStatus::Cleared | PdcStatus::Bounced => matches!(self, PdcStatus::Deposited),
            PdcStatus::Replaced => matches!(self, PdcStatus::Bounced),
            PdcStatus::Received => false,
        }
    }
}

impl fmt::Display for PdcStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a tenant settles the amount after pulling a cheque back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    BankTransfer,
    Card,
    NewCheque,
    Pdc,
}

impl PaymentMethod {
    pub const fn label(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::BankTransfer => "BANK_TRANSFER",
            PaymentMethod::Card => "CARD",
            PaymentMethod::NewCheque => "NEW_CHEQUE",
            PaymentMethod::Pdc => "PDC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawal {
    pub date: NaiveDate,
    pub reason: String,
    pub new_payment_method: PaymentMethod,
    pub transaction_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounce {
    pub date: NaiveDate,
    pub reason: String,
}

/// Stored post-dated cheque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pdc {
    pub id: PdcId,
    pub cheque_number: String,
    pub bank_name: String,
    pub tenant_id: TenantId,
    pub invoice_id: Option<InvoiceId>,
    pub lease_id: Option<String>,
    pub amount: Decimal,
    pub cheque_date: NaiveDate,
    pub status: PdcStatus,
    pub deposit_date: Option<NaiveDate>,
    pub bank_account_id: Option<String>,
    pub cleared_date: Option<NaiveDate>,
    pub bounce: Option<Bounce>,
    pub withdrawal: Option<Withdrawal>,
    pub original_pdc_id: Option<PdcId>,
    pub replacement_pdc_id: Option<PdcId>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Pdc {
    pub fn status_view(&self) -> PdcView {
        PdcView {
            id: self.id.clone(),
            cheque_number: self.cheque_number.clone(),
            tenant_id: self.tenant_id.clone(),
            amount: self.amount,
            cheque_date: self.cheque_date,
            status: self.status.label(),
            original_pdc_id: self.original_pdc_id.clone(),
            replacement_pdc_id: self.replacement_pdc_id.clone(),
        }
    }
}

/// Inbound payload for registering one cheque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPdc {
    pub cheque_number: String,
    pub bank_name: String,
    pub tenant_id: TenantId,
    #[serde(default)]
    pub invoice_id: Option<InvoiceId>,
    #[serde(default)]
    pub lease_id: Option<String>,
    pub amount: Decimal,
    pub cheque_date: NaiveDate,
}

/// Cheques sharing a tenant, submitted together (typically a year of rent).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPdcBatch {
    pub tenant_id: TenantId,
    #[serde(default)]
    pub invoice_id: Option<InvoiceId>,
    #[serde(default)]
    pub lease_id: Option<String>,
    pub cheques: Vec<BatchCheque>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchCheque {
    pub cheque_number: String,
    pub bank_name: String,
    pub amount: Decimal,
    pub cheque_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositRequest {
    pub deposit_date: NaiveDate,
    pub bank_account_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawRequest {
    pub withdrawal_date: NaiveDate,
    pub reason: String,
    pub new_payment_method: PaymentMethod,
    #[serde(default)]
    pub transaction_id: Option<String>,
}

/// Details of the cheque a tenant hands over to replace a bounced one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementCheque {
    pub cheque_number: String,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    pub cheque_date: NaiveDate,
}

/// Sanitized representation exposed by routes.
#[derive(Debug, Clone, Serialize)]
pub struct PdcView {
    pub id: PdcId,
    pub cheque_number: String,
    pub tenant_id: TenantId,
    pub amount: Decimal,
    pub cheque_date: NaiveDate,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_pdc_id: Option<PdcId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replacement_pdc_id: Option<PdcId>,
}
