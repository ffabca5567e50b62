use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::domain::{PaymentMethod, Pdc, PdcId, PdcStatus};
use crate::workflows::directory::{InvoiceId, TenantId};
use crate::workflows::store::RepositoryError;

/// Storage abstraction so the lifecycle service can be exercised in isolation.
pub trait PdcRepository: Send + Sync {
    fn fetch(&self, id: &PdcId) -> Result<Option<Pdc>, RepositoryError>;
    fn for_tenant(&self, tenant_id: &TenantId) -> Result<Vec<Pdc>, RepositoryError>;
    fn with_status(&self, status: PdcStatus) -> Result<Vec<Pdc>, RepositoryError>;
    /// Insert every record or none of them.
    fn insert_all(&self, records: Vec<Pdc>) -> Result<Vec<Pdc>, RepositoryError>;
    fn update(&self, record: Pdc) -> Result<(), RepositoryError>;
    /// Persist a replacement pair: the new cheque is inserted and the source updated together.
    fn replace(&self, source: Pdc, replacement: Pdc) -> Result<(), RepositoryError>;
}

/// Ledger-side hook that books a receipt against an invoice.
pub trait PaymentRecorder: Send + Sync {
    fn record_payment(&self, payment: InvoicePayment) -> Result<(), PaymentError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoicePayment {
    pub invoice_id: InvoiceId,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub reference: String,
    pub date: NaiveDate,
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("invoice {0} rejected the payment: {1}")]
    Rejected(String, String),
    #[error("payment ledger unavailable: {0}")]
    Unavailable(String),
}
