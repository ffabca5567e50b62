//! Tenant move-out workflow and security deposit settlement.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;
pub mod settlement;

#[cfg(test)]
mod tests;

pub use domain::{
    AttachmentKind, CheckoutId, CheckoutReason, CheckoutRecord, CheckoutStatus, CheckoutView,
    CompleteCheckout, Deduction, DeductionType, DepositCalculation, DepositRefund, FileUpload,
    InitiateCheckout, Inspection, InspectionItem, InspectionSection, InspectionUpdate,
    ItemCondition, OverallCondition, ProcessRefund, RefundMethod, RefundPayout, RefundStatus,
    TenantCheckout,
};
pub use repository::{CheckoutRepository, FileStorage, StorageError};
pub use router::checkout_router;
pub use service::{normalize_uae_iban, CheckoutError, CheckoutWorkflowService, PRESIGN_TTL_SECS};
pub use settlement::{settle, Settlement};
