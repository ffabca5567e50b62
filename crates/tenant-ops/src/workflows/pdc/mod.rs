//! Post-dated cheque registration and clearance lifecycle.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    BatchCheque, Bounce, DepositRequest, NewPdc, NewPdcBatch, PaymentMethod, Pdc, PdcId,
    PdcStatus, PdcView, ReplacementCheque, WithdrawRequest, Withdrawal,
};
pub use repository::{InvoicePayment, PaymentError, PaymentRecorder, PdcRepository};
pub use router::pdc_router;
pub use service::{PdcError, PdcLifecycleService, MAX_BULK_CHEQUES};
