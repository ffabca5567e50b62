//! Read/write view over tenants, units, invoices, and user accounts owned by other
//! parts of the back office.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TenantId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvoiceId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TenantStatus {
    Pending,
    Active,
    ExpiringSoon,
    Expired,
    Terminated,
}

impl TenantStatus {
    /// Tenants in these states may give notice and start a move-out.
    pub const fn can_start_checkout(self) -> bool {
        matches!(self, TenantStatus::Active | TenantStatus::ExpiringSoon)
    }

    pub const fn label(self) -> &'static str {
        match self {
            TenantStatus::Pending => "PENDING",
            TenantStatus::Active => "ACTIVE",
            TenantStatus::ExpiringSoon => "EXPIRING_SOON",
            TenantStatus::Expired => "EXPIRED",
            TenantStatus::Terminated => "TERMINATED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitStatus {
    Available,
    Occupied,
    UnderMaintenance,
    Reserved,
}

/// Tenant fields the workflows read at decision time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantSnapshot {
    pub tenant_id: TenantId,
    pub full_name: String,
    pub status: TenantStatus,
    pub security_deposit: Decimal,
    pub property_id: PropertyId,
    pub unit_id: UnitId,
    pub user_id: Option<String>,
}

pub trait TenantDirectory: Send + Sync {
    fn tenant(&self, id: &TenantId) -> Result<Option<TenantSnapshot>, DirectoryError>;
    fn invoice_exists(&self, id: &InvoiceId) -> Result<bool, DirectoryError>;
    fn set_tenant_status(&self, id: &TenantId, status: TenantStatus)
        -> Result<(), DirectoryError>;
    fn set_unit_status(&self, id: &UnitId, status: UnitStatus) -> Result<(), DirectoryError>;
    fn deactivate_user(&self, user_id: &str) -> Result<(), DirectoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("{entity} {id} not found in directory")]
    Missing { entity: &'static str, id: String },
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}
