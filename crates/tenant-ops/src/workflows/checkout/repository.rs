use super::domain::{CheckoutId, CheckoutRecord};
use crate::workflows::directory::TenantId;
use crate::workflows::store::RepositoryError;

/// Storage for checkouts and their deposit refunds.
///
/// A checkout and its refund are always written together.
pub trait CheckoutRepository: Send + Sync {
    fn insert(&self, record: CheckoutRecord) -> Result<CheckoutRecord, RepositoryError>;
    fn update(&self, record: CheckoutRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &CheckoutId) -> Result<Option<CheckoutRecord>, RepositoryError>;
    fn for_tenant(&self, tenant_id: &TenantId) -> Result<Vec<CheckoutRecord>, RepositoryError>;
    /// Count of checkouts created so far, used to number new ones.
    fn count(&self) -> Result<usize, RepositoryError>;
}

/// Object storage for inspection photos and generated move-out documents.
pub trait FileStorage: Send + Sync {
    /// Store `bytes` under a key derived from `folder` and `file_name`; returns the key.
    fn upload(
        &self,
        folder: &str,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError>;
    fn delete(&self, key: &str) -> Result<(), StorageError>;
    fn presign(&self, key: &str, expires_in_secs: u64) -> Result<String, StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("object {0} not found")]
    NotFound(String),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
