//! Capability interface for querying a stack's remote content API.

use async_trait::async_trait;

use crate::errors::QueryError;
use crate::models::pagination::Page;
use crate::models::stats::ContentTypeRef;

/// Remote queries the aggregation engine depends on.
///
/// Implementations own their transport policy (timeouts, retries, auth).
#[async_trait]
pub trait RemoteQueryPort: Send + Sync {
    /// Total number of content types in the stack.
    async fn count_content_types(&self, stack_id: &str) -> Result<u64, QueryError>;

    /// Total number of assets in the stack.
    async fn count_assets(&self, stack_id: &str) -> Result<u64, QueryError>;

    /// One page of content types starting at `offset`.
    async fn list_content_types_page(
        &self,
        stack_id: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Page<ContentTypeRef>, QueryError>;

    /// Number of entries of a single content type.
    ///
    /// Fails with [`QueryError::PermissionDenied`] or [`QueryError::NotFound`]
    /// when the content type cannot be read.
    async fn count_entries(
        &self,
        stack_id: &str,
        content_type_uid: &str,
    ) -> Result<u64, QueryError>;
}
