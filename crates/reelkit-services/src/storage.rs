//! Object storage port.

use async_trait::async_trait;

use crate::error::ServiceResult;

/// Accepts byte payloads, returns addressable URLs.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> ServiceResult<String>;
}
