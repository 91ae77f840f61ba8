//! Pre-signed upload URL issuance.

use reqwest::Method;

use super::ApiClient;
use crate::error::ApiError;
use crate::types::{PresignedUpload, PresignedUploadRequest};
use crate::upload::Presigner;

impl ApiClient {
    /// Ask the backend for a storage URL to PUT `file_name` to.
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error.
    pub async fn presigned_upload_url(&self, file_name: &str, file_type: &str) -> Result<PresignedUpload, ApiError> {
        let body = PresignedUploadRequest { file_name: file_name.to_owned(), file_type: file_type.to_owned() };
        let request = self.request(Method::POST, "/api/uploads/presigned-url").json(&body);
        self.execute(request).await
    }
}

#[async_trait::async_trait]
impl Presigner for ApiClient {
    async fn presign(&self, file_name: &str, file_type: &str) -> Result<PresignedUpload, ApiError> {
        self.presigned_upload_url(file_name, file_type).await
    }
}

#[cfg(test)]
#[path = "uploads_test.rs"]
mod tests;
