//! Pre-signed uploads to object storage.
//!
//! DESIGN
//! ======
//! The backend issues an upload URL and a public file URL per file; bytes are
//! PUT straight to storage. Each upload is independent: a failure is reported
//! for that file and the batch moves on, URLs already recorded are kept, and
//! nothing is rolled back. Cancellation is a single optional [`AbortSignal`].

use std::future::Future;
use std::path::Path;

use reqwest::header::CONTENT_TYPE;
use tokio::sync::watch;

use crate::error::{ApiError, ErrorCode};
use crate::forms::mission::MAX_IMAGES;
use crate::types::PresignedUpload;

/// Content type sent when neither the caller nor the file name says otherwise.
pub const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

// =============================================================================
// FILES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { file_name: file_name.into(), content_type: None, bytes }
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Read a file from disk, naming it after the last path component.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be read.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "upload".to_owned(), |name| name.to_string_lossy().into_owned());
        Ok(Self::new(file_name, bytes))
    }

    /// Explicit type if non-blank, else a guess from the extension, else JPEG.
    #[must_use]
    pub fn resolved_content_type(&self) -> &str {
        self.content_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .or_else(|| guess_content_type(&self.file_name))
            .unwrap_or(DEFAULT_CONTENT_TYPE)
    }
}

#[must_use]
pub fn guess_content_type(file_name: &str) -> Option<&'static str> {
    let (_, ext) = file_name.rsplit_once('.')?;
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}

// =============================================================================
// CANCELLATION
// =============================================================================

/// Owner side of a cancellation signal.
#[derive(Debug)]
pub struct AbortController {
    tx: watch::Sender<bool>,
}

impl Default for AbortController {
    fn default() -> Self {
        Self::new()
    }
}

impl AbortController {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    #[must_use]
    pub fn signal(&self) -> AbortSignal {
        AbortSignal { rx: self.tx.subscribe() }
    }

    pub fn abort(&self) {
        self.tx.send_replace(true);
    }

    #[must_use]
    pub fn is_aborted(&self) -> bool {
        *self.tx.borrow()
    }
}

#[derive(Debug, Clone)]
pub struct AbortSignal {
    rx: watch::Receiver<bool>,
}

impl AbortSignal {
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once aborted. Never resolves if the controller is dropped
    /// without aborting.
    pub async fn aborted(&mut self) {
        if self.rx.wait_for(|aborted| *aborted).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Drive `work` until it finishes or `signal` fires. `None` means aborted.
///
/// Work that completes in the same poll as the abort still wins, so callers
/// can report what it produced.
pub async fn until_aborted<T, F>(signal: &AbortSignal, work: F) -> Option<T>
where
    F: Future<Output = T>,
{
    let mut signal = signal.clone();
    tokio::select! {
        biased;
        value = work => Some(value),
        () = signal.aborted() => None,
    }
}

async fn abortable<T, F>(signal: Option<&AbortSignal>, work: F) -> Result<T, UploadError>
where
    F: Future<Output = Result<T, UploadError>>,
{
    let Some(signal) = signal else {
        return work.await;
    };
    if signal.is_aborted() {
        return Err(UploadError::Aborted);
    }
    let mut signal = signal.clone();
    tokio::select! {
        biased;
        () = signal.aborted() => Err(UploadError::Aborted),
        result = work => result,
    }
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("upload aborted")]
    Aborted,

    #[error("upload request failed: {0}")]
    Request(String),

    #[error("Failed to upload file (status {status} {reason})")]
    Status { status: u16, reason: String },

    #[error("could not obtain upload URL: {0}")]
    Presign(#[from] ApiError),
}

impl ErrorCode for UploadError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Aborted => "E_UPLOAD_ABORTED",
            Self::Request(_) => "E_UPLOAD_REQUEST",
            Self::Status { .. } => "E_UPLOAD_STATUS",
            Self::Presign(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Aborted => false,
            Self::Request(_) | Self::Status { .. } => true,
            Self::Presign(e) => e.retryable(),
        }
    }
}

// =============================================================================
// SINGLE UPLOAD
// =============================================================================

/// Issues storage URLs for uploads.
#[async_trait::async_trait]
pub trait Presigner: Send + Sync {
    async fn presign(&self, file_name: &str, file_type: &str) -> Result<PresignedUpload, ApiError>;
}

/// PUT `file` to a pre-signed URL. Any 2xx is success; nothing is retried.
///
/// # Errors
///
/// Returns [`UploadError::Aborted`] if `signal` fires first, otherwise the
/// transport or status failure.
pub async fn upload_to_presigned_url(
    http: &reqwest::Client,
    upload_url: &str,
    file: &UploadFile,
    signal: Option<&AbortSignal>,
) -> Result<(), UploadError> {
    let request = http
        .put(upload_url)
        .header(CONTENT_TYPE, file.resolved_content_type())
        .body(file.bytes.clone());

    abortable(signal, async move {
        let response = request.send().await.map_err(|e| UploadError::Request(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_owned(),
            });
        }
        Ok(())
    })
    .await
}

// =============================================================================
// IMAGE SLOTS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    pub accepted: usize,
    pub rejected: usize,
}

/// Recorded image URLs for one form, capped at a fixed count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSlots {
    capacity: usize,
    urls: Vec<String>,
}

impl Default for ImageSlots {
    fn default() -> Self {
        Self::new(MAX_IMAGES)
    }
}

impl ImageSlots {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self { capacity, urls: Vec::new() }
    }

    /// Start from URLs already attached to the form, truncated to capacity.
    #[must_use]
    pub fn with_urls(capacity: usize, mut urls: Vec<String>) -> Self {
        urls.truncate(capacity);
        Self { capacity, urls }
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.urls.len())
    }

    /// How many of `offered` new files fit.
    #[must_use]
    pub fn admit(&self, offered: usize) -> Admission {
        let accepted = offered.min(self.remaining());
        Admission { accepted, rejected: offered - accepted }
    }

    /// Record an uploaded URL. Returns false when full.
    pub fn record(&mut self, url: String) -> bool {
        if self.remaining() == 0 {
            return false;
        }
        self.urls.push(url);
        true
    }

    pub fn remove(&mut self, url: &str) -> bool {
        let before = self.urls.len();
        self.urls.retain(|u| u != url);
        before != self.urls.len()
    }

    #[must_use]
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    #[must_use]
    pub fn into_urls(self) -> Vec<String> {
        self.urls
    }
}

// =============================================================================
// BATCH
// =============================================================================

#[derive(Debug)]
pub struct FileFailure {
    pub file_name: String,
    pub error: UploadError,
}

/// Per-file outcome of [`upload_batch`].
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Public URLs recorded by this batch, in upload order.
    pub uploaded: Vec<String>,
    pub failed: Vec<FileFailure>,
    /// Files over the image cap; never uploaded.
    pub rejected: Vec<String>,
    /// Files left untouched after an abort or a rejected session.
    pub cancelled: Vec<String>,
}

impl BatchReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.rejected.is_empty() && self.cancelled.is_empty()
    }
}

/// Presign, PUT and record each file in order.
///
/// Files beyond the free slots are rejected up front. A failing file is
/// reported and the batch continues. An abort, or a presign answered with
/// 401, stops the batch and reports the rest as cancelled.
pub async fn upload_batch(
    presigner: &dyn Presigner,
    http: &reqwest::Client,
    slots: &mut ImageSlots,
    files: Vec<UploadFile>,
    signal: Option<&AbortSignal>,
) -> BatchReport {
    let mut report = BatchReport::default();
    let admission = slots.admit(files.len());
    if admission.rejected > 0 {
        tracing::info!(accepted = admission.accepted, rejected = admission.rejected, "image cap reached");
    }

    let mut files = files.into_iter();
    let admitted: Vec<UploadFile> = files.by_ref().take(admission.accepted).collect();
    report.rejected = files.map(|f| f.file_name).collect();

    let mut queue = admitted.into_iter();
    while let Some(file) = queue.next() {
        match upload_one(presigner, http, &file, signal).await {
            Ok(file_url) => {
                tracing::debug!(file = %file.file_name, url = %file_url, "file uploaded");
                slots.record(file_url.clone());
                report.uploaded.push(file_url);
            }
            Err(error) => {
                let stop = matches!(error, UploadError::Aborted | UploadError::Presign(ApiError::Unauthorized));
                tracing::warn!(file = %file.file_name, error = %error, "file upload failed");
                report.failed.push(FileFailure { file_name: file.file_name, error });
                if stop {
                    report.cancelled = queue.map(|f| f.file_name).collect();
                    break;
                }
            }
        }
    }
    report
}

async fn upload_one(
    presigner: &dyn Presigner,
    http: &reqwest::Client,
    file: &UploadFile,
    signal: Option<&AbortSignal>,
) -> Result<String, UploadError> {
    let target = abortable(signal, async {
        Ok(presigner.presign(&file.file_name, file.resolved_content_type()).await?)
    })
    .await?;
    upload_to_presigned_url(http, &target.upload_url, file, signal).await?;
    Ok(target.file_url)
}

#[cfg(test)]
#[path = "upload_test.rs"]
mod tests;
