use async_trait::async_trait;
use bytes::Bytes;
use truthguard_common::{Result, TruthGuardError};
use truthguard_core::{ContentType, RawPayload};

/// A file staged for upload. The bytes are shared, not copied, between the
/// draft that holds them and any request built from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Bytes,
}

impl MediaUpload {
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Top-level MIME type, e.g. `image` for `image/png`.
    pub fn mime_category(&self) -> &str {
        self.mime.split('/').next().unwrap_or_default().trim()
    }
}

/// One submission to an analysis backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisRequest {
    Text(String),
    Media {
        content_type: ContentType,
        upload: MediaUpload,
    },
}

impl AnalysisRequest {
    pub fn image(upload: MediaUpload) -> Self {
        Self::Media {
            content_type: ContentType::Image,
            upload,
        }
    }

    pub fn video(upload: MediaUpload) -> Self {
        Self::Media {
            content_type: ContentType::Video,
            upload,
        }
    }

    pub fn content_type(&self) -> ContentType {
        match self {
            Self::Text(_) => ContentType::Text,
            Self::Media { content_type, .. } => *content_type,
        }
    }

    /// Reject a media request tagged as text.
    pub(crate) fn ensure_consistent(&self) -> Result<()> {
        match self {
            Self::Media {
                content_type: ContentType::Text,
                ..
            } => Err(TruthGuardError::Validation(
                "text submissions cannot carry a file upload".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

#[async_trait]
pub trait AnalysisClient: Send + Sync {
    /// Run one analysis and return the backend's raw answer.
    ///
    /// Fails with [`TruthGuardError::Transport`] when the backend could not
    /// produce an answer; no partial payload is ever returned.
    async fn analyze(&self, request: AnalysisRequest) -> Result<RawPayload>;

    /// Check if the backend is reachable.
    async fn health_check(&self) -> Result<bool>;

    /// Short backend identifier used in logs.
    fn name(&self) -> &str;
}
