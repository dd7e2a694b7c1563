use truthguard_client::{AnalysisRequest, MediaUpload};
use truthguard_common::{Result, TruthGuardError};
use truthguard_config::UploadLimits;
use truthguard_core::ContentType;

use crate::preview::{PreviewGuard, PreviewInfo, PreviewRegistry};

/// A file picked for analysis together with its live preview.
#[derive(Debug)]
pub struct StagedUpload {
    upload: MediaUpload,
    preview: PreviewGuard,
}

impl StagedUpload {
    pub fn upload(&self) -> &MediaUpload {
        &self.upload
    }

    pub fn preview(&self) -> &PreviewGuard {
        &self.preview
    }
}

/// What the user has entered but not yet submitted.
#[derive(Debug)]
pub struct InputDraft {
    content_type: ContentType,
    text: String,
    staged: Option<StagedUpload>,
}

impl Default for InputDraft {
    fn default() -> Self {
        Self {
            content_type: ContentType::Text,
            text: String::new(),
            staged: None,
        }
    }
}

impl InputDraft {
    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn staged(&self) -> Option<&StagedUpload> {
        self.staged.as_ref()
    }

    /// Switch pathways. A staged file never carries over to another type.
    pub(crate) fn select(&mut self, content_type: ContentType) {
        if content_type != self.content_type {
            self.staged = None;
            self.content_type = content_type;
        }
    }

    pub(crate) fn set_text(&mut self, text: String) {
        self.text = text;
    }

    pub(crate) fn stage(&mut self, upload: MediaUpload, previews: &PreviewRegistry) {
        let preview = previews.register(PreviewInfo {
            file_name: upload.file_name.clone(),
            mime: upload.mime.clone(),
            size: upload.len(),
        });
        // Replacing drops the previous guard.
        self.staged = Some(StagedUpload { upload, preview });
    }

    pub(crate) fn unstage(&mut self) -> bool {
        self.staged.take().is_some()
    }

    pub(crate) fn clear(&mut self) {
        self.text.clear();
        self.staged = None;
    }

    /// Check the draft and build the request it describes.
    pub fn to_request(&self, limits: &UploadLimits) -> Result<AnalysisRequest> {
        match self.content_type {
            ContentType::Text => {
                if self.text.trim().is_empty() {
                    return Err(TruthGuardError::Validation(
                        "enter some text to analyze".to_string(),
                    ));
                }
                Ok(AnalysisRequest::Text(self.text.clone()))
            }
            media => {
                let staged = self.staged.as_ref().ok_or_else(|| {
                    TruthGuardError::Validation(format!("no {media} file staged for analysis"))
                })?;
                let upload = &staged.upload;
                if !upload.mime_category().eq_ignore_ascii_case(media.as_str()) {
                    return Err(TruthGuardError::Validation(format!(
                        "{} is {}; expected {media}/* content",
                        upload.file_name,
                        if upload.mime.is_empty() {
                            "of unknown type"
                        } else {
                            upload.mime.as_str()
                        }
                    )));
                }
                if upload.is_empty() {
                    return Err(TruthGuardError::Validation(format!(
                        "{} is empty",
                        upload.file_name
                    )));
                }
                ensure_within_limit(media, &upload.file_name, upload.len() as u64, limits)?;
                Ok(AnalysisRequest::Media {
                    content_type: media,
                    upload: upload.clone(),
                })
            }
        }
    }
}

fn max_bytes(content_type: ContentType, limits: &UploadLimits) -> u64 {
    match content_type {
        ContentType::Video => limits.video_max_bytes,
        _ => limits.image_max_bytes,
    }
}

/// Reject a `len`-byte file that exceeds the cap for `content_type`.
///
/// Callers that know the size up front (file metadata) can check before
/// reading anything.
pub fn ensure_within_limit(
    content_type: ContentType,
    file_name: &str,
    len: u64,
    limits: &UploadLimits,
) -> Result<()> {
    let cap = max_bytes(content_type, limits);
    if len > cap {
        return Err(TruthGuardError::Validation(format!(
            "{file_name} is {len} bytes; {content_type} uploads are limited to {} MiB",
            cap / (1024 * 1024)
        )));
    }
    Ok(())
}
