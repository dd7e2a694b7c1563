use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;
use tracing::{info, warn};
use truthguard_client::MediaUpload;
use truthguard_core::{AnalysisResult, ContentType};
use truthguard_controller::{InteractionController, ensure_within_limit};

/// MIME type guessed from a file extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("mp4" | "m4v") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("webm") => "video/webm",
        Some("avi") => "video/x-msvideo",
        Some("mkv") => "video/x-matroska",
        _ => "application/octet-stream",
    }
}

/// Read a media file from disk into an upload.
pub async fn load_upload(path: &Path) -> Result<MediaUpload> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(MediaUpload::new(file_name(path), mime_for_path(path), bytes))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// `-` reads the whole of stdin.
pub async fn resolve_text(arg: &str) -> Result<String> {
    if arg != "-" {
        return Ok(arg.to_string());
    }
    let mut buf = String::new();
    tokio::io::stdin()
        .read_to_string(&mut buf)
        .await
        .context("failed to read text from stdin")?;
    Ok(buf)
}

/// Submit the staged draft, aborting cleanly on Ctrl-C.
pub async fn run_submission(
    controller: Arc<InteractionController>,
) -> truthguard_common::Result<Arc<AnalysisResult>> {
    let submit = {
        let controller = controller.clone();
        async move { controller.submit().await }
    };
    tokio::pin!(submit);

    tokio::select! {
        outcome = &mut submit => outcome,
        _ = tokio::signal::ctrl_c() => {
            warn!(event = "analysis.interrupt");
            controller.abort();
            submit.await
        }
    }
}

/// Stage input for `content_type` on the controller.
///
/// The size cap is checked against file metadata before any bytes are read.
pub async fn stage_media(
    controller: &InteractionController,
    content_type: ContentType,
    path: &Path,
) -> Result<()> {
    let len = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("failed to stat {}", path.display()))?
        .len();
    ensure_within_limit(content_type, &file_name(path), len, controller.limits())?;

    let upload = load_upload(path).await?;
    info!(
        event = "upload.staged",
        file = %upload.file_name,
        mime = %upload.mime,
        bytes = upload.len()
    );
    controller.select_content_type(content_type)?;
    controller.stage_upload(upload)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use truthguard_client::simulated::SimulatedClient;
    use truthguard_common::TruthGuardError;
    use truthguard_config::{SimulationSettings, UploadLimits};

    fn controller(limits: UploadLimits) -> InteractionController {
        let client = SimulatedClient::new(SimulationSettings::default(), Some(5)).unwrap();
        InteractionController::new(Arc::new(client), limits)
    }

    #[test]
    fn extensions_map_to_mime_types() {
        assert_eq!(mime_for_path(Path::new("a/b/Photo.JPG")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("clip.mov")), "video/quicktime");
        assert_eq!(mime_for_path(Path::new("clip.webm")), "video/webm");
        assert_eq!(mime_for_path(Path::new("notes.txt")), "application/octet-stream");
        assert_eq!(mime_for_path(Path::new("no_extension")), "application/octet-stream");
    }

    #[tokio::test]
    async fn loads_file_with_name_and_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&[0x89, b'P', b'N', b'G']).unwrap();

        let upload = load_upload(&path).await.unwrap();
        assert_eq!(upload.file_name, "frame.png");
        assert_eq!(upload.mime, "image/png");
        assert_eq!(upload.len(), 4);
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_upload(&dir.path().join("gone.mp4")).await.unwrap_err();
        assert!(err.to_string().contains("gone.mp4"));
    }

    #[tokio::test]
    async fn literal_text_passes_through() {
        assert_eq!(resolve_text("plain words").await.unwrap(), "plain words");
    }

    #[tokio::test]
    async fn oversized_video_is_rejected_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.mp4");
        // Sparse: the length is reported without allocating the bytes.
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(50 * 1024 * 1024 + 1).unwrap();

        let controller = controller(UploadLimits::default());
        let err = stage_media(&controller, ContentType::Video, &path)
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<TruthGuardError>(),
            Some(TruthGuardError::Validation(msg)) if msg.starts_with("huge.mp4 is 52428801 bytes")
        ));
        assert!(controller.with_draft(|draft| draft.staged().is_none()));
        assert_eq!(controller.previews().live_count(), 0);
    }

    #[tokio::test]
    async fn file_within_the_cap_is_staged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("still.jpg");
        std::fs::write(&path, [0xFFu8; 16]).unwrap();

        let limits = UploadLimits {
            image_max_bytes: 16,
            video_max_bytes: 16,
        };
        let controller = controller(limits);
        stage_media(&controller, ContentType::Image, &path).await.unwrap();

        assert_eq!(controller.with_draft(|draft| draft.content_type()), ContentType::Image);
        assert_eq!(
            controller.with_draft(|draft| draft.staged().map(|s| s.upload().len())),
            Some(16)
        );

        std::fs::write(&path, [0xFFu8; 17]).unwrap();
        assert!(stage_media(&controller, ContentType::Image, &path).await.is_err());
    }
}
