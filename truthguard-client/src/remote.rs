use crate::traits::{AnalysisClient, AnalysisRequest};
use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use std::time::Duration;
use truthguard_common::{Result, TruthGuardError};
use truthguard_core::RawPayload;
use truthguard_http::{FilePart, HttpClient, HttpError, RequestOpts};

/// Multipart field the analysis service reads uploads from.
pub const UPLOAD_FIELD: &str = "file";

/// Client for the HTTP analysis service (`POST {base}/text|image|video`).
#[derive(Debug, Clone)]
pub struct RemoteClient {
    http: HttpClient,
}

impl RemoteClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        if timeout.is_zero() {
            return Err(TruthGuardError::Config(
                "request timeout must be greater than zero".to_string(),
            ));
        }
        let http = HttpClient::new(base_url)
            .map_err(|e| TruthGuardError::Config(format!("analysis service: {e}")))?
            .with_timeout(timeout);
        Ok(Self { http })
    }

    pub fn base_url(&self) -> &str {
        self.http.base().as_str()
    }

    pub fn timeout(&self) -> Duration {
        self.http.default_timeout
    }
}

#[async_trait]
impl AnalysisClient for RemoteClient {
    async fn analyze(&self, request: AnalysisRequest) -> Result<RawPayload> {
        request.ensure_consistent()?;
        let endpoint = request.content_type().as_str();

        let body: JsonValue = match request {
            AnalysisRequest::Text(text) => {
                self.http
                    .post_json(endpoint, &json!({ "text": text }), RequestOpts::default())
                    .await
            }
            AnalysisRequest::Media { upload, .. } => {
                let part = FilePart {
                    file_name: upload.file_name,
                    mime: upload.mime,
                    bytes: upload.bytes,
                };
                self.http
                    .post_multipart(endpoint, UPLOAD_FIELD, &part, RequestOpts::default())
                    .await
            }
        }
        .map_err(into_analysis_error)?;

        tracing::debug!(
            event = "analysis.remote.response",
            endpoint,
            keys = body.as_object().map(|o| o.len()).unwrap_or(0)
        );
        Ok(RawPayload(body))
    }

    async fn health_check(&self) -> Result<bool> {
        match self.http.probe("", RequestOpts::default()).await {
            Ok(status) => Ok(!status.is_server_error()),
            Err(e) => {
                tracing::debug!(event = "analysis.remote.unreachable", error = %e);
                Ok(false)
            }
        }
    }

    fn name(&self) -> &str {
        "remote"
    }
}

fn into_analysis_error(err: HttpError) -> TruthGuardError {
    match err {
        HttpError::Api {
            status, message, ..
        } => TruthGuardError::Transport {
            status: Some(status.as_u16()),
            message,
        },
        HttpError::Decode(reason, snippet) => TruthGuardError::MalformedResponse(format!(
            "response is not JSON ({reason}): {snippet}"
        )),
        HttpError::Url(_) | HttpError::Build(_) | HttpError::Network(_) | HttpError::Timeout(_) => {
            TruthGuardError::network(err.to_string())
        }
    }
}
