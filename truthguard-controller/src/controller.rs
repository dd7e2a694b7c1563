use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use truthguard_client::{AnalysisClient, MediaUpload};
use truthguard_common::{Result, TruthGuardError};
use truthguard_config::UploadLimits;
use truthguard_core::{normalize, AnalysisResult, ContentType};
use uuid::Uuid;

use crate::draft::InputDraft;
use crate::preview::PreviewRegistry;

/// Coarse view of where the controller is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Analyzing,
    Resolved,
}

enum State {
    Idle,
    Analyzing {
        submission: u64,
        cancel: CancellationToken,
    },
    Resolved(Arc<AnalysisResult>),
}

impl State {
    fn phase(&self) -> Phase {
        match self {
            State::Idle => Phase::Idle,
            State::Analyzing { .. } => Phase::Analyzing,
            State::Resolved(_) => Phase::Resolved,
        }
    }

    fn is_submission(&self, id: u64) -> bool {
        matches!(self, State::Analyzing { submission, .. } if *submission == id)
    }
}

struct Inner {
    state: State,
    draft: InputDraft,
    next_submission: u64,
    last_error: Option<TruthGuardError>,
}

/// Sequences draft → request → normalized result for one user session.
///
/// At most one analysis runs at a time. The internal lock is only held for
/// bookkeeping and never across an `.await`.
pub struct InteractionController {
    client: Arc<dyn AnalysisClient + Send + Sync>,
    limits: UploadLimits,
    previews: PreviewRegistry,
    inner: Mutex<Inner>,
}

impl InteractionController {
    pub fn new(client: Arc<dyn AnalysisClient + Send + Sync>, limits: UploadLimits) -> Self {
        Self::with_previews(client, limits, PreviewRegistry::new())
    }

    pub fn with_previews(
        client: Arc<dyn AnalysisClient + Send + Sync>,
        limits: UploadLimits,
        previews: PreviewRegistry,
    ) -> Self {
        Self {
            client,
            limits,
            previews,
            inner: Mutex::new(Inner {
                state: State::Idle,
                draft: InputDraft::default(),
                next_submission: 0,
                last_error: None,
            }),
        }
    }

    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }

    pub fn limits(&self) -> &UploadLimits {
        &self.limits
    }

    pub fn phase(&self) -> Phase {
        self.lock().state.phase()
    }

    /// The current result, if the last submission succeeded.
    pub fn result(&self) -> Option<Arc<AnalysisResult>> {
        match &self.lock().state {
            State::Resolved(result) => Some(result.clone()),
            _ => None,
        }
    }

    /// The error that ended the last submission attempt, cleared by the next one.
    pub fn last_error(&self) -> Option<TruthGuardError> {
        self.lock().last_error.clone()
    }

    /// Read the draft under the lock.
    pub fn with_draft<R>(&self, f: impl FnOnce(&InputDraft) -> R) -> R {
        f(&self.lock().draft)
    }

    pub fn select_content_type(&self, content_type: ContentType) -> Result<()> {
        self.edit_draft(|draft, _| draft.select(content_type))
    }

    pub fn set_text(&self, text: impl Into<String>) -> Result<()> {
        let text = text.into();
        self.edit_draft(|draft, _| draft.set_text(text))
    }

    /// Stage a file for the selected media type, replacing any earlier one.
    /// Returns the id of the registered preview.
    pub fn stage_upload(&self, upload: MediaUpload) -> Result<Uuid> {
        self.edit_draft(|draft, previews| {
            draft.stage(upload, previews);
            draft
                .staged()
                .map(|staged| staged.preview().id())
                .unwrap_or_default()
        })
    }

    /// Drop the staged file. Returns whether one was staged.
    pub fn remove_upload(&self) -> Result<bool> {
        self.edit_draft(|draft, _| draft.unstage())
    }

    /// Validate the draft, run the analysis and store the normalized result.
    ///
    /// Fails with [`TruthGuardError::Busy`] while another submission is in
    /// flight and with [`TruthGuardError::Cancelled`] if this one is aborted
    /// or reset before it completes. Any other failure returns the controller
    /// to [`Phase::Idle`] with the error recorded.
    pub async fn submit(&self) -> Result<Arc<AnalysisResult>> {
        let (submission, request, cancel) = {
            let mut inner = self.lock();
            if matches!(inner.state, State::Analyzing { .. }) {
                return Err(TruthGuardError::Busy);
            }
            let request = match inner.draft.to_request(&self.limits) {
                Ok(request) => request,
                Err(e) => {
                    inner.last_error = Some(e.clone());
                    return Err(e);
                }
            };
            inner.next_submission += 1;
            let submission = inner.next_submission;
            let cancel = CancellationToken::new();
            inner.state = State::Analyzing {
                submission,
                cancel: cancel.clone(),
            };
            inner.last_error = None;
            (submission, request, cancel)
        };

        let content_type = request.content_type();
        info!(
            event = "analysis.submit",
            submission,
            content_type = %content_type,
            backend = self.client.name()
        );

        let mut pending = PendingSubmission {
            controller: self,
            submission,
            settled: false,
        };

        let started = Instant::now();
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(TruthGuardError::Cancelled),
            raw = self.client.analyze(request) => {
                raw.and_then(|raw| normalize(&raw, content_type, started.elapsed()))
            }
        };

        pending.settled = true;
        self.settle(submission, outcome)
    }

    /// Cancel the in-flight submission. Returns whether one was running.
    pub fn abort(&self) -> bool {
        let mut inner = self.lock();
        match std::mem::replace(&mut inner.state, State::Idle) {
            State::Analyzing { submission, cancel } => {
                cancel.cancel();
                inner.last_error = Some(TruthGuardError::Cancelled);
                info!(event = "analysis.abort", submission);
                true
            }
            other => {
                inner.state = other;
                false
            }
        }
    }

    /// Discard the result and the draft, cancelling any in-flight submission.
    pub fn reset(&self) {
        let mut inner = self.lock();
        if let State::Analyzing { submission, cancel } =
            std::mem::replace(&mut inner.state, State::Idle)
        {
            cancel.cancel();
            info!(event = "analysis.abort", submission, reason = "reset");
        }
        inner.draft.clear();
        inner.last_error = None;
        debug!(event = "analysis.reset");
    }

    fn settle(
        &self,
        submission: u64,
        outcome: Result<AnalysisResult>,
    ) -> Result<Arc<AnalysisResult>> {
        let mut inner = self.lock();
        if !inner.state.is_submission(submission) {
            debug!(event = "analysis.stale", submission);
            return Err(TruthGuardError::Cancelled);
        }
        match outcome {
            Ok(result) => {
                let result = Arc::new(result);
                info!(
                    event = "analysis.resolved",
                    submission,
                    verdict = %result.verdict(),
                    confidence = result.confidence().value(),
                    processing_ms = result.processing_time_ms()
                );
                inner.state = State::Resolved(result.clone());
                Ok(result)
            }
            Err(e) => {
                warn!(event = "analysis.failed", submission, error = %e);
                inner.state = State::Idle;
                inner.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    fn edit_draft<R>(&self, f: impl FnOnce(&mut InputDraft, &PreviewRegistry) -> R) -> Result<R> {
        let mut inner = self.lock();
        if matches!(inner.state, State::Analyzing { .. }) {
            return Err(TruthGuardError::Busy);
        }
        Ok(f(&mut inner.draft, &self.previews))
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for InteractionController {
    fn drop(&mut self) {
        if let State::Analyzing { cancel, .. } = &self.lock().state {
            cancel.cancel();
        }
    }
}

/// Returns the controller to idle if a `submit` future is dropped mid-flight.
struct PendingSubmission<'a> {
    controller: &'a InteractionController,
    submission: u64,
    settled: bool,
}

impl Drop for PendingSubmission<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut inner = self.controller.lock();
        if inner.state.is_submission(self.submission) {
            inner.state = State::Idle;
            inner.last_error = Some(TruthGuardError::Cancelled);
            debug!(event = "analysis.dropped", submission = self.submission);
        }
    }
}
