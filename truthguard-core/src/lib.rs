//! Canonical analysis model for TruthGuard.
//!
//! - [`model`]: the tagged-union [`AnalysisResult`] and its parts
//! - [`normalize`](mod@normalize): raw service payloads into canonical results
//! - [`present`](mod@present): verdict summaries, confidence tiers and explanations

pub mod model;
pub mod normalize;
pub mod present;

pub use model::{
    AiGenerated, AnalysisResult, ClaimVerification, Confidence, ContentType, DeepfakeDetection,
    Evidence, EvidenceKind, ImageResult, ResultBase, SemanticAnalysis, SourceAttribution,
    TextResult, Verdict, VerificationStatus, VideoResult,
};
pub use normalize::{classify_label, normalize, normalize_at, verdict_from_probability, RawPayload};
pub use present::{
    confidence_tier, explain, present, verdict_summary, ConfidenceTier, EmphasisColor,
    Presentation, TierLevel, VerdictSummary,
};
