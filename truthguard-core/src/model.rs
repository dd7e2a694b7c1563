//! Canonical analysis result and its building blocks.
//!
//! [`AnalysisResult`] is a tagged union keyed by [`ContentType`]; each variant
//! embeds the shared [`ResultBase`] plus only the optional structures its
//! pathway can produce. The JSON form uses camelCase keys and a
//! `contentType` tag.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use truthguard_common::TruthGuardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Text,
    Image,
    Video,
}

impl ContentType {
    pub const ALL: [ContentType; 3] = [ContentType::Text, ContentType::Image, ContentType::Video];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Text => "text",
            ContentType::Image => "image",
            ContentType::Video => "video",
        }
    }

    /// Whether submissions of this type carry a binary upload.
    pub fn is_media(&self) -> bool {
        !matches!(self, ContentType::Text)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = TruthGuardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(ContentType::Text),
            "image" => Ok(ContentType::Image),
            "video" => Ok(ContentType::Video),
            other => Err(TruthGuardError::Validation(format!(
                "unknown content type {other:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Authentic,
    Manipulated,
    Suspicious,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Authentic => "authentic",
            Verdict::Manipulated => "manipulated",
            Verdict::Suspicious => "suspicious",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Integer percentage in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Confidence(u8);

impl Confidence {
    pub const MAX: Confidence = Confidence(100);

    pub fn new(value: u8) -> Option<Self> {
        (value <= 100).then_some(Self(value))
    }

    /// Round and clamp a raw percentage. `None` for NaN.
    ///
    /// ```
    /// use truthguard_core::model::Confidence;
    ///
    /// assert_eq!(Confidence::from_percent(84.5).unwrap().value(), 85);
    /// assert_eq!(Confidence::from_percent(130.0).unwrap().value(), 100);
    /// assert_eq!(Confidence::from_percent(-3.0).unwrap().value(), 0);
    /// assert!(Confidence::from_percent(f64::NAN).is_none());
    /// ```
    pub fn from_percent(value: f64) -> Option<Self> {
        if value.is_nan() {
            return None;
        }
        Some(Self(value.round().clamp(0.0, 100.0) as u8))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Confidence {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Confidence::new(value).ok_or_else(|| format!("confidence {value} exceeds 100"))
    }
}

impl From<Confidence> for u8 {
    fn from(c: Confidence) -> u8 {
        c.0
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceKind {
    Support,
    Concern,
    Neutral,
}

/// A single observation, optionally attributed to the detector that made it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    #[serde(rename = "type")]
    pub kind: EvidenceKind,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Evidence {
    pub fn new(kind: EvidenceKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Verified,
    Disputed,
    Unverified,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimVerification {
    pub claim: String,
    pub status: VerificationStatus,
    #[serde(default)]
    pub sources: Vec<String>,
}

/// Extracted claims with one verification entry per claim, in the same order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SemanticAnalysisWire")]
pub struct SemanticAnalysis {
    claims: Vec<String>,
    verification: Vec<ClaimVerification>,
}

#[derive(Deserialize)]
struct SemanticAnalysisWire {
    #[serde(default)]
    claims: Vec<String>,
    #[serde(default)]
    verification: Vec<ClaimVerification>,
}

impl TryFrom<SemanticAnalysisWire> for SemanticAnalysis {
    type Error = String;

    fn try_from(wire: SemanticAnalysisWire) -> Result<Self, Self::Error> {
        SemanticAnalysis::new(wire.claims, wire.verification).map_err(|e| e.to_string())
    }
}

impl SemanticAnalysis {
    /// Pair claims with their verification entries.
    ///
    /// Fails unless both sequences have the same length and
    /// `verification[i].claim == claims[i]` for every `i`.
    pub fn new(
        claims: Vec<String>,
        verification: Vec<ClaimVerification>,
    ) -> Result<Self, TruthGuardError> {
        if claims.len() != verification.len() {
            return Err(TruthGuardError::MalformedResponse(format!(
                "semantic analysis has {} claims but {} verification entries",
                claims.len(),
                verification.len()
            )));
        }
        if let Some(i) = claims
            .iter()
            .zip(&verification)
            .position(|(c, v)| *c != v.claim)
        {
            return Err(TruthGuardError::MalformedResponse(format!(
                "verification entry {i} does not match claim {:?}",
                claims[i]
            )));
        }
        Ok(Self {
            claims,
            verification,
        })
    }

    /// Build a verification entry for every claim with a shared status and source list.
    pub fn uniform(claims: Vec<String>, status: VerificationStatus, sources: &[&str]) -> Self {
        let verification = claims
            .iter()
            .map(|claim| ClaimVerification {
                claim: claim.clone(),
                status,
                sources: sources.iter().map(|s| s.to_string()).collect(),
            })
            .collect();
        Self {
            claims,
            verification,
        }
    }

    pub fn claims(&self) -> &[String] {
        &self.claims
    }

    pub fn verification(&self) -> &[ClaimVerification] {
        &self.verification
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceAttribution {
    #[serde(default, alias = "possible_origins")]
    pub possible_origins: Vec<String>,
    #[serde(
        default,
        alias = "earliest_detection",
        skip_serializing_if = "Option::is_none"
    )]
    pub earliest_detection: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiGenerated {
    /// Percentage, 0–100.
    pub likelihood: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeepfakeDetection {
    pub detected: bool,
    pub confidence: Confidence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manipulation_type: Option<String>,
}

/// Fields every result carries regardless of content type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultBase {
    pub verdict: Verdict,
    pub confidence: Confidence,
    #[serde(default)]
    pub evidence: Vec<Evidence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_attribution: Option<SourceAttribution>,
    pub analyzed_at: DateTime<Utc>,
    pub processing_time: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextResult {
    #[serde(flatten)]
    pub base: ResultBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_analysis: Option<SemanticAnalysis>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResult {
    #[serde(flatten)]
    pub base: ResultBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_generated: Option<AiGenerated>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deepfake_detection: Option<DeepfakeDetection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResult {
    #[serde(flatten)]
    pub base: ResultBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deepfake_detection: Option<DeepfakeDetection>,
}

/// Canonical verdict for one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "contentType", rename_all = "lowercase")]
pub enum AnalysisResult {
    Text(TextResult),
    Image(ImageResult),
    Video(VideoResult),
}

impl AnalysisResult {
    pub fn content_type(&self) -> ContentType {
        match self {
            AnalysisResult::Text(_) => ContentType::Text,
            AnalysisResult::Image(_) => ContentType::Image,
            AnalysisResult::Video(_) => ContentType::Video,
        }
    }

    pub fn base(&self) -> &ResultBase {
        match self {
            AnalysisResult::Text(r) => &r.base,
            AnalysisResult::Image(r) => &r.base,
            AnalysisResult::Video(r) => &r.base,
        }
    }

    pub fn verdict(&self) -> Verdict {
        self.base().verdict
    }

    pub fn confidence(&self) -> Confidence {
        self.base().confidence
    }

    pub fn evidence(&self) -> &[Evidence] {
        &self.base().evidence
    }

    pub fn source_attribution(&self) -> Option<&SourceAttribution> {
        self.base().source_attribution.as_ref()
    }

    pub fn analyzed_at(&self) -> DateTime<Utc> {
        self.base().analyzed_at
    }

    pub fn processing_time_ms(&self) -> u64 {
        self.base().processing_time
    }

    pub fn semantic_analysis(&self) -> Option<&SemanticAnalysis> {
        match self {
            AnalysisResult::Text(r) => r.semantic_analysis.as_ref(),
            _ => None,
        }
    }

    pub fn ai_generated(&self) -> Option<&AiGenerated> {
        match self {
            AnalysisResult::Image(r) => r.ai_generated.as_ref(),
            _ => None,
        }
    }

    pub fn deepfake_detection(&self) -> Option<&DeepfakeDetection> {
        match self {
            AnalysisResult::Image(r) => r.deepfake_detection.as_ref(),
            AnalysisResult::Video(r) => r.deepfake_detection.as_ref(),
            AnalysisResult::Text(_) => None,
        }
    }

    /// Number of evidence entries of the given kind.
    pub fn count_evidence(&self, kind: EvidenceKind) -> usize {
        self.evidence().iter().filter(|e| e.kind == kind).count()
    }
}
