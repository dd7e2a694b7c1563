//! Raw payload → canonical [`AnalysisResult`].
//!
//! The analysis service answers with loosely shaped JSON: a free-form verdict
//! label, an optional explicit confidence, optional model probabilities and a
//! few pass-through structures. [`normalize`] folds that into the tagged
//! union, failing with [`TruthGuardError::MalformedResponse`] whenever a
//! verdict or confidence cannot be established.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use truthguard_common::{Result, TruthGuardError};

use crate::model::{
    AiGenerated, AnalysisResult, Confidence, ContentType, DeepfakeDetection, Evidence,
    ImageResult, ResultBase, SemanticAnalysis, SourceAttribution, TextResult, Verdict,
    VideoResult,
};

/// AI-generation probability at or above which an unlabelled payload is manipulated.
pub const MANIPULATED_PROBABILITY: f64 = 0.75;
/// AI-generation probability at or above which an unlabelled payload is suspicious.
pub const SUSPICIOUS_PROBABILITY: f64 = 0.45;
/// Model scores strictly above this mark a deepfake as detected.
pub const DEEPFAKE_SCORE_THRESHOLD: f64 = 0.5;

/// Untyped JSON body as returned by an analysis backend.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawPayload(pub Value);

impl RawPayload {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for RawPayload {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

#[derive(Debug, Default, Deserialize)]
struct UpstreamPayload {
    #[serde(default)]
    verdict: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    ai_generated_probability: Option<f64>,
    #[serde(default)]
    ai_model: Option<String>,
    #[serde(default)]
    model_signals: Option<ModelSignals>,
    #[serde(default, rename = "semanticAnalysis", alias = "semantic_analysis")]
    semantic_analysis: Option<Value>,
    #[serde(default)]
    evidence: Option<Vec<Evidence>>,
    #[serde(default, rename = "sourceAttribution", alias = "source_attribution")]
    source_attribution: Option<SourceAttribution>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ModelSignals {
    #[serde(default, alias = "avg_cnn_score")]
    cnn_score: Option<f64>,
    #[serde(default)]
    manipulation_type: Option<String>,
}

/// Map a free-form verdict label onto a [`Verdict`].
///
/// Case-insensitive substring match, first hit wins: "authentic", then
/// "manipulated" or "ai", otherwise suspicious. A label such as
/// "not authentic, manipulated" therefore classifies as authentic.
///
/// ```
/// use truthguard_core::{classify_label, Verdict};
///
/// assert_eq!(classify_label("Likely Authentic"), Verdict::Authentic);
/// assert_eq!(classify_label("Likely AI-Generated or Manipulated"), Verdict::Manipulated);
/// assert_eq!(classify_label("Suspicious"), Verdict::Suspicious);
/// ```
pub fn classify_label(label: &str) -> Verdict {
    let label = label.to_lowercase();
    if label.contains("authentic") {
        Verdict::Authentic
    } else if label.contains("manipulated") || label.contains("ai") {
        Verdict::Manipulated
    } else {
        Verdict::Suspicious
    }
}

/// Verdict implied by an AI-generation probability when no label was sent.
pub fn verdict_from_probability(p: f64) -> Verdict {
    if p >= MANIPULATED_PROBABILITY {
        Verdict::Manipulated
    } else if p >= SUSPICIOUS_PROBABILITY {
        Verdict::Suspicious
    } else {
        Verdict::Authentic
    }
}

/// Normalize a raw payload, stamping `analyzed_at` with the current time.
pub fn normalize(
    raw: &RawPayload,
    content_type: ContentType,
    processing_time: Duration,
) -> Result<AnalysisResult> {
    normalize_at(raw, content_type, processing_time, Utc::now())
}

/// [`normalize`] with an explicit timestamp.
pub fn normalize_at(
    raw: &RawPayload,
    content_type: ContentType,
    processing_time: Duration,
    analyzed_at: DateTime<Utc>,
) -> Result<AnalysisResult> {
    if !raw.0.is_object() {
        return Err(TruthGuardError::MalformedResponse(format!(
            "expected a JSON object, got {}",
            json_kind(&raw.0)
        )));
    }

    let payload: UpstreamPayload = serde_json::from_value(raw.0.clone())
        .map_err(|e| TruthGuardError::MalformedResponse(e.to_string()))?;

    let probability = payload.ai_generated_probability;

    let verdict = match (payload.verdict.as_deref(), probability) {
        (Some(label), _) => classify_label(label),
        (None, Some(p)) => verdict_from_probability(p),
        (None, None) => return Err(missing("verdict", payload.error.as_deref())),
    };

    let confidence = match (payload.confidence, probability) {
        (Some(c), _) => Confidence::from_percent(c),
        (None, Some(p)) => Confidence::from_percent((1.0 - p) * 100.0),
        (None, None) => None,
    }
    .ok_or_else(|| missing("confidence", payload.error.as_deref()))?;

    let base = ResultBase {
        verdict,
        confidence,
        evidence: payload.evidence.unwrap_or_default(),
        source_attribution: payload.source_attribution,
        analyzed_at,
        processing_time: u64::try_from(processing_time.as_millis()).unwrap_or(u64::MAX),
    };

    let signals = payload.model_signals.unwrap_or_default();

    let result = match content_type {
        ContentType::Text => AnalysisResult::Text(TextResult {
            base,
            semantic_analysis: payload
                .semantic_analysis
                .map(decode_semantic_analysis)
                .transpose()?,
        }),
        ContentType::Image => AnalysisResult::Image(ImageResult {
            base,
            ai_generated: probability.map(|p| AiGenerated {
                likelihood: (p * 100.0).round().clamp(0.0, 100.0),
                model: payload.ai_model,
            }),
            deepfake_detection: deepfake_from(&signals)?,
        }),
        ContentType::Video => AnalysisResult::Video(VideoResult {
            base,
            deepfake_detection: deepfake_from(&signals)?,
        }),
    };

    debug!(
        event = "analysis.normalized",
        content_type = %content_type,
        verdict = %result.verdict(),
        confidence = result.confidence().value(),
        evidence = result.evidence().len()
    );

    Ok(result)
}

fn deepfake_from(signals: &ModelSignals) -> Result<Option<DeepfakeDetection>> {
    let Some(score) = signals.cnn_score else {
        return Ok(None);
    };
    let confidence = Confidence::from_percent(score * 100.0).ok_or_else(|| {
        TruthGuardError::MalformedResponse(format!("model score {score} is not a number"))
    })?;
    Ok(Some(DeepfakeDetection {
        detected: score > DEEPFAKE_SCORE_THRESHOLD,
        confidence,
        manipulation_type: signals.manipulation_type.clone(),
    }))
}

fn decode_semantic_analysis(value: Value) -> Result<SemanticAnalysis> {
    serde_json::from_value(value)
        .map_err(|e| TruthGuardError::MalformedResponse(format!("semantic analysis: {e}")))
}

fn missing(field: &str, upstream_error: Option<&str>) -> TruthGuardError {
    match upstream_error {
        Some(message) => TruthGuardError::MalformedResponse(format!(
            "service reported an error instead of a {field}: {message}"
        )),
        None => TruthGuardError::MalformedResponse(format!("response carries no {field}")),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
