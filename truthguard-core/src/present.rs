//! Display artifacts derived from a canonical result.
//!
//! Everything here is a pure function of its input: no clock, no randomness,
//! no I/O. Calling any of them twice on the same value yields the same output.

use serde::Serialize;

use crate::model::{AnalysisResult, Confidence, EvidenceKind, Verdict};

/// Confidence at or above which an authentic verdict reads as high confidence.
pub const AUTHENTIC_HIGH_CONFIDENCE: u8 = 85;
/// Confidence at or above which a manipulated verdict reads as strong.
pub const MANIPULATED_STRONG_CONFIDENCE: u8 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmphasisColor {
    Green,
    Red,
    Amber,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerdictSummary {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub emphasis: EmphasisColor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TierLevel {
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfidenceTier {
    pub level: TierLevel,
    pub label: &'static str,
    pub description: &'static str,
}

impl ConfidenceTier {
    /// Color the tier label is shown in.
    pub fn emphasis(&self) -> EmphasisColor {
        match self.level {
            TierLevel::High => EmphasisColor::Green,
            TierLevel::Moderate => EmphasisColor::Amber,
            TierLevel::Low => EmphasisColor::Red,
        }
    }
}

/// Everything a view needs besides the raw result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Presentation {
    pub summary: VerdictSummary,
    pub tier: ConfidenceTier,
    pub explanation: String,
}

pub fn verdict_summary(result: &AnalysisResult) -> VerdictSummary {
    let confidence = result.confidence().value();
    match result.verdict() {
        Verdict::Authentic => VerdictSummary {
            title: "Content appears authentic",
            subtitle: if confidence >= AUTHENTIC_HIGH_CONFIDENCE {
                "High confidence based on multiple independent verification signals"
            } else {
                "Moderate confidence, some verification signals present"
            },
            emphasis: EmphasisColor::Green,
        },
        Verdict::Manipulated => VerdictSummary {
            title: "High risk of AI-generated or manipulated content",
            subtitle: if confidence >= MANIPULATED_STRONG_CONFIDENCE {
                "Strong AI-generation and forensic indicators detected"
            } else {
                "Some manipulation indicators detected"
            },
            emphasis: EmphasisColor::Red,
        },
        Verdict::Suspicious => VerdictSummary {
            title: "Content may be misleading or unverified",
            subtitle: "Insufficient evidence to fully verify authenticity",
            emphasis: EmphasisColor::Amber,
        },
    }
}

/// Bucket a confidence: `[85,100]` high, `[65,85)` moderate, `[0,65)` low.
pub fn confidence_tier(confidence: Confidence) -> ConfidenceTier {
    match confidence.value() {
        85..=u8::MAX => ConfidenceTier {
            level: TierLevel::High,
            label: "High Confidence",
            description: "Strong agreement across multiple AI models",
        },
        65..=84 => ConfidenceTier {
            level: TierLevel::Moderate,
            label: "Moderate Confidence",
            description: "Some uncertainty, partial verification signals",
        },
        _ => ConfidenceTier {
            level: TierLevel::Low,
            label: "Low Confidence",
            description: "Limited evidence or conflicting indicators",
        },
    }
}

/// Narrative explanation of the verdict, interpolating evidence counts.
pub fn explain(result: &AnalysisResult) -> String {
    match result.verdict() {
        Verdict::Manipulated => format!(
            "This content was flagged as high risk because multiple AI models detected \
             forensic or semantic inconsistencies. {} risk indicators outweighed supporting \
             signals, suggesting possible manipulation or AI generation.",
            result.count_evidence(EvidenceKind::Concern)
        ),
        Verdict::Authentic => format!(
            "This content appears authentic based on consistent signals across verification \
             models. {} supporting indicators were detected with minimal conflicting evidence.",
            result.count_evidence(EvidenceKind::Support)
        ),
        Verdict::Suspicious => "The system could not fully verify this content due to limited \
             or conflicting signals. While some indicators were detected, they were not strong \
             enough to reach a definitive conclusion."
            .to_string(),
    }
}

pub fn present(result: &AnalysisResult) -> Presentation {
    Presentation {
        summary: verdict_summary(result),
        tier: confidence_tier(result.confidence()),
        explanation: explain(result),
    }
}
