use std::fmt::Write as _;

use truthguard_core::{AnalysisResult, EvidenceKind, VerificationStatus, present};

const DISCLAIMER: &str = "This analysis uses AI models across language, vision, and forensic \
domains. Results are probabilistic and should be verified through trusted sources before \
taking action.";

/// Plain-text report for a terminal.
pub fn report(result: &AnalysisResult) -> String {
    let view = present(result);
    let base = result.base();
    let mut out = String::new();

    let _ = writeln!(out, "{}", view.summary.title);
    let _ = writeln!(out, "{}", view.summary.subtitle);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Confidence Level: {} ({}%)",
        view.tier.label,
        result.confidence().value()
    );
    let _ = writeln!(out, "  {}", bar(result.confidence().value()));
    let _ = writeln!(out, "  {}", view.tier.description);
    let _ = writeln!(
        out,
        "Content: {}  Analyzed: {}  Processing: {}ms",
        result.content_type(),
        base.analyzed_at.format("%H:%M:%S UTC"),
        base.processing_time
    );

    if let Some(ai) = result.ai_generated() {
        let _ = write!(out, "AI generation likelihood: {:.0}%", ai.likelihood);
        if let Some(model) = &ai.model {
            let _ = write!(out, " (possible model: {model})");
        }
        let _ = writeln!(out);
    }
    if let Some(df) = result.deepfake_detection() {
        let _ = write!(
            out,
            "Deepfake: {} ({}% manipulation score)",
            if df.detected { "detected" } else { "not detected" },
            df.confidence.value()
        );
        if let Some(kind) = &df.manipulation_type {
            let _ = write!(out, ", {kind}");
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Why this result?");
    let _ = writeln!(out, "  {}", view.explanation);

    if !base.evidence.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Supporting Evidence");
        for item in &base.evidence {
            let marker = match item.kind {
                EvidenceKind::Support => "+",
                EvidenceKind::Concern => "!",
                EvidenceKind::Neutral => "-",
            };
            let _ = writeln!(out, "  {marker} {}", item.description);
            if let Some(source) = &item.source {
                let _ = writeln!(out, "    Source: {source}");
            }
        }
    }

    if let Some(semantic) = result.semantic_analysis() {
        if !semantic.claims().is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Claims");
            for (i, check) in semantic.verification().iter().enumerate() {
                let status = match check.status {
                    VerificationStatus::Verified => "verified",
                    VerificationStatus::Disputed => "disputed",
                    VerificationStatus::Unverified => "unverified",
                };
                let _ = writeln!(out, "  {}. {} [{status}]", i + 1, check.claim);
                if !check.sources.is_empty() {
                    let _ = writeln!(out, "     Checked against: {}", check.sources.join(", "));
                }
            }
        }
    }

    if let Some(attribution) = result.source_attribution() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Source Attribution");
        if !attribution.possible_origins.is_empty() {
            let _ = writeln!(
                out,
                "  Possible origins: {}",
                attribution.possible_origins.join(", ")
            );
        }
        if let Some(earliest) = &attribution.earliest_detection {
            let _ = writeln!(out, "  Earliest detection: {earliest}");
        }
    }

    let _ = writeln!(out);
    let _ = write!(out, "{DISCLAIMER}");
    out
}

fn bar(confidence: u8) -> String {
    let filled = usize::from(confidence) / 5;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(20 - filled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use truthguard_core::{ContentType, RawPayload, normalize};

    #[test]
    fn report_lists_verdict_tier_and_claims() {
        let raw = RawPayload(serde_json::json!({
            "verdict": "manipulated",
            "confidence": 86,
            "evidence": [
                {"type": "concern", "description": "Lacks verifiable attribution or citation", "source": "Source Verification System"}
            ],
            "semanticAnalysis": {
                "claims": ["Miracle cure eliminates all disease overnight"],
                "verification": [{"claim": "Miracle cure eliminates all disease overnight", "status": "disputed", "sources": ["Reuters"]}]
            },
            "sourceAttribution": {"possibleOrigins": ["Social Media"], "earliestDetection": "2 days ago"}
        }));
        let result = normalize(&raw, ContentType::Text, Duration::from_millis(12)).unwrap();
        let text = report(&result);

        assert!(text.starts_with("High risk of AI-generated or manipulated content\n"));
        assert!(text.contains("Confidence Level: High Confidence (86%)"));
        assert!(text.contains(" 1 risk indicators outweighed"));
        assert!(text.contains("1. Miracle cure eliminates all disease overnight [disputed]"));
        assert!(text.contains("Earliest detection: 2 days ago"));
        assert!(text.contains("Processing: 12ms"));
    }

    #[test]
    fn bar_scales_to_twenty_cells() {
        assert_eq!(bar(100), format!("[{}]", "#".repeat(20)));
        assert_eq!(bar(0), format!("[{}]", ".".repeat(20)));
        assert_eq!(bar(64).matches('#').count(), 12);
    }
}
