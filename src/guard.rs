//! Rejection of analysis briefs that should not be turned into an image.
//!
//! Matching is plain substring search on the returned text, so a legitimate brief that
//! happens to quote a marker is rejected too. A structured status field from the
//! provider would be sturdier; the markers and threshold live in [`GuardConfig`].

use crate::{
    config::GuardConfig,
    error::{ContentFailure, InfogenError, Result},
    models::TextAnalysis,
};

pub const VIDEO_NOT_FOUND_MARKER: &str = "VIDEO_NOT_FOUND_IN_SEARCH";
pub const CONTENT_NOT_FOUND_MARKER: &str = "CONTENT_NOT_FOUND";
pub const INSUFFICIENT_DATA_MARKER: &str = "INSUFFICIENT_DATA";
pub const SAFETY_MARKER: &str = "SAFETY_BLOCKED";

#[derive(Debug, Clone)]
pub struct BriefGuard {
    config: GuardConfig,
}

impl Default for BriefGuard {
    fn default() -> Self {
        Self::new(GuardConfig::default())
    }
}

impl BriefGuard {
    pub fn new(config: GuardConfig) -> Self {
        Self { config }
    }

    /// Classifies why a brief is unusable, or `None` if it may be used.
    pub fn inspect(&self, analysis: &TextAnalysis) -> Option<ContentFailure> {
        if analysis.blocked_reason.is_some() {
            return Some(ContentFailure::SafetyFiltered);
        }

        let text = analysis.text.as_str();
        if contains_any(text, &self.config.safety_markers) {
            return Some(ContentFailure::SafetyFiltered);
        }
        if contains_any(text, &self.config.not_found_markers) {
            return Some(ContentFailure::NotFound);
        }
        if contains_any(text, &self.config.insufficient_markers) {
            return Some(ContentFailure::InsufficientData);
        }
        if text.trim().chars().count() < self.config.min_brief_chars {
            return Some(ContentFailure::InsufficientData);
        }
        None
    }

    pub fn check(&self, analysis: &TextAnalysis, source_label: &str) -> Result<()> {
        match self.inspect(analysis) {
            Some(failure) => {
                log::warn!(
                    "⚠️  Analysis of {} rejected: {} ({})",
                    source_label,
                    failure,
                    failure.code()
                );
                Err(InfogenError::content(failure, source_label))
            }
            None => Ok(()),
        }
    }
}

fn contains_any(text: &str, markers: &[String]) -> bool {
    markers.iter().any(|marker| text.contains(marker.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(text: &str) -> TextAnalysis {
        TextAnalysis {
            text: text.to_string(),
            ..Default::default()
        }
    }

    const LONG_BRIEF: &str =
        "HEADLINE: Rust adoption doubles. KEY STATS: 2x growth, 40% of teams, 2024 survey.";

    #[test]
    fn test_accepts_substantive_brief() {
        assert_eq!(BriefGuard::default().inspect(&analysis(LONG_BRIEF)), None);
    }

    #[test]
    fn test_sentinels_are_classified() {
        let guard = BriefGuard::default();
        let padded = |marker: &str| format!("{} {}", marker, LONG_BRIEF);
        assert_eq!(
            guard.inspect(&analysis(&padded("VIDEO_NOT_FOUND_IN_SEARCH"))),
            Some(ContentFailure::NotFound)
        );
        assert_eq!(
            guard.inspect(&analysis(&padded("INSUFFICIENT_DATA"))),
            Some(ContentFailure::InsufficientData)
        );
        assert_eq!(
            guard.inspect(&analysis(&padded("SAFETY_BLOCKED"))),
            Some(ContentFailure::SafetyFiltered)
        );
    }

    #[test]
    fn test_short_brief_is_insufficient() {
        let guard = BriefGuard::default();
        assert_eq!(
            guard.inspect(&analysis("   too short   ")),
            Some(ContentFailure::InsufficientData)
        );
        let lenient = BriefGuard::new(GuardConfig::new().with_min_brief_chars(5));
        assert_eq!(lenient.inspect(&analysis("long enough")), None);
    }

    #[test]
    fn test_provider_block_wins() {
        let blocked = TextAnalysis {
            text: LONG_BRIEF.to_string(),
            references: Vec::new(),
            blocked_reason: Some("SAFETY".into()),
        };
        let err = BriefGuard::default().check(&blocked, "clip").unwrap_err();
        assert!(matches!(
            err,
            InfogenError::ContentUnavailable {
                failure: ContentFailure::SafetyFiltered,
                ..
            }
        ));
    }
}
