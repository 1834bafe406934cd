//! Risk classification for drafted guest responses.

use serde::{Deserialize, Serialize};

/// Ratings at or below this are always flagged.
pub const LOW_RATING_THRESHOLD: i32 = 2;

/// Phrases that route a response to human review.
pub const DEFAULT_RISK_KEYWORDS: &[&str] = &[
    "food poisoning",
    "assault",
    "lawsuit",
    "bed bugs",
    "bedbugs",
    "discrimination",
    "fire",
    "medical emergency",
    "harassment",
    "injury",
    "injured",
    "theft",
    "stolen",
    "police",
    "lawyer",
    "attorney",
    "racist",
    "mold",
];

/// Severity label stored on a flagged approval request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    High,
}

impl Severity {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "HIGH",
        }
    }
}

/// Advisory result of classifying a response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub high_risk: bool,
    pub severity: Option<Severity>,
    /// Trigger reasons: matched keywords plus `low_rating:<n>`.
    pub risk_factors: Vec<String>,
    pub matched_keywords: Vec<String>,
}

impl RiskAssessment {
    /// Nothing matched.
    #[must_use]
    pub fn low() -> Self {
        Self::default()
    }
}

/// Decides whether a drafted response needs a human.
///
/// Implementations must be pure: the gate may call `assess` more than once
/// for the same draft.
pub trait RiskClassifier: Send + Sync {
    fn assess(&self, text: &str, rating: i32) -> RiskAssessment;
}

/// Case-insensitive substring match against a keyword list, plus a low
/// rating check.
#[derive(Debug, Clone)]
pub struct KeywordRiskClassifier {
    keywords: Vec<String>,
    low_rating_threshold: i32,
}

impl Default for KeywordRiskClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_RISK_KEYWORDS.iter().copied())
    }
}

impl KeywordRiskClassifier {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self {
            keywords,
            low_rating_threshold: LOW_RATING_THRESHOLD,
        }
    }

    #[must_use]
    pub fn with_low_rating_threshold(mut self, threshold: i32) -> Self {
        self.low_rating_threshold = threshold;
        self
    }

    #[must_use]
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl RiskClassifier for KeywordRiskClassifier {
    fn assess(&self, text: &str, rating: i32) -> RiskAssessment {
        let lowered = text.to_lowercase();
        let matched_keywords: Vec<String> = self
            .keywords
            .iter()
            .filter(|k| lowered.contains(k.as_str()))
            .cloned()
            .collect();

        let mut risk_factors = matched_keywords.clone();
        if rating <= self.low_rating_threshold {
            risk_factors.push(format!("low_rating:{rating}"));
        }

        if risk_factors.is_empty() {
            return RiskAssessment::low();
        }

        RiskAssessment {
            high_risk: true,
            severity: Some(Severity::High),
            risk_factors,
            matched_keywords,
        }
    }
}
