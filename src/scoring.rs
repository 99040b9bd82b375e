//! Lead scoring: data score + engagement score, bucketed into hot/warm/cold.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::engagement::{detect_signals, EngagementSignal, KeywordSignalDetector, SignalDetector};
use crate::qualification::{data_score, QualificationAnswers};

pub const DEFAULT_HOT_THRESHOLD: u32 = 60;
pub const DEFAULT_WARM_THRESHOLD: u32 = 30;

/// Points per transcript line that asks for a human.
pub const HUMAN_CONTACT_POINTS: u32 = 20;
/// Points per transcript line acknowledging a link click.
pub const CLICKED_LINK_POINTS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Hot,
    Warm,
    Cold,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Classification::Hot => "hot",
            Classification::Warm => "warm",
            Classification::Cold => "cold",
        })
    }
}

/// Classification cut-offs. `warm <= hot` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringThresholds {
    hot: u32,
    warm: u32,
}

impl ScoringThresholds {
    /// Returns `None` when `warm > hot`.
    pub fn new(hot: u32, warm: u32) -> Option<Self> {
        (warm <= hot).then_some(Self { hot, warm })
    }

    pub fn hot(&self) -> u32 {
        self.hot
    }

    pub fn warm(&self) -> u32 {
        self.warm
    }

    pub fn classify(&self, total: u32) -> Classification {
        if total >= self.hot {
            Classification::Hot
        } else if total >= self.warm {
            Classification::Warm
        } else {
            Classification::Cold
        }
    }
}

impl Default for ScoringThresholds {
    fn default() -> Self {
        Self {
            hot: DEFAULT_HOT_THRESHOLD,
            warm: DEFAULT_WARM_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub data_score: u32,
    pub engagement_score: u32,
    /// Always `data_score + engagement_score`.
    pub total: u32,
    pub clicked_link_lines: u32,
    pub human_contact_lines: u32,
    /// Detected signals, in transcript order.
    pub signals: Vec<EngagementSignal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadScore {
    pub breakdown: ScoreBreakdown,
    pub classification: Classification,
}

/// Scores leads with a fixed set of thresholds and a pluggable signal detector.
pub struct LeadScorer {
    thresholds: ScoringThresholds,
    detector: Box<dyn SignalDetector>,
}

impl LeadScorer {
    pub fn new(thresholds: ScoringThresholds) -> Self {
        Self::with_detector(thresholds, Box::new(KeywordSignalDetector::default()))
    }

    pub fn with_detector(thresholds: ScoringThresholds, detector: Box<dyn SignalDetector>) -> Self {
        Self {
            thresholds,
            detector,
        }
    }

    pub fn thresholds(&self) -> ScoringThresholds {
        self.thresholds
    }

    /// Total function: absent answers and an empty transcript score zero.
    pub fn score(&self, answers: &QualificationAnswers, transcript: &[String]) -> LeadScore {
        let data_score = data_score(answers);

        let signals = detect_signals(self.detector.as_ref(), transcript);
        let count = |wanted: EngagementSignal| {
            signals.iter().filter(|s| **s == wanted).count() as u32
        };
        let human_contact_lines = count(EngagementSignal::RequestedHumanContact);
        let clicked_link_lines = count(EngagementSignal::ClickedLink);

        let engagement_score = human_contact_lines
            .saturating_mul(HUMAN_CONTACT_POINTS)
            .saturating_add(clicked_link_lines.saturating_mul(CLICKED_LINK_POINTS));
        let total = data_score.saturating_add(engagement_score);
        let classification = self.thresholds.classify(total);

        tracing::debug!(
            data_score,
            engagement_score,
            total,
            %classification,
            "Lead scored"
        );

        LeadScore {
            breakdown: ScoreBreakdown {
                data_score,
                engagement_score,
                total,
                clicked_link_lines,
                human_contact_lines,
                signals,
            },
            classification,
        }
    }
}

impl Default for LeadScorer {
    fn default() -> Self {
        Self::new(ScoringThresholds::default())
    }
}
