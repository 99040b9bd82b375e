//! Engagement signal detection over conversation transcripts.
//!
//! Each transcript line yields at most one signal. Requests for a human are
//! checked before link clicks, so a line such as "cliquei no link, quero falar
//! com vendedor" counts only as a human-contact request.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Phrases indicating the lead wants to talk to a person.
pub const HUMAN_CONTACT_PHRASES: &[&str] = &[
    "falar com vendedor",
    "falar com um vendedor",
    "falar com o vendedor",
    "falar com atendente",
    "falar com um atendente",
    "falar com uma pessoa",
    "falar com alguém",
    "falar com alguem",
    "atendimento humano",
    "atendente humano",
    "pode me ligar",
    "me liga",
    "me ligue",
];

/// Phrases indicating the lead opened a link we sent.
pub const CLICKED_LINK_PHRASES: &[&str] = &[
    "cliquei no link",
    "abri o link",
    "acessei o link",
    "entrei no link",
    "vi o link",
    "vi no site",
    "entrei no site",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EngagementSignal {
    ClickedLink,
    RequestedHumanContact,
}

/// Classifies a single transcript line.
///
/// Implementations must be pure: the same line always yields the same signal.
pub trait SignalDetector: Send + Sync {
    fn detect(&self, line: &str) -> Option<EngagementSignal>;
}

/// Case-insensitive substring matcher over two phrase lists.
#[derive(Debug, Clone)]
pub struct KeywordSignalDetector {
    human_contact: Option<Regex>,
    clicked_link: Option<Regex>,
}

impl KeywordSignalDetector {
    /// Builds a detector from custom phrase lists. Phrases are matched
    /// literally; an empty list never matches.
    pub fn from_phrases<S: AsRef<str>>(
        human_contact: &[S],
        clicked_link: &[S],
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            human_contact: phrase_matcher(human_contact)?,
            clicked_link: phrase_matcher(clicked_link)?,
        })
    }
}

impl Default for KeywordSignalDetector {
    fn default() -> Self {
        Self::from_phrases(HUMAN_CONTACT_PHRASES, CLICKED_LINK_PHRASES)
            .expect("built-in phrase lists are escaped literals")
    }
}

impl SignalDetector for KeywordSignalDetector {
    fn detect(&self, line: &str) -> Option<EngagementSignal> {
        if line.trim().is_empty() {
            return None;
        }
        if self
            .human_contact
            .as_ref()
            .is_some_and(|re| re.is_match(line))
        {
            return Some(EngagementSignal::RequestedHumanContact);
        }
        if self
            .clicked_link
            .as_ref()
            .is_some_and(|re| re.is_match(line))
        {
            return Some(EngagementSignal::ClickedLink);
        }
        None
    }
}

fn phrase_matcher<S: AsRef<str>>(phrases: &[S]) -> Result<Option<Regex>, regex::Error> {
    let alternatives: Vec<String> = phrases
        .iter()
        .map(|p| p.as_ref().trim())
        .filter(|p| !p.is_empty())
        .map(regex::escape)
        .collect();

    if alternatives.is_empty() {
        return Ok(None);
    }

    RegexBuilder::new(&alternatives.join("|"))
        .case_insensitive(true)
        .build()
        .map(Some)
}

/// Runs the detector over every line, in order.
pub fn detect_signals(detector: &dyn SignalDetector, transcript: &[String]) -> Vec<EngagementSignal> {
    transcript
        .iter()
        .filter_map(|line| detector.detect(line))
        .collect()
}
