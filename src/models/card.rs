//! Card model and source-type classification.

use serde::{Deserialize, Serialize};

use super::annotation::Annotation;

/// Keywords marking social and news domains, checked first.
const EXTERNAL_KEYWORDS: &[&str] = &[
    "facebook",
    "ithome.com.tw",
    "udn.com",
    "storm.mg",
    "cw.com.tw",
    "cna.com.tw",
    "teema.org.tw",
];

/// Keywords marking government and research domains.
const OFFICIAL_KEYWORDS: &[&str] = &["gov", "gov.tw", "itsa.gov.tw"];

/// Display grouping for an annotation's source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    ExternalOpinion,
    GovernmentResearch,
    Other,
}

impl SourceType {
    /// Classify a document URI by substring keywords.
    ///
    /// The external-opinion list is checked before the official list, in
    /// list order; the first match wins. A URI matching neither list is
    /// classified as other.
    pub fn classify(uri: &str) -> Self {
        if EXTERNAL_KEYWORDS.iter().any(|k| uri.contains(k)) {
            return Self::ExternalOpinion;
        }
        if OFFICIAL_KEYWORDS.iter().any(|k| uri.contains(k)) {
            return Self::GovernmentResearch;
        }
        Self::Other
    }

    /// Display label used by the card system.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExternalOpinion => "外部意見",
            Self::GovernmentResearch => "政府與研究報告",
            Self::Other => "其它",
        }
    }
}

/// A card record ready for the card-management system.
///
/// Immutable and single-use; a later pipeline run produces a new card with
/// the same `hypothesis_id`, and reconciliation is the card system's
/// responsibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub title: String,
    pub quote: Option<String>,
    pub source_url: String,
    pub source_type: SourceType,
    pub comments: Vec<String>,
    pub tags: Vec<String>,
    pub hypothesis_id: String,
}

impl Card {
    /// Build a card from a normalized annotation.
    pub fn from_annotation(ann: Annotation) -> Self {
        let comments = match ann.text.as_deref() {
            Some(text) if !text.is_empty() => vec![format!("{}: {}", ann.user, text)],
            _ => Vec::new(),
        };

        Self {
            title: ann.title,
            quote: ann.quote,
            source_type: SourceType::classify(&ann.uri),
            source_url: ann.uri,
            comments,
            tags: ann.tags,
            hypothesis_id: ann.id,
        }
    }
}
