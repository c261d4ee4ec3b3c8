//! Normalized annotation model and raw-record parsing.
//!
//! Isolates all knowledge of the Hypothesis JSON shape: document titles,
//! `acct:` user handles, quote selectors, and in-context links.

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from converting a raw service record into an [`Annotation`].
#[derive(Error, Debug)]
pub enum ParseError {
    /// A required top-level field was missing or had the wrong shape.
    #[error("Malformed annotation record: {0}")]
    Record(String),
}

/// A normalized view of one raw Hypothesis annotation.
///
/// Values are immutable and created fresh per pipeline run; `id` is the
/// service-assigned key and the only stable identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Annotation {
    /// Document title with bracket-like characters replaced by spaces.
    pub title: String,
    /// First exact-text quotation found in the annotation targets.
    pub quote: Option<String>,
    /// Original document URI the annotation was made on.
    pub uri: String,
    /// Deep link to the annotation in context, empty if unavailable.
    pub link: String,
    /// Tags in insertion order, duplicates allowed.
    pub tags: Vec<String>,
    /// Service-assigned unique annotation identifier.
    pub id: String,
    /// The annotator's free-text comment body.
    pub text: Option<String>,
    /// The annotator's bare username.
    pub user: String,
}

/// Raw annotation record as delivered by the search API.
///
/// Only the consumed fields are modeled; everything else in the record is
/// ignored. Top-level fields are required per the service contract, while
/// sub-fields (`document.title`, `target[].selector`, `links.incontext`)
/// are optional and handled defensively.
#[derive(Debug, Deserialize)]
struct RawAnnotation {
    id: String,
    uri: String,
    user: String,
    text: Option<String>,
    tags: Vec<String>,
    document: RawDocument,
    target: Vec<RawTarget>,
    links: RawLinks,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    title: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawTarget {
    selector: Option<Vec<RawSelector>>,
}

#[derive(Debug, Deserialize)]
struct RawSelector {
    #[serde(rename = "type")]
    kind: String,
    exact: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLinks {
    incontext: Option<String>,
}

impl Annotation {
    /// Parse one raw annotation record into a normalized annotation.
    pub fn from_json(data: &serde_json::Value) -> Result<Self, ParseError> {
        let raw: RawAnnotation = serde_json::from_value(data.clone())
            .map_err(|e| ParseError::Record(e.to_string()))?;

        Ok(Self {
            title: sanitize_title(raw.document.title.first().map(String::as_str).unwrap_or("")),
            quote: extract_quote(&raw.target),
            uri: raw.uri,
            link: raw.links.incontext.unwrap_or_default(),
            tags: raw.tags,
            id: raw.id,
            text: raw.text,
            user: sanitize_user(&raw.user),
        })
    }
}

/// Replace bracket-like characters with spaces.
///
/// Each matched character becomes a single space; runs are not merged.
fn sanitize_title(title: &str) -> String {
    let brackets = Regex::new(r"[【】\[\]{}|]").expect("invalid bracket pattern");
    brackets.replace_all(title, " ").into_owned()
}

/// Reduce an `acct:name@domain` handle to the bare username.
fn sanitize_user(user: &str) -> String {
    let user = user.strip_prefix("acct:").unwrap_or(user);
    match user.find('@') {
        Some(at) => user[..at].to_string(),
        None => user.to_string(),
    }
}

/// Find the first exact-text quotation among the annotation's targets.
///
/// Scans targets in order, and selectors in order within each target; the
/// first `TextQuoteSelector` wins and short-circuits the search. Targets
/// without a `selector` entry are skipped. Page-level notes carry no
/// anchored quote, so no match is not an error.
fn extract_quote(targets: &[RawTarget]) -> Option<String> {
    for target in targets {
        let selectors = match &target.selector {
            Some(selectors) => selectors,
            None => continue,
        };
        for selector in selectors {
            if selector.kind == "TextQuoteSelector" {
                return selector.exact.clone();
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_record() -> serde_json::Value {
        json!({
            "id": "ann-1",
            "uri": "https://example.org/report",
            "user": "acct:jane@example.org",
            "text": "worth a closer look",
            "tags": ["budget", "draft", "budget"],
            "document": { "title": ["【Report】 Data [draft]"] },
            "target": [
                { "source": "https://example.org/report" },
                {
                    "source": "https://example.org/report",
                    "selector": [
                        { "type": "RangeSelector", "startOffset": 10 },
                        { "type": "TextQuoteSelector", "exact": "Q1" }
                    ]
                }
            ],
            "links": { "incontext": "https://hyp.is/ann-1" }
        })
    }

    #[test]
    fn from_json_normalizes_all_fields() {
        let ann = Annotation::from_json(&raw_record()).unwrap();

        assert_eq!(ann.id, "ann-1");
        assert_eq!(ann.uri, "https://example.org/report");
        assert_eq!(ann.user, "jane");
        assert_eq!(ann.text.as_deref(), Some("worth a closer look"));
        assert_eq!(ann.tags, vec!["budget", "draft", "budget"]);
        assert_eq!(ann.title, " Report  Data  draft ");
        assert_eq!(ann.quote.as_deref(), Some("Q1"));
        assert_eq!(ann.link, "https://hyp.is/ann-1");
    }

    #[test]
    fn from_json_is_deterministic() {
        let record = raw_record();
        assert_eq!(
            Annotation::from_json(&record).unwrap(),
            Annotation::from_json(&record).unwrap()
        );
    }

    #[test]
    fn from_json_missing_required_field() {
        let mut record = raw_record();
        record.as_object_mut().unwrap().remove("id");

        assert!(matches!(
            Annotation::from_json(&record),
            Err(ParseError::Record(_))
        ));
    }

    #[test]
    fn from_json_absent_optionals() {
        let record = json!({
            "id": "ann-2",
            "uri": "https://example.org",
            "user": "acct:bob@example.org",
            "text": null,
            "tags": [],
            "document": {},
            "target": [],
            "links": {}
        });

        let ann = Annotation::from_json(&record).unwrap();
        assert_eq!(ann.title, "");
        assert_eq!(ann.quote, None);
        assert_eq!(ann.link, "");
        assert_eq!(ann.text, None);
    }

    #[test]
    fn sanitize_title_replaces_each_bracket_independently() {
        assert_eq!(
            sanitize_title("【Report】 Data [draft]"),
            " Report  Data  draft "
        );
        assert_eq!(sanitize_title("{a}|[b]"), " a   b ");
        assert_eq!(sanitize_title("plain title"), "plain title");
        assert_eq!(sanitize_title(""), "");
    }

    #[test]
    fn sanitize_user_strips_prefix_and_domain() {
        assert_eq!(sanitize_user("acct:jane@example.org"), "jane");
        assert_eq!(sanitize_user("acct:bob"), "bob");
        assert_eq!(sanitize_user("carol@example.org"), "carol");
        assert_eq!(sanitize_user("dave"), "dave");
    }

    #[test]
    fn extract_quote_skips_non_matching_targets_and_selectors() {
        let targets: Vec<RawTarget> = serde_json::from_value(json!([
            {},
            {
                "selector": [
                    { "type": "Other" },
                    { "type": "TextQuoteSelector", "exact": "Q1" }
                ]
            }
        ]))
        .unwrap();

        assert_eq!(extract_quote(&targets).as_deref(), Some("Q1"));
    }

    #[test]
    fn extract_quote_first_match_wins() {
        let targets: Vec<RawTarget> = serde_json::from_value(json!([
            { "selector": [{ "type": "TextPositionSelector", "start": 3 }] },
            { "selector": [{ "type": "TextQuoteSelector", "exact": "first" }] },
            { "selector": [{ "type": "TextQuoteSelector", "exact": "second" }] }
        ]))
        .unwrap();

        assert_eq!(extract_quote(&targets).as_deref(), Some("first"));
    }

    #[test]
    fn extract_quote_empty_targets() {
        assert_eq!(extract_quote(&[]), None);
    }

    #[test]
    fn extract_quote_no_text_quote_selector() {
        let targets: Vec<RawTarget> = serde_json::from_value(json!([
            { "selector": [{ "type": "RangeSelector" }] },
            {}
        ]))
        .unwrap();

        assert_eq!(extract_quote(&targets), None);
    }
}
