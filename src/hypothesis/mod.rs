//! Hypothesis group client.
//!
//! Drives paginated retrieval of every annotation in a group and maps the
//! raw rows into card records, in server delivery order.

mod transport;

pub use transport::{HttpTransport, Transport, TransportError};

use std::sync::Arc;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{Annotation, Card, ParseError};

/// Default number of rows requested per search page.
pub const DEFAULT_PAGE_SIZE: usize = 200;

/// Errors from group annotation retrieval.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The board URL does not contain a group identifier.
    #[error("No group id in board URL: {0}")]
    InvalidGroupUrl(String),

    #[error("HTTP error: {0}")]
    Transport(#[from] TransportError),

    /// Search response body did not match the `rows`/`total` contract.
    #[error("Failed to decode search response: {0}")]
    Decode(String),

    #[error("Malformed annotation: {0}")]
    Record(#[from] ParseError),
}

/// One page of a group search response.
///
/// `total` is the cumulative matching count across the whole group, not
/// the size of this page.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    rows: Vec<serde_json::Value>,
    total: usize,
}

/// Extract the group identifier from a sense.tw board URL.
///
/// Matches the fixed pattern `//sense.tw/groups/<id>/`.
pub fn extract_group_id(url: &str) -> Option<String> {
    let re = Regex::new(r"//sense\.tw/groups/(.*?)/").ok()?;
    re.captures(url).map(|c| c[1].to_string())
}

/// A Hypothesis group with annotations on a topic.
pub struct HypothesisGroup {
    api_url: String,
    api_key: String,
    title: String,
    url: String,
    page_size: usize,
    transport: Arc<dyn Transport>,
}

impl HypothesisGroup {
    /// Create a new group client.
    ///
    /// `url` is the board page URL the group identifier is derived from;
    /// `title` is a display label carried through unused by the pipeline.
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            title: title.into(),
            url: url.into(),
            page_size: DEFAULT_PAGE_SIZE,
            transport,
        }
    }

    /// Override the search page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Display label for the board.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Group identifier parsed from the board URL.
    ///
    /// Failure here is a configuration error, not a runtime condition.
    pub fn group_id(&self) -> Result<String, FetchError> {
        extract_group_id(&self.url).ok_or_else(|| FetchError::InvalidGroupUrl(self.url.clone()))
    }

    /// `Authorization` header attached to every API request.
    fn authorization_headers(&self) -> Vec<(String, String)> {
        vec![(
            "Authorization".to_string(),
            format!("Bearer {}", self.api_key),
        )]
    }

    /// Build the search URL for one page of group results.
    fn group_search_url(&self, group_id: &str, offset: usize, limit: usize) -> String {
        format!(
            "{}/search?group={}&limit={}&offset={}",
            self.api_url, group_id, limit, offset
        )
    }

    /// Accumulate every raw annotation row in the group.
    ///
    /// Pagination is strictly sequential: each offset depends on the
    /// running accumulated count. The server-reported `total` is taken as
    /// authoritative for termination.
    async fn search_all(&self, group_id: &str) -> Result<Vec<serde_json::Value>, FetchError> {
        let headers = self.authorization_headers();
        let mut rows: Vec<serde_json::Value> = Vec::new();
        let mut offset = 0;

        loop {
            let url = self.group_search_url(group_id, offset, self.page_size);
            debug!("Fetching annotation page: {}", url);

            let body = self.transport.get_json(&url, &headers).await?;
            let page: SearchResponse =
                serde_json::from_value(body).map_err(|e| FetchError::Decode(e.to_string()))?;

            let received = page.rows.len();
            rows.extend(page.rows);

            if rows.len() >= page.total {
                break;
            }
            if received == 0 {
                // The server reported more rows than it delivers; further
                // pages cannot make progress.
                warn!(
                    "Search reported total={} but delivered only {} rows",
                    page.total,
                    rows.len()
                );
                break;
            }

            offset += self.page_size;
        }

        Ok(rows)
    }

    /// Retrieve the group's annotations as cards, in server order.
    ///
    /// Any transport, decoding, or record failure aborts the whole call;
    /// no partial results are returned.
    pub async fn annotations(&self) -> Result<Vec<Card>, FetchError> {
        let group_id = self.group_id()?;
        let rows = self.search_all(&group_id).await?;

        info!("Fetched {} annotations from group {}", rows.len(), group_id);

        let mut cards = Vec::with_capacity(rows.len());
        for row in &rows {
            let annotation = Annotation::from_json(row)?;
            cards.push(Card::from_annotation(annotation));
        }

        Ok(cards)
    }
}
