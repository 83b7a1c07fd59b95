//! Académie française dictionary client
//!
//! Queries the dictionary search endpoint for a single word and returns the
//! exact-match entries.
//!
//! # API Reference
//! - Endpoint: https://www.dictionnaire-academie.fr/search
//! - Request: POST form `term=<word>`, sent as an XHR from the site origin
//! - Response: `{"result": [{"url", "label", "score", "nbhomograph", "nature"}]}`
//!
//! `score` is the similarity of the entry to the searched word, sent as a
//! string from "0.x" to "1.0". Only "1.0" entries are kept.

use crate::types::DictionaryCandidate;
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Académie française search endpoint
pub const ACADEMIE_SEARCH_URL: &str = "https://www.dictionnaire-academie.fr/search";

/// Site origin the endpoint expects requests from
const ACADEMIE_ORIGIN: &str = "https://www.dictionnaire-academie.fr";

/// Default timeout for dictionary requests
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Score the service assigns to an exact match
pub const EXACT_MATCH_SCORE: &str = "1.0";

const USER_AGENT: &str = "Mozilla/5.0";

/// Dictionary lookup errors
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Source of dictionary entries for a word
#[async_trait]
pub trait DictionaryLookup: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Exact-match entries for `word` (empty when there is none)
    async fn lookup(&self, word: &str) -> Result<Vec<DictionaryCandidate>, LookupError>;
}

/// Search response body
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub result: Vec<SearchResult>,
}

/// One entry of the search response
#[derive(Debug, Deserialize)]
pub struct SearchResult {
    pub url: String,
    #[serde(default)]
    pub label: String,
    pub score: Score,
    #[serde(default)]
    pub nbhomograph: Option<u32>,
    #[serde(default)]
    pub nature: Option<String>,
}

/// Similarity score, normally a string but tolerated as a JSON number
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Score {
    Text(String),
    Number(f64),
}

impl Score {
    /// Score in the service's string form ("1.0", "0.83", ...)
    pub fn as_text(&self) -> String {
        match self {
            Score::Text(s) => s.clone(),
            Score::Number(n) => format!("{:?}", n),
        }
    }
}

impl SearchResponse {
    /// Keep exact matches only, in response order
    pub fn into_exact_matches(self) -> Vec<DictionaryCandidate> {
        self.result
            .into_iter()
            .filter_map(|entry| {
                let score = entry.score.as_text();
                if score != EXACT_MATCH_SCORE {
                    return None;
                }
                Some(DictionaryCandidate {
                    url: entry.url,
                    label: entry.label,
                    score,
                    grammatical_function: entry.nature.unwrap_or_default(),
                    homograph_rank: entry.nbhomograph.unwrap_or(0),
                })
            })
            .collect()
    }
}

/// Académie française dictionary client
pub struct AcademieClient {
    http_client: Client,
    endpoint: String,
}

impl AcademieClient {
    /// Create a client for `endpoint` with a per-request `timeout`
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, LookupError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json, text/javascript, */*; q=0.01"),
        );
        headers.insert(
            "X-Requested-With",
            header::HeaderValue::from_static("XMLHttpRequest"),
        );
        headers.insert(header::ORIGIN, header::HeaderValue::from_static(ACADEMIE_ORIGIN));
        headers.insert(
            header::REFERER,
            header::HeaderValue::from_static("https://www.dictionnaire-academie.fr/"),
        );

        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| LookupError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl DictionaryLookup for AcademieClient {
    fn name(&self) -> &'static str {
        "Académie française"
    }

    async fn lookup(&self, word: &str) -> Result<Vec<DictionaryCandidate>, LookupError> {
        debug!(word = %word, "Querying dictionary");

        let response = self
            .http_client
            .post(&self.endpoint)
            .form(&[("term", word)])
            .send()
            .await
            .map_err(|e| LookupError::Network(format!("Dictionary request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::Api(status.as_u16(), body));
        }

        let search: SearchResponse = response.json().await.map_err(|e| {
            LookupError::Parse(format!("Failed to parse dictionary response: {}", e))
        })?;

        let total = search.result.len();
        let candidates = search.into_exact_matches();

        debug!(
            word = %word,
            results = total,
            exact_matches = candidates.len(),
            "Dictionary query complete"
        );

        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> SearchResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_client_creation() {
        let client = AcademieClient::new(ACADEMIE_SEARCH_URL, DEFAULT_TIMEOUT);
        assert!(client.is_ok());
        assert_eq!(client.unwrap().endpoint(), ACADEMIE_SEARCH_URL);
    }

    #[test]
    fn test_client_name() {
        let client = AcademieClient::new(ACADEMIE_SEARCH_URL, DEFAULT_TIMEOUT).unwrap();
        assert_eq!(client.name(), "Académie française");
    }

    #[test]
    fn test_partial_matches_are_dropped() {
        let response = parse(
            r#"{"result": [
                {"url": "u1", "label": "chat", "score": "1.0", "nbhomograph": 1, "nature": "n. m."},
                {"url": "u2", "label": "château", "score": "0.8", "nbhomograph": 0, "nature": "n. m."},
                {"url": "u3", "label": "chat", "score": "1.0", "nbhomograph": 2, "nature": "interj."}
            ]}"#,
        );

        let candidates = response.into_exact_matches();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].url, "u1");
        assert_eq!(candidates[0].grammatical_function, "n. m.");
        assert_eq!(candidates[1].url, "u3");
        assert_eq!(candidates[1].homograph_rank, 2);
    }

    #[test]
    fn test_empty_result() {
        let response = parse(r#"{"result": []}"#);
        assert!(response.into_exact_matches().is_empty());
    }

    #[test]
    fn test_missing_optional_fields() {
        let response = parse(r#"{"result": [{"url": "u1", "score": "1.0"}]}"#);
        let candidates = response.into_exact_matches();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].label, "");
        assert_eq!(candidates[0].grammatical_function, "");
        assert_eq!(candidates[0].homograph_rank, 0);
    }

    #[test]
    fn test_numeric_score_is_tolerated() {
        let response = parse(r#"{"result": [{"url": "u1", "score": 1.0, "nature": "nom"}]}"#);
        let candidates = response.into_exact_matches();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].score, "1.0");
    }

    #[test]
    fn test_missing_result_list_is_error() {
        let parsed: Result<SearchResponse, _> = serde_json::from_str(r#"{"results": []}"#);
        assert!(parsed.is_err());
    }
}
