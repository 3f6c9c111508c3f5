use scraper::{ElementRef, Html, Node, Selector};
use std::time::Duration;
use tracing::debug;
use ureq::Agent;
use url::Url;

use super::{Document, DocumentMetadata};
use crate::{RagError, Result};

/// Elements whose text never reaches the reader
const HIDDEN_ELEMENTS: [&str; 5] = ["script", "style", "noscript", "template", "head"];

#[derive(Debug, Clone)]
pub struct WebLoaderConfig {
    /// User agent string to use for requests
    pub user_agent: String,
    /// Timeout for HTTP requests in seconds
    pub timeout_seconds: u64,
}

impl Default for WebLoaderConfig {
    #[inline]
    fn default() -> Self {
        Self {
            user_agent: "simple-rag/0.1.0 (Document Loader)".to_string(),
            timeout_seconds: 30,
        }
    }
}

/// Fetches a web page and keeps its visible text
#[derive(Debug, Clone)]
pub struct WebLoader {
    agent: Agent,
}

impl WebLoader {
    #[inline]
    pub fn new(config: &WebLoaderConfig) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_seconds)))
            .user_agent(&config.user_agent)
            .build()
            .into();

        Self { agent }
    }

    #[inline]
    pub fn load(&self, url: &Url) -> Result<Document> {
        let html = self.fetch(url)?;
        extract_page(&html, url.as_str())
    }

    fn fetch(&self, url: &Url) -> Result<String> {
        debug!("Making HTTP GET request to: {}", url);

        let fetch_error = |message: String| RagError::Fetch {
            url: url.to_string(),
            message,
        };

        match self.agent.get(url.as_str()).call() {
            Ok(mut response) => {
                let text = response
                    .body_mut()
                    .read_to_string()
                    .map_err(|e| fetch_error(format!("Failed to read response body: {}", e)))?;
                debug!("Successfully read {} bytes from {}", text.len(), url);
                Ok(text)
            }
            Err(ureq::Error::StatusCode(status)) => {
                debug!("HTTP request failed with status {}: {}", status, url);
                Err(fetch_error(format!("HTTP error {}", status)))
            }
            Err(e) => {
                debug!("HTTP request failed with transport error: {}", e);
                Err(fetch_error(e.to_string()))
            }
        }
    }
}

impl Default for WebLoader {
    #[inline]
    fn default() -> Self {
        Self::new(&WebLoaderConfig::default())
    }
}

/// Turn an HTML page into a document of its visible text, one text run per line
#[inline]
pub fn extract_page(html: &str, source: &str) -> Result<Document> {
    let document = Html::parse_document(html);

    let mut metadata = DocumentMetadata::new(source);
    metadata.title = select_text(&document, "title", source)?;
    metadata.description = select_attr(&document, r#"meta[name="description"]"#, "content", source)?;
    metadata.language = document
        .root_element()
        .value()
        .attr("lang")
        .map(str::to_string);

    let body_selector = parse_selector("body", source)?;
    let root = document
        .select(&body_selector)
        .next()
        .unwrap_or_else(|| document.root_element());

    let content = visible_text(root);
    debug!(
        "Extracted page: title={:?}, {} chars of text",
        metadata.title,
        content.len()
    );

    Ok(Document { content, metadata })
}

fn visible_text(root: ElementRef<'_>) -> String {
    let mut lines = Vec::new();

    for node in root.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| HIDDEN_ELEMENTS.contains(&element.name()))
        });
        if hidden {
            continue;
        }

        let line = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if !line.is_empty() {
            lines.push(line);
        }
    }

    lines.join("\n")
}

fn parse_selector(selector: &str, source: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| RagError::Parse {
        origin: source.to_string(),
        message: format!("Failed to create CSS selector: {:?}", e),
    })
}

fn select_text(document: &Html, selector: &str, source: &str) -> Result<Option<String>> {
    let selector = parse_selector(selector, source)?;
    Ok(document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty()))
}

fn select_attr(
    document: &Html,
    selector: &str,
    attr: &str,
    source: &str,
) -> Result<Option<String>> {
    let selector = parse_selector(selector, source)?;
    Ok(document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr(attr))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty()))
}
