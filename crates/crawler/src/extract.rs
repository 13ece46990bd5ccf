//! Price extraction from fetched pages.
//!
//! Two strict single-match rules apply: the selector must match exactly
//! one node, and that node's text must contain exactly one decimal price.
//! Neither rule ever falls back to "first match".
//!
//! Queries starting with `/` or `(` are XPath expressions evaluated over
//! the parsed page; anything else is a CSS selector.

use std::sync::Arc;

use pricewatch_core::price::{match_price, PriceMatch};
use scraper::{Html, Selector};
use sxd_xpath::Value as XPathValue;

use crate::error::ExtractError;
use crate::fetch::PageFetcher;

/// Fetches a page and extracts its price. Performs no logging to storage.
#[derive(Clone)]
pub struct Extractor {
    fetcher: Arc<dyn PageFetcher>,
}

impl Extractor {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    /// Fetch `url`, select the single node matching `selector`, and return
    /// the single price in its text, verbatim.
    pub async fn extract(&self, url: &str, selector: &str) -> Result<String, ExtractError> {
        let page = self.fetcher.fetch(url).await?;
        let page = String::from_utf8_lossy(&page);
        let text = select_text(&page, selector)?;
        parse_price(&text)
    }
}

/// Text content of the one node in `page` matching `selector`.
///
/// The text of every descendant text node is concatenated. Zero or
/// multiple matches, or an unparsable selector, are
/// [`ExtractError::Selector`].
pub fn select_text(page: &str, selector: &str) -> Result<String, ExtractError> {
    if is_xpath(selector) {
        select_text_xpath(page, selector)
    } else {
        select_text_css(page, selector)
    }
}

fn is_xpath(selector: &str) -> bool {
    selector.trim_start().starts_with(['/', '('])
}

fn select_text_css(page: &str, selector: &str) -> Result<String, ExtractError> {
    let parsed = Selector::parse(selector)
        .map_err(|e| selector_error(selector, format!("is invalid: {e}")))?;

    let document = Html::parse_document(page);
    let mut nodes = document.select(&parsed);

    let Some(node) = nodes.next() else {
        return Err(no_match(selector));
    };

    let extra = nodes.count();
    if extra > 0 {
        return Err(too_many(selector, extra + 1));
    }

    Ok(node.text().collect::<String>())
}

/// An XPath result must be one node (element, text or attribute) or a
/// string expression.
fn select_text_xpath(page: &str, query: &str) -> Result<String, ExtractError> {
    let package = sxd_html::parse_html(page);
    let document = package.as_document();

    let value = sxd_xpath::evaluate_xpath(&document, query)
        .map_err(|e| selector_error(query, format!("is invalid: {e}")))?;

    match value {
        XPathValue::Nodeset(nodes) => match nodes.size() {
            0 => Err(no_match(query)),
            1 => nodes
                .document_order_first()
                .map(|node| node.string_value())
                .ok_or_else(|| no_match(query)),
            count => Err(too_many(query, count)),
        },
        XPathValue::String(text) => Ok(text),
        XPathValue::Number(_) => Err(selector_error(
            query,
            "yields a number, expected a node".to_string(),
        )),
        XPathValue::Boolean(_) => Err(selector_error(
            query,
            "yields a boolean, expected a node".to_string(),
        )),
    }
}

fn selector_error(selector: &str, message: String) -> ExtractError {
    ExtractError::Selector {
        selector: selector.to_string(),
        message,
    }
}

fn no_match(selector: &str) -> ExtractError {
    selector_error(selector, "matched no node, expected exactly one".to_string())
}

fn too_many(selector: &str, count: usize) -> ExtractError {
    selector_error(selector, format!("matched {count} nodes, expected exactly one"))
}

/// The single decimal price in `text`, verbatim.
pub fn parse_price(text: &str) -> Result<String, ExtractError> {
    match match_price(text) {
        PriceMatch::Unique(price) => Ok(price.to_string()),
        PriceMatch::Missing => Err(ExtractError::Extraction {
            text: text.trim().to_string(),
            message: "no price found".to_string(),
        }),
        PriceMatch::Ambiguous(count) => Err(ExtractError::Extraction {
            text: text.trim().to_string(),
            message: format!("{count} prices found, expected exactly one"),
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
