//! Extraction of the product state embedded in the page.
//!
//! The state is rendered as a single assignment statement inside the
//! flash-sales banner fragment:
//!
//! ```text
//! window["__single-product-detail__PROPS"] = {...};window.TYPE = "PDP";
//! ```
//!
//! The JSON literal is isolated by splitting on the first `=` and the last
//! `;`. This is a heuristic, not a JavaScript parser: it relies on there
//! being no `=` before the literal and no statement-ending `;` after it other
//! than the trailing code. When the markup changes shape the parse fails
//! with [`ScrapeError::PayloadParse`].

use crate::error::ScrapeError;
use crate::trendyol::selectors;
use crate::trendyol::session::PageSession;
use scraper::Html;
use serde_json::Value;
use tracing::debug;

/// Reads and decodes the product state from a prepared page.
pub async fn extract_raw_payload(page: &dyn PageSession) -> Result<Value, ScrapeError> {
    let text = page
        .text_content(selectors::PRODUCT_SCRIPT)
        .await?
        .filter(|text| !text.is_empty())
        .ok_or(ScrapeError::EmptyScript)?;

    debug!("Product script is {} bytes", text.len());
    isolate_payload(&text)
}

/// Same as [`extract_raw_payload`] for a saved HTML document.
pub fn extract_from_html(html: &str) -> Result<Value, ScrapeError> {
    let document = Html::parse_document(html);
    let script = document
        .select(&selectors::PRODUCT_SCRIPT_SELECTOR)
        .next()
        .ok_or(ScrapeError::ScriptNotFound)?;

    let text: String = script.text().collect();
    if text.is_empty() {
        return Err(ScrapeError::EmptyScript);
    }
    isolate_payload(&text)
}

/// Isolates the JSON literal and parses it.
///
/// Only the first JSON value of the isolated text is decoded, so statements
/// between the literal and the last `;` (`{...};window.TYPE = "PDP"`) are
/// ignored. A malformed or truncated literal is still an error.
pub fn isolate_payload(script: &str) -> Result<Value, ScrapeError> {
    let json = isolate_json(script)?;
    serde_json::Deserializer::from_str(json)
        .into_iter::<Value>()
        .next()
        .ok_or_else(|| ScrapeError::PayloadParse("no JSON literal in product script".to_string()))?
        .map_err(|e| ScrapeError::PayloadParse(e.to_string()))
}

/// Everything after the first `=`, up to the last `;`. Without a `;` the
/// whole remainder is returned.
pub fn isolate_json(script: &str) -> Result<&str, ScrapeError> {
    let (_, rest) = script
        .split_once('=')
        .ok_or_else(|| ScrapeError::PayloadParse("no assignment in product script".to_string()))?;

    Ok(rest.rsplit_once(';').map_or(rest, |(json, _)| json))
}
