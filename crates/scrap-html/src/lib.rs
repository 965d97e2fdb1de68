//! Scrap HTML
//!
//! HTML5 parsing (built on html5ever) into a `scrap-dom` document, and
//! serialization back to markup.

mod parser;
mod serializer;

pub use parser::HtmlParser;
pub use serializer::{HtmlSerializer, get_inner_html, get_outer_html};

use scrap_dom::{Document, DomError};

/// Parse an HTML string into a Document
pub fn parse(html: &str) -> Result<Document, ParseError> {
    HtmlParser::new().parse(html)
}

/// Plain text of an HTML fragment, markup stripped
pub fn fragment_text(html: &str) -> Result<String, ParseError> {
    let doc = HtmlParser::new().parse(html)?;
    let body = doc.body();
    if !body.is_valid() {
        return Ok(String::new());
    }
    Ok(doc.tree().text_content(body))
}

/// Parse error
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to read HTML input: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to build document tree: {0}")]
    Tree(#[from] DomError),
}
