//! Structural matching of selectors against page markup
//!
//! Matching is split into three capabilities so the engine can be swapped:
//! compiling a selector, parsing markup into a document, and counting
//! compiled-selector matches in it. The default engine is `scraper`
//! (html5ever + the `selectors` crate), which parses the way browsers do and
//! never rejects malformed markup.

use scraper::{Html, Selector};
use thiserror::Error;

/// Errors reported by a structural query engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    /// The selector is not valid in the engine's query language
    #[error("Invalid selector '{selector}': {message}")]
    SelectorSyntax { selector: String, message: String },
}

/// A structural query engine: compile a selector, parse markup, count matches
pub trait StructuralDocument {
    type Document;

    /// A selector in the engine's compiled form
    type Query;

    /// Compiles `selector`, rejecting invalid syntax
    ///
    /// Called once per search, before any page is fetched.
    fn compile(&self, selector: &str) -> Result<Self::Query, MatchError>;

    /// Parses markup into a document tree
    ///
    /// Returns `None` only if the markup cannot be parsed at all.
    fn parse(&self, markup: &str) -> Option<Self::Document>;

    /// Counts the nodes in `document` matching `query`
    ///
    /// Engines that only discover a bad selector while matching may still
    /// report `SelectorSyntax` here.
    fn query(&self, document: &Self::Document, query: &Self::Query) -> Result<usize, MatchError>;

    /// Parses `markup` and counts matches for `query`
    ///
    /// Markup that cannot be parsed counts as zero matches.
    fn count_matches(&self, markup: &str, query: &Self::Query) -> Result<usize, MatchError> {
        match self.parse(markup) {
            Some(document) => self.query(&document, query),
            None => {
                tracing::debug!("Markup could not be parsed, counting as no match");
                Ok(0)
            }
        }
    }
}

/// Query engine backed by the `scraper` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct ScraperDocument;

impl StructuralDocument for ScraperDocument {
    type Document = Html;
    type Query = Selector;

    fn compile(&self, selector: &str) -> Result<Selector, MatchError> {
        Selector::parse(selector).map_err(|e| MatchError::SelectorSyntax {
            selector: selector.to_string(),
            message: e.to_string(),
        })
    }

    fn parse(&self, markup: &str) -> Option<Html> {
        let document = Html::parse_document(markup);
        if !document.errors.is_empty() {
            tracing::trace!("Recovered from {} markup errors", document.errors.len());
        }
        Some(document)
    }

    fn query(&self, document: &Html, query: &Selector) -> Result<usize, MatchError> {
        Ok(document.select(query).count())
    }
}

/// Counts elements in `markup` matching `selector` with the default engine
///
/// # Example
///
/// ```
/// use sumi_lens::search::count_matches;
///
/// let html = r#"<div class="card"></div><div class="card"></div>"#;
/// assert_eq!(count_matches(html, ".card").unwrap(), 2);
/// ```
pub fn count_matches(markup: &str, selector: &str) -> Result<usize, MatchError> {
    let query = ScraperDocument.compile(selector)?;
    ScraperDocument.count_matches(markup, &query)
}
