//! Link extraction from fetched pages
//!
//! The extractor only finds raw references and classifies them; resolving
//! and filtering them is left to the normalizer and scope policy.

use crate::output::SourceKind;
use crate::ExtractError;
use scraper::{Html, Selector};
use url::Url;

/// A raw reference found in a page, not yet normalized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLink {
    /// Attribute value exactly as written in the page
    pub raw: String,

    pub kind: SourceKind,
}

impl CandidateLink {
    pub fn new(raw: impl Into<String>, kind: SourceKind) -> Self {
        Self {
            raw: raw.into(),
            kind,
        }
    }
}

/// Finds candidate references in a page body
pub trait LinkExtractor: Send + Sync {
    /// Returns the references in `body` in document order
    ///
    /// `base` is the URL the body was fetched from.
    fn extract(&self, body: &str, base: &Url) -> Result<Vec<CandidateLink>, ExtractError>;
}

/// HTML extractor built on scraper
///
/// # Extraction Rules
///
/// - `<a href="...">` → `SourceKind::Href`
/// - `<script src="...">` → `SourceKind::Script`
/// - `<form action="...">` → `SourceKind::FormAction`
///
/// Inline scripts, forms without an action and every other element are
/// ignored. Values are returned untouched, including `javascript:` and
/// fragment-only references, which the normalizer rejects.
#[derive(Debug, Clone)]
pub struct HtmlExtractor {
    selector: Selector,
}

impl HtmlExtractor {
    const SELECTOR: &'static str = "a[href], script[src], form[action]";

    pub fn new() -> Result<Self, ExtractError> {
        let selector =
            Selector::parse(Self::SELECTOR).map_err(|e| ExtractError(format!("{:?}", e)))?;
        Ok(Self { selector })
    }
}

impl LinkExtractor for HtmlExtractor {
    fn extract(&self, body: &str, _base: &Url) -> Result<Vec<CandidateLink>, ExtractError> {
        let document = Html::parse_document(body);

        let links = document
            .select(&self.selector)
            .filter_map(|element| {
                let element = element.value();
                let (attr, kind) = match element.name() {
                    "a" => ("href", SourceKind::Href),
                    "script" => ("src", SourceKind::Script),
                    "form" => ("action", SourceKind::FormAction),
                    _ => return None,
                };
                element
                    .attr(attr)
                    .map(|value| CandidateLink::new(value, kind))
            })
            .collect();

        Ok(links)
    }
}
