//! Result records: a discovered URL, how it was referenced, and where

use serde::Serialize;
use std::fmt;
use url::Url;

/// Where on a page a reference was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum SourceKind {
    /// `<a href="...">`
    #[serde(rename = "href")]
    Href,
    /// `<script src="...">`
    #[serde(rename = "script")]
    Script,
    /// `<form action="...">`
    #[serde(rename = "form")]
    FormAction,
}

impl SourceKind {
    /// Stable lowercase label used in every export format
    pub fn label(&self) -> &'static str {
        match self {
            Self::Href => "href",
            Self::Script => "script",
            Self::FormAction => "form",
        }
    }

    /// Only hyperlinks are followed; scripts and forms are leaves
    pub fn is_followable(&self) -> bool {
        matches!(self, Self::Href)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A discovered, in-scope reference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FoundReference {
    /// Canonical URL of the reference
    pub url: Url,

    /// Kind of element the reference came from
    pub source_kind: SourceKind,

    /// Canonical URL of the page the reference was found on
    pub origin: Option<Url>,
}

impl FoundReference {
    pub fn new(url: Url, source_kind: SourceKind, origin: Option<Url>) -> Self {
        Self {
            url,
            source_kind,
            origin,
        }
    }

    /// Origin as a string, empty when there is none
    pub fn origin_str(&self) -> &str {
        self.origin.as_ref().map(Url::as_str).unwrap_or("")
    }
}
