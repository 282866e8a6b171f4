//! Read-only view of one `<repo>` element.

use super::Span;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// One overlay record as extracted from the registry.
///
/// `name` is empty when the `<name>` tag is missing; the record still takes
/// part in ordering and diffing under that key. `owner_email` is `None`
/// whenever no usable `<owner><email>` exists, which also disables the
/// directory lookup for the record.
pub struct RepoEntry {
    pub name: String,
    pub owner_email: Option<String>,
    pub span: Span,
    /// Location of `<email>`, falling back to the repo span.
    pub email_span: Span,
    pub sources: Vec<SourceRef>,
}

impl RepoEntry {
    /// Case-insensitive sort key.
    pub fn sort_key(&self) -> String {
        self.name.to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A `<source>` link of an overlay.
pub struct SourceRef {
    /// Value of the `type` attribute (git, mercurial, ...), if present.
    pub kind: Option<String>,
    pub url: String,
    pub span: Span,
}
