//! Insecure source links.
//!
//! A `<source>` is insecure when its URL matches the configured pattern
//! (unauthenticated `git://` links by default). `strip_insecure` removes
//! them from every repo; `list_sources` reports them for review.

use crate::models::{Span, SourceRef};
use crate::overlay::extract;
use crate::xml::{Document, Element, Node};
use regex::Regex;
use serde::Serialize;

pub const DEFAULT_INSECURE: &str = "^git:";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A source link removed from the document.
pub struct StrippedSource {
    pub overlay: String,
    pub url: String,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
/// Source links of one overlay.
pub struct OverlaySources {
    pub name: String,
    pub sources: Vec<SourceStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceStatus {
    #[serde(flatten)]
    pub source: SourceRef,
    pub insecure: bool,
}

/// Remove every `<source>` of a `<repo>` whose text matches `insecure`.
pub fn strip_insecure(doc: &mut Document, insecure: &Regex) -> Vec<StrippedSource> {
    let mut removed = Vec::new();
    for node in doc.root.children.iter_mut() {
        let Node::Element(repo) = node else { continue };
        if repo.name != "repo" {
            continue;
        }
        let overlay = overlay_label(repo);
        repo.children.retain(|child| {
            let Node::Element(src) = child else { return true };
            if src.name != "source" {
                return true;
            }
            let url = src.text().unwrap_or_default().trim();
            if !insecure.is_match(url) {
                return true;
            }
            removed.push(StrippedSource {
                overlay: overlay.clone(),
                url: url.to_string(),
                span: src.span,
            });
            false
        });
    }
    tracing::debug!(removed = removed.len(), "stripped insecure sources");
    removed
}

/// Every overlay with its sources, flagging the insecure ones.
pub fn list_sources(doc: &Document, insecure: &Regex) -> Vec<OverlaySources> {
    doc.root
        .elements()
        .filter(|el| el.name == "repo")
        .map(|repo| {
            let (entry, _) = extract(repo, &doc.file);
            OverlaySources {
                name: entry.name,
                sources: entry
                    .sources
                    .into_iter()
                    .map(|source| SourceStatus {
                        insecure: insecure.is_match(&source.url),
                        source,
                    })
                    .collect(),
            }
        })
        .collect()
}

fn overlay_label(repo: &Element) -> String {
    repo.child("name")
        .and_then(Element::text)
        .map(|n| n.trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::render;

    const SRC: &str = r#"<repositories>
  <repo>
    <name>alpha</name>
    <source type="git">https://example.org/alpha.git</source>
    <source type="git">git://example.org/alpha.git</source>
  </repo>
  <repo>
    <name>beta</name>
    <source type="git">git://example.org/beta.git</source>
    <feed>https://example.org/beta.atom</feed>
  </repo>
</repositories>"#;

    fn pattern() -> Regex {
        Regex::new(DEFAULT_INSECURE).unwrap()
    }

    #[test]
    fn removes_only_matching_sources() {
        let mut doc = Document::parse(SRC).unwrap();
        let removed = strip_insecure(&mut doc, &pattern());
        assert_eq!(removed.len(), 2);
        assert_eq!(removed[0].overlay, "alpha");
        assert_eq!(removed[0].span, Span::new(5, 5));
        assert_eq!(removed[1].url, "git://example.org/beta.git");

        let out = render(&doc);
        assert!(!out.contains("git://"));
        assert!(out.contains("https://example.org/alpha.git"));
        assert!(out.contains("<feed>https://example.org/beta.atom</feed>"));
    }

    #[test]
    fn secure_document_is_unchanged() {
        let mut doc = Document::parse(SRC).unwrap();
        let before = doc.clone();
        let removed = strip_insecure(&mut doc, &Regex::new("^ftp:").unwrap());
        assert!(removed.is_empty());
        assert_eq!(doc, before);
    }

    #[test]
    fn lists_sources_with_flags() {
        let doc = Document::parse(SRC).unwrap();
        let listed = list_sources(&doc, &pattern());
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].name, "alpha");
        let flags: Vec<bool> = listed[0].sources.iter().map(|s| s.insecure).collect();
        assert_eq!(flags, vec![false, true]);
        assert_eq!(listed[1].sources[0].source.kind.as_deref(), Some("git"));
    }
}
