//! Overlay record extraction.
//!
//! Turns each `<repo>` child of the registry root into a [`RepoEntry`].
//! Missing required fields never abort extraction: they produce an error
//! diagnostic and a substitute value (empty name, no email) so that the
//! remaining checks still run.

use crate::error::Result;
use crate::models::{Diagnostic, RepoEntry, SourceRef};
use crate::xml::{Document, Element};
use std::path::Path;

pub const MISSING_NAME: &str = "Missing overlay name";
pub const MISSING_EMAIL: &str = "Missing owner email";

/// Build the record for one `<repo>` element.
pub fn extract(repo: &Element, file: &str) -> (RepoEntry, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();

    let name = match repo.child("name") {
        Some(el) => el.text().unwrap_or_default().trim().to_string(),
        None => {
            diagnostics.push(Diagnostic::error(
                file,
                repo.span,
                MISSING_NAME,
                "Missing tag \"name\" for the overlay",
            ));
            String::new()
        }
    };

    // A present but empty `<email/>` leaves nothing to look up.
    let (owner_email, email_span) = match repo.find("owner/email") {
        Some(el) => (non_empty(el.text()), el.span),
        None => {
            let anchor = repo.child("owner").map_or(repo.span, |o| o.span);
            diagnostics.push(Diagnostic::error(
                file,
                anchor,
                MISSING_EMAIL,
                "Missing tag \"email\" for the overlay's owner",
            ));
            (None, anchor)
        }
    };

    let sources = repo
        .elements()
        .filter(|el| el.name == "source")
        .map(|el| SourceRef {
            kind: el.attribute("type").map(str::to_string),
            url: el.text().unwrap_or_default().trim().to_string(),
            span: el.span,
        })
        .collect();

    let entry = RepoEntry {
        name,
        owner_email,
        span: repo.span,
        email_span,
        sources,
    };
    (entry, diagnostics)
}

fn non_empty(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// All overlay records of one registry file, in document order.
#[derive(Debug, Clone)]
pub struct Listing {
    pub file: String,
    pub entries: Vec<RepoEntry>,
    /// Extraction problems (missing name or email).
    pub diagnostics: Vec<Diagnostic>,
}

impl Listing {
    /// Read the registry at `path`; diagnostics name it `label`.
    pub fn load(path: &Path, label: &str) -> Result<Self> {
        let doc = Document::load_as(path, label)?;
        Ok(Self::from_document(&doc))
    }

    pub fn from_document(doc: &Document) -> Self {
        let mut entries = Vec::new();
        let mut diagnostics = Vec::new();
        for repo in doc.root.elements().filter(|el| el.name == "repo") {
            let (entry, mut found) = extract(repo, &doc.file);
            entries.push(entry);
            diagnostics.append(&mut found);
        }
        tracing::debug!(file = %doc.file, entries = entries.len(), "extracted overlays");
        Listing {
            file: doc.file.clone(),
            entries,
            diagnostics,
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Span;

    fn listing(src: &str) -> Listing {
        Listing::from_document(&Document::parse_named(src, "repositories.xml").unwrap())
    }

    #[test]
    fn extracts_name_email_and_sources() {
        let l = listing(
            r#"<repositories>
  <repo>
    <name>guru</name>
    <owner type="project">
      <email>guru@example.org</email>
    </owner>
    <source type="git">https://example.org/guru.git</source>
    <source type="git">git://example.org/guru.git</source>
  </repo>
</repositories>"#,
        );
        assert!(l.diagnostics.is_empty());
        let e = &l.entries[0];
        assert_eq!(e.name, "guru");
        assert_eq!(e.owner_email.as_deref(), Some("guru@example.org"));
        assert_eq!(e.span, Span::new(2, 9));
        assert_eq!(e.email_span, Span::new(5, 5));
        assert_eq!(e.sources.len(), 2);
        assert_eq!(e.sources[1].url, "git://example.org/guru.git");
        assert_eq!(e.sources[0].kind.as_deref(), Some("git"));
    }

    #[test]
    fn missing_name_keeps_entry_with_empty_name() {
        let l = listing(
            "<repositories>\n<repo>\n<owner><email>x@example.org</email></owner>\n</repo>\n</repositories>",
        );
        assert_eq!(l.names(), vec![""]);
        assert_eq!(l.diagnostics.len(), 1);
        assert_eq!(l.diagnostics[0].title, MISSING_NAME);
        assert_eq!(l.diagnostics[0].span, Span::new(2, 4));
    }

    #[test]
    fn missing_email_anchors_to_owner() {
        let l = listing(
            "<repositories>\n<repo>\n<name>a</name>\n<owner>\n<name>Someone</name>\n</owner>\n</repo>\n</repositories>",
        );
        let e = &l.entries[0];
        assert!(e.owner_email.is_none());
        assert_eq!(l.diagnostics.len(), 1);
        assert_eq!(l.diagnostics[0].title, MISSING_EMAIL);
        assert_eq!(l.diagnostics[0].span, Span::new(4, 6));
    }

    #[test]
    fn missing_owner_anchors_to_repo() {
        let l = listing("<repositories>\n<repo>\n<name>a</name>\n</repo>\n</repositories>");
        assert_eq!(l.diagnostics.len(), 1);
        assert_eq!(l.diagnostics[0].span, Span::new(2, 4));
        assert!(l.diagnostics[0].is_error());
    }

    #[test]
    fn empty_email_has_no_address_and_no_diagnostic() {
        let l = listing("<repositories><repo><name>a</name><owner><email/></owner></repo></repositories>");
        assert!(l.entries[0].owner_email.is_none());
        assert!(l.diagnostics.is_empty());
    }

    #[test]
    fn load_labels_entries_and_diagnostics() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repositories.xml");
        std::fs::write(&path, "<repositories>\n<repo>\n<name>a</name>\n</repo>\n</repositories>\n").unwrap();
        let l = Listing::load(&path, "files/repositories.xml").unwrap();
        assert_eq!(l.file, "files/repositories.xml");
        assert_eq!(l.names(), vec!["a"]);
        assert_eq!(l.diagnostics[0].file, "files/repositories.xml");

        let missing = Listing::load(&dir.path().join("nope.xml"), "nope.xml");
        assert!(matches!(missing, Err(crate::Error::Io { .. })));
    }

    #[test]
    fn ignores_non_repo_children() {
        let l = listing("<repositories><!-- c --><other/><repo><name>a</name><owner><email>e@x</email></owner></repo></repositories>");
        assert_eq!(l.names(), vec!["a"]);
    }
}
