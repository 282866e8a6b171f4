//! Registry normalizer.
//!
//! Sorts the `<repo>` children of `<repositories>` by name, ignoring case,
//! and pretty-prints the result. Design notes:
//! - The sort is stable: overlays whose names compare equal keep their
//!   relative order.
//! - Sorted repos go back into the child slots repos occupied before, so
//!   comments and other siblings keep their positions.
//! - Editor modelines (comments starting with ` vim:`) are moved, in
//!   order, to the end of the root.

use crate::error::{Error, Result};
use crate::xml::{render, Document, Element, Node};
use std::path::Path;

pub const ROOT: &str = "repositories";
const MODELINE_PREFIX: &str = " vim:";

/// Name of a `<repo>`; a missing or empty `<name>` is a structure error.
pub fn repo_name(repo: &Element) -> Result<&str> {
    repo.child("name")
        .and_then(Element::text)
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| {
            Error::Structure(format!(
                "<repo> at line {} has no <name>",
                repo.span.start
            ))
        })
}

/// Reorder the document in place.
pub fn normalize(doc: &mut Document) -> Result<()> {
    if doc.root.name != ROOT {
        return Err(Error::Structure(format!(
            "root element is <{}>, expected <{ROOT}>",
            doc.root.name
        )));
    }
    sort_repos(&mut doc.root)?;
    move_modelines_last(&mut doc.root);
    Ok(())
}

/// Parse, normalize and render `src`.
pub fn sort_str(src: &str, label: &str) -> Result<String> {
    let mut doc = Document::parse_named(src, label)?;
    normalize(&mut doc)?;
    Ok(render(&doc))
}

/// Normalize the file at `path`, returning the original and the rendered text.
pub fn sort_file(path: &Path) -> Result<(String, String)> {
    let original = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let sorted = sort_str(&original, &path.to_string_lossy())?;
    Ok((original, sorted))
}

fn sort_repos(root: &mut Element) -> Result<()> {
    let mut keyed = Vec::new();
    for (i, node) in root.children.iter().enumerate() {
        if let Node::Element(el) = node {
            if el.name == "repo" {
                keyed.push((repo_name(el)?.to_lowercase(), i));
            }
        }
    }
    let slots: Vec<usize> = keyed.iter().map(|(_, i)| *i).collect();
    // `sort_by` is stable.
    keyed.sort_by(|a, b| a.0.cmp(&b.0));

    let mut taken: Vec<Option<Node>> = root.children.drain(..).map(Some).collect();
    let repos: Vec<Node> = keyed
        .iter()
        .filter_map(|(_, i)| taken[*i].take())
        .collect();
    for (slot, repo) in slots.iter().zip(repos) {
        taken[*slot] = Some(repo);
    }
    root.children = taken.into_iter().flatten().collect();
    tracing::debug!(repos = slots.len(), "sorted repo nodes");
    Ok(())
}

fn move_modelines_last(root: &mut Element) {
    let (modelines, rest): (Vec<Node>, Vec<Node>) = std::mem::take(&mut root.children)
        .into_iter()
        .partition(is_modeline);
    root.children = rest;
    root.children.extend(modelines);
}

fn is_modeline(node: &Node) -> bool {
    matches!(node, Node::Comment(c) if c.starts_with(MODELINE_PREFIX))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(name: &str) -> String {
        format!("<repo><name>{name}</name><owner><email>{name}@example.org</email></owner></repo>")
    }

    fn names(rendered: &str) -> Vec<String> {
        let doc = Document::parse(rendered).unwrap();
        doc.root
            .elements()
            .filter(|e| e.name == "repo")
            .map(|e| repo_name(e).unwrap().to_string())
            .collect()
    }

    fn sort(src: &str) -> String {
        sort_str(src, "repositories.xml").unwrap()
    }

    #[test]
    fn sorts_case_insensitively() {
        let src = format!("<repositories>{}{}{}</repositories>", repo("Bar"), repo("apple"), repo("Zed"));
        assert_eq!(names(&sort(&src)), vec!["apple", "Bar", "Zed"]);
    }

    #[test]
    fn equal_keys_keep_source_order() {
        let src = "<repositories>\
            <repo><name>Dup</name><description>first</description></repo>\
            <repo><name>alpha</name></repo>\
            <repo><name>dup</name><description>second</description></repo>\
            <repo><name>DUP</name><description>third</description></repo>\
            </repositories>";
        let out = sort(src);
        let doc = Document::parse(&out).unwrap();
        let order: Vec<_> = doc
            .root
            .elements()
            .map(|r| {
                r.child("description")
                    .and_then(Element::text)
                    .unwrap_or("-")
                    .to_string()
            })
            .collect();
        assert_eq!(order, vec!["-", "first", "second", "third"]);
    }

    #[test]
    fn comments_keep_their_slots_and_modeline_moves_last() {
        let src = format!(
            "<!DOCTYPE repositories SYSTEM \"https://www.gentoo.org/dtd/repositories.dtd\">\n\
             <repositories version=\"1.0\">\n<!-- header -->\n{}\n<!-- vim:set ts=2: -->\n{}\n<!-- middle -->\n{}\n</repositories>\n",
            repo("zed"),
            repo("mango"),
            repo("apple")
        );
        let out = sort(&src);
        let expected = "<?xml version='1.0' encoding='UTF-8'?>
<!DOCTYPE repositories SYSTEM \"https://www.gentoo.org/dtd/repositories.dtd\">
<repositories version=\"1.0\">
  <!-- header -->
  <repo>
    <name>apple</name>
    <owner>
      <email>apple@example.org</email>
    </owner>
  </repo>
  <repo>
    <name>mango</name>
    <owner>
      <email>mango@example.org</email>
    </owner>
  </repo>
  <!-- middle -->
  <repo>
    <name>zed</name>
    <owner>
      <email>zed@example.org</email>
    </owner>
  </repo>
  <!-- vim:set ts=2: -->
</repositories>
";
        assert_eq!(out, expected);
    }

    #[test]
    fn several_modelines_keep_relative_order() {
        let src = format!(
            "<repositories><!-- vim:one --><!-- other -->{}<!-- vim:two --></repositories>",
            repo("a")
        );
        let doc = Document::parse(&sort(&src)).unwrap();
        let comments: Vec<_> = doc
            .root
            .children
            .iter()
            .filter_map(|n| match n {
                Node::Comment(c) => Some(c.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(comments, vec![" other ", " vim:one ", " vim:two "]);
    }

    #[test]
    fn mixed_content_whitespace_survives() {
        let src = "<repositories><repo><name>a</name>\
            <description>use <b>x</b> <i>y</i></description></repo></repositories>";
        let out = sort(src);
        assert!(
            out.contains("    <description>use <b>x</b> <i>y</i></description>\n"),
            "{out}"
        );
        assert_eq!(sort(&out), out);
    }

    #[test]
    fn comment_after_root_stays_after_root() {
        let src = format!(
            "<repositories>{}{}</repositories>\n<!-- vim: set ts=2: -->\n",
            repo("b"),
            repo("a")
        );
        let doc = Document::parse(&sort(&src)).unwrap();
        assert!(matches!(
            doc.epilog.as_slice(),
            [Node::Comment(c)] if c == " vim: set ts=2: "
        ));
        assert!(doc
            .root
            .children
            .iter()
            .all(|n| !matches!(n, Node::Comment(_))));
    }

    #[test]
    fn normalization_is_idempotent() {
        let src = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!-- top -->\n<repositories>\n  <!-- vim: ft=xml -->\n{}\n{}\n  <!-- x -->\n{}\n</repositories>\n",
            repo("b"),
            repo("C"),
            repo("a")
        );
        let once = sort(&src);
        let twice = sort(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn preserves_every_repo() {
        let src = format!(
            "<repositories>{}{}{}{}</repositories>",
            repo("x"),
            repo("b"),
            repo("x"),
            repo("A")
        );
        let mut got = names(&sort(&src));
        got.sort();
        assert_eq!(got, vec!["A", "b", "x", "x"]);
    }

    #[test]
    fn wrong_root_is_structure_error() {
        let err = sort_str("<overlays><repo><name>a</name></repo></overlays>", "f").unwrap_err();
        assert!(matches!(err, Error::Structure(_)));
    }

    #[test]
    fn nameless_repo_is_structure_error() {
        let err = sort_str(
            "<repositories>\n<repo><name>a</name></repo>\n<repo><owner/></repo>\n</repositories>",
            "f",
        )
        .unwrap_err();
        match err {
            Error::Structure(msg) => assert!(msg.contains("line 3"), "{msg}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_input_is_parse_error() {
        assert!(matches!(
            sort_str("<repositories><repo>", "f"),
            Err(Error::Parse { .. })
        ));
    }
}
