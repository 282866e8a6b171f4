//! Pretty printer for [`Document`].
//!
//! Output layout:
//! - `<?xml version='1.0' encoding='UTF-8'?>` declaration, then the prolog
//!   (doctype, comments) one node per line.
//! - Two-space indentation per depth level.
//! - Empty elements self-close; elements holding character data are kept
//!   on one line together with everything inside them.
//! - A trailing newline after the last node.

use super::document::{Document, Element, Node};
use quick_xml::escape::{escape, partial_escape};

const DECLARATION: &str = "<?xml version='1.0' encoding='UTF-8'?>";
const INDENT: &str = "  ";

/// Serialize the whole document.
pub fn render(doc: &Document) -> String {
    let mut out = String::with_capacity(4096);
    out.push_str(DECLARATION);
    out.push('\n');
    for node in &doc.prolog {
        write_block(&mut out, node, 0);
    }
    write_element(&mut out, &doc.root, 0);
    for node in &doc.epilog {
        write_block(&mut out, node, 0);
    }
    out
}

fn write_block(out: &mut String, node: &Node, depth: usize) {
    match node {
        Node::Element(el) => write_element(out, el, depth),
        other => {
            push_indent(out, depth);
            write_inline(out, other);
            out.push('\n');
        }
    }
}

fn write_element(out: &mut String, el: &Element, depth: usize) {
    push_indent(out, depth);
    write_open(out, el);
    if el.children.is_empty() {
        out.push_str("/>\n");
        return;
    }
    out.push('>');
    if holds_text(el) {
        for child in &el.children {
            write_inline(out, child);
        }
    } else {
        out.push('\n');
        for child in &el.children {
            write_block(out, child, depth + 1);
        }
        push_indent(out, depth);
    }
    write_close(out, el);
    out.push('\n');
}

/// Compact form used inside text-bearing elements, where added whitespace
/// would change the content.
fn write_inline(out: &mut String, node: &Node) {
    match node {
        Node::Element(el) => {
            write_open(out, el);
            if el.children.is_empty() {
                out.push_str("/>");
            } else {
                out.push('>');
                for child in &el.children {
                    write_inline(out, child);
                }
                write_close(out, el);
            }
        }
        Node::Text(t) => out.push_str(&partial_escape(t.as_str())),
        Node::CData(t) => {
            out.push_str("<![CDATA[");
            out.push_str(t);
            out.push_str("]]>");
        }
        Node::Comment(c) => {
            out.push_str("<!--");
            out.push_str(c);
            out.push_str("-->");
        }
        Node::Instruction(p) => {
            out.push_str("<?");
            out.push_str(p);
            out.push_str("?>");
        }
        Node::DocType(d) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(d);
            out.push('>');
        }
    }
}

fn write_open(out: &mut String, el: &Element) {
    out.push('<');
    out.push_str(&el.name);
    for (key, value) in &el.attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape(value.as_str()));
        out.push('"');
    }
}

fn write_close(out: &mut String, el: &Element) {
    out.push_str("</");
    out.push_str(&el.name);
    out.push('>');
}

fn holds_text(el: &Element) -> bool {
    el.children
        .iter()
        .any(|n| matches!(n, Node::Text(_) | Node::CData(_)))
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}
