//! Owned XML tree built from `quick-xml` events.
//!
//! The tree keeps everything the normalizer must round-trip: the doctype,
//! comments and processing instructions around and inside the root, and
//! attributes in source order. Whitespace-only text between tags is
//! dropped, the same way a blank-text-removing parser would, so that the
//! writer can re-indent the document canonically. Inside mixed content
//! (once the parent already holds text) blank runs are kept, and any other
//! text is kept verbatim.
//!
//! Every element records the source lines it spans; diagnostics use them
//! to point at the offending `<repo>`, `<owner>` or `<email>`.

use crate::error::{Error, Result};
use crate::models::Span;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;
use std::io::Read;
use std::path::Path;

/// A node inside the prolog, the root, or the epilog.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Comment(String),
    Text(String),
    CData(String),
    Instruction(String),
    DocType(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }
}

/// An element with its attributes, children, and source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
    pub span: Span,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            span: Span::default(),
        }
    }

    /// Child elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// First child element called `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    /// Follow a `/`-separated path of child names, e.g. `owner/email`.
    pub fn find(&self, path: &str) -> Option<&Element> {
        path.split('/').try_fold(self, |cur, step| cur.child(step))
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Leading character data of the element, if any.
    pub fn text(&self) -> Option<&str> {
        match self.children.first() {
            Some(Node::Text(t)) | Some(Node::CData(t)) => Some(t.as_str()),
            _ => None,
        }
    }
}

/// A parsed document: prolog nodes, a single root element, epilog nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Label used in parse errors and diagnostics (usually the path).
    pub file: String,
    pub prolog: Vec<Node>,
    pub root: Element,
    pub epilog: Vec<Node>,
}

impl Document {
    /// Parse a document held in memory.
    pub fn parse(src: &str) -> Result<Self> {
        Self::parse_named(src, "<memory>")
    }

    /// Read and parse the file at `path`, labelling the document `label`.
    pub fn load_as(path: &Path, label: &str) -> Result<Self> {
        let src = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        tracing::debug!(file = %path.display(), bytes = src.len(), "loaded document");
        Self::parse_named(&src, label)
    }

    /// Parse everything `reader` yields; `label` names the stream in errors.
    pub fn from_reader(mut reader: impl Read, label: &str) -> Result<Self> {
        let mut src = String::new();
        reader
            .read_to_string(&mut src)
            .map_err(|e| Error::io(label, e))?;
        Self::parse_named(&src, label)
    }

    /// Parse `src`, reporting errors against `label`.
    pub fn parse_named(src: &str, label: &str) -> Result<Self> {
        TreeBuilder::new(src, label).build()
    }

    /// The doctype body (`repositories SYSTEM "..."`) if the prolog has one.
    pub fn doctype(&self) -> Option<&str> {
        self.prolog.iter().find_map(|n| match n {
            Node::DocType(d) => Some(d.as_str()),
            _ => None,
        })
    }
}

/// Maps byte offsets to 1-based line numbers.
struct LineIndex {
    newlines: Vec<usize>,
}

impl LineIndex {
    fn new(src: &str) -> Self {
        LineIndex {
            newlines: src
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i)
                .collect(),
        }
    }

    fn line_of(&self, offset: usize) -> usize {
        self.newlines.partition_point(|&n| n < offset) + 1
    }
}

struct TreeBuilder<'a> {
    src: &'a str,
    label: &'a str,
    lines: LineIndex,
    stack: Vec<Element>,
    prolog: Vec<Node>,
    root: Option<Element>,
    epilog: Vec<Node>,
}

impl<'a> TreeBuilder<'a> {
    fn new(src: &'a str, label: &'a str) -> Self {
        TreeBuilder {
            src,
            label,
            lines: LineIndex::new(src),
            stack: Vec::new(),
            prolog: Vec::new(),
            root: None,
            epilog: Vec::new(),
        }
    }

    fn build(mut self) -> Result<Document> {
        let mut reader = Reader::from_str(self.src);
        loop {
            let before = reader.buffer_position() as usize;
            let event = match reader.read_event() {
                Ok(ev) => ev,
                Err(e) => {
                    let at = reader.buffer_position() as usize;
                    return Err(self.error_at(at, e.to_string()));
                }
            };
            let after = reader.buffer_position() as usize;
            match event {
                Event::Start(e) => {
                    let mut el = self.open(&e, before)?;
                    el.span.start = self.start_line(before);
                    self.stack.push(el);
                }
                Event::Empty(e) => {
                    let mut el = self.open(&e, before)?;
                    el.span = Span::new(self.start_line(before), self.end_line(after));
                    self.close(el, before)?;
                }
                Event::End(_) => {
                    let Some(mut el) = self.stack.pop() else {
                        return Err(self.error_at(before, "closing tag without an open element"));
                    };
                    el.span.end = self.end_line(after);
                    self.close(el, before)?;
                }
                Event::Text(t) => {
                    let text = t
                        .unescape()
                        .map_err(|e| self.error_at(before, e.to_string()))?;
                    if !text.trim().is_empty() || self.parent_holds_text() {
                        self.push_content(Node::Text(text.into_owned()), before)?;
                    }
                }
                Event::CData(c) => {
                    let text = String::from_utf8_lossy(&c.into_inner()).into_owned();
                    self.push_content(Node::CData(text), before)?;
                }
                Event::Comment(c) => {
                    let text = String::from_utf8_lossy(&c).into_owned();
                    self.push_misc(Node::Comment(text));
                }
                Event::PI(p) => {
                    let text = String::from_utf8_lossy(&p).into_owned();
                    self.push_misc(Node::Instruction(text));
                }
                Event::DocType(d) => {
                    if self.root.is_some() || !self.stack.is_empty() {
                        return Err(self.error_at(before, "doctype after the root element"));
                    }
                    let text = String::from_utf8_lossy(&d).trim().to_string();
                    self.prolog.push(Node::DocType(text));
                }
                Event::Decl(_) => {}
                Event::Eof => break,
            }
        }
        if let Some(open) = self.stack.last() {
            let msg = format!("element <{}> is never closed", open.name);
            return Err(self.error_at(self.src.len(), msg));
        }
        let Some(root) = self.root else {
            return Err(self.error_at(self.src.len(), "document has no root element"));
        };
        Ok(Document {
            file: self.label.to_string(),
            prolog: self.prolog,
            root,
            epilog: self.epilog,
        })
    }

    fn open(&self, start: &BytesStart<'_>, at: usize) -> Result<Element> {
        let mut el = Element::new(String::from_utf8_lossy(start.name().as_ref()));
        for attr in start.attributes() {
            let attr = attr.map_err(|e| self.error_at(at, e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value: Cow<'_, str> = attr
                .unescape_value()
                .map_err(|e| self.error_at(at, e.to_string()))?;
            el.attributes.push((key, value.into_owned()));
        }
        Ok(el)
    }

    fn close(&mut self, el: Element, at: usize) -> Result<()> {
        if let Some(parent) = self.stack.last_mut() {
            parent.children.push(Node::Element(el));
            return Ok(());
        }
        if self.root.is_some() {
            return Err(self.error_at(at, format!("second root element <{}>", el.name)));
        }
        self.root = Some(el);
        Ok(())
    }

    fn push_content(&mut self, node: Node, at: usize) -> Result<()> {
        match self.stack.last_mut() {
            Some(parent) => {
                parent.children.push(node);
                Ok(())
            }
            None => Err(self.error_at(at, "character data outside the root element")),
        }
    }

    /// Blank text is content once its parent already carries character data.
    fn parent_holds_text(&self) -> bool {
        self.stack.last().is_some_and(|parent| {
            parent
                .children
                .iter()
                .any(|n| matches!(n, Node::Text(_) | Node::CData(_)))
        })
    }

    fn push_misc(&mut self, node: Node) {
        if let Some(parent) = self.stack.last_mut() {
            parent.children.push(node);
        } else if self.root.is_some() {
            self.epilog.push(node);
        } else {
            self.prolog.push(node);
        }
    }

    /// Line of the first non-blank byte at or after `offset`.
    fn start_line(&self, offset: usize) -> usize {
        let rest = &self.src[offset.min(self.src.len())..];
        let skipped = rest.len() - rest.trim_start().len();
        self.lines.line_of(offset + skipped)
    }

    /// Line of the last byte before `offset`.
    fn end_line(&self, offset: usize) -> usize {
        self.lines.line_of(offset.saturating_sub(1))
    }

    fn error_at(&self, offset: usize, message: impl Into<String>) -> Error {
        Error::Parse {
            file: self.label.to_string(),
            line: self.lines.line_of(offset.min(self.src.len())),
            message: message.into(),
        }
    }
}
