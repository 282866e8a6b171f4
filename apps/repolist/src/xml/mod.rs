//! Minimal XML document model: an event-driven loader and a pretty printer.

pub mod document;
pub mod writer;

pub use document::{Document, Element, Node};
pub use writer::render;
