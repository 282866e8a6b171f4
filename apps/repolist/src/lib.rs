//! repolist core library.
//!
//! This crate exposes programmatic APIs for maintaining an overlay registry
//! (`repositories.xml`): validating proposed additions, normalizing entry
//! order, and removing insecure source links.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `xml`: Document loader and pretty printer.
//! - `overlay`: Overlay record extraction from `<repo>` elements.
//! - `directory`: User-directory lookups for owner emails.
//! - `check`: Addition checks (owner email, sort position).
//! - `sort`: Deterministic ordering of `<repo>` entries.
//! - `strip`: Insecure source detection and removal.
//! - `models`: Diagnostics, reports, and overlay records.
//! - `output`: Human/GitHub/JSON printers.
//! - `utils`: Supporting helpers.
pub mod check;
pub mod cli;
pub mod config;
pub mod directory;
pub mod error;
pub mod models;
pub mod output;
pub mod overlay;
pub mod sort;
pub mod strip;
pub mod utils;
pub mod xml;

pub use error::{Error, Result};
