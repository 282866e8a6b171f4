//! Registry checker for CI.
//!
//! Compares the proposed registry (`current`) with the accepted one
//! (`base`) and audits only the overlays that were added:
//! - the owner email must exist in the user directory;
//! - the overlay must sit between neighbours that sort before and after it
//!   (case-insensitive).
//!
//! Without a base every overlay counts as added, which turns the run into
//! a full audit of the list. All problems are collected; nothing stops at
//! the first failure.

use crate::directory::{Directory, Lookup};
use crate::models::{CheckReport, Diagnostic, RepoEntry, Summary, Verified};
use crate::overlay::Listing;
use rayon::prelude::*;
use std::collections::HashSet;
use std::hash::Hash;

pub const UNKNOWN_EMAIL: &str = "Unknown email";
pub const LOOKUP_FAILED: &str = "Failed check against user directory";
pub const UNSORTED: &str = "Unsorted overlay list";

/// Indices of `items` whose key does not occur among `others`, in order.
pub fn difference_by<'a, T, K, F>(items: &'a [T], others: &'a [T], key: F) -> Vec<usize>
where
    K: Eq + Hash,
    F: Fn(&'a T) -> K,
{
    let known: HashSet<K> = others.iter().map(&key).collect();
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| !known.contains(&key(*item)))
        .map(|(i, _)| i)
        .collect()
}

/// Overlays are the same overlay iff their names match exactly.
pub fn overlay_key(entry: &RepoEntry) -> &str {
    entry.name.as_str()
}

/// Run every check and assemble the report.
///
/// `directory = None` skips the email lookups.
pub fn run_check(
    current: &Listing,
    base: Option<&Listing>,
    directory: Option<&dyn Directory>,
) -> CheckReport {
    let additions: Vec<usize> = match base {
        Some(base) => difference_by(&current.entries, &base.entries, overlay_key),
        None => (0..current.entries.len()).collect(),
    };
    tracing::debug!(
        file = %current.file,
        entries = current.entries.len(),
        additions = additions.len(),
        full_audit = base.is_none(),
        "checking overlays"
    );

    let mut diagnostics = current.diagnostics.clone();
    let mut verified = Vec::new();

    if let Some(directory) = directory {
        let outcomes: Vec<EmailOutcome> = additions
            .par_iter()
            .filter_map(|&i| check_email(&current.entries[i], &current.file, directory))
            .collect();
        for outcome in outcomes {
            match outcome {
                EmailOutcome::Verified(v) => verified.push(v),
                EmailOutcome::Problem(d) => diagnostics.push(d),
            }
        }
    }

    for &i in &additions {
        if let Some(d) = check_position(&current.entries, i, &current.file) {
            diagnostics.push(d);
        }
    }

    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    CheckReport {
        file: current.file.clone(),
        summary: Summary {
            errors,
            warnings: diagnostics.len() - errors,
            entries: current.entries.len(),
            additions: additions.len(),
        },
        diagnostics,
        verified,
    }
}

enum EmailOutcome {
    Verified(Verified),
    Problem(Diagnostic),
}

fn check_email(entry: &RepoEntry, file: &str, directory: &dyn Directory) -> Option<EmailOutcome> {
    let email = entry.owner_email.as_deref()?;
    let outcome = match directory.lookup(email) {
        Lookup::Found => EmailOutcome::Verified(Verified {
            name: entry.name.clone(),
            email: email.to_string(),
        }),
        Lookup::NotFound { .. } => EmailOutcome::Problem(Diagnostic::error(
            file,
            entry.email_span,
            UNKNOWN_EMAIL,
            format!("email address \"{email}\" not found in the user directory"),
        )),
        Lookup::Unavailable(reason) => {
            tracing::warn!(email, %reason, "user directory unavailable");
            EmailOutcome::Problem(Diagnostic::warning(
                file,
                entry.email_span,
                LOOKUP_FAILED,
                format!("Checking for email [{email}] failed"),
            ))
        }
    };
    Some(outcome)
}

/// Compare the entry at `index` with its immediate neighbours.
///
/// Equal keys count as out of order, so case-insensitive duplicates that
/// sit next to each other are reported here too.
fn check_position(entries: &[RepoEntry], index: usize, file: &str) -> Option<Diagnostic> {
    let entry = &entries[index];
    let key = entry.sort_key();
    let before = index
        .checked_sub(1)
        .map(|p| &entries[p])
        .is_some_and(|prev| prev.sort_key() >= key);
    let after = entries
        .get(index + 1)
        .is_some_and(|next| next.sort_key() <= key);
    (before || after).then(|| {
        Diagnostic::error(
            file,
            entry.span,
            UNSORTED,
            format!("overlay \"{}\" in wrong place", entry.name),
        )
    })
}
