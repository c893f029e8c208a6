//! Analysis modules.
//!
//! Metadata extraction, run filtering, parsing of the primary and
//! companion files, and the aggregator that combines them into rows.

pub mod aggregator;
pub mod companion;
pub mod filter;
pub mod metadata;
pub mod primary;

use std::borrow::Cow;

pub use aggregator::RunAggregator;
pub use filter::RunFilter;

/// Rewrite `\r\n` and lone `\r` line endings as `\n`, so that
/// `str::lines` splits files written with any convention.
pub(crate) fn normalize_newlines(content: &str) -> Cow<'_, str> {
    if content.contains('\r') {
        Cow::Owned(content.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(content)
    }
}
