//! Content classification
//!
//! Two independent predicates driven by the site profile:
//! - [`is_content`] decides from a normalized URL whether it is worth crawling
//! - [`is_excluded_document`] decides from a fetched page whether it must be
//!   kept out of the graph (noindex, cushion pages, profile rules)

mod document;
mod path_rules;

pub use document::{is_excluded_document, ExclusionReason};
pub use path_rules::is_content;
