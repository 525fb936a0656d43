//! URL handling module for Linkmap
//!
//! This module provides URL normalization, host extraction and the
//! target-domain check used to keep a crawl on one site.

mod domain;
mod matcher;
mod normalize;

pub use domain::{extract_domain, is_internal};
pub use matcher::matches_domain;
pub use normalize::normalize_url;
