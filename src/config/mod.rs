//! Site profile module for Linkmap
//!
//! A site profile is the data that tailors the generic crawl engine to one
//! site: content selectors, path rules, title cleanup and limits. Profiles are
//! written in TOML, validated on load and compiled before a crawl starts.
//!
//! # Example
//!
//! ```no_run
//! use linkmap::config::{load_profile, CompiledProfile};
//! use std::path::Path;
//!
//! let profile = load_profile(Path::new("profiles/example.toml")).unwrap();
//! let compiled = CompiledProfile::compile(&profile).unwrap();
//! println!("Crawling {}", compiled.domain());
//! ```

mod compiled;
mod parser;
mod presets;
mod types;
mod validation;

pub use compiled::CompiledProfile;
pub use parser::{compute_profile_hash, load_profile, load_profile_with_hash, parse_profile};
pub use types::{
    ClassifyConfig, CrawlerConfig, DefaultPolicy, ExtractConfig, SiteConfig, SiteProfile,
    UserAgentConfig,
};
pub use validation::validate_base_url;
