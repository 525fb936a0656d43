use crate::config::types::SiteProfile;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and validates a site profile from a TOML file
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use linkmap::config::load_profile;
///
/// let profile = load_profile(Path::new("profiles/example.toml")).unwrap();
/// println!("Target domain: {}", profile.site.domain);
/// ```
pub fn load_profile(path: &Path) -> Result<SiteProfile, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_profile(&content)
}

/// Parses and validates a site profile from TOML text
pub fn parse_profile(content: &str) -> Result<SiteProfile, ConfigError> {
    let profile: SiteProfile = toml::from_str(content)?;
    validate(&profile)?;
    Ok(profile)
}

/// Computes a SHA-256 hash of the profile file content
///
/// Recorded alongside each stored run so reports can be traced back to the
/// exact profile that produced them.
pub fn compute_profile_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a profile and returns both the profile and its hash
pub fn load_profile_with_hash(path: &Path) -> Result<(SiteProfile, String), ConfigError> {
    let profile = load_profile(path)?;
    let hash = compute_profile_hash(path)?;
    Ok((profile, hash))
}
