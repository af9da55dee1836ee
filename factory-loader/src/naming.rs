//! Workspace name suffixes.

use rand::Rng;

/// Kubernetes object names are DNS labels.
pub const MAX_NAME_LENGTH: usize = 63;
pub const SUFFIX_LENGTH: usize = 4;

const SUFFIX_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

pub trait SuffixGenerator: Send + Sync {
    fn generate(&self, len: usize) -> anyhow::Result<String>;
}

/// Random lowercase alphanumeric suffixes.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSuffix;

impl SuffixGenerator for RandomSuffix {
    fn generate(&self, len: usize) -> anyhow::Result<String> {
        let mut rng = rand::rng();
        Ok((0..len)
            .map(|_| SUFFIX_CHARSET[rng.random_range(0..SUFFIX_CHARSET.len())] as char)
            .collect())
    }
}

/// Always the same suffix. Handy for reproducible output.
#[derive(Debug, Clone)]
pub struct FixedSuffix(pub String);

impl SuffixGenerator for FixedSuffix {
    fn generate(&self, _len: usize) -> anyhow::Result<String> {
        Ok(self.0.clone())
    }
}

/// `base + separator + suffix`, cutting the base so the result fits
/// [`MAX_NAME_LENGTH`]. The suffix is never shortened.
pub fn compose(base: &str, separator: &str, suffix: &str) -> String {
    let tail = separator.chars().count() + suffix.chars().count();
    let keep = MAX_NAME_LENGTH.saturating_sub(tail);
    let base: String = base.chars().take(keep).collect();
    format!("{base}{separator}{suffix}")
}

/// Final name for a `generateName` template.
pub fn from_template(template: &str, suffix: &str) -> String {
    compose(template, "", suffix)
}

/// Existing name made unique.
pub fn with_suffix(name: &str, suffix: &str) -> String {
    compose(name, "-", suffix)
}
