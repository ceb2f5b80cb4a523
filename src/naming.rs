// ABOUTME: Release naming: version-label and object-key suffix derivation.
// ABOUTME: Also defines RemoteKey, the (bucket, key) pair shared by upload and deploy.

use std::fmt;

use crate::config::Config;
use crate::output::Output;

/// Location of the artifact in the object store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteKey {
    pub bucket: String,
    pub key: String,
}

impl RemoteKey {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for RemoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// Append `suffix` to a version label.
pub fn suffix_version_label(label: &str, suffix: &str) -> String {
    format!("{label}{suffix}")
}

/// Insert `suffix` into an object key.
///
/// The key is split at its first `.`; the suffix goes between the base and
/// the extension. `.war` keys get Tomcat's `##` version marker so several
/// versions of the same context can be deployed side by side:
///
/// ```
/// use ebpush::naming::suffix_object_key;
///
/// assert_eq!(suffix_object_key("ROOT", "-1.0"), "ROOT-1.0");
/// assert_eq!(suffix_object_key("ROOT.txt", "-1.0"), "ROOT-1.0.txt");
/// assert_eq!(suffix_object_key("ROOT.war", "-1.0"), "ROOT##-1.0.war");
/// assert_eq!(suffix_object_key("a.b.c", "-x"), "a-x.b.c");
/// ```
pub fn suffix_object_key(key: &str, suffix: &str) -> String {
    if suffix.is_empty() {
        return key.to_string();
    }

    match key.split_once('.') {
        None => format!("{key}{suffix}"),
        Some((base, "war")) => format!("{base}##{suffix}.war"),
        Some((base, extension)) => format!("{base}{suffix}.{extension}"),
    }
}

/// Apply the configured suffixes to the version label and object key.
///
/// Empty or unset suffixes leave the corresponding field untouched.
pub fn apply_suffixes(config: &mut Config, output: &Output) {
    if let Some(suffix) = config.version_suffix.as_deref().filter(|s| !s.is_empty()) {
        output.info(&format!("Found version suffix: {suffix}"));
        config.version_label = suffix_version_label(&config.version_label, suffix);
    }

    if let Some(suffix) = config.key_suffix.as_deref().filter(|s| !s.is_empty()) {
        output.info(&format!("Found file key suffix: {suffix}"));
        config.key = suffix_object_key(&config.key, suffix);
    }
}
