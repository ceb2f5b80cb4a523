// ABOUTME: Lazy, memoized credential resolver scoped to a single run.
// ABOUTME: The first source that yields a key pair wins; later sources are never read.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use thiserror::Error;

use crate::config::{CredentialsConfig, EnvValue};
use crate::diagnostics::{Diagnostics, Warning};

use super::properties;

const ENV_ACCESS_KEY: &str = "AWS_ACCESS_KEY_ID";
const ENV_SECRET_KEY: &str = "AWS_SECRET_ACCESS_KEY";
const ENV_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";

/// Property names accepted in a credentials file, in lookup order.
const FILE_ACCESS_KEYS: [&str; 2] = ["accessKey", "aws_access_key_id"];
const FILE_SECRET_KEYS: [&str; 2] = ["secretKey", "aws_secret_access_key"];

/// Which source produced a set of credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Explicit,
    File,
    Environment,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Explicit => write!(f, "explicit key pair"),
            CredentialSource::File => write!(f, "credentials file"),
            CredentialSource::Environment => write!(f, "environment"),
        }
    }
}

/// An access key / secret pair. Read-only once created.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    access_key: String,
    secret_key: String,
    session_token: Option<String>,
    source: CredentialSource,
}

impl Credentials {
    pub fn new(
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        source: CredentialSource,
    ) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            session_token: None,
            source,
        }
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .field("source", &self.source)
            .finish()
    }
}

/// No configured source produced credentials.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unable to load credentials ({})", .attempts.join("; "))]
pub struct NoCredentials {
    /// One line per source describing why it was unusable.
    pub attempts: Vec<String>,
}

/// Resolves credentials on first use and caches them for the rest of the run.
pub struct CredentialResolver {
    explicit: Option<(String, String)>,
    file: Option<PathBuf>,
    environment: bool,
    /// Set when a configured key points at an unset variable. Resolution
    /// fails with this instead of falling through to other sources.
    broken_reference: Option<String>,
    resolved: OnceLock<Credentials>,
}

impl CredentialResolver {
    pub fn new(
        explicit: Option<(String, String)>,
        file: Option<PathBuf>,
        environment: bool,
    ) -> Self {
        Self {
            explicit,
            file,
            environment,
            broken_reference: None,
            resolved: OnceLock::new(),
        }
    }

    /// Build a resolver from config, resolving any `{ env: ... }` values now.
    ///
    /// A half-configured pair (only one key usable) counts as absent. A key
    /// that names an unset variable without a default makes [`resolve`]
    /// fail, so other credentials are never picked up in its place.
    ///
    /// [`resolve`]: CredentialResolver::resolve
    pub fn from_config(config: &CredentialsConfig) -> Self {
        let mut broken_reference = None;
        let mut read = |value: Option<&EnvValue>| match value?.resolve() {
            Ok(resolved) => Some(resolved).filter(|v| !v.is_empty()),
            Err(err) => {
                broken_reference.get_or_insert_with(|| err.to_string());
                None
            }
        };
        let access = read(config.access_key.as_ref());
        let secret = read(config.secret_key.as_ref());
        let file = config
            .file
            .clone()
            .filter(|path| !path.as_os_str().is_empty());

        Self {
            broken_reference,
            ..Self::new(access.zip(secret), file, config.environment)
        }
    }

    /// Whether credentials have already been resolved.
    pub fn is_resolved(&self) -> bool {
        self.resolved.get().is_some()
    }

    /// Return the cached credentials, resolving them on first call.
    ///
    /// A credentials file that cannot be read or lacks the expected keys is
    /// treated as unavailable; the cause is recorded as a warning and the
    /// next source is tried.
    pub fn resolve(&self, diag: &mut Diagnostics) -> Result<&Credentials, NoCredentials> {
        if let Some(credentials) = self.resolved.get() {
            return Ok(credentials);
        }

        if let Some(reason) = &self.broken_reference {
            return Err(NoCredentials {
                attempts: vec![format!("explicit key pair unusable: {reason}")],
            });
        }

        let mut attempts = Vec::new();

        let found = self
            .try_explicit(&mut attempts)
            .or_else(|| self.try_file(&mut attempts, diag))
            .or_else(|| self.try_environment(&mut attempts));

        match found {
            Some(credentials) => {
                tracing::debug!(source = %credentials.source(), "credentials resolved");
                Ok(self.resolved.get_or_init(|| credentials))
            }
            None => Err(NoCredentials { attempts }),
        }
    }

    fn try_explicit(&self, attempts: &mut Vec<String>) -> Option<Credentials> {
        match &self.explicit {
            Some((access, secret)) => {
                Some(Credentials::new(access, secret, CredentialSource::Explicit))
            }
            None => {
                attempts.push("no explicit access key and secret key".to_string());
                None
            }
        }
    }

    fn try_file(&self, attempts: &mut Vec<String>, diag: &mut Diagnostics) -> Option<Credentials> {
        let Some(path) = &self.file else {
            attempts.push("no credentials file configured".to_string());
            return None;
        };

        match read_credentials_file(path) {
            Ok(credentials) => Some(credentials),
            Err(reason) => {
                let message = format!("credentials file '{}' unusable: {}", path.display(), reason);
                diag.warn(Warning::credentials_file(message.clone()));
                attempts.push(message);
                None
            }
        }
    }

    fn try_environment(&self, attempts: &mut Vec<String>) -> Option<Credentials> {
        if !self.environment {
            attempts.push("environment lookup disabled".to_string());
            return None;
        }

        let read = |name: &str| std::env::var(name).ok().filter(|v: &String| !v.is_empty());
        match (read(ENV_ACCESS_KEY), read(ENV_SECRET_KEY)) {
            (Some(access), Some(secret)) => {
                let credentials = Credentials::new(access, secret, CredentialSource::Environment);
                Some(match read(ENV_SESSION_TOKEN) {
                    Some(token) => credentials.with_session_token(token),
                    None => credentials,
                })
            }
            _ => {
                attempts.push(format!("{ENV_ACCESS_KEY}/{ENV_SECRET_KEY} not set"));
                None
            }
        }
    }
}

impl fmt::Debug for CredentialResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialResolver")
            .field("explicit", &self.explicit.is_some())
            .field("file", &self.file)
            .field("environment", &self.environment)
            .field("broken_reference", &self.broken_reference)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

fn read_credentials_file(path: &Path) -> Result<Credentials, String> {
    let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    let props = properties::parse(&text);

    let lookup = |names: &[&str]| {
        names
            .iter()
            .find_map(|name| props.get(*name))
            .filter(|v| !v.is_empty())
            .cloned()
    };

    match (lookup(&FILE_ACCESS_KEYS[..]), lookup(&FILE_SECRET_KEYS[..])) {
        (Some(access), Some(secret)) => {
            Ok(Credentials::new(access, secret, CredentialSource::File))
        }
        _ => Err("expected properties 'accessKey' and 'secretKey'".to_string()),
    }
}
