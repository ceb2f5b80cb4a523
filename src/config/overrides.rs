// ABOUTME: Command-line overrides layered on top of ebpush.yml.
// ABOUTME: Each set field replaces the file value; unset fields leave it alone.

use std::path::PathBuf;

use super::{Config, EnvValue};

/// Field-by-field overrides, usually built from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub artifact: Option<PathBuf>,
    pub bucket: Option<String>,
    pub key: Option<String>,
    pub application: Option<String>,
    pub environment: Option<String>,
    pub version_label: Option<String>,
    pub version_suffix: Option<String>,
    pub key_suffix: Option<String>,
    pub skip_upload: bool,
    pub skip_deploy: bool,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub credentials_file: Option<PathBuf>,
    pub region: Option<String>,
}

impl Config {
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Config {
        fn set<T>(slot: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *slot = value;
            }
        }

        set(&mut self.artifact, overrides.artifact);
        set(&mut self.bucket, overrides.bucket);
        set(&mut self.key, overrides.key);
        set(&mut self.application, overrides.application);
        set(&mut self.environment, overrides.environment);
        set(&mut self.version_label, overrides.version_label);

        if overrides.version_suffix.is_some() {
            self.version_suffix = overrides.version_suffix;
        }
        if overrides.key_suffix.is_some() {
            self.key_suffix = overrides.key_suffix;
        }
        if overrides.region.is_some() {
            self.region = overrides.region;
        }

        // Flags can only switch a step off.
        self.skip_upload |= overrides.skip_upload;
        self.skip_deploy |= overrides.skip_deploy;

        if let Some(access_key) = overrides.access_key {
            self.credentials.access_key = Some(EnvValue::Literal(access_key));
        }
        if let Some(secret_key) = overrides.secret_key {
            self.credentials.secret_key = Some(EnvValue::Literal(secret_key));
        }
        if overrides.credentials_file.is_some() {
            self.credentials.file = overrides.credentials_file;
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_fields_replace_file_values() {
        let config = Config::template().with_overrides(ConfigOverrides {
            bucket: Some("other-bucket".to_string()),
            version_suffix: Some("-42".to_string()),
            ..Default::default()
        });

        assert_eq!(config.bucket, "other-bucket");
        assert_eq!(config.version_suffix.as_deref(), Some("-42"));
        assert_eq!(config.application, "my-app");
    }

    #[test]
    fn skip_flags_never_re_enable_a_step() {
        let mut base = Config::template();
        base.skip_deploy = true;

        let config = base.with_overrides(ConfigOverrides {
            skip_upload: true,
            ..Default::default()
        });

        assert!(config.skip_upload);
        assert!(config.skip_deploy);
    }

    #[test]
    fn explicit_keys_become_literals() {
        let config = Config::template().with_overrides(ConfigOverrides {
            access_key: Some("AKIA".to_string()),
            secret_key: Some("shh".to_string()),
            ..Default::default()
        });

        assert_eq!(
            config.credentials.access_key,
            Some(EnvValue::literal("AKIA"))
        );
        assert_eq!(config.credentials.secret_key, Some(EnvValue::literal("shh")));
    }
}
