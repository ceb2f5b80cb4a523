// ABOUTME: Pre-flight validation of a release configuration.
// ABOUTME: Reports the first missing or out-of-range field before any remote call.

use thiserror::Error;

use super::{Config, MIN_PART_SIZE};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("part size of {0} bytes is below the 5 MiB multipart minimum")]
    PartSizeTooSmall(u64),

    #[error("upload concurrency must be at least 1")]
    ZeroConcurrency,
}

impl Config {
    /// Check that every field this run needs is present.
    ///
    /// The artifact path is only required when the upload step will run;
    /// a deploy-only run points at an object already in the bucket.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let required = [
            ("bucket", self.bucket.as_str()),
            ("key", self.key.as_str()),
            ("application", self.application.as_str()),
            ("environment", self.environment.as_str()),
            ("version_label", self.version_label.as_str()),
        ];
        if let Some((name, _)) = required.into_iter().find(|(_, value)| value.is_empty()) {
            return Err(ValidationError::MissingField(name));
        }

        if !self.skip_upload && self.artifact.as_os_str().is_empty() {
            return Err(ValidationError::MissingField("artifact"));
        }

        if self.upload.part_size < MIN_PART_SIZE {
            return Err(ValidationError::PartSizeTooSmall(self.upload.part_size));
        }

        if self.upload.concurrency == 0 {
            return Err(ValidationError::ZeroConcurrency);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> Config {
        let mut config = Config::template();
        config.artifact = "target/app.war".into();
        config
    }

    #[test]
    fn template_with_artifact_is_valid() {
        assert_eq!(complete().validate(), Ok(()));
    }

    #[test]
    fn reports_first_missing_field() {
        let mut config = complete();
        config.application.clear();
        config.environment.clear();
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingField("application"))
        );
    }

    #[test]
    fn artifact_only_required_when_uploading() {
        let mut config = complete();
        config.artifact = Default::default();
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingField("artifact"))
        );

        config.skip_upload = true;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_small_parts_and_zero_concurrency() {
        let mut config = complete();
        config.upload.part_size = 1024;
        assert_eq!(config.validate(), Err(ValidationError::PartSizeTooSmall(1024)));

        let mut config = complete();
        config.upload.concurrency = 0;
        assert_eq!(config.validate(), Err(ValidationError::ZeroConcurrency));
    }
}
