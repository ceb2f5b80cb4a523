// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Creates ebpush.yml template files.

use std::path::Path;

use crate::error::{Error, Result};

use super::{CONFIG_FILENAME, Config};

pub fn init_config(
    dir: &Path,
    application: Option<&str>,
    environment: Option<&str>,
    force: bool,
) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let mut config = Config::template();

    if let Some(app) = application {
        config.application = app.to_string();
        config.key = format!("{app}.war");
    }

    if let Some(env) = environment {
        config.environment = env.to_string();
    }

    let yaml = generate_template_yaml(&config);
    std::fs::write(&config_path, yaml)?;

    Ok(())
}

fn generate_template_yaml(config: &Config) -> String {
    format!(
        r#"artifact: target/{key}
bucket: {bucket}
key: {key}
application: {application}
environment: {environment}
version_label: {version}

# Appended to version_label and key, e.g. "-1.0-SNAPSHOT".
# A .war key becomes name##suffix.war for side-by-side Tomcat versions.
# version_suffix: ""
# key_suffix: ""

credentials:
  # Tried in order: explicit pair, properties file, AWS_* environment variables.
  # access_key: {{ env: AWS_ACCESS_KEY_ID }}
  # secret_key: {{ env: AWS_SECRET_ACCESS_KEY }}
  # file: ~/.aws/ebpush.properties

# region: us-east-1

upload:
  poll_interval: 5s
  part_size: {part_size}
  concurrency: {concurrency}
"#,
        key = config.key,
        bucket = config.bucket,
        application = config.application,
        environment = config.environment,
        version = config.version_label,
        part_size = config.upload.part_size,
        concurrency = config.upload.concurrency,
    )
}
