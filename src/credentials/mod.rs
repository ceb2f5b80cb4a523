// ABOUTME: AWS credential resolution from a priority-ordered list of sources.
// ABOUTME: Explicit key pair, then a properties file, then the process environment.

mod properties;
mod resolver;

pub use properties::parse as parse_properties;
pub use resolver::{CredentialResolver, CredentialSource, Credentials, NoCredentials};
