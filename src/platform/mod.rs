// ABOUTME: Application hosting platform access for rollouts.
// ABOUTME: Exposes the HostingPlatform capability trait and the Elastic Beanstalk implementation.

mod beanstalk;
mod error;
mod traits;

pub use beanstalk::Beanstalk;
pub use error::{PlatformError, PlatformErrorKind};
pub use traits::{
    ApplicationVersion, EnvironmentDescription, EnvironmentUpdate, HostingPlatform,
    VersionRequest,
};
