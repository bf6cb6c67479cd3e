//! Application-level configuration.
//!
//! Types here control how use cases behave at runtime; they are built from the
//! file configuration by the infrastructure layer.

mod mirror_params;
mod retry_policy;

pub use mirror_params::MirrorParams;
pub use retry_policy::RetryPolicy;
