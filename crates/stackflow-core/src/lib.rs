//! StackFlow core
//!
//! Resource descriptors, credentials and template loading shared by the
//! StackFlow crates. Nothing in this crate talks to the platform: every
//! error it raises happens before a remote call would be attempted.

pub mod credentials;
pub mod error;
pub mod model;
pub mod template;

pub use credentials::OsCreds;
pub use error::{ConfigError, Result};
pub use model::*;
pub use template::{Template, TemplateResource, load_environment, parse_document};
