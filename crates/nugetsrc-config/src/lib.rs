//! Read and mutate the package sources and source credentials of a
//! NuGet.Config file.

pub mod credentials;
pub mod document;
pub mod error;
pub mod locate;
pub mod operation;
pub mod sanitize;
pub mod sources;
pub mod template;

pub use credentials::Credentials;
pub use document::ConfigDocument;
pub use error::{ConfigError, Result};
pub use locate::ConfigLocator;
pub use operation::{run, Operation, Outcome, DEFAULT_PROTOCOL_VERSION};
pub use sources::SourceRow;
