//! Operations on a NuGet.Config file.
//!
//! [`Operation::apply`] works on an in-memory [`ConfigDocument`] and never
//! touches the disk. [`run`] is the file driver: it checks the target,
//! loads the document once, applies one operation and saves only when the
//! operation reports a change.

use std::fs;
use std::path::Path;

use crate::credentials;
use crate::document::ConfigDocument;
use crate::error::{ConfigError, Result};
use crate::sanitize;
use crate::sources::{self, SourceRow};
use crate::template;

/// Protocol version written for new sources unless told otherwise
pub const DEFAULT_PROTOCOL_VERSION: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    List,
    Add {
        name: String,
        source: String,
        protocol_version: u32,
    },
    Update {
        name: String,
        source: String,
    },
    Remove {
        name: String,
        cascade: bool,
    },
    Enable {
        name: String,
    },
    Disable {
        name: String,
    },
    AddCredentials {
        name: String,
        username: String,
        password: String,
    },
    UpdateCredentials {
        name: String,
        username: String,
        password: String,
    },
    RemoveCredentials {
        name: String,
    },
    Create,
}

/// Result of applying an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Read-only listing of the configured sources
    Listed(Vec<SourceRow>),
    /// The document was modified and must be saved
    Changed(String),
    /// Nothing to do; the document is untouched
    Unchanged(String),
}

impl Outcome {
    pub fn is_changed(&self) -> bool {
        matches!(self, Outcome::Changed(_))
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Outcome::Listed(_) => None,
            Outcome::Changed(message) | Outcome::Unchanged(message) => Some(message),
        }
    }
}

impl Operation {
    /// Name of the operation as accepted on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::List => "List",
            Operation::Add { .. } => "Add",
            Operation::Update { .. } => "Update",
            Operation::Remove { .. } => "Remove",
            Operation::Enable { .. } => "Enable",
            Operation::Disable { .. } => "Disable",
            Operation::AddCredentials { .. } => "AddCredentials",
            Operation::UpdateCredentials { .. } => "UpdateCredentials",
            Operation::RemoveCredentials { .. } => "RemoveCredentials",
            Operation::Create => "Create",
        }
    }

    /// Whether the operation may write the configuration file
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Operation::List)
    }

    /// Check required arguments before anything is read or written
    pub fn validate(&self) -> Result<()> {
        match self {
            Operation::List | Operation::Create => Ok(()),
            Operation::Add { name, source, .. } | Operation::Update { name, source } => {
                sanitize::require("Name", name)?;
                sanitize::require("Source", source)
            }
            Operation::Remove { name, .. }
            | Operation::Enable { name }
            | Operation::Disable { name } => sanitize::require("Name", name),
            Operation::AddCredentials { name, username, password }
            | Operation::UpdateCredentials { name, username, password } => {
                sanitize::require("Name", name)?;
                sanitize::require("Username", username)?;
                sanitize::require("Password", password)?;
                sanitize::credential_tag(name).map(|_| ())
            }
            Operation::RemoveCredentials { name } => {
                sanitize::require("Name", name)?;
                sanitize::credential_tag(name).map(|_| ())
            }
        }
    }

    /// Apply the operation to an in-memory document
    pub fn apply(&self, doc: &mut ConfigDocument) -> Result<Outcome> {
        self.validate()?;
        log::debug!("Applying {}", self.as_str());

        match self {
            Operation::List => Ok(Outcome::Listed(sources::list_sources(doc))),
            Operation::Add { name, source, protocol_version } => {
                sources::add_source(doc, name, source, *protocol_version)
            }
            Operation::Update { name, source } => sources::update_source(doc, name, source),
            Operation::Remove { name, cascade } => sources::remove_source(doc, name, *cascade),
            Operation::Enable { name } => sources::enable_source(doc, name),
            Operation::Disable { name } => sources::disable_source(doc, name),
            Operation::AddCredentials { name, username, password } => {
                credentials::add_credentials(doc, name, username, password)
            }
            Operation::UpdateCredentials { name, username, password } => {
                credentials::update_credentials(doc, name, username, password)
            }
            Operation::RemoveCredentials { name } => credentials::remove_credentials(doc, name),
            Operation::Create => {
                *doc = template::empty_document()?;
                Ok(Outcome::Changed(template::CREATED_MESSAGE.to_string()))
            }
        }
    }
}

/// Run one operation against the configuration file at `path`
pub fn run(path: &Path, operation: &Operation) -> Result<Outcome> {
    operation.validate()?;

    if let Operation::Create = operation {
        template::create_empty(path)?;
        return Ok(Outcome::Changed(template::CREATED_MESSAGE.to_string()));
    }

    if !path.exists() {
        return Err(ConfigError::MissingConfigFile { path: path.to_path_buf() });
    }
    if operation.is_mutating() && is_read_only(path)? {
        return Err(ConfigError::ReadOnlyTarget { path: path.to_path_buf() });
    }

    let mut doc = ConfigDocument::load(path)?;
    let outcome = operation.apply(&mut doc)?;

    if outcome.is_changed() {
        doc.save(path)?;
    } else {
        log::debug!("{} left {} untouched", operation.as_str(), path.display());
    }

    Ok(outcome)
}

pub(crate) fn is_read_only(path: &Path) -> Result<bool> {
    Ok(fs::metadata(path)?.permissions().readonly())
}
