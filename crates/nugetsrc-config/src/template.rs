//! Bundled empty NuGet.Config.

use std::fs;
use std::path::Path;

use crate::document::ConfigDocument;
use crate::error::{ConfigError, Result};
use crate::operation::is_read_only;

pub const EMPTY_CONFIGURATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<configuration>
  <packageSources>
  </packageSources>
</configuration>
"#;

pub const CREATED_MESSAGE: &str = "New NuGet.Config file created";

/// The bundled template as a document
pub fn empty_document() -> Result<ConfigDocument> {
    ConfigDocument::parse(EMPTY_CONFIGURATION)
}

/// Replace whatever is at `path` with the bundled template.
///
/// A read-only file is left alone. Missing parent directories are created.
pub fn create_empty(path: &Path) -> Result<()> {
    if path.exists() {
        if is_read_only(path)? {
            return Err(ConfigError::ReadOnlyTarget { path: path.to_path_buf() });
        }
        log::debug!("Removing existing {}", path.display());
        fs::remove_file(path)?;
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(path, EMPTY_CONFIGURATION)?;
    log::debug!("Wrote empty configuration to {}", path.display());
    Ok(())
}
