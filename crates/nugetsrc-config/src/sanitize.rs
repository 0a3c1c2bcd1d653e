//! Name rules for source keys and credential element tags.
//!
//! Two unrelated rules are in use and must not be mixed up:
//!
//! - Source keys keep only ASCII letters and digits (`My Source!` -> `MySource`).
//! - Credential blocks are elements named after the source, so spaces are
//!   escaped the way NuGet does it (`My Source` -> `My_x0020_Source`) and
//!   everything else is left untouched.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{ConfigError, Result};

lazy_static! {
    static ref NON_ALPHANUMERIC: Regex = Regex::new(r"[^a-zA-Z0-9]").unwrap();
}

/// Escape sequence NuGet uses for a space inside an element name
pub const SPACE_ESCAPE: &str = "_x0020_";

/// Strip every character that is not `[a-zA-Z0-9]`
pub fn source_key(name: &str) -> String {
    NON_ALPHANUMERIC.replace_all(name, "").into_owned()
}

/// Build the credential block tag for a source name.
///
/// Fails when the escaped name still cannot be used as an XML element name.
pub fn credential_tag(name: &str) -> Result<String> {
    let tag = name.replace(' ', SPACE_ESCAPE);
    if !is_element_name(&tag) {
        return Err(ConfigError::InvalidArgument(format!(
            "'{}' cannot be used as a credential key",
            name
        )));
    }
    Ok(tag)
}

/// Reject empty or whitespace-only required arguments
pub fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidArgument(format!(
            "{} cannot be an empty string",
            field
        )));
    }
    Ok(())
}

fn is_element_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
