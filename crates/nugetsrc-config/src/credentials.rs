//! Source credential blocks under `packageSourceCredentials`.
//!
//! # Format
//!
//! ```xml
//! <packageSourceCredentials>
//!     <My_x0020_Source>
//!         <add key="Username" value="user" />
//!         <add key="ClearTextPassword" value="secret" />
//!     </My_x0020_Source>
//! </packageSourceCredentials>
//! ```
//!
//! Passwords are stored in clear text; that is how the file format defines
//! `ClearTextPassword`.

use xmltree::{Element, XMLNode};

use crate::document::{self, ConfigDocument, PACKAGE_SOURCE_CREDENTIALS, VALUE};
use crate::error::{ConfigError, Result};
use crate::operation::Outcome;
use crate::sanitize;

pub const USERNAME_KEY: &str = "Username";
pub const PASSWORD_KEY: &str = "ClearTextPassword";

/// Credentials read back from a credential block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Append a credential block for `name`, creating the section when needed
pub fn add_credentials(
    doc: &mut ConfigDocument,
    name: &str,
    username: &str,
    password: &str,
) -> Result<Outcome> {
    let tag = sanitize::credential_tag(name)?;

    let section = doc.section_or_create(PACKAGE_SOURCE_CREDENTIALS);
    if document::child_index(section, &tag).is_some() {
        return Err(ConfigError::CredentialsAlreadyExist { name: name.to_string() });
    }

    section.children.push(XMLNode::Element(credential_block(&tag, username, password)));

    log::debug!("Added credentials <{}> for user {}", tag, username);
    Ok(Outcome::Changed("Credentials have been added".to_string()))
}

/// Replace a credential block with a freshly built one.
///
/// The old block is dropped entirely and the new one is appended at the end
/// of the section, so nothing from the previous block survives.
pub fn update_credentials(
    doc: &mut ConfigDocument,
    name: &str,
    username: &str,
    password: &str,
) -> Result<Outcome> {
    let tag = sanitize::credential_tag(name)?;

    let section = doc
        .section_mut(PACKAGE_SOURCE_CREDENTIALS)
        .ok_or_else(|| ConfigError::CredentialsNotFound { name: name.to_string() })?;
    if document::detach_child(section, &tag).is_none() {
        return Err(ConfigError::CredentialsNotFound { name: name.to_string() });
    }

    section.children.push(XMLNode::Element(credential_block(&tag, username, password)));

    log::debug!("Replaced credentials <{}> for user {}", tag, username);
    Ok(Outcome::Changed("Credentials have been updated".to_string()))
}

/// Detach the credential block stored for `name`
pub fn remove_credentials(doc: &mut ConfigDocument, name: &str) -> Result<Outcome> {
    let tag = sanitize::credential_tag(name)?;

    doc.section_mut(PACKAGE_SOURCE_CREDENTIALS)
        .and_then(|section| document::detach_child(section, &tag))
        .ok_or_else(|| ConfigError::CredentialsNotFound { name: name.to_string() })?;

    Ok(Outcome::Changed("Credentials have been removed".to_string()))
}

/// Read the credentials stored for a source name, if any
pub fn find_credentials(doc: &ConfigDocument, name: &str) -> Result<Option<Credentials>> {
    let tag = sanitize::credential_tag(name)?;

    let block = doc
        .section(PACKAGE_SOURCE_CREDENTIALS)
        .and_then(|section| document::elements(section).find(|e| e.name == tag));

    Ok(block.map(|block| {
        let value = |key: &str| {
            document::find_entry(block, key)
                .and_then(|entry| document::attribute(entry, VALUE))
                .map(str::to_string)
        };
        Credentials {
            username: value(USERNAME_KEY),
            password: value(PASSWORD_KEY),
        }
    }))
}

fn credential_block(tag: &str, username: &str, password: &str) -> Element {
    let mut block = Element::new(tag);
    block
        .children
        .push(XMLNode::Element(document::new_entry(USERNAME_KEY, username)));
    block
        .children
        .push(XMLNode::Element(document::new_entry(PASSWORD_KEY, password)));
    block
}
