//! Package source operations.
//!
//! Source keys are stored alphanumeric-only (see [`crate::sanitize::source_key`]).
//! Lookups by name accept either the exact stored key or the sanitized form of
//! the given name, exact match first, so both `nuget.org` and a source added
//! as `My Source!` can be addressed.

use serde::Serialize;
use xmltree::XMLNode;

use crate::document::{
    self, ConfigDocument, DISABLED_PACKAGE_SOURCES, PACKAGE_SOURCES, PACKAGE_SOURCE_CREDENTIALS,
    PROTOCOL_VERSION, VALUE,
};
use crate::error::{ConfigError, Result};
use crate::operation::Outcome;
use crate::sanitize;

/// Value written to a disabled flag
pub const DISABLED: &str = "true";

/// One row of the source listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceRow {
    pub name: String,
    pub source: String,
    #[serde(rename = "protocolVersion", skip_serializing_if = "Option::is_none")]
    pub protocol_version: Option<String>,
}

/// Append a new source as the last entry of `packageSources`
pub fn add_source(
    doc: &mut ConfigDocument,
    name: &str,
    source: &str,
    protocol_version: u32,
) -> Result<Outcome> {
    let key = sanitize::source_key(name);
    if key.is_empty() {
        return Err(ConfigError::InvalidArgument(format!(
            "Name '{}' does not contain any letters or digits",
            name
        )));
    }

    let sources = doc.section_or_create(PACKAGE_SOURCES);
    if document::find_entry(sources, &key).is_some() {
        return Err(ConfigError::DuplicateSource { name: key });
    }

    let mut entry = document::new_entry(&key, source);
    document::set_attribute(&mut entry, PROTOCOL_VERSION, protocol_version.to_string());
    sources.children.push(XMLNode::Element(entry));

    log::debug!("Added source {} -> {}", key, source);
    Ok(Outcome::Changed("Source has been added".to_string()))
}

/// Point an existing source at a new URL
pub fn update_source(doc: &mut ConfigDocument, name: &str, source: &str) -> Result<Outcome> {
    let key = resolve_key(doc, name)?;
    let entry = doc
        .section_mut(PACKAGE_SOURCES)
        .and_then(|sources| document::find_entry_mut(sources, &key))
        .ok_or_else(|| ConfigError::SourceNotFound { name: name.to_string() })?;

    document::set_attribute(entry, VALUE, source.to_string());

    log::debug!("Updated source {} -> {}", key, source);
    Ok(Outcome::Changed("Source has been updated".to_string()))
}

/// Remove a source.
///
/// Without `cascade` the disabled flag and credential block of the source are
/// left in place. With `cascade` both are removed as well.
pub fn remove_source(doc: &mut ConfigDocument, name: &str, cascade: bool) -> Result<Outcome> {
    let key = resolve_key(doc, name)?;

    let sources = doc
        .section_mut(PACKAGE_SOURCES)
        .ok_or_else(|| ConfigError::SourceNotFound { name: name.to_string() })?;
    if let Some(index) = document::entry_index(sources, &key) {
        document::detach(sources, index);
    }

    if cascade {
        if remove_disabled_flag(doc, &key) {
            log::debug!("Removed disabled flag of {}", key);
        }

        // Blocks are tagged from the name as given, the stored key is the fallback.
        // Names that are not legal element names cannot have a block.
        let tags: Vec<String> = [name, key.as_str()]
            .into_iter()
            .filter_map(|candidate| sanitize::credential_tag(candidate).ok())
            .collect();
        if let Some(credentials) = doc.section_mut(PACKAGE_SOURCE_CREDENTIALS) {
            if let Some(tag) = tags
                .iter()
                .find(|tag| document::detach_child(credentials, tag).is_some())
            {
                log::debug!("Removed credentials <{}> of {}", tag, key);
            }
        }
    }

    Ok(Outcome::Changed("Source has been removed".to_string()))
}

/// Drop the disabled flag of a source. Does nothing when the source is not disabled.
pub fn enable_source(doc: &mut ConfigDocument, name: &str) -> Result<Outcome> {
    let key = resolve_key(doc, name)?;

    if remove_disabled_flag(doc, &key) {
        Ok(Outcome::Changed("Source is now enabled".to_string()))
    } else {
        Ok(Outcome::Unchanged("Source is not disabled".to_string()))
    }
}

/// Mark a source disabled, creating `disabledPackageSources` when needed
pub fn disable_source(doc: &mut ConfigDocument, name: &str) -> Result<Outcome> {
    let key = resolve_key(doc, name)?;

    let disabled = doc.section_or_create(DISABLED_PACKAGE_SOURCES);
    match document::find_entry_mut(disabled, &key) {
        Some(flag) => document::set_attribute(flag, VALUE, DISABLED.to_string()),
        None => disabled
            .children
            .push(XMLNode::Element(document::new_entry(&key, DISABLED))),
    }

    Ok(Outcome::Changed("Source is now disabled".to_string()))
}

/// List every source entry in document order. Disabled state is not reflected.
pub fn list_sources(doc: &ConfigDocument) -> Vec<SourceRow> {
    let Some(sources) = doc.section(PACKAGE_SOURCES) else {
        return Vec::new();
    };

    document::elements(sources)
        .filter(|e| e.name == document::ADD && !e.attributes.is_empty())
        .map(|e| SourceRow {
            name: document::attribute(e, document::KEY).unwrap_or_default().to_string(),
            source: document::attribute(e, VALUE).unwrap_or_default().to_string(),
            protocol_version: document::attribute(e, PROTOCOL_VERSION).map(str::to_string),
        })
        .collect()
}

/// Map a user supplied name onto the stored key of an existing source
fn resolve_key(doc: &ConfigDocument, name: &str) -> Result<String> {
    let not_found = || ConfigError::SourceNotFound { name: name.to_string() };
    let sources = doc.section(PACKAGE_SOURCES).ok_or_else(not_found)?;

    if document::find_entry(sources, name).is_some() {
        return Ok(name.to_string());
    }

    let key = sanitize::source_key(name);
    if !key.is_empty() && document::find_entry(sources, &key).is_some() {
        log::trace!("Resolved source name '{}' to key '{}'", name, key);
        return Ok(key);
    }

    Err(not_found())
}

fn remove_disabled_flag(doc: &mut ConfigDocument, key: &str) -> bool {
    let Some(disabled) = doc.section_mut(DISABLED_PACKAGE_SOURCES) else {
        return false;
    };

    match document::entry_index(disabled, key) {
        Some(index) => {
            document::detach(disabled, index);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{add_credentials, find_credentials};
    use crate::template;

    fn empty() -> ConfigDocument {
        ConfigDocument::parse(template::EMPTY_CONFIGURATION).unwrap()
    }

    fn with_sources() -> ConfigDocument {
        ConfigDocument::parse(
            r#"<configuration>
  <packageSources>
    <add key="nuget.org" value="https://api.nuget.org/v3/index.json" protocolVersion="3" />
    <add key="Legacy" />
  </packageSources>
</configuration>"#,
        )
        .unwrap()
    }

    fn keys(doc: &ConfigDocument) -> Vec<String> {
        list_sources(doc).into_iter().map(|row| row.name).collect()
    }

    fn flag_keys(doc: &ConfigDocument) -> Vec<String> {
        doc.section(DISABLED_PACKAGE_SOURCES)
            .map(|disabled| {
                document::elements(disabled)
                    .filter_map(|e| document::attribute(e, document::KEY))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn test_add_source_appends_in_order() {
        let mut doc = with_sources();
        add_source(&mut doc, "Zeta", "https://zeta.test", 3).unwrap();
        add_source(&mut doc, "Alpha", "https://alpha.test", 2).unwrap();

        assert_eq!(keys(&doc), vec!["nuget.org", "Legacy", "Zeta", "Alpha"]);

        let rows = list_sources(&doc);
        assert_eq!(rows[3].source, "https://alpha.test");
        assert_eq!(rows[3].protocol_version.as_deref(), Some("2"));
    }

    #[test]
    fn test_add_source_sanitizes_name() {
        let mut doc = empty();
        add_source(&mut doc, "My Source!", "https://my.test", 3).unwrap();
        assert_eq!(keys(&doc), vec!["MySource"]);
    }

    #[test]
    fn test_add_source_rejects_duplicate_sanitized_name() {
        let mut doc = empty();
        add_source(&mut doc, "Acme", "https://a.test", 3).unwrap();
        let before = doc.clone();

        let err = add_source(&mut doc, "Ac-me", "https://b.test", 3).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateSource { ref name } if name == "Acme"));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_add_source_rejects_name_without_alphanumerics() {
        let mut doc = empty();
        let err = add_source(&mut doc, "!!!", "https://a.test", 3).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidArgument(_)));
    }

    #[test]
    fn test_add_source_creates_missing_section() {
        let mut doc = ConfigDocument::parse("<configuration />").unwrap();
        add_source(&mut doc, "Acme", "https://a.test", 3).unwrap();
        assert_eq!(keys(&doc), vec!["Acme"]);
    }

    #[test]
    fn test_update_source_overwrites_value() {
        let mut doc = with_sources();
        update_source(&mut doc, "nuget.org", "https://mirror.test/v3/index.json").unwrap();

        let rows = list_sources(&doc);
        assert_eq!(rows[0].source, "https://mirror.test/v3/index.json");
        assert_eq!(rows[0].protocol_version.as_deref(), Some("3"));
    }

    #[test]
    fn test_update_source_adds_missing_value() {
        let mut doc = with_sources();
        update_source(&mut doc, "Legacy", "https://legacy.test").unwrap();
        assert_eq!(list_sources(&doc)[1].source, "https://legacy.test");
    }

    #[test]
    fn test_update_source_resolves_sanitized_name() {
        let mut doc = empty();
        add_source(&mut doc, "My Source!", "https://old.test", 3).unwrap();
        update_source(&mut doc, "My Source!", "https://new.test").unwrap();
        assert_eq!(list_sources(&doc)[0].source, "https://new.test");
    }

    #[test]
    fn test_update_missing_source() {
        let mut doc = with_sources();
        let err = update_source(&mut doc, "Nope", "https://x.test").unwrap_err();
        assert!(matches!(err, ConfigError::SourceNotFound { .. }));
    }

    #[test]
    fn test_remove_source() {
        let mut doc = with_sources();
        remove_source(&mut doc, "nuget.org", false).unwrap();
        assert_eq!(keys(&doc), vec!["Legacy"]);

        let err = remove_source(&mut doc, "nuget.org", false).unwrap_err();
        assert!(matches!(err, ConfigError::SourceNotFound { .. }));
    }

    #[test]
    fn test_remove_source_without_cascade_keeps_orphans() {
        let mut doc = with_sources();
        disable_source(&mut doc, "nuget.org").unwrap();
        remove_source(&mut doc, "nuget.org", false).unwrap();

        let disabled = doc.section(DISABLED_PACKAGE_SOURCES).unwrap();
        assert!(document::find_entry(disabled, "nuget.org").is_some());
    }

    #[test]
    fn test_remove_source_with_cascade() {
        let mut doc = ConfigDocument::parse(
            r#"<configuration>
  <packageSources>
    <add key="Acme" value="https://a.test" />
  </packageSources>
  <disabledPackageSources>
    <add key="Acme" value="true" />
  </disabledPackageSources>
  <packageSourceCredentials>
    <Acme>
      <add key="Username" value="u" />
      <add key="ClearTextPassword" value="p" />
    </Acme>
  </packageSourceCredentials>
</configuration>"#,
        )
        .unwrap();

        remove_source(&mut doc, "Acme", true).unwrap();

        assert!(list_sources(&doc).is_empty());
        assert!(document::elements(doc.section(DISABLED_PACKAGE_SOURCES).unwrap()).next().is_none());
        assert!(document::elements(doc.section(PACKAGE_SOURCE_CREDENTIALS).unwrap()).next().is_none());
    }

    #[test]
    fn test_remove_source_with_cascade_spaced_name() {
        let mut doc = empty();
        add_source(&mut doc, "My Source", "https://my.test", 3).unwrap();
        add_credentials(&mut doc, "My Source", "alice", "pw").unwrap();
        disable_source(&mut doc, "My Source").unwrap();

        remove_source(&mut doc, "My Source", true).unwrap();

        assert!(list_sources(&doc).is_empty());
        assert!(flag_keys(&doc).is_empty());
        assert_eq!(find_credentials(&doc, "My Source").unwrap(), None);
    }

    #[test]
    fn test_remove_source_with_cascade_falls_back_to_stored_key() {
        let mut doc = empty();
        add_source(&mut doc, "Acme!", "https://a.test", 3).unwrap();
        add_credentials(&mut doc, "Acme", "alice", "pw").unwrap();

        remove_source(&mut doc, "Acme!", true).unwrap();
        assert_eq!(find_credentials(&doc, "Acme").unwrap(), None);
    }

    #[test]
    fn test_disable_then_enable() {
        let mut doc = with_sources();

        let outcome = disable_source(&mut doc, "nuget.org").unwrap();
        assert!(outcome.is_changed());
        assert_eq!(flag_keys(&doc), vec!["nuget.org"]);

        let outcome = enable_source(&mut doc, "nuget.org").unwrap();
        assert!(outcome.is_changed());
        assert!(flag_keys(&doc).is_empty());
        assert!(document::elements(doc.section(DISABLED_PACKAGE_SOURCES).unwrap()).next().is_none());
    }

    #[test]
    fn test_disable_and_enable_by_added_name() {
        let mut doc = empty();
        add_source(&mut doc, "My Source!", "https://my.test", 3).unwrap();

        disable_source(&mut doc, "My Source!").unwrap();
        assert_eq!(flag_keys(&doc), vec!["MySource"]);

        let outcome = enable_source(&mut doc, "My Source!").unwrap();
        assert_eq!(outcome, Outcome::Changed("Source is now enabled".to_string()));
        assert!(flag_keys(&doc).is_empty());
    }

    #[test]
    fn test_remove_source_by_added_name() {
        let mut doc = empty();
        add_source(&mut doc, "My Source!", "https://my.test", 3).unwrap();
        add_source(&mut doc, "Other", "https://other.test", 3).unwrap();

        remove_source(&mut doc, "My Source!", false).unwrap();
        assert_eq!(keys(&doc), vec!["Other"]);
    }

    #[test]
    fn test_exact_key_wins_over_sanitized_key() {
        let mut doc = ConfigDocument::parse(
            r#"<configuration>
  <packageSources>
    <add key="my.feed" value="https://dotted.test" />
    <add key="myfeed" value="https://plain.test" />
  </packageSources>
</configuration>"#,
        )
        .unwrap();

        disable_source(&mut doc, "my.feed").unwrap();
        assert_eq!(flag_keys(&doc), vec!["my.feed"]);

        remove_source(&mut doc, "my.feed", false).unwrap();
        assert_eq!(keys(&doc), vec!["myfeed"]);
    }

    #[test]
    fn test_enable_source_not_disabled_is_noop() {
        let mut doc = with_sources();
        let before = doc.clone();

        let outcome = enable_source(&mut doc, "nuget.org").unwrap();
        assert_eq!(outcome, Outcome::Unchanged("Source is not disabled".to_string()));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_enable_missing_source() {
        let mut doc = with_sources();
        assert!(matches!(
            enable_source(&mut doc, "Nope").unwrap_err(),
            ConfigError::SourceNotFound { .. }
        ));
    }

    #[test]
    fn test_disable_source_twice_keeps_single_flag() {
        let mut doc = with_sources();
        disable_source(&mut doc, "nuget.org").unwrap();
        disable_source(&mut doc, "nuget.org").unwrap();

        let disabled = doc.section(DISABLED_PACKAGE_SOURCES).unwrap();
        assert_eq!(document::elements(disabled).count(), 1);
    }

    #[test]
    fn test_disable_source_repairs_flag_value() {
        let mut doc = ConfigDocument::parse(
            r#"<configuration>
  <packageSources><add key="Acme" value="https://a.test" /></packageSources>
  <disabledPackageSources><add key="Acme" /></disabledPackageSources>
</configuration>"#,
        )
        .unwrap();

        disable_source(&mut doc, "Acme").unwrap();

        let disabled = doc.section(DISABLED_PACKAGE_SOURCES).unwrap();
        let flag = document::find_entry(disabled, "Acme").unwrap();
        assert_eq!(document::attribute(flag, VALUE), Some(DISABLED));
    }

    #[test]
    fn test_disable_missing_source() {
        let mut doc = with_sources();
        let before = doc.clone();
        assert!(disable_source(&mut doc, "Nope").is_err());
        assert_eq!(doc, before);
    }

    #[test]
    fn test_list_skips_attributeless_entries() {
        let doc = ConfigDocument::parse(
            r#"<configuration><packageSources><clear /><add /><add key="A" value="a" /></packageSources></configuration>"#,
        )
        .unwrap();

        assert_eq!(
            list_sources(&doc),
            vec![SourceRow {
                name: "A".to_string(),
                source: "a".to_string(),
                protocol_version: None,
            }]
        );
    }

    #[test]
    fn test_source_row_json() {
        let row = SourceRow {
            name: "Acme".to_string(),
            source: "https://a.test".to_string(),
            protocol_version: None,
        };
        assert_eq!(
            serde_json::to_string(&row).unwrap(),
            r#"{"name":"Acme","source":"https://a.test"}"#
        );
    }

    #[test]
    fn test_list_without_sources_section() {
        let doc = ConfigDocument::parse("<configuration />").unwrap();
        assert!(list_sources(&doc).is_empty());
    }
}
