//! In-memory NuGet.Config tree.
//!
//! The document is an ordered element tree rooted at `<configuration>`.
//! Every section this crate touches (`packageSources`,
//! `disabledPackageSources`, `packageSourceCredentials`) is a direct child of
//! the root holding `<add key=".." value=".." />` entries, except credential
//! blocks which are named elements wrapping such entries.
//!
//! # Example
//!
//! ```rust
//! use nugetsrc_config::document::{ConfigDocument, PACKAGE_SOURCES};
//!
//! let doc = ConfigDocument::parse(
//!     r#"<configuration><packageSources><add key="nuget.org" value="https://api.nuget.org/v3/index.json" /></packageSources></configuration>"#,
//! ).unwrap();
//!
//! let sources = doc.section(PACKAGE_SOURCES).unwrap();
//! assert!(nugetsrc_config::document::find_entry(sources, "nuget.org").is_some());
//! ```

use std::fs;
use std::path::Path;

use xmltree::{Element, EmitterConfig, XMLNode};

use crate::error::{ConfigError, Result};

pub const ROOT: &str = "configuration";
pub const PACKAGE_SOURCES: &str = "packageSources";
pub const DISABLED_PACKAGE_SOURCES: &str = "disabledPackageSources";
pub const PACKAGE_SOURCE_CREDENTIALS: &str = "packageSourceCredentials";

pub const ADD: &str = "add";
pub const KEY: &str = "key";
pub const VALUE: &str = "value";
pub const PROTOCOL_VERSION: &str = "protocolVersion";

/// A loaded NuGet.Config document
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDocument {
    root: Element,
}

impl ConfigDocument {
    /// Parse a document from XML text
    pub fn parse(xml: &str) -> Result<Self> {
        let xml = xml.trim_start_matches('\u{feff}');
        let root = Element::parse(xml.as_bytes())?;

        if root.name != ROOT {
            return Err(ConfigError::InvalidDocument {
                message: format!("expected <{}> root element, found <{}>", ROOT, root.name),
            });
        }

        Ok(Self { root })
    }

    /// Load a document from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Reading {}", path.display());

        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Serialize the document with an XML declaration and two-space indentation
    pub fn to_xml_string(&self) -> Result<String> {
        let config = EmitterConfig::new()
            .perform_indent(true)
            .indent_string("  ");

        let mut buffer = Vec::new();
        self.root
            .write_with_config(&mut buffer, config)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        let mut xml = String::from_utf8(buffer).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        xml.push('\n');
        Ok(xml)
    }

    /// Write the document back to disk, replacing the file contents
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let xml = self.to_xml_string()?;
        log::debug!("Writing {} ({} bytes)", path.display(), xml.len());
        fs::write(path, xml)?;
        Ok(())
    }

    /// The `<configuration>` root element
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Find a section (direct child of the root) by name
    pub fn section(&self, name: &str) -> Option<&Element> {
        elements(&self.root).find(|e| e.name == name)
    }

    /// Mutable access to a section (direct child of the root) by name
    pub fn section_mut(&mut self, name: &str) -> Option<&mut Element> {
        elements_mut(&mut self.root).find(|e| e.name == name)
    }

    /// Find a section, appending an empty one to the root if it does not exist yet
    pub fn section_or_create(&mut self, name: &str) -> &mut Element {
        let index = match child_index(&self.root, name) {
            Some(index) => index,
            None => {
                log::debug!("Creating <{}> section", name);
                self.root.children.push(XMLNode::Element(Element::new(name)));
                self.root.children.len() - 1
            }
        };

        match &mut self.root.children[index] {
            XMLNode::Element(element) => element,
            _ => unreachable!("section index always points at an element"),
        }
    }
}

/// Iterate over the element children of a node, skipping comments and text
pub fn elements(parent: &Element) -> impl Iterator<Item = &Element> {
    parent.children.iter().filter_map(|node| match node {
        XMLNode::Element(element) => Some(element),
        _ => None,
    })
}

fn elements_mut(parent: &mut Element) -> impl Iterator<Item = &mut Element> {
    parent.children.iter_mut().filter_map(|node| match node {
        XMLNode::Element(element) => Some(element),
        _ => None,
    })
}

/// Index (into `children`) of the first element child with the given name
pub fn child_index(parent: &Element, name: &str) -> Option<usize> {
    parent
        .children
        .iter()
        .position(|node| matches!(node, XMLNode::Element(e) if e.name == name))
}

/// Index (into `children`) of the `<add>` entry whose `key` equals `key`
pub fn entry_index(section: &Element, key: &str) -> Option<usize> {
    section.children.iter().position(|node| match node {
        XMLNode::Element(e) => e.name == ADD && attribute(e, KEY) == Some(key),
        _ => false,
    })
}

/// Find the `<add>` entry whose `key` equals `key`
pub fn find_entry<'a>(section: &'a Element, key: &str) -> Option<&'a Element> {
    elements(section).find(|e| e.name == ADD && attribute(e, KEY) == Some(key))
}

/// Mutable access to the `<add>` entry whose `key` equals `key`
pub fn find_entry_mut<'a>(section: &'a mut Element, key: &str) -> Option<&'a mut Element> {
    elements_mut(section).find(|e| e.name == ADD && attribute(e, KEY) == Some(key))
}

/// Detach the child at `index`, returning it if it was an element
pub fn detach(parent: &mut Element, index: usize) -> Option<Element> {
    match parent.children.remove(index) {
        XMLNode::Element(element) => Some(element),
        _ => None,
    }
}

/// Detach the first element child with the given name
pub fn detach_child(parent: &mut Element, name: &str) -> Option<Element> {
    child_index(parent, name).and_then(|index| detach(parent, index))
}

/// Build an `<add key=".." value=".." />` entry
pub fn new_entry(key: &str, value: &str) -> Element {
    let mut entry = Element::new(ADD);
    set_attribute(&mut entry, KEY, key.to_string());
    set_attribute(&mut entry, VALUE, value.to_string());
    entry
}

/// Value of an attribute, if the element carries it
pub fn attribute<'a>(element: &'a Element, name: &str) -> Option<&'a str> {
    element.attributes.get(name).map(String::as_str)
}

/// Overwrite an attribute in place, or append it when the element lacks it
pub fn set_attribute(element: &mut Element, name: &str, value: String) {
    element.attributes.insert(name.to_string(), value);
}
