//! XML entity abstraction

use crate::error::{ParseError, Result};
use std::str::FromStr;

/// Entity trait for abstracting over launch file element sources
pub trait Entity {
    /// Get entity type name (e.g., "node", "arg")
    fn type_name(&self) -> &str;

    /// Get attribute as string
    fn get_attr_str(&self, name: &str, optional: bool) -> Result<Option<String>>;

    /// Get all attributes as key-value pairs
    fn attributes(&self) -> Vec<(&str, &str)>;

    /// Get the concatenated text content, if any
    fn text(&self) -> Option<String>;
}

/// Extension trait for type-aware attribute access
pub trait EntityExt: Entity {
    /// Get attribute value with type coercion
    fn get_attr<T: FromStr>(&self, name: &str, optional: bool) -> Result<Option<T>> {
        match self.get_attr_str(name, optional)? {
            Some(value) => {
                let parsed = value.parse::<T>().map_err(|_| ParseError::TypeCoercion {
                    attribute: name.to_string(),
                    value: value.to_string(),
                    expected_type: std::any::type_name::<T>(),
                })?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    /// Get a boolean attribute, accepting `true`/`false` in any case
    fn get_bool_attr(&self, name: &str) -> Result<Option<bool>> {
        match self.get_attr_str(name, true)? {
            Some(value) => match value.trim().to_lowercase().as_str() {
                "true" => Ok(Some(true)),
                "false" => Ok(Some(false)),
                _ => Err(ParseError::TypeCoercion {
                    attribute: name.to_string(),
                    value,
                    expected_type: "bool",
                }),
            },
            None => Ok(None),
        }
    }

    /// Get a required attribute, reporting the element it is missing from
    fn required_attr(&self, name: &str) -> Result<String> {
        self.get_attr_str(name, false)?
            .ok_or_else(|| ParseError::MissingAttribute {
                element: self.type_name().to_string(),
                attribute: name.to_string(),
            })
    }
}

impl<T: Entity + ?Sized> EntityExt for T {}

/// XML entity implementation wrapping roxmltree::Node
pub struct XmlEntity<'a, 'input> {
    node: roxmltree::Node<'a, 'input>,
}

impl<'a, 'input> XmlEntity<'a, 'input> {
    pub fn new(node: roxmltree::Node<'a, 'input>) -> Self {
        Self { node }
    }

    /// Return an iterator over child elements
    pub fn children(&self) -> impl Iterator<Item = XmlEntity<'a, 'input>> {
        self.node
            .children()
            .filter(|n| n.is_element())
            .map(XmlEntity::new)
    }
}

impl<'a, 'input> Entity for XmlEntity<'a, 'input> {
    fn type_name(&self) -> &str {
        self.node.tag_name().name()
    }

    fn get_attr_str(&self, name: &str, optional: bool) -> Result<Option<String>> {
        match self.node.attribute(name) {
            Some(value) => Ok(Some(value.to_string())),
            None if optional => Ok(None),
            None => Err(ParseError::MissingAttribute {
                element: self.type_name().to_string(),
                attribute: name.to_string(),
            }),
        }
    }

    fn attributes(&self) -> Vec<(&str, &str)> {
        self.node
            .attributes()
            .map(|attr| (attr.name(), attr.value()))
            .collect()
    }

    fn text(&self) -> Option<String> {
        // XML comments split the body into several text nodes
        let text: String = self
            .node
            .children()
            .filter(|n| n.is_text())
            .filter_map(|n| n.text())
            .collect();

        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}
