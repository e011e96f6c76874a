//! Group action implementation

use crate::{
    error::Result,
    substitution::{parse_substitutions, resolve_substitutions, LaunchContext, Substitution},
    xml::{Entity, EntityExt},
};

/// `<group>`: scopes a namespace, remaps and env over its children
#[derive(Debug, Clone, PartialEq)]
pub struct GroupAction {
    pub namespace: Option<Vec<Substitution>>,
    pub clear_params: bool,
}

impl GroupAction {
    pub fn from_entity<E: Entity>(entity: &E) -> Result<Self> {
        Ok(Self {
            namespace: entity
                .get_attr_str("ns", true)?
                .map(|s| parse_substitutions(&s))
                .transpose()?,
            clear_params: entity.get_bool_attr("clear_params")?.unwrap_or(false),
        })
    }

    pub fn resolve_namespace(&self, context: &LaunchContext) -> Result<Option<String>> {
        Ok(self
            .namespace
            .as_ref()
            .map(|ns| resolve_substitutions(ns, context))
            .transpose()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_group_with_ns() {
        let doc = roxmltree::Document::parse(r#"<group ns="$(arg robot)" />"#).unwrap();
        let group = GroupAction::from_entity(&crate::xml::XmlEntity::new(doc.root_element())).unwrap();

        let mut context = LaunchContext::new();
        context.set_configuration("robot".to_string(), "cf2".to_string());
        assert_eq!(group.resolve_namespace(&context).unwrap(), Some("cf2".to_string()));
        assert!(!group.clear_params);
    }

    #[test]
    fn test_parse_group_without_ns() {
        let doc = roxmltree::Document::parse(r#"<group clear_params="true" />"#).unwrap();
        let group = GroupAction::from_entity(&crate::xml::XmlEntity::new(doc.root_element())).unwrap();
        assert_eq!(group.resolve_namespace(&LaunchContext::new()).unwrap(), None);
        assert!(group.clear_params);
    }
}
