//! Node action implementation

use crate::{
    actions::{ParamAction, RosParamAction},
    condition::should_process_entity,
    error::{ParseError, Result},
    substitution::{parse_substitutions, resolve_substitutions, LaunchContext, Substitution},
    xml::{Entity, EntityExt, XmlEntity},
};

/// Node action representing a process to launch
#[derive(Debug, Clone)]
pub struct NodeAction {
    pub package: Vec<Substitution>,
    pub node_type: Vec<Substitution>,
    pub name: Vec<Substitution>,
    pub namespace: Option<Vec<Substitution>>,
    pub args: Option<Vec<Substitution>>,
    pub launch_prefix: Option<Vec<Substitution>>,
    pub output: Option<String>,
    pub respawn: bool,
    pub respawn_delay: Option<f64>,
    pub required: bool,
    pub parameters: Vec<ParamAction>,
    pub rosparams: Vec<RosParamAction>,
    pub remappings: Vec<Remapping>,
    pub environment: Vec<EnvAction>,
}

impl NodeAction {
    /// Parse a `<node>`; children whose `if`/`unless` is false are dropped here
    pub fn from_entity(entity: &XmlEntity, context: &LaunchContext) -> Result<Self> {
        let package = parse_substitutions(&entity.required_attr("pkg")?)?;

        // `exec` is accepted as a spelling of `type`
        let node_type = match entity.get_attr_str("type", true)? {
            Some(t) => t,
            None => entity
                .get_attr_str("exec", true)?
                .ok_or_else(|| ParseError::MissingAttribute {
                    element: "node".to_string(),
                    attribute: "type".to_string(),
                })?,
        };
        let node_type = parse_substitutions(&node_type)?;

        let name = parse_substitutions(&entity.required_attr("name")?)?;

        let optional_subs = |attr: &str| -> Result<Option<Vec<Substitution>>> {
            entity
                .get_attr_str(attr, true)?
                .map(|s| parse_substitutions(&s))
                .transpose()
        };

        let mut parameters = Vec::new();
        let mut rosparams = Vec::new();
        let mut remappings = Vec::new();
        let mut environment = Vec::new();

        for child in entity.children() {
            if !should_process_entity(&child, context)? {
                log::debug!("Skipping <{}> in node due to condition", child.type_name());
                continue;
            }
            match child.type_name() {
                "param" => parameters.push(ParamAction::from_entity(&child)?),
                "rosparam" => rosparams.push(RosParamAction::from_entity(&child)?),
                "remap" => remappings.push(Remapping::from_entity(&child)?),
                "env" => environment.push(EnvAction::from_entity(&child)?),
                other => {
                    return Err(ParseError::UnexpectedElement {
                        parent: "node".to_string(),
                        child: other.to_string(),
                    })
                }
            }
        }

        Ok(Self {
            package,
            node_type,
            name,
            namespace: optional_subs("ns")?,
            args: optional_subs("args")?,
            launch_prefix: optional_subs("launch-prefix")?,
            output: entity.get_attr("output", true)?,
            respawn: entity.get_bool_attr("respawn")?.unwrap_or(false),
            respawn_delay: entity.get_attr("respawn_delay", true)?,
            required: entity.get_bool_attr("required")?.unwrap_or(false),
            parameters,
            rosparams,
            remappings,
            environment,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Remapping {
    pub from: Vec<Substitution>,
    pub to: Vec<Substitution>,
}

impl Remapping {
    pub fn from_entity<E: Entity>(entity: &E) -> Result<Self> {
        Ok(Self {
            from: parse_substitutions(&entity.required_attr("from")?)?,
            to: parse_substitutions(&entity.required_attr("to")?)?,
        })
    }

    pub fn resolve(&self, context: &LaunchContext) -> Result<(String, String)> {
        Ok((
            resolve_substitutions(&self.from, context)?,
            resolve_substitutions(&self.to, context)?,
        ))
    }
}

/// `<env name value>`
#[derive(Debug, Clone, PartialEq)]
pub struct EnvAction {
    pub name: Vec<Substitution>,
    pub value: Vec<Substitution>,
}

impl EnvAction {
    pub fn from_entity<E: Entity>(entity: &E) -> Result<Self> {
        Ok(Self {
            name: parse_substitutions(&entity.required_attr("name")?)?,
            value: parse_substitutions(&entity.required_attr("value")?)?,
        })
    }

    pub fn resolve(&self, context: &LaunchContext) -> Result<(String, String)> {
        Ok((
            resolve_substitutions(&self.name, context)?,
            resolve_substitutions(&self.value, context)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_node(xml: &str, context: &LaunchContext) -> Result<NodeAction> {
        let doc = roxmltree::Document::parse(xml).unwrap();
        let entity = XmlEntity::new(doc.root_element());
        NodeAction::from_entity(&entity, context)
    }

    #[test]
    fn test_parse_simple_node() {
        let xml = r#"<node pkg="crazyflie_driver" type="crazyflie_add" name="crazyflie_add" output="screen" />"#;
        let node = parse_node(xml, &LaunchContext::new()).unwrap();

        assert_eq!(
            node.package,
            vec![Substitution::Text("crazyflie_driver".to_string())]
        );
        assert_eq!(
            node.node_type,
            vec![Substitution::Text("crazyflie_add".to_string())]
        );
        assert_eq!(node.output, Some("screen".to_string()));
        assert!(node.namespace.is_none());
        assert!(!node.respawn);
        assert!(!node.required);
    }

    #[test]
    fn test_exec_alias() {
        let xml = r#"<node pkg="crazyflie_driver" exec="crazyflie_server" name="server" />"#;
        let node = parse_node(xml, &LaunchContext::new()).unwrap();
        assert_eq!(
            node.node_type,
            vec![Substitution::Text("crazyflie_server".to_string())]
        );
    }

    #[test]
    fn test_missing_type_and_name() {
        let context = LaunchContext::new();
        assert!(parse_node(r#"<node pkg="a" name="n" />"#, &context).is_err());
        assert!(parse_node(r#"<node pkg="a" type="b" />"#, &context).is_err());
        assert!(parse_node(r#"<node type="b" name="n" />"#, &context).is_err());
    }

    #[test]
    fn test_parse_node_children() {
        let xml = r#"<node pkg="crazyflie_driver" type="crazyflie_add" name="crazyflie_add">
            <param name="uri" value="$(arg uri)" />
            <rosparam>genericLogTopics: ["state_data"]</rosparam>
            <remap from="imu" to="/cf1/imu" />
            <env name="ROSCONSOLE_FORMAT" value="[${severity}] ${message}" />
        </node>"#;
        let node = parse_node(xml, &LaunchContext::new()).unwrap();

        assert_eq!(node.parameters.len(), 1);
        assert_eq!(node.rosparams.len(), 1);
        assert_eq!(node.remappings.len(), 1);
        assert_eq!(node.environment.len(), 1);
    }

    #[test]
    fn test_child_conditions() {
        let xml = r#"<node pkg="a" type="b" name="n">
            <param name="kept" value="1" />
            <param name="dropped" value="2" if="$(arg debug)" />
        </node>"#;
        let mut context = LaunchContext::new();
        context.set_configuration("debug".to_string(), "false".to_string());

        let node = parse_node(xml, &context).unwrap();
        assert_eq!(node.parameters.len(), 1);
    }

    #[test]
    fn test_unexpected_child() {
        let xml = r#"<node pkg="a" type="b" name="n"><group /></node>"#;
        let err = parse_node(xml, &LaunchContext::new()).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedElement { .. }));
    }

    #[test]
    fn test_respawn_attributes() {
        let xml = r#"<node pkg="a" type="b" name="n" respawn="true" respawn_delay="2.5" required="False" />"#;
        let node = parse_node(xml, &LaunchContext::new()).unwrap();
        assert!(node.respawn);
        assert_eq!(node.respawn_delay, Some(2.5));
        assert!(!node.required);
    }

    #[test]
    fn test_remap_resolve() {
        let doc = roxmltree::Document::parse(r#"<remap from="imu" to="$(arg ns)/imu" />"#).unwrap();
        let remap = Remapping::from_entity(&XmlEntity::new(doc.root_element())).unwrap();
        let mut context = LaunchContext::new();
        context.set_configuration("ns".to_string(), "/cf1".to_string());
        assert_eq!(
            remap.resolve(&context).unwrap(),
            ("imu".to_string(), "/cf1/imu".to_string())
        );
    }
}
