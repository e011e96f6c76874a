//! Include action implementation

use crate::{
    actions::EnvAction,
    condition::should_process_entity,
    error::{ParseError, Result},
    substitution::{parse_substitutions, resolve_substitutions, LaunchContext, Substitution},
    xml::{Entity, EntityExt, XmlEntity},
};
use std::collections::HashMap;

/// `<include file>` with its `<arg>` and `<env>` children
#[derive(Debug, Clone)]
pub struct IncludeAction {
    pub file: Vec<Substitution>,
    pub namespace: Option<Vec<Substitution>>,
    pub pass_all_args: bool,
    pub clear_params: bool,
    pub args: Vec<(String, Vec<Substitution>)>,
    pub environment: Vec<EnvAction>,
}

impl IncludeAction {
    pub fn from_entity(entity: &XmlEntity, context: &LaunchContext) -> Result<Self> {
        let file = parse_substitutions(&entity.required_attr("file")?)?;

        let mut args = Vec::new();
        let mut environment = Vec::new();

        for child in entity.children() {
            if !should_process_entity(&child, context)? {
                continue;
            }
            match child.type_name() {
                "arg" => {
                    let name = child.required_attr("name")?;
                    // Include args carry `value`; `default` is accepted the same way
                    let value = match child.get_attr_str("value", true)? {
                        Some(v) => v,
                        None => child.get_attr_str("default", true)?.ok_or_else(|| {
                            ParseError::MissingAttribute {
                                element: "arg".to_string(),
                                attribute: "value".to_string(),
                            }
                        })?,
                    };
                    args.push((name, parse_substitutions(&value)?));
                }
                "env" => environment.push(EnvAction::from_entity(&child)?),
                other => {
                    return Err(ParseError::UnexpectedElement {
                        parent: "include".to_string(),
                        child: other.to_string(),
                    })
                }
            }
        }

        Ok(Self {
            file,
            namespace: entity
                .get_attr_str("ns", true)?
                .map(|s| parse_substitutions(&s))
                .transpose()?,
            pass_all_args: entity.get_bool_attr("pass_all_args")?.unwrap_or(false),
            clear_params: entity.get_bool_attr("clear_params")?.unwrap_or(false),
            args,
            environment,
        })
    }

    /// Arguments handed to the included file
    ///
    /// With `pass_all_args`, every argument of the including file is
    /// forwarded; explicit `<arg>` children take precedence.
    pub fn resolve_args(&self, context: &LaunchContext) -> Result<IncludeArgs> {
        let mut explicit = HashMap::new();
        for (name, value) in &self.args {
            explicit.insert(name.clone(), resolve_substitutions(value, context)?);
        }

        let forwarded = if self.pass_all_args {
            context
                .configurations()
                .iter()
                .filter(|(name, _)| !explicit.contains_key(*name))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect()
        } else {
            HashMap::new()
        };

        Ok(IncludeArgs {
            explicit,
            forwarded,
        })
    }
}

/// Resolved arguments of an `<include>`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncludeArgs {
    /// From `<arg>` children; each must be declared by the included file
    pub explicit: HashMap<String, String>,
    /// From `pass_all_args`
    pub forwarded: HashMap<String, String>,
}
