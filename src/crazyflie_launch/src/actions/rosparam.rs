//! Rosparam action: YAML parameter blocks and files

use crate::{
    error::{ParseError, Result},
    file_cache::read_file_cached,
    params::{dedent, delete_name, insert_value, resolve_name, ParamTree, ParamValue},
    substitution::{parse_substitutions, resolve_substitutions, LaunchContext, Substitution},
    xml::{Entity, EntityExt},
};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosParamCommand {
    Load,
    Dump,
    Delete,
}

impl std::str::FromStr for RosParamCommand {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "load" => Ok(RosParamCommand::Load),
            "dump" => Ok(RosParamCommand::Dump),
            "delete" => Ok(RosParamCommand::Delete),
            other => Err(format!("unknown rosparam command '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RosParamAction {
    pub command: RosParamCommand,
    pub file: Option<Vec<Substitution>>,
    pub ns: Option<Vec<Substitution>>,
    pub param: Option<Vec<Substitution>>,
    pub subst_value: bool,
    pub body: Option<String>,
}

impl RosParamAction {
    pub fn from_entity<E: Entity>(entity: &E) -> Result<Self> {
        let parse_opt = |attr: &str| -> Result<Option<Vec<Substitution>>> {
            entity
                .get_attr_str(attr, true)?
                .map(|s| parse_substitutions(&s))
                .transpose()
        };

        Ok(Self {
            command: entity
                .get_attr("command", true)?
                .unwrap_or(RosParamCommand::Load),
            file: parse_opt("file")?,
            ns: parse_opt("ns")?,
            param: parse_opt("param")?,
            subst_value: entity.get_bool_attr("subst_value")?.unwrap_or(false),
            body: entity.text(),
        })
    }

    /// Apply the command to `tree`, returning the names it set
    ///
    /// `base_ns` is the enclosing namespace (the node's private namespace when nested).
    pub fn evaluate(
        &self,
        context: &LaunchContext,
        base_ns: &str,
        tree: &mut ParamTree,
    ) -> Result<Vec<String>> {
        let mut target = match &self.ns {
            Some(ns) => resolve_name(&resolve_substitutions(ns, context)?, base_ns, Some(base_ns)),
            None => base_ns.to_string(),
        };
        if let Some(param) = &self.param {
            target = resolve_name(&resolve_substitutions(param, context)?, &target, Some(&target));
        }

        match self.command {
            RosParamCommand::Dump => {
                log::warn!("rosparam dump is not supported, skipping");
                Ok(Vec::new())
            }
            RosParamCommand::Delete => {
                let removed = delete_name(tree, &target);
                log::debug!("rosparam delete {} removed {} entries", target, removed);
                Ok(Vec::new())
            }
            RosParamCommand::Load => {
                let text = match (&self.file, &self.body) {
                    (Some(file), _) => {
                        let path = resolve_substitutions(file, context)?;
                        read_file_cached(Path::new(&path))?
                    }
                    (None, Some(body)) => body.clone(),
                    (None, None) => return Ok(Vec::new()),
                };

                let text = if self.subst_value {
                    resolve_substitutions(&parse_substitutions(&text)?, context)?
                } else {
                    text
                };

                let yaml: serde_yaml::Value = serde_yaml::from_str(&dedent(&text))?;
                let value = ParamValue::from_yaml(&yaml);

                if self.param.is_none() && !matches!(value, ParamValue::Map(_)) {
                    if value == ParamValue::Str(String::new()) {
                        // Empty body, nothing to load
                        return Ok(Vec::new());
                    }
                    return Err(ParseError::TypeCoercion {
                        attribute: "rosparam".to_string(),
                        value: text.trim().to_string(),
                        expected_type: "mapping (or set the 'param' attribute)",
                    });
                }

                Ok(insert_value(tree, &target, value))
            }
        }
    }
}
