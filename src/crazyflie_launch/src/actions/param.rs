//! Param action implementation

use crate::{
    error::{ParseError, Result},
    file_cache::read_file_cached,
    params::{resolve_name, ParamType, ParamValue},
    substitution::{parse_substitutions, resolve_substitutions, LaunchContext, Substitution},
    xml::{Entity, EntityExt},
};
use std::path::Path;

/// Where a `<param>` takes its value from
#[derive(Debug, Clone, PartialEq)]
pub enum ParamSource {
    Value(Vec<Substitution>),
    TextFile(Vec<Substitution>),
    Command(Vec<Substitution>),
}

/// `<param>` element, either at launch level or inside a node
#[derive(Debug, Clone, PartialEq)]
pub struct ParamAction {
    pub name: Vec<Substitution>,
    pub source: ParamSource,
    pub param_type: Option<ParamType>,
}

impl ParamAction {
    pub fn from_entity<E: Entity>(entity: &E) -> Result<Self> {
        let name = parse_substitutions(&entity.required_attr("name")?)?;

        let value = entity.get_attr_str("value", true)?;
        let textfile = entity.get_attr_str("textfile", true)?;
        let command = entity.get_attr_str("command", true)?;

        let source = match (value, textfile, command) {
            (Some(v), None, None) => ParamSource::Value(parse_substitutions(&v)?),
            (None, Some(f), None) => ParamSource::TextFile(parse_substitutions(&f)?),
            (None, None, Some(c)) => ParamSource::Command(parse_substitutions(&c)?),
            (None, None, None) => {
                return Err(ParseError::MissingAttribute {
                    element: "param".to_string(),
                    attribute: "value".to_string(),
                })
            }
            _ => {
                return Err(ParseError::UnexpectedElement {
                    parent: "param".to_string(),
                    child: "more than one of value/textfile/command".to_string(),
                })
            }
        };

        let param_type = entity.get_attr::<ParamType>("type", true)?;

        Ok(Self {
            name,
            source,
            param_type,
        })
    }

    /// Resolve name and value
    ///
    /// `node_fqn` is set for params nested in a `<node>`; their relative names
    /// land in the node's private namespace.
    pub fn evaluate(
        &self,
        context: &LaunchContext,
        node_fqn: Option<&str>,
    ) -> Result<(String, ParamValue)> {
        let raw_name = resolve_substitutions(&self.name, context)?;
        let namespace = node_fqn
            .map(str::to_string)
            .unwrap_or_else(|| context.current_namespace());
        let name = resolve_name(&raw_name, &namespace, node_fqn);

        let value = match &self.source {
            ParamSource::Value(subs) => {
                let raw = resolve_substitutions(subs, context)?;
                ParamValue::coerce(&name, &raw, self.param_type)?
            }
            ParamSource::TextFile(subs) => {
                let path = resolve_substitutions(subs, context)?;
                ParamValue::Str(read_file_cached(Path::new(&path))?)
            }
            ParamSource::Command(subs) => {
                let command = resolve_substitutions(subs, context)?;
                let output = run_command(&command)?;
                ParamValue::coerce(&name, &output, self.param_type.or(Some(ParamType::Str)))?
            }
        };

        Ok((name, value))
    }
}

fn run_command(command: &str) -> Result<String> {
    log::debug!("Running param command: {}", command);
    let output = std::process::Command::new("sh")
        .arg("-c")
        .arg(command)
        .output()?;

    if !output.status.success() {
        return Err(ParseError::IoError(std::io::Error::other(format!(
            "param command '{}' failed: {}",
            command,
            String::from_utf8_lossy(&output.stderr).trim()
        ))));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
