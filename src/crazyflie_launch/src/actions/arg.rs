//! Arg action implementation

use crate::error::{ParseError, Result};
use crate::substitution::{
    parse_substitutions, resolve_substitutions, ArgumentMetadata, LaunchContext, Substitution,
};
use crate::xml::{Entity, EntityExt};

/// Arg action representing a launch argument declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ArgAction {
    pub name: String,
    pub default: Option<Vec<Substitution>>,
    pub value: Option<Vec<Substitution>>,
    pub doc: Option<String>,
}

/// Type implied by an argument's default, used to check overrides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Bool,
    Numeric,
    Text,
}

impl ArgKind {
    pub fn infer(default: &str) -> Self {
        if is_bool_literal(default) {
            ArgKind::Bool
        } else if !default.trim().is_empty() && default.trim().parse::<f64>().is_ok() {
            ArgKind::Numeric
        } else {
            ArgKind::Text
        }
    }

    /// Check an override against the kind
    pub fn check(self, name: &str, value: &str) -> Result<()> {
        match self {
            ArgKind::Bool if !is_bool_literal(value) => Err(ParseError::InvalidBoolean {
                name: name.to_string(),
                value: value.to_string(),
            }),
            ArgKind::Numeric if value.trim().parse::<f64>().is_err() => {
                Err(ParseError::TypeCoercion {
                    attribute: name.to_string(),
                    value: value.to_string(),
                    expected_type: "number",
                })
            }
            _ => Ok(()),
        }
    }
}

fn is_bool_literal(value: &str) -> bool {
    matches!(value, "True" | "False")
}

impl ArgAction {
    pub fn from_entity<E: Entity>(entity: &E) -> Result<Self> {
        let name = entity.required_attr("name")?;

        let default = entity
            .get_attr_str("default", true)?
            .map(|s| parse_substitutions(&s))
            .transpose()?;
        let value = entity
            .get_attr_str("value", true)?
            .map(|s| parse_substitutions(&s))
            .transpose()?;

        if default.is_some() && value.is_some() {
            return Err(ParseError::InvalidArgDeclaration {
                name,
                reason: "'default' and 'value' are mutually exclusive".to_string(),
            });
        }

        Ok(Self {
            name,
            default,
            value,
            doc: entity.get_attr("doc", true)?,
        })
    }

    /// Apply argument to context
    ///
    /// Priority: 1) fixed `value`, 2) invoker override, 3) `default`.
    /// An argument with neither stays unset until an override supplies it.
    /// Values forwarded by `pass_all_args` never conflict with a fixed `value`.
    pub fn apply(&self, context: &mut LaunchContext) -> Result<()> {
        let value = self
            .value
            .as_ref()
            .map(|v| resolve_substitutions(v, context))
            .transpose()?;
        let default = self
            .default
            .as_ref()
            .map(|d| resolve_substitutions(d, context))
            .transpose()?;

        let overridden = context.take_override(&self.name);

        let effective = match (&value, overridden) {
            (Some(fixed), Some(over)) if over.forwarded => {
                log::debug!("Argument {} keeps fixed value over forwarded one", self.name);
                Some(fixed.clone())
            }
            (Some(_), Some(_)) => return Err(ParseError::ArgumentOverride(self.name.clone())),
            (Some(fixed), None) => Some(fixed.clone()),
            (None, Some(over)) => {
                if let Some(default) = &default {
                    ArgKind::infer(default).check(&self.name, &over.value)?;
                }
                log::debug!("Argument {} overridden: {}", self.name, over.value);
                Some(over.value)
            }
            (None, None) => default.clone(),
        };

        match effective {
            Some(v) => context.set_configuration(self.name.clone(), v),
            None => log::debug!("Argument {} declared without a value", self.name),
        }

        context.declare_argument(ArgumentMetadata {
            name: self.name.clone(),
            default,
            value,
            doc: self.doc.clone(),
        });

        Ok(())
    }
}
