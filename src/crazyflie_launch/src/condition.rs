//! Condition evaluation for if/unless attributes

use crate::{
    error::{ParseError, Result},
    substitution::{parse_substitutions, resolve_substitutions, LaunchContext},
    xml::Entity,
};

/// Evaluate whether an entity should be processed based on if/unless conditions
pub fn should_process_entity<E: Entity>(entity: &E, context: &LaunchContext) -> Result<bool> {
    if let Some(if_condition) = entity.get_attr_str("if", true)? {
        if !evaluate_condition(&if_condition, context)? {
            return Ok(false);
        }
    }

    if let Some(unless_condition) = entity.get_attr_str("unless", true)? {
        if evaluate_condition(&unless_condition, context)? {
            return Ok(false);
        }
    }

    Ok(true)
}

/// Evaluate a condition string (may contain substitutions)
fn evaluate_condition(condition: &str, context: &LaunchContext) -> Result<bool> {
    let subs = parse_substitutions(condition)?;
    let resolved = resolve_substitutions(&subs, context)?;
    parse_condition_value(&resolved)
}

/// Conditions only accept true/false/1/0, in any case
pub(crate) fn parse_condition_value(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ParseError::InvalidCondition(value.to_string())),
    }
}
