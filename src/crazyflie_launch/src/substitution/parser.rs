//! Substitution parser

use crate::{
    error::{ParseError, Result},
    substitution::types::Substitution,
};
use lru::LruCache;
use std::{cell::RefCell, num::NonZeroUsize};

// Caches parsed substitution lists, not resolved values: parsing does not
// depend on the launch context, so the same input always yields the same list.
const SUBSTITUTION_CACHE_SIZE: NonZeroUsize = match NonZeroUsize::new(256) {
    Some(size) => size,
    None => unreachable!(),
};

thread_local! {
    static PARSE_CACHE: RefCell<LruCache<String, Vec<Substitution>>> =
        RefCell::new(LruCache::new(SUBSTITUTION_CACHE_SIZE));
}

/// Parse a string like "$(arg uri)" or "radio://0/$(arg channel)/2M"
pub fn parse_substitutions(input: &str) -> Result<Vec<Substitution>> {
    let cached = PARSE_CACHE.with(|cache| cache.borrow_mut().get(input).cloned());
    if let Some(cached) = cached {
        log::trace!("Substitution parse cache hit: {}", input);
        return Ok(cached);
    }

    log::trace!("Substitution parse cache miss: {}", input);
    let result = parse_uncached(input)?;

    PARSE_CACHE.with(|cache| {
        cache.borrow_mut().put(input.to_string(), result.clone());
    });

    Ok(result)
}

fn parse_uncached(input: &str) -> Result<Vec<Substitution>> {
    let mut result = Vec::new();
    let mut chars = input.char_indices().peekable();
    let mut last_pos = 0;

    while let Some((i, ch)) = chars.next() {
        if ch != '$' || !matches!(chars.peek(), Some((_, '('))) {
            continue;
        }

        if i > last_pos {
            result.push(Substitution::Text(input[last_pos..i].to_string()));
        }

        // Skip the '('
        chars.next();

        let sub_start = i + 2;
        let mut depth = 1;
        let mut sub_end = None;

        for (pos, c) in chars.by_ref() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        sub_end = Some(pos);
                        break;
                    }
                }
                _ => {}
            }
        }

        let sub_end = sub_end.ok_or_else(|| {
            ParseError::InvalidSubstitution(format!(
                "Unmatched parentheses in substitution: {}",
                input
            ))
        })?;

        result.push(parse_substitution_content(&input[sub_start..sub_end])?);
        last_pos = sub_end + 1;
    }

    if last_pos < input.len() {
        result.push(Substitution::Text(input[last_pos..].to_string()));
    }

    if result.is_empty() {
        result.push(Substitution::Text(String::new()));
    }

    Ok(result)
}

/// Parse the content inside `$(...)`
fn parse_substitution_content(content: &str) -> Result<Substitution> {
    let trimmed = content.trim();
    let (kind, args) = match trimmed.split_once(char::is_whitespace) {
        Some((kind, args)) => (kind, Some(args.trim())),
        None => (trimmed, None),
    };

    let require_arg = |args: Option<&str>| -> Result<String> {
        match args {
            Some(a) if !a.is_empty() => Ok(a.to_string()),
            _ => Err(ParseError::InvalidSubstitution(format!(
                "{} requires an argument",
                kind
            ))),
        }
    };

    match kind {
        "" => Err(ParseError::InvalidSubstitution(
            "Empty substitution".to_string(),
        )),
        "arg" | "var" => Ok(Substitution::Arg(require_arg(args)?)),
        "env" => Ok(Substitution::Env(require_arg(args)?)),
        "optenv" => {
            let args = require_arg(args)?;
            let (name, default) = match args.split_once(char::is_whitespace) {
                Some((name, default)) => (name.to_string(), Some(default.trim().to_string())),
                None => (args, None),
            };
            Ok(Substitution::OptEnv { name, default })
        }
        "find" => Ok(Substitution::Find(require_arg(args)?)),
        "dirname" => match args {
            None => Ok(Substitution::Dirname),
            Some(_) => Err(ParseError::InvalidSubstitution(
                "dirname takes no arguments".to_string(),
            )),
        },
        other => Err(ParseError::InvalidSubstitution(format!(
            "Unknown substitution type: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        let subs = parse_substitutions("radio://0/80/2M").unwrap();
        assert_eq!(subs, vec![Substitution::Text("radio://0/80/2M".to_string())]);
    }

    #[test]
    fn test_empty_string() {
        let subs = parse_substitutions("").unwrap();
        assert_eq!(subs, vec![Substitution::Text(String::new())]);
    }

    #[test]
    fn test_arg_and_var_alias() {
        assert_eq!(
            parse_substitutions("$(arg uri)").unwrap(),
            vec![Substitution::Arg("uri".to_string())]
        );
        assert_eq!(
            parse_substitutions("$(var uri)").unwrap(),
            vec![Substitution::Arg("uri".to_string())]
        );
    }

    #[test]
    fn test_mixed_text() {
        let subs = parse_substitutions("$(arg tf_prefix)/base_link").unwrap();
        assert_eq!(
            subs,
            vec![
                Substitution::Arg("tf_prefix".to_string()),
                Substitution::Text("/base_link".to_string()),
            ]
        );
    }

    #[test]
    fn test_optenv_with_default() {
        let subs = parse_substitutions("$(optenv CF_URI radio://0/80/2M)").unwrap();
        assert_eq!(
            subs,
            vec![Substitution::OptEnv {
                name: "CF_URI".to_string(),
                default: Some("radio://0/80/2M".to_string()),
            }]
        );
    }

    #[test]
    fn test_find_and_dirname() {
        let subs = parse_substitutions("$(find crazyflie_driver)/launch").unwrap();
        assert_eq!(subs[0], Substitution::Find("crazyflie_driver".to_string()));

        let subs = parse_substitutions("$(dirname)/params.yaml").unwrap();
        assert_eq!(subs[0], Substitution::Dirname);
        assert_eq!(subs[1], Substitution::Text("/params.yaml".to_string()));
    }

    #[test]
    fn test_dollar_without_paren_is_text() {
        let subs = parse_substitutions("cost $5").unwrap();
        assert_eq!(subs, vec![Substitution::Text("cost $5".to_string())]);
    }

    #[test]
    fn test_unmatched_paren() {
        assert!(parse_substitutions("$(arg uri").is_err());
    }

    #[test]
    fn test_unknown_kind() {
        assert!(parse_substitutions("$(eval 1 + 1)").is_err());
    }

    #[test]
    fn test_missing_argument() {
        assert!(parse_substitutions("$(arg)").is_err());
        assert!(parse_substitutions("$()").is_err());
    }

    #[test]
    fn test_cache_returns_same_result() {
        let first = parse_substitutions("$(arg roll_trim)").unwrap();
        let second = parse_substitutions("$(arg roll_trim)").unwrap();
        assert_eq!(first, second);
    }
}
