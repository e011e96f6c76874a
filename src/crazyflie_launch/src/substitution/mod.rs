//! Substitution module

pub mod context;
pub mod parser;
pub mod types;

pub use context::{ArgOverride, ArgumentMetadata, LaunchContext, Scope};
pub use parser::parse_substitutions;
pub use types::{resolve_substitutions, Substitution};
