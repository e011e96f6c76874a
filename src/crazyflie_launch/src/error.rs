//! Error types for crazyflie_launch

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("XML parsing error: {0}")]
    XmlError(#[from] roxmltree::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Missing required attribute '{attribute}' on element '<{element}>'")]
    MissingAttribute { element: String, attribute: String },

    #[error("Type coercion failed for '{attribute}' with value '{value}' (expected {expected_type})")]
    TypeCoercion {
        attribute: String,
        value: String,
        expected_type: &'static str,
    },

    #[error("Unexpected element '<{child}>' in '<{parent}>'")]
    UnexpectedElement { parent: String, child: String },

    #[error("Invalid substitution syntax: {0}")]
    InvalidSubstitution(String),

    #[error("Invalid value '{value}' for boolean argument '{name}' (expected True or False)")]
    InvalidBoolean { name: String, value: String },

    #[error("Cannot override argument '{0}': it is fixed with a value in the launch file")]
    ArgumentOverride(String),

    #[error("Invalid <arg> declaration '{name}': {reason}")]
    InvalidArgDeclaration { name: String, reason: String },

    #[error("Invalid condition value '{0}' (expected true, false, 1 or 0)")]
    InvalidCondition(String),

    #[error("Substitution error: {0}")]
    Substitution(#[from] SubstitutionError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum SubstitutionError {
    #[error("Undefined argument: '{0}'. Did you forget to declare it with <arg> or pass name:=value?")]
    UndefinedArgument(String),

    #[error(
        "Undefined environment variable: '{0}'. Make sure the variable is set in your environment."
    )]
    UndefinedEnvVar(String),

    #[error("Package '{0}' not found. Ensure the package is installed and sourced.")]
    PackageNotFound(String),

    #[error("$(dirname) used outside of a launch file")]
    NoCurrentFile,

    #[error("Invalid substitution: {0}")]
    InvalidSubstitution(String),
}

/// Violations of the Crazyflie launch configuration record invariants
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing parameter '{0}'")]
    MissingParameter(String),

    #[error("Parameter '{key}' has the wrong type (expected {expected})")]
    WrongType { key: String, expected: &'static str },

    #[error("{topics} log topics but {frequencies} log topic frequencies")]
    FrequencyCountMismatch { topics: usize, frequencies: usize },

    #[error("Log topic '{0}' has no genericLogTopic_{0}_Variables entry")]
    MissingTopicVariables(String),

    #[error("Invalid frequency {frequency} for log topic '{topic}'")]
    InvalidFrequency { topic: String, frequency: i64 },

    #[error("No node named '{0}' in the launch record")]
    NodeNotFound(String),

    #[error("Several nodes are named '{0}'; use the fully-qualified name")]
    AmbiguousNode(String),
}

pub type Result<T> = std::result::Result<T, ParseError>;
