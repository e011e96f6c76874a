//! Substitution types

use crate::error::SubstitutionError;
use crate::substitution::context::LaunchContext;
use std::path::{Path, PathBuf};

/// A piece of an attribute value, either literal text or a `$(...)` substitution
#[derive(Debug, Clone, PartialEq)]
pub enum Substitution {
    /// Plain text (no substitution)
    Text(String),
    /// $(arg name) - launch argument, `$(var name)` is accepted as an alias
    Arg(String),
    /// $(env VAR) - environment variable that must be set
    Env(String),
    /// $(optenv VAR [default]) - environment variable with optional default
    OptEnv {
        name: String,
        default: Option<String>,
    },
    /// $(find package) - package directory
    Find(String),
    /// $(dirname) - directory of the launch file being read
    Dirname,
}

impl Substitution {
    /// Resolve substitution to string value
    pub fn resolve(&self, context: &LaunchContext) -> Result<String, SubstitutionError> {
        match self {
            Substitution::Text(s) => Ok(s.clone()),
            Substitution::Arg(name) => context
                .get_configuration(name)
                .ok_or_else(|| SubstitutionError::UndefinedArgument(name.clone())),
            Substitution::Env(name) => {
                std::env::var(name).map_err(|_| SubstitutionError::UndefinedEnvVar(name.clone()))
            }
            Substitution::OptEnv { name, default } => Ok(std::env::var(name)
                .ok()
                .or_else(|| default.clone())
                .unwrap_or_default()),
            Substitution::Find(package) => find_package(package)
                .map(|p| p.display().to_string())
                .ok_or_else(|| SubstitutionError::PackageNotFound(package.clone())),
            Substitution::Dirname => context
                .current_dir()
                .map(|p| p.display().to_string())
                .ok_or(SubstitutionError::NoCurrentFile),
        }
    }
}

/// Locate a package directory from `ROS_PACKAGE_PATH` or `CMAKE_PREFIX_PATH`
pub fn find_package(package: &str) -> Option<PathBuf> {
    if let Ok(package_path) = std::env::var("ROS_PACKAGE_PATH") {
        for root in std::env::split_paths(&package_path) {
            if is_package_dir(&root, package) {
                return Some(root);
            }
            let candidate = root.join(package);
            if is_package_dir(&candidate, package) {
                return Some(candidate);
            }
        }
    }

    if let Ok(prefix_path) = std::env::var("CMAKE_PREFIX_PATH") {
        for prefix in std::env::split_paths(&prefix_path) {
            let candidate = prefix.join("share").join(package);
            if candidate.join("package.xml").exists() {
                return Some(candidate);
            }
        }
    }

    None
}

fn is_package_dir(dir: &Path, package: &str) -> bool {
    dir.file_name().and_then(|n| n.to_str()) == Some(package) && dir.join("package.xml").exists()
}

/// Resolve list of substitutions to single string
pub fn resolve_substitutions(
    subs: &[Substitution],
    context: &LaunchContext,
) -> Result<String, SubstitutionError> {
    let mut result = String::new();
    for sub in subs {
        result.push_str(&sub.resolve(context)?);
    }
    Ok(result)
}
