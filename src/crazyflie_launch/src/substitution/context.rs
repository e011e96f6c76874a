//! Launch context for managing arguments, namespaces and scoped state

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// Declared `<arg>` as seen by the loader
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentMetadata {
    pub name: String,
    pub default: Option<String>,
    pub value: Option<String>,
    pub doc: Option<String>,
}

/// An argument value supplied from outside the file declaring it
#[derive(Debug, Clone, PartialEq)]
pub struct ArgOverride {
    pub value: String,
    /// Passed along by `pass_all_args` rather than set explicitly
    pub forwarded: bool,
}

/// Saved scope boundary, restored when a `<group>` ends
#[derive(Debug, Clone, Copy)]
pub struct Scope {
    namespace_depth: usize,
    remaps_len: usize,
    env_len: usize,
}

/// Launch context holding arguments and traversal state
#[derive(Debug, Clone)]
pub struct LaunchContext {
    configurations: HashMap<String, String>,
    overrides: HashMap<String, String>,
    forwarded: HashMap<String, String>,
    used_overrides: HashSet<String>,
    declared: Vec<ArgumentMetadata>,
    current_file: Option<PathBuf>,
    namespace_stack: Vec<String>,
    remaps: Vec<(String, String)>,
    environment: Vec<(String, String)>,
}

impl LaunchContext {
    pub fn new() -> Self {
        Self {
            configurations: HashMap::new(),
            overrides: HashMap::new(),
            forwarded: HashMap::new(),
            used_overrides: HashSet::new(),
            declared: Vec::new(),
            current_file: None,
            namespace_stack: vec!["/".to_string()],
            remaps: Vec::new(),
            environment: Vec::new(),
        }
    }

    /// Create a context whose `<arg>` declarations are overridden by `overrides`
    pub fn with_overrides(overrides: HashMap<String, String>) -> Self {
        Self {
            overrides,
            ..Self::new()
        }
    }

    pub fn set_current_file(&mut self, path: PathBuf) {
        self.current_file = Some(path);
    }

    pub fn current_file(&self) -> Option<&PathBuf> {
        self.current_file.as_ref()
    }

    pub fn current_dir(&self) -> Option<PathBuf> {
        self.current_file
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    pub fn set_configuration(&mut self, name: String, value: String) {
        self.configurations.insert(name, value);
    }

    pub fn get_configuration(&self, name: &str) -> Option<String> {
        self.configurations.get(name).cloned()
    }

    pub fn configurations(&self) -> &HashMap<String, String> {
        &self.configurations
    }

    /// Look up an override, marking it as consumed
    ///
    /// Explicit overrides take precedence over forwarded ones.
    pub fn take_override(&mut self, name: &str) -> Option<ArgOverride> {
        if let Some(value) = self.overrides.get(name) {
            self.used_overrides.insert(name.to_string());
            return Some(ArgOverride {
                value: value.clone(),
                forwarded: false,
            });
        }
        self.forwarded.get(name).map(|value| ArgOverride {
            value: value.clone(),
            forwarded: true,
        })
    }

    /// Overrides that no `<arg>` declaration consumed, sorted by name
    pub fn unused_overrides(&self) -> Vec<&str> {
        let mut unused: Vec<&str> = self
            .overrides
            .keys()
            .filter(|k| !self.used_overrides.contains(*k))
            .map(String::as_str)
            .collect();
        unused.sort_unstable();
        unused
    }

    pub fn declare_argument(&mut self, metadata: ArgumentMetadata) {
        self.declared.push(metadata);
    }

    /// Arguments in declaration order
    pub fn declared_arguments(&self) -> &[ArgumentMetadata] {
        &self.declared
    }

    /// Push a namespace onto the stack
    pub fn push_namespace(&mut self, namespace: String) {
        let trimmed = namespace.trim();
        let normalized = trimmed.trim_matches('/');

        let new_ns = if trimmed.starts_with('/') {
            format!("/{}", normalized)
        } else if normalized.is_empty() {
            self.current_namespace()
        } else {
            join_name(&self.current_namespace(), normalized)
        };

        // Always push so that pops stay balanced with pushes
        self.namespace_stack.push(new_ns);
    }

    /// Get the current namespace
    pub fn current_namespace(&self) -> String {
        self.namespace_stack
            .last()
            .cloned()
            .unwrap_or_else(|| "/".to_string())
    }

    pub fn add_remap(&mut self, from: String, to: String) {
        self.remaps.push((from, to));
    }

    pub fn remaps(&self) -> &[(String, String)] {
        &self.remaps
    }

    pub fn add_environment(&mut self, name: String, value: String) {
        self.environment.push((name, value));
    }

    pub fn environment(&self) -> &[(String, String)] {
        &self.environment
    }

    /// Mark the start of a scope (namespace, remaps and env added after it are dropped on exit)
    pub fn enter_scope(&self) -> Scope {
        Scope {
            namespace_depth: self.namespace_stack.len(),
            remaps_len: self.remaps.len(),
            env_len: self.environment.len(),
        }
    }

    pub fn exit_scope(&mut self, scope: Scope) {
        self.namespace_stack.truncate(scope.namespace_depth.max(1));
        self.remaps.truncate(scope.remaps_len);
        self.environment.truncate(scope.env_len);
    }

    /// Context for an included file: same namespace, remaps and env, fresh arguments
    ///
    /// `overrides` are the include's explicit `<arg>` children, `forwarded`
    /// the arguments passed along by `pass_all_args`.
    pub fn child_for_include(
        &self,
        path: PathBuf,
        overrides: HashMap<String, String>,
        forwarded: HashMap<String, String>,
    ) -> Self {
        Self {
            configurations: HashMap::new(),
            overrides,
            forwarded,
            used_overrides: HashSet::new(),
            declared: Vec::new(),
            current_file: Some(path),
            namespace_stack: vec![self.current_namespace()],
            remaps: self.remaps.clone(),
            environment: self.environment.clone(),
        }
    }
}

/// Join a namespace and a relative name
pub fn join_name(namespace: &str, name: &str) -> String {
    let name = name.trim_start_matches('/');
    if name.is_empty() {
        return namespace.to_string();
    }
    if namespace.ends_with('/') {
        format!("{}{}", namespace, name)
    } else {
        format!("{}/{}", namespace, name)
    }
}

impl Default for LaunchContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_context() {
        let context = LaunchContext::new();
        assert!(context.get_configuration("any").is_none());
        assert_eq!(context.current_namespace(), "/");
    }

    #[test]
    fn test_set_and_get() {
        let mut context = LaunchContext::new();
        context.set_configuration("uri".to_string(), "radio://0/80/2M".to_string());
        assert_eq!(
            context.get_configuration("uri"),
            Some("radio://0/80/2M".to_string())
        );
    }

    #[test]
    fn test_overrides_are_tracked() {
        let mut overrides = HashMap::new();
        overrides.insert("uri".to_string(), "radio://0/100/2M".to_string());
        overrides.insert("typo".to_string(), "1".to_string());
        let mut context = LaunchContext::with_overrides(overrides);

        assert_eq!(
            context.take_override("uri"),
            Some(ArgOverride {
                value: "radio://0/100/2M".to_string(),
                forwarded: false,
            })
        );
        assert_eq!(context.take_override("missing"), None);
        assert_eq!(context.unused_overrides(), vec!["typo"]);
    }

    #[test]
    fn test_push_namespace_relative() {
        let mut context = LaunchContext::new();
        context.push_namespace("cf1".to_string());
        assert_eq!(context.current_namespace(), "/cf1");

        context.push_namespace("sensors/".to_string());
        assert_eq!(context.current_namespace(), "/cf1/sensors");
    }

    #[test]
    fn test_push_namespace_absolute() {
        let mut context = LaunchContext::new();
        context.push_namespace("cf1".to_string());
        context.push_namespace("/other".to_string());
        assert_eq!(context.current_namespace(), "/other");
    }

    #[test]
    fn test_empty_namespace_keeps_current() {
        let mut context = LaunchContext::new();
        let scope = context.enter_scope();
        context.push_namespace("cf1".to_string());
        context.push_namespace("".to_string());
        assert_eq!(context.current_namespace(), "/cf1");

        context.exit_scope(scope);
        assert_eq!(context.current_namespace(), "/");
    }

    #[test]
    fn test_scope_restores_state() {
        let mut context = LaunchContext::new();
        context.add_remap("a".to_string(), "b".to_string());

        let scope = context.enter_scope();
        context.push_namespace("cf1".to_string());
        context.add_remap("c".to_string(), "d".to_string());
        context.add_environment("ROSCONSOLE_FORMAT".to_string(), "${message}".to_string());
        assert_eq!(context.remaps().len(), 2);

        context.exit_scope(scope);
        assert_eq!(context.current_namespace(), "/");
        assert_eq!(context.remaps().len(), 1);
        assert!(context.environment().is_empty());
    }

    #[test]
    fn test_child_for_include() {
        let mut context = LaunchContext::new();
        context.set_configuration("uri".to_string(), "x".to_string());
        context.push_namespace("cf1".to_string());

        let mut forwarded = HashMap::new();
        forwarded.insert("rate".to_string(), "100".to_string());
        let mut child = context.child_for_include(
            PathBuf::from("/ws/a.launch"),
            HashMap::new(),
            forwarded,
        );
        assert!(child.get_configuration("uri").is_none());
        assert_eq!(child.current_namespace(), "/cf1");
        assert_eq!(child.current_dir(), Some(PathBuf::from("/ws")));

        assert!(child.take_override("rate").unwrap().forwarded);
        assert!(child.unused_overrides().is_empty());
    }

    #[test]
    fn test_join_name() {
        assert_eq!(join_name("/", "uri"), "/uri");
        assert_eq!(join_name("/cf1", "uri"), "/cf1/uri");
        assert_eq!(join_name("/cf1", ""), "/cf1");
        assert_eq!(join_name("/cf1/", "/uri"), "/cf1/uri");
    }
}
