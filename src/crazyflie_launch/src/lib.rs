//! crazyflie_launch library
//!
//! Loads ROS launch manifests (such as the bundled `crazyflie_add.launch`),
//! applies argument overrides and produces the launch record handed to the
//! process launcher.

pub mod actions;
pub mod condition;
pub mod crazyflie;
pub mod error;
mod file_cache;
pub mod params;
pub mod record;
pub mod substitution;
pub mod xml;

use actions::{
    ArgAction, EnvAction, GroupAction, IncludeAction, NodeAction, ParamAction, Remapping,
    RosParamAction,
};
use condition::should_process_entity;
use error::{ParseError, Result};
use params::ParamTree;
use record::{CommandGenerator, LaunchRecord, NodeRecord};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use substitution::{resolve_substitutions, ArgumentMetadata, LaunchContext};
use xml::{Entity, XmlEntity};

/// Launch tree traverser for parsing launch files
pub struct LaunchTraverser {
    context: LaunchContext,
    records: Vec<NodeRecord>,
    params: ParamTree,
}

impl LaunchTraverser {
    pub fn new(overrides: HashMap<String, String>) -> Self {
        Self {
            context: LaunchContext::with_overrides(overrides),
            records: Vec::new(),
            params: ParamTree::new(),
        }
    }

    pub fn traverse_file(&mut self, path: &Path) -> Result<()> {
        self.context.set_current_file(path.to_path_buf());
        let content = xml::read_launch_file(path)?;
        self.traverse_str(&content)
    }

    pub fn traverse_str(&mut self, content: &str) -> Result<()> {
        self.traverse_document(content)?;

        for unused in self.context.unused_overrides() {
            log::warn!("Argument override '{}' matches no declared <arg>", unused);
        }
        Ok(())
    }

    fn traverse_document(&mut self, content: &str) -> Result<()> {
        let doc = roxmltree::Document::parse(content)?;
        let root = XmlEntity::new(doc.root_element());
        if root.type_name() != "launch" {
            return Err(ParseError::UnexpectedElement {
                parent: "document".to_string(),
                child: root.type_name().to_string(),
            });
        }
        self.traverse_entity(&root)
    }

    fn traverse_children(&mut self, entity: &XmlEntity) -> Result<()> {
        for child in entity.children() {
            self.traverse_entity(&child)?;
        }
        Ok(())
    }

    fn traverse_entity(&mut self, entity: &XmlEntity) -> Result<()> {
        if !should_process_entity(entity, &self.context)? {
            log::debug!("Skipping <{}> due to condition", entity.type_name());
            return Ok(());
        }

        match entity.type_name() {
            "launch" => self.traverse_children(entity)?,
            "arg" => {
                let arg = ArgAction::from_entity(entity)?;
                arg.apply(&mut self.context)?;
            }
            "node" => {
                let node = NodeAction::from_entity(entity, &self.context)?;
                let record =
                    CommandGenerator::generate_node_record(&node, &self.context, &mut self.params)?;
                log::debug!("Node {}", record.fully_qualified_name());
                self.records.push(record);
            }
            "param" => {
                let param = ParamAction::from_entity(entity)?;
                let (name, value) = param.evaluate(&self.context, None)?;
                self.params.insert(name, value);
            }
            "rosparam" => {
                let rosparam = RosParamAction::from_entity(entity)?;
                let namespace = self.context.current_namespace();
                rosparam.evaluate(&self.context, &namespace, &mut self.params)?;
            }
            "remap" => {
                let (from, to) = Remapping::from_entity(entity)?.resolve(&self.context)?;
                self.context.add_remap(from, to);
            }
            "env" => {
                let (name, value) = EnvAction::from_entity(entity)?.resolve(&self.context)?;
                self.context.add_environment(name, value);
            }
            "group" => {
                let group = GroupAction::from_entity(entity)?;
                let namespace = group.resolve_namespace(&self.context)?;
                let scope = self.context.enter_scope();
                if let Some(ns) = namespace {
                    self.context.push_namespace(ns);
                }
                if group.clear_params {
                    log::warn!("clear_params on <group> is ignored");
                }
                let result = self.traverse_children(entity);
                self.context.exit_scope(scope);
                result?;
            }
            "include" => {
                let include = IncludeAction::from_entity(entity, &self.context)?;
                self.process_include(&include)?;
            }
            "machine" | "test" => {
                log::warn!("<{}> is not supported, skipping", entity.type_name());
            }
            other => {
                return Err(ParseError::UnexpectedElement {
                    parent: "launch".to_string(),
                    child: other.to_string(),
                })
            }
        }
        Ok(())
    }

    fn process_include(&mut self, include: &IncludeAction) -> Result<()> {
        let file = resolve_substitutions(&include.file, &self.context)?;
        let file_path = match self.context.current_dir() {
            Some(dir) if Path::new(&file).is_relative() => dir.join(&file),
            _ => Path::new(&file).to_path_buf(),
        };

        log::info!("Including launch file: {}", file_path.display());

        let args = include.resolve_args(&self.context)?;
        if include.clear_params {
            log::warn!("clear_params on <include> is ignored");
        }

        let scope = self.context.enter_scope();
        if let Some(ns) = &include.namespace {
            let ns = resolve_substitutions(ns, &self.context)?;
            self.context.push_namespace(ns);
        }
        for env in &include.environment {
            let (name, value) = env.resolve(&self.context)?;
            self.context.add_environment(name, value);
        }

        let mut included = LaunchTraverser {
            context: self
                .context
                .child_for_include(file_path.clone(), args.explicit, args.forwarded),
            records: Vec::new(),
            params: std::mem::take(&mut self.params),
        };
        self.context.exit_scope(scope);

        let result = xml::read_launch_file(&file_path)
            .and_then(|content| included.traverse_document(&content));

        self.params = std::mem::take(&mut included.params);
        result?;

        // Explicit <arg> children must match a declaration
        if let Some(name) = included.context.unused_overrides().first() {
            return Err(ParseError::InvalidArgDeclaration {
                name: name.to_string(),
                reason: format!("passed to {} but not declared there", file_path.display()),
            });
        }

        self.records.extend(included.records);
        Ok(())
    }

    /// Arguments declared by the traversed file, in declaration order
    pub fn declared_arguments(&self) -> &[ArgumentMetadata] {
        self.context.declared_arguments()
    }

    pub fn into_record(self) -> LaunchRecord {
        let args: BTreeMap<String, String> = self
            .context
            .declared_arguments()
            .iter()
            .filter_map(|arg| {
                self.context
                    .get_configuration(&arg.name)
                    .map(|value| (arg.name.clone(), value))
            })
            .collect();

        LaunchRecord {
            node: self.records,
            params: self.params,
            args,
        }
    }
}

/// Parse launch file and generate the launch record
pub fn parse_launch_file(path: &Path, overrides: HashMap<String, String>) -> Result<LaunchRecord> {
    let mut traverser = LaunchTraverser::new(overrides);
    traverser.traverse_file(path)?;
    Ok(traverser.into_record())
}

/// Parse launch XML held in memory
pub fn parse_launch_str(content: &str, overrides: HashMap<String, String>) -> Result<LaunchRecord> {
    let mut traverser = LaunchTraverser::new(overrides);
    traverser.traverse_str(content)?;
    Ok(traverser.into_record())
}

/// Declared arguments of a launch file without generating a record
pub fn list_arguments(path: &Path) -> Result<Vec<ArgumentMetadata>> {
    let mut traverser = LaunchTraverser::new(HashMap::new());
    traverser.context.set_current_file(path.to_path_buf());
    let content = xml::read_launch_file(path)?;
    let doc = roxmltree::Document::parse(&content)?;
    let root = XmlEntity::new(doc.root_element());

    // Only top-level <arg> elements; required args may be unset so nothing else is evaluated
    for child in root.children().filter(|c| c.type_name() == "arg") {
        ArgAction::from_entity(&child)?.apply(&mut traverser.context)?;
    }
    Ok(traverser.declared_arguments().to_vec())
}
