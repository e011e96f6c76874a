//! Command-line and record generation

use crate::actions::NodeAction;
use crate::error::Result;
use crate::params::{resolve_name, ParamTree};
use crate::record::types::NodeRecord;
use crate::substitution::context::join_name;
use crate::substitution::{resolve_substitutions, LaunchContext};
use std::path::PathBuf;

pub struct CommandGenerator;

impl CommandGenerator {
    /// Build the record for a node and add its parameters to `params`
    pub fn generate_node_record(
        node: &NodeAction,
        context: &LaunchContext,
        params: &mut ParamTree,
    ) -> Result<NodeRecord> {
        let package = resolve_substitutions(&node.package, context)?;
        let executable = resolve_substitutions(&node.node_type, context)?;
        let name = resolve_substitutions(&node.name, context)?;

        let namespace = match &node.namespace {
            Some(ns_subs) => {
                let ns = resolve_substitutions(ns_subs, context)?;
                if ns.trim().is_empty() {
                    context.current_namespace()
                } else {
                    resolve_name(&ns, &context.current_namespace(), None)
                }
            }
            None => context.current_namespace(),
        };
        let fqn = join_name(&namespace, &name);

        let mut node_params = ParamTree::new();
        for param in &node.parameters {
            let (key, value) = param.evaluate(context, Some(&fqn))?;
            params.insert(key.clone(), value.clone());
            node_params.insert(key, value);
        }
        for rosparam in &node.rosparams {
            rosparam.evaluate(context, &fqn, &mut node_params)?;
            rosparam.evaluate(context, &fqn, params)?;
        }

        let mut remaps = context.remaps().to_vec();
        for remap in &node.remappings {
            remaps.push(remap.resolve(context)?);
        }

        // Node-level env overrides scoped env of the same name
        let mut env: Vec<(String, String)> = context.environment().to_vec();
        for env_action in &node.environment {
            let (key, value) = env_action.resolve(context)?;
            env.retain(|(k, _)| *k != key);
            env.push((key, value));
        }

        let args: Vec<String> = match &node.args {
            Some(subs) => resolve_substitutions(subs, context)?
                .split_whitespace()
                .map(str::to_string)
                .collect(),
            None => Vec::new(),
        };

        let launch_prefix = node
            .launch_prefix
            .as_ref()
            .map(|subs| resolve_substitutions(subs, context))
            .transpose()?;

        let mut cmd: Vec<String> = launch_prefix
            .iter()
            .flat_map(|p| p.split_whitespace().map(str::to_string))
            .collect();
        cmd.push(Self::resolve_executable_path(&package, &executable));
        cmd.extend(args.iter().cloned());
        cmd.extend(remaps.iter().map(|(from, to)| format!("{}:={}", from, to)));
        cmd.push(format!("__name:={}", name));
        if namespace != "/" {
            cmd.push(format!("__ns:={}", namespace));
        }

        log::debug!("Generated node {} ({} params)", fqn, node_params.len());

        Ok(NodeRecord {
            package,
            executable,
            name,
            namespace,
            output: node.output.clone(),
            respawn: node.respawn,
            respawn_delay: node.respawn_delay,
            required: node.required,
            args,
            remaps,
            env,
            params: node_params,
            cmd,
        })
    }

    /// Locate `lib/<package>/<executable>` under `CMAKE_PREFIX_PATH`
    ///
    /// Falls back to the distro install prefix when nothing is found.
    pub fn resolve_executable_path(package: &str, executable: &str) -> String {
        if let Ok(prefix_path) = std::env::var("CMAKE_PREFIX_PATH") {
            for prefix in std::env::split_paths(&prefix_path) {
                let candidate = prefix.join("lib").join(package).join(executable);
                if candidate.is_file() {
                    return candidate.display().to_string();
                }
            }
        }

        let distro = std::env::var("ROS_DISTRO").unwrap_or_else(|_| "noetic".to_string());
        PathBuf::from("/opt/ros")
            .join(distro)
            .join("lib")
            .join(package)
            .join(executable)
            .display()
            .to_string()
    }
}
