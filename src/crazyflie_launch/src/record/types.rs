//! record.json data structures

use crate::params::{ParamTree, ParamValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root structure for record.json
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LaunchRecord {
    pub node: Vec<NodeRecord>,
    /// Whole parameter namespace, keyed by resolved name
    pub params: ParamTree,
    /// Effective value of every top-level argument
    pub args: BTreeMap<String, String>,
}

impl LaunchRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Nodes matching a plain or fully-qualified name, in launch order
    pub fn nodes_named<'a: 'b, 'b>(
        &'a self,
        name: &'b str,
    ) -> impl Iterator<Item = &'a NodeRecord> + 'b {
        self.node
            .iter()
            .filter(move |n| n.name == name || n.fully_qualified_name() == name)
    }

    /// First node matching a plain or fully-qualified name
    pub fn find_node(&self, name: &str) -> Option<&NodeRecord> {
        self.nodes_named(name).next()
    }

    /// Private parameter `key` of `node` from the whole namespace
    pub fn node_param(&self, node: &NodeRecord, key: &str) -> Option<&ParamValue> {
        self.params
            .get(&crate::substitution::context::join_name(&node.fully_qualified_name(), key))
    }
}

/// Node record structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    pub package: String,
    pub executable: String,
    pub name: String,
    pub namespace: String,
    pub output: Option<String>,
    pub respawn: bool,
    pub respawn_delay: Option<f64>,
    pub required: bool,
    pub args: Vec<String>,
    pub remaps: Vec<(String, String)>,
    pub env: Vec<(String, String)>,
    /// Parameters declared inside this node element
    pub params: ParamTree,
    pub cmd: Vec<String>,
}

impl NodeRecord {
    pub fn fully_qualified_name(&self) -> String {
        crate::substitution::context::join_name(&self.namespace, &self.name)
    }

    /// Look up a private parameter (`~key`)
    pub fn private_param(&self, key: &str) -> Option<&ParamValue> {
        let full = crate::substitution::context::join_name(&self.fully_qualified_name(), key);
        self.params.get(&full)
    }
}
