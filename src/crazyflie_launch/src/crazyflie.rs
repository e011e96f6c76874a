//! Typed view of the `crazyflie_add` launch configuration
//!
//! The bundled manifest declares the node that adds a Crazyflie to the
//! driver: connection URI, trims, which standard log streams to publish and
//! a set of generic log topics, each sampled at its own frequency.

use crate::{
    error::{ConfigError, Result},
    params::{ParamTree, ParamValue},
    parse_launch_str,
    record::{LaunchRecord, NodeRecord},
    substitution::context::join_name,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The bundled `crazyflie_add.launch` manifest
pub const MANIFEST: &str = include_str!("../launch/crazyflie_add.launch");

/// Name of the node the manifest launches
pub const NODE_NAME: &str = "crazyflie_add";

/// Arguments the manifest declares, in declaration order
pub const ARGUMENTS: [&str; 12] = [
    "uri",
    "tf_prefix",
    "roll_trim",
    "pitch_trim",
    "enable_logging",
    "use_ros_time",
    "enable_logging_imu",
    "enable_logging_temperature",
    "enable_logging_magnetic_field",
    "enable_logging_pressure",
    "enable_logging_battery",
    "enable_logging_packets",
];

/// A generic log topic: a named set of firmware log variables sampled together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogTopic {
    pub name: String,
    /// Sampling rate in Hz, passed through to the driver unchanged
    pub frequency: u32,
    pub variables: Vec<String>,
}

impl LogTopic {
    /// Parameter key holding the variables of `topic`
    pub fn variables_key(topic: &str) -> String {
        format!("genericLogTopic_{}_Variables", topic)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrazyflieConfig {
    pub uri: String,
    pub tf_prefix: String,
    pub roll_trim: f64,
    pub pitch_trim: f64,
    pub enable_logging: bool,
    pub use_ros_time: bool,
    pub enable_logging_imu: bool,
    pub enable_logging_temperature: bool,
    pub enable_logging_magnetic_field: bool,
    pub enable_logging_pressure: bool,
    pub enable_logging_battery: bool,
    pub enable_logging_packets: bool,
    pub log_topics: Vec<LogTopic>,
}

impl Default for CrazyflieConfig {
    fn default() -> Self {
        let strings =
            |items: &[&str]| -> Vec<String> { items.iter().map(|s| s.to_string()).collect() };
        Self {
            uri: "radio://0/80/2M".to_string(),
            tf_prefix: String::new(),
            roll_trim: 0.0,
            pitch_trim: 0.0,
            enable_logging: true,
            use_ros_time: true,
            enable_logging_imu: false,
            enable_logging_temperature: false,
            enable_logging_magnetic_field: false,
            enable_logging_pressure: false,
            enable_logging_battery: true,
            enable_logging_packets: false,
            log_topics: vec![
                LogTopic {
                    name: "log_compact_imu".to_string(),
                    frequency: 1000,
                    variables: strings(&["gyro.x", "gyro.y", "gyro.z", "acc.x", "acc.y", "acc.z"]),
                },
                LogTopic {
                    name: "state_data".to_string(),
                    frequency: 10,
                    variables: strings(&["stabilizer.pitch", "stabilizer.roll", "stabilizer.yaw"]),
                },
            ],
        }
    }
}

impl CrazyflieConfig {
    /// Build the typed record from the parameters declared inside a node
    pub fn from_node(node: &NodeRecord) -> std::result::Result<Self, ConfigError> {
        Self::from_params(&NodeParams {
            params: &node.params,
            fqn: node.fully_qualified_name(),
        })
    }

    /// Build the typed record for the node called `name` (plain or
    /// fully-qualified), reading its private names from the whole namespace
    pub fn from_record(
        record: &LaunchRecord,
        name: &str,
    ) -> std::result::Result<Self, ConfigError> {
        let mut matches = record.nodes_named(name);
        let node = matches
            .next()
            .ok_or_else(|| ConfigError::NodeNotFound(name.to_string()))?;
        if matches.next().is_some() {
            return Err(ConfigError::AmbiguousNode(name.to_string()));
        }

        Self::from_params(&NodeParams {
            params: &record.params,
            fqn: node.fully_qualified_name(),
        })
    }

    fn from_params(params: &NodeParams<'_>) -> std::result::Result<Self, ConfigError> {
        let topics = params.string_list("genericLogTopics")?;
        let frequencies = params.get("genericLogTopicFrequencies")?;
        let frequencies = frequencies
            .as_list()
            .ok_or_else(|| wrong_type("genericLogTopicFrequencies", "list of integers"))?;

        if topics.len() != frequencies.len() {
            return Err(ConfigError::FrequencyCountMismatch {
                topics: topics.len(),
                frequencies: frequencies.len(),
            });
        }

        let mut log_topics = Vec::with_capacity(topics.len());
        for (name, frequency) in topics.into_iter().zip(frequencies) {
            let frequency = frequency
                .as_i64()
                .ok_or_else(|| wrong_type("genericLogTopicFrequencies", "list of integers"))?;
            let frequency =
                u32::try_from(frequency).map_err(|_| ConfigError::InvalidFrequency {
                    topic: name.clone(),
                    frequency,
                })?;

            let key = LogTopic::variables_key(&name);
            let variables = match params.string_list(&key) {
                Err(ConfigError::MissingParameter(_)) => {
                    return Err(ConfigError::MissingTopicVariables(name))
                }
                other => other?,
            };

            log_topics.push(LogTopic {
                name,
                frequency,
                variables,
            });
        }

        Ok(Self {
            uri: params.string("uri")?,
            tf_prefix: params.string("tf_prefix")?,
            roll_trim: params.float("roll_trim")?,
            pitch_trim: params.float("pitch_trim")?,
            enable_logging: params.boolean("enable_logging")?,
            use_ros_time: params.boolean("use_ros_time")?,
            enable_logging_imu: params.boolean("enable_logging_imu")?,
            enable_logging_temperature: params.boolean("enable_logging_temperature")?,
            enable_logging_magnetic_field: params.boolean("enable_logging_magnetic_field")?,
            enable_logging_pressure: params.boolean("enable_logging_pressure")?,
            enable_logging_battery: params.boolean("enable_logging_battery")?,
            enable_logging_packets: params.boolean("enable_logging_packets")?,
            log_topics,
        })
    }
}

fn wrong_type(key: &str, expected: &'static str) -> ConfigError {
    ConfigError::WrongType {
        key: key.to_string(),
        expected,
    }
}

/// Private parameters of one node
struct NodeParams<'a> {
    params: &'a ParamTree,
    fqn: String,
}

impl NodeParams<'_> {
    fn get(&self, key: &str) -> std::result::Result<&ParamValue, ConfigError> {
        self.params
            .get(&join_name(&self.fqn, key))
            .ok_or_else(|| ConfigError::MissingParameter(key.to_string()))
    }

    // Numbers are accepted where a string is expected: `uri:=80` is still a valid string
    fn string(&self, key: &str) -> std::result::Result<String, ConfigError> {
        match self.get(key)? {
            ParamValue::Str(s) => Ok(s.clone()),
            ParamValue::Int(n) => Ok(n.to_string()),
            ParamValue::Double(n) => Ok(n.to_string()),
            _ => Err(wrong_type(key, "string")),
        }
    }

    fn float(&self, key: &str) -> std::result::Result<f64, ConfigError> {
        self.get(key)?
            .as_f64()
            .ok_or_else(|| wrong_type(key, "number"))
    }

    fn boolean(&self, key: &str) -> std::result::Result<bool, ConfigError> {
        self.get(key)?
            .as_bool()
            .ok_or_else(|| wrong_type(key, "bool"))
    }

    fn string_list(&self, key: &str) -> std::result::Result<Vec<String>, ConfigError> {
        let items = self
            .get(key)?
            .as_list()
            .ok_or_else(|| wrong_type(key, "list of strings"))?;
        items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| wrong_type(key, "list of strings"))
            })
            .collect()
    }
}

/// Load the bundled manifest with `overrides` and validate the result
pub fn load_crazyflie_add(
    overrides: HashMap<String, String>,
) -> Result<(LaunchRecord, CrazyflieConfig)> {
    let record = parse_launch_str(MANIFEST, overrides)?;
    let config = CrazyflieConfig::from_record(&record, NODE_NAME)?;
    Ok((record, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node_with(entries: &[(&str, ParamValue)]) -> NodeRecord {
        let params: ParamTree = entries
            .iter()
            .map(|(k, v)| (format!("/crazyflie_add/{}", k), v.clone()))
            .collect();
        NodeRecord {
            package: "crazyflie_driver".to_string(),
            executable: "crazyflie_add".to_string(),
            name: "crazyflie_add".to_string(),
            namespace: "/".to_string(),
            output: Some("screen".to_string()),
            respawn: false,
            respawn_delay: None,
            required: false,
            args: vec![],
            remaps: vec![],
            env: vec![],
            params,
            cmd: vec![],
        }
    }

    fn strs(items: &[&str]) -> ParamValue {
        ParamValue::List(items.iter().map(|s| ParamValue::Str(s.to_string())).collect())
    }

    fn full_params() -> Vec<(&'static str, ParamValue)> {
        let mut entries = vec![
            ("uri", ParamValue::Str("radio://0/80/2M".to_string())),
            ("tf_prefix", ParamValue::Str(String::new())),
            ("roll_trim", ParamValue::Int(0)),
            ("pitch_trim", ParamValue::Double(-0.5)),
            ("genericLogTopics", strs(&["state_data"])),
            (
                "genericLogTopicFrequencies",
                ParamValue::List(vec![ParamValue::Int(10)]),
            ),
            (
                "genericLogTopic_state_data_Variables",
                strs(&["stabilizer.pitch"]),
            ),
        ];
        for flag in &ARGUMENTS[4..] {
            entries.push((*flag, ParamValue::Bool(false)));
        }
        entries
    }

    #[test]
    fn test_default_matches_manifest_defaults() {
        let config = CrazyflieConfig::default();
        assert_eq!(config.uri, "radio://0/80/2M");
        assert_eq!(config.log_topics.len(), 2);
        assert_eq!(config.log_topics[0].frequency, 1000);
        assert_eq!(config.log_topics[1].frequency, 10);
    }

    #[test]
    fn test_from_node() {
        let config = CrazyflieConfig::from_node(&node_with(&full_params())).unwrap();
        assert_eq!(config.roll_trim, 0.0);
        assert_eq!(config.pitch_trim, -0.5);
        assert!(!config.enable_logging);
        assert_eq!(
            config.log_topics,
            vec![LogTopic {
                name: "state_data".to_string(),
                frequency: 10,
                variables: vec!["stabilizer.pitch".to_string()],
            }]
        );
    }

    #[test]
    fn test_frequency_count_mismatch() {
        let mut params = full_params();
        params.retain(|(k, _)| *k != "genericLogTopicFrequencies");
        params.push((
            "genericLogTopicFrequencies",
            ParamValue::List(vec![ParamValue::Int(10), ParamValue::Int(100)]),
        ));

        let err = CrazyflieConfig::from_node(&node_with(&params)).unwrap_err();
        assert_eq!(
            err,
            ConfigError::FrequencyCountMismatch {
                topics: 1,
                frequencies: 2
            }
        );
    }

    #[test]
    fn test_missing_topic_variables() {
        let mut params = full_params();
        params.retain(|(k, _)| *k != "genericLogTopic_state_data_Variables");

        let err = CrazyflieConfig::from_node(&node_with(&params)).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingTopicVariables("state_data".to_string())
        );
    }

    #[test]
    fn test_negative_frequency() {
        let mut params = full_params();
        params.retain(|(k, _)| *k != "genericLogTopicFrequencies");
        params.push((
            "genericLogTopicFrequencies",
            ParamValue::List(vec![ParamValue::Int(-1)]),
        ));

        let err = CrazyflieConfig::from_node(&node_with(&params)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFrequency { .. }));
    }

    #[test]
    fn test_wrong_type() {
        let mut params = full_params();
        params.retain(|(k, _)| *k != "enable_logging");
        params.push(("enable_logging", ParamValue::Str("maybe".to_string())));

        let err = CrazyflieConfig::from_node(&node_with(&params)).unwrap_err();
        assert_eq!(
            err,
            ConfigError::WrongType {
                key: "enable_logging".to_string(),
                expected: "bool"
            }
        );
    }

    #[test]
    fn test_missing_parameter() {
        let mut params = full_params();
        params.retain(|(k, _)| *k != "uri");

        let err = CrazyflieConfig::from_node(&node_with(&params)).unwrap_err();
        assert_eq!(err, ConfigError::MissingParameter("uri".to_string()));
    }

    #[test]
    fn test_bundled_manifest_loads() {
        let (record, config) = load_crazyflie_add(HashMap::new()).unwrap();
        assert_eq!(config, CrazyflieConfig::default());
        assert_eq!(record.node.len(), 1);
        assert_eq!(record.args.len(), ARGUMENTS.len());
    }

    #[test]
    fn test_from_record_reads_params_set_outside_node() {
        let xml = r#"<launch>
            <rosparam ns="crazyflie_add">
              genericLogTopics: ["state_data"]
              genericLogTopicFrequencies: [10]
              genericLogTopic_state_data_Variables: ["stabilizer.yaw"]
            </rosparam>
            <node pkg="crazyflie_driver" type="crazyflie_add" name="crazyflie_add">
              <param name="uri" value="radio://0/80/2M" />
              <param name="tf_prefix" value="" />
              <param name="roll_trim" value="0" />
              <param name="pitch_trim" value="0" />
            </node>
            <param name="crazyflie_add/enable_logging" value="True" />
            <param name="crazyflie_add/use_ros_time" value="True" />
            <param name="crazyflie_add/enable_logging_imu" value="False" />
            <param name="crazyflie_add/enable_logging_temperature" value="False" />
            <param name="crazyflie_add/enable_logging_magnetic_field" value="False" />
            <param name="crazyflie_add/enable_logging_pressure" value="False" />
            <param name="crazyflie_add/enable_logging_battery" value="True" />
            <param name="crazyflie_add/enable_logging_packets" value="False" />
        </launch>"#;
        let record = parse_launch_str(xml, HashMap::new()).unwrap();

        assert_eq!(
            CrazyflieConfig::from_node(&record.node[0]).unwrap_err(),
            ConfigError::MissingParameter("genericLogTopics".to_string())
        );

        let config = CrazyflieConfig::from_record(&record, NODE_NAME).unwrap();
        assert_eq!(config.log_topics[0].variables, ["stabilizer.yaw"]);
        assert!(config.enable_logging_battery);
    }

    #[test]
    fn test_from_record_node_selection() {
        let xml = r#"<launch>
            <group ns="cf1"><node pkg="crazyflie_driver" type="crazyflie_add" name="crazyflie_add" /></group>
            <group ns="cf2"><node pkg="crazyflie_driver" type="crazyflie_add" name="crazyflie_add" /></group>
        </launch>"#;
        let record = parse_launch_str(xml, HashMap::new()).unwrap();

        assert_eq!(
            CrazyflieConfig::from_record(&record, NODE_NAME).unwrap_err(),
            ConfigError::AmbiguousNode(NODE_NAME.to_string())
        );
        assert_eq!(
            CrazyflieConfig::from_record(&record, "/cf2/crazyflie_add").unwrap_err(),
            ConfigError::MissingParameter("genericLogTopics".to_string())
        );
        assert_eq!(
            CrazyflieConfig::from_record(&record, "other").unwrap_err(),
            ConfigError::NodeNotFound("other".to_string())
        );
    }

    #[test]
    fn test_variables_key() {
        assert_eq!(
            LogTopic::variables_key("state_data"),
            "genericLogTopic_state_data_Variables"
        );
    }
}
