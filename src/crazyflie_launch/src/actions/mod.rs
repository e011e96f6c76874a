//! Action module

pub mod arg;
pub mod group;
pub mod include;
pub mod node;
pub mod param;
pub mod rosparam;

pub use arg::{ArgAction, ArgKind};
pub use group::GroupAction;
pub use include::{IncludeAction, IncludeArgs};
pub use node::{EnvAction, NodeAction, Remapping};
pub use param::ParamAction;
pub use rosparam::{RosParamAction, RosParamCommand};
