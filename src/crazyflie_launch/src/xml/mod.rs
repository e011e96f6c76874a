//! XML parsing module

pub mod entity;
pub mod parser;

pub use entity::{Entity, EntityExt, XmlEntity};
pub use parser::read_launch_file;
