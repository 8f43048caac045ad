//! XMP value types
//!
//! This module defines the values, option words and packet descriptors that
//! cross the engine boundary.

#[macro_use]
mod macros;

pub mod options;
pub mod packet;
pub mod value;

pub use options::{PropertyOptions, TemplateFlags};
pub use packet::{CharForm, PacketInfo};
pub use value::PropertyValue;
