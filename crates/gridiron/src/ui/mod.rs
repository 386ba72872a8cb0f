//! Built-in controls.

mod label;
mod value;

pub use label::Label;
pub use value::Value;
