//! Typed, validated tool parameters.
//!
//! A tool declares its parameters as a [`Schema`] of [`ParamSpec`]
//! descriptors. At construction time the schema is realized into a
//! [`ParamSet`] of live [`Parameter`] instances, each carrying its own
//! validator pipeline and change-notification channels.
//!
//! Values are [`serde_json::Value`] throughout; the validator pipeline
//! coerces raw input (CLI strings, prompt text, serialized config) into
//! the parameter's declared type.

mod model;
mod schema;
mod spec;
pub mod validators;

pub use model::{ParamType, ParamUpdate, Parameter};
pub use schema::{ParamSet, Schema};
pub use spec::ParamSpec;

/// Open key/value bag used for parameter options and metadata.
pub type ValueMap = serde_json::Map<String, serde_json::Value>;
