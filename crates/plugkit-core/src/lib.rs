//! Core framework for the plugkit extensible application toolkit.
//!
//! plugkit lets an application grow by plugging in small executable
//! units (tools) and user-facing surfaces (front-ends) discovered
//! through a shared registry. Tools declare typed, validated parameters;
//! an interface drives a chain of tools over a shared data bag, so one
//! tool can decide at runtime which tool runs next.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`callback`] | Deferred-mutation notification primitive |
//! | [`param`] | Parameter descriptors, validators, schemas |
//! | [`plugin`] | [`Tool`]/[`FrontEnd`] contracts and the [`Interface`] driver |
//! | [`registry`] | Name-keyed tool and front-end registration |
//! | [`config`] | Per-plugin key/value persistence |
//! | [`command`] | Subprocess execution with line-mirrored output |
//! | [`error`] | One error enum per failure domain |
//!
//! # A minimal tool
//!
//! ```
//! use plugkit_core::param::{ParamSet, ParamSpec, Schema};
//! use plugkit_core::plugin::{Interface, Tool};
//! use plugkit_core::ToolError;
//!
//! struct Greet {
//!     params: ParamSet,
//! }
//!
//! impl Tool for Greet {
//!     fn schema() -> Schema {
//!         Schema::new().with(ParamSpec::string("who").default("world"))
//!     }
//!
//!     fn build(params: ParamSet) -> Self {
//!         Self { params }
//!     }
//!
//!     fn params(&self) -> &ParamSet {
//!         &self.params
//!     }
//!
//!     fn execute(&mut self, run: &mut Interface) -> Result<i32, ToolError> {
//!         let who = self.params.get("who").and_then(|p| p.as_str());
//!         run.message(&format!("hello, {}", who.unwrap_or_default()));
//!         Ok(0)
//!     }
//! }
//! ```

pub mod callback;
pub mod command;
pub mod config;
pub mod error;
pub mod humanize;
pub mod param;
pub mod plugin;
pub mod registry;

// Re-export the working set at the crate root for convenience.
pub use callback::{Callback, CallbackId};
pub use command::{CommandResult, CommandRunner, RunOptions};
pub use config::PluginConfig;
pub use error::{CommandError, ConfigError, RegistryError, ToolError, ValidationError};
pub use param::{ParamSet, ParamSpec, ParamType, Parameter, Schema};
pub use plugin::{FrontEnd, Interface, NullFrontEnd, Tool, ToolDecl};
pub use registry::{INTERFACE_DEFAULT, InterfaceDecl, PluginRegistry};

/// The shared data bag passed along a tool chain, keyed by parameter
/// name.
pub type ToolData = param::ValueMap;
