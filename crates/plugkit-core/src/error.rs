//! Framework error types.
//!
//! One enum per failure domain: [`ValidationError`] for parameter
//! validation, [`ToolError`] for tool execution, [`RegistryError`] for
//! registry lookups, [`ConfigError`] for settings persistence, and
//! [`CommandError`] for subprocess execution.

use std::path::PathBuf;

use thiserror::Error;

/// A value failed a validator's semantic check.
///
/// Raised synchronously from `Parameter::validate`. Callers propagate
/// these for explicit validation calls; they are swallowed only during
/// the lenient default-application phase of tool construction.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    /// A required parameter was left unset.
    #[error("missing required parameter {0}")]
    MissingRequired(String),

    /// The value could not be coerced to the parameter's data type.
    #[error("could not convert {value} to {expected}")]
    WrongType { value: String, expected: &'static str },

    /// The value is not a member of the parameter's choice list.
    ///
    /// The message always contains "must be one of" followed by the
    /// humanized choice list.
    #[error("value must be one of {0}")]
    InvalidChoice(String),

    /// An integer choice index falls outside `[0, len(choices))`.
    #[error("index {index} is out of range for {count} choices")]
    ChoiceIndexOutOfRange { index: i64, count: usize },

    /// The value is below the parameter's minimum bound.
    #[error("value must be at least {0}")]
    BelowMinimum(String),

    /// The value is above the parameter's maximum bound.
    #[error("value must be at most {0}")]
    AboveMaximum(String),

    /// A path-typed value does not exist on the filesystem.
    #[error("path does not exist: {0}")]
    PathNotFound(String),
}

/// Errors produced while invoking a tool.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A parameter failed validation during prompting or an explicit
    /// `validate` call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The user interrupted an interactive prompt or subprocess.
    ///
    /// Caught at the interface boundary and converted into a non-zero
    /// run result; never propagates out of `Interface::run`.
    #[error("cancelled")]
    Cancelled,

    /// The tool failed at runtime.
    #[error("{0}")]
    Failed(String),

    /// A subprocess launched by the tool failed.
    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Registry lookups for unknown plugin names.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    /// No tool is registered under the given name.
    #[error("no tool registered with the name '{0}'")]
    ToolNotFound(String),

    /// No interface is registered under the given name.
    #[error("no interface registered with the name '{0}'")]
    InterfaceNotFound(String),
}

/// Fatal errors from `PluginConfig::save`.
///
/// Config *load* failures are always non-fatal and never surface here.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `save` was called before a config path was assigned.
    #[error("config path has not been set")]
    PathNotSet,

    /// The config path names an existing directory.
    #[error("config path {0} is an existing directory")]
    PathIsDirectory(PathBuf),

    /// The config file could not be written.
    #[error("failed to write config: {0}")]
    Io(#[from] std::io::Error),

    /// A saved value could not be encoded as JSON.
    #[error("failed to encode config: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors from the subprocess command runner.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command was empty.
    #[error("cannot run an empty command")]
    EmptyCommand,

    /// The process could not be spawned or waited on.
    #[error("subprocess failed: {0}")]
    Io(#[from] std::io::Error),
}
