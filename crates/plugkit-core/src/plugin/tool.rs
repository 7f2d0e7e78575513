//! The tool plugin contract.

use crate::error::{ToolError, ValidationError};
use crate::param::{ParamSet, Schema, ValueMap};
use crate::plugin::Interface;

/// Default plugin name: the lowercased final segment of the type name.
pub fn default_plugin_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full).to_lowercase()
}

/// An executable unit of work.
///
/// A tool type declares its identity and parameter [`Schema`] through
/// associated functions, is constructed from a realized [`ParamSet`]
/// (the place to wire parameter change listeners), and runs against a
/// mutable [`Interface`] it may use for user interaction, subprocesses,
/// shared data, and queueing further tools.
pub trait Tool {
    /// Registry name.
    fn name() -> String
    where
        Self: Sized,
    {
        default_plugin_name::<Self>()
    }

    /// One-line description shown in tool listings.
    fn help() -> String
    where
        Self: Sized,
    {
        String::new()
    }

    /// Grouping tag. Must be non-empty to be registrable.
    fn collection() -> String
    where
        Self: Sized,
    {
        "tool".to_string()
    }

    /// Parameter declarations, in prompt order.
    fn schema() -> Schema
    where
        Self: Sized,
    {
        Schema::new()
    }

    /// Construct from realized parameters.
    fn build(params: ParamSet) -> Self
    where
        Self: Sized;

    fn params(&self) -> &ParamSet;

    /// Run the tool. `0` means success; any other code stops the chain.
    fn execute(&mut self, run: &mut Interface) -> Result<i32, ToolError>;

    /// Strictly validate every parameter's current value.
    fn validate(&self) -> Result<(), ValidationError> {
        self.params().validate_all()
    }

    /// Snapshot of all parameter values, keyed by name.
    fn param_dict(&self) -> ValueMap {
        self.params().values()
    }
}

/// A registered tool's type-erased handle.
///
/// Carries the tool's identity alongside function pointers for schema
/// access and construction, so declarations can be cloned into tool
/// chains without keeping the concrete type around.
#[derive(Clone)]
pub struct ToolDecl {
    pub name: String,
    pub help: String,
    pub collection: String,
    schema: fn() -> Schema,
    construct: fn(&ValueMap) -> Result<Box<dyn Tool>, ValidationError>,
}

impl ToolDecl {
    pub fn of<T: Tool + 'static>() -> Self {
        Self {
            name: T::name(),
            help: T::help(),
            collection: T::collection(),
            schema: T::schema,
            construct: |args| {
                let params = T::schema().instantiate(args)?;
                Ok(Box::new(T::build(params)))
            },
        }
    }

    pub fn schema(&self) -> Schema {
        (self.schema)()
    }

    /// Construct an instance, seeding parameters from `args`. Supplied
    /// values are validated strictly; everything else defaults
    /// leniently.
    pub fn construct(&self, args: &ValueMap) -> Result<Box<dyn Tool>, ValidationError> {
        (self.construct)(args)
    }
}

impl std::fmt::Debug for ToolDecl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDecl")
            .field("name", &self.name)
            .field("collection", &self.collection)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::ParamSpec;
    use serde_json::json;

    struct RenamedTool {
        params: ParamSet,
    }

    impl Tool for RenamedTool {
        fn name() -> String {
            "custom-name".to_string()
        }

        fn help() -> String {
            "demonstration".to_string()
        }

        fn schema() -> Schema {
            Schema::new()
                .with(ParamSpec::string("who").required(true))
                .with(ParamSpec::int("times").default(1))
        }

        fn build(params: ParamSet) -> Self {
            Self { params }
        }

        fn params(&self) -> &ParamSet {
            &self.params
        }

        fn execute(&mut self, _run: &mut Interface) -> Result<i32, ToolError> {
            Ok(0)
        }
    }

    struct Plain;

    impl Tool for Plain {
        fn build(_params: ParamSet) -> Self {
            Plain
        }

        fn params(&self) -> &ParamSet {
            unimplemented!("no parameters")
        }

        fn execute(&mut self, _run: &mut Interface) -> Result<i32, ToolError> {
            Ok(0)
        }
    }

    #[test]
    fn default_name_is_the_lowercased_type_name() {
        assert_eq!(Plain::name(), "plain");
        assert_eq!(Plain::collection(), "tool");
        assert_eq!(Plain::help(), "");
    }

    #[test]
    fn decl_carries_overridden_identity() {
        let decl = ToolDecl::of::<RenamedTool>();
        assert_eq!(decl.name, "custom-name");
        assert_eq!(decl.help, "demonstration");
        assert_eq!(decl.collection, "tool");
        assert_eq!(decl.schema().len(), 2);
    }

    #[test]
    fn construct_with_unmet_required_params_succeeds_but_fails_validate() {
        let decl = ToolDecl::of::<RenamedTool>();
        let tool = decl.construct(&ValueMap::new()).unwrap();
        assert!(tool.validate().is_err());

        let mut args = ValueMap::new();
        args.insert("who".into(), json!("world"));
        let tool = decl.construct(&args).unwrap();
        tool.validate().unwrap();
        assert_eq!(tool.param_dict().get("who"), Some(&json!("world")));
        assert_eq!(tool.param_dict().get("times"), Some(&json!(1)));
    }

    #[test]
    fn construct_rejects_invalid_supplied_values() {
        let decl = ToolDecl::of::<RenamedTool>();
        let mut args = ValueMap::new();
        args.insert("who".into(), json!("world"));
        args.insert("times".into(), json!("not a number"));
        assert!(decl.construct(&args).is_err());
    }
}
