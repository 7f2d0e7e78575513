//! The plugin registry.
//!
//! Tools and front-ends live in separate partitions keyed by name.
//! Registration is explicit (the CLI registers the built-ins); the
//! registry never scans the filesystem.

use std::rc::Rc;

use tracing::{debug, warn};

use crate::error::RegistryError;
use crate::plugin::{FrontEnd, Interface, Tool, ToolDecl};

/// Front-end name used when `PLUGKIT_INTERFACE` is unset.
pub const INTERFACE_DEFAULT: &str = "stdio";

/// A registered front-end's type-erased handle.
#[derive(Clone)]
pub struct InterfaceDecl {
    pub name: String,
    pub help: String,
    pub collection: String,
    construct: fn() -> Box<dyn FrontEnd>,
}

impl InterfaceDecl {
    pub fn of<F: FrontEnd + Default + 'static>() -> Self {
        Self {
            name: F::name(),
            help: F::help(),
            collection: F::collection(),
            construct: || Box::new(F::default()),
        }
    }

    pub fn construct(&self) -> Box<dyn FrontEnd> {
        (self.construct)()
    }
}

impl std::fmt::Debug for InterfaceDecl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterfaceDecl")
            .field("name", &self.name)
            .finish()
    }
}

struct Registered<D> {
    decl: D,
    visible: bool,
}

/// Name-keyed tool and front-end partitions, in registration order.
#[derive(Default)]
pub struct PluginRegistry {
    tools: Vec<Registered<ToolDecl>>,
    interfaces: Vec<Registered<InterfaceDecl>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool type. Returns whether the registration took
    /// effect.
    pub fn register_tool<T: Tool + 'static>(&mut self) -> bool {
        self.register_tool_with::<T>(true, true)
    }

    /// Register a tool type with explicit activation and visibility.
    ///
    /// First registration wins: a duplicate name is refused. An inactive
    /// plugin is skipped entirely; a hidden one is registered but left
    /// out of default listings.
    pub fn register_tool_with<T: Tool + 'static>(&mut self, active: bool, visible: bool) -> bool {
        let decl = ToolDecl::of::<T>();
        if decl.collection.is_empty() {
            warn!(tool = %decl.name, "refusing to register tool with an empty collection");
            return false;
        }
        if !active {
            debug!(tool = %decl.name, "skipping inactive tool");
            return false;
        }
        if self.tools.iter().any(|r| r.decl.name == decl.name) {
            warn!(tool = %decl.name, "tool already registered, keeping the first");
            return false;
        }
        debug!(tool = %decl.name, collection = %decl.collection, "registered tool");
        self.tools.push(Registered { decl, visible });
        true
    }

    /// Register a front-end type.
    pub fn register_interface<F: FrontEnd + Default + 'static>(&mut self) -> bool {
        self.register_interface_with::<F>(true, true)
    }

    pub fn register_interface_with<F: FrontEnd + Default + 'static>(
        &mut self,
        active: bool,
        visible: bool,
    ) -> bool {
        let decl = InterfaceDecl::of::<F>();
        if decl.collection.is_empty() {
            warn!(interface = %decl.name, "refusing to register interface with an empty collection");
            return false;
        }
        if !active {
            debug!(interface = %decl.name, "skipping inactive interface");
            return false;
        }
        if self.interfaces.iter().any(|r| r.decl.name == decl.name) {
            warn!(interface = %decl.name, "interface already registered, keeping the first");
            return false;
        }
        debug!(interface = %decl.name, "registered interface");
        self.interfaces.push(Registered { decl, visible });
        true
    }

    pub fn get_tool(&self, name: &str) -> Result<&ToolDecl, RegistryError> {
        self.tools
            .iter()
            .find(|r| r.decl.name == name)
            .map(|r| &r.decl)
            .ok_or_else(|| RegistryError::ToolNotFound(name.to_string()))
    }

    pub fn get_interface(&self, name: &str) -> Result<&InterfaceDecl, RegistryError> {
        self.interfaces
            .iter()
            .find(|r| r.decl.name == name)
            .map(|r| &r.decl)
            .ok_or_else(|| RegistryError::InterfaceNotFound(name.to_string()))
    }

    /// Registered tools in registration order, hidden ones included on
    /// request.
    pub fn tools(&self, include_hidden: bool) -> impl Iterator<Item = &ToolDecl> {
        self.tools
            .iter()
            .filter(move |r| include_hidden || r.visible)
            .map(|r| &r.decl)
    }

    pub fn interfaces(&self, include_hidden: bool) -> impl Iterator<Item = &InterfaceDecl> {
        self.interfaces
            .iter()
            .filter(move |r| include_hidden || r.visible)
            .map(|r| &r.decl)
    }

    /// Construct an [`Interface`] around the named front-end, with this
    /// registry attached for name-based tool queueing.
    pub fn make_interface(self: &Rc<Self>, name: &str) -> Result<Interface, RegistryError> {
        let frontend = self.get_interface(name)?.construct();
        Ok(Interface::with_registry(frontend, Rc::clone(self)))
    }

    /// The front-end selected by `PLUGKIT_INTERFACE`, defaulting to
    /// [`INTERFACE_DEFAULT`].
    pub fn default_interface_name() -> String {
        std::env::var("PLUGKIT_INTERFACE").unwrap_or_else(|_| INTERFACE_DEFAULT.to_string())
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("tools", &self.tools.iter().map(|r| &r.decl.name).collect::<Vec<_>>())
            .field(
                "interfaces",
                &self.interfaces.iter().map(|r| &r.decl.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;
    use crate::param::ParamSet;
    use crate::plugin::NullFrontEnd;

    struct First {
        params: ParamSet,
    }

    impl Tool for First {
        fn name() -> String {
            "shared-name".to_string()
        }

        fn help() -> String {
            "the original".to_string()
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

    struct Second {
        params: ParamSet,
    }

    impl Tool for Second {
        fn name() -> String {
            "shared-name".to_string()
        }

        fn help() -> String {
            "the impostor".to_string()
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

    struct Uncollected {
        params: ParamSet,
    }

    impl Tool for Uncollected {
        fn collection() -> String {
            String::new()
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

    #[test]
    fn duplicate_registration_keeps_the_first() {
        let mut registry = PluginRegistry::new();
        assert!(registry.register_tool::<First>());
        assert!(!registry.register_tool::<Second>());
        assert_eq!(registry.get_tool("shared-name").unwrap().help, "the original");
        assert_eq!(registry.tools(true).count(), 1);
    }

    #[test]
    fn empty_collection_is_refused() {
        let mut registry = PluginRegistry::new();
        assert!(!registry.register_tool::<Uncollected>());
        assert!(registry.get_tool("uncollected").is_err());
    }

    #[test]
    fn inactive_registration_is_skipped() {
        let mut registry = PluginRegistry::new();
        assert!(!registry.register_tool_with::<First>(false, true));
        assert!(registry.get_tool("shared-name").is_err());
        // The name stays free for a later active registration.
        assert!(registry.register_tool::<First>());
    }

    #[test]
    fn hidden_tools_are_filtered_from_default_listings() {
        let mut registry = PluginRegistry::new();
        registry.register_tool_with::<First>(true, false);
        assert_eq!(registry.tools(false).count(), 0);
        assert_eq!(registry.tools(true).count(), 1);
        // Hidden tools remain resolvable by name.
        assert!(registry.get_tool("shared-name").is_ok());
    }

    #[test]
    fn unknown_names_error_by_partition() {
        let registry = PluginRegistry::new();
        assert!(matches!(
            registry.get_tool("nope"),
            Err(RegistryError::ToolNotFound(_))
        ));
        assert!(matches!(
            registry.get_interface("nope"),
            Err(RegistryError::InterfaceNotFound(_))
        ));
    }

    #[test]
    fn make_interface_attaches_the_registry() {
        let mut registry = PluginRegistry::new();
        registry.register_tool::<First>();
        registry.register_interface::<NullFrontEnd>();
        let registry = Rc::new(registry);

        let mut interface = registry.make_interface("null").unwrap();
        interface.add_tool_named("shared-name").unwrap();
        assert_eq!(interface.tool_count(), 1);
        assert!(interface.add_tool_named("missing").is_err());
    }

    #[test]
    fn registration_order_is_preserved_in_listings() {
        struct A {
            params: ParamSet,
        }
        struct B {
            params: ParamSet,
        }
        impl Tool for A {
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
        impl Tool for B {
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

        let mut registry = PluginRegistry::new();
        registry.register_tool::<B>();
        registry.register_tool::<A>();
        let names: Vec<&str> = registry.tools(false).map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
    }
}
