//! Built-in tools for plugkit.
//!
//! Small, self-contained tools that double as working examples of the
//! framework's features: parameter data types, dynamic choice mutation,
//! and runtime tool chaining.

pub mod data_types;
pub mod example;
pub mod modify_choices;
pub mod tool_chaining;

pub use data_types::DataTypes;
pub use example::Example;
pub use modify_choices::ModifyChoices;
pub use tool_chaining::Chaining;

use plugkit_core::PluginRegistry;

/// Register every built-in tool.
pub fn register_builtin_tools(registry: &mut PluginRegistry) {
    registry.register_tool::<Example>();
    registry.register_tool::<DataTypes>();
    registry.register_tool::<ModifyChoices>();
    registry.register_tool::<Chaining>();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_register_under_their_names() {
        let mut registry = PluginRegistry::new();
        register_builtin_tools(&mut registry);

        for name in ["example", "datatypes", "modifychoices", "chaining-example"] {
            assert!(registry.get_tool(name).is_ok(), "missing builtin {name}");
        }
        assert_eq!(registry.tools(false).count(), 4);
    }
}
