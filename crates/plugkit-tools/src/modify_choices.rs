//! Dynamic choice mutation through parameter change listeners.

use std::rc::Rc;

use plugkit_core::error::ToolError;
use plugkit_core::param::{ParamSet, ParamSpec, Parameter, Schema};
use plugkit_core::plugin::{Interface, Tool};

const ITEM_MAP: [(&str, [&str; 3]); 3] = [
    ("first", ["apple", "banana", "cantaloupe"]),
    ("second", ["red", "green", "blue"]),
    ("third", ["alpha", "beta", "gamma"]),
];

/// Picking a category in `integer_choice` rewrites the choice list of
/// `string_choice`. The wiring lives in [`Tool::build`], which is where
/// a tool gets its hands on the realized parameters.
pub struct ModifyChoices {
    params: ParamSet,
    // Subscription handle; dropping it would detach the listener.
    _on_category_changed: Rc<dyn Fn(&Parameter)>,
}

impl Tool for ModifyChoices {
    fn help() -> String {
        "An example of using callbacks to dynamically modify a parameter's choices".to_string()
    }

    fn collection() -> String {
        "examples".to_string()
    }

    fn schema() -> Schema {
        Schema::new()
            .with(
                ParamSpec::int("integer_choice")
                    .description("Choose an item")
                    .choices(ITEM_MAP.map(|(key, _)| key))
                    .default(0),
            )
            .with(
                ParamSpec::string("string_choice")
                    .description("Choose an item")
                    .choices(ITEM_MAP[0].1)
                    .default(ITEM_MAP[0].1[0]),
            )
    }

    fn build(params: ParamSet) -> Self {
        let target = params.get("string_choice").cloned();
        let listener: Rc<dyn Fn(&Parameter)> = Rc::new(move |source: &Parameter| {
            let Some(target) = &target else { return };
            let Some(categories) = source.choices() else { return };
            let selected = source
                .as_int()
                .and_then(|index| usize::try_from(index).ok())
                .and_then(|index| categories.get(index));
            let Some(selected) = selected else { return };
            if let Some((_, items)) = ITEM_MAP.iter().find(|(key, _)| key == selected) {
                target.set_choices(Some(items.iter().map(|s| s.to_string()).collect()));
            }
        });
        if let Some(source) = params.get("integer_choice") {
            source.on_value_changed.add(&listener);
        }
        Self {
            params,
            _on_category_changed: listener,
        }
    }

    fn params(&self) -> &ParamSet {
        &self.params
    }

    fn execute(&mut self, run: &mut Interface) -> Result<i32, ToolError> {
        let chosen = self
            .params
            .get("string_choice")
            .and_then(|p| p.as_str())
            .unwrap_or_default();
        run.message(&format!("You chose {chosen}"));
        Ok(0)
    }
}
