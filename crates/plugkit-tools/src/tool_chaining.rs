//! Runtime-decided tool chains.

use plugkit_core::error::ToolError;
use plugkit_core::param::{ParamSet, ParamSpec, Schema};
use plugkit_core::plugin::{Interface, Tool};
use serde_json::{Value, json};

const QUIT_CHOICE: &str = "none (quit)";

const TOOL_CHOICES: [(&str, Option<&str>); 3] = [
    ("data types", Some("datatypes")),
    ("modify choices", Some("modifychoices")),
    (QUIT_CHOICE, None),
];

/// Queues a user-selected next tool and then itself again, passing
/// `persistent_data` along through the interface's shared data bag.
pub struct Chaining {
    params: ParamSet,
}

impl Tool for Chaining {
    fn name() -> String {
        "chaining-example".to_string()
    }

    fn help() -> String {
        "Invoking a dynamic chain of tools".to_string()
    }

    fn collection() -> String {
        "examples".to_string()
    }

    fn schema() -> Schema {
        Schema::new()
            .with(
                ParamSpec::string("next_tool")
                    .description("Choose the next task")
                    .choices(TOOL_CHOICES.map(|(label, _)| label))
                    .default(QUIT_CHOICE),
            )
            .with(
                ParamSpec::string("persistent_data")
                    .description("This value should persist between tools")
                    .default(""),
            )
    }

    fn build(params: ParamSet) -> Self {
        Self { params }
    }

    fn params(&self) -> &ParamSet {
        &self.params
    }

    fn execute(&mut self, run: &mut Interface) -> Result<i32, ToolError> {
        let persistent = self
            .params
            .get("persistent_data")
            .and_then(|p| p.as_str())
            .unwrap_or_default();
        run.tool_data
            .insert("persistent_data".to_string(), json!(persistent));

        let first_run = run
            .tool_data
            .get("first_run")
            .and_then(Value::as_bool)
            .unwrap_or(true);
        if first_run {
            run.message("Any queued tools are initialized with the contents of the shared data bag.");
            run.message("Whatever a tool writes there is visible to every tool queued after it.");
            run.tool_data.insert("first_run".to_string(), json!(false));
        }

        let label = self
            .params
            .get("next_tool")
            .and_then(|p| p.as_str())
            .unwrap_or_else(|| QUIT_CHOICE.to_string());
        let next = TOOL_CHOICES
            .iter()
            .find(|(choice, _)| *choice == label)
            .and_then(|(_, tool)| *tool);
        if let Some(next) = next {
            run.add_tool_named(next)
                .map_err(|err| ToolError::Failed(err.to_string()))?;
            // Return here after the selected tool finishes.
            run.add_tool_named(Self::name().as_str())
                .map_err(|err| ToolError::Failed(err.to_string()))?;
        }
        Ok(0)
    }
}
