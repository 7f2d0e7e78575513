//! A tour of the parameter data types.

use plugkit_core::error::ToolError;
use plugkit_core::param::{ParamSet, ParamSpec, Schema};
use plugkit_core::plugin::{Interface, Tool};
use serde_json::Value;

pub struct DataTypes {
    params: ParamSet,
}

impl Tool for DataTypes {
    fn help() -> String {
        "An example of the various parameter data types".to_string()
    }

    fn collection() -> String {
        "examples".to_string()
    }

    fn schema() -> Schema {
        Schema::new()
            .with(
                ParamSpec::int("integer_choice")
                    .description("Choose an item")
                    .choices(["apple", "banana", "cantaloupe"])
                    .default(0),
            )
            .with(
                ParamSpec::int("integer_range")
                    .description("A number between 1 and 20, inclusive")
                    .minimum(1)
                    .maximum(20)
                    .default(1),
            )
            .with(
                ParamSpec::int("hidden_parameter")
                    .description("Any integer")
                    .hidden(true)
                    .default(7),
            )
            .with(ParamSpec::bool("boolean_check").description("Toggle me").default(false))
            .with(ParamSpec::string("string_field").description("Enter any text").default(""))
            .with(
                ParamSpec::string("string_choice")
                    .description("Choose an item")
                    .choices(["red", "green", "blue"])
                    .default("red"),
            )
            .with(
                ParamSpec::list("list_choice")
                    .description("Choose multiple items")
                    .choices(["first", "second", "third", "fourth"])
                    .default(Value::Array(Vec::new())),
            )
    }

    fn build(params: ParamSet) -> Self {
        Self { params }
    }

    fn params(&self) -> &ParamSet {
        &self.params
    }

    fn execute(&mut self, run: &mut Interface) -> Result<i32, ToolError> {
        run.progress_start();
        for i in 1..=100 {
            run.progress_update(&format!("Working {i}%"), f64::from(i) / 100.0);
        }
        run.progress_end();

        let snapshot = serde_json::to_string_pretty(&Value::Object(self.param_dict()))
            .map_err(|err| ToolError::Failed(err.to_string()))?;
        run.message(&snapshot);
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plugkit_core::ToolData;
    use plugkit_core::plugin::{FrontEndEvent, RecordingFrontEnd, ToolDecl};
    use serde_json::json;

    #[test]
    fn runs_with_defaults_and_reports_every_parameter() {
        let frontend = RecordingFrontEnd::new(true);
        let log = frontend.log();
        let mut interface = Interface::new(Box::new(frontend));
        interface.add_tool(ToolDecl::of::<DataTypes>());

        assert_eq!(interface.run(), 0);

        let log = log.borrow();
        assert_eq!(log.first(), Some(&FrontEndEvent::ProgressStart));
        assert!(log.contains(&FrontEndEvent::ProgressEnd));
        let Some(FrontEndEvent::Message(snapshot)) = log.last() else {
            panic!("expected a final message, got {:?}", log.last());
        };
        for name in [
            "integer_choice",
            "integer_range",
            "hidden_parameter",
            "boolean_check",
            "string_field",
            "string_choice",
            "list_choice",
        ] {
            assert!(snapshot.contains(name), "snapshot missing {name}");
        }
    }

    #[test]
    fn range_parameter_rejects_out_of_bounds_input() {
        let decl = ToolDecl::of::<DataTypes>();
        let mut args = ToolData::new();
        args.insert("integer_range".into(), json!(21));
        assert!(decl.construct(&args).is_err());

        let mut args = ToolData::new();
        args.insert("integer_range".into(), json!(20));
        assert!(decl.construct(&args).is_ok());
    }

    #[test]
    fn integer_choice_accepts_labels() {
        let decl = ToolDecl::of::<DataTypes>();
        let mut args = ToolData::new();
        args.insert("integer_choice".into(), json!("banana"));
        let tool = decl.construct(&args).unwrap();
        assert_eq!(tool.param_dict().get("integer_choice"), Some(&json!(1)));
    }
}
