//! The canonical first tool: echo three arguments.

use plugkit_core::error::ToolError;
use plugkit_core::param::{ParamSet, ParamSpec, Schema};
use plugkit_core::plugin::{Interface, Tool};

pub struct Example {
    params: ParamSet,
}

impl Tool for Example {
    fn name() -> String {
        "example".to_string()
    }

    fn help() -> String {
        "A simple command that will just echo the passed in arguments".to_string()
    }

    fn schema() -> Schema {
        Schema::new()
            .with(ParamSpec::string("arg1").required(true))
            .with(ParamSpec::string("arg2").required(true))
            .with(ParamSpec::string("arg3").required(true))
    }

    fn build(params: ParamSet) -> Self {
        Self { params }
    }

    fn params(&self) -> &ParamSet {
        &self.params
    }

    fn execute(&mut self, run: &mut Interface) -> Result<i32, ToolError> {
        for param in self.params.iter() {
            run.message(&param.as_str().unwrap_or_default());
        }
        Ok(0)
    }
}
