//! Parameter descriptors.
//!
//! A [`ParamSpec`] is the declarative side of a parameter: a tool's
//! schema is a list of specs, and each spec knows how to realize itself
//! into a live [`Parameter`] with the right validator pipeline attached.

use std::rc::Rc;

use serde_json::Value;

use crate::param::ValueMap;
use crate::param::model::{ParamType, Parameter};
use crate::param::validators::{
    ValidateBoolFromString, ValidateChoiceInt, ValidateChoiceList, ValidateChoiceStr,
    ValidateDefault, ValidateDefaultInt, ValidateRange, ValidateRequired, ValidateType,
    ValidateTypeList, Validator,
};

/// Declarative description of a single tool parameter.
///
/// Built with the per-type constructors ([`ParamSpec::string`],
/// [`ParamSpec::int`], ...) and chained setters, then realized with
/// [`ParamSpec::build`]. Specs are cheap to clone; custom validators are
/// shared by reference.
#[derive(Clone)]
pub struct ParamSpec {
    pub name: String,
    pub param_type: ParamType,
    pub description: String,
    pub default: Value,
    /// `None` means "infer": a parameter with no default is required.
    pub required: Option<bool>,
    pub choices: Option<Vec<String>>,
    pub options: ValueMap,
    pub metadata: ValueMap,
    pub hidden: bool,
    /// Single-character flag name for command-line front ends.
    pub short_name: Option<String>,
    /// Initial value; `Null` falls back to the default at build time.
    pub value: Value,
    pub validators: Vec<Rc<dyn Validator>>,
}

impl ParamSpec {
    fn new(name: &str, param_type: ParamType) -> Self {
        Self {
            name: name.to_string(),
            param_type,
            description: String::new(),
            default: Value::Null,
            required: None,
            choices: None,
            options: ValueMap::new(),
            metadata: ValueMap::new(),
            hidden: false,
            short_name: None,
            value: Value::Null,
            validators: Vec::new(),
        }
    }

    pub fn string(name: &str) -> Self {
        Self::new(name, ParamType::String)
    }

    pub fn bool(name: &str) -> Self {
        Self::new(name, ParamType::Bool)
    }

    pub fn int(name: &str) -> Self {
        Self::new(name, ParamType::Int)
    }

    pub fn float(name: &str) -> Self {
        Self::new(name, ParamType::Float)
    }

    pub fn list(name: &str) -> Self {
        Self::new(name, ParamType::List)
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn default(mut self, default: impl Into<Value>) -> Self {
        self.default = default.into();
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }

    pub fn option(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.options.insert(key.to_string(), value.into());
        self
    }

    /// Lower bound for numeric parameters (stored as the `min` option).
    pub fn minimum(self, minimum: impl Into<Value>) -> Self {
        self.option("min", minimum)
    }

    /// Upper bound for numeric parameters (stored as the `max` option).
    pub fn maximum(self, maximum: impl Into<Value>) -> Self {
        self.option("max", maximum)
    }

    pub fn metadata(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn short_name(mut self, short_name: &str) -> Self {
        self.short_name = Some(short_name.to_string());
        self
    }

    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    /// Append a custom validator. Custom validators run after the
    /// built-in pipeline for the parameter's type.
    pub fn validator(mut self, validator: Rc<dyn Validator>) -> Self {
        self.validators.push(validator);
        self
    }

    /// Whether the realized parameter will be required. Explicit
    /// `required(..)` wins; otherwise a parameter with no default is
    /// required.
    pub fn is_required(&self) -> bool {
        self.required.unwrap_or_else(|| self.default.is_null())
    }

    fn range_bounds(&self) -> (Option<f64>, Option<f64>) {
        let bound = |key: &str| self.options.get(key).and_then(Value::as_f64);
        (bound("min"), bound("max"))
    }

    /// The built-in validator pipeline for this spec, with
    /// [`ValidateRequired`] prepended when required and custom
    /// validators appended.
    fn pipeline(&self) -> Vec<Rc<dyn Validator>> {
        let mut pipeline: Vec<Rc<dyn Validator>> = Vec::new();
        if self.is_required() {
            pipeline.push(Rc::new(ValidateRequired));
        }
        match self.param_type {
            ParamType::String => {
                pipeline.push(Rc::new(ValidateDefault));
                pipeline.push(Rc::new(ValidateType));
                pipeline.push(Rc::new(ValidateChoiceStr));
            }
            ParamType::Bool => {
                pipeline.push(Rc::new(ValidateBoolFromString));
                pipeline.push(Rc::new(ValidateDefault));
                pipeline.push(Rc::new(ValidateType));
            }
            ParamType::Int => {
                let (minimum, maximum) = self.range_bounds();
                pipeline.push(Rc::new(ValidateDefaultInt));
                pipeline.push(Rc::new(ValidateChoiceInt));
                pipeline.push(Rc::new(ValidateRange::new(minimum, maximum)));
            }
            ParamType::Float => {
                let (minimum, maximum) = self.range_bounds();
                pipeline.push(Rc::new(ValidateDefault));
                pipeline.push(Rc::new(ValidateType));
                pipeline.push(Rc::new(ValidateRange::new(minimum, maximum)));
            }
            ParamType::List => {
                pipeline.push(Rc::new(ValidateDefault));
                pipeline.push(Rc::new(ValidateTypeList));
                pipeline.push(Rc::new(ValidateChoiceList));
            }
        }
        pipeline.extend(self.validators.iter().cloned());
        pipeline
    }

    /// Realize the spec into a live [`Parameter`].
    ///
    /// A non-required spec with no declared default gets the type's zero
    /// value as its default. The initial value falls back to the default
    /// when the spec declares none; neither triggers change
    /// notifications.
    pub fn build(&self) -> Rc<Parameter> {
        let required = self.is_required();
        let mut default = self.default.clone();
        if !required && default.is_null() {
            default = self.param_type.zero_value();
        }
        let value = if self.value.is_null() {
            default.clone()
        } else {
            self.value.clone()
        };
        Parameter::new(
            self.name.clone(),
            self.param_type,
            self.description.clone(),
            default,
            required,
            self.choices.clone(),
            self.options.clone(),
            self.metadata.clone(),
            self.hidden,
            value,
            self.pipeline(),
        )
    }
}

impl std::fmt::Debug for ParamSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParamSpec")
            .field("name", &self.name)
            .field("param_type", &self.param_type)
            .field("default", &self.default)
            .field("required", &self.required)
            .field("choices", &self.choices)
            .field("hidden", &self.hidden)
            .finish()
    }
}
