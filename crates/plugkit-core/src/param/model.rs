//! The per-instance parameter model.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde_json::Value;

use crate::callback::Callback;
use crate::error::ValidationError;
use crate::param::ValueMap;
use crate::param::validators::Validator;

/// Data types a parameter can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Bool,
    Int,
    Float,
    /// A list of strings.
    List,
}

impl ParamType {
    /// The zero value used when a non-required parameter declares no
    /// default.
    pub fn zero_value(&self) -> Value {
        match self {
            ParamType::String => Value::String(String::new()),
            ParamType::Bool => Value::Bool(false),
            ParamType::Int => Value::from(0),
            ParamType::Float => Value::from(0.0),
            ParamType::List => Value::Array(Vec::new()),
        }
    }

    /// Type name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Bool => "bool",
            ParamType::Int => "int",
            ParamType::Float => "float",
            ParamType::List => "list",
        }
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Explicit post-construction mutation of a parameter.
///
/// Parameters are otherwise only written through `set_value`,
/// `set_choices`, `set_option`, and `set_hidden`.
#[derive(Debug, Clone, Default)]
pub struct ParamUpdate {
    pub default: Option<Value>,
    pub required: Option<bool>,
    pub choices: Option<Vec<String>>,
    /// Merged into the existing options.
    pub options: ValueMap,
    /// Re-validated before being stored.
    pub value: Option<Value>,
    /// Merged into the existing metadata.
    pub metadata: ValueMap,
}

/// A typed, validated, named value owned by a plugin instance.
///
/// Instances are created from a [`ParamSpec`](crate::param::ParamSpec)
/// when a tool is constructed and shared as `Rc<Parameter>` so that
/// change listeners can hold on to sibling parameters. All mutating
/// methods take `&self`; interior mutability keeps the borrow scope of
/// each field write shorter than any callback it triggers.
pub struct Parameter {
    name: String,
    param_type: ParamType,
    description: String,
    default: RefCell<Value>,
    required: Cell<bool>,
    choices: RefCell<Option<Vec<String>>>,
    options: RefCell<ValueMap>,
    metadata: RefCell<ValueMap>,
    hidden: Cell<bool>,
    value: RefCell<Value>,
    validators: Vec<Rc<dyn Validator>>,

    /// Fired by `set_value` with the parameter itself as payload.
    pub on_value_changed: Callback<Parameter>,
    /// Fired by `set_choices`.
    pub on_choices_changed: Callback<Parameter>,
    /// Fired by `set_option`.
    pub on_options_changed: Callback<Parameter>,
    /// Fired by `set_hidden`.
    pub on_visibility_changed: Callback<Parameter>,
}

impl Parameter {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        name: String,
        param_type: ParamType,
        description: String,
        default: Value,
        required: bool,
        choices: Option<Vec<String>>,
        options: ValueMap,
        metadata: ValueMap,
        hidden: bool,
        value: Value,
        validators: Vec<Rc<dyn Validator>>,
    ) -> Rc<Self> {
        Rc::new(Self {
            name,
            param_type,
            description,
            default: RefCell::new(default),
            required: Cell::new(required),
            choices: RefCell::new(choices),
            options: RefCell::new(options),
            metadata: RefCell::new(metadata),
            hidden: Cell::new(hidden),
            value: RefCell::new(value),
            validators,
            on_value_changed: Callback::new(),
            on_choices_changed: Callback::new(),
            on_options_changed: Callback::new(),
            on_visibility_changed: Callback::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn param_type(&self) -> ParamType {
        self.param_type
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn default(&self) -> Value {
        self.default.borrow().clone()
    }

    pub fn required(&self) -> bool {
        self.required.get()
    }

    /// Pipe `value` through every bound validator in order; each
    /// validator receives the previous one's output.
    pub fn validate(&self, value: Value) -> Result<Value, ValidationError> {
        let mut value = value;
        for validator in &self.validators {
            value = validator.validate(self, value)?;
        }
        Ok(value)
    }

    /// Validators bound to this parameter, in execution order.
    pub fn validators(&self) -> &[Rc<dyn Validator>] {
        &self.validators
    }

    pub fn value(&self) -> Value {
        self.value.borrow().clone()
    }

    /// Store `value` verbatim (no implicit re-validation) and fire the
    /// value-changed notification.
    pub fn set_value(&self, value: Value) {
        *self.value.borrow_mut() = value;
        self.on_value_changed.invoke(self);
    }

    /// Store `value` without firing the change notification. Used for
    /// construction-time initialization.
    pub(crate) fn set_value_silent(&self, value: Value) {
        *self.value.borrow_mut() = value;
    }

    pub fn as_str(&self) -> Option<String> {
        self.value.borrow().as_str().map(str::to_string)
    }

    pub fn as_int(&self) -> Option<i64> {
        self.value.borrow().as_i64()
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.value.borrow().as_bool()
    }

    pub fn as_float(&self) -> Option<f64> {
        self.value.borrow().as_f64()
    }

    pub fn as_list(&self) -> Option<Vec<String>> {
        self.value.borrow().as_array().map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
    }

    pub fn choices(&self) -> Option<Vec<String>> {
        self.choices.borrow().clone()
    }

    /// Replace the choice list and fire the choices-changed
    /// notification.
    ///
    /// For `Int` parameters the default and value are indexes into the
    /// choice list: an index now outside `[0, len)` resets the default
    /// to `0` and the value to the (possibly reset) default. For
    /// `String` parameters a default no longer in the list resets to the
    /// first entry and a value no longer in the list resets to the
    /// default.
    pub fn set_choices(&self, new_choices: Option<Vec<String>>) {
        *self.choices.borrow_mut() = new_choices;
        if let Some(list) = self.choices.borrow().as_ref()
            && !list.is_empty()
        {
            match self.param_type {
                ParamType::String => {
                    let default = self.default.borrow().clone();
                    let member = |v: &Value| {
                        v.as_str().is_some_and(|s| list.iter().any(|c| c == s))
                    };
                    if !default.is_null() && !member(&default) {
                        *self.default.borrow_mut() = Value::String(list[0].clone());
                    }
                    if !member(&self.value.borrow()) {
                        let default = self.default.borrow().clone();
                        *self.value.borrow_mut() = default;
                    }
                }
                ParamType::Int => {
                    let len = list.len() as i64;
                    let default_index = self.default.borrow().as_i64().unwrap_or(-1);
                    if default_index < 0 || default_index >= len {
                        *self.default.borrow_mut() = Value::from(0);
                    }
                    let value_index = self.value.borrow().as_i64().unwrap_or(-1);
                    if value_index < 0 || value_index >= len {
                        let default = self.default.borrow().clone();
                        *self.value.borrow_mut() = default;
                    }
                }
                _ => {}
            }
        }
        self.on_choices_changed.invoke(self);
    }

    pub fn options(&self) -> ValueMap {
        self.options.borrow().clone()
    }

    /// Look up a single option, falling back to `fallback` when unset.
    pub fn option(&self, key: &str, fallback: Value) -> Value {
        self.options.borrow().get(key).cloned().unwrap_or(fallback)
    }

    /// Set a single option and fire the options-changed notification.
    pub fn set_option(&self, key: &str, value: Value) {
        self.options.borrow_mut().insert(key.to_string(), value);
        self.on_options_changed.invoke(self);
    }

    pub fn metadata(&self) -> ValueMap {
        self.metadata.borrow().clone()
    }

    pub fn hidden(&self) -> bool {
        self.hidden.get()
    }

    /// A hidden parameter is skipped during interactive prompting and
    /// silently assigned its validated default instead.
    pub fn set_hidden(&self, hidden: bool) {
        self.hidden.set(hidden);
        self.on_visibility_changed.invoke(self);
    }

    /// Apply an explicit update, re-validating the resulting value.
    pub fn update(&self, update: ParamUpdate) -> Result<(), ValidationError> {
        if let Some(default) = update.default {
            *self.default.borrow_mut() = default;
        }
        if let Some(required) = update.required {
            self.required.set(required);
        }
        if let Some(choices) = update.choices {
            *self.choices.borrow_mut() = Some(choices);
        }
        self.options.borrow_mut().extend(update.options);
        self.metadata.borrow_mut().extend(update.metadata);

        let value = update.value.unwrap_or_else(|| self.value());
        let validated = self.validate(value)?;
        *self.value.borrow_mut() = validated;
        Ok(())
    }
}

impl std::fmt::Debug for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parameter")
            .field("name", &self.name)
            .field("param_type", &self.param_type)
            .field("value", &self.value.borrow())
            .field("default", &self.default.borrow())
            .field("required", &self.required.get())
            .field("hidden", &self.hidden.get())
            .finish()
    }
}
