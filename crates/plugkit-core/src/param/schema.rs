//! Parameter schemas and realized parameter sets.

use std::rc::Rc;

use serde_json::Value;
use tracing::debug;

use crate::error::ValidationError;
use crate::param::ValueMap;
use crate::param::model::Parameter;
use crate::param::spec::ParamSpec;

/// An ordered, name-keyed collection of [`ParamSpec`]s.
///
/// Declaration order is preserved; re-declaring a name replaces the
/// existing spec in place, so a derived schema can override an inherited
/// parameter without changing its position.
#[derive(Clone, Debug, Default)]
pub struct Schema {
    specs: Vec<ParamSpec>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a spec, or replace an existing spec with the same name
    /// while keeping its first-seen position.
    pub fn push(&mut self, spec: ParamSpec) {
        match self.specs.iter_mut().find(|s| s.name == spec.name) {
            Some(existing) => *existing = spec,
            None => self.specs.push(spec),
        }
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(mut self, spec: ParamSpec) -> Self {
        self.push(spec);
        self
    }

    /// Fold another schema's specs into this one, `push` semantics per
    /// spec. This is how a tool layers its own parameters over a shared
    /// base schema.
    pub fn merge(&mut self, other: Schema) {
        for spec in other.specs {
            self.push(spec);
        }
    }

    pub fn get(&self, name: &str) -> Option<&ParamSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParamSpec> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Realize every spec into a live parameter, seeding values from
    /// `args`.
    ///
    /// Supplied arguments are validated strictly: a value that fails its
    /// parameter's pipeline aborts instantiation. Parameters *not* in
    /// `args` are validated leniently from their default so that a tool
    /// with unsatisfied required parameters can still be constructed
    /// (and interactively prompted later); those failures are logged and
    /// the parameter keeps its built-in default.
    pub fn instantiate(&self, args: &ValueMap) -> Result<ParamSet, ValidationError> {
        let mut params = Vec::with_capacity(self.specs.len());
        for spec in &self.specs {
            let param = spec.build();
            match args.get(&spec.name) {
                Some(supplied) => {
                    let validated = param.validate(supplied.clone())?;
                    param.set_value_silent(validated);
                }
                None => match param.validate(param.value()) {
                    Ok(validated) => param.set_value_silent(validated),
                    Err(err) => {
                        debug!(param = %spec.name, %err, "deferring default validation failure");
                    }
                },
            }
            params.push(param);
        }
        Ok(ParamSet { params })
    }
}

impl FromIterator<ParamSpec> for Schema {
    fn from_iter<I: IntoIterator<Item = ParamSpec>>(iter: I) -> Self {
        let mut schema = Schema::new();
        for spec in iter {
            schema.push(spec);
        }
        schema
    }
}

/// The live parameters of a constructed tool, in declaration order.
#[derive(Debug, Default)]
pub struct ParamSet {
    params: Vec<Rc<Parameter>>,
}

impl ParamSet {
    pub fn get(&self, name: &str) -> Option<&Rc<Parameter>> {
        self.params.iter().find(|p| p.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<Parameter>> {
        self.params.iter()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Snapshot every parameter's current value, keyed by name.
    pub fn values(&self) -> ValueMap {
        self.params
            .iter()
            .map(|p| (p.name().to_string(), p.value()))
            .collect()
    }

    /// Strictly re-validate every parameter's current value, storing the
    /// coerced results. The first failure aborts and is returned.
    pub fn validate_all(&self) -> Result<(), ValidationError> {
        for param in &self.params {
            let validated = param.validate(param.value())?;
            param.set_value_silent(validated);
        }
        Ok(())
    }
}
