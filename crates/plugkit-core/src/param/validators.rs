//! The composable validator pipeline.
//!
//! Every validator does some basic sanity checking and returns either
//! the original value or a sensibly massaged version of it. Ordering is
//! significant: later validators receive the output of earlier ones.
//! Validators are stateless per call and have no side effects beyond
//! raising [`ValidationError`].
//!
//! The built-in pipeline per data type (custom validators append after
//! these; [`ValidateRequired`] prepends when the parameter is required):
//!
//! | Type   | Pipeline |
//! |--------|----------|
//! | string | ValidateDefault, ValidateType, ValidateChoiceStr |
//! | bool   | ValidateBoolFromString, ValidateDefault, ValidateType |
//! | int    | ValidateDefaultInt, ValidateChoiceInt, ValidateRange |
//! | float  | ValidateDefault, ValidateType, ValidateRange |
//! | list   | ValidateDefault, ValidateTypeList, ValidateChoiceList |

use serde_json::Value;

use crate::error::ValidationError;
use crate::humanize::humanize_list;
use crate::param::model::{ParamType, Parameter};

/// Strings treated as `true` by [`ValidateBoolFromString`], alongside
/// anything that parses as a number.
pub const TRUTHY_STRINGS: [&str; 3] = ["yes", "y", "true"];

/// One step in a parameter's value-coercion/acceptance pipeline.
pub trait Validator {
    fn validate(&self, param: &Parameter, value: Value) -> Result<Value, ValidationError>;
}

fn wrong_type(value: &Value, expected: &'static str) -> ValidationError {
    ValidationError::WrongType {
        value: value.to_string(),
        expected,
    }
}

fn coerce_int(value: Value) -> Result<Value, ValidationError> {
    match &value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::from(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Value::from(f as i64))
            } else {
                Err(wrong_type(&value, "int"))
            }
        }
        Value::Bool(b) => Ok(Value::from(*b as i64)),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| wrong_type(&value, "int")),
        _ => Err(wrong_type(&value, "int")),
    }
}

fn coerce_float(value: Value) -> Result<Value, ValidationError> {
    match &value {
        Value::Number(n) => n
            .as_f64()
            .map(Value::from)
            .ok_or_else(|| wrong_type(&value, "float")),
        Value::Bool(b) => Ok(Value::from(*b as i64 as f64)),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::from)
            .map_err(|_| wrong_type(&value, "float")),
        _ => Err(wrong_type(&value, "float")),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Render a numeric bound without a trailing `.0` for whole numbers.
fn format_bound(bound: f64) -> String {
    if bound.fract() == 0.0 {
        format!("{}", bound as i64)
    } else {
        format!("{bound}")
    }
}

fn invalid_choice(choices: &[String]) -> ValidationError {
    ValidationError::InvalidChoice(humanize_list(choices, "or"))
}

/// Errors when a required parameter is still unset (`Null`).
#[derive(Debug, Clone, Copy)]
pub struct ValidateRequired;

impl Validator for ValidateRequired {
    fn validate(&self, param: &Parameter, value: Value) -> Result<Value, ValidationError> {
        if value.is_null() {
            return Err(ValidationError::MissingRequired(param.name().to_string()));
        }
        Ok(value)
    }
}

/// Replaces `Null` with the parameter's default, when one exists.
#[derive(Debug, Clone, Copy)]
pub struct ValidateDefault;

impl Validator for ValidateDefault {
    fn validate(&self, param: &Parameter, value: Value) -> Result<Value, ValidationError> {
        let default = param.default();
        if value.is_null() && !default.is_null() {
            return Ok(default);
        }
        Ok(value)
    }
}

/// Default application for integer parameters.
///
/// With a choice list the default is an index, so `Null` resolves to the
/// *label* at that index; the downstream [`ValidateChoiceInt`] converts
/// it back. Without choices this behaves like [`ValidateDefault`].
#[derive(Debug, Clone, Copy)]
pub struct ValidateDefaultInt;

impl Validator for ValidateDefaultInt {
    fn validate(&self, param: &Parameter, value: Value) -> Result<Value, ValidationError> {
        let default = param.default();
        if value.is_null() && !default.is_null() {
            if let Some(choices) = param.choices() {
                let index = default.as_i64().unwrap_or(0);
                if let Some(label) = usize::try_from(index).ok().and_then(|i| choices.get(i)) {
                    return Ok(Value::String(label.clone()));
                }
            }
            return Ok(default);
        }
        Ok(value)
    }
}

/// Coerces the value to the parameter's declared type.
///
/// Bool coercion uses truthiness (non-empty strings and collections,
/// non-zero numbers); int and float accept numeric strings.
#[derive(Debug, Clone, Copy)]
pub struct ValidateType;

impl Validator for ValidateType {
    fn validate(&self, param: &Parameter, value: Value) -> Result<Value, ValidationError> {
        match param.param_type() {
            ParamType::String => match &value {
                Value::String(_) => Ok(value),
                Value::Number(n) => Ok(Value::String(n.to_string())),
                Value::Bool(b) => Ok(Value::String(b.to_string())),
                _ => Err(wrong_type(&value, "string")),
            },
            ParamType::Bool => Ok(Value::Bool(truthy(&value))),
            ParamType::Int => coerce_int(value),
            ParamType::Float => coerce_float(value),
            ParamType::List => ValidateTypeList.validate(param, value),
        }
    }
}

/// Maps string forms to booleans.
///
/// `yes`, `y`, `true` (case-insensitive) and any numeric-looking string
/// (including `"0"` and `"3.5"`) map to `true`; every other string maps
/// to `false`. Non-string values pass through unchanged for later
/// stages.
#[derive(Debug, Clone, Copy)]
pub struct ValidateBoolFromString;

impl Validator for ValidateBoolFromString {
    fn validate(&self, _param: &Parameter, value: Value) -> Result<Value, ValidationError> {
        if let Value::String(s) = &value {
            let lowered = s.trim().to_lowercase();
            let is_true =
                TRUTHY_STRINGS.contains(&lowered.as_str()) || lowered.parse::<f64>().is_ok();
            return Ok(Value::Bool(is_true));
        }
        Ok(value)
    }
}

/// With choices set, the string value must be a member of the list.
#[derive(Debug, Clone, Copy)]
pub struct ValidateChoiceStr;

impl Validator for ValidateChoiceStr {
    fn validate(&self, param: &Parameter, value: Value) -> Result<Value, ValidationError> {
        if let Some(choices) = param.choices() {
            let is_member = value
                .as_str()
                .is_some_and(|s| choices.iter().any(|c| c == s));
            if !is_member {
                return Err(invalid_choice(&choices));
            }
        }
        Ok(value)
    }
}

/// Choice resolution for integer parameters, ending in int coercion.
///
/// Dual-mode by design: the same parameter may be fed either a
/// human-chosen label (membership-checked, replaced by its zero-based
/// index) or a previously-serialized index (bounds-checked against
/// `[0, len)`). Without choices the value is simply coerced to int.
#[derive(Debug, Clone, Copy)]
pub struct ValidateChoiceInt;

impl Validator for ValidateChoiceInt {
    fn validate(&self, param: &Parameter, value: Value) -> Result<Value, ValidationError> {
        if let Some(choices) = param.choices() {
            if let Value::String(s) = &value {
                return match choices.iter().position(|c| c == s) {
                    Some(index) => Ok(Value::from(index as i64)),
                    None => Err(invalid_choice(&choices)),
                };
            }
            let index = coerce_int(value)?.as_i64().unwrap_or(0);
            if index < 0 || index >= choices.len() as i64 {
                return Err(ValidationError::ChoiceIndexOutOfRange {
                    index,
                    count: choices.len(),
                });
            }
            return Ok(Value::from(index));
        }
        coerce_int(value)
    }
}

/// With choices set, every element of the list must be a member.
#[derive(Debug, Clone, Copy)]
pub struct ValidateChoiceList;

impl Validator for ValidateChoiceList {
    fn validate(&self, param: &Parameter, value: Value) -> Result<Value, ValidationError> {
        if let Some(choices) = param.choices() {
            let member = |s: &str| choices.iter().any(|c| c == s);
            match &value {
                Value::Array(items) => {
                    for item in items {
                        if !item.as_str().is_some_and(member) {
                            return Err(invalid_choice(&choices));
                        }
                    }
                }
                Value::String(s) => {
                    if !member(s) {
                        return Err(invalid_choice(&choices));
                    }
                }
                _ => {}
            }
        }
        Ok(value)
    }
}

/// Coerces to a list of strings; a bare string is split on `;`.
#[derive(Debug, Clone, Copy)]
pub struct ValidateTypeList;

impl Validator for ValidateTypeList {
    fn validate(&self, _param: &Parameter, value: Value) -> Result<Value, ValidationError> {
        match &value {
            Value::Array(items) => {
                let coerced: Vec<Value> = items
                    .iter()
                    .map(|item| match item {
                        Value::String(_) => item.clone(),
                        Value::Number(n) => Value::String(n.to_string()),
                        Value::Bool(b) => Value::String(b.to_string()),
                        other => Value::String(other.to_string()),
                    })
                    .collect();
                Ok(Value::Array(coerced))
            }
            Value::String(s) => Ok(Value::Array(
                s.split(';').map(|part| Value::String(part.to_string())).collect(),
            )),
            _ => Err(wrong_type(&value, "list")),
        }
    }
}

/// Optional numeric bounds, each enforced independently.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateRange {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
}

impl ValidateRange {
    pub fn new(minimum: Option<f64>, maximum: Option<f64>) -> Self {
        Self { minimum, maximum }
    }
}

impl Validator for ValidateRange {
    fn validate(&self, _param: &Parameter, value: Value) -> Result<Value, ValidationError> {
        let number = value.as_f64().ok_or_else(|| wrong_type(&value, "number"))?;
        if let Some(minimum) = self.minimum
            && number < minimum
        {
            return Err(ValidationError::BelowMinimum(format_bound(minimum)));
        }
        if let Some(maximum) = self.maximum
            && number > maximum
        {
            return Err(ValidationError::AboveMaximum(format_bound(maximum)));
        }
        Ok(value)
    }
}

fn existing_path(value: &Value, want_dir: bool) -> Result<Value, ValidationError> {
    let raw = value
        .as_str()
        .ok_or_else(|| wrong_type(value, "path string"))?;
    let absolute = std::path::absolute(raw)
        .map_err(|_| ValidationError::PathNotFound(raw.to_string()))?;
    let exists = if want_dir {
        absolute.is_dir()
    } else {
        absolute.is_file()
    };
    if !exists {
        return Err(ValidationError::PathNotFound(
            absolute.display().to_string(),
        ));
    }
    Ok(Value::String(absolute.display().to_string()))
}

/// Resolves to an absolute path and errors unless it is an existing
/// directory.
#[derive(Debug, Clone, Copy)]
pub struct ValidateFolderExists;

impl Validator for ValidateFolderExists {
    fn validate(&self, _param: &Parameter, value: Value) -> Result<Value, ValidationError> {
        existing_path(&value, true)
    }
}

/// Resolves to an absolute path and errors unless it is an existing
/// file.
#[derive(Debug, Clone, Copy)]
pub struct ValidateFileExists;

impl Validator for ValidateFileExists {
    fn validate(&self, _param: &Parameter, value: Value) -> Result<Value, ValidationError> {
        existing_path(&value, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::ParamSpec;
    use serde_json::json;

    #[test]
    fn validate_required_rejects_null() {
        let param = ParamSpec::int("n").required(true).build();
        assert!(matches!(
            ValidateRequired.validate(&param, Value::Null),
            Err(ValidationError::MissingRequired(name)) if name == "n"
        ));
        assert_eq!(ValidateRequired.validate(&param, json!(5)).unwrap(), json!(5));
    }

    #[test]
    fn validate_default_fills_null_only() {
        let param = ParamSpec::int("n").default(42).build();
        assert_eq!(ValidateDefault.validate(&param, Value::Null).unwrap(), json!(42));
        assert_eq!(ValidateDefault.validate(&param, json!(27)).unwrap(), json!(27));
    }

    #[test]
    fn validate_default_passes_through_without_default() {
        let param = ParamSpec::int("n").required(true).build();
        assert_eq!(
            ValidateDefault.validate(&param, json!("test")).unwrap(),
            json!("test")
        );
    }

    #[test]
    fn validate_default_int_resolves_choice_label() {
        let param = ParamSpec::int("pick").choices(["a", "b", "c"]).default(1).build();
        assert_eq!(
            ValidateDefaultInt.validate(&param, Value::Null).unwrap(),
            json!("b")
        );
    }

    #[test]
    fn validate_default_int_without_choices_uses_default() {
        let param = ParamSpec::int("n").default(42).build();
        assert_eq!(
            ValidateDefaultInt.validate(&param, Value::Null).unwrap(),
            json!(42)
        );
    }

    #[test]
    fn validate_type_int_parses_and_truncates() {
        let param = ParamSpec::int("n").build();
        assert_eq!(ValidateType.validate(&param, json!("1")).unwrap(), json!(1));
        assert_eq!(ValidateType.validate(&param, json!(235.1)).unwrap(), json!(235));
        assert!(ValidateType.validate(&param, json!("invalid")).is_err());
    }

    #[test]
    fn validate_type_bool_uses_truthiness() {
        let param = ParamSpec::bool("b").build();
        for truthy_value in [json!("False"), json!("0"), json!(1), json!([5.5])] {
            assert_eq!(
                ValidateType.validate(&param, truthy_value).unwrap(),
                json!(true)
            );
        }
        for falsy_value in [json!(0), json!(""), json!([]), json!({})] {
            assert_eq!(
                ValidateType.validate(&param, falsy_value).unwrap(),
                json!(false)
            );
        }
    }

    #[test]
    fn validate_bool_from_string_truthy_forms() {
        let param = ParamSpec::bool("b").build();
        for item in ["yes", "y", "true", "TRUE", "0", "1", "3.5"] {
            assert_eq!(
                ValidateBoolFromString.validate(&param, json!(item)).unwrap(),
                json!(true),
                "expected {item:?} to be truthy"
            );
        }
        for item in ["false", "False", "no", "invalid"] {
            assert_eq!(
                ValidateBoolFromString.validate(&param, json!(item)).unwrap(),
                json!(false),
                "expected {item:?} to be falsy"
            );
        }
    }

    #[test]
    fn validate_bool_from_string_passes_non_strings() {
        let param = ParamSpec::bool("b").build();
        for item in [json!(0.0), json!(1), json!(2), json!(3.4), json!(["1"]), json!({"a": 1})] {
            assert_eq!(
                ValidateBoolFromString.validate(&param, item.clone()).unwrap(),
                item
            );
        }
    }

    #[test]
    fn validate_choice_str_checks_membership() {
        let param = ParamSpec::string("pick").choices(["a", "b", "c"]).default("b").build();
        assert_eq!(ValidateChoiceStr.validate(&param, json!("a")).unwrap(), json!("a"));
        let err = ValidateChoiceStr.validate(&param, json!("d")).unwrap_err();
        assert!(err.to_string().contains("must be one of"));
        assert!(err.to_string().contains("a, b, or c"));
    }

    #[test]
    fn validate_choice_int_maps_members_to_indexes() {
        let param = ParamSpec::int("pick").choices(["a", "b", "c"]).default(1).build();
        assert_eq!(ValidateChoiceInt.validate(&param, json!("a")).unwrap(), json!(0));
        assert_eq!(ValidateChoiceInt.validate(&param, json!("c")).unwrap(), json!(2));

        let err = ValidateChoiceInt.validate(&param, json!("d")).unwrap_err();
        assert!(err.to_string().contains("must be one of"));
    }

    #[test]
    fn validate_choice_int_bounds_checks_indexes() {
        let param = ParamSpec::int("pick").choices(["a", "b", "c"]).default(1).build();
        assert_eq!(ValidateChoiceInt.validate(&param, json!(2)).unwrap(), json!(2));
        assert!(ValidateChoiceInt.validate(&param, json!(3)).is_err());
        assert!(ValidateChoiceInt.validate(&param, json!(-1)).is_err());
    }

    #[test]
    fn validate_choice_int_without_choices_coerces() {
        let param = ParamSpec::int("n").build();
        assert_eq!(ValidateChoiceInt.validate(&param, json!("3")).unwrap(), json!(3));
        assert!(ValidateChoiceInt.validate(&param, json!("invalid")).is_err());
    }

    #[test]
    fn validate_choice_list_checks_every_element() {
        let param = ParamSpec::list("pick").choices(["a", "b", "c"]).build();
        assert_eq!(
            ValidateChoiceList.validate(&param, json!(["a", "c"])).unwrap(),
            json!(["a", "c"])
        );
        assert!(ValidateChoiceList.validate(&param, json!(["a", "d"])).is_err());
        assert!(ValidateChoiceList.validate(&param, json!("d")).is_err());
    }

    #[test]
    fn validate_choice_list_without_choices_passes_through() {
        let param = ParamSpec::list("items").build();
        assert_eq!(ValidateChoiceList.validate(&param, json!(55)).unwrap(), json!(55));
    }

    #[test]
    fn validate_type_list_splits_on_semicolons() {
        let param = ParamSpec::list("items").build();
        assert_eq!(
            ValidateTypeList.validate(&param, json!("1;2;3")).unwrap(),
            json!(["1", "2", "3"])
        );
    }

    #[test]
    fn validate_range_enforces_each_bound_independently() {
        let param = ParamSpec::int("n").build();
        let both = ValidateRange::new(Some(1.0), Some(10.0));
        assert!(both.validate(&param, json!(11)).is_err());
        assert!(both.validate(&param, json!(3)).is_ok());

        let min_only = ValidateRange::new(Some(1.0), None);
        assert!(min_only.validate(&param, json!(0)).is_err());
        assert!(min_only.validate(&param, json!(11)).is_ok());

        let max_only = ValidateRange::new(None, Some(10.0));
        assert!(max_only.validate(&param, json!(0)).is_ok());
        assert!(max_only.validate(&param, json!(11)).is_err());
    }

    #[test]
    fn range_errors_render_whole_bounds_without_decimals() {
        let param = ParamSpec::int("n").build();
        let err = ValidateRange::new(Some(1.0), None)
            .validate(&param, json!(0))
            .unwrap_err();
        assert_eq!(err.to_string(), "value must be at least 1");
    }

    #[test]
    fn folder_exists_requires_an_existing_directory() {
        let temp = tempfile::tempdir().unwrap();
        let folder = temp.path().join("folder");
        let param = ParamSpec::string("dir").build();

        let missing = folder.display().to_string();
        assert!(matches!(
            ValidateFolderExists.validate(&param, json!(missing)),
            Err(ValidationError::PathNotFound(_))
        ));

        std::fs::create_dir(&folder).unwrap();
        let resolved = ValidateFolderExists
            .validate(&param, json!(folder.display().to_string()))
            .unwrap();
        assert_eq!(resolved, json!(folder.display().to_string()));
    }

    #[test]
    fn relative_paths_resolve_against_the_current_directory() {
        let param = ParamSpec::string("dir").build();

        // "." is always a directory; the validator must hand back its
        // absolute form.
        let resolved = ValidateFolderExists.validate(&param, json!(".")).unwrap();
        let resolved = resolved.as_str().unwrap();
        assert!(std::path::Path::new(resolved).is_absolute());
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(resolved, cwd.display().to_string());

        let missing = ValidateFileExists
            .validate(&param, json!("no-such-file-here"))
            .unwrap_err();
        // The error reports the resolved absolute path, not the input.
        assert!(matches!(
            &missing,
            ValidationError::PathNotFound(path)
                if std::path::Path::new(path).is_absolute()
        ));
    }

    #[test]
    fn file_exists_requires_a_file() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("file1");
        let param = ParamSpec::string("path").build();

        assert!(
            ValidateFileExists
                .validate(&param, json!(file.display().to_string()))
                .is_err()
        );

        std::fs::write(&file, b"").unwrap();
        let resolved = ValidateFileExists
            .validate(&param, json!(file.display().to_string()))
            .unwrap();
        assert_eq!(resolved, json!(file.display().to_string()));

        // A directory is not a file.
        assert!(
            ValidateFileExists
                .validate(&param, json!(temp.path().display().to_string()))
                .is_err()
        );
    }
}
