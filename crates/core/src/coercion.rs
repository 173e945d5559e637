// Argument Coercer
//
// Converts loosely-typed, often stringified, model-supplied arguments into
// the types a tool declares.
//
// Rules, per value against its declared type:
// - null passes through regardless of the declared type
// - enums only accept one of their alternatives
// - unions try each non-null branch in declaration order; the first branch
//   that succeeds wins, later branches are never consulted
// - arrays given as text are parsed as JSON, falling back to a comma split
// - objects given as text must parse as a JSON object
// - custom types delegate to their own constructor
//
// Arguments the tool does not declare are passed through untouched.

use serde_json::{Map, Number, Value};
use thiserror::Error;

use crate::tool_types::{ParamType, ToolDescriptor};

/// Vocabulary accepted as `true` when a boolean arrives as text
const TRUTHY: [&str; 4] = ["true", "1", "yes", "on"];

/// A value that could not be converted to its declared type
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot convert parameter '{parameter}' value {value} to {target}: {reason}")]
pub struct CoercionError {
    pub parameter: String,
    pub value: Value,
    pub target: String,
    pub reason: String,
}

/// Coerce every declared argument of `tool` in `raw_args`
pub fn coerce_arguments(
    tool: &ToolDescriptor,
    raw_args: &Map<String, Value>,
) -> Result<Map<String, Value>, CoercionError> {
    let mut coerced = Map::new();

    for (name, value) in raw_args {
        let value = match tool.parameter(name) {
            Some(param) => coerce_value(name, value, &param.param_type)?,
            None => value.clone(),
        };
        coerced.insert(name.clone(), value);
    }

    Ok(coerced)
}

/// Coerce one value against a declared type
pub fn coerce_value(
    parameter: &str,
    value: &Value,
    target: &ParamType,
) -> Result<Value, CoercionError> {
    if value.is_null() {
        return Ok(Value::Null);
    }

    let fail = |reason: String| CoercionError {
        parameter: parameter.to_string(),
        value: value.clone(),
        target: target.to_string(),
        reason,
    };

    match target {
        ParamType::Enum(alternatives) => {
            let candidate = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            if alternatives.iter().any(|a| *a == candidate) {
                Ok(Value::String(candidate))
            } else {
                Err(fail(format!(
                    "'{}' is not one of [{}]",
                    candidate,
                    alternatives.join(", ")
                )))
            }
        }
        ParamType::Union(branches) => {
            let mut reasons = Vec::new();
            for branch in branches.iter().filter(|b| **b != ParamType::Null) {
                match coerce_value(parameter, value, branch) {
                    Ok(converted) => return Ok(converted),
                    Err(err) => reasons.push(err.reason),
                }
            }
            Err(fail(format!("no union branch matched ({})", reasons.join("; "))))
        }
        ParamType::String => Ok(Value::String(match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })),
        ParamType::Integer => to_integer(value).map_err(fail),
        ParamType::Number => to_number(value).map_err(fail),
        ParamType::Boolean => Ok(Value::Bool(to_boolean(value))),
        ParamType::Array => match value {
            Value::Array(_) => Ok(value.clone()),
            Value::String(text) => Ok(parse_sequence(text)),
            other => Err(fail(format!("{} is not a sequence", json_kind(other)))),
        },
        ParamType::Object => match value {
            Value::Object(_) => Ok(value.clone()),
            Value::String(text) => match serde_json::from_str::<Value>(text) {
                Ok(parsed @ Value::Object(_)) => Ok(parsed),
                Ok(other) => Err(fail(format!("parsed {} instead of an object", json_kind(&other)))),
                Err(e) => Err(fail(e.to_string())),
            },
            other => Err(fail(format!("{} is not a mapping", json_kind(other)))),
        },
        ParamType::Null => Err(fail("only null is accepted".to_string())),
        ParamType::Custom(custom) => (custom.construct)(value).map_err(fail),
    }
}

fn to_integer(value: &Value) -> Result<Value, String> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(value.clone()),
        Value::Number(n) => n
            .as_f64()
            .filter(|f| f.is_finite())
            .map(f64::trunc)
            // 2^63 itself is out of range; i64::MIN is exactly representable
            .filter(|t| *t >= i64::MIN as f64 && *t < i64::MAX as f64)
            .map(|t| Value::from(t as i64))
            .ok_or_else(|| format!("{} is out of range for an integer", n)),
        Value::Bool(b) => Ok(Value::from(i64::from(*b))),
        Value::String(text) => text
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|e| format!("invalid literal for integer '{}': {}", text, e)),
        other => Err(format!("{} cannot be converted to an integer", json_kind(other))),
    }
}

fn to_number(value: &Value) -> Result<Value, String> {
    let float = match value {
        Value::Number(n) if n.is_f64() => return Ok(value.clone()),
        Value::Number(n) => n.as_f64().ok_or_else(|| format!("{} is not a number", n))?,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("could not convert string to number '{}': {}", text, e))?,
        other => return Err(format!("{} cannot be converted to a number", json_kind(other))),
    };

    Number::from_f64(float)
        .map(Value::Number)
        .ok_or_else(|| format!("{} is not a finite number", float))
}

fn to_boolean(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(text) => TRUTHY.contains(&text.trim().to_lowercase().as_str()),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
        Value::Null => false,
    }
}

fn parse_sequence(text: &str) -> Value {
    match serde_json::from_str::<Value>(text) {
        Ok(parsed @ Value::Array(_)) => parsed,
        _ => Value::Array(
            text.split(',')
                .map(|item| Value::String(item.trim().to_string()))
                .collect(),
        ),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool_types::{CustomType, ParameterSpec};
    use serde_json::json;

    fn coerce(value: Value, target: ParamType) -> Result<Value, CoercionError> {
        coerce_value("p", &value, &target)
    }

    #[test]
    fn test_null_passes_through() {
        assert_eq!(coerce(Value::Null, ParamType::Integer).unwrap(), Value::Null);
        assert_eq!(
            coerce(Value::Null, ParamType::one_of(["a"])).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_scalars() {
        assert_eq!(coerce(json!(42), ParamType::String).unwrap(), json!("42"));
        assert_eq!(coerce(json!("42"), ParamType::Integer).unwrap(), json!(42));
        assert_eq!(coerce(json!(" 7 "), ParamType::Integer).unwrap(), json!(7));
        assert_eq!(coerce(json!(4.9), ParamType::Integer).unwrap(), json!(4));
        assert_eq!(coerce(json!("2.5"), ParamType::Number).unwrap(), json!(2.5));
        assert_eq!(coerce(json!(3), ParamType::Number).unwrap(), json!(3.0));
    }

    #[test]
    fn test_numeric_cast_failure() {
        let err = coerce(json!("abc"), ParamType::Integer).unwrap_err();
        assert_eq!(err.parameter, "p");
        assert_eq!(err.value, json!("abc"));
        assert_eq!(err.target, "integer");
        assert!(err.reason.contains("invalid literal"));

        assert!(coerce(json!("4.5"), ParamType::Integer).is_err());
        assert!(coerce(json!("x"), ParamType::Number).is_err());
    }

    #[test]
    fn test_float_outside_integer_range() {
        let err = coerce(json!(1e30), ParamType::Integer).unwrap_err();
        assert!(err.reason.contains("out of range"));
        assert!(coerce(json!(-1e30), ParamType::Integer).is_err());
        assert!(coerce(json!(9.223372036854775807e18), ParamType::Integer).is_err());
        assert_eq!(coerce(json!(-2.5), ParamType::Integer).unwrap(), json!(-2));
    }

    #[test]
    fn test_boolean_vocabulary() {
        for truthy in ["true", "TRUE", "1", "yes", "On"] {
            assert_eq!(coerce(json!(truthy), ParamType::Boolean).unwrap(), json!(true));
        }
        for falsy in ["false", "0", "no", "maybe", ""] {
            assert_eq!(coerce(json!(falsy), ParamType::Boolean).unwrap(), json!(false));
        }
        assert_eq!(coerce(json!(0), ParamType::Boolean).unwrap(), json!(false));
        assert_eq!(coerce(json!(2), ParamType::Boolean).unwrap(), json!(true));
    }

    #[test]
    fn test_enum_membership() {
        let units = ParamType::one_of(["celsius", "fahrenheit"]);
        assert_eq!(
            coerce(json!("celsius"), units.clone()).unwrap(),
            json!("celsius")
        );
        let err = coerce(json!("kelvin"), units).unwrap_err();
        assert!(err.reason.contains("not one of"));
    }

    #[test]
    fn test_union_first_branch_wins() {
        let int_first = ParamType::Union(vec![ParamType::Integer, ParamType::String]);
        assert_eq!(coerce(json!("5"), int_first).unwrap(), json!(5));

        let str_first = ParamType::Union(vec![ParamType::String, ParamType::Integer]);
        assert_eq!(coerce(json!("5"), str_first).unwrap(), json!("5"));

        let falls_through = ParamType::Union(vec![ParamType::Integer, ParamType::String]);
        assert_eq!(coerce(json!("five"), falls_through).unwrap(), json!("five"));
    }

    #[test]
    fn test_union_rejects_values_outside_enum_in_any_order() {
        let enum_type = ParamType::one_of(["a", "b"]);
        for branches in [
            vec![enum_type.clone(), ParamType::Null],
            vec![ParamType::Null, enum_type.clone()],
        ] {
            assert!(coerce(json!("c"), ParamType::Union(branches)).is_err());
        }
    }

    #[test]
    fn test_optional_union() {
        let optional = ParamType::optional(ParamType::Integer);
        assert_eq!(coerce(json!("3"), optional.clone()).unwrap(), json!(3));
        assert_eq!(coerce(Value::Null, optional).unwrap(), Value::Null);
    }

    #[test]
    fn test_sequences() {
        assert_eq!(
            coerce(json!("[1, 2]"), ParamType::Array).unwrap(),
            json!([1, 2])
        );
        assert_eq!(
            coerce(json!("alice, bob ,carol"), ParamType::Array).unwrap(),
            json!(["alice", "bob", "carol"])
        );
        assert_eq!(
            coerce(json!(["x"]), ParamType::Array).unwrap(),
            json!(["x"])
        );
        assert!(coerce(json!(5), ParamType::Array).is_err());
    }

    #[test]
    fn test_mappings() {
        assert_eq!(
            coerce(json!(r#"{"k": 1}"#), ParamType::Object).unwrap(),
            json!({"k": 1})
        );
        assert!(coerce(json!("k=1"), ParamType::Object).is_err());
        assert!(coerce(json!("[1]"), ParamType::Object).is_err());
    }

    #[test]
    fn test_custom_type() {
        let date = ParamType::Custom(CustomType::date());
        assert_eq!(
            coerce(json!("2024-01-31"), date.clone()).unwrap(),
            json!("2024-01-31")
        );
        let err = coerce(json!("tomorrow"), date).unwrap_err();
        assert_eq!(err.target, "date");
    }

    #[test]
    fn test_idempotent_on_matching_values() {
        let cases = [
            (json!("text"), ParamType::String),
            (json!(12), ParamType::Integer),
            (json!(1.5), ParamType::Number),
            (json!(true), ParamType::Boolean),
            (json!("a"), ParamType::one_of(["a", "b"])),
            (json!([1, "two"]), ParamType::Array),
            (json!({"nested": [1]}), ParamType::Object),
        ];
        for (value, target) in cases {
            assert_eq!(coerce(value.clone(), target).unwrap(), value);
        }
    }

    #[test]
    fn test_undeclared_arguments_pass_through() {
        let tool = ToolDescriptor::new(
            "t",
            "",
            vec![ParameterSpec::new("count", ParamType::Integer)],
        );
        let raw = json!({"count": "3", "extra": "kept"});
        let coerced = coerce_arguments(&tool, raw.as_object().unwrap()).unwrap();

        assert_eq!(Value::Object(coerced), json!({"count": 3, "extra": "kept"}));
    }
}
