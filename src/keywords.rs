//! Keyword Evaluators
//!
//! One pure evaluator per supported leaf keyword, dispatched through the
//! ordered [`EVALUATORS`] table. The engine runs every table entry whose
//! keyword is present on the schema node; keywords absent from the table are
//! ignored, so unknown vocabulary never fails validation. New keywords are
//! added as table entries, not as branches in the engine.
//!
//! `required`, `properties`, and `items` are structural and live in the
//! engine, since they emit multiple errors or recurse.

use regex::Regex;
use serde_json::Value;

use crate::error::{Result, SchemaError};
use crate::report::ErrorRecord;

/// Evaluator signature: (value, keyword args, full schema node, path)
///
/// The full node is passed so bound evaluators can see draft-03 style
/// sibling modifiers (`exclusiveMinimum: true`).
pub type EvalFn = fn(&Value, &Value, &Value, &str) -> Result<Option<ErrorRecord>>;

/// Leaf keyword evaluators, in evaluation order
pub const EVALUATORS: &[(&str, EvalFn)] = &[
    ("type", eval_type),
    ("enum", eval_enum),
    ("minimum", eval_minimum),
    ("maximum", eval_maximum),
    ("multipleOf", eval_multiple_of),
    ("divisibleBy", eval_multiple_of),
    ("minLength", eval_min_length),
    ("maxLength", eval_max_length),
    ("pattern", eval_pattern),
];

/// JSON type name of a value, as used in error messages
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Whether a JSON number has no fractional part
///
/// `10` and `10.0` are integers here; `1.2` is not.
fn is_integer(value: &Value) -> bool {
    match value {
        Value::Number(n) => {
            n.is_i64() || n.is_u64() || n.as_f64().map(|f| f.fract() == 0.0).unwrap_or(false)
        }
        _ => false,
    }
}

fn matches_type(value: &Value, type_name: &str) -> bool {
    match type_name {
        "any" => true,
        "null" => value.is_null(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => is_integer(value),
        _ => true,
    }
}

fn eval_type(value: &Value, args: &Value, _node: &Value, path: &str) -> Result<Option<ErrorRecord>> {
    let ok = match args {
        Value::String(t) => matches_type(value, t),
        Value::Array(types) => types
            .iter()
            .filter_map(Value::as_str)
            .any(|t| matches_type(value, t)),
        _ => true,
    };
    if ok {
        return Ok(None);
    }
    let expected = match args {
        Value::String(t) => t.clone(),
        Value::Array(types) => types
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" or "),
        _ => String::new(),
    };
    Ok(Some(ErrorRecord::new(
        path,
        format!("expected {expected}, got {}", json_type_name(value)),
        "type",
    )))
}

fn eval_enum(value: &Value, args: &Value, _node: &Value, path: &str) -> Result<Option<ErrorRecord>> {
    let Some(options) = args.as_array() else {
        return Ok(None);
    };
    if options.contains(value) {
        return Ok(None);
    }
    let listed: Vec<String> = options.iter().map(Value::to_string).collect();
    Ok(Some(ErrorRecord::new(
        path,
        format!("must be one of: {}", listed.join(", ")),
        "enum",
    )))
}

fn eval_minimum(value: &Value, args: &Value, node: &Value, path: &str) -> Result<Option<ErrorRecord>> {
    let (Some(v), Some(min)) = (value.as_f64(), args.as_f64()) else {
        return Ok(None);
    };
    let exclusive = node
        .get("exclusiveMinimum")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let failed = if exclusive { v <= min } else { v < min };
    if !failed {
        return Ok(None);
    }
    let op = if exclusive { ">" } else { ">=" };
    Ok(Some(ErrorRecord::new(
        path,
        format!("must be {op} {min}"),
        "minimum",
    )))
}

fn eval_maximum(value: &Value, args: &Value, node: &Value, path: &str) -> Result<Option<ErrorRecord>> {
    let (Some(v), Some(max)) = (value.as_f64(), args.as_f64()) else {
        return Ok(None);
    };
    let exclusive = node
        .get("exclusiveMaximum")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let failed = if exclusive { v >= max } else { v > max };
    if !failed {
        return Ok(None);
    }
    let op = if exclusive { "<" } else { "<=" };
    Ok(Some(ErrorRecord::new(
        path,
        format!("must be {op} {max}"),
        "maximum",
    )))
}

fn eval_multiple_of(
    value: &Value,
    args: &Value,
    _node: &Value,
    path: &str,
) -> Result<Option<ErrorRecord>> {
    let (Some(v), Some(k)) = (value.as_f64(), args.as_f64()) else {
        return Ok(None);
    };
    if k == 0.0 {
        return Ok(None);
    }
    let quotient = v / k;
    if (quotient - quotient.round()).abs() < 1e-9 {
        return Ok(None);
    }
    Ok(Some(ErrorRecord::new(
        path,
        format!("must be a multiple of {k}"),
        "multipleOf",
    )))
}

fn eval_min_length(
    value: &Value,
    args: &Value,
    _node: &Value,
    path: &str,
) -> Result<Option<ErrorRecord>> {
    let (Some(s), Some(min)) = (value.as_str(), args.as_u64()) else {
        return Ok(None);
    };
    if s.chars().count() as u64 >= min {
        return Ok(None);
    }
    Ok(Some(ErrorRecord::new(
        path,
        format!("must be at least {min} characters long"),
        "minLength",
    )))
}

fn eval_max_length(
    value: &Value,
    args: &Value,
    _node: &Value,
    path: &str,
) -> Result<Option<ErrorRecord>> {
    let (Some(s), Some(max)) = (value.as_str(), args.as_u64()) else {
        return Ok(None);
    };
    if s.chars().count() as u64 <= max {
        return Ok(None);
    }
    Ok(Some(ErrorRecord::new(
        path,
        format!("must be at most {max} characters long"),
        "maxLength",
    )))
}

fn eval_pattern(
    value: &Value,
    args: &Value,
    _node: &Value,
    path: &str,
) -> Result<Option<ErrorRecord>> {
    let (Some(s), Some(pattern)) = (value.as_str(), args.as_str()) else {
        return Ok(None);
    };
    let re = Regex::new(pattern).map_err(|e| SchemaError::InvalidPattern(e.to_string()))?;
    if re.is_match(s) {
        return Ok(None);
    }
    Ok(Some(ErrorRecord::new(
        path,
        format!("does not match pattern {pattern}"),
        "pattern",
    )))
}
