//! Conversion between the externally bound value and selected items.
//!
//! Going out, every selected item is passed through the model mapper. Coming
//! in, each external value is matched against the current selection first (so
//! the same item instance is kept) and then against the unfiltered source.

use crate::error::{Error, Result};
use crate::expr::RepeatExpr;
use crate::registry::resolve_source;
use crate::select::Selected;
use serde_json::Value;

/// Equality the way loosely typed hosts compare model values: structural
/// equality, plus numbers equal to their decimal string form.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    if a == b {
        return true;
    }
    match (a, b) {
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            match (n.as_f64(), s.trim().parse::<f64>()) {
                (Some(x), Ok(y)) => x == y,
                _ => false,
            }
        }
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => false,
    }
}

/// External value for the current selection.
pub fn to_model(repeat: &RepeatExpr, scope: &Value, selected: &Selected) -> Value {
    match selected {
        Selected::Multiple(items) => {
            Value::Array(items.iter().map(|it| repeat.map(scope, it)).collect())
        }
        Selected::Single(Some(item)) => repeat.map(scope, item),
        Selected::Single(None) => Value::Null,
    }
}

// last item in `list` whose mapped value matches `value`
fn find_mapped<'a>(
    repeat: &RepeatExpr,
    scope: &Value,
    list: &'a [Value],
    value: &Value,
) -> Option<&'a Value> {
    list.iter()
        .rev()
        .find(|it| loose_eq(&repeat.map(scope, it), value))
}

/// Items for an incoming external value.
pub fn from_model(
    repeat: &RepeatExpr,
    scope: &Value,
    current: &Selected,
    value: &Value,
) -> Result<Selected> {
    let source = resolve_source(repeat.source_value(scope, ""))?;
    match current {
        Selected::Multiple(selected) => {
            let wanted = match value {
                Value::Null => return Ok(Selected::Multiple(Vec::new())),
                Value::Array(values) => values,
                other => return Err(Error::type_mismatch(other)),
            };
            let items = wanted
                .iter()
                .filter_map(|v| {
                    find_mapped(repeat, scope, selected, v)
                        .or_else(|| find_mapped(repeat, scope, &source, v))
                        .cloned()
                })
                .collect();
            Ok(Selected::Multiple(items))
        }
        Selected::Single(selected) => {
            if value.is_null() {
                return Ok(Selected::Single(None));
            }
            if let Some(item) = selected
                .as_ref()
                .filter(|it| loose_eq(&repeat.map(scope, it), value))
            {
                return Ok(Selected::Single(Some(item.clone())));
            }
            let item = find_mapped(repeat, scope, &source, value).unwrap_or(value);
            Ok(Selected::Single(Some(item.clone())))
        }
    }
}
