//! Built-in methods on arrays, strings and `Object`.
//!
//! These are the reductions gallery data leans on: `.map` over a state
//! table, `.concat` of shared and local entries, `Object.entries` over a
//! keyed map. Anything outside this list is rejected with a type error.

use tree_sitter::Node;

use super::{key_string, type_error, Callback, ModuleEvaluator, Scope};
use crate::error::EvalError;
use crate::value::{ObjectValue, StaticValue};

impl<'t> ModuleEvaluator<'t> {
    pub(super) fn array_method(
        &mut self,
        items: Vec<StaticValue>,
        method: &str,
        args: &[Node<'t>],
        scope: &Scope<'_>,
        call_site: Node<'t>,
    ) -> Result<StaticValue, EvalError> {
        match method {
            "map" | "flatMap" | "filter" | "find" | "some" | "every" => {
                let callback_node = *args
                    .first()
                    .ok_or_else(|| type_error(call_site, format!("`{method}` needs a callback")))?;
                let callback = self.resolve_callback(callback_node, scope)?;
                self.iterate(items, method, callback, scope, call_site)
            }
            "concat" => {
                let mut out = items;
                for value in self.eval_all(args, scope)? {
                    match value {
                        StaticValue::Array(more) => out.extend(more),
                        other => out.push(other),
                    }
                }
                Ok(StaticValue::Array(out))
            }
            "flat" => Ok(StaticValue::Array(
                items
                    .into_iter()
                    .flat_map(|item| match item {
                        StaticValue::Array(inner) => inner,
                        other => vec![other],
                    })
                    .collect(),
            )),
            "slice" => {
                let values = self.eval_all(args, scope)?;
                let len = items.len();
                let start = values.first().map_or(0, |v| relative_index(v, len));
                let end = values.get(1).map_or(len, |v| relative_index(v, len));
                Ok(StaticValue::Array(
                    items.get(start..end.max(start)).unwrap_or_default().to_vec(),
                ))
            }
            "join" => {
                let values = self.eval_all(args, scope)?;
                let separator = match values.first() {
                    None | Some(StaticValue::Undefined) => ",".to_owned(),
                    Some(value) => value.to_js_string().unwrap_or_default(),
                };
                let mut parts = Vec::with_capacity(items.len());
                for item in &items {
                    if item.is_nullish() {
                        parts.push(String::new());
                    } else {
                        parts.push(item.to_js_string().ok_or_else(|| {
                            type_error(call_site, format!("cannot join a {}", item.type_name()))
                        })?);
                    }
                }
                Ok(StaticValue::String(parts.join(&separator)))
            }
            "includes" => {
                let values = self.eval_all(args, scope)?;
                let needle = values.first().cloned().unwrap_or(StaticValue::Undefined);
                Ok(StaticValue::Bool(items.iter().any(|item| item.strict_eq(&needle))))
            }
            _ => Err(type_error(
                call_site,
                format!("array method `{method}` is not supported"),
            )),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn iterate(
        &mut self,
        items: Vec<StaticValue>,
        method: &str,
        callback: Callback<'t>,
        scope: &Scope<'_>,
        call_site: Node<'t>,
    ) -> Result<StaticValue, EvalError> {
        let mut out = Vec::new();
        for (index, item) in items.into_iter().enumerate() {
            let args = vec![item.clone(), StaticValue::Number(index as f64)];
            let result = self.apply(callback, args, scope, call_site)?;
            match method {
                "map" => out.push(result),
                "flatMap" => match result {
                    StaticValue::Array(inner) => out.extend(inner),
                    other => out.push(other),
                },
                "filter" => {
                    if result.is_truthy() {
                        out.push(item);
                    }
                }
                "find" => {
                    if result.is_truthy() {
                        return Ok(item);
                    }
                }
                "some" => {
                    if result.is_truthy() {
                        return Ok(StaticValue::Bool(true));
                    }
                }
                "every" => {
                    if !result.is_truthy() {
                        return Ok(StaticValue::Bool(false));
                    }
                }
                _ => {}
            }
        }
        Ok(match method {
            "find" => StaticValue::Undefined,
            "some" => StaticValue::Bool(false),
            "every" => StaticValue::Bool(true),
            _ => StaticValue::Array(out),
        })
    }

    pub(super) fn string_method(
        &mut self,
        receiver: &str,
        method: &str,
        args: &[Node<'t>],
        scope: &Scope<'_>,
        call_site: Node<'t>,
    ) -> Result<StaticValue, EvalError> {
        let values = self.eval_all(args, scope)?;
        let arg = |i: usize| values.get(i).and_then(StaticValue::as_str).unwrap_or_default();
        Ok(match method {
            "toUpperCase" => StaticValue::String(receiver.to_uppercase()),
            "toLowerCase" => StaticValue::String(receiver.to_lowercase()),
            "trim" => StaticValue::String(receiver.trim().to_owned()),
            "trimStart" => StaticValue::String(receiver.trim_start().to_owned()),
            "trimEnd" => StaticValue::String(receiver.trim_end().to_owned()),
            "startsWith" => StaticValue::Bool(receiver.starts_with(arg(0))),
            "endsWith" => StaticValue::Bool(receiver.ends_with(arg(0))),
            "includes" => StaticValue::Bool(receiver.contains(arg(0))),
            "split" => StaticValue::Array(
                receiver
                    .split(arg(0))
                    .map(|part| StaticValue::String(part.to_owned()))
                    .collect(),
            ),
            _ => {
                return Err(type_error(
                    call_site,
                    format!("string method `{method}` is not supported"),
                ));
            }
        })
    }
}

pub(super) fn object_static(method: &str, args: Vec<StaticValue>, at: Node<'_>) -> Result<StaticValue, EvalError> {
    let mut args = args.into_iter();
    let first = args.next().unwrap_or(StaticValue::Undefined);

    let entries = |value: &StaticValue| -> Result<Vec<(String, StaticValue)>, EvalError> {
        match value {
            StaticValue::Object(object) => Ok(object
                .iter()
                .map(|(key, item)| (key.to_owned(), item.clone()))
                .collect()),
            StaticValue::Array(items) => Ok(items
                .iter()
                .enumerate()
                .map(|(index, item)| (index.to_string(), item.clone()))
                .collect()),
            StaticValue::Undefined | StaticValue::Null => Err(type_error(
                at,
                format!("`Object.{method}` called on {}", value.type_name()),
            )),
            _ => Ok(Vec::new()),
        }
    };

    Ok(match method {
        "entries" => StaticValue::Array(
            entries(&first)?
                .into_iter()
                .map(|(key, item)| StaticValue::Array(vec![StaticValue::String(key), item]))
                .collect(),
        ),
        "keys" => StaticValue::Array(
            entries(&first)?
                .into_iter()
                .map(|(key, _)| StaticValue::String(key))
                .collect(),
        ),
        "values" => StaticValue::Array(entries(&first)?.into_iter().map(|(_, item)| item).collect()),
        "assign" => {
            let mut target: ObjectValue = entries(&first)?.into_iter().collect();
            for source in args {
                if !source.is_nullish() {
                    for (key, item) in entries(&source)? {
                        target.insert(key, item);
                    }
                }
            }
            StaticValue::Object(target)
        }
        "fromEntries" => {
            let Some(pairs) = first.as_array() else {
                return Err(type_error(at, "`Object.fromEntries` needs an array of pairs"));
            };
            let mut object = ObjectValue::new();
            for pair in pairs {
                let key = pair.property("0").unwrap_or(StaticValue::Undefined);
                let item = pair.property("1").unwrap_or(StaticValue::Undefined);
                object.insert(key_string(&key, at)?, item);
            }
            StaticValue::Object(object)
        }
        "freeze" => first,
        _ => {
            return Err(type_error(
                at,
                format!("`Object.{method}` is not supported"),
            ));
        }
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn relative_index(value: &StaticValue, len: usize) -> usize {
    let n = value.to_number();
    if n.is_nan() {
        return 0;
    }
    let n = n.trunc();
    if n < 0.0 {
        (len as f64 + n).max(0.0) as usize
    } else {
        (n as usize).min(len)
    }
}

pub(super) fn loose_eq(left: &StaticValue, right: &StaticValue) -> bool {
    if left.is_nullish() && right.is_nullish() {
        return true;
    }
    match (left, right) {
        (StaticValue::Number(_), StaticValue::String(_))
        | (StaticValue::String(_), StaticValue::Number(_)) => left.to_number() == right.to_number(),
        _ => left.strict_eq(right),
    }
}

pub(super) fn compare(operator: &str, left: &StaticValue, right: &StaticValue) -> bool {
    if let (StaticValue::String(l), StaticValue::String(r)) = (left, right) {
        return match operator {
            "<" => l < r,
            ">" => l > r,
            "<=" => l <= r,
            _ => l >= r,
        };
    }
    let (l, r) = (left.to_number(), right.to_number());
    match operator {
        "<" => l < r,
        ">" => l > r,
        "<=" => l <= r,
        _ => l >= r,
    }
}
