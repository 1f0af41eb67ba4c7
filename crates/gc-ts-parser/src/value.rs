//! Values produced by static evaluation.

use std::fmt::Write as _;

use gc_core::RenderHandle;

/// A JSON-like value reduced from a TypeScript expression, plus opaque
/// handles for callables and JSX that cannot be reduced further.
#[derive(Debug, Clone, PartialEq)]
pub enum StaticValue {
    /// `undefined`, or a missing property.
    Undefined,
    /// `null`.
    Null,
    /// `true` / `false`.
    Bool(bool),
    /// Any numeric literal or arithmetic result.
    Number(f64),
    /// String literals and template strings.
    String(String),
    /// Array literal, in element order.
    Array(Vec<StaticValue>),
    /// Object literal, in key order.
    Object(ObjectValue),
    /// A function or arrow; never invoked unless a supported array method
    /// calls it.
    Function(RenderHandle),
    /// A JSX element or fragment.
    Element(RenderHandle),
}

impl StaticValue {
    /// The `typeof`-style name used in error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Function(_) => "function",
            Self::Element(_) => "JSX element",
        }
    }

    /// Returns `true` for `undefined` and `null`.
    #[must_use]
    pub fn is_nullish(&self) -> bool {
        matches!(self, Self::Undefined | Self::Null)
    }

    /// JavaScript truthiness.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Undefined | Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
            Self::Array(_) | Self::Object(_) | Self::Function(_) | Self::Element(_) => true,
        }
    }

    /// Strict equality (`===`). Arrays, objects and callables compare unequal
    /// since they carry no identity here.
    #[must_use]
    pub fn strict_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            _ => false,
        }
    }

    /// Returns the string slice if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the elements if this is an array.
    #[must_use]
    pub fn as_array(&self) -> Option<&[StaticValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the object if this is an object.
    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectValue> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Reads a property the way member access does.
    ///
    /// Returns `None` for `undefined`/`null` receivers, which is a type error
    /// without optional chaining.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn property(&self, key: &str) -> Option<StaticValue> {
        match self {
            Self::Undefined | Self::Null => None,
            Self::Object(object) => Some(object.get(key).cloned().unwrap_or(Self::Undefined)),
            Self::Array(items) => Some(match key {
                "length" => Self::Number(items.len() as f64),
                _ => key
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| items.get(index).cloned())
                    .unwrap_or(Self::Undefined),
            }),
            Self::String(s) => Some(match key {
                "length" => Self::Number(s.encode_utf16().count() as f64),
                _ => Self::Undefined,
            }),
            _ => Some(Self::Undefined),
        }
    }

    /// String conversion as performed by `+` and template substitution.
    ///
    /// Returns `None` for callables and JSX.
    #[must_use]
    pub fn to_js_string(&self) -> Option<String> {
        Some(match self {
            Self::Undefined => "undefined".to_owned(),
            Self::Null => "null".to_owned(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => format_number(*n),
            Self::String(s) => s.clone(),
            Self::Array(items) => {
                let mut out = String::new();
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    if !item.is_nullish() {
                        out.push_str(&item.to_js_string()?);
                    }
                }
                out
            }
            Self::Object(_) => "[object Object]".to_owned(),
            Self::Function(_) | Self::Element(_) => return None,
        })
    }

    /// Numeric conversion for arithmetic and comparison operators.
    #[must_use]
    pub fn to_number(&self) -> f64 {
        match self {
            Self::Null => 0.0,
            Self::Bool(b) => f64::from(u8::from(*b)),
            Self::Number(n) => *n,
            Self::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse().unwrap_or(f64::NAN)
                }
            }
            _ => f64::NAN,
        }
    }
}

/// Formats a number the way JavaScript prints it for integral and common
/// fractional values.
#[must_use]
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_owned();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }
    if n.fract() == 0.0 && n.abs() < 1e21 {
        #[allow(clippy::cast_possible_truncation)]
        let int = n as i128;
        return int.to_string();
    }
    let mut out = String::new();
    let _ = write!(out, "{n}");
    out
}

/// An object literal with insertion-ordered keys.
///
/// Re-assigning a key keeps its original position, matching JavaScript
/// property order for string keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectValue {
    entries: Vec<(String, StaticValue)>,
}

impl ObjectValue {
    /// Creates an empty object.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, replacing an existing value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: StaticValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Looks up a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&StaticValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns `true` if the key is present (even when `undefined`).
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StaticValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copies every entry of `other` into `self` (object spread).
    pub fn extend_from(&mut self, other: &ObjectValue) {
        for (key, value) in &other.entries {
            self.insert(key.clone(), value.clone());
        }
    }
}

impl FromIterator<(String, StaticValue)> for ObjectValue {
    fn from_iter<I: IntoIterator<Item = (String, StaticValue)>>(iter: I) -> Self {
        let mut object = Self::new();
        for (key, value) in iter {
            object.insert(key, value);
        }
        object
    }
}
