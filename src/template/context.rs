//! Values and lookup contexts handed to the renderer

use std::collections::BTreeMap;

use serde::Serialize;

/// A single value a template can reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Str(String),
    /// Iterated by sections, one pass per item
    List(Vec<Context>),
}

impl Value {
    /// Whether a section over this value renders its body
    ///
    /// Empty strings, zero, `false` and empty lists are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Int(n) => *n != 0,
            Self::Str(s) => !s.is_empty(),
            Self::List(items) => !items.is_empty(),
        }
    }

    /// Text substituted for a `{{variable}}` tag
    pub fn render(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Int(n) => n.to_string(),
            Self::Str(s) => s.clone(),
            Self::List(_) => String::new(),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<Vec<Context>> for Value {
    fn from(v: Vec<Context>) -> Self {
        Self::List(v)
    }
}

/// Named values available to a template
///
/// Keys are kept sorted so serialised contexts are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Context {
    values: BTreeMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Insert a value only when present; `None` leaves the key missing
    pub fn insert_opt<V: Into<Value>>(&mut self, key: impl Into<String>, value: Option<V>) {
        if let Some(v) = value {
            self.insert(key, v);
        }
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Truthiness of a key; missing keys are falsy
    pub fn is_truthy(&self, key: &str) -> bool {
        self.get(key).is_some_and(Value::is_truthy)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(Value::Bool(true).is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Int(1812).is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(Value::from("10.0.0.1").is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(!Value::List(vec![]).is_truthy());
        assert!(Value::List(vec![Context::new()]).is_truthy());
    }

    #[test]
    fn test_missing_key_is_falsy() {
        let ctx = Context::new().with("coa", true);
        assert!(ctx.is_truthy("coa"));
        assert!(!ctx.is_truthy("radsec"));
    }

    #[test]
    fn test_insert_opt_skips_none() {
        let mut ctx = Context::new();
        ctx.insert_opt("voice_vlan", None::<u16>);
        ctx.insert_opt("data_vlan", Some(10u16));
        assert!(ctx.get("voice_vlan").is_none());
        assert_eq!(ctx.get("data_vlan"), Some(&Value::Int(10)));
    }
}
