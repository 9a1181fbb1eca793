//! Row mappings and lenient scalar coercion
//!
//! A [`Row`] is one parsed record keyed by normalized column name. Dataset
//! mappers read fields through the coercing accessors, which never fail: a
//! missing or malformed value becomes `""`, `0` or `0.0`.

use std::collections::hash_map;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A scalar cell value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// Text value
    Str(String),
}

impl Value {
    /// Lenient integer view; malformed text is `0`, floats truncate
    pub fn as_int(&self) -> i64 {
        match self {
            Value::Int(i) => *i,
            Value::Float(f) if f.is_finite() => *f as i64,
            Value::Float(_) => 0,
            Value::Str(s) => parse_int(s),
        }
    }

    /// Lenient float view; malformed or non-finite values are `0.0`
    pub fn as_float(&self) -> f64 {
        match self {
            Value::Int(i) => *i as f64,
            Value::Float(f) if f.is_finite() => *f,
            Value::Float(_) => 0.0,
            Value::Str(s) => parse_float(s),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

fn parse_int(text: &str) -> i64 {
    let text = text.trim();
    if let Ok(i) = text.parse::<i64>() {
        return i;
    }
    match text.parse::<f64>() {
        Ok(f) if f.is_finite() => f as i64,
        _ => 0,
    }
}

fn parse_float(text: &str) -> f64 {
    match text.trim().parse::<f64>() {
        Ok(f) if f.is_finite() => f,
        _ => 0.0,
    }
}

/// One parsed record: normalized column name to scalar value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(HashMap<String, Value>);

impl Row {
    /// Empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Raw value for `key`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether `key` is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the row has no fields
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over fields in arbitrary order
    pub fn iter(&self) -> hash_map::Iter<'_, String, Value> {
        self.0.iter()
    }

    /// Trimmed text for `key`, or `""`
    pub fn text(&self, key: &str) -> String {
        self.0
            .get(key)
            .map(|value| value.to_string().trim().to_string())
            .unwrap_or_default()
    }

    /// First non-empty text among `keys`, or `""`
    pub fn first_text(&self, keys: &[&str]) -> String {
        keys.iter()
            .map(|key| self.text(key))
            .find(|text| !text.is_empty())
            .unwrap_or_default()
    }

    /// Upper-cased [`Row::first_text`]
    pub fn upper(&self, keys: &[&str]) -> String {
        self.first_text(keys).to_uppercase()
    }

    /// Integer from the first non-empty of `keys`; `0` when absent or malformed
    pub fn int(&self, keys: &[&str]) -> i64 {
        self.first_value(keys).map(Value::as_int).unwrap_or(0)
    }

    /// Integer narrowed to `i32`; out-of-range values become `0`
    pub fn int32(&self, keys: &[&str]) -> i32 {
        i32::try_from(self.int(keys)).unwrap_or(0)
    }

    /// Float from the first non-empty of `keys`; `0.0` when absent or malformed
    pub fn float(&self, keys: &[&str]) -> f64 {
        self.first_value(keys).map(Value::as_float).unwrap_or(0.0)
    }

    fn first_value(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter().filter_map(|key| self.0.get(*key)).find(|value| match value {
            Value::Str(s) => !s.trim().is_empty(),
            _ => true,
        })
    }
}

impl From<HashMap<String, Value>> for Row {
    fn from(map: HashMap<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Row> for HashMap<String, Value> {
    fn from(row: Row) -> Self {
        row.0
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl IntoIterator for Row {
    type Item = (String, Value);
    type IntoIter = hash_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = (&'a String, &'a Value);
    type IntoIter = hash_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
