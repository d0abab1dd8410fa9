use im::HashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A metadata value attached to a group or an example.
///
/// # Examples
///
/// ```rust
/// use exemplar::value::Value;
/// let n = Value::Number(3.0);
/// assert_eq!(n.type_name(), "Number");
/// let s = Value::from("hello");
/// assert_eq!(s.type_name(), "String");
/// let nil = Value::default();
/// assert!(nil.is_nil());
/// ```
///
/// Values (de)serialize untagged, so a symbol reads back as a plain string.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    Number(f64),
    String(String),
    /// An interned-style name, e.g. `:data` in `demo: :data`.
    Symbol(String),
    List(Vec<Value>),
    Map(HashMap<String, Value>),
}

impl Value {
    /// Builds a symbol value.
    pub fn symbol(name: impl Into<String>) -> Self {
        Value::Symbol(name.into())
    }

    /// Returns the type name of the value as a string.
    ///
    /// ```rust
    /// use exemplar::value::Value;
    /// assert_eq!(Value::Bool(true).type_name(), "Bool");
    /// ```
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "Nil",
            Value::Bool(_) => "Bool",
            Value::Number(_) => "Number",
            Value::String(_) => "String",
            Value::Symbol(_) => "Symbol",
            Value::List(_) => "List",
            Value::Map(_) => "Map",
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Returns the text of a `String` or `Symbol` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    // ------------------------------------------------------------------------
    // Display formatting helpers
    // ------------------------------------------------------------------------

    fn fmt_list(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
        write!(f, "[")?;
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", item)?;
        }
        write!(f, "]")
    }

    fn fmt_map(f: &mut fmt::Formatter<'_>, map: &HashMap<String, Value>) -> fmt::Result {
        // im::HashMap iteration order is unspecified; sort for stable output.
        let mut entries: Vec<_> = map.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        write!(f, "{{")?;
        for (i, (k, v)) in entries.into_iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", k, v)?;
        }
        write!(f, "}}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => {
                if n.fract() == 0.0 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::String(s) => write!(f, "{:?}", s),
            Value::Symbol(s) => write!(f, ":{}", s),
            Value::List(items) => Value::fmt_list(f, items),
            Value::Map(map) => Value::fmt_map(f, map),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Nil, Into::into)
    }
}

#[cfg(test)]
mod value_tests {
    use super::*;

    #[test]
    fn test_display_forms() {
        assert_eq!(Value::Number(2.0).to_string(), "2");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::symbol("data").to_string(), ":data");
        assert_eq!(Value::from("x").to_string(), "\"x\"");
        assert_eq!(
            Value::List(vec![Value::Nil, Value::Bool(true)]).to_string(),
            "[nil, true]"
        );
    }

    #[test]
    fn test_map_display_is_sorted() {
        let mut m = HashMap::new();
        m.insert("b".to_string(), Value::from(2_i64));
        m.insert("a".to_string(), Value::from(1_i64));
        assert_eq!(Value::Map(m).to_string(), "{a: 1, b: 2}");
    }

    #[test]
    fn test_as_str_covers_symbols() {
        assert_eq!(Value::symbol("demo").as_str(), Some("demo"));
        assert_eq!(Value::Nil.as_str(), None);
    }
}
