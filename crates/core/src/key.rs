//! Key type for memtab.
//!
//! A `Key` is the immutable value a record is addressed by, either in the primary
//! map or in a secondary index. It is built from one or more column values and owns
//! copies of them, so it never aliases the record it was derived from.

use crate::value::Value;
use core::fmt;

/// An immutable, structurally compared key made of one or more values.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(Box<[Value]>);

impl Key {
    /// Creates a key from its component values.
    pub fn new(parts: Vec<Value>) -> Self {
        Self(parts.into_boxed_slice())
    }

    /// Creates a single-component key.
    pub fn single(value: impl Into<Value>) -> Self {
        Self(Box::new([value.into()]))
    }

    /// Returns the key components.
    #[inline]
    pub fn parts(&self) -> &[Value] {
        &self.0
    }

    /// Returns the number of components.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the key has no components.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if any component is Null.
    ///
    /// Foreign keys with a null component do not reference anything.
    pub fn has_null(&self) -> bool {
        self.0.iter().any(Value::is_null)
    }
}

impl From<Value> for Key {
    fn from(value: Value) -> Self {
        Self(Box::new([value]))
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Self::single(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Self::single(value)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self::single(value)
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self::single(value)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let [only] = self.parts() {
            return write!(f, "{}", only);
        }
        f.write_str("(")?;
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", part)?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_key_equality_is_structural() {
        let a = Key::new(vec![Value::Int64(1), Value::from("x")]);
        let b = Key::new(vec![Value::Int64(1), Value::from("x")]);
        let c = Key::new(vec![Value::Int64(1), Value::from("y")]);
        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<Key> = [a.clone(), b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_single_key() {
        let key = Key::from(42i64);
        assert_eq!(key.len(), 1);
        assert_eq!(key.parts(), &[Value::Int64(42)]);
        assert_eq!(key, Key::single(Value::Int64(42)));
    }

    #[test]
    fn test_has_null() {
        assert!(Key::new(vec![Value::Int64(1), Value::Null]).has_null());
        assert!(!Key::from(1i64).has_null());
    }

    #[test]
    fn test_display() {
        assert_eq!(Key::from(7i64).to_string(), "7");
        assert_eq!(
            Key::new(vec![Value::Int64(1), Value::from("a")]).to_string(),
            "(1, \"a\")"
        );
    }

    #[test]
    fn test_ordering() {
        let mut keys = vec![Key::from(3i64), Key::from(1i64), Key::from(2i64)];
        keys.sort();
        assert_eq!(keys, vec![Key::from(1i64), Key::from(2i64), Key::from(3i64)]);
    }
}
