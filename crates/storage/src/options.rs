//! Schema-wide options.

use serde::{Deserialize, Serialize};

/// Options shared by every table of a [`Schema`](crate::Schema).
///
/// Options can be built in code or deserialized; missing fields take their
/// defaults.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaOptions {
    /// Keep an empty bucket for a key after a non-unique index lookup misses.
    pub memoize_empty_buckets: bool,
    /// Check value types against column types on create and update.
    pub validate_types: bool,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            memoize_empty_buckets: false,
            validate_types: true,
        }
    }
}

impl SchemaOptions {
    /// Creates the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether missed lookups leave an empty bucket behind.
    pub fn memoize_empty_buckets(mut self, memoize: bool) -> Self {
        self.memoize_empty_buckets = memoize;
        self
    }

    /// Sets whether writes are type checked.
    pub fn validate_types(mut self, validate: bool) -> Self {
        self.validate_types = validate;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = SchemaOptions::default();
        assert!(!options.memoize_empty_buckets);
        assert!(options.validate_types);
    }

    #[test]
    fn test_builder_setters() {
        let options = SchemaOptions::new()
            .memoize_empty_buckets(true)
            .validate_types(false);
        assert!(options.memoize_empty_buckets);
        assert!(!options.validate_types);
    }

    #[test]
    fn test_deserialize_partial() {
        let options: SchemaOptions =
            serde_json::from_str(r#"{ "memoize_empty_buckets": true }"#).unwrap();
        assert!(options.memoize_empty_buckets);
        assert!(options.validate_types);

        let options: SchemaOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, SchemaOptions::default());
    }

    #[test]
    fn test_serialize_round_trip() {
        let options = SchemaOptions::new().validate_types(false);
        let json = serde_json::to_string(&options).unwrap();
        assert_eq!(serde_json::from_str::<SchemaOptions>(&json).unwrap(), options);
    }
}
