//! Error types for ormbase.
//!
//! Tracking operations (import, export, dirty checks, key extraction) never
//! fail: they degrade to untouched values or empty results. The variants here
//! cover the API edges only, such as addressing a property that was never
//! declared or bridging a payload that is not a record.

use thiserror::Error;

/// Errors raised at the edges of the model API.
#[derive(Error, Debug)]
pub enum Error {
    /// The property is not declared on the model's table.
    #[error("property '{property}' is not declared on table '{table}'")]
    UnknownProperty { table: String, property: String },

    /// A payload that should describe a record was not a key/value object.
    #[error("expected a record object, found {0}")]
    NotAnObject(&'static str),

    /// serde failed to convert between a typed struct and a record.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result alias used throughout ormbase.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_property_message() {
        let err = Error::UnknownProperty {
            table: "users".to_string(),
            property: "nickname".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "property 'nickname' is not declared on table 'users'"
        );
    }

    #[test]
    fn test_not_an_object_message() {
        assert_eq!(
            Error::NotAnObject("array").to_string(),
            "expected a record object, found array"
        );
    }
}
