//! Validation engine - composable schemas over untyped JSON input.
//!
//! Input arrives as a [`serde_json::Value`]. A schema checks it, collects every violated
//! constraint as an [`Issue`], and produces a normalized value (defaults applied, unknown
//! keys removed) that is then deserialized into a typed shape through `serde`.

pub mod issue;
pub mod object;
pub mod rules;

pub use issue::{FieldPath, Issue, IssueCode, PathSegment, ValidationErrors};
pub use object::{ObjectSchema, Presence, object};
pub use rules::{
    ArraySchema, NumberSchema, Schema, StringFormat, StringSchema, array, boolean, date,
    date_time, email, enumeration, int32, integer, number, string, url, uuid,
};

use serde::de::DeserializeOwned;
use serde_json::Value;

/// A typed value with a validation schema.
///
/// Implementors describe their constraints in [`Shape::schema`]; [`Shape::parse`] is the
/// single entry point that turns untrusted input into the typed value or a full list of
/// violations.
pub trait Shape: DeserializeOwned {
    /// The schema this shape is validated against.
    fn schema() -> ObjectSchema;

    /// Validates `input` and converts it into `Self`.
    fn parse(input: &Value) -> Result<Self, ValidationErrors> {
        let normalized = Self::schema().validate(input)?;
        serde_json::from_value(normalized).map_err(|e| {
            ValidationErrors::single(FieldPath::root(), IssueCode::InvalidType, e.to_string())
        })
    }
}
