//! Field-level schemas - strings, numbers, booleans, enumerations and arrays.
//!
//! Each builder describes the constraints for one conceptual field. Feature and row
//! shapes reuse the same builders (`uuid()`, `date_time()`, `date()`), so a field means
//! the same thing everywhere it appears.

use super::issue::{FieldPath, Issue, IssueCode, ValidationErrors};
use super::object::ObjectSchema;
use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::fmt::Write;

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date regex must compile"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex must compile"));
static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.\-]*://[^\s/?#]+\S*$").expect("url regex must compile")
});

/// Well-known string formats checked after length constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    /// Canonical hyphenated UUID (8-4-4-4-12 hex digits)
    Uuid,
    /// RFC 3339 timestamp, e.g. `2024-05-01T09:30:00Z`
    DateTime,
    /// `YYYY-MM-DD` that also names a real calendar day
    Date,
    /// Address with a local part, an `@` and a dotted domain
    Email,
    /// Absolute URL with a scheme and host
    Url,
}

impl StringFormat {
    const fn default_message(self) -> &'static str {
        match self {
            Self::Uuid => "Invalid uuid",
            Self::DateTime => "Invalid datetime",
            Self::Date => "Invalid date format",
            Self::Email => "Invalid email",
            Self::Url => "Invalid url",
        }
    }

    fn check(self, value: &str, message: &str, path: &FieldPath, errors: &mut ValidationErrors) {
        let ok = match self {
            Self::Uuid => value.len() == 36 && uuid::Uuid::try_parse(value).is_ok(),
            Self::DateTime => DateTime::parse_from_rfc3339(value).is_ok(),
            Self::Date => {
                if !DATE_RE.is_match(value) {
                    false
                } else if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
                    errors.push(Issue::new(
                        path.clone(),
                        IssueCode::InvalidFormat,
                        "Invalid calendar date",
                    ));
                    return;
                } else {
                    true
                }
            }
            Self::Email => EMAIL_RE.is_match(value),
            Self::Url => URL_RE.is_match(value),
        };
        if !ok {
            errors.push(Issue::new(path.clone(), IssueCode::InvalidFormat, message));
        }
    }
}

/// Constraints on a string field.
#[derive(Debug, Clone, Default)]
pub struct StringSchema {
    min: Option<(usize, String)>,
    max: Option<(usize, String)>,
    format: Option<(StringFormat, String)>,
    pattern: Option<(&'static Regex, String)>,
}

impl StringSchema {
    /// Minimum length in characters.
    #[must_use]
    pub fn min(self, len: usize) -> Self {
        self.min_with(
            len,
            format!("String must contain at least {len} character(s)"),
        )
    }

    /// Minimum length in characters, with a custom message.
    #[must_use]
    pub fn min_with(mut self, len: usize, message: impl Into<String>) -> Self {
        self.min = Some((len, message.into()));
        self
    }

    /// Maximum length in characters.
    #[must_use]
    pub fn max(self, len: usize) -> Self {
        self.max_with(len, format!("String must contain at most {len} character(s)"))
    }

    /// Maximum length in characters, with a custom message.
    #[must_use]
    pub fn max_with(mut self, len: usize, message: impl Into<String>) -> Self {
        self.max = Some((len, message.into()));
        self
    }

    /// Checks a well-known format with its default message.
    #[must_use]
    pub fn format(self, format: StringFormat) -> Self {
        self.format_with(format, format.default_message())
    }

    /// Checks a well-known format, reporting `message` on failure.
    #[must_use]
    pub fn format_with(mut self, format: StringFormat, message: impl Into<String>) -> Self {
        self.format = Some((format, message.into()));
        self
    }

    /// Literal regex match against the whole value.
    #[must_use]
    pub fn pattern(mut self, regex: &'static Regex, message: impl Into<String>) -> Self {
        self.pattern = Some((regex, message.into()));
        self
    }

    fn check(&self, value: &str, path: &FieldPath, errors: &mut ValidationErrors) {
        let len = value.chars().count();
        if let Some((min, message)) = &self.min {
            if len < *min {
                errors.push(Issue::new(path.clone(), IssueCode::TooSmall, message.clone()));
            }
        }
        if let Some((max, message)) = &self.max {
            if len > *max {
                errors.push(Issue::new(path.clone(), IssueCode::TooBig, message.clone()));
            }
        }
        if let Some((format, message)) = &self.format {
            format.check(value, message, path, errors);
        }
        if let Some((regex, message)) = &self.pattern {
            if !regex.is_match(value) {
                errors.push(Issue::new(
                    path.clone(),
                    IssueCode::InvalidFormat,
                    message.clone(),
                ));
            }
        }
    }
}

/// Constraints on a numeric field.
#[derive(Debug, Clone, Default)]
pub struct NumberSchema {
    integer: bool,
    positive: bool,
    min: Option<f64>,
    max: Option<f64>,
}

impl NumberSchema {
    /// Rejects values with a fractional representation (`2.5`, `3.0`).
    #[must_use]
    pub const fn int(mut self) -> Self {
        self.integer = true;
        self
    }

    /// Strictly greater than zero.
    #[must_use]
    pub const fn positive(mut self) -> Self {
        self.positive = true;
        self
    }

    /// Inclusive lower bound.
    #[must_use]
    pub const fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Inclusive upper bound.
    #[must_use]
    pub const fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    fn check(&self, number: &serde_json::Number, path: &FieldPath, errors: &mut ValidationErrors) {
        if self.integer && !(number.is_i64() || number.is_u64()) {
            errors.push(Issue::new(
                path.clone(),
                IssueCode::InvalidType,
                "Expected integer, received float",
            ));
        }
        let Some(value) = number.as_f64() else {
            return;
        };
        if self.positive && value <= 0.0 {
            errors.push(Issue::new(
                path.clone(),
                IssueCode::TooSmall,
                "Number must be greater than 0",
            ));
        }
        if let Some(min) = self.min {
            if value < min {
                errors.push(Issue::new(
                    path.clone(),
                    IssueCode::TooSmall,
                    format!("Number must be greater than or equal to {min}"),
                ));
            }
        }
        if let Some(max) = self.max {
            if value > max {
                errors.push(Issue::new(
                    path.clone(),
                    IssueCode::TooBig,
                    format!("Number must be less than or equal to {max}"),
                ));
            }
        }
    }
}

/// Constraints on an array field and its elements.
#[derive(Debug, Clone)]
pub struct ArraySchema {
    item: Box<Schema>,
    min: Option<usize>,
    max: Option<usize>,
}

impl ArraySchema {
    /// Fewest elements allowed.
    #[must_use]
    pub const fn min(mut self, len: usize) -> Self {
        self.min = Some(len);
        self
    }

    /// Most elements allowed.
    #[must_use]
    pub const fn max(mut self, len: usize) -> Self {
        self.max = Some(len);
        self
    }
}

/// Any schema a field can carry.
#[derive(Debug, Clone)]
pub enum Schema {
    String(StringSchema),
    Number(NumberSchema),
    Boolean,
    /// Closed set of accepted string values
    Enum(&'static [&'static str]),
    Array(ArraySchema),
    Object(ObjectSchema),
}

impl From<StringSchema> for Schema {
    fn from(value: StringSchema) -> Self {
        Self::String(value)
    }
}

impl From<NumberSchema> for Schema {
    fn from(value: NumberSchema) -> Self {
        Self::Number(value)
    }
}

impl From<ArraySchema> for Schema {
    fn from(value: ArraySchema) -> Self {
        Self::Array(value)
    }
}

impl From<ObjectSchema> for Schema {
    fn from(value: ObjectSchema) -> Self {
        Self::Object(value)
    }
}

/// JSON type name used in `invalid_type` messages.
pub(crate) const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub(crate) fn invalid_type(expected: &str, value: &Value, path: &FieldPath) -> Issue {
    Issue::new(
        path.clone(),
        IssueCode::InvalidType,
        format!("Expected {expected}, received {}", type_name(value)),
    )
}

impl Schema {
    /// Validates `value` at `path`, pushing every violation into `errors`.
    ///
    /// Returns the normalized value (unknown object keys stripped, defaults applied).
    /// The returned value is only meaningful when no issues were added.
    pub(crate) fn validate_at(
        &self,
        value: &Value,
        path: &FieldPath,
        errors: &mut ValidationErrors,
    ) -> Value {
        match self {
            Self::String(rules) => match value {
                Value::String(s) => rules.check(s, path, errors),
                other => errors.push(invalid_type("string", other, path)),
            },
            Self::Number(rules) => match value {
                Value::Number(n) => rules.check(n, path, errors),
                other => errors.push(invalid_type("number", other, path)),
            },
            Self::Boolean => {
                if !value.is_boolean() {
                    errors.push(invalid_type("boolean", value, path));
                }
            }
            Self::Enum(allowed) => match value {
                Value::String(s) if allowed.contains(&s.as_str()) => {}
                Value::String(s) => {
                    let mut expected = String::new();
                    for (i, option) in allowed.iter().enumerate() {
                        if i > 0 {
                            expected.push_str(" | ");
                        }
                        let _ = write!(expected, "'{option}'");
                    }
                    errors.push(Issue::new(
                        path.clone(),
                        IssueCode::InvalidEnumValue,
                        format!("Invalid enum value. Expected {expected}, received '{s}'"),
                    ));
                }
                other => errors.push(invalid_type("string", other, path)),
            },
            Self::Array(rules) => {
                let Value::Array(items) = value else {
                    errors.push(invalid_type("array", value, path));
                    return value.clone();
                };
                if let Some(min) = rules.min {
                    if items.len() < min {
                        errors.push(Issue::new(
                            path.clone(),
                            IssueCode::TooSmall,
                            format!("Array must contain at least {min} element(s)"),
                        ));
                    }
                }
                if let Some(max) = rules.max {
                    if items.len() > max {
                        errors.push(Issue::new(
                            path.clone(),
                            IssueCode::TooBig,
                            format!("Array must contain at most {max} element(s)"),
                        ));
                    }
                }
                let normalized = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| rules.item.validate_at(item, &path.index(i), errors))
                    .collect();
                return Value::Array(normalized);
            }
            Self::Object(object) => return object.validate_at(value, path, errors),
        }
        value.clone()
    }
}

/// Unconstrained string.
#[must_use]
pub fn string() -> StringSchema {
    StringSchema::default()
}

/// Unconstrained number.
#[must_use]
pub fn number() -> NumberSchema {
    NumberSchema::default()
}

/// Whole number.
#[must_use]
pub fn integer() -> NumberSchema {
    NumberSchema::default().int()
}

/// Whole number that fits a 32-bit signed column.
#[must_use]
pub fn int32() -> NumberSchema {
    integer().min(f64::from(i32::MIN)).max(f64::from(i32::MAX))
}

/// `true` or `false`.
#[must_use]
pub const fn boolean() -> Schema {
    Schema::Boolean
}

/// Closed enumeration over the given string values.
#[must_use]
pub const fn enumeration(values: &'static [&'static str]) -> Schema {
    Schema::Enum(values)
}

/// Array whose every element must satisfy `item`.
#[must_use]
pub fn array(item: impl Into<Schema>) -> ArraySchema {
    ArraySchema {
        item: Box::new(item.into()),
        min: None,
        max: None,
    }
}

/// Canonical UUID string.
#[must_use]
pub fn uuid() -> StringSchema {
    string().format(StringFormat::Uuid)
}

/// RFC 3339 timestamp string.
#[must_use]
pub fn date_time() -> StringSchema {
    string().format(StringFormat::DateTime)
}

/// `YYYY-MM-DD` calendar date string.
#[must_use]
pub fn date() -> StringSchema {
    string().format(StringFormat::Date)
}

/// Email address string.
#[must_use]
pub fn email() -> StringSchema {
    string().format(StringFormat::Email)
}

/// Absolute URL string.
#[must_use]
pub fn url() -> StringSchema {
    string().format(StringFormat::Url)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use serde_json::json;

    fn run(schema: impl Into<Schema>, value: &Value) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        schema
            .into()
            .validate_at(value, &FieldPath::root().key("field"), &mut errors);
        errors
    }

    #[test]
    fn test_string_length_bounds() {
        let schema = || string().min(1).max(5);
        assert!(run(schema(), &json!("abc")).is_empty());
        assert_eq!(run(schema(), &json!("")).issues()[0].code, IssueCode::TooSmall);
        assert_eq!(run(schema(), &json!("abcdef")).issues()[0].code, IssueCode::TooBig);
        // Multi-byte characters count once
        assert!(run(schema(), &json!("ééééé")).is_empty());
    }

    #[test]
    fn test_wrong_type_reports_received_type() {
        let errors = run(string(), &json!(42));
        assert_eq!(errors.issues()[0].code, IssueCode::InvalidType);
        assert_eq!(errors.issues()[0].message, "Expected string, received number");

        let errors = run(string(), &Value::Null);
        assert_eq!(errors.issues()[0].message, "Expected string, received null");
    }

    #[test]
    fn test_uuid_requires_canonical_form() {
        assert!(run(uuid(), &json!("67e55044-10b1-426f-9247-bb680e5fe0c8")).is_empty());
        assert!(!run(uuid(), &json!("67e5504410b1426f9247bb680e5fe0c8")).is_empty());
        assert!(!run(uuid(), &json!("{67e55044-10b1-426f-9247-bb680e5fe0c8}")).is_empty());
        assert!(!run(uuid(), &json!("not-a-uuid")).is_empty());
    }

    #[test]
    fn test_date_time_format() {
        assert!(run(date_time(), &json!("2024-05-01T09:30:00Z")).is_empty());
        assert!(run(date_time(), &json!("2024-05-01T09:30:00.123+02:00")).is_empty());
        assert!(!run(date_time(), &json!("2024-05-01")).is_empty());
        assert!(!run(date_time(), &json!("yesterday")).is_empty());
    }

    #[test]
    fn test_date_pattern_then_calendar() {
        assert!(run(date(), &json!("2024-02-29")).is_empty());

        let errors = run(date(), &json!("2024-13-01"));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.issues()[0].message, "Invalid calendar date");

        let errors = run(date(), &json!("2024-1-01"));
        assert_eq!(errors.issues()[0].message, "Invalid date format");
    }

    #[test]
    fn test_number_rules() {
        let rank = || integer().min(1.0).max(5.0);
        assert!(run(rank(), &json!(3)).is_empty());
        assert_eq!(run(rank(), &json!(0)).issues()[0].code, IssueCode::TooSmall);
        assert_eq!(run(rank(), &json!(6)).issues()[0].code, IssueCode::TooBig);
        assert_eq!(run(rank(), &json!(2.5)).issues()[0].code, IssueCode::InvalidType);

        assert!(!run(number().positive(), &json!(0)).is_empty());
        assert!(run(number().positive(), &json!(0.5)).is_empty());
    }

    #[test]
    fn test_int32_bounds() {
        assert!(run(int32(), &json!(i32::MAX)).is_empty());
        assert!(run(int32(), &json!(i32::MIN)).is_empty());
        assert_eq!(
            run(int32(), &json!(i64::from(i32::MAX) + 1)).issues()[0].code,
            IssueCode::TooBig
        );
        assert_eq!(
            run(int32(), &json!(i64::from(i32::MIN) - 1)).issues()[0].code,
            IssueCode::TooSmall
        );
    }

    #[test]
    fn test_pattern_matches_whole_value() {
        static CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z]+(_[a-z]+)*$").unwrap());
        let code = || string().pattern(&CODE_RE, "Expected a snake_case code");
        assert!(run(code(), &json!("not_found")).is_empty());
        let errors = run(code(), &json!("Not Found"));
        assert_eq!(errors.issues()[0].code, IssueCode::InvalidFormat);
        assert_eq!(errors.issues()[0].message, "Expected a snake_case code");
    }

    #[test]
    fn test_enum_rejects_unknown_values() {
        let errors = run(enumeration(&["A", "B", "C"]), &json!("D"));
        assert_eq!(errors.issues()[0].code, IssueCode::InvalidEnumValue);
        assert_eq!(
            errors.issues()[0].message,
            "Invalid enum value. Expected 'A' | 'B' | 'C', received 'D'"
        );
        // Case matters
        assert!(!run(enumeration(&["A", "B", "C"]), &json!("a")).is_empty());
    }

    #[test]
    fn test_array_reports_element_index() {
        let errors = run(array(string().min(1)).max(2), &json!(["ok", "", "x"]));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.issues()[0].path.to_string(), "field");
        assert_eq!(errors.issues()[0].code, IssueCode::TooBig);
        assert_eq!(errors.issues()[1].path.to_string(), "field[1]");
    }

    #[test]
    fn test_email_and_url() {
        assert!(run(email(), &json!("ada@example.com")).is_empty());
        assert!(!run(email(), &json!("ada.example.com")).is_empty());
        assert!(run(url(), &json!("https://cdn.example.com/a.png")).is_empty());
        assert!(!run(url(), &json!("cdn.example.com/a.png")).is_empty());
    }
}
