//! Object schemas and their composition transforms.
//!
//! Shapes are built from each other instead of being written out twice: an insert shape
//! is a row shape with server-assigned fields `omit`ted, an update shape is a `partial`
//! copy with a mandatory timestamp added back through `field`, and cross-field rules are
//! attached with `refine`. Every transform takes the schema by value and returns a new one.

use super::issue::{FieldPath, Issue, IssueCode, ValidationErrors};
use super::rules::{Schema, invalid_type};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// How an object member behaves when it is absent from the input.
#[derive(Debug, Clone, PartialEq)]
pub enum Presence {
    /// Absence is a `required` issue
    Required,
    /// Absence is accepted and the key stays absent
    Optional,
    /// Absence is replaced by this value
    Default(Value),
}

#[derive(Debug, Clone)]
struct Field {
    name: &'static str,
    schema: Schema,
    presence: Presence,
}

type Predicate = Arc<dyn Fn(&Map<String, Value>) -> bool + Send + Sync>;

#[derive(Clone)]
struct Refinement {
    predicate: Predicate,
    path: FieldPath,
    message: String,
}

/// Schema for a JSON object with named members.
#[derive(Clone, Default)]
pub struct ObjectSchema {
    fields: Vec<Field>,
    refinements: Vec<Refinement>,
}

impl fmt::Debug for ObjectSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectSchema")
            .field("fields", &self.fields)
            .field("refinements", &self.refinements.len())
            .finish()
    }
}

/// Empty object schema, the start of every shape.
#[must_use]
pub fn object() -> ObjectSchema {
    ObjectSchema::default()
}

impl ObjectSchema {
    fn put(mut self, name: &'static str, schema: Schema, presence: Presence) -> Self {
        let field = Field {
            name,
            schema,
            presence,
        };
        if let Some(existing) = self.fields.iter_mut().find(|f| f.name == name) {
            *existing = field;
        } else {
            self.fields.push(field);
        }
        self
    }

    /// Adds (or replaces) a member that must be present.
    #[must_use]
    pub fn field(self, name: &'static str, schema: impl Into<Schema>) -> Self {
        self.put(name, schema.into(), Presence::Required)
    }

    /// Adds (or replaces) a member that may be absent.
    #[must_use]
    pub fn optional(self, name: &'static str, schema: impl Into<Schema>) -> Self {
        self.put(name, schema.into(), Presence::Optional)
    }

    /// Adds (or replaces) a member that takes `default` when absent.
    #[must_use]
    pub fn with_default(
        self,
        name: &'static str,
        schema: impl Into<Schema>,
        default: impl Into<Value>,
    ) -> Self {
        self.put(name, schema.into(), Presence::Default(default.into()))
    }

    /// Merges another schema's members and refinements; its members win on name clashes.
    #[must_use]
    pub fn extend(mut self, other: Self) -> Self {
        for field in other.fields {
            self = self.put(field.name, field.schema, field.presence);
        }
        self.refinements.extend(other.refinements);
        self
    }

    /// Drops the named members.
    #[must_use]
    pub fn omit(mut self, names: &[&str]) -> Self {
        self.fields.retain(|f| !names.contains(&f.name));
        self
    }

    /// Makes every member optional. Defaults are dropped, so absent members stay absent.
    #[must_use]
    pub fn partial(mut self) -> Self {
        for field in &mut self.fields {
            field.presence = Presence::Optional;
        }
        self
    }

    /// Attaches a cross-field rule. A failing predicate is reported at `path`
    /// (dot-separated, relative to this object). Refinements only run once every
    /// member of the object has validated.
    #[must_use]
    pub fn refine<F>(mut self, predicate: F, path: &str, message: impl Into<String>) -> Self
    where
        F: Fn(&Map<String, Value>) -> bool + Send + Sync + 'static,
    {
        let path = path
            .split('.')
            .filter(|s| !s.is_empty())
            .fold(FieldPath::root(), |acc, key| acc.key(key));
        self.refinements.push(Refinement {
            predicate: Arc::new(predicate),
            path,
            message: message.into(),
        });
        self
    }

    /// Member names in declaration order.
    #[must_use]
    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }

    /// Presence rule of a member, if the member exists.
    #[must_use]
    pub fn presence_of(&self, name: &str) -> Option<&Presence> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| &f.presence)
    }

    /// Validates a whole input value, returning the normalized object or every issue found.
    pub fn validate(&self, input: &Value) -> Result<Value, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let normalized = self.validate_at(input, &FieldPath::root(), &mut errors);
        errors.into_result().map(|()| normalized)
    }

    pub(crate) fn validate_at(
        &self,
        value: &Value,
        path: &FieldPath,
        errors: &mut ValidationErrors,
    ) -> Value {
        let Value::Object(input) = value else {
            errors.push(invalid_type("object", value, path));
            return value.clone();
        };

        let issues_before = errors.len();
        let mut output = Map::new();
        for field in &self.fields {
            let field_path = path.key(field.name);
            match (input.get(field.name), &field.presence) {
                (Some(member), _) => {
                    let normalized = field.schema.validate_at(member, &field_path, errors);
                    output.insert(field.name.to_string(), normalized);
                }
                (None, Presence::Required) => {
                    errors.push(Issue::new(field_path, IssueCode::Required, "Required"));
                }
                (None, Presence::Optional) => {}
                (None, Presence::Default(default)) => {
                    output.insert(field.name.to_string(), default.clone());
                }
            }
        }

        if errors.len() == issues_before {
            for refinement in &self.refinements {
                if !(refinement.predicate)(&output) {
                    errors.push(Issue::new(
                        path.join(&refinement.path),
                        IssueCode::Custom,
                        refinement.message.clone(),
                    ));
                }
            }
        }

        Value::Object(output)
    }
}
