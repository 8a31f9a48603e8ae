// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The request builder.
//!
//! Maps flat caller parameters into a validated, typed [Request]. Validation
//! is local, it checks shape and types against the operation schema and never
//! contacts the service.

use crate::Result;
use crate::schema::{FieldType, MessageSchema, OperationKind, Registry};
use crate::value::{Record, Value};
use gax::error::Error;

/// The operation used to poll long-running operations.
pub const GET_OPERATION: &str = "google.longrunning.Operations.GetOperation";

/// The ways a request fails validation.
///
/// Returned as the source of an [Error] where
/// [is_binding()][Error::is_binding] is true. Nested fields are named with
/// `.`-separated paths, list elements with `[index]`.
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum BuildError {
    #[error("unknown operation `{0}`")]
    UnknownOperation(String),
    #[error("unknown field `{field}` in request for `{operation}`")]
    UnknownField { operation: String, field: String },
    #[error("missing required field `{field}` in request for `{operation}`")]
    MissingField { operation: String, field: String },
    #[error("field `{field}` expects {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: String,
    },
    #[error("the resource `{resource}` does not match the template `{template}`")]
    ResourceMismatch { resource: String, template: String },
}

/// A validated request for a single remote operation.
///
/// Requests are immutable. Field values have been coerced to their declared
/// types and appear in declaration order.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    operation: String,
    kind: OperationKind,
    resource: String,
    fields: Record,
}

impl Request {
    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// The target resource path.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn fields(&self) -> &Record {
        &self.fields
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// The request fields as a record.
    ///
    /// Transports use this to serialize the request.
    pub fn to_record(&self) -> Record {
        self.fields.clone()
    }

    /// The request to fetch the latest state of a long-running operation.
    pub(crate) fn get_operation(name: &str) -> Self {
        Self {
            operation: GET_OPERATION.to_string(),
            kind: OperationKind::Unary,
            resource: name.to_string(),
            fields: Record::from([("name".to_string(), Value::from(name))]),
        }
    }
}

/// Builds [Request]s from caller parameters.
///
/// # Example
/// ```
/// # use cloud_samples_adapter::request::RequestBuilder;
/// # use cloud_samples_adapter::schema::{FieldType, OperationSchema, Registry};
/// # use cloud_samples_adapter::value::{record, Value};
/// let registry = Registry::new().with(
///     OperationSchema::listing("ListDatasets")
///         .with_resource("projects/{project}")?
///         .optional("maxResults", FieldType::Integer),
/// );
/// let builder = RequestBuilder::new(registry);
/// let request = builder.build(
///     "ListDatasets",
///     "projects/my-project",
///     record([("maxResults", "25")]),
/// )?;
/// assert_eq!(request.get("maxResults"), Some(&Value::Integer(25)));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct RequestBuilder {
    registry: Registry,
}

impl RequestBuilder {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Validates `fields` against the schema for `operation`.
    ///
    /// Fails with an [InvalidArgument][gax::error::rpc::Code::InvalidArgument]
    /// error if the operation is unknown, the resource does not match the
    /// declared template, a field is unknown, a required field is missing, or
    /// a value does not convert to its declared type. `Null` values count as
    /// absent.
    pub fn build(&self, operation: &str, resource: &str, fields: Record) -> Result<Request> {
        self.try_build(operation, resource, fields)
            .map_err(Error::binding)
    }

    fn try_build(
        &self,
        operation: &str,
        resource: &str,
        fields: Record,
    ) -> std::result::Result<Request, BuildError> {
        let schema = self
            .registry
            .get(operation)
            .ok_or_else(|| BuildError::UnknownOperation(operation.to_string()))?;
        if let Some(template) = schema.resource() {
            if !template.matches(resource) {
                return Err(BuildError::ResourceMismatch {
                    resource: resource.to_string(),
                    template: template.to_string(),
                });
            }
        }
        let fields = validate_message(operation, "", schema.message(), fields)?;
        Ok(Request {
            operation: operation.to_string(),
            kind: schema.kind(),
            resource: resource.to_string(),
            fields,
        })
    }
}

fn validate_message(
    operation: &str,
    prefix: &str,
    schema: &MessageSchema,
    mut fields: Record,
) -> std::result::Result<Record, BuildError> {
    if let Some(unknown) = fields.keys().find(|k| schema.get(k).is_none()) {
        return Err(BuildError::UnknownField {
            operation: operation.to_string(),
            field: format!("{prefix}{unknown}"),
        });
    }
    let mut validated = Record::with_capacity(fields.len());
    for field in schema.fields() {
        let path = format!("{prefix}{}", field.name());
        match fields.shift_remove(field.name()) {
            None | Some(Value::Null) if field.is_required() => {
                return Err(BuildError::MissingField {
                    operation: operation.to_string(),
                    field: path,
                });
            }
            None | Some(Value::Null) => {}
            Some(value) => {
                let value = coerce(operation, &path, field.field_type(), value)?;
                validated.insert(field.name().to_string(), value);
            }
        }
    }
    Ok(validated)
}

fn coerce(
    operation: &str,
    path: &str,
    field_type: &FieldType,
    value: Value,
) -> std::result::Result<Value, BuildError> {
    let mismatch = |value: &Value| BuildError::TypeMismatch {
        field: path.to_string(),
        expected: field_type.to_string(),
        found: describe(value),
    };
    match (field_type, value) {
        (FieldType::String, v @ Value::String(_)) => Ok(v),
        (FieldType::Integer, v @ Value::Integer(_)) => Ok(v),
        (FieldType::Integer, Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| mismatch(&Value::String(s))),
        (FieldType::Float, v @ Value::Float(_)) => Ok(v),
        (FieldType::Float, Value::Integer(i)) => Ok(Value::Float(i as f64)),
        (FieldType::Float, Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| mismatch(&Value::String(s))),
        (FieldType::Bool, v @ Value::Bool(_)) => Ok(v),
        (FieldType::Bool, Value::String(s)) => match s.as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(mismatch(&Value::String(s))),
        },
        (FieldType::Enum(variants), Value::String(s) | Value::Enum(s)) => {
            if variants.contains(&s.as_str()) {
                Ok(Value::Enum(s))
            } else {
                Err(mismatch(&Value::Enum(s)))
            }
        }
        (FieldType::Message(schema), Value::Message(m)) => {
            validate_message(operation, &format!("{path}."), schema, m).map(Value::Message)
        }
        (FieldType::Repeated(inner), Value::List(items)) => items
            .into_iter()
            .enumerate()
            .map(|(i, v)| coerce(operation, &format!("{path}[{i}]"), inner, v))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(Value::List),
        (_, v) => Err(mismatch(&v)),
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(s) | Value::Enum(s) => format!("{} `{s}`", value.type_name()),
        Value::Integer(_) | Value::Float(_) | Value::Bool(_) => {
            format!("{} `{value}`", value.type_name())
        }
        _ => value.type_name().to_string(),
    }
}
