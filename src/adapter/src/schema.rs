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

//! Per-operation request schemas.
//!
//! The request builder validates caller parameters against an
//! [OperationSchema]. Schemas are registered by operation name in a
//! [Registry].

use crate::path_template::{PathTemplate, PathTemplateError};
use std::collections::HashMap;
use std::sync::Arc;

/// The declared type of a request field.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldType {
    String,
    Integer,
    Float,
    Bool,
    /// An enum with the given variant names.
    Enum(&'static [&'static str]),
    Message(MessageSchema),
    Repeated(Box<FieldType>),
}

impl FieldType {
    /// Shorthand for `FieldType::Repeated(Box::new(inner))`.
    pub fn repeated(inner: FieldType) -> Self {
        Self::Repeated(Box::new(inner))
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String => f.write_str("string"),
            Self::Integer => f.write_str("integer"),
            Self::Float => f.write_str("float"),
            Self::Bool => f.write_str("bool"),
            Self::Enum(variants) => write!(f, "enum {{{}}}", variants.join(", ")),
            Self::Message(_) => f.write_str("message"),
            Self::Repeated(inner) => write!(f, "repeated {inner}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldSchema {
    name: String,
    field_type: FieldType,
    required: bool,
}

impl FieldSchema {
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }
    pub fn is_required(&self) -> bool {
        self.required
    }
}

/// The fields of a message, in declaration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MessageSchema {
    fields: Vec<FieldSchema>,
}

impl MessageSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a required field.
    pub fn required<T: Into<String>>(self, name: T, field_type: FieldType) -> Self {
        self.field(name.into(), field_type, true)
    }

    /// Declares an optional field.
    pub fn optional<T: Into<String>>(self, name: T, field_type: FieldType) -> Self {
        self.field(name.into(), field_type, false)
    }

    fn field(mut self, name: String, field_type: FieldType, required: bool) -> Self {
        self.fields.retain(|f| f.name != name);
        self.fields.push(FieldSchema {
            name,
            field_type,
            required,
        });
        self
    }

    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// How the executor treats an operation's result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Returns a single result value.
    Unary,
    /// Returns a lazy sequence of pages.
    Listing,
    /// Returns a long-running operation handle.
    LongRunning,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unary => f.write_str("unary"),
            Self::Listing => f.write_str("listing"),
            Self::LongRunning => f.write_str("long-running"),
        }
    }
}

/// Describes one remote operation.
#[derive(Clone, Debug, PartialEq)]
pub struct OperationSchema {
    name: String,
    kind: OperationKind,
    resource: Option<PathTemplate>,
    message: MessageSchema,
}

impl OperationSchema {
    pub fn new<T: Into<String>>(name: T, kind: OperationKind) -> Self {
        Self {
            name: name.into(),
            kind,
            resource: None,
            message: MessageSchema::new(),
        }
    }

    pub fn unary<T: Into<String>>(name: T) -> Self {
        Self::new(name, OperationKind::Unary)
    }

    pub fn listing<T: Into<String>>(name: T) -> Self {
        Self::new(name, OperationKind::Listing)
    }

    pub fn long_running<T: Into<String>>(name: T) -> Self {
        Self::new(name, OperationKind::LongRunning)
    }

    /// Requires the target resource path to match `template`.
    ///
    /// # Example
    /// ```
    /// # use cloud_samples_adapter::schema::{FieldType, OperationSchema};
    /// let schema = OperationSchema::listing("ListNotificationConfigs")
    ///     .with_resource("organizations/{organization}")?
    ///     .optional("pageSize", FieldType::Integer);
    /// # Ok::<(), cloud_samples_adapter::path_template::PathTemplateError>(())
    /// ```
    pub fn with_resource(mut self, template: &str) -> Result<Self, PathTemplateError> {
        self.resource = Some(PathTemplate::parse(template)?);
        Ok(self)
    }

    /// Declares a required field.
    pub fn required<T: Into<String>>(mut self, name: T, field_type: FieldType) -> Self {
        self.message = self.message.required(name, field_type);
        self
    }

    /// Declares an optional field.
    pub fn optional<T: Into<String>>(mut self, name: T, field_type: FieldType) -> Self {
        self.message = self.message.optional(name, field_type);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn kind(&self) -> OperationKind {
        self.kind
    }
    pub fn resource(&self) -> Option<&PathTemplate> {
        self.resource.as_ref()
    }
    pub fn message(&self) -> &MessageSchema {
        &self.message
    }
}

/// Operation schemas, by operation name.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    schemas: HashMap<String, Arc<OperationSchema>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `schema`, returning the schema it replaced, if any.
    pub fn register(&mut self, schema: OperationSchema) -> Option<Arc<OperationSchema>> {
        self.schemas
            .insert(schema.name.clone(), Arc::new(schema))
    }

    /// Builder-style [register][Registry::register].
    pub fn with(mut self, schema: OperationSchema) -> Self {
        self.register(schema);
        self
    }

    pub fn get(&self, name: &str) -> Option<&OperationSchema> {
        self.schemas.get(name).map(Arc::as_ref)
    }

    /// The registered operation names, sorted.
    pub fn operations(&self) -> Vec<&str> {
        let mut names = self.schemas.keys().map(String::as_str).collect::<Vec<_>>();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn message_schema() {
        let m = MessageSchema::new()
            .required("parent", FieldType::String)
            .optional("pageSize", FieldType::Integer)
            .optional("parent", FieldType::String);
        let names = m.fields().iter().map(FieldSchema::name).collect::<Vec<_>>();
        assert_eq!(names, vec!["pageSize", "parent"]);
        assert_eq!(m.get("parent").map(FieldSchema::is_required), Some(false));
        assert!(m.get("missing").is_none());
    }

    #[test]
    fn field_type_display() {
        assert_eq!(FieldType::Integer.to_string(), "integer");
        assert_eq!(
            FieldType::Enum(&["PLAIN_TEXT", "HTML"]).to_string(),
            "enum {PLAIN_TEXT, HTML}"
        );
        assert_eq!(
            FieldType::repeated(FieldType::String).to_string(),
            "repeated string"
        );
    }

    #[test]
    fn operation_schema() -> anyhow::Result<()> {
        let s = OperationSchema::long_running("CreateDatabase")
            .with_resource("projects/{project}/instances/{instance}")?
            .required("createStatement", FieldType::String);
        assert_eq!(s.name(), "CreateDatabase");
        assert_eq!(s.kind(), OperationKind::LongRunning);
        assert!(s.resource().is_some());
        assert_eq!(s.message().fields().len(), 1);
        assert!(OperationSchema::unary("x").with_resource("a//b").is_err());
        Ok(())
    }

    #[test]
    fn registry() {
        let mut r = Registry::new()
            .with(OperationSchema::unary("AnalyzeEntities"))
            .with(OperationSchema::listing("ListDatasets"));
        assert_eq!(r.operations(), vec!["AnalyzeEntities", "ListDatasets"]);
        assert_eq!(
            r.get("ListDatasets").map(OperationSchema::kind),
            Some(OperationKind::Listing)
        );
        assert!(r.get("Unknown").is_none());
        let old = r.register(OperationSchema::unary("ListDatasets"));
        assert!(old.is_some());
        assert_eq!(
            r.get("ListDatasets").map(OperationSchema::kind),
            Some(OperationKind::Unary)
        );
    }
}
