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

//! Resource name templates.
//!
//! Resource names are `/`-separated paths such as
//! `projects/my-project/locations/global`. A template names the variable
//! segments: `projects/{project}/locations/{location}`. Each variable matches
//! exactly one non-empty segment, every other segment must match literally.
//!
//! # Example
//! ```
//! # use cloud_samples_adapter::path_template::PathTemplate;
//! let t = PathTemplate::parse("projects/{project}/locations/{location}")?;
//! let name = t.render(&[("project", "my-project"), ("location", "global")])?;
//! assert_eq!(name, "projects/my-project/locations/global");
//! assert!(t.matches(&name));
//! assert!(!t.matches("projects/my-project"));
//! # Ok::<(), cloud_samples_adapter::path_template::PathTemplateError>(())
//! ```

use indexmap::IndexMap;

/// Errors creating or rendering a [PathTemplate].
#[derive(thiserror::Error, Debug, PartialEq)]
#[non_exhaustive]
pub enum PathTemplateError {
    #[error("the template `{0}` has an empty segment")]
    EmptySegment(String),
    #[error("the template `{template}` has a malformed segment `{segment}`")]
    MalformedSegment { template: String, segment: String },
    #[error("the template `{template}` repeats the variable `{variable}`")]
    DuplicateVariable { template: String, variable: String },
    #[error("missing value for `{variable}` in template `{template}`")]
    MissingVariable { template: String, variable: String },
    #[error("the value `{value}` for `{variable}` must be a single non-empty segment")]
    InvalidValue { variable: String, value: String },
}

#[derive(Clone, Debug, PartialEq)]
enum Segment {
    Literal(String),
    Variable(String),
}

/// A parsed resource name template.
#[derive(Clone, Debug, PartialEq)]
pub struct PathTemplate {
    template: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    pub fn parse(template: &str) -> Result<Self, PathTemplateError> {
        let mut segments = Vec::new();
        for segment in template.split('/') {
            if segment.is_empty() {
                return Err(PathTemplateError::EmptySegment(template.to_string()));
            }
            let parsed = match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) if is_identifier(name) => Segment::Variable(name.to_string()),
                Some(_) => return Err(malformed(template, segment)),
                None if segment.contains(['{', '}']) => return Err(malformed(template, segment)),
                None => Segment::Literal(segment.to_string()),
            };
            if let Segment::Variable(name) = &parsed {
                if segments.contains(&parsed) {
                    return Err(PathTemplateError::DuplicateVariable {
                        template: template.to_string(),
                        variable: name.clone(),
                    });
                }
            }
            segments.push(parsed);
        }
        Ok(Self {
            template: template.to_string(),
            segments,
        })
    }

    /// The variable names, in template order.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Variable(v) => Some(v.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Builds a resource name from variable bindings.
    pub fn render(&self, bindings: &[(&str, &str)]) -> Result<String, PathTemplateError> {
        let mut parts = Vec::with_capacity(self.segments.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(l) => parts.push(l.as_str()),
                Segment::Variable(v) => {
                    let value = bindings
                        .iter()
                        .find_map(|(name, value)| (name == v).then_some(*value))
                        .ok_or_else(|| PathTemplateError::MissingVariable {
                            template: self.template.clone(),
                            variable: v.clone(),
                        })?;
                    if value.is_empty() || value.contains('/') {
                        return Err(PathTemplateError::InvalidValue {
                            variable: v.clone(),
                            value: value.to_string(),
                        });
                    }
                    parts.push(value);
                }
            }
        }
        Ok(parts.join("/"))
    }

    /// Returns true if `path` is a resource name for this template.
    pub fn matches(&self, path: &str) -> bool {
        self.bindings(path).is_some()
    }

    /// Extracts the variable values from `path`, or `None` if it does not
    /// match.
    pub fn bindings<'p>(&self, path: &'p str) -> Option<IndexMap<&str, &'p str>> {
        let parts = path.split('/').collect::<Vec<_>>();
        if parts.len() != self.segments.len() {
            return None;
        }
        let mut bindings = IndexMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(l) if l == part => {}
                Segment::Variable(v) if !part.is_empty() => {
                    bindings.insert(v.as_str(), part);
                }
                _ => return None,
            }
        }
        Some(bindings)
    }
}

impl std::fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.template)
    }
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn malformed(template: &str, segment: &str) -> PathTemplateError {
    PathTemplateError::MalformedSegment {
        template: template.to_string(),
        segment: segment.to_string(),
    }
}
