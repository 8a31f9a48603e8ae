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

//! This crate contains samples showing how to call Google Cloud services
//! through the request/response adapter.
//!
//! Each service module declares the schemas of the operations it calls and
//! one function per sample. Samples write their output to a
//! [Sink][adapter::sink::Sink].

use adapter::executor::Executor;
use adapter::format::OutputUnit;
use adapter::path_template::PathTemplateError;
use adapter::request::RequestBuilder;
use adapter::response::Response;
use adapter::schema::{OperationSchema, Registry};
use adapter::sink::Sink;
use adapter::transport::Transport;
use adapter::value::{Record, Value};
use gax::error::Error;
use gax::error::rpc::Status;
use gax::options::{ClientConfig, RequestOptions};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

pub mod analyticsdata;
pub mod bigquery;
pub mod dlp;
pub mod fake;
pub mod language;
pub mod livestream;
pub mod logging;
pub mod pagination;
pub mod polling_policies;
pub mod pubsub;
pub mod securitycenter;
pub mod spanner;
pub mod transcoder;

/// Errors reported by the samples themselves.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SampleError {
    #[error("instance {0} does not exist")]
    MissingInstance(String),
    #[error("operation {name} failed: {status}")]
    OperationFailed { name: String, status: Status },
    #[error("expected a {0} response")]
    UnexpectedResponse(&'static str),
}

/// Returns a registry with the schema of every operation used in the samples.
pub fn registry() -> std::result::Result<Registry, PathTemplateError> {
    let schemas: [fn() -> std::result::Result<Vec<OperationSchema>, PathTemplateError>; 9] = [
        analyticsdata::schemas,
        bigquery::schemas,
        dlp::schemas,
        language::schemas,
        livestream::schemas,
        pubsub::schemas,
        securitycenter::schemas,
        spanner::schemas,
        transcoder::schemas,
    ];
    let mut registry = Registry::new();
    for schemas in schemas {
        for s in schemas()? {
            registry.register(s);
        }
    }
    Ok(registry)
}

/// A request builder over [registry()] and an executor, bundled.
#[derive(Clone, Debug)]
pub struct Client {
    builder: RequestBuilder,
    executor: Executor,
}

impl Client {
    pub fn new<T: Transport + 'static>(transport: T) -> gax::Result<Self> {
        Self::with_config(transport, ClientConfig::default())
    }

    pub fn with_config<T: Transport + 'static>(
        transport: T,
        config: ClientConfig,
    ) -> gax::Result<Self> {
        let registry = registry().map_err(Error::binding)?;
        Ok(Self {
            builder: RequestBuilder::new(registry),
            executor: Executor::with_config(transport, config),
        })
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Builds and executes a request.
    pub async fn call(&self, operation: &str, resource: &str, fields: Record) -> gax::Result<Response> {
        self.call_with_options(operation, resource, fields, RequestOptions::default())
            .await
    }

    pub async fn call_with_options(
        &self,
        operation: &str,
        resource: &str,
        fields: Record,
        options: RequestOptions,
    ) -> gax::Result<Response> {
        let request = self.builder.build(operation, resource, fields)?;
        self.executor.execute_with_options(request, options).await
    }
}

pub(crate) fn emit<S: Sink + ?Sized, L: Into<String>>(sink: &mut S, line: L) -> gax::Result<()> {
    sink.write_unit(&OutputUnit::Line(line.into()))
}

/// The string value of `name`, or `""`.
pub(crate) fn text<'a>(record: &'a Record, name: &str) -> &'a str {
    record.get(name).and_then(Value::as_str).unwrap_or_default()
}

pub(crate) fn list<'a>(record: &'a Record, name: &str) -> &'a [Value] {
    record.get(name).and_then(Value::as_list).unwrap_or_default()
}

pub(crate) fn message<'a>(record: &'a Record, name: &str) -> Option<&'a Record> {
    record.get(name).and_then(Value::as_message)
}

/// The messages in the list field `name`. Other elements are skipped.
pub(crate) fn messages<'a>(record: &'a Record, name: &str) -> impl Iterator<Item = &'a Record> {
    list(record, name).iter().filter_map(Value::as_message)
}

/// Polls a long-running operation until it completes and returns its
/// response. A failed operation becomes [SampleError::OperationFailed].
pub(crate) async fn wait(client: &Client, response: Response) -> Result<Record> {
    let operation = response
        .into_operation()
        .ok_or(SampleError::UnexpectedResponse("long-running"))?;
    let operation = client.executor().poller(operation).until_done().await?;
    let name = operation.name().to_string();
    match operation.into_outcome() {
        Some(Ok(response)) => Ok(response),
        Some(Err(status)) => Err(SampleError::OperationFailed { name, status }.into()),
        None => Err(SampleError::UnexpectedResponse("completed operation").into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_has_every_sample() -> anyhow::Result<()> {
        let registry = registry()?;
        for name in [
            "RunReport",
            "InspectContent",
            "DeidentifyContent",
            "AnalyzeEntities",
            "ListNotificationConfigs",
            "CreateDatabase",
            "ExecuteSql",
            "Commit",
            "Publish",
            "CreateJob",
            "CreateInput",
            "ListChannels",
            "InsertJob",
        ] {
            assert!(registry.get(name).is_some(), "missing {name}");
        }
        Ok(())
    }

    #[test]
    fn helpers() {
        let r = adapter::value::record([
            ("name", Value::from("x")),
            ("items", Value::from(vec![Value::from(adapter::value::record([("a", 1)])), Value::from(2)])),
        ]);
        assert_eq!(text(&r, "name"), "x");
        assert_eq!(text(&r, "missing"), "");
        assert_eq!(list(&r, "items").len(), 2);
        assert_eq!(messages(&r, "items").count(), 1);
        assert!(message(&r, "name").is_none());
    }
}
