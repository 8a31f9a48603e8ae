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

//! An in-memory transport for the sample tests.
//!
//! Responses are queued per operation and served in order. Listing
//! operations serve a fixed set of pages. Every call is recorded.

use adapter::request::{GET_OPERATION, Request};
use adapter::transport::{Page, Transport};
use adapter::value::{Record, Value, record};
use gax::error::Error;
use gax::error::rpc::{Code, Status};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A call received by a [FakeTransport].
#[derive(Clone, Debug, PartialEq)]
pub struct Call {
    pub operation: String,
    pub resource: String,
    pub fields: Record,
    pub page_token: Option<String>,
}

#[derive(Debug, Default)]
struct State {
    responses: HashMap<String, VecDeque<gax::Result<Record>>>,
    pages: HashMap<String, Vec<Vec<Record>>>,
    calls: Vec<Call>,
}

/// Clones share the same state.
#[derive(Clone, Debug, Default)]
pub struct FakeTransport {
    state: Arc<Mutex<State>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response for `operation`.
    pub fn with_response<T: Into<String>>(self, operation: T, response: Record) -> Self {
        self.push(operation.into(), Ok(response));
        self
    }

    /// Queues an error for `operation`.
    pub fn with_error<T: Into<String>>(self, operation: T, error: Error) -> Self {
        self.push(operation.into(), Err(error));
        self
    }

    /// Queues a response for the operation polling requests.
    pub fn with_poll(self, response: Record) -> Self {
        self.with_response(GET_OPERATION, response)
    }

    /// Serves `pages` for the listing `operation`.
    ///
    /// The token for page `i` is `page-{i}`.
    pub fn with_pages<T: Into<String>>(self, operation: T, pages: Vec<Vec<Record>>) -> Self {
        self.lock().pages.insert(operation.into(), pages);
        self
    }

    /// The calls received so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    fn push(&self, operation: String, response: gax::Result<Record>) {
        self.lock()
            .responses
            .entry(operation)
            .or_default()
            .push_back(response);
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, operation: &str, request: &Request, page_token: Option<String>) {
        self.lock().calls.push(Call {
            operation: operation.to_string(),
            resource: request.resource().to_string(),
            fields: request.to_record(),
            page_token,
        });
    }
}

fn failed_precondition(message: String) -> Error {
    Error::service(
        Status::default()
            .set_code(Code::FailedPrecondition)
            .set_message(message),
    )
}

#[async_trait::async_trait]
impl Transport for FakeTransport {
    async fn invoke(&self, operation: &str, request: &Request) -> gax::Result<Record> {
        self.record(operation, request, None);
        self.lock()
            .responses
            .get_mut(operation)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Err(failed_precondition(format!("exhausted responses for {operation}"))))
    }

    async fn fetch_page(
        &self,
        operation: &str,
        request: &Request,
        page_token: Option<String>,
    ) -> gax::Result<Page> {
        self.record(operation, request, page_token.clone());
        let state = self.lock();
        let Some(pages) = state.pages.get(operation) else {
            return Err(failed_precondition(format!("no pages for {operation}")));
        };
        let index = match page_token.as_deref() {
            None => 0,
            Some(t) => t
                .strip_prefix("page-")
                .and_then(|i| i.parse::<usize>().ok())
                .filter(|i| *i < pages.len())
                .ok_or_else(|| {
                    Error::service(
                        Status::default()
                            .set_code(Code::InvalidArgument)
                            .set_message(format!("invalid page token {t}")),
                    )
                })?,
        };
        let page = Page::new(pages.get(index).cloned().unwrap_or_default());
        if index + 1 < pages.len() {
            return Ok(page.set_next_page_token(format!("page-{}", index + 1)));
        }
        Ok(page)
    }
}

/// A raw `RUNNING` operation.
pub fn running<T: Into<String>>(name: T) -> Record {
    record([("name", Value::from(name.into()))])
}

/// A raw `RUNNING` operation with metadata.
pub fn running_with_metadata<T: Into<String>>(name: T, metadata: Record) -> Record {
    record([
        ("name", Value::from(name.into())),
        ("metadata", Value::from(metadata)),
    ])
}

/// A raw `SUCCEEDED` operation.
pub fn succeeded<T: Into<String>>(name: T, response: Record) -> Record {
    record([
        ("name", Value::from(name.into())),
        ("done", Value::from(true)),
        ("response", Value::from(response)),
    ])
}

/// A raw `FAILED` operation.
pub fn failed<T: Into<String>, M: Into<String>>(name: T, code: Code, message: M) -> Record {
    record([
        ("name", Value::from(name.into())),
        ("done", Value::from(true)),
        (
            "error",
            Value::from(record([
                ("code", Value::from(i32::from(code))),
                ("message", Value::from(message.into())),
            ])),
        ),
    ])
}
