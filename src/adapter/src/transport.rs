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

//! The transport contract.
//!
//! The executor knows nothing about HTTP, gRPC, or credentials. It talks to
//! the service through a [Transport], supplied by the application. Tests
//! substitute an in-memory implementation.

use crate::Result;
use crate::request::Request;
use crate::value::Record;
use gax::paginator::PageableResponse;

/// Performs the network round trips for the executor.
///
/// Implementations report failures with the [gax::error::Error]
/// constructors: [io][gax::error::Error::io] or
/// [timeout][gax::error::Error::timeout] for transport failures, and
/// [service][gax::error::Error::service] for errors reported by the remote
/// service. Retry policies, if any, are the transport's concern.
#[async_trait::async_trait]
pub trait Transport: std::fmt::Debug + Send + Sync {
    /// Invokes `operation` and returns the raw result.
    ///
    /// For long-running operations the raw result has the shape of a
    /// `google.longrunning.Operation`: `name`, `done`, `metadata`, and either
    /// `response` or `error`. Polling uses this method with
    /// [GET_OPERATION][crate::request::GET_OPERATION].
    async fn invoke(&self, operation: &str, request: &Request) -> Result<Record>;

    /// Fetches one page of a listing operation.
    ///
    /// `page_token` is `None` for the first page, and the token returned by
    /// the previous page otherwise.
    async fn fetch_page(
        &self,
        operation: &str,
        request: &Request,
        page_token: Option<String>,
    ) -> Result<Page>;
}

/// One page of results from a listing operation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    /// The rows in this page, in service order.
    pub rows: Vec<Record>,
    /// The continuation token. `None` or empty on the last page.
    pub next_page_token: Option<String>,
}

impl Page {
    pub fn new<I: IntoIterator<Item = Record>>(rows: I) -> Self {
        Self {
            rows: rows.into_iter().collect(),
            next_page_token: None,
        }
    }

    /// Sets the value of [next_page_token][Page::next_page_token].
    pub fn set_next_page_token<T: Into<String>>(mut self, v: T) -> Self {
        self.next_page_token = Some(v.into());
        self
    }

    /// Returns true if there are no pages after this one.
    pub fn is_last(&self) -> bool {
        self.next_page_token.as_deref().is_none_or(str::is_empty)
    }
}

impl PageableResponse for Page {
    type PageItem = Record;

    fn items(self) -> Vec<Record> {
        self.rows
    }

    fn next_page_token(&self) -> String {
        self.next_page_token.clone().unwrap_or_default()
    }
}
