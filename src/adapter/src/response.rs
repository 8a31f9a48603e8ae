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

//! The three shapes of a response.

use crate::Result;
use crate::transport::Page;
use crate::value::{Record, Value};
use futures::{Stream, StreamExt};
use gax::error::Error;
use gax::error::rpc::{Code, Status};
use gax::paginator::{ItemPaginator, Paginator};
use pin_project::pin_project;
use std::pin::Pin;

/// A long-running operation whose response and metadata are records.
pub type Operation = lro::Operation<Record, Record>;

/// The result of [Executor::execute][crate::executor::Executor::execute].
#[derive(Debug)]
pub enum Response {
    /// The result of a unary operation.
    Single(Record),
    /// The pages of a listing operation.
    Pages(PageSequence),
    /// The handle for a long-running operation.
    Operation(Operation),
}

impl Response {
    pub fn as_single(&self) -> Option<&Record> {
        match self {
            Self::Single(r) => Some(r),
            _ => None,
        }
    }

    pub fn into_pages(self) -> Option<PageSequence> {
        match self {
            Self::Pages(p) => Some(p),
            _ => None,
        }
    }

    pub fn into_operation(self) -> Option<Operation> {
        match self {
            Self::Operation(o) => Some(o),
            _ => None,
        }
    }
}

/// A lazy, forward-only sequence of pages.
///
/// The first page was fetched by the executor. Each later page is fetched
/// only when the consumer asks for it, so the sequence never holds more than
/// one page ahead of the consumer. The sequence cannot be restarted. Dropping
/// it abandons the listing without contacting the service.
#[pin_project]
pub struct PageSequence {
    #[pin]
    inner: Paginator<Page, Error>,
}

impl PageSequence {
    pub(crate) fn new(inner: Paginator<Page, Error>) -> Self {
        Self { inner }
    }

    /// Returns the next page, or `None` after the last page.
    ///
    /// A fetch error is returned once and ends the sequence.
    pub fn next(&mut self) -> futures::stream::Next<'_, Self> {
        StreamExt::next(self)
    }

    /// Flattens the pages into a stream of rows.
    pub fn items(self) -> ItemPaginator<Record, Error> {
        self.inner.items()
    }
}

impl std::fmt::Debug for PageSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageSequence").finish_non_exhaustive()
    }
}

impl Stream for PageSequence {
    type Item = Result<Page>;

    fn poll_next(
        self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        self.project().inner.poll_next(cx)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid operation: {0}")]
struct InvalidOperation(&'static str);

/// Decodes a raw `google.longrunning.Operation`.
///
/// A completed operation must set exactly one of `response` or `error`,
/// anything else is a deserialization error.
pub(crate) fn decode_operation(mut raw: Record) -> Result<Operation> {
    let name = match raw.shift_remove("name") {
        Some(Value::String(s)) => s,
        None | Some(Value::Null) => String::new(),
        Some(_) => return Err(Error::deser(InvalidOperation("`name` is not a string"))),
    };
    let done = match raw.shift_remove("done") {
        Some(Value::Bool(b)) => b,
        None | Some(Value::Null) => false,
        Some(_) => return Err(Error::deser(InvalidOperation("`done` is not a bool"))),
    };
    let metadata = match raw.shift_remove("metadata") {
        Some(Value::Message(m)) => Some(m),
        None | Some(Value::Null) => None,
        Some(_) => return Err(Error::deser(InvalidOperation("`metadata` is not a message"))),
    };
    if !done {
        if name.is_empty() {
            return Err(Error::deser(InvalidOperation(
                "a running operation must have a name",
            )));
        }
        return Ok(Operation::running(name).set_metadata(metadata));
    }
    let response = raw.shift_remove("response").filter(|v| !v.is_null());
    let error = raw.shift_remove("error").filter(|v| !v.is_null());
    let operation = match (response, error) {
        (Some(Value::Message(r)), None) => Operation::succeeded(name, r),
        (None, Some(Value::Message(e))) => Operation::failed(name, decode_status(e)?),
        (None, None) => {
            return Err(Error::deser(InvalidOperation(
                "neither result nor error set in a completed operation",
            )));
        }
        (Some(_), Some(_)) => {
            return Err(Error::deser(InvalidOperation(
                "both result and error set in a completed operation",
            )));
        }
        _ => {
            return Err(Error::deser(InvalidOperation(
                "`response` and `error` must be messages",
            )));
        }
    };
    Ok(operation.set_metadata(metadata))
}

fn decode_status(mut raw: Record) -> Result<Status> {
    let code = match raw.shift_remove("code") {
        Some(Value::Integer(i)) => Code::from(i32::try_from(i).unwrap_or(-1)),
        Some(Value::String(s)) | Some(Value::Enum(s)) => {
            Code::try_from(s.as_str()).unwrap_or_default()
        }
        None | Some(Value::Null) => Code::default(),
        Some(_) => return Err(Error::deser(InvalidOperation("`error.code` is not a code"))),
    };
    let message = match raw.shift_remove("message") {
        Some(Value::String(s)) => s,
        _ => String::new(),
    };
    Ok(Status::default().set_code(code).set_message(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::record;
    use lro::OperationState;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test]
    fn running() -> anyhow::Result<()> {
        let op = decode_operation(record([
            ("name", Value::from("operations/123")),
            ("metadata", Value::from(record([("progressPercent", 10)]))),
        ]))?;
        assert_eq!(op.state(), OperationState::Running);
        assert_eq!(op.name(), "operations/123");
        assert_eq!(op.metadata(), Some(&record([("progressPercent", 10)])));
        Ok(())
    }

    #[test]
    fn succeeded() -> anyhow::Result<()> {
        let op = decode_operation(record([
            ("name", Value::from("operations/123")),
            ("done", Value::from(true)),
            ("response", Value::from(record([("state", "READY")]))),
        ]))?;
        assert_eq!(op.state(), OperationState::Succeeded);
        assert_eq!(op.response(), Some(&record([("state", "READY")])));
        Ok(())
    }

    #[test_case(Value::from(7), Code::PermissionDenied)]
    #[test_case(Value::from("NOT_FOUND"), Code::NotFound)]
    #[test_case(Value::from(99), Code::Unknown)]
    fn failed(code: Value, want: Code) -> anyhow::Result<()> {
        let op = decode_operation(record([
            ("name", Value::from("operations/123")),
            ("done", Value::from(true)),
            (
                "error",
                Value::from(record([("code", code), ("message", Value::from("denied"))])),
            ),
        ]))?;
        assert_eq!(op.state(), OperationState::Failed);
        let want = Status::default().set_code(want).set_message("denied");
        assert_eq!(op.error(), Some(&want));
        Ok(())
    }

    #[test_case(record([("name", Value::from("op")), ("done", Value::from(true))]); "neither")]
    #[test_case(record([
        ("name", Value::from("op")),
        ("done", Value::from(true)),
        ("response", Value::from(Record::new())),
        ("error", Value::from(Record::new())),
    ]); "both")]
    #[test_case(record([("done", Value::from(false))]); "running without name")]
    #[test_case(record([("name", Value::from(1))]); "bad name")]
    #[test_case(record([("name", Value::from("op")), ("done", Value::from("yes"))]); "bad done")]
    #[test_case(record([
        ("name", Value::from("op")),
        ("done", Value::from(true)),
        ("response", Value::from("READY")),
    ]); "scalar response")]
    fn invalid(raw: Record) {
        let got = decode_operation(raw);
        assert!(matches!(&got, Err(e) if e.is_deserialization()), "{got:?}");
    }

    #[test]
    fn response_accessors() {
        let r = Response::Single(record([("a", 1)]));
        assert!(r.as_single().is_some());
        assert!(r.into_operation().is_none());
        let r = Response::Operation(Operation::running("operations/1"));
        assert!(r.as_single().is_none());
        assert!(r.into_operation().is_some());
    }
}
