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

//! The result formatter.
//!
//! Renders a [Response] into a stream of [OutputUnit]s. Formatting never
//! touches the network on its own: for page sequences the output stream
//! pulls the next page only when the consumer asks for more output.

use crate::Result;
use crate::response::{Operation, Response};
use crate::value::{Fields, Record, Value};
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use gax::error::Error;
use lro::OperationState;

/// How to render a response.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Style {
    /// Human-readable lines.
    #[default]
    Text,
    /// Rows of cells, suitable for CSV. The header row comes first.
    Tabular,
}

/// One unit of formatted output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputUnit {
    Line(String),
    Row(Vec<String>),
}

/// The lazy output of [format].
pub type OutputStream = BoxStream<'static, Result<OutputUnit>>;

/// The rows of a tabular rendering do not line up.
#[derive(Clone, Debug, thiserror::Error, PartialEq)]
#[non_exhaustive]
pub enum FormatError {
    #[error("row {row} has {found} fields, the header has {expected}")]
    WidthMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("row {row} has fields [{found}], the header has [{expected}]")]
    ColumnMismatch {
        row: usize,
        expected: String,
        found: String,
    },
}

/// Renders `response` in the given `style`.
///
/// # Example
/// ```
/// # use cloud_samples_adapter::format::{OutputUnit, Style, format};
/// # use cloud_samples_adapter::response::Response;
/// # use cloud_samples_adapter::value::record;
/// # use futures::StreamExt;
/// # tokio_test::block_on(async {
/// let response = Response::Single(record([("name", "Google"), ("salience", "0.8")]));
/// let lines = format(response, Style::Text).collect::<Vec<_>>().await;
/// assert_eq!(lines.len(), 2);
/// assert!(matches!(&lines[0], Ok(OutputUnit::Line(l)) if l == "name: Google"));
/// # });
/// ```
///
/// A tabular rendering whose rows do not share the header's fields yields an
/// `InvalidArgument` error at the first offending row and then ends.
pub fn format(response: Response, style: Style) -> OutputStream {
    match (response, style) {
        (Response::Single(record), Style::Text) => {
            let lines = record
                .iter()
                .map(|(name, value)| Ok(OutputUnit::Line(format!("{name}: {value}"))))
                .collect::<Vec<_>>();
            stream::iter(lines).boxed()
        }
        (Response::Single(record), Style::Tabular) => {
            tabulate(stream::once(async move { Ok(record) }).boxed())
        }
        (Response::Pages(pages), Style::Text) => pages
            .items()
            .map(|row| row.map(|r| OutputUnit::Line(line(&r))))
            .boxed(),
        (Response::Pages(pages), Style::Tabular) => tabulate(pages.items().boxed()),
        (Response::Operation(op), Style::Text) => stream::iter(operation_lines(&op)).boxed(),
        (Response::Operation(op), Style::Tabular) => {
            let (header, row) = operation_row(&op);
            stream::iter([Ok(OutputUnit::Row(header)), Ok(OutputUnit::Row(row))]).boxed()
        }
    }
}

fn line(record: &Record) -> String {
    Fields(record).to_string()
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) | Value::Enum(s) => s.clone(),
        v => v.to_string(),
    }
}

fn operation_lines(op: &Operation) -> Vec<Result<OutputUnit>> {
    let mut lines = vec![format!("operation {} is {}", op.name(), op.state())];
    match op.state() {
        OperationState::Running => {
            if let Some(m) = op.metadata() {
                lines.push(format!("metadata: {}", Value::Message(m.clone())));
            }
        }
        OperationState::Succeeded => {
            if let Some(r) = op.response() {
                lines.extend(r.iter().map(|(name, value)| format!("{name}: {value}")));
            }
        }
        OperationState::Failed => {
            if let Some(s) = op.error() {
                lines.push(format!("error {}: {}", s.code, s.message));
            }
        }
    }
    lines.into_iter().map(|l| Ok(OutputUnit::Line(l))).collect()
}

fn operation_row(op: &Operation) -> (Vec<String>, Vec<String>) {
    let mut header = vec!["name".to_string(), "state".to_string()];
    let mut row = vec![op.name().to_string(), op.state().name().to_string()];
    if let Some(r) = op.response() {
        header.extend(r.keys().cloned());
        row.extend(r.values().map(cell));
    }
    if let Some(s) = op.error() {
        header.push("error".to_string());
        row.push(format!("{}: {}", s.code, s.message));
    }
    (header, row)
}

struct Tabulator {
    rows: BoxStream<'static, Result<Record>>,
    header: Option<Vec<String>>,
    queued: Option<Vec<String>>,
    count: usize,
}

impl Tabulator {
    async fn next(&mut self) -> Option<Result<OutputUnit>> {
        if let Some(row) = self.queued.take() {
            return Some(Ok(OutputUnit::Row(row)));
        }
        let record = match self.rows.next().await? {
            Ok(r) => r,
            Err(e) => return Some(Err(e)),
        };
        self.count += 1;
        let cells = record.values().map(cell).collect::<Vec<_>>();
        let Some(header) = &self.header else {
            let header = record.keys().cloned().collect::<Vec<_>>();
            self.header = Some(header.clone());
            self.queued = Some(cells);
            return Some(Ok(OutputUnit::Row(header)));
        };
        if let Err(e) = check_columns(self.count, header, &record) {
            return Some(Err(Error::format(e)));
        }
        Some(Ok(OutputUnit::Row(cells)))
    }
}

fn check_columns(row: usize, header: &[String], record: &Record) -> std::result::Result<(), FormatError> {
    if header.len() != record.len() {
        return Err(FormatError::WidthMismatch {
            row,
            expected: header.len(),
            found: record.len(),
        });
    }
    if !header.iter().eq(record.keys()) {
        return Err(FormatError::ColumnMismatch {
            row,
            expected: header.join(","),
            found: record.keys().cloned().collect::<Vec<_>>().join(","),
        });
    }
    Ok(())
}

/// Streams `rows` as a header followed by one row per record.
///
/// The first error ends the stream without pulling more rows.
fn tabulate(rows: BoxStream<'static, Result<Record>>) -> OutputStream {
    let state = Tabulator {
        rows,
        header: None,
        queued: None,
        count: 0,
    };
    stream::unfold(Some(state), |state| async move {
        let mut state = state?;
        match state.next().await? {
            Ok(unit) => Some((Ok(unit), Some(state))),
            Err(e) => {
                tracing::debug!("tabular output stopped: {e}");
                Some((Err(e), None))
            }
        }
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::PageSequence;
    use crate::transport::Page;
    use crate::value::record;
    use gax::error::rpc::{Code, Status};
    use gax::paginator::Paginator;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    fn row(cells: &[&str]) -> OutputUnit {
        OutputUnit::Row(cells.iter().map(|c| c.to_string()).collect())
    }

    fn line(l: &str) -> OutputUnit {
        OutputUnit::Line(l.to_string())
    }

    fn pages(first: Page, rest: Vec<Result<Page>>) -> (Arc<Mutex<usize>>, Response) {
        let fetches = Arc::new(Mutex::new(0_usize));
        let counter = fetches.clone();
        let rest = Arc::new(Mutex::new(VecDeque::from(rest)));
        let execute = move |_token: String| {
            let counter = counter.clone();
            let rest = rest.clone();
            async move {
                *counter.lock().unwrap() += 1;
                rest.lock().unwrap().pop_front().unwrap_or_else(|| Ok(Page::default()))
            }
        };
        let pages = PageSequence::new(Paginator::resume(first, execute));
        (fetches, Response::Pages(pages))
    }

    async fn collect(stream: OutputStream) -> Vec<Result<OutputUnit>> {
        stream.collect().await
    }

    #[tokio::test]
    async fn single_text() -> anyhow::Result<()> {
        let response = Response::Single(record([
            ("name", Value::from("Google")),
            ("type", Value::Enum("ORGANIZATION".into())),
            ("metadata", Value::from(record([("mid", "/m/045c7b")]))),
        ]));
        let got = collect(format(response, Style::Text))
            .await
            .into_iter()
            .collect::<Result<Vec<_>>>()?;
        assert_eq!(
            got,
            vec![
                line("name: Google"),
                line("type: ORGANIZATION"),
                line("metadata: {mid: /m/045c7b}"),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn single_tabular() -> anyhow::Result<()> {
        let response = Response::Single(record([("a", Value::from(1)), ("b", Value::Null)]));
        let got = collect(format(response, Style::Tabular))
            .await
            .into_iter()
            .collect::<Result<Vec<_>>>()?;
        assert_eq!(got, vec![row(&["a", "b"]), row(&["1", ""])]);
        Ok(())
    }

    #[tokio::test]
    async fn pages_text() -> anyhow::Result<()> {
        let (fetches, response) = pages(
            Page::new([record([("id", 1), ("n", 10)])]).set_next_page_token("t1"),
            vec![Ok(Page::new([record([("id", 2), ("n", 20)])]))],
        );
        let mut stream = format(response, Style::Text);
        let first = stream.next().await.transpose()?;
        assert_eq!(first, Some(line("id: 1, n: 10")));
        assert_eq!(*fetches.lock().unwrap(), 0);
        let second = stream.next().await.transpose()?;
        assert_eq!(second, Some(line("id: 2, n: 20")));
        assert_eq!(*fetches.lock().unwrap(), 1);
        assert!(stream.next().await.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn pages_tabular() -> anyhow::Result<()> {
        let (_, response) = pages(
            Page::new([record([("id", 1), ("n", 10)]), record([("id", 2), ("n", 20)])])
                .set_next_page_token("t1"),
            vec![Ok(Page::new([record([("id", 3), ("n", 30)])]))],
        );
        let got = collect(format(response, Style::Tabular))
            .await
            .into_iter()
            .collect::<Result<Vec<_>>>()?;
        assert_eq!(
            got,
            vec![
                row(&["id", "n"]),
                row(&["1", "10"]),
                row(&["2", "20"]),
                row(&["3", "30"]),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn empty_pages() {
        let (_, response) = pages(Page::default(), vec![]);
        assert!(collect(format(response, Style::Tabular)).await.is_empty());
        let (_, response) = pages(Page::default(), vec![]);
        assert!(collect(format(response, Style::Text)).await.is_empty());
    }

    #[tokio::test]
    async fn width_mismatch_stops_without_fetching() {
        let (fetches, response) = pages(
            Page::new([record([("id", 1), ("n", 10)]), record([("id", 2)])])
                .set_next_page_token("t1"),
            vec![Ok(Page::new([record([("id", 3), ("n", 30)])]))],
        );
        let got = collect(format(response, Style::Tabular)).await;
        assert_eq!(got.len(), 3, "{got:?}");
        let err = got.last().and_then(|r| r.as_ref().err());
        assert!(matches!(err, Some(e) if e.code() == Code::InvalidArgument), "{err:?}");
        assert_eq!(
            err.and_then(|e| e.as_inner::<FormatError>()),
            Some(&FormatError::WidthMismatch {
                row: 2,
                expected: 2,
                found: 1
            })
        );
        assert_eq!(*fetches.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn column_mismatch() {
        let (_, response) = pages(
            Page::new([record([("id", 1), ("n", 10)]), record([("id", 2), ("m", 20)])]),
            vec![],
        );
        let got = collect(format(response, Style::Tabular)).await;
        let err = got.last().and_then(|r| r.as_ref().err());
        assert!(
            matches!(
                err.and_then(|e| e.as_inner::<FormatError>()),
                Some(FormatError::ColumnMismatch { row: 2, .. })
            ),
            "{got:?}"
        );
    }

    #[tokio::test]
    async fn page_error_ends_stream() {
        let (_, response) = pages(
            Page::new([record([("id", 1)])]).set_next_page_token("t1"),
            vec![Err(Error::io("connection reset"))],
        );
        let got = collect(format(response, Style::Text)).await;
        assert_eq!(got.len(), 2, "{got:?}");
        assert!(matches!(&got[1], Err(e) if e.is_io()), "{got:?}");
    }

    #[tokio::test]
    async fn operation_text() -> anyhow::Result<()> {
        let op = Operation::succeeded("operations/1", record([("state", "READY")]));
        let got = collect(format(Response::Operation(op), Style::Text))
            .await
            .into_iter()
            .collect::<Result<Vec<_>>>()?;
        assert_eq!(
            got,
            vec![line("operation operations/1 is SUCCEEDED"), line("state: READY")]
        );

        let op = Operation::failed(
            "operations/2",
            Status::default()
                .set_code(Code::AlreadyExists)
                .set_message("database exists"),
        );
        let got = collect(format(Response::Operation(op), Style::Text))
            .await
            .into_iter()
            .collect::<Result<Vec<_>>>()?;
        assert_eq!(
            got,
            vec![
                line("operation operations/2 is FAILED"),
                line("error ALREADY_EXISTS: database exists"),
            ]
        );

        let op = Operation::running("operations/3").set_metadata(record([("progress", 50)]));
        let got = collect(format(Response::Operation(op), Style::Text))
            .await
            .into_iter()
            .collect::<Result<Vec<_>>>()?;
        assert_eq!(
            got,
            vec![
                line("operation operations/3 is RUNNING"),
                line("metadata: {progress: 50}"),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn operation_tabular() -> anyhow::Result<()> {
        let op = Operation::succeeded("operations/1", record([("database", "db1")]));
        let got = collect(format(Response::Operation(op), Style::Tabular))
            .await
            .into_iter()
            .collect::<Result<Vec<_>>>()?;
        assert_eq!(
            got,
            vec![
                row(&["name", "state", "database"]),
                row(&["operations/1", "SUCCEEDED", "db1"]),
            ]
        );

        let op = Operation::failed("operations/2", Status::default().set_code(Code::Aborted));
        let got = collect(format(Response::Operation(op), Style::Tabular))
            .await
            .into_iter()
            .collect::<Result<Vec<_>>>()?;
        assert_eq!(
            got,
            vec![
                row(&["name", "state", "error"]),
                row(&["operations/2", "FAILED", "ABORTED: "]),
            ]
        );
        Ok(())
    }
}
