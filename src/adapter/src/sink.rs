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

//! Output sinks for formatted results, and CSV input tables.

use crate::Result;
use crate::format::{OutputStream, OutputUnit};
use crate::value::{Record, Value};
use futures::StreamExt;
use gax::error::Error;
use std::io::Write;

#[derive(Debug, thiserror::Error)]
enum SinkError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<SinkError> for Error {
    fn from(value: SinkError) -> Self {
        Error::io(value)
    }
}

/// Receives formatted output, one unit at a time.
pub trait Sink {
    fn write_unit(&mut self, unit: &OutputUnit) -> Result<()>;

    fn flush(&mut self) -> Result<()>;
}

/// Writes lines of text. Rows are written comma separated.
#[derive(Debug)]
pub struct TextSink<W> {
    writer: W,
}

impl<W: Write> TextSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Sink for TextSink<W> {
    fn write_unit(&mut self, unit: &OutputUnit) -> Result<()> {
        match unit {
            OutputUnit::Line(l) => writeln!(self.writer, "{l}"),
            OutputUnit::Row(cells) => writeln!(self.writer, "{}", cells.join(",")),
        }
        .map_err(SinkError::from)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(SinkError::from)?;
        Ok(())
    }
}

/// Writes rows as CSV records. Lines become single-column records.
#[derive(Debug)]
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new().flexible(true).from_writer(writer),
        }
    }

    /// Flushes buffered records and returns the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| Error::io(e.into_error()))
    }
}

impl<W: Write> Sink for CsvSink<W> {
    fn write_unit(&mut self, unit: &OutputUnit) -> Result<()> {
        match unit {
            OutputUnit::Line(l) => self.writer.write_record([l]),
            OutputUnit::Row(cells) => self.writer.write_record(cells),
        }
        .map_err(SinkError::from)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(SinkError::from)?;
        Ok(())
    }
}

/// Drains `stream` into `sink`, returning the number of units written.
///
/// Stops at the first error from the stream or the sink. Units written
/// before the error stay written.
pub async fn write_all<S: Sink + ?Sized>(mut stream: OutputStream, sink: &mut S) -> Result<usize> {
    let mut count = 0;
    while let Some(unit) = stream.next().await {
        sink.write_unit(&unit?)?;
        count += 1;
    }
    sink.flush()?;
    tracing::debug!(units = count, "output written");
    Ok(count)
}

/// A table loaded from CSV: a header and rows of string cells.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CsvTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// The rows as records keyed by the header.
    pub fn records(&self) -> impl Iterator<Item = Record> + '_ {
        self.rows.iter().map(|row| {
            self.header
                .iter()
                .cloned()
                .zip(row.iter().cloned().map(Value::String))
                .collect()
        })
    }
}

/// Reads a CSV table whose first record is the header.
///
/// Every row must have as many cells as the header. Malformed input is an
/// `InvalidArgument` error.
pub fn read_csv_table<R: std::io::Read>(reader: R) -> Result<CsvTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);
    let header = reader
        .headers()
        .map_err(Error::binding)?
        .iter()
        .map(str::to_string)
        .collect();
    let rows = reader
        .records()
        .map(|r| r.map(|r| r.iter().map(str::to_string).collect()))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(Error::binding)?;
    Ok(CsvTable { header, rows })
}
