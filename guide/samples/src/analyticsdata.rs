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

//! Samples for the Google Analytics Data API.

use crate::{Client, SampleError, emit, list, messages, text};
use adapter::path_template::PathTemplateError;
use adapter::schema::{FieldType, MessageSchema, OperationSchema};
use adapter::sink::Sink;
use adapter::value::{Record, Value, record};

const METRIC_AGGREGATIONS: &[&str] = &[
    "METRIC_AGGREGATION_UNSPECIFIED",
    "TOTAL",
    "MINIMUM",
    "MAXIMUM",
    "COUNT",
];

pub fn schemas() -> Result<Vec<OperationSchema>, PathTemplateError> {
    let named = MessageSchema::new().required("name", FieldType::String);
    let date_range = MessageSchema::new()
        .required("startDate", FieldType::String)
        .required("endDate", FieldType::String)
        .optional("name", FieldType::String);
    Ok(vec![
        OperationSchema::unary("RunReport")
            .with_resource("properties/{property}")?
            .optional("dimensions", FieldType::repeated(FieldType::Message(named.clone())))
            .optional("metrics", FieldType::repeated(FieldType::Message(named)))
            .optional("dateRanges", FieldType::repeated(FieldType::Message(date_range)))
            .optional("limit", FieldType::Integer)
            .optional(
                "metricAggregations",
                FieldType::repeated(FieldType::Enum(METRIC_AGGREGATIONS)),
            ),
    ])
}

/// Runs a report of sessions by country over the last year, including the
/// total, maximum and minimum of the metric.
///
/// # Parameters
/// - `property_id`: the Google Analytics property, for example `1234567`.
pub async fn run_report_with_aggregations<S: Sink + ?Sized>(
    client: &Client,
    sink: &mut S,
    property_id: &str,
) -> crate::Result<()> {
    let named = |n: &str| Value::from(record([("name", n)]));
    let response = client
        .call(
            "RunReport",
            &format!("properties/{property_id}"),
            record([
                ("dimensions", Value::from(vec![named("country")])),
                ("metrics", Value::from(vec![named("sessions")])),
                (
                    "dateRanges",
                    Value::from(vec![Value::from(record([
                        ("startDate", "365daysAgo"),
                        ("endDate", "today"),
                    ]))]),
                ),
                (
                    "metricAggregations",
                    Value::from(vec![
                        Value::from("TOTAL"),
                        Value::from("MAXIMUM"),
                        Value::from("MINIMUM"),
                    ]),
                ),
            ]),
        )
        .await?;
    let report = response
        .as_single()
        .ok_or(SampleError::UnexpectedResponse("single"))?;
    print_report(sink, report)?;
    Ok(())
}

fn print_report<S: Sink + ?Sized>(sink: &mut S, report: &Record) -> gax::Result<()> {
    let row_count = report.get("rowCount").and_then(Value::as_i64).unwrap_or_default();
    emit(sink, format!("{row_count} rows received"))?;
    for header in messages(report, "dimensionHeaders") {
        emit(sink, format!("Dimension header name: {}", text(header, "name")))?;
    }
    for header in messages(report, "metricHeaders") {
        emit(
            sink,
            format!(
                "Metric header name: {} ({})",
                text(header, "name"),
                text(header, "type")
            ),
        )?;
    }
    emit(sink, "Report result: ")?;
    for row in messages(report, "rows") {
        let first = |name: &str| {
            list(row, name)
                .first()
                .and_then(Value::as_message)
                .map(|v| text(v, "value"))
                .unwrap_or_default()
                .to_string()
        };
        emit(sink, format!("{} {}", first("dimensionValues"), first("metricValues")))?;
    }
    Ok(())
}
