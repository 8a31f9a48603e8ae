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

//! Samples for the Sensitive Data Protection (DLP) API.

use crate::{Client, SampleError, emit, message, messages, text};
use adapter::format::OutputUnit;
use adapter::path_template::PathTemplateError;
use adapter::schema::{FieldType, MessageSchema, OperationSchema};
use adapter::sink::{Sink, read_csv_table, write_all};
use adapter::value::{Record, Value, record};
use futures::StreamExt;

const LIKELIHOOD: &[&str] = &[
    "LIKELIHOOD_UNSPECIFIED",
    "VERY_UNLIKELY",
    "UNLIKELY",
    "POSSIBLE",
    "LIKELY",
    "VERY_LIKELY",
];

const RELATIONAL_OPERATOR: &[&str] = &[
    "RELATIONAL_OPERATOR_UNSPECIFIED",
    "EQUAL_TO",
    "NOT_EQUAL_TO",
    "GREATER_THAN",
    "LESS_THAN",
    "GREATER_THAN_OR_EQUALS",
    "LESS_THAN_OR_EQUALS",
    "EXISTS",
];

fn named() -> FieldType {
    FieldType::Message(MessageSchema::new().required("name", FieldType::String))
}

fn value() -> FieldType {
    FieldType::Message(
        MessageSchema::new()
            .optional("integerValue", FieldType::Integer)
            .optional("floatValue", FieldType::Float)
            .optional("stringValue", FieldType::String)
            .optional("booleanValue", FieldType::Bool),
    )
}

fn content_item() -> FieldType {
    let row = MessageSchema::new().optional("values", FieldType::repeated(value()));
    let table = MessageSchema::new()
        .optional("headers", FieldType::repeated(named()))
        .optional("rows", FieldType::repeated(FieldType::Message(row)));
    FieldType::Message(
        MessageSchema::new()
            .optional("value", FieldType::String)
            .optional("table", FieldType::Message(table)),
    )
}

fn deidentify_config() -> FieldType {
    let condition = MessageSchema::new()
        .required("field", named())
        .required("operator", FieldType::Enum(RELATIONAL_OPERATOR))
        .optional("value", value());
    let conditions = MessageSchema::new()
        .optional("conditions", FieldType::repeated(FieldType::Message(condition)));
    let expressions = MessageSchema::new()
        .optional(
            "logicalOperator",
            FieldType::Enum(&["LOGICAL_OPERATOR_UNSPECIFIED", "AND"]),
        )
        .optional("conditions", FieldType::Message(conditions));
    let record_condition =
        MessageSchema::new().optional("expressions", FieldType::Message(expressions));
    let primitive = MessageSchema::new().optional(
        "replaceWithInfoTypeConfig",
        FieldType::Message(MessageSchema::new()),
    );
    let info_type_transformation = MessageSchema::new()
        .optional("infoTypes", FieldType::repeated(named()))
        .required("primitiveTransformation", FieldType::Message(primitive));
    let info_type_transformations = MessageSchema::new().required(
        "transformations",
        FieldType::repeated(FieldType::Message(info_type_transformation)),
    );
    let field_transformation = MessageSchema::new()
        .required("fields", FieldType::repeated(named()))
        .optional("condition", FieldType::Message(record_condition))
        .optional(
            "infoTypeTransformations",
            FieldType::Message(info_type_transformations),
        );
    let record_transformations = MessageSchema::new().optional(
        "fieldTransformations",
        FieldType::repeated(FieldType::Message(field_transformation)),
    );
    FieldType::Message(
        MessageSchema::new()
            .optional("recordTransformations", FieldType::Message(record_transformations)),
    )
}

pub fn schemas() -> Result<Vec<OperationSchema>, PathTemplateError> {
    let inspect_config = MessageSchema::new()
        .optional("infoTypes", FieldType::repeated(named()))
        .optional("minLikelihood", FieldType::Enum(LIKELIHOOD))
        .optional("includeQuote", FieldType::Bool);
    Ok(vec![
        OperationSchema::unary("InspectContent")
            .with_resource("projects/{project}/locations/{location}")?
            .optional("inspectConfig", FieldType::Message(inspect_config))
            .required("item", content_item()),
        OperationSchema::unary("DeidentifyContent")
            .with_resource("projects/{project}/locations/{location}")?
            .optional("deidentifyConfig", deidentify_config())
            .required("item", content_item()),
    ])
}

fn name(n: &str) -> Value {
    Value::from(record([("name", n)]))
}

/// Inspects a string for phone numbers.
///
/// # Parameters
/// - `project_id`: the Google Cloud project id.
/// - `text_to_inspect`: the text to inspect, for example
///   `My name is Gary and my phone number is (415) 555-0890`.
pub async fn inspect_phone_number<S: Sink + ?Sized>(
    client: &Client,
    sink: &mut S,
    project_id: &str,
    text_to_inspect: &str,
) -> crate::Result<()> {
    let response = client
        .call(
            "InspectContent",
            &format!("projects/{project_id}/locations/global"),
            record([
                ("item", Value::from(record([("value", text_to_inspect)]))),
                (
                    "inspectConfig",
                    Value::from(record([
                        ("infoTypes", Value::from(vec![name("PHONE_NUMBER")])),
                        ("includeQuote", Value::from(true)),
                        ("minLikelihood", Value::from("POSSIBLE")),
                    ])),
                ),
            ]),
        )
        .await?;
    let response = response
        .as_single()
        .ok_or(SampleError::UnexpectedResponse("single"))?;
    let empty = Record::new();
    let result = message(response, "result").unwrap_or(&empty);
    let mut findings = messages(result, "findings").peekable();
    if findings.peek().is_none() {
        emit(sink, "No findings.")?;
        return Ok(());
    }
    emit(sink, "Findings:")?;
    for finding in findings {
        let info_type = message(finding, "infoType").map(|t| text(t, "name"));
        emit(sink, format!("  Quote: {}", text(finding, "quote")))?;
        emit(sink, format!("  Info type: {}", info_type.unwrap_or_default()))?;
        emit(sink, format!("  Likelihood: {}", text(finding, "likelihood")))?;
    }
    Ok(())
}

/// De-identifies the `PATIENT` and `FACTOID` columns of a CSV table, on rows
/// where `AGE` is greater than 89, replacing person names with their info
/// type.
///
/// Reads the table from `input` and writes the de-identified table to `sink`,
/// header first. Returns the number of rows written, header included.
pub async fn deidentify_table_condition_infotypes<R, S>(
    client: &Client,
    sink: &mut S,
    project_id: &str,
    input: R,
) -> crate::Result<usize>
where
    R: std::io::Read,
    S: Sink + ?Sized,
{
    let table = read_csv_table(input)?;
    let headers = table.header.iter().map(|h| name(h)).collect::<Vec<_>>();
    let rows = table
        .rows
        .iter()
        .map(|row| {
            let values = row
                .iter()
                .map(|v| Value::from(record([("stringValue", v.as_str())])))
                .collect::<Vec<_>>();
            Value::from(record([("values", values)]))
        })
        .collect::<Vec<_>>();

    let condition = record([
        ("field", name("AGE")),
        ("operator", Value::from("GREATER_THAN")),
        ("value", Value::from(record([("integerValue", 89)]))),
    ]);
    let info_type_transformation = record([
        ("infoTypes", Value::from(vec![name("PERSON_NAME")])),
        (
            "primitiveTransformation",
            Value::from(record([("replaceWithInfoTypeConfig", Record::new())])),
        ),
    ]);
    let field_transformation = record([
        ("fields", Value::from(vec![name("PATIENT"), name("FACTOID")])),
        (
            "condition",
            Value::from(record([(
                "expressions",
                record([(
                    "conditions",
                    record([("conditions", Value::from(vec![Value::from(condition)]))]),
                )]),
            )])),
        ),
        (
            "infoTypeTransformations",
            Value::from(record([(
                "transformations",
                Value::from(vec![Value::from(info_type_transformation)]),
            )])),
        ),
    ]);
    let deidentify_config = record([(
        "recordTransformations",
        record([(
            "fieldTransformations",
            Value::from(vec![Value::from(field_transformation)]),
        )]),
    )]);
    let item = record([(
        "table",
        record([
            ("headers", Value::from(headers)),
            ("rows", Value::from(rows)),
        ]),
    )]);

    let response = client
        .call(
            "DeidentifyContent",
            &format!("projects/{project_id}/locations/global"),
            record([
                ("deidentifyConfig", deidentify_config),
                ("item", item),
            ]),
        )
        .await?;
    let response = response
        .as_single()
        .ok_or(SampleError::UnexpectedResponse("single"))?;
    let table_out = message(response, "item")
        .and_then(|item| message(item, "table"))
        .ok_or(SampleError::UnexpectedResponse("table"))?;

    let mut units = vec![OutputUnit::Row(table.header.clone())];
    units.extend(messages(table_out, "rows").map(|row| {
        OutputUnit::Row(
            messages(row, "values")
                .map(|v| text(v, "stringValue").to_string())
                .collect(),
        )
    }));
    let stream = futures::stream::iter(units.into_iter().map(Ok)).boxed();
    Ok(write_all(stream, sink).await?)
}
