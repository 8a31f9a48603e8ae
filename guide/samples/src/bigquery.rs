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

//! Samples for BigQuery load jobs.

use crate::{Client, emit, wait};
use adapter::path_template::PathTemplateError;
use adapter::schema::{FieldType, MessageSchema, OperationSchema};
use adapter::sink::{Sink, read_csv_table};
use adapter::value::{Value, record};

pub fn schemas() -> Result<Vec<OperationSchema>, PathTemplateError> {
    let table = MessageSchema::new()
        .required("projectId", FieldType::String)
        .required("datasetId", FieldType::String)
        .required("tableId", FieldType::String);
    let field = MessageSchema::new()
        .required("name", FieldType::String)
        .required(
            "type",
            FieldType::Enum(&["STRING", "INTEGER", "FLOAT", "BOOLEAN", "TIMESTAMP"]),
        )
        .optional(
            "mode",
            FieldType::Enum(&["NULLABLE", "REQUIRED", "REPEATED"]),
        );
    let load = MessageSchema::new()
        .required("destinationTable", FieldType::Message(table))
        .optional(
            "schema",
            FieldType::Message(
                MessageSchema::new()
                    .required("fields", FieldType::repeated(FieldType::Message(field))),
            ),
        )
        .optional(
            "schemaUpdateOptions",
            FieldType::repeated(FieldType::Enum(&[
                "ALLOW_FIELD_ADDITION",
                "ALLOW_FIELD_RELAXATION",
            ])),
        )
        .optional(
            "sourceFormat",
            FieldType::Enum(&["CSV", "NEWLINE_DELIMITED_JSON", "AVRO", "PARQUET"]),
        )
        .optional(
            "writeDisposition",
            FieldType::Enum(&["WRITE_TRUNCATE", "WRITE_APPEND", "WRITE_EMPTY"]),
        )
        .optional("skipLeadingRows", FieldType::Integer);
    Ok(vec![
        OperationSchema::long_running("InsertJob")
            .with_resource("projects/{project}")?
            .required(
                "configuration",
                FieldType::Message(MessageSchema::new().required("load", FieldType::Message(load))),
            )
            .required(
                "rows",
                FieldType::repeated(FieldType::repeated(FieldType::String)),
            ),
    ])
}

/// Appends the rows of a CSV file to a table, adding any columns in the
/// file header that the table does not have yet.
///
/// Every column is loaded as a nullable `STRING`.
pub async fn add_column_load_append<S: Sink + ?Sized, R: std::io::Read>(
    client: &Client,
    sink: &mut S,
    project_id: &str,
    dataset_id: &str,
    table_id: &str,
    input: R,
) -> crate::Result<()> {
    let table = read_csv_table(input)?;
    let fields = table
        .header
        .iter()
        .map(|name| {
            Value::from(record([
                ("name", name.to_lowercase()),
                ("type", "STRING".to_string()),
                ("mode", "NULLABLE".to_string()),
            ]))
        })
        .collect::<Vec<_>>();
    let load = record([
        (
            "destinationTable",
            Value::from(record([
                ("projectId", project_id),
                ("datasetId", dataset_id),
                ("tableId", table_id),
            ])),
        ),
        ("schema", Value::from(record([("fields", fields)]))),
        (
            "schemaUpdateOptions",
            Value::from(vec![Value::from("ALLOW_FIELD_ADDITION")]),
        ),
        ("sourceFormat", Value::from("CSV")),
        ("writeDisposition", Value::from("WRITE_APPEND")),
    ]);
    let rows = table
        .rows
        .into_iter()
        .map(|row| Value::from(row.into_iter().map(Value::from).collect::<Vec<_>>()))
        .collect::<Vec<_>>();
    let response = client
        .call(
            "InsertJob",
            &format!("projects/{project_id}"),
            record([
                ("configuration", Value::from(record([("load", load)]))),
                ("rows", Value::from(rows)),
            ]),
        )
        .await?;
    wait(client, response).await?;
    emit(sink, "Success")?;
    Ok(())
}
