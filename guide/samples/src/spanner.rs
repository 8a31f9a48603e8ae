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

//! Samples for Cloud Spanner database administration.

use crate::{Client, SampleError, emit, list, message, messages, text, wait};
use adapter::path_template::PathTemplateError;
use adapter::schema::{FieldType, MessageSchema, OperationSchema};
use adapter::sink::Sink;
use adapter::value::{Record, Value, record};
use gax::error::rpc::Code;

const SINGERS: &str = r#"CREATE TABLE Singers (
    SingerId     INT64 NOT NULL,
    FirstName    STRING(1024),
    LastName     STRING(1024),
    SingerInfo   BYTES(MAX),
    FullName     STRING(2048) AS
    (ARRAY_TO_STRING([FirstName, LastName], " ")) STORED
) PRIMARY KEY (SingerId)"#;

const ALBUMS: &str = r#"CREATE TABLE Albums (
    SingerId     INT64 NOT NULL,
    AlbumId      INT64 NOT NULL,
    AlbumTitle   STRING(MAX)
) PRIMARY KEY (SingerId, AlbumId),
INTERLEAVE IN PARENT Singers ON DELETE CASCADE"#;

const INSERT_RETURNING: &str = "INSERT INTO Singers (SingerId, FirstName, LastName) \
    VALUES (12, 'Melissa', 'Garcia'), \
    (13, 'Russell', 'Morales'), \
    (14, 'Jacqueline', 'Long'), \
    (15, 'Dylan', 'Shaw') \
    THEN RETURN FullName";

const DATABASE: &str = "projects/{project}/instances/{instance}/databases/{database}";

pub fn schemas() -> Result<Vec<OperationSchema>, PathTemplateError> {
    let begin = MessageSchema::new().optional("readWrite", FieldType::Message(MessageSchema::new()));
    let transaction = MessageSchema::new()
        .optional("id", FieldType::String)
        .optional("begin", FieldType::Message(begin));
    Ok(vec![
        OperationSchema::unary("ExecuteSql")
            .with_resource(DATABASE)?
            .required("sql", FieldType::String)
            .optional("transaction", FieldType::Message(transaction)),
        OperationSchema::unary("Commit")
            .with_resource(DATABASE)?
            .required("transactionId", FieldType::String),
        OperationSchema::unary("GetInstance").with_resource("projects/{project}/instances/{instance}")?,
        OperationSchema::long_running("CreateDatabase")
            .with_resource("projects/{project}/instances/{instance}")?
            .required("createStatement", FieldType::String)
            .optional("extraStatements", FieldType::repeated(FieldType::String))
            .optional(
                "databaseDialect",
                FieldType::Enum(&["DATABASE_DIALECT_UNSPECIFIED", "GOOGLE_STANDARD_SQL", "POSTGRESQL"]),
            ),
    ])
}

/// Creates a database with the `Singers` and `Albums` tables and waits for
/// the operation to complete.
///
/// Fails if the instance does not exist.
pub async fn create_database<S: Sink + ?Sized>(
    client: &Client,
    sink: &mut S,
    project_id: &str,
    instance_id: &str,
    database_id: &str,
) -> crate::Result<()> {
    let instance = format!("projects/{project_id}/instances/{instance_id}");
    match client.call("GetInstance", &instance, Record::new()).await {
        Ok(_) => {}
        Err(e) if e.code() == Code::NotFound => {
            return Err(SampleError::MissingInstance(instance_id.to_string()).into());
        }
        Err(e) => return Err(e.into()),
    }

    let response = client
        .call(
            "CreateDatabase",
            &instance,
            record([
                (
                    "createStatement",
                    Value::from(format!("CREATE DATABASE `{database_id}`")),
                ),
                (
                    "extraStatements",
                    Value::from(vec![Value::from(SINGERS), Value::from(ALBUMS)]),
                ),
            ]),
        )
        .await?;
    emit(sink, "Waiting for operation to complete...")?;
    wait(client, response).await?;
    emit(
        sink,
        format!("Created database {database_id} on instance {instance_id}"),
    )?;
    Ok(())
}

/// Inserts four singers in a read-write transaction and prints the generated
/// `FullName` of each inserted row, then the number of inserted rows.
pub async fn insert_dml_returning<S: Sink + ?Sized>(
    client: &Client,
    sink: &mut S,
    project_id: &str,
    instance_id: &str,
    database_id: &str,
) -> crate::Result<()> {
    let database = format!("projects/{project_id}/instances/{instance_id}/databases/{database_id}");
    let begin = record([("readWrite", Record::new())]);
    let response = client
        .call(
            "ExecuteSql",
            &database,
            record([
                ("sql", Value::from(INSERT_RETURNING)),
                ("transaction", Value::from(record([("begin", begin)]))),
            ]),
        )
        .await?;
    let result = response
        .as_single()
        .ok_or(SampleError::UnexpectedResponse("single"))?;

    let metadata = message(result, "metadata");
    let column = metadata
        .and_then(|m| message(m, "rowType"))
        .and_then(|t| messages(t, "fields").position(|f| text(f, "name") == "FullName"))
        .ok_or(SampleError::UnexpectedResponse("FullName result set"))?;
    for row in list(result, "rows") {
        let name = row
            .as_list()
            .and_then(|values| values.get(column))
            .and_then(Value::as_str)
            .unwrap_or_default();
        emit(sink, format!("{name} inserted."))?;
    }
    // int64 values are encoded as JSON strings.
    let count = message(result, "stats")
        .and_then(|stats| stats.get("rowCountExact"))
        .and_then(|v| v.as_i64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
        .ok_or(SampleError::UnexpectedResponse("DML statistics"))?;
    emit(sink, format!("Inserted row(s) count: {count}"))?;

    let transaction_id = metadata
        .and_then(|m| message(m, "transaction"))
        .map(|t| text(t, "id"))
        .unwrap_or_default();
    client
        .call(
            "Commit",
            &database,
            record([("transactionId", transaction_id)]),
        )
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{self, FakeTransport};
    use adapter::request::GET_OPERATION;
    use adapter::sink::TextSink;
    use gax::error::Error;
    use gax::error::rpc::Status;
    use pretty_assertions::assert_eq;

    const OPERATION: &str = "projects/p/instances/i/databases/db/operations/_auto_1";

    #[tokio::test(start_paused = true)]
    async fn create() -> crate::Result<()> {
        let fake = FakeTransport::new()
            .with_response("GetInstance", record([("name", "projects/p/instances/i")]))
            .with_response("CreateDatabase", fake::running(OPERATION))
            .with_poll(fake::running(OPERATION))
            .with_poll(fake::succeeded(
                OPERATION,
                record([("name", "projects/p/instances/i/databases/db"), ("state", "READY")]),
            ));
        let client = Client::new(fake.clone())?;
        let mut sink = TextSink::new(Vec::new());
        create_database(&client, &mut sink, "p", "i", "db").await?;
        let got = String::from_utf8(sink.into_inner())?;
        assert_eq!(
            got,
            "Waiting for operation to complete...\nCreated database db on instance i\n"
        );

        let operations = fake
            .calls()
            .into_iter()
            .map(|c| c.operation)
            .collect::<Vec<_>>();
        assert_eq!(
            operations,
            vec!["GetInstance", "CreateDatabase", GET_OPERATION, GET_OPERATION]
        );
        Ok(())
    }

    #[tokio::test]
    async fn missing_instance() -> crate::Result<()> {
        let fake = FakeTransport::new().with_error(
            "GetInstance",
            Error::service(Status::default().set_code(Code::NotFound)),
        );
        let client = Client::new(fake.clone())?;
        let mut sink = TextSink::new(Vec::new());
        let got = create_database(&client, &mut sink, "p", "i", "db").await;
        let err = got.err().map(|e| e.to_string());
        assert_eq!(err.as_deref(), Some("instance i does not exist"));
        assert_eq!(fake.calls().len(), 1);
        Ok(())
    }

    const DATABASE_NAME: &str = "projects/p/instances/i/databases/db";

    fn dml_result(rows: &[&str], count: Value) -> Record {
        let field = record([("name", "FullName")]);
        let metadata = record([
            (
                "rowType",
                Value::from(record([("fields", vec![Value::from(field)])])),
            ),
            ("transaction", Value::from(record([("id", "tx-1")]))),
        ]);
        let rows = rows
            .iter()
            .map(|name| Value::from(vec![Value::from(*name)]))
            .collect::<Vec<_>>();
        record([
            ("metadata", Value::from(metadata)),
            ("rows", Value::from(rows)),
            ("stats", Value::from(record([("rowCountExact", count)]))),
        ])
    }

    #[tokio::test]
    async fn dml_returning() -> crate::Result<()> {
        let names = ["Melissa Garcia", "Russell Morales", "Jacqueline Long", "Dylan Shaw"];
        let fake = FakeTransport::new()
            .with_response("ExecuteSql", dml_result(&names, Value::from("4")))
            .with_response("Commit", record([("commitTimestamp", "2025-01-01T00:00:00Z")]));
        let client = Client::new(fake.clone())?;
        let mut sink = TextSink::new(Vec::new());
        insert_dml_returning(&client, &mut sink, "p", "i", "db").await?;
        assert_eq!(
            String::from_utf8(sink.into_inner())?,
            "Melissa Garcia inserted.\n\
             Russell Morales inserted.\n\
             Jacqueline Long inserted.\n\
             Dylan Shaw inserted.\n\
             Inserted row(s) count: 4\n"
        );

        let calls = fake.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].operation, "ExecuteSql");
        assert_eq!(calls[0].resource, DATABASE_NAME);
        let sql = calls[0].fields.get("sql").and_then(Value::as_str).unwrap_or_default();
        assert!(sql.ends_with("THEN RETURN FullName"), "{sql}");
        assert_eq!(calls[1].operation, "Commit");
        assert_eq!(calls[1].fields.get("transactionId"), Some(&Value::from("tx-1")));
        Ok(())
    }

    #[tokio::test]
    async fn dml_returning_integer_count() -> crate::Result<()> {
        let fake = FakeTransport::new()
            .with_response("ExecuteSql", dml_result(&["Dylan Shaw"], Value::from(1)))
            .with_response("Commit", Record::new());
        let client = Client::new(fake)?;
        let mut sink = TextSink::new(Vec::new());
        insert_dml_returning(&client, &mut sink, "p", "i", "db").await?;
        assert_eq!(
            String::from_utf8(sink.into_inner())?,
            "Dylan Shaw inserted.\nInserted row(s) count: 1\n"
        );
        Ok(())
    }

    #[tokio::test]
    async fn dml_returning_without_column() -> crate::Result<()> {
        let fake = FakeTransport::new().with_response("ExecuteSql", Record::new());
        let client = Client::new(fake.clone())?;
        let mut sink = TextSink::new(Vec::new());
        let got = insert_dml_returning(&client, &mut sink, "p", "i", "db").await;
        let err = got.err().map(|e| e.to_string());
        assert_eq!(err.as_deref(), Some("expected a FullName result set response"));
        // Nothing is committed.
        assert_eq!(fake.calls().len(), 1);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn failed() -> crate::Result<()> {
        let fake = FakeTransport::new()
            .with_response("GetInstance", record([("name", "projects/p/instances/i")]))
            .with_response("CreateDatabase", fake::running(OPERATION))
            .with_poll(fake::failed(OPERATION, Code::AlreadyExists, "database exists"));
        let client = Client::new(fake)?;
        let mut sink = TextSink::new(Vec::new());
        let got = create_database(&client, &mut sink, "p", "i", "db").await;
        let err = got.err().map(|e| e.to_string());
        assert_eq!(
            err.as_deref(),
            Some(format!("operation {OPERATION} failed: ALREADY_EXISTS: database exists").as_str())
        );
        Ok(())
    }
}
