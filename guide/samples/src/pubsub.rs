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

//! Samples for Cloud Pub/Sub publishing.

use crate::{Client, emit};
use adapter::path_template::PathTemplateError;
use adapter::schema::{FieldType, MessageSchema, OperationSchema};
use adapter::sink::Sink;
use adapter::value::{Value, record};

/// Messages published with the same ordering key are delivered in order.
const ORDERING_KEY: &str = "foo";

pub fn schemas() -> Result<Vec<OperationSchema>, PathTemplateError> {
    let message = MessageSchema::new()
        .required("data", FieldType::String)
        .optional("orderingKey", FieldType::String);
    Ok(vec![
        OperationSchema::unary("Publish")
            .with_resource("projects/{project}/topics/{topic}")?
            .required("messages", FieldType::repeated(FieldType::Message(message))),
    ])
}

/// Publishes five messages, one request each, all with the same ordering key.
pub async fn publish_with_ordering_keys<S: Sink + ?Sized>(
    client: &Client,
    sink: &mut S,
    project_id: &str,
    topic_id: &str,
) -> crate::Result<()> {
    let topic = format!("projects/{project_id}/topics/{topic_id}");
    for i in 1..=5 {
        let message = record([
            ("data", Value::from(format!("message{i}"))),
            ("orderingKey", Value::from(ORDERING_KEY)),
        ]);
        client
            .call(
                "Publish",
                &topic,
                record([("messages", vec![Value::from(message)])]),
            )
            .await?;
    }
    emit(sink, "Message published")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeTransport;
    use adapter::sink::TextSink;
    use adapter::value::Record;
    use gax::error::Error;
    use gax::error::rpc::{Code, Status};
    use pretty_assertions::assert_eq;

    fn published(id: &str) -> Record {
        record([("messageIds", vec![Value::from(id)])])
    }

    #[tokio::test]
    async fn ordering_keys() -> crate::Result<()> {
        let mut fake = FakeTransport::new();
        for i in 1..=5 {
            fake = fake.with_response("Publish", published(&i.to_string()));
        }
        let client = Client::new(fake.clone())?;
        let mut sink = TextSink::new(Vec::new());
        publish_with_ordering_keys(&client, &mut sink, "p", "t").await?;
        assert_eq!(String::from_utf8(sink.into_inner())?, "Message published\n");

        let calls = fake.calls();
        assert_eq!(calls.len(), 5);
        for (i, call) in calls.iter().enumerate() {
            assert_eq!(call.operation, "Publish");
            assert_eq!(call.resource, "projects/p/topics/t");
            let want = Value::from(vec![Value::from(record([
                ("data", Value::from(format!("message{}", i + 1))),
                ("orderingKey", Value::from("foo")),
            ]))]);
            assert_eq!(call.fields.get("messages"), Some(&want));
        }
        Ok(())
    }

    #[tokio::test]
    async fn stops_on_error() -> crate::Result<()> {
        let fake = FakeTransport::new()
            .with_response("Publish", published("1"))
            .with_error(
                "Publish",
                Error::service(Status::default().set_code(Code::NotFound).set_message("topic t")),
            );
        let client = Client::new(fake.clone())?;
        let mut sink = TextSink::new(Vec::new());
        let got = publish_with_ordering_keys(&client, &mut sink, "p", "t").await;
        assert!(got.is_err(), "{got:?}");
        assert_eq!(fake.calls().len(), 2);
        assert_eq!(String::from_utf8(sink.into_inner())?, "");
        Ok(())
    }
}
