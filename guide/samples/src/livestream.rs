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

//! Samples for the Live Stream API.

use crate::{Client, SampleError, emit, text, wait};
use adapter::path_template::PathTemplateError;
use adapter::schema::{FieldType, MessageSchema, OperationSchema};
use adapter::sink::Sink;
use adapter::value::{Record, Value, record};

const PARENT: &str = "projects/{project}/locations/{location}";

pub fn schemas() -> Result<Vec<OperationSchema>, PathTemplateError> {
    let input = MessageSchema::new()
        .required(
            "type",
            FieldType::Enum(&["TYPE_UNSPECIFIED", "RTMP_PUSH", "SRT_PUSH"]),
        )
        .optional(
            "tier",
            FieldType::Enum(&["TIER_UNSPECIFIED", "SD", "HD", "UHD"]),
        );
    let asset = MessageSchema::new().optional(
        "video",
        FieldType::Message(MessageSchema::new().required("uri", FieldType::String)),
    );
    Ok(vec![
        OperationSchema::long_running("CreateInput")
            .with_resource(PARENT)?
            .required("inputId", FieldType::String)
            .required("input", FieldType::Message(input)),
        OperationSchema::long_running("CreateAsset")
            .with_resource(PARENT)?
            .required("assetId", FieldType::String)
            .required("asset", FieldType::Message(asset)),
        OperationSchema::unary("GetInput")
            .with_resource("projects/{project}/locations/{location}/inputs/{input}")?,
        OperationSchema::listing("ListChannels")
            .with_resource(PARENT)?
            .optional("pageSize", FieldType::Integer),
        OperationSchema::listing("ListInputs")
            .with_resource(PARENT)?
            .optional("pageSize", FieldType::Integer),
    ])
}

/// Creates an RTMP push input and waits until it is ready.
pub async fn create_input<S: Sink + ?Sized>(
    client: &Client,
    sink: &mut S,
    project_id: &str,
    location: &str,
    input_id: &str,
) -> crate::Result<()> {
    let response = client
        .call(
            "CreateInput",
            &format!("projects/{project_id}/locations/{location}"),
            record([
                ("inputId", Value::from(input_id)),
                ("input", Value::from(record([("type", "RTMP_PUSH")]))),
            ]),
        )
        .await?;
    let input = wait(client, response).await?;
    emit(sink, format!("Input: {}", text(&input, "name")))?;
    Ok(())
}

/// Creates a video asset from `asset_uri` and waits until it is ready.
pub async fn create_asset<S: Sink + ?Sized>(
    client: &Client,
    sink: &mut S,
    project_id: &str,
    location: &str,
    asset_id: &str,
    asset_uri: &str,
) -> crate::Result<()> {
    let asset = record([("video", record([("uri", asset_uri)]))]);
    let response = client
        .call(
            "CreateAsset",
            &format!("projects/{project_id}/locations/{location}"),
            record([
                ("assetId", Value::from(asset_id)),
                ("asset", Value::from(asset)),
            ]),
        )
        .await?;
    let asset = wait(client, response).await?;
    emit(sink, format!("Asset: {}", text(&asset, "name")))?;
    Ok(())
}

pub async fn get_input<S: Sink + ?Sized>(
    client: &Client,
    sink: &mut S,
    project_id: &str,
    location: &str,
    input_id: &str,
) -> crate::Result<()> {
    let response = client
        .call(
            "GetInput",
            &format!("projects/{project_id}/locations/{location}/inputs/{input_id}"),
            Record::new(),
        )
        .await?;
    let input = response
        .as_single()
        .ok_or(SampleError::UnexpectedResponse("single"))?;
    emit(sink, format!("Input: {}", text(input, "name")))?;
    Ok(())
}

async fn list_names<S: Sink + ?Sized>(
    client: &Client,
    sink: &mut S,
    operation: &str,
    parent: &str,
    title: &str,
) -> crate::Result<()> {
    let response = client.call(operation, parent, Record::new()).await?;
    let mut items = response
        .into_pages()
        .ok_or(SampleError::UnexpectedResponse("listing"))?
        .items();
    emit(sink, title)?;
    while let Some(item) = items.next().await.transpose()? {
        emit(sink, text(&item, "name"))?;
    }
    Ok(())
}

/// Prints the name of every channel in a location.
pub async fn list_channels<S: Sink + ?Sized>(
    client: &Client,
    sink: &mut S,
    project_id: &str,
    location: &str,
) -> crate::Result<()> {
    let parent = format!("projects/{project_id}/locations/{location}");
    list_names(client, sink, "ListChannels", &parent, "Channels:").await
}

/// Prints the name of every input in a location.
pub async fn list_inputs<S: Sink + ?Sized>(
    client: &Client,
    sink: &mut S,
    project_id: &str,
    location: &str,
) -> crate::Result<()> {
    let parent = format!("projects/{project_id}/locations/{location}");
    list_names(client, sink, "ListInputs", &parent, "Inputs:").await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{self, FakeTransport};
    use adapter::sink::TextSink;
    use gax::error::rpc::Code;
    use pretty_assertions::assert_eq;

    const LOCATION: &str = "projects/p/locations/us-central1";

    fn output(sink: TextSink<Vec<u8>>) -> crate::Result<String> {
        Ok(String::from_utf8(sink.into_inner())?)
    }

    #[tokio::test(start_paused = true)]
    async fn create_input_waits() -> crate::Result<()> {
        let op = format!("{LOCATION}/operations/op-1");
        let name = format!("{LOCATION}/inputs/my-input");
        let fake = FakeTransport::new()
            .with_response("CreateInput", fake::running(&op))
            .with_poll(fake::running_with_metadata(
                &op,
                record([("verb", "create")]),
            ))
            .with_poll(fake::succeeded(&op, record([("name", name.as_str())])));
        let client = Client::new(fake.clone())?;
        let mut sink = TextSink::new(Vec::new());
        create_input(&client, &mut sink, "p", "us-central1", "my-input").await?;
        assert_eq!(output(sink)?, format!("Input: {name}\n"));

        let calls = fake.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(
            calls[0].fields.get("input"),
            Some(&Value::from(record([(
                "type",
                Value::Enum("RTMP_PUSH".to_string())
            )])))
        );
        assert_eq!(calls[2].resource, op);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn create_asset_failed() -> crate::Result<()> {
        let op = format!("{LOCATION}/operations/op-2");
        let fake = FakeTransport::new()
            .with_response("CreateAsset", fake::running(&op))
            .with_poll(fake::failed(&op, Code::InvalidArgument, "bad uri"));
        let client = Client::new(fake)?;
        let mut sink = TextSink::new(Vec::new());
        let got = create_asset(
            &client,
            &mut sink,
            "p",
            "us-central1",
            "my-asset",
            "gs://bucket/video.mp4",
        )
        .await;
        let err = got.err().map(|e| e.to_string());
        assert_eq!(
            err,
            Some(format!("operation {op} failed: INVALID_ARGUMENT: bad uri"))
        );
        assert_eq!(output(sink)?, "");
        Ok(())
    }

    #[tokio::test]
    async fn create_asset_done_immediately() -> crate::Result<()> {
        let op = format!("{LOCATION}/operations/op-3");
        let name = format!("{LOCATION}/assets/my-asset");
        let fake = FakeTransport::new().with_response(
            "CreateAsset",
            fake::succeeded(&op, record([("name", name.as_str())])),
        );
        let client = Client::new(fake.clone())?;
        let mut sink = TextSink::new(Vec::new());
        create_asset(
            &client,
            &mut sink,
            "p",
            "us-central1",
            "my-asset",
            "gs://bucket/video.mp4",
        )
        .await?;
        assert_eq!(output(sink)?, format!("Asset: {name}\n"));
        assert_eq!(fake.calls().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn get() -> crate::Result<()> {
        let name = format!("{LOCATION}/inputs/my-input");
        let fake = FakeTransport::new()
            .with_response("GetInput", record([("name", name.as_str()), ("type", "RTMP_PUSH")]));
        let client = Client::new(fake.clone())?;
        let mut sink = TextSink::new(Vec::new());
        get_input(&client, &mut sink, "p", "us-central1", "my-input").await?;
        assert_eq!(output(sink)?, format!("Input: {name}\n"));
        assert_eq!(fake.calls()[0].resource, name);
        Ok(())
    }

    #[tokio::test]
    async fn channels() -> crate::Result<()> {
        let fake = FakeTransport::new().with_pages(
            "ListChannels",
            vec![
                vec![record([("name", "c1")]), record([("name", "c2")])],
                vec![record([("name", "c3")])],
            ],
        );
        let client = Client::new(fake)?;
        let mut sink = TextSink::new(Vec::new());
        list_channels(&client, &mut sink, "p", "us-central1").await?;
        assert_eq!(output(sink)?, "Channels:\nc1\nc2\nc3\n");
        Ok(())
    }

    #[tokio::test]
    async fn inputs_empty() -> crate::Result<()> {
        let fake = FakeTransport::new().with_pages("ListInputs", vec![vec![]]);
        let client = Client::new(fake)?;
        let mut sink = TextSink::new(Vec::new());
        list_inputs(&client, &mut sink, "p", "us-central1").await?;
        assert_eq!(output(sink)?, "Inputs:\n");
        Ok(())
    }
}
