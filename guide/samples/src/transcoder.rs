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

//! Samples for the Transcoder API.

use crate::{Client, SampleError, emit, text};
use adapter::path_template::PathTemplateError;
use adapter::schema::{FieldType, MessageSchema, OperationSchema};
use adapter::sink::Sink;
use adapter::value::{Record, Value, record};

fn job() -> FieldType {
    let h264 = MessageSchema::new()
        .required("bitrateBps", FieldType::Integer)
        .required("frameRate", FieldType::Float)
        .optional("heightPixels", FieldType::Integer)
        .optional("widthPixels", FieldType::Integer);
    let video = MessageSchema::new().optional("h264", FieldType::Message(h264));
    let audio = MessageSchema::new()
        .required("codec", FieldType::String)
        .required("bitrateBps", FieldType::Integer);
    let elementary = MessageSchema::new()
        .required("key", FieldType::String)
        .optional("videoStream", FieldType::Message(video))
        .optional("audioStream", FieldType::Message(audio));
    let mux = MessageSchema::new()
        .required("key", FieldType::String)
        .required("container", FieldType::String)
        .required("elementaryStreams", FieldType::repeated(FieldType::String));
    let config = MessageSchema::new()
        .optional(
            "elementaryStreams",
            FieldType::repeated(FieldType::Message(elementary)),
        )
        .optional("muxStreams", FieldType::repeated(FieldType::Message(mux)));
    FieldType::Message(
        MessageSchema::new()
            .required("inputUri", FieldType::String)
            .required("outputUri", FieldType::String)
            .optional("templateId", FieldType::String)
            .optional("config", FieldType::Message(config)),
    )
}

pub fn schemas() -> Result<Vec<OperationSchema>, PathTemplateError> {
    Ok(vec![
        OperationSchema::unary("CreateJob")
            .with_resource("projects/{project}/locations/{location}")?
            .required("job", job()),
        OperationSchema::unary("DeleteJob")
            .with_resource("projects/{project}/locations/{location}/jobs/{job}")?
            .optional("allowMissing", FieldType::Bool),
    ])
}

fn video_stream(key: &str, bitrate: i64, height: i64, width: i64) -> Value {
    let h264 = record([
        ("bitrateBps", Value::from(bitrate)),
        ("frameRate", Value::from(60)),
        ("heightPixels", Value::from(height)),
        ("widthPixels", Value::from(width)),
    ]);
    Value::from(record([
        ("key", Value::from(key)),
        ("videoStream", Value::from(record([("h264", h264)]))),
    ]))
}

fn mux_stream(key: &str, streams: [&str; 2]) -> Value {
    Value::from(record([
        ("key", Value::from(key)),
        ("container", Value::from("mp4")),
        (
            "elementaryStreams",
            Value::from(streams.map(Value::from).to_vec()),
        ),
    ]))
}

/// Creates a job with an SD and an HD rendition, each muxed with the same
/// AAC audio stream.
///
/// # Parameters
/// - `input_uri`: the source video, for example `gs://my-bucket/input.mp4`.
/// - `output_uri`: the destination folder, for example `gs://my-bucket/out/`.
pub async fn create_job_from_ad_hoc<S: Sink + ?Sized>(
    client: &Client,
    sink: &mut S,
    project_id: &str,
    location: &str,
    input_uri: &str,
    output_uri: &str,
) -> crate::Result<()> {
    let audio = Value::from(record([
        ("key", Value::from("audio-stream0")),
        (
            "audioStream",
            Value::from(record([
                ("codec", Value::from("aac")),
                ("bitrateBps", Value::from(64000)),
            ])),
        ),
    ]));
    let config = record([
        (
            "elementaryStreams",
            vec![
                video_stream("video-stream0", 550000, 360, 640),
                video_stream("video-stream1", 2500000, 720, 1280),
                audio,
            ],
        ),
        (
            "muxStreams",
            vec![
                mux_stream("sd", ["video-stream0", "audio-stream0"]),
                mux_stream("hd", ["video-stream1", "audio-stream0"]),
            ],
        ),
    ]);
    let job = record([
        ("inputUri", Value::from(input_uri)),
        ("outputUri", Value::from(output_uri)),
        ("config", Value::from(config)),
    ]);
    let response = client
        .call(
            "CreateJob",
            &format!("projects/{project_id}/locations/{location}"),
            record([("job", job)]),
        )
        .await?;
    let job = response
        .as_single()
        .ok_or(SampleError::UnexpectedResponse("single"))?;
    emit(sink, format!("Job: {}", text(job, "name")))?;
    Ok(())
}

pub async fn delete_job<S: Sink + ?Sized>(
    client: &Client,
    sink: &mut S,
    project_id: &str,
    location: &str,
    job_id: &str,
) -> crate::Result<()> {
    client
        .call(
            "DeleteJob",
            &format!("projects/{project_id}/locations/{location}/jobs/{job_id}"),
            Record::new(),
        )
        .await?;
    emit(sink, "Deleted job")?;
    Ok(())
}
