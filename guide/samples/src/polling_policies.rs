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

//! Examples showing how to configure the polling policies.
//!
//! Each example creates a Live Stream input. The policies can be set for
//! every long-running operation started by a client, or for a single
//! request.

use crate::{Client, SampleError, emit, text};
use adapter::sink::Sink;
use adapter::transport::Transport;
use adapter::value::{Value, record};
use gax::options::{ClientConfig, RequestOptions};

fn create_input_fields(input_id: &str) -> adapter::value::Record {
    record([
        ("inputId", Value::from(input_id)),
        ("input", Value::from(record([("type", "RTMP_PUSH")]))),
    ])
}

async fn create_input<S: Sink + ?Sized>(
    client: &Client,
    sink: &mut S,
    parent: &str,
    input_id: &str,
    options: RequestOptions,
) -> crate::Result<()> {
    let response = client
        .call_with_options(
            "CreateInput",
            parent,
            create_input_fields(input_id),
            options.clone(),
        )
        .await?;
    let operation = response
        .into_operation()
        .ok_or(SampleError::UnexpectedResponse("long-running"))?;
    let operation = client
        .executor()
        .poller_with_options(operation, options)
        .until_done()
        .await?;
    let name = operation.name().to_string();
    match operation.into_outcome() {
        Some(Ok(input)) => emit(sink, format!("Input: {}", text(&input, "name")))?,
        Some(Err(status)) => return Err(SampleError::OperationFailed { name, status }.into()),
        None => return Err(SampleError::UnexpectedResponse("completed operation").into()),
    }
    Ok(())
}

// ANCHOR: client-backoff
pub async fn client_backoff<T: Transport + 'static, S: Sink + ?Sized>(
    transport: T,
    sink: &mut S,
    project_id: &str,
    input_id: &str,
) -> crate::Result<()> {
    // ANCHOR: client-backoff-use
    use gax::exponential_backoff::ExponentialBackoffBuilder;
    use std::time::Duration;
    // ANCHOR_END: client-backoff-use

    // ANCHOR: client-backoff-client
    let client = Client::with_config(
        transport,
        ClientConfig::new().set_polling_backoff_policy(
            ExponentialBackoffBuilder::new()
                .with_initial_delay(Duration::from_millis(250))
                .with_maximum_delay(Duration::from_secs(10))
                .build()?,
        ),
    )?;
    // ANCHOR_END: client-backoff-client

    let parent = format!("projects/{project_id}/locations/us-central1");
    create_input(&client, sink, &parent, input_id, RequestOptions::default()).await
}
// ANCHOR_END: client-backoff

// ANCHOR: rpc-backoff
pub async fn rpc_backoff<S: Sink + ?Sized>(
    client: &Client,
    sink: &mut S,
    project_id: &str,
    input_id: &str,
) -> crate::Result<()> {
    use gax::exponential_backoff::ExponentialBackoffBuilder;
    use std::time::Duration;

    // ANCHOR: rpc-backoff-options
    let options = RequestOptions::default().set_polling_backoff_policy(
        ExponentialBackoffBuilder::new()
            .with_initial_delay(Duration::from_millis(250))
            .with_maximum_delay(Duration::from_secs(10))
            .build()?,
    );
    // ANCHOR_END: rpc-backoff-options

    let parent = format!("projects/{project_id}/locations/us-central1");
    create_input(client, sink, &parent, input_id, options).await
}
// ANCHOR_END: rpc-backoff

// ANCHOR: client-errors
pub async fn client_errors<T: Transport + 'static, S: Sink + ?Sized>(
    transport: T,
    sink: &mut S,
    project_id: &str,
    input_id: &str,
) -> crate::Result<()> {
    // ANCHOR: client-errors-use
    use gax::polling_error_policy::{AlwaysContinue, PollingErrorPolicyExt};
    use std::time::Duration;
    // ANCHOR_END: client-errors-use

    // ANCHOR: client-errors-client
    let client = Client::with_config(
        transport,
        ClientConfig::new().set_polling_error_policy(
            AlwaysContinue
                .with_time_limit(Duration::from_secs(15 * 60))
                .with_attempt_limit(5),
        ),
    )?;
    // ANCHOR_END: client-errors-client

    let parent = format!("projects/{project_id}/locations/us-central1");
    create_input(&client, sink, &parent, input_id, RequestOptions::default()).await
}
// ANCHOR_END: client-errors

// ANCHOR: rpc-errors
pub async fn rpc_errors<S: Sink + ?Sized>(
    client: &Client,
    sink: &mut S,
    project_id: &str,
    input_id: &str,
) -> crate::Result<()> {
    use gax::polling_error_policy::{PollingErrorPolicyExt, TransientOnly};
    use std::time::Duration;

    // ANCHOR: rpc-errors-options
    let options = RequestOptions::default().set_polling_error_policy(
        TransientOnly
            .with_time_limit(Duration::from_secs(15 * 60))
            .with_attempt_limit(5),
    );
    // ANCHOR_END: rpc-errors-options

    let parent = format!("projects/{project_id}/locations/us-central1");
    create_input(client, sink, &parent, input_id, options).await
}
// ANCHOR_END: rpc-errors

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{self, FakeTransport};
    use adapter::request::GET_OPERATION;
    use adapter::sink::TextSink;
    use gax::error::Error;
    use gax::error::rpc::{Code, Status};
    use pretty_assertions::assert_eq;

    const OP: &str = "projects/p/locations/us-central1/operations/op-1";
    const INPUT: &str = "projects/p/locations/us-central1/inputs/in-1";

    fn unavailable() -> Error {
        Error::service(
            Status::default()
                .set_code(Code::Unavailable)
                .set_message("try again"),
        )
    }

    fn polls(fake: &FakeTransport) -> usize {
        fake.calls()
            .iter()
            .filter(|c| c.operation == GET_OPERATION)
            .count()
    }

    #[tokio::test(start_paused = true)]
    async fn client_backoff_completes() -> crate::Result<()> {
        let fake = FakeTransport::new()
            .with_response("CreateInput", fake::running(OP))
            .with_poll(fake::running(OP))
            .with_poll(fake::succeeded(OP, record([("name", INPUT)])));
        let mut sink = TextSink::new(Vec::new());
        let start = tokio::time::Instant::now();
        client_backoff(fake.clone(), &mut sink, "p", "in-1").await?;
        assert_eq!(String::from_utf8(sink.into_inner())?, format!("Input: {INPUT}\n"));
        assert_eq!(polls(&fake), 2);
        // One delay, bounded by the initial delay.
        assert!(start.elapsed() <= std::time::Duration::from_millis(250));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn rpc_backoff_completes() -> crate::Result<()> {
        let fake = FakeTransport::new()
            .with_response("CreateInput", fake::running(OP))
            .with_poll(fake::succeeded(OP, record([("name", INPUT)])));
        let client = Client::new(fake.clone())?;
        let mut sink = TextSink::new(Vec::new());
        rpc_backoff(&client, &mut sink, "p", "in-1").await?;
        assert_eq!(String::from_utf8(sink.into_inner())?, format!("Input: {INPUT}\n"));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn client_errors_continue_on_any_error() -> crate::Result<()> {
        let fake = FakeTransport::new()
            .with_response("CreateInput", fake::running(OP))
            .with_error(GET_OPERATION, Error::service(Status::default().set_code(Code::Internal)))
            .with_poll(fake::succeeded(OP, record([("name", INPUT)])));
        let mut sink = TextSink::new(Vec::new());
        client_errors(fake.clone(), &mut sink, "p", "in-1").await?;
        assert_eq!(String::from_utf8(sink.into_inner())?, format!("Input: {INPUT}\n"));
        assert_eq!(polls(&fake), 2);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn rpc_errors_exhausted() -> crate::Result<()> {
        let mut fake = FakeTransport::new().with_response("CreateInput", fake::running(OP));
        for _ in 0..6 {
            fake = fake.with_error(GET_OPERATION, unavailable());
        }
        let client = Client::new(fake.clone())?;
        let mut sink = TextSink::new(Vec::new());
        let got = rpc_errors(&client, &mut sink, "p", "in-1").await;
        // The loop stops with the last poll error.
        let code = got
            .err()
            .and_then(|e| e.downcast_ref::<Error>().map(Error::code));
        assert_eq!(code, Some(Code::Unavailable));
        assert_eq!(polls(&fake), 5);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn rpc_errors_permanent() -> crate::Result<()> {
        let fake = FakeTransport::new()
            .with_response("CreateInput", fake::running(OP))
            .with_error(GET_OPERATION, Error::service(Status::default().set_code(Code::NotFound)));
        let client = Client::new(fake.clone())?;
        let mut sink = TextSink::new(Vec::new());
        let got = rpc_errors(&client, &mut sink, "p", "in-1").await;
        let code = got
            .err()
            .and_then(|e| e.downcast_ref::<Error>().map(Error::code));
        assert_eq!(code, Some(Code::NotFound));
        assert_eq!(polls(&fake), 1);
        Ok(())
    }
}
