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

use crate::{Client, SampleError, emit, text};
use adapter::sink::Sink;
use adapter::transport::Transport;
use adapter::value::Record;

// ANCHOR: rust_logging
// ANCHOR: rust_logging_parameters
/// # Parameters
/// - `organization_id`: the numeric id of a Google Cloud organization.
///   For example: `123456789`.
pub async fn sample<T: Transport + 'static, S: Sink + ?Sized>(
    transport: T,
    sink: &mut S,
    organization_id: &str,
) -> crate::Result<()> {
    // ANCHOR_END: rust_logging_parameters
    // ANCHOR: rust_logging_use
    use gax::options::ClientConfig;
    // ANCHOR_END: rust_logging_use

    // ANCHOR: rust_logging_init
    if let Err(e) = tracing_subscriber::fmt().try_init() {
        tracing::debug!("a subscriber is already installed: {e}");
    }
    // ANCHOR_END: rust_logging_init

    // ANCHOR: rust_logging_client
    let client = Client::with_config(transport, ClientConfig::new().enable_tracing())?;
    // ANCHOR_END: rust_logging_client
    // ANCHOR: rust_logging_call
    let response = client
        .call(
            "ListNotificationConfigs",
            &format!("organizations/{organization_id}"),
            Record::new(),
        )
        .await?;
    let mut items = response
        .into_pages()
        .ok_or(SampleError::UnexpectedResponse("listing"))?
        .items();
    emit(
        sink,
        format!("listing all notification configs in organization {organization_id}"),
    )?;
    while let Some(config) = items.next().await.transpose()? {
        emit(sink, format!("  {}", text(&config, "name")))?;
    }
    emit(sink, "DONE")?;
    // ANCHOR_END: rust_logging_call
    Ok(())
}
// ANCHOR_END: rust_logging
