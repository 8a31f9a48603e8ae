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

//! Samples for the Security Command Center API.

use crate::{Client, SampleError, emit, text};
use adapter::format::{Style, format};
use adapter::path_template::PathTemplateError;
use adapter::schema::{FieldType, OperationSchema};
use adapter::sink::{Sink, write_all};
use adapter::value::Record;

pub fn schemas() -> Result<Vec<OperationSchema>, PathTemplateError> {
    Ok(vec![
        OperationSchema::listing("ListNotificationConfigs")
            .with_resource("organizations/{organization}")?
            .optional("pageSize", FieldType::Integer),
    ])
}

/// Lists the notification configs in an organization, one line per config.
///
/// The configs are streamed: each page is fetched only after the previous
/// page has been printed.
pub async fn list_notification<S: Sink + ?Sized>(
    client: &Client,
    sink: &mut S,
    organization_id: &str,
) -> crate::Result<()> {
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
    while let Some(config) = items.next().await.transpose()? {
        emit(sink, format!("Found notification config {}", text(&config, "name")))?;
    }
    emit(sink, "Notification configs were listed")?;
    Ok(())
}

/// Writes the notification configs in an organization as a table.
///
/// Returns the number of rows written, header included.
pub async fn export_notification_configs<S: Sink + ?Sized>(
    client: &Client,
    sink: &mut S,
    organization_id: &str,
) -> crate::Result<usize> {
    let response = client
        .call(
            "ListNotificationConfigs",
            &format!("organizations/{organization_id}"),
            Record::new(),
        )
        .await?;
    Ok(write_all(format(response, Style::Tabular), sink).await?)
}
