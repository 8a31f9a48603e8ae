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

//! Examples showing how to iterate the results of a listing operation.

use crate::{Client, SampleError, text};
use adapter::response::PageSequence;
use adapter::value::Record;

async fn list_channels(client: &Client, project_id: &str) -> crate::Result<PageSequence> {
    let response = client
        .call(
            "ListChannels",
            &format!("projects/{project_id}/locations/us-central1"),
            Record::new(),
        )
        .await?;
    Ok(response
        .into_pages()
        .ok_or(SampleError::UnexpectedResponse("listing"))?)
}

/// Returns the number of rows in each page.
pub async fn paginator_iterate_pages(client: &Client, project_id: &str) -> crate::Result<Vec<usize>> {
    // ANCHOR: paginator-iterate-pages
    let mut pages = list_channels(client, project_id).await?;
    let mut sizes = Vec::new();
    while let Some(page) = pages.next().await {
        sizes.push(page?.rows.len());
    }
    // ANCHOR_END: paginator-iterate-pages
    Ok(sizes)
}

pub async fn paginator_iterate_items(client: &Client, project_id: &str) -> crate::Result<Vec<String>> {
    // ANCHOR: paginator-iterate-items
    let mut items = list_channels(client, project_id).await?.items();
    let mut names = Vec::new();
    while let Some(channel) = items.next().await {
        names.push(text(&channel?, "name").to_string());
    }
    // ANCHOR_END: paginator-iterate-items
    Ok(names)
}

pub async fn paginator_stream_items(client: &Client, project_id: &str) -> crate::Result<Vec<String>> {
    use futures::stream::TryStreamExt;

    // ANCHOR: paginator-stream-items
    let names = list_channels(client, project_id)
        .await?
        .items()
        .map_ok(|channel| text(&channel, "name").to_string())
        .try_collect::<Vec<_>>()
        .await?;
    // ANCHOR_END: paginator-stream-items
    Ok(names)
}

/// Returns the first channel whose name ends with `suffix`.
///
/// Stops listing at the first match. Pages after the one holding the match
/// are never requested.
pub async fn paginator_find_item(
    client: &Client,
    project_id: &str,
    suffix: &str,
) -> crate::Result<Option<String>> {
    // ANCHOR: paginator-find-item
    let mut items = list_channels(client, project_id).await?.items();
    while let Some(channel) = items.next().await.transpose()? {
        let name = text(&channel, "name");
        if name.ends_with(suffix) {
            return Ok(Some(name.to_string()));
        }
    }
    // ANCHOR_END: paginator-find-item
    Ok(None)
}
