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

//! Samples for the Cloud Natural Language API.

use crate::{Client, SampleError, emit, message, messages, text};
use adapter::path_template::PathTemplateError;
use adapter::schema::{FieldType, MessageSchema, OperationSchema};
use adapter::sink::Sink;
use adapter::value::{Record, Value, record};

const DOCUMENT_TYPE: &[&str] = &["TYPE_UNSPECIFIED", "PLAIN_TEXT", "HTML"];
const ENCODING_TYPE: &[&str] = &["NONE", "UTF8", "UTF16", "UTF32"];

pub fn schemas() -> Result<Vec<OperationSchema>, PathTemplateError> {
    let document = MessageSchema::new()
        .optional("content", FieldType::String)
        .optional("gcsContentUri", FieldType::String)
        .required("type", FieldType::Enum(DOCUMENT_TYPE))
        .optional("language", FieldType::String);
    let analyze = |name: &str| {
        OperationSchema::unary(name)
            .required("document", FieldType::Message(document.clone()))
            .optional("encodingType", FieldType::Enum(ENCODING_TYPE))
    };
    Ok(vec![
        analyze("AnalyzeEntities"),
        analyze("AnalyzeEntitySentiment"),
        analyze("AnalyzeSyntax"),
    ])
}

fn plain_text(source: &str, value: &str) -> Record {
    record([(
        "document",
        record([(source, value), ("type", "PLAIN_TEXT")]),
    )])
}

async fn analyze(client: &Client, operation: &str, document: Record) -> crate::Result<Record> {
    let response = client.call(operation, "", document).await?;
    let result = response
        .as_single()
        .ok_or(SampleError::UnexpectedResponse("single"))?;
    Ok(result.clone())
}

/// Finds the named entities in `text`.
pub async fn analyze_entities<S: Sink + ?Sized>(
    client: &Client,
    sink: &mut S,
    text_to_analyze: &str,
) -> crate::Result<()> {
    let response = analyze(client, "AnalyzeEntities", plain_text("content", text_to_analyze)).await?;
    for entity in messages(&response, "entities") {
        emit(sink, format!("Name: {}", text(entity, "name")))?;
        emit(sink, format!("Type: {}", text(entity, "type")))?;
        emit(sink, format!("Salience: {}", number(entity, "salience")))?;
        if let Some(metadata) = message(entity, "metadata") {
            if let Some(url) = metadata.get("wikipedia_url") {
                emit(sink, format!("Wikipedia URL: {url}"))?;
            }
            if let Some(mid) = metadata.get("mid") {
                emit(sink, format!("Knowledge Graph MID: {mid}"))?;
            }
        }
        emit(sink, "")?;
    }
    Ok(())
}

/// Finds the named entities in `text` and the sentiment expressed about each.
pub async fn analyze_entity_sentiment<S: Sink + ?Sized>(
    client: &Client,
    sink: &mut S,
    text_to_analyze: &str,
) -> crate::Result<()> {
    let response = analyze(
        client,
        "AnalyzeEntitySentiment",
        plain_text("content", text_to_analyze),
    )
    .await?;
    for entity in messages(&response, "entities") {
        emit(sink, format!("Entity Name: {}", text(entity, "name")))?;
        emit(sink, format!("Entity Type: {}", text(entity, "type")))?;
        emit(sink, format!("Entity Salience: {}", number(entity, "salience")))?;
        if let Some(sentiment) = message(entity, "sentiment") {
            emit(sink, format!("Entity Magnitude: {}", number(sentiment, "magnitude")))?;
            emit(sink, format!("Entity Score: {}", number(sentiment, "score")))?;
        }
        emit(sink, "")?;
    }
    Ok(())
}

/// Analyzes the syntax of a text file stored in Cloud Storage.
///
/// # Parameters
/// - `uri`: the object to analyze, for example `gs://my-bucket/my-file.txt`.
pub async fn analyze_syntax_from_file<S: Sink + ?Sized>(
    client: &Client,
    sink: &mut S,
    uri: &str,
) -> crate::Result<()> {
    let response = analyze(client, "AnalyzeSyntax", plain_text("gcsContentUri", uri)).await?;
    for token in messages(&response, "tokens") {
        let content = message(token, "text").map(|t| text(t, "content"));
        let tag = message(token, "partOfSpeech").map(|p| text(p, "tag"));
        emit(sink, format!("Token text: {}", content.unwrap_or_default()))?;
        emit(sink, format!("Token part of speech: {}", tag.unwrap_or_default()))?;
        emit(sink, "")?;
    }
    Ok(())
}

fn number(record: &Record, name: &str) -> String {
    record.get(name).map(Value::to_string).unwrap_or_default()
}
