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

//! Examples showing how to mock the transport in tests.

// ANCHOR: all
#[cfg(test)]
mod tests {
    // ANCHOR: use
    use cloud_samples::Client;
    use adapter::request::{GET_OPERATION, Request};
    use adapter::sink::TextSink;
    use adapter::transport::{Page, Transport};
    use adapter::value::{Record, Value, record};
    // ANCHOR_END: use
    type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

    // ANCHOR: mockall_macro
    mockall::mock! {
        #[derive(Debug)]
        Transport {}
        #[async_trait::async_trait]
        impl Transport for Transport {
            async fn invoke(&self, operation: &str, request: &Request) -> gax::Result<Record>;
            async fn fetch_page(
                &self,
                operation: &str,
                request: &Request,
                page_token: Option<String>,
            ) -> gax::Result<Page>;
        }
    }
    // ANCHOR_END: mockall_macro

    #[tokio::test]
    async fn basic_success() -> Result<()> {
        // ANCHOR: mock_expectation
        let mut mock = MockTransport::new();
        mock.expect_invoke()
            .withf(|operation, request| {
                // Optionally, verify fields in the request.
                operation == "AnalyzeEntities"
                    && request
                        .get("document")
                        .and_then(Value::as_message)
                        .and_then(|d| d.get("content"))
                        == Some(&Value::from("Larry Page"))
            })
            .return_once(|_, _| {
                Ok(record([(
                    "entities",
                    Value::from(vec![Value::from(record([
                        ("name", Value::from("Larry Page")),
                        ("type", Value::from("PERSON")),
                        ("salience", Value::from(1.0)),
                    ]))]),
                )]))
            });
        mock.expect_fetch_page().never();
        // ANCHOR_END: mock_expectation

        // ANCHOR: client_from_mock
        let client = Client::new(mock)?;
        // ANCHOR_END: client_from_mock

        let mut sink = TextSink::new(Vec::new());
        cloud_samples::language::analyze_entities(&client, &mut sink, "Larry Page").await?;
        let output = String::from_utf8(sink.into_inner())?;
        assert!(output.starts_with("Name: Larry Page\nType: PERSON\n"), "{output}");
        Ok(())
    }

    #[tokio::test]
    async fn basic_fail() -> Result<()> {
        let mut mock = MockTransport::new();
        // ANCHOR: error
        mock.expect_invoke().return_once(|_, _| {
            // This time, return an error.
            use gax::error::Error;
            use gax::error::rpc::{Code, Status};
            let status = Status::default()
                .set_code(Code::NotFound)
                .set_message("Resource not found");
            Err(Error::service(status))
        });
        // ANCHOR_END: error

        let client = Client::new(mock)?;
        let mut sink = TextSink::new(Vec::new());
        let got = cloud_samples::transcoder::delete_job(&client, &mut sink, "p", "l", "j").await;
        assert!(got.is_err());
        assert!(sink.into_inner().is_empty());
        Ok(())
    }

    // ANCHOR: lro
    #[tokio::test(start_paused = true)]
    async fn long_running() -> Result<()> {
        const OPERATION: &str = "projects/p/locations/l/operations/op";
        let mut seq = mockall::Sequence::new();
        let mut mock = MockTransport::new();
        mock.expect_invoke()
            .withf(|operation, _| operation == "CreateAsset")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(record([("name", OPERATION)])));
        mock.expect_invoke()
            .withf(|operation, request| operation == GET_OPERATION && request.resource() == OPERATION)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| {
                Ok(record([
                    ("name", Value::from(OPERATION)),
                    ("done", Value::from(true)),
                    (
                        "response",
                        Value::from(record([("name", "projects/p/locations/l/assets/a")])),
                    ),
                ]))
            });

        let client = Client::new(mock)?;
        let mut sink = TextSink::new(Vec::new());
        cloud_samples::livestream::create_asset(
            &client,
            &mut sink,
            "p",
            "l",
            "a",
            "gs://bucket/video.mp4",
        )
        .await?;
        assert_eq!(
            String::from_utf8(sink.into_inner())?,
            "Asset: projects/p/locations/l/assets/a\n"
        );
        Ok(())
    }
    // ANCHOR_END: lro
}
// ANCHOR_END: all
