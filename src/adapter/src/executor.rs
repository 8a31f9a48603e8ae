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

//! The call executor.
//!
//! Sends a [Request] through the [Transport] and normalizes the result into
//! one of the [Response] shapes. The executor never retries, never polls on
//! its own, and never adds fields to the request.

use crate::Result;
use crate::request::{GET_OPERATION, Request};
use crate::response::{Operation, PageSequence, Response, decode_operation};
use crate::schema::OperationKind;
use crate::transport::{Page, Transport};
use crate::value::Record;
use futures::FutureExt;
use futures::future::BoxFuture;
use gax::error::Error;
use gax::options::{ClientConfig, RequestOptions};
use gax::paginator::Paginator;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Instrument, Span};

/// The future returned by the query closure of an executor [Poller][lro::Poller].
pub type PollFuture = BoxFuture<'static, Result<Operation>>;

/// Executes requests through a [Transport].
///
/// Executors are cheap to clone, all clones share the same transport.
///
/// # Example
/// ```
/// # use cloud_samples_adapter::{executor::Executor, response::Response};
/// # use cloud_samples_adapter::request::{Request, RequestBuilder};
/// # use cloud_samples_adapter::schema::{OperationSchema, Registry};
/// # use cloud_samples_adapter::transport::{Page, Transport};
/// # use cloud_samples_adapter::value::Record;
/// #[derive(Debug)]
/// struct Echo;
/// #[async_trait::async_trait]
/// impl Transport for Echo {
///     async fn invoke(&self, _: &str, request: &Request) -> gax::Result<Record> {
///         Ok(request.to_record())
///     }
///     async fn fetch_page(&self, _: &str, _: &Request, _: Option<String>) -> gax::Result<Page> {
///         Ok(Page::default())
///     }
/// }
/// # tokio_test::block_on(async {
/// let builder = RequestBuilder::new(Registry::new().with(OperationSchema::unary("Echo")));
/// let request = builder.build("Echo", "", Record::new())?;
/// let response = Executor::new(Echo).execute(request).await?;
/// assert!(matches!(response, Response::Single(_)));
/// # gax::Result::<()>::Ok(()) });
/// ```
#[derive(Clone, Debug)]
pub struct Executor {
    transport: Arc<dyn Transport>,
    config: Arc<ClientConfig>,
}

impl Executor {
    /// Creates an executor with the default configuration.
    pub fn new<T: Transport + 'static>(transport: T) -> Self {
        Self::with_config(transport, ClientConfig::default())
    }

    pub fn with_config<T: Transport + 'static>(transport: T, config: ClientConfig) -> Self {
        Self::from_shared(Arc::new(transport), config)
    }

    /// Creates an executor for a transport shared with other components.
    pub fn from_shared(transport: Arc<dyn Transport>, config: ClientConfig) -> Self {
        Self {
            transport,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Executes `request` with the client's default options.
    ///
    /// * Unary operations return [Response::Single].
    /// * Listing operations fetch the first page before returning
    ///   [Response::Pages]. Later pages are fetched as the caller advances.
    /// * Long-running operations return [Response::Operation] as reported by
    ///   the service, typically `RUNNING`.
    ///
    /// Errors from the transport and the service are returned unmodified. No
    /// partial response is returned on error.
    pub async fn execute(&self, request: Request) -> Result<Response> {
        self.execute_with_options(request, RequestOptions::default())
            .await
    }

    /// Executes `request` overriding some of the client's default options.
    pub async fn execute_with_options(
        &self,
        request: Request,
        options: RequestOptions,
    ) -> Result<Response> {
        let options = self.config.effective_options(options);
        let span = self.span("execute", &request);
        self.execute_impl(request, options).instrument(span).await
    }

    async fn execute_impl(&self, request: Request, options: RequestOptions) -> Result<Response> {
        let timeout = *options.attempt_timeout();
        match request.kind() {
            OperationKind::Unary => {
                let record = self.invoke(&request, timeout).await?;
                Ok(Response::Single(record))
            }
            OperationKind::LongRunning => {
                let raw = self.invoke(&request, timeout).await?;
                let operation = decode_operation(raw)?;
                tracing::debug!(operation = operation.name(), state = %operation.state(), "operation started");
                Ok(Response::Operation(operation))
            }
            OperationKind::Listing => {
                let first = self.fetch_page(&request, None, timeout).await?;
                let executor = self.clone();
                let request = Arc::new(request);
                let execute = move |token: String| {
                    let executor = executor.clone();
                    let request = request.clone();
                    async move {
                        let span = executor.span("fetch_page", &request);
                        executor
                            .fetch_page(&request, Some(token), timeout)
                            .instrument(span)
                            .await
                    }
                };
                Ok(Response::Pages(PageSequence::new(Paginator::resume(
                    first, execute,
                ))))
            }
        }
    }

    /// Fetches the latest state of `operation`.
    ///
    /// Each call on a `RUNNING` operation performs exactly one round trip.
    /// The result never regresses: once `SUCCEEDED` or `FAILED`, an
    /// operation is returned unchanged without contacting the service.
    pub async fn poll(&self, operation: &Operation) -> Result<Operation> {
        self.poll_with_options(operation, RequestOptions::default())
            .await
    }

    pub async fn poll_with_options(
        &self,
        operation: &Operation,
        options: RequestOptions,
    ) -> Result<Operation> {
        if operation.is_done() {
            return Ok(operation.clone());
        }
        let options = self.config.effective_options(options);
        let request = Request::get_operation(operation.name());
        let span = self.span("poll", &request);
        async {
            let raw = self.invoke(&request, *options.attempt_timeout()).await?;
            let next = operation.clone().observe(decode_operation(raw)?);
            tracing::debug!(operation = next.name(), state = %next.state(), "polled operation");
            Ok(next)
        }
        .instrument(span)
        .await
    }

    /// Returns a caller-driven polling loop for `operation`.
    ///
    /// The loop uses the polling policies from the client configuration.
    ///
    /// # Example
    /// ```no_run
    /// # use cloud_samples_adapter::executor::Executor;
    /// # use cloud_samples_adapter::response::Operation;
    /// async fn wait(executor: &Executor, operation: Operation) -> gax::Result<Operation> {
    ///     executor.poller(operation).until_done().await
    /// }
    /// ```
    pub fn poller(
        &self,
        operation: Operation,
    ) -> lro::Poller<
        Record,
        Record,
        impl Fn(String) -> PollFuture + Send + Sync + use<>,
        PollFuture,
    > {
        self.poller_with_options(operation, RequestOptions::default())
    }

    pub fn poller_with_options(
        &self,
        operation: Operation,
        options: RequestOptions,
    ) -> lro::Poller<
        Record,
        Record,
        impl Fn(String) -> PollFuture + Send + Sync + use<>,
        PollFuture,
    > {
        let options = self.config.effective_options(options);
        let executor = self.clone();
        let poll_options = options.clone();
        let query = move |name: String| -> PollFuture {
            let executor = executor.clone();
            let options = poll_options.clone();
            async move {
                executor
                    .poll_with_options(&Operation::running(name), options)
                    .await
            }
            .boxed()
        };
        let mut poller = lro::Poller::new(operation, query);
        if let Some(p) = options.polling_error_policy() {
            poller = poller.with_polling_error_policy(p.clone());
        }
        if let Some(p) = options.polling_backoff_policy() {
            poller = poller.with_polling_backoff_policy(p.clone());
        }
        poller
    }

    async fn invoke(&self, request: &Request, timeout: Option<Duration>) -> Result<Record> {
        let call = self.transport.invoke(request.operation(), request);
        with_timeout(timeout, call)
            .await
            .inspect_err(|e| log_failure(request, e))
    }

    async fn fetch_page(
        &self,
        request: &Request,
        page_token: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Page> {
        tracing::debug!(page_token = page_token.as_deref(), "fetching page");
        let call = self
            .transport
            .fetch_page(request.operation(), request, page_token);
        let page = with_timeout(timeout, call)
            .await
            .inspect_err(|e| log_failure(request, e))?;
        tracing::debug!(
            rows = page.rows.len(),
            next_page_token = page.next_page_token.as_deref(),
            "fetched page"
        );
        Ok(page)
    }

    /// The span for one executor call. `method` is `execute`, `poll` or
    /// `fetch_page`.
    fn span(&self, method: &'static str, request: &Request) -> Span {
        if !self.config.tracing_enabled() {
            return Span::none();
        }
        tracing::info_span!(
            "adapter.call",
            method,
            operation = request.operation(),
            resource = request.resource(),
            kind = %request.kind(),
        )
    }
}

async fn with_timeout<T, F>(timeout: Option<Duration>, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match timeout {
        None => call.await,
        Some(d) => tokio::time::timeout(d, call)
            .await
            .map_err(Error::timeout)?,
    }
}

fn log_failure(request: &Request, error: &Error) {
    if error.is_io() || error.is_timeout() {
        tracing::warn!(
            operation = request.operation(),
            resource = request.resource(),
            "transport failure: {error}"
        );
    } else if request.operation() == GET_OPERATION {
        tracing::debug!(resource = request.resource(), "poll failed: {error}");
    } else {
        tracing::debug!(operation = request.operation(), "call failed: {error}");
    }
}
