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

//! Types and functions to make long-running operations easier to use.
//!
//! An [Operation] is a handle to an asynchronous remote task. Its state only
//! moves forward: from [RUNNING][OperationState::Running] to either
//! [SUCCEEDED][OperationState::Succeeded] or [FAILED][OperationState::Failed].
//! A failed operation is a value the caller inspects, not an error.
//!
//! Nothing in this crate polls in the background. A [Poller] runs the polling
//! loop on the caller's task, using the configured backoff and error policies,
//! and the caller may drop it at any time. Dropping the poller abandons the
//! loop locally, the remote task keeps running.

use gax::Result;
use gax::error::Error;
use gax::error::rpc::Status;
use gax::exponential_backoff::ExponentialBackoff;
use gax::polling_backoff_policy::{PollingBackoffPolicy, PollingBackoffPolicyArg};
use gax::polling_error_policy::{
    PollingErrorPolicy, PollingErrorPolicyArg, PollingErrorPolicyExt, TransientOnly,
};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

mod details;

/// The state of a long-running operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationState {
    Running,
    Succeeded,
    Failed,
}

impl OperationState {
    pub fn name(&self) -> &str {
        match self {
            Self::Running => "RUNNING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
        }
    }

    /// Returns true for `SUCCEEDED` and `FAILED`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

impl std::fmt::Display for OperationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A long-running operation with typed response and metadata.
///
/// # Parameters
/// * `R` - the response type, set when the operation succeeds.
/// * `M` - the metadata type. Services may report progress with values of
///   this type while the operation runs.
#[derive(Clone, Debug, PartialEq)]
pub struct Operation<R, M> {
    name: String,
    metadata: Option<M>,
    outcome: Option<std::result::Result<R, Status>>,
}

impl<R, M> Operation<R, M> {
    /// Creates an operation in the `RUNNING` state.
    pub fn running<T: Into<String>>(name: T) -> Self {
        Self {
            name: name.into(),
            metadata: None,
            outcome: None,
        }
    }

    /// Creates an operation in the `SUCCEEDED` state.
    pub fn succeeded<T: Into<String>>(name: T, response: R) -> Self {
        Self {
            name: name.into(),
            metadata: None,
            outcome: Some(Ok(response)),
        }
    }

    /// Creates an operation in the `FAILED` state.
    pub fn failed<T: Into<String>>(name: T, error: Status) -> Self {
        Self {
            name: name.into(),
            metadata: None,
            outcome: Some(Err(error)),
        }
    }

    /// Sets the metadata.
    pub fn set_metadata<T: Into<Option<M>>>(mut self, v: T) -> Self {
        self.metadata = v.into();
        self
    }

    /// The server-assigned identifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metadata(&self) -> Option<&M> {
        self.metadata.as_ref()
    }

    pub fn state(&self) -> OperationState {
        match &self.outcome {
            None => OperationState::Running,
            Some(Ok(_)) => OperationState::Succeeded,
            Some(Err(_)) => OperationState::Failed,
        }
    }

    pub fn is_done(&self) -> bool {
        self.outcome.is_some()
    }

    /// The response, if the operation succeeded.
    pub fn response(&self) -> Option<&R> {
        self.outcome.as_ref().and_then(|r| r.as_ref().ok())
    }

    /// The error, if the operation failed.
    pub fn error(&self) -> Option<&Status> {
        self.outcome.as_ref().and_then(|r| r.as_ref().err())
    }

    /// Consumes the operation, returning its outcome if it is terminal.
    pub fn into_outcome(self) -> Option<std::result::Result<R, Status>> {
        self.outcome
    }

    /// Merges a newer observation of the same operation.
    ///
    /// Once terminal, an operation never changes: `self` is returned and
    /// `next` is discarded. Otherwise `next` replaces `self`, keeping the
    /// previous name and metadata when `next` omits them.
    pub fn observe(self, next: Self) -> Self {
        if self.is_done() {
            return self;
        }
        Self {
            name: if next.name.is_empty() {
                self.name
            } else {
                next.name
            },
            metadata: next.metadata.or(self.metadata),
            outcome: next.outcome,
        }
    }
}

/// The result of one step of a [Poller].
#[derive(Debug)]
pub enum PollingResult<R, M> {
    /// The operation is still running. Includes the latest metadata, if any.
    InProgress(Option<M>),

    /// The operation is terminal, either `SUCCEEDED` or `FAILED`.
    Completed(Operation<R, M>),

    /// The poll failed, but the error policy allows polling again.
    ///
    /// For example, the transport could not reach the service. The remote
    /// operation is unaffected.
    PollingError(Error),

    /// The poll failed and the error policy stopped the loop.
    ///
    /// This includes permanent errors such as `NOT_FOUND` and policies that
    /// ran out of attempts or time. The remote operation may still be running.
    Stopped(Error),
}

/// Runs the polling loop for a long-running operation on the caller's task.
///
/// # Parameters
/// * `Q` - the query closure. It receives the operation name and performs
///   exactly one round trip to fetch the latest state.
/// * `F` - the future returned by `Q`.
///
/// # Example
/// ```
/// # use cloud_samples_lro::{Operation, OperationState, Poller};
/// # tokio_test::block_on(async {
/// let start = Operation::<String, ()>::running("operations/123");
/// let query = |name: String| async move {
///     Ok(Operation::succeeded(name, "done".to_string()))
/// };
/// let op = Poller::new(start, query).until_done().await?;
/// assert_eq!(op.state(), OperationState::Succeeded);
/// # gax::Result::<()>::Ok(()) });
/// ```
pub struct Poller<R, M, Q, F>
where
    Q: Fn(String) -> F + Send + Sync,
    F: Future<Output = Result<Operation<R, M>>> + Send,
{
    current: Option<Operation<R, M>>,
    query: Q,
    error_policy: Arc<dyn PollingErrorPolicy>,
    backoff_policy: Arc<dyn PollingBackoffPolicy>,
    loop_start: Instant,
    attempt_count: u32,
}

/// The default upper bound for the polling loop.
const DEFAULT_POLLING_TIME: Duration = Duration::from_secs(30 * 60);

impl<R, M, Q, F> Poller<R, M, Q, F>
where
    M: Clone,
    Q: Fn(String) -> F + Send + Sync,
    F: Future<Output = Result<Operation<R, M>>> + Send,
{
    /// Creates a poller for `operation`.
    ///
    /// By default, poll errors are retried only when transient, the loop
    /// stops after 30 minutes, and the delay between polls grows
    /// exponentially from one second to one minute.
    pub fn new(operation: Operation<R, M>, query: Q) -> Self {
        Self {
            current: Some(operation),
            query,
            error_policy: Arc::new(TransientOnly.with_time_limit(DEFAULT_POLLING_TIME)),
            backoff_policy: Arc::new(ExponentialBackoff::default()),
            loop_start: Instant::now(),
            attempt_count: 0,
        }
    }

    /// Changes the policy deciding which poll errors are retried.
    pub fn with_polling_error_policy<V: Into<PollingErrorPolicyArg>>(mut self, v: V) -> Self {
        self.error_policy = v.into().into();
        self
    }

    /// Changes the delay between polls.
    pub fn with_polling_backoff_policy<V: Into<PollingBackoffPolicyArg>>(mut self, v: V) -> Self {
        self.backoff_policy = v.into().into();
        self
    }

    /// Performs one step of the polling loop.
    ///
    /// Returns `None` once the poller has returned a
    /// [Completed][PollingResult::Completed] or
    /// [Stopped][PollingResult::Stopped] result. A terminal operation is
    /// returned without any round trip.
    pub async fn poll(&mut self) -> Option<PollingResult<R, M>> {
        let current = self.current.take()?;
        if current.is_done() {
            return Some(PollingResult::Completed(current));
        }
        self.attempt_count += 1;
        let result = (self.query)(current.name().to_string()).await;
        let (next, poll) = details::handle_poll(
            self.error_policy.as_ref(),
            self.loop_start,
            self.attempt_count,
            current,
            result,
        );
        self.current = next;
        Some(poll)
    }

    /// Polls until the operation is terminal, sleeping between polls.
    ///
    /// A `FAILED` operation is returned as `Ok`. Inspect its
    /// [state][Operation::state]. Errors are returned only when the polling
    /// loop itself stops.
    pub async fn until_done(mut self) -> Result<Operation<R, M>> {
        while let Some(p) = self.poll().await {
            match p {
                PollingResult::Completed(op) => return Ok(op),
                PollingResult::Stopped(e) => return Err(e),
                PollingResult::InProgress(_) | PollingResult::PollingError(_) => {
                    let delay = self
                        .backoff_policy
                        .wait_period(self.loop_start, self.attempt_count);
                    tokio::time::sleep(delay).await;
                }
            }
        }
        Err(Error::exhausted(details::PollerFinished))
    }

    /// Converts the poller into a [futures::Stream] of polling results.
    ///
    /// The stream does not sleep between polls. The caller controls the pace
    /// by how fast it consumes the stream.
    pub fn to_stream(self) -> impl futures::Stream<Item = PollingResult<R, M>> {
        futures::stream::unfold(self, |mut poller| async move {
            poller.poll().await.map(|p| (p, poller))
        })
    }
}
