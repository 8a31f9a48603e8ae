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

//! Simplifies the implementation of `Poller`

use super::*;
use gax::loop_state::LoopState;

/// Returned by `until_done()` on a poller that already finished.
#[derive(Debug, thiserror::Error)]
#[error("the poller already returned a final result")]
pub(crate) struct PollerFinished;

/// Folds the result of one poll into the poller state.
///
/// Returns the operation to keep polling, if any, and the result to report.
pub(crate) fn handle_poll<R, M>(
    error_policy: &dyn PollingErrorPolicy,
    loop_start: Instant,
    attempt_count: u32,
    current: Operation<R, M>,
    result: Result<Operation<R, M>>,
) -> (Option<Operation<R, M>>, PollingResult<R, M>)
where
    M: Clone,
{
    match result {
        Err(e) => handle_polling_error(
            error_policy.on_error(loop_start, attempt_count, e),
            current,
        ),
        Ok(next) => {
            let op = current.observe(next);
            if op.is_done() {
                tracing::debug!(operation = op.name(), state = %op.state(), attempt_count, "operation finished");
                return (None, PollingResult::Completed(op));
            }
            tracing::debug!(operation = op.name(), attempt_count, "operation still running");
            match error_policy.on_in_progress(loop_start, attempt_count, op.name()) {
                None => {
                    let metadata = op.metadata().cloned();
                    (Some(op), PollingResult::InProgress(metadata))
                }
                Some(e) => (None, PollingResult::Stopped(e)),
            }
        }
    }
}

fn handle_polling_error<R, M>(
    state: LoopState,
    current: Operation<R, M>,
) -> (Option<Operation<R, M>>, PollingResult<R, M>) {
    match state {
        LoopState::Continue(e) => {
            tracing::debug!(operation = current.name(), "transient error polling operation: {e}");
            (Some(current), PollingResult::PollingError(e))
        }
        LoopState::Exhausted(e) | LoopState::Permanent(e) => {
            tracing::warn!(operation = current.name(), "stopped polling operation: {e}");
            (None, PollingResult::Stopped(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gax::error::rpc::Code;
    use gax::polling_error_policy::{AlwaysContinue, LimitedAttemptCount};

    type TestOperation = Operation<String, u32>;

    #[test]
    fn poll_error_continue() {
        let current = TestOperation::running("operations/a");
        let (next, result) = handle_poll(
            &AlwaysContinue,
            Instant::now(),
            1,
            current.clone(),
            Err(Error::io("reset")),
        );
        assert_eq!(next, Some(current));
        assert!(matches!(result, PollingResult::PollingError(e) if e.is_io()));
    }

    #[test]
    fn poll_error_exhausted() {
        let (next, result) = handle_poll(
            &LimitedAttemptCount::new(1),
            Instant::now(),
            1,
            TestOperation::running("operations/a"),
            Err(Error::io("reset")),
        );
        assert!(next.is_none());
        assert!(matches!(result, PollingResult::Stopped(e) if e.code() == Code::Unavailable));
    }

    #[test]
    fn poll_keeps_terminal_state() {
        let done = TestOperation::succeeded("operations/a", "ok".into());
        let (next, result) = handle_poll(
            &AlwaysContinue,
            Instant::now(),
            1,
            done.clone(),
            Ok(TestOperation::running("operations/a")),
        );
        assert!(next.is_none());
        assert!(matches!(result, PollingResult::Completed(op) if op == done));
    }

    #[test]
    fn poll_in_progress_limit() {
        let (next, result) = handle_poll(
            &LimitedAttemptCount::new(2),
            Instant::now(),
            2,
            TestOperation::running("operations/a"),
            Ok(TestOperation::running("operations/a").set_metadata(5)),
        );
        assert!(next.is_none());
        assert!(matches!(result, PollingResult::Stopped(e) if e.is_exhausted()));

        let (next, result) = handle_poll(
            &LimitedAttemptCount::new(3),
            Instant::now(),
            2,
            TestOperation::running("operations/a"),
            Ok(TestOperation::running("operations/a").set_metadata(5)),
        );
        assert!(next.is_some());
        assert!(matches!(result, PollingResult::InProgress(Some(5))));
    }
}
