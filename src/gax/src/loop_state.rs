// Copyright 2024 Google LLC
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

//! Polling loop control types.
//!
//! Applications only need these types when implementing their own
//! [PollingErrorPolicy][crate::polling_error_policy::PollingErrorPolicy].

use crate::error::Error;

/// The decision taken by a polling error policy after a failed poll.
#[derive(Debug)]
pub enum LoopState {
    /// The error will not go away by polling again, stop the loop.
    Permanent(Error),

    /// The error may go away, but the policy is stopping the loop anyway.
    ///
    /// For example, because the policy only allows a limited number of
    /// attempts.
    Exhausted(Error),

    /// The error may go away, poll again after the backoff period.
    Continue(Error),
}

impl LoopState {
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::Permanent(_))
    }
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted(_))
    }
    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue(_))
    }

    /// Consumes the decision, returning the error that triggered it.
    pub fn into_error(self) -> Error {
        match self {
            Self::Permanent(e) | Self::Exhausted(e) | Self::Continue(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::rpc::{Code, Status};

    #[test]
    fn predicates() {
        let flow = LoopState::Permanent(not_found());
        assert!(flow.is_permanent(), "{flow:?}");
        assert!(!flow.is_exhausted(), "{flow:?}");
        assert!(!flow.is_continue(), "{flow:?}");

        let flow = LoopState::Exhausted(unavailable());
        assert!(!flow.is_permanent(), "{flow:?}");
        assert!(flow.is_exhausted(), "{flow:?}");
        assert!(!flow.is_continue(), "{flow:?}");

        let flow = LoopState::Continue(unavailable());
        assert!(!flow.is_permanent(), "{flow:?}");
        assert!(!flow.is_exhausted(), "{flow:?}");
        assert!(flow.is_continue(), "{flow:?}");
    }

    #[test]
    fn into_error() {
        let e = LoopState::Permanent(not_found()).into_error();
        assert_eq!(e.code(), Code::NotFound);
        let e = LoopState::Continue(unavailable()).into_error();
        assert_eq!(e.code(), Code::Unavailable);
    }

    fn not_found() -> Error {
        Error::service(Status::default().set_code(Code::NotFound))
    }

    fn unavailable() -> Error {
        Error::service(Status::default().set_code(Code::Unavailable))
    }
}
