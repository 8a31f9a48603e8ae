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

//! Client configuration and per request options.
//!
//! The defaults work for most applications. [ClientConfig] changes them for
//! every call made through an executor, [RequestOptions] for a single call.
//! Neither type injects values into the request fields: the caller's request
//! reaches the transport as built.

use crate::polling_backoff_policy::{PollingBackoffPolicy, PollingBackoffPolicyArg};
use crate::polling_error_policy::{PollingErrorPolicy, PollingErrorPolicyArg};
use std::sync::Arc;
use std::time::Duration;

const LOGGING_VAR: &str = "CLOUD_SAMPLES_LOGGING";

/// A set of options configuring a single request.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    attempt_timeout: Option<Duration>,
    polling_error_policy: Option<Arc<dyn PollingErrorPolicy>>,
    polling_backoff_policy: Option<Arc<dyn PollingBackoffPolicy>>,
}

impl RequestOptions {
    /// Sets the timeout for each round trip to the service.
    ///
    /// A paginated call makes one round trip per page, and polling an
    /// operation makes one round trip per poll. The timeout applies to each
    /// of them independently.
    pub fn set_attempt_timeout<T: Into<Duration>>(mut self, v: T) -> Self {
        self.attempt_timeout = Some(v.into());
        self
    }

    /// Gets the current per-attempt timeout.
    pub fn attempt_timeout(&self) -> &Option<Duration> {
        &self.attempt_timeout
    }

    /// Get the current polling error policy override, if any.
    pub fn polling_error_policy(&self) -> &Option<Arc<dyn PollingErrorPolicy>> {
        &self.polling_error_policy
    }

    /// Sets the polling error policy for this request.
    pub fn set_polling_error_policy<V: Into<PollingErrorPolicyArg>>(mut self, v: V) -> Self {
        self.polling_error_policy = Some(v.into().0);
        self
    }

    /// Get the current polling backoff policy override, if any.
    pub fn polling_backoff_policy(&self) -> &Option<Arc<dyn PollingBackoffPolicy>> {
        &self.polling_backoff_policy
    }

    /// Sets the polling backoff policy for this request.
    pub fn set_polling_backoff_policy<V: Into<PollingBackoffPolicyArg>>(mut self, v: V) -> Self {
        self.polling_backoff_policy = Some(v.into().0);
        self
    }

    /// Fills any option not set in `self` from `defaults`.
    pub fn or(self, defaults: &RequestOptions) -> Self {
        Self {
            attempt_timeout: self.attempt_timeout.or(defaults.attempt_timeout),
            polling_error_policy: self
                .polling_error_policy
                .or_else(|| defaults.polling_error_policy.clone()),
            polling_backoff_policy: self
                .polling_backoff_policy
                .or_else(|| defaults.polling_backoff_policy.clone()),
        }
    }
}

/// Configure an executor.
#[derive(Clone, Debug, Default)]
pub struct ClientConfig {
    tracing: bool,
    polling_error_policy: Option<Arc<dyn PollingErrorPolicy>>,
    polling_backoff_policy: Option<Arc<dyn PollingBackoffPolicy>>,
    request_options: RequestOptions,
}

impl ClientConfig {
    /// Returns a default [ClientConfig].
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if tracing spans should be emitted.
    ///
    /// Set with [enable_tracing][Self::enable_tracing] or with
    /// `CLOUD_SAMPLES_LOGGING=true` in the environment.
    pub fn tracing_enabled(&self) -> bool {
        self.tracing || logging_requested(std::env::var(LOGGING_VAR))
    }

    /// Enables tracing.
    pub fn enable_tracing(mut self) -> Self {
        self.tracing = true;
        self
    }

    /// Disables tracing.
    pub fn disable_tracing(mut self) -> Self {
        self.tracing = false;
        self
    }

    /// Configure the polling error policy.
    pub fn set_polling_error_policy<V: Into<PollingErrorPolicyArg>>(mut self, v: V) -> Self {
        self.polling_error_policy = Some(v.into().0);
        self
    }

    pub fn polling_error_policy(&self) -> &Option<Arc<dyn PollingErrorPolicy>> {
        &self.polling_error_policy
    }

    /// Configure the polling backoff policy.
    pub fn set_polling_backoff_policy<V: Into<PollingBackoffPolicyArg>>(mut self, v: V) -> Self {
        self.polling_backoff_policy = Some(v.into().0);
        self
    }

    pub fn polling_backoff_policy(&self) -> &Option<Arc<dyn PollingBackoffPolicy>> {
        &self.polling_backoff_policy
    }

    /// Configure the options used when a call does not provide its own.
    pub fn set_request_options(mut self, v: RequestOptions) -> Self {
        self.request_options = v;
        self
    }

    pub fn request_options(&self) -> &RequestOptions {
        &self.request_options
    }

    /// Merges per-call options with the client defaults.
    ///
    /// Request-level settings win, then the client's default
    /// [RequestOptions], then the client-level polling policies.
    pub fn effective_options(&self, options: RequestOptions) -> RequestOptions {
        let merged = options.or(&self.request_options);
        RequestOptions {
            polling_error_policy: merged
                .polling_error_policy
                .or_else(|| self.polling_error_policy.clone()),
            polling_backoff_policy: merged
                .polling_backoff_policy
                .or_else(|| self.polling_backoff_policy.clone()),
            ..merged
        }
    }
}

fn logging_requested(value: std::result::Result<String, std::env::VarError>) -> bool {
    value.map(|v| v == "true").unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exponential_backoff::ExponentialBackoffBuilder;
    use crate::polling_error_policy::{AlwaysContinue, LimitedAttemptCount};
    use std::time::Instant;

    #[test]
    fn request_options() {
        let opts = RequestOptions::default();
        assert!(opts.attempt_timeout().is_none());
        assert!(opts.polling_error_policy().is_none());
        assert!(opts.polling_backoff_policy().is_none());

        let opts = opts
            .set_attempt_timeout(Duration::from_secs(5))
            .set_polling_error_policy(AlwaysContinue)
            .set_polling_backoff_policy(ExponentialBackoffBuilder::new().clamp());
        assert_eq!(opts.attempt_timeout(), &Some(Duration::from_secs(5)));
        assert!(opts.polling_error_policy().is_some());
        assert!(opts.polling_backoff_policy().is_some());
    }

    #[test]
    fn request_options_or() {
        let defaults = RequestOptions::default()
            .set_attempt_timeout(Duration::from_secs(30))
            .set_polling_error_policy(AlwaysContinue);
        let got = RequestOptions::default()
            .set_attempt_timeout(Duration::from_secs(1))
            .or(&defaults);
        assert_eq!(got.attempt_timeout(), &Some(Duration::from_secs(1)));
        assert!(got.polling_error_policy().is_some());
        assert!(got.polling_backoff_policy().is_none());
    }

    #[test]
    fn tracing() {
        let config = ClientConfig::new().enable_tracing();
        assert!(config.tracing_enabled());
        assert!(logging_requested(Ok("true".to_string())));
        assert!(!logging_requested(Ok("false".to_string())));
        assert!(!logging_requested(Err(std::env::VarError::NotPresent)));
    }

    #[test]
    fn effective_options() {
        let config = ClientConfig::new()
            .set_polling_error_policy(LimitedAttemptCount::new(3))
            .set_request_options(
                RequestOptions::default().set_attempt_timeout(Duration::from_secs(10)),
            );
        let got = config.effective_options(RequestOptions::default());
        assert_eq!(got.attempt_timeout(), &Some(Duration::from_secs(10)));
        let policy = got.polling_error_policy().clone();
        let unavailable = crate::error::Error::io("connection reset");
        let state = policy.map(|p| p.on_error(Instant::now(), 3, unavailable));
        assert!(matches!(state, Some(s) if s.is_exhausted()));

        let got = config.effective_options(
            RequestOptions::default().set_polling_error_policy(AlwaysContinue),
        );
        let state = got
            .polling_error_policy()
            .as_ref()
            .map(|p| p.on_error(Instant::now(), 3, crate::error::Error::io("reset")));
        assert!(matches!(state, Some(s) if s.is_continue()));
    }
}
