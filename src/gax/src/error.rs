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

mod core_error;
pub use core_error::*;

/// Errors and error details returned by remote services.
///
/// The adapter distinguishes between errors detected locally before any
/// request is sent (e.g. a missing required field), errors reported by the
/// transport (e.g. a broken connection or a timeout), and errors returned by
/// the service itself.
///
/// The types in this module represent the detailed information returned by
/// the services.
///
/// # Examples
///
/// ```
/// use cloud_samples_gax::error::Error;
/// use cloud_samples_gax::error::rpc::Code;
/// fn handle_error(e: Error) {
///     if e.code() == Code::NotFound {
///         println!("the resource does not exist: {e}");
///     }
///     if let Some(status) = e.status() {
///         println!("the service reported {status:?}")
///     }
/// }
/// ```
pub mod rpc;
