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

//! A typed request/response adapter for Google Cloud style APIs.
//!
//! The adapter has three parts:
//! * The request builder validates flat caller parameters against an
//!   operation schema and produces a [Request][request::Request].
//! * The [Executor][executor::Executor] sends the request through a
//!   [Transport][transport::Transport] and returns a single result, a lazy
//!   sequence of pages, or a long-running operation handle.
//! * The formatter renders a [Response][response::Response] as text lines or
//!   tabular rows, which [sinks][sink] write out.
//!
//! Authentication and the network transport itself are supplied by the
//! application.

pub use gax::Result;
pub use gax::error::Error;

pub mod executor;
pub mod format;
pub mod path_template;
pub mod request;
pub mod response;
pub mod schema;
pub mod sink;
pub mod transport;
pub mod value;
