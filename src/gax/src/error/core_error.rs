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

use super::rpc::{Code, Status};
use std::error::Error as StdError;

type BoxError = Box<dyn StdError + Send + Sync>;

/// The core error returned by the adapter.
///
/// Errors come from multiple sources. The request may be malformed and
/// rejected before anything is sent, the transport may fail or time out, or
/// the remote service may reject the request.
///
/// Most applications will just return the error or log it. Applications that
/// need to react to specific failures use [code()][Error::code], which maps
/// every error onto the canonical [Code] taxonomy, or the predicates
/// (`is_binding()`, `is_timeout()`, ...) for finer detail. The error
/// [source][std::error::Error::source] holds the underlying cause, if any.
///
/// # Example
/// ```
/// use cloud_samples_gax::error::Error;
/// use cloud_samples_gax::error::rpc::Code;
/// match example_function() {
///     Err(e) if e.code() == Code::NotFound => { println!("no such thing {e}"); },
///     Err(e) if e.code() == Code::Unavailable => { println!("try again later {e}"); },
///     Err(e) => { println!("some other error {e}"); },
///     Ok(_) => { println!("success, how boring"); },
/// }
///
/// fn example_function() -> Result<String, Error> {
///     // ... details omitted ...
///     # use cloud_samples_gax::error::rpc::Status;
///     # Err(Error::service(Status::default().set_code(Code::NotFound).set_message("NOT FOUND")))
/// }
/// ```
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    source: Option<BoxError>,
}

impl Error {
    /// Creates an error with the information returned by a remote service.
    ///
    /// # Example
    /// ```
    /// use cloud_samples_gax::error::Error;
    /// use cloud_samples_gax::error::rpc::{Code, Status};
    /// let status = Status::default().set_code(Code::NotFound).set_message("NOT FOUND");
    /// let error = Error::service(status.clone());
    /// assert_eq!(error.status(), Some(&status));
    /// assert_eq!(error.code(), Code::NotFound);
    /// ```
    pub fn service(status: Status) -> Self {
        Self {
            kind: ErrorKind::Service(Box::new(status)),
            source: None,
        }
    }

    /// The [Status] payload associated with this error, if it came from the
    /// remote service.
    pub fn status(&self) -> Option<&Status> {
        match &self.kind {
            ErrorKind::Service(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    /// Recurses through the source error chain and returns a reference to
    /// the inner value if it is of type `T`, or `None` if no such inner value
    /// is found.
    pub fn as_inner<T: StdError + Send + Sync + 'static>(&self) -> Option<&T> {
        let mut error = self.source.as_ref()?.as_ref() as &(dyn StdError + 'static);
        loop {
            if let Some(inner) = error.downcast_ref::<T>() {
                return Some(inner);
            }
            error = error.source()?;
        }
    }

    /// Creates an error representing a request that could not be built.
    ///
    /// This is always a local error, detected before any request is sent: a
    /// required field is missing, a field is unknown, or a value cannot be
    /// converted to the declared field type.
    ///
    /// # Example
    /// ```
    /// use std::error::Error as _;
    /// use cloud_samples_gax::error::Error;
    /// use cloud_samples_gax::error::rpc::Code;
    /// let error = Error::binding("missing field `parent`");
    /// assert!(error.is_binding());
    /// assert_eq!(error.code(), Code::InvalidArgument);
    /// assert!(error.source().is_some());
    /// ```
    pub fn binding<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Binding,
            source: Some(source.into()),
        }
    }

    /// If true, the request was rejected locally because its shape did not
    /// match the operation's declared fields.
    ///
    /// # Troubleshooting
    ///
    /// These errors are deterministic, retrying the same request fails in the
    /// same way. Inspect the error message, it names the offending field.
    pub fn is_binding(&self) -> bool {
        matches!(self.kind, ErrorKind::Binding)
    }

    /// Creates an error representing a response that cannot be rendered in
    /// the requested output style.
    pub fn format<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Format,
            source: Some(source.into()),
        }
    }

    /// If true, the response could not be rendered in the requested style.
    ///
    /// The most common cause is requesting a tabular rendering for rows with
    /// different widths.
    pub fn is_format(&self) -> bool {
        matches!(self.kind, ErrorKind::Format)
    }

    /// Creates an error representing a timeout.
    ///
    /// # Example
    /// ```
    /// use std::error::Error as _;
    /// use cloud_samples_gax::error::Error;
    /// use cloud_samples_gax::error::rpc::Code;
    /// let error = Error::timeout("simulated timeout");
    /// assert!(error.is_timeout());
    /// assert_eq!(error.code(), Code::Unavailable);
    /// assert!(error.source().is_some());
    /// ```
    pub fn timeout<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Timeout,
            source: Some(source.into()),
        }
    }

    /// The request could not be completed before its deadline.
    ///
    /// Note that the request may or may not have reached the service. The
    /// remote state is unknown.
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, ErrorKind::Timeout)
    }

    /// Creates an error representing a failure in the transport layer.
    ///
    /// Examples include a broken connection, or a connection that could not
    /// be established.
    pub fn io<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Transport,
            source: Some(source.into()),
        }
    }

    /// If true, the transport could not complete the round trip.
    pub fn is_io(&self) -> bool {
        matches!(self.kind, ErrorKind::Transport)
    }

    /// Creates an error representing a response that could not be decoded.
    ///
    /// # Example
    /// ```
    /// use cloud_samples_gax::error::Error;
    /// let error = Error::deser("neither result nor error set");
    /// assert!(error.is_deserialization());
    /// ```
    pub fn deser<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Deserialization,
            source: Some(source.into()),
        }
    }

    /// The response could not be decoded into the expected shape.
    ///
    /// This typically indicates a bug in the transport, or a transport that
    /// does not honor the contract for long-running operations.
    pub fn is_deserialization(&self) -> bool {
        matches!(self.kind, ErrorKind::Deserialization)
    }

    /// Creates an error representing an exhausted polling policy.
    ///
    /// # Example
    /// ```
    /// use std::error::Error as _;
    /// use cloud_samples_gax::error::Error;
    /// let error = Error::exhausted("too many polling attempts");
    /// assert!(error.is_exhausted());
    /// assert!(error.source().is_some());
    /// ```
    pub fn exhausted<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Exhausted,
            source: Some(source.into()),
        }
    }

    /// The polling loop stopped before the operation completed.
    ///
    /// This is always a caller-side error. The remote operation keeps running.
    pub fn is_exhausted(&self) -> bool {
        matches!(self.kind, ErrorKind::Exhausted)
    }

    /// The canonical code for this error.
    ///
    /// Service errors return the code reported by the service. Local
    /// validation and formatting errors return [Code::InvalidArgument].
    /// Transport failures and timeouts return [Code::Unavailable].
    pub fn code(&self) -> Code {
        match &self.kind {
            ErrorKind::Service(s) => s.code,
            ErrorKind::Binding | ErrorKind::Format => Code::InvalidArgument,
            ErrorKind::Timeout | ErrorKind::Transport => Code::Unavailable,
            ErrorKind::Deserialization => Code::Internal,
            ErrorKind::Exhausted => self
                .source
                .as_ref()
                .and_then(|e| e.downcast_ref::<Error>())
                .map(Error::code)
                .unwrap_or(Code::DeadlineExceeded),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.kind, &self.source) {
            (ErrorKind::Binding, Some(e)) => write!(f, "cannot build the request: {e}"),
            (ErrorKind::Format, Some(e)) => write!(f, "cannot format the response: {e}"),
            (ErrorKind::Deserialization, Some(e)) => {
                write!(f, "cannot deserialize the response: {e}")
            }
            (ErrorKind::Timeout, Some(e)) => {
                write!(f, "the request exceeded the request deadline: {e}")
            }
            (ErrorKind::Transport, Some(e)) => write!(f, "the transport reports an error: {e}"),
            (ErrorKind::Exhausted, Some(e)) => write!(f, "{e}"),
            (ErrorKind::Service(s), _) => write!(
                f,
                "the service reports an error with code {} described as: {}",
                s.code, s.message
            ),
            (_, None) => unreachable!("no constructor allows this"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error))
    }
}

/// The type of error held by an [Error] instance.
#[derive(Debug)]
enum ErrorKind {
    Binding,
    Format,
    Deserialization,
    Timeout,
    Exhausted,
    Transport,
    Service(Box<Status>),
}
