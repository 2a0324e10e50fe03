//! Error values and the response envelope

use std::fmt;

use arcstr::ArcStr;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::{parser::SourcePosition, value::Value};

/// Category of an execution error, serialized into the `type` field of the
/// wire envelope.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Resolver failures, panics and other engine-internal conditions.
    Internal,
    /// The request document is malformed or fails validation.
    BadQuery,
    /// Variable values do not match their declared types.
    InvalidInput,
    /// Any other categorization a resolver attaches to its errors.
    Custom(ArcStr),
}

impl ErrorKind {
    /// Wire representation of this kind.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Internal => "INTERNAL",
            Self::BadQuery => "BadQuery",
            Self::InvalidInput => "InvalidInput",
            Self::Custom(s) => s,
        }
    }
}

impl Serialize for ErrorKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Error payload produced by a failing field
///
/// Anything that can be displayed converts into one with the
/// [`ErrorKind::Internal`] kind, so resolvers can use `?` on their own error
/// types.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldError {
    kind: ErrorKind,
    message: String,
    stack_trace: Option<String>,
}

impl<T: fmt::Display> From<T> for FieldError {
    fn from(e: T) -> Self {
        Self {
            kind: ErrorKind::Internal,
            message: e.to_string(),
            stack_trace: None,
        }
    }
}

impl FieldError {
    /// Construct a new error with the given kind and message.
    pub fn new<M: Into<String>>(kind: ErrorKind, message: M) -> Self {
        Self {
            kind,
            message: message.into(),
            stack_trace: None,
        }
    }

    /// Shorthand for an [`ErrorKind::Internal`] error.
    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Shorthand for an [`ErrorKind::InvalidInput`] error.
    pub fn invalid_input<M: Into<String>>(message: M) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    /// Reported when a paused resolver is woken up after its request was
    /// stopped.
    pub fn coroutine_stopped() -> Self {
        Self::internal("Coroutine Stopped")
    }

    /// Reported when execution runs past the request deadline.
    pub fn deadline_exceeded() -> Self {
        Self::new(
            ErrorKind::Custom(arcstr::literal!("DeadlineExceeded")),
            "deadline exceeded",
        )
    }

    /// Attaches a stack trace to be carried in the envelope.
    pub fn with_stack_trace<T: Into<String>>(mut self, trace: T) -> Self {
        self.stack_trace = Some(trace.into());
        self
    }

    /// The error kind.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// The error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The attached stack trace, if any.
    pub fn stack_trace(&self) -> Option<&str> {
        self.stack_trace.as_deref()
    }
}

/// One step in the response path of an error
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum PathSegment {
    /// Response name of a field.
    Field(String),
    /// Index of a list element.
    Index(usize),
}

impl Serialize for PathSegment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Field(name) => serializer.serialize_str(name),
            Self::Index(idx) => serializer.serialize_u64(*idx as u64),
        }
    }
}

/// Error occurring during query execution
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutionError {
    locations: Vec<SourcePosition>,
    path: Vec<PathSegment>,
    error: FieldError,
}

impl ExecutionError {
    #[doc(hidden)]
    pub fn new(location: SourcePosition, path: Vec<PathSegment>, error: FieldError) -> Self {
        Self {
            locations: vec![location],
            path,
            error,
        }
    }

    /// Construct an error with no source location, e.g. for failures outside
    /// any field.
    pub fn at_origin(error: FieldError) -> Self {
        Self {
            locations: vec![],
            path: vec![],
            error,
        }
    }

    #[doc(hidden)]
    pub fn at_locations(locations: Vec<SourcePosition>, error: FieldError) -> Self {
        Self {
            locations,
            path: vec![],
            error,
        }
    }

    /// The error message.
    pub fn error(&self) -> &FieldError {
        &self.error
    }

    /// The source locations of the failing part of the query.
    pub fn locations(&self) -> &[SourcePosition] {
        &self.locations
    }

    /// The path from the query root to the failing field.
    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }

    pub(crate) fn sort_key(&self) -> (Option<SourcePosition>, &[PathSegment]) {
        (self.locations.first().copied(), &self.path)
    }
}

impl Serialize for ExecutionError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Location(SourcePosition);

        impl Serialize for Location {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                // 1-based on the wire.
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("line", &(self.0.line() + 1))?;
                map.serialize_entry("column", &(self.0.column() + 1))?;
                map.end()
            }
        }

        struct Locations<'a>(&'a [SourcePosition]);

        impl Serialize for Locations<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
                for loc in self.0 {
                    seq.serialize_element(&Location(*loc))?;
                }
                seq.end()
            }
        }

        let mut len = 2;
        if !self.locations.is_empty() {
            len += 1;
        }
        if !self.path.is_empty() {
            len += 1;
        }
        if self.error.stack_trace().is_some() {
            len += 1;
        }

        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("type", self.error.kind())?;
        map.serialize_entry("message", self.error.message())?;
        if !self.locations.is_empty() {
            map.serialize_entry("locations", &Locations(&self.locations))?;
        }
        if !self.path.is_empty() {
            map.serialize_entry("path", &self.path)?;
        }
        if let Some(trace) = self.error.stack_trace() {
            map.serialize_entry("stackTrace", trace)?;
        }
        map.end()
    }
}

/// The full outcome of running one request
///
/// `data` is null whenever execution failed before producing any field.
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    /// The (partial) response data.
    pub data: Value,
    /// Every error recorded on the way, in source order.
    pub errors: Vec<ExecutionError>,
}

impl Response {
    /// A response carrying data and no errors.
    pub fn from_data(data: Value) -> Self {
        Self {
            data,
            errors: vec![],
        }
    }

    /// A failed response with no data.
    pub fn from_errors(errors: Vec<ExecutionError>) -> Self {
        Self {
            data: Value::Null,
            errors,
        }
    }

    /// Was the request executed without any errors?
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.errors.is_empty() { 1 } else { 2 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("data", &self.data)?;
        if !self.errors.is_empty() {
            map.serialize_entry("errors", &self.errors)?;
        }
        map.end()
    }
}
