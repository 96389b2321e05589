//! Captured failure information.

use std::any::Any;
use std::error::Error;
use std::panic::Location;

use serde::{Deserialize, Serialize};

/// Type name used for failures that unwound as a panic.
pub const PANIC_TYPE_NAME: &str = "panic";

/// Type name used when a type-erased error does not reveal its concrete type.
pub const UNKNOWN_ERROR_TYPE_NAME: &str = "Error";

/// A failure that escaped a scoped block.
///
/// Created once per failing scope invocation and consumed by the search
/// pipeline and the renderer. Immutable after capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionInfo {
    type_name: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    traceback: Vec<String>,
}

impl ExceptionInfo {
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            message: message.into(),
            location: None,
            traceback: Vec::new(),
        }
    }

    /// Captures an error value.
    ///
    /// The type name is the last path segment of `E` without generic
    /// arguments (`core::num::error::ParseIntError` becomes `ParseIntError`).
    /// The error's `source()` chain becomes the traceback.
    pub fn from_error<E: Error>(err: &E) -> Self {
        Self {
            type_name: short_type_name(std::any::type_name::<E>()).to_string(),
            message: err.to_string(),
            location: None,
            traceback: source_chain(err.source()),
        }
    }

    /// Captures a type-erased error such as the contents of a `Box<dyn Error>`.
    ///
    /// The concrete type name is recovered from the leading identifier of the
    /// error's `Debug` output when it has one (`ParseIntError { kind: .. }`),
    /// otherwise [`UNKNOWN_ERROR_TYPE_NAME`] is used.
    pub fn from_dyn_error(err: &dyn Error) -> Self {
        let debug = format!("{err:?}");
        let type_name = debug_type_name(&debug).unwrap_or(UNKNOWN_ERROR_TYPE_NAME);

        Self {
            type_name: type_name.to_string(),
            message: err.to_string(),
            location: None,
            traceback: source_chain(err.source()),
        }
    }

    /// Captures a panic payload as returned by `catch_unwind`.
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "Box<dyn Any>".to_string()
        };

        Self::new(PANIC_TYPE_NAME, message)
    }

    /// Records where the failure was observed.
    pub fn with_location(mut self, location: &Location<'_>) -> Self {
        self.location = Some(location.to_string());
        self
    }

    pub fn with_traceback(mut self, traceback: Vec<String>) -> Self {
        self.traceback = traceback;
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn traceback(&self) -> &[String] {
        &self.traceback
    }
}

/// Error values a scope can capture.
///
/// Implemented for every concrete `E: Error`, for `Box<dyn Error>` (with and
/// without `Send + Sync`) and for `anyhow::Error`. `M` only selects the impl
/// and is always inferred.
pub trait CaptureError<M> {
    fn capture(&self) -> ExceptionInfo;
}

/// Impl selectors for [`CaptureError`].
pub mod marker {
    pub enum Typed {}
    pub enum Boxed {}
    pub enum BoxedSendSync {}
    pub enum Anyhow {}
}

impl<E: Error> CaptureError<marker::Typed> for E {
    fn capture(&self) -> ExceptionInfo {
        ExceptionInfo::from_error(self)
    }
}

impl CaptureError<marker::Boxed> for Box<dyn Error> {
    fn capture(&self) -> ExceptionInfo {
        ExceptionInfo::from_dyn_error(&**self)
    }
}

impl CaptureError<marker::BoxedSendSync> for Box<dyn Error + Send + Sync> {
    fn capture(&self) -> ExceptionInfo {
        ExceptionInfo::from_dyn_error(&**self)
    }
}

impl CaptureError<marker::Anyhow> for anyhow::Error {
    fn capture(&self) -> ExceptionInfo {
        ExceptionInfo::from_dyn_error(&**self)
    }
}

fn source_chain(mut source: Option<&(dyn Error + 'static)>) -> Vec<String> {
    let mut traceback = Vec::new();
    while let Some(cause) = source {
        traceback.push(cause.to_string());
        source = cause.source();
    }
    traceback
}

/// Leading type identifier of a `Debug` rendering, if it looks like one.
fn debug_type_name(debug: &str) -> Option<&str> {
    let end = debug
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(debug.len());
    let (name, rest) = debug.split_at(end);
    let starts_upper = name.chars().next().is_some_and(|c| c.is_ascii_uppercase());
    let terminated = rest.is_empty() || rest.starts_with([' ', '{', '(']);
    (starts_upper && terminated).then_some(name)
}

/// Strips the module path and generic arguments from a type name.
fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct ZeroDivisionError;

    impl fmt::Display for ZeroDivisionError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "division by zero")
        }
    }

    impl Error for ZeroDivisionError {}

    #[derive(Debug)]
    struct LoadError {
        cause: ZeroDivisionError,
    }

    impl fmt::Display for LoadError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "failed to compute ratio")
        }
    }

    impl Error for LoadError {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.cause)
        }
    }

    #[test]
    fn test_from_error_uses_short_type_name() {
        let err = "abc".parse::<i32>().unwrap_err();
        let info = ExceptionInfo::from_error(&err);
        assert_eq!(info.type_name(), "ParseIntError");
        assert_eq!(info.message(), "invalid digit found in string");
        assert!(info.traceback().is_empty());
    }

    #[test]
    fn test_from_error_collects_source_chain() {
        let err = LoadError {
            cause: ZeroDivisionError,
        };
        let info = ExceptionInfo::from_error(&err);
        assert_eq!(info.type_name(), "LoadError");
        assert_eq!(info.traceback(), &["division by zero".to_string()]);
    }

    #[test]
    fn test_from_panic_reads_str_and_string_payloads() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(ExceptionInfo::from_panic(payload.as_ref()).message(), "boom");

        let payload: Box<dyn Any + Send> = Box::new(String::from("index out of bounds"));
        let info = ExceptionInfo::from_panic(payload.as_ref());
        assert_eq!(info.type_name(), PANIC_TYPE_NAME);
        assert_eq!(info.message(), "index out of bounds");

        let payload: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(ExceptionInfo::from_panic(payload.as_ref()).message(), "Box<dyn Any>");
    }

    #[test]
    fn test_short_type_name_strips_generics() {
        assert_eq!(short_type_name("alloc::boxed::Box<dyn core::error::Error>"), "Box");
        assert_eq!(short_type_name("anyhow::Error"), "Error");
        assert_eq!(short_type_name("Plain"), "Plain");
    }

    #[test]
    fn test_boxed_error_recovers_concrete_type_name() {
        let boxed: Box<dyn Error> = Box::new("12x".parse::<u32>().unwrap_err());
        let info = boxed.capture();
        assert_eq!(info.type_name(), "ParseIntError");
        assert_eq!(info.message(), "invalid digit found in string");
    }

    #[test]
    fn test_boxed_send_sync_error_keeps_source_chain() {
        let boxed: Box<dyn Error + Send + Sync> = Box::new(LoadError {
            cause: ZeroDivisionError,
        });
        let info = boxed.capture();
        assert_eq!(info.type_name(), "LoadError");
        assert_eq!(info.message(), "failed to compute ratio");
        assert_eq!(info.traceback(), &["division by zero".to_string()]);
    }

    #[test]
    fn test_boxed_string_error_uses_neutral_type_name() {
        let boxed: Box<dyn Error> = "config missing".into();
        let info = boxed.capture();
        assert_eq!(info.type_name(), UNKNOWN_ERROR_TYPE_NAME);
        assert_eq!(info.message(), "config missing");
    }

    #[test]
    fn test_anyhow_error_capture() {
        let err = anyhow::Error::new(ZeroDivisionError);
        let info = err.capture();
        assert_eq!(info.type_name(), "ZeroDivisionError");
        assert_eq!(info.message(), "division by zero");

        let info = anyhow::anyhow!("lost connection").capture();
        assert_eq!(info.type_name(), UNKNOWN_ERROR_TYPE_NAME);
        assert_eq!(info.message(), "lost connection");
    }

    #[test]
    fn test_typed_capture_matches_from_error() {
        let err = LoadError {
            cause: ZeroDivisionError,
        };
        assert_eq!(err.capture(), ExceptionInfo::from_error(&err));
    }

    #[test]
    fn test_debug_type_name() {
        assert_eq!(debug_type_name("ParseIntError { kind: InvalidDigit }"), Some("ParseIntError"));
        assert_eq!(debug_type_name("ZeroDivisionError"), Some("ZeroDivisionError"));
        assert_eq!(debug_type_name("Os(2)"), Some("Os"));
        assert_eq!(debug_type_name("\"config missing\""), None);
        assert_eq!(debug_type_name("lost connection"), None);
        assert_eq!(debug_type_name("Weird-name"), None);
    }

    #[test]
    fn test_with_location_formats_file_line_column() {
        let info = ExceptionInfo::new("IoError", "missing").with_location(Location::caller());
        let location = info.location().unwrap();
        assert!(location.starts_with(file!()));
    }
}
