#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared across the normalizer crate."]

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free while still
//! exposing a thoroughly documented error surface for library consumers.

use std::path::{Path, PathBuf};

/// Unified error type returned by declaration loading and normalization.
///
/// Normalization is all-or-nothing: the first error aborts the whole
/// invocation, since ids and mappings derived from a partially resolved
/// declaration would be incoherent. Instances are typically constructed
/// through the helper constructors or by converting from serde error types
/// via the provided `From` implementations.
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// Wraps I/O errors that occur while reading declaration files.
    #[error("failed to read declaration from {path:?}: {source}")]
    Io {
        /// Location of the declaration file.
        path:   PathBuf,
        /// Underlying I/O error.
        source: std::io::Error
    },
    /// Wraps decoding errors raised while parsing a declaration document.
    #[error("failed to parse declaration: {source}")]
    Parse {
        /// Source decoding error from serde_yaml.
        source: serde_yaml::Error
    },
    /// Wraps serialization errors when writing normalized output.
    #[error("failed to serialize normalized configuration: {source}")]
    Serialize {
        /// Underlying serialization error.
        source: serde_json::Error
    },
    /// Returned when a string reference cannot be resolved in its namespace.
    #[error("unable to resolve reference '{reference}' from '{referrer}': {reason}")]
    Reference {
        /// Component whose field contained the dangling reference.
        referrer:  String,
        /// Reference value as authored in the declaration.
        reference: String,
        /// Short description of what was missing.
        reason:    String
    },
    /// Returned when two normalized components collide on the same id.
    #[error("duplicate component id '{id}'")]
    DuplicateId {
        /// Fully qualified component id that was produced twice.
        id: String
    },
    /// Returned when declaration objects combine in an unsupported way.
    #[error("conflicting configuration: {message}")]
    Conflict {
        /// Human readable message describing the conflict.
        message: String
    },
    /// Returned when CLI input fails validation before normalization.
    #[error("{message}")]
    Validation {
        /// Human readable message describing the invalid input.
        message: String
    }
}

impl Error {
    /// Constructs a reference-resolution error.
    ///
    /// # Parameters
    ///
    /// * `referrer` - Name of the component holding the reference.
    /// * `reference` - Reference string as authored.
    /// * `reason` - Short description of what was missing.
    pub fn reference<R, V, M>(referrer: R, reference: V, reason: M) -> Self
    where
        R: Into<String>,
        V: Into<String>,
        M: Into<String>
    {
        Self::Reference {
            referrer:  referrer.into(),
            reference: reference.into(),
            reason:    reason.into()
        }
    }

    /// Constructs a duplicate-id error for the provided component id.
    pub fn duplicate_id<I>(id: I) -> Self
    where
        I: Into<String>
    {
        Self::DuplicateId {
            id: id.into()
        }
    }

    /// Constructs a conflict error from the provided displayable value.
    pub fn conflict<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Conflict {
            message: message.into()
        }
    }

    /// Constructs a validation error from the provided displayable value.
    pub fn validation<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Validation {
            message: message.into()
        }
    }

    /// Formats the error for diagnostics without the variant name.
    ///
    /// This method is primarily intended for CLI contexts where the variant
    /// name does not add value to end users. The returned string matches the
    /// [`std::fmt::Display`] implementation.
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(source: serde_yaml::Error) -> Self {
        Self::Parse {
            source
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Serialize {
            source
        }
    }
}

/// Creates an [`Error::Io`] variant capturing the failing path and source.
///
/// # Parameters
///
/// * `path` - Location of the declaration file that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source
    }
}
