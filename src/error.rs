//! Error types for the typewire compiler and generated routines

use thiserror::Error;

/// Typewire errors
///
/// Every error is either a *schema* error (raised while building a compiled
/// routine, meaning the descriptor shape is unsupported) or a *value* error (raised
/// while running a routine on a specific input). See [`Error::classify`].
#[derive(Error, Debug, Clone)]
pub enum Error {
    // Schema errors (build time)
    /// Descriptor shape that the compiler cannot handle
    ///
    /// **Triggered by:** an `Opaque` type expression, or a union member with
    /// no effective base classification (nested unions, optionals)
    #[error("Serialization of {type_name} not supported")]
    UnsupportedType {
        /// Rendering of the offending type expression
        type_name: String,
    },

    /// Union whose members share an effective base classification
    ///
    /// **Triggered by:** `Union(Sequence(Int), Sequence(Str))` and similar;
    /// runtime dispatch between the members would be ambiguous
    #[error("Cannot serialize union of two types with the same base classification: {type_name}")]
    AmbiguousUnion {
        /// Rendering of the offending union
        type_name: String,
    },

    /// Union left without members after null stripping
    #[error("Union has no serializable members")]
    EmptyUnion,

    /// Statement list that does not parse into well-nested blocks
    ///
    /// Indicates a bug in an emitter (usually a hook implementation): an
    /// `if`/`for` header with no indented body, or an `elif` with no `if`.
    #[error("Malformed generated program: {message}")]
    MalformedProgram {
        /// What went wrong while grouping statements into blocks
        message: String,
    },

    // Value errors (run time)
    /// Type mismatch while executing a generated program
    #[error("Type error: expected {expected}, got {got}")]
    TypeMismatch {
        /// Expected type
        expected: String,
        /// Actual type
        got: String,
    },

    /// Reference to a variable the program never bound
    #[error("Undefined variable: {name}")]
    UndefinedVariable {
        /// Variable name
        name: String,
    },

    /// Reference to a constant missing from the constant table
    #[error("Undefined constant: {name}")]
    UndefinedConstant {
        /// Constant name
        name: String,
    },

    /// Sequence index beyond the value's length
    #[error("Index out of bounds: {index} for sequence of length {length}")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Sequence length
        length: usize,
    },

    /// Mapping lookup that found no matching key
    #[error("Key not found in mapping: {key}")]
    KeyNotFound {
        /// Display rendering of the key
        key: String,
    },

    /// Hook value without the requested field
    #[error("Field {field} not found on {type_name}")]
    FieldNotFound {
        /// Hook type name
        type_name: String,
        /// Requested field
        field: String,
    },

    /// Byte string that is not valid base64 text
    #[error("Invalid base64: {message}")]
    InvalidBase64 {
        /// Decoder message
        message: String,
    },

    /// Timestamp text that does not parse as ISO-8601
    #[error("Invalid timestamp: {message}")]
    InvalidTimestamp {
        /// Parser message
        message: String,
    },

    /// Value that cannot cross the JSON wire boundary
    ///
    /// **Triggered by:** handing bytes, timestamps, or hook values to the
    /// wire encoder directly; a serializer should have lowered them first
    #[error("Value of type {type_name} is not wire-representable")]
    NotWireRepresentable {
        /// Runtime type name
        type_name: String,
    },

    /// Non-finite float at the wire boundary
    #[error("Non-finite float cannot be encoded as JSON")]
    NonFiniteFloat,

    /// Error raised from within a generated program, with the failing line
    /// and the full rendered source attached for diagnosis
    #[error("Error in generated code at `{line}`: {cause}\n\nFull source:\n{source}")]
    InGeneratedCode {
        /// The generated line that was executing when the error was raised
        line: String,
        /// Full rendered program text
        source: String,
        /// Underlying error
        #[source]
        cause: Box<Error>,
    },

    // Storage
    /// Durable storage failure (read, write, or rename)
    #[error("Storage error: {message}")]
    Storage {
        /// Failure description
        message: String,
    },
}

/// Error classification: what phase raised it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Raised while building a compiled routine; the descriptor is bad
    Schema,
    /// Raised while running a compiled routine; the input is bad
    Value,
    /// Raised by the storage collaborator
    Storage,
}

impl Error {
    /// Create an unsupported-type schema error
    pub fn unsupported(type_name: impl Into<String>) -> Self {
        Error::UnsupportedType {
            type_name: type_name.into(),
        }
    }

    /// Create a type-mismatch value error
    pub fn type_mismatch(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Error::TypeMismatch {
            expected: expected.into(),
            got: got.into(),
        }
    }

    /// Classify this error by the phase that raises it
    pub fn classify(&self) -> ErrorKind {
        match self {
            Error::UnsupportedType { .. }
            | Error::AmbiguousUnion { .. }
            | Error::EmptyUnion
            | Error::MalformedProgram { .. } => ErrorKind::Schema,

            Error::Storage { .. } => ErrorKind::Storage,

            Error::InGeneratedCode { cause, .. } => cause.classify(),

            _ => ErrorKind::Value,
        }
    }

    /// The innermost error, unwrapping generated-code diagnostics
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::InGeneratedCode { cause, .. } => cause.root_cause(),
            other => other,
        }
    }
}

/// Result type for typewire operations
pub type Result<T> = std::result::Result<T, Error>;
