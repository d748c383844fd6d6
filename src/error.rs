use std::fmt::{self, Display};
use std::io;
use std::str::FromStr;

use serde::{de, ser};

/// Errors produced while parsing, stringifying, or (de)serializing a
/// querystring.
///
/// Every parse error is terminal: the first violation aborts the call and no
/// partial [`Document`](crate::Document) is returned. Byte offsets are
/// relative to the start of the input handed to the parser.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("input exceeds maximum length of {limit} bytes (received {actual})")]
    InputTooLong { limit: usize, actual: usize },

    #[error("too many parameters: received {actual}, limit {limit}")]
    TooManyParameters { limit: usize, actual: usize },

    #[error("maximum bracket depth exceeded in key `{key}` (depth {depth}, limit {limit})")]
    DepthExceeded {
        key: String,
        depth: usize,
        limit: usize,
    },

    #[error("unmatched bracket in key `{key}` at byte offset {index}")]
    UnmatchedBracket { key: String, index: usize },

    #[error("unexpected `?` inside query at byte offset {index}")]
    UnexpectedQuestionMark { index: usize },

    #[error("invalid percent-encoding at byte offset {index}")]
    InvalidPercentEncoding { index: usize },

    #[error("component at byte offset {index} does not decode to valid UTF-8")]
    InvalidUtf8 { index: usize },

    #[error("invalid character {character:?} at byte offset {index}")]
    InvalidCharacter { character: char, index: usize },

    #[error("duplicate key `{key}`: the path was already written or has another shape")]
    DuplicateKey { key: String },

    /// A serialized key holds a control character, which no parser accepts.
    #[error("key {key:?} contains a control character")]
    InvalidKey { key: String },

    /// A serialized value holds a control character, which no parser accepts.
    #[error("value at key `{key}` contains a control character")]
    InvalidValue { key: String },

    /// A message raised by a `Serialize` or `Deserialize` implementation.
    #[error("{0}")]
    Custom(String),

    /// The type cannot be represented in a querystring.
    #[error("unsupported type for querystring serialization")]
    Unsupported,

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Returns the closed tag of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InputTooLong { .. } => ErrorKind::InputTooLong,
            Error::TooManyParameters { .. } => ErrorKind::TooManyParameters,
            Error::DepthExceeded { .. } => ErrorKind::DepthExceeded,
            Error::UnmatchedBracket { .. } => ErrorKind::UnmatchedBracket,
            Error::UnexpectedQuestionMark { .. } => ErrorKind::UnexpectedQuestionMark,
            Error::InvalidPercentEncoding { .. } => ErrorKind::InvalidPercentEncoding,
            Error::InvalidUtf8 { .. } => ErrorKind::InvalidUtf8,
            Error::InvalidCharacter { .. } => ErrorKind::InvalidCharacter,
            Error::DuplicateKey { .. } => ErrorKind::DuplicateKey,
            Error::InvalidKey { .. } => ErrorKind::InvalidKey,
            Error::InvalidValue { .. } => ErrorKind::InvalidValue,
            Error::Custom(_) => ErrorKind::Custom,
            Error::Unsupported => ErrorKind::Unsupported,
            Error::Io(_) => ErrorKind::Io,
        }
    }

    /// Generate error to show top-level type cannot be serialized or
    /// deserialized.
    pub(crate) fn top_level(object: &'static str) -> Self {
        Error::Custom(format!(
            "cannot use {object} at the top level of a querystring, try a struct or a map"
        ))
    }
}

/// The kind of an [`Error`], without its payload.
///
/// The first nine variants are the rejections of the parser. Their
/// [`as_str`](ErrorKind::as_str) names are the tags used by the test corpora
/// under `tests/data/`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InputTooLong,
    TooManyParameters,
    DepthExceeded,
    UnmatchedBracket,
    UnexpectedQuestionMark,
    InvalidPercentEncoding,
    InvalidUtf8,
    InvalidCharacter,
    DuplicateKey,
    InvalidKey,
    InvalidValue,
    Custom,
    Unsupported,
    Io,
}

impl ErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InputTooLong => "input_too_long",
            ErrorKind::TooManyParameters => "too_many_parameters",
            ErrorKind::DepthExceeded => "depth_exceeded",
            ErrorKind::UnmatchedBracket => "unmatched_bracket",
            ErrorKind::UnexpectedQuestionMark => "unexpected_question_mark",
            ErrorKind::InvalidPercentEncoding => "invalid_percent_encoding",
            ErrorKind::InvalidUtf8 => "invalid_utf8",
            ErrorKind::InvalidCharacter => "invalid_character",
            ErrorKind::DuplicateKey => "duplicate_key",
            ErrorKind::InvalidKey => "invalid_key",
            ErrorKind::InvalidValue => "invalid_value",
            ErrorKind::Custom => "custom",
            ErrorKind::Unsupported => "unsupported",
            ErrorKind::Io => "io",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the [`ErrorKind`] tags.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown error kind `{0}`")]
pub struct UnknownErrorKind(pub String);

impl FromStr for ErrorKind {
    type Err = UnknownErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "input_too_long" => ErrorKind::InputTooLong,
            "too_many_parameters" => ErrorKind::TooManyParameters,
            "depth_exceeded" => ErrorKind::DepthExceeded,
            "unmatched_bracket" => ErrorKind::UnmatchedBracket,
            "unexpected_question_mark" => ErrorKind::UnexpectedQuestionMark,
            "invalid_percent_encoding" => ErrorKind::InvalidPercentEncoding,
            "invalid_utf8" => ErrorKind::InvalidUtf8,
            "invalid_character" => ErrorKind::InvalidCharacter,
            "duplicate_key" => ErrorKind::DuplicateKey,
            "invalid_key" => ErrorKind::InvalidKey,
            "invalid_value" => ErrorKind::InvalidValue,
            "custom" => ErrorKind::Custom,
            "unsupported" => ErrorKind::Unsupported,
            "io" => ErrorKind::Io,
            other => return Err(UnknownErrorKind(other.to_string())),
        })
    }
}

impl de::Error for Error {
    fn custom<T>(msg: T) -> Self
    where
        T: Display,
    {
        Error::Custom(msg.to_string())
    }
}

impl ser::Error for Error {
    fn custom<T>(msg: T) -> Self
    where
        T: Display,
    {
        Error::Custom(msg.to_string())
    }
}
