use std::io::{Read, Write};

use serde::de;

use crate::Document;
use crate::error::Result;

/// Configuration for parsing and stringifying querystrings.
///
/// The same `Config` type is used in both directions and is passed by value
/// to each call, so the options used to parse a document can differ from the
/// ones used to stringify it.
///
/// ## Limits
///
/// `max_length`, `max_params` and `max_depth` bound the work done by the
/// parser. All of them are unset by default, which means unlimited: callers
/// handling untrusted input should opt in to ceilings explicitly.
///
/// - `max_length` caps the raw byte length of the input.
/// - `max_params` caps the number of `&`-separated pairs.
/// - `max_depth` caps the number of bracket groups in a single key, so that
///   `a[b][c]=1` has a depth of 2.
///
/// ```
/// use strict_qs::{Config, ErrorKind};
///
/// let config = Config::new().max_depth(1);
/// assert!(config.parse_str("a[b]=1").is_ok());
///
/// let err = config.parse_str("a[b][c]=1").unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::DepthExceeded);
/// ```
///
/// ## Spaces
///
/// By default a literal `+` is kept as a `+` and spaces are written as
/// `%20`. With `space_as_plus`, `+` decodes to a space and spaces are written
/// as `+`, as in HTML form submissions.
///
/// Default values: `space_as_plus = false`, no limits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Config {
    pub(crate) space_as_plus: bool,
    pub(crate) max_params: Option<usize>,
    pub(crate) max_length: Option<usize>,
    pub(crate) max_depth: Option<usize>,
}

impl Config {
    pub const fn new() -> Self {
        Self {
            space_as_plus: false,
            max_params: None,
            max_length: None,
            max_depth: None,
        }
    }

    /// Decode `+` as a space, and encode spaces as `+`.
    pub const fn space_as_plus(mut self, space_as_plus: bool) -> Self {
        self.space_as_plus = space_as_plus;
        self
    }

    /// Rejects inputs with more than `max_params` pairs.
    pub const fn max_params(mut self, max_params: usize) -> Self {
        self.max_params = Some(max_params);
        self
    }

    /// Rejects inputs longer than `max_length` bytes.
    pub const fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Rejects keys with more than `max_depth` bracket groups.
    pub const fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Removes every limit set on this `Config`.
    pub const fn unlimited(mut self) -> Self {
        self.max_params = None;
        self.max_length = None;
        self.max_depth = None;
        self
    }

    /// Parses a querystring from bytes using this `Config`.
    pub fn parse(self, input: &[u8]) -> Result<Document> {
        let result = crate::de::parse::parse(input, self);
        #[cfg(feature = "tracing")]
        match &result {
            Ok(doc) => tracing::trace!(keys = doc.len(), "parsed querystring"),
            Err(err) => tracing::debug!(kind = %err.kind(), error = %err, "rejected querystring"),
        }
        result
    }

    /// Parses a querystring from a `&str` using this `Config`.
    pub fn parse_str(self, input: &str) -> Result<Document> {
        self.parse(input.as_bytes())
    }

    /// Writes `doc` in canonical querystring form using this `Config`.
    pub fn stringify(self, doc: &Document) -> String {
        crate::ser::stringify_with(doc, self)
    }

    /// Deserializes a querystring from a `&[u8]` using this `Config`.
    pub fn deserialize_bytes<T: de::DeserializeOwned>(self, input: &[u8]) -> Result<T> {
        crate::de::from_document(self.parse(input)?)
    }

    /// Deserializes a querystring from a `&str` using this `Config`.
    pub fn deserialize_str<T: de::DeserializeOwned>(self, input: &str) -> Result<T> {
        self.deserialize_bytes(input.as_bytes())
    }

    /// Reads all bytes from `reader` and deserializes them using this `Config`.
    pub fn deserialize_reader<T: de::DeserializeOwned, R: Read>(self, mut reader: R) -> Result<T> {
        let mut buf = vec![];
        reader.read_to_end(&mut buf)?;
        self.deserialize_bytes(&buf)
    }

    /// Serializes an object to a querystring using this `Config`.
    pub fn serialize_string<T: serde::Serialize>(self, input: &T) -> Result<String> {
        let doc = crate::ser::to_document(input)?;
        Ok(self.stringify(&doc))
    }

    /// Serializes an object to a querystring using this `Config`.
    pub fn serialize_to_writer<T: serde::Serialize, W: Write>(
        self,
        input: &T,
        writer: &mut W,
    ) -> Result<()> {
        let serialized = self.serialize_string(input)?;
        writer.write_all(serialized.as_bytes())?;
        Ok(())
    }
}
