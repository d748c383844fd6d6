use std::fmt;
use std::str::FromStr;

use super::decode::decode;
use crate::error::{Error, Result};

/// One bracket group of a key path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Segment {
    /// `[name]`: a map key.
    Name(String),
    /// `[3]`: an explicit list position.
    Index(usize),
    /// `[]`: the next free list slot.
    Append,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Name(name) => write!(f, "[{name}]"),
            Segment::Index(i) => write!(f, "[{i}]"),
            Segment::Append => f.write_str("[]"),
        }
    }
}

/// The bracket-decomposed form of a key.
///
/// `a[b][0][]` has the root `a` followed by the segments
/// `Name("b")`, `Index(0)` and `Append`. Its depth is 3: the root does not
/// count.
///
/// ```
/// use strict_qs::{KeyPath, Segment};
///
/// let path: KeyPath = "order[items][0][]".parse().unwrap();
/// assert_eq!(path.root(), "order");
/// assert_eq!(
///     path.segments(),
///     [Segment::Name("items".into()), Segment::Index(0), Segment::Append]
/// );
/// assert_eq!(path.depth(), 3);
/// assert_eq!(path.to_string(), "order[items][0][]");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyPath {
    root: String,
    segments: Vec<Segment>,
}

impl KeyPath {
    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of bracket groups.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.root)?;
        for segment in &self.segments {
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for KeyPath {
    type Err = Error;

    /// Tokenizes and percent-decodes a raw key, keeping `+` literal.
    fn from_str(s: &str) -> Result<Self> {
        tokenize(s.as_bytes(), 0)?.decode(false)
    }
}

/// A bracket group before percent-decoding.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum RawSegment<'qs> {
    Name(&'qs [u8], usize),
    Index(usize),
    Append,
}

/// A tokenized key whose names are still percent-encoded.
///
/// Brackets are recognised on the raw bytes only, so `a%5Bb%5D` is the
/// single name `a[b]`.
#[derive(Debug)]
pub(crate) struct RawKeyPath<'qs> {
    raw: &'qs [u8],
    offset: usize,
    segments: Vec<RawSegment<'qs>>,
}

impl<'qs> RawKeyPath<'qs> {
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// The whole raw key, for error messages.
    pub fn lossy_key(&self) -> String {
        String::from_utf8_lossy(self.raw).into_owned()
    }

    /// Percent-decodes the root and every named segment.
    pub fn decode(self, space_as_plus: bool) -> Result<KeyPath> {
        let root_end = self
            .raw
            .iter()
            .position(|&b| b == b'[')
            .unwrap_or(self.raw.len());
        let root = decode(&self.raw[..root_end], space_as_plus, self.offset)?;
        let segments = self
            .segments
            .into_iter()
            .map(|segment| {
                Ok(match segment {
                    RawSegment::Name(raw, offset) => {
                        Segment::Name(decode(raw, space_as_plus, offset)?)
                    }
                    RawSegment::Index(i) => Segment::Index(i),
                    RawSegment::Append => Segment::Append,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(KeyPath { root, segments })
    }
}

/// Splits a raw key into its root and bracket groups.
///
/// `offset` is the position of `raw` inside the querystring.
pub(crate) fn tokenize(raw: &[u8], offset: usize) -> Result<RawKeyPath<'_>> {
    let unmatched = |index: usize| Error::UnmatchedBracket {
        key: String::from_utf8_lossy(raw).into_owned(),
        index: offset + index,
    };

    let root_end = match raw.iter().position(|&b| b == b'[' || b == b']') {
        Some(idx) if raw[idx] == b']' => return Err(unmatched(idx)),
        Some(idx) => idx,
        None => raw.len(),
    };
    if root_end == 0 {
        // a key needs a name before its first bracket
        return Err(unmatched(0));
    }

    let mut segments = Vec::new();
    let mut idx = root_end;
    while idx < raw.len() {
        if raw[idx] != b'[' {
            // text after a closing bracket, e.g. `a[b]c` or `a[b]]`
            return Err(unmatched(idx));
        }
        let start = idx + 1;
        let Some(len) = raw[start..].iter().position(|&b| b == b']' || b == b'[') else {
            return Err(unmatched(idx));
        };
        let end = start + len;
        if raw[end] == b'[' {
            return Err(unmatched(end));
        }
        segments.push(classify(&raw[start..end], offset + start));
        idx = end + 1;
    }

    Ok(RawKeyPath {
        raw,
        offset,
        segments,
    })
}

fn classify(content: &[u8], offset: usize) -> RawSegment<'_> {
    if content.is_empty() {
        return RawSegment::Append;
    }
    if content.iter().all(u8::is_ascii_digit) {
        let index = std::str::from_utf8(content)
            .ok()
            .and_then(|digits| digits.parse::<usize>().ok());
        if let Some(i) = index {
            return RawSegment::Index(i);
        }
        // too large to be a position: fall back to a name
    }
    RawSegment::Name(content, offset)
}
