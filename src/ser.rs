//! Serialization support for querystrings.

mod encode;
mod key;
mod value;

use std::io::Write;

use serde::ser;

use crate::Config;
use crate::error::{Error, Result};
use crate::value::{Document, Map, Value};

use self::encode::encode;
use self::key::KeyStack;
use self::value::ValueSerializer;

/// Writes a document in canonical querystring form with the default
/// [`Config`].
///
/// Keys are written in insertion order and lists always with explicit
/// indices, so that parsing the output gives back an equal document.
///
/// ```
/// let doc = strict_qs::parse_str("b=2&a[]=x&a[]=y").unwrap();
/// assert_eq!(strict_qs::stringify(&doc), "b=2&a[0]=x&a[1]=y");
/// ```
pub fn stringify(doc: &Document) -> String {
    stringify_with(doc, Config::default())
}

pub(crate) fn stringify_with(doc: &Document, config: Config) -> String {
    let mut writer = QsWriter::new(config);
    writer.write_document(doc.as_map());
    writer.out
}

/// Serializes a value into a [`Document`].
///
/// Only structs, maps and enum variants with fields can be serialized at
/// the top level. `None` fields are left out. Keys and values holding a
/// control character are rejected with [`Error::InvalidKey`] and
/// [`Error::InvalidValue`], since the parser would refuse them.
pub fn to_document<T: ser::Serialize>(input: &T) -> Result<Document> {
    let map = match input.serialize(ValueSerializer)? {
        Some(Value::Map(map)) => map,
        None => return Ok(Document::default()),
        Some(Value::List(_)) => return Err(Error::top_level("sequence")),
        Some(Value::Scalar(_)) => return Err(Error::top_level("primitive")),
    };
    ensure_parsable(&map)?;
    Ok(Document::from_map(map))
}

/// Serializes a value into a querystring.
///
/// ```
/// # use serde::{Deserialize, Serialize};
/// #[derive(Deserialize, Serialize)]
/// struct Query {
///     name: String,
///     age: u8,
///     occupation: String,
/// }
///
/// let q =  Query {
///     name: "Alice".to_owned(),
///     age: 24,
///     occupation: "Student".to_owned(),
/// };
///
///
/// assert_eq!(
///     strict_qs::to_string(&q).unwrap(),
///     "name=Alice&age=24&occupation=Student");
/// ```
pub fn to_string<T: ser::Serialize>(input: &T) -> Result<String> {
    let config = crate::Config::default();
    config.serialize_string(input)
}

/// Serializes a value into a generic writer object.
///
/// ```
/// # use serde::{Deserialize, Serialize};
/// #[derive(Deserialize, Serialize)]
/// struct Query {
///     name: String,
///     age: u8,
///     occupation: String,
/// }
///
/// let q =  Query {
///     name: "Alice".to_owned(),
///     age: 24,
///     occupation: "Student".to_owned(),
/// };
///
/// let mut buffer = Vec::new();
/// strict_qs::to_writer(&q, &mut buffer).unwrap();
/// assert_eq!(
///     String::from_utf8(buffer).unwrap(),
///     "name=Alice&age=24&occupation=Student");
/// ```
pub fn to_writer<T: ser::Serialize, W: Write>(input: &T, writer: &mut W) -> Result<()> {
    let config = crate::Config::default();
    config.serialize_to_writer(input, writer)
}

/// The key segment leading to a child.
#[derive(Clone, Copy)]
enum Step<'a> {
    Name(&'a str),
    Index(usize),
}

/// A container being walked, with the children not yet visited.
enum Level<'a> {
    List(std::iter::Enumerate<std::slice::Iter<'a, Value>>),
    Map(indexmap::map::Iter<'a, String, Value>),
}

impl<'a> Level<'a> {
    fn open(value: &'a Value) -> Option<Self> {
        match value {
            Value::Scalar(_) => None,
            Value::List(items) => Some(Level::List(items.iter().enumerate())),
            Value::Map(map) => Some(Level::Map(map.iter())),
        }
    }

    fn next_child(&mut self) -> Option<(Step<'a>, &'a Value)> {
        match self {
            Level::List(items) => items.next().map(|(index, item)| (Step::Index(index), item)),
            Level::Map(entries) => entries.next().map(|(name, item)| (Step::Name(name), item)),
        }
    }
}

fn has_control(s: &str) -> bool {
    s.bytes().any(|b| b <= 0x1F || b == 0x7F)
}

/// Renders a trail of steps as an unencoded key, e.g. `user[tags][0]`.
fn render(trail: &[Step<'_>]) -> String {
    let mut key = String::new();
    for (depth, step) in trail.iter().enumerate() {
        match *step {
            Step::Name(name) if depth == 0 => key.push_str(name),
            Step::Name(name) => {
                key.push('[');
                key.push_str(name);
                key.push(']');
            }
            Step::Index(index) => {
                let mut buffer = itoa::Buffer::new();
                key.push('[');
                key.push_str(buffer.format(index));
                key.push(']');
            }
        }
    }
    key
}

/// Rejects control characters, which the serializer would percent-encode
/// but the parser refuses.
fn ensure_parsable(root: &Map) -> Result<()> {
    let mut trail = Vec::new();
    let mut stack = vec![Level::Map(root.iter())];
    while let Some(level) = stack.last_mut() {
        let Some((step, child)) = level.next_child() else {
            stack.pop();
            trail.pop();
            continue;
        };
        trail.push(step);
        if matches!(step, Step::Name(name) if has_control(name)) {
            return Err(Error::InvalidKey {
                key: render(&trail),
            });
        }
        match child {
            Value::Scalar(s) if has_control(s) => {
                return Err(Error::InvalidValue {
                    key: render(&trail),
                });
            }
            Value::Scalar(_) => {
                trail.pop();
            }
            container => stack.extend(Level::open(container)),
        }
    }
    Ok(())
}

/// Walks a document depth-first, writing one `key=value` pair per scalar.
struct QsWriter {
    out: String,
    key: KeyStack,
    first_kv: bool,
    space_as_plus: bool,
}

impl QsWriter {
    fn new(config: Config) -> Self {
        Self {
            out: String::new(),
            key: KeyStack::new(config.space_as_plus),
            first_kv: true,
            space_as_plus: config.space_as_plus,
        }
    }

    /// Uses an explicit stack of levels, so that deep documents cannot
    /// exhaust the call stack.
    fn write_document(&mut self, root: &Map) {
        let mut stack = vec![Level::Map(root.iter())];
        while let Some(level) = stack.last_mut() {
            let Some((step, child)) = level.next_child() else {
                stack.pop();
                // the root map has no key segment of its own
                if !stack.is_empty() {
                    self.key.pop();
                }
                continue;
            };
            match step {
                Step::Name(name) => self.key.push_name(name),
                Step::Index(index) => self.key.push_index(index),
            }
            match child {
                Value::Scalar(s) => {
                    self.write_pair(s);
                    self.key.pop();
                }
                container => stack.extend(Level::open(container)),
            }
        }
    }

    fn write_pair(&mut self, value: &str) {
        if self.first_kv {
            self.first_kv = false;
        } else {
            self.out.push('&');
        }
        self.out.push_str(self.key.as_str());
        self.out.push('=');
        for encoded in encode(value, self.space_as_plus) {
            self.out.push_str(&encoded);
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{ensure_parsable, stringify, stringify_with};
    use crate::{Config, Document, Error, Map, Value};

    #[test]
    fn empty_document() {
        assert_eq!(stringify(&Document::default()), "");
    }

    #[test]
    fn nested_in_insertion_order() {
        let doc: Document = [
            ("z", Value::from("1")),
            (
                "a",
                Value::Map(Map::from_iter([
                    ("y".to_string(), Value::List(vec!["p".into(), "q".into()])),
                    ("b".to_string(), Value::from("")),
                ])),
            ),
        ]
        .into_iter()
        .collect();
        assert_eq!(stringify(&doc), "z=1&a[y][0]=p&a[y][1]=q&a[b]=");
    }

    #[test]
    fn empty_containers_emit_nothing() {
        let doc: Document = [
            ("a", Value::List(vec![])),
            ("b", Value::Map(Map::new())),
            ("c", Value::from("x")),
        ]
        .into_iter()
        .collect();
        assert_eq!(stringify(&doc), "c=x");
    }

    #[test]
    fn spaces_follow_config() {
        let doc: Document = [("q", Value::from("a b+c"))].into_iter().collect();
        assert_eq!(stringify(&doc), "q=a%20b%2Bc");
        assert_eq!(
            stringify_with(&doc, Config::new().space_as_plus(true)),
            "q=a+b%2Bc"
        );
    }

    #[test]
    fn control_characters_name_their_path() {
        let map = |key: &str, value: Value| Value::Map(Map::from_iter([(key.to_string(), value)]));
        let root = Map::from_iter([
            ("ok".to_string(), Value::from("x")),
            ("a".to_string(), Value::List(vec![map("b\u{1}", Value::from("y"))])),
        ]);
        assert!(matches!(
            ensure_parsable(&root),
            Err(Error::InvalidKey { key }) if key == "a[0][b\u{1}]"
        ));

        let root = Map::from_iter([("a".to_string(), map("b", Value::from("\0")))]);
        assert!(matches!(
            ensure_parsable(&root),
            Err(Error::InvalidValue { key }) if key == "a[b]"
        ));

        let root = Map::from_iter([("\u{1f}".to_string(), Value::from(""))]);
        assert!(matches!(ensure_parsable(&root), Err(Error::InvalidKey { .. })));
    }
}
