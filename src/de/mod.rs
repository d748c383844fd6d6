//! Deserialization support for querystrings.
//!
//! ### An overview of the design of `QsDeserializer`
//!
//! A querystring is first parsed into a [`Document`] by the `parse` module.
//! Parsing is where all the validation happens: once a `Document` exists it
//! is known to be well-formed and free of conflicting keys, so
//! deserialization only has to map its shape onto the target type.
//!
//! From here, there are two main `Deserializer` objects: `QsDeserializer` and
//! `LevelDeserializer`.
//!
//! The former is the top-level deserializer which is effectively only capable
//! of deserializing map-like objects (i.e. those with (key, value) pairs).
//! Hence, structs, maps, and enums are supported at this level.
//!
//! Each key is a `String`, and the values are [`Value`] nodes: either a
//! scalar string, or a list or map of further nodes. Each node is
//! deserialized through `LevelDeserializer`, which recursively calls back to
//! `QsDeserializer` for maps, and parses scalars into primitives on demand
//! via `StringParsingDeserializer`.

pub(crate) mod parse;
mod string_parser;

use std::io::Read;

use serde::de::{self, Unexpected};
use serde::forward_to_deserialize_any;

use crate::Config;
use crate::error::{Error, Result};
use crate::value::{Document, Map, Value};

use self::string_parser::StringParsingDeserializer;

pub use self::parse::{KeyPath, Segment};

/// Parses a querystring with the default [`Config`].
///
/// ```
/// let doc = strict_qs::parse(b"user[name]=Ann&user[tags][]=a&user[tags][]=b").unwrap();
/// let tags = doc.get("user").and_then(|u| u.get("tags")).and_then(|t| t.as_list());
/// assert_eq!(tags.map(|t| t.len()), Some(2));
/// ```
pub fn parse(input: &[u8]) -> Result<Document> {
    Config::default().parse(input)
}

/// Parses a querystring from a `&str` with the default [`Config`].
pub fn parse_str(input: &str) -> Result<Document> {
    parse(input.as_bytes())
}

/// Deserializes a querystring from a `&[u8]`.
///
/// ```
/// # use serde::{Deserialize, Serialize};
/// #[derive(Debug, Deserialize, PartialEq, Serialize)]
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
/// assert_eq!(
///     strict_qs::from_bytes::<Query>(
///         "name=Alice&age=24&occupation=Student".as_bytes()
///     ).unwrap(), q);
/// ```
pub fn from_bytes<T: de::DeserializeOwned>(input: &[u8]) -> Result<T> {
    Config::default().deserialize_bytes(input)
}

/// Deserializes a querystring from a `&str`.
///
/// ```
/// # use serde::{Deserialize, Serialize};
/// #[derive(Debug, Deserialize, PartialEq, Serialize)]
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
/// assert_eq!(
///     strict_qs::from_str::<Query>("name=Alice&age=24&occupation=Student").unwrap(),
///     q);
/// ```
pub fn from_str<T: de::DeserializeOwned>(input: &str) -> Result<T> {
    from_bytes(input.as_bytes())
}

/// Convenience function that reads all bytes from `reader` and deserializes
/// them with `from_bytes`.
pub fn from_reader<T, R>(reader: R) -> Result<T>
where
    T: de::DeserializeOwned,
    R: Read,
{
    Config::default().deserialize_reader(reader)
}

/// Deserializers recurse once per level of the document, so deeper documents
/// are refused before any visitor runs.
const MAX_NESTING: usize = 128;

/// Deserializes an already parsed [`Document`].
///
/// Documents nested more than 128 brackets deep are rejected, whatever the
/// parse limits allowed.
pub fn from_document<T: de::DeserializeOwned>(doc: Document) -> Result<T> {
    let nesting = doc.nesting();
    if nesting > MAX_NESTING {
        return Err(Error::Custom(format!(
            "recursion limit exceeded: document is nested {nesting} levels deep \
             (limit {MAX_NESTING})"
        )));
    }
    T::deserialize(QsDeserializer::new(doc.into_map()))
}

/// A deserializer for the querystring format.
///
/// Supported top-level outputs are structs, maps and enums.
pub struct QsDeserializer {
    iter: indexmap::map::IntoIter<String, Value>,
    value: Option<Value>,
}

impl QsDeserializer {
    fn new(map: Map) -> Self {
        QsDeserializer {
            iter: map.into_iter(),
            value: None,
        }
    }
}

impl From<Document> for QsDeserializer {
    fn from(doc: Document) -> Self {
        QsDeserializer::new(doc.into_map())
    }
}

impl<'de> de::Deserializer<'de> for QsDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_map(self)
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    /// Throws an error.
    ///
    /// Sequences are not supported at the top level.
    fn deserialize_seq<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::top_level("sequence"))
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    /// Throws an error.
    ///
    /// Tuples are not supported at the top level.
    fn deserialize_tuple<V>(self, _len: usize, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::top_level("tuple"))
    }

    /// Throws an error.
    ///
    /// TupleStructs are not supported at the top level.
    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        _visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::top_level("tuple struct"))
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_enum(self)
    }

    forward_to_deserialize_any! {
        bool u8 u16 u32 u64 u128 i8 i16 i32 i64 i128 f32 f64 char str string
        unit bytes byte_buf unit_struct identifier ignored_any
    }
}

impl<'de> de::MapAccess<'de> for QsDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        if let Some((key, value)) = self.iter.next() {
            self.value = Some(value);
            return seed.deserialize(StringParsingDeserializer::<Error>::new(key)).map(Some);
        };
        Ok(None)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        if let Some(v) = self.value.take() {
            seed.deserialize(LevelDeserializer(v))
        } else {
            Err(de::Error::custom(
                "Somehow the list was empty after a non-empty key was returned",
            ))
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

impl<'de> de::EnumAccess<'de> for QsDeserializer {
    type Error = Error;
    type Variant = Self;

    fn variant_seed<V>(mut self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        if let Some((key, value)) = self.iter.next() {
            self.value = Some(value);
            Ok((seed.deserialize(StringParsingDeserializer::<Error>::new(key))?, self))
        } else {
            Err(de::Error::custom("No more values"))
        }
    }
}

impl<'de> de::VariantAccess<'de> for QsDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        Ok(())
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        if let Some(value) = self.value {
            seed.deserialize(LevelDeserializer(value))
        } else {
            Err(de::Error::custom("no value to deserialize"))
        }
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if let Some(value) = self.value {
            de::Deserializer::deserialize_seq(LevelDeserializer(value), visitor)
        } else {
            Err(de::Error::custom("no value to deserialize"))
        }
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if let Some(value) = self.value {
            de::Deserializer::deserialize_map(LevelDeserializer(value), visitor)
        } else {
            Err(de::Error::custom("no value to deserialize"))
        }
    }
}

struct LevelSeq<I: Iterator<Item = Value>>(I);

impl<'de, I: Iterator<Item = Value>> de::SeqAccess<'de> for LevelSeq<I> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        if let Some(v) = self.0.next() {
            seed.deserialize(LevelDeserializer(v)).map(Some)
        } else {
            Ok(None)
        }
    }
}

/// Deserializes one node of the document below the top level.
struct LevelDeserializer(Value);

fn unexpected(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Scalar(s) => Unexpected::Str(s),
        Value::List(_) => Unexpected::Seq,
        Value::Map(_) => Unexpected::Map,
    }
}

macro_rules! deserialize_primitive {
    ($($method:ident,)*) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                match self.0 {
                    Value::Scalar(s) => StringParsingDeserializer::<Error>::new(s).$method(visitor),
                    other => Err(de::Error::invalid_type(unexpected(&other), &visitor)),
                }
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for LevelDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.0 {
            Value::Map(map) => QsDeserializer::new(map).deserialize_map(visitor),
            Value::List(items) => visitor.visit_seq(LevelSeq(items.into_iter())),
            Value::Scalar(s) => StringParsingDeserializer::<Error>::new(s).deserialize_any(visitor),
        }
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.0 {
            Value::List(items) => visitor.visit_seq(LevelSeq(items.into_iter())),
            // a lone value stands for a single element sequence
            scalar @ Value::Scalar(_) => visitor.visit_seq(LevelSeq(std::iter::once(scalar))),
            other @ Value::Map(_) => Err(de::Error::invalid_type(unexpected(&other), &visitor)),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.0 {
            Value::Scalar(ref s) if s.is_empty() => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.0 {
            Value::Map(map) => QsDeserializer::new(map).deserialize_enum(name, variants, visitor),
            Value::Scalar(s) => {
                StringParsingDeserializer::<Error>::new(s).deserialize_enum(name, variants, visitor)
            }
            Value::List(_) => Err(de::Error::custom(
                "expected an enum variant name or a single-key map, found a sequence",
            )),
        }
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.0 {
            Value::Map(map) => QsDeserializer::new(map).deserialize_map(visitor),
            other => Err(de::Error::invalid_type(unexpected(&other), &visitor)),
        }
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    deserialize_primitive! {
        deserialize_bool,
        deserialize_i8,
        deserialize_i16,
        deserialize_i32,
        deserialize_i64,
        deserialize_i128,
        deserialize_u8,
        deserialize_u16,
        deserialize_u32,
        deserialize_u64,
        deserialize_u128,
        deserialize_f32,
        deserialize_f64,
        deserialize_char,
        deserialize_unit,
        deserialize_bytes,
        deserialize_byte_buf,
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    forward_to_deserialize_any! {
        str string identifier ignored_any
    }
}
