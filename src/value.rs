//! The tree produced by the parser and consumed by the serializer.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// An insertion-ordered map of key segments to values.
pub type Map = IndexMap<String, Value>;

/// A node of a parsed querystring.
///
/// - `Scalar`: leaf values such as the `John` in `user[name]=John`
/// - `List`: values addressed with `[]` or `[0]`, `[1]`, ... in order
/// - `Map`: values addressed with `[name]`
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Scalar(String),
    List(Vec<Value>),
    Map(Map),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Value::Scalar(_))
    }

    /// Looks up `key` if this value is a map.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Looks up position `index` if this value is a list.
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.as_list().and_then(|items| items.get(index))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Scalar(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Scalar(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Map(map)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Scalar(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(map) => serialize_map(map, serializer),
        }
    }
}

fn serialize_map<S: Serializer>(map: &Map, serializer: S) -> Result<S::Ok, S::Error> {
    let mut out = serializer.serialize_map(Some(map.len()))?;
    for (k, v) in map {
        out.serialize_entry(k, v)?;
    }
    out.end()
}

/// The root map of a parsed querystring.
///
/// A `Document` is created by [`parse`](crate::parse) (or
/// [`to_document`](crate::to_document)) and has no mutation API: once
/// returned it can be shared freely between readers.
///
/// ```
/// let doc = strict_qs::parse_str("user[name]=Ann&user[tags][]=a").unwrap();
/// let name = doc.get("user").and_then(|u| u.get("name")).and_then(|n| n.as_str());
/// assert_eq!(name, Some("Ann"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Document {
    root: Map,
}

impl Document {
    pub(crate) fn from_map(root: Map) -> Self {
        Document { root }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    pub fn len(&self) -> usize {
        self.root.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Iterates over the top-level keys in the order they first appeared.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.root.iter()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.root.keys()
    }

    pub fn as_map(&self) -> &Map {
        &self.root
    }

    pub fn into_map(mut self) -> Map {
        std::mem::take(&mut self.root)
    }

    /// The bracket depth of the deepest value: `0` for a document of
    /// top-level scalars.
    pub(crate) fn nesting(&self) -> usize {
        let mut deepest = 0;
        let mut pending: Vec<(&Value, usize)> =
            self.root.values().map(|v| (v, 0)).collect();
        while let Some((value, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            match value {
                Value::Scalar(_) => {}
                Value::List(items) => pending.extend(items.iter().map(|v| (v, depth + 1))),
                Value::Map(map) => pending.extend(map.values().map(|v| (v, depth + 1))),
            }
        }
        deepest
    }
}

impl Drop for Document {
    /// Takes the tree apart one node at a time, so that documents parsed
    /// from very deep keys can be dropped.
    fn drop(&mut self) {
        let mut pending: Vec<Value> = std::mem::take(&mut self.root).into_values().collect();
        while let Some(value) = pending.pop() {
            match value {
                Value::Scalar(_) => {}
                Value::List(items) => pending.extend(items),
                Value::Map(map) => pending.extend(map.into_values()),
            }
        }
    }
}

impl From<Map> for Document {
    fn from(root: Map) -> Self {
        Document { root }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Document {
            root: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_map().into_iter()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.root.iter()
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_map(&self.root, serializer)
    }
}

#[cfg(test)]
mod test {
    use super::{Document, Map, Value};

    #[test]
    fn accessors() {
        let doc: Document = [
            ("a", Value::from("1")),
            ("b", Value::List(vec!["x".into(), "y".into()])),
            ("c", Value::Map(Map::from_iter([("d".to_string(), "2".into())]))),
        ]
        .into_iter()
        .collect();

        assert_eq!(doc.len(), 3);
        assert_eq!(doc.get("a").and_then(Value::as_str), Some("1"));
        assert_eq!(doc.get("b").and_then(|b| b.get_index(1)), Some(&Value::from("y")));
        assert_eq!(doc.get("c").and_then(|c| c.get("d")), Some(&Value::from("2")));
        assert!(doc.get("b").unwrap().get("d").is_none());
        assert_eq!(doc.keys().collect::<Vec<_>>(), ["a", "b", "c"]);
    }

    #[test]
    fn serializes_as_nested_json() {
        let doc: Document = [(
            "user",
            Value::Map(Map::from_iter([(
                "ids".to_string(),
                Value::List(vec!["1".into(), "2".into()]),
            )])),
        )]
        .into_iter()
        .collect();

        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(json, r#"{"user":{"ids":["1","2"]}}"#);
    }
}
