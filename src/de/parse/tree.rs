use indexmap::IndexMap;
use indexmap::map::Entry;

use super::key::{KeyPath, Segment};
use crate::error::{Error, Result};
use crate::value::{Document, Map, Value};

type NodeMap = IndexMap<String, Node>;

/// How the elements of a list are addressed.
///
/// Fixed by the first write to the list: `a[]=x` creates an `Append` list
/// and `a[0]=x` an `Indexed` one. The other style is a conflict from then on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ListStyle {
    Append,
    Indexed,
}

/// The document under construction.
#[derive(Debug)]
enum Node {
    Scalar(String),
    List { items: Vec<Node>, style: ListStyle },
    Map(NodeMap),
}

/// Two writes that cannot both hold: the second one loses.
struct Conflict;

impl Node {
    /// A fresh subtree holding `value` at `path`, built from the leaf up.
    ///
    /// A fresh list is empty, so the only index it can take is `0`.
    fn build(path: &[Segment], value: String) -> Result<Node, Conflict> {
        path.iter()
            .rev()
            .try_fold(Node::Scalar(value), |inner, segment| match segment {
                Segment::Name(name) => Ok(Node::Map(NodeMap::from_iter([(name.clone(), inner)]))),
                Segment::Index(0) => Ok(Node::List {
                    items: vec![inner],
                    style: ListStyle::Indexed,
                }),
                Segment::Index(_) => Err(Conflict),
                Segment::Append => Ok(Node::List {
                    items: vec![inner],
                    style: ListStyle::Append,
                }),
            })
    }
}

/// Writes `value` at `root` followed by `segments`.
///
/// Walks down the existing nodes until the path leaves them, then hangs a
/// fresh subtree there. Lists grow one slot at a time: an existing slot can
/// be descended into, but only the next free slot can be created.
fn insert(
    root: &mut NodeMap,
    name: &str,
    segments: &[Segment],
    value: String,
) -> Result<(), Conflict> {
    let mut node = match root.entry(name.to_owned()) {
        Entry::Vacant(v) => {
            v.insert(Node::build(segments, value)?);
            return Ok(());
        }
        Entry::Occupied(o) => o.into_mut(),
    };

    let mut rest = segments;
    while let Some((segment, tail)) = rest.split_first() {
        node = match (node, segment) {
            (Node::Map(map), Segment::Name(name)) => match map.entry(name.clone()) {
                Entry::Vacant(v) => {
                    v.insert(Node::build(tail, value)?);
                    return Ok(());
                }
                Entry::Occupied(o) => o.into_mut(),
            },
            (
                Node::List {
                    items,
                    style: ListStyle::Append,
                },
                Segment::Append,
            ) => {
                items.push(Node::build(tail, value)?);
                return Ok(());
            }
            (
                Node::List {
                    items,
                    style: ListStyle::Indexed,
                },
                &Segment::Index(index),
            ) => {
                if index == items.len() {
                    items.push(Node::build(tail, value)?);
                    return Ok(());
                }
                match items.get_mut(index) {
                    Some(item) => item,
                    None => return Err(Conflict),
                }
            }
            _ => return Err(Conflict),
        };
        rest = tail;
    }
    // a scalar slot is written at most once
    Err(Conflict)
}

/// A container whose children are being converted into [`Value`]s.
enum Frame {
    List {
        pending: std::vec::IntoIter<Node>,
        done: Vec<Value>,
    },
    Map {
        pending: indexmap::map::IntoIter<String, Node>,
        done: Map,
        key: String,
    },
}

enum Opened {
    Leaf(Value),
    Container(Frame),
}

impl Frame {
    fn open(node: Node) -> Opened {
        match node {
            Node::Scalar(s) => Opened::Leaf(Value::Scalar(s)),
            Node::List { items, .. } => Opened::Container(Frame::List {
                done: Vec::with_capacity(items.len()),
                pending: items.into_iter(),
            }),
            Node::Map(map) => Opened::Container(Frame::Map {
                done: Map::with_capacity(map.len()),
                pending: map.into_iter(),
                key: String::new(),
            }),
        }
    }

    fn next_child(&mut self) -> Option<Node> {
        match self {
            Frame::List { pending, .. } => pending.next(),
            Frame::Map { pending, key, .. } => pending.next().map(|(k, node)| {
                *key = k;
                node
            }),
        }
    }

    fn accept(&mut self, value: Value) {
        match self {
            Frame::List { done, .. } => done.push(value),
            Frame::Map { done, key, .. } => {
                done.insert(std::mem::take(key), value);
            }
        }
    }

    fn close(self) -> Value {
        match self {
            Frame::List { done, .. } => Value::List(done),
            Frame::Map { done, .. } => Value::Map(done),
        }
    }
}

/// Converts a finished subtree with an explicit stack, so that key depth is
/// bounded by memory rather than by the call stack.
fn into_value(root: Node) -> Value {
    let mut stack: Vec<Frame> = Vec::new();
    let mut node = root;
    loop {
        // open containers down to the first leaf or empty container
        let mut value = loop {
            match Frame::open(node) {
                Opened::Leaf(value) => break value,
                Opened::Container(mut frame) => match frame.next_child() {
                    Some(child) => {
                        stack.push(frame);
                        node = child;
                    }
                    None => break frame.close(),
                },
            }
        };
        // hand finished values up until a container has children left
        loop {
            let Some(mut frame) = stack.pop() else {
                return value;
            };
            frame.accept(value);
            match frame.next_child() {
                Some(child) => {
                    stack.push(frame);
                    node = child;
                    break;
                }
                None => value = frame.close(),
            }
        }
    }
}

/// Builds a [`Document`] one key path at a time.
#[derive(Debug, Default)]
pub(crate) struct TreeBuilder {
    root: NodeMap,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `value` at `path`.
    ///
    /// Fails with [`Error::DuplicateKey`] if the path was already written, or
    /// if any of its prefixes already holds a different kind of node.
    pub fn insert(&mut self, path: &KeyPath, value: String) -> Result<()> {
        insert(&mut self.root, path.root(), path.segments(), value).map_err(|Conflict| {
            Error::DuplicateKey {
                key: path.to_string(),
            }
        })
    }

    pub fn finish(mut self) -> Document {
        let root = std::mem::take(&mut self.root)
            .into_iter()
            .map(|(k, node)| (k, into_value(node)))
            .collect();
        Document::from_map(root)
    }
}

impl Drop for TreeBuilder {
    /// Takes a rejected tree apart one node at a time.
    fn drop(&mut self) {
        let mut pending: Vec<Node> = std::mem::take(&mut self.root).into_values().collect();
        while let Some(node) = pending.pop() {
            match node {
                Node::Scalar(_) => {}
                Node::List { items, .. } => pending.extend(items),
                Node::Map(map) => pending.extend(map.into_values()),
            }
        }
    }
}
