//! Strict nested querystrings, with Serde support
//!
//! Querystrings are not formally defined and loosely take the form of
//! _nested_ urlencoded queries: `user[name]=Ann&user[tags][]=admin`.
//!
//! This library parses them into a [`Document`], a tree of scalars, lists and
//! maps, and writes documents back out in a canonical form. Parsing is
//! strict: anything ambiguous is rejected rather than guessed at.
//!
//! - A key can only be written once. `a=1&a=2` is an error, not "last wins".
//! - A key has a single shape. `a=1&a[b]=2` is an error.
//! - Lists are dense. `a[]` appends, `a[n]` must name the next free slot (or
//!   descend into an existing one), and a list only accepts the style it was
//!   created with.
//! - Only `[` and `]` are brackets: `%5B` and `%5D` are ordinary characters.
//! - Values must percent-decode to valid UTF-8 without control characters,
//!   and a `?` may only appear as the first byte of the input.
//!
//! For users who do *not* require nested URL parameters, it is highly
//! recommended that the `serde_urlencoded` crate is used instead, which
//! will almost certainly perform better for deserializing simple inputs.
//!
//! ## Documents
//!
//! ```
//! use strict_qs::{ErrorKind, Value};
//!
//! let doc = strict_qs::parse_str("order[items][0][sku]=A1&order[items][0][qty]=2").unwrap();
//! let item = doc
//!     .get("order")
//!     .and_then(|o| o.get("items"))
//!     .and_then(|i| i.get_index(0))
//!     .unwrap();
//! assert_eq!(item.get("qty").and_then(Value::as_str), Some("2"));
//! assert_eq!(
//!     strict_qs::stringify(&doc),
//!     "order[items][0][sku]=A1&order[items][0][qty]=2"
//! );
//!
//! let err = strict_qs::parse_str("a=1&a=2").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::DuplicateKey);
//! ```
//!
//! ## Limits
//!
//! No limits are applied by default. Use a [`Config`] to bound the input
//! length, the number of pairs and the bracket depth of keys:
//!
//! ```
//! use strict_qs::{Config, ErrorKind};
//!
//! let config = Config::new().max_length(1024).max_params(2);
//! let err = config.parse_str("a=1&b=2&c=3").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::TooManyParameters);
//! ```
//!
//! ## Supported Types
//!
//! At the **top level**, `strict_qs` only supports `struct`, `map`, and `enum`.
//! These are the only top-level structs which can be de/serialized since
//! Querystrings rely on having a (key, value) pair for each field, which
//! necessitates this kind of structure.
//!
//! However, after the top level you should find all supported types can be
//! de/serialized.
//!
//! ## Usage
//!
//! Serializing/Deserializing is designed to work with maps and structs.
//!
//! ```
//! # use serde::{Deserialize, Serialize};
//! #[derive(Debug, PartialEq, Deserialize, Serialize)]
//! struct Address {
//!     city: String,
//!     postcode: String,
//! }
//! #[derive(Debug, PartialEq, Deserialize, Serialize)]
//! struct QueryParams {
//!     id: u8,
//!     name: String,
//!     address: Address,
//!     phone: u32,
//!     user_ids: Vec<u8>,
//! }
//!
//! let params = QueryParams {
//!     id: 42,
//!     name: "Acme".to_string(),
//!     phone: 12345,
//!     address: Address {
//!         city: "Carrot City".to_string(),
//!         postcode: "12345".to_string(),
//!     },
//!     user_ids: vec![1, 2, 3, 4],
//! };
//! let rec_params: QueryParams = strict_qs::from_str("\
//!     name=Acme&id=42&phone=12345&address[postcode]=12345&\
//!     address[city]=Carrot%20City&user_ids[0]=1&user_ids[1]=2&\
//!     user_ids[2]=3&user_ids[3]=4")
//!     .unwrap();
//! assert_eq!(rec_params, params);
//!
//! let encoded = strict_qs::to_string(&params).unwrap();
//! assert_eq!(
//!     encoded,
//!     "id=42&name=Acme&address[city]=Carrot%20City&address[postcode]=12345&\
//!      phone=12345&user_ids[0]=1&user_ids[1]=2&user_ids[2]=3&user_ids[3]=4"
//! );
//! ```
//!
//! ## Feature flags
//!
//! - `tracing`: emit a `debug` event for every rejected querystring and a
//!   `trace` event for every accepted one.

mod config;
mod de;
mod error;
mod ser;
mod value;

pub use config::Config;
#[doc(inline)]
pub use de::{
    KeyPath, QsDeserializer, Segment, from_bytes, from_document, from_reader, from_str, parse,
    parse_str,
};
pub use error::{Error, ErrorKind, Result, UnknownErrorKind};
#[doc(inline)]
pub use ser::{stringify, to_document, to_string, to_writer};
pub use value::{Document, Map, Value};
