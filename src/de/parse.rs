//! Turns raw querystring bytes into a [`Document`].
//!
//! The parser works pair by pair, in input order:
//! - the raw key is split into its bracket groups (see [`KeyPath`])
//! - the depth of the key is checked against the configured limit
//! - the key names and the value are percent-decoded and validated
//! - the value is inserted into the tree, rejecting any conflicting write
//!
//! The first error aborts the parse.

use crate::Config;
use crate::error::Result;
use crate::value::Document;

use self::decode::decode;
use self::limits::Limits;
use self::tree::TreeBuilder;

pub use self::key::{KeyPath, Segment};

mod decode;
mod key;
mod limits;
mod tree;

pub(crate) fn parse(input: &[u8], config: Config) -> Result<Document> {
    let limits = Limits::from(config);
    limits.check_length(input.len())?;

    // a single leading `?` is the query delimiter of a URL
    let (query, start) = match input.split_first() {
        Some((b'?', rest)) => (rest, 1),
        _ => (input, 0),
    };

    let pairs = pairs(query, start).collect::<Vec<_>>();
    limits.check_params(pairs.len())?;

    let mut tree = TreeBuilder::new();
    for (pair, offset) in pairs {
        let (raw_key, raw_value, value_offset) = match pair.iter().position(|&b| b == b'=') {
            Some(eq) => (&pair[..eq], &pair[eq + 1..], offset + eq + 1),
            None => (pair, &[][..], offset + pair.len()),
        };
        if raw_key.is_empty() {
            // `=value` names nothing, but its value must still be well-formed
            decode(raw_value, config.space_as_plus, value_offset)?;
            continue;
        }

        let raw_path = key::tokenize(raw_key, offset)?;
        limits.check_depth(raw_path.depth(), || raw_path.lossy_key())?;
        let path = raw_path.decode(config.space_as_plus)?;
        let value = decode(raw_value, config.space_as_plus, value_offset)?;
        tree.insert(&path, value)?;
    }

    Ok(tree.finish())
}

/// The non-empty `&`-separated segments of `query`, with their offsets in
/// the whole input.
fn pairs(query: &[u8], start: usize) -> impl Iterator<Item = (&[u8], usize)> {
    let mut offset = start;
    query
        .split(|&b| b == b'&')
        .map(move |pair| {
            let at = offset;
            offset += pair.len() + 1;
            (pair, at)
        })
        .filter(|(pair, _)| !pair.is_empty())
}

#[cfg(test)]
mod test {
    use crate::{Config, Document, Error, ErrorKind, Map, Value};

    use super::parse;

    use pretty_assertions::assert_eq;

    static DEFAULT_CONFIG: Config = Config::new();
    static FORM_ENCODING_CONFIG: Config = Config::new().space_as_plus(true);

    fn doc<const N: usize>(entries: [(&str, Value); N]) -> Document {
        entries.into_iter().collect()
    }

    fn map<const N: usize>(entries: [(&str, Value); N]) -> Value {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect::<Map>(),
        )
    }

    fn kind(input: &str) -> ErrorKind {
        parse(input.as_bytes(), DEFAULT_CONFIG).unwrap_err().kind()
    }

    #[test]
    fn parse_empty() {
        assert_eq!(parse(b"", DEFAULT_CONFIG).unwrap(), Document::default());
        assert_eq!(parse(b"?", DEFAULT_CONFIG).unwrap(), Document::default());
        assert_eq!(parse(b"&&", DEFAULT_CONFIG).unwrap(), Document::default());
    }

    #[test]
    fn parse_map() {
        let parsed = parse(b"abc=def", DEFAULT_CONFIG).unwrap();
        assert_eq!(parsed, doc([("abc", "def".into())]));
    }

    #[test]
    fn parse_map_no_value() {
        let parsed = parse(b"abc", DEFAULT_CONFIG).unwrap();
        assert_eq!(parsed, doc([("abc", "".into())]));
    }

    #[test]
    fn parse_map_null_value() {
        let parsed = parse(b"abc=", DEFAULT_CONFIG).unwrap();
        assert_eq!(parsed, doc([("abc", "".into())]));
    }

    #[test]
    fn parse_value_with_equals() {
        let parsed = parse(b"a=b=c", DEFAULT_CONFIG).unwrap();
        assert_eq!(parsed, doc([("a", "b=c".into())]));
    }

    #[test]
    fn parse_sequence() {
        let parsed = parse(b"abc[]=1&abc[]=2", DEFAULT_CONFIG).unwrap();
        assert_eq!(
            parsed,
            // NOTE: we cannot have a top-level sequence since we need a key to group
            // the values by
            doc([("abc", Value::List(vec!["1".into(), "2".into()]))])
        );
    }

    #[test]
    fn parse_ordered_sequence() {
        let parsed = parse(b"abc[0]=0&abc[1]=1", DEFAULT_CONFIG).unwrap();
        assert_eq!(
            parsed,
            doc([("abc", Value::List(vec!["0".into(), "1".into()]))])
        );

        // out of order indices would leave a gap
        assert_eq!(kind("abc[1]=1&abc[0]=0"), ErrorKind::DuplicateKey);
    }

    #[test]
    fn parse_nested_map() {
        let parsed = parse(b"abc[def]=ghi", DEFAULT_CONFIG).unwrap();
        assert_eq!(parsed, doc([("abc", map([("def", "ghi".into())]))]));
    }

    #[test]
    fn parse_empty_and_sequence() {
        assert_eq!(kind("abc&abc[]=1"), ErrorKind::DuplicateKey);
        assert_eq!(kind("abc[]=1&abc"), ErrorKind::DuplicateKey);
    }

    #[test]
    fn parse_many() {
        let parsed = parse(b"e[B]&v[V1][x]=12&v[V1][y]=300&u=12", DEFAULT_CONFIG).unwrap();
        assert_eq!(
            parsed,
            doc([
                ("e", map([("B", "".into())])),
                (
                    "v",
                    map([("V1", map([("x", "12".into()), ("y", "300".into())]))])
                ),
                ("u", "12".into()),
            ])
        );
    }

    #[test]
    fn parse_max_depth() {
        let config = Config::new().max_depth(5);
        assert!(parse(b"a[b][c][d][e][f]=i", config).is_ok());

        let err = parse(b"a[b][c][d][e][f][g][h]=i", config).unwrap_err();
        assert!(matches!(
            err,
            Error::DepthExceeded {
                depth: 7,
                limit: 5,
                ..
            }
        ));
    }

    #[test]
    fn parse_formencoded_spaces() {
        let parsed = parse(b"q=hello+world&a+b=c", FORM_ENCODING_CONFIG).unwrap();
        assert_eq!(
            parsed,
            doc([("q", "hello world".into()), ("a b", "c".into())])
        );

        let parsed = parse(b"q=hello+world", DEFAULT_CONFIG).unwrap();
        assert_eq!(parsed, doc([("q", "hello+world".into())]));
    }

    #[test]
    fn parse_encoded_brackets() {
        // encoded brackets are never structural, so we end up with a key
        // containing brackets
        let parsed = parse(b"abc%5Bdef%5D=ghi", DEFAULT_CONFIG).unwrap();
        assert_eq!(parsed, doc([("abc[def]", "ghi".into())]));

        // encoded in the value
        let parsed = parse(b"foo=%5BHello%5D", DEFAULT_CONFIG).unwrap();
        assert_eq!(parsed, doc([("foo", "[Hello]".into())]));
    }

    #[test]
    fn parse_leading_question_mark() {
        let parsed = parse(b"?a=1", DEFAULT_CONFIG).unwrap();
        assert_eq!(parsed, doc([("a", "1".into())]));

        // only one is stripped
        assert!(matches!(
            parse(b"??a=1", DEFAULT_CONFIG).unwrap_err(),
            Error::UnexpectedQuestionMark { index: 1 }
        ));
    }

    #[test]
    fn parse_skips_empty_keys() {
        let parsed = parse(b"=x&a=1", DEFAULT_CONFIG).unwrap();
        assert_eq!(parsed, doc([("a", "1".into())]));
        assert_eq!(parse(b"=&a=1", DEFAULT_CONFIG).unwrap(), doc([("a", "1".into())]));
    }

    #[test]
    fn parse_validates_values_of_empty_keys() {
        assert_eq!(kind("=?"), ErrorKind::UnexpectedQuestionMark);
        assert_eq!(kind("=%00"), ErrorKind::InvalidCharacter);
        assert_eq!(kind("=\u{1}"), ErrorKind::InvalidCharacter);
        assert_eq!(kind("=%80"), ErrorKind::InvalidUtf8);
        assert_eq!(kind("=a b"), ErrorKind::InvalidCharacter);
        assert!(matches!(
            parse(b"a=1&=%ZZ", DEFAULT_CONFIG).unwrap_err(),
            Error::InvalidPercentEncoding { index: 5 }
        ));
    }

    #[test]
    fn offsets_are_relative_to_the_input() {
        assert!(matches!(
            parse(b"?a=1&b=%ZZ", DEFAULT_CONFIG).unwrap_err(),
            Error::InvalidPercentEncoding { index: 7 }
        ));
        assert!(matches!(
            parse(b"a=1&bb]=2", DEFAULT_CONFIG).unwrap_err(),
            Error::UnmatchedBracket { index: 6, .. }
        ));
        assert!(matches!(
            parse(b"a=1&b=x%01", DEFAULT_CONFIG).unwrap_err(),
            Error::InvalidCharacter {
                character: '\u{1}',
                index: 7
            }
        ));
    }

    #[test]
    fn detection_order() {
        // length beats everything
        let config = Config::new().max_length(4).max_params(0);
        assert_eq!(parse(b"a]=%ZZ", config).unwrap_err().kind(), ErrorKind::InputTooLong);
        // pair count is checked before any decoding
        let config = Config::new().max_params(1);
        assert_eq!(
            parse(b"a]=1&b=%ZZ", config).unwrap_err().kind(),
            ErrorKind::TooManyParameters
        );
        // brackets, then depth, then key decoding, then value decoding
        let config = Config::new().max_depth(0);
        assert_eq!(parse(b"a%ZZ]=1", config).unwrap_err().kind(), ErrorKind::UnmatchedBracket);
        assert_eq!(parse(b"a%ZZ[b]=1", config).unwrap_err().kind(), ErrorKind::DepthExceeded);
        assert_eq!(kind("a%ZZ=%80"), ErrorKind::InvalidPercentEncoding);
        assert_eq!(kind("a=%80&a=1"), ErrorKind::InvalidUtf8);
        // pairs are handled in input order
        assert_eq!(kind("a=1&a=2&b]=3"), ErrorKind::DuplicateKey);
    }
}
