//! Runs the querystring corpora under `tests/data/`.

use serde::Deserialize;
use strict_qs::{Config, ErrorKind};

static ALLOW: &str = include_str!("data/query_allow.json");
static REJECT: &str = include_str!("data/query_reject.json");
static ROUNDTRIP: &str = include_str!("data/query_roundtrip.json");

#[derive(Debug, Default, Deserialize)]
struct Options {
    #[serde(default)]
    space_as_plus: bool,
    max_params: Option<usize>,
    max_length: Option<usize>,
    max_depth: Option<usize>,
}

impl From<&Options> for Config {
    fn from(options: &Options) -> Self {
        let mut config = Config::new().space_as_plus(options.space_as_plus);
        if let Some(n) = options.max_params {
            config = config.max_params(n);
        }
        if let Some(n) = options.max_length {
            config = config.max_length(n);
        }
        if let Some(n) = options.max_depth {
            config = config.max_depth(n);
        }
        config
    }
}

#[derive(Debug, Deserialize)]
struct Case {
    name: String,
    input: String,
    expect: String,
    #[serde(default)]
    options: Options,
}

#[derive(Debug, Deserialize)]
struct RoundTripCase {
    name: String,
    query: String,
    #[serde(default)]
    parse_options: Options,
    #[serde(default)]
    stringify_options: Options,
    normalized: String,
}

fn load<T: for<'de> Deserialize<'de>>(json: &str) -> Vec<T> {
    serde_json::from_str(json).expect("corpus is valid JSON")
}

#[test]
fn allow_corpus() {
    let cases: Vec<Case> = load(ALLOW);
    assert!(!cases.is_empty());
    for case in cases {
        assert_eq!(case.expect, "ok", "{}", case.name);
        let config = Config::from(&case.options);
        if let Err(err) = config.parse_str(&case.input) {
            panic!("{}: `{}` was rejected: {err}", case.name, case.input);
        }
    }
}

#[test]
fn reject_corpus() {
    let cases: Vec<Case> = load(REJECT);
    assert!(!cases.is_empty());
    for case in cases {
        let expected: ErrorKind = case.expect.parse().expect("known error tag");
        let config = Config::from(&case.options);
        match config.parse_str(&case.input) {
            Ok(doc) => panic!("{}: `{}` was accepted as {doc:?}", case.name, case.input),
            Err(err) => assert_eq!(err.kind(), expected, "{}: {err}", case.name),
        }
    }
}

#[test]
fn roundtrip_corpus() {
    let cases: Vec<RoundTripCase> = load(ROUNDTRIP);
    assert!(!cases.is_empty());
    for case in cases {
        let parse_config = Config::from(&case.parse_options);
        let stringify_config = Config::from(&case.stringify_options);

        let doc = parse_config.parse_str(&case.query).expect(&case.name);
        let normalized = stringify_config.stringify(&doc);
        assert_eq!(normalized, case.normalized, "{}", case.name);

        let reparsed = parse_config.parse_str(&normalized).expect(&case.name);
        assert_eq!(reparsed, doc, "{}", case.name);
    }
}
