use std::collections::{BTreeMap, HashMap};

use pretty_assertions::assert_eq;
use serde::Deserialize;
use strict_qs::{Config, ErrorKind};

#[derive(Debug, PartialEq, Deserialize)]
struct A {
    b: B,
    c: C,
}
#[derive(Debug, PartialEq, Deserialize)]
struct B {
    b1: u8,
    b2: String,
}
#[derive(Debug, PartialEq, Deserialize)]
struct C {
    c1: String,
    c2: u8,
}

#[test]
fn deserialize_struct() {
    let params = A {
        b: B {
            b1: 10,
            b2: "Ten".to_owned(),
        },
        c: C {
            c1: "Seven".to_owned(),
            c2: 7,
        },
    };
    let result: A = strict_qs::from_str("b[b1]=10&b[b2]=Ten&c[c1]=Seven&c[c2]=7").unwrap();
    assert_eq!(result, params);
}

#[test]
fn deserialize_reader() {
    let input = b"first=23&last=42" as &[u8];
    let result: BTreeMap<String, u8> = strict_qs::from_reader(input).unwrap();
    assert_eq!(
        result,
        BTreeMap::from([("first".to_owned(), 23), ("last".to_owned(), 42)])
    );
}

#[test]
fn deserialize_option() {
    #[derive(Debug, PartialEq, Deserialize)]
    struct Query {
        vec: Option<Vec<u8>>,
        name: Option<String>,
        empty: Option<String>,
    }

    let rec: Query = strict_qs::from_str("vec[0]=1&vec[1]=2&empty=").unwrap();
    assert_eq!(
        rec,
        Query {
            vec: Some(vec![1, 2]),
            name: None,
            empty: None,
        }
    );
}

#[test]
fn deserialize_lists() {
    #[derive(Debug, PartialEq, Deserialize)]
    struct Query {
        appended: Vec<String>,
        indexed: Vec<u32>,
        single: Vec<u32>,
        pair: (u8, String),
    }

    let rec: Query = strict_qs::from_str(
        "appended[]=a&appended[]=b&indexed[0]=10&indexed[1]=20&single=3&pair[0]=1&pair[1]=one",
    )
    .unwrap();
    assert_eq!(
        rec,
        Query {
            appended: vec!["a".into(), "b".into()],
            indexed: vec![10, 20],
            single: vec![3],
            pair: (1, "one".into()),
        }
    );
}

#[test]
fn deserialize_list_of_structs() {
    #[derive(Debug, PartialEq, Deserialize)]
    struct Item {
        sku: String,
        qty: u16,
    }
    #[derive(Debug, PartialEq, Deserialize)]
    struct Order {
        items: Vec<Item>,
    }

    let rec: Order =
        strict_qs::from_str("items[0][sku]=A1&items[0][qty]=2&items[1][sku]=B2&items[1][qty]=5")
            .unwrap();
    assert_eq!(
        rec.items,
        vec![
            Item {
                sku: "A1".into(),
                qty: 2
            },
            Item {
                sku: "B2".into(),
                qty: 5
            },
        ]
    );
}

#[test]
fn deserialize_maps() {
    let rec: HashMap<String, HashMap<String, u8>> =
        strict_qs::from_str("a[x]=1&a[y]=2&b[z]=3").unwrap();
    assert_eq!(rec["a"]["y"], 2);
    assert_eq!(rec["b"]["z"], 3);

    let rec: BTreeMap<u16, bool> = strict_qs::from_str("10=true&2=false").unwrap();
    assert_eq!(rec, BTreeMap::from([(2, false), (10, true)]));
}

#[test]
fn deserialize_enums() {
    #[derive(Debug, PartialEq, Deserialize)]
    #[serde(rename_all = "snake_case")]
    enum Sort {
        Asc,
        Desc,
        By { field: String },
        Top(u8),
    }
    #[derive(Debug, PartialEq, Deserialize)]
    struct Query {
        a: Sort,
        b: Sort,
        c: Sort,
    }

    let rec: Query = strict_qs::from_str("a=desc&b[by][field]=name&c[top]=3").unwrap();
    assert_eq!(
        rec,
        Query {
            a: Sort::Desc,
            b: Sort::By {
                field: "name".into()
            },
            c: Sort::Top(3),
        }
    );

    let err = strict_qs::from_str::<Query>("a=sideways&b=asc&c=asc").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Custom);
}

#[test]
fn deserialize_top_level_enum() {
    #[derive(Debug, PartialEq, Deserialize)]
    enum Command {
        Move { x: i32, y: i32 },
    }

    let rec: Command = strict_qs::from_str("Move[x]=-1&Move[y]=2").unwrap();
    assert_eq!(rec, Command::Move { x: -1, y: 2 });
}

#[test]
fn deserialize_decoded_values() {
    #[derive(Debug, PartialEq, Deserialize)]
    struct Query {
        name: String,
        note: String,
    }

    let rec: Query = strict_qs::from_str("name=%E6%9D%8E%E9%9B%84&note=a%20b+c").unwrap();
    assert_eq!(rec.name, "李雄");
    assert_eq!(rec.note, "a b+c");

    let rec: Query = Config::new()
        .space_as_plus(true)
        .deserialize_str("name=x&note=a+b")
        .unwrap();
    assert_eq!(rec.note, "a b");
}

#[test]
fn parse_errors_surface() {
    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Query {
        a: Vec<u8>,
    }

    let err = strict_qs::from_str::<Query>("a[0]=1&a[0]=2").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateKey);

    let err = strict_qs::from_str::<Query>("a[1]=1").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateKey);

    let err = Config::new()
        .max_depth(0)
        .deserialize_str::<Query>("a[0]=1")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DepthExceeded);
}

#[test]
fn type_errors() {
    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Query {
        n: u8,
    }

    let err = strict_qs::from_str::<Query>("n=256").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Custom);
    insta::assert_snapshot!(err, @r#"invalid type: string "256", expected u8"#);

    let err = strict_qs::from_str::<Query>("m=1").unwrap_err();
    insta::assert_snapshot!(err, @"missing field `n`");
}

#[test]
fn top_level_sequences_are_rejected() {
    let err = strict_qs::from_str::<Vec<String>>("a=1").unwrap_err();
    insta::assert_snapshot!(err, @"cannot use sequence at the top level of a querystring, try a struct or a map");
}

#[test]
fn agrees_with_serde_urlencoded_on_flat_queries() {
    #[derive(Debug, PartialEq, Deserialize)]
    struct Flat {
        first: u32,
        last: String,
        ratio: f64,
        on: bool,
    }

    for input in [
        "first=23&last=42&ratio=0.5&on=true",
        "last=caf%C3%A9&first=0&on=false&ratio=-1.25",
        "first=7&last=a%26b%3Dc&ratio=1e3&on=true",
    ] {
        let ours: Flat = strict_qs::from_str(input).unwrap();
        let theirs: Flat = serde_urlencoded::from_str(input).unwrap();
        assert_eq!(ours, theirs, "{input}");
    }
}
