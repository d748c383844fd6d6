use std::borrow::Cow;

use percent_encoding::AsciiSet;

/// The set of characters percent-encoded in a key segment or a value.
///
/// Everything except the RFC 3986 unreserved characters
/// (`A-Z a-z 0-9 - . _ ~`) and the sub-delimiters `! $ ' ( ) *` is encoded,
/// in particular:
/// - CONTROL characters and SPACE
/// - the querystring delimiters `&`, `=`, `[`, `]`, `+`, `%`, `?` and `#`
/// - the remaining gen-delims and sub-delims `/ : @ , ;`
/// - `"`, `<`, `>`, `\`, `^`, `` ` ``, `{`, `|` and `}`
///
/// Non-ASCII bytes are always encoded.
const QUERY_COMPONENT_SET: &AsciiSet = &percent_encoding::CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b',')
    .add(b'/')
    .add(b':')
    .add(b';')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'@')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// As above, but leaving SPACE alone so that it can be written as `+`.
const PLUS_SPACE_SET: &AsciiSet = &QUERY_COMPONENT_SET.remove(b' ');

/// Percent-encodes one key segment or value, with uppercase hex digits.
///
/// Spaces are written as `+` if `space_as_plus`, and as `%20` otherwise. A
/// literal `+` is always encoded as `%2B`.
///
/// The function returns an iterator to avoid allocations when no encoding is needed.
pub fn encode(s: &str, space_as_plus: bool) -> impl Iterator<Item = Cow<'_, str>> + '_ {
    let set = if space_as_plus {
        PLUS_SPACE_SET
    } else {
        QUERY_COMPONENT_SET
    };
    percent_encoding::utf8_percent_encode(s, set).map(move |chunk| {
        if space_as_plus && chunk.contains(' ') {
            Cow::Owned(chunk.replace(' ', "+"))
        } else {
            Cow::Borrowed(chunk)
        }
    })
}
