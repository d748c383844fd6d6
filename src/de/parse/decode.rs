use crate::error::{Error, Result};

#[inline(always)]
fn char_to_digit(c: u8) -> Option<u8> {
    char::from(c).to_digit(16).map(|d| d as u8)
}

/// Bytes that may never appear in a component, raw or decoded.
#[inline(always)]
fn is_control(b: u8) -> bool {
    b <= 0x1F || b == 0x7F
}

/// Decodes one raw key segment or value, applying the following in order:
/// - Decodes percent-encoded bytes, and `+` as a space if `space_as_plus`
/// - Checks the decoded bytes are valid UTF-8
/// - Rejects control characters (raw or decoded) and raw spaces
/// - Rejects a literal `?`
///
/// `offset` is the position of `input` inside the whole querystring, so that
/// errors point at the offending byte of the full input.
///
/// The percent-decoding loop is adapted from `rust-url`.
pub fn decode(input: &[u8], space_as_plus: bool, offset: usize) -> Result<String> {
    let mut decoded = Vec::with_capacity(input.len());
    let mut disallowed: Option<(u8, usize)> = None;
    let mut question_mark: Option<usize> = None;
    let mut last_segment = 0;
    let mut idx = 0;

    while idx < input.len() {
        let b = input[idx];
        match b {
            b'%' => {
                let h = input.get(idx + 1).copied().and_then(char_to_digit);
                let l = input.get(idx + 2).copied().and_then(char_to_digit);
                let (Some(h), Some(l)) = (h, l) else {
                    return Err(Error::InvalidPercentEncoding {
                        index: offset + idx,
                    });
                };
                decoded.extend_from_slice(&input[last_segment..idx]);
                let decoded_byte = h * 0x10 + l;
                if is_control(decoded_byte) && disallowed.is_none() {
                    disallowed = Some((decoded_byte, offset + idx));
                }
                decoded.push(decoded_byte);
                idx += 3;
                last_segment = idx;
                continue;
            }
            b'+' if space_as_plus => {
                decoded.extend_from_slice(&input[last_segment..idx]);
                decoded.push(b' ');
                last_segment = idx + 1;
            }
            b'?' => {
                if question_mark.is_none() {
                    question_mark = Some(offset + idx);
                }
            }
            b' ' => {
                if disallowed.is_none() {
                    disallowed = Some((b, offset + idx));
                }
            }
            _ if is_control(b) => {
                if disallowed.is_none() {
                    disallowed = Some((b, offset + idx));
                }
            }
            _ => {}
        }
        idx += 1;
    }
    decoded.extend_from_slice(&input[last_segment..]);

    let decoded = String::from_utf8(decoded).map_err(|_| Error::InvalidUtf8 { index: offset })?;

    if let Some((b, index)) = disallowed {
        return Err(Error::InvalidCharacter {
            character: char::from(b),
            index,
        });
    }
    if let Some(index) = question_mark {
        return Err(Error::UnexpectedQuestionMark { index });
    }

    Ok(decoded)
}
