//! Bounded, single-pass top-level field extractor (spec §4.D). Every read
//! goes through `[u8]::get`, so the scanner can never look past the slice
//! it was given — the caller's `length` is the slice's own length, not a
//! separately tracked counter, so there is no way to drift out of sync
//! with it.

use crate::value::Value;

fn skip_ws(bytes: &[u8], pos: &mut usize) {
    while matches!(bytes.get(*pos), Some(b) if b.is_ascii_whitespace()) {
        *pos += 1;
    }
}

/// Scans a JSON string starting at `bytes[*pos] == '"'`, honouring `\X`
/// escapes without decoding them. Returns the raw content range (excluding
/// quotes) and leaves `*pos` just past the closing quote.
fn scan_string_raw(bytes: &[u8], pos: &mut usize) -> Option<(usize, usize)> {
    *pos += 1;
    let start = *pos;
    loop {
        match *bytes.get(*pos)? {
            b'"' => break,
            b'\\' => *pos += 2,
            _ => *pos += 1,
        }
    }
    let end = *pos;
    *pos += 1;
    Some((start, end))
}

fn consume_literal_checked(bytes: &[u8], pos: &mut usize, lit: &[u8]) -> Option<()> {
    let end = pos.checked_add(lit.len())?;
    if end > bytes.len() || &bytes[*pos..end] != lit {
        return None;
    }
    let delimiter_ok = match bytes.get(end) {
        None => true,
        Some(b) => b.is_ascii_whitespace() || matches!(b, b',' | b']' | b'}'),
    };
    if !delimiter_ok {
        return None;
    }
    *pos = end;
    Some(())
}

/// Skips over one JSON value without materialising it, used while seeking
/// past fields that don't match. Depth-counts all bracket characters
/// together (rather than matching `[`/`]` against `{`/`}` separately) since
/// skipping only needs to know when nesting returns to zero.
fn skip_value(bytes: &[u8], pos: &mut usize) -> Option<()> {
    match *bytes.get(*pos)? {
        b'"' => {
            scan_string_raw(bytes, pos)?;
            Some(())
        }
        b'[' | b'{' => {
            let mut depth = 0i32;
            loop {
                match *bytes.get(*pos)? {
                    b'"' => {
                        scan_string_raw(bytes, pos)?;
                    }
                    b'[' | b'{' => {
                        depth += 1;
                        *pos += 1;
                    }
                    b']' | b'}' => {
                        depth -= 1;
                        *pos += 1;
                        if depth == 0 {
                            return Some(());
                        }
                    }
                    _ => *pos += 1,
                }
            }
        }
        b't' => consume_literal_checked(bytes, pos, b"true"),
        b'f' => consume_literal_checked(bytes, pos, b"false"),
        b'n' => consume_literal_checked(bytes, pos, b"null"),
        b'0'..=b'9' | b'+' | b'-' => {
            while matches!(
                bytes.get(*pos),
                Some(b'0'..=b'9') | Some(b'+') | Some(b'-') | Some(b'.') | Some(b'e') | Some(b'E')
            ) {
                *pos += 1;
            }
            Some(())
        }
        _ => None,
    }
}

/// `\n \r \t \" \\` map to their usual characters; anything else copies the
/// byte after `\` verbatim (spec §4.D / §6). No `\uXXXX` support.
fn decode_escapes(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if raw[i] == b'\\' && i + 1 < raw.len() {
            let decoded = match raw[i + 1] {
                b'n' => b'\n',
                b'r' => b'\r',
                b't' => b'\t',
                b'\\' => b'\\',
                b'"' => b'"',
                other => other,
            };
            out.push(decoded);
            i += 2;
        } else {
            out.push(raw[i]);
            i += 1;
        }
    }
    out
}

fn materialize_string<'j>(bytes: &'j [u8], pos: &mut usize) -> Option<Value<'j>> {
    *pos += 1;
    let content_start = *pos;
    let mut has_escape = false;
    loop {
        match *bytes.get(*pos)? {
            b'"' => break,
            b'\\' => {
                has_escape = true;
                *pos += 2;
            }
            _ => *pos += 1,
        }
    }
    let content_end = *pos;
    *pos += 1;
    let raw = &bytes[content_start..content_end];
    if has_escape {
        Some(Value::string_owned(decode_escapes(raw)))
    } else {
        Some(Value::string_borrowed(raw))
    }
}

fn materialize_number<'j>(bytes: &'j [u8], pos: &mut usize) -> Option<Value<'j>> {
    let start = *pos;
    if matches!(bytes.get(*pos), Some(b'+') | Some(b'-')) {
        *pos += 1;
    }
    while matches!(bytes.get(*pos), Some(b'0'..=b'9')) {
        *pos += 1;
    }
    if bytes.get(*pos) == Some(&b'.') {
        *pos += 1;
        while matches!(bytes.get(*pos), Some(b'0'..=b'9')) {
            *pos += 1;
        }
    }
    if matches!(bytes.get(*pos), Some(b'e') | Some(b'E')) {
        *pos += 1;
        if matches!(bytes.get(*pos), Some(b'+') | Some(b'-')) {
            *pos += 1;
        }
        while matches!(bytes.get(*pos), Some(b'0'..=b'9')) {
            *pos += 1;
        }
    }
    let delimiter_ok = match bytes.get(*pos) {
        None => true,
        Some(b) => b.is_ascii_whitespace() || matches!(b, b',' | b']' | b'}'),
    };
    if !delimiter_ok {
        return None;
    }

    let text = std::str::from_utf8(&bytes[start..*pos]).ok()?;
    text.parse::<f64>().ok().map(Value::Number)
}

fn materialize_array<'j>(bytes: &'j [u8], pos: &mut usize) -> Option<Value<'j>> {
    *pos += 1;
    let mut elements = vec![];

    skip_ws(bytes, pos);
    if bytes.get(*pos) == Some(&b']') {
        *pos += 1;
        return Some(Value::Tuple(elements));
    }

    loop {
        skip_ws(bytes, pos);
        if matches!(bytes.get(*pos), Some(b'[') | Some(b'{')) {
            return None;
        }
        elements.push(materialize_value(bytes, pos)?);
        skip_ws(bytes, pos);
        match *bytes.get(*pos)? {
            b',' => *pos += 1,
            b']' => {
                *pos += 1;
                break;
            }
            _ => return None,
        }
    }

    Some(Value::Tuple(elements))
}

/// Phase 2 (spec §4.D): materialise whatever value sits at `*pos`.
fn materialize_value<'j>(bytes: &'j [u8], pos: &mut usize) -> Option<Value<'j>> {
    match *bytes.get(*pos)? {
        b'"' => materialize_string(bytes, pos),
        b't' => {
            consume_literal_checked(bytes, pos, b"true")?;
            Some(Value::Number(1.0))
        }
        b'f' => {
            consume_literal_checked(bytes, pos, b"false")?;
            Some(Value::Number(0.0))
        }
        b'n' => {
            consume_literal_checked(bytes, pos, b"null")?;
            Some(Value::Null)
        }
        b'[' => materialize_array(bytes, pos),
        b'{' => None,
        b'0'..=b'9' | b'-' | b'+' => materialize_number(bytes, pos),
        _ => None,
    }
}

/// Phase 1 (spec §4.D): seek `field` among the top-level keys of a JSON
/// object and materialise its value. `None` covers both "not found" and
/// "malformed JSON" — the VM treats both identically (spec §4.E).
pub fn extract_field<'j>(json: &'j [u8], field: &[u8]) -> Option<Value<'j>> {
    let mut pos = 0usize;
    skip_ws(json, &mut pos);
    if *json.get(pos)? != b'{' {
        return None;
    }
    pos += 1;

    loop {
        skip_ws(json, &mut pos);
        match *json.get(pos)? {
            b'}' => return None,
            b'"' => {}
            _ => return None,
        }

        let (key_start, key_end) = scan_string_raw(json, &mut pos)?;
        skip_ws(json, &mut pos);
        if *json.get(pos)? != b':' {
            return None;
        }
        pos += 1;
        skip_ws(json, &mut pos);

        if &json[key_start..key_end] == field {
            return materialize_value(json, &mut pos);
        }

        skip_value(json, &mut pos)?;
        skip_ws(json, &mut pos);
        match *json.get(pos)? {
            b',' => pos += 1,
            b'}' => return None,
            _ => return None,
        }
    }
}
