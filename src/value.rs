//! The tagged value shared by the compiler, the VM, and the JSON extractor.
//!
//! A [`Value`] is a cheap, by-value copy for everything except `Tuple` and
//! an owned `String`. `String` tracks whether its bytes alias a caller
//! buffer (the expression text, or a JSON buffer without escapes) or were
//! privately materialised (a JSON string that needed escape decoding); see
//! [`Value::String`].

use std::borrow::Cow;

use crate::ops::Opcode;

/// A token in the lexer's output stream, a literal in the compiled
/// program, and a value on the VM's stack — all the same type, following
/// the source's lead of reusing one token representation end to end.
#[derive(Debug, Clone)]
pub enum Value<'a> {
    Number(f64),
    /// Borrowed from the expression text or a JSON buffer, or owned when a
    /// JSON string needed escape decoding.
    String(Cow<'a, [u8]>),
    Null,
    /// Flat, non-nested; elements are `Number` or `String`. Only appears as
    /// the right operand of `in`.
    Tuple(Vec<Value<'a>>),
    /// A compiled reference to a top-level JSON field name, leading dot
    /// already stripped.
    Selector(&'a [u8]),
    Op { opcode: Opcode, source_offset: usize },
    Eof,
}

impl<'a> Value<'a> {
    pub fn string_borrowed(bytes: &'a [u8]) -> Self {
        Value::String(Cow::Borrowed(bytes))
    }

    pub fn string_owned(bytes: Vec<u8>) -> Self {
        Value::String(Cow::Owned(bytes))
    }

    /// `to_number` coercion (spec §4.A): numbers pass through, strings
    /// parse as a full `f64` or default to `0.0` — no trimming, since the
    /// spec requires the *full* string to parse, and `"  42  "` must not
    /// coerce to `42.0`.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::String(bytes) => std::str::from_utf8(bytes)
                .ok()
                .and_then(|s| s.parse::<f64>().ok())
                .unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// `to_bool` coercion (spec §4.A).
    pub fn to_bool(&self) -> bool {
        match self {
            Value::Number(n) => *n != 0.0,
            Value::String(bytes) => !bytes.is_empty(),
            Value::Null => false,
            Value::Tuple(_) => true,
            Value::Selector(_) | Value::Op { .. } | Value::Eof => false,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::String(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// `eq` opcode semantics (spec §4.E): strings compare byte-for-byte,
/// numbers compare numerically, `Null` is only equal to `Null`, and any
/// other mix falls back to numeric coercion.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(a), Value::String(b)) => a.as_ref() == b.as_ref(),
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        _ => a.to_number() == b.to_number(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_number_parses_full_string_only() {
        assert_eq!(Value::string_borrowed(b"42").to_number(), 42.0);
        assert_eq!(Value::string_borrowed(b"42garbage").to_number(), 0.0);
        assert_eq!(Value::string_borrowed(b"").to_number(), 0.0);
    }

    #[test]
    fn to_bool_matches_spec() {
        assert!(!Value::Number(0.0).to_bool());
        assert!(Value::Number(1.0).to_bool());
        assert!(!Value::string_borrowed(b"").to_bool());
        assert!(Value::string_borrowed(b"x").to_bool());
        assert!(!Value::Null.to_bool());
        assert!(Value::Tuple(vec![]).to_bool());
    }

    #[test]
    fn eq_symmetry_across_variants() {
        let pairs: Vec<(Value, Value)> = vec![
            (Value::Number(1.0), Value::string_borrowed(b"1")),
            (Value::Null, Value::Number(0.0)),
            (Value::string_borrowed(b"a"), Value::string_borrowed(b"a")),
        ];
        for (a, b) in pairs {
            assert_eq!(values_equal(&a, &b), values_equal(&b, &a));
        }
    }
}
