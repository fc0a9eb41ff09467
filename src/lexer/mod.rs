//! Turns an expression byte string into a token sequence terminated by
//! [`Value::Eof`]. Operator/keyword spellings are matched longest-first by
//! consuming the maximal run of word/symbol bytes and then searching
//! [`crate::ops::OPERATORS`] for the longest spelling that prefixes it,
//! falling back to the bare `null` keyword — the same longest-match shape as
//! the upstream lexer's `LexMap` scanning, generalised from a fixed keyword
//! table to the arithmetic/comparison/logic operators this language needs.

use crate::error::{CompileError, CompileResult};
use crate::ops::{Opcode, OPERATORS};
use crate::value::Value;

fn is_word_or_symbol_byte(b: u8) -> bool {
    b.is_ascii_alphabetic()
        || matches!(
            b,
            b'+' | b'-' | b'*' | b'%' | b'/' | b'!' | b'(' | b')' | b'<' | b'>' | b'=' | b'|' | b'&'
        )
}

fn is_selector_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
    tokens: Vec<Value<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Lexer {
            input,
            pos: 0,
            tokens: vec![],
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn err(&self, offset: usize, message: impl Into<String>) -> CompileError {
        CompileError::new(offset, message)
    }

    fn eat_whitespace(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    /// Minus-sign disambiguation (spec §4.B): `-` starts a number iff no
    /// token has been emitted yet, or the last one is an `Op` other than
    /// `)`.
    fn minus_starts_number(&self) -> bool {
        match self.tokens.last() {
            None => true,
            Some(Value::Op { opcode, .. }) => *opcode != Opcode::RParen,
            Some(_) => false,
        }
    }

    pub fn lex(mut self) -> CompileResult<Vec<Value<'a>>> {
        loop {
            self.eat_whitespace();
            let Some(b) = self.peek() else { break };

            let token = match b {
                b'.' => self.scan_selector()?,
                b'0'..=b'9' => self.scan_number()?,
                b'-' if self.minus_starts_number() => self.scan_number()?,
                b'\'' | b'"' => self.scan_string()?,
                b'[' => self.scan_tuple()?,
                _ if is_word_or_symbol_byte(b) => self.scan_operator_or_word()?,
                _ => {
                    return Err(self.err(self.pos, format!("unexpected byte '{}'", b as char)));
                }
            };
            self.tokens.push(token);
        }

        self.tokens.push(Value::Eof);
        Ok(self.tokens)
    }

    /// Consumes the maximal run of `is_word_or_symbol_byte` bytes (spec
    /// §4.B item 5), then finds the longest operator spelling that is a
    /// prefix of that run — not the other way around. Gating the run's
    /// length on "could some operator still extend this" (as opposed to
    /// scanning the whole run up front) would make a pure keyword like
    /// `null`, which is not in the operator table at all, impossible to
    /// reach: `can_extend` would never see a probe it recognises, so the
    /// run stops after a single byte.
    fn scan_operator_or_word(&mut self) -> CompileResult<Value<'a>> {
        let start = self.pos;
        let mut end = start;
        while matches!(self.input.get(end), Some(&b) if is_word_or_symbol_byte(b)) {
            end += 1;
        }

        let run = std::str::from_utf8(&self.input[start..end])
            .map_err(|_| self.err(start, "non-UTF-8 operator text"))?;

        for len in (1..=run.len()).rev() {
            if !run.is_char_boundary(len) {
                continue;
            }
            if let Some(info) = OPERATORS.get(&run[..len]) {
                self.pos = start + len;
                return Ok(Value::Op {
                    opcode: info.opcode,
                    source_offset: start,
                });
            }
        }

        if run == "null" {
            self.pos = end;
            return Ok(Value::Null);
        }

        Err(self.err(start, format!("failed to lex '{run}'")))
    }

    fn scan_number(&mut self) -> CompileResult<Value<'a>> {
        let start = self.pos;
        let mut end = start;

        if self.input.get(end) == Some(&b'-') {
            end += 1;
        }
        while matches!(self.input.get(end), Some(b'0'..=b'9')) {
            end += 1;
        }
        if self.input.get(end) == Some(&b'.') {
            end += 1;
            while matches!(self.input.get(end), Some(b'0'..=b'9')) {
                end += 1;
            }
        }
        if matches!(self.input.get(end), Some(b'e') | Some(b'E')) {
            end += 1;
            if matches!(self.input.get(end), Some(b'+') | Some(b'-')) {
                end += 1;
            }
            while matches!(self.input.get(end), Some(b'0'..=b'9')) {
                end += 1;
            }
        }

        let text = std::str::from_utf8(&self.input[start..end])
            .map_err(|_| self.err(start, "non-UTF-8 number literal"))?;
        let value: f64 = text
            .parse()
            .map_err(|_| self.err(start, format!("invalid number literal '{text}'")))?;

        self.pos = end;
        Ok(Value::Number(value))
    }

    fn scan_string(&mut self) -> CompileResult<Value<'a>> {
        let start = self.pos;
        let quote = self.input[start];
        let content_start = start + 1;
        let mut pos = content_start;

        loop {
            match self.input.get(pos) {
                None => return Err(self.err(start, "unterminated string literal")),
                Some(&b) if b == quote => break,
                Some(b'\\') => pos += 2,
                Some(_) => pos += 1,
            }
        }

        let content = &self.input[content_start..pos.min(self.input.len())];
        self.pos = pos + 1;
        Ok(Value::string_borrowed(content))
    }

    fn scan_selector(&mut self) -> CompileResult<Value<'a>> {
        let start = self.pos;
        let path_start = start + 1;
        let mut end = path_start;
        while matches!(self.input.get(end), Some(&b) if is_selector_byte(b)) {
            end += 1;
        }
        if end == path_start {
            return Err(self.err(start, "selector requires at least one character after '.'"));
        }
        self.pos = end;
        Ok(Value::Selector(&self.input[path_start..end]))
    }

    fn scan_tuple_element(&mut self) -> CompileResult<Value<'a>> {
        match self.peek() {
            Some(b'0'..=b'9') | Some(b'-') => self.scan_number(),
            Some(b'\'') | Some(b'"') => self.scan_string(),
            _ => Err(self.err(self.pos, "tuple elements must be numbers or strings")),
        }
    }

    fn scan_tuple(&mut self) -> CompileResult<Value<'a>> {
        self.pos += 1; // consume '['
        let mut elements = vec![];

        self.eat_whitespace();
        if self.peek() == Some(b']') {
            self.pos += 1;
            return Ok(Value::Tuple(elements));
        }

        loop {
            self.eat_whitespace();
            if self.peek() == Some(b'[') {
                return Err(self.err(self.pos, "nested tuples are not allowed"));
            }
            elements.push(self.scan_tuple_element()?);
            self.eat_whitespace();

            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(self.err(self.pos, "unterminated tuple, expected ',' or ']'")),
            }
        }

        Ok(Value::Tuple(elements))
    }
}

pub fn lex(input: &[u8]) -> CompileResult<Vec<Value<'_>>> {
    Lexer::new(input).lex()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opcodes(tokens: &[Value]) -> Vec<Opcode> {
        tokens
            .iter()
            .filter_map(|t| match t {
                Value::Op { opcode, .. } => Some(*opcode),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn lex_longest_match_beats_prefix() {
        assert_eq!(opcodes(&lex(b">=").unwrap()), vec![Opcode::Gte]);
        assert_eq!(opcodes(&lex(b"!=").unwrap()), vec![Opcode::Neq]);
        assert_eq!(opcodes(&lex(b"**").unwrap()), vec![Opcode::Pow]);
    }

    #[test]
    fn lex_word_operators_do_not_bleed_into_each_other() {
        let tokens = lex(b"1 and 2 or 3").unwrap();
        assert_eq!(opcodes(&tokens), vec![Opcode::And, Opcode::Or]);
    }

    #[test]
    fn lex_null_is_a_value_not_an_operator() {
        let tokens = lex(b"null").unwrap();
        assert!(matches!(tokens[0], Value::Null));
        assert!(matches!(tokens[1], Value::Eof));
    }

    #[test]
    fn minus_disambiguation() {
        let tokens = lex(b"-5").unwrap();
        assert!(matches!(tokens[0], Value::Number(n) if n == -5.0));

        let tokens = lex(b"5 - 3").unwrap();
        assert_eq!(opcodes(&tokens), vec![Opcode::Sub]);

        let tokens = lex(b"(1) - 2").unwrap();
        assert_eq!(
            opcodes(&tokens),
            vec![Opcode::LParen, Opcode::RParen, Opcode::Sub]
        );
    }

    #[test]
    fn lex_selector_strips_leading_dot() {
        let tokens = lex(b".year").unwrap();
        assert!(matches!(tokens[0], Value::Selector(b"year")));
    }

    #[test]
    fn lex_string_skips_escaped_delimiter() {
        let tokens = lex(b"'it\\'s'").unwrap();
        match &tokens[0] {
            Value::String(bytes) => assert_eq!(bytes.as_ref(), b"it\\'s"),
            other => panic!("expected string, got {other:?}"),
        }
    }

    #[test]
    fn lex_tuple_rejects_nesting() {
        assert!(lex(b"[1, [2]]").is_err());
    }

    #[test]
    fn lex_tuple_of_strings() {
        let tokens = lex(b"[\"a\", \"b\", \"c\"]").unwrap();
        match &tokens[0] {
            Value::Tuple(elements) => assert_eq!(elements.len(), 3),
            other => panic!("expected tuple, got {other:?}"),
        }
    }
}
