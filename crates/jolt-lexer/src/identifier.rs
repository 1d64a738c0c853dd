//! Identifier scanning, including `\u` escapes in names.

use unicode_id_start::{is_id_continue_unicode, is_id_start_unicode};

use crate::token::KEYWORDS;
use crate::{Lexer, Token};
use jolt_common::span::Span;

#[inline]
pub fn is_identifier_start(c: char) -> bool {
    c == '_' || c == '$' || (c.is_ascii_alphabetic() || (!c.is_ascii() && is_id_start_unicode(c)))
}

#[inline]
pub fn is_identifier_continue(c: char) -> bool {
    c == '_'
        || c == '$'
        || c == '\u{200c}'
        || c == '\u{200d}'
        || c.is_ascii_alphanumeric()
        || (!c.is_ascii() && is_id_continue_unicode(c))
}

/// Whether `name` can be printed as a bare identifier.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if is_identifier_start(c) => {}
        _ => return false,
    }
    chars.all(is_identifier_continue)
}

impl<'a> Lexer<'a> {
    pub(crate) fn scan_identifier_or_keyword(&mut self) -> Token {
        let start = self.pos;
        let mut contains_escape = false;
        self.identifier.clear();

        loop {
            match self.peek_byte() {
                b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'$' => {
                    self.identifier.push(self.bytes[self.pos] as char);
                    self.pos += 1;
                }
                b'0'..=b'9' if self.pos > start => {
                    self.identifier.push(self.bytes[self.pos] as char);
                    self.pos += 1;
                }
                b'\\' => {
                    contains_escape = true;
                    let first = self.pos == start;
                    match self.scan_identifier_escape(first) {
                        Some(c) => self.identifier.push(c),
                        None => return Token::SyntaxError,
                    }
                }
                byte if byte >= 0x80 => match self.char_at_pos() {
                    Some(c)
                        if (self.pos == start && is_identifier_start(c))
                            || (self.pos > start && is_identifier_continue(c)) =>
                    {
                        self.identifier.push(c);
                        self.pos += c.len_utf8();
                    }
                    _ => break,
                },
                _ => break,
            }
        }

        if self.identifier.is_empty() {
            let span = Span::at(self.pos as u32);
            let found = self
                .char_at_pos()
                .map(|c| format!("\"{c}\""))
                .unwrap_or_else(|| "end of file".to_string());
            self.pos += self.char_at_pos().map(char::len_utf8).unwrap_or(0);
            self.error(span, format!("unexpected {found}"));
            return Token::SyntaxError;
        }

        // An escaped spelling of a keyword is never treated as the keyword
        if !contains_escape {
            if let Some(&keyword) = KEYWORDS.get(self.identifier.as_str()) {
                return keyword;
            }
        }
        Token::Identifier
    }

    pub(crate) fn scan_private_identifier(&mut self) -> Token {
        // Leading '#'
        self.pos += 1;
        match self.char_at_pos() {
            Some(c) if is_identifier_start(c) || c == '\\' => {}
            _ => {
                self.error_at_pos("invalid character \"#\"");
                return Token::SyntaxError;
            }
        }
        let token = self.scan_identifier_or_keyword();
        if token == Token::SyntaxError {
            return token;
        }
        // Keep the '#' as part of the name so slot allocation can key on it
        self.identifier.insert(0, '#');
        Token::PrivateIdentifier
    }

    /// Scan `\uXXXX` or `\u{...}` inside an identifier and validate that
    /// the escaped character is legal at this position.
    fn scan_identifier_escape(&mut self, first: bool) -> Option<char> {
        let escape_start = self.pos as u32;
        // Consume the backslash
        self.pos += 1;
        if self.peek_byte() != b'u' {
            self.error(
                Span::new(escape_start, self.pos as u32 + 1),
                "invalid escape in identifier",
            );
            return None;
        }
        self.pos += 1;
        let code_point = if self.peek_byte() == b'{' {
            self.pos += 1;
            let mut value: u32 = 0;
            let digits_start = self.pos;
            while self.peek_byte() != b'}' {
                let Some(digit) = (self.peek_byte() as char).to_digit(16) else {
                    self.error(
                        Span::new(escape_start, self.pos as u32),
                        "invalid Unicode escape",
                    );
                    return None;
                };
                value = value.wrapping_mul(16).wrapping_add(digit);
                if value > 0x10ffff {
                    self.error(
                        Span::new(escape_start, self.pos as u32),
                        "code point out of range",
                    );
                    return None;
                }
                self.pos += 1;
            }
            if self.pos == digits_start {
                self.error(Span::new(escape_start, self.pos as u32), "empty code point");
                return None;
            }
            self.pos += 1; // '}'
            value
        } else {
            let mut value: u32 = 0;
            for _ in 0..4 {
                let Some(digit) = (self.peek_byte() as char).to_digit(16) else {
                    self.error(
                        Span::new(escape_start, self.pos as u32),
                        "invalid Unicode escape",
                    );
                    return None;
                };
                value = value * 16 + digit;
                self.pos += 1;
            }
            value
        };

        let Some(c) = char::from_u32(code_point) else {
            self.error(
                Span::new(escape_start, self.pos as u32),
                "invalid Unicode escape",
            );
            return None;
        };
        let valid = if first {
            is_identifier_start(c)
        } else {
            is_identifier_continue(c)
        };
        if !valid {
            self.error(
                Span::new(escape_start, self.pos as u32),
                format!("character \"{c}\" is not valid in an identifier"),
            );
            return None;
        }
        Some(c)
    }
}
