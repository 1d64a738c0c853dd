//! Numeric literal scanning: decimal, hex, octal, binary, legacy octal,
//! floats, exponents, numeric separators, and bigints.

use crate::{Lexer, Token};
use jolt_common::span::Span;

impl<'a> Lexer<'a> {
    pub(crate) fn scan_number(&mut self) -> Token {
        let start = self.pos;
        self.bigint.clear();

        if self.peek_byte() == b'0' {
            match self.byte_at(1) {
                b'x' | b'X' => return self.scan_radix(16),
                b'o' | b'O' => return self.scan_radix(8),
                b'b' | b'B' => return self.scan_radix(2),
                b'0'..=b'9' => return self.scan_legacy_octal(),
                _ => {}
            }
        }

        let mut digits = String::new();
        let mut is_float = false;

        // Integer part; absent for `.5`-style literals
        if self.peek_byte() == b'.' {
            digits.push('0');
        } else {
            self.scan_digit_run(&mut digits);
        }

        // Fraction. A trailing dot (`1.`) is legal and consumed here so a
        // following identifier is not mistaken for a member access.
        if self.peek_byte() == b'.' {
            is_float = true;
            digits.push('.');
            self.pos += 1;
            self.scan_digit_run(&mut digits);
        }

        // Exponent
        if matches!(self.peek_byte(), b'e' | b'E') {
            let mut lookahead = 1;
            if matches!(self.byte_at(1), b'+' | b'-') {
                lookahead = 2;
            }
            if self.byte_at(lookahead).is_ascii_digit() {
                is_float = true;
                digits.push('e');
                self.pos += 1;
                if matches!(self.peek_byte(), b'+' | b'-') {
                    digits.push(self.peek_byte() as char);
                    self.pos += 1;
                }
                self.scan_digit_run(&mut digits);
            }
        }

        // BigInt suffix
        if self.peek_byte() == b'n' {
            self.pos += 1;
            if is_float {
                self.error(
                    Span::new(start as u32, self.pos as u32),
                    "bigint literals cannot have a decimal point or exponent",
                );
                return Token::SyntaxError;
            }
            self.bigint = digits;
            return self.finish_number_token(Token::BigIntLiteral, start);
        }

        self.number = digits.parse().unwrap_or(f64::NAN);
        self.finish_number_token(Token::NumericLiteral, start)
    }

    fn scan_digit_run(&mut self, out: &mut String) {
        let mut last_was_separator = false;
        while matches!(self.peek_byte(), b'0'..=b'9' | b'_') {
            if self.peek_byte() == b'_' {
                if out.is_empty() || last_was_separator {
                    self.error_at_pos("invalid numeric separator");
                    return;
                }
                last_was_separator = true;
            } else {
                out.push(self.peek_byte() as char);
                last_was_separator = false;
            }
            self.pos += 1;
        }
        if last_was_separator {
            self.error_at_pos("numeric separator cannot end a literal");
        }
    }

    fn scan_radix(&mut self, radix: u32) -> Token {
        let start = self.pos;
        self.pos += 2; // 0x / 0o / 0b
        let mut digits = String::new();
        let mut last_was_separator = false;
        loop {
            let byte = self.peek_byte();
            if byte == b'_' {
                if digits.is_empty() || last_was_separator {
                    self.error_at_pos("invalid numeric separator");
                    return Token::SyntaxError;
                }
                last_was_separator = true;
                self.pos += 1;
                continue;
            }
            match (byte as char).to_digit(radix) {
                Some(_) => {
                    digits.push(byte as char);
                    last_was_separator = false;
                    self.pos += 1;
                }
                None => break,
            }
        }
        if digits.is_empty() || last_was_separator {
            self.error(
                Span::new(start as u32, self.pos as u32),
                "invalid number literal",
            );
            return Token::SyntaxError;
        }

        if self.peek_byte() == b'n' {
            self.pos += 1;
            self.bigint = self.source[start..self.pos - 1].replace('_', "");
            return self.finish_number_token(Token::BigIntLiteral, start);
        }

        self.number = u128::from_str_radix(&digits, radix)
            .map(|v| v as f64)
            .unwrap_or_else(|_| parse_huge_radix(&digits, radix));
        self.finish_number_token(Token::NumericLiteral, start)
    }

    /// `0123`-style literals. Valid only in sloppy mode; the parser checks
    /// the recorded range against strict mode at the end of the parse.
    fn scan_legacy_octal(&mut self) -> Token {
        let start = self.pos;
        let mut digits = String::new();
        let mut is_octal = true;
        while self.peek_byte().is_ascii_digit() {
            if !matches!(self.peek_byte(), b'0'..=b'7') {
                is_octal = false;
            }
            digits.push(self.peek_byte() as char);
            self.pos += 1;
        }

        if is_octal {
            self.legacy_octal = Some(Span::new(start as u32, self.pos as u32));
            self.number = u64::from_str_radix(&digits, 8).map(|v| v as f64).unwrap_or(f64::NAN);
        } else {
            // `08` and `09` fall back to decimal (still legacy-flagged)
            self.legacy_octal = Some(Span::new(start as u32, self.pos as u32));
            self.number = digits.parse().unwrap_or(f64::NAN);
        }
        self.finish_number_token(Token::NumericLiteral, start)
    }

    fn finish_number_token(&mut self, token: Token, start: usize) -> Token {
        // An identifier must not immediately follow a number
        if let Some(c) = self.char_at_pos() {
            if crate::identifier::is_identifier_start(c) || c.is_ascii_digit() {
                self.error(
                    Span::new(start as u32, self.pos as u32 + 1),
                    "identifier cannot immediately follow a number",
                );
                return Token::SyntaxError;
            }
        }
        token
    }
}

/// Hex/binary/octal digits too large for u128 accumulate as float.
fn parse_huge_radix(digits: &str, radix: u32) -> f64 {
    let mut value = 0.0f64;
    for c in digits.chars() {
        value = value * radix as f64 + c.to_digit(radix).unwrap_or(0) as f64;
    }
    value
}
