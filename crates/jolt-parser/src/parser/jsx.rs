//! JSX element parsing (pass 1).
//!
//! Elements parse into `EJsxElement` nodes; the call-site transform to
//! the configured factory happens in pass 2. Text children normalize at
//! parse time: each line loses its leading indentation, whitespace-only
//! lines disappear, and surviving lines join with a single space.

use super::*;
use crate::ops::Precedence;

impl<'a> Parser<'a> {
    /// Current token is the opening `<`. Returns with the element's
    /// final `>` still current; the caller advances in whatever lexing
    /// mode its context needs.
    pub(crate) fn parse_jsx_element(&mut self, start: u32) -> ParseResult<Expr> {
        self.lexer.next();
        let expr = self.parse_jsx_element_after_less_than(start)?;
        self.lexer.next();
        Ok(expr)
    }

    fn parse_jsx_element_after_less_than(&mut self, start: u32) -> ParseResult<Expr> {
        // Fragment `<>`
        let tag = if self.lexer.token == Token::GreaterThan {
            None
        } else {
            Some(self.parse_jsx_tag()?)
        };

        let mut properties = Vec::new();
        if tag.is_some() {
            // Attributes until `/>` or `>`
            loop {
                match self.lexer.token {
                    Token::GreaterThan | Token::Slash => break,
                    Token::OpenBrace => {
                        // `{...props}`
                        self.lexer.next();
                        self.expect(Token::DotDotDot)?;
                        let value = self.parse_expr(Precedence::Comma)?;
                        if self.lexer.token != Token::CloseBrace {
                            self.unexpected();
                            return Err(ParseError);
                        }
                        self.lexer.next();
                        properties.push(Property::spread(value));
                    }
                    Token::Identifier => {
                        self.lexer.continue_jsx_identifier();
                        let name = self.lexer.identifier.clone();
                        let name_span = self.lexer.span();
                        self.lexer.next();
                        let value = if self.eat(Token::Equals) {
                            match self.lexer.token {
                                Token::StringLiteral => {
                                    self.lexer.rescan_jsx_string();
                                    let value = self.lexer.string_value.clone();
                                    let span = self.lexer.span();
                                    self.lexer.next();
                                    Expr::new(span, EData::String(EString::new(value)))
                                }
                                Token::OpenBrace => {
                                    self.lexer.next();
                                    let value = self.parse_expr(Precedence::Comma)?;
                                    if self.lexer.token != Token::CloseBrace {
                                        self.unexpected();
                                        return Err(ParseError);
                                    }
                                    self.lexer.next();
                                    value
                                }
                                Token::LessThan => {
                                    let nested_start = self.lexer.token_start;
                                    self.parse_jsx_element(nested_start)?
                                }
                                _ => {
                                    self.unexpected();
                                    return Err(ParseError);
                                }
                            }
                        } else {
                            // Bare attribute is `true`
                            Expr::new(name_span, EData::Boolean(true))
                        };
                        properties.push(Property {
                            kind: PropertyKind::Normal,
                            key: Some(Expr::new(name_span, EData::String(EString::new(name)))),
                            is_computed: false,
                            is_method: false,
                            is_static: false,
                            is_shorthand: false,
                            value: Some(value),
                            initializer: None,
                        });
                    }
                    _ if self.lexer.token.is_keyword() => {
                        // Keywords are fine as attribute names
                        let name = self.lexer.raw().to_string();
                        let name_span = self.lexer.span();
                        self.lexer.next();
                        let value = if self.eat(Token::Equals) {
                            match self.lexer.token {
                                Token::StringLiteral => {
                                    self.lexer.rescan_jsx_string();
                                    let value = self.lexer.string_value.clone();
                                    let span = self.lexer.span();
                                    self.lexer.next();
                                    Expr::new(span, EData::String(EString::new(value)))
                                }
                                Token::OpenBrace => {
                                    self.lexer.next();
                                    let value = self.parse_expr(Precedence::Comma)?;
                                    if self.lexer.token != Token::CloseBrace {
                                        self.unexpected();
                                        return Err(ParseError);
                                    }
                                    self.lexer.next();
                                    value
                                }
                                _ => {
                                    self.unexpected();
                                    return Err(ParseError);
                                }
                            }
                        } else {
                            Expr::new(name_span, EData::Boolean(true))
                        };
                        properties.push(Property {
                            kind: PropertyKind::Normal,
                            key: Some(Expr::new(name_span, EData::String(EString::new(name)))),
                            is_computed: false,
                            is_method: false,
                            is_static: false,
                            is_shorthand: false,
                            value: Some(value),
                            initializer: None,
                        });
                    }
                    _ => {
                        self.unexpected();
                        return Err(ParseError);
                    }
                }
            }

            // Self-closing
            if self.eat(Token::Slash) {
                if self.lexer.token != Token::GreaterThan {
                    self.unexpected();
                    return Err(ParseError);
                }
                return Ok(Expr::new(
                    Span::new(start, self.lexer.token_end),
                    EData::JsxElement(Box::new(EJsxElement {
                        tag,
                        properties,
                        children: Vec::new(),
                    })),
                ));
            }
        }

        if self.lexer.token != Token::GreaterThan {
            self.unexpected();
            return Err(ParseError);
        }

        // Children until the closing tag
        let mut children = Vec::new();
        loop {
            self.lexer.next_jsx_child_token();
            match self.lexer.token {
                Token::JsxText => {
                    let normalized = normalize_jsx_text(&self.lexer.string_value);
                    if !normalized.is_empty() {
                        children.push(Expr::new(
                            self.lexer.span(),
                            EData::String(EString::new(normalized)),
                        ));
                    }
                }
                Token::OpenBrace => {
                    self.lexer.next();
                    if self.lexer.token == Token::CloseBrace {
                        // `{}` and `{/* comment */}` contribute nothing
                        continue;
                    }
                    let value = self.parse_expr(Precedence::Comma)?;
                    if self.lexer.token != Token::CloseBrace {
                        self.unexpected();
                        return Err(ParseError);
                    }
                    children.push(value);
                    // The close brace stays current; the next loop turn
                    // scans children from right after it
                }
                Token::LessThan => {
                    let child_start = self.lexer.token_start;
                    self.lexer.next();
                    if self.eat(Token::Slash) {
                        // Closing tag
                        let closing = if self.lexer.token == Token::GreaterThan {
                            None
                        } else {
                            Some(self.parse_jsx_tag_name()?)
                        };
                        let open_name = tag.as_ref().map(jsx_tag_text);
                        if closing.as_deref() != open_name.as_deref() {
                            self.error(
                                self.lexer.span(),
                                match (&open_name, &closing) {
                                    (Some(open), Some(close)) => format!(
                                        "expected closing tag </{open}> but found </{close}>"
                                    ),
                                    (Some(open), None) => {
                                        format!("expected closing tag </{open}>")
                                    }
                                    _ => "unexpected closing tag".to_string(),
                                },
                            );
                            return Err(ParseError);
                        }
                        if self.lexer.token != Token::GreaterThan {
                            self.unexpected();
                            return Err(ParseError);
                        }
                        break;
                    }
                    let child = self.parse_jsx_element_after_less_than(child_start)?;
                    children.push(child);
                    // The child's final `>` is current; scanning resumes
                    // right after it
                }
                _ => {
                    self.unexpected();
                    return Err(ParseError);
                }
            }
        }

        Ok(Expr::new(
            Span::new(start, self.lexer.token_end),
            EData::JsxElement(Box::new(EJsxElement {
                tag,
                properties,
                children,
            })),
        ))
    }

    /// `a`, `A.B.c`, `data-tag`. Dotted names build member accesses.
    fn parse_jsx_tag(&mut self) -> ParseResult<Expr> {
        let start = self.lexer.token_start;
        let name = self.parse_jsx_tag_name()?;
        let mut expr = Expr::new(
            Span::new(start, self.lexer.token_start),
            EData::IdentifierName(name),
        );
        while self.lexer.token == Token::Dot {
            // Already part of a member chain: rebuild as dots
            self.lexer.next();
            let (member, member_span) = self.expect_identifier_like()?;
            expr = Expr::new(
                Span::new(start, member_span.end),
                EData::Dot(Box::new(EDot {
                    target: expr,
                    name: member,
                    name_span: member_span,
                    optional_chain: OptionalChain::None,
                })),
            );
        }
        Ok(expr)
    }

    fn parse_jsx_tag_name(&mut self) -> ParseResult<String> {
        if self.lexer.token != Token::Identifier && !self.lexer.token.is_keyword() {
            self.unexpected();
            return Err(ParseError);
        }
        self.lexer.continue_jsx_identifier();
        let name = self.lexer.identifier.clone();
        self.lexer.next();
        Ok(name)
    }
}

/// Text of a tag expression for open/close matching.
fn jsx_tag_text(tag: &Expr) -> String {
    match &tag.data {
        EData::IdentifierName(name) => name.clone(),
        EData::Dot(dot) => format!("{}.{}", jsx_tag_text(&dot.target), dot.name),
        _ => String::new(),
    }
}

/// JSX text normalization: strip each line's leading whitespace, drop
/// whitespace-only lines, join survivors with one space. Whitespace
/// inside a line (including before a newline) is preserved.
pub(crate) fn normalize_jsx_text(text: &str) -> String {
    let mut lines = Vec::new();
    for line in text.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let trimmed = line.trim_start();
        if !trimmed.is_empty() {
            // Re-attach everything from the first non-whitespace on,
            // keeping interior and trailing spaces
            let offset = line.len() - trimmed.len();
            lines.push(&line[offset..]);
        }
    }
    lines.join(" ")
}
